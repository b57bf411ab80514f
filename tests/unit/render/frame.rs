use super::*;

fn px(frame: &FrameRGBA, x: u32, y: u32) -> [u8; 4] {
    let i = ((y * frame.width + x) * 4) as usize;
    [
        frame.data[i],
        frame.data[i + 1],
        frame.data[i + 2],
        frame.data[i + 3],
    ]
}

fn portrait() -> Canvas {
    Canvas {
        width: 90,
        height: 160,
    }
}

fn tall() -> Canvas {
    Canvas {
        width: 360,
        height: 640,
    }
}

/// Bounding box `(x0, y0, x1, y1)` of the pixels that differ between two frames.
fn diff_bounds(a: &FrameRGBA, b: &FrameRGBA) -> Option<(u32, u32, u32, u32)> {
    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    for y in 0..a.height {
        for x in 0..a.width {
            if px(a, x, y) == px(b, x, y) {
                continue;
            }
            bounds = Some(match bounds {
                None => (x, y, x, y),
                Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
            });
        }
    }
    bounds
}

fn ink_bounds(canvas: Canvas, caption: &str) -> (u32, u32, u32, u32) {
    let mut r = FrameRenderer::new(canvas, None).unwrap();
    r.render("", 0.5).unwrap();
    let blank = r.frame();
    r.render(caption, 0.5).unwrap();
    let texted = r.frame();
    diff_bounds(&blank, &texted).expect("caption should change some pixels")
}

fn assert_inside_text_area(canvas: Canvas, bounds: (u32, u32, u32, u32)) {
    let l = FrameLayout::for_canvas(canvas);
    let (x0, y0, x1, y1) = bounds;
    let slack = 2.0;
    assert!(
        f64::from(x0) >= l.box_x0 + l.box_padding - slack,
        "ink starts at x={x0}, text area starts at {}",
        l.box_x0 + l.box_padding
    );
    assert!(
        f64::from(x1) <= l.box_x1 - l.box_padding + slack,
        "ink ends at x={x1}, text area ends at {}",
        l.box_x1 - l.box_padding
    );
    assert!(f64::from(y0) >= l.box_y0 && f64::from(y1) <= l.box_y1);

    let box_mid = (l.box_y0 + l.box_y1) * 0.5;
    let ink_mid = f64::from(y0 + y1) * 0.5;
    let box_h = l.box_y1 - l.box_y0;
    assert!(
        (ink_mid - box_mid).abs() <= box_h * 0.15,
        "ink centered at y={ink_mid}, box centered at y={box_mid}"
    );
    let ink_mid_x = f64::from(x0 + x1) * 0.5;
    assert!(
        (ink_mid_x - f64::from(canvas.width) * 0.5).abs() <= 8.0,
        "ink centered at x={ink_mid_x}"
    );
}

#[test]
fn unusable_canvas_is_a_surface_error() {
    for canvas in [
        Canvas {
            width: 0,
            height: 10,
        },
        Canvas {
            width: 70_000,
            height: 10,
        },
    ] {
        let err = match FrameRenderer::new(canvas, None) {
            Ok(_) => panic!("expected surface error for {canvas:?}"),
            Err(e) => e,
        };
        assert!(matches!(err, ReelError::Surface(_)));
    }
}

#[test]
fn frame_is_opaque_and_sized_to_canvas() {
    let mut r = FrameRenderer::new(portrait(), None).unwrap();
    r.render("hello", 0.5).unwrap();
    let f = r.frame();
    assert_eq!((f.width, f.height), (90, 160));
    assert_eq!(f.data.len(), 90 * 160 * 4);
    assert!(f.data.chunks_exact(4).all(|p| p[3] == 255));
}

#[test]
fn progress_ring_fills_clockwise_from_the_top() {
    let canvas = Canvas {
        width: 360,
        height: 640,
    };
    let l = FrameLayout::for_canvas(canvas);
    let mid_r = l.ring_radius - l.ring_thickness * 0.5;
    // A point on the ring at 3 o'clock: covered once progress passes 25%.
    let (x, y) = (
        (l.ring_center.x + mid_r).round() as u32,
        l.ring_center.y.round() as u32,
    );

    let mut r = FrameRenderer::new(canvas, None).unwrap();
    r.render("", 0.1).unwrap();
    let before = px(&r.frame(), x, y);
    r.render("", 0.6).unwrap();
    let after = px(&r.frame(), x, y);

    let sum = |p: [u8; 4]| u32::from(p[0]) + u32::from(p[1]) + u32::from(p[2]);
    assert!(
        sum(after) > sum(before) + 150,
        "before={before:?} after={after:?}"
    );
}

#[test]
fn background_changes_with_progress() {
    let mut r = FrameRenderer::new(portrait(), None).unwrap();
    r.render("x", 0.0).unwrap();
    let a = r.frame();
    r.render("x", 1.0).unwrap();
    let b = r.frame();
    assert_ne!(px(&a, 5, 80), px(&b, 5, 80));
}

#[test]
fn out_of_range_progress_is_clamped() {
    let mut r = FrameRenderer::new(portrait(), None).unwrap();
    r.render("x", 1.0).unwrap();
    let a = r.frame();
    r.render("x", 7.0).unwrap();
    let b = r.frame();
    assert_eq!(a.data, b.data);
    r.render("x", f64::NAN).unwrap();
}

#[test]
fn png_encoding_produces_a_png() {
    let mut r = FrameRenderer::new(portrait(), None).unwrap();
    r.render("hello", 0.25).unwrap();
    let png = r.encode_png().unwrap();
    assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    let decoded = image::load_from_memory(&png).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (90, 160));
}

#[test]
fn missing_font_falls_back_to_the_bundled_face() {
    let r = FrameRenderer::new(portrait(), None).unwrap();
    assert_eq!(r.font.family(), "DejaVu Sans");
}

#[test]
fn different_captions_produce_different_frames() {
    let mut r = FrameRenderer::new(portrait(), None).unwrap();
    r.render("Nobody tells you this about rust.", 0.5).unwrap();
    let a = r.frame();
    r.render("A completely different caption", 0.5).unwrap();
    let b = r.frame();
    assert_ne!(a.data, b.data);
}

#[test]
fn caption_is_centered_inside_the_box() {
    let canvas = tall();
    let bounds = ink_bounds(canvas, "Hello captions");
    assert_inside_text_area(canvas, bounds);
}

#[test]
fn multi_line_caption_stays_inside_the_box() {
    let canvas = tall();
    let bounds = ink_bounds(
        canvas,
        "Most people learn rust the hard way. Start with one small project today.",
    );
    let l = FrameLayout::for_canvas(canvas);
    // Wraps onto more than one line.
    assert!(f64::from(bounds.3 - bounds.1) > f64::from(l.font_px) * 1.5);
    assert_inside_text_area(canvas, bounds);
}

#[test]
fn long_caption_shrinks_to_fit() {
    let canvas = tall();
    let caption = "shrink ".repeat(40);
    let caption = caption.trim();

    let mut r = FrameRenderer::new(canvas, None).unwrap();
    let (size, layout) = r.fit_caption(caption).unwrap();
    let l = FrameLayout::for_canvas(canvas);
    let (_, max_h) = l.text_area();
    assert!(size < l.font_px, "size {size} was not reduced");
    assert!(size >= MIN_FONT_PX);
    assert!(layout.height() <= max_h);

    assert_inside_text_area(canvas, ink_bounds(canvas, caption));
}

#[test]
fn short_caption_keeps_the_base_size() {
    let mut r = FrameRenderer::new(tall(), None).unwrap();
    let (size, layout) = r.fit_caption("Hi").unwrap();
    assert_eq!(size, FrameLayout::for_canvas(tall()).font_px);
    assert_eq!(layout.len(), 1);
}

#[test]
fn frame_pixels_are_the_surface_pixels() {
    let mut r = FrameRenderer::new(portrait(), None).unwrap();
    r.render("hello", 0.3).unwrap();
    let png = r.encode_png().unwrap();
    let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
    assert_eq!(decoded.as_raw(), &r.frame().data);
}

#[test]
fn mismatched_buffer_is_rejected() {
    let frame = FrameRGBA {
        width: 4,
        height: 4,
        data: vec![0u8; 8],
    };
    assert!(matches!(frame.encode_png(), Err(ReelError::Surface(_))));
}
