use super::*;

#[test]
fn hsl_primaries() {
    assert_eq!(hsl_to_rgb(0.0, 1.0, 0.5), [255, 0, 0]);
    assert_eq!(hsl_to_rgb(120.0, 1.0, 0.5), [0, 255, 0]);
    assert_eq!(hsl_to_rgb(240.0, 1.0, 0.5), [0, 0, 255]);
    assert_eq!(hsl_to_rgb(360.0, 1.0, 0.5), [255, 0, 0]);
    assert_eq!(hsl_to_rgb(17.0, 0.0, 0.5), [128, 128, 128]);
}

#[test]
fn background_hue_shifts_with_progress() {
    assert_ne!(background_colors(0.0), background_colors(1.0));
    assert_eq!(background_colors(-1.0), background_colors(0.0));
    assert_eq!(background_colors(2.0), background_colors(1.0));
}

#[test]
fn background_is_opaque_and_vignetted() {
    let (w, h) = (64u32, 64u32);
    let backdrop = Backdrop::new(w, h);
    let mut bytes = vec![0u8; (w * h * 4) as usize];
    backdrop.fill(&mut bytes, 0.5).unwrap();

    assert!(bytes.chunks_exact(4).all(|px| px[3] == 255));

    let luma = |x: u32, y: u32| -> u32 {
        let i = ((y * w + x) * 4) as usize;
        u32::from(bytes[i]) + u32::from(bytes[i + 1]) + u32::from(bytes[i + 2])
    };
    // Corners sit under the darkest part of the vignette.
    assert!(luma(0, h - 1) < luma(w / 2, h / 2));

    let mut short = vec![0u8; 8];
    assert!(backdrop.fill(&mut short, 0.0).is_err());
}

#[test]
fn ring_sector_closes_and_scales_with_sweep() {
    let c = Point::new(50.0, 50.0);
    assert!(ring_sector(c, 10.0, 20.0, 0.0).elements().is_empty());
    assert!(ring_sector(c, 20.0, 10.0, 0.5).elements().is_empty());

    let quarter = ring_sector(c, 10.0, 20.0, 0.25);
    let full = ring_sector(c, 10.0, 20.0, 1.0);
    assert!(matches!(quarter.elements().last(), Some(PathEl::ClosePath)));
    assert!(full.elements().len() > quarter.elements().len());

    // Starts at 12 o'clock on the outer radius.
    let PathEl::MoveTo(p) = full.elements()[0] else {
        panic!("ring must start with move_to");
    };
    assert!((p.x - 50.0).abs() < 1e-9);
    assert!((p.y - 30.0).abs() < 1e-9);
}

#[test]
fn image_paint_rejects_mismatched_buffers() {
    assert!(rgba_premul_to_image(&[0u8; 16], 2, 2).is_ok());
    assert!(rgba_premul_to_image(&[0u8; 12], 2, 2).is_err());
    assert!(rgba_premul_to_image(&[], 70_000, 0).is_err());
}
