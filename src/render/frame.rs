use anyhow::Context as _;
use kurbo::Point;

use crate::foundation::core::Canvas;
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::paint::{
    Backdrop, Rgba8, bezpath_to_cpu, rgba_premul_to_image, ring_sector, rounded_rect,
};
use crate::render::text::{CaptionFont, TextBrushRgba8, line_extent};

const TITLE_BAR_COLOR: Rgba8 = Rgba8::new(255, 255, 255, 30);
const CAPTION_BOX_COLOR: Rgba8 = Rgba8::new(0, 0, 0, 115);
const RING_TRACK_COLOR: Rgba8 = Rgba8::new(255, 255, 255, 60);
const RING_FILL_COLOR: Rgba8 = Rgba8::new(255, 255, 255, 235);

/// Caption text shrinks by this factor until it fits the box or reaches `MIN_FONT_PX`.
const FIT_SHRINK: f32 = 0.9;
const MIN_FONT_PX: f32 = 8.0;

/// A rendered frame as opaque RGBA8 pixels.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major, alpha always 255.
    pub data: Vec<u8>,
}

impl FrameRGBA {
    /// Encode as a PNG file in memory.
    ///
    /// Frames are scratch inputs for the encoder, so compression favors speed.
    pub fn encode_png(&self) -> ReelResult<Vec<u8>> {
        use image::ImageEncoder as _;
        use image::codecs::png::{CompressionType, FilterType, PngEncoder};

        if self.data.len() != (self.width as usize) * (self.height as usize) * 4 {
            return Err(ReelError::surface("frame buffer does not match its dimensions"));
        }
        let mut out = Vec::new();
        PngEncoder::new_with_quality(&mut out, CompressionType::Fast, FilterType::Sub)
            .write_image(
                &self.data,
                self.width,
                self.height,
                image::ExtendedColorType::Rgba8,
            )
            .context("encode frame as png")?;
        Ok(out)
    }
}

/// Derived layout of the frame chrome, all relative to the canvas size.
#[derive(Clone, Copy, Debug)]
struct FrameLayout {
    margin: f64,
    bar_h: f64,
    ring_center: Point,
    ring_radius: f64,
    ring_thickness: f64,
    box_x0: f64,
    box_y0: f64,
    box_x1: f64,
    box_y1: f64,
    box_padding: f64,
    font_px: f32,
}

impl FrameLayout {
    fn for_canvas(canvas: Canvas) -> Self {
        let w = f64::from(canvas.width);
        let h = f64::from(canvas.height);
        let min_side = canvas.min_side();

        let margin = min_side * 0.06;
        let bar_h = min_side * 0.09;
        let ring_radius = bar_h * 0.5;
        let box_w = w * 0.86;
        let box_h = h * if canvas.is_portrait() { 0.26 } else { 0.34 };

        Self {
            margin,
            bar_h,
            ring_center: Point::new(w - margin - ring_radius, margin + ring_radius),
            ring_radius,
            ring_thickness: ring_radius * 0.28,
            box_x0: (w - box_w) * 0.5,
            box_y0: (h - box_h) * 0.5,
            box_x1: (w + box_w) * 0.5,
            box_y1: (h + box_h) * 0.5,
            box_padding: min_side * 0.05,
            font_px: (min_side * 0.06).max(12.0) as f32,
        }
    }

    /// Size of the text area inside the caption box.
    fn text_area(&self) -> (f32, f32) {
        let w = (self.box_x1 - self.box_x0) - 2.0 * self.box_padding;
        let h = (self.box_y1 - self.box_y0) - 2.0 * self.box_padding;
        (w.max(1.0) as f32, h.max(1.0) as f32)
    }
}

/// Caption text laid out for the caption box, kept while the same caption repeats.
struct FittedCaption {
    text: String,
    layout: parley::Layout<TextBrushRgba8>,
}

/// Draws caption frames onto an owned CPU surface.
///
/// Each [`FrameRenderer::render`] call repaints the whole surface: gradient background, vignette,
/// title bar, caption box with centered text, and the progress ring. The backdrop covers every
/// pixel, so the surface is always opaque.
pub struct FrameRenderer {
    canvas: Canvas,
    width_px: u16,
    height_px: u16,
    layout: FrameLayout,
    pixmap: vello_cpu::Pixmap,
    backdrop: Backdrop,
    background: Vec<u8>,
    font: CaptionFont,
    fitted: Option<FittedCaption>,
}

impl FrameRenderer {
    /// Create a renderer for `canvas`, drawing captions with `font` or the bundled font.
    ///
    /// Fails when no drawing surface can be created for the requested size or no caption font
    /// can be loaded.
    pub fn new(canvas: Canvas, font: Option<CaptionFont>) -> ReelResult<Self> {
        if canvas.width == 0 || canvas.height == 0 {
            return Err(ReelError::surface("canvas width/height must be non-zero"));
        }
        let width_px: u16 = canvas
            .width
            .try_into()
            .map_err(|_| ReelError::surface("canvas width exceeds u16"))?;
        let height_px: u16 = canvas
            .height
            .try_into()
            .map_err(|_| ReelError::surface("canvas height exceeds u16"))?;

        let font = match font {
            Some(font) => font,
            None => CaptionFont::bundled()
                .map_err(|e| ReelError::surface(format!("no caption font available: {e}")))?,
        };
        tracing::debug!(family = font.family(), "caption font");

        Ok(Self {
            canvas,
            width_px,
            height_px,
            layout: FrameLayout::for_canvas(canvas),
            pixmap: vello_cpu::Pixmap::new(width_px, height_px),
            backdrop: Backdrop::new(canvas.width, canvas.height),
            background: vec![0u8; (canvas.width as usize) * (canvas.height as usize) * 4],
            font,
            fitted: None,
        })
    }

    /// Canvas this renderer draws onto.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Repaint the surface for `caption` at `progress` (clamped into `[0, 1]`).
    pub fn render(&mut self, caption: &str, progress: f64) -> ReelResult<()> {
        let progress = if progress.is_finite() {
            progress.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let l = self.layout;
        let w = f64::from(self.canvas.width);
        let h = f64::from(self.canvas.height);

        self.backdrop.fill(&mut self.background, progress)?;
        let bg = rgba_premul_to_image(&self.background, self.canvas.width, self.canvas.height)?;

        let mut ctx = vello_cpu::RenderContext::new(self.width_px, self.height_px);
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(bg);
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h));

        // Title bar stops short of the ring.
        let bar_x1 = (l.ring_center.x - l.ring_radius - l.margin * 0.5).max(l.margin);
        ctx.set_paint(TITLE_BAR_COLOR.to_cpu());
        ctx.fill_path(&bezpath_to_cpu(&rounded_rect(
            l.margin,
            l.margin,
            bar_x1,
            l.margin + l.bar_h,
            l.bar_h * 0.5,
        )));

        ctx.set_paint(CAPTION_BOX_COLOR.to_cpu());
        ctx.fill_path(&bezpath_to_cpu(&rounded_rect(
            l.box_x0,
            l.box_y0,
            l.box_x1,
            l.box_y1,
            l.box_padding,
        )));

        self.draw_caption(&mut ctx, caption)?;

        let inner = l.ring_radius - l.ring_thickness;
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(RING_TRACK_COLOR.to_cpu());
        ctx.fill_path(&bezpath_to_cpu(&ring_sector(
            l.ring_center,
            inner,
            l.ring_radius,
            1.0,
        )));
        if progress > 0.0 {
            ctx.set_paint(RING_FILL_COLOR.to_cpu());
            ctx.fill_path(&bezpath_to_cpu(&ring_sector(
                l.ring_center,
                inner,
                l.ring_radius,
                progress,
            )));
        }

        ctx.flush();
        ctx.render_to_pixmap(&mut self.pixmap);
        Ok(())
    }

    /// Lay out `caption` for the caption box, shrinking it until it fits.
    ///
    /// At [`MIN_FONT_PX`] the text is kept even if it still overflows.
    fn fit_caption(
        &mut self,
        caption: &str,
    ) -> ReelResult<(f32, parley::Layout<TextBrushRgba8>)> {
        let (max_w, max_h) = self.layout.text_area();
        let mut size = self.layout.font_px.max(MIN_FONT_PX);
        loop {
            let layout = self.font.layout(caption, size, TextBrushRgba8::WHITE, max_w)?;
            if layout.height() <= max_h || size <= MIN_FONT_PX {
                return Ok((size, layout));
            }
            size = (size * FIT_SHRINK).max(MIN_FONT_PX);
        }
    }

    fn draw_caption(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        caption: &str,
    ) -> ReelResult<()> {
        let caption = caption.trim();
        if caption.is_empty() {
            return Ok(());
        }
        if self.fitted.as_ref().is_none_or(|f| f.text != caption) {
            let (size, layout) = self.fit_caption(caption)?;
            tracing::trace!(size, lines = layout.len(), "caption laid out");
            self.fitted = Some(FittedCaption {
                text: caption.to_string(),
                layout,
            });
        }
        let Some(fitted) = self.fitted.as_ref() else {
            return Ok(());
        };

        let l = self.layout;
        let (max_w, _) = l.text_area();
        let text_x0 = l.box_x0 + l.box_padding;
        let text_y0 = (l.box_y0 + l.box_y1) * 0.5 - f64::from(fitted.layout.height()) * 0.5;
        let font_data = self.font.data();

        for line in fitted.layout.lines() {
            let (min_x, max_x) = line_extent(&line);
            let dx = (f64::from(max_w) - f64::from(max_x - min_x)) * 0.5 - f64::from(min_x);
            ctx.set_transform(vello_cpu::kurbo::Affine::translate((text_x0 + dx, text_y0)));

            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let brush = run.style().brush;
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));
                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(font_data)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        Ok(())
    }

    /// Read back the current surface.
    pub fn frame(&self) -> FrameRGBA {
        FrameRGBA {
            width: self.canvas.width,
            height: self.canvas.height,
            data: self.pixmap.data_as_u8_slice().to_vec(),
        }
    }

    /// Current surface as PNG bytes.
    pub fn encode_png(&self) -> ReelResult<Vec<u8>> {
        self.frame().encode_png()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/frame.rs"]
mod tests;
