//! Pixel-level fills and path helpers shared by the frame renderer.

use std::f64::consts::{FRAC_PI_2, TAU};
use std::sync::Arc;

use kurbo::{BezPath, PathEl, Point, RoundedRect, Shape as _};

use crate::foundation::error::{ReelError, ReelResult};

const RING_SEGMENTS: usize = 96;

/// Straight-alpha RGBA8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Rgba8 {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

impl Rgba8 {
    pub(crate) const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub(crate) fn to_cpu(self) -> vello_cpu::peniko::Color {
        vello_cpu::peniko::Color::from_rgba8(self.r, self.g, self.b, self.a)
    }
}

/// HSL (hue in degrees, saturation and lightness in `[0, 1]`) to RGB.
pub(crate) fn hsl_to_rgb(hue_deg: f64, s: f64, l: f64) -> [u8; 3] {
    let h = hue_deg.rem_euclid(360.0) / 360.0;
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);

    if s == 0.0 {
        let v = (l * 255.0).round() as u8;
        return [v, v, v];
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    let channel = |mut t: f64| -> u8 {
        t = t.rem_euclid(1.0);
        let v = if t < 1.0 / 6.0 {
            p + (q - p) * 6.0 * t
        } else if t < 0.5 {
            q
        } else if t < 2.0 / 3.0 {
            p + (q - p) * (2.0 / 3.0 - t) * 6.0
        } else {
            p
        };
        (v * 255.0).round().clamp(0.0, 255.0) as u8
    };
    [channel(h + 1.0 / 3.0), channel(h), channel(h - 1.0 / 3.0)]
}

/// Gradient end colors for a given progress. The hue drifts by 90 degrees over the video.
pub(crate) fn background_colors(progress: f64) -> ([u8; 3], [u8; 3]) {
    let hue = 220.0 + 90.0 * progress.clamp(0.0, 1.0);
    (hsl_to_rgb(hue, 0.65, 0.38), hsl_to_rgb(hue + 50.0, 0.70, 0.20))
}

fn smoothstep(edge0: f64, edge1: f64, x: f64) -> f64 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Full-canvas backdrop: an opaque diagonal gradient darkened by a radial vignette.
///
/// The vignette only depends on the canvas size, so its per-pixel factors are computed once.
pub(crate) struct Backdrop {
    width: u32,
    height: u32,
    vignette: Vec<f32>,
}

impl Backdrop {
    pub(crate) fn new(width: u32, height: u32) -> Self {
        let cx = f64::from(width) * 0.5;
        let cy = f64::from(height) * 0.5;
        let max_r = cx.hypot(cy).max(1.0);
        let mut vignette = Vec::with_capacity((width as usize) * (height as usize));
        for y in 0..height {
            for x in 0..width {
                let d = (f64::from(x) + 0.5 - cx).hypot(f64::from(y) + 0.5 - cy) / max_r;
                vignette.push((1.0 - 0.6 * smoothstep(0.45, 1.0, d)) as f32);
            }
        }
        Self {
            width,
            height,
            vignette,
        }
    }

    /// Paint into `dst` (row-major RGBA8). Output is opaque, so premultiplied and straight
    /// forms are identical.
    pub(crate) fn fill(&self, dst: &mut [u8], progress: f64) -> ReelResult<()> {
        if dst.len() != self.vignette.len() * 4 {
            return Err(ReelError::surface("background buffer size mismatch"));
        }

        let (start, end) = background_colors(progress);
        let w1 = f32::from(u16::try_from(self.width.max(2) - 1).unwrap_or(u16::MAX));
        let h1 = f32::from(u16::try_from(self.height.max(2) - 1).unwrap_or(u16::MAX));
        let start = start.map(f32::from);
        let delta = [
            f32::from(end[0]) - start[0],
            f32::from(end[1]) - start[1],
            f32::from(end[2]) - start[2],
        ];

        let width = self.width as usize;
        for (i, (px, keep)) in dst.chunks_exact_mut(4).zip(&self.vignette).enumerate() {
            let x = (i % width) as f32;
            let y = (i / width) as f32;
            let t = (x / w1 + y / h1) * 0.5;
            for c in 0..3 {
                px[c] = ((start[c] + delta[c] * t) * keep).round().clamp(0.0, 255.0) as u8;
            }
            px[3] = 255;
        }
        Ok(())
    }
}

/// Wrap opaque or premultiplied RGBA8 bytes as a `vello_cpu` image paint.
pub(crate) fn rgba_premul_to_image(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> ReelResult<vello_cpu::Image> {
    let w: u16 = width
        .try_into()
        .map_err(|_| ReelError::surface("pixmap width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| ReelError::surface("pixmap height exceeds u16"))?;
    if bytes.len() != (width as usize) * (height as usize) * 4 {
        return Err(ReelError::surface("pixmap byte len mismatch"));
    }

    let mut pixels = Vec::<vello_cpu::peniko::color::PremulRgba8>::with_capacity(
        (width as usize) * (height as usize),
    );
    let mut may_have_opacities = false;
    for px in bytes.chunks_exact(4) {
        may_have_opacities |= px[3] != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8::from_u8_array([
            px[0], px[1], px[2], px[3],
        ]));
    }
    let pixmap = vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, may_have_opacities);
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

/// Rounded rectangle as a path.
pub(crate) fn rounded_rect(x0: f64, y0: f64, x1: f64, y1: f64, radius: f64) -> BezPath {
    let rr = RoundedRect::new(x0, y0, x1, y1, radius);
    let mut p = BezPath::new();
    for el in rr.path_elements(0.1) {
        p.push(el);
    }
    p
}

/// Closed ring sector between `inner` and `outer` radii.
///
/// Angles start at 12 o'clock and grow clockwise in screen space; `sweep` is in `[0, 1]` of a
/// full turn. A full sweep produces a complete ring.
pub(crate) fn ring_sector(center: Point, inner: f64, outer: f64, sweep: f64) -> BezPath {
    let sweep = sweep.clamp(0.0, 1.0);
    let mut p = BezPath::new();
    if sweep <= 0.0 || outer <= inner {
        return p;
    }

    let steps = ((RING_SEGMENTS as f64 * sweep).ceil() as usize).max(1);
    let at = |r: f64, i: usize| -> Point {
        let a = -FRAC_PI_2 + TAU * sweep * (i as f64 / steps as f64);
        Point::new(center.x + r * a.cos(), center.y + r * a.sin())
    };

    p.move_to(at(outer, 0));
    for i in 1..=steps {
        p.line_to(at(outer, i));
    }
    for i in (0..=steps).rev() {
        p.line_to(at(inner, i));
    }
    p.close_path();
    p
}

pub(crate) fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    let pt = |p: Point| vello_cpu::kurbo::Point::new(p.x, p.y);

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(pt(p)),
            PathEl::LineTo(p) => out.line_to(pt(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(pt(p1), pt(p2)),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(pt(p1), pt(p2), pt(p3)),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/paint.rs"]
mod tests;
