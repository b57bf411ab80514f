use std::path::Path;

use anyhow::Context as _;

use crate::foundation::error::{ReelError, ReelResult};

/// DejaVu Sans, used when no caption font is supplied. See `assets/fonts/LICENSE-DejaVu.txt`.
const BUNDLED_FONT: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color used by Parley text layout.
pub(crate) struct TextBrushRgba8 {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

impl TextBrushRgba8 {
    pub(crate) const WHITE: Self = Self {
        r: 255,
        g: 255,
        b: 255,
        a: 255,
    };
}

/// Font used for caption text, with the Parley contexts needed to shape it.
///
/// Fonts are loaded from raw TrueType/OpenType bytes so output does not depend on whatever
/// happens to be installed on the machine. [`CaptionFont::bundled`] is always available.
pub struct CaptionFont {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    family: String,
    data: vello_cpu::peniko::FontData,
}

impl CaptionFont {
    /// Register a font from its file bytes.
    pub fn from_bytes(font_bytes: Vec<u8>) -> ReelResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.clone()), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| ReelError::validation("no font families registered from font bytes"))?;

        let family = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| ReelError::validation("registered font family has no name"))?
            .to_string();

        let data = vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(font_bytes), 0);

        tracing::debug!(family = %family, "caption font registered");
        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family,
            data,
        })
    }

    /// The font shipped with the crate (DejaVu Sans).
    pub fn bundled() -> ReelResult<Self> {
        Self::from_bytes(BUNDLED_FONT.to_vec())
    }

    /// Read and register a font file.
    pub fn from_path(path: &Path) -> ReelResult<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("read font file '{}'", path.display()))?;
        Self::from_bytes(bytes)
    }

    /// Family name reported by the font.
    pub fn family(&self) -> &str {
        &self.family
    }

    pub(crate) fn data(&self) -> &vello_cpu::peniko::FontData {
        &self.data
    }

    /// Shape `text` and break it into lines no wider than `max_width_px`.
    ///
    /// Lines are start-aligned; callers center them using [`line_extent`].
    pub(crate) fn layout(
        &mut self,
        text: &str,
        size_px: f32,
        brush: TextBrushRgba8,
        max_width_px: f32,
    ) -> ReelResult<parley::Layout<TextBrushRgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(ReelError::validation("text size_px must be finite and > 0"));
        }

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Single(parley::style::FontFamily::Named(
                std::borrow::Cow::Owned(self.family.clone()),
            )),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(Some(max_width_px));
        layout.align(
            Some(max_width_px),
            parley::Alignment::Start,
            parley::AlignmentOptions::default(),
        );
        Ok(layout)
    }
}

/// Horizontal glyph extent `(min_x, max_x)` of one laid-out line.
pub(crate) fn line_extent(line: &parley::layout::Line<'_, TextBrushRgba8>) -> (f32, f32) {
    let mut min_x = f32::INFINITY;
    let mut max_x = f32::NEG_INFINITY;
    for item in line.items() {
        let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
            continue;
        };
        for g in run.positioned_glyphs() {
            min_x = min_x.min(g.x);
            max_x = max_x.max(g.x + g.advance);
        }
    }
    if min_x > max_x { (0.0, 0.0) } else { (min_x, max_x) }
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;
