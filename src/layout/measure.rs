//! Text measurement collaborator and the metrics-based fallback

use crate::css::StyleProperties;

use super::geometry::Size;

/// Default font metrics for text layout
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontMetrics {
    /// Font size in pixels
    pub size: f32,
    /// Line height multiplier
    pub line_height: f32,
    /// Average glyph advance as a fraction of the font size
    pub glyph_width: f32,
}

impl Default for FontMetrics {
    fn default() -> Self {
        Self {
            size: 16.0,
            line_height: 1.2,
            glyph_width: 0.5,
        }
    }
}

/// Resolved font parameters handed to measurers and renderers
#[derive(Debug, Clone, PartialEq)]
pub struct FontSpec {
    pub family: Option<String>,
    pub size: f32,
    pub weight: u16,
    pub italic: bool,
    /// Line height in pixels
    pub line_height: f32,
    pub letter_spacing: f32,
}

impl FontSpec {
    pub fn from_style(style: &StyleProperties, metrics: &FontMetrics) -> Self {
        let size = style.font_size.unwrap_or(metrics.size);
        let line_height = style
            .line_height
            .map(|lh| lh.resolve(size))
            .unwrap_or(metrics.line_height * size);
        Self {
            family: style.font_family.clone(),
            size,
            weight: style.font_weight.unwrap_or(400),
            italic: style.font_style == Some(crate::css::FontStyle::Italic),
            line_height,
            letter_spacing: style.letter_spacing.unwrap_or(0.0),
        }
    }
}

/// Measures text for intrinsic sizing. Hosts with a real text shaper plug
/// their own implementation into the layout engine.
pub trait TextMeasure {
    fn measure(&self, text: &str, font: &FontSpec) -> Size;
}

/// Fixed-advance approximation driven by [`FontMetrics`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproximateTextMeasure {
    pub metrics: FontMetrics,
}

impl ApproximateTextMeasure {
    pub fn new(metrics: FontMetrics) -> Self {
        Self { metrics }
    }
}

impl TextMeasure for ApproximateTextMeasure {
    fn measure(&self, text: &str, font: &FontSpec) -> Size {
        let advance = self.metrics.glyph_width * font.size;
        let mut lines = 0usize;
        let mut widest = 0.0f32;
        for line in text.split('\n') {
            lines += 1;
            let glyphs = line.chars().count();
            let spacing = font.letter_spacing * glyphs.saturating_sub(1) as f32;
            widest = widest.max(glyphs as f32 * advance + spacing);
        }
        Size::new(widest.max(0.0), lines as f32 * font.line_height)
    }
}
