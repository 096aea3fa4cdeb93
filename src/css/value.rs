//! Primitive style values: lengths, colors and the component values produced
//! by the stylesheet tokenizer.

use crate::layout::Size;

/// A single tokenized piece of a declaration value.
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentValue {
    /// Unit-less number
    Number(f32),
    /// Percentage, already scaled to 0..=100
    Percentage(f32),
    /// Number with a unit, unit lowercased
    Dimension(f32, String),
    /// Identifier keyword
    Ident(String),
    /// `#...` token (hex color)
    Hash(String),
    /// Quoted string
    String(String),
    /// Function with its argument values
    Function(String, Vec<ComponentValue>),
    Comma,
    Delim(char),
}

impl ComponentValue {
    /// Lowercased identifier text, if this is an identifier.
    pub fn as_ident(&self) -> Option<String> {
        match self {
            ComponentValue::Ident(name) => Some(name.to_ascii_lowercase()),
            _ => None,
        }
    }

    /// Plain numeric value, ignoring any unit.
    pub fn as_number(&self) -> Option<f32> {
        match self {
            ComponentValue::Number(v)
            | ComponentValue::Percentage(v)
            | ComponentValue::Dimension(v, _) => Some(*v),
            _ => None,
        }
    }
}

/// Split a value list at top-level commas.
pub fn split_commas(values: &[ComponentValue]) -> Vec<&[ComponentValue]> {
    values
        .split(|v| matches!(v, ComponentValue::Comma))
        .filter(|group| !group.is_empty())
        .collect()
}

/// Length units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LengthUnit {
    #[default]
    Pixels,
    Percent,
    ViewportWidth,
    ViewportHeight,
    /// Fill the available space; `value` is the share weight inside flows
    Fill,
    /// Size to the content (`fit-children`)
    FitContent,
    Auto,
}

/// A length with its unit. Resolution always needs a reference size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Length {
    pub value: f32,
    pub unit: LengthUnit,
}

impl Default for Length {
    fn default() -> Self {
        Self::AUTO
    }
}

impl Length {
    pub const ZERO: Length = Length {
        value: 0.0,
        unit: LengthUnit::Pixels,
    };

    pub const AUTO: Length = Length {
        value: 0.0,
        unit: LengthUnit::Auto,
    };

    pub fn px(value: f32) -> Self {
        Self {
            value,
            unit: LengthUnit::Pixels,
        }
    }

    pub fn percent(value: f32) -> Self {
        Self {
            value,
            unit: LengthUnit::Percent,
        }
    }

    pub fn vw(value: f32) -> Self {
        Self {
            value,
            unit: LengthUnit::ViewportWidth,
        }
    }

    pub fn vh(value: f32) -> Self {
        Self {
            value,
            unit: LengthUnit::ViewportHeight,
        }
    }

    pub fn fill() -> Self {
        Self {
            value: 1.0,
            unit: LengthUnit::Fill,
        }
    }

    pub fn fit_content() -> Self {
        Self {
            value: 0.0,
            unit: LengthUnit::FitContent,
        }
    }

    /// True for units the layout algorithm must size from content.
    pub fn is_intrinsic(&self) -> bool {
        matches!(self.unit, LengthUnit::FitContent | LengthUnit::Auto)
    }

    pub fn is_fill(&self) -> bool {
        self.unit == LengthUnit::Fill
    }

    /// Resolve to pixels against `reference` (parent content size along the
    /// same axis) and the viewport. Intrinsic units resolve to `None`.
    pub fn resolve(&self, reference: f32, viewport: Size) -> Option<f32> {
        match self.unit {
            LengthUnit::Pixels => Some(self.value),
            LengthUnit::Percent => Some(reference * self.value / 100.0),
            LengthUnit::ViewportWidth => Some(viewport.width * self.value / 100.0),
            LengthUnit::ViewportHeight => Some(viewport.height * self.value / 100.0),
            LengthUnit::Fill => Some(reference),
            LengthUnit::FitContent | LengthUnit::Auto => None,
        }
    }

    /// Resolve, treating intrinsic units as zero. Used for margins and padding.
    pub fn resolve_or_zero(&self, reference: f32, viewport: Size) -> f32 {
        self.resolve(reference, viewport).unwrap_or(0.0)
    }

    /// Parse a single component value. Malformed input falls back to pixels
    /// with whatever number could be read, or zero.
    pub fn from_component(value: &ComponentValue) -> Length {
        match value {
            ComponentValue::Number(v) => Length::px(*v),
            ComponentValue::Percentage(p) if (*p - 100.0).abs() < f32::EPSILON => Length::fill(),
            ComponentValue::Percentage(p) => Length::percent(*p),
            ComponentValue::Dimension(v, unit) => match unit.as_str() {
                "vw" => Length::vw(*v),
                "vh" => Length::vh(*v),
                _ => Length::px(*v),
            },
            ComponentValue::Ident(name) => match name.to_ascii_lowercase().as_str() {
                "fill-parent-flow" | "fill" => Length::fill(),
                "fit-children" | "fit-content" => Length::fit_content(),
                "auto" => Length::AUTO,
                _ => Length::ZERO,
            },
            ComponentValue::Function(name, args) if name == "fill-parent-flow" => {
                let weight = args.iter().find_map(ComponentValue::as_number).unwrap_or(1.0);
                Length {
                    value: weight.max(0.0),
                    unit: LengthUnit::Fill,
                }
            }
            _ => Length::ZERO,
        }
    }

    /// Parse the first component of a value list.
    pub fn parse(values: &[ComponentValue]) -> Option<Length> {
        values.first().map(Length::from_component)
    }
}

/// RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse a hex color string (`rgb`, `rgba`, `rrggbb` or `rrggbbaa`)
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if !hex.is_ascii() {
            return None;
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match hex.len() {
            3 | 4 => {
                let digit = |i: usize| channel(&hex[i..i + 1].repeat(2));
                let a = if hex.len() == 4 { digit(3)? } else { 255 };
                Some(Color::rgba(digit(0)?, digit(1)?, digit(2)?, a))
            }
            6 | 8 => {
                let a = if hex.len() == 8 { channel(&hex[6..8])? } else { 255 };
                Some(Color::rgba(
                    channel(&hex[0..2])?,
                    channel(&hex[2..4])?,
                    channel(&hex[4..6])?,
                    a,
                ))
            }
            _ => None,
        }
    }

    /// Parse named colors
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "black" => Some(Color::BLACK),
            "white" => Some(Color::WHITE),
            "red" => Some(Color::rgb(255, 0, 0)),
            "green" => Some(Color::rgb(0, 128, 0)),
            "lime" => Some(Color::rgb(0, 255, 0)),
            "blue" => Some(Color::rgb(0, 0, 255)),
            "yellow" => Some(Color::rgb(255, 255, 0)),
            "cyan" => Some(Color::rgb(0, 255, 255)),
            "magenta" => Some(Color::rgb(255, 0, 255)),
            "gray" | "grey" => Some(Color::rgb(128, 128, 128)),
            "silver" => Some(Color::rgb(192, 192, 192)),
            "orange" => Some(Color::rgb(255, 165, 0)),
            "gold" => Some(Color::rgb(255, 215, 0)),
            "purple" => Some(Color::rgb(128, 0, 128)),
            "pink" => Some(Color::rgb(255, 192, 203)),
            "transparent" | "none" => Some(Color::TRANSPARENT),
            _ => None,
        }
    }

    /// Parse a color from the first value of a declaration
    pub fn parse(values: &[ComponentValue]) -> Option<Self> {
        Self::from_component(values.first()?)
    }

    pub fn from_component(value: &ComponentValue) -> Option<Self> {
        match value {
            ComponentValue::Ident(name) => Color::from_name(name),
            ComponentValue::Hash(hex) => Color::from_hex(hex),
            ComponentValue::Function(name, args) if name == "rgb" || name == "rgba" => {
                Self::from_rgb_args(args)
            }
            _ => None,
        }
    }

    fn from_rgb_args(args: &[ComponentValue]) -> Option<Self> {
        let parts: Vec<&ComponentValue> = args
            .iter()
            .filter(|v| !matches!(v, ComponentValue::Comma | ComponentValue::Delim('/')))
            .collect();
        if parts.len() < 3 {
            return None;
        }
        let component = |v: &ComponentValue| match v {
            ComponentValue::Number(n) => Some(n.clamp(0.0, 255.0).round() as u8),
            ComponentValue::Percentage(p) => Some((p / 100.0 * 255.0).clamp(0.0, 255.0).round() as u8),
            _ => None,
        };
        let alpha = match parts.get(3) {
            None => 255,
            Some(ComponentValue::Number(n)) => (n.clamp(0.0, 1.0) * 255.0).round() as u8,
            Some(ComponentValue::Percentage(p)) => (p / 100.0 * 255.0).clamp(0.0, 255.0).round() as u8,
            Some(_) => return None,
        };
        Some(Color::rgba(
            component(parts[0])?,
            component(parts[1])?,
            component(parts[2])?,
            alpha,
        ))
    }

    /// Scale alpha by an opacity factor in 0..=1
    pub fn with_opacity(self, opacity: f32) -> Self {
        let a = (self.a as f32 * opacity.clamp(0.0, 1.0)).round() as u8;
        Self { a, ..self }
    }

    /// Linearly interpolate between two colors
    pub fn lerp(self, to: Color, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round().clamp(0.0, 255.0) as u8;
        Color {
            r: mix(self.r, to.r),
            g: mix(self.g, to.g),
            b: mix(self.b, to.b),
            a: mix(self.a, to.a),
        }
    }
}

/// Parse a duration in seconds (`0.2s`, `150ms`, bare numbers are seconds).
pub fn parse_duration(value: &ComponentValue) -> Option<f32> {
    match value {
        ComponentValue::Dimension(v, unit) if unit == "s" => Some(*v),
        ComponentValue::Dimension(v, unit) if unit == "ms" => Some(*v / 1000.0),
        ComponentValue::Number(v) => Some(*v),
        _ => None,
    }
    .map(|d| d.max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Size {
        Size::new(1920.0, 1080.0)
    }

    #[test]
    fn test_length_resolution() {
        assert_eq!(Length::px(12.0).resolve(100.0, viewport()), Some(12.0));
        assert_eq!(Length::percent(25.0).resolve(200.0, viewport()), Some(50.0));
        assert_eq!(Length::vw(10.0).resolve(0.0, viewport()), Some(192.0));
        assert_eq!(Length::vh(50.0).resolve(0.0, viewport()), Some(540.0));
        assert_eq!(Length::fill().resolve(300.0, viewport()), Some(300.0));
        assert_eq!(Length::fit_content().resolve(300.0, viewport()), None);
        assert_eq!(Length::AUTO.resolve(300.0, viewport()), None);
    }

    #[test]
    fn test_length_keywords() {
        let ident = |s: &str| ComponentValue::Ident(s.to_string());
        assert!(Length::from_component(&ident("fill-parent-flow")).is_fill());
        assert!(Length::from_component(&ComponentValue::Percentage(100.0)).is_fill());
        assert_eq!(
            Length::from_component(&ident("fit-children")).unit,
            LengthUnit::FitContent
        );
        assert_eq!(Length::from_component(&ident("auto")).unit, LengthUnit::Auto);
    }

    #[test]
    fn test_malformed_length_defaults_to_pixels() {
        let unknown_unit = ComponentValue::Dimension(12.0, "abc".to_string());
        assert_eq!(Length::from_component(&unknown_unit), Length::px(12.0));
        let garbage = ComponentValue::Ident("wide".to_string());
        assert_eq!(Length::from_component(&garbage), Length::ZERO);
        assert_eq!(Length::from_component(&ComponentValue::Number(7.0)), Length::px(7.0));
    }

    #[test]
    fn test_fill_weight() {
        let weighted = ComponentValue::Function(
            "fill-parent-flow".to_string(),
            vec![ComponentValue::Number(2.0)],
        );
        let len = Length::from_component(&weighted);
        assert!(len.is_fill());
        assert_eq!(len.value, 2.0);
    }

    #[test]
    fn test_hex_colors() {
        assert_eq!(Color::from_hex("#ff0000"), Some(Color::rgb(255, 0, 0)));
        assert_eq!(Color::from_hex("#00ff0080"), Some(Color::rgba(0, 255, 0, 128)));
        assert_eq!(Color::from_hex("#fff"), Some(Color::WHITE));
        assert_eq!(Color::from_hex("#12345"), None);
        assert_eq!(Color::from_hex("#zzzzzz"), None);
    }

    #[test]
    fn test_rgba_function() {
        let args = vec![
            ComponentValue::Number(10.0),
            ComponentValue::Comma,
            ComponentValue::Number(20.0),
            ComponentValue::Comma,
            ComponentValue::Number(30.0),
            ComponentValue::Comma,
            ComponentValue::Number(0.5),
        ];
        let color = Color::from_component(&ComponentValue::Function("rgba".to_string(), args));
        assert_eq!(color, Some(Color::rgba(10, 20, 30, 128)));
    }

    #[test]
    fn test_color_lerp() {
        let mid = Color::BLACK.lerp(Color::WHITE, 0.5);
        assert_eq!(mid, Color::rgb(128, 128, 128));
        assert_eq!(Color::BLACK.lerp(Color::WHITE, 2.0), Color::WHITE);
    }

    #[test]
    fn test_durations() {
        assert_eq!(parse_duration(&ComponentValue::Dimension(0.25, "s".into())), Some(0.25));
        assert_eq!(parse_duration(&ComponentValue::Dimension(150.0, "ms".into())), Some(0.15));
        assert_eq!(parse_duration(&ComponentValue::Ident("fast".into())), None);
    }
}
