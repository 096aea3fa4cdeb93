//! Property tracks: what an animation writes into a computed style.

use crate::css::{Color, Length, LengthUnit, StyleProperties};

use super::timing::TimingFunction;

/// Style properties that animations and transitions can drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimatedProperty {
    Opacity,
    Color,
    BackgroundColor,
    BorderColor,
    Width,
    Height,
    X,
    Y,
    FontSize,
}

impl AnimatedProperty {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "opacity" => Some(Self::Opacity),
            "color" => Some(Self::Color),
            "background-color" => Some(Self::BackgroundColor),
            "border-color" => Some(Self::BorderColor),
            "width" => Some(Self::Width),
            "height" => Some(Self::Height),
            "x" => Some(Self::X),
            "y" => Some(Self::Y),
            "font-size" => Some(Self::FontSize),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Opacity => "opacity",
            Self::Color => "color",
            Self::BackgroundColor => "background-color",
            Self::BorderColor => "border-color",
            Self::Width => "width",
            Self::Height => "height",
            Self::X => "x",
            Self::Y => "y",
            Self::FontSize => "font-size",
        }
    }

    /// Read the displayed value of this property, falling back to the
    /// defaults the painter and layout use for unset values.
    pub fn read(self, props: &StyleProperties) -> AnimatedValue {
        match self {
            Self::Opacity => AnimatedValue::Number(props.resolved_opacity()),
            Self::Color => AnimatedValue::Color(props.text_color()),
            Self::BackgroundColor => {
                AnimatedValue::Color(props.background_color.unwrap_or(Color::TRANSPARENT))
            }
            Self::BorderColor => {
                AnimatedValue::Color(props.border_color.unwrap_or(Color::TRANSPARENT))
            }
            Self::Width => AnimatedValue::Length(props.width.unwrap_or(Length::AUTO)),
            Self::Height => AnimatedValue::Length(props.height.unwrap_or(Length::AUTO)),
            Self::X => AnimatedValue::Length(props.x.unwrap_or(Length::ZERO)),
            Self::Y => AnimatedValue::Length(props.y.unwrap_or(Length::ZERO)),
            Self::FontSize => AnimatedValue::Number(props.resolved_font_size()),
        }
    }

    /// Write a value; mismatched value kinds are ignored.
    pub fn write(self, props: &mut StyleProperties, value: AnimatedValue) {
        match (self, value) {
            (Self::Opacity, AnimatedValue::Number(n)) => props.opacity = Some(n.clamp(0.0, 1.0)),
            (Self::Color, AnimatedValue::Color(c)) => props.color = Some(c),
            (Self::BackgroundColor, AnimatedValue::Color(c)) => props.background_color = Some(c),
            (Self::BorderColor, AnimatedValue::Color(c)) => props.border_color = Some(c),
            (Self::Width, AnimatedValue::Length(l)) => props.width = Some(l),
            (Self::Height, AnimatedValue::Length(l)) => props.height = Some(l),
            (Self::X, AnimatedValue::Length(l)) => props.x = Some(l),
            (Self::Y, AnimatedValue::Length(l)) => props.y = Some(l),
            (Self::FontSize, AnimatedValue::Number(n)) => props.font_size = Some(n.max(0.0)),
            _ => {}
        }
    }
}

/// A value an animation can interpolate
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimatedValue {
    Number(f32),
    Color(Color),
    Length(Length),
}

impl AnimatedValue {
    /// Interpolate towards `to`. Lengths in different units, and mismatched
    /// kinds, switch over at the midpoint.
    pub fn interpolate(self, to: AnimatedValue, t: f32) -> AnimatedValue {
        match (self, to) {
            (AnimatedValue::Number(a), AnimatedValue::Number(b)) => {
                AnimatedValue::Number(a + (b - a) * t)
            }
            (AnimatedValue::Color(a), AnimatedValue::Color(b)) => AnimatedValue::Color(a.lerp(b, t)),
            (AnimatedValue::Length(a), AnimatedValue::Length(b))
                if a.unit == b.unit && a.unit != LengthUnit::Auto =>
            {
                AnimatedValue::Length(Length {
                    value: a.value + (b.value - a.value) * t,
                    unit: a.unit,
                })
            }
            _ => {
                if t < 0.5 {
                    self
                } else {
                    to
                }
            }
        }
    }
}

/// From/to values for one property
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropertyTrack {
    pub property: AnimatedProperty,
    pub from: AnimatedValue,
    pub to: AnimatedValue,
    pub timing: TimingFunction,
}

impl PropertyTrack {
    pub fn sample(&self, progress: f32) -> AnimatedValue {
        self.from.interpolate(self.to, self.timing.sample(progress))
    }

    pub fn apply(&self, props: &mut StyleProperties, progress: f32) {
        self.property.write(props, self.sample(progress));
    }
}
