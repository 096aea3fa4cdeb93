//! The sparse style property record.
//!
//! Every field is `Option`: `None` means "not specified here", which is what
//! lets the cascade tell an unset property apart from one explicitly reset.

use super::value::{parse_duration, split_commas, Color, ComponentValue, Length};
use crate::animation::{AnimatedProperty, IterationCount, TimingFunction};

/// How a panel arranges its children
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Display {
    #[default]
    Flow,
    Flex,
    None,
}

/// Stacking axis for flow layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlowChildren {
    /// Children are placed freely at the content origin
    #[default]
    None,
    Down,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlexDirection {
    #[default]
    Row,
    RowReverse,
    Column,
    ColumnReverse,
}

impl FlexDirection {
    pub fn is_row(self) -> bool {
        matches!(self, FlexDirection::Row | FlexDirection::RowReverse)
    }

    pub fn is_reverse(self) -> bool {
        matches!(self, FlexDirection::RowReverse | FlexDirection::ColumnReverse)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlexWrap {
    #[default]
    NoWrap,
    Wrap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JustifyContent {
    #[default]
    Start,
    Center,
    End,
    SpaceBetween,
    SpaceAround,
    SpaceEvenly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlignItems {
    Start,
    Center,
    End,
    #[default]
    Stretch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlignContent {
    Start,
    Center,
    End,
    SpaceBetween,
    SpaceAround,
    #[default]
    Stretch,
}

/// Alignment override against the parent rect (`horizontal-align`, `vertical-align`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Start,
    Center,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Overflow {
    #[default]
    Visible,
    Clip,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineHeight {
    /// Multiple of the font size
    Multiplier(f32),
    Pixels(f32),
}

impl LineHeight {
    pub fn resolve(self, font_size: f32) -> f32 {
        match self {
            LineHeight::Multiplier(m) => m * font_size,
            LineHeight::Pixels(px) => px,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GradientDirection {
    #[default]
    Vertical,
    Horizontal,
}

/// Two-stop linear gradient
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gradient {
    pub direction: GradientDirection,
    pub from: Color,
    pub to: Color,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxShadow {
    pub offset_x: f32,
    pub offset_y: f32,
    pub blur: f32,
    pub color: Color,
}

/// `transition: <property> <duration> [<timing>] [<delay>]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionSpec {
    pub property: AnimatedProperty,
    pub duration: f32,
    pub delay: f32,
    pub timing: TimingFunction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnimationDirection {
    #[default]
    Normal,
    Alternate,
}

/// Sparse set of style properties
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StyleProperties {
    // Geometry
    pub width: Option<Length>,
    pub height: Option<Length>,
    pub min_width: Option<Length>,
    pub min_height: Option<Length>,
    pub max_width: Option<Length>,
    pub max_height: Option<Length>,
    pub margin_top: Option<Length>,
    pub margin_right: Option<Length>,
    pub margin_bottom: Option<Length>,
    pub margin_left: Option<Length>,
    pub padding_top: Option<Length>,
    pub padding_right: Option<Length>,
    pub padding_bottom: Option<Length>,
    pub padding_left: Option<Length>,
    pub x: Option<Length>,
    pub y: Option<Length>,
    pub horizontal_align: Option<Align>,
    pub vertical_align: Option<Align>,

    // Paint
    pub background_color: Option<Color>,
    pub background_gradient: Option<Gradient>,
    pub border_width: Option<f32>,
    pub border_color: Option<Color>,
    pub border_radius: Option<f32>,
    pub box_shadow: Option<BoxShadow>,
    pub opacity: Option<f32>,
    pub overflow: Option<Overflow>,

    // Text (inheritable)
    pub color: Option<Color>,
    pub font_size: Option<f32>,
    pub font_family: Option<String>,
    pub font_weight: Option<u16>,
    pub font_style: Option<FontStyle>,
    pub text_align: Option<TextAlign>,
    pub letter_spacing: Option<f32>,
    pub line_height: Option<LineHeight>,

    // Layout mode
    pub display: Option<Display>,
    pub flow_children: Option<FlowChildren>,
    pub flex_direction: Option<FlexDirection>,
    pub flex_wrap: Option<FlexWrap>,
    pub flex_grow: Option<f32>,
    pub flex_shrink: Option<f32>,
    pub flex_basis: Option<Length>,
    pub justify_content: Option<JustifyContent>,
    pub align_items: Option<AlignItems>,
    pub align_self: Option<AlignItems>,
    pub align_content: Option<AlignContent>,
    pub gap: Option<Length>,

    // Transitions and animation descriptors
    pub transitions: Option<Vec<TransitionSpec>>,
    pub animation_name: Option<String>,
    pub animation_duration: Option<f32>,
    pub animation_iteration_count: Option<IterationCount>,
    pub animation_direction: Option<AnimationDirection>,
}

macro_rules! merge_fields {
    ($dst:expr, $src:expr, $($field:ident),* $(,)?) => {
        $(
            if $src.$field.is_some() {
                $dst.$field = $src.$field.clone();
            }
        )*
    };
}

macro_rules! inherit_fields {
    ($dst:expr, $parent:expr, $($field:ident),* $(,)?) => {
        $(
            if $dst.$field.is_none() {
                $dst.$field = $parent.$field.clone();
            }
        )*
    };
}

/// Default font size when nothing in the ancestor chain sets one
pub const DEFAULT_FONT_SIZE: f32 = 16.0;

/// Text color when nothing in the ancestor chain sets one
pub const DEFAULT_TEXT_COLOR: Color = Color::WHITE;

impl StyleProperties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse inline style text (`"width: 10px; color: red"`).
    pub fn parse_inline(text: &str) -> Self {
        let mut props = StyleProperties::new();
        for declaration in super::parser::parse_declaration_list(text) {
            props.apply_declaration(&declaration.name, &declaration.value);
        }
        props
    }

    /// True when no property is set
    pub fn is_empty(&self) -> bool {
        *self == StyleProperties::default()
    }

    /// Merge every set property of `other` over `self` (later wins).
    pub fn merge_from(&mut self, other: &StyleProperties) {
        merge_fields!(
            self, other,
            width, height, min_width, min_height, max_width, max_height,
            margin_top, margin_right, margin_bottom, margin_left,
            padding_top, padding_right, padding_bottom, padding_left,
            x, y, horizontal_align, vertical_align,
            background_color, background_gradient, border_width, border_color,
            border_radius, box_shadow, opacity, overflow,
            color, font_size, font_family, font_weight, font_style,
            text_align, letter_spacing, line_height,
            display, flow_children, flex_direction, flex_wrap, flex_grow,
            flex_shrink, flex_basis, justify_content, align_items, align_self,
            align_content, gap,
            transitions, animation_name, animation_duration,
            animation_iteration_count, animation_direction,
        );
    }

    /// Fill unset inheritable text properties from the parent's computed style.
    pub fn inherit_from(&mut self, parent: &StyleProperties) {
        inherit_fields!(
            self, parent,
            color, font_size, font_family, font_weight, font_style,
            text_align, letter_spacing, line_height,
        );
    }

    /// Apply one declaration. Returns `false` for unknown properties and for
    /// values that could not be parsed; both leave the record untouched.
    pub fn apply_declaration(&mut self, name: &str, values: &[ComponentValue]) -> bool {
        if values.is_empty() {
            return false;
        }
        let ident = values[0].as_ident();
        let ident = ident.as_deref();
        let length = || Length::parse(values);
        let number = || values[0].as_number();

        macro_rules! set {
            ($field:ident, $value:expr) => {{
                match $value {
                    Some(v) => {
                        self.$field = Some(v);
                        true
                    }
                    None => false,
                }
            }};
        }

        match name {
            "width" => set!(width, length()),
            "height" => set!(height, length()),
            "min-width" => set!(min_width, length()),
            "min-height" => set!(min_height, length()),
            "max-width" => set!(max_width, length()),
            "max-height" => set!(max_height, length()),
            "margin" => self.apply_edges(values, EdgeTarget::Margin),
            "margin-top" => set!(margin_top, length()),
            "margin-right" => set!(margin_right, length()),
            "margin-bottom" => set!(margin_bottom, length()),
            "margin-left" => set!(margin_left, length()),
            "padding" => self.apply_edges(values, EdgeTarget::Padding),
            "padding-top" => set!(padding_top, length()),
            "padding-right" => set!(padding_right, length()),
            "padding-bottom" => set!(padding_bottom, length()),
            "padding-left" => set!(padding_left, length()),
            "x" => set!(x, length()),
            "y" => set!(y, length()),
            "horizontal-align" => set!(
                horizontal_align,
                match ident {
                    Some("left") | Some("start") => Some(Align::Start),
                    Some("center") | Some("middle") => Some(Align::Center),
                    Some("right") | Some("end") => Some(Align::End),
                    _ => None,
                }
            ),
            "vertical-align" => set!(
                vertical_align,
                match ident {
                    Some("top") | Some("start") => Some(Align::Start),
                    Some("center") | Some("middle") => Some(Align::Center),
                    Some("bottom") | Some("end") => Some(Align::End),
                    _ => None,
                }
            ),

            "background-color" => set!(background_color, Color::parse(values)),
            "background" | "background-image" => self.apply_background(values),
            "border" => self.apply_border(values),
            "border-width" => set!(border_width, number().map(|w| w.max(0.0))),
            "border-color" => set!(border_color, Color::parse(values)),
            "border-radius" => set!(border_radius, number().map(|r| r.max(0.0))),
            "box-shadow" => set!(box_shadow, parse_box_shadow(values)),
            "opacity" => set!(
                opacity,
                match &values[0] {
                    ComponentValue::Percentage(p) => Some(p / 100.0),
                    other => other.as_number(),
                }
                .map(|o| o.clamp(0.0, 1.0))
            ),
            "overflow" => set!(
                overflow,
                match ident {
                    Some("visible") => Some(Overflow::Visible),
                    Some("clip") | Some("hidden") | Some("squish") => Some(Overflow::Clip),
                    _ => None,
                }
            ),

            "color" => set!(color, Color::parse(values)),
            "font-size" => set!(font_size, number().map(|s| s.max(0.0))),
            "font-family" => set!(font_family, parse_font_family(values)),
            "font-weight" => set!(
                font_weight,
                match (ident, &values[0]) {
                    (Some("normal"), _) => Some(400),
                    (Some("bold"), _) => Some(700),
                    (Some("light"), _) => Some(300),
                    (_, ComponentValue::Number(n)) => Some(n.clamp(1.0, 1000.0) as u16),
                    _ => None,
                }
            ),
            "font-style" => set!(
                font_style,
                match ident {
                    Some("normal") => Some(FontStyle::Normal),
                    Some("italic") | Some("oblique") => Some(FontStyle::Italic),
                    _ => None,
                }
            ),
            "text-align" => set!(
                text_align,
                match ident {
                    Some("left") | Some("start") => Some(TextAlign::Left),
                    Some("center") => Some(TextAlign::Center),
                    Some("right") | Some("end") => Some(TextAlign::Right),
                    _ => None,
                }
            ),
            "letter-spacing" => set!(letter_spacing, number()),
            "line-height" => set!(
                line_height,
                match &values[0] {
                    ComponentValue::Number(n) => Some(LineHeight::Multiplier(*n)),
                    ComponentValue::Percentage(p) => Some(LineHeight::Multiplier(p / 100.0)),
                    ComponentValue::Dimension(px, _) => Some(LineHeight::Pixels(*px)),
                    _ => None,
                }
            ),

            "display" => set!(
                display,
                match ident {
                    Some("flow") | Some("block") => Some(Display::Flow),
                    Some("flex") => Some(Display::Flex),
                    Some("none") => Some(Display::None),
                    _ => None,
                }
            ),
            "flow-children" => set!(
                flow_children,
                match ident {
                    Some("none") => Some(FlowChildren::None),
                    Some("down") => Some(FlowChildren::Down),
                    Some("right") => Some(FlowChildren::Right),
                    _ => None,
                }
            ),
            "flex-direction" => set!(
                flex_direction,
                match ident {
                    Some("row") => Some(FlexDirection::Row),
                    Some("row-reverse") => Some(FlexDirection::RowReverse),
                    Some("column") => Some(FlexDirection::Column),
                    Some("column-reverse") => Some(FlexDirection::ColumnReverse),
                    _ => None,
                }
            ),
            "flex-wrap" => set!(
                flex_wrap,
                match ident {
                    Some("nowrap") => Some(FlexWrap::NoWrap),
                    Some("wrap") => Some(FlexWrap::Wrap),
                    _ => None,
                }
            ),
            "flex-grow" => set!(flex_grow, number().map(|g| g.max(0.0))),
            "flex-shrink" => set!(flex_shrink, number().map(|s| s.max(0.0))),
            "flex-basis" => set!(flex_basis, length()),
            "flex" => self.apply_flex(values),
            "justify-content" => set!(
                justify_content,
                match ident {
                    Some("start") | Some("flex-start") => Some(JustifyContent::Start),
                    Some("center") => Some(JustifyContent::Center),
                    Some("end") | Some("flex-end") => Some(JustifyContent::End),
                    Some("space-between") => Some(JustifyContent::SpaceBetween),
                    Some("space-around") => Some(JustifyContent::SpaceAround),
                    Some("space-evenly") => Some(JustifyContent::SpaceEvenly),
                    _ => None,
                }
            ),
            "align-items" => set!(align_items, parse_align_items(ident)),
            "align-self" => set!(align_self, parse_align_items(ident)),
            "align-content" => set!(
                align_content,
                match ident {
                    Some("start") | Some("flex-start") => Some(AlignContent::Start),
                    Some("center") => Some(AlignContent::Center),
                    Some("end") | Some("flex-end") => Some(AlignContent::End),
                    Some("space-between") => Some(AlignContent::SpaceBetween),
                    Some("space-around") => Some(AlignContent::SpaceAround),
                    Some("stretch") | Some("normal") => Some(AlignContent::Stretch),
                    _ => None,
                }
            ),
            "gap" => set!(gap, length()),

            "transition" => set!(transitions, parse_transitions(values)),
            "animation" => self.apply_animation_shorthand(values),
            "animation-name" => set!(
                animation_name,
                match &values[0] {
                    ComponentValue::Ident(name) => Some(name.clone()),
                    ComponentValue::String(name) => Some(name.clone()),
                    _ => None,
                }
            ),
            "animation-duration" => set!(animation_duration, parse_duration(&values[0])),
            "animation-iteration-count" => set!(
                animation_iteration_count,
                parse_iteration_count(&values[0])
            ),
            "animation-direction" => set!(
                animation_direction,
                match ident {
                    Some("normal") => Some(AnimationDirection::Normal),
                    Some("alternate") => Some(AnimationDirection::Alternate),
                    _ => None,
                }
            ),
            _ => false,
        }
    }

    fn apply_edges(&mut self, values: &[ComponentValue], target: EdgeTarget) -> bool {
        let lengths: Vec<Length> = values.iter().map(Length::from_component).collect();
        let (top, right, bottom, left) = match lengths.as_slice() {
            [all] => (*all, *all, *all, *all),
            [vertical, horizontal] => (*vertical, *horizontal, *vertical, *horizontal),
            [top, horizontal, bottom] => (*top, *horizontal, *bottom, *horizontal),
            [top, right, bottom, left, ..] => (*top, *right, *bottom, *left),
            [] => return false,
        };
        match target {
            EdgeTarget::Margin => {
                self.margin_top = Some(top);
                self.margin_right = Some(right);
                self.margin_bottom = Some(bottom);
                self.margin_left = Some(left);
            }
            EdgeTarget::Padding => {
                self.padding_top = Some(top);
                self.padding_right = Some(right);
                self.padding_bottom = Some(bottom);
                self.padding_left = Some(left);
            }
        }
        true
    }

    fn apply_background(&mut self, values: &[ComponentValue]) -> bool {
        if let Some(gradient) = parse_gradient(&values[0]) {
            self.background_gradient = Some(gradient);
            return true;
        }
        match Color::parse(values) {
            Some(color) => {
                self.background_color = Some(color);
                true
            }
            None => false,
        }
    }

    fn apply_border(&mut self, values: &[ComponentValue]) -> bool {
        let mut applied = false;
        for value in values {
            if let Some(color) = Color::from_component(value) {
                self.border_color = Some(color);
                applied = true;
            } else if let ComponentValue::Dimension(w, _) | ComponentValue::Number(w) = value {
                self.border_width = Some(w.max(0.0));
                applied = true;
            }
        }
        applied
    }

    fn apply_flex(&mut self, values: &[ComponentValue]) -> bool {
        if values[0].as_ident().as_deref() == Some("none") {
            self.flex_grow = Some(0.0);
            self.flex_shrink = Some(0.0);
            self.flex_basis = Some(Length::AUTO);
            return true;
        }
        let numbers: Vec<f32> = values
            .iter()
            .take_while(|v| matches!(v, ComponentValue::Number(_)))
            .filter_map(ComponentValue::as_number)
            .collect();
        let Some(&grow) = numbers.first() else {
            return false;
        };
        self.flex_grow = Some(grow.max(0.0));
        self.flex_shrink = Some(numbers.get(1).copied().unwrap_or(1.0).max(0.0));
        self.flex_basis = Some(
            values
                .get(numbers.len())
                .map(Length::from_component)
                .unwrap_or(Length::ZERO),
        );
        true
    }

    fn apply_animation_shorthand(&mut self, values: &[ComponentValue]) -> bool {
        let mut applied = false;
        for value in values {
            if let Some(duration) = parse_duration(value).filter(|_| {
                matches!(value, ComponentValue::Dimension(..))
            }) {
                self.animation_duration = Some(duration);
                applied = true;
            } else if let Some(count) = parse_iteration_count(value) {
                self.animation_iteration_count = Some(count);
                applied = true;
            } else if let Some(ident) = value.as_ident() {
                match ident.as_str() {
                    "alternate" => self.animation_direction = Some(AnimationDirection::Alternate),
                    "normal" => self.animation_direction = Some(AnimationDirection::Normal),
                    _ => {
                        if let ComponentValue::Ident(name) = value {
                            self.animation_name = Some(name.clone());
                        }
                    }
                }
                applied = true;
            }
        }
        applied
    }

    // Resolved accessors with defaults

    pub fn display_mode(&self) -> Display {
        self.display.unwrap_or_default()
    }

    pub fn flow(&self) -> FlowChildren {
        self.flow_children.unwrap_or_default()
    }

    pub fn margins(&self) -> [Length; 4] {
        [
            self.margin_top.unwrap_or(Length::ZERO),
            self.margin_right.unwrap_or(Length::ZERO),
            self.margin_bottom.unwrap_or(Length::ZERO),
            self.margin_left.unwrap_or(Length::ZERO),
        ]
    }

    pub fn paddings(&self) -> [Length; 4] {
        [
            self.padding_top.unwrap_or(Length::ZERO),
            self.padding_right.unwrap_or(Length::ZERO),
            self.padding_bottom.unwrap_or(Length::ZERO),
            self.padding_left.unwrap_or(Length::ZERO),
        ]
    }

    pub fn grow(&self) -> f32 {
        self.flex_grow.unwrap_or(0.0)
    }

    pub fn shrink(&self) -> f32 {
        self.flex_shrink.unwrap_or(1.0)
    }

    pub fn resolved_opacity(&self) -> f32 {
        self.opacity.unwrap_or(1.0)
    }

    pub fn resolved_font_size(&self) -> f32 {
        self.font_size.unwrap_or(DEFAULT_FONT_SIZE)
    }

    pub fn text_color(&self) -> Color {
        self.color.unwrap_or(DEFAULT_TEXT_COLOR)
    }

    pub fn clips_overflow(&self) -> bool {
        self.overflow == Some(Overflow::Clip)
    }
}

#[derive(Clone, Copy)]
enum EdgeTarget {
    Margin,
    Padding,
}

fn parse_align_items(ident: Option<&str>) -> Option<AlignItems> {
    match ident {
        Some("start") | Some("flex-start") => Some(AlignItems::Start),
        Some("center") => Some(AlignItems::Center),
        Some("end") | Some("flex-end") => Some(AlignItems::End),
        Some("stretch") => Some(AlignItems::Stretch),
        _ => None,
    }
}

fn parse_font_family(values: &[ComponentValue]) -> Option<String> {
    let first = split_commas(values).into_iter().next()?;
    let words: Vec<String> = first
        .iter()
        .filter_map(|v| match v {
            ComponentValue::Ident(s) | ComponentValue::String(s) => Some(s.clone()),
            _ => None,
        })
        .collect();
    (!words.is_empty()).then(|| words.join(" "))
}

fn parse_gradient(value: &ComponentValue) -> Option<Gradient> {
    let ComponentValue::Function(name, args) = value else {
        return None;
    };
    if name != "linear-gradient" && name != "gradient" {
        return None;
    }
    let mut direction = GradientDirection::Vertical;
    let mut colors = Vec::new();
    for group in split_commas(args) {
        if group.first().and_then(ComponentValue::as_ident).as_deref() == Some("to") {
            direction = match group.get(1).and_then(ComponentValue::as_ident).as_deref() {
                Some("left") | Some("right") => GradientDirection::Horizontal,
                _ => GradientDirection::Vertical,
            };
        } else if let Some(color) = group.first().and_then(Color::from_component) {
            colors.push(color);
        }
    }
    match colors.as_slice() {
        [from, .., to] => Some(Gradient {
            direction,
            from: *from,
            to: *to,
        }),
        _ => None,
    }
}

fn parse_box_shadow(values: &[ComponentValue]) -> Option<BoxShadow> {
    let numbers: Vec<f32> = values
        .iter()
        .filter(|v| matches!(v, ComponentValue::Dimension(..) | ComponentValue::Number(_)))
        .filter_map(ComponentValue::as_number)
        .collect();
    let color = values
        .iter()
        .find_map(Color::from_component)
        .unwrap_or(Color::rgba(0, 0, 0, 128));
    if numbers.len() < 2 {
        return None;
    }
    Some(BoxShadow {
        offset_x: numbers[0],
        offset_y: numbers[1],
        blur: numbers.get(2).copied().unwrap_or(0.0).max(0.0),
        color,
    })
}

fn parse_iteration_count(value: &ComponentValue) -> Option<IterationCount> {
    match value {
        ComponentValue::Ident(name) if name.eq_ignore_ascii_case("infinite") => {
            Some(IterationCount::Infinite)
        }
        ComponentValue::Number(n) if *n >= 1.0 => Some(IterationCount::Finite(*n as u32)),
        _ => None,
    }
}

fn parse_transitions(values: &[ComponentValue]) -> Option<Vec<TransitionSpec>> {
    let specs: Vec<TransitionSpec> = split_commas(values)
        .into_iter()
        .filter_map(|group| {
            let property = group
                .first()
                .and_then(ComponentValue::as_ident)
                .and_then(|name| AnimatedProperty::from_name(&name))?;
            let mut durations = group[1..].iter().filter_map(parse_duration);
            let duration = durations.next()?;
            let delay = durations.next().unwrap_or(0.0);
            let timing = group[1..]
                .iter()
                .filter_map(ComponentValue::as_ident)
                .find_map(|name| TimingFunction::from_name(&name))
                .unwrap_or_default();
            Some(TransitionSpec {
                property,
                duration,
                delay,
                timing,
            })
        })
        .collect();
    (!specs.is_empty()).then_some(specs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_merge_later_wins_and_keeps_unset() {
        let mut base = StyleProperties::parse_inline("color: white; width: 10px;");
        let over = StyleProperties::parse_inline("color: red;");
        base.merge_from(&over);
        assert_eq!(base.color, Some(Color::rgb(255, 0, 0)));
        assert_eq!(base.width, Some(Length::px(10.0)));
    }

    #[test]
    fn test_inherit_only_text_properties() {
        let parent = StyleProperties::parse_inline(
            "color: red; font-size: 20px; background-color: blue; width: 50px;",
        );
        let mut child = StyleProperties::parse_inline("font-size: 12px;");
        child.inherit_from(&parent);
        assert_eq!(child.color, Some(Color::rgb(255, 0, 0)));
        assert_eq!(child.font_size, Some(12.0));
        assert_eq!(child.background_color, None);
        assert_eq!(child.width, None);
    }

    #[test]
    fn test_edge_shorthands() {
        let props = StyleProperties::parse_inline("margin: 1px 2px; padding: 1px 2px 3px 4px;");
        assert_eq!(props.margins(), [Length::px(1.0), Length::px(2.0), Length::px(1.0), Length::px(2.0)]);
        assert_eq!(props.paddings(), [Length::px(1.0), Length::px(2.0), Length::px(3.0), Length::px(4.0)]);
    }

    #[test]
    fn test_flex_shorthand() {
        let props = StyleProperties::parse_inline("flex: 2;");
        assert_eq!(props.flex_grow, Some(2.0));
        assert_eq!(props.flex_shrink, Some(1.0));
        assert_eq!(props.flex_basis, Some(Length::ZERO));

        let none = StyleProperties::parse_inline("flex: none;");
        assert_eq!(none.flex_grow, Some(0.0));
        assert_eq!(none.flex_shrink, Some(0.0));
    }

    #[test]
    fn test_unknown_and_bad_values_are_ignored() {
        let props = StyleProperties::parse_inline("glow-strength: 3; display: sideways; opacity: 0.5;");
        assert_eq!(props.display, None);
        assert_eq!(props.opacity, Some(0.5));
    }

    #[test]
    fn test_gradient_and_border() {
        let props = StyleProperties::parse_inline(
            "background: linear-gradient(to right, #000000, #ffffff); border: 2px solid red;",
        );
        assert_eq!(
            props.background_gradient,
            Some(Gradient {
                direction: GradientDirection::Horizontal,
                from: Color::BLACK,
                to: Color::WHITE,
            })
        );
        assert_eq!(props.border_width, Some(2.0));
        assert_eq!(props.border_color, Some(Color::rgb(255, 0, 0)));
    }

    #[test]
    fn test_transition_list() {
        let props = StyleProperties::parse_inline(
            "transition: background-color 0.2s ease-in, opacity 150ms;",
        );
        let specs = props.transitions.unwrap_or_default();
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].property, AnimatedProperty::BackgroundColor);
        assert_eq!(specs[0].timing, TimingFunction::EaseIn);
        assert!((specs[1].duration - 0.15).abs() < 1e-6);
    }

    #[test]
    fn test_animation_shorthand() {
        let props = StyleProperties::parse_inline("animation: pulse 2s infinite alternate;");
        assert_eq!(props.animation_name.as_deref(), Some("pulse"));
        assert_eq!(props.animation_duration, Some(2.0));
        assert_eq!(props.animation_iteration_count, Some(IterationCount::Infinite));
        assert_eq!(props.animation_direction, Some(AnimationDirection::Alternate));
    }
}
