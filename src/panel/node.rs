//! Panel nodes and their kind-specific payloads

use std::collections::HashMap;

use crate::animation::Animation;
use crate::css::StyleProperties;
use crate::layout::Rect;

use super::{DirtyFlags, PanelId, PanelState};

/// Widget payload. Behaviour differences between widgets dispatch on this
/// tag rather than on a type hierarchy.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PanelKind {
    #[default]
    Panel,
    Label {
        text: String,
    },
    Button {
        label: String,
    },
    Image {
        source: String,
    },
    TextEntry {
        text: String,
        max_chars: Option<usize>,
    },
}

impl PanelKind {
    pub fn label(text: impl Into<String>) -> Self {
        PanelKind::Label { text: text.into() }
    }

    pub fn button(label: impl Into<String>) -> Self {
        PanelKind::Button {
            label: label.into(),
        }
    }

    pub fn image(source: impl Into<String>) -> Self {
        PanelKind::Image {
            source: source.into(),
        }
    }

    pub fn text_entry(max_chars: Option<usize>) -> Self {
        PanelKind::TextEntry {
            text: String::new(),
            max_chars,
        }
    }

    /// Element name used by selectors when no type tag is set
    pub fn element_name(&self) -> &'static str {
        match self {
            PanelKind::Panel => "Panel",
            PanelKind::Label { .. } => "Label",
            PanelKind::Button { .. } => "Button",
            PanelKind::Image { .. } => "Image",
            PanelKind::TextEntry { .. } => "TextEntry",
        }
    }

    /// Displayed text of text-bearing kinds
    pub fn text(&self) -> Option<&str> {
        match self {
            PanelKind::Label { text } | PanelKind::TextEntry { text, .. } => Some(text),
            PanelKind::Button { label } => Some(label),
            PanelKind::Panel | PanelKind::Image { .. } => None,
        }
    }

    /// Replace the displayed text. Returns `false` for kinds without text.
    /// Text entries truncate to their character limit.
    pub fn set_text(&mut self, value: &str) -> bool {
        match self {
            PanelKind::Label { text } => *text = value.to_string(),
            PanelKind::Button { label } => *label = value.to_string(),
            PanelKind::TextEntry { text, max_chars } => {
                *text = match max_chars {
                    Some(limit) => value.chars().take(*limit).collect(),
                    None => value.to_string(),
                };
            }
            PanelKind::Panel | PanelKind::Image { .. } => return false,
        }
        true
    }

    pub fn image_source(&self) -> Option<&str> {
        match self {
            PanelKind::Image { source } => Some(source),
            _ => None,
        }
    }

    pub fn accepts_input_by_default(&self) -> bool {
        matches!(self, PanelKind::Button { .. } | PanelKind::TextEntry { .. })
    }

    pub fn is_focusable(&self) -> bool {
        matches!(self, PanelKind::Button { .. } | PanelKind::TextEntry { .. })
    }
}

/// A node of the panel tree
#[derive(Debug, Clone)]
pub struct Panel {
    pub(crate) id: String,
    pub(crate) type_tag: Option<String>,
    pub(crate) kind: PanelKind,
    pub(crate) classes: Vec<String>,
    pub(crate) attributes: HashMap<String, String>,
    pub(crate) inline_style: StyleProperties,
    /// Rules + inline + inherited, before animation overrides
    pub(crate) base_style: StyleProperties,
    pub(crate) computed_style: StyleProperties,
    pub(crate) styled: bool,
    pub(crate) state: PanelState,
    pub(crate) dirty: DirtyFlags,
    pub(crate) bounds: Rect,
    pub(crate) content_bounds: Rect,
    pub(crate) parent: Option<PanelId>,
    pub(crate) children: Vec<PanelId>,
    pub(crate) animations: Vec<Animation>,
    /// Name of the descriptor-driven animation last started
    pub(crate) running_animation: Option<String>,
}

impl Panel {
    pub fn new(kind: PanelKind) -> Self {
        let mut state = PanelState::ENABLED | PanelState::VISIBLE;
        if kind.accepts_input_by_default() {
            state |= PanelState::ACCEPTS_INPUT;
        }
        Self {
            id: String::new(),
            type_tag: None,
            kind,
            classes: Vec::new(),
            attributes: HashMap::new(),
            inline_style: StyleProperties::new(),
            base_style: StyleProperties::new(),
            computed_style: StyleProperties::new(),
            styled: false,
            state,
            dirty: DirtyFlags::all(),
            bounds: Rect::empty(),
            content_bounds: Rect::empty(),
            parent: None,
            children: Vec::new(),
            animations: Vec::new(),
            running_animation: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        let class = class.into();
        if !self.classes.contains(&class) {
            self.classes.push(class);
        }
        self
    }

    pub fn with_type_tag(mut self, tag: impl Into<String>) -> Self {
        self.type_tag = Some(tag.into());
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_inline_style(mut self, style: StyleProperties) -> Self {
        self.inline_style = style;
        self
    }

    pub fn with_style(self, text: &str) -> Self {
        self.with_inline_style(StyleProperties::parse_inline(text))
    }

    pub fn accepting_input(mut self, accepts: bool) -> Self {
        self.state.set(PanelState::ACCEPTS_INPUT, accepts);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn type_tag(&self) -> Option<&str> {
        self.type_tag.as_deref()
    }

    /// Type tag if set, else the kind's element name
    pub fn element_name(&self) -> &str {
        self.type_tag
            .as_deref()
            .unwrap_or_else(|| self.kind.element_name())
    }

    pub fn kind(&self) -> &PanelKind {
        &self.kind
    }

    pub fn text(&self) -> Option<&str> {
        self.kind.text()
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn attributes(&self) -> &HashMap<String, String> {
        &self.attributes
    }

    pub fn inline_style(&self) -> &StyleProperties {
        &self.inline_style
    }

    /// Last computed style. Stale while the style dirty flag is set.
    pub fn computed_style(&self) -> &StyleProperties {
        &self.computed_style
    }

    pub fn state(&self) -> PanelState {
        self.state
    }

    pub fn is_visible(&self) -> bool {
        self.state.contains(PanelState::VISIBLE)
    }

    pub fn is_enabled(&self) -> bool {
        self.state.contains(PanelState::ENABLED)
    }

    pub fn accepts_input(&self) -> bool {
        self.state.contains(PanelState::ACCEPTS_INPUT)
    }

    pub fn is_focusable(&self) -> bool {
        self.kind.is_focusable() && self.is_enabled() && self.is_visible()
    }

    /// Last laid-out bounds; may be stale for detached panels
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn content_bounds(&self) -> Rect {
        self.content_bounds
    }

    pub fn parent(&self) -> Option<PanelId> {
        self.parent
    }

    pub fn children(&self) -> &[PanelId] {
        &self.children
    }

    pub fn animations(&self) -> &[Animation] {
        &self.animations
    }

    pub fn is_style_dirty(&self) -> bool {
        self.dirty.contains(DirtyFlags::STYLE)
    }

    pub fn is_layout_dirty(&self) -> bool {
        self.dirty.contains(DirtyFlags::LAYOUT)
    }
}

impl Default for Panel {
    fn default() -> Self {
        Self::new(PanelKind::Panel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_defaults() {
        let button = Panel::new(PanelKind::button("OK"));
        assert!(button.accepts_input());
        assert!(button.is_focusable());
        assert_eq!(button.element_name(), "Button");
        assert_eq!(button.text(), Some("OK"));

        let panel = Panel::default();
        assert!(!panel.accepts_input());
        assert!(panel.is_visible() && panel.is_enabled());
    }

    #[test]
    fn test_type_tag_overrides_element_name() {
        let panel = Panel::new(PanelKind::Panel).with_type_tag("HeroCard");
        assert_eq!(panel.element_name(), "HeroCard");
    }

    #[test]
    fn test_text_entry_truncates() {
        let mut kind = PanelKind::text_entry(Some(3));
        assert!(kind.set_text("abcdef"));
        assert_eq!(kind.text(), Some("abc"));
        assert!(!PanelKind::Panel.set_text("x"));
    }

    #[test]
    fn test_classes_are_a_set() {
        let panel = Panel::default().with_class("a").with_class("a").with_class("b");
        assert_eq!(panel.classes().len(), 2);
        assert!(panel.has_class("b"));
    }
}
