//! Input routing for the panel tree
//!
//! The host feeds raw [`InputEvent`]s; the dispatcher turns them into
//! panel-level [`Event`]s and offers each delivery to an [`EventSink`].
//! No closures are stored on panels.

mod dispatcher;

pub use dispatcher::{EventDispatcher, hit_test};

use std::collections::VecDeque;

use crate::panel::{PanelId, PanelTree};

/// Mouse button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
    Other(u16),
}

/// Raw input as delivered by the host, once per occurrence
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerMove { x: f32, y: f32 },
    PointerDown { x: f32, y: f32, button: MouseButton },
    PointerUp { x: f32, y: f32, button: MouseButton },
    Wheel { x: f32, y: f32, delta: f32 },
    KeyDown { code: String },
    KeyUp { code: String },
    TextInput { text: String },
}

impl InputEvent {
    pub fn pointer_move(x: f32, y: f32) -> Self {
        InputEvent::PointerMove { x, y }
    }

    pub fn pointer_down(x: f32, y: f32) -> Self {
        InputEvent::PointerDown {
            x,
            y,
            button: MouseButton::Left,
        }
    }

    pub fn pointer_up(x: f32, y: f32) -> Self {
        InputEvent::PointerUp {
            x,
            y,
            button: MouseButton::Left,
        }
    }

    pub fn key_down(code: &str) -> Self {
        InputEvent::KeyDown {
            code: code.to_string(),
        }
    }

    pub fn text(text: &str) -> Self {
        InputEvent::TextInput {
            text: text.to_string(),
        }
    }
}

/// Panel-level event types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    MouseEnter,
    MouseLeave,
    MouseDown,
    MouseUp,
    Click,
    Wheel,
    Focus,
    Blur,
    KeyDown,
    KeyUp,
    TextInput,
}

impl EventType {
    /// Enter/leave and focus/blur are delivered to their panel only
    pub fn bubbles(self) -> bool {
        !matches!(
            self,
            EventType::MouseEnter | EventType::MouseLeave | EventType::Focus | EventType::Blur
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            EventType::MouseEnter => "mouseenter",
            EventType::MouseLeave => "mouseleave",
            EventType::MouseDown => "mousedown",
            EventType::MouseUp => "mouseup",
            EventType::Click => "click",
            EventType::Wheel => "wheel",
            EventType::Focus => "focus",
            EventType::Blur => "blur",
            EventType::KeyDown => "keydown",
            EventType::KeyUp => "keyup",
            EventType::TextInput => "textinput",
        }
    }
}

/// Event payload
#[derive(Debug, Clone, PartialEq)]
pub enum EventData {
    Pointer {
        x: f32,
        y: f32,
        button: Option<MouseButton>,
    },
    Wheel {
        x: f32,
        y: f32,
        delta: f32,
    },
    Key {
        code: String,
    },
    Text {
        text: String,
    },
    None,
}

/// A panel-level event
#[derive(Debug, Clone)]
pub struct Event {
    pub event_type: EventType,
    pub data: EventData,
    pub target: PanelId,
    pub bubbles: bool,
    pub default_prevented: bool,
    pub propagation_stopped: bool,
}

impl Event {
    /// Create a new event
    pub fn new(event_type: EventType, target: PanelId, data: EventData) -> Self {
        Self {
            event_type,
            data,
            target,
            bubbles: event_type.bubbles(),
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    /// Prevent default action
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// Stop event propagation
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }
}

/// Receives every delivery. `current` is the panel the event is being
/// offered to; it differs from `event.target` while bubbling.
pub trait EventSink {
    fn handle(&mut self, tree: &PanelTree, current: PanelId, event: &mut Event);
}

/// Sink that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn handle(&mut self, _tree: &PanelTree, _current: PanelId, _event: &mut Event) {}
}

/// A recorded delivery, drained by the host after each frame
#[derive(Debug, Clone, PartialEq)]
pub struct UiMessage {
    pub event_type: EventType,
    pub target: PanelId,
    /// The target's string id at delivery time
    pub target_id: String,
    pub current: PanelId,
    pub data: EventData,
}

/// Sink that records deliveries as [`UiMessage`]s
#[derive(Debug, Default, Clone)]
pub struct MessageLog {
    messages: Vec<UiMessage>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn messages(&self) -> &[UiMessage] {
        &self.messages
    }

    pub fn drain(&mut self) -> Vec<UiMessage> {
        std::mem::take(&mut self.messages)
    }
}

impl EventSink for MessageLog {
    fn handle(&mut self, tree: &PanelTree, current: PanelId, event: &mut Event) {
        self.messages.push(UiMessage {
            event_type: event.event_type,
            target: event.target,
            target_id: tree
                .get(event.target)
                .map(|p| p.id().to_string())
                .unwrap_or_default(),
            current,
            data: event.data.clone(),
        });
    }
}

/// FIFO of raw input waiting for the next frame
#[derive(Debug, Default, Clone)]
pub struct EventQueue {
    events: VecDeque<InputEvent>,
}

impl EventQueue {
    /// Create a new event queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Push an event to the queue
    pub fn push(&mut self, event: InputEvent) {
        self.events.push_back(event);
    }

    pub fn pop(&mut self) -> Option<InputEvent> {
        self.events.pop_front()
    }

    /// Check if queue is empty
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Get queue length
    pub fn len(&self) -> usize {
        self.events.len()
    }
}
