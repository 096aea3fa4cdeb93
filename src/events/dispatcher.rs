//! Hit testing, hover/press/focus tracking and bubbling delivery

use crate::layout::participates;
use crate::panel::{PanelId, PanelState, PanelTree};

use super::{Event, EventData, EventSink, EventType, InputEvent, MouseButton};

/// Topmost input-accepting panel under the point. Children are tested
/// back-to-front before their parent; invisible subtrees are skipped and
/// clipping panels reject points outside their bounds.
pub fn hit_test(tree: &PanelTree, x: f32, y: f32) -> Option<PanelId> {
    hit(tree, tree.root(), x, y)
}

fn hit(tree: &PanelTree, id: PanelId, x: f32, y: f32) -> Option<PanelId> {
    let panel = tree.get(id)?;
    if !participates(panel) {
        return None;
    }
    let inside = panel.bounds().contains(x, y);
    if panel.computed_style.clips_overflow() && !inside {
        return None;
    }
    for &child in panel.children().iter().rev() {
        if let Some(found) = hit(tree, child, x, y) {
            return Some(found);
        }
    }
    (inside && panel.is_enabled() && panel.accepts_input()).then_some(id)
}

/// Toggle an interaction flag, logging handles the tree no longer knows
fn update_state(tree: &mut PanelTree, id: PanelId, flags: PanelState, on: bool) -> bool {
    match tree.set_state(id, flags, on) {
        Ok(()) => true,
        Err(err) => {
            log::warn!("could not set {flags:?} on {id:?}: {err}");
            false
        }
    }
}

/// Routes raw input to panels. Holds the hovered, pressed and focused
/// handles; handles whose panel left the tree are forgotten on next use.
#[derive(Debug, Default)]
pub struct EventDispatcher {
    hovered: Option<PanelId>,
    pressed: Option<(PanelId, MouseButton)>,
    focused: Option<PanelId>,
}

impl EventDispatcher {
    /// Create a new event dispatcher
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hovered(&self) -> Option<PanelId> {
        self.hovered
    }

    pub fn pressed(&self) -> Option<PanelId> {
        self.pressed.map(|(id, _)| id)
    }

    pub fn focused(&self) -> Option<PanelId> {
        self.focused
    }

    /// Route one input. Returns the number of deliveries made.
    pub fn dispatch(
        &mut self,
        tree: &mut PanelTree,
        input: &InputEvent,
        sink: &mut dyn EventSink,
    ) -> usize {
        self.forget_stale(tree);
        match input {
            InputEvent::PointerMove { x, y } => {
                let target = hit_test(tree, *x, *y);
                self.update_hover(tree, target, *x, *y, sink)
            }
            InputEvent::PointerDown { x, y, button } => self.pointer_down(tree, *x, *y, *button, sink),
            InputEvent::PointerUp { x, y, button } => self.pointer_up(tree, *x, *y, *button, sink),
            InputEvent::Wheel { x, y, delta } => match hit_test(tree, *x, *y) {
                Some(target) => {
                    let data = EventData::Wheel {
                        x: *x,
                        y: *y,
                        delta: *delta,
                    };
                    deliver(tree, &mut Event::new(EventType::Wheel, target, data), sink)
                }
                None => 0,
            },
            InputEvent::KeyDown { code } => self.key_down(tree, code, sink),
            InputEvent::KeyUp { code } => {
                let target = self.focused.unwrap_or_else(|| tree.root());
                let data = EventData::Key { code: code.clone() };
                deliver(tree, &mut Event::new(EventType::KeyUp, target, data), sink)
            }
            InputEvent::TextInput { text } => self.text_input(tree, text, sink),
        }
    }

    /// Move focus, firing blur on the old holder and focus on the new one
    pub fn set_focus(
        &mut self,
        tree: &mut PanelTree,
        target: Option<PanelId>,
        sink: &mut dyn EventSink,
    ) -> usize {
        self.forget_stale(tree);
        let target = target.filter(|&id| tree.is_attached(id));
        if target == self.focused {
            return 0;
        }

        let mut delivered = 0;
        if let Some(old) = self.focused.take() {
            update_state(tree, old, PanelState::FOCUSED, false);
            delivered += deliver(tree, &mut Event::new(EventType::Blur, old, EventData::None), sink);
        }
        if let Some(new) = target {
            update_state(tree, new, PanelState::FOCUSED, true);
            self.focused = Some(new);
            delivered += deliver(tree, &mut Event::new(EventType::Focus, new, EventData::None), sink);
        }
        delivered
    }

    /// Focus the next focusable panel in tree order, wrapping around
    pub fn focus_next(&mut self, tree: &mut PanelTree, sink: &mut dyn EventSink) -> usize {
        let candidates: Vec<PanelId> = tree
            .descendants(tree.root())
            .into_iter()
            .filter(|&id| is_focus_candidate(tree, id))
            .collect();
        if candidates.is_empty() {
            return 0;
        }
        let next = match self
            .focused
            .and_then(|f| candidates.iter().position(|&c| c == f))
        {
            Some(index) => candidates[(index + 1) % candidates.len()],
            None => candidates[0],
        };
        self.set_focus(tree, Some(next), sink)
    }

    fn forget_stale(&mut self, tree: &PanelTree) {
        if self.hovered.is_some_and(|id| !tree.is_attached(id)) {
            self.hovered = None;
        }
        if self.pressed.is_some_and(|(id, _)| !tree.is_attached(id)) {
            self.pressed = None;
        }
        if self.focused.is_some_and(|id| !tree.is_attached(id)) {
            log::debug!("focused panel left the tree, clearing focus");
            self.focused = None;
        }
    }

    fn update_hover(
        &mut self,
        tree: &mut PanelTree,
        target: Option<PanelId>,
        x: f32,
        y: f32,
        sink: &mut dyn EventSink,
    ) -> usize {
        if target == self.hovered {
            return 0;
        }
        let old_chain = chain(tree, self.hovered);
        let new_chain = chain(tree, target);
        self.hovered = target;

        let mut delivered = 0;
        for id in old_chain.iter().copied().filter(|id| !new_chain.contains(id)) {
            update_state(tree, id, PanelState::HOVER, false);
            let data = EventData::Pointer { x, y, button: None };
            delivered += deliver(tree, &mut Event::new(EventType::MouseLeave, id, data), sink);
        }
        for id in new_chain.iter().rev().copied().filter(|id| !old_chain.contains(id)) {
            update_state(tree, id, PanelState::HOVER, true);
            let data = EventData::Pointer { x, y, button: None };
            delivered += deliver(tree, &mut Event::new(EventType::MouseEnter, id, data), sink);
        }
        delivered
    }

    fn pointer_down(
        &mut self,
        tree: &mut PanelTree,
        x: f32,
        y: f32,
        button: MouseButton,
        sink: &mut dyn EventSink,
    ) -> usize {
        let target = hit_test(tree, x, y);
        let mut delivered = self.update_hover(tree, target, x, y, sink);

        let focus = target.and_then(|t| {
            std::iter::once(t)
                .chain(tree.ancestors(t))
                .find(|&id| is_focus_candidate(tree, id))
        });
        delivered += self.set_focus(tree, focus, sink);

        let Some(target) = target else {
            return delivered;
        };
        if let Some((previous, _)) = self.pressed.replace((target, button)) {
            update_state(tree, previous, PanelState::PRESSED, false);
        }
        update_state(tree, target, PanelState::PRESSED, true);
        let data = EventData::Pointer {
            x,
            y,
            button: Some(button),
        };
        delivered + deliver(tree, &mut Event::new(EventType::MouseDown, target, data), sink)
    }

    fn pointer_up(
        &mut self,
        tree: &mut PanelTree,
        x: f32,
        y: f32,
        button: MouseButton,
        sink: &mut dyn EventSink,
    ) -> usize {
        let target = hit_test(tree, x, y);
        let pressed = match self.pressed {
            Some((id, pressed_button)) if pressed_button == button => {
                self.pressed = None;
                update_state(tree, id, PanelState::PRESSED, false);
                Some(id)
            }
            _ => None,
        };

        let Some(target) = target else {
            return 0;
        };
        let data = EventData::Pointer {
            x,
            y,
            button: Some(button),
        };
        let mut delivered = deliver(
            tree,
            &mut Event::new(EventType::MouseUp, target, data.clone()),
            sink,
        );
        if pressed == Some(target) {
            delivered += deliver(tree, &mut Event::new(EventType::Click, target, data), sink);
        }
        delivered
    }

    fn key_down(&mut self, tree: &mut PanelTree, code: &str, sink: &mut dyn EventSink) -> usize {
        let target = self.focused.unwrap_or_else(|| tree.root());
        let mut event = Event::new(
            EventType::KeyDown,
            target,
            EventData::Key {
                code: code.to_string(),
            },
        );
        let mut delivered = deliver(tree, &mut event, sink);
        if event.default_prevented {
            return delivered;
        }

        match code {
            "Tab" => delivered += self.focus_next(tree, sink),
            "Backspace" => {
                if let Some(focused) = self.focused
                    && let Some(text) = editable_text(tree, focused)
                {
                    let mut text = text.to_string();
                    text.pop();
                    if let Err(err) = tree.set_text(focused, &text) {
                        log::warn!("backspace on {focused:?} failed: {err}");
                    }
                }
            }
            _ => {}
        }
        delivered
    }

    fn text_input(&mut self, tree: &mut PanelTree, text: &str, sink: &mut dyn EventSink) -> usize {
        let target = self.focused.unwrap_or_else(|| tree.root());
        let mut event = Event::new(
            EventType::TextInput,
            target,
            EventData::Text {
                text: text.to_string(),
            },
        );
        let delivered = deliver(tree, &mut event, sink);
        if !event.default_prevented
            && let Some(focused) = self.focused
            && let Some(current) = editable_text(tree, focused)
        {
            let updated = format!("{current}{text}");
            if let Err(err) = tree.set_text(focused, &updated) {
                log::warn!("text input on {focused:?} failed: {err}");
            }
        }
        delivered
    }
}

/// Offer an event to its target and then, while it bubbles and nobody
/// stopped it, to each ancestor. The chain is snapshotted up front.
fn deliver(tree: &PanelTree, event: &mut Event, sink: &mut dyn EventSink) -> usize {
    let path: Vec<PanelId> = if event.bubbles {
        std::iter::once(event.target)
            .chain(tree.ancestors(event.target))
            .collect()
    } else {
        vec![event.target]
    };

    let mut delivered = 0;
    for current in path {
        if !tree.contains(current) {
            break;
        }
        sink.handle(tree, current, event);
        delivered += 1;
        if event.propagation_stopped {
            break;
        }
    }
    log::trace!(
        "{} delivered to {delivered} panel(s)",
        event.event_type.name()
    );
    delivered
}

/// The panel and its ancestors, nearest first
fn chain(tree: &PanelTree, id: Option<PanelId>) -> Vec<PanelId> {
    match id {
        Some(id) if tree.contains(id) => std::iter::once(id).chain(tree.ancestors(id)).collect(),
        _ => Vec::new(),
    }
}

fn is_focus_candidate(tree: &PanelTree, id: PanelId) -> bool {
    tree.get(id)
        .is_some_and(|p| p.is_focusable() && p.is_enabled() && participates(p))
}

fn editable_text(tree: &PanelTree, id: PanelId) -> Option<&str> {
    match tree.get(id)?.kind() {
        crate::panel::PanelKind::TextEntry { text, .. } => Some(text),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::StyleSheet;
    use crate::events::MessageLog;
    use crate::layout::LayoutEngine;
    use crate::panel::{Panel, PanelKind};
    use crate::style::StyleEngine;
    use pretty_assertions::assert_eq;

    struct Menu {
        tree: PanelTree,
        menu: PanelId,
        play: PanelId,
        quit: PanelId,
    }

    /// #Menu at (0,0) 200x100 holding two 100x50 buttons side by side
    fn menu() -> Menu {
        let mut tree = PanelTree::new();
        let menu = tree.add(tree.root(), Panel::default().with_id("Menu")).unwrap();
        let play = tree.add(menu, Panel::new(PanelKind::button("Play")).with_id("Play")).unwrap();
        let quit = tree.add(menu, Panel::new(PanelKind::button("Quit")).with_id("Quit")).unwrap();
        layout(
            &mut tree,
            "#Menu { width: 200px; height: 100px; flow-children: right; }
             Button { width: 100px; height: 50px; }",
        );
        Menu { tree, menu, play, quit }
    }

    fn layout(tree: &mut PanelTree, css: &str) {
        let mut styles = StyleEngine::new();
        styles.add_sheet(StyleSheet::parse(css));
        styles.recompute_dirty(tree);
        LayoutEngine::new().layout(tree);
    }

    fn kinds(log: &MessageLog) -> Vec<(EventType, String)> {
        log.messages()
            .iter()
            .map(|m| (m.event_type, m.target_id.clone()))
            .collect()
    }

    #[test]
    fn test_hit_test_prefers_last_child_and_respects_flags() {
        let mut m = menu();
        assert_eq!(hit_test(&m.tree, 10.0, 10.0), Some(m.play));
        assert_eq!(hit_test(&m.tree, 150.0, 10.0), Some(m.quit));
        // the menu itself does not accept input
        assert_eq!(hit_test(&m.tree, 10.0, 90.0), None);

        m.tree.set_enabled(m.play, false).unwrap();
        assert_eq!(hit_test(&m.tree, 10.0, 10.0), None);
    }

    #[test]
    fn test_overlapping_siblings_topmost_wins() {
        let mut tree = PanelTree::new();
        let root = tree.root();
        let under = tree.add(root, Panel::new(PanelKind::button("a"))).unwrap();
        let over = tree.add(root, Panel::new(PanelKind::button("b"))).unwrap();
        layout(&mut tree, "Button { width: 50px; height: 50px; }");
        assert_eq!(hit_test(&tree, 5.0, 5.0), Some(over));
        tree.set_visible(over, false).unwrap();
        assert_eq!(hit_test(&tree, 5.0, 5.0), Some(under));
    }

    #[test]
    fn test_hover_enter_leave_on_boundary() {
        let mut m = menu();
        let mut dispatcher = EventDispatcher::new();
        let mut log = MessageLog::new();

        dispatcher.dispatch(&mut m.tree, &InputEvent::pointer_move(10.0, 10.0), &mut log);
        assert_eq!(dispatcher.hovered(), Some(m.play));
        assert!(m.tree.get(m.play).unwrap().state().contains(PanelState::HOVER));
        assert!(m.tree.get(m.menu).unwrap().state().contains(PanelState::HOVER));

        log.drain();
        dispatcher.dispatch(&mut m.tree, &InputEvent::pointer_move(150.0, 10.0), &mut log);
        assert_eq!(
            kinds(&log),
            vec![
                (EventType::MouseLeave, "Play".to_string()),
                (EventType::MouseEnter, "Quit".to_string()),
            ]
        );
        assert!(!m.tree.get(m.play).unwrap().state().contains(PanelState::HOVER));
        assert!(m.tree.get(m.menu).unwrap().state().contains(PanelState::HOVER));

        // no change, no events
        log.drain();
        dispatcher.dispatch(&mut m.tree, &InputEvent::pointer_move(160.0, 20.0), &mut log);
        assert!(log.is_empty());
    }

    #[test]
    fn test_click_requires_release_on_pressed_panel() {
        let mut m = menu();
        let mut dispatcher = EventDispatcher::new();
        let mut log = MessageLog::new();

        dispatcher.dispatch(&mut m.tree, &InputEvent::pointer_down(10.0, 10.0), &mut log);
        assert!(m.tree.get(m.play).unwrap().state().contains(PanelState::PRESSED));
        dispatcher.dispatch(&mut m.tree, &InputEvent::pointer_up(150.0, 10.0), &mut log);
        assert!(!m.tree.get(m.play).unwrap().state().contains(PanelState::PRESSED));
        assert!(log.messages().iter().all(|msg| msg.event_type != EventType::Click));

        log.drain();
        dispatcher.dispatch(&mut m.tree, &InputEvent::pointer_down(10.0, 10.0), &mut log);
        dispatcher.dispatch(&mut m.tree, &InputEvent::pointer_up(12.0, 12.0), &mut log);
        let clicks: Vec<_> = log
            .messages()
            .iter()
            .filter(|msg| msg.event_type == EventType::Click)
            .map(|msg| msg.current)
            .collect();
        // click bubbles: Play, Menu, root
        assert_eq!(clicks, vec![m.play, m.menu, m.tree.root()]);
    }

    #[test]
    fn test_stop_propagation_halts_bubbling() {
        struct StopAtMenu {
            menu: PanelId,
            seen: Vec<PanelId>,
        }
        impl EventSink for StopAtMenu {
            fn handle(&mut self, _tree: &PanelTree, current: PanelId, event: &mut Event) {
                self.seen.push(current);
                if current == self.menu && event.event_type == EventType::Click {
                    event.stop_propagation();
                }
            }
        }

        let mut m = menu();
        let mut dispatcher = EventDispatcher::new();
        let mut sink = StopAtMenu {
            menu: m.menu,
            seen: Vec::new(),
        };
        dispatcher.dispatch(&mut m.tree, &InputEvent::pointer_down(10.0, 10.0), &mut sink);
        sink.seen.clear();
        dispatcher.dispatch(&mut m.tree, &InputEvent::pointer_up(10.0, 10.0), &mut sink);
        // mouseup bubbles to root, click stops at the menu
        let root = m.tree.root();
        assert_eq!(sink.seen, vec![m.play, m.menu, root, m.play, m.menu]);
    }

    #[test]
    fn test_single_focus_holder() {
        let mut m = menu();
        let mut dispatcher = EventDispatcher::new();
        let mut log = MessageLog::new();

        dispatcher.set_focus(&mut m.tree, Some(m.play), &mut log);
        dispatcher.set_focus(&mut m.tree, Some(m.quit), &mut log);
        assert_eq!(
            kinds(&log),
            vec![
                (EventType::Focus, "Play".to_string()),
                (EventType::Blur, "Play".to_string()),
                (EventType::Focus, "Quit".to_string()),
            ]
        );
        let focused: Vec<_> = m
            .tree
            .descendants(m.tree.root())
            .into_iter()
            .filter(|&id| m.tree.get(id).unwrap().state().contains(PanelState::FOCUSED))
            .collect();
        assert_eq!(focused, vec![m.quit]);
    }

    #[test]
    fn test_tab_cycles_focus() {
        let mut m = menu();
        let mut dispatcher = EventDispatcher::new();
        let mut log = MessageLog::new();

        dispatcher.dispatch(&mut m.tree, &InputEvent::key_down("Tab"), &mut log);
        assert_eq!(dispatcher.focused(), Some(m.play));
        dispatcher.dispatch(&mut m.tree, &InputEvent::key_down("Tab"), &mut log);
        assert_eq!(dispatcher.focused(), Some(m.quit));
        dispatcher.dispatch(&mut m.tree, &InputEvent::key_down("Tab"), &mut log);
        assert_eq!(dispatcher.focused(), Some(m.play));
    }

    #[test]
    fn test_prevent_default_blocks_tab() {
        struct Prevent;
        impl EventSink for Prevent {
            fn handle(&mut self, _tree: &PanelTree, _current: PanelId, event: &mut Event) {
                event.prevent_default();
            }
        }
        let mut m = menu();
        let mut dispatcher = EventDispatcher::new();
        dispatcher.dispatch(&mut m.tree, &InputEvent::key_down("Tab"), &mut Prevent);
        assert_eq!(dispatcher.focused(), None);
    }

    #[test]
    fn test_text_entry_editing() {
        let mut tree = PanelTree::new();
        let entry = tree
            .add(tree.root(), Panel::new(PanelKind::text_entry(Some(4))).with_id("Name"))
            .unwrap();
        let mut dispatcher = EventDispatcher::new();
        let mut log = MessageLog::new();
        dispatcher.set_focus(&mut tree, Some(entry), &mut log);

        dispatcher.dispatch(&mut tree, &InputEvent::text("abc"), &mut log);
        dispatcher.dispatch(&mut tree, &InputEvent::text("de"), &mut log);
        assert_eq!(tree.get(entry).unwrap().text(), Some("abcd"));

        dispatcher.dispatch(&mut tree, &InputEvent::key_down("Backspace"), &mut log);
        assert_eq!(tree.get(entry).unwrap().text(), Some("abc"));
    }

    #[test]
    fn test_update_state_on_missing_panel() {
        let mut m = menu();
        assert!(update_state(&mut m.tree, m.quit, PanelState::HOVER, true));
        assert!(m.tree.get(m.quit).unwrap().state().contains(PanelState::HOVER));

        m.tree.destroy(m.play).unwrap();
        assert!(!update_state(&mut m.tree, m.play, PanelState::HOVER, true));
    }

    #[test]
    fn test_destroyed_panels_are_forgotten() {
        let mut m = menu();
        let mut dispatcher = EventDispatcher::new();
        let mut log = MessageLog::new();
        dispatcher.dispatch(&mut m.tree, &InputEvent::pointer_move(10.0, 10.0), &mut log);
        dispatcher.set_focus(&mut m.tree, Some(m.play), &mut log);

        m.tree.destroy(m.play).unwrap();
        log.drain();
        dispatcher.dispatch(&mut m.tree, &InputEvent::key_down("Enter"), &mut log);
        assert_eq!(dispatcher.focused(), None);
        assert_eq!(dispatcher.hovered(), None);
        // key events fall back to the root
        assert_eq!(log.messages()[0].target, m.tree.root());
    }
}
