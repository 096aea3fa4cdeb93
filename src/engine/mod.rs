//! UI context orchestrating all subsystems
//!
//! One `update(dt)` runs the frame pipeline in a fixed order:
//! 1. Advance animations and transitions
//! 2. Recompute style for panels marked dirty
//! 3. Lay out the whole tree from the root
//! 4. Dispatch queued input against the fresh bounds
//!
//! Painting is driven separately by the host through [`UiContext::paint`].

mod config;

pub use config::EngineConfig;

use std::path::Path;
use std::rc::Rc;

use crate::animation::AnimationRuntime;
use crate::css::StyleSheet;
use crate::events::{
    Event, EventDispatcher, EventQueue, EventSink, InputEvent, MessageLog, UiMessage, hit_test,
};
use crate::layout::{LayoutEngine, TextMeasure};
use crate::paint::{self, Renderer};
use crate::panel::{PanelId, PanelTree};
use crate::style::StyleEngine;
use crate::text::{self, Localizer};
use crate::utils::Result;

/// Work done by one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub animations_advanced: usize,
    pub styles_recomputed: usize,
    pub panels_laid_out: usize,
    pub inputs_processed: usize,
    pub messages: usize,
}

/// Explicit owner of the tree, stylesheets and per-frame machinery
pub struct UiContext {
    config: EngineConfig,
    tree: PanelTree,
    styles: StyleEngine,
    layout: LayoutEngine,
    animations: AnimationRuntime,
    dispatcher: EventDispatcher,
    input: EventQueue,
    messages: MessageLog,
    frame: u64,
}

impl UiContext {
    pub fn new(config: EngineConfig) -> Self {
        let layout = LayoutEngine::with_metrics(config.viewport, config.font_metrics);
        Self {
            config,
            tree: PanelTree::new(),
            styles: StyleEngine::new(),
            layout,
            animations: AnimationRuntime::new(),
            dispatcher: EventDispatcher::new(),
            input: EventQueue::new(),
            messages: MessageLog::new(),
            frame: 0,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn tree(&self) -> &PanelTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut PanelTree {
        &mut self.tree
    }

    pub fn root(&self) -> PanelId {
        self.tree.root()
    }

    pub fn styles(&self) -> &StyleEngine {
        &self.styles
    }

    pub fn dispatcher(&self) -> &EventDispatcher {
        &self.dispatcher
    }

    /// Number of frames run so far
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Add a stylesheet; every panel restyles on the next frame
    pub fn add_stylesheet(&mut self, sheet: impl Into<Rc<StyleSheet>>) {
        self.styles.add_sheet(sheet);
        let root = self.tree.root();
        self.tree.mark_style_dirty(root);
    }

    /// Load a stylesheet file (with its imports) and add it
    pub fn load_stylesheet(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let sheet = StyleSheet::load(path.as_ref())?;
        log::debug!(
            "loaded {} rule(s) from {}",
            sheet.len(),
            path.as_ref().display()
        );
        self.add_stylesheet(sheet);
        Ok(())
    }

    pub fn clear_stylesheets(&mut self) {
        self.styles.clear();
        let root = self.tree.root();
        self.tree.mark_style_dirty(root);
    }

    /// Resize the root; percent and viewport units re-resolve next frame
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.layout.set_viewport(width, height);
        self.config.viewport = self.layout.viewport();
        let root = self.tree.root();
        self.tree.mark_layout_dirty(root);
    }

    pub fn set_text_measure(&mut self, measure: Box<dyn TextMeasure>) {
        self.layout.set_text_measure(measure);
    }

    /// Queue raw input for the next frame
    pub fn queue_input(&mut self, input: InputEvent) {
        self.input.push(input);
    }

    pub fn pending_inputs(&self) -> usize {
        self.input.len()
    }

    /// Move focus immediately; blur/focus deliveries are recorded
    pub fn set_focus(&mut self, target: Option<PanelId>) -> usize {
        self.dispatcher
            .set_focus(&mut self.tree, target, &mut self.messages)
    }

    pub fn hit_test(&self, x: f32, y: f32) -> Option<PanelId> {
        hit_test(&self.tree, x, y)
    }

    /// Apply `loc-key`/`text` attributes through the host string table
    pub fn apply_text(&mut self, localizer: &dyn Localizer) -> usize {
        text::apply_text(&mut self.tree, localizer)
    }

    /// Run one frame, recording deliveries as messages
    pub fn update(&mut self, dt: f32) -> FrameStats {
        self.run_frame(dt, None)
    }

    /// Run one frame, offering each delivery to `sink` before recording it
    pub fn update_with(&mut self, dt: f32, sink: &mut dyn EventSink) -> FrameStats {
        self.run_frame(dt, Some(sink))
    }

    fn run_frame(&mut self, dt: f32, host: Option<&mut dyn EventSink>) -> FrameStats {
        let mut stats = FrameStats {
            animations_advanced: self.animations.advance(&mut self.tree, dt.max(0.0)),
            ..FrameStats::default()
        };
        stats.styles_recomputed = self.styles.recompute_dirty(&mut self.tree);
        stats.panels_laid_out = self.layout.layout(&mut self.tree);

        let before = self.messages.len();
        let mut sink = Forward {
            host,
            log: &mut self.messages,
        };
        while stats.inputs_processed < self.config.max_inputs_per_frame {
            let Some(input) = self.input.pop() else {
                break;
            };
            self.dispatcher.dispatch(&mut self.tree, &input, &mut sink);
            stats.inputs_processed += 1;
        }
        stats.messages = self.messages.len() - before;

        self.frame += 1;
        if self.config.log_frame_stats {
            log::trace!("frame {}: {:?}", self.frame, stats);
        }
        stats
    }

    /// Paint the attached tree
    pub fn paint(&self, renderer: &mut dyn Renderer) -> usize {
        paint::paint_with_metrics(
            &self.tree,
            self.tree.root(),
            renderer,
            &self.config.font_metrics,
        )
    }

    /// Take every message recorded since the last drain
    pub fn drain_messages(&mut self) -> Vec<UiMessage> {
        self.messages.drain()
    }
}

impl Default for UiContext {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

/// Offers a delivery to the host first, then records it
struct Forward<'a, 's> {
    host: Option<&'a mut (dyn EventSink + 's)>,
    log: &'a mut MessageLog,
}

impl EventSink for Forward<'_, '_> {
    fn handle(&mut self, tree: &PanelTree, current: PanelId, event: &mut Event) {
        if let Some(host) = self.host.as_deref_mut() {
            host.handle(tree, current, event);
        }
        self.log.handle(tree, current, event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::Color;
    use crate::events::EventType;
    use crate::layout::Rect;
    use crate::panel::{Panel, PanelKind};
    use pretty_assertions::assert_eq;

    fn context() -> (UiContext, PanelId) {
        let mut ctx = UiContext::new(EngineConfig::default().with_viewport(800.0, 600.0));
        ctx.add_stylesheet(StyleSheet::parse(
            "#Play { width: 100px; height: 40px; background-color: #333; transition: background-color 1s; }
             #Play:hover { background-color: #fff; }",
        ));
        let root = ctx.root();
        let play = ctx
            .tree_mut()
            .add(root, Panel::new(PanelKind::button("Play")).with_id("Play"))
            .unwrap();
        (ctx, play)
    }

    #[test]
    fn test_first_frame_styles_and_lays_out() {
        let (mut ctx, play) = context();
        let stats = ctx.update(0.0);
        assert_eq!(stats.styles_recomputed, 2);
        assert_eq!(stats.panels_laid_out, 2);
        assert_eq!(
            ctx.tree().get(play).unwrap().bounds(),
            Rect::new(0.0, 0.0, 100.0, 40.0)
        );

        // nothing changed
        let stats = ctx.update(0.016);
        assert_eq!(stats.styles_recomputed, 0);
    }

    #[test]
    fn test_hover_transition_runs_over_frames() {
        let (mut ctx, play) = context();
        ctx.update(0.0);

        ctx.queue_input(InputEvent::pointer_move(10.0, 10.0));
        let stats = ctx.update(0.0);
        assert_eq!(stats.inputs_processed, 1);
        let messages = ctx.drain_messages();
        assert!(
            messages
                .iter()
                .any(|m| m.event_type == EventType::MouseEnter && m.target_id == "Play")
        );

        // hover restyle starts the transition from the displayed color
        ctx.update(0.0);
        assert_eq!(
            ctx.tree().get(play).unwrap().computed_style().background_color,
            Some(Color::rgb(0x33, 0x33, 0x33))
        );
        let stats = ctx.update(0.5);
        assert_eq!(stats.animations_advanced, 1);
        let mid = ctx.tree().get(play).unwrap().computed_style().background_color;
        assert_ne!(mid, Some(Color::rgb(0x33, 0x33, 0x33)));
        assert_ne!(mid, Some(Color::WHITE));

        ctx.update(0.6);
        ctx.update(0.0);
        assert_eq!(
            ctx.tree().get(play).unwrap().computed_style().background_color,
            Some(Color::WHITE)
        );
    }

    #[test]
    fn test_input_cap_defers_remaining() {
        let mut ctx = UiContext::new(EngineConfig::default().with_max_inputs_per_frame(2));
        for i in 0..5 {
            ctx.queue_input(InputEvent::pointer_move(i as f32, 0.0));
        }
        assert_eq!(ctx.update(0.0).inputs_processed, 2);
        assert_eq!(ctx.pending_inputs(), 3);
    }

    #[test]
    fn test_host_sink_sees_deliveries_first() {
        struct Swallow(usize);
        impl EventSink for Swallow {
            fn handle(&mut self, _tree: &PanelTree, _current: PanelId, event: &mut Event) {
                self.0 += 1;
                event.stop_propagation();
            }
        }

        let (mut ctx, _) = context();
        ctx.update(0.0);
        ctx.queue_input(InputEvent::pointer_down(10.0, 10.0));
        ctx.queue_input(InputEvent::pointer_up(10.0, 10.0));
        let mut host = Swallow(0);
        let stats = ctx.update_with(0.0, &mut host);
        assert_eq!(stats.messages, host.0);
        let clicks = ctx
            .drain_messages()
            .into_iter()
            .filter(|m| m.event_type == EventType::Click)
            .count();
        assert_eq!(clicks, 1);
    }

    #[test]
    fn test_viewport_change_relayouts() {
        let mut ctx = UiContext::default();
        let root = ctx.root();
        ctx.tree_mut()
            .add(root, Panel::default().with_style("width: 50%; height: 10px"))
            .unwrap();
        ctx.update(0.0);
        ctx.set_viewport(400.0, 300.0);
        ctx.update(0.0);
        let child = ctx.tree().children(root)[0];
        assert_eq!(ctx.tree().get(child).unwrap().bounds().width, 200.0);
    }
}
