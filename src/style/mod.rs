//! Style computation and cascade
//!
//! For each panel: matching rules sorted by (specificity, sheet, source
//! order) are merged later-wins, inline style is merged on top, animation
//! overrides after that, and finally unset inheritable text properties are
//! copied from the parent's computed style.

pub mod matching;

pub use matching::{matches_compound, matches_selector};

use std::rc::Rc;

use crate::animation::{self, Animation};
use crate::css::{AnimationDirection, StyleProperties, StyleRule, StyleSheet};
use crate::panel::{DirtyFlags, Panel, PanelId, PanelTree};

/// A rule that matched, with the sheet it came from
#[derive(Debug, Clone, Copy)]
pub struct MatchedRule<'a> {
    pub rule: &'a StyleRule,
    pub sheet_index: usize,
}

impl MatchedRule<'_> {
    fn sort_key(&self) -> (u32, usize, u32) {
        (self.rule.specificity(), self.sheet_index, self.rule.source_order)
    }
}

/// Style engine holding the active stylesheets
#[derive(Debug, Clone, Default)]
pub struct StyleEngine {
    sheets: Vec<Rc<StyleSheet>>,
}

impl StyleEngine {
    /// Create a new style engine
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a stylesheet. Later sheets win ties against earlier ones.
    pub fn add_sheet(&mut self, sheet: impl Into<Rc<StyleSheet>>) {
        self.sheets.push(sheet.into());
    }

    pub fn clear(&mut self) {
        self.sheets.clear();
    }

    pub fn sheets(&self) -> &[Rc<StyleSheet>] {
        &self.sheets
    }

    /// Every rule matching the panel, in ascending cascade order
    pub fn matching_rules(&self, tree: &PanelTree, id: PanelId) -> Vec<MatchedRule<'_>> {
        let mut matched: Vec<MatchedRule<'_>> = self
            .sheets
            .iter()
            .enumerate()
            .flat_map(|(sheet_index, sheet)| {
                sheet
                    .rules
                    .iter()
                    .map(move |rule| MatchedRule { rule, sheet_index })
            })
            .filter(|m| matches_selector(tree, id, &m.rule.selector))
            .collect();
        matched.sort_by_key(MatchedRule::sort_key);
        matched
    }

    /// Stylesheet rules plus inline style, without animation or inheritance
    pub fn cascade(&self, tree: &PanelTree, id: PanelId) -> StyleProperties {
        let mut style = StyleProperties::new();
        for matched in self.matching_rules(tree, id) {
            style.merge_from(&matched.rule.properties);
        }
        if let Some(panel) = tree.get(id) {
            style.merge_from(&panel.inline_style);
        }
        style
    }

    /// Compute a panel's style from current tree state. Pure: nothing on the
    /// panel changes, and two calls without intervening mutation agree.
    pub fn compute_style(&self, tree: &PanelTree, id: PanelId) -> StyleProperties {
        let mut style = self.cascade(tree, id);
        if let Some(panel) = tree.get(id) {
            animation::apply_overrides(&panel.animations, &mut style);
        }
        if let Some(parent) = tree.parent(id).and_then(|p| tree.get(p)) {
            style.inherit_from(&parent.computed_style);
        }
        style
    }

    /// Recompute every attached panel whose style is dirty, parents before
    /// children. Returns the number of panels recomputed.
    pub fn recompute_dirty(&self, tree: &mut PanelTree) -> usize {
        let mut recomputed = 0;
        let mut stack = vec![tree.root()];
        while let Some(id) = stack.pop() {
            if tree.get(id).is_some_and(Panel::is_style_dirty) {
                self.recompute_panel(tree, id);
                recomputed += 1;
            }
            stack.extend(tree.children(id).iter().rev().copied());
        }
        recomputed
    }

    fn recompute_panel(&self, tree: &mut PanelTree, id: PanelId) {
        let mut base = self.cascade(tree, id);
        if let Some(parent) = tree.parent(id).and_then(|p| tree.get(p)) {
            base.inherit_from(&parent.computed_style);
        }

        let Some(panel) = tree.get_mut(id) else {
            return;
        };
        if panel.styled {
            start_transitions(panel, &base);
        }
        sync_descriptor_animation(panel, &base);

        let mut computed = base.clone();
        animation::apply_overrides(&panel.animations, &mut computed);

        panel.base_style = base;
        panel.computed_style = computed;
        panel.styled = true;
        panel.dirty.remove(DirtyFlags::STYLE);
    }
}

/// Start a transition for every listed property whose target changed,
/// beginning at the currently displayed value.
fn start_transitions(panel: &mut Panel, base: &StyleProperties) {
    let Some(specs) = base.transitions.as_ref() else {
        return;
    };
    for spec in specs {
        let previous = spec.property.read(&panel.base_style);
        let target = spec.property.read(base);
        if previous == target {
            continue;
        }
        let displayed = spec.property.read(&panel.computed_style);
        let transition = Animation::transition(spec, displayed, target);
        log::trace!("starting {} on panel `{}`", transition.name, panel.id);
        panel.animations.retain(|a| a.name != transition.name);
        panel.animations.push(transition);
    }
}

/// Keep the `animation-name` timeline in step with the computed descriptor
fn sync_descriptor_animation(panel: &mut Panel, base: &StyleProperties) {
    let wanted = base
        .animation_name
        .as_ref()
        .filter(|name| !name.eq_ignore_ascii_case("none"));
    if wanted == panel.running_animation.as_ref() {
        return;
    }

    if let Some(old) = panel.running_animation.take() {
        panel.animations.retain(|a| a.name != old);
    }
    if let Some(name) = wanted {
        let timeline = Animation::new(name.clone(), base.animation_duration.unwrap_or(0.0))
            .with_iterations(base.animation_iteration_count.unwrap_or_default())
            .alternating(base.animation_direction == Some(AnimationDirection::Alternate));
        panel.animations.push(timeline);
        panel.running_animation = Some(name.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::{Color, Length};
    use crate::panel::PanelKind;
    use pretty_assertions::assert_eq;

    fn engine(css: &str) -> StyleEngine {
        let mut engine = StyleEngine::new();
        engine.add_sheet(StyleSheet::parse(css));
        engine
    }

    #[test]
    fn test_id_beats_element_regardless_of_order() {
        let engine = engine("Button { color: white; } #Submit { color: red; }");
        let mut tree = PanelTree::new();
        let submit = tree
            .add(tree.root(), Panel::new(PanelKind::button("Go")).with_id("Submit"))
            .unwrap();

        let style = engine.compute_style(&tree, submit);
        assert_eq!(style.color, Some(Color::rgb(255, 0, 0)));
    }

    #[test]
    fn test_equal_specificity_later_wins() {
        let engine = engine(".a { width: 1px; } .b { width: 2px; }");
        let mut tree = PanelTree::new();
        let id = tree
            .add(tree.root(), Panel::default().with_class("b").with_class("a"))
            .unwrap();
        assert_eq!(engine.compute_style(&tree, id).width, Some(Length::px(2.0)));
    }

    #[test]
    fn test_later_sheet_wins_ties() {
        let mut engine = engine(".a { width: 1px; }");
        engine.add_sheet(StyleSheet::parse(".a { width: 2px; }"));
        let mut tree = PanelTree::new();
        let id = tree.add(tree.root(), Panel::default().with_class("a")).unwrap();
        assert_eq!(engine.compute_style(&tree, id).width, Some(Length::px(2.0)));
    }

    #[test]
    fn test_inline_outranks_rules() {
        let engine = engine("#Hud { width: 10px; height: 5px; }");
        let mut tree = PanelTree::new();
        let id = tree
            .add(tree.root(), Panel::default().with_id("Hud").with_style("width: 99px"))
            .unwrap();
        let style = engine.compute_style(&tree, id);
        assert_eq!(style.width, Some(Length::px(99.0)));
        assert_eq!(style.height, Some(Length::px(5.0)));
    }

    #[test]
    fn test_inheritance_scope() {
        let engine = engine("#Parent { color: red; background-color: blue; }");
        let mut tree = PanelTree::new();
        let parent = tree.add(tree.root(), Panel::default().with_id("Parent")).unwrap();
        let child = tree.add(parent, Panel::new(PanelKind::label("hi"))).unwrap();
        engine.recompute_dirty(&mut tree);

        let child_style = tree.get(child).unwrap().computed_style();
        assert_eq!(child_style.color, Some(Color::rgb(255, 0, 0)));
        assert_eq!(child_style.background_color, None);

        tree.set_inline_style_text(parent, "color: lime").unwrap();
        engine.recompute_dirty(&mut tree);
        assert_eq!(
            tree.get(child).unwrap().computed_style().color,
            Some(Color::rgb(0, 255, 0))
        );
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let engine = engine("Panel { width: 10px; } .x:hover { opacity: 0.5; }");
        let mut tree = PanelTree::new();
        let id = tree.add(tree.root(), Panel::default().with_class("x")).unwrap();

        assert_eq!(engine.recompute_dirty(&mut tree), 2);
        let first = tree.get(id).unwrap().computed_style().clone();
        assert_eq!(engine.recompute_dirty(&mut tree), 0);

        tree.mark_style_dirty(id);
        engine.recompute_dirty(&mut tree);
        assert_eq!(tree.get(id).unwrap().computed_style(), &first);
        assert_eq!(engine.compute_style(&tree, id), first);
    }

    #[test]
    fn test_state_change_starts_transition() {
        let engine = engine(
            ".btn { opacity: 1; transition: opacity 1s; } .btn:hover { opacity: 0; }",
        );
        let mut tree = PanelTree::new();
        let id = tree.add(tree.root(), Panel::default().with_class("btn")).unwrap();
        engine.recompute_dirty(&mut tree);
        assert!(tree.get(id).unwrap().animations().is_empty());

        tree.set_state(id, crate::panel::PanelState::HOVER, true).unwrap();
        engine.recompute_dirty(&mut tree);
        let panel = tree.get(id).unwrap();
        assert_eq!(panel.animations().len(), 1);
        // transition starts from the displayed value
        assert_eq!(panel.computed_style().opacity, Some(1.0));
    }

    #[test]
    fn test_descriptor_animation_starts_once() {
        let engine = engine("#Pulse { animation: glow 2s infinite; }");
        let mut tree = PanelTree::new();
        let id = tree.add(tree.root(), Panel::default().with_id("Pulse")).unwrap();
        engine.recompute_dirty(&mut tree);
        tree.mark_style_dirty(id);
        engine.recompute_dirty(&mut tree);

        let animations = tree.get(id).unwrap().animations();
        assert_eq!(animations.len(), 1);
        assert_eq!(animations[0].name, "glow");
        assert_eq!(animations[0].duration, 2.0);
    }
}
