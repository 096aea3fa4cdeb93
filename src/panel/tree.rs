//! Arena-backed retained panel tree

use slotmap::SlotMap;

use crate::animation::Animation;
use crate::css::StyleProperties;
use crate::layout::Rect;
use crate::utils::{HudError, Result, TreeError};

use super::node::{Panel, PanelKind};
use super::{DirtyFlags, PanelId, PanelState};

/// Owns every panel. The root is created with the tree and can never be
/// detached or destroyed; other panels start detached.
#[derive(Debug, Clone)]
pub struct PanelTree {
    panels: SlotMap<PanelId, Panel>,
    root: PanelId,
}

impl PanelTree {
    pub fn new() -> Self {
        let mut panels = SlotMap::with_key();
        let root = panels.insert(Panel::new(PanelKind::Panel).with_id("root"));
        Self { panels, root }
    }

    pub fn root(&self) -> PanelId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.panels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }

    pub fn contains(&self, id: PanelId) -> bool {
        self.panels.contains_key(id)
    }

    pub fn get(&self, id: PanelId) -> Option<&Panel> {
        self.panels.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: PanelId) -> Option<&mut Panel> {
        self.panels.get_mut(id)
    }

    fn panel(&self, id: PanelId) -> Result<&Panel> {
        self.panels.get(id).ok_or_else(|| stale(id))
    }

    fn panel_mut(&mut self, id: PanelId) -> Result<&mut Panel> {
        self.panels.get_mut(id).ok_or_else(|| stale(id))
    }

    /// All live handles, in arena order
    pub fn ids(&self) -> impl Iterator<Item = PanelId> + '_ {
        self.panels.keys()
    }

    /// Add a detached panel to the arena
    pub fn create(&mut self, panel: Panel) -> PanelId {
        self.panels.insert(panel)
    }

    /// Create a panel and append it to `parent`
    pub fn add(&mut self, parent: PanelId, panel: Panel) -> Result<PanelId> {
        self.panel(parent)?;
        let id = self.create(panel);
        self.attach(parent, id)?;
        Ok(id)
    }

    /// Append `child` to `parent`, moving it out of its current parent first.
    pub fn attach(&mut self, parent: PanelId, child: PanelId) -> Result<()> {
        let index = self.panel(parent)?.children.len();
        self.insert_child(parent, index, child)
    }

    /// Insert `child` into `parent`'s child list at `index` (clamped).
    pub fn insert_child(&mut self, parent: PanelId, index: usize, child: PanelId) -> Result<()> {
        self.panel(parent)?;
        self.panel(child)?;
        if child == self.root {
            return Err(TreeError::RootAttach.into());
        }
        if child == parent || self.is_ancestor(child, parent) {
            return Err(TreeError::Cycle.into());
        }

        if self.panel(child)?.parent.is_some() {
            self.detach(child)?;
        }

        let parent_panel = self.panel_mut(parent)?;
        let index = index.min(parent_panel.children.len());
        parent_panel.children.insert(index, child);
        self.panel_mut(child)?.parent = Some(parent);

        log::debug!("attached {:?} under {:?}", child, parent);
        self.mark_layout_dirty(parent);
        self.mark_style_dirty(child);
        Ok(())
    }

    /// Sever `child` from its parent. Detaching a detached panel is a no-op.
    pub fn detach(&mut self, child: PanelId) -> Result<()> {
        if child == self.root {
            return Err(TreeError::RootDetach.into());
        }
        let Some(parent) = self.panel_mut(child)?.parent.take() else {
            return Ok(());
        };
        if let Some(parent_panel) = self.panels.get_mut(parent) {
            parent_panel.children.retain(|&c| c != child);
        }
        log::debug!("detached {:?} from {:?}", child, parent);
        self.mark_layout_dirty(parent);
        Ok(())
    }

    /// Destroy a panel and every panel it still owns. Returns the number of
    /// panels removed.
    pub fn destroy(&mut self, id: PanelId) -> Result<usize> {
        self.detach(id)?;
        let doomed = self.descendants(id);
        for &panel in &doomed {
            self.panels.remove(panel);
        }
        Ok(doomed.len())
    }

    pub fn parent(&self, id: PanelId) -> Option<PanelId> {
        self.panels.get(id).and_then(|p| p.parent)
    }

    pub fn children(&self, id: PanelId) -> &[PanelId] {
        self.panels
            .get(id)
            .map(|p| p.children.as_slice())
            .unwrap_or(&[])
    }

    /// Walk from the parent of `id` up to the top of its tree
    pub fn ancestors(&self, id: PanelId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.parent(id),
        }
    }

    pub fn is_ancestor(&self, ancestor: PanelId, id: PanelId) -> bool {
        self.ancestors(id).any(|a| a == ancestor)
    }

    /// True when the panel is reachable from the root
    pub fn is_attached(&self, id: PanelId) -> bool {
        id == self.root || self.ancestors(id).last() == Some(self.root)
    }

    /// Pre-order subtree of `id`, including `id` itself
    pub fn descendants(&self, id: PanelId) -> Vec<PanelId> {
        let mut out = Vec::new();
        if !self.contains(id) {
            return out;
        }
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }

    /// First attached panel with this id, in tree order
    pub fn find_by_id(&self, id: &str) -> Option<PanelId> {
        self.descendants(self.root)
            .into_iter()
            .find(|&p| self.panels.get(p).is_some_and(|panel| panel.id == id))
    }

    // Mutation helpers. Each invalidates what the change can affect.

    pub fn add_class(&mut self, id: PanelId, class: &str) -> Result<()> {
        let panel = self.panel_mut(id)?;
        if !panel.has_class(class) {
            panel.classes.push(class.to_string());
            self.mark_style_dirty(id);
        }
        Ok(())
    }

    pub fn remove_class(&mut self, id: PanelId, class: &str) -> Result<()> {
        let panel = self.panel_mut(id)?;
        let before = panel.classes.len();
        panel.classes.retain(|c| c != class);
        if panel.classes.len() != before {
            self.mark_style_dirty(id);
        }
        Ok(())
    }

    pub fn set_class(&mut self, id: PanelId, class: &str, on: bool) -> Result<()> {
        if on {
            self.add_class(id, class)
        } else {
            self.remove_class(id, class)
        }
    }

    pub fn set_type_tag(&mut self, id: PanelId, tag: Option<&str>) -> Result<()> {
        self.panel_mut(id)?.type_tag = tag.map(str::to_string);
        self.mark_style_dirty(id);
        Ok(())
    }

    pub fn set_attribute(&mut self, id: PanelId, name: &str, value: &str) -> Result<()> {
        self.panel_mut(id)?
            .attributes
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    pub fn remove_attribute(&mut self, id: PanelId, name: &str) -> Result<Option<String>> {
        Ok(self.panel_mut(id)?.attributes.remove(name))
    }

    pub fn set_inline_style(&mut self, id: PanelId, style: StyleProperties) -> Result<()> {
        self.panel_mut(id)?.inline_style = style;
        self.mark_style_dirty(id);
        Ok(())
    }

    /// Parse and set inline style text. Non-empty text that yields no
    /// property is rejected and leaves the panel untouched.
    pub fn set_inline_style_text(&mut self, id: PanelId, text: &str) -> Result<()> {
        let style = StyleProperties::parse_inline(text);
        if style.is_empty() && !text.trim().is_empty() {
            return Err(HudError::InvalidStyle(text.to_string()));
        }
        self.set_inline_style(id, style)
    }

    /// Replace the displayed text of a text-bearing panel
    pub fn set_text(&mut self, id: PanelId, text: &str) -> Result<bool> {
        let panel = self.panel_mut(id)?;
        if panel.kind.text() == Some(text) {
            return Ok(true);
        }
        let changed = panel.kind.set_text(text);
        if changed {
            self.mark_layout_dirty(id);
        }
        Ok(changed)
    }

    pub fn set_state(&mut self, id: PanelId, flags: PanelState, on: bool) -> Result<()> {
        let panel = self.panel_mut(id)?;
        let next = if on {
            panel.state | flags
        } else {
            panel.state - flags
        };
        if next == panel.state {
            return Ok(());
        }
        panel.state = next;
        if flags.contains(PanelState::VISIBLE) {
            self.mark_layout_dirty(id);
        }
        self.mark_style_dirty(id);
        Ok(())
    }

    pub fn set_visible(&mut self, id: PanelId, visible: bool) -> Result<()> {
        self.set_state(id, PanelState::VISIBLE, visible)
    }

    pub fn set_enabled(&mut self, id: PanelId, enabled: bool) -> Result<()> {
        self.set_state(id, PanelState::ENABLED, enabled)
    }

    pub fn set_selected(&mut self, id: PanelId, selected: bool) -> Result<()> {
        self.set_state(id, PanelState::SELECTED, selected)
    }

    /// Start an animation, replacing any running one with the same name
    pub fn start_animation(&mut self, id: PanelId, animation: Animation) -> Result<()> {
        let panel = self.panel_mut(id)?;
        panel.animations.retain(|a| a.name != animation.name);
        panel.animations.push(animation);
        self.mark_style_dirty(id);
        Ok(())
    }

    pub fn stop_animation(&mut self, id: PanelId, name: &str) -> Result<bool> {
        let panel = self.panel_mut(id)?;
        let before = panel.animations.len();
        panel.animations.retain(|a| a.name != name);
        let stopped = panel.animations.len() != before;
        if stopped {
            self.mark_style_dirty(id);
        }
        Ok(stopped)
    }

    /// Mark style dirty on a panel and its whole subtree. Layout is marked
    /// dirty on the subtree and on every ancestor.
    pub fn mark_style_dirty(&mut self, id: PanelId) {
        for panel in self.descendants(id) {
            if let Some(p) = self.panels.get_mut(panel) {
                p.dirty.insert(DirtyFlags::STYLE | DirtyFlags::LAYOUT);
            }
        }
        self.mark_layout_dirty(id);
    }

    /// Mark layout dirty on a panel and its ancestors
    pub fn mark_layout_dirty(&mut self, id: PanelId) {
        let mut current = Some(id);
        while let Some(cid) = current {
            match self.panels.get_mut(cid) {
                Some(p) => {
                    p.dirty.insert(DirtyFlags::LAYOUT);
                    current = p.parent;
                }
                None => break,
            }
        }
    }

    pub(crate) fn set_layout(&mut self, id: PanelId, bounds: Rect, content: Rect) {
        if let Some(p) = self.panels.get_mut(id) {
            p.bounds = bounds;
            p.content_bounds = content;
            p.dirty.remove(DirtyFlags::LAYOUT);
        }
    }
}

impl Default for PanelTree {
    fn default() -> Self {
        Self::new()
    }
}

fn stale(id: PanelId) -> HudError {
    log::warn!("stale panel handle {:?}", id);
    TreeError::UnknownPanel.into()
}

/// Iterator over a panel's ancestors, nearest first
pub struct Ancestors<'a> {
    tree: &'a PanelTree,
    next: Option<PanelId>,
}

impl Iterator for Ancestors<'_> {
    type Item = PanelId;

    fn next(&mut self) -> Option<PanelId> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_with_chain() -> (PanelTree, PanelId, PanelId, PanelId) {
        let mut tree = PanelTree::new();
        let root = tree.root();
        let a = tree.add(root, Panel::default().with_id("a")).unwrap();
        let b = tree.add(a, Panel::default().with_id("b")).unwrap();
        let c = tree.add(b, Panel::default().with_id("c")).unwrap();
        (tree, a, b, c)
    }

    #[test]
    fn test_attach_sets_both_links() {
        let (tree, a, b, _) = tree_with_chain();
        assert_eq!(tree.parent(b), Some(a));
        assert_eq!(tree.children(a), &[b]);
        assert!(tree.is_attached(b));
    }

    #[test]
    fn test_created_panels_start_detached() {
        let mut tree = PanelTree::new();
        let id = tree.create(Panel::default());
        assert_eq!(tree.parent(id), None);
        assert!(!tree.is_attached(id));
    }

    #[test]
    fn test_reattach_moves_panel() {
        let (mut tree, a, b, c) = tree_with_chain();
        tree.attach(a, c).unwrap();
        assert_eq!(tree.parent(c), Some(a));
        assert!(tree.children(b).is_empty());
        assert_eq!(tree.children(a), &[b, c]);
    }

    #[test]
    fn test_cycle_and_root_errors() {
        let (mut tree, a, _, c) = tree_with_chain();
        let root = tree.root();
        assert!(matches!(tree.attach(c, a), Err(HudError::Tree(TreeError::Cycle))));
        assert!(matches!(tree.attach(a, a), Err(HudError::Tree(TreeError::Cycle))));
        assert!(matches!(tree.attach(a, root), Err(HudError::Tree(TreeError::RootAttach))));
        assert!(matches!(tree.detach(root), Err(HudError::Tree(TreeError::RootDetach))));
    }

    #[test]
    fn test_destroy_cascades() {
        let (mut tree, a, b, c) = tree_with_chain();
        assert_eq!(tree.destroy(b).unwrap(), 2);
        assert!(!tree.contains(b));
        assert!(!tree.contains(c));
        assert!(tree.children(a).is_empty());
        assert!(matches!(
            tree.add_class(c, "x"),
            Err(HudError::Tree(TreeError::UnknownPanel))
        ));
    }

    #[test]
    fn test_detach_keeps_cached_bounds() {
        let (mut tree, _, b, _) = tree_with_chain();
        let rect = Rect::new(1.0, 2.0, 3.0, 4.0);
        tree.set_layout(b, rect, rect);
        tree.detach(b).unwrap();
        assert_eq!(tree.get(b).map(Panel::bounds), Some(rect));
    }

    #[test]
    fn test_style_dirty_propagates_down_layout_up() {
        let (mut tree, a, b, c) = tree_with_chain();
        let root = tree.root();
        for id in [root, a, b, c] {
            tree.get_mut(id).unwrap().dirty = DirtyFlags::empty();
        }

        tree.add_class(b, "hot").unwrap();
        assert!(tree.get(b).unwrap().is_style_dirty());
        assert!(tree.get(c).unwrap().is_style_dirty());
        assert!(!tree.get(a).unwrap().is_style_dirty());
        assert!(tree.get(a).unwrap().is_layout_dirty());
        assert!(tree.get(root).unwrap().is_layout_dirty());
    }

    #[test]
    fn test_insert_child_at_index() {
        let (mut tree, a, b, _) = tree_with_chain();
        let first = tree.create(Panel::default());
        tree.insert_child(a, 0, first).unwrap();
        assert_eq!(tree.children(a), &[first, b]);
    }

    #[test]
    fn test_find_by_id_and_inline_style_text() {
        let (mut tree, _, b, _) = tree_with_chain();
        assert_eq!(tree.find_by_id("b"), Some(b));
        assert!(tree.set_inline_style_text(b, "width: 5px").is_ok());
        assert!(matches!(
            tree.set_inline_style_text(b, "nonsense"),
            Err(HudError::InvalidStyle(_))
        ));
    }
}
