//! Selector matching against the panel tree
//!
//! Selectors are matched right-to-left: the subject compound must match the
//! panel itself, then each further step walks up the ancestor chain following
//! its combinator. Matching never mutates the tree.

use crate::css::{Combinator, PseudoState, Selector, SelectorCompound};
use crate::panel::{Panel, PanelId, PanelState, PanelTree};

/// Test whether panel `id` matches a full selector
pub fn matches_selector(tree: &PanelTree, id: PanelId, selector: &Selector) -> bool {
    let Some(subject) = selector.steps.first() else {
        return false;
    };
    if !matches_panel(tree, id, &subject.compound) {
        return false;
    }

    let mut current = id;
    for step in &selector.steps[1..] {
        match step.combinator {
            Some(Combinator::Child) => match tree.parent(current) {
                Some(parent) if matches_panel(tree, parent, &step.compound) => current = parent,
                _ => return false,
            },
            Some(Combinator::Descendant) | None => {
                // Nearest matching ancestor; later steps continue above it.
                match tree
                    .ancestors(current)
                    .find(|&ancestor| matches_panel(tree, ancestor, &step.compound))
                {
                    Some(ancestor) => current = ancestor,
                    None => return false,
                }
            }
        }
    }

    true
}

fn matches_panel(tree: &PanelTree, id: PanelId, compound: &SelectorCompound) -> bool {
    tree.get(id)
        .is_some_and(|panel| matches_compound(panel, compound))
}

/// Test whether a single panel satisfies every part of a compound
pub fn matches_compound(panel: &Panel, compound: &SelectorCompound) -> bool {
    if let Some(element) = &compound.element
        && !element.eq_ignore_ascii_case(panel.element_name())
    {
        return false;
    }

    if let Some(id) = &compound.id
        && id != panel.id()
    {
        return false;
    }

    if !compound.classes.iter().all(|class| panel.has_class(class)) {
        return false;
    }

    match &compound.pseudo {
        None => true,
        Some(pseudo) => matches_pseudo(panel.state(), pseudo),
    }
}

fn matches_pseudo(state: PanelState, pseudo: &PseudoState) -> bool {
    match pseudo {
        PseudoState::Hover => state.contains(PanelState::HOVER),
        PseudoState::Active => state.contains(PanelState::PRESSED),
        PseudoState::Focus => state.contains(PanelState::FOCUSED),
        PseudoState::Disabled => !state.contains(PanelState::ENABLED),
        PseudoState::Selected => state.contains(PanelState::SELECTED),
        PseudoState::Unknown(_) => false,
    }
}
