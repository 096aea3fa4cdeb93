//! Retained panel tree
//!
//! Panels live in a slotmap arena and refer to each other by `PanelId`
//! handles, so re-parenting and destruction never leave dangling links:
//! a handle to a destroyed panel simply stops resolving.

mod node;
mod tree;

pub use node::{Panel, PanelKind};
pub use tree::{Ancestors, PanelTree};

use bitflags::bitflags;
use slotmap::new_key_type;

new_key_type! {
    /// Handle into the panel arena. Stable across insertions/removals.
    pub struct PanelId;
}

bitflags! {
    /// Interaction state flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PanelState: u16 {
        const HOVER = 1 << 0;
        const PRESSED = 1 << 1;
        const FOCUSED = 1 << 2;
        const SELECTED = 1 << 3;
        const ENABLED = 1 << 4;
        const VISIBLE = 1 << 5;
        const ACCEPTS_INPUT = 1 << 6;
    }
}

bitflags! {
    /// Cached data that must be recomputed
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DirtyFlags: u8 {
        const STYLE = 1 << 0;
        const LAYOUT = 1 << 1;
    }
}
