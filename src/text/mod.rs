//! Attribute-driven text
//!
//! Panels carrying a `loc-key` attribute get their text from the host's
//! [`Localizer`]; a plain `text` attribute is used verbatim otherwise.

use std::collections::HashMap;

use crate::panel::{PanelId, PanelTree};

/// Attribute naming a localization key
pub const LOC_KEY_ATTRIBUTE: &str = "loc-key";
/// Attribute holding literal text
pub const TEXT_ATTRIBUTE: &str = "text";

/// Host string table
pub trait Localizer {
    fn lookup(&self, key: &str) -> Option<String>;
}

impl Localizer for HashMap<String, String> {
    fn lookup(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Resolve the text a panel's attributes ask for, if any
pub fn resolve_text(tree: &PanelTree, id: PanelId, localizer: &dyn Localizer) -> Option<String> {
    let panel = tree.get(id)?;
    if let Some(key) = panel.attribute(LOC_KEY_ATTRIBUTE) {
        return match localizer.lookup(key) {
            Some(text) => Some(text),
            None => {
                log::warn!("no localized string for `{key}` on panel `{}`", panel.id());
                panel
                    .attribute(TEXT_ATTRIBUTE)
                    .map(str::to_string)
                    .or_else(|| Some(key.to_string()))
            }
        };
    }
    panel.attribute(TEXT_ATTRIBUTE).map(str::to_string)
}

/// Apply attribute text to every attached text-bearing panel. Returns the
/// number of panels whose text changed.
pub fn apply_text(tree: &mut PanelTree, localizer: &dyn Localizer) -> usize {
    let mut changed = 0;
    for id in tree.descendants(tree.root()) {
        let Some(text) = resolve_text(tree, id, localizer) else {
            continue;
        };
        let before = tree.get(id).and_then(|p| p.text().map(str::to_string));
        if before.as_deref() == Some(text.as_str()) {
            continue;
        }
        if tree.set_text(id, &text).unwrap_or(false) {
            changed += 1;
        }
    }
    changed
}
