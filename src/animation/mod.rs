//! Timed property animation
//!
//! The runtime only does timeline bookkeeping. Turning progress into
//! property values happens in the cascade, which reads each animation's
//! track when it recomputes a panel.

mod timeline;
mod timing;
mod track;

pub use timeline::{Animation, IterationCount};
pub use timing::TimingFunction;
pub use track::{AnimatedProperty, AnimatedValue, PropertyTrack};

use crate::css::StyleProperties;
use crate::panel::{PanelId, PanelTree};

/// Advances every panel's animations once per frame
#[derive(Debug, Default)]
pub struct AnimationRuntime {
    scratch: Vec<PanelId>,
}

impl AnimationRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance all animations by `dt` seconds, prune finished ones and mark
    /// style dirty wherever a driven property may have changed. Returns the
    /// number of animations that moved.
    pub fn advance(&mut self, tree: &mut PanelTree, dt: f32) -> usize {
        self.scratch.clear();
        self.scratch.extend(tree.ids().filter(|&id| {
            tree.get(id).is_some_and(|p| !p.animations.is_empty())
        }));

        let mut advanced = 0;
        for &id in &self.scratch {
            let Some(panel) = tree.get_mut(id) else {
                continue;
            };
            let mut touched = false;
            for animation in &mut panel.animations {
                if animation.advance(dt) {
                    advanced += 1;
                    touched |= animation.track.is_some();
                }
            }
            let before = panel.animations.len();
            panel.animations.retain(|a| !a.finished);
            touched |= panel.animations.len() != before;

            if touched {
                tree.mark_style_dirty(id);
            }
        }
        advanced
    }
}

/// Write every animation's current value into `style`, in start order
pub fn apply_overrides(animations: &[Animation], style: &mut StyleProperties) {
    for animation in animations {
        if let Some(track) = &animation.track {
            track.apply(style, animation.progress());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::Panel;

    fn fade(duration: f32) -> Animation {
        Animation::new("fade", duration).with_track(PropertyTrack {
            property: AnimatedProperty::Opacity,
            from: AnimatedValue::Number(0.0),
            to: AnimatedValue::Number(1.0),
            timing: TimingFunction::Linear,
        })
    }

    #[test]
    fn test_advance_prunes_finished() {
        let mut tree = PanelTree::new();
        let id = tree.add(tree.root(), Panel::default()).unwrap();
        tree.start_animation(id, fade(0.5)).unwrap();
        tree.start_animation(id, Animation::new("loop", 1.0).with_iterations(IterationCount::Infinite))
            .unwrap();

        let mut runtime = AnimationRuntime::new();
        assert_eq!(runtime.advance(&mut tree, 0.25), 2);
        assert_eq!(tree.get(id).unwrap().animations().len(), 2);

        runtime.advance(&mut tree, 0.5);
        let names: Vec<_> = tree
            .get(id)
            .unwrap()
            .animations()
            .iter()
            .map(|a| a.name.clone())
            .collect();
        assert_eq!(names, vec!["loop".to_string()]);
    }

    #[test]
    fn test_overrides_follow_progress() {
        let mut anim = fade(1.0);
        anim.advance(0.5);
        let mut style = StyleProperties::new();
        apply_overrides(&[anim], &mut style);
        assert_eq!(style.opacity, Some(0.5));
    }
}
