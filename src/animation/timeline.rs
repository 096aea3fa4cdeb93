//! Timeline bookkeeping for a single animation

use crate::css::TransitionSpec;

use super::track::{AnimatedValue, PropertyTrack};

/// How many times an animation plays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IterationCount {
    Finite(u32),
    Infinite,
}

impl Default for IterationCount {
    fn default() -> Self {
        IterationCount::Finite(1)
    }
}

/// One active animation on a panel
#[derive(Debug, Clone, PartialEq)]
pub struct Animation {
    pub name: String,
    /// Time into the current iteration, in seconds
    pub elapsed: f32,
    /// Remaining start delay, in seconds
    pub delay: f32,
    pub duration: f32,
    pub iteration_count: IterationCount,
    pub current_iteration: u32,
    /// Odd iterations play backwards
    pub alternate: bool,
    pub finished: bool,
    /// Property the animation drives. Timeline-only animations have none.
    pub track: Option<PropertyTrack>,
}

impl Animation {
    pub fn new(name: impl Into<String>, duration: f32) -> Self {
        Self {
            name: name.into(),
            elapsed: 0.0,
            delay: 0.0,
            duration: duration.max(0.0),
            iteration_count: IterationCount::default(),
            current_iteration: 0,
            alternate: false,
            finished: false,
            track: None,
        }
    }

    /// Transition of one property from the displayed value to a new target
    pub fn transition(spec: &TransitionSpec, from: AnimatedValue, to: AnimatedValue) -> Self {
        let mut animation = Self::new(format!("transition:{}", spec.property.name()), spec.duration);
        animation.delay = spec.delay.max(0.0);
        animation.track = Some(PropertyTrack {
            property: spec.property,
            from,
            to,
            timing: spec.timing,
        });
        animation
    }

    pub fn with_iterations(mut self, count: IterationCount) -> Self {
        self.iteration_count = match count {
            IterationCount::Finite(n) => IterationCount::Finite(n.max(1)),
            infinite => infinite,
        };
        self
    }

    pub fn alternating(mut self, alternate: bool) -> Self {
        self.alternate = alternate;
        self
    }

    pub fn with_track(mut self, track: PropertyTrack) -> Self {
        self.track = Some(track);
        self
    }

    pub fn is_transition(&self) -> bool {
        self.name.starts_with("transition:")
    }

    pub fn is_reversed(&self) -> bool {
        self.alternate && self.current_iteration % 2 == 1
    }

    /// Advance by `dt` seconds. Returns `true` when the timeline moved.
    ///
    /// Crossing the duration completes an iteration and carries the
    /// remainder into the next one, unless the iteration count is exhausted,
    /// in which case the animation rests at its end and is marked finished.
    pub fn advance(&mut self, dt: f32) -> bool {
        if self.finished || dt <= 0.0 {
            return false;
        }

        let mut dt = dt;
        if self.delay > 0.0 {
            let waited = dt.min(self.delay);
            self.delay -= waited;
            dt -= waited;
            if dt <= 0.0 {
                return false;
            }
        }

        if self.duration <= f32::EPSILON {
            self.elapsed = 0.0;
            self.finish();
            return true;
        }

        self.elapsed += dt;
        if self.elapsed < self.duration {
            return true;
        }

        let completed = (self.elapsed / self.duration).floor();
        let remainder = self.elapsed - completed * self.duration;
        let completed = completed as u64;

        match self.iteration_count {
            IterationCount::Finite(n) if u64::from(self.current_iteration) + completed >= u64::from(n) => {
                self.finish();
            }
            _ => {
                let next = u64::from(self.current_iteration) + completed;
                self.current_iteration = u32::try_from(next).unwrap_or(u32::MAX);
                self.elapsed = remainder;
            }
        }
        true
    }

    fn finish(&mut self) {
        if let IterationCount::Finite(n) = self.iteration_count {
            self.current_iteration = n.saturating_sub(1);
        }
        self.elapsed = self.duration;
        self.finished = true;
    }

    /// Progress within the current iteration, direction applied
    pub fn progress(&self) -> f32 {
        let raw = if self.duration <= f32::EPSILON {
            1.0
        } else {
            (self.elapsed / self.duration).clamp(0.0, 1.0)
        };
        if self.is_reversed() {
            1.0 - raw
        } else {
            raw
        }
    }

    /// Current value of the driven property, if any
    pub fn value(&self) -> Option<AnimatedValue> {
        self.track.map(|track| track.sample(self.progress()))
    }
}
