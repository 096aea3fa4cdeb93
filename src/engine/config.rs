//! Engine configuration

use crate::layout::{FontMetrics, Size};

/// Settings consumed by [`super::UiContext::new`]
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Root panel size
    pub viewport: Size,
    /// Metrics for the fallback text measurer and the paint walk
    pub font_metrics: FontMetrics,
    /// Queued inputs handled per frame; the rest wait for the next one
    pub max_inputs_per_frame: usize,
    /// Log per-frame statistics at trace level
    pub log_frame_stats: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            viewport: Size::new(1920.0, 1080.0),
            font_metrics: FontMetrics::default(),
            max_inputs_per_frame: 256,
            log_frame_stats: false,
        }
    }
}

impl EngineConfig {
    pub fn with_viewport(mut self, width: f32, height: f32) -> Self {
        self.viewport = Size::new(width, height);
        self
    }

    pub fn with_font_metrics(mut self, metrics: FontMetrics) -> Self {
        self.font_metrics = metrics;
        self
    }

    pub fn with_max_inputs_per_frame(mut self, max: usize) -> Self {
        self.max_inputs_per_frame = max;
        self
    }

    pub fn with_frame_stats(mut self, enabled: bool) -> Self {
        self.log_frame_stats = enabled;
        self
    }
}
