//! # Hudkit - Retained-Mode Game UI Engine
//!
//! A panel tree styled by CSS-like stylesheets, laid out with flow and
//! flexbox rules, animated with transitions and driven by pointer and
//! keyboard input. Rendering is left to the host.
//!
//! ## Architecture
//!
//! The engine is organized into the following core modules:
//!
//! - **css**: Stylesheet parsing, selectors and the style property record
//! - **style**: Selector matching and the cascade
//! - **panel**: The panel tree arena, panel kinds and state flags
//! - **layout**: Box model, flow and flexbox layout
//! - **events**: Hit testing, hover/press/focus tracking and bubbling
//! - **animation**: Timelines, property tracks and transitions
//! - **paint**: Renderer interface and the paint walk
//! - **text**: Attribute-driven and localized text
//! - **engine**: The UI context running the per-frame pipeline
//! - **utils**: Shared error types

pub mod animation;
pub mod css;
pub mod engine;
pub mod events;
pub mod layout;
pub mod paint;
pub mod panel;
pub mod style;
pub mod text;
pub mod utils;

// Re-export main types for convenience
pub use css::{StyleProperties, StyleSheet};
pub use engine::{EngineConfig, FrameStats, UiContext};
pub use events::{InputEvent, UiMessage};
pub use layout::{LayoutEngine, Rect, Size};
pub use panel::{Panel, PanelId, PanelKind, PanelTree};
pub use style::StyleEngine;
pub use utils::error::{HudError, Result, TreeError};

/// Engine version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = "hudkit";
