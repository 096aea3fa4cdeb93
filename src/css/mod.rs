//! Stylesheet language for hudkit
//!
//! Handles tokenizing, selector parsing and the sparse property record that
//! the cascade merges.

pub mod parser;
pub mod properties;
pub mod selector;
pub mod value;

pub use parser::{
    Declaration, FileSystemSource, StyleRule, StyleSheet, StyleSheetParser, StyleSource,
    parse_declaration_list,
};
pub use properties::{
    Align, AlignContent, AlignItems, AnimationDirection, BoxShadow, Display, FlexDirection,
    FlexWrap, FlowChildren, FontStyle, Gradient, GradientDirection, JustifyContent, LineHeight,
    Overflow, StyleProperties, TextAlign, TransitionSpec, DEFAULT_FONT_SIZE, DEFAULT_TEXT_COLOR,
};
pub use selector::{Combinator, PseudoState, Selector, SelectorCompound, SelectorStep};
pub use value::{Color, ComponentValue, Length, LengthUnit};
