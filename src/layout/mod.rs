//! Layout engine
//!
//! A full top-down pass runs from the root at viewport size. Each panel
//! resolves its box model against its parent's content rectangle, then
//! arranges its children with one of three modes:
//! - free placement at the content origin (`flow-children: none`)
//! - flow, stacking down or right
//! - flexbox, with grow/shrink, wrapping and multi-line alignment

mod flex;
mod flow;
mod geometry;
mod measure;

pub use geometry::{Edges, Rect, Size};
pub use measure::{ApproximateTextMeasure, FontMetrics, FontSpec, TextMeasure};

use crate::css::{Align, Display, FlowChildren, Length, StyleProperties};
use crate::panel::{Panel, PanelId, PanelKind, PanelTree};

/// Main/cross axis selector shared by flow and flex
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    pub(crate) fn flip(self) -> Axis {
        match self {
            Axis::Horizontal => Axis::Vertical,
            Axis::Vertical => Axis::Horizontal,
        }
    }

    pub(crate) fn main(self, size: Size) -> f32 {
        match self {
            Axis::Horizontal => size.width,
            Axis::Vertical => size.height,
        }
    }

    pub(crate) fn cross(self, size: Size) -> f32 {
        match self {
            Axis::Horizontal => size.height,
            Axis::Vertical => size.width,
        }
    }

    pub(crate) fn start(self, rect: &Rect) -> f32 {
        match self {
            Axis::Horizontal => rect.x,
            Axis::Vertical => rect.y,
        }
    }

    pub(crate) fn cross_start(self, rect: &Rect) -> f32 {
        match self {
            Axis::Horizontal => rect.y,
            Axis::Vertical => rect.x,
        }
    }

    pub(crate) fn leading(self, edges: &Edges) -> f32 {
        match self {
            Axis::Horizontal => edges.left,
            Axis::Vertical => edges.top,
        }
    }

    pub(crate) fn trailing(self, edges: &Edges) -> f32 {
        match self {
            Axis::Horizontal => edges.right,
            Axis::Vertical => edges.bottom,
        }
    }

    pub(crate) fn cross_leading(self, edges: &Edges) -> f32 {
        match self {
            Axis::Horizontal => edges.top,
            Axis::Vertical => edges.left,
        }
    }

    pub(crate) fn cross_trailing(self, edges: &Edges) -> f32 {
        match self {
            Axis::Horizontal => edges.bottom,
            Axis::Vertical => edges.right,
        }
    }

    pub(crate) fn size(self, main: f32, cross: f32) -> Size {
        match self {
            Axis::Horizontal => Size::new(main, cross),
            Axis::Vertical => Size::new(cross, main),
        }
    }

    pub(crate) fn rect(self, main_pos: f32, cross_pos: f32, main: f32, cross: f32) -> Rect {
        match self {
            Axis::Horizontal => Rect::new(main_pos, cross_pos, main, cross),
            Axis::Vertical => Rect::new(cross_pos, main_pos, cross, main),
        }
    }

    /// The style's size along this axis
    pub(crate) fn length(self, style: &StyleProperties) -> Option<Length> {
        match self {
            Axis::Horizontal => style.width,
            Axis::Vertical => style.height,
        }
    }

    pub(crate) fn cross_length(self, style: &StyleProperties) -> Option<Length> {
        match self {
            Axis::Horizontal => style.height,
            Axis::Vertical => style.width,
        }
    }

    /// Alignment override acting along this axis
    pub(crate) fn align(self, style: &StyleProperties) -> Align {
        match self {
            Axis::Horizontal => style.horizontal_align,
            Axis::Vertical => style.vertical_align,
        }
        .unwrap_or_default()
    }

    fn min_max(self, style: &StyleProperties) -> (Option<Length>, Option<Length>) {
        match self {
            Axis::Horizontal => (style.min_width, style.max_width),
            Axis::Vertical => (style.min_height, style.max_height),
        }
    }
}

/// Position of a box of `size` inside `space` starting at `start`
pub(crate) fn align_offset(align: Align, start: f32, space: f32, size: f32) -> f32 {
    match align {
        Align::Start => start,
        Align::Center => start + (space - size) / 2.0,
        Align::End => start + space - size,
    }
}

/// A panel takes part in its parent's layout only when shown
pub(crate) fn participates(panel: &Panel) -> bool {
    panel.is_visible() && panel.computed_style.display_mode() != Display::None
}

/// Layout engine for computing panel rectangles
pub struct LayoutEngine {
    viewport: Size,
    font_metrics: FontMetrics,
    text_measure: Box<dyn TextMeasure>,
}

impl LayoutEngine {
    /// Create a new layout engine
    pub fn new() -> Self {
        Self::with_metrics(Size::new(1920.0, 1080.0), FontMetrics::default())
    }

    pub fn with_metrics(viewport: Size, font_metrics: FontMetrics) -> Self {
        Self {
            viewport,
            font_metrics,
            text_measure: Box::new(ApproximateTextMeasure::new(font_metrics)),
        }
    }

    /// Set viewport dimensions
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.viewport = Size::new(width.max(0.0), height.max(0.0));
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn font_metrics(&self) -> &FontMetrics {
        &self.font_metrics
    }

    /// Replace the text measurer used for intrinsic sizing
    pub fn set_text_measure(&mut self, measure: Box<dyn TextMeasure>) {
        self.text_measure = measure;
    }

    /// Lay out the whole attached tree. Returns the number of panels placed.
    pub fn layout(&self, tree: &mut PanelTree) -> usize {
        let root = tree.root();
        let bounds = Rect::from_size(self.viewport);
        let mut placed = 0;
        self.place(tree, root, bounds, self.viewport, &mut placed);
        placed
    }

    /// Fix a panel's bounds, then arrange and place its children
    fn place(
        &self,
        tree: &mut PanelTree,
        id: PanelId,
        bounds: Rect,
        reference: Size,
        placed: &mut usize,
    ) {
        let Some(panel) = tree.get(id) else {
            return;
        };
        let padding = self.resolve_edges(panel.computed_style.paddings(), reference);
        let content = bounds.inset(&padding);
        let placements = self.arrange(tree, panel, content);

        tree.set_layout(id, bounds, content);
        *placed += 1;

        for (child, rect) in placements {
            self.place(tree, child, rect, content.size(), placed);
        }
    }

    /// Child rectangles for a panel whose content rectangle is `content`
    fn arrange(&self, tree: &PanelTree, panel: &Panel, content: Rect) -> Vec<(PanelId, Rect)> {
        let style = &panel.computed_style;
        let children = panel.children();
        if children.is_empty() {
            return Vec::new();
        }

        let hidden = Rect::new(content.x, content.y, 0.0, 0.0);
        let mut out: Vec<(PanelId, Rect)> = children
            .iter()
            .copied()
            .filter(|&c| !tree.get(c).is_some_and(participates))
            .map(|c| (c, hidden))
            .collect();

        let visible: Vec<PanelId> = children
            .iter()
            .copied()
            .filter(|&c| tree.get(c).is_some_and(participates))
            .collect();

        let arranged = match (style.display_mode(), style.flow()) {
            (Display::Flex, _) => self.arrange_flex(tree, style, content, &visible),
            (_, FlowChildren::Down) => self.arrange_flow(tree, content, &visible, Axis::Vertical),
            (_, FlowChildren::Right) => {
                self.arrange_flow(tree, content, &visible, Axis::Horizontal)
            }
            (_, FlowChildren::None) => self.arrange_free(tree, content, &visible),
        };
        out.extend(arranged);
        out
    }

    /// Free placement: content origin plus margin and `x`/`y`, honouring
    /// alignment overrides
    fn arrange_free(&self, tree: &PanelTree, content: Rect, children: &[PanelId]) -> Vec<(PanelId, Rect)> {
        let reference = content.size();
        let mut out = Vec::with_capacity(children.len());
        for &child in children {
            let Some(panel) = tree.get(child) else {
                continue;
            };
            let style = &panel.computed_style;
            let margin = self.resolve_edges(style.margins(), reference);
            let space = shrink_by(reference, &margin);
            let size = self.preferred_size(tree, panel, reference, space);

            let dx = style
                .x
                .map_or(0.0, |x| x.resolve_or_zero(reference.width, self.viewport));
            let dy = style
                .y
                .map_or(0.0, |y| y.resolve_or_zero(reference.height, self.viewport));
            let x = align_offset(
                Axis::Horizontal.align(style),
                content.x + margin.left,
                space.width,
                size.width,
            ) + dx;
            let y = align_offset(
                Axis::Vertical.align(style),
                content.y + margin.top,
                space.height,
                size.height,
            ) + dy;
            out.push((child, Rect::new(x, y, size.width, size.height)));
        }
        out
    }

    /// Resolve margin or padding lengths. Horizontal edges resolve against
    /// the reference width, vertical edges against its height.
    pub(crate) fn resolve_edges(&self, lengths: [Length; 4], reference: Size) -> Edges {
        let [top, right, bottom, left] = lengths;
        let vp = self.viewport;
        Edges::new(
            top.resolve_or_zero(reference.height, vp).max(0.0),
            right.resolve_or_zero(reference.width, vp).max(0.0),
            bottom.resolve_or_zero(reference.height, vp).max(0.0),
            left.resolve_or_zero(reference.width, vp).max(0.0),
        )
    }

    /// Resolve a size along one axis. `Fill` takes `fill`, intrinsic units
    /// give `None`.
    pub(crate) fn resolve_length(&self, length: Option<Length>, reference: f32, fill: f32) -> Option<f32> {
        match length {
            Some(l) if l.is_fill() => Some(fill),
            Some(l) => l.resolve(reference, self.viewport),
            None => None,
        }
    }

    /// Apply min/max along an axis; min wins over max, never negative
    pub(crate) fn clamp_axis(&self, axis: Axis, style: &StyleProperties, value: f32, reference: f32) -> f32 {
        let (min, max) = axis.min_max(style);
        let mut value = value;
        if let Some(max) = self.resolve_length(max, reference, reference) {
            value = value.min(max);
        }
        if let Some(min) = self.resolve_length(min, reference, reference) {
            value = value.max(min);
        }
        value.max(0.0)
    }

    /// Border-box size a panel asks for, margins excluded
    pub(crate) fn preferred_size(&self, tree: &PanelTree, panel: &Panel, reference: Size, fill: Size) -> Size {
        let style = &panel.computed_style;
        let width = self.resolve_length(style.width, reference.width, fill.width);
        let height = self.resolve_length(style.height, reference.height, fill.height);
        let (width, height) = match (width, height) {
            (Some(w), Some(h)) => (w, h),
            _ => {
                let intrinsic = self.measure(tree, panel, reference);
                (
                    width.unwrap_or(intrinsic.width),
                    height.unwrap_or(intrinsic.height),
                )
            }
        };
        Size::new(
            self.clamp_axis(Axis::Horizontal, style, width, reference.width),
            self.clamp_axis(Axis::Vertical, style, height, reference.height),
        )
    }

    /// Intrinsic border-box size: text or image content, or the extent of
    /// the children under the panel's layout mode, plus padding
    pub fn measure(&self, tree: &PanelTree, panel: &Panel, reference: Size) -> Size {
        let style = &panel.computed_style;
        let padding = self.resolve_edges(style.paddings(), reference);
        let inner = shrink_by(reference, &padding);

        let own = match panel.kind() {
            PanelKind::Panel | PanelKind::Image { .. } => Size::ZERO,
            kind => {
                let font = FontSpec::from_style(style, &self.font_metrics);
                self.text_measure.measure(kind.text().unwrap_or_default(), &font)
            }
        };

        let visible: Vec<&Panel> = panel
            .children()
            .iter()
            .filter_map(|&c| tree.get(c))
            .filter(|p| participates(p))
            .collect();
        let children = if visible.is_empty() {
            Size::ZERO
        } else {
            match (style.display_mode(), style.flow()) {
                (Display::Flex, _) => self.measure_flex(tree, style, inner, &visible),
                (_, FlowChildren::Down) => self.measure_flow(tree, inner, &visible, Axis::Vertical),
                (_, FlowChildren::Right) => {
                    self.measure_flow(tree, inner, &visible, Axis::Horizontal)
                }
                (_, FlowChildren::None) => self.measure_free(tree, inner, &visible),
            }
        };

        Size::new(
            own.width.max(children.width) + padding.horizontal(),
            own.height.max(children.height) + padding.vertical(),
        )
    }

    fn measure_free(&self, tree: &PanelTree, inner: Size, children: &[&Panel]) -> Size {
        let mut extent = Size::ZERO;
        for child in children {
            let style = &child.computed_style;
            let margin = self.resolve_edges(style.margins(), inner);
            let size = self.preferred_size(tree, child, inner, Size::ZERO);
            let dx = style.x.map_or(0.0, |x| x.resolve_or_zero(inner.width, self.viewport));
            let dy = style.y.map_or(0.0, |y| y.resolve_or_zero(inner.height, self.viewport));
            extent.width = extent.width.max(dx + margin.horizontal() + size.width);
            extent.height = extent.height.max(dy + margin.vertical() + size.height);
        }
        extent
    }
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn shrink_by(size: Size, edges: &Edges) -> Size {
    Size::new(
        (size.width - edges.horizontal()).max(0.0),
        (size.height - edges.vertical()).max(0.0),
    )
}
