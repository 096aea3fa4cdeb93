//! Paint walk
//!
//! The core never rasterizes. It walks the laid-out tree in paint order
//! (parent before children, children in list order) and issues draw calls
//! against a host [`Renderer`].

use crate::css::{Align, Color, Gradient, StyleProperties, TextAlign};
use crate::layout::{FontMetrics, FontSpec, Rect, Size, participates};
use crate::panel::{Panel, PanelId, PanelKind, PanelTree};

/// Drawing backend supplied by the host
#[cfg_attr(test, mockall::automock)]
pub trait Renderer {
    fn draw_rect(&mut self, rect: Rect, color: Color);
    fn draw_rounded_rect(&mut self, rect: Rect, color: Color, radius: f32);
    fn draw_gradient_rect(&mut self, rect: Rect, gradient: Gradient, radius: f32);
    fn draw_text(
        &mut self,
        text: &str,
        rect: Rect,
        color: Color,
        font: &FontSpec,
        h_align: TextAlign,
        v_align: Align,
    );
    fn measure_text(&mut self, text: &str, font: &FontSpec) -> Size;
    fn push_clip_rect(&mut self, rect: Rect);
    fn pop_clip_rect(&mut self);
    fn draw_line(&mut self, from: (f32, f32), to: (f32, f32), color: Color, width: f32);
    fn draw_image(&mut self, source: &str, rect: Rect, opacity: f32);
}

/// Paint the subtree under `root` with default font metrics. Returns the
/// number of panels painted.
pub fn paint(tree: &PanelTree, root: PanelId, renderer: &mut dyn Renderer) -> usize {
    paint_with_metrics(tree, root, renderer, &FontMetrics::default())
}

pub fn paint_with_metrics(
    tree: &PanelTree,
    root: PanelId,
    renderer: &mut dyn Renderer,
    metrics: &FontMetrics,
) -> usize {
    let mut painter = Painter {
        tree,
        renderer,
        metrics,
        painted: 0,
    };
    painter.paint_panel(root, 1.0);
    painter.painted
}

struct Painter<'a> {
    tree: &'a PanelTree,
    renderer: &'a mut dyn Renderer,
    metrics: &'a FontMetrics,
    painted: usize,
}

impl Painter<'_> {
    fn paint_panel(&mut self, id: PanelId, parent_opacity: f32) {
        let tree = self.tree;
        let Some(panel) = tree.get(id) else {
            return;
        };
        if !participates(panel) {
            return;
        }
        let style = &panel.computed_style;
        let opacity = parent_opacity * style.resolved_opacity().clamp(0.0, 1.0);
        if opacity <= 0.0 {
            return;
        }

        self.paint_box(panel.bounds(), style, opacity);
        self.paint_content(panel, opacity);
        self.painted += 1;

        let clip = style.clips_overflow();
        if clip {
            self.renderer.push_clip_rect(panel.bounds());
        }
        for &child in panel.children() {
            self.paint_panel(child, opacity);
        }
        if clip {
            self.renderer.pop_clip_rect();
        }
    }

    fn paint_box(&mut self, bounds: Rect, style: &StyleProperties, opacity: f32) {
        let radius = style.border_radius.unwrap_or(0.0).max(0.0);

        if let Some(shadow) = style.box_shadow {
            let spread = shadow.blur.max(0.0) / 2.0;
            let rect = Rect::new(
                bounds.x + shadow.offset_x - spread,
                bounds.y + shadow.offset_y - spread,
                bounds.width + spread * 2.0,
                bounds.height + spread * 2.0,
            );
            self.fill(rect, shadow.color.with_opacity(opacity), radius);
        }

        if let Some(gradient) = style.background_gradient {
            let gradient = Gradient {
                from: gradient.from.with_opacity(opacity),
                to: gradient.to.with_opacity(opacity),
                ..gradient
            };
            self.renderer.draw_gradient_rect(bounds, gradient, radius);
        } else if let Some(color) = style.background_color {
            self.fill(bounds, color.with_opacity(opacity), radius);
        }

        let width = style.border_width.unwrap_or(0.0);
        if width > 0.0
            && let Some(color) = style.border_color
        {
            let color = color.with_opacity(opacity);
            let half = width / 2.0;
            let (left, top) = (bounds.x + half, bounds.y + half);
            let (right, bottom) = (bounds.right() - half, bounds.bottom() - half);
            self.renderer.draw_line((left, top), (right, top), color, width);
            self.renderer.draw_line((right, top), (right, bottom), color, width);
            self.renderer.draw_line((right, bottom), (left, bottom), color, width);
            self.renderer.draw_line((left, bottom), (left, top), color, width);
        }
    }

    fn fill(&mut self, rect: Rect, color: Color, radius: f32) {
        if color.a == 0 {
            return;
        }
        if radius > 0.0 {
            self.renderer.draw_rounded_rect(rect, color, radius);
        } else {
            self.renderer.draw_rect(rect, color);
        }
    }

    fn paint_content(&mut self, panel: &Panel, opacity: f32) {
        let style = &panel.computed_style;
        match panel.kind() {
            PanelKind::Panel => {}
            PanelKind::Image { source } => {
                self.renderer
                    .draw_image(source, panel.content_bounds(), opacity);
            }
            kind => {
                let Some(text) = kind.text().filter(|t| !t.is_empty()) else {
                    return;
                };
                let font = FontSpec::from_style(style, self.metrics);
                self.renderer.draw_text(
                    text,
                    panel.content_bounds(),
                    style.text_color().with_opacity(opacity),
                    &font,
                    style.text_align.unwrap_or_default(),
                    Align::Center,
                );
            }
        }
    }
}
