//! Flow layout: children stacked down or right, one after another.
//!
//! Fixed children take their resolved size. `fill-parent-flow` children
//! split whatever the fixed children and all margins leave, in proportion
//! to their weights.

use crate::panel::{Panel, PanelId, PanelTree};

use super::{Axis, Edges, LayoutEngine, Rect, Size, align_offset};

struct FlowItem {
    id: PanelId,
    margin: Edges,
    /// Fill weight along the flow axis, if the child fills
    weight: Option<f32>,
    main: f32,
    cross: f32,
}

impl LayoutEngine {
    pub(super) fn arrange_flow(
        &self,
        tree: &PanelTree,
        content: Rect,
        children: &[PanelId],
        axis: Axis,
    ) -> Vec<(PanelId, Rect)> {
        let reference = content.size();
        let main_size = axis.main(reference);
        let cross_size = axis.cross(reference);

        let mut items = Vec::with_capacity(children.len());
        for &id in children {
            let Some(panel) = tree.get(id) else {
                continue;
            };
            let style = &panel.computed_style;
            let margin = self.resolve_edges(style.margins(), reference);
            let cross_space =
                (cross_size - axis.cross_leading(&margin) - axis.cross_trailing(&margin)).max(0.0);
            let preferred = self.preferred_size(tree, panel, reference, axis.size(0.0, cross_space));
            let weight = axis
                .length(style)
                .filter(|l| l.is_fill())
                .map(|l| l.value.max(0.0));
            items.push(FlowItem {
                id,
                margin,
                weight,
                main: axis.main(preferred),
                cross: axis.cross(preferred),
            });
        }

        let fixed: f32 = items
            .iter()
            .map(|item| {
                let margins = axis.leading(&item.margin) + axis.trailing(&item.margin);
                margins + if item.weight.is_some() { 0.0 } else { item.main }
            })
            .sum();
        let remaining = (main_size - fixed).max(0.0);
        let total_weight: f32 = items.iter().filter_map(|item| item.weight).sum();

        if total_weight > 0.0 {
            for item in items.iter_mut() {
                if let Some(weight) = item.weight
                    && let Some(panel) = tree.get(item.id)
                {
                    let share = remaining * weight / total_weight;
                    item.main = self.clamp_axis(axis, &panel.computed_style, share, main_size);
                }
            }
        }

        let cross_axis = axis.flip();
        let mut cursor = axis.start(&content);
        let mut out = Vec::with_capacity(items.len());
        for item in &items {
            let Some(panel) = tree.get(item.id) else {
                continue;
            };
            cursor += axis.leading(&item.margin);
            let cross_space = (cross_size
                - axis.cross_leading(&item.margin)
                - axis.cross_trailing(&item.margin))
            .max(0.0);
            let cross_pos = align_offset(
                cross_axis.align(&panel.computed_style),
                axis.cross_start(&content) + axis.cross_leading(&item.margin),
                cross_space,
                item.cross,
            );
            out.push((item.id, axis.rect(cursor, cross_pos, item.main, item.cross)));
            cursor += item.main + axis.trailing(&item.margin);
        }
        out
    }

    /// Extent of flowed children: summed along the flow, widest across it.
    /// Fill children contribute only their margins.
    pub(super) fn measure_flow(
        &self,
        tree: &PanelTree,
        inner: Size,
        children: &[&Panel],
        axis: Axis,
    ) -> Size {
        let mut main = 0.0f32;
        let mut cross = 0.0f32;
        for child in children {
            let margin = self.resolve_edges(child.computed_style.margins(), inner);
            let size = self.preferred_size(tree, child, inner, Size::ZERO);
            main += axis.leading(&margin) + axis.main(size) + axis.trailing(&margin);
            cross = cross.max(
                axis.cross_leading(&margin) + axis.cross(size) + axis.cross_trailing(&margin),
            );
        }
        axis.size(main, cross)
    }
}
