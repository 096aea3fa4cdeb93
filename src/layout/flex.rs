//! Flexbox layout.
//!
//! Steps:
//! 1. Pick main/cross axes from `flex-direction`.
//! 2. Collect items with their hypothetical main size (basis).
//! 3. Break items into lines when wrapping.
//! 4. Per line, distribute free space with `flex-grow` / `flex-shrink`.
//! 5. Position along the main axis (`justify-content`, `gap`).
//! 6. Size lines (`align-content`) and align items inside them
//!    (`align-items` / `align-self`).

use crate::css::{Align, AlignContent, AlignItems, FlexWrap, JustifyContent, StyleProperties};
use crate::panel::{Panel, PanelId, PanelTree};

use super::{Axis, Edges, LayoutEngine, Rect, Size, align_offset};

/// A flex item with its resolved sizes
struct FlexItem<'a> {
    id: Option<PanelId>,
    style: &'a StyleProperties,
    margin: Edges,
    base: f32,
    grow: f32,
    shrink: f32,
    main: f32,
    cross: f32,
    cross_explicit: bool,
    align: AlignItems,
}

impl FlexItem<'_> {
    fn outer_main(&self, axis: Axis) -> f32 {
        self.main + axis.leading(&self.margin) + axis.trailing(&self.margin)
    }

    fn outer_base(&self, axis: Axis) -> f32 {
        self.base + axis.leading(&self.margin) + axis.trailing(&self.margin)
    }

    fn outer_cross(&self, axis: Axis) -> f32 {
        self.cross + axis.cross_leading(&self.margin) + axis.cross_trailing(&self.margin)
    }
}

fn gaps(count: usize, gap: f32) -> f32 {
    gap * count.saturating_sub(1) as f32
}

/// Leading offset and extra spacing between items for the given slack
fn justify_spacing(justify: JustifyContent, slack: f32, count: usize) -> (f32, f32) {
    let n = count as f32;
    match justify {
        JustifyContent::Start => (0.0, 0.0),
        JustifyContent::Center => (slack / 2.0, 0.0),
        JustifyContent::End => (slack, 0.0),
        JustifyContent::SpaceBetween if count > 1 => (0.0, slack / (n - 1.0)),
        JustifyContent::SpaceBetween => (0.0, 0.0),
        JustifyContent::SpaceAround => {
            let each = slack / n;
            (each / 2.0, each)
        }
        JustifyContent::SpaceEvenly => {
            let each = slack / (n + 1.0);
            (each, each)
        }
    }
}

/// Leading offset, spacing between lines and extra cross size per line
fn align_content_spacing(align: AlignContent, slack: f32, lines: usize) -> (f32, f32, f32) {
    let n = lines as f32;
    match align {
        AlignContent::Start => (0.0, 0.0, 0.0),
        AlignContent::Center => (slack / 2.0, 0.0, 0.0),
        AlignContent::End => (slack, 0.0, 0.0),
        AlignContent::SpaceBetween if lines > 1 => (0.0, slack / (n - 1.0), 0.0),
        AlignContent::SpaceBetween => (0.0, 0.0, 0.0),
        AlignContent::SpaceAround => {
            let each = slack / n;
            (each / 2.0, each, 0.0)
        }
        AlignContent::Stretch => (0.0, 0.0, slack / n),
    }
}

/// Grow or shrink one line's items so their outer sizes fill `main_size`.
///
/// Items whose min/max clamp moves them off their flexed size are frozen at
/// the clamped size; the remaining free space is spread over the unfrozen
/// items again until no item changes.
fn resolve_main_sizes(
    items: &mut [FlexItem<'_>],
    axis: Axis,
    main_size: f32,
    gap: f32,
    clamp: impl Fn(&StyleProperties, f32) -> f32,
) {
    let initial: f32 = items.iter().map(|i| i.outer_base(axis)).sum::<f32>() + gaps(items.len(), gap);
    let growing = main_size > initial;

    for item in items.iter_mut() {
        item.main = item.base;
    }
    if main_size == initial {
        return;
    }

    let mut frozen = vec![false; items.len()];
    loop {
        let used: f32 = items
            .iter()
            .zip(&frozen)
            .map(|(i, &f)| if f { i.outer_main(axis) } else { i.outer_base(axis) })
            .sum::<f32>()
            + gaps(items.len(), gap);
        let free = main_size - used;

        let total: f32 = items
            .iter()
            .zip(&frozen)
            .filter(|(_, f)| !**f)
            .map(|(i, _)| if growing { i.grow } else { i.shrink * i.base })
            .sum();
        if total <= 0.0 {
            return;
        }

        let mut changed = false;
        for (item, frozen) in items.iter_mut().zip(frozen.iter_mut()) {
            if *frozen {
                continue;
            }
            let flexed = if growing {
                item.base + free * (item.grow / total)
            } else {
                (item.base + free * (item.shrink * item.base / total)).max(0.0)
            };
            let clamped = clamp(item.style, flexed);
            item.main = clamped;
            if (clamped - flexed).abs() > f32::EPSILON {
                *frozen = true;
                changed = true;
            }
        }
        if !changed {
            return;
        }
    }
}

impl LayoutEngine {
    fn flex_axis(style: &StyleProperties) -> (Axis, bool) {
        let direction = style.flex_direction.unwrap_or_default();
        let axis = if direction.is_row() {
            Axis::Horizontal
        } else {
            Axis::Vertical
        };
        (axis, direction.is_reverse())
    }

    fn flex_gap(&self, style: &StyleProperties, main_size: f32) -> f32 {
        style
            .gap
            .map_or(0.0, |g| g.resolve_or_zero(main_size, self.viewport))
            .max(0.0)
    }

    /// Collect items with bases clamped by min/max. A main-axis `Fill`
    /// length becomes a zero basis that grows by its weight.
    fn flex_items<'a>(
        &self,
        tree: &PanelTree,
        container: &StyleProperties,
        children: &[(Option<PanelId>, &'a Panel)],
        axis: Axis,
        reference: Size,
    ) -> Vec<FlexItem<'a>> {
        let main_size = axis.main(reference);
        let cross_size = axis.cross(reference);
        let align_items = container.align_items.unwrap_or_default();

        children
            .iter()
            .map(|&(id, panel)| {
                let style = &panel.computed_style;
                let margin = self.resolve_edges(style.margins(), reference);
                let cross_space = (cross_size
                    - axis.cross_leading(&margin)
                    - axis.cross_trailing(&margin))
                .max(0.0);
                let preferred =
                    self.preferred_size(tree, panel, reference, axis.size(0.0, cross_space));

                let mut grow = style.grow().max(0.0);
                let main_length = axis.length(style);
                let basis = self.resolve_length(style.flex_basis, main_size, main_size);
                let base = match (basis, main_length) {
                    (Some(basis), _) => basis,
                    (None, Some(length)) if length.is_fill() => {
                        grow = grow.max(length.value);
                        0.0
                    }
                    (None, _) => axis.main(preferred),
                };

                FlexItem {
                    id,
                    style,
                    margin,
                    base: self.clamp_axis(axis, style, base, main_size),
                    grow,
                    shrink: style.shrink().max(0.0),
                    main: 0.0,
                    cross: axis.cross(preferred),
                    cross_explicit: axis
                        .cross_length(style)
                        .is_some_and(|l| !l.is_intrinsic()),
                    align: style.align_self.unwrap_or(align_items),
                }
            })
            .collect()
    }

    pub(super) fn arrange_flex(
        &self,
        tree: &PanelTree,
        container: &StyleProperties,
        content: Rect,
        children: &[PanelId],
    ) -> Vec<(PanelId, Rect)> {
        let (axis, reverse) = Self::flex_axis(container);
        let reference = content.size();
        let main_size = axis.main(reference);
        let cross_size = axis.cross(reference);
        let gap = self.flex_gap(container, main_size);
        let wrap = container.flex_wrap.unwrap_or_default() == FlexWrap::Wrap;

        let panels: Vec<(Option<PanelId>, &Panel)> = children
            .iter()
            .filter_map(|&id| tree.get(id).map(|p| (Some(id), p)))
            .collect();
        let mut items = self.flex_items(tree, container, &panels, axis, reference);
        if items.is_empty() {
            return Vec::new();
        }

        // Line breaking on hypothetical outer sizes
        let mut lines: Vec<std::ops::Range<usize>> = Vec::new();
        let mut start = 0;
        let mut used = 0.0f32;
        for (index, item) in items.iter().enumerate() {
            let outer = item.outer_base(axis);
            if wrap && index > start && used + gap + outer > main_size {
                lines.push(start..index);
                start = index;
                used = 0.0;
            }
            used += if index > start { gap + outer } else { outer };
        }
        lines.push(start..items.len());

        for line in &lines {
            resolve_main_sizes(&mut items[line.clone()], axis, main_size, gap, |style, value| {
                self.clamp_axis(axis, style, value, main_size)
            });
        }

        // Line cross sizes and their offsets
        let mut line_cross: Vec<f32> = if wrap {
            lines
                .iter()
                .map(|line| {
                    items[line.clone()]
                        .iter()
                        .map(|i| i.outer_cross(axis))
                        .fold(0.0f32, f32::max)
                })
                .collect()
        } else {
            vec![cross_size]
        };
        let (mut cross_cursor, line_spacing) = if wrap {
            let total: f32 = line_cross.iter().sum::<f32>() + gaps(lines.len(), gap);
            let slack = (cross_size - total).max(0.0);
            let (lead, between, extra) = align_content_spacing(
                container.align_content.unwrap_or_default(),
                slack,
                lines.len(),
            );
            for cross in line_cross.iter_mut() {
                *cross += extra;
            }
            (lead, between + gap)
        } else {
            (0.0, 0.0)
        };

        let justify = container.justify_content.unwrap_or_default();
        let main_start = axis.start(&content);
        let cross_start = axis.cross_start(&content);
        let mut out = Vec::with_capacity(items.len());

        for (line, &line_size) in lines.iter().zip(&line_cross) {
            let line_items = &items[line.clone()];
            let occupied: f32 =
                line_items.iter().map(|i| i.outer_main(axis)).sum::<f32>() + gaps(line_items.len(), gap);
            let slack = (main_size - occupied).max(0.0);
            let (mut cursor, between) = justify_spacing(justify, slack, line_items.len());

            for item in line_items {
                let Some(id) = item.id else {
                    continue;
                };
                let main_pos = cursor + axis.leading(&item.margin);
                cursor += item.outer_main(axis) + between + gap;

                let space = (line_size
                    - axis.cross_leading(&item.margin)
                    - axis.cross_trailing(&item.margin))
                .max(0.0);
                let item_cross_start = cross_start + cross_cursor + axis.cross_leading(&item.margin);
                let (cross_pos, cross) = match item.align {
                    AlignItems::Stretch if !item.cross_explicit => {
                        let stretched =
                            self.clamp_axis(axis.flip(), item.style, space, cross_size);
                        (item_cross_start, stretched)
                    }
                    align => {
                        let align = match align {
                            AlignItems::Center => Align::Center,
                            AlignItems::End => Align::End,
                            AlignItems::Start | AlignItems::Stretch => Align::Start,
                        };
                        (
                            align_offset(align, item_cross_start, space, item.cross),
                            item.cross,
                        )
                    }
                };

                let main_pos = if reverse {
                    main_size - (main_pos + item.main)
                } else {
                    main_pos
                };
                out.push((id, axis.rect(main_start + main_pos, cross_pos, item.main, cross)));
            }
            cross_cursor += line_size + line_spacing;
        }
        out
    }

    /// Unwrapped extent of flex children: bases plus margins and gaps along
    /// the main axis, the largest outer cross size across it
    pub(super) fn measure_flex(
        &self,
        tree: &PanelTree,
        container: &StyleProperties,
        inner: Size,
        children: &[&Panel],
    ) -> Size {
        let (axis, _) = Self::flex_axis(container);
        let gap = self.flex_gap(container, axis.main(inner));
        let panels: Vec<(Option<PanelId>, &Panel)> = children.iter().map(|&p| (None, p)).collect();
        let items = self.flex_items(tree, container, &panels, axis, inner);

        let main = items.iter().map(|i| i.outer_base(axis)).sum::<f32>() + gaps(items.len(), gap);
        let cross = items
            .iter()
            .map(|i| i.outer_cross(axis))
            .fold(0.0f32, f32::max);
        axis.size(main, cross)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::StyleSheet;
    use crate::style::StyleEngine;
    use pretty_assertions::assert_eq;

    fn flex(css: &str, count: usize) -> (PanelTree, PanelId, Vec<PanelId>) {
        let mut tree = PanelTree::new();
        let row = tree.add(tree.root(), Panel::default().with_id("Row")).unwrap();
        let children = (0..count)
            .map(|i| tree.add(row, Panel::default().with_id(format!("I{i}"))).unwrap())
            .collect();
        let mut styles = StyleEngine::new();
        styles.add_sheet(StyleSheet::parse(css));
        styles.recompute_dirty(&mut tree);
        let mut engine = LayoutEngine::new();
        engine.set_viewport(800.0, 600.0);
        engine.layout(&mut tree);
        (tree, row, children)
    }

    fn rect(tree: &PanelTree, id: PanelId) -> Rect {
        tree.get(id).unwrap().bounds()
    }

    fn xs(tree: &PanelTree, ids: &[PanelId]) -> Vec<f32> {
        ids.iter().map(|&id| rect(tree, id).x).collect()
    }

    #[test]
    fn test_space_between() {
        let (tree, _, items) = flex(
            "#Row { display: flex; width: 400px; height: 50px; justify-content: space-between; }
             #Row > Panel { width: 50px; height: 20px; }",
            3,
        );
        assert_eq!(xs(&tree, &items), vec![0.0, 175.0, 350.0]);
    }

    #[test]
    fn test_justify_center_end_and_gap() {
        let (tree, _, items) = flex(
            "#Row { display: flex; width: 300px; height: 10px; justify-content: center; gap: 10px; }
             #Row > Panel { width: 50px; height: 10px; }",
            2,
        );
        assert_eq!(xs(&tree, &items), vec![95.0, 155.0]);

        let (tree, _, items) = flex(
            "#Row { display: flex; width: 300px; height: 10px; justify-content: end; }
             #Row > Panel { width: 50px; height: 10px; }",
            2,
        );
        assert_eq!(xs(&tree, &items), vec![200.0, 250.0]);
    }

    #[test]
    fn test_justify_space_around_and_evenly() {
        let (tree, _, items) = flex(
            "#Row { display: flex; width: 300px; height: 10px; justify-content: space-around; }
             #Row > Panel { width: 50px; height: 10px; }",
            2,
        );
        assert_eq!(xs(&tree, &items), vec![50.0, 200.0]);

        let (tree, _, items) = flex(
            "#Row { display: flex; width: 250px; height: 10px; justify-content: space-evenly; }
             #Row > Panel { width: 50px; height: 10px; }",
            2,
        );
        assert_eq!(xs(&tree, &items), vec![50.0, 150.0]);
    }

    #[test]
    fn test_grow_distributes_free_space() {
        let (tree, _, items) = flex(
            "#Row { display: flex; width: 400px; height: 10px; }
             #I0 { width: 100px; flex-grow: 1; }
             #I1 { width: 100px; flex-grow: 3; }",
            2,
        );
        assert_eq!(rect(&tree, items[0]).width, 150.0);
        assert_eq!(rect(&tree, items[1]).width, 250.0);
        assert_eq!(rect(&tree, items[1]).x, 150.0);
    }

    #[test]
    fn test_shrink_weighted_by_basis() {
        let (tree, _, items) = flex(
            "#Row { display: flex; width: 200px; height: 10px; }
             #I0 { width: 100px; }
             #I1 { width: 300px; }",
            2,
        );
        // overflow 200, weights 100:300
        assert_eq!(rect(&tree, items[0]).width, 50.0);
        assert_eq!(rect(&tree, items[1]).width, 150.0);
    }

    #[test]
    fn test_grow_redistributes_past_max() {
        let (tree, _, items) = flex(
            "#Row { display: flex; width: 300px; height: 10px; }
             #I0 { width: 50px; flex-grow: 1; max-width: 60px; }
             #I1 { width: 50px; flex-grow: 1; }",
            2,
        );
        assert_eq!(rect(&tree, items[0]).width, 60.0);
        assert_eq!(rect(&tree, items[1]).width, 240.0);
        assert_eq!(rect(&tree, items[1]).x, 60.0);
    }

    #[test]
    fn test_shrink_redistributes_past_min() {
        let (tree, _, items) = flex(
            "#Row { display: flex; width: 200px; height: 10px; }
             #I0 { width: 150px; min-width: 140px; }
             #I1 { width: 150px; }",
            2,
        );
        assert_eq!(rect(&tree, items[0]).width, 140.0);
        assert_eq!(rect(&tree, items[1]).width, 60.0);
    }

    #[test]
    fn test_shrink_never_negative() {
        let (tree, _, items) = flex(
            "#Row { display: flex; width: 10px; height: 10px; }
             #I0 { width: 100px; margin-left: 50px; }
             #I1 { width: 0px; flex-shrink: 5; }",
            2,
        );
        assert!(rect(&tree, items[0]).width >= 0.0);
        assert_eq!(rect(&tree, items[1]).width, 0.0);
    }

    #[test]
    fn test_fill_length_grows_by_weight() {
        let (tree, _, items) = flex(
            "#Row { display: flex; width: 300px; height: 10px; }
             #I0 { width: 100px; }
             #I1 { width: fill-parent-flow; }",
            2,
        );
        assert_eq!(rect(&tree, items[1]).width, 200.0);
    }

    #[test]
    fn test_align_items_and_self() {
        let (tree, _, items) = flex(
            "#Row { display: flex; width: 300px; height: 100px; align-items: center; }
             #I0 { width: 10px; height: 20px; }
             #I1 { width: 10px; height: 20px; align-self: end; }
             #I2 { width: 10px; align-self: stretch; }",
            3,
        );
        assert_eq!(rect(&tree, items[0]).y, 40.0);
        assert_eq!(rect(&tree, items[1]).y, 80.0);
        assert_eq!(rect(&tree, items[2]).height, 100.0);
    }

    #[test]
    fn test_column_reverse() {
        let (tree, _, items) = flex(
            "#Row { display: flex; flex-direction: column-reverse; width: 50px; height: 100px; }
             #Row > Panel { height: 30px; }",
            2,
        );
        assert_eq!(rect(&tree, items[0]), Rect::new(0.0, 70.0, 50.0, 30.0));
        assert_eq!(rect(&tree, items[1]).y, 40.0);
    }

    #[test]
    fn test_wrap_breaks_lines() {
        let (tree, _, items) = flex(
            "#Row { display: flex; flex-wrap: wrap; width: 100px; height: 100px; align-content: start; }
             #Row > Panel { width: 40px; height: 20px; }",
            3,
        );
        assert_eq!(rect(&tree, items[0]), Rect::new(0.0, 0.0, 40.0, 20.0));
        assert_eq!(rect(&tree, items[1]), Rect::new(40.0, 0.0, 40.0, 20.0));
        assert_eq!(rect(&tree, items[2]), Rect::new(0.0, 20.0, 40.0, 20.0));
    }

    #[test]
    fn test_align_content_modes() {
        let cases = [
            ("start", [0.0, 20.0]),
            ("center", [30.0, 50.0]),
            ("end", [60.0, 80.0]),
            ("space-between", [0.0, 80.0]),
            ("space-around", [15.0, 65.0]),
            ("stretch", [0.0, 50.0]),
        ];
        for (mode, expected) in cases {
            let (tree, _, items) = flex(
                &format!(
                    "#Row {{ display: flex; flex-wrap: wrap; width: 100px; height: 100px; align-content: {mode}; }}
                     #Row > Panel {{ width: 60px; height: 20px; }}"
                ),
                2,
            );
            let ys: Vec<f32> = items.iter().map(|&id| rect(&tree, id).y).collect();
            assert_eq!(ys, expected.to_vec(), "align-content: {mode}");
        }
    }

    #[test]
    fn test_intrinsic_container_size() {
        let (tree, row, _) = flex(
            "#Row { display: flex; gap: 5px; padding: 2px; }
             #I0 { width: 20px; height: 10px; }
             #I1 { width: 30px; height: 15px; margin: 1px; }",
            2,
        );
        // 20 + 5 + (1 + 30 + 1) = 57, tallest 17
        assert_eq!(rect(&tree, row).size(), Size::new(61.0, 21.0));
    }
}
