//! Packs independently laid-out trees left to right into one space.

use serde::Serialize;

use super::TreeBound;
use crate::view::{ScaleExtent, Transform, Viewport};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ForestBound {
    pub width: f32,
    pub height: f32,
}

impl ForestBound {
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Where one tree ends up inside the forest.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TreePlacement {
    pub index: usize,
    /// Measured box in the tree's own layout space.
    pub bound: TreeBound,
    /// Translation that moves the tree's box to its slot in forest space.
    pub offset_x: f32,
    pub offset_y: f32,
}

impl TreePlacement {
    /// Left edge of the tree in forest space.
    pub fn left(&self) -> f32 {
        self.bound.x + self.offset_x
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ForestLayout {
    pub placements: Vec<TreePlacement>,
    pub bound: ForestBound,
    /// False when some tree could not be measured yet and was counted as
    /// zero-sized; the caller should measure again on the next pass.
    pub complete: bool,
}

/// Measurement of a rendered tree, injected into [`compose_forest`].
///
/// `None` means the tree has not been committed yet and cannot be measured.
pub trait MeasureTree {
    fn measure(&mut self, tree_index: usize) -> Option<TreeBound>;
}

impl<F> MeasureTree for F
where
    F: FnMut(usize) -> Option<TreeBound>,
{
    fn measure(&mut self, tree_index: usize) -> Option<TreeBound> {
        self(tree_index)
    }
}

/// Assigns every tree a horizontal slot: each tree starts `gap` after the
/// right edge of the previous one, all top-aligned at y = 0.
///
/// The forest width is the sum of tree widths plus `gap` between each pair
/// and the height is the tallest tree. Any change to tree `i` shifts every
/// later tree, so this always runs over the whole forest.
pub fn compose_forest(tree_count: usize, gap: f32, measure: &mut dyn MeasureTree) -> ForestLayout {
    let mut placements = Vec::with_capacity(tree_count);
    let mut bound = ForestBound::default();
    let mut complete = true;
    let mut cursor = 0.0f32;

    for index in 0..tree_count {
        let tree_bound = match measure.measure(index) {
            Some(tree_bound) => tree_bound,
            None => {
                complete = false;
                TreeBound::default()
            }
        };
        if index > 0 {
            cursor += gap;
        }
        placements.push(TreePlacement {
            index,
            bound: tree_bound,
            offset_x: cursor - tree_bound.x,
            offset_y: -tree_bound.y,
        });
        cursor += tree_bound.width;
        bound.height = bound.height.max(tree_bound.height);
    }
    bound.width = cursor;

    tracing::debug!(
        trees = tree_count,
        width = bound.width,
        height = bound.height,
        complete,
        "composed forest"
    );
    ForestLayout {
        placements,
        bound,
        complete,
    }
}

/// Scale that fits the whole forest into the viewport, never above 1.
pub fn fit_scale(bound: ForestBound, viewport: Viewport) -> f32 {
    if bound.is_empty() || viewport.width <= 0.0 || viewport.height <= 0.0 {
        return 1.0;
    }
    (viewport.width / bound.width)
        .min(viewport.height / bound.height)
        .min(1.0)
}

/// Transform that shows the whole forest: fit scale (kept inside `extent`)
/// and centered on whichever axis has room to spare.
pub fn fit_transform(bound: ForestBound, viewport: Viewport, extent: ScaleExtent) -> Transform {
    let k = extent.clamp(fit_scale(bound, viewport));
    Transform {
        x: (viewport.width - bound.width * k) / 2.0,
        y: (viewport.height - bound.height * k) / 2.0,
        k,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(sizes: &[(f32, f32)]) -> Vec<TreeBound> {
        sizes
            .iter()
            .map(|&(width, height)| TreeBound {
                x: -width / 2.0,
                y: 0.0,
                width,
                height,
            })
            .collect()
    }

    #[test]
    fn two_single_node_trees() {
        let trees = bounds(&[(200.0, 100.0), (200.0, 100.0)]);
        let mut measure = |idx: usize| trees.get(idx).copied();
        let layout = compose_forest(2, 100.0, &mut measure);
        assert_eq!(layout.bound.width, 500.0);
        assert_eq!(layout.bound.height, 100.0);
        assert!(layout.complete);
        assert_eq!(layout.placements[0].left(), 0.0);
        assert_eq!(layout.placements[1].left(), 300.0);
    }

    #[test]
    fn width_is_sum_plus_gaps_and_height_is_max() {
        let sizes = [(120.0, 80.0), (300.0, 400.0), (50.0, 20.0), (75.5, 10.0)];
        let trees = bounds(&sizes);
        let mut measure = |idx: usize| trees.get(idx).copied();
        let gap = 37.0;
        let layout = compose_forest(sizes.len(), gap, &mut measure);
        let total: f32 = sizes.iter().map(|s| s.0).sum();
        assert!((layout.bound.width - (total + 3.0 * gap)).abs() < 1e-3);
        assert_eq!(layout.bound.height, 400.0);
        for pair in layout.placements.windows(2) {
            let right = pair[0].left() + pair[0].bound.width;
            assert!((pair[1].left() - right - gap).abs() < 1e-3);
        }
    }

    #[test]
    fn unmeasurable_tree_counts_as_zero_size() {
        let trees = bounds(&[(100.0, 50.0)]);
        let mut measure = |idx: usize| if idx == 1 { None } else { trees.get(idx).copied() };
        let layout = compose_forest(2, 10.0, &mut measure);
        assert!(!layout.complete);
        assert_eq!(layout.bound.width, 110.0);
    }

    #[test]
    fn empty_forest_has_empty_bound() {
        let mut measure = |_: usize| -> Option<TreeBound> { None };
        let layout = compose_forest(0, 10.0, &mut measure);
        assert!(layout.placements.is_empty());
        assert!(layout.bound.is_empty());
        assert!(layout.complete);
    }

    #[test]
    fn fit_never_upscales_and_centers() {
        let viewport = Viewport::new(1000.0, 800.0);
        let small = ForestBound {
            width: 200.0,
            height: 100.0,
        };
        let t = fit_transform(small, viewport, ScaleExtent::default());
        assert_eq!(t.k, 1.0);
        assert_eq!(t.x, 400.0);
        assert_eq!(t.y, 350.0);
    }

    #[test]
    fn fit_shrinks_large_forest_flush() {
        let viewport = Viewport::new(1000.0, 800.0);
        let wide = ForestBound {
            width: 4000.0,
            height: 800.0,
        };
        let t = fit_transform(wide, viewport, ScaleExtent::default());
        assert!((t.k - 0.25).abs() < 1e-6);
        assert!(t.x.abs() < 1e-3);
        assert!((t.y - 300.0).abs() < 1e-3);
        assert_eq!(fit_scale(ForestBound::default(), viewport), 1.0);
    }

    #[test]
    fn fit_scale_below_extent_is_clamped_to_min() {
        let viewport = Viewport::new(1000.0, 800.0);
        let huge = ForestBound {
            width: 100_000.0,
            height: 800.0,
        };
        assert!((fit_scale(huge, viewport) - 0.01).abs() < 1e-6);

        let extent = ScaleExtent::default();
        let t = fit_transform(huge, viewport, extent);
        assert_eq!(t.k, extent.min);
        // wider than the viewport even at min scale: centered, overflowing both sides
        assert!((t.x - (1000.0 - 100_000.0 * extent.min) / 2.0).abs() < 1e-2);
        assert!(t.x < 0.0);
        assert!((t.y - 320.0).abs() < 1e-3);
    }
}
