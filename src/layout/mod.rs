mod forest;
mod tidy;
pub(crate) mod types;

pub use forest::*;
pub use types::*;

use std::collections::HashMap;

use crate::collapse::CollapseMachine;
use crate::model::{NodeId, Size};
use tidy::tidy_positions;

/// Lays out the visible part of one tree.
///
/// Collapsed subtrees never reach the positioning pass, so the cost is
/// proportional to the number of visible nodes. The root's box is centered
/// on x = 0 with its top edge on y = 0; children go downward.
pub fn layout_tree(machine: &CollapseMachine, tree: usize, margin: NodeMargin) -> TreeLayout {
    let forest = machine.forest();
    let Some(&root) = forest.roots().get(tree) else {
        return TreeLayout::default();
    };
    let size = forest.node(root).size;
    let separation = size.width + margin.sibling_margin;
    let level_step = size.height + margin.children_margin;

    let placements = tidy_positions(root, separation, |idx| machine.visible_children(idx));

    let mut nodes = Vec::with_capacity(placements.len());
    for placement in &placements {
        let node = forest.node(placement.index);
        nodes.push(NodeLayout {
            index: placement.index,
            id: node.id.clone(),
            x: placement.center_x - size.width / 2.0,
            y: placement.level as f32 * level_step,
            width: size.width,
            height: size.height,
            depth: node.depth,
            collapsed: machine.is_collapsed(&node.id),
            collapsible: node.collapsible,
        });
    }

    let centers: HashMap<usize, f32> = placements
        .iter()
        .map(|placement| (placement.index, placement.center_x))
        .collect();
    let links = placements
        .iter()
        .filter_map(|placement| {
            let parent = placement.parent?;
            let parent_level = placement.level.checked_sub(1)?;
            let parent_center = centers.get(&parent).copied()?;
            Some(link_between(
                forest.node(parent).id.clone(),
                forest.node(placement.index).id.clone(),
                (parent_center, parent_level as f32 * level_step),
                (placement.center_x, placement.level as f32 * level_step),
                size,
            ))
        })
        .collect();

    tracing::trace!(tree, visible = nodes.len(), "laid out tree");
    TreeLayout {
        root: Some(forest.node(root).id.clone()),
        nodes,
        links,
    }
}

/// Lays out every tree of the forest independently.
pub fn layout_forest(machine: &CollapseMachine, margin: NodeMargin) -> Vec<TreeLayout> {
    (0..machine.forest().tree_count())
        .map(|tree| layout_tree(machine, tree, margin))
        .collect()
}

fn link_between(
    source: NodeId,
    target: NodeId,
    parent_top_center: (f32, f32),
    child_top_center: (f32, f32),
    size: Size,
) -> LinkLayout {
    LinkLayout {
        source,
        target,
        from: (parent_top_center.0, parent_top_center.1 + size.height),
        to: child_top_center,
    }
}
