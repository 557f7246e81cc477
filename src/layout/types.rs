use serde::{Deserialize, Serialize};

use crate::model::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeMargin {
    pub sibling_margin: f32,
    pub children_margin: f32,
}

impl Default for NodeMargin {
    fn default() -> Self {
        Self {
            sibling_margin: 40.0,
            children_margin: 60.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeLayout {
    /// Arena index of the node.
    pub index: usize,
    pub id: NodeId,
    /// Top-left corner in the tree's own layout space.
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub depth: usize,
    pub collapsed: bool,
    pub collapsible: bool,
}

impl NodeLayout {
    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkLayout {
    pub source: NodeId,
    pub target: NodeId,
    /// Bottom-center of the parent box.
    pub from: (f32, f32),
    /// Top-center of the child box.
    pub to: (f32, f32),
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TreeBound {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl TreeBound {
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Positioned visible nodes of one tree, pre-order, root first.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TreeLayout {
    pub root: Option<NodeId>,
    pub nodes: Vec<NodeLayout>,
    pub links: Vec<LinkLayout>,
}

impl TreeLayout {
    /// Bounding box of every node box; zero-sized for an empty layout.
    pub fn bound(&self) -> TreeBound {
        if self.nodes.is_empty() {
            return TreeBound::default();
        }
        let mut min_x = f32::MAX;
        let mut min_y = f32::MAX;
        let mut max_x = f32::MIN;
        let mut max_y = f32::MIN;
        for node in &self.nodes {
            min_x = min_x.min(node.x);
            min_y = min_y.min(node.y);
            max_x = max_x.max(node.x + node.width);
            max_y = max_y.max(node.y + node.height);
        }
        TreeBound {
            x: min_x,
            y: min_y,
            width: max_x - min_x,
            height: max_y - min_y,
        }
    }

    pub fn node(&self, id: &NodeId) -> Option<&NodeLayout> {
        self.nodes.iter().find(|node| &node.id == id)
    }
}
