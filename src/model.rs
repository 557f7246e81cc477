//! Node model: raw plan trees decorated into a flat arena of [`TreeNode`]s.
//!
//! The arena keeps parent/child links as indices so collapse state can live
//! in a small map keyed by [`NodeId`] instead of being written into cloned
//! trees.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ir::{OperatorInfo, RawNode};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Opaque per-node identifier. Unique within one build of a forest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Source of node ids. Every build asks for fresh ids, so collapse state is
/// reset whenever the forest is rebuilt from new input.
pub trait IdGenerator {
    fn next_id(&mut self) -> NodeId;
}

/// Random v4 UUIDs.
#[cfg(feature = "uuid")]
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIds;

#[cfg(feature = "uuid")]
impl IdGenerator for UuidIds {
    fn next_id(&mut self) -> NodeId {
        NodeId(uuid::Uuid::new_v4().to_string())
    }
}

/// Deterministic ids (`n0`, `n1`, ...). The counter never rewinds, so a
/// rebuild still hands out ids that were never seen before.
#[derive(Debug, Clone)]
pub struct SequentialIds {
    prefix: String,
    next: u64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 0,
        }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new("n")
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> NodeId {
        let id = NodeId(format!("{}{}", self.prefix, self.next));
        self.next += 1;
        id
    }
}

pub fn default_id_generator() -> Box<dyn IdGenerator> {
    #[cfg(feature = "uuid")]
    {
        Box::new(UuidIds)
    }
    #[cfg(not(feature = "uuid"))]
    {
        Box::new(SequentialIds::default())
    }
}

#[derive(Debug, Clone)]
pub struct TreeNode {
    pub id: NodeId,
    pub info: OperatorInfo,
    /// Index of the tree (root) this node belongs to.
    pub tree: usize,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    pub depth: usize,
    /// True iff the raw node had at least one child. Never changes.
    pub collapsible: bool,
    pub size: Size,
}

/// Arena holding every node of every tree, in pre-order per tree.
#[derive(Debug, Clone, Default)]
pub struct Forest {
    nodes: Vec<TreeNode>,
    roots: Vec<usize>,
    index: HashMap<NodeId, usize>,
}

impl Forest {
    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    pub fn node(&self, index: usize) -> &TreeNode {
        &self.nodes[index]
    }

    pub fn get(&self, index: usize) -> Option<&TreeNode> {
        self.nodes.get(index)
    }

    pub fn roots(&self) -> &[usize] {
        &self.roots
    }

    pub fn root(&self, tree: usize) -> Option<&TreeNode> {
        self.roots.get(tree).map(|&idx| &self.nodes[idx])
    }

    pub fn tree_count(&self) -> usize {
        self.roots.len()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn index_of(&self, id: &NodeId) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn find(&self, id: &NodeId) -> Option<&TreeNode> {
        self.index_of(id).map(|idx| &self.nodes[idx])
    }

    /// All descendants of `index` (excluding itself), pre-order.
    pub fn descendants(&self, index: usize) -> Vec<usize> {
        let mut out = Vec::new();
        let mut stack: Vec<usize> = self.nodes[index].children.iter().rev().copied().collect();
        while let Some(idx) = stack.pop() {
            out.push(idx);
            stack.extend(self.nodes[idx].children.iter().rev());
        }
        out
    }
}

/// Decorates a sequence of raw plans into a forest, one tree per plan.
///
/// Iterative so arbitrarily deep plans do not exhaust the stack. Cost is
/// linear in the total node count.
pub fn build_forest(raws: &[RawNode], size: Size, ids: &mut dyn IdGenerator) -> Forest {
    let mut forest = Forest::default();
    for (tree, raw) in raws.iter().enumerate() {
        let root = push_tree(&mut forest, raw, tree, size, ids);
        forest.roots.push(root);
    }
    tracing::debug!(
        trees = forest.roots.len(),
        nodes = forest.nodes.len(),
        "built plan forest"
    );
    forest
}

/// Single-plan convenience over [`build_forest`].
pub fn build_tree(raw: &RawNode, size: Size, ids: &mut dyn IdGenerator) -> Forest {
    build_forest(std::slice::from_ref(raw), size, ids)
}

fn push_tree(
    forest: &mut Forest,
    raw: &RawNode,
    tree: usize,
    size: Size,
    ids: &mut dyn IdGenerator,
) -> usize {
    let root = forest.nodes.len();
    let mut stack: Vec<(&RawNode, Option<usize>, usize)> = vec![(raw, None, 0)];
    while let Some((raw, parent, depth)) = stack.pop() {
        let idx = forest.nodes.len();
        let id = ids.next_id();
        forest.index.insert(id.clone(), idx);
        forest.nodes.push(TreeNode {
            id,
            info: raw.info.clone(),
            tree,
            parent,
            children: Vec::with_capacity(raw.children().len()),
            depth,
            collapsible: raw.has_children(),
            size,
        });
        if let Some(parent) = parent {
            forest.nodes[parent].children.push(idx);
        }
        for child in raw.children().iter().rev() {
            stack.push((child, Some(idx), depth + 1));
        }
    }
    root
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RawNode {
        RawNode::new("root").with_children(vec![
            RawNode::new("a").with_children(vec![RawNode::new("a1"), RawNode::new("a2")]),
            RawNode::new("b").with_children(vec![]),
        ])
    }

    #[test]
    fn decorates_every_node() {
        let mut ids = SequentialIds::default();
        let forest = build_tree(&sample(), Size::new(200.0, 100.0), &mut ids);
        assert_eq!(forest.len(), 5);
        assert_eq!(forest.tree_count(), 1);

        let names: Vec<&str> = forest.nodes().iter().map(|n| n.info.name.as_str()).collect();
        assert_eq!(names, vec!["root", "a", "a1", "a2", "b"]);

        let root = forest.root(0).unwrap();
        assert!(root.collapsible);
        assert_eq!(root.depth, 0);
        assert_eq!(root.parent, None);
        let child_names: Vec<&str> = root
            .children
            .iter()
            .map(|&idx| forest.node(idx).info.name.as_str())
            .collect();
        assert_eq!(child_names, vec!["a", "b"]);

        // empty children list is not collapsible
        let b = forest.nodes().iter().find(|n| n.info.name == "b").unwrap();
        assert!(!b.collapsible);
        assert!(forest.nodes().iter().all(|n| n.size == Size::new(200.0, 100.0)));
    }

    #[test]
    fn ids_are_unique_and_fresh_per_build() {
        let mut ids = SequentialIds::default();
        let first = build_tree(&sample(), Size::new(1.0, 1.0), &mut ids);
        let second = build_tree(&sample(), Size::new(1.0, 1.0), &mut ids);
        let mut seen = std::collections::HashSet::new();
        for node in first.nodes().iter().chain(second.nodes()) {
            assert!(seen.insert(node.id.clone()), "duplicate id {}", node.id);
        }
        assert_eq!(first.find(&first.node(2).id).unwrap().info.name, "a1");
    }

    #[cfg(feature = "uuid")]
    #[test]
    fn uuid_ids_differ() {
        let mut ids = UuidIds;
        assert_ne!(ids.next_id(), ids.next_id());
    }

    #[test]
    fn builds_one_tree_per_plan() {
        let mut ids = SequentialIds::default();
        let forest = build_forest(
            &[sample(), RawNode::new("solo")],
            Size::new(10.0, 10.0),
            &mut ids,
        );
        assert_eq!(forest.tree_count(), 2);
        assert_eq!(forest.root(1).unwrap().info.name, "solo");
        assert_eq!(forest.root(1).unwrap().tree, 1);
        assert_eq!(forest.descendants(forest.roots()[0]).len(), 4);
    }

    #[test]
    fn handles_very_deep_chains() {
        let mut raw = RawNode::new("leaf");
        for depth in 0..20_000 {
            raw = RawNode::new(format!("n{depth}")).with_children(vec![raw]);
        }
        let mut ids = SequentialIds::default();
        let forest = build_tree(&raw, Size::new(1.0, 1.0), &mut ids);
        assert_eq!(forest.len(), 20_001);
        assert_eq!(forest.nodes().last().unwrap().depth, 20_000);
    }
}
