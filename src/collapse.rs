//! Collapse/expand state for a [`Forest`].
//!
//! Collapse cascades to every descendant; expand only reopens the toggled
//! node. State is a set of collapsed ids next to the immutable arena, and
//! every effective change bumps the revision of the tree it touched so
//! downstream caches can tell which layouts went stale.

use std::collections::HashSet;

use crate::model::{Forest, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// `affected` counts the subtree nodes newly marked collapsed.
    Collapsed { tree: usize, affected: usize },
    Expanded { tree: usize },
    /// Unknown id or non-collapsible node.
    Ignored,
}

impl ToggleOutcome {
    pub fn changed_tree(&self) -> Option<usize> {
        match *self {
            ToggleOutcome::Collapsed { tree, .. } | ToggleOutcome::Expanded { tree } => Some(tree),
            ToggleOutcome::Ignored => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CollapseMachine {
    forest: Forest,
    collapsed: HashSet<NodeId>,
    revisions: Vec<u64>,
}

impl CollapseMachine {
    pub fn new(forest: Forest) -> Self {
        let revisions = vec![0; forest.tree_count()];
        Self {
            forest,
            collapsed: HashSet::new(),
            revisions,
        }
    }

    /// Swaps in a freshly built forest. Collapse state does not carry over:
    /// the new forest has new ids.
    pub fn replace(&mut self, forest: Forest) {
        *self = Self::new(forest);
    }

    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    pub fn revision(&self, tree: usize) -> u64 {
        self.revisions.get(tree).copied().unwrap_or(0)
    }

    pub fn is_collapsed(&self, id: &NodeId) -> bool {
        self.collapsed.contains(id)
    }

    pub fn collapsed_count(&self) -> usize {
        self.collapsed.len()
    }

    pub fn toggle(&mut self, id: &NodeId) -> ToggleOutcome {
        if self.is_collapsed(id) {
            self.expand(id)
        } else {
            self.collapse(id)
        }
    }

    /// Marks the node and its whole subtree collapsed. Re-collapsing an
    /// already collapsed node re-applies the cascade, which leaves the visible
    /// set unchanged.
    pub fn collapse(&mut self, id: &NodeId) -> ToggleOutcome {
        let Some(index) = self.collapsible_index(id) else {
            return ToggleOutcome::Ignored;
        };
        let mut affected = 0;
        if self.collapsed.insert(id.clone()) {
            affected += 1;
        }
        for idx in self.forest.descendants(index) {
            let node = self.forest.node(idx);
            if node.collapsible && self.collapsed.insert(node.id.clone()) {
                affected += 1;
            }
        }
        let tree = self.forest.node(index).tree;
        if affected > 0 {
            self.bump(tree);
        }
        tracing::debug!(node = %id, tree, affected, "collapsed subtree");
        ToggleOutcome::Collapsed { tree, affected }
    }

    /// Reopens only this node; descendants keep their own state.
    pub fn expand(&mut self, id: &NodeId) -> ToggleOutcome {
        let Some(index) = self.collapsible_index(id) else {
            return ToggleOutcome::Ignored;
        };
        let tree = self.forest.node(index).tree;
        if self.collapsed.remove(id) {
            self.bump(tree);
        }
        tracing::debug!(node = %id, tree, "expanded node");
        ToggleOutcome::Expanded { tree }
    }

    /// Collapses every collapsible node at `depth` or deeper.
    pub fn collapse_below_depth(&mut self, depth: usize) -> usize {
        let mut affected = 0;
        let mut touched = HashSet::new();
        for node in self.forest.nodes() {
            if node.collapsible && node.depth >= depth && self.collapsed.insert(node.id.clone()) {
                affected += 1;
                touched.insert(node.tree);
            }
        }
        for tree in touched {
            self.bump(tree);
        }
        affected
    }

    pub fn expand_all(&mut self) {
        if self.collapsed.is_empty() {
            return;
        }
        let mut touched = HashSet::new();
        for id in self.collapsed.drain() {
            if let Some(node) = self.forest.find(&id) {
                touched.insert(node.tree);
            }
        }
        for tree in touched {
            self.bump(tree);
        }
    }

    /// Nodes of `tree` not hidden behind a collapsed ancestor, pre-order.
    pub fn visible_nodes(&self, tree: usize) -> Vec<usize> {
        let Some(&root) = self.forest.roots().get(tree) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(idx) = stack.pop() {
            out.push(idx);
            let node = self.forest.node(idx);
            if !self.collapsed.contains(&node.id) {
                stack.extend(node.children.iter().rev());
            }
        }
        out
    }

    /// Children that take part in layout: empty while the node is collapsed.
    pub fn visible_children(&self, index: usize) -> &[usize] {
        let node = self.forest.node(index);
        if self.collapsed.contains(&node.id) {
            &[]
        } else {
            &node.children
        }
    }

    fn collapsible_index(&self, id: &NodeId) -> Option<usize> {
        let Some(index) = self.forest.index_of(id) else {
            tracing::trace!(node = %id, "toggle ignored: unknown node");
            return None;
        };
        if !self.forest.node(index).collapsible {
            tracing::trace!(node = %id, "toggle ignored: node has no children");
            return None;
        }
        Some(index)
    }

    fn bump(&mut self, tree: usize) {
        if let Some(rev) = self.revisions.get_mut(tree) {
            *rev += 1;
        }
    }
}
