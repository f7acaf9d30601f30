//! Dominator and post-dominator tree storage hooks.
//!
//! Computing dominance is left to an external analysis. The IR core only needs
//! two things from the tree it hands results to:
//!
//! - an **invalidation** trigger, fired whenever a control-flow edge is added
//!   or removed, and
//! - a **removal** hook, so a destroyed block never lingers as a tree node.
//!
//! [`DomTree`] provides exactly that, plus storage for the immediate-dominator
//! relation an analysis inserts. A function owns one tree for forward
//! dominance and one for post-dominance.

use std::collections::HashMap;

use crate::ir::BlockId;

/// A node in a dominator tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomNode {
    idom: Option<BlockId>,
    children: Vec<BlockId>,
}

impl DomNode {
    /// Returns the immediate dominator, `None` for the root.
    #[must_use]
    pub const fn immediate_dominator(&self) -> Option<BlockId> {
        self.idom
    }

    /// Returns the blocks immediately dominated by this one.
    #[must_use]
    pub fn children(&self) -> &[BlockId] {
        &self.children
    }
}

/// A lazily-invalidated (post-)dominator tree.
///
/// # Examples
///
/// ```rust
/// use flowir::ir::{BlockId, DomTree};
///
/// let mut tree = DomTree::new();
/// tree.insert(BlockId::new(0), None);
/// tree.insert(BlockId::new(2), Some(BlockId::new(0)));
/// tree.mark_valid();
///
/// assert!(tree.dominates(BlockId::new(0), BlockId::new(2)));
///
/// tree.invalidate();
/// assert!(!tree.is_valid());
/// ```
#[derive(Debug, Clone, Default)]
pub struct DomTree {
    valid: bool,
    nodes: HashMap<BlockId, DomNode>,
}

impl DomTree {
    /// Creates an empty, invalid tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the tree reflects the current control flow graph.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.valid
    }

    /// Marks the tree as stale.
    ///
    /// Nodes are kept; an analysis decides whether to rebuild or patch them.
    pub fn invalidate(&mut self) {
        self.valid = false;
    }

    /// Marks the tree as up to date after an analysis has filled it in.
    pub fn mark_valid(&mut self) {
        self.valid = true;
    }

    /// Removes every node and marks the tree stale.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.valid = false;
    }

    /// Records `block` with immediate dominator `idom`.
    ///
    /// Re-inserting a block moves it under its new parent.
    pub fn insert(&mut self, block: BlockId, idom: Option<BlockId>) {
        let old_idom = self.nodes.get(&block).and_then(|node| node.idom);
        if let Some(old) = old_idom {
            if let Some(parent) = self.nodes.get_mut(&old) {
                parent.children.retain(|&child| child != block);
            }
        }

        self.nodes.entry(block).or_default().idom = idom;

        if let Some(parent) = idom {
            self.nodes.entry(parent).or_default().children.push(block);
        }
    }

    /// Removes the node for `block`, if the tree has one.
    ///
    /// The node is unlinked from its parent, and its children become roots
    /// until the next analysis. Removing a block that was never inserted is a
    /// no-op. Returns `true` if a node was removed.
    pub fn remove(&mut self, block: BlockId) -> bool {
        let Some(node) = self.nodes.remove(&block) else {
            return false;
        };

        if let Some(parent) = node.idom.and_then(|idom| self.nodes.get_mut(&idom)) {
            parent.children.retain(|&child| child != block);
        }

        for child in node.children {
            if let Some(child) = self.nodes.get_mut(&child) {
                child.idom = None;
            }
        }

        true
    }

    /// Returns the node for `block`.
    #[must_use]
    pub fn node(&self, block: BlockId) -> Option<&DomNode> {
        self.nodes.get(&block)
    }

    /// Returns `true` if `block` has a node in this tree.
    #[must_use]
    pub fn contains(&self, block: BlockId) -> bool {
        self.nodes.contains_key(&block)
    }

    /// Returns the number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the tree has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the immediate dominator of `block`.
    #[must_use]
    pub fn immediate_dominator(&self, block: BlockId) -> Option<BlockId> {
        self.nodes.get(&block).and_then(DomNode::immediate_dominator)
    }

    /// Checks if `a` dominates `b` according to the recorded nodes.
    ///
    /// A block dominates itself.
    #[must_use]
    pub fn dominates(&self, a: BlockId, b: BlockId) -> bool {
        let mut current = Some(b);
        let mut steps = 0;
        while let Some(block) = current {
            if block == a {
                return true;
            }
            // A cyclic parent chain never reaches `a`.
            steps += 1;
            if steps > self.nodes.len() {
                return false;
            }
            current = self.immediate_dominator(block);
        }
        false
    }
}
