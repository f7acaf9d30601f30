//! Basic blocks: ordered instruction sequences with control-flow edges.
//!
//! A [`BasicBlock`] holds
//!
//! - the ordered list of instructions linked into it,
//! - its successor and predecessor multisets, and
//! - an optional fall-through successor, taken when execution runs off the
//!   end of the block.
//!
//! # Edge Multisets
//!
//! Successor and predecessor lists are multisets: the same edge may be present
//! more than once, for example a conditional branch and a fall-through that
//! both lead to the same block. For every edge `A -> B` there is exactly one
//! matching `A` entry in `B`'s predecessors. Removing an edge removes a single
//! entry from each side, never every matching entry.
//!
//! Blocks only store [`BlockId`] handles to their neighbours. All mutation
//! happens through [`Function`](crate::ir::Function), which owns every block and
//! can therefore update both ends of an edge at once.

use std::fmt;

use crate::ir::InsnId;

/// Unique identifier for a basic block within a single function.
///
/// Block identifiers are never reused within a function, so a handle to a
/// destroyed block can be detected rather than silently aliasing a new one.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockId(usize);

impl BlockId {
    /// Creates a new block identifier from a raw arena index.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the underlying arena index (the block number).
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Debug for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "_{}", self.0)
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "_{}", self.0)
    }
}

/// A basic block in a function's control flow graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicBlock {
    id: BlockId,
    insns: Vec<InsnId>,
    succs: Vec<BlockId>,
    preds: Vec<BlockId>,
    fall_through: Option<BlockId>,
}

impl BasicBlock {
    pub(crate) fn new(id: BlockId) -> Self {
        Self {
            id,
            insns: Vec::new(),
            succs: Vec::new(),
            preds: Vec::new(),
            fall_through: None,
        }
    }

    /// Returns the block's identifier.
    #[must_use]
    pub const fn id(&self) -> BlockId {
        self.id
    }

    /// Returns the instructions in execution order.
    #[must_use]
    pub fn instructions(&self) -> &[InsnId] {
        &self.insns
    }

    /// Returns the number of instructions.
    #[must_use]
    pub fn instruction_count(&self) -> usize {
        self.insns.len()
    }

    /// Returns `true` if the block contains no instructions.
    ///
    /// Edges are not considered; an empty block may still have successors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.insns.is_empty()
    }

    /// Returns the last instruction, if any.
    #[must_use]
    pub fn last_instruction(&self) -> Option<InsnId> {
        self.insns.last().copied()
    }

    /// Returns the successor multiset.
    #[must_use]
    pub fn successors(&self) -> &[BlockId] {
        &self.succs
    }

    /// Returns the predecessor multiset.
    #[must_use]
    pub fn predecessors(&self) -> &[BlockId] {
        &self.preds
    }

    /// Returns the fall-through successor, if any.
    #[must_use]
    pub const fn fall_through(&self) -> Option<BlockId> {
        self.fall_through
    }

    /// Counts the edges from this block to `succ`.
    #[must_use]
    pub fn successor_count(&self, succ: BlockId) -> usize {
        self.succs.iter().filter(|&&s| s == succ).count()
    }

    /// Counts the edges from `pred` to this block.
    #[must_use]
    pub fn predecessor_count(&self, pred: BlockId) -> usize {
        self.preds.iter().filter(|&&p| p == pred).count()
    }

    pub(crate) fn insns_mut(&mut self) -> &mut Vec<InsnId> {
        &mut self.insns
    }

    pub(crate) fn push_succ(&mut self, succ: BlockId) {
        self.succs.push(succ);
    }

    pub(crate) fn push_pred(&mut self, pred: BlockId) {
        self.preds.push(pred);
    }

    pub(crate) fn remove_succ(&mut self, succ: BlockId) -> bool {
        remove_one(&mut self.succs, succ)
    }

    pub(crate) fn remove_pred(&mut self, pred: BlockId) -> bool {
        remove_one(&mut self.preds, pred)
    }

    pub(crate) fn set_fall_through_field(&mut self, target: Option<BlockId>) {
        self.fall_through = target;
    }
}

impl fmt::Display for BasicBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} insns, succs [", self.id, self.insns.len())?;
        for (i, succ) in self.succs.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{succ}")?;
        }
        f.write_str("]")?;
        if let Some(ft) = self.fall_through {
            write!(f, ", falls through to {ft}")?;
        }
        Ok(())
    }
}

/// Removes the first occurrence of `value` from `list`, keeping order.
///
/// Returns `false` if `value` was not present.
pub(crate) fn remove_one<T: PartialEq>(list: &mut Vec<T>, value: T) -> bool {
    match list.iter().position(|item| *item == value) {
        Some(pos) => {
            list.remove(pos);
            true
        }
        None => false,
    }
}
