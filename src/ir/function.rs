//! Functions: the owners of blocks, instructions and registers.
//!
//! A [`Function`] is the single owner of everything in its control flow
//! graph. Blocks, instructions and registers live in per-function arenas and
//! refer to each other only through [`BlockId`], [`InsnId`] and [`RegId`]
//! handles, so the cyclic block graph never needs shared ownership.
//!
//! # Structure
//!
//! ```text
//! Function
//! ├── blocks: arena of BasicBlock     // slot is emptied when a block is destroyed
//! ├── order: Vec<BlockId>             // live blocks in creation order
//! ├── insns: arena of Instruction     // slot is emptied when an insn is deleted
//! ├── registers: Vec<Register>
//! ├── entry / exit: BlockId           // created with the function
//! └── dom_tree / post_dom_tree        // invalidated on every edge change
//! ```
//!
//! # Edge Maintenance
//!
//! The successor multiset of a block is made of three kinds of edges:
//!
//! - its fall-through edge, driven by [`Function::set_fall_through`],
//! - one edge per linked conditional branch with a defined target, added when
//!   the branch is placed and dropped when it is removed, and
//! - raw edges added with [`Function::add_successor`].
//!
//! Every add and remove touches both ends, so successor and predecessor lists
//! are always exact multiset inverses. [`Function::edge_inconsistency`] checks
//! this.
//!
//! # Fatal Faults
//!
//! Handing a mutating operation the handle of a destroyed block or deleted
//! instruction is a programming error and panics, as does a destruction that
//! leaves edges behind.

use std::collections::HashMap;

use crate::ir::{
    block::remove_one, BasicBlock, BlockId, DomTree, InsnId, Instruction, RegId, Register,
};

/// A function in the IR: a control flow graph of basic blocks.
///
/// # Examples
///
/// ```rust
/// use flowir::ir::{Function, Instruction};
///
/// let mut fun = Function::new();
/// let cond = fun.add_register("c");
/// let body = fun.add_block();
///
/// fun.set_fall_through(fun.entry_block(), Some(body));
/// fun.append_new(body, Instruction::cond_branch(cond, body));
/// fun.set_fall_through(body, Some(fun.exit_block()));
///
/// let block = fun.block(body).unwrap();
/// assert_eq!(block.predecessors(), &[fun.entry_block(), body]);
/// assert_eq!(block.successors(), &[body, fun.exit_block()]);
/// assert!(fun.edge_inconsistency().is_none());
/// ```
#[derive(Debug, Clone)]
pub struct Function {
    blocks: Vec<Option<BasicBlock>>,
    order: Vec<BlockId>,
    insns: Vec<Option<Instruction>>,
    registers: Vec<Register>,
    register_names: HashMap<String, RegId>,
    entry: BlockId,
    exit: BlockId,
    dom_tree: DomTree,
    post_dom_tree: DomTree,
}

impl Default for Function {
    fn default() -> Self {
        Self::new()
    }
}

impl Function {
    /// Creates a new function containing only its entry and exit blocks.
    #[must_use]
    pub fn new() -> Self {
        let mut fun = Self {
            blocks: Vec::new(),
            order: Vec::new(),
            insns: Vec::new(),
            registers: Vec::new(),
            register_names: HashMap::new(),
            entry: BlockId::new(0),
            exit: BlockId::new(0),
            dom_tree: DomTree::new(),
            post_dom_tree: DomTree::new(),
        };
        fun.entry = fun.add_block();
        fun.exit = fun.add_block();
        fun
    }

    // ============================================================================================
    // Blocks
    // ============================================================================================

    /// Creates a new empty block and registers it with this function.
    pub fn add_block(&mut self) -> BlockId {
        let id = BlockId::new(self.blocks.len());
        self.blocks.push(Some(BasicBlock::new(id)));
        self.order.push(id);
        id
    }

    /// Returns the entry block.
    #[must_use]
    pub const fn entry_block(&self) -> BlockId {
        self.entry
    }

    /// Returns the exit block.
    #[must_use]
    pub const fn exit_block(&self) -> BlockId {
        self.exit
    }

    /// Returns the block with the given id, or `None` if it was destroyed.
    #[must_use]
    pub fn block(&self, id: BlockId) -> Option<&BasicBlock> {
        self.blocks.get(id.index()).and_then(Option::as_ref)
    }

    /// Returns `true` if `id` names a live block of this function.
    #[must_use]
    pub fn contains_block(&self, id: BlockId) -> bool {
        self.block(id).is_some()
    }

    /// Returns the live blocks' ids in creation order.
    #[must_use]
    pub fn block_ids(&self) -> &[BlockId] {
        &self.order
    }

    /// Returns an iterator over the live blocks in creation order.
    pub fn blocks(&self) -> impl Iterator<Item = &BasicBlock> {
        self.order.iter().filter_map(|&id| self.block(id))
    }

    /// Returns the number of live blocks, including entry and exit.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.order.len()
    }

    fn bb(&self, id: BlockId) -> &BasicBlock {
        match self.blocks.get(id.index()).and_then(Option::as_ref) {
            Some(block) => block,
            None => invalid_block!(id),
        }
    }

    fn bb_mut(&mut self, id: BlockId) -> &mut BasicBlock {
        match self.blocks.get_mut(id.index()).and_then(Option::as_mut) {
            Some(block) => block,
            None => invalid_block!(id),
        }
    }

    // ============================================================================================
    // Registers
    // ============================================================================================

    /// Adds a register called `name` and returns its id.
    ///
    /// Names are not required to be unique; [`Function::find_register`]
    /// returns the most recent register declared under a name.
    pub fn add_register(&mut self, name: impl Into<String>) -> RegId {
        let id = RegId::new(self.registers.len());
        let register = Register::new(id, name);
        self.register_names.insert(register.name().to_string(), id);
        self.registers.push(register);
        id
    }

    /// Returns the register with the given id.
    #[must_use]
    pub fn register(&self, id: RegId) -> Option<&Register> {
        self.registers.get(id.index())
    }

    /// Returns all registers in declaration order.
    #[must_use]
    pub fn registers(&self) -> &[Register] {
        &self.registers
    }

    /// Looks up a register by name.
    #[must_use]
    pub fn find_register(&self, name: &str) -> Option<RegId> {
        self.register_names.get(name).copied()
    }

    // ============================================================================================
    // Instructions
    // ============================================================================================

    /// Adds `insn` to the instruction arena, detached from any block.
    pub fn create_instruction(&mut self, mut insn: Instruction) -> InsnId {
        insn.set_block(None);
        let id = InsnId::new(self.insns.len());
        self.insns.push(Some(insn));
        id
    }

    /// Creates `insn` and appends it to `bb`.
    pub fn append_new(&mut self, bb: BlockId, insn: Instruction) -> InsnId {
        let id = self.create_instruction(insn);
        self.append(bb, id);
        id
    }

    /// Returns the instruction with the given id, or `None` if it was deleted.
    #[must_use]
    pub fn instruction(&self, id: InsnId) -> Option<&Instruction> {
        self.insns.get(id.index()).and_then(Option::as_ref)
    }

    /// Returns the instructions of `bb` in execution order.
    ///
    /// Yields nothing if `bb` was destroyed.
    pub fn block_instructions(&self, bb: BlockId) -> impl Iterator<Item = &Instruction> {
        self.block(bb)
            .map(BasicBlock::instructions)
            .unwrap_or_default()
            .iter()
            .filter_map(|&id| self.instruction(id))
    }

    fn insn(&self, id: InsnId) -> &Instruction {
        match self.insns.get(id.index()).and_then(Option::as_ref) {
            Some(insn) => insn,
            None => panic!("use of deleted instruction {id}"),
        }
    }

    fn insn_mut(&mut self, id: InsnId) -> &mut Instruction {
        match self.insns.get_mut(id.index()).and_then(Option::as_mut) {
            Some(insn) => insn,
            None => panic!("use of deleted instruction {id}"),
        }
    }

    /// Appends `insn` to the end of `bb`, detaching it from any previous block.
    pub fn append(&mut self, bb: BlockId, insn: InsnId) {
        self.remove_instruction(insn);
        self.bb_mut(bb).insns_mut().push(insn);
        self.link(insn, bb);
    }

    /// Appends `insn` to `bb`, but before the last instruction if that one is a branch.
    ///
    /// Non-control instructions placed this way never end up after a
    /// terminating branch.
    pub fn append_before_terminator(&mut self, bb: BlockId, insn: InsnId) {
        self.remove_instruction(insn);

        let ends_in_branch = self
            .bb(bb)
            .last_instruction()
            .is_some_and(|last| self.insn(last).is_branch());

        let insns = self.bb_mut(bb).insns_mut();
        if ends_in_branch {
            let pos = insns.len() - 1;
            insns.insert(pos, insn);
        } else {
            insns.push(insn);
        }
        self.link(insn, bb);
    }

    /// Inserts `insn` at the start of `bb`, detaching it from any previous block.
    pub fn prepend(&mut self, bb: BlockId, insn: InsnId) {
        self.remove_instruction(insn);
        self.bb_mut(bb).insns_mut().insert(0, insn);
        self.link(insn, bb);
    }

    /// Detaches `insn` from its block, if it is in one.
    ///
    /// Fall-through and raw edges of the block are left alone. A conditional
    /// branch takes its own target edge with it.
    pub fn remove_instruction(&mut self, insn: InsnId) {
        let (block, target) = {
            let insn = self.insn(insn);
            (insn.block(), insn.branch_target())
        };
        let Some(block) = block else {
            return;
        };

        remove_one(self.bb_mut(block).insns_mut(), insn);
        self.insn_mut(insn).set_block(None);

        if let Some(target) = target {
            self.remove_successor(block, target);
        }
    }

    /// Detaches `insn` from its block and frees it.
    pub fn delete_instruction(&mut self, insn: InsnId) {
        self.remove_instruction(insn);
        self.insns[insn.index()] = None;
    }

    /// Post-link hook, run once `insn` is already in `bb`'s sequence.
    fn link(&mut self, insn: InsnId, bb: BlockId) {
        let target = {
            let insn = self.insn_mut(insn);
            insn.set_block(Some(bb));
            insn.branch_target()
        };
        if let Some(target) = target {
            self.add_successor(bb, target);
        }
    }

    /// Changes a branch target of `insn` equal to `from` to `to`.
    ///
    /// If the instruction is linked into a block, the block's edge to `from`
    /// is moved to `to`. `to` may be `None`, leaving the branch target
    /// undefined. Non-branch instructions are unaffected. Returns `true` if a
    /// target was changed.
    pub fn change_branch_target(&mut self, insn: InsnId, from: BlockId, to: Option<BlockId>) -> bool {
        let insn = self.insn_mut(insn);
        let block = insn.block();
        if !insn.retarget(from, to) {
            return false;
        }

        if let Some(block) = block {
            self.remove_successor(block, from);
            if let Some(to) = to {
                self.add_successor(block, to);
            }
        }
        true
    }

    // ============================================================================================
    // Edges
    // ============================================================================================

    /// Sets the fall-through successor of `bb` to `target`.
    ///
    /// Setting the current fall-through again is a no-op. Otherwise the old
    /// fall-through edge (if any) is removed and a new one to `target` (if
    /// any) is added.
    pub fn set_fall_through(&mut self, bb: BlockId, target: Option<BlockId>) {
        let current = self.bb(bb).fall_through();
        if current == target {
            return;
        }

        if let Some(old) = current {
            self.remove_successor(bb, old);
        }
        if let Some(new) = target {
            self.add_successor(bb, new);
        }
        self.bb_mut(bb).set_fall_through_field(target);
    }

    /// Adds one control flow edge `bb -> succ`.
    ///
    /// Parallel edges accumulate; they are not deduplicated.
    pub fn add_successor(&mut self, bb: BlockId, succ: BlockId) {
        // Validate both ends before touching either.
        let _ = self.bb(succ);
        self.bb_mut(bb).push_succ(succ);
        self.bb_mut(succ).push_pred(bb);

        self.invalidate_dominators();
        self.invalidate_post_dominators();
    }

    /// Removes a single control flow edge `bb -> succ`.
    ///
    /// When several parallel edges exist only one is removed. Returns `false`
    /// if there was no such edge.
    pub fn remove_successor(&mut self, bb: BlockId, succ: BlockId) -> bool {
        let _ = self.bb(succ);
        let removed = self.bb_mut(bb).remove_succ(succ);
        let removed_pred = self.bb_mut(succ).remove_pred(bb);
        assert_eq!(
            removed, removed_pred,
            "Asymmetric edge {bb} -> {succ} in successor/predecessor lists"
        );

        self.invalidate_dominators();
        self.invalidate_post_dominators();
        removed
    }

    /// Replaces `from` with `to` in the successors of `bb`.
    ///
    /// The fall-through is rerouted if it pointed at `from`, and every branch
    /// instruction in `bb` targeting `from` is retargeted. `to` may be `None`,
    /// in which case a branch target becomes undefined and must be fixed up
    /// by the caller before further analysis.
    pub fn change_successor(&mut self, bb: BlockId, from: BlockId, to: Option<BlockId>) {
        if self.bb(bb).fall_through() == Some(from) {
            self.set_fall_through(bb, to);
        }

        let branches: Vec<InsnId> = self
            .bb(bb)
            .instructions()
            .iter()
            .copied()
            .filter(|&insn| self.insn(insn).is_branch())
            .collect();
        for insn in branches {
            self.change_branch_target(insn, from, to);
        }
    }

    /// Removes `bb` from the control flow graph and destroys it.
    ///
    /// 1. All instructions of the block are deleted.
    /// 2. The block's fall-through edge is removed.
    /// 3. Every predecessor is rerouted to the old fall-through target, or
    ///    loses its edge when there was none. A block that fell through to
    ///    itself is treated as having no fall-through.
    /// 4. The block leaves the function and both dominator trees.
    ///
    /// Raw edges added with [`Function::add_successor`] into the block are
    /// dropped rather than rerouted. Detached conditional branches that target
    /// the block are left with an undefined target.
    ///
    /// # Panics
    ///
    /// Panics if `bb` is not a live block, or if the block still has outgoing
    /// raw edges once its fall-through and branches are gone.
    pub fn destroy_block(&mut self, bb: BlockId) {
        while let Some(&insn) = self.bb(bb).instructions().first() {
            self.delete_instruction(insn);
        }

        // Detached branches have no edge to reroute; their target is cleared.
        for insn in self.insns.iter_mut().flatten() {
            if insn.block().is_none() {
                insn.retarget(bb, None);
            }
        }

        let mut fall_through = self.bb(bb).fall_through();
        self.set_fall_through(bb, None);

        // A self-loop must not resurrect the block being destroyed.
        if fall_through == Some(bb) {
            fall_through = None;
        }

        log::debug!(
            "destroying block {bb} with {} predecessors, redirecting to {:?}",
            self.bb(bb).predecessors().len(),
            fall_through
        );

        while let Some(&pred) = self.bb(bb).predecessors().first() {
            let before = self.bb(bb).predecessors().len();
            self.change_successor(pred, bb, fall_through);

            if self.bb(bb).predecessors().len() == before {
                log::trace!("dropping raw edge {pred} -> {bb}");
                self.remove_successor(pred, bb);
            } else {
                log::trace!("rerouted {pred} -> {bb} to {fall_through:?}");
            }
        }

        assert!(
            self.bb(bb).predecessors().is_empty(),
            "Destroyed block has remaining predecessors"
        );
        assert!(
            self.bb(bb).successors().is_empty(),
            "Destroyed block has remaining successors"
        );

        self.blocks[bb.index()] = None;
        self.order.retain(|&id| id != bb);

        self.dom_tree.remove(bb);
        self.post_dom_tree.remove(bb);
    }

    /// Checks that successor and predecessor lists are exact multiset inverses,
    /// that every edge ends in a live block, and that each fall-through is a
    /// successor.
    ///
    /// Returns the first block at which a violation was found.
    #[must_use]
    pub fn edge_inconsistency(&self) -> Option<BlockId> {
        for block in self.blocks() {
            let id = block.id();

            for &succ in block.successors() {
                let Some(target) = self.block(succ) else {
                    return Some(id);
                };
                if block.successor_count(succ) != target.predecessor_count(id) {
                    return Some(id);
                }
            }

            for &pred in block.predecessors() {
                let Some(source) = self.block(pred) else {
                    return Some(id);
                };
                if block.predecessor_count(pred) != source.successor_count(id) {
                    return Some(id);
                }
            }

            if let Some(ft) = block.fall_through() {
                if block.successor_count(ft) == 0 {
                    return Some(id);
                }
            }
        }
        None
    }

    // ============================================================================================
    // Dominance
    // ============================================================================================

    /// Marks dominator information as out of date.
    pub fn invalidate_dominators(&mut self) {
        self.dom_tree.invalidate();
    }

    /// Marks post-dominator information as out of date.
    pub fn invalidate_post_dominators(&mut self) {
        self.post_dom_tree.invalidate();
    }

    /// Returns the dominator tree storage.
    #[must_use]
    pub const fn dominator_tree(&self) -> &DomTree {
        &self.dom_tree
    }

    /// Returns the dominator tree storage for an analysis to fill in.
    pub fn dominator_tree_mut(&mut self) -> &mut DomTree {
        &mut self.dom_tree
    }

    /// Returns the post-dominator tree storage.
    #[must_use]
    pub const fn post_dominator_tree(&self) -> &DomTree {
        &self.post_dom_tree
    }

    /// Returns the post-dominator tree storage for an analysis to fill in.
    pub fn post_dominator_tree_mut(&mut self) -> &mut DomTree {
        &mut self.post_dom_tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::ArithOp;

    fn succ_count(fun: &Function, from: BlockId, to: BlockId) -> usize {
        fun.block(from).unwrap().successor_count(to)
    }

    fn pred_count(fun: &Function, of: BlockId, from: BlockId) -> usize {
        fun.block(of).unwrap().predecessor_count(from)
    }

    #[test]
    fn test_new_function_has_entry_and_exit() {
        let fun = Function::new();
        assert_eq!(fun.block_count(), 2);
        assert_ne!(fun.entry_block(), fun.exit_block());
        assert!(fun.block(fun.entry_block()).unwrap().is_empty());
        assert_eq!(fun.block_ids(), &[fun.entry_block(), fun.exit_block()]);
    }

    #[test]
    fn test_registers() {
        let mut fun = Function::new();
        let a = fun.add_register("a");
        let b = fun.add_register("b");
        assert_ne!(a, b);
        assert_eq!(fun.find_register("b"), Some(b));
        assert_eq!(fun.find_register("c"), None);
        assert_eq!(fun.registers().len(), 2);
        assert_eq!(fun.register(a).map(Register::name), Some("a"));
    }

    #[test]
    fn test_parallel_edges() {
        let mut fun = Function::new();
        let a = fun.add_block();
        let b = fun.add_block();

        fun.add_successor(a, b);
        fun.add_successor(a, b);
        assert_eq!(succ_count(&fun, a, b), 2);
        assert_eq!(pred_count(&fun, b, a), 2);

        assert!(fun.remove_successor(a, b));
        assert_eq!(succ_count(&fun, a, b), 1);
        assert_eq!(pred_count(&fun, b, a), 1);
        assert!(fun.edge_inconsistency().is_none());
    }

    #[test]
    fn test_remove_missing_edge() {
        let mut fun = Function::new();
        let a = fun.add_block();
        let b = fun.add_block();
        assert!(!fun.remove_successor(a, b));
    }

    #[test]
    fn test_set_fall_through_is_idempotent() {
        let mut fun = Function::new();
        let a = fun.add_block();
        let b = fun.add_block();

        fun.set_fall_through(a, Some(b));
        fun.set_fall_through(a, Some(b));
        assert_eq!(succ_count(&fun, a, b), 1);
        assert_eq!(fun.block(a).unwrap().fall_through(), Some(b));

        fun.set_fall_through(a, Some(fun.exit_block()));
        assert_eq!(succ_count(&fun, a, b), 0);
        assert_eq!(pred_count(&fun, b, a), 0);
        assert_eq!(succ_count(&fun, a, fun.exit_block()), 1);

        fun.set_fall_through(a, None);
        assert!(fun.block(a).unwrap().successors().is_empty());
        assert!(fun.edge_inconsistency().is_none());
    }

    #[test]
    fn test_edge_changes_invalidate_dominance() {
        let mut fun = Function::new();
        let a = fun.add_block();
        fun.dominator_tree_mut().mark_valid();
        fun.post_dominator_tree_mut().mark_valid();

        fun.add_successor(fun.entry_block(), a);
        assert!(!fun.dominator_tree().is_valid());
        assert!(!fun.post_dominator_tree().is_valid());

        fun.dominator_tree_mut().mark_valid();
        fun.set_fall_through(a, Some(a));
        assert!(!fun.dominator_tree().is_valid());
    }

    #[test]
    fn test_instruction_placement() {
        let mut fun = Function::new();
        let r = fun.add_register("r");
        let bb = fun.add_block();
        let target = fun.add_block();

        let nop1 = fun.append_new(bb, Instruction::nop());
        let branch = fun.append_new(bb, Instruction::cond_branch(r, target));
        let add = fun.create_instruction(Instruction::arith(ArithOp::Add, r, r, r));
        fun.append_before_terminator(bb, add);
        let nop0 = fun.create_instruction(Instruction::nop());
        fun.prepend(bb, nop0);

        assert_eq!(
            fun.block(bb).unwrap().instructions(),
            &[nop0, nop1, add, branch]
        );
        assert_eq!(fun.instruction(add).unwrap().block(), Some(bb));
        assert_eq!(succ_count(&fun, bb, target), 1);
    }

    #[test]
    fn test_append_before_terminator_without_branch() {
        let mut fun = Function::new();
        let bb = fun.add_block();
        let first = fun.append_new(bb, Instruction::nop());
        let second = fun.create_instruction(Instruction::nop());
        fun.append_before_terminator(bb, second);
        assert_eq!(fun.block(bb).unwrap().instructions(), &[first, second]);
    }

    #[test]
    fn test_move_instruction_between_blocks() {
        let mut fun = Function::new();
        let r = fun.add_register("r");
        let a = fun.add_block();
        let b = fun.add_block();
        let target = fun.add_block();

        let branch = fun.append_new(a, Instruction::cond_branch(r, target));
        fun.append(b, branch);

        assert!(fun.block(a).unwrap().is_empty());
        assert_eq!(succ_count(&fun, a, target), 0);
        assert_eq!(succ_count(&fun, b, target), 1);
        assert_eq!(fun.instruction(branch).unwrap().block(), Some(b));
        assert!(fun.edge_inconsistency().is_none());
    }

    #[test]
    fn test_remove_instruction_keeps_fall_through() {
        let mut fun = Function::new();
        let a = fun.add_block();
        fun.set_fall_through(a, Some(fun.exit_block()));
        let nop = fun.append_new(a, Instruction::nop());

        fun.remove_instruction(nop);
        assert!(fun.block(a).unwrap().is_empty());
        assert_eq!(fun.instruction(nop).unwrap().block(), None);
        assert_eq!(fun.block(a).unwrap().fall_through(), Some(fun.exit_block()));

        fun.delete_instruction(nop);
        assert!(fun.instruction(nop).is_none());
    }

    #[test]
    fn test_change_successor_reroutes_fall_through_and_branch() {
        let mut fun = Function::new();
        let r = fun.add_register("r");
        let a = fun.add_block();
        let old = fun.add_block();
        let new = fun.add_block();

        let branch = fun.append_new(a, Instruction::cond_branch(r, old));
        fun.set_fall_through(a, Some(old));
        assert_eq!(succ_count(&fun, a, old), 2);

        fun.change_successor(a, old, Some(new));
        assert_eq!(succ_count(&fun, a, old), 0);
        assert_eq!(succ_count(&fun, a, new), 2);
        assert_eq!(fun.block(a).unwrap().fall_through(), Some(new));
        assert_eq!(fun.instruction(branch).unwrap().branch_target(), Some(new));
        assert!(fun.edge_inconsistency().is_none());
    }

    #[test]
    fn test_change_successor_to_undefined() {
        let mut fun = Function::new();
        let r = fun.add_register("r");
        let a = fun.add_block();
        let old = fun.add_block();
        let branch = fun.append_new(a, Instruction::cond_branch(r, old));

        fun.change_successor(a, old, None);
        assert_eq!(fun.instruction(branch).unwrap().branch_target(), None);
        assert!(fun.block(a).unwrap().successors().is_empty());
        assert!(fun.block(old).unwrap().predecessors().is_empty());
    }

    #[test]
    fn test_destroy_redirects_predecessors() {
        let mut fun = Function::new();
        let p1 = fun.add_block();
        let p2 = fun.add_block();
        let dying = fun.add_block();
        let f = fun.add_block();
        let r = fun.add_register("r");

        fun.set_fall_through(p1, Some(dying));
        fun.append_new(p2, Instruction::cond_branch(r, dying));
        fun.append_new(dying, Instruction::nop());
        fun.set_fall_through(dying, Some(f));

        fun.destroy_block(dying);

        assert!(!fun.contains_block(dying));
        assert_eq!(succ_count(&fun, p1, f), 1);
        assert_eq!(succ_count(&fun, p2, f), 1);
        assert_eq!(fun.block(f).unwrap().predecessors().len(), 2);
        assert_eq!(fun.block(p1).unwrap().fall_through(), Some(f));
        assert!(fun.block_ids().iter().all(|&id| id != dying));
        assert!(fun.edge_inconsistency().is_none());
    }

    #[test]
    fn test_destroy_without_fall_through_drops_edges() {
        let mut fun = Function::new();
        let p = fun.add_block();
        let dying = fun.add_block();
        fun.set_fall_through(p, Some(dying));

        fun.destroy_block(dying);
        assert!(fun.block(p).unwrap().successors().is_empty());
        assert_eq!(fun.block(p).unwrap().fall_through(), None);
    }

    #[test]
    fn test_destroy_self_loop() {
        let mut fun = Function::new();
        let p = fun.add_block();
        let looping = fun.add_block();
        fun.set_fall_through(p, Some(looping));
        fun.set_fall_through(looping, Some(looping));

        fun.destroy_block(looping);
        assert!(!fun.contains_block(looping));
        assert!(fun.block(p).unwrap().successors().is_empty());
        assert_eq!(fun.block(p).unwrap().fall_through(), None);
        assert!(fun.edge_inconsistency().is_none());
    }

    #[test]
    fn test_destroy_drops_raw_incoming_edges() {
        let mut fun = Function::new();
        let p = fun.add_block();
        let dying = fun.add_block();
        fun.add_successor(p, dying);
        fun.add_successor(dying, dying);

        fun.destroy_block(dying);
        assert!(fun.block(p).unwrap().successors().is_empty());
        assert!(fun.edge_inconsistency().is_none());
    }

    #[test]
    fn test_destroy_clears_detached_branch_targets() {
        let mut fun = Function::new();
        let c = fun.add_register("c");
        let entry = fun.entry_block();
        let x = fun.add_block();

        let br = fun.append_new(entry, Instruction::cond_branch(c, x));
        fun.remove_instruction(br);
        fun.destroy_block(x);

        assert_eq!(fun.instruction(br).and_then(Instruction::branch_target), None);

        // Relinking adds no edge to the destroyed block.
        fun.append(entry, br);
        assert!(fun.block(entry).unwrap().successors().is_empty());
        assert!(fun.edge_inconsistency().is_none());
    }

    #[test]
    fn test_destroy_removes_dominator_nodes() {
        let mut fun = Function::new();
        let bb = fun.add_block();
        let entry = fun.entry_block();
        fun.dominator_tree_mut().insert(entry, None);
        fun.dominator_tree_mut().insert(bb, Some(entry));

        fun.destroy_block(bb);
        assert!(!fun.dominator_tree().contains(bb));
        assert!(!fun.post_dominator_tree().contains(bb));
    }

    #[test]
    #[should_panic(expected = "Destroyed block has remaining successors")]
    fn test_destroy_with_raw_outgoing_edge_panics() {
        let mut fun = Function::new();
        let dying = fun.add_block();
        let other = fun.add_block();
        fun.add_successor(dying, other);
        fun.destroy_block(dying);
    }

    #[test]
    #[should_panic(expected = "use of destroyed or foreign block")]
    fn test_stale_block_panics() {
        let mut fun = Function::new();
        let bb = fun.add_block();
        fun.destroy_block(bb);
        fun.set_fall_through(bb, None);
    }
}
