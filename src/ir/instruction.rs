//! IR instructions with explicit argument and result registers.
//!
//! Every instruction is one of a closed set of kinds ([`InstructionKind`]):
//!
//! - **Arithmetic**: `result := lhs OP rhs` for `OP` in `+ - * /`
//! - **Conditional branch**: transfers control to a target block when the
//!   condition register holds a non-zero value
//! - **No-op**: does nothing
//!
//! Unconditional control transfer is not an instruction at all; it is the
//! owning block's fall-through successor.
//!
//! # Ownership
//!
//! Instructions live in the instruction arena of their [`Function`] and are
//! addressed by [`InsnId`]. An instruction is linked into at most one block
//! at a time; [`Instruction::block`] names that block. All linking and
//! unlinking goes through the placement operations on [`Function`], which
//! keep the block's edge lists in step with the instruction's branch target.
//!
//! [`Function`]: crate::ir::Function

use std::fmt;

use bitflags::bitflags;
use strum::{AsRefStr, Display, EnumCount, EnumIter, EnumString};

use crate::ir::{BlockId, RegId};

/// Unique identifier for an instruction within a single function.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InsnId(usize);

impl InsnId {
    /// Creates a new instruction identifier from a raw arena index.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the underlying arena index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Debug for InsnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "i{}", self.0)
    }
}

impl fmt::Display for InsnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "i{}", self.0)
    }
}

/// Binary arithmetic operators.
///
/// The string forms are the operator characters used by the text format, so
/// `"+".parse::<ArithOp>()` yields [`ArithOp::Add`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, EnumIter, EnumCount,
)]
pub enum ArithOp {
    /// Addition
    #[strum(serialize = "+")]
    Add,
    /// Subtraction
    #[strum(serialize = "-")]
    Sub,
    /// Multiplication
    #[strum(serialize = "*")]
    Mul,
    /// Division
    #[strum(serialize = "/")]
    Div,
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    /// Capability flags describing how an instruction interacts with control flow
    pub struct InstructionFlags: u8 {
        /// The instruction may change control flow
        const BRANCH = 0x01;
        /// The instruction has an effect beyond reading arguments and writing its result
        const SIDE_EFFECT = 0x02;
    }
}

/// The closed set of instruction kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstructionKind {
    /// Two-operand arithmetic producing a result register.
    Arith(ArithOp),
    /// Conditional control transfer.
    ///
    /// `target` is `None` only after the target block was rerouted to an
    /// undefined destination; such a branch must be fixed up before the graph
    /// is analysed or written.
    CondBranch {
        /// Block control transfers to when the condition is non-zero
        target: Option<BlockId>,
    },
    /// No operation.
    Nop,
}

/// A single IR instruction.
///
/// # Examples
///
/// ```rust
/// use flowir::ir::{ArithOp, Function, Instruction};
///
/// let mut fun = Function::new();
/// let a = fun.add_register("a");
/// let b = fun.add_register("b");
/// let c = fun.add_register("c");
///
/// let entry = fun.entry_block();
/// let add = fun.append_new(entry, Instruction::arith(ArithOp::Add, a, b, c));
///
/// let insn = fun.instruction(add).unwrap();
/// assert_eq!(insn.args(), &[a, b]);
/// assert_eq!(insn.result(), Some(c));
/// assert!(!insn.is_branch());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    kind: InstructionKind,
    args: Vec<RegId>,
    result: Option<RegId>,
    block: Option<BlockId>,
}

impl Instruction {
    /// Creates a detached arithmetic instruction computing `result := lhs op rhs`.
    #[must_use]
    pub fn arith(op: ArithOp, lhs: RegId, rhs: RegId, result: RegId) -> Self {
        Self {
            kind: InstructionKind::Arith(op),
            args: vec![lhs, rhs],
            result: Some(result),
            block: None,
        }
    }

    /// Creates a detached conditional branch to `target`, taken when `cond` is non-zero.
    #[must_use]
    pub fn cond_branch(cond: RegId, target: BlockId) -> Self {
        Self {
            kind: InstructionKind::CondBranch {
                target: Some(target),
            },
            args: vec![cond],
            result: None,
            block: None,
        }
    }

    /// Creates a detached no-op instruction.
    #[must_use]
    pub fn nop() -> Self {
        Self {
            kind: InstructionKind::Nop,
            args: Vec::new(),
            result: None,
            block: None,
        }
    }

    /// Returns the kind of this instruction.
    #[must_use]
    pub const fn kind(&self) -> &InstructionKind {
        &self.kind
    }

    /// Returns the argument registers, in operand order.
    #[must_use]
    pub fn args(&self) -> &[RegId] {
        &self.args
    }

    /// Returns the result register, if this kind produces a value.
    #[must_use]
    pub const fn result(&self) -> Option<RegId> {
        self.result
    }

    /// Returns the block this instruction is linked into, if any.
    #[must_use]
    pub const fn block(&self) -> Option<BlockId> {
        self.block
    }

    /// Returns the capability flags of this instruction.
    #[must_use]
    pub fn flags(&self) -> InstructionFlags {
        match self.kind {
            InstructionKind::Arith(_) | InstructionKind::Nop => InstructionFlags::empty(),
            InstructionKind::CondBranch { .. } => {
                InstructionFlags::BRANCH | InstructionFlags::SIDE_EFFECT
            }
        }
    }

    /// Returns `true` if this instruction may affect control flow.
    #[must_use]
    pub fn is_branch(&self) -> bool {
        self.flags().contains(InstructionFlags::BRANCH)
    }

    /// Returns `true` if this instruction has a visible side effect other than
    /// reading its arguments and writing its result.
    #[must_use]
    pub fn has_side_effect(&self) -> bool {
        self.flags().contains(InstructionFlags::SIDE_EFFECT)
    }

    /// Returns the arithmetic operator for arithmetic instructions.
    #[must_use]
    pub const fn arith_op(&self) -> Option<ArithOp> {
        match self.kind {
            InstructionKind::Arith(op) => Some(op),
            _ => None,
        }
    }

    /// Returns the condition register of a conditional branch.
    #[must_use]
    pub fn condition(&self) -> Option<RegId> {
        match self.kind {
            InstructionKind::CondBranch { .. } => self.args.first().copied(),
            _ => None,
        }
    }

    /// Returns the branch target of a conditional branch.
    ///
    /// `None` is returned both for non-branch kinds and for a branch whose
    /// target has been cleared.
    #[must_use]
    pub const fn branch_target(&self) -> Option<BlockId> {
        match self.kind {
            InstructionKind::CondBranch { target } => target,
            _ => None,
        }
    }

    pub(crate) fn set_block(&mut self, block: Option<BlockId>) {
        self.block = block;
    }

    /// Replaces a branch target equal to `from` with `to`.
    ///
    /// Returns `true` if a target was replaced. Only the field is touched;
    /// edge bookkeeping is the caller's job.
    pub(crate) fn retarget(&mut self, from: BlockId, to: Option<BlockId>) -> bool {
        match &mut self.kind {
            InstructionKind::CondBranch { target } if *target == Some(from) => {
                *target = to;
                true
            }
            _ => false,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.kind, self.args.as_slice(), self.result) {
            (InstructionKind::Arith(op), [lhs, rhs], Some(result)) => {
                write!(f, "{result} := {lhs} {op} {rhs}")
            }
            (InstructionKind::CondBranch { target }, [cond], _) => match target {
                Some(target) => write!(f, "if ({cond}) goto {target}"),
                None => write!(f, "if ({cond}) goto ?"),
            },
            (InstructionKind::Nop, _, _) => f.write_str("nop"),
            _ => write!(f, "<malformed {:?}>", self.kind),
        }
    }
}
