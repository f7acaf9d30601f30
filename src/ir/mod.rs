//! The IR core: registers, instructions, basic blocks, functions and programs.
//!
//! # Architecture
//!
//! - [`register`] - Named value slots owned by a function
//! - [`instruction`] - The closed set of instruction kinds
//! - [`block`] - Basic blocks with successor/predecessor multisets
//! - [`function`] - The owning arena and all control-flow-graph surgery
//! - [`domtree`] - Dominator tree storage with invalidation and removal hooks
//! - [`program`] - Named collection of functions
//! - [`config`] - Program construction policy
//!
//! # Ownership
//!
//! ```text
//! Program ──owns──> Function ──owns──> BasicBlock ──owns──> Instruction
//!                                          │  ▲                  │
//!                                          └──┘ edges (BlockId)  └──> RegId, BlockId
//! ```
//!
//! Edges and branch targets are plain handles. They stay valid because the
//! only way to remove a block, [`Function::destroy_block`], first reroutes or
//! drops every edge that points at it.
//!
//! # Thread Safety
//!
//! All types in this module are `Send` and `Sync`, but mutation requires
//! `&mut` access; concurrent writers must be serialized by the caller.

pub mod block;
pub mod config;
pub mod domtree;
pub mod function;
pub mod instruction;
pub mod program;
pub mod register;

pub use block::{BasicBlock, BlockId};
pub use config::{DuplicateFunctionPolicy, ProgramConfig};
pub use domtree::{DomNode, DomTree};
pub use function::Function;
pub use instruction::{ArithOp, InsnId, Instruction, InstructionFlags, InstructionKind};
pub use program::Program;
pub use register::{RegId, Register};
