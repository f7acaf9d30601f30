//! # flowir Prelude
//!
//! This module provides a convenient prelude for the most commonly used types from the
//! flowir library. Import this module to get quick access to the essential types for
//! building, reading and writing control flow graphs.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all flowir operations
pub use crate::Error;

/// The result type used throughout flowir
pub use crate::Result;

// ================================================================================================
// Graph Structure
// ================================================================================================

/// Functions and programs, the owners of all graph data
pub use crate::ir::{Function, Program};

/// Basic blocks and their handles
pub use crate::ir::{BasicBlock, BlockId};

/// Instructions, their kinds and handles
pub use crate::ir::{ArithOp, InsnId, Instruction, InstructionFlags, InstructionKind};

/// Registers and their handles
pub use crate::ir::{RegId, Register};

/// Dominator tree storage
pub use crate::ir::DomTree;

// ================================================================================================
// Configuration
// ================================================================================================

/// Program construction policy
pub use crate::ir::{DuplicateFunctionPolicy, ProgramConfig};

// ================================================================================================
// Text Format
// ================================================================================================

/// Text input cursor
pub use crate::text::TextInput;

/// Readers from text to IR
pub use crate::text::{FunctionReader, ProgramReader};

/// Writers from IR to text
pub use crate::text::{FunctionWriter, InstructionWriter, ProgramWriter};
