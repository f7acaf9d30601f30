// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
//#![deny(unsafe_code)]
// - 'ir/program.rs' uses mmap to map a file into memory

//! # flowir
//!
//! A mutable control-flow-graph IR core for compiler experiments. `flowir`
//! models functions as graphs of basic blocks holding a small closed set of
//! instructions, keeps successor and predecessor edges consistent through
//! every mutation, and reads and writes a line-oriented text format.
//!
//! ## Features
//!
//! - **Arena-owned graphs** - Blocks, instructions and registers live in their function and are addressed by handles
//! - **Exact edge bookkeeping** - Successor and predecessor multisets are kept as inverses at every step
//! - **Safe block destruction** - Predecessors are rerouted before a block disappears
//! - **Dominator hooks** - Edge changes invalidate the (post-)dominator trees supplied by an analysis
//! - **Text format** - Located parse errors, forward label references and a writer that reads back
//!
//! ## Quick Start
//!
//! ### Using the Prelude
//!
//! ```rust
//! use flowir::prelude::*;
//!
//! let prog = Program::parse("fun main {\n  reg n\n  n := n - n\n}\n")?;
//! let main = prog.function("main").unwrap();
//! assert_eq!(main.registers().len(), 1);
//! # Ok::<(), flowir::Error>(())
//! ```
//!
//! ### Building a Graph
//!
//! ```rust
//! use flowir::ir::{Function, Instruction};
//!
//! let mut fun = Function::new();
//! let cond = fun.add_register("c");
//! let body = fun.add_block();
//! let (entry, exit) = (fun.entry_block(), fun.exit_block());
//!
//! fun.set_fall_through(entry, Some(body));
//! fun.append_new(body, Instruction::cond_branch(cond, entry));
//! fun.set_fall_through(body, Some(exit));
//!
//! // Destroying `body` reroutes `entry` to its fall-through target.
//! fun.destroy_block(body);
//! assert_eq!(fun.block(entry).unwrap().fall_through(), Some(exit));
//! assert!(fun.edge_inconsistency().is_none());
//! ```
//!
//! ## Architecture
//!
//! - [`prelude`] - Convenient re-exports of commonly used types
//! - [`ir`] - Registers, instructions, blocks, functions and programs
//! - [`text`] - Text input cursor, readers and writers
//! - [`Error`] and [`Result`] - Error handling
//!
//! ## Error Handling
//!
//! Malformed input and other recoverable problems are reported as [`Error`].
//! Violations of the graph invariants, such as using a destroyed block, are
//! bugs in the calling code and panic.
//!
//! ```rust
//! use flowir::{Error, ir::Program};
//!
//! match Program::parse("fun f {\n  x := y + y\n}\n") {
//!     Ok(_) => unreachable!(),
//!     Err(Error::Parse { message, line, column }) => {
//!         assert_eq!(message, "Unknown register \"y\"");
//!         assert_eq!((line, column), (2, 9));
//!     }
//!     Err(e) => panic!("unexpected error: {e}"),
//! }
//! ```

#[macro_use]
pub(crate) mod error;

/// Convenient re-exports of the most commonly used types.
///
/// # Example
///
/// ```rust
/// use flowir::prelude::*;
///
/// let mut fun = Function::new();
/// let exit = fun.exit_block();
/// fun.set_fall_through(fun.entry_block(), Some(exit));
/// # Ok::<(), flowir::Error>(())
/// ```
pub mod prelude;

pub mod ir;
pub mod text;

/// `flowir` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `flowir` Error type
///
/// Covers malformed text input, reader misuse, file access and writer
/// failures.
pub use error::Error;
