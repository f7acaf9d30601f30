//! The line-oriented text format: input cursor, readers and writers.
//!
//! # Architecture
//!
//! - [`input`] - [`TextInput`], a cursor over lines with token primitives
//! - [`reader`] - [`FunctionReader`] and [`ProgramReader`], text to IR
//! - [`writer`] - [`InstructionWriter`], [`FunctionWriter`] and [`ProgramWriter`], IR to text
//!
//! Reading and writing are inverse up to block numbering: a written program
//! reads back into graphs with the same shape. See the [`writer`] module for
//! the few graph states the format cannot express.
//!
//! # Examples
//!
//! ```rust
//! use flowir::text::{ProgramReader, ProgramWriter};
//!
//! let text = "fun f {\n  reg x\nentry:\n  if (x) goto entry\n}\n";
//! let prog = ProgramReader::from_text(text).read()?;
//! assert_eq!(ProgramWriter::new(&prog).write_to_string()?, text);
//! # Ok::<(), flowir::Error>(())
//! ```

pub mod input;
pub mod reader;
pub mod writer;

pub use input::TextInput;
pub use reader::{FunctionReader, ProgramReader};
pub use writer::{block_label, FunctionWriter, InstructionWriter, ProgramWriter};
