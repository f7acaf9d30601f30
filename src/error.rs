use thiserror::Error;

use crate::ir::BlockId;

macro_rules! parse_error {
    // Single string version
    ($input:expr, $msg:expr) => {
        $input.error($msg.to_string())
    };

    // Format string with arguments version
    ($input:expr, $fmt:expr, $($arg:tt)*) => {
        $input.error(format!($fmt, $($arg)*))
    };
}

macro_rules! invalid_block {
    ($id:expr) => {
        panic!(
            "use of destroyed or foreign block {} ({}:{})",
            $id,
            file!(),
            line!()
        )
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Only *input* problems are represented here: malformed text, unknown names, a reader that
/// is invoked while already reading, or a graph that cannot be expressed in the text format.
/// Violations of the control-flow-graph invariants are programming errors inside the crate
/// and abort with a panic instead of surfacing as an [`Error`].
///
/// # Error Categories
///
/// ## Text Input Errors
/// - [`Error::Parse`] - Malformed input with the line and column it was detected at
/// - [`Error::Reentrant`] - A reader was invoked while a previous read was still active
/// - [`Error::DuplicateFunction`] - A program already contains a function of that name
///
/// ## Text Output Errors
/// - [`Error::UndefinedBranchTarget`] - A conditional branch has no target block
/// - [`Error::AmbiguousRegister`] - Two registers of a function share a name
///
/// ## I/O Errors
/// - [`Error::FileError`] - Filesystem I/O errors
/// - [`Error::Encoding`] - Input file is not valid UTF-8
/// - [`Error::Format`] - The output sink of a writer failed
///
/// # Examples
///
/// ```rust
/// use flowir::{Error, text::ProgramReader};
///
/// match ProgramReader::from_text("fun f {\n  bogus\n}\n").read() {
///     Ok(_) => unreachable!(),
///     Err(Error::Parse { message, line, .. }) => {
///         assert_eq!(message, "Unknown instruction");
///         assert_eq!(line, 2);
///     }
///     Err(e) => panic!("unexpected error: {e}"),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The text input could not be parsed.
    ///
    /// The reader stops at the first problem it encounters; there is no error recovery.
    ///
    /// # Fields
    ///
    /// * `message` - Human readable description of the problem
    /// * `line` - 1-based source line the problem was detected on
    /// * `column` - 1-based column within that line
    #[error("{line}:{column}: {message}")]
    Parse {
        /// Description of what was wrong with the input
        message: String,
        /// The 1-based line on which the error was detected
        line: usize,
        /// The 1-based column at which the error was detected
        column: usize,
    },

    /// A reader was invoked while it was already reading.
    ///
    /// This also happens when a previous read failed and the reader was not
    /// [`reset`](crate::text::FunctionReader::reset) afterwards.
    #[error("Recursive call to {0}")]
    Reentrant(&'static str),

    /// A function of the same name already exists in the program.
    #[error("Duplicate function \"{0}\"")]
    DuplicateFunction(String),

    /// A conditional branch had its target cleared and cannot be serialized.
    ///
    /// The associated [`BlockId`] is the block containing the branch.
    #[error("Conditional branch in block {0} has an undefined target")]
    UndefinedBranchTarget(BlockId),

    /// Two registers of the same function share a name and cannot be told apart in text.
    #[error("Register name \"{0}\" is used by more than one register")]
    AmbiguousRegister(String),

    /// File I/O error.
    #[error("{0}")]
    FileError(#[from] std::io::Error),

    /// The input file is not valid UTF-8.
    #[error("{0}")]
    Encoding(#[from] std::str::Utf8Error),

    /// The output sink of a writer reported an error.
    #[error("{0}")]
    Format(#[from] std::fmt::Error),
}
