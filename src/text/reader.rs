//! Text readers for functions and programs.
//!
//! Two cooperating readers turn the line-oriented text format into IR:
//!
//! - [`ProgramReader`] reads repeated `fun NAME { ... }` definitions and
//!   collects the resulting functions into a [`Program`].
//! - [`FunctionReader`] reads a single function body, building blocks and
//!   instructions and wiring edges as a side effect of each statement.
//!
//! # Grammar
//!
//! ```text
//! program    := { "fun" IDENT funbody }
//! funbody    := "{" NEWLINE { line } "}"
//! line       := label | regdecl | assign | goto | condgoto | nop | comment
//! label      := IDENT ":"
//! regdecl    := "reg" IDENT
//! assign     := IDENT ":=" IDENT OP IDENT         ; OP in {+,-,*,/}
//! goto       := "goto" IDENT
//! condgoto   := "if" "(" IDENT ")" "goto" IDENT
//! nop        := "nop"
//! ```
//!
//! `#` starts a comment and blank lines are ignored. The `{` of a function
//! body may also start the line after `fun NAME`.
//!
//! # Labels and Blocks
//!
//! Labels may be referenced before they are defined; the first reference
//! creates the block. Every referenced label must be defined by the closing
//! `}`. The labels `entry` and `exit` are bound to the
//! function's entry and exit blocks. Statements before the first label go
//! into the entry block.
//!
//! A label line ends the current block by making it fall through to the
//! labelled block. `goto` sets the fall-through and leaves no current block,
//! so the next statement must be a label. A block still open at the closing
//! `}` falls through to the exit block.
//!
//! The left-hand side of an assignment declares its register if needed;
//! operand and condition registers must already exist.
//!
//! # Errors
//!
//! The first problem aborts the read with a located [`Error::Parse`]. The
//! reader's label and register tables are left as they were, and the reader
//! refuses further reads with [`Error::Reentrant`] until it is
//! [`reset`](FunctionReader::reset).
//!
//! # Examples
//!
//! ```rust
//! use flowir::text::ProgramReader;
//!
//! let text = "\
//! fun f {
//! entry:
//!   reg a
//!   reg b
//!   c := a + b
//!   if (c) goto done
//!   goto entry
//! done:
//!   nop
//! }
//! ";
//!
//! let prog = ProgramReader::from_text(text).read()?;
//! let fun = prog.function("f").unwrap();
//! assert_eq!(fun.block_count(), 3);
//! # Ok::<(), flowir::Error>(())
//! ```

use std::collections::{HashMap, HashSet};

use crate::{
    ir::{ArithOp, BlockId, DuplicateFunctionPolicy, Function, Instruction, Program, ProgramConfig, RegId},
    text::TextInput,
    Error, Result,
};

/// Reader for the text representation of a single function body.
///
/// The reader owns the per-function label and register tables. They are
/// cleared at the start and the successful end of each [`read`](Self::read),
/// so nothing leaks from one function into the next.
#[derive(Debug, Default)]
pub struct FunctionReader {
    active: bool,
    labels: HashMap<String, BlockId>,
    defined: HashSet<BlockId>,
    registers: HashMap<String, RegId>,
}

impl FunctionReader {
    /// Creates an idle reader.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` while a read is in progress, or after a read failed.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Clears all parsing state, making the reader usable after a failed read.
    pub fn reset(&mut self) {
        self.active = false;
        self.clear_state();
    }

    fn clear_state(&mut self) {
        self.labels.clear();
        self.defined.clear();
        self.registers.clear();
    }

    /// Reads a function body from `input` and returns the new function.
    ///
    /// The cursor must be positioned before the opening `{`, either later on
    /// the current line or on the next one. On success the cursor is left on
    /// the line holding the closing `}`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Reentrant`] if the reader is still active, and
    /// [`Error::Parse`] for malformed input.
    pub fn read(&mut self, input: &mut TextInput<'_>) -> Result<Function> {
        if self.active {
            return Err(Error::Reentrant("FunctionReader::read"));
        }
        self.active = true;
        self.clear_state();

        let mut fun = Function::new();
        self.labels.insert("entry".to_string(), fun.entry_block());
        self.labels.insert("exit".to_string(), fun.exit_block());
        self.defined.insert(fun.entry_block());
        self.defined.insert(fun.exit_block());

        self.parse_fun(input, &mut fun)?;

        self.active = false;
        self.clear_state();
        Ok(fun)
    }

    fn parse_fun(&mut self, input: &mut TextInput<'_>, fun: &mut Function) -> Result<()> {
        if input.at_eol() && !input.read_new_line() {
            return Err(parse_error!(input, "Expected '{'"));
        }
        input.expect('{')?;
        input.expect_eol()?;

        let mut cur_block = Some(fun.entry_block());

        loop {
            if !input.read_new_line() {
                return Err(parse_error!(input, "Unexpected end of input, expected '}'"));
            }

            if input.skip('}') {
                input.expect_eol()?;
                break;
            }

            // Blank or comment line
            if input.at_eol() {
                continue;
            }

            // Label, starts a new block
            if input.skip_eol(':') {
                let name = input.read_id()?;
                input.expect_eol()?;

                let block = self.label_block(fun, name);
                let already_defined = fun
                    .block(block)
                    .is_some_and(|bb| !bb.is_empty() || bb.fall_through().is_some());
                if already_defined {
                    return Err(parse_error!(input, "duplicate label {}", name));
                }
                self.defined.insert(block);

                if let Some(prev) = cur_block {
                    if prev != block {
                        fun.set_fall_through(prev, Some(block));
                    }
                }
                cur_block = Some(block);
                continue;
            }

            // Everything else starts with an identifier: a register or a command.
            let id = input.read_id()?;

            if id == "reg" && input.peek() != Some(':') {
                let name = input.read_id()?;
                input.expect_eol()?;

                if self.registers.contains_key(name) {
                    return Err(parse_error!(
                        input,
                        "Duplicate register declaration \"{}\"",
                        name
                    ));
                }
                let reg = fun.add_register(name);
                self.registers.insert(name.to_string(), reg);
                continue;
            }

            let Some(block) = cur_block else {
                return Err(parse_error!(input, "Expected label"));
            };

            // Assignment, of the form "REG := ARG OP ARG"
            if input.skip(':') {
                input.expect('=')?;

                let lhs = self.read_reg(input)?;
                let op_char = input.read_char()?;
                let Ok(op) = op_char.encode_utf8(&mut [0; 4]).parse::<ArithOp>() else {
                    return Err(parse_error!(
                        input,
                        "Unknown arithmetic operation \"{}\"",
                        op_char
                    ));
                };
                let rhs = self.read_reg(input)?;
                input.expect_eol()?;

                let result = self.lvalue_reg(fun, id);
                fun.append_new(block, Instruction::arith(op, lhs, rhs, result));
                continue;
            }

            match id {
                // Unconditional branch, ends the current block
                "goto" => {
                    let target = self.read_label(input, fun)?;
                    input.expect_eol()?;
                    fun.set_fall_through(block, Some(target));
                    cur_block = None;
                }
                "if" => {
                    input.expect('(')?;
                    let cond = self.read_reg(input)?;
                    input.expect(')')?;
                    input.expect_keyword("goto")?;
                    let target = self.read_label(input, fun)?;
                    input.expect_eol()?;
                    fun.append_new(block, Instruction::cond_branch(cond, target));
                }
                "nop" => {
                    input.expect_eol()?;
                    fun.append_new(block, Instruction::nop());
                }
                _ => return Err(parse_error!(input, "Unknown instruction")),
            }
        }

        // Report the earliest referenced label that never got a definition.
        let undefined = self
            .labels
            .iter()
            .filter(|&(_, block)| !self.defined.contains(block))
            .min_by_key(|&(_, block)| *block);
        if let Some((name, _)) = undefined {
            return Err(parse_error!(input, "undefined label {}", name));
        }

        if let Some(block) = cur_block {
            if block != fun.exit_block() {
                fun.set_fall_through(block, Some(fun.exit_block()));
            }
        }
        Ok(())
    }

    /// Reads a label and returns its block, creating it if needed.
    fn read_label(&mut self, input: &mut TextInput<'_>, fun: &mut Function) -> Result<BlockId> {
        let name = input.read_id()?;
        Ok(self.label_block(fun, name))
    }

    /// Returns the block for `label`, adding a new block to `fun` on first use.
    fn label_block(&mut self, fun: &mut Function, label: &str) -> BlockId {
        if let Some(&block) = self.labels.get(label) {
            return block;
        }

        let block = fun.add_block();
        log::trace!("label {label} -> new block {block}");
        self.labels.insert(label.to_string(), block);
        block
    }

    /// Reads the name of a register which must exist.
    fn read_reg(&self, input: &mut TextInput<'_>) -> Result<RegId> {
        let name = input.read_id()?;
        match self.registers.get(name) {
            Some(&reg) => Ok(reg),
            None => Err(parse_error!(input, "Unknown register \"{}\"", name)),
        }
    }

    /// Returns the register called `name`, declaring it if needed.
    fn lvalue_reg(&mut self, fun: &mut Function, name: &str) -> RegId {
        if let Some(&reg) = self.registers.get(name) {
            return reg;
        }
        let reg = fun.add_register(name);
        self.registers.insert(name.to_string(), reg);
        reg
    }
}

/// Reader for the text representation of a whole program.
///
/// # Examples
///
/// ```rust
/// use flowir::{
///     ir::{DuplicateFunctionPolicy, ProgramConfig},
///     text::{ProgramReader, TextInput},
/// };
///
/// let text = "fun f {\n}\nfun f {\n  nop\n}\n";
///
/// // Rejected by default ...
/// assert!(ProgramReader::from_text(text).read().is_err());
///
/// // ... unless the configuration allows replacing.
/// let config = ProgramConfig::new().with_duplicate_functions(DuplicateFunctionPolicy::Replace);
/// let prog = ProgramReader::with_config(TextInput::new(text), config).read()?;
/// assert_eq!(prog.len(), 1);
/// # Ok::<(), flowir::Error>(())
/// ```
#[derive(Debug)]
pub struct ProgramReader<'a> {
    input: TextInput<'a>,
    fun_reader: FunctionReader,
    config: ProgramConfig,
    active: bool,
}

impl<'a> ProgramReader<'a> {
    /// Creates a reader over `input` with the default configuration.
    #[must_use]
    pub fn new(input: TextInput<'a>) -> Self {
        Self::with_config(input, ProgramConfig::default())
    }

    /// Creates a reader over `input` with the given configuration.
    #[must_use]
    pub fn with_config(input: TextInput<'a>, config: ProgramConfig) -> Self {
        Self {
            input,
            fun_reader: FunctionReader::new(),
            config,
            active: false,
        }
    }

    /// Creates a reader over `text` with the default configuration.
    #[must_use]
    pub fn from_text(text: &'a str) -> Self {
        Self::new(TextInput::new(text))
    }

    /// Returns the text input being read.
    #[must_use]
    pub const fn input(&self) -> &TextInput<'a> {
        &self.input
    }

    /// Returns `true` while a read is in progress, or after a read failed.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Clears all parsing state, making the reader usable after a failed read.
    ///
    /// The input position is not rewound.
    pub fn reset(&mut self) {
        self.active = false;
        self.fun_reader.reset();
    }

    /// Reads function definitions until the end of the input.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Reentrant`] if the reader is still active, and
    /// [`Error::Parse`] for malformed input, including a function name that
    /// is already taken when the configuration rejects duplicates.
    pub fn read(&mut self) -> Result<Program> {
        if self.active {
            return Err(Error::Reentrant("ProgramReader::read"));
        }
        self.active = true;

        let mut prog = Program::with_config(self.config);

        loop {
            if !self.input.at_eol() {
                self.input.expect_keyword("fun")?;
                let name = self.input.read_id()?;

                if self.config.duplicate_functions == DuplicateFunctionPolicy::Reject
                    && prog.function(name).is_some()
                {
                    return Err(parse_error!(self.input, "duplicate function \"{}\"", name));
                }

                let fun = self.fun_reader.read(&mut self.input)?;
                log::debug!(
                    "read function {name}: {} blocks, {} registers",
                    fun.block_count(),
                    fun.registers().len()
                );
                prog.add_function(name, fun)?;
            }

            if !self.input.read_new_line() {
                break;
            }
        }

        log::debug!("read program with {} functions", prog.len());
        self.active = false;
        Ok(prog)
    }
}
