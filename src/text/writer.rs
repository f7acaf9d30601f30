//! Text writers for instructions, functions and programs.
//!
//! The writers produce the same line-oriented format the
//! [readers](crate::text::reader) accept, so a written program can be read
//! back into a graph with the same shape.
//!
//! # Layout
//!
//! A function body is written as:
//!
//! 1. one `reg NAME` line per register, in declaration order,
//! 2. the entry block, labelled `entry`,
//! 3. every other live block in creation order, labelled `_N`,
//! 4. the exit block, labelled `exit`, if it has instructions or a fall-through.
//!
//! A fall-through is left implicit when it targets the next written block,
//! or when the last written block falls through to `exit`; every other
//! fall-through becomes a `goto`.
//!
//! # Lossy Cases
//!
//! The text format cannot express everything the graph can:
//!
//! - A block other than exit without a fall-through is read back with one.
//! - Raw edges added with [`Function::add_successor`] are not written.
//! - Block numbers are not preserved; blocks are renumbered in order of first
//!   reference when read back.
//! - A function whose entry block was destroyed reads back with a new, empty
//!   entry block falling through to the first written block.
//!
//! A conditional branch whose target was cleared cannot be written at all and
//! fails with [`Error::UndefinedBranchTarget`]. Registers sharing a name, which
//! [`Function::add_register`] allows, fail with [`Error::AmbiguousRegister`].
//!
//! # Examples
//!
//! ```rust
//! use flowir::{ir::Program, text::ProgramWriter};
//!
//! let text = "fun f {\n  reg a\n  a := a + a\n}\n";
//! let prog = Program::parse(text)?;
//!
//! let written = ProgramWriter::new(&prog).write_to_string()?;
//! assert_eq!(written, "fun f {\n  reg a\nentry:\n  a := a + a\n}\n");
//! # Ok::<(), flowir::Error>(())
//! ```

use std::{collections::HashSet, fmt::Write};

use crate::{
    ir::{ArithOp, BlockId, Function, Instruction, InstructionKind, Program, RegId},
    Error, Result,
};

const INDENT: &str = "  ";

/// Writes single instructions of a function.
///
/// Every instruction kind has its own routine, selected by an exhaustive
/// match on [`InstructionKind`].
#[derive(Debug, Clone, Copy)]
pub struct InstructionWriter<'f> {
    fun: &'f Function,
}

impl<'f> InstructionWriter<'f> {
    /// Creates a writer resolving register and block names through `fun`.
    #[must_use]
    pub const fn new(fun: &'f Function) -> Self {
        Self { fun }
    }

    /// Writes `insn` to `out`, without indentation or line break.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UndefinedBranchTarget`] for a conditional branch
    /// without a target, and [`Error::Format`] if `out` fails.
    ///
    /// # Panics
    ///
    /// Panics if the operands do not match the instruction kind.
    pub fn write<W: Write>(&self, out: &mut W, insn: &Instruction) -> Result<()> {
        match (insn.kind(), insn.args(), insn.result()) {
            (InstructionKind::Arith(op), &[lhs, rhs], Some(result)) => {
                self.write_arith(out, *op, lhs, rhs, result)
            }
            (InstructionKind::CondBranch { target }, &[cond], None) => {
                self.write_cond_branch(out, insn, cond, *target)
            }
            (InstructionKind::Nop, [], None) => self.write_nop(out),
            _ => panic!("malformed instruction {insn:?}"),
        }
    }

    fn write_arith<W: Write>(
        &self,
        out: &mut W,
        op: ArithOp,
        lhs: RegId,
        rhs: RegId,
        result: RegId,
    ) -> Result<()> {
        self.write_reg(out, result)?;
        out.write_str(" := ")?;
        self.write_reg(out, lhs)?;
        write!(out, " {op} ")?;
        self.write_reg(out, rhs)
    }

    fn write_cond_branch<W: Write>(
        &self,
        out: &mut W,
        insn: &Instruction,
        cond: RegId,
        target: Option<BlockId>,
    ) -> Result<()> {
        let Some(target) = target else {
            let block = insn.block().unwrap_or(self.fun.entry_block());
            return Err(Error::UndefinedBranchTarget(block));
        };

        out.write_str("if (")?;
        self.write_reg(out, cond)?;
        write!(out, ") goto {}", block_label(self.fun, target))?;
        Ok(())
    }

    fn write_nop<W: Write>(&self, out: &mut W) -> Result<()> {
        out.write_str("nop")?;
        Ok(())
    }

    fn write_reg<W: Write>(&self, out: &mut W, reg: RegId) -> Result<()> {
        match self.fun.register(reg) {
            Some(register) => write!(out, "{register}")?,
            None => write!(out, "{reg}")?,
        }
        Ok(())
    }
}

/// Returns the text label of `block` within `fun`.
///
/// The entry and exit blocks are `entry` and `exit`, every other block is
/// named after its number.
#[must_use]
pub fn block_label(fun: &Function, block: BlockId) -> String {
    if block == fun.entry_block() {
        "entry".to_string()
    } else if block == fun.exit_block() {
        "exit".to_string()
    } else {
        block.to_string()
    }
}

/// Writes the body of a function, from the opening `{` to the closing `}`.
#[derive(Debug, Clone, Copy)]
pub struct FunctionWriter<'f> {
    fun: &'f Function,
}

impl<'f> FunctionWriter<'f> {
    /// Creates a writer for `fun`.
    #[must_use]
    pub const fn new(fun: &'f Function) -> Self {
        Self { fun }
    }

    /// Returns the blocks in the order they are written.
    fn layout(&self) -> Vec<BlockId> {
        let fun = self.fun;
        let entry = fun.entry_block();
        let exit = fun.exit_block();

        let mut blocks = Vec::with_capacity(fun.block_count());
        if fun.contains_block(entry) {
            blocks.push(entry);
        }
        blocks.extend(
            fun.block_ids()
                .iter()
                .copied()
                .filter(|&id| id != entry && id != exit),
        );

        let exit_has_content = fun
            .block(exit)
            .is_some_and(|bb| !bb.is_empty() || bb.fall_through().is_some());
        if exit_has_content {
            blocks.push(exit);
        }
        blocks
    }

    /// Writes the function body to `out`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UndefinedBranchTarget`] for a conditional branch
    /// without a target, [`Error::AmbiguousRegister`] if two registers share
    /// a name, and [`Error::Format`] if `out` fails.
    pub fn write<W: Write>(&self, out: &mut W) -> Result<()> {
        let fun = self.fun;
        let insn_writer = InstructionWriter::new(fun);

        let mut names = HashSet::with_capacity(fun.registers().len());
        if let Some(dup) = fun.registers().iter().find(|reg| !names.insert(reg.name())) {
            return Err(Error::AmbiguousRegister(dup.name().to_string()));
        }

        out.write_str("{\n")?;

        for register in fun.registers() {
            writeln!(out, "{INDENT}reg {register}")?;
        }

        let layout = self.layout();
        for (pos, &id) in layout.iter().enumerate() {
            let Some(block) = fun.block(id) else {
                invalid_block!(id)
            };

            writeln!(out, "{}:", block_label(fun, id))?;

            for insn in fun.block_instructions(id) {
                out.write_str(INDENT)?;
                insn_writer.write(out, insn)?;
                out.write_char('\n')?;
            }

            if let Some(target) = block.fall_through() {
                let implicit = match layout.get(pos + 1) {
                    Some(&next) => target == next,
                    None => target == fun.exit_block() && id != fun.exit_block(),
                };
                if !implicit {
                    writeln!(out, "{INDENT}goto {}", block_label(fun, target))?;
                }
            }
        }

        out.write_str("}\n")?;
        Ok(())
    }

    /// Writes the function body into a new string.
    ///
    /// # Errors
    ///
    /// See [`FunctionWriter::write`].
    pub fn write_to_string(&self) -> Result<String> {
        let mut out = String::new();
        self.write(&mut out)?;
        Ok(out)
    }
}

/// Writes every function of a program as a `fun NAME { ... }` definition.
#[derive(Debug, Clone, Copy)]
pub struct ProgramWriter<'p> {
    prog: &'p Program,
}

impl<'p> ProgramWriter<'p> {
    /// Creates a writer for `prog`.
    #[must_use]
    pub const fn new(prog: &'p Program) -> Self {
        Self { prog }
    }

    /// Writes the program to `out`, separating functions with a blank line.
    ///
    /// # Errors
    ///
    /// See [`FunctionWriter::write`].
    pub fn write<W: Write>(&self, out: &mut W) -> Result<()> {
        for (idx, (name, fun)) in self.prog.functions().enumerate() {
            if idx > 0 {
                out.write_char('\n')?;
            }
            write!(out, "fun {name} ")?;
            FunctionWriter::new(fun).write(out)?;
        }
        Ok(())
    }

    /// Writes the program into a new string.
    ///
    /// # Errors
    ///
    /// See [`FunctionWriter::write`].
    pub fn write_to_string(&self) -> Result<String> {
        let mut out = String::new();
        self.write(&mut out)?;
        Ok(out)
    }
}
