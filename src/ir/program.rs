//! Programs: named collections of functions.

use std::{collections::HashMap, path::Path};

use crate::{
    ir::{DuplicateFunctionPolicy, Function, ProgramConfig},
    text::{ProgramReader, TextInput},
    Error, Result,
};

/// A program in the IR, owning its functions by name.
///
/// Functions keep the order in which they were added, which is also the
/// order they are written in.
///
/// # Examples
///
/// ```rust
/// use flowir::{ir::{Function, Program}, Error};
///
/// let mut prog = Program::new();
/// prog.add_function("main", Function::new())?;
///
/// assert!(prog.function("main").is_some());
/// assert!(matches!(
///     prog.add_function("main", Function::new()),
///     Err(Error::DuplicateFunction(_))
/// ));
/// # Ok::<(), flowir::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Program {
    config: ProgramConfig,
    functions: Vec<(String, Function)>,
    index: HashMap<String, usize>,
}

impl Program {
    /// Creates an empty program with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty program with the given configuration.
    #[must_use]
    pub fn with_config(config: ProgramConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Parses a program from its text representation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] for malformed input.
    pub fn parse(text: &str) -> Result<Self> {
        ProgramReader::from_text(text).read()
    }

    /// Loads and parses a program from a text file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FileError`] if the file cannot be read,
    /// [`Error::Encoding`] if it is not UTF-8, and [`Error::Parse`] for
    /// malformed input.
    pub fn from_file(path: &Path) -> Result<Self> {
        Self::from_file_with_config(path, ProgramConfig::default())
    }

    /// Loads and parses a program from a text file with the given configuration.
    ///
    /// # Errors
    ///
    /// See [`Program::from_file`].
    pub fn from_file_with_config(path: &Path, config: ProgramConfig) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        if file.metadata()?.len() == 0 {
            return Ok(Self::with_config(config));
        }

        let mmap = unsafe { memmap2::Mmap::map(&file) }?;
        let text = std::str::from_utf8(&mmap)?;
        ProgramReader::with_config(TextInput::new(text), config).read()
    }

    /// Returns the program's configuration.
    #[must_use]
    pub const fn config(&self) -> &ProgramConfig {
        &self.config
    }

    /// Adds `fun` under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateFunction`] if `name` is taken and the
    /// configuration rejects duplicates.
    pub fn add_function(&mut self, name: impl Into<String>, fun: Function) -> Result<()> {
        let name = name.into();
        if let Some(&slot) = self.index.get(&name) {
            return match self.config.duplicate_functions {
                DuplicateFunctionPolicy::Reject => Err(Error::DuplicateFunction(name)),
                DuplicateFunctionPolicy::Replace => {
                    self.functions[slot].1 = fun;
                    Ok(())
                }
            };
        }

        self.index.insert(name.clone(), self.functions.len());
        self.functions.push((name, fun));
        Ok(())
    }

    /// Returns the function called `name`.
    #[must_use]
    pub fn function(&self, name: &str) -> Option<&Function> {
        self.index.get(name).map(|&slot| &self.functions[slot].1)
    }

    /// Returns the function called `name` for modification.
    pub fn function_mut(&mut self, name: &str) -> Option<&mut Function> {
        self.index
            .get(name)
            .map(|&slot| &mut self.functions[slot].1)
    }

    /// Returns an iterator over `(name, function)` pairs in insertion order.
    pub fn functions(&self) -> impl Iterator<Item = (&str, &Function)> {
        self.functions.iter().map(|(name, fun)| (name.as_str(), fun))
    }

    /// Returns the number of functions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Returns `true` if the program has no functions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_order() -> Result<()> {
        let mut prog = Program::new();
        prog.add_function("b", Function::new())?;
        prog.add_function("a", Function::new())?;

        let names: Vec<&str> = prog.functions().map(|(name, _)| name).collect();
        assert_eq!(names, ["b", "a"]);
        assert_eq!(prog.len(), 2);
        Ok(())
    }

    #[test]
    fn test_duplicate_rejected_by_default() {
        let mut prog = Program::new();
        assert!(prog.add_function("f", Function::new()).is_ok());
        assert!(matches!(
            prog.add_function("f", Function::new()),
            Err(Error::DuplicateFunction(name)) if name == "f"
        ));
        assert_eq!(prog.len(), 1);
    }

    #[test]
    fn test_duplicate_replaced_when_configured() -> Result<()> {
        let config = ProgramConfig::new().with_duplicate_functions(DuplicateFunctionPolicy::Replace);
        let mut prog = Program::with_config(config);
        prog.add_function("f", Function::new())?;
        prog.add_function("g", Function::new())?;

        let mut replacement = Function::new();
        replacement.add_block();
        prog.add_function("f", replacement)?;

        assert_eq!(prog.len(), 2);
        assert_eq!(prog.function("f").map(Function::block_count), Some(3));
        assert_eq!(prog.functions().next().map(|(name, _)| name), Some("f"));
        Ok(())
    }

    #[test]
    fn test_function_mut() -> Result<()> {
        let mut prog = Program::new();
        prog.add_function("f", Function::new())?;
        if let Some(fun) = prog.function_mut("f") {
            fun.add_register("x");
        }
        assert!(prog
            .function("f")
            .and_then(|f| f.find_register("x"))
            .is_some());
        assert!(prog.function_mut("missing").is_none());
        Ok(())
    }
}
