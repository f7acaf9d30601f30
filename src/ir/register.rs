//! IR registers: named value slots owned by a function.
//!
//! Registers are identified by a [`RegId`], a lightweight handle into the
//! register table of the owning [`Function`](crate::ir::Function). A register
//! carries no state beyond its identity and display name, and is never
//! destroyed independently of its function.

use std::fmt;

/// Unique identifier for a register within a single function.
///
/// The identifier is an index into the function's register table. It is not
/// meaningful across functions.
///
/// # Examples
///
/// ```rust
/// use flowir::ir::Function;
///
/// let mut fun = Function::new();
/// let a = fun.add_register("a");
/// assert_eq!(a.index(), 0);
/// assert_eq!(fun.register(a).map(|r| r.name()), Some("a"));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RegId(usize);

impl RegId {
    /// Creates a new register identifier from a raw table index.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the underlying index into the register table.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Debug for RegId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

impl fmt::Display for RegId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// A register entry in a function's register table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Register {
    id: RegId,
    name: String,
}

impl Register {
    pub(crate) fn new(id: RegId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// Returns this register's identifier.
    #[must_use]
    pub const fn id(&self) -> RegId {
        self.id
    }

    /// Returns the display name the register was declared with.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
