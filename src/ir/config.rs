//! Configuration for program construction.
//!
//! The only policy a [`Program`](crate::ir::Program) needs is what to do when a
//! function is added under a name that is already taken.

/// What to do when a function name is already present in a program.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicateFunctionPolicy {
    /// Refuse the new function and report [`Error::DuplicateFunction`](crate::Error::DuplicateFunction).
    #[default]
    Reject,
    /// Replace the existing function, keeping its position in the program.
    Replace,
}

/// Configuration for a [`Program`](crate::ir::Program).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgramConfig {
    /// Policy for functions added under an existing name (default: reject).
    pub duplicate_functions: DuplicateFunctionPolicy,
}

impl ProgramConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the duplicate function policy.
    #[must_use]
    pub fn with_duplicate_functions(mut self, policy: DuplicateFunctionPolicy) -> Self {
        self.duplicate_functions = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rejects_duplicates() {
        assert_eq!(
            ProgramConfig::default().duplicate_functions,
            DuplicateFunctionPolicy::Reject
        );
    }

    #[test]
    fn test_builder() {
        let config = ProgramConfig::new().with_duplicate_functions(DuplicateFunctionPolicy::Replace);
        assert_eq!(config.duplicate_functions, DuplicateFunctionPolicy::Replace);
    }
}
