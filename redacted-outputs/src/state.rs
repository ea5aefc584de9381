//! Resolved output values as held by a fully applied state.

use std::fmt;

use crate::value::{Value, REDACTED_PLACEHOLDER};

/// An output whose value is known.
///
/// The output's name is the key it is stored under. `Debug` never prints the
/// value of a sensitive output.
#[derive(Clone, PartialEq)]
pub struct ResolvedOutput {
    /// The value, possibly carrying marks anywhere in its tree.
    pub value: Value,
    /// Whether the output was declared sensitive.
    pub sensitive: bool,
    /// Deprecation notice. Empty means not deprecated.
    pub deprecated: String,
}

impl ResolvedOutput {
    pub fn new(value: Value) -> Self {
        Self {
            value,
            sensitive: false,
            deprecated: String::new(),
        }
    }

    #[must_use]
    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    #[must_use]
    pub fn deprecated(mut self, message: impl Into<String>) -> Self {
        self.deprecated = message.into();
        self
    }
}

impl fmt::Debug for ResolvedOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("ResolvedOutput");
        if self.sensitive && !cfg!(any(test, feature = "testing")) {
            debug.field("value", &REDACTED_PLACEHOLDER);
        } else {
            debug.field("value", &self.value);
        }
        debug
            .field("sensitive", &self.sensitive)
            .field("deprecated", &self.deprecated)
            .finish()
    }
}
