//! Symbols and their assumptions.

use std::fmt;
use std::sync::Arc;

/// Facts known about a symbol.
///
/// Every symbol is treated as real valued when complex parts are taken.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Assumptions {
    /// Strictly greater than zero.
    pub positive: bool,
    /// Greater than or equal to zero.
    pub nonnegative: bool,
    /// Integer valued (sequence indices).
    pub integer: bool,
}

impl Assumptions {
    /// Returns true if the symbol is known to be non-negative.
    #[must_use]
    pub fn is_nonnegative(&self) -> bool {
        self.positive || self.nonnegative
    }
}

/// A named symbolic variable.
///
/// Two symbols are the same symbol only if both the name and the
/// assumptions agree.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol {
    name: Arc<str>,
    assumptions: Assumptions,
}

impl Symbol {
    /// Creates a symbol with no assumptions.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self::with_assumptions(name, Assumptions::default())
    }

    /// Creates a symbol with the given assumptions.
    #[must_use]
    pub fn with_assumptions(name: &str, assumptions: Assumptions) -> Self {
        Self {
            name: Arc::from(name),
            assumptions,
        }
    }

    /// Creates a strictly positive symbol.
    #[must_use]
    pub fn positive(name: &str) -> Self {
        Self::with_assumptions(
            name,
            Assumptions {
                positive: true,
                nonnegative: true,
                ..Assumptions::default()
            },
        )
    }

    /// Creates a non-negative symbol.
    #[must_use]
    pub fn nonnegative(name: &str) -> Self {
        Self::with_assumptions(
            name,
            Assumptions {
                nonnegative: true,
                ..Assumptions::default()
            },
        )
    }

    /// Creates an integer symbol (sequence index).
    #[must_use]
    pub fn integer(name: &str) -> Self {
        Self::with_assumptions(
            name,
            Assumptions {
                integer: true,
                ..Assumptions::default()
            },
        )
    }

    /// The symbol's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The symbol's assumptions.
    #[must_use]
    pub fn assumptions(&self) -> Assumptions {
        self.assumptions
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
