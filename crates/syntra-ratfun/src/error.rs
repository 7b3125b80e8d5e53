//! Rational-function errors.

use syntra_poly::PolyError;
use thiserror::Error;

/// Failure to analyse an expression as a rational function.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RationalError {
    /// The expression is not rational in the variable once delays and
    /// unresolved signals are factored out.
    #[error("{expr} is not a rational function of {var}")]
    Decomposition {
        /// Offending expression.
        expr: String,
        /// The variable.
        var: String,
    },

    /// A numerator or denominator failed to convert to a polynomial.
    #[error(transparent)]
    NotPolynomial(#[from] PolyError),

    /// The denominator is identically zero.
    #[error("denominator of {0} is zero")]
    ZeroDenominator(String),

    /// The variable name is empty.
    #[error("variable name must not be empty")]
    EmptyVariable,

    /// A pole was used that is not a root of the denominator.
    #[error("{pole} is not a pole of {expr}")]
    InvalidPole {
        /// The pole expression.
        pole: String,
        /// The rational function.
        expr: String,
    },

    /// Not every pole could be found, so no partial fraction expansion exists.
    #[error("only {found} of {degree} poles of {expr} could be found")]
    UnresolvedPoles {
        /// Poles found, counted with multiplicity.
        found: usize,
        /// Denominator degree.
        degree: usize,
        /// The rational function.
        expr: String,
    },

    /// Not every zero could be found, so no zero-pole-gain form exists.
    #[error("only {found} of {degree} zeros of {expr} could be found")]
    UnresolvedZeros {
        /// Zeros found, counted with multiplicity.
        found: usize,
        /// Numerator degree.
        degree: usize,
        /// The rational function.
        expr: String,
    },

    /// A linear system or limit had no unique answer.
    #[error("singular computation: {0}")]
    Singular(String),
}

/// Result alias for rational-function operations.
pub type RationalResult<T> = Result<T, RationalError>;
