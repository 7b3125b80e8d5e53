//! Transform errors.

use syntra_ratfun::RationalError;
use thiserror::Error;

/// Failure of a transform call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    /// The expression could not be analysed as a rational function.
    #[error(transparent)]
    Decomposition(#[from] RationalError),

    /// The expression is outside the domain of the transform.
    #[error("domain error: {0}")]
    Domain(String),

    /// No rule applies to a term.
    #[error("{transform}: cannot transform {expr}")]
    Unsupported {
        /// The transform that failed.
        transform: &'static str,
        /// The offending sub-expression.
        expr: String,
    },

    /// The result would respond before its input.
    #[error("non-causal result: {0}")]
    Causality(String),

    /// A transform parameter is missing or malformed.
    #[error("invalid option: {0}")]
    InvalidOption(String),
}

/// Result alias for transform operations.
pub type TransformResult<T> = Result<T, TransformError>;
