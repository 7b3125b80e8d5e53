//! Errors raised by numeric evaluation.

use thiserror::Error;

/// Failure to evaluate an expression to a number.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// A free symbol has no binding.
    #[error("unbound symbol `{0}`")]
    UnboundSymbol(String),

    /// An unresolved signal was applied.
    #[error("cannot evaluate unresolved function `{0}`")]
    UnresolvedFunction(String),

    /// The expression contains an operator with no numeric meaning here.
    #[error("cannot evaluate {0}")]
    Unsupported(String),

    /// Division by zero or a distribution evaluated at its singular point.
    #[error("singular value in {0}")]
    Singular(String),

    /// The value has a non-negligible imaginary part where a real was requested.
    #[error("value {re} + {im}j is not real")]
    NotReal {
        /// Real part.
        re: f64,
        /// Imaginary part.
        im: f64,
    },
}
