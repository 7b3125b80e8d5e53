//! Polynomial errors.

use thiserror::Error;

/// Failure in polynomial construction or arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolyError {
    /// The expression is not a polynomial in the variable.
    #[error("{expr} is not a polynomial in {var}")]
    NotPolynomial {
        /// Offending expression.
        expr: String,
        /// The polynomial variable.
        var: String,
    },

    /// Division by the zero polynomial.
    #[error("polynomial division by zero")]
    DivisionByZero,
}

/// Result alias for polynomial operations.
pub type PolyResult<T> = Result<T, PolyError>;
