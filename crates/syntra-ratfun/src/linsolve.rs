//! Gaussian elimination over expressions.
//!
//! Used by the equate-coefficients residue method. Pivots are the first
//! entry in a column that is non-zero after clean-up.

use syntra_core::Expr;

use crate::error::{RationalError, RationalResult};
use crate::simplify::{cdiv, tidy};

/// Solves the square system `m x = b`.
///
/// # Errors
///
/// Returns [`RationalError::Singular`] if the matrix has no pivot in some
/// column.
pub fn solve(m: &[Vec<Expr>], b: &[Expr]) -> RationalResult<Vec<Expr>> {
    let n = b.len();
    if m.len() != n || m.iter().any(|row| row.len() != n) {
        return Err(RationalError::Singular("system is not square".into()));
    }

    // Augmented matrix [m | b]
    let mut aug: Vec<Vec<Expr>> = m
        .iter()
        .zip(b)
        .map(|(row, rhs)| {
            let mut r: Vec<Expr> = row.iter().map(tidy).collect();
            r.push(tidy(rhs));
            r
        })
        .collect();

    for col in 0..n {
        let pivot = (col..n)
            .find(|&row| !aug[row][col].is_zero())
            .ok_or_else(|| RationalError::Singular(format!("no pivot in column {col}")))?;
        aug.swap(col, pivot);

        let pivot_val = aug[col][col].clone();
        for k in col..=n {
            aug[col][k] = cdiv(&aug[col][k], &pivot_val);
        }

        for row in 0..n {
            if row == col || aug[row][col].is_zero() {
                continue;
            }
            let factor = aug[row][col].clone();
            for k in col..=n {
                let updated = tidy(&(&aug[row][k] - &factor * &aug[col][k]));
                aug[row][k] = updated;
            }
        }
    }

    Ok(aug.into_iter().map(|mut row| row.swap_remove(n)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn e(v: i64) -> Expr {
        Expr::int(v)
    }

    #[test]
    fn test_solve_2x2() {
        // x + y = 3, x - y = 1
        let m = vec![vec![e(1), e(1)], vec![e(1), e(-1)]];
        let x = solve(&m, &[e(3), e(1)]).unwrap();
        assert_eq!(x, vec![e(2), e(1)]);
    }

    #[test]
    fn test_solve_needs_pivoting() {
        let m = vec![vec![e(0), e(1)], vec![e(2), e(0)]];
        let x = solve(&m, &[e(5), e(4)]).unwrap();
        assert_eq!(x, vec![e(2), e(5)]);
    }

    #[test]
    fn test_singular() {
        let m = vec![vec![e(1), e(2)], vec![e(2), e(4)]];
        assert!(solve(&m, &[e(1), e(2)]).is_err());
    }
}
