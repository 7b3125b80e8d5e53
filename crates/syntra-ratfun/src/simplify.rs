//! Coefficient clean-up shared by residues, forms and linear solving.

use syntra_core::Expr;
use syntra_poly::dense::simplify_coeff;

/// Normal form for a scalar coefficient: expanded, and written as
/// `re + j*im` when it has an imaginary part.
#[must_use]
pub fn tidy(e: &Expr) -> Expr {
    if !e.has(&Expr::j()) {
        return simplify_coeff(e);
    }
    let (re, im) = e.re_im();
    let re = simplify_coeff(&re);
    let im = simplify_coeff(&im);
    if im.is_zero() {
        re
    } else {
        re + Expr::j() * im
    }
}

/// Division that rationalises a complex denominator.
#[must_use]
pub fn cdiv(num: &Expr, den: &Expr) -> Expr {
    if !den.has(&Expr::j()) {
        return tidy(&(num / den));
    }
    let conj = den.conjugate();
    let norm = simplify_coeff(&(den * &conj));
    tidy(&((num * conj).expand() / norm))
}

/// Returns true if the coefficient is zero after clean-up.
#[must_use]
pub fn is_zero(e: &Expr) -> bool {
    tidy(e).is_zero()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cdiv_rationalises() {
        // 1 / (1 + 2j) = (1 - 2j)/5
        let q = cdiv(&Expr::one(), &(Expr::one() + 2 * Expr::j()));
        assert_eq!(q, Expr::rational(1, 5) - Expr::rational(2, 5) * Expr::j());
    }

    #[test]
    fn test_tidy_collects_parts() {
        let j = Expr::j();
        let e = (Expr::one() + &j) * (Expr::one() - &j);
        assert_eq!(tidy(&e), Expr::int(2));
    }
}
