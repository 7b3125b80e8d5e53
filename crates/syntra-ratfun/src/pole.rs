//! Poles of rational functions.

use syntra_core::Expr;
use syntra_poly::Damping;

/// A root of the denominator with its multiplicity.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Pole {
    /// Location of the pole.
    pub expr: Expr,
    /// Multiplicity, at least one.
    pub n: usize,
    /// Damping hint used when the pole was found.
    pub damping: Option<Damping>,
}

impl Pole {
    /// Creates a pole.
    ///
    /// # Panics
    ///
    /// Panics if `n` is zero.
    #[must_use]
    pub fn new(expr: Expr, n: usize, damping: Option<Damping>) -> Self {
        assert!(n >= 1, "pole multiplicity must be at least one");
        Self { expr, n, damping }
    }

    /// The conjugate pole.
    #[must_use]
    pub fn conjugate(&self) -> Self {
        Self {
            expr: self.expr.conjugate(),
            n: self.n,
            damping: self.damping,
        }
    }

    /// Real and imaginary parts of the location.
    #[must_use]
    pub fn re_im(&self) -> (Expr, Expr) {
        let (re, im) = self.expr.re_im();
        (re.expand(), im.expand())
    }

    /// Returns true for poles on the real axis.
    #[must_use]
    pub fn is_real(&self) -> bool {
        self.re_im().1.is_zero()
    }

    /// Returns true if `other` is the mirror image of this pole with the
    /// same multiplicity.
    #[must_use]
    pub fn is_conjugate_of(&self, other: &Pole) -> bool {
        !self.is_real() && self.n == other.n && self.expr.conjugate() == other.expr
    }

    /// Returns true for the member of a conjugate pair drawn in the upper
    /// half plane (the imaginary part carries no explicit minus sign).
    #[must_use]
    pub fn is_upper(&self) -> bool {
        let im = self.re_im().1;
        match im.as_number() {
            Some(n) => n.is_positive(),
            None => !im.is_zero() && !im.has_negative_sign(),
        }
    }
}

impl std::fmt::Display for Pole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.n == 1 {
            write!(f, "{}", self.expr)
        } else {
            write!(f, "{} (order {})", self.expr, self.n)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conjugate_pair() {
        let p = Pole::new(Expr::int(-1) + 2 * Expr::j(), 1, None);
        let q = p.conjugate();
        assert!(p.is_conjugate_of(&q));
        assert!(q.is_conjugate_of(&p));
        assert!(p.is_upper());
        assert!(!q.is_upper());
    }

    #[test]
    fn test_real_pole() {
        let p = Pole::new(Expr::int(-3), 2, None);
        assert!(p.is_real());
        assert!(!p.is_conjugate_of(&p.conjugate()));
    }
}
