//! Complex structure of expressions.
//!
//! Symbols and unresolved signals are taken to be real valued; `j` is
//! the only source of imaginary parts.

use crate::expr::{Expr, ExprNode, Func};

impl Expr {
    /// Complex conjugate.
    #[must_use]
    pub fn conjugate(&self) -> Expr {
        if !self.has(&Expr::j()) {
            return self.clone();
        }
        self.subs(&Expr::j(), &-Expr::j())
    }

    /// Splits into real and imaginary parts.
    #[must_use]
    pub fn re_im(&self) -> (Expr, Expr) {
        if !self.has(&Expr::j()) {
            return (self.clone(), Expr::zero());
        }
        match self.node() {
            ExprNode::ImaginaryUnit => (Expr::zero(), Expr::one()),
            ExprNode::Add(terms) => {
                let (re, im): (Vec<_>, Vec<_>) = terms.iter().map(Expr::re_im).unzip();
                (Expr::add_all(re), Expr::add_all(im))
            }
            ExprNode::Mul(factors) => factors
                .iter()
                .map(Expr::re_im)
                .fold((Expr::one(), Expr::zero()), |acc, f| complex_mul(&acc, &f)),
            ExprNode::Pow { base, exp } => pow_re_im(base, exp),
            ExprNode::Func { func, args } => func_re_im(self, *func, args),
            _ => (self.clone(), Expr::zero()),
        }
    }

    /// Real part.
    #[must_use]
    pub fn re(&self) -> Expr {
        self.re_im().0
    }

    /// Imaginary part.
    #[must_use]
    pub fn im(&self) -> Expr {
        self.re_im().1
    }

    /// Returns true if the imaginary part is identically zero.
    #[must_use]
    pub fn is_real(&self) -> bool {
        self.im().expand().is_zero()
    }

    /// Modulus `|z|`.
    #[must_use]
    pub fn modulus(&self) -> Expr {
        let (re, im) = self.re_im();
        if im.is_zero() {
            return match re.as_number() {
                Some(n) => Expr::number(n.abs()),
                None => re.abs(),
            };
        }
        (re.powi(2) + im.powi(2)).expand().sqrt()
    }

    /// Argument `atan2(im, re)`.
    #[must_use]
    pub fn arg(&self) -> Expr {
        let (re, im) = self.re_im();
        Expr::atan2(&im.expand(), &re.expand())
    }
}

fn complex_mul(a: &(Expr, Expr), b: &(Expr, Expr)) -> (Expr, Expr) {
    let (ar, ai) = a;
    let (br, bi) = b;
    if ai.is_zero() && bi.is_zero() {
        return (ar * br, Expr::zero());
    }
    (ar * br - ai * bi, ar * bi + ai * br)
}

fn pow_re_im(base: &Expr, exp: &Expr) -> (Expr, Expr) {
    let (br, bi) = base.re_im();
    if let Some(k) = exp.as_i64() {
        if bi.is_zero() {
            return (br.powi(k), Expr::zero());
        }
        let mut acc = (Expr::one(), Expr::zero());
        for _ in 0..k.unsigned_abs() {
            acc = complex_mul(&acc, &(br.clone(), bi.clone()));
        }
        if k < 0 {
            // 1/z = conj(z)/|z|^2
            let norm = (acc.0.powi(2) + acc.1.powi(2)).expand();
            return (&acc.0 / &norm, -&acc.1 / &norm);
        }
        return acc;
    }
    if exp.has(&Expr::j()) {
        return (base.pow(exp), Expr::zero());
    }
    // polar form for real, non-integer exponents
    let modulus = (br.powi(2) + bi.powi(2)).expand().sqrt().pow(exp);
    let angle = exp * Expr::atan2(&bi, &br);
    (&modulus * angle.cos(), modulus * angle.sin())
}

fn func_re_im(whole: &Expr, func: Func, args: &[Expr]) -> (Expr, Expr) {
    let (x, y) = args[0].re_im();
    match func {
        Func::Exp => {
            let scale = x.exp();
            if y.is_zero() {
                return (scale, Expr::zero());
            }
            (&scale * y.cos(), scale * y.sin())
        }
        Func::Log => {
            let modulus = (x.powi(2) + y.powi(2)).expand().sqrt();
            (modulus.log(), Expr::atan2(&y, &x))
        }
        Func::Sin | Func::Cos if !y.is_zero() => {
            let cosh = (y.exp() + (-&y).exp()) / 2;
            let sinh = (y.exp() - (-&y).exp()) / 2;
            if func == Func::Sin {
                (x.sin() * cosh, x.cos() * sinh)
            } else {
                (x.cos() * cosh, -(x.sin() * sinh))
            }
        }
        Func::Abs => (args[0].modulus(), Expr::zero()),
        _ => (whole.clone(), Expr::zero()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conjugate_flips_j() {
        let p = Expr::int(-1) + 2 * Expr::j();
        assert_eq!(p.conjugate(), Expr::int(-1) - 2 * Expr::j());
    }

    #[test]
    fn test_re_im_of_pole() {
        let p = Expr::int(-1) + 2 * Expr::j();
        let (re, im) = p.re_im();
        assert_eq!(re, Expr::int(-1));
        assert_eq!(im, Expr::int(2));
        assert_eq!(p.modulus(), Expr::int(5).sqrt());
    }

    #[test]
    fn test_reciprocal_is_rationalised() {
        let z = Expr::one() + Expr::j();
        let (re, im) = z.recip().re_im();
        assert_eq!(re, Expr::rational(1, 2));
        assert_eq!(im, Expr::rational(-1, 2));
    }

    #[test]
    fn test_exp_of_imaginary() {
        let w = Expr::sym("w");
        let (re, im) = (Expr::j() * &w).exp().re_im();
        assert_eq!(re, w.cos());
        assert_eq!(im, w.sin());
    }
}
