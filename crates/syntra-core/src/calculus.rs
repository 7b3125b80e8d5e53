//! Symbolic differentiation.

use crate::expr::{Expr, ExprNode, Func};
use crate::symbol::Symbol;

impl Expr {
    /// Derivative with respect to `var`.
    ///
    /// Unresolved signals and functions without a known derivative come
    /// back as unevaluated [`ExprNode::Derivative`] nodes.
    #[must_use]
    pub fn diff(&self, var: &Symbol) -> Expr {
        if !self.has_symbol(var) {
            return Expr::zero();
        }
        match self.node() {
            ExprNode::Number(_) | ExprNode::ImaginaryUnit | ExprNode::Pi => Expr::zero(),
            ExprNode::Symbol(s) => {
                if s == var {
                    Expr::one()
                } else {
                    Expr::zero()
                }
            }
            ExprNode::Add(terms) => Expr::add_all(terms.iter().map(|t| t.diff(var))),
            ExprNode::Mul(factors) => Expr::add_all((0..factors.len()).map(|i| {
                Expr::mul_all(factors.iter().enumerate().map(|(k, f)| {
                    if k == i {
                        f.diff(var)
                    } else {
                        f.clone()
                    }
                }))
            })),
            ExprNode::Pow { base, exp } => diff_pow(base, exp, var),
            ExprNode::Func { func, args } => diff_func(self, *func, args, var),
            ExprNode::Undefined { .. } | ExprNode::Derivative { .. } => {
                Expr::derivative(self, var, 1)
            }
            ExprNode::Integral {
                body,
                var: bound,
                lower,
                upper,
            } => {
                // Leibniz rule
                let at_upper = body.subs_symbol(bound, upper) * upper.diff(var);
                let at_lower = body.subs_symbol(bound, lower) * lower.diff(var);
                let inner = if bound == var {
                    Expr::zero()
                } else {
                    Expr::integral(&body.diff(var), bound, lower, upper)
                };
                at_upper - at_lower + inner
            }
            ExprNode::Sum {
                body,
                var: bound,
                lower,
                upper,
            } => {
                if lower.has_symbol(var) || upper.has_symbol(var) {
                    Expr::derivative(self, var, 1)
                } else {
                    Expr::summation(&body.diff(var), bound, lower, upper)
                }
            }
            ExprNode::Equality { lhs, rhs } => Expr::equality(&lhs.diff(var), &rhs.diff(var)),
        }
    }

    /// `order`-th derivative with respect to `var`.
    #[must_use]
    pub fn diff_n(&self, var: &Symbol, order: u32) -> Expr {
        (0..order).fold(self.clone(), |acc, _| acc.diff(var))
    }
}

fn diff_pow(base: &Expr, exp: &Expr, var: &Symbol) -> Expr {
    let db = base.diff(var);
    if !exp.has_symbol(var) {
        return Expr::mul_all([exp.clone(), base.pow(&(exp - 1)), db]);
    }
    let de = exp.diff(var);
    let power = base.pow(exp);
    if !base.has_symbol(var) {
        return Expr::mul_all([power, base.log(), de]);
    }
    power * (de * base.log() + exp * db / base)
}

fn diff_func(whole: &Expr, func: Func, args: &[Expr], var: &Symbol) -> Expr {
    let a = &args[0];
    let da = a.diff(var);
    let outer = match func {
        Func::Exp => a.exp(),
        Func::Log => a.recip(),
        Func::Sin => a.cos(),
        Func::Cos => -a.sin(),
        Func::Abs => a.sign(),
        Func::Sign => 2 * a.dirac_delta(),
        Func::Heaviside => a.dirac_delta(),
        Func::DiracDelta(k) => a.dirac_delta_deriv(k + 1),
        Func::Rect => (a + Expr::rational(1, 2)).dirac_delta() - (a - Expr::rational(1, 2)).dirac_delta(),
        Func::Sinc => ((Expr::pi() * a).cos() - a.sinc()) / a,
        Func::Atan2 => {
            let (y, x) = (&args[0], &args[1]);
            let num = x * y.diff(var) - y * x.diff(var);
            return num / (x.powi(2) + y.powi(2));
        }
        Func::Tri | Func::UnitStep | Func::UnitImpulse => {
            return Expr::derivative(whole, var, 1);
        }
    };
    outer * da
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polynomial_derivative() {
        let x = Symbol::new("x");
        let e = Expr::symbol(&x).powi(3) + 2 * Expr::symbol(&x);
        let d = e.diff(&x);
        assert_eq!(d, 3 * Expr::symbol(&x).powi(2) + 2);
    }

    #[test]
    fn test_chain_rule_exp() {
        let t = Symbol::new("t");
        let te = Expr::symbol(&t);
        let e = (-2 * &te).exp();
        assert_eq!(e.diff(&t), -2 * (-2 * &te).exp());
    }

    #[test]
    fn test_heaviside_derivative_is_delta() {
        let t = Symbol::new("t");
        let e = Expr::symbol(&t).heaviside();
        assert_eq!(e.diff(&t), Expr::symbol(&t).dirac_delta());
    }

    #[test]
    fn test_undefined_stays_unevaluated() {
        let t = Symbol::new("t");
        let x = Expr::undefined("x", [Expr::symbol(&t)]);
        let d2 = x.diff_n(&t, 2);
        match d2.node() {
            ExprNode::Derivative { order, .. } => assert_eq!(*order, 2),
            other => panic!("expected derivative, got {other:?}"),
        }
    }
}
