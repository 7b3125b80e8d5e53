//! Hilbert transform, `t -> t`.
//!
//! `H{x}(t) = (1/π) p.v. ∫ x(τ)/(t - τ) dτ`. Applying it twice negates,
//! so the inverse is the negated forward transform.
//!
//! Rational inputs are split into simple fractions. A pole `p` above the
//! real axis multiplies its fraction by `j`, a pole below by `-j`, and a
//! simple real pole becomes a delta.

use syntra_core::{Expr, ExprNode, Func};

use crate::error::TransformResult;
use crate::kind::ExprKind;
use crate::transformer::{Context, Partial, TransformRules};
use crate::util::{delta_factor, fresh_dummy, linear_in, sign_of, simplify_in};

/// Suffix marking the Hilbert transform of an unresolved signal.
const SUFFIX: &str = "_h";

/// Hilbert transform or its inverse.
#[derive(Clone, Copy, Debug, Default)]
pub struct Hilbert {
    inverse: bool,
}

impl Hilbert {
    /// `H`.
    #[must_use]
    pub fn forward() -> Self {
        Self { inverse: false }
    }

    /// `H^-1 = -H`.
    #[must_use]
    pub fn inverse() -> Self {
        Self { inverse: true }
    }

    fn sign(&self) -> i64 {
        if self.inverse {
            -1
        } else {
            1
        }
    }
}

impl TransformRules for Hilbert {
    fn name(&self) -> &'static str {
        if self.inverse {
            "inverse_hilbert"
        } else {
            "hilbert"
        }
    }

    fn unevaluated(&self, expr: &Expr, ctx: &Context<'_>) -> TransformResult<Expr> {
        let tau = fresh_dummy("tau", false, &[expr]);
        let tau_e = Expr::symbol(&tau);
        let body = expr.subs_symbol(ctx.var, &tau_e) / (ctx.x() - &tau_e);
        let integral = Expr::integral(&body, &tau, &-Expr::infinity(), &Expr::infinity());
        Ok(self.sign() * integral / Expr::pi())
    }

    fn unresolved(&self, term: &Expr, ctx: &Context<'_>) -> TransformResult<Option<Partial>> {
        // x(a t + b) -> sign(a) x_h(a t + b), and x_h -> -x
        let ExprNode::Undefined { name, args } = term.node() else {
            return Ok(None);
        };
        let [arg] = args.as_slice() else {
            return Ok(None);
        };
        let Some((a, _)) = linear_in(arg, ctx.var) else {
            return Ok(None);
        };
        let Some(side) = sign_of(&a).filter(|s| *s != 0) else {
            return Ok(None);
        };
        let (image, sign) = match name.strip_suffix(SUFFIX) {
            Some(plain) => (Expr::undefined(plain, [arg.clone()]), -i64::from(side)),
            None => (
                Expr::undefined(&format!("{name}{SUFFIX}"), [arg.clone()]),
                i64::from(side),
            ),
        };
        Ok(Some(Partial::direct(sign * image)))
    }

    fn rational(&self, expr: &Expr, ctx: &Context<'_>) -> TransformResult<Option<Partial>> {
        let Some(rf) = ctx.view(expr)? else {
            return Ok(None);
        };
        if rf.has_undef() || rf.has_delay() {
            return Ok(None);
        }
        let opts = ctx.options;
        let qrpo = rf.as_qrpo(opts.damping, opts.method)?;
        // constants map to zero; growing polynomials have no transform
        if qrpo.quotient.degree() > 0 {
            return Ok(None);
        }

        let t = ctx.x();
        let mut smooth = Vec::with_capacity(qrpo.len());
        let mut lines = Vec::new();
        for (r, pole, o) in qrpo.terms() {
            let (_, im) = pole.re_im();
            let fraction = r / (&t - &pole.expr).powi(i64::try_from(o).unwrap_or(i64::MAX));
            match sign_of(&im) {
                Some(1) => smooth.push(Expr::j() * fraction),
                Some(-1) => smooth.push(-Expr::j() * fraction),
                // 1/(t - a) -> -π δ(t - a)
                Some(0) if o == 1 => {
                    lines.push(-(Expr::pi() * r * (&t - &pole.expr).dirac_delta()));
                }
                _ => return Ok(None),
            }
        }
        let smooth = if smooth.is_empty() {
            Expr::zero()
        } else {
            simplify_in(&Expr::add_all(smooth), ctx.var)
        };
        let out = smooth + Expr::add_all(lines);
        Ok(Some(Partial::direct(out)))
    }

    fn primitive(
        &self,
        term: &Expr,
        kind: ExprKind,
        ctx: &Context<'_>,
    ) -> TransformResult<Option<Partial>> {
        if kind == ExprKind::Constant {
            return Ok(Some(Partial::zero()));
        }
        if let Some(d) = delta_factor(term, ctx.var) {
            // δ(t - t0) -> 1/(π (t - t0))
            if d.order > 0 || d.rest.has_symbol(ctx.var) {
                return Ok(None);
            }
            let out = d.scale * d.rest / (Expr::pi() * (ctx.x() - d.at));
            return Ok(Some(Partial::direct(out)));
        }
        Ok(tone(term, ctx).map(Partial::direct))
    }

    fn finish(&self, partial: Partial, _ctx: &Context<'_>) -> TransformResult<Expr> {
        let out = partial.combine();
        Ok(if self.inverse { -out } else { out })
    }
}

/// `cos`, `sin` and `exp(jωt)` of a linear argument.
fn tone(term: &Expr, ctx: &Context<'_>) -> Option<Expr> {
    let (func, args) = term.as_func()?;
    let (a, _) = linear_in(&args[0], ctx.var)?;
    match func {
        Func::Cos | Func::Sin => {
            let side = match sign_of(&a) {
                Some(0) | None => a.sign(),
                Some(s) => Expr::int(i64::from(s)),
            };
            // cos -> sin, sin -> -cos
            Some(match func {
                Func::Cos => side * args[0].sin(),
                _ => -(side * args[0].cos()),
            })
        }
        Func::Exp => {
            let omega = (&a / Expr::j()).expand();
            if omega.has(&Expr::j()) || !omega.is_real() {
                return None;
            }
            let side = sign_of(&omega)?;
            Some(-Expr::j() * i64::from(side) * term)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use syntra_core::{Bindings, Symbol};

    use crate::engine::TransformEngine;
    use crate::error::TransformError;
    use crate::options::TransformOptions;

    use super::*;

    fn t() -> Symbol {
        Symbol::new("t")
    }

    fn hilbert(e: &Expr) -> TransformResult<Expr> {
        TransformEngine::new().hilbert(e, &t(), &TransformOptions::default())
    }

    fn assert_close(a: &Expr, b: &Expr) {
        for at in [-2.5, -0.3, 0.7, 1.9] {
            let env = Bindings::new().with("t", at);
            let (va, vb) = (a.eval_complex(&env).unwrap(), b.eval_complex(&env).unwrap());
            assert!((va - vb).norm() < 1e-9, "{a} != {b} at t = {at}");
        }
    }

    #[test]
    fn test_sinusoids() {
        let tv = Expr::symbol(&t());
        assert_eq!(hilbert(&(2 * &tv).cos()).unwrap(), (2 * &tv).sin());
        assert_eq!(hilbert(&tv.sin()).unwrap(), -tv.cos());
        assert_close(&hilbert(&(-3 * &tv + 1).cos()).unwrap(), &-(-3 * &tv + 1).sin());
    }

    #[test]
    fn test_constant_and_exponential() {
        let tv = Expr::symbol(&t());
        assert_eq!(hilbert(&Expr::int(5)).unwrap(), Expr::zero());
        let tone = (Expr::j() * 2 * &tv).exp();
        assert_close(&hilbert(&tone).unwrap(), &(-Expr::j() * &tone));
    }

    #[test]
    fn test_delta_and_reciprocal() {
        let tv = Expr::symbol(&t());
        let pi_t = Expr::pi() * &tv;
        assert_close(&hilbert(&tv.dirac_delta()).unwrap(), &pi_t.recip());
        assert_eq!(hilbert(&pi_t.recip()).unwrap(), -tv.dirac_delta());
    }

    #[test]
    fn test_lorentzian() {
        let tv = Expr::symbol(&t());
        let x = (tv.powi(2) + 1).recip();
        let out = hilbert(&x).unwrap();
        assert_close(&out, &(&tv / (tv.powi(2) + 1)));
    }

    #[test]
    fn test_inverse_undoes_forward() {
        let engine = TransformEngine::new();
        let opts = TransformOptions::default();
        let tv = Expr::symbol(&t());
        let back = engine.inverse_hilbert(&tv.sin(), &t(), &opts).unwrap();
        assert_eq!(back, tv.cos());
        let x = (tv.powi(2) + 4).recip();
        let h = engine.hilbert(&x, &t(), &opts).unwrap();
        let back = engine.inverse_hilbert(&h, &t(), &opts).unwrap();
        assert_close(&back, &x);
    }

    #[test]
    fn test_signals() {
        let tv = Expr::symbol(&t());
        let x = Expr::undefined("x", [tv.clone()]);
        let xh = Expr::undefined("x_h", [tv.clone()]);
        assert_eq!(hilbert(&x).unwrap(), xh);
        assert_eq!(hilbert(&xh).unwrap(), -x);
        let flipped = Expr::undefined("x", [-&tv]);
        assert_eq!(
            hilbert(&flipped).unwrap(),
            -Expr::undefined("x_h", [-&tv])
        );
    }

    #[test]
    fn test_growing_polynomial_unsupported() {
        let tv = Expr::symbol(&t());
        assert!(matches!(
            hilbert(&tv),
            Err(TransformError::Unsupported { .. })
        ));
    }
}
