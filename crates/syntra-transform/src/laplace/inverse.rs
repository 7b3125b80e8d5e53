//! Inverse Laplace transform by partial fractions.
//!
//! A rational `X(s)` is split into quotient and simple fractions; each
//! fraction has a known causal time function:
//!
//! ```text
//! r / (s - p)^o          ->  r t^(o-1)/(o-1)! exp(p t)
//! s^k                    ->  δ^(k)(t)
//! exp(-T s) X(s)         ->  x(t - T) H(t - T)
//! ```
//!
//! Conjugate pole pairs of a real `X(s)` are merged into damped cosines
//! and sines so that real inputs give real outputs.

use syntra_core::{Expr, ExprNode, Symbol};
use syntra_poly::Damping;
use syntra_ratfun::simplify::tidy;
use syntra_ratfun::RationalFunction;

use crate::engine::TransformKind;
use crate::error::{TransformError, TransformResult};
use crate::kind::ExprKind;
use crate::transformer::{Context, Partial, TransformRules};
use crate::util::{
    as_signal, convolve_integral, delayed, factorial, fresh_dummy, gamma_half, linear_in,
    nonnegative, swap_case,
};

const NAME: &str = "inverse_laplace";

/// Inverse unilateral Laplace transform.
#[derive(Clone, Copy, Debug, Default)]
pub struct InverseLaplace;

impl TransformRules for InverseLaplace {
    fn name(&self) -> &'static str {
        NAME
    }

    fn unevaluated(&self, expr: &Expr, ctx: &Context<'_>) -> TransformResult<Expr> {
        // Bromwich integral along the imaginary axis, shifted by c
        let c = Expr::symbol(&fresh_dummy("c", false, &[expr]));
        let body = expr * (ctx.x() * ctx.y()).exp();
        let line = Expr::j() * Expr::infinity();
        let integral = Expr::integral(&body, ctx.var, &(&c - &line), &(&c + &line));
        Ok(integral / (2 * Expr::pi() * Expr::j()))
    }

    fn unresolved(&self, term: &Expr, ctx: &Context<'_>) -> TransformResult<Option<Partial>> {
        match term.node() {
            ExprNode::Undefined { .. } => Ok(signal(term, ctx)),
            ExprNode::Derivative { expr, var, order } if var == ctx.var => {
                // d^k X/ds^k -> (-t)^k x(t)
                let Some(inner) = signal(expr, ctx) else {
                    return Ok(None);
                };
                Ok(Some(inner.scale(&(-ctx.y()).powi(i64::from(*order)))))
            }
            _ => Ok(None),
        }
    }

    fn product(&self, term: &Expr, ctx: &Context<'_>) -> TransformResult<Option<Partial>> {
        let Some(rf) = ctx.view(term)? else {
            return Ok(None);
        };
        if !rf.has_undef() {
            return Ok(None);
        }
        let Some(signals) = signal_factors(rf.undef()) else {
            return Ok(None);
        };

        let t = ctx.conjvar;
        let mut images = Vec::with_capacity(signals.len());
        for f in &signals {
            images.push(ctx.recurse(TransformKind::InverseLaplace, f)?);
        }

        let rational = rf.rational_part();
        let (first, rest) = if rational.has_symbol(ctx.var) {
            let h = ctx.recurse(TransformKind::InverseLaplace, &rational)?;
            (h, &images[..])
        } else {
            (rational * &images[0], &images[1..])
        };
        let zero = Expr::zero();
        let out = rest.iter().fold(first, |acc, x| {
            convolve_integral(&acc, x, t, &zero, &Expr::symbol(t))
        });
        delay(Partial::direct(out), rf.delay(), ctx).map(Some)
    }

    fn rational(&self, expr: &Expr, ctx: &Context<'_>) -> TransformResult<Option<Partial>> {
        let Some(rf) = ctx.view(expr)? else {
            return Ok(None);
        };
        if rf.has_undef() {
            return Ok(None);
        }
        let partial = match damped_sin(&rf, ctx) {
            Some(p) => p,
            None => fractions(&rf, ctx)?,
        };
        delay(partial, rf.delay(), ctx).map(Some)
    }

    fn primitive(
        &self,
        term: &Expr,
        _kind: ExprKind,
        ctx: &Context<'_>,
    ) -> TransformResult<Option<Partial>> {
        // s^(-ν) -> t^(ν-1)/Γ(ν) for half-integer ν > 0
        let (base, exp) = term.as_base_exp();
        if base != ctx.x() {
            return Ok(None);
        }
        let Some((p, 2)) = exp.as_number().and_then(syntra_core::Number::to_ratio) else {
            return Ok(None);
        };
        let Some(gamma) = gamma_half(-p) else {
            return Ok(None);
        };
        let nu = -exp;
        Ok(Some(Partial::stepped(ctx.y().pow(&(nu - 1)) / gamma)))
    }

    fn finish(&self, partial: Partial, ctx: &Context<'_>) -> TransformResult<Expr> {
        if ctx.options.causal {
            return Ok(partial.combine());
        }
        Ok(partial.fold(&ctx.y().heaviside()))
    }
}

/// `X(a s + b) -> exp(-b t/a) x(t/a) / a`.
fn signal(term: &Expr, ctx: &Context<'_>) -> Option<Partial> {
    let (name, arg) = as_signal(term)?;
    let (a, b) = linear_in(arg, ctx.var)?;
    let t = ctx.y();
    let image = Expr::undefined(&swap_case(name), [&t / &a]);
    Some(Partial::direct(Expr::mul_all([
        a.recip(),
        (-(b * &t) / &a).exp(),
        image,
    ])))
}

/// Unresolved factors as a flat list, expanding positive integer powers.
fn signal_factors(undef: &Expr) -> Option<Vec<Expr>> {
    let mut out = Vec::new();
    for f in undef.factors() {
        let (base, exp) = f.as_base_exp();
        let times = usize::try_from(exp.as_i64()?).ok().filter(|&k| k > 0)?;
        out.extend(std::iter::repeat(base).take(times));
    }
    (!out.is_empty()).then_some(out)
}

/// Shifts by the delay `T`, attaching `H(t - T)` to the causal part.
fn delay(partial: Partial, delay: &Expr, ctx: &Context<'_>) -> TransformResult<Partial> {
    if delay.is_zero() {
        return Ok(partial);
    }
    match nonnegative(delay) {
        Some(false) => {
            return Err(TransformError::Causality(format!(
                "exp({delay} {}) advances the response",
                ctx.var
            )));
        }
        None => log::warn!("assuming delay {delay} is non-negative"),
        Some(true) => {}
    }
    let t = ctx.conjvar;
    let step = (ctx.y() - delay).heaviside();
    Ok(Partial::direct(
        delayed(&partial.direct, t, delay) + delayed(&partial.stepped, t, delay) * step,
    ))
}

/// Quotient and residue terms.
fn fractions(rf: &RationalFunction, ctx: &Context<'_>) -> TransformResult<Partial> {
    let opts = ctx.options;
    let qrpo = rf.as_qrpo(opts.damping, opts.method)?;
    let t = ctx.y();

    let direct = Expr::add_all(qrpo.quotient.coeffs().iter().enumerate().map(|(k, q)| {
        let k = u32::try_from(k).unwrap_or(u32::MAX);
        q * t.dirac_delta_deriv(k)
    }));

    let combine = opts.combine_conjugates && rf.has_real_coefficients();
    let mut stepped: Vec<Expr> = Vec::new();
    for (r, pole, o) in qrpo.terms() {
        let order = u32::try_from(o).unwrap_or(u32::MAX);
        let ramp = t.powi(i64::from(order) - 1) / factorial(order - 1);
        if combine && qrpo.poles.iter().any(|p| p.is_conjugate_of(pole)) {
            if pole.is_upper() {
                let (sigma, omega) = pole.re_im();
                stepped.push(Expr::mul_all([
                    ramp,
                    (sigma * &t).exp(),
                    damped_pair(r, &omega, ctx.conjvar),
                ]));
            }
            continue;
        }
        stepped.push(Expr::mul_all([r.clone(), ramp, (&pole.expr * &t).exp()]));
    }
    Ok(Partial {
        direct,
        stepped: Expr::add_all(stepped),
    })
}

/// `r exp(jωt) + conj(r) exp(-jωt) = 2 Re r cos ωt - 2 Im r sin ωt`.
fn damped_pair(r: &Expr, omega: &Expr, t: &Symbol) -> Expr {
    let (re, im) = r.re_im();
    let wt = omega * Expr::symbol(t);
    tidy(&(2 * re)) * wt.cos() - tidy(&(2 * im)) * wt.sin()
}

/// `(b1 s + b0)/(a2 s^2 + a1 s + a0)` with complex poles, as
/// `exp(-α t) (β1 cos ωd t + (β0 - β1 α)/ωd sin ωd t)`.
fn damped_sin(rf: &RationalFunction, ctx: &Context<'_>) -> Option<Partial> {
    if !ctx.options.damped_sin || !rf.has_real_coefficients() {
        return None;
    }
    let (b, a) = (rf.numerator_poly(), rf.denominator_poly());
    if a.degree() != 2 || b.degree() > 1 {
        return None;
    }
    let (a0, a1, a2) = (a.coeff(0), a.coeff(1), a.coeff(2));
    let discriminant = (a1.powi(2) - 4 * &a0 * &a2).expand();
    let under = ctx.options.damping == Some(Damping::Under)
        || nonnegative(&discriminant) == Some(false);
    if !under {
        return None;
    }

    let alpha = tidy(&(&a1 / (2 * &a2)));
    let w0sq = tidy(&(&a0 / &a2));
    let wd = (w0sq - alpha.powi(2)).expand().sqrt();
    let beta1 = tidy(&(b.coeff(1) / &a2));
    let beta0 = tidy(&(b.coeff(0) / &a2));
    let t = ctx.y();
    let wt = &wd * &t;
    let sine = tidy(&((beta0 - &beta1 * &alpha) / &wd));
    let body = beta1 * wt.cos() + sine * wt.sin();
    Some(Partial::stepped((-alpha * t).exp() * body))
}

#[cfg(test)]
mod tests {
    use syntra_core::Bindings;

    use crate::engine::TransformEngine;
    use crate::options::TransformOptions;
    use syntra_ratfun::Method;

    use super::*;

    fn s() -> Expr {
        Expr::sym("s")
    }

    fn ilt(e: &Expr, opts: &TransformOptions) -> TransformResult<Expr> {
        TransformEngine::new().inverse_laplace(e, &Symbol::new("s"), &Symbol::new("t"), opts)
    }

    fn assert_close(a: &Expr, b: &Expr) {
        for at in [0.3, 1.1, 2.6] {
            let env = Bindings::new().with("t", at);
            let (va, vb) = (a.eval_complex(&env).unwrap(), b.eval_complex(&env).unwrap());
            assert!((va - vb).norm() < 1e-9, "{a} != {b} at t = {at}");
        }
    }

    #[test]
    fn test_first_order() {
        let t = Expr::sym("t");
        let out = ilt(&(s() + 1).recip(), &TransformOptions::default()).unwrap();
        assert_eq!(out, (-&t).exp() * t.heaviside());
        let causal = ilt(&(s() + 1).recip(), &TransformOptions::default().with_causal(true));
        assert_eq!(causal.unwrap(), (-t).exp());
    }

    #[test]
    fn test_conjugate_pair_is_real() {
        let t = Expr::sym("t");
        let opts = TransformOptions::default().with_causal(true);
        let out = ilt(&(s().powi(2) + 1).recip(), &opts).unwrap();
        assert_eq!(out, t.sin());

        let h = (s() + 3) / (s().powi(2) + 2 * s() + 5);
        let out = ilt(&h, &opts).unwrap();
        assert!(!out.has(&Expr::j()));
        let expected = (-&t).exp() * ((2 * &t).cos() + (2 * &t).sin());
        assert_close(&out, &expected);
    }

    #[test]
    fn test_uncombined_pair() {
        let opts = TransformOptions::default()
            .with_causal(true)
            .with_combine_conjugates(false);
        let out = ilt(&(s().powi(2) + 1).recip(), &opts).unwrap();
        assert!(out.has(&Expr::j()));
        assert_close(&out, &Expr::sym("t").sin());
    }

    #[test]
    fn test_damped_sin_form() {
        let t = Expr::sym("t");
        let opts = TransformOptions::default()
            .with_causal(true)
            .with_damped_sin(true);
        let h = (s() + 3) / (s().powi(2) + 2 * s() + 5);
        let out = ilt(&h, &opts).unwrap();
        let expected = (-&t).exp() * ((2 * &t).cos() + (2 * &t).sin());
        assert_close(&out, &expected);
    }

    #[test]
    fn test_repeated_pole_and_quotient() {
        let t = Expr::sym("t");
        let opts = TransformOptions::default().with_causal(true);
        let out = ilt(&(s() + 1).powi(-2), &opts).unwrap();
        assert_close(&out, &(&t * (-&t).exp()));

        // (s + 2)/(s + 1) = 1 + 1/(s + 1)
        let out = ilt(&((s() + 2) / (s() + 1)), &opts).unwrap();
        assert_eq!(out, t.dirac_delta() + (-&t).exp());
    }

    #[test]
    fn test_delay() {
        let t = Expr::sym("t");
        let h = (-2 * s()).exp() / (s() + 1);
        let out = ilt(&h, &TransformOptions::default()).unwrap();
        let expected = (-(&t - 2)).exp() * (&t - 2).heaviside();
        assert_eq!(out, expected);

        let advance = (2 * s()).exp() / (s() + 1);
        assert!(matches!(
            ilt(&advance, &TransformOptions::default()),
            Err(TransformError::Causality(_))
        ));
    }

    #[test]
    fn test_methods_agree() {
        let h = (s() + 5) / ((s() + 1).powi(2) * (s() + 3));
        let causal = TransformOptions::default().with_causal(true);
        let sub = ilt(&h, &causal).unwrap();
        let ec = ilt(&h, &causal.clone().with_method(Method::Ec)).unwrap();
        assert_close(&sub, &ec);
    }

    #[test]
    fn test_unresolved_signals() {
        let t = Expr::sym("t");
        let v = Expr::undefined("V", [s()]);
        let opts = TransformOptions::default();
        assert_eq!(ilt(&v, &opts).unwrap(), Expr::undefined("v", [t.clone()]));
        assert_eq!(
            ilt(&((-3 * s()).exp() * &v), &opts).unwrap(),
            Expr::undefined("v", [&t - 3])
        );
        let filtered = ilt(&(&v / (s() + 1)), &opts).unwrap();
        assert!(matches!(filtered.node(), ExprNode::Integral { .. }));
    }

    #[test]
    fn test_half_integer_power() {
        let t = Expr::sym("t");
        let opts = TransformOptions::default().with_causal(true);
        let out = ilt(&s().pow(&Expr::rational(-1, 2)), &opts).unwrap();
        assert_close(&out, &(t.pow(&Expr::rational(-1, 2)) / Expr::pi().sqrt()));
    }

    #[test]
    fn test_irreducible_cubic_has_exact_poles() {
        // y''' + 2y' + y = δ, so y and y' vanish and y'' is one at the origin
        let opts = TransformOptions::default().with_causal(true);
        let y = ilt(&(s().powi(3) + 2 * s() + 1).recip(), &opts).unwrap();
        assert!(!y.any(|e| e.as_number().is_some_and(|n| !n.is_exact())));
        let t = Symbol::new("t");
        let at = |e: &Expr, x: f64| e.eval_complex(&Bindings::new().with("t", x)).unwrap();
        let (d1, d2, d3) = (y.diff(&t), y.diff_n(&t, 2), y.diff_n(&t, 3));
        assert!(at(&y, 0.0).norm() < 1e-9);
        assert!(at(&d1, 0.0).norm() < 1e-9);
        assert!((at(&d2, 0.0) - 1.0).norm() < 1e-9);
        for x in [0.4, 1.7] {
            let residual = at(&d3, x) + 2.0 * at(&d1, x) + at(&y, x);
            assert!(residual.norm() < 1e-8);
        }
    }

    #[test]
    fn test_unresolved_poles_error() {
        let h = (s().powi(5) + Expr::sym("a") * s() + 1).recip();
        assert!(matches!(
            ilt(&h, &TransformOptions::default()),
            Err(TransformError::Decomposition(_))
        ));
    }

    #[test]
    fn test_unknown_term_reported() {
        let out = ilt(&s().sin(), &TransformOptions::default());
        assert!(matches!(out, Err(TransformError::Unsupported { .. })));
    }
}
