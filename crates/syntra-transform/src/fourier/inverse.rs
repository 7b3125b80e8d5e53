//! Inverse Fourier transform.
//!
//! Rational spectra are expanded into simple fractions and each pole is
//! assigned a side by where it lies: poles above the real `f` axis give
//! right-sided terms, poles below give left-sided ones. A simple pole on
//! the axis gives a `sign(t)` term; anything else is left unsupported.
//! Terms without poles are inverted by duality through the forward
//! transform.

use syntra_core::{Expr, ExprNode};
use syntra_ratfun::RationalFunction;

use crate::engine::TransformKind;
use crate::error::{TransformError, TransformResult};
use crate::kind::ExprKind;
use crate::transformer::{Context, Partial, TransformRules};
use crate::util::{
    as_signal, convolve_integral, cycles, delayed, factorial, j2pi, linear_in, magnitude,
    sign_of, swap_case,
};

const NAME: &str = "inverse_fourier";

/// Inverse Fourier transform, `f -> t`.
#[derive(Clone, Copy, Debug, Default)]
pub struct InverseFourier;

impl TransformRules for InverseFourier {
    fn name(&self) -> &'static str {
        NAME
    }

    fn unevaluated(&self, expr: &Expr, ctx: &Context<'_>) -> TransformResult<Expr> {
        let kernel = (j2pi() * ctx.y() * ctx.x()).exp();
        Ok(Expr::integral(
            &(expr * kernel),
            ctx.var,
            &-Expr::infinity(),
            &Expr::infinity(),
        ))
    }

    fn unresolved(&self, term: &Expr, ctx: &Context<'_>) -> TransformResult<Option<Partial>> {
        match term.node() {
            ExprNode::Undefined { .. } => Ok(signal(term, ctx)),
            ExprNode::Derivative { expr, var, order } if var == ctx.var => {
                // d^k X/df^k -> (-j2πt)^k x(t)
                let inner = ctx.recurse(TransformKind::InverseFourier, expr)?;
                let gain = (-j2pi() * ctx.y()).powi(i64::from(*order));
                Ok(Some(Partial::direct(gain * inner)))
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
        let mut signals = Vec::new();
        for f in rf.undef().factors() {
            let (base, exp) = f.as_base_exp();
            let Some(times) = exp.as_i64().and_then(|k| usize::try_from(k).ok()) else {
                return Ok(None);
            };
            signals.extend(std::iter::repeat(base).take(times));
        }

        let t = ctx.conjvar;
        let infinity = Expr::infinity();
        let convolve = |a: &Expr, b: &Expr| convolve_integral(a, b, t, &-&infinity, &infinity);

        let mut images = Vec::with_capacity(signals.len() + 1);
        for s in &signals {
            images.push(ctx.recurse(TransformKind::InverseFourier, s)?);
        }
        let rational = rf.rational_part();
        let scale = if rational.has_symbol(ctx.var) {
            images.push(ctx.recurse(TransformKind::InverseFourier, &rational)?);
            Expr::one()
        } else {
            rational
        };
        let Some((first, rest)) = images.split_first() else {
            return Ok(None);
        };
        let out = rest.iter().fold(first.clone(), |acc, x| convolve(&acc, x));
        let out = delayed(&out, t, &cycles(rf.delay()));
        Ok(Some(Partial::direct(scale * out)))
    }

    fn rational(&self, expr: &Expr, ctx: &Context<'_>) -> TransformResult<Option<Partial>> {
        let Some(rf) = ctx.view(expr)? else {
            return Ok(None);
        };
        if rf.has_undef() {
            return Ok(None);
        }
        let out = fractions(&rf, ctx)?;
        // exp(-d f) is a shift by d/(j2π)
        Ok(Some(Partial::direct(delayed(&out, ctx.conjvar, &cycles(rf.delay())))))
    }

    fn primitive(
        &self,
        term: &Expr,
        _kind: ExprKind,
        ctx: &Context<'_>,
    ) -> TransformResult<Option<Partial>> {
        // x(t) = X_forward(-t), with the spectrum read as a time signal
        let forward =
            ctx.recurse_with(TransformKind::Fourier, term, ctx.var, ctx.conjvar);
        match forward {
            Ok(image) => {
                let mirrored = image.subs_symbol(ctx.conjvar, &-ctx.y());
                Ok(Some(Partial::direct(mirrored)))
            }
            Err(TransformError::Unsupported { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// `X(a f + b) -> exp(-j2π b t/a) x(t/a) / |a|`.
fn signal(term: &Expr, ctx: &Context<'_>) -> Option<Partial> {
    let (name, arg) = as_signal(term)?;
    let (a, b) = linear_in(arg, ctx.var)?;
    let t = ctx.y();
    let image = Expr::undefined(&swap_case(name), [&t / &a]);
    let shift = (-j2pi() * &t * b / &a).exp();
    Some(Partial::direct(Expr::mul_all([
        magnitude(&a).recip(),
        shift,
        image,
    ])))
}

/// Quotient and pole terms with each pole assigned a side.
fn fractions(rf: &RationalFunction, ctx: &Context<'_>) -> TransformResult<Expr> {
    let opts = ctx.options;
    let qrpo = rf.as_qrpo(opts.damping, opts.method)?;
    let t = ctx.y();

    // f^k -> δ^(k)(t)/(j2π)^k
    let mut out: Vec<Expr> = qrpo
        .quotient
        .coeffs()
        .iter()
        .enumerate()
        .map(|(k, q)| {
            let k = u32::try_from(k).unwrap_or(u32::MAX);
            q * t.dirac_delta_deriv(k) / j2pi().powi(i64::from(k))
        })
        .collect();

    for (r, pole, o) in qrpo.terms() {
        let order = u32::try_from(o).unwrap_or(u32::MAX);
        let wave = (j2pi() * &pole.expr * &t).exp();
        let (_, im) = pole.re_im();
        let term = match sign_of(&im) {
            Some(0) if order == 1 => Expr::mul_all([r.clone(), Expr::j(), Expr::pi(), t.sign(), wave]),
            Some(side @ (1 | -1)) => {
                let ramp = t.powi(i64::from(order) - 1) / factorial(order - 1);
                let gate = if side > 0 {
                    t.heaviside()
                } else {
                    -(-&t).heaviside()
                };
                Expr::mul_all([
                    r.clone(),
                    j2pi().powi(i64::from(order)),
                    ramp,
                    wave,
                    gate,
                ])
            }
            _ => {
                let fraction = r / (ctx.x() - &pole.expr).powi(i64::from(order));
                return Err(ctx.unsupported(NAME, &fraction));
            }
        };
        out.push(term);
    }
    Ok(Expr::add_all(out))
}

#[cfg(test)]
mod tests {
    use syntra_core::{Bindings, Symbol};

    use crate::engine::TransformEngine;
    use crate::options::TransformOptions;

    use super::*;

    fn f() -> Symbol {
        Symbol::new("f")
    }

    fn t() -> Symbol {
        Symbol::new("t")
    }

    fn ift(e: &Expr) -> TransformResult<Expr> {
        TransformEngine::new().inverse_fourier(e, &f(), &t(), &TransformOptions::default())
    }

    fn assert_close(a: &Expr, b: &Expr) {
        for at in [-1.5, -0.4, 0.6, 2.0] {
            let env = Bindings::new().with("t", at);
            let (va, vb) = (a.eval_complex(&env).unwrap(), b.eval_complex(&env).unwrap());
            assert!((va - vb).norm() < 1e-9, "{a} != {b} at t = {at}");
        }
    }

    #[test]
    fn test_right_and_left_sided() {
        let fv = Expr::symbol(&f());
        let tv = Expr::symbol(&t());
        let s = j2pi() * &fv;
        let right = ift(&(&s + 1).recip()).unwrap();
        assert_close(&right, &((-&tv).exp() * tv.heaviside()));
        let left = ift(&(1 - &s).recip()).unwrap();
        assert_close(&left, &(tv.exp() * (-&tv).heaviside()));
    }

    #[test]
    fn test_axis_pole_and_polynomial() {
        let fv = Expr::symbol(&f());
        let tv = Expr::symbol(&t());
        assert_eq!(
            ift(&fv.recip()).unwrap(),
            Expr::j() * Expr::pi() * tv.sign()
        );
        assert_eq!(ift(&Expr::int(2)).unwrap(), 2 * tv.dirac_delta());
        assert!(matches!(
            ift(&fv.powi(-2)),
            Err(TransformError::Unsupported { .. })
        ));
    }

    #[test]
    fn test_duality() {
        let fv = Expr::symbol(&f());
        let tv = Expr::symbol(&t());
        assert_eq!(ift(&fv.dirac_delta()).unwrap(), Expr::one());
        assert_close(&ift(&fv.sinc()).unwrap(), &tv.rect());
    }

    #[test]
    fn test_signals() {
        let fv = Expr::symbol(&f());
        let tv = Expr::symbol(&t());
        let big_x = Expr::undefined("X", [fv.clone()]);
        let x = Expr::undefined("x", [tv.clone()]);
        assert_eq!(ift(&big_x).unwrap(), x);
        let out = ift(&(&big_x * (&fv + 1).recip())).unwrap();
        assert!(matches!(out.node(), ExprNode::Integral { .. }));
        assert_eq!(ift(&(3 * &big_x)).unwrap(), 3 * x);
    }

    #[test]
    fn test_round_trip_rect() {
        let engine = TransformEngine::new();
        let opts = TransformOptions::default();
        let tv = Expr::symbol(&t());
        let spectrum = engine.fourier(&tv.rect(), &t(), &f(), &opts).unwrap();
        let back = engine.inverse_fourier(&spectrum, &f(), &t(), &opts).unwrap();
        assert_close(&back, &tv.rect());
    }
}
