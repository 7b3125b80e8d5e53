//! Discrete-time Fourier transform in normalised frequency.
//!
//! `X(F) = Σ x[n] exp(-j2π F n)` over all `n`; the inverse integrates one
//! period, `x[n] = ∫ X(F) exp(j2π F n) dF` over `[-1/2, 1/2]`.
//!
//! Causal geometric terms go through the z-transform at `z = exp(j2πF)`,
//! and spectra written in powers of `exp(-j2πF)` come back through the
//! inverse z-transform.

use syntra_core::{Bindings, Expr, Func};

use crate::engine::TransformKind;
use crate::error::{TransformError, TransformResult};
use crate::kind::ExprKind;
use crate::transformer::{Context, Partial, TransformRules};
use crate::util::{
    as_signal, at_or_after, cycles, delta_factor, edge_factor, exp_poly_terms, fresh_dummy,
    impulse_factor, j2pi, linear_in, nonnegative, swap_case, ExpTerm,
};

/// `n -> F`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Dtft;

/// `F -> n`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Idtft;

/// `exp(j2π F)` for frequency `f`.
fn unit_circle(f: &Expr) -> Expr {
    (j2pi() * f).exp()
}

/// `Σ_m δ(F - F0 - m)` over all integers `m`.
fn comb(f: &Expr, f0: &Expr) -> Expr {
    let m = fresh_dummy("m", true, &[f, f0]);
    let line = (f - f0 - Expr::symbol(&m)).dirac_delta();
    Expr::summation(&line, &m, &-Expr::infinity(), &Expr::infinity())
}

impl TransformRules for Dtft {
    fn name(&self) -> &'static str {
        "dtft"
    }

    fn unevaluated(&self, expr: &Expr, ctx: &Context<'_>) -> TransformResult<Expr> {
        let body = expr * (-j2pi() * ctx.y() * ctx.x()).exp();
        Ok(Expr::summation(
            &body,
            ctx.var,
            &-Expr::infinity(),
            &Expr::infinity(),
        ))
    }

    fn unresolved(&self, term: &Expr, ctx: &Context<'_>) -> TransformResult<Option<Partial>> {
        // x(n - m) -> exp(-j2π F m) X(F)
        let Some((name, arg)) = as_signal(term) else {
            return Ok(None);
        };
        let Some((a, b)) = linear_in(arg, ctx.var) else {
            return Ok(None);
        };
        if !a.is_one() {
            return Ok(None);
        }
        let f = ctx.y();
        let image = Expr::undefined(&swap_case(name), [f.clone()]);
        Ok(Some(Partial::direct((j2pi() * f * b).exp() * image)))
    }

    fn product(&self, term: &Expr, ctx: &Context<'_>) -> TransformResult<Option<Partial>> {
        // x(n) exp(j2π F0 n) -> X(F - F0)
        let (signals, constant, rate) = split_modulated(term, ctx);
        let [signal] = signals.as_slice() else {
            return Ok(None);
        };
        let Some(rate) = rate else {
            return Ok(None);
        };
        let Some(Partial { direct: image, .. }) = self.unresolved(signal, ctx)? else {
            return Ok(None);
        };
        let shifted = image.subs_symbol(ctx.conjvar, &(ctx.y() - cycles(&rate)));
        Ok(Some(Partial::direct(constant * shifted)))
    }

    fn primitive(
        &self,
        term: &Expr,
        _kind: ExprKind,
        ctx: &Context<'_>,
    ) -> TransformResult<Option<Partial>> {
        let f = ctx.y();
        if let Some((at, rest)) = impulse_factor(term, ctx.var) {
            let weight = rest.subs_symbol(ctx.var, &at);
            return Ok(Some(Partial::direct(weight * (-j2pi() * &f * at).exp())));
        }
        if let Some(p) = causal(term, ctx)? {
            return Ok(Some(p));
        }
        Ok(everlasting(term, ctx).map(Partial::direct))
    }
}

/// Signals, constant factors and the summed exponential rate of a
/// modulated product; `rate` is `None` if some factor has another shape.
fn split_modulated(term: &Expr, ctx: &Context<'_>) -> (Vec<Expr>, Expr, Option<Expr>) {
    let mut signals = Vec::new();
    let mut constant = Vec::new();
    let mut rates = Vec::new();
    let mut shaped = true;
    for f in term.factors() {
        if !f.has_symbol(ctx.var) {
            constant.push(f);
        } else if as_signal(&f).is_some() {
            signals.push(f);
        } else if let Some((a, b)) = f.func_arg(Func::Exp).and_then(|e| linear_in(e, ctx.var)) {
            rates.push(a);
            constant.push(b.exp());
        } else {
            shaped = false;
        }
    }
    let rate = shaped.then(|| Expr::add_all(rates));
    (signals, Expr::mul_all(constant), rate)
}

/// `u[n - m] g[n]` with `g` geometric and decaying, through the z-transform.
fn causal(term: &Expr, ctx: &Context<'_>) -> TransformResult<Option<Partial>> {
    let Some((slope, edge, rest)) = edge_factor(term, Func::UnitStep, ctx.var) else {
        return Ok(None);
    };
    if !slope.is_one() {
        return Ok(None);
    }
    let f = ctx.y();
    let shift = (-j2pi() * &f * &edge).exp();

    if !rest.has_symbol(ctx.var) {
        // u[n] -> 1/(1 - exp(-j2πF)) + 1/2 Σ δ(F - m)
        let pole = (1 - (-j2pi() * &f).exp()).recip();
        let lines = Expr::rational(1, 2) * comb(&f, &Expr::zero());
        return Ok(Some(Partial::direct(rest * shift * (pole + lines))));
    }

    let Some(terms) = exp_poly_terms(&rest, ctx.var, true) else {
        return Ok(None);
    };
    let decaying = terms.iter().all(|ExpTerm { rate, .. }| {
        rate.modulus()
            .eval_f64(&Bindings::new())
            .is_ok_and(|r| r < 1.0)
    });
    if !decaying || !at_or_after(&edge, &Expr::zero(), "dtft") {
        return Ok(None);
    }
    let z = fresh_dummy("z", false, &[term, &f]);
    let image = ctx.recurse_with(TransformKind::ZTransform, term, ctx.var, &z)?;
    Ok(Some(Partial::direct(image.subs_symbol(&z, &unit_circle(&f)))))
}

/// Everlasting tones `c exp(j2π F0 n) -> c Σ δ(F - F0 - m)`.
fn everlasting(term: &Expr, ctx: &Context<'_>) -> Option<Expr> {
    let terms = exp_poly_terms(term, ctx.var, true)?;
    let f = ctx.y();
    let mut out = Vec::with_capacity(terms.len());
    for ExpTerm { coeff, power, rate } in terms {
        if power > 0 {
            return None;
        }
        let f0 = if rate.is_one() {
            Expr::zero()
        } else {
            let alpha = match rate.func_arg(Func::Exp) {
                Some(alpha) => alpha.clone(),
                None if rate.modulus().is_one() => Expr::j() * rate.arg(),
                None => return None,
            };
            let f0 = cycles(&alpha);
            if f0.has(&Expr::j()) {
                return None;
            }
            f0
        };
        out.push(coeff * comb(&f, &f0));
    }
    Some(Expr::add_all(out))
}

impl TransformRules for Idtft {
    fn name(&self) -> &'static str {
        "idtft"
    }

    fn unevaluated(&self, expr: &Expr, ctx: &Context<'_>) -> TransformResult<Expr> {
        let body = expr * (j2pi() * ctx.x() * ctx.y()).exp();
        let half = Expr::rational(1, 2);
        Ok(Expr::integral(&body, ctx.var, &-&half, &half))
    }

    fn unresolved(&self, term: &Expr, ctx: &Context<'_>) -> TransformResult<Option<Partial>> {
        // X(F - F0) -> exp(j2π F0 n) x(n)
        let Some((name, arg)) = as_signal(term) else {
            return Ok(None);
        };
        let Some((a, b)) = linear_in(arg, ctx.var) else {
            return Ok(None);
        };
        if !a.is_one() {
            return Ok(None);
        }
        let n = ctx.y();
        let image = Expr::undefined(&swap_case(name), [n.clone()]);
        Ok(Some(Partial::direct((-j2pi() * b * n).exp() * image)))
    }

    fn product(&self, term: &Expr, ctx: &Context<'_>) -> TransformResult<Option<Partial>> {
        // exp(-j2π F m) X(F) -> x(n - m)
        let (signals, constant, rate) = split_modulated(term, ctx);
        let [signal] = signals.as_slice() else {
            return Ok(None);
        };
        let Some(rate) = rate else {
            return Ok(None);
        };
        let Some(Partial { direct: image, .. }) = self.unresolved(signal, ctx)? else {
            return Ok(None);
        };
        let shifted = image.subs_symbol(ctx.conjvar, &(ctx.y() + cycles(&rate)));
        Ok(Some(Partial::direct(constant * shifted)))
    }

    fn primitive(
        &self,
        term: &Expr,
        _kind: ExprKind,
        ctx: &Context<'_>,
    ) -> TransformResult<Option<Partial>> {
        let n = ctx.y();
        if let Some(d) = delta_factor(term, ctx.var) {
            if d.order > 0 || d.rest.has_symbol(ctx.var) {
                return Ok(None);
            }
            // one line per period
            return Ok(Some(Partial::direct(Expr::mul_all([
                d.scale,
                d.rest,
                (j2pi() * d.at * n).exp(),
            ]))));
        }
        if let Some((slope, edge, rest)) = edge_factor(term, Func::Rect, ctx.var) {
            // rect(a F) with a >= 1 fits inside one period
            let inside = nonnegative(&(&slope - 1)) == Some(true);
            if !edge.is_zero() || rest.has_symbol(ctx.var) || !inside {
                return Ok(None);
            }
            let out = rest * (&n / &slope).sinc() / &slope;
            return Ok(Some(Partial::direct(out)));
        }
        powers_of_z(term, ctx)
    }
}

/// Rewrites `exp(j2π k F)` as `z^k` and inverts the result as a
/// z-transform.
fn powers_of_z(term: &Expr, ctx: &Context<'_>) -> TransformResult<Option<Partial>> {
    let z = fresh_dummy("z", false, &[term]);
    let zv = Expr::symbol(&z);
    let rewritten = term.rewrite(&mut |node: &Expr| {
        let arg = node.func_arg(Func::Exp)?;
        let (a, b) = linear_in(arg, ctx.var)?;
        let k = cycles(&a).as_i64()?;
        Some(b.exp() * zv.powi(k))
    });
    if rewritten.has_symbol(ctx.var) {
        return Ok(None);
    }
    let out = ctx.recurse_with(
        TransformKind::InverseZTransform,
        &rewritten,
        &z,
        ctx.conjvar,
    );
    match out {
        Ok(x) => Ok(Some(Partial::direct(x))),
        Err(TransformError::Unsupported { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use syntra_core::{ExprNode, Symbol};

    use crate::engine::TransformEngine;
    use crate::options::TransformOptions;

    use super::*;

    fn n() -> Symbol {
        Symbol::integer("n")
    }

    fn f() -> Symbol {
        Symbol::new("F")
    }

    fn dtft(e: &Expr) -> TransformResult<Expr> {
        TransformEngine::new().dtft(e, &n(), &f(), &TransformOptions::default())
    }

    fn idtft(e: &Expr) -> TransformResult<Expr> {
        TransformEngine::new().idtft(e, &f(), &n(), &TransformOptions::default())
    }

    fn assert_close(a: &Expr, b: &Expr, var: &str, points: &[f64]) {
        for &at in points {
            let env = Bindings::new().with(var, at);
            let (va, vb) = (a.eval_complex(&env).unwrap(), b.eval_complex(&env).unwrap());
            assert!((va - vb).norm() < 1e-9, "{a} != {b} at {var} = {at}");
        }
    }

    #[test]
    fn test_impulse() {
        let nv = Expr::symbol(&n());
        let fv = Expr::symbol(&f());
        let out = dtft(&(&nv - 3).unit_impulse()).unwrap();
        assert_close(&out, &(-3 * j2pi() * &fv).exp(), "F", &[0.1, 0.37]);
    }

    #[test]
    fn test_decaying_geometric() {
        let nv = Expr::symbol(&n());
        let fv = Expr::symbol(&f());
        let half = Expr::rational(1, 2);
        let x = half.pow(&nv) * nv.unit_step();
        let out = dtft(&x).unwrap();
        let expected = (1 - &half * (-j2pi() * &fv).exp()).recip();
        assert_close(&out, &expected, "F", &[0.0, 0.2, 0.45]);
    }

    #[test]
    fn test_constant_is_a_comb() {
        let out = dtft(&Expr::one()).unwrap();
        assert!(matches!(out.node(), ExprNode::Sum { .. }));
    }

    #[test]
    fn test_step_keeps_lines() {
        let nv = Expr::symbol(&n());
        let out = dtft(&nv.unit_step()).unwrap();
        assert!(out.any(|e| matches!(e.node(), ExprNode::Sum { .. })));
    }

    #[test]
    fn test_inverse_through_z() {
        let nv = Expr::symbol(&n());
        let fv = Expr::symbol(&f());
        let half = Expr::rational(1, 2);
        let spectrum = (1 - &half * (-j2pi() * &fv).exp()).recip();
        let out = idtft(&spectrum).unwrap();
        let expected = half.pow(&nv) * nv.unit_step();
        assert_close(&out, &expected, "n", &[0.0, 1.0, 2.0, 5.0]);
    }

    #[test]
    fn test_inverse_delay_and_line() {
        let nv = Expr::symbol(&n());
        let fv = Expr::symbol(&f());
        let out = idtft(&(-2 * j2pi() * &fv).exp()).unwrap();
        assert_close(&out, &(&nv - 2).unit_impulse(), "n", &[0.0, 1.0, 2.0, 3.0]);
        let out = idtft(&(&fv - Expr::rational(1, 8)).dirac_delta()).unwrap();
        assert_close(
            &out,
            &(j2pi() * &nv / 8).exp(),
            "n",
            &[0.0, 1.0, 3.0],
        );
    }

    #[test]
    fn test_inverse_rect() {
        let nv = Expr::symbol(&n());
        let fv = Expr::symbol(&f());
        let out = idtft(&(4 * &fv).rect()).unwrap();
        assert_close(&out, &((&nv / 4).sinc() / 4), "n", &[0.0, 1.0, 2.0, 7.0]);
    }

    #[test]
    fn test_signals() {
        let nv = Expr::symbol(&n());
        let fv = Expr::symbol(&f());
        let x = |arg: Expr| Expr::undefined("x", [arg]);
        let big_x = Expr::undefined("X", [fv.clone()]);
        assert_eq!(dtft(&x(nv.clone())).unwrap(), big_x);
        assert_eq!(idtft(&big_x).unwrap(), x(nv.clone()));
        let delayed = idtft(&((-2 * j2pi() * &fv).exp() * &big_x)).unwrap();
        assert_eq!(delayed, x(&nv - 2));
    }
}
