//! Inverse z-transform by partial fractions of `X(z)/z`.
//!
//! Expanding `X(z)/z` rather than `X(z)` leaves every fraction with a
//! factor of `z`, which maps onto a geometric sequence:
//!
//! ```text
//! r z/(z - p)^o     ->  r C(n, o-1) p^(n-o+1)
//! r z/z^o           ->  r δ[n - o + 1]
//! q z^(k+1)         ->  q δ[n + k + 1]
//! ```

use syntra_core::Expr;
use syntra_ratfun::simplify::tidy;
use syntra_ratfun::RationalFunction;

use crate::engine::TransformKind;
use crate::error::TransformResult;
use crate::transformer::{Context, Partial, TransformRules};
use crate::util::{as_signal, binomial, convolve_sum, delayed, fresh_dummy, linear_in, swap_case};

/// Inverse unilateral z-transform.
#[derive(Clone, Copy, Debug, Default)]
pub struct InverseZTransform;

impl TransformRules for InverseZTransform {
    fn name(&self) -> &'static str {
        "inverse_ztransform"
    }

    fn unevaluated(&self, expr: &Expr, ctx: &Context<'_>) -> TransformResult<Expr> {
        // (1/2π) ∫ X(exp(jθ)) exp(jθn) dθ over one period
        let theta = fresh_dummy("theta", false, &[expr]);
        let jt = Expr::j() * Expr::symbol(&theta);
        let body = expr.subs_symbol(ctx.var, &jt.exp()) * (&jt * ctx.y()).exp();
        let integral = Expr::integral(&body, &theta, &-Expr::pi(), &Expr::pi());
        Ok(integral / (2 * Expr::pi()))
    }

    fn unresolved(&self, term: &Expr, ctx: &Context<'_>) -> TransformResult<Option<Partial>> {
        // X(a z) -> a^(-n) x(n)
        let Some((name, arg)) = as_signal(term) else {
            return Ok(None);
        };
        let Some((a, b)) = linear_in(arg, ctx.var) else {
            return Ok(None);
        };
        if !b.is_zero() {
            return Ok(None);
        }
        let n = ctx.y();
        let image = Expr::undefined(&swap_case(name), [n.clone()]);
        Ok(Some(Partial::direct(a.pow(&-n) * image)))
    }

    fn product(&self, term: &Expr, ctx: &Context<'_>) -> TransformResult<Option<Partial>> {
        let Some(rf) = ctx.view(term)? else {
            return Ok(None);
        };
        if !rf.has_undef() || rf.has_delay() {
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
        let Some((first, rest)) = signals.split_first() else {
            return Ok(None);
        };

        let n = ctx.conjvar;
        let mut out = ctx.recurse(TransformKind::InverseZTransform, first)?;
        for f in rest {
            let x = ctx.recurse(TransformKind::InverseZTransform, f)?;
            out = convolve_sum(&out, &x, n, &Expr::zero(), &ctx.y());
        }

        if let Some((c, k)) = monomial(&rf) {
            // c z^(-k) X(z) -> c x(n - k)
            if k <= 0 {
                return Ok(Some(Partial::direct(c * delayed(&out, n, &Expr::int(-k)))));
            }
        }
        let h = ctx.recurse(TransformKind::InverseZTransform, &rf.rational_part())?;
        Ok(Some(Partial::direct(convolve_sum(
            &h,
            &out,
            n,
            &Expr::zero(),
            &ctx.y(),
        ))))
    }

    fn rational(&self, expr: &Expr, ctx: &Context<'_>) -> TransformResult<Option<Partial>> {
        let Some(rf) = ctx.view(expr)? else {
            return Ok(None);
        };
        if rf.has_undef() || rf.has_delay() {
            return Ok(None);
        }
        if let Some(p) = strip_delay(&rf, ctx)? {
            return Ok(Some(p));
        }
        let Some(over_z) = ctx.view(&(expr / ctx.x()))? else {
            return Ok(None);
        };
        fractions(&over_z, ctx).map(Some)
    }

    fn finish(&self, partial: Partial, ctx: &Context<'_>) -> TransformResult<Expr> {
        if ctx.options.causal {
            return Ok(partial.combine());
        }
        Ok(partial.fold(&ctx.y().unit_step()))
    }
}

/// `c z^k` when both polynomials are single monomials.
fn monomial(rf: &RationalFunction) -> Option<(Expr, i64)> {
    let single = |coeffs: &[Expr]| -> Option<(usize, Expr)> {
        let mut nonzero = coeffs.iter().enumerate().filter(|(_, c)| !c.is_zero());
        let (i, c) = nonzero.next()?;
        nonzero.next().is_none().then(|| (i, c.clone()))
    };
    let (i, b) = single(rf.numerator_poly().coeffs())?;
    let (j, a) = single(rf.denominator_poly().coeffs())?;
    let k = i64::try_from(i).ok()? - i64::try_from(j).ok()?;
    Some((tidy(&(b / a)), k))
}

/// `z^(-d) H(z) -> h[n - d]` when `H` is proper on its own.
fn strip_delay(rf: &RationalFunction, ctx: &Context<'_>) -> TransformResult<Option<Partial>> {
    let (b, a) = (rf.numerator_poly(), rf.denominator_poly());
    let (zb, za) = (b.zero_root_multiplicity(), a.zero_root_multiplicity());
    if za <= zb {
        return Ok(None);
    }
    let (b, a) = (b.unshift(zb), a.unshift(za));
    if b.degree() > a.degree() {
        return Ok(None);
    }
    let z = ctx.var;
    let inner = b.to_expr(z) / a.to_expr(z);
    let d = i64::try_from(za - zb).unwrap_or(i64::MAX);
    let h = ctx.recurse(TransformKind::InverseZTransform, &inner)?;
    Ok(Some(Partial::direct(delayed(&h, ctx.conjvar, &Expr::int(d)))))
}

/// Quotient and residue terms of `X(z)/z`.
fn fractions(over_z: &RationalFunction, ctx: &Context<'_>) -> TransformResult<Partial> {
    let opts = ctx.options;
    let qrpo = over_z.as_qrpo(opts.damping, opts.method)?;
    let n = ctx.y();

    let mut direct: Vec<Expr> = qrpo
        .quotient
        .coeffs()
        .iter()
        .enumerate()
        .map(|(k, q)| {
            let k = i64::try_from(k).unwrap_or(i64::MAX);
            q * (&n + (k + 1)).unit_impulse()
        })
        .collect();

    let combine = opts.combine_conjugates && over_z.has_real_coefficients();
    let mut stepped: Vec<Expr> = Vec::new();
    for (r, pole, o) in qrpo.terms() {
        let o = u32::try_from(o).unwrap_or(u32::MAX);
        let lag = i64::from(o) - 1;
        if pole.expr.is_zero() {
            direct.push(r * (&n - lag).unit_impulse());
            continue;
        }
        let power = &n - lag;
        let weight = binomial(&n, o - 1);
        if combine && qrpo.poles.iter().any(|p| p.is_conjugate_of(pole)) {
            if pole.is_upper() {
                let (a, b) = r.re_im();
                let radius = tidy(&pole.expr.modulus());
                let angle = tidy(&pole.expr.arg());
                let wave = tidy(&a) * (&angle * &power).cos() - tidy(&b) * (&angle * &power).sin();
                stepped.push(Expr::mul_all([Expr::int(2), weight, radius.pow(&power), wave]));
            }
            continue;
        }
        stepped.push(Expr::mul_all([r.clone(), weight, pole.expr.pow(&power)]));
    }
    Ok(Partial {
        direct: Expr::add_all(direct),
        stepped: Expr::add_all(stepped),
    })
}

#[cfg(test)]
mod tests {
    use syntra_core::{Bindings, ExprNode, Symbol};

    use crate::engine::TransformEngine;
    use crate::error::TransformError;
    use crate::options::TransformOptions;

    use super::*;

    fn z() -> Symbol {
        Symbol::new("z")
    }

    fn n() -> Symbol {
        Symbol::integer("n")
    }

    fn izt(e: &Expr, opts: &TransformOptions) -> TransformResult<Expr> {
        TransformEngine::new().inverse_ztransform(e, &z(), &n(), opts)
    }

    fn samples(e: &Expr) -> Vec<f64> {
        (0..8)
            .map(|k| {
                let env = Bindings::new().with("n", f64::from(k));
                e.eval_f64(&env).unwrap()
            })
            .collect()
    }

    fn assert_samples(e: &Expr, expected: &[f64]) {
        let got = samples(e);
        for (k, (g, x)) in got.iter().zip(expected).enumerate() {
            assert!((g - x).abs() < 1e-9, "{e} at n = {k}: {g} != {x}");
        }
    }

    #[test]
    fn test_geometric() {
        let zv = Expr::symbol(&z());
        let nv = Expr::symbol(&n());
        let half = Expr::rational(1, 2);
        let out = izt(&(&zv / (&zv - &half)), &TransformOptions::default()).unwrap();
        assert_eq!(out, half.pow(&nv) * nv.unit_step());
    }

    #[test]
    fn test_without_leading_z() {
        // 1/(z - 1/2) is (1/2)^(n-1) for n >= 1
        let zv = Expr::symbol(&z());
        let out = izt(&(&zv - Expr::rational(1, 2)).recip(), &TransformOptions::default()).unwrap();
        let expected: Vec<f64> = (0..8)
            .map(|k| if k == 0 { 0.0 } else { 0.5f64.powi(k - 1) })
            .collect();
        assert_samples(&out, &expected);
    }

    #[test]
    fn test_repeated_pole() {
        // z/(z - 1)^2 is the ramp n
        let zv = Expr::symbol(&z());
        let out = izt(&(&zv / (&zv - 1).powi(2)), &TransformOptions::default()).unwrap();
        let expected: Vec<f64> = (0..8).map(f64::from).collect();
        assert_samples(&out, &expected);
    }

    #[test]
    fn test_pure_delay() {
        let zv = Expr::symbol(&z());
        let nv = Expr::symbol(&n());
        let out = izt(&zv.powi(-2), &TransformOptions::default()).unwrap();
        assert_eq!(out, (&nv - 2).unit_impulse());
        assert_eq!(
            izt(&Expr::int(3), &TransformOptions::default()).unwrap(),
            3 * nv.unit_impulse()
        );
    }

    #[test]
    fn test_conjugate_pair_is_real() {
        // z^2/(z^2 + 1) is cos(π n/2)
        let zv = Expr::symbol(&z());
        let out = izt(&(zv.powi(2) / (zv.powi(2) + 1)), &TransformOptions::default()).unwrap();
        assert!(!out.has(&Expr::j()));
        assert_samples(&out, &[1.0, 0.0, -1.0, 0.0, 1.0, 0.0, -1.0, 0.0]);
    }

    #[test]
    fn test_causal_drops_step() {
        let zv = Expr::symbol(&z());
        let nv = Expr::symbol(&n());
        let opts = TransformOptions::default().with_causal(true);
        let out = izt(&(&zv / (&zv - 2)), &opts).unwrap();
        assert_eq!(out, Expr::int(2).pow(&nv));
    }

    #[test]
    fn test_signals() {
        let zv = Expr::symbol(&z());
        let nv = Expr::symbol(&n());
        let big_x = Expr::undefined("X", [zv.clone()]);
        let x = |arg: Expr| Expr::undefined("x", [arg]);
        let opts = TransformOptions::default();
        assert_eq!(izt(&big_x, &opts).unwrap(), x(nv.clone()));
        assert_eq!(izt(&(zv.powi(-1) * &big_x), &opts).unwrap(), x(&nv - 1));
        let out = izt(&(&big_x / (&zv - 1)), &opts).unwrap();
        assert!(matches!(out.node(), ExprNode::Sum { .. }));
    }

    #[test]
    fn test_unsupported() {
        let zv = Expr::symbol(&z());
        let out = izt(&zv.log(), &TransformOptions::default());
        assert!(matches!(out, Err(TransformError::Unsupported { .. })));
    }
}
