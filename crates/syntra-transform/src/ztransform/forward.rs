//! `X(z) = Σ x(n) z^(-n)` over `n >= 0`.

use syntra_core::{Expr, ExprNode, Func};

use crate::engine::TransformKind;
use crate::error::TransformResult;
use crate::kind::ExprKind;
use crate::transformer::{check_independent, check_one_sided, Context, Partial, TransformRules};
use crate::util::{
    as_signal, at_or_after, edge_factor, exp_poly_terms, impulse_factor, linear_in, nonnegative,
    ramp_diff, simplify_in, swap_case, warn_if_unordered, ExpTerm,
};

const NAME: &str = "ztransform";

/// Unilateral z-transform.
#[derive(Clone, Copy, Debug, Default)]
pub struct ZTransform;

impl TransformRules for ZTransform {
    fn name(&self) -> &'static str {
        NAME
    }

    fn check(&self, expr: &Expr, ctx: &Context<'_>) -> TransformResult<()> {
        check_independent(expr, ctx)?;
        check_one_sided(expr, Func::UnitStep, ctx)
    }

    fn unevaluated(&self, expr: &Expr, ctx: &Context<'_>) -> TransformResult<Expr> {
        let kernel = ctx.y().pow(&-ctx.x());
        Ok(Expr::summation(
            &(expr * kernel),
            ctx.var,
            &Expr::zero(),
            &Expr::infinity(),
        ))
    }

    fn unresolved(&self, term: &Expr, ctx: &Context<'_>) -> TransformResult<Option<Partial>> {
        if !matches!(term.node(), ExprNode::Undefined { .. }) {
            return Ok(None);
        }
        Ok(signal(term, ctx))
    }

    fn product(&self, term: &Expr, ctx: &Context<'_>) -> TransformResult<Option<Partial>> {
        modulated(term, ctx)
    }

    fn primitive(
        &self,
        term: &Expr,
        _kind: ExprKind,
        ctx: &Context<'_>,
    ) -> TransformResult<Option<Partial>> {
        if let Some(p) = impulse(term, ctx) {
            return Ok(Some(p));
        }
        if let Some(p) = step(term, ctx)? {
            return Ok(Some(p));
        }
        Ok(geometric(term, ctx))
    }
}

/// `x(n - k) -> z^(-k) X(z)` and `x(n + k) -> z^k X(z) - Σ x(i) z^(k - i)`.
fn signal(term: &Expr, ctx: &Context<'_>) -> Option<Partial> {
    let (name, arg) = as_signal(term)?;
    let (a, b) = linear_in(arg, ctx.var)?;
    if !a.is_one() {
        return None;
    }
    let z = ctx.y();
    let image = Expr::undefined(&swap_case(name), [z.clone()]);

    if let Some(k) = b.as_i64().filter(|&k| k > 0) {
        let mut terms = vec![z.powi(k) * image];
        for i in 0..k {
            let initial = Expr::undefined(name, [Expr::int(i)]);
            terms.push(-(initial * z.powi(k - i)));
        }
        return Some(Partial::direct(Expr::add_all(terms)));
    }
    let delay = -b;
    if !at_or_after(&delay, &Expr::zero(), NAME) {
        return None;
    }
    Some(Partial::direct(z.pow(&-delay) * image))
}

/// `n^k λ^n x(n) -> (-z d/dz)^k X(z/λ)`.
fn modulated(term: &Expr, ctx: &Context<'_>) -> TransformResult<Option<Partial>> {
    let n = ctx.x();
    let mut signal: Option<Expr> = None;
    let mut constant: Vec<Expr> = Vec::new();
    let mut ratio: Vec<Expr> = Vec::new();
    let mut power = 0u32;

    for f in term.factors() {
        if !f.has_symbol(ctx.var) {
            constant.push(f);
            continue;
        }
        if matches!(f.node(), ExprNode::Undefined { .. }) {
            if signal.is_some() {
                return Ok(None);
            }
            signal = Some(f);
            continue;
        }
        if f.func_arg(Func::UnitStep) == Some(&n) {
            continue;
        }
        if let Some(arg) = f.func_arg(Func::Exp) {
            let Some((a, b)) = linear_in(arg, ctx.var) else {
                return Ok(None);
            };
            ratio.push(a.exp());
            constant.push(b.exp());
            continue;
        }
        let (base, exp) = f.as_base_exp();
        if base == n {
            match exp.as_i64().and_then(|k| u32::try_from(k).ok()) {
                Some(k) => power += k,
                None => return Ok(None),
            }
            continue;
        }
        let Some((a, b)) = linear_in(&exp, ctx.var).filter(|_| !base.has_symbol(ctx.var)) else {
            return Ok(None);
        };
        ratio.push(base.pow(&a));
        constant.push(base.pow(&b));
    }
    let Some(signal) = signal else {
        return Ok(None);
    };

    let z = ctx.conjvar;
    let image = ctx.recurse(TransformKind::ZTransform, &signal)?;
    let lambda = Expr::mul_all(ratio);
    let scaled = image.subs_symbol(z, &(ctx.y() / lambda));
    let out = ramp_diff(&scaled, z, power);
    Ok(Some(Partial::direct(Expr::mul_all(constant) * out)))
}

/// `UnitImpulse(n - k) g(n) -> g(k) z^(-k)`, zero for `k < 0`.
fn impulse(term: &Expr, ctx: &Context<'_>) -> Option<Partial> {
    let (at, rest) = impulse_factor(term, ctx.var)?;
    if !at_or_after(&at, &Expr::zero(), NAME) {
        return Some(Partial::zero());
    }
    let weight = rest.subs_symbol(ctx.var, &at);
    Some(Partial::direct(weight * ctx.y().pow(&-at)))
}

/// `UnitStep(n - k) g(n) -> z^(-k) Z{g(n + k)}` for `k > 0`, and a finite
/// sum for a step that switches off.
fn step(term: &Expr, ctx: &Context<'_>) -> TransformResult<Option<Partial>> {
    let Some((slope, edge, rest)) = edge_factor(term, Func::UnitStep, ctx.var) else {
        return Ok(None);
    };
    let z = ctx.y();
    match slope.as_i64() {
        Some(1) => {
            if edge.is_zero() || nonnegative(&edge) == Some(false) {
                let whole = ctx.recurse(TransformKind::ZTransform, &rest)?;
                return Ok(Some(Partial::direct(whole)));
            }
            warn_if_unordered(&edge, &Expr::zero(), NAME);
            let advanced = rest.subs_symbol(ctx.var, &(ctx.x() + &edge));
            let tail = ctx.recurse(TransformKind::ZTransform, &advanced)?;
            Ok(Some(Partial::direct(z.pow(&-edge) * tail)))
        }
        Some(-1) => {
            // on for n <= edge
            let Some(last) = edge.as_i64() else {
                return Ok(None);
            };
            let sum = Expr::add_all(
                (0..=last).map(|m| rest.subs_symbol(ctx.var, &Expr::int(m)) * z.powi(-m)),
            );
            Ok(Some(Partial::direct(sum)))
        }
        _ => Ok(None),
    }
}

/// `c n^m λ^n -> c (-z d/dz)^m [z/(z - λ)]`, summed and simplified.
fn geometric(term: &Expr, ctx: &Context<'_>) -> Option<Partial> {
    let terms = exp_poly_terms(term, ctx.var, true)?;
    let z = ctx.y();
    let sum = Expr::add_all(terms.into_iter().map(|ExpTerm { coeff, power, rate }| {
        coeff * ramp_diff(&(&z / (&z - rate)), ctx.conjvar, power)
    }));
    Some(Partial::direct(simplify_in(&sum, ctx.conjvar)))
}

#[cfg(test)]
mod tests {
    use syntra_core::{Bindings, Symbol};

    use crate::engine::TransformEngine;
    use crate::error::TransformError;
    use crate::options::TransformOptions;

    use super::*;

    fn n() -> Symbol {
        Symbol::integer("n")
    }

    fn z() -> Symbol {
        Symbol::new("z")
    }

    fn ztrans(e: &Expr) -> TransformResult<Expr> {
        TransformEngine::new().ztransform(e, &n(), &z(), &TransformOptions::default())
    }

    fn assert_close(a: &Expr, b: &Expr) {
        for at in [1.7, 2.5, 4.0] {
            let env = Bindings::new().with("z", at);
            let (va, vb) = (a.eval_complex(&env).unwrap(), b.eval_complex(&env).unwrap());
            assert!((va - vb).norm() < 1e-9, "{a} != {b} at z = {at}");
        }
    }

    #[test]
    fn test_impulse_and_step() {
        let nv = Expr::symbol(&n());
        let zv = Expr::symbol(&z());
        assert_eq!(ztrans(&(&nv - 2).unit_impulse()).unwrap(), zv.powi(-2));
        assert_eq!(ztrans(&(&nv + 2).unit_impulse()).unwrap(), Expr::zero());
        assert_close(&ztrans(&nv.unit_step()).unwrap(), &(&zv / (&zv - 1)));
        assert_close(
            &ztrans(&(&nv - 2).unit_step()).unwrap(),
            &(zv.powi(-1) / (&zv - 1)),
        );
    }

    #[test]
    fn test_step_with_symbolic_edge() {
        let nv = Expr::symbol(&n());
        let zv = Expr::symbol(&z());
        let k = Expr::symbol(&Symbol::integer("k"));
        let out = ztrans(&(&nv - &k).unit_step()).unwrap();
        let expected = zv.pow(&-&k) * &zv / (&zv - 1);
        let env = Bindings::new().with("z", 2.5).with("k", 2.0);
        let (va, vb) = (out.eval_complex(&env).unwrap(), expected.eval_complex(&env).unwrap());
        assert!((va - vb).norm() < 1e-9);
    }

    #[test]
    fn test_geometric_and_ramp() {
        let nv = Expr::symbol(&n());
        let zv = Expr::symbol(&z());
        let half = Expr::rational(1, 2);
        assert_close(&ztrans(&half.pow(&nv)).unwrap(), &(&zv / (&zv - &half)));
        assert_close(&ztrans(&nv).unwrap(), &(&zv / (&zv - 1).powi(2)));
        assert_close(&ztrans(&Expr::int(3)).unwrap(), &(3 * &zv / (&zv - 1)));
    }

    #[test]
    fn test_cosine_is_real() {
        let nv = Expr::symbol(&n());
        let zv = Expr::symbol(&z());
        let w = Expr::rational(1, 3);
        let out = ztrans(&(&w * &nv).cos()).unwrap();
        // z (z - cos w) / (z^2 - 2 z cos w + 1)
        let expected = &zv * (&zv - w.cos()) / (zv.powi(2) - 2 * &zv * w.cos() + 1);
        assert_close(&out, &expected);
    }

    #[test]
    fn test_shifted_signals() {
        let nv = Expr::symbol(&n());
        let zv = Expr::symbol(&z());
        let x = |arg: Expr| Expr::undefined("x", [arg]);
        let big_x = Expr::undefined("X", [zv.clone()]);
        assert_eq!(ztrans(&x(nv.clone())).unwrap(), big_x);
        assert_eq!(ztrans(&x(&nv - 1)).unwrap(), zv.powi(-1) * &big_x);
        assert_eq!(
            ztrans(&x(&nv + 1)).unwrap(),
            &zv * &big_x - x(Expr::zero()) * &zv
        );
    }

    #[test]
    fn test_modulated_signal() {
        let nv = Expr::symbol(&n());
        let zv = Expr::symbol(&z());
        let x = Expr::undefined("x", [nv.clone()]);
        let out = ztrans(&(Expr::int(2).pow(&nv) * x)).unwrap();
        assert_eq!(out, Expr::undefined("X", [&zv / 2]));
    }

    #[test]
    fn test_anticausal_rejected() {
        let nv = Expr::symbol(&n());
        assert!(matches!(
            ztrans(&(-&nv - 1).unit_step()),
            Err(TransformError::Domain(_))
        ));
        let opts = TransformOptions::default().with_causal(true);
        let out = TransformEngine::new()
            .ztransform(&(-&nv + 1).unit_step(), &n(), &z(), &opts)
            .unwrap();
        let zv = Expr::symbol(&z());
        assert_eq!(out, 1 + zv.powi(-1));
    }
}
