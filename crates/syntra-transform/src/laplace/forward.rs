//! `X(s) = ∫ x(t) exp(-s t) dt` over `[0, ∞)`.

use syntra_core::{Expr, ExprNode, Func};

use crate::engine::TransformKind;
use crate::error::{TransformError, TransformResult};
use crate::kind::ExprKind;
use crate::transformer::{check_independent, check_one_sided, Context, Partial, TransformRules};
use crate::util::{
    as_signal, at_or_after, delayed, delta_factor, edge_factor, exp_poly_terms, factorial,
    gamma_half, linear_in, nonnegative, sift, simplify_in, swap_case, warn_if_unordered, ExpTerm,
};

const NAME: &str = "laplace";

/// Unilateral Laplace transform.
#[derive(Clone, Copy, Debug, Default)]
pub struct Laplace;

impl TransformRules for Laplace {
    fn name(&self) -> &'static str {
        NAME
    }

    fn check(&self, expr: &Expr, ctx: &Context<'_>) -> TransformResult<()> {
        check_independent(expr, ctx)?;
        check_one_sided(expr, Func::Heaviside, ctx)
    }

    fn unevaluated(&self, expr: &Expr, ctx: &Context<'_>) -> TransformResult<Expr> {
        let kernel = (-ctx.y() * ctx.x()).exp();
        Ok(Expr::integral(
            &(expr * kernel),
            ctx.var,
            &Expr::zero(),
            &Expr::infinity(),
        ))
    }

    fn unresolved(&self, term: &Expr, ctx: &Context<'_>) -> TransformResult<Option<Partial>> {
        match term.node() {
            ExprNode::Undefined { .. } => signal(term, ctx),
            ExprNode::Derivative { expr, var, order } if var == ctx.var => {
                Ok(derivative(expr, *order, ctx))
            }
            _ => Ok(None),
        }
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
        if let Some(p) = delta(term, ctx) {
            return Ok(Some(p));
        }
        if let Some(p) = step(term, ctx)? {
            return Ok(Some(p));
        }
        if let Some(p) = fractional_power(term, ctx) {
            return Ok(Some(p));
        }
        Ok(exp_poly(term, ctx))
    }
}

/// `x(a t + b) -> X(s/a) exp(b s/a) / a`, for `a > 0` and a delay `-b/a >= 0`.
fn signal(term: &Expr, ctx: &Context<'_>) -> TransformResult<Option<Partial>> {
    let Some((name, arg)) = as_signal(term) else {
        return Ok(None);
    };
    let Some((a, b)) = linear_in(arg, ctx.var) else {
        return Ok(None);
    };
    match nonnegative(&a) {
        Some(false) => {
            return Err(TransformError::Domain(format!("{term} is time reversed")));
        }
        None => log::warn!("assuming {a} > 0 in {term}"),
        Some(true) => {}
    }
    let delay = (-b / &a).expand();
    if !at_or_after(&delay, &Expr::zero(), NAME) {
        return Err(TransformError::Causality(format!(
            "{term} is advanced by {}",
            -delay
        )));
    }
    let s = ctx.y();
    let image = Expr::undefined(&swap_case(name), [&s / &a]);
    Ok(Some(Partial::direct(Expr::mul_all([
        a.recip(),
        (-delay * s).exp(),
        image,
    ]))))
}

/// `d^k x/dt^k -> s^k X(s) - Σ s^(k-1-i) x^(i)(0)`.
fn derivative(inner: &Expr, order: u32, ctx: &Context<'_>) -> Option<Partial> {
    let (name, arg) = as_signal(inner)?;
    if *arg != ctx.x() {
        return None;
    }
    let s = ctx.y();
    let k = i64::from(order);
    let mut terms = vec![s.powi(k) * Expr::undefined(&swap_case(name), [s.clone()])];
    if !ctx.options.zero_initial_conditions {
        let mut initial = name.to_owned();
        for i in 0..k {
            let value = Expr::undefined(&initial, [Expr::zero()]);
            terms.push(-(s.powi(k - 1 - i) * value));
            initial.push('\'');
        }
    }
    Some(Partial::direct(Expr::add_all(terms)))
}

/// `t^k exp(a t) x(t) -> (-1)^k d^k/ds^k X(s - a)`.
fn modulated(term: &Expr, ctx: &Context<'_>) -> TransformResult<Option<Partial>> {
    let t = ctx.x();
    let mut signal: Option<Expr> = None;
    let mut constant: Vec<Expr> = Vec::new();
    let mut rate: Vec<Expr> = Vec::new();
    let mut power = 0u32;

    for f in term.factors() {
        if !f.has_symbol(ctx.var) {
            constant.push(f);
            continue;
        }
        if matches!(f.node(), ExprNode::Undefined { .. } | ExprNode::Derivative { .. }) {
            if signal.is_some() {
                return Ok(None);
            }
            signal = Some(f);
            continue;
        }
        if let Some(arg) = f.func_arg(Func::Exp) {
            let Some((a, b)) = linear_in(arg, ctx.var) else {
                return Ok(None);
            };
            rate.push(a);
            constant.push(b.exp());
            continue;
        }
        if f.func_arg(Func::Heaviside) == Some(&t) {
            continue;
        }
        let (base, exp) = f.as_base_exp();
        match exp.as_i64().and_then(|k| u32::try_from(k).ok()) {
            Some(k) if base == t => power += k,
            _ => return Ok(None),
        }
    }
    let Some(signal) = signal else {
        return Ok(None);
    };

    let s = ctx.conjvar;
    let image = ctx.recurse(TransformKind::Laplace, &signal)?;
    let mut out = image.diff_n(s, power);
    if power % 2 == 1 {
        out = -out;
    }
    let out = delayed(&out, s, &Expr::add_all(rate).expand());
    Ok(Some(Partial::direct(Expr::mul_all(constant) * out)))
}

/// Sifting, with deltas before the origin contributing nothing.
fn delta(term: &Expr, ctx: &Context<'_>) -> Option<Partial> {
    let d = delta_factor(term, ctx.var)?;
    if !at_or_after(&d.at, &Expr::zero(), NAME) {
        return Some(Partial::zero());
    }
    let weight = d.rest * (-ctx.y() * ctx.x()).exp();
    Some(Partial::direct(d.scale * sift(&weight, ctx.var, &d.at, d.order)))
}

/// `H(t - T) g(t) -> exp(-s T) L{g(t + T)}`, and the mirror image for a
/// step that switches off at `T`.
fn step(term: &Expr, ctx: &Context<'_>) -> TransformResult<Option<Partial>> {
    let Some((slope, edge, rest)) = edge_factor(term, Func::Heaviside, ctx.var) else {
        return Ok(None);
    };
    let s = ctx.y();
    let before_origin = edge.is_zero() || nonnegative(&edge) == Some(false);
    let advanced = rest.subs_symbol(ctx.var, &(ctx.x() + &edge));

    match nonnegative(&slope) {
        Some(true) => {
            if before_origin {
                let whole = ctx.recurse(TransformKind::Laplace, &rest)?;
                return Ok(Some(Partial::direct(whole)));
            }
            warn_if_unordered(&edge, &Expr::zero(), NAME);
            let tail = ctx.recurse(TransformKind::Laplace, &advanced)?;
            Ok(Some(Partial::direct((-&edge * &s).exp() * tail)))
        }
        Some(false) => {
            if before_origin {
                return Ok(Some(Partial::zero()));
            }
            let whole = ctx.recurse(TransformKind::Laplace, &rest)?;
            let tail = ctx.recurse(TransformKind::Laplace, &advanced)?;
            Ok(Some(Partial::direct(whole - (-&edge * &s).exp() * tail)))
        }
        None => Ok(None),
    }
}

/// `t^ν -> Γ(ν + 1)/s^(ν + 1)` for half-integer `ν > -1`.
fn fractional_power(term: &Expr, ctx: &Context<'_>) -> Option<Partial> {
    let (base, exp) = term.as_base_exp();
    if base != ctx.x() {
        return None;
    }
    let (p, q) = exp.as_number()?.to_ratio()?;
    if q != 2 {
        return None;
    }
    let gamma = gamma_half(p + 2)?;
    Some(Partial::direct(gamma / ctx.y().pow(&(exp + 1))))
}

/// `c t^n exp(a t) -> c n!/(s - a)^(n + 1)`, summed and simplified.
fn exp_poly(term: &Expr, ctx: &Context<'_>) -> Option<Partial> {
    let terms = exp_poly_terms(term, ctx.var, false)?;
    let s = ctx.y();
    let sum = Expr::add_all(terms.into_iter().map(|ExpTerm { coeff, power, rate }| {
        coeff * factorial(power) / (&s - rate).powi(i64::from(power) + 1)
    }));
    Some(Partial::direct(simplify_in(&sum, ctx.conjvar)))
}
