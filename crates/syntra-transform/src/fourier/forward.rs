use syntra_core::{Expr, ExprNode, Func};

use crate::engine::TransformKind;
use crate::error::TransformResult;
use crate::kind::ExprKind;
use crate::transformer::{Context, Partial, TransformRules};
use crate::util::{
    as_signal, convolve_integral, cycles, delayed, delta_factor, edge_factor, exp_poly_terms,
    factorial, j2pi, linear_in, magnitude, nonnegative, sift, sign_of, simplify_in, swap_case,
    trig_to_exp, ExpTerm,
};

const NAME: &str = "fourier";

/// Bilateral Fourier transform, `t -> f`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Fourier;

impl TransformRules for Fourier {
    fn name(&self) -> &'static str {
        NAME
    }

    fn unevaluated(&self, expr: &Expr, ctx: &Context<'_>) -> TransformResult<Expr> {
        let kernel = (-j2pi() * ctx.y() * ctx.x()).exp();
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
                // d^k x/dt^k -> (j2πf)^k X(f)
                let inner = ctx.recurse(TransformKind::Fourier, expr)?;
                let gain = (j2pi() * ctx.y()).powi(i64::from(*order));
                Ok(Some(Partial::direct(gain * inner)))
            }
            _ => Ok(None),
        }
    }

    fn product(&self, term: &Expr, ctx: &Context<'_>) -> TransformResult<Option<Partial>> {
        let rewritten = trig_to_exp(term, ctx.var).expand();
        if rewritten != *term {
            let out = ctx.recurse(TransformKind::Fourier, &rewritten)?;
            return Ok(Some(Partial::direct(out)));
        }
        modulated(term, ctx)
    }

    fn primitive(
        &self,
        term: &Expr,
        _kind: ExprKind,
        ctx: &Context<'_>,
    ) -> TransformResult<Option<Partial>> {
        let rules: [fn(&Expr, &Context<'_>) -> Option<Expr>; 5] =
            [delta, reciprocal, one_sided, standard_pair, tones];
        Ok(rules
            .iter()
            .find_map(|rule| rule(term, ctx))
            .map(Partial::direct))
    }
}

/// `x(a t + b) -> exp(j2πf b/a) X(f/a) / |a|`.
fn signal(term: &Expr, ctx: &Context<'_>) -> Option<Partial> {
    let (name, arg) = as_signal(term)?;
    let (a, b) = linear_in(arg, ctx.var)?;
    let f = ctx.y();
    let image = Expr::undefined(&swap_case(name), [&f / &a]);
    let shift = (j2pi() * &f * b / &a).exp();
    Some(Partial::direct(Expr::mul_all([
        magnitude(&a).recip(),
        shift,
        image,
    ])))
}

/// Products of signals with `t^k exp(α t)`, or of several signals.
///
/// `t^k exp(α t) x(t) -> (j/2π)^k d^k/df^k X(f - α/(j2π))` and
/// `x(t) y(t) -> ∫ X(ν) Y(f - ν) dν`.
fn modulated(term: &Expr, ctx: &Context<'_>) -> TransformResult<Option<Partial>> {
    let mut signals: Vec<Expr> = Vec::new();
    let mut constant: Vec<Expr> = Vec::new();
    let mut rate: Vec<Expr> = Vec::new();
    let mut power = 0u32;

    for f in term.factors() {
        if !f.has_symbol(ctx.var) {
            constant.push(f);
            continue;
        }
        if matches!(
            f.node(),
            ExprNode::Undefined { .. } | ExprNode::Derivative { .. }
        ) {
            signals.push(f);
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
        let (base, exp) = f.as_base_exp();
        match exp.as_i64().and_then(|k| u32::try_from(k).ok()) {
            Some(k) if base == ctx.x() => power += k,
            _ => return Ok(None),
        }
    }

    let fv = ctx.conjvar;
    let mut images = Vec::with_capacity(signals.len());
    for s in &signals {
        images.push(ctx.recurse(TransformKind::Fourier, s)?);
    }
    let Some((first, rest)) = images.split_first() else {
        return Ok(None);
    };
    let infinity = Expr::infinity();
    let spectrum = rest.iter().fold(first.clone(), |acc, x| {
        convolve_integral(&acc, x, fv, &-&infinity, &infinity)
    });

    let shifted = delayed(&spectrum, fv, &cycles(&Expr::add_all(rate)));
    let gain = (Expr::j() / (2 * Expr::pi())).powi(i64::from(power));
    let out = gain * shifted.diff_n(fv, power);
    Ok(Some(Partial::direct(Expr::mul_all(constant) * out)))
}

/// Sifting over the whole line.
fn delta(term: &Expr, ctx: &Context<'_>) -> Option<Expr> {
    let d = delta_factor(term, ctx.var)?;
    let weight = d.rest * (-j2pi() * ctx.y() * ctx.x()).exp();
    Some(d.scale * sift(&weight, ctx.var, &d.at, d.order))
}

/// `1/(t - t0) -> -jπ sign(f) exp(-j2πf t0)`.
fn reciprocal(term: &Expr, ctx: &Context<'_>) -> Option<Expr> {
    let (base, exp) = term.as_base_exp();
    if exp.as_i64() != Some(-1) {
        return None;
    }
    let (a, b) = linear_in(&base, ctx.var)?;
    let f = ctx.y();
    let t0 = -b / &a;
    Some(Expr::mul_all([
        a.recip(),
        -Expr::j(),
        Expr::pi(),
        f.sign(),
        (-j2pi() * &f * t0).exp(),
    ]))
}

/// `H(±(t - t0)) Σ c t^n exp(α t)` for decaying exponentials.
///
/// The right-sided family needs `Re α < 0` and gives
/// `c n!/(j2πf - α)^(n+1)`; the left-sided one needs `Re α > 0` and
/// gives the negative.
fn one_sided(term: &Expr, ctx: &Context<'_>) -> Option<Expr> {
    let (slope, t0, rest) = edge_factor(term, Func::Heaviside, ctx.var)?;
    if !rest.has_symbol(ctx.var) {
        return None;
    }
    let side = sign_of(&slope)?;
    let advanced = rest.subs_symbol(ctx.var, &(ctx.x() + &t0));
    let terms = exp_poly_terms(&advanced, ctx.var, false)?;

    let s = j2pi() * ctx.y();
    let mut out = Vec::with_capacity(terms.len());
    for ExpTerm { coeff, power, rate } in terms {
        // decaying on the side the step keeps
        match (side, nonnegative(&rate.re())) {
            (1, Some(false)) => {}
            (-1, Some(true)) if sign_of(&rate.re()) == Some(1) => {}
            (_, None) => log::warn!("assuming exp({rate} t) decays in {term}"),
            _ => return None,
        }
        let fraction = coeff * factorial(power) / (&s - rate).powi(i64::from(power) + 1);
        out.push(if side < 0 { -fraction } else { fraction });
    }
    let sum = simplify_in(&Expr::add_all(out), ctx.conjvar);
    Some((-&s * t0).exp() * sum)
}

/// Shifted and scaled `H`, `sign`, `rect`, `tri` and `sinc`.
fn standard_pair(term: &Expr, ctx: &Context<'_>) -> Option<Expr> {
    let (func, args) = term.as_func()?;
    let (a, b) = linear_in(&args[0], ctx.var)?;
    let f = ctx.y();
    let nu = &f / &a;
    let two_pi = 2 * Expr::pi();
    let image = match func {
        Func::Heaviside => nu.dirac_delta() / 2 - Expr::j() / (two_pi * &nu),
        Func::Sign => -Expr::j() / (Expr::pi() * &nu),
        Func::Rect => nu.sinc(),
        Func::Tri => nu.sinc().powi(2),
        Func::Sinc => nu.rect(),
        _ => return None,
    };
    let shift = (j2pi() * &f * b / &a).exp();
    Some(Expr::mul_all([magnitude(&a).recip(), shift, image]))
}

/// Everlasting tones: `c t^n exp(j2πf0 t) -> c (j/2π)^n δ^(n)(f - f0)`.
fn tones(term: &Expr, ctx: &Context<'_>) -> Option<Expr> {
    let terms = exp_poly_terms(term, ctx.var, false)?;
    let f = ctx.y();
    let mut out = Vec::with_capacity(terms.len());
    for ExpTerm { coeff, power, rate } in terms {
        if sign_of(&rate.re()) != Some(0) {
            return None;
        }
        let gain = (Expr::j() / (2 * Expr::pi())).powi(i64::from(power));
        out.push(Expr::mul_all([
            coeff,
            gain,
            (&f - cycles(&rate)).dirac_delta_deriv(power),
        ]));
    }
    Some(Expr::add_all(out))
}
