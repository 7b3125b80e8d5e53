//! Helpers shared by the transform rules.

use syntra_core::{Bindings, Expr, ExprNode, Func, Number, Symbol};
use syntra_poly::Poly;
use syntra_ratfun::simplify::{cdiv, tidy};
use syntra_ratfun::RationalFunction;

/// `(a, b)` with `arg = a*var + b`, where `a` is non-zero and neither
/// depends on `var`.
#[must_use]
pub fn linear_in(arg: &Expr, var: &Symbol) -> Option<(Expr, Expr)> {
    let p = Poly::from_expr(arg, var).ok()?;
    (p.degree() == 1).then(|| (p.coeff(1), p.coeff(0)))
}

/// `Some(true)` if `e` is certainly `>= 0`, `Some(false)` if certainly
/// `< 0`, `None` when the sign cannot be decided.
#[must_use]
pub fn nonnegative(e: &Expr) -> Option<bool> {
    if e.free_symbols().is_empty() && !e.has_unevaluated() {
        return e.eval_f64(&Bindings::new()).ok().map(|v| v >= 0.0);
    }
    match e.node() {
        ExprNode::Symbol(s) => s.assumptions().is_nonnegative().then_some(true),
        ExprNode::Mul(items) => {
            let (c, _) = e.split_coeff();
            let rest: Vec<&Expr> = items.iter().filter(|f| !f.is_number()).collect();
            if !rest.iter().all(|f| nonnegative(f) == Some(true)) {
                return None;
            }
            if !c.is_negative() {
                Some(true)
            } else if rest.iter().all(|f| positive(f)) {
                Some(false)
            } else {
                None
            }
        }
        ExprNode::Add(terms) => {
            let signs = terms.iter().map(nonnegative).collect::<Option<Vec<_>>>()?;
            if signs.iter().all(|&s| s) {
                Some(true)
            } else if signs.iter().all(|&s| !s) {
                Some(false)
            } else {
                None
            }
        }
        ExprNode::Pow { base, .. } => (nonnegative(base) == Some(true)).then_some(true),
        ExprNode::Func { func, args } => match func {
            Func::Abs | Func::Heaviside | Func::UnitStep | Func::Rect | Func::Tri => Some(true),
            Func::Exp => args[0].is_real().then_some(true),
            _ => None,
        },
        _ => None,
    }
}

/// Returns true if `e` is certainly `> 0`.
#[must_use]
pub fn positive(e: &Expr) -> bool {
    if e.free_symbols().is_empty() && !e.has_unevaluated() {
        return e.eval_f64(&Bindings::new()).is_ok_and(|v| v > 0.0);
    }
    match e.node() {
        ExprNode::Symbol(s) => s.assumptions().positive,
        ExprNode::Mul(items) | ExprNode::Add(items) => items.iter().all(positive),
        ExprNode::Pow { base, .. } => positive(base),
        ExprNode::Func {
            func: Func::Exp,
            args,
        } => args[0].is_real(),
        _ => false,
    }
}

/// `-1`, `0` or `1` for the sign of a real `e`, `None` if undecidable.
#[must_use]
pub fn sign_of(e: &Expr) -> Option<i8> {
    let e = tidy(e);
    if e.is_zero() {
        return Some(0);
    }
    Some(if nonnegative(&e)? { 1 } else { -1 })
}

/// `|a|`, without an `abs` when the sign of `a` is known.
#[must_use]
pub fn magnitude(a: &Expr) -> Expr {
    match nonnegative(a) {
        Some(true) => a.clone(),
        Some(false) => -a,
        None => a.abs(),
    }
}

/// `j 2π`.
#[must_use]
pub fn j2pi() -> Expr {
    Expr::mul_all([Expr::int(2), Expr::pi(), Expr::j()])
}

/// `α/(j 2π)`, the frequency in cycles of the growth `exp(α t)`.
#[must_use]
pub fn cycles(alpha: &Expr) -> Expr {
    cdiv(alpha, &j2pi())
}

/// Decides whether the point `at` lies at or after `origin`.
///
/// When the comparison is symbolic and cannot be settled the point is
/// assumed to lie inside and a warning is logged.
#[must_use]
pub fn at_or_after(at: &Expr, origin: &Expr, what: &str) -> bool {
    ordering(at, origin, what).unwrap_or(true)
}

/// Logs a warning if `at` cannot be ordered against `origin`.
///
/// For rules that go on to assume `at >= origin` either way.
pub fn warn_if_unordered(at: &Expr, origin: &Expr, what: &str) {
    ordering(at, origin, what);
}

fn ordering(at: &Expr, origin: &Expr, what: &str) -> Option<bool> {
    let order = nonnegative(&(at - origin).expand());
    if order.is_none() {
        log::warn!("cannot order {at} against {origin} for {what}; assuming {at} >= {origin}");
    }
    order
}

/// Splits off the first factor satisfying `pred`.
#[must_use]
pub fn take_factor<P: Fn(&Expr) -> bool>(term: &Expr, pred: P) -> Option<(Expr, Expr)> {
    let factors = term.factors();
    let i = factors.iter().position(|f| pred(f))?;
    let rest = Expr::mul_all(
        factors
            .iter()
            .enumerate()
            .filter(|&(k, _)| k != i)
            .map(|(_, f)| f.clone()),
    );
    Some((factors[i].clone(), rest))
}

/// Splits `expr` into the product of its factors free of `var` and the rest.
#[must_use]
pub fn split_constant(expr: &Expr, var: &Symbol) -> (Expr, Expr) {
    let (constant, dependent): (Vec<Expr>, Vec<Expr>) =
        expr.factors().into_iter().partition(|f| !f.has_symbol(var));
    (Expr::mul_all(constant), Expr::mul_all(dependent))
}

/// `k!` as an exact number.
#[must_use]
pub fn factorial(k: u32) -> Expr {
    Expr::number((1..=i64::from(k)).fold(Number::integer(1), |acc, i| acc * Number::integer(i)))
}

/// The binomial coefficient `C(n, k)` as a polynomial in `n`.
#[must_use]
pub fn binomial(n: &Expr, k: u32) -> Expr {
    let falling = Expr::mul_all((0..i64::from(k)).map(|i| n - i));
    falling / factorial(k)
}

/// `Γ(m/2)` for a positive integer `m`.
#[must_use]
pub fn gamma_half(m: i64) -> Option<Expr> {
    if m <= 0 {
        return None;
    }
    if m % 2 == 0 {
        return Some(factorial(u32::try_from(m / 2 - 1).ok()?));
    }
    // Γ(k + 1/2) = (2k)! / (4^k k!) * sqrt(pi)
    let k = u32::try_from((m - 1) / 2).ok()?;
    let ratio = factorial(2 * k) / (Expr::int(4).powi(i64::from(k)) * factorial(k));
    Some(ratio * Expr::pi().sqrt())
}

/// An unresolved signal of one argument: `(name, argument)`.
#[must_use]
pub fn as_signal(e: &Expr) -> Option<(&str, &Expr)> {
    match e.node() {
        ExprNode::Undefined { name, args } if args.len() == 1 => Some((name, &args[0])),
        _ => None,
    }
}

/// Swaps the case of the first letter: `x` becomes `X` and back.
#[must_use]
pub fn swap_case(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_lowercase() => c.to_uppercase().chain(chars).collect(),
        Some(c) => c.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// A bound variable named `base` (primed as needed) that does not clash
/// with any symbol in `exprs`.
#[must_use]
pub fn fresh_dummy(base: &str, integer: bool, exprs: &[&Expr]) -> Symbol {
    let mut name = base.to_owned();
    loop {
        let clash = exprs
            .iter()
            .any(|e| e.free_symbols().iter().any(|s| s.name() == name));
        if !clash {
            return if integer {
                Symbol::integer(&name)
            } else {
                Symbol::new(&name)
            };
        }
        name.push('\'');
    }
}

/// `∫ f(τ) g(var - τ) dτ` over `[lower, upper]`.
#[must_use]
pub fn convolve_integral(f: &Expr, g: &Expr, var: &Symbol, lower: &Expr, upper: &Expr) -> Expr {
    let tau = fresh_dummy("tau", false, &[f, g]);
    let x = Expr::symbol(var);
    let tau_e = Expr::symbol(&tau);
    let body = f.subs_symbol(var, &tau_e) * g.subs_symbol(var, &(&x - &tau_e));
    Expr::integral(&body, &tau, lower, upper)
}

/// `Σ f[m] g[var - m]` over `[lower, upper]`.
#[must_use]
pub fn convolve_sum(f: &Expr, g: &Expr, var: &Symbol, lower: &Expr, upper: &Expr) -> Expr {
    let m = fresh_dummy("m", true, &[f, g]);
    let x = Expr::symbol(var);
    let m_e = Expr::symbol(&m);
    let body = f.subs_symbol(var, &m_e) * g.subs_symbol(var, &(&x - &m_e));
    Expr::summation(&body, &m, lower, upper)
}

/// `(-1)^k d^k/dvar^k [weight]` at `var = at`, the sifting property of
/// the `k`-th derivative of a delta.
#[must_use]
pub fn sift(weight: &Expr, var: &Symbol, at: &Expr, k: u32) -> Expr {
    let d = weight.diff_n(var, k).subs_symbol(var, at);
    if k % 2 == 0 {
        d
    } else {
        -d
    }
}

/// A delta factor of a term: `rest * δ^(order)(a*var + b)`.
#[derive(Clone, Debug)]
pub struct DeltaFactor {
    /// Derivative order.
    pub order: u32,
    /// Where the delta fires, `-b/a`.
    pub at: Expr,
    /// `1/(|a| a^order)` from the scaling property.
    pub scale: Expr,
    /// Remaining factors.
    pub rest: Expr,
}

/// Splits off a delta of an argument linear in `var`.
#[must_use]
pub fn delta_factor(term: &Expr, var: &Symbol) -> Option<DeltaFactor> {
    let (delta, rest) =
        take_factor(term, |f| matches!(f.as_func(), Some((Func::DiracDelta(_), _))))?;
    let (Func::DiracDelta(order), args) = delta.as_func()? else {
        return None;
    };
    let (a, b) = linear_in(&args[0], var)?;
    Some(DeltaFactor {
        order,
        at: (-b / &a).expand(),
        scale: (a.abs() * a.powi(i64::from(order))).recip(),
        rest,
    })
}

/// Splits off `func(a*var + b)` and returns `(a, edge, rest)` with
/// `edge = -b/a`.
#[must_use]
pub fn edge_factor(term: &Expr, func: Func, var: &Symbol) -> Option<(Expr, Expr, Expr)> {
    let (f, rest) = take_factor(term, |f| f.func_arg(func).is_some())?;
    let (a, b) = linear_in(f.func_arg(func)?, var)?;
    let edge = (-b / &a).expand();
    Some((a, edge, rest))
}

/// Splits off `UnitImpulse(±var + b)` and returns `(at, rest)`, where the
/// impulse fires at `var = at`.
#[must_use]
pub fn impulse_factor(term: &Expr, var: &Symbol) -> Option<(Expr, Expr)> {
    let (a, at, rest) = edge_factor(term, Func::UnitImpulse, var)?;
    a.as_i64().filter(|a| a.abs() == 1)?;
    Some((at, rest))
}

/// `(-x d/dx)^k [e]`, the discrete-time ramp operator.
#[must_use]
pub fn ramp_diff(e: &Expr, var: &Symbol, k: u32) -> Expr {
    let x = Expr::symbol(var);
    (0..k).fold(e.clone(), |acc, _| -(&x * acc.diff(var)))
}

/// Rewrites `sin` and `cos` of `var`-dependent arguments as exponentials.
#[must_use]
pub fn trig_to_exp(e: &Expr, var: &Symbol) -> Expr {
    e.rewrite(&mut |node: &Expr| {
        let (func, args) = node.as_func()?;
        if !matches!(func, Func::Sin | Func::Cos) || !args[0].has_symbol(var) {
            return None;
        }
        let a = trig_to_exp(&args[0], var);
        let plus = (Expr::j() * &a).exp();
        let minus = (-Expr::j() * &a).exp();
        Some(match func {
            Func::Sin => Expr::mul_all([Expr::rational(-1, 2), Expr::j(), plus - minus]),
            _ => Expr::rational(1, 2) * (plus + minus),
        })
    })
}

/// One term `coeff * var^power * growth`, where the growth is `exp(rate*t)`
/// in continuous time and `rate^n` in discrete time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpTerm {
    /// Factor free of the variable.
    pub coeff: Expr,
    /// Power of the variable.
    pub power: u32,
    /// Exponential rate (continuous) or geometric ratio (discrete).
    pub rate: Expr,
}

/// Writes `e` as a sum of [`ExpTerm`]s, after rewriting trigonometric
/// functions as exponentials. `None` if some term has another shape.
#[must_use]
pub fn exp_poly_terms(e: &Expr, var: &Symbol, discrete: bool) -> Option<Vec<ExpTerm>> {
    let expanded = trig_to_exp(e, var).expand();
    expanded
        .terms()
        .iter()
        .filter(|t| !t.is_zero())
        .map(|t| exp_poly_term(t, var, discrete))
        .collect()
}

fn exp_poly_term(term: &Expr, var: &Symbol, discrete: bool) -> Option<ExpTerm> {
    let mut coeff: Vec<Expr> = Vec::new();
    let mut power = 0u32;
    let mut rate: Vec<Expr> = Vec::new();
    for f in term.factors() {
        if !f.has_symbol(var) {
            coeff.push(f);
            continue;
        }
        if let Some(arg) = f.func_arg(Func::Exp) {
            let (a, b) = linear_in(arg, var)?;
            coeff.push(b.exp());
            rate.push(if discrete { a.exp() } else { a });
            continue;
        }
        let (base, exp) = f.as_base_exp();
        if base.as_symbol() == Some(var) {
            power += u32::try_from(exp.as_i64()?).ok()?;
            continue;
        }
        if discrete && !base.has_symbol(var) {
            let (a, b) = linear_in(&exp, var)?;
            coeff.push(base.pow(&b));
            rate.push(base.pow(&a));
            continue;
        }
        return None;
    }
    let rate = if discrete {
        Expr::mul_all(rate)
    } else {
        Expr::add_all(rate).expand()
    };
    Some(ExpTerm {
        coeff: Expr::mul_all(coeff),
        power,
        rate,
    })
}

/// Collapses a rational result to canonical form when possible.
#[must_use]
pub fn simplify_in(e: &Expr, var: &Symbol) -> Expr {
    match RationalFunction::new(e, var) {
        Ok(rf) if !rf.has_undef() => rf.canonical(),
        _ => e.clone(),
    }
}

/// Substitutes `var -> var - shift`.
#[must_use]
pub fn delayed(e: &Expr, var: &Symbol, shift: &Expr) -> Expr {
    if shift.is_zero() {
        return e.clone();
    }
    e.subs_symbol(var, &(Expr::symbol(var) - shift))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t() -> Symbol {
        Symbol::new("t")
    }

    fn x() -> Expr {
        Expr::symbol(&t())
    }

    #[test]
    fn test_linear_in() {
        let (a, b) = linear_in(&(3 * x() - 2), &t()).unwrap();
        assert_eq!(a, Expr::int(3));
        assert_eq!(b, Expr::int(-2));
        assert!(linear_in(&x().powi(2), &t()).is_none());
        assert!(linear_in(&Expr::sym("a"), &t()).is_none());
    }

    #[test]
    fn test_ordering_of_points() {
        let b = Expr::sym("b");
        assert!(at_or_after(&Expr::int(2), &Expr::zero(), "test"));
        assert!(!at_or_after(&Expr::int(-1), &Expr::zero(), "test"));
        assert!(at_or_after(&(&b + 1), &b, "test"));
        // unsettled comparisons are assumed to hold
        assert_eq!(ordering(&b, &Expr::zero(), "test"), None);
        assert!(at_or_after(&b, &Expr::zero(), "test"));
        warn_if_unordered(&b, &Expr::zero(), "test");
    }

    #[test]
    fn test_signs() {
        let a = Expr::symbol(&Symbol::positive("a"));
        let b = Expr::sym("b");
        assert_eq!(nonnegative(&Expr::int(2)), Some(true));
        assert_eq!(nonnegative(&Expr::int(-2)), Some(false));
        assert_eq!(nonnegative(&a), Some(true));
        assert_eq!(nonnegative(&(-2 * &a)), Some(false));
        assert_eq!(nonnegative(&b), None);
        assert_eq!(nonnegative(&(&a + 1)), Some(true));
        assert!(positive(&(Expr::pi() * &a)));
    }

    #[test]
    fn test_cycles_and_sign() {
        assert_eq!(cycles(&(3 * j2pi())), Expr::int(3));
        assert_eq!(cycles(&Expr::zero()), Expr::zero());
        assert_eq!(sign_of(&Expr::int(-4)), Some(-1));
        assert_eq!(sign_of(&Expr::zero()), Some(0));
        assert_eq!(sign_of(&Expr::sym("b")), None);
        assert_eq!(magnitude(&Expr::int(-2)), Expr::int(2));
    }

    #[test]
    fn test_gamma_half() {
        assert_eq!(gamma_half(1), Some(Expr::pi().sqrt()));
        assert_eq!(gamma_half(4), Some(Expr::int(1)));
        assert_eq!(gamma_half(3), Some(Expr::rational(1, 2) * Expr::pi().sqrt()));
        assert_eq!(gamma_half(0), None);
    }

    #[test]
    fn test_swap_case() {
        assert_eq!(swap_case("x"), "X");
        assert_eq!(swap_case("Vin"), "vin");
    }

    #[test]
    fn test_exp_poly_terms_continuous() {
        let e = 3 * x() * (-2 * x()).exp();
        let terms = exp_poly_terms(&e, &t(), false).unwrap();
        assert_eq!(
            terms,
            vec![ExpTerm {
                coeff: Expr::int(3),
                power: 1,
                rate: Expr::int(-2)
            }]
        );
        assert!(exp_poly_terms(&x().recip(), &t(), false).is_none());
    }

    #[test]
    fn test_exp_poly_terms_discrete() {
        let n = Symbol::integer("n");
        let e = Expr::int(2).pow(&(Expr::symbol(&n) + 1));
        let terms = exp_poly_terms(&e, &n, true).unwrap();
        assert_eq!(terms.len(), 1);
        assert_eq!(terms[0].rate, Expr::int(2));
        assert_eq!(terms[0].coeff, Expr::int(2));
    }

    #[test]
    fn test_sift_derivative() {
        // -d/dt [t^2] at 3
        assert_eq!(sift(&x().powi(2), &t(), &Expr::int(3), 1), Expr::int(-6));
    }

    #[test]
    fn test_impulse_factor() {
        let n = Symbol::integer("n");
        let nv = Expr::symbol(&n);
        let term = 3 * (&nv - 2).unit_impulse();
        let (at, rest) = impulse_factor(&term, &n).unwrap();
        assert_eq!(at, Expr::int(2));
        assert_eq!(rest, Expr::int(3));
        assert!(impulse_factor(&(2 * &nv).unit_impulse(), &n).is_none());
    }

    #[test]
    fn test_ramp_diff() {
        // -z d/dz [z/(z - 1)] = z/(z - 1)^2
        let z = Symbol::new("z");
        let zv = Expr::symbol(&z);
        let e = &zv / (&zv - 1);
        let out = ramp_diff(&e, &z, 1);
        let env = Bindings::new().with("z", 3.0);
        let v = out.eval_f64(&env).unwrap();
        assert!((v - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_fresh_dummy_avoids_clash() {
        let tau = Expr::sym("tau");
        assert_eq!(fresh_dummy("tau", false, &[&tau]).name(), "tau'");
        assert_eq!(fresh_dummy("tau", false, &[&x()]).name(), "tau");
    }
}
