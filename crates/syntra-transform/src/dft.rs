//! Discrete Fourier transform of length `N` and its inverse.
//!
//! ```text
//! X[k] = Σ x[n] exp(-j2π nk/N)          n = 0 .. N-1
//! x[n] = (1/N) Σ X[k] exp(+j2π nk/N)    k = 0 .. N-1
//! ```
//!
//! Both directions share one rule set parameterised by the sign of the
//! exponent and the `1/N` scale.

use syntra_core::{Expr, Func};
use syntra_ratfun::simplify::tidy;

use crate::error::{TransformError, TransformResult};
use crate::kind::ExprKind;
use crate::transformer::{check_independent, Context, Partial, TransformRules};
use crate::util::{
    as_signal, at_or_after, cycles, exp_poly_terms, impulse_factor, j2pi, linear_in, swap_case,
    ExpTerm,
};

/// Largest concrete length expanded into an explicit sum.
const MAX_EXPLICIT_LENGTH: i64 = 1024;

/// DFT (`n -> k`) or IDFT (`k -> n`).
#[derive(Clone, Copy, Debug)]
pub struct Dft {
    inverse: bool,
}

impl Dft {
    /// The forward transform.
    #[must_use]
    pub fn forward() -> Self {
        Self { inverse: false }
    }

    /// The inverse transform.
    #[must_use]
    pub fn inverse() -> Self {
        Self { inverse: true }
    }

    /// Sign of the kernel exponent.
    fn sigma(self) -> i64 {
        if self.inverse {
            1
        } else {
            -1
        }
    }

    fn length(ctx: &Context<'_>) -> TransformResult<Expr> {
        ctx.options
            .dft_length
            .clone()
            .ok_or_else(|| TransformError::InvalidOption("dft_length is required".into()))
    }

    fn scale(self, n: &Expr) -> Expr {
        if self.inverse {
            n.recip()
        } else {
            Expr::one()
        }
    }

    /// `exp(σ j2π m y/N)`.
    fn kernel(self, m: &Expr, n: &Expr, ctx: &Context<'_>) -> Expr {
        Expr::mul_all([Expr::int(self.sigma()), j2pi(), m.clone(), ctx.y(), n.recip()]).exp()
    }
}

impl TransformRules for Dft {
    fn name(&self) -> &'static str {
        if self.inverse {
            "idft"
        } else {
            "dft"
        }
    }

    fn check(&self, expr: &Expr, ctx: &Context<'_>) -> TransformResult<()> {
        check_independent(expr, ctx)?;
        let n = Self::length(ctx)?;
        if n.as_i64().is_some_and(|n| n <= 0) {
            return Err(TransformError::InvalidOption(format!(
                "dft_length must be positive, got {n}"
            )));
        }
        Ok(())
    }

    fn unevaluated(&self, expr: &Expr, ctx: &Context<'_>) -> TransformResult<Expr> {
        let n = Self::length(ctx)?;
        let body = expr * self.kernel(&ctx.x(), &n, ctx);
        let sum = Expr::summation(&body, ctx.var, &Expr::zero(), &(&n - 1));
        Ok(self.scale(&n) * sum)
    }

    fn unresolved(&self, term: &Expr, ctx: &Context<'_>) -> TransformResult<Option<Partial>> {
        // circular shift: x(n - m) -> exp(σ j2π m k/N) X(k)
        let Some((name, arg)) = as_signal(term) else {
            return Ok(None);
        };
        let Some((a, b)) = linear_in(arg, ctx.var) else {
            return Ok(None);
        };
        if !a.is_one() {
            return Ok(None);
        }
        let n = Self::length(ctx)?;
        let image = Expr::undefined(&swap_case(name), [ctx.y()]);
        Ok(Some(Partial::direct(self.kernel(&-b, &n, ctx) * image)))
    }

    fn product(&self, term: &Expr, ctx: &Context<'_>) -> TransformResult<Option<Partial>> {
        // modulation: x(n) exp(-σ j2π m n/N) -> X(k - m)
        let mut signal: Option<Expr> = None;
        let mut constant: Vec<Expr> = Vec::new();
        let mut rate: Vec<Expr> = Vec::new();
        for f in term.factors() {
            if !f.has_symbol(ctx.var) {
                constant.push(f);
            } else if as_signal(&f).is_some() && signal.is_none() {
                signal = Some(f);
            } else if let Some((a, b)) =
                f.func_arg(Func::Exp).and_then(|e| linear_in(e, ctx.var))
            {
                rate.push(a);
                constant.push(b.exp());
            } else {
                return Ok(None);
            }
        }
        let Some(signal) = signal else {
            return Ok(None);
        };
        let Some(Partial { direct: image, .. }) = self.unresolved(&signal, ctx)? else {
            return Ok(None);
        };
        let n = Self::length(ctx)?;
        let m = tidy(&(Expr::int(-self.sigma()) * &n * cycles(&Expr::add_all(rate))));
        let shifted = image.subs_symbol(ctx.conjvar, &(ctx.y() - m));
        Ok(Some(Partial::direct(Expr::mul_all(constant) * shifted)))
    }

    fn primitive(
        &self,
        term: &Expr,
        _kind: ExprKind,
        ctx: &Context<'_>,
    ) -> TransformResult<Option<Partial>> {
        let n = Self::length(ctx)?;
        if let Some((at, rest)) = impulse_factor(term, ctx.var) {
            let name = self.name();
            let inside =
                at_or_after(&at, &Expr::zero(), name) && at_or_after(&(&n - 1), &at, name);
            if !inside {
                return Ok(Some(Partial::zero()));
            }
            let weight = rest.subs_symbol(ctx.var, &at);
            let out = Expr::mul_all([self.scale(&n), weight, self.kernel(&at, &n, ctx)]);
            return Ok(Some(Partial::direct(out)));
        }
        Ok(self.tones(term, &n, ctx).map(Partial::direct))
    }

    fn fallback(&self, term: &Expr, ctx: &Context<'_>) -> TransformResult<Option<Partial>> {
        let n = Self::length(ctx)?;
        let Some(len) = n.as_i64().filter(|&len| len <= MAX_EXPLICIT_LENGTH) else {
            return Ok(None);
        };
        log::debug!("{}: summing {term} explicitly over {len} points", self.name());
        let sum = Expr::add_all((0..len).map(|i| {
            let m = Expr::int(i);
            term.subs_symbol(ctx.var, &m) * self.kernel(&m, &n, ctx)
        }));
        Ok(Some(Partial::direct(self.scale(&n) * sum)))
    }
}

impl Dft {
    /// Complex exponentials and geometric sequences.
    ///
    /// A tone completing `m` cycles over the window lands on a single bin;
    /// any other ratio `λ` sums to `(1 - λ^N)/(1 - λ exp(σ j2π k/N))`.
    fn tones(self, term: &Expr, n: &Expr, ctx: &Context<'_>) -> Option<Expr> {
        let terms = exp_poly_terms(term, ctx.var, true)?;
        let y = ctx.y();
        let mut out = Vec::with_capacity(terms.len());
        for ExpTerm { coeff, power, rate } in terms {
            if power > 0 {
                return None;
            }
            let m = exponent_of(&rate).map(|alpha| tidy(&(cycles(&alpha) * n)));
            if let Some(m) = m.filter(|m| !m.has(&Expr::j())) {
                // the bin the tone lands on, folded into 0 .. N-1
                let target = tidy(&(Expr::int(-self.sigma()) * m));
                let target = match (target.as_i64(), n.as_i64()) {
                    (Some(t), Some(len)) => Expr::int(t.rem_euclid(len)),
                    _ => target,
                };
                let bin = (&y - target).unit_impulse();
                out.push(Expr::mul_all([self.scale(n), n.clone(), coeff, bin]));
            } else {
                let rotated = &rate * self.kernel(&Expr::one(), n, ctx);
                let sum = (1 - rate.pow(n)) / (1 - rotated);
                out.push(Expr::mul_all([self.scale(n), coeff, sum]));
            }
        }
        Some(Expr::add_all(out))
    }
}

/// `α` with `rate = exp(α)`, when `α` can be read off: an explicit
/// exponential, or a point on the unit circle.
fn exponent_of(rate: &Expr) -> Option<Expr> {
    if let Some(alpha) = rate.func_arg(Func::Exp) {
        return Some(alpha.clone());
    }
    if rate.is_one() {
        return Some(Expr::zero());
    }
    tidy(&rate.modulus())
        .is_one()
        .then(|| Expr::j() * rate.arg())
}

#[cfg(test)]
mod tests {
    use syntra_core::{Bindings, Symbol};

    use crate::engine::TransformEngine;
    use crate::options::TransformOptions;

    use super::*;

    fn n() -> Symbol {
        Symbol::integer("n")
    }

    fn k() -> Symbol {
        Symbol::integer("k")
    }

    fn opts(len: Expr) -> TransformOptions {
        TransformOptions::default().with_dft_length(len)
    }

    fn assert_bins(a: &Expr, b: &Expr, var: &str, len: i64) {
        for i in 0..len {
            let env = Bindings::new().with(var, i as f64);
            let (va, vb) = (a.eval_complex(&env).unwrap(), b.eval_complex(&env).unwrap());
            assert!((va - vb).norm() < 1e-9, "{a} != {b} at {var} = {i}");
        }
    }

    #[test]
    fn test_impulse_and_constant() {
        let engine = TransformEngine::new();
        let nv = Expr::symbol(&n());
        let kv = Expr::symbol(&k());
        let big_n = Expr::symbol(&Symbol::positive("N"));
        let o = opts(big_n.clone());
        assert_eq!(
            engine.dft(&nv.unit_impulse(), &n(), &k(), &o).unwrap(),
            Expr::one()
        );
        assert_eq!(
            engine.dft(&Expr::one(), &n(), &k(), &o).unwrap(),
            &big_n * kv.unit_impulse()
        );
        let outside = (&nv + 1).unit_impulse();
        assert_eq!(engine.dft(&outside, &n(), &k(), &o).unwrap(), Expr::zero());
    }

    #[test]
    fn test_tone_lands_on_bin() {
        let engine = TransformEngine::new();
        let nv = Expr::symbol(&n());
        let kv = Expr::symbol(&k());
        let o = opts(Expr::int(8));
        let tone = (j2pi() * 2 * &nv / 8).exp();
        let out = engine.dft(&tone, &n(), &k(), &o).unwrap();
        assert_eq!(out, 8 * (&kv - 2).unit_impulse());

        let negative = (-j2pi() * &nv / 8).exp();
        let out = engine.dft(&negative, &n(), &k(), &o).unwrap();
        assert_eq!(out, 8 * (&kv - 7).unit_impulse());
    }

    #[test]
    fn test_inverse_of_bin() {
        let engine = TransformEngine::new();
        let nv = Expr::symbol(&n());
        let kv = Expr::symbol(&k());
        let o = opts(Expr::int(8));
        let out = engine
            .idft(&(8 * (&kv - 2).unit_impulse()), &k(), &n(), &o)
            .unwrap();
        assert_bins(&out, &(j2pi() * 2 * &nv / 8).exp(), "n", 8);
    }

    #[test]
    fn test_geometric_matches_explicit_sum() {
        let engine = TransformEngine::new();
        let nv = Expr::symbol(&n());
        let kv = Expr::symbol(&k());
        let half = Expr::rational(1, 2);
        let o = opts(Expr::int(4));
        let out = engine.dft(&half.pow(&nv), &n(), &k(), &o).unwrap();
        let explicit = Expr::add_all(
            (0..4).map(|m| half.powi(m) * (-j2pi() * m * &kv / 4).exp()),
        );
        assert_bins(&out, &explicit, "k", 4);
    }

    #[test]
    fn test_explicit_fallback() {
        let engine = TransformEngine::new();
        let nv = Expr::symbol(&n());
        let kv = Expr::symbol(&k());
        let o = opts(Expr::int(4));
        let out = engine.dft(&(&nv - 2).unit_step(), &n(), &k(), &o).unwrap();
        let expected = (-j2pi() * 2 * &kv / 4).exp() + (-j2pi() * 3 * &kv / 4).exp();
        assert_bins(&out, &expected, "k", 4);
    }

    #[test]
    fn test_circular_shift() {
        let engine = TransformEngine::new();
        let nv = Expr::symbol(&n());
        let kv = Expr::symbol(&k());
        let big_n = Expr::symbol(&Symbol::positive("N"));
        let o = opts(big_n.clone());
        let x = Expr::undefined("x", [&nv - 1]);
        let out = engine.dft(&x, &n(), &k(), &o).unwrap();
        let expected = (-j2pi() * &kv / &big_n).exp() * Expr::undefined("X", [kv.clone()]);
        assert_eq!(out, expected);
    }

    #[test]
    fn test_length_required() {
        let engine = TransformEngine::new();
        let out = engine.dft(&Expr::one(), &n(), &k(), &TransformOptions::default());
        assert!(matches!(out, Err(TransformError::InvalidOption(_))));
        let out = engine.dft(&Expr::one(), &n(), &k(), &opts(Expr::int(0)));
        assert!(matches!(out, Err(TransformError::InvalidOption(_))));
    }
}
