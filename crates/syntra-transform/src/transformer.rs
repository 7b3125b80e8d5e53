//! The shared transform driver.
//!
//! Every transform runs the same pipeline:
//!
//! 1. Equations are transformed side by side.
//! 2. The input is checked against the transform's domain.
//! 3. With `evaluate` off, the defining integral or sum is returned.
//! 4. Factors free of the variable are pulled out.
//! 5. The cache is consulted.
//! 6. The whole expression is tried as a rational function, then split
//!    into terms.
//! 7. Each term is classified and offered to the rules in order:
//!    unresolved signals, products with unresolved signals, primitives,
//!    and a last-resort fallback. A term nobody claims is expanded and
//!    retried once before the transform gives up.
//! 8. The partial results are summed, cached, scaled and folded.
//!
//! A [`TransformRules`] implementation supplies the per-transform steps;
//! [`Transformer`] owns the pipeline and the cache.

use std::ops::Add;
use std::sync::Arc;

use syntra_core::{Expr, ExprNode, Func, Symbol};
use syntra_ratfun::{RationalError, RationalFunction};

use crate::cache::{CacheKey, TransformCache};
use crate::engine::{TransformEngine, TransformKind};
use crate::error::{TransformError, TransformResult};
use crate::kind::{has_unresolved_factor, ExprKind};
use crate::options::TransformOptions;
use crate::util::{linear_in, nonnegative, split_constant};

/// A transform result split by whether it still needs the trailing unit
/// step of a unilateral inverse transform.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Partial {
    /// Terms that are complete as they stand.
    pub direct: Expr,
    /// Terms valid for non-negative time only.
    pub stepped: Expr,
}

impl Partial {
    /// The zero result.
    #[must_use]
    pub fn zero() -> Self {
        Self {
            direct: Expr::zero(),
            stepped: Expr::zero(),
        }
    }

    /// A result with no step.
    #[must_use]
    pub fn direct(e: Expr) -> Self {
        Self {
            direct: e,
            stepped: Expr::zero(),
        }
    }

    /// A result valid for non-negative time only.
    #[must_use]
    pub fn stepped(e: Expr) -> Self {
        Self {
            direct: Expr::zero(),
            stepped: e,
        }
    }

    /// Multiplies both parts by `c`.
    #[must_use]
    pub fn scale(&self, c: &Expr) -> Self {
        if c.is_one() {
            return self.clone();
        }
        Self {
            direct: c * &self.direct,
            stepped: c * &self.stepped,
        }
    }

    /// Applies `f` to both parts.
    #[must_use]
    pub fn map<F: Fn(&Expr) -> Expr>(&self, f: F) -> Self {
        Self {
            direct: f(&self.direct),
            stepped: f(&self.stepped),
        }
    }

    /// `direct + stepped`.
    #[must_use]
    pub fn combine(&self) -> Expr {
        &self.direct + &self.stepped
    }

    /// `direct + stepped * step`.
    #[must_use]
    pub fn fold(&self, step: &Expr) -> Expr {
        if self.stepped.is_zero() {
            return self.direct.clone();
        }
        &self.direct + &self.stepped * step
    }
}

impl Add for Partial {
    type Output = Partial;

    fn add(self, rhs: Partial) -> Partial {
        Partial {
            direct: self.direct + rhs.direct,
            stepped: self.stepped + rhs.stepped,
        }
    }
}

/// Everything a rule needs to know about the current call.
pub struct Context<'a> {
    /// Engine for nested transforms.
    pub engine: &'a TransformEngine,
    /// Variable of the input.
    pub var: &'a Symbol,
    /// Variable of the output.
    pub conjvar: &'a Symbol,
    /// Call options.
    pub options: &'a TransformOptions,
}

impl Context<'_> {
    /// The input variable as an expression.
    #[must_use]
    pub fn x(&self) -> Expr {
        Expr::symbol(self.var)
    }

    /// The output variable as an expression.
    #[must_use]
    pub fn y(&self) -> Expr {
        Expr::symbol(self.conjvar)
    }

    /// The shared rational view of `expr` in the input variable, or
    /// `None` if it is not rational.
    ///
    /// # Errors
    ///
    /// Propagates decomposition failures other than "not rational".
    pub fn view(&self, expr: &Expr) -> TransformResult<Option<Arc<RationalFunction>>> {
        self.view_in(expr, self.var)
    }

    /// Like [`Context::view`] for another variable.
    ///
    /// # Errors
    ///
    /// See [`Context::view`].
    pub fn view_in(
        &self,
        expr: &Expr,
        var: &Symbol,
    ) -> TransformResult<Option<Arc<RationalFunction>>> {
        match self.engine.views().get_or_build(expr, var) {
            Ok(rf) => Ok(Some(rf)),
            Err(RationalError::Decomposition { .. }) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Runs a nested transform with the same variables and options.
    ///
    /// # Errors
    ///
    /// Propagates the nested failure.
    pub fn recurse(&self, kind: TransformKind, expr: &Expr) -> TransformResult<Expr> {
        self.engine
            .transform(kind, expr, self.var, self.conjvar, self.options)
    }

    /// Runs a nested transform between other variables.
    ///
    /// # Errors
    ///
    /// Propagates the nested failure.
    pub fn recurse_with(
        &self,
        kind: TransformKind,
        expr: &Expr,
        var: &Symbol,
        conjvar: &Symbol,
    ) -> TransformResult<Expr> {
        self.engine.transform(kind, expr, var, conjvar, self.options)
    }

    /// The error for a term no rule can handle.
    #[must_use]
    pub fn unsupported(&self, name: &'static str, term: &Expr) -> TransformError {
        TransformError::Unsupported {
            transform: name,
            expr: term.to_string(),
        }
    }
}

/// Per-transform rules plugged into [`Transformer`].
///
/// Every rule returns `Ok(None)` when it does not apply, so that the next
/// one can be tried, and `Err` only for failures that should end the
/// whole transform.
pub trait TransformRules: Send + Sync {
    /// Name used in errors and logs.
    fn name(&self) -> &'static str;

    /// Rejects inputs outside the domain of the transform.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::Domain`] for invalid input.
    fn check(&self, expr: &Expr, ctx: &Context<'_>) -> TransformResult<()> {
        check_independent(expr, ctx)
    }

    /// The unevaluated defining integral or sum.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::InvalidOption`] if a required parameter
    /// is missing.
    fn unevaluated(&self, expr: &Expr, ctx: &Context<'_>) -> TransformResult<Expr>;

    /// Unresolved signals and their derivatives.
    ///
    /// # Errors
    ///
    /// Rule specific.
    fn unresolved(&self, _term: &Expr, _ctx: &Context<'_>) -> TransformResult<Option<Partial>> {
        Ok(None)
    }

    /// Products containing unresolved signals.
    ///
    /// # Errors
    ///
    /// Rule specific.
    fn product(&self, _term: &Expr, _ctx: &Context<'_>) -> TransformResult<Option<Partial>> {
        Ok(None)
    }

    /// Rational functions of the variable, including delays.
    ///
    /// # Errors
    ///
    /// Rule specific.
    fn rational(&self, _expr: &Expr, _ctx: &Context<'_>) -> TransformResult<Option<Partial>> {
        Ok(None)
    }

    /// Known primitive signals.
    ///
    /// # Errors
    ///
    /// Rule specific.
    fn primitive(
        &self,
        _term: &Expr,
        _kind: ExprKind,
        _ctx: &Context<'_>,
    ) -> TransformResult<Option<Partial>> {
        Ok(None)
    }

    /// Last resort, such as explicit evaluation.
    ///
    /// # Errors
    ///
    /// Rule specific.
    fn fallback(&self, _term: &Expr, _ctx: &Context<'_>) -> TransformResult<Option<Partial>> {
        Ok(None)
    }

    /// Folds the summed partial result into the final expression.
    ///
    /// # Errors
    ///
    /// Rule specific.
    fn finish(&self, partial: Partial, _ctx: &Context<'_>) -> TransformResult<Expr> {
        Ok(partial.combine())
    }
}

/// A transform: rules plus a result cache.
pub struct Transformer<R> {
    rules: R,
    cache: TransformCache,
}

impl<R: TransformRules> Transformer<R> {
    /// Creates a transformer with an empty cache.
    pub fn new(rules: R) -> Self {
        Self {
            rules,
            cache: TransformCache::new(),
        }
    }

    /// The rules.
    pub fn rules(&self) -> &R {
        &self.rules
    }

    /// Number of cached results.
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Drops cached results.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Transforms `expr` from `var` to `conjvar`.
    ///
    /// # Errors
    ///
    /// See [`TransformError`].
    pub fn transform(
        &self,
        engine: &TransformEngine,
        expr: &Expr,
        var: &Symbol,
        conjvar: &Symbol,
        options: &TransformOptions,
    ) -> TransformResult<Expr> {
        if let ExprNode::Equality { lhs, rhs } = expr.node() {
            let lhs = self.transform(engine, lhs, var, conjvar, options)?;
            let rhs = self.transform(engine, rhs, var, conjvar, options)?;
            return Ok(Expr::equality(&lhs, &rhs));
        }
        if var.name().is_empty() || conjvar.name().is_empty() {
            return Err(TransformError::InvalidOption(
                "transform variables must be named".into(),
            ));
        }

        let ctx = Context {
            engine,
            var,
            conjvar,
            options,
        };
        self.rules.check(expr, &ctx)?;
        if !options.evaluate {
            return self.rules.unevaluated(expr, &ctx);
        }

        log::debug!("{} of {expr} ({var} -> {conjvar})", self.rules.name());
        let (constant, rest) = split_constant(expr, var);
        let partial = self.cached(&rest, &ctx)?;
        self.rules.finish(partial.scale(&constant), &ctx)
    }

    fn cached(&self, expr: &Expr, ctx: &Context<'_>) -> TransformResult<Partial> {
        let key = CacheKey::new(expr, ctx.var, ctx.conjvar, ctx.options);
        if let Some(hit) = self.cache.get(&key) {
            log::trace!("{}: cache hit for {expr}", self.rules.name());
            return Ok(hit);
        }
        let partial = self.linear(expr, ctx)?;
        Ok(self.cache.insert(key, partial))
    }

    fn linear(&self, expr: &Expr, ctx: &Context<'_>) -> TransformResult<Partial> {
        if let Some(p) = self.rules.rational(expr, ctx)? {
            return Ok(p);
        }
        let terms = expr.terms();
        if terms.len() == 1 {
            return self.term(expr, ctx);
        }
        terms
            .iter()
            .try_fold(Partial::zero(), |acc, t| Ok(acc + self.cached(t, ctx)?))
    }

    fn term(&self, term: &Expr, ctx: &Context<'_>) -> TransformResult<Partial> {
        let (constant, rest) = split_constant(term, ctx.var);
        if !constant.is_one() {
            return Ok(self.cached(&rest, ctx)?.scale(&constant));
        }

        let kind = ExprKind::of(term, ctx.var);
        if let Some(p) = self.dispatch(term, kind, ctx)? {
            return Ok(p);
        }

        let expanded = term.expand();
        if expanded != *term {
            log::trace!("{}: retrying {term} expanded", self.rules.name());
            return self.linear(&expanded, ctx);
        }
        Err(TransformError::Unsupported {
            transform: self.rules.name(),
            expr: term.to_string(),
        })
    }

    fn dispatch(
        &self,
        term: &Expr,
        kind: ExprKind,
        ctx: &Context<'_>,
    ) -> TransformResult<Option<Partial>> {
        let rules = &self.rules;
        if kind == ExprKind::Unresolved {
            if let Some(p) = rules.unresolved(term, ctx)? {
                return Ok(Some(p));
            }
        }
        if matches!(kind, ExprKind::Product | ExprKind::Power) && has_unresolved_factor(term) {
            if let Some(p) = rules.product(term, ctx)? {
                return Ok(Some(p));
            }
        }
        if let Some(p) = rules.primitive(term, kind, ctx)? {
            return Ok(Some(p));
        }
        rules.fallback(term, ctx)
    }
}

/// Rejects inputs that already depend on the output variable.
///
/// # Errors
///
/// Returns [`TransformError::Domain`].
pub fn check_independent(expr: &Expr, ctx: &Context<'_>) -> TransformResult<()> {
    if ctx.var != ctx.conjvar && expr.has_symbol(ctx.conjvar) {
        return Err(TransformError::Domain(format!(
            "{expr} depends on {}",
            ctx.conjvar
        )));
    }
    Ok(())
}

/// Rejects terms of a one-sided transform that live entirely before the
/// origin, unless `causal` is set.
///
/// # Errors
///
/// Returns [`TransformError::Domain`].
pub fn check_one_sided(expr: &Expr, step: Func, ctx: &Context<'_>) -> TransformResult<()> {
    if ctx.options.causal {
        return Ok(());
    }
    for term in expr.terms() {
        for factor in term.factors() {
            let Some((a, b)) = factor.func_arg(step).and_then(|arg| linear_in(arg, ctx.var))
            else {
                continue;
            };
            // step(a*x + b) with a < 0 is on for x <= -b/a
            if nonnegative(&a) == Some(false) && nonnegative(&(-b / a).expand()) == Some(false) {
                return Err(TransformError::Domain(format!(
                    "{term} vanishes for {} >= 0; set causal to transform it anyway",
                    ctx.var
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_fold() {
        let t = Expr::sym("t");
        let p = Partial::direct(Expr::int(1)) + Partial::stepped(t.clone());
        assert_eq!(p.combine(), &t + 1);
        assert_eq!(p.fold(&t.heaviside()), &t * t.heaviside() + 1);
        assert_eq!(Partial::direct(t.clone()).fold(&t.heaviside()), t);
        assert_eq!(p.scale(&Expr::int(2)).stepped, 2 * t);
    }
}
