//! The rational-function view of an expression.
//!
//! A [`RationalFunction`] splits an expression into
//! `(B/A) * exp(-delay*var) * undef`, with `B` and `A` polynomials in
//! `var`. Roots of `B` and `A` are computed on first use and kept for the
//! life of the view.

use once_cell::sync::OnceCell;
use smallvec::SmallVec;
use syntra_core::{Expr, Func, Symbol};
use syntra_poly::algorithms::gcd::cancel;
use syntra_poly::{find_roots, Damping, Poly, Root, RootSet, RootWarning};

use crate::error::{RationalError, RationalResult};
use crate::pole::Pole;

/// One cached root set per damping hint: none, under, critical, over.
type PoleSlots = [OnceCell<RootSet>; 4];

fn damping_slot(damping: Option<Damping>) -> usize {
    match damping {
        None => 0,
        Some(Damping::Under) => 1,
        Some(Damping::Critical) => 2,
        Some(Damping::Over) => 3,
    }
}

/// An expression viewed as a rational function of one variable.
///
/// # Invariants
///
/// - `expr == (numer/denom) * exp(-delay*var) * undef`
/// - `numer` and `denom` are polynomials in `var`, `denom` is non-zero
/// - `delay` is free of `var`; `undef` is a product of unresolved signals
#[derive(Clone, Debug)]
pub struct RationalFunction {
    expr: Expr,
    var: Symbol,
    numer: Expr,
    denom: Expr,
    delay: Expr,
    undef: Expr,
    bpoly: Poly,
    apoly: Poly,
    zeros: OnceCell<RootSet>,
    poles: PoleSlots,
}

impl RationalFunction {
    /// Decomposes `expr` with respect to `var`.
    ///
    /// # Errors
    ///
    /// Returns [`RationalError::Decomposition`] if what remains after
    /// removing delays and unresolved signals is not rational in `var`,
    /// [`RationalError::ZeroDenominator`] for a vanishing denominator and
    /// [`RationalError::EmptyVariable`] for an unnamed variable.
    pub fn new(expr: &Expr, var: &Symbol) -> RationalResult<Self> {
        if var.name().is_empty() {
            return Err(RationalError::EmptyVariable);
        }
        let not_rational = || RationalError::Decomposition {
            expr: expr.to_string(),
            var: var.to_string(),
        };

        let mut delay: SmallVec<[Expr; 2]> = SmallVec::new();
        let mut undef: SmallVec<[Expr; 2]> = SmallVec::new();
        let mut rational: Vec<Expr> = Vec::new();

        for factor in expr.factors() {
            if let Some(arg) = factor.func_arg(Func::Exp) {
                if arg.has_symbol(var) {
                    let p = Poly::from_expr(arg, var)
                        .ok()
                        .filter(|p| p.degree() <= 1)
                        .ok_or_else(not_rational)?;
                    delay.push(-p.coeff(1));
                    rational.push(p.coeff(0).exp());
                    continue;
                }
            }
            if is_unresolved_factor(&factor) {
                undef.push(factor);
                continue;
            }
            rational.push(factor);
        }

        let (n, d) = Expr::mul_all(rational).numer_denom();
        let bpoly = Poly::from_expr(&n, var).map_err(|_| not_rational())?;
        let apoly = Poly::from_expr(&d, var).map_err(|_| not_rational())?;
        if apoly.is_zero() {
            return Err(RationalError::ZeroDenominator(expr.to_string()));
        }

        let (bp, ap) = cancel(&bpoly, &apoly);
        let (numer, denom, bpoly, apoly) = if ap.degree() < apoly.degree() {
            log::trace!("cancelled common factor of {expr}");
            (bp.to_expr(var), ap.to_expr(var), bp, ap)
        } else {
            (n, d, bpoly, apoly)
        };

        Ok(Self {
            expr: expr.clone(),
            var: var.clone(),
            numer,
            denom,
            delay: Expr::add_all(delay).expand(),
            undef: Expr::mul_all(undef),
            bpoly,
            apoly,
            zeros: OnceCell::new(),
            poles: Default::default(),
        })
    }

    // === Accessors ===

    /// The analysed expression.
    #[must_use]
    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// The variable.
    #[must_use]
    pub fn var(&self) -> &Symbol {
        &self.var
    }

    /// `(B, A, delay, undef)`.
    #[must_use]
    pub fn decompose(&self) -> (Expr, Expr, Expr, Expr) {
        (
            self.numer.clone(),
            self.denom.clone(),
            self.delay.clone(),
            self.undef.clone(),
        )
    }

    /// Numerator `B`, possibly in factored form.
    #[must_use]
    pub fn numerator(&self) -> &Expr {
        &self.numer
    }

    /// Denominator `A`, possibly in factored form.
    #[must_use]
    pub fn denominator(&self) -> &Expr {
        &self.denom
    }

    /// The delay `T` in `exp(-T*var)`.
    #[must_use]
    pub fn delay(&self) -> &Expr {
        &self.delay
    }

    /// Product of unresolved signal factors, one if there are none.
    #[must_use]
    pub fn undef(&self) -> &Expr {
        &self.undef
    }

    /// Returns true if there is a non-zero delay.
    #[must_use]
    pub fn has_delay(&self) -> bool {
        !self.delay.is_zero()
    }

    /// Returns true if unresolved signals are present.
    #[must_use]
    pub fn has_undef(&self) -> bool {
        !self.undef.is_one()
    }

    /// `B` as a polynomial.
    #[must_use]
    pub fn numerator_poly(&self) -> &Poly {
        &self.bpoly
    }

    /// `A` as a polynomial.
    #[must_use]
    pub fn denominator_poly(&self) -> &Poly {
        &self.apoly
    }

    /// Degree of `B`.
    #[must_use]
    pub fn numerator_degree(&self) -> usize {
        self.bpoly.degree()
    }

    /// Degree of `A`.
    #[must_use]
    pub fn denominator_degree(&self) -> usize {
        self.apoly.degree()
    }

    /// `deg B < deg A`, with zero counting as strictly proper.
    #[must_use]
    pub fn is_strictly_proper(&self) -> bool {
        self.bpoly.is_zero() || self.bpoly.degree() < self.apoly.degree()
    }

    /// `deg B <= deg A`.
    #[must_use]
    pub fn is_proper(&self) -> bool {
        self.bpoly.degree() <= self.apoly.degree()
    }

    /// `B/A` without delay or unresolved factors.
    #[must_use]
    pub fn rational_part(&self) -> Expr {
        &self.numer / &self.denom
    }

    /// Multiplies `e` by the delay and unresolved factors of this view.
    #[must_use]
    pub fn reattach(&self, e: Expr) -> Expr {
        let x = Expr::symbol(&self.var);
        Expr::mul_all([e, (-&self.delay * x).exp(), self.undef.clone()])
    }

    // === Roots ===

    /// Zeros of `B` with multiplicities.
    #[must_use]
    pub fn zeros(&self) -> &[Root] {
        &self
            .zeros
            .get_or_init(|| roots_of(&self.numer, &self.bpoly, &self.var, None))
            .roots
    }

    /// Poles of `B/A` under the given damping hint.
    #[must_use]
    pub fn poles(&self, damping: Option<Damping>) -> Vec<Pole> {
        self.pole_set(damping)
            .roots
            .iter()
            .map(|r| Pole::new(r.value.clone(), r.multiplicity, damping))
            .collect()
    }

    /// Returns true if every pole was found.
    #[must_use]
    pub fn poles_complete(&self, damping: Option<Damping>) -> bool {
        self.pole_set(damping).total_multiplicity() == self.apoly.degree()
    }

    pub(crate) fn pole_set(&self, damping: Option<Damping>) -> &RootSet {
        self.poles[damping_slot(damping)]
            .get_or_init(|| roots_of(&self.denom, &self.apoly, &self.var, damping))
    }

    /// Warnings raised by the root searches run so far.
    #[must_use]
    pub fn warnings(&self) -> Vec<RootWarning> {
        let mut out: Vec<RootWarning> = Vec::new();
        let computed = std::iter::once(&self.zeros)
            .chain(self.poles.iter())
            .filter_map(OnceCell::get);
        for set in computed {
            for w in &set.warnings {
                if !out.contains(w) {
                    out.push(w.clone());
                }
            }
        }
        out
    }
}

fn is_unresolved_factor(factor: &Expr) -> bool {
    factor.is_undefined_function() || factor.as_base_exp().0.is_undefined_function()
}

/// Roots of a polynomial given in (possibly) factored form, solved one
/// factor at a time so that symbolic factors keep their closed forms.
fn roots_of(factored: &Expr, poly: &Poly, var: &Symbol, damping: Option<Damping>) -> RootSet {
    let mut set = RootSet::default();
    let mut degree = 0;
    for factor in factored.factors() {
        if !factor.has_symbol(var) {
            continue;
        }
        let (base, exp) = factor.as_base_exp();
        let times = exp.as_i64().and_then(|k| usize::try_from(k).ok());
        let base_poly = Poly::from_expr(&base, var).ok();
        match (times, base_poly) {
            (Some(times), Some(p)) if times > 0 => {
                degree += p.degree() * times;
                set.extend_scaled(find_roots(&p, damping), times);
            }
            _ => return find_roots(poly, damping),
        }
    }
    if degree != poly.degree() {
        return find_roots(poly, damping);
    }
    set
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s() -> Symbol {
        Symbol::new("s")
    }

    fn x() -> Expr {
        Expr::symbol(&s())
    }

    #[test]
    fn test_decompose_delay_and_undef() {
        let v = Expr::undefined("V", [x()]);
        let e = (-2 * x()).exp() * &v / (x() + 1);
        let rf = RationalFunction::new(&e, &s()).unwrap();
        let (b, a, delay, undef) = rf.decompose();
        assert_eq!(b, Expr::one());
        assert_eq!(a, x() + 1);
        assert_eq!(delay, Expr::int(2));
        assert_eq!(undef, v);
    }

    #[test]
    fn test_constant_is_rational() {
        let rf = RationalFunction::new(&Expr::sym("R"), &s()).unwrap();
        assert_eq!(rf.denominator_degree(), 0);
        assert!(rf.poles(None).is_empty());
    }

    #[test]
    fn test_non_rational_rejected() {
        let err = RationalFunction::new(&x().sin(), &s()).unwrap_err();
        assert!(matches!(err, RationalError::Decomposition { .. }));
        assert_eq!(
            RationalFunction::new(&x(), &Symbol::new("")).unwrap_err(),
            RationalError::EmptyVariable
        );
    }

    #[test]
    fn test_poles_of_factored_denominator() {
        let e = Expr::one() / ((x() + 1) * (x() + 2));
        let rf = RationalFunction::new(&e, &s()).unwrap();
        let mut poles: Vec<Expr> = rf.poles(None).into_iter().map(|p| p.expr).collect();
        poles.sort();
        assert_eq!(poles, vec![Expr::int(-2), Expr::int(-1)]);
        assert!(rf.warnings().is_empty());
    }

    #[test]
    fn test_symbolic_factor_poles() {
        let a = Expr::sym("a");
        let b = Expr::sym("b");
        let c = Expr::sym("c");
        let e = Expr::one() / ((x() + &a) * (x() + &b) * (x() + &c));
        let rf = RationalFunction::new(&e, &s()).unwrap();
        assert_eq!(rf.poles(None).len(), 3);
        assert!(rf.poles_complete(None));
    }

    #[test]
    fn test_common_factor_cancelled() {
        let e = (x() + 1) / ((x() + 1) * (x() + 3));
        let rf = RationalFunction::new(&e, &s()).unwrap();
        assert_eq!(rf.denominator_degree(), 1);
        assert_eq!(rf.poles(None)[0].expr, Expr::int(-3));
    }

    #[test]
    fn test_irreducible_cubic_needs_no_warning() {
        let e = Expr::one() / (x().powi(3) + 2 * x() + 1);
        let rf = RationalFunction::new(&e, &s()).unwrap();
        assert_eq!(rf.poles(None).len(), 3);
        assert!(rf.warnings().is_empty());
    }

    #[test]
    fn test_numeric_warning_recorded() {
        let e = Expr::one() / (x().powi(5) + x() + 3);
        let rf = RationalFunction::new(&e, &s()).unwrap();
        assert_eq!(rf.poles(None).len(), 5);
        assert_eq!(rf.warnings(), vec![RootWarning::Numerical { degree: 5 }]);
    }
}
