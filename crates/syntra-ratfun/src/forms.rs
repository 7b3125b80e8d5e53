//! Presentation forms.
//!
//! Every form keeps the delay and unresolved factors of the original
//! expression and is numerically equal to it wherever both are defined.

use syntra_core::{Bindings, Expr};
use syntra_poly::{Damping, Poly};

use crate::error::{RationalError, RationalResult};
use crate::partial_fractions::Method;
use crate::pole::Pole;
use crate::rational_func::RationalFunction;
use crate::simplify::tidy;

impl RationalFunction {
    /// `K * B'(x)/A'(x)` with `B'` and `A'` monic.
    #[must_use]
    pub fn canonical(&self) -> Expr {
        let (b, a) = (self.numerator_poly(), self.denominator_poly());
        if b.is_zero() {
            return Expr::zero();
        }
        let x = self.var();
        let gain = tidy(&(b.leading_coeff() / a.leading_coeff()));
        self.reattach(Expr::mul_all([
            gain,
            monic(b).to_expr(x),
            monic(a).to_expr(x).recip(),
        ]))
    }

    /// `B(x)/A(x)` with both polynomials expanded.
    #[must_use]
    pub fn general(&self) -> Expr {
        let x = self.var();
        self.reattach(Expr::mul_all([
            self.numerator_poly().to_expr(x),
            self.denominator_poly().to_expr(x).recip(),
        ]))
    }

    /// `Q(x) + M(x)/A(x)` with the fraction strictly proper.
    ///
    /// # Errors
    ///
    /// Fails only if polynomial division fails.
    pub fn standard(&self) -> RationalResult<Expr> {
        let x = self.var();
        let a = self.denominator_poly();
        let (q, m) = self.numerator_poly().div_rem(a)?;
        let mut terms = vec![tidy_poly(&q).to_expr(x)];
        if !m.is_zero() {
            let lc = a.leading_coeff();
            let m = Poly::new(m.coeffs().iter().map(|c| tidy(&(c / lc))).collect());
            terms.push(m.to_expr(x) / monic(a).to_expr(x));
        }
        Ok(self.reattach(Expr::add_all(terms)))
    }

    /// Time-constant form: each polynomial is written as
    /// `c * x^k * (1 + ...)` with unit constant term.
    #[must_use]
    pub fn timeconst(&self) -> Expr {
        let (b, a) = (self.numerator_poly(), self.denominator_poly());
        if b.is_zero() {
            return Expr::zero();
        }
        let x = self.var();
        let (bc, bbody) = unit_constant(b, x);
        let (ac, abody) = unit_constant(a, x);
        self.reattach(Expr::mul_all([tidy(&(bc / ac)), bbody, abody.recip()]))
    }

    /// `K * Π (x - z)^m / Π (x - p)^n`.
    ///
    /// # Errors
    ///
    /// Returns [`RationalError::UnresolvedZeros`] or
    /// [`RationalError::UnresolvedPoles`] when roots are missing.
    pub fn zpk(&self) -> RationalResult<Expr> {
        let (b, a) = (self.numerator_poly(), self.denominator_poly());
        if b.is_zero() {
            return Ok(Expr::zero());
        }
        let zeros = self.zeros();
        let found: usize = zeros.iter().map(|z| z.multiplicity).sum();
        if found != b.degree() {
            return Err(RationalError::UnresolvedZeros {
                found,
                degree: b.degree(),
                expr: self.expr().to_string(),
            });
        }
        let poles = self.poles(None);
        let found: usize = poles.iter().map(|p| p.n).sum();
        if found != a.degree() {
            return Err(RationalError::UnresolvedPoles {
                found,
                degree: a.degree(),
                expr: self.expr().to_string(),
            });
        }

        let x = Expr::symbol(self.var());
        let mut factors = vec![tidy(&(b.leading_coeff() / a.leading_coeff()))];
        for z in zeros {
            factors.push((&x - &z.value).powi(order(z.multiplicity)));
        }
        for p in &poles {
            factors.push((&x - &p.expr).powi(-order(p.n)));
        }
        Ok(self.reattach(Expr::mul_all(factors)))
    }

    /// Partial fraction form.
    ///
    /// With `combine_conjugates`, each complex-conjugate pair of terms of a
    /// real rational function is merged into one real second-order section.
    ///
    /// # Errors
    ///
    /// See [`RationalFunction::as_qrpo`].
    pub fn partfrac(
        &self,
        combine_conjugates: bool,
        damping: Option<Damping>,
        method: Method,
    ) -> RationalResult<Expr> {
        let qrpo = self.as_qrpo(damping, method)?;
        let var = self.var();
        let x = Expr::symbol(var);
        let combine = combine_conjugates && self.has_real_coefficients();

        let mut terms = vec![qrpo.quotient.to_expr(var)];
        for (r, pole, o) in qrpo.terms() {
            if combine && qrpo.poles.iter().any(|p| p.is_conjugate_of(pole)) {
                if pole.is_upper() {
                    terms.push(conjugate_section(r, pole, o, var));
                }
                continue;
            }
            terms.push(r / (&x - &pole.expr).powi(order(o)));
        }
        Ok(self.reattach(Expr::add_all(terms)))
    }

    /// `Q(x)` plus one canonical fraction per power of the remainder.
    ///
    /// # Errors
    ///
    /// Fails only if polynomial division fails.
    pub fn expand_canonical(&self) -> RationalResult<Expr> {
        let var = self.var();
        let x = Expr::symbol(var);
        let a = self.denominator_poly();
        let (q, m) = self.numerator_poly().div_rem(a)?;
        let den = monic(a).to_expr(var).recip();
        let lc = a.leading_coeff();

        let mut terms: Vec<Expr> = Vec::new();
        for (k, c) in q.coeffs().iter().enumerate() {
            let c = tidy(c);
            if !c.is_zero() {
                terms.push(c * x.powi(order(k)));
            }
        }
        for (k, c) in m.coeffs().iter().enumerate() {
            let c = tidy(&(c / lc));
            if !c.is_zero() {
                terms.push(Expr::mul_all([c, x.powi(order(k)), den.clone()]));
            }
        }
        Ok(self.reattach(Expr::add_all(terms)))
    }

    /// `B(0)/A(0)`, or `None` if `A(0)` vanishes or unresolved signals
    /// are present.
    #[must_use]
    pub fn dc_gain(&self) -> Option<Expr> {
        if self.has_undef() {
            return None;
        }
        let a0 = tidy(&self.denominator_poly().coeff(0));
        if a0.is_zero() {
            return None;
        }
        Some(tidy(&(self.numerator_poly().coeff(0) / a0)))
    }

    /// Continuous-time stability: every pole strictly in the left half
    /// plane. `None` when some pole is missing or its sign is unknown.
    #[must_use]
    pub fn is_stable(&self) -> Option<bool> {
        if !self.poles_complete(None) {
            return None;
        }
        let bindings = Bindings::new();
        let mut known = true;
        for pole in self.poles(None) {
            match pole.re_im().0.eval_f64(&bindings) {
                Ok(re) if re >= 0.0 => return Some(false),
                Ok(_) => {}
                Err(_) => known = false,
            }
        }
        known.then_some(true)
    }

    /// Complex-conjugate pole pairs, upper member first.
    #[must_use]
    pub fn conjugate_pairs(&self) -> Vec<(Pole, Pole)> {
        let poles = self.poles(None);
        poles
            .iter()
            .filter(|p| p.is_upper())
            .filter_map(|p| {
                poles
                    .iter()
                    .find(|q| p.is_conjugate_of(q))
                    .map(|q| (p.clone(), q.clone()))
            })
            .collect()
    }

    /// Returns true if neither polynomial has an imaginary coefficient.
    #[must_use]
    pub fn has_real_coefficients(&self) -> bool {
        let j = Expr::j();
        self.numerator_poly()
            .coeffs()
            .iter()
            .chain(self.denominator_poly().coeffs())
            .all(|c| !c.has(&j))
    }
}

/// `r/(x - p)^o + conj(r)/(x - conj(p))^o` over the real quadratic.
fn conjugate_section(r: &Expr, pole: &Pole, o: usize, var: &syntra_core::Symbol) -> Expr {
    let power = u32::try_from(o).unwrap_or(u32::MAX);
    let p = &pole.expr;
    let pc = tidy(&p.conjugate());
    let rc = tidy(&r.conjugate());
    let numer = Poly::linear_factor(&pc)
        .pow(power)
        .scale(r)
        .add(&Poly::linear_factor(p).pow(power).scale(&rc));

    let (re, im) = pole.re_im();
    let quad = Poly::new(vec![
        tidy(&(re.powi(2) + im.powi(2))),
        tidy(&(-2 * re)),
        Expr::one(),
    ]);
    tidy_poly(&numer).to_expr(var) / quad.to_expr(var).powi(order(o))
}

fn monic(p: &Poly) -> Poly {
    tidy_poly(&p.make_monic())
}

fn tidy_poly(p: &Poly) -> Poly {
    Poly::new(p.coeffs().iter().map(tidy).collect())
}

/// Splits `p` as `c * x^k * u(x)` with `u(0) = 1`.
fn unit_constant(p: &Poly, var: &syntra_core::Symbol) -> (Expr, Expr) {
    let k = p.zero_root_multiplicity();
    let rest = p.unshift(k);
    let c0 = rest.coeff(0);
    let unit = Poly::new(rest.coeffs().iter().map(|c| tidy(&(c / &c0))).collect());
    let body = Expr::symbol(var).powi(order(k)) * unit.to_expr(var);
    (c0, body)
}

fn order(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}
