//! Residues at poles.
//!
//! For a pole `p` of multiplicity `n` write `A = (x - p)^n Ã`. The
//! coefficient of `1/(x - p)^o` in the partial fraction expansion of
//! `N/A` is
//!
//! ```text
//! c_o = 1/(n-o)! * d^(n-o)/dx^(n-o) [N/Ã] at x = p
//! ```
//!
//! so the highest order is simply `N(p)/Ã(p)`. `Ã` comes from exact
//! division where possible, otherwise from the other poles. When neither
//! works, the limit is taken with l'Hôpital's rule.

use syntra_core::{Expr, Number};
use syntra_poly::Poly;

use crate::error::{RationalError, RationalResult};
use crate::pole::Pole;
use crate::rational_func::RationalFunction;
use crate::simplify::{cdiv, tidy};

impl RationalFunction {
    /// Residue of `B/A` at `pole`, the coefficient of `1/(x - p)`.
    ///
    /// `poles` is the full pole set the expansion is taken over.
    ///
    /// # Errors
    ///
    /// Returns [`RationalError::InvalidPole`] if `pole` is not in `poles`
    /// and [`RationalError::Singular`] if the limit does not exist.
    pub fn residue(&self, pole: &Pole, poles: &[Pole]) -> RationalResult<Expr> {
        let coeffs = self.laurent_coeffs(self.numerator_poly(), pole, poles)?;
        Ok(coeffs.into_iter().next().unwrap_or_else(Expr::zero))
    }

    /// Coefficients of `1/(x - p)^o` for `o = 1..=n`, lowest order first.
    ///
    /// # Errors
    ///
    /// See [`RationalFunction::residue`].
    pub fn residue_terms(&self, pole: &Pole, poles: &[Pole]) -> RationalResult<Vec<Expr>> {
        self.laurent_coeffs(self.numerator_poly(), pole, poles)
    }

    /// Principal-part coefficients of `num/A` at `pole`, lowest order first.
    pub(crate) fn laurent_coeffs(
        &self,
        num: &Poly,
        pole: &Pole,
        poles: &[Pole],
    ) -> RationalResult<Vec<Expr>> {
        if !poles.iter().any(|q| q.expr == pole.expr) {
            return Err(RationalError::InvalidPole {
                pole: pole.to_string(),
                expr: self.expr().to_string(),
            });
        }
        let n = pole.n;
        let p = &pole.expr;

        if let Some(cofactor) = self.cofactor(pole, poles) {
            let at_p = tidy(&cofactor.eval(p));
            if !at_p.is_zero() {
                return Ok(quotient_derivatives(num, &cofactor, p, &at_p, n));
            }
        }

        log::debug!("residue at {p} by limit");
        let root_power = Poly::linear_factor(p).pow(exponent(n)?);
        let g_num = root_power.mul(num);
        let g_den = self.denominator_poly().clone();
        let mut out = vec![Expr::zero(); n];
        let mut nk = g_num;
        for k in 0..n {
            let den_k = g_den.pow(exponent(k + 1)?);
            let value = limit_at(&nk, &den_k, p)?;
            out[n - 1 - k] = tidy(&(value / Expr::number(factorial(k))));
            nk = next_derivative_numerator(&nk, &g_den, k);
        }
        Ok(out)
    }

    /// `A / (x - p)^n`, when it can be formed.
    pub(crate) fn cofactor(&self, pole: &Pole, poles: &[Pole]) -> Option<Poly> {
        let a = self.denominator_poly();
        let root_power = Poly::linear_factor(&pole.expr).pow(u32::try_from(pole.n).ok()?);
        if let Ok((q, r)) = a.div_rem(&root_power) {
            if r.coeffs().iter().all(crate::simplify::is_zero) {
                return Some(q);
            }
        }

        let total: usize = poles.iter().map(|q| q.n).sum();
        if total != a.degree() {
            return None;
        }
        let mut cofactor = Poly::constant(a.leading_coeff().clone());
        for other in poles.iter().filter(|q| q.expr != pole.expr) {
            let factor = Poly::linear_factor(&other.expr).pow(u32::try_from(other.n).ok()?);
            cofactor = cofactor.mul(&factor);
        }
        Some(cofactor)
    }
}

/// `c_o` for `o = 1..=n` from successive derivatives of `num/den`.
fn quotient_derivatives(num: &Poly, den: &Poly, p: &Expr, den_at_p: &Expr, n: usize) -> Vec<Expr> {
    let mut out = vec![Expr::zero(); n];
    let mut nk = num.clone();
    let mut den_power = Expr::one();
    for k in 0..n {
        den_power = tidy(&(&den_power * den_at_p));
        let value = cdiv(&nk.eval(p), &den_power);
        out[n - 1 - k] = tidy(&(value / Expr::number(factorial(k))));
        if k + 1 < n {
            nk = next_derivative_numerator(&nk, den, k);
        }
    }
    out
}

/// With `F^(k) = N_k / D^(k+1)`, returns `N_{k+1} = N_k' D - (k+1) N_k D'`.
fn next_derivative_numerator(nk: &Poly, den: &Poly, k: usize) -> Poly {
    let k1 = Expr::int(i64::try_from(k + 1).unwrap_or(i64::MAX));
    nk.derivative()
        .mul(den)
        .sub(&nk.mul(&den.derivative()).scale(&k1))
}

/// `lim num/den` at `x = p`, differentiating both until `den(p) != 0`.
fn limit_at(num: &Poly, den: &Poly, p: &Expr) -> RationalResult<Expr> {
    let mut num = num.clone();
    let mut den = den.clone();
    for _ in 0..=den.degree() {
        let d = tidy(&den.eval(p));
        if !d.is_zero() {
            return Ok(cdiv(&num.eval(p), &d));
        }
        num = num.derivative();
        den = den.derivative();
    }
    Err(RationalError::Singular(format!("no finite limit at {p}")))
}

fn factorial(k: usize) -> Number {
    (1..=k).fold(Number::integer(1), |acc, i| {
        acc * Number::integer(i64::try_from(i).unwrap_or(i64::MAX))
    })
}

fn exponent(n: usize) -> RationalResult<u32> {
    u32::try_from(n).map_err(|_| RationalError::Singular(format!("pole order {n} too large")))
}
