//! Quotient, residues, poles and orders.
//!
//! `B/A = Q + Σ R_i / (x - P_i)^O_i`, with `Q` the polynomial quotient.
//! Residues are found either by substitution (derivatives at each pole)
//! or by equating coefficients of the numerator over the common
//! denominator and solving the resulting linear system.

use syntra_core::Expr;
use syntra_poly::{Damping, Poly};

use crate::error::{RationalError, RationalResult};
use crate::linsolve::solve;
use crate::pole::Pole;
use crate::rational_func::RationalFunction;
use crate::simplify::{is_zero, tidy};

/// How residues are computed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Method {
    /// Evaluate at each pole.
    #[default]
    Sub,
    /// Equate coefficients and solve a linear system.
    Ec,
}

/// A partial fraction expansion.
///
/// `residues`, `poles` and `orders` are parallel; entry `i` stands for
/// `residues[i] / (x - poles[i].expr)^orders[i]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Qrpo {
    /// Polynomial quotient.
    pub quotient: Poly,
    /// Residues.
    pub residues: Vec<Expr>,
    /// The pole of each term.
    pub poles: Vec<Pole>,
    /// The order of each term.
    pub orders: Vec<usize>,
    /// Delay carried over from the decomposition.
    pub delay: Expr,
    /// Unresolved factors carried over from the decomposition.
    pub undef: Expr,
}

impl Qrpo {
    /// Number of fraction terms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.residues.len()
    }

    /// Returns true if there are no fraction terms.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.residues.is_empty()
    }

    /// Iterates over `(residue, pole, order)`.
    pub fn terms(&self) -> impl Iterator<Item = (&Expr, &Pole, usize)> {
        self.residues
            .iter()
            .zip(&self.poles)
            .zip(&self.orders)
            .map(|((r, p), &o)| (r, p, o))
    }
}

impl RationalFunction {
    /// Splits into quotient and simple fractions.
    ///
    /// Terms with zero residue are dropped. For each pole, terms appear
    /// from the highest order down.
    ///
    /// # Errors
    ///
    /// Returns [`RationalError::UnresolvedPoles`] if some poles could not
    /// be found, and [`RationalError::Singular`] if the coefficient system
    /// has no unique solution.
    pub fn as_qrpo(&self, damping: Option<Damping>, method: Method) -> RationalResult<Qrpo> {
        let poles = self.poles(damping);
        let degree = self.denominator_degree();
        let found: usize = poles.iter().map(|p| p.n).sum();
        if found != degree {
            return Err(RationalError::UnresolvedPoles {
                found,
                degree,
                expr: self.expr().to_string(),
            });
        }

        let (quotient, remainder) = self.numerator_poly().div_rem(self.denominator_poly())?;
        let quotient = Poly::new(quotient.coeffs().iter().map(tidy).collect());

        let coeffs = match method {
            Method::Sub => poles
                .iter()
                .map(|pole| self.laurent_coeffs(&remainder, pole, &poles))
                .collect::<RationalResult<Vec<_>>>()?,
            Method::Ec => self.equate_coefficients(&remainder, &poles)?,
        };

        let mut qrpo = Qrpo {
            quotient,
            residues: Vec::new(),
            poles: Vec::new(),
            orders: Vec::new(),
            delay: self.delay().clone(),
            undef: self.undef().clone(),
        };
        for (pole, per_order) in poles.iter().zip(coeffs) {
            for (o, r) in per_order.into_iter().enumerate().rev() {
                if r.is_zero() {
                    continue;
                }
                qrpo.residues.push(r);
                qrpo.poles.push(pole.clone());
                qrpo.orders.push(o + 1);
            }
        }
        Ok(qrpo)
    }

    /// Solves `M = Σ c_{i,o} A / (x - p_i)^o` for the `c_{i,o}`.
    fn equate_coefficients(
        &self,
        remainder: &Poly,
        poles: &[Pole],
    ) -> RationalResult<Vec<Vec<Expr>>> {
        let degree = self.denominator_degree();
        let mut basis: Vec<Poly> = Vec::with_capacity(degree);
        for pole in poles {
            let cofactor = self.cofactor(pole, poles).ok_or_else(|| {
                RationalError::Singular(format!("cannot separate the pole at {}", pole.expr))
            })?;
            let linear = Poly::linear_factor(&pole.expr);
            for o in 1..=pole.n {
                let mut b = cofactor.clone();
                for _ in o..pole.n {
                    b = b.mul(&linear);
                }
                basis.push(b);
            }
        }

        let matrix: Vec<Vec<Expr>> = (0..degree)
            .map(|i| basis.iter().map(|b| b.coeff(i)).collect())
            .collect();
        let rhs: Vec<Expr> = (0..degree).map(|i| remainder.coeff(i)).collect();
        let solution = solve(&matrix, &rhs)?;

        let mut it = solution.into_iter();
        let clean = |c: Expr| if is_zero(&c) { Expr::zero() } else { c };
        Ok(poles
            .iter()
            .map(|pole| it.by_ref().take(pole.n).map(clean).collect())
            .collect())
    }
}
