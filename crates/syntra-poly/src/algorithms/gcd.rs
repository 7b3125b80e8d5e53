//! Polynomial GCD and square-free decomposition.
//!
//! Only exact rational coefficients take part; with symbolic or floating
//! coefficients the GCD is reported as one, which leaves fractions
//! uncancelled but never wrong.

use crate::dense::Poly;

/// GCD of two polynomials by the Euclidean algorithm, made monic.
#[must_use]
pub fn poly_gcd(a: &Poly, b: &Poly) -> Poly {
    if !a.is_exact() || !b.is_exact() {
        return Poly::one();
    }
    if a.is_zero() {
        return b.make_monic();
    }
    if b.is_zero() {
        return a.make_monic();
    }

    let mut p = a.clone();
    let mut q = b.clone();
    while !q.is_zero() {
        let Ok((_, r)) = p.div_rem(&q) else {
            return Poly::one();
        };
        p = q;
        q = r;
    }
    p.make_monic()
}

/// Divides numerator and denominator by their GCD.
#[must_use]
pub fn cancel(num: &Poly, den: &Poly) -> (Poly, Poly) {
    let g = poly_gcd(num, den);
    if g.degree() == 0 {
        return (num.clone(), den.clone());
    }
    match (num.div_rem(&g), den.div_rem(&g)) {
        (Ok((n, _)), Ok((d, _))) => (n, d),
        _ => (num.clone(), den.clone()),
    }
}

/// Square-free decomposition by Yun's algorithm.
///
/// Returns factors `f_i` with multiplicities `i` such that the product of
/// `f_i^i` equals `p` up to a constant. Factors are made monic; inexact
/// polynomials come back whole with multiplicity one.
#[must_use]
pub fn squarefree(p: &Poly) -> Vec<(Poly, usize)> {
    if !p.is_exact() || p.degree() < 2 {
        return vec![(p.clone(), 1)];
    }
    let dp = p.derivative();
    let a = poly_gcd(p, &dp);
    if a.degree() == 0 {
        return vec![(p.clone(), 1)];
    }
    let (Ok((mut b, _)), Ok((mut c, _))) = (p.div_rem(&a), dp.div_rem(&a)) else {
        return vec![(p.clone(), 1)];
    };

    let mut out = Vec::new();
    let mut multiplicity = 1;
    // at most deg p rounds, each strips one factor from b
    while b.degree() > 0 && multiplicity <= p.degree() {
        let d = c.sub(&b.derivative());
        let g = poly_gcd(&b, &d);
        if g.degree() > 0 {
            out.push((g.clone(), multiplicity));
        }
        let (Ok((next_b, _)), Ok((next_c, _))) = (b.div_rem(&g), d.div_rem(&g)) else {
            break;
        };
        b = next_b;
        c = next_c;
        multiplicity += 1;
    }
    out
}
