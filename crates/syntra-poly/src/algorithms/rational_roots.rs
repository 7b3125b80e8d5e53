//! Rational root search.

use syntra_core::{Expr, Number};

use crate::dense::Poly;

/// Upper bound on candidate roots tried.
const MAX_CANDIDATES: usize = 20_000;

/// Finds all rational roots of an exact polynomial with non-zero constant term.
///
/// Returns the roots (repeated by multiplicity) and the deflated remainder.
#[must_use]
pub fn rational_roots(p: &Poly) -> (Vec<Number>, Poly) {
    let mut found = Vec::new();
    if !p.is_exact() || p.degree() == 0 {
        return (found, p.clone());
    }
    let Some(scaled) = integer_coefficients(p) else {
        return (found, p.clone());
    };
    let (Some(ps), Some(qs)) = (
        scaled[0].positive_divisors(),
        scaled[scaled.len() - 1].positive_divisors(),
    ) else {
        return (found, p.clone());
    };
    if ps.len() * qs.len() * 2 > MAX_CANDIDATES {
        return (found, p.clone());
    }

    let mut candidates: Vec<Number> = Vec::new();
    for &num in &ps {
        for &den in &qs {
            for sign in [1, -1] {
                let c = Number::ratio(sign * num, den);
                if !candidates.contains(&c) {
                    candidates.push(c);
                }
            }
        }
    }

    let mut rest = p.clone();
    for c in candidates {
        while rest.degree() > 0 && rest.eval(&Expr::number(c.clone())).is_zero() {
            let Ok((q, _)) = rest.div_rem(&Poly::linear_factor(&Expr::number(c.clone()))) else {
                break;
            };
            rest = q;
            found.push(c.clone());
        }
        if rest.degree() == 0 {
            break;
        }
    }
    (found, rest)
}

/// Scales exact coefficients to integers by the LCM of their denominators.
fn integer_coefficients(p: &Poly) -> Option<Vec<Number>> {
    let mut lcm: i64 = 1;
    for c in p.coeffs() {
        let (_, den) = c.as_number()?.to_ratio()?;
        lcm = lcm.checked_mul(den / gcd(lcm, den))?;
    }
    let factor = Number::integer(lcm);
    p.coeffs()
        .iter()
        .map(|c| c.as_number().map(|n| n * &factor))
        .collect()
}

fn gcd(mut a: i64, mut b: i64) -> i64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a.abs()
}
