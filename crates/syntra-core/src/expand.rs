//! Expansion and common denominators.

use std::collections::BTreeMap;

use num_traits::{One, Zero};

use crate::expr::{Expr, ExprNode};
use crate::number::Number;

/// Largest integer power multiplied out by [`Expr::expand`].
const MAX_EXPAND_POWER: i64 = 64;

impl Expr {
    /// Distributes products over sums and multiplies out integer powers of sums.
    ///
    /// Function arguments are expanded as well. Negative powers of sums
    /// keep the sum in the denominator, with the sum itself expanded.
    #[must_use]
    pub fn expand(&self) -> Expr {
        if self.is_atom() {
            return self.clone();
        }
        let expanded = self.map_children(Expr::expand);
        match expanded.node() {
            ExprNode::Mul(factors) => distribute(factors),
            ExprNode::Pow { base, exp } => match (base.node(), exp.as_i64()) {
                (ExprNode::Add(_), Some(k)) if (2..=MAX_EXPAND_POWER).contains(&k) => {
                    expand_power(base, k)
                }
                (ExprNode::Add(_), Some(k)) if (-MAX_EXPAND_POWER..=-2).contains(&k) => {
                    expand_power(base, -k).recip()
                }
                _ => expanded.clone(),
            },
            _ => expanded.clone(),
        }
    }

    /// Splits into numerator and denominator over a common denominator.
    ///
    /// Only the top-level sum/product/power structure is combined;
    /// function arguments are left untouched.
    #[must_use]
    pub fn numer_denom(&self) -> (Expr, Expr) {
        match self.node() {
            ExprNode::Number(n) => match n.to_ratio() {
                Some((p, q)) if q != 1 => (Expr::int(p), Expr::int(q)),
                _ => (self.clone(), Expr::one()),
            },
            ExprNode::Pow { base, exp } => {
                if let Some(k) = exp.as_i64() {
                    let (n, d) = base.numer_denom();
                    return if k >= 0 {
                        (n.powi(k), d.powi(k))
                    } else {
                        (d.powi(-k), n.powi(-k))
                    };
                }
                if exp.has_negative_sign() {
                    (Expr::one(), base.pow(&-exp))
                } else {
                    (self.clone(), Expr::one())
                }
            }
            ExprNode::Mul(factors) => {
                let (nums, dens): (Vec<_>, Vec<_>) =
                    factors.iter().map(Expr::numer_denom).unzip();
                (Expr::mul_all(nums), Expr::mul_all(dens))
            }
            ExprNode::Add(terms) => {
                let parts: Vec<(Expr, Expr)> = terms.iter().map(Expr::numer_denom).collect();
                if parts.iter().all(|(_, d)| d.is_one()) {
                    return (self.clone(), Expr::one());
                }
                let common = common_multiple(parts.iter().map(|(_, d)| d));
                let numer = Expr::add_all(
                    parts
                        .into_iter()
                        .map(|(n, d)| Expr::mul_all([n, common.clone(), d.recip()])),
                );
                (numer, common)
            }
            _ => (self.clone(), Expr::one()),
        }
    }

    /// Rewrites as a single fraction `n/d`.
    #[must_use]
    pub fn together(&self) -> Expr {
        let (n, d) = self.numer_denom();
        if d.is_one() {
            n
        } else {
            Expr::mul_all([n, d.recip()])
        }
    }
}

fn distribute(factors: &[Expr]) -> Expr {
    let mut acc: Vec<Expr> = vec![Expr::one()];
    for factor in factors {
        let terms = factor.terms();
        acc = acc
            .iter()
            .flat_map(|a| terms.iter().map(move |t| Expr::mul_all([a.clone(), t.clone()])))
            .collect();
    }
    Expr::add_all(acc)
}

fn expand_power(base: &Expr, k: i64) -> Expr {
    let mut result = base.clone();
    for _ in 1..k {
        result = distribute(&[result, base.clone()]);
    }
    result
}

/// Least common multiple of denominators, treated as multisets of power factors.
fn common_multiple<'a, I: Iterator<Item = &'a Expr>>(dens: I) -> Expr {
    let mut coeff = Number::one();
    let mut powers: BTreeMap<Expr, Expr> = BTreeMap::new();

    for den in dens {
        let (c, rest) = den.split_coeff();
        coeff = number_lcm(&coeff, &c);
        for factor in rest.factors() {
            if factor.is_one() {
                continue;
            }
            let (base, exp) = factor.as_base_exp();
            let merged = match powers.get(&base) {
                None => exp,
                Some(prev) => match (prev.as_number(), exp.as_number()) {
                    (Some(a), Some(b)) => Expr::number(std::cmp::max(a, b).clone()),
                    _ if *prev == exp => exp,
                    _ => prev + &exp,
                },
            };
            powers.insert(base, merged);
        }
    }

    Expr::mul_all(
        std::iter::once(Expr::number(coeff)).chain(powers.into_iter().map(|(b, e)| b.pow(&e))),
    )
}

fn number_lcm(a: &Number, b: &Number) -> Number {
    match (a.to_i64(), b.to_i64()) {
        (Some(x), Some(y)) if x != 0 && y != 0 => {
            let (x, y) = (x.abs(), y.abs());
            let g = gcd(x, y);
            Number::integer(x / g * y)
        }
        _ if b.is_zero() => a.clone(),
        _ => a * b,
    }
}

fn gcd(mut a: i64, mut b: i64) -> i64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}
