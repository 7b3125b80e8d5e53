//! Polynomial roots, exact where possible.
//!
//! The search runs in stages: roots at zero are peeled off, exact
//! rational roots are found and deflated, and the rest is split into
//! square-free factors. Each factor of degree four or less is solved in
//! closed form. Anything left over is either approximated numerically,
//! for numeric coefficients, or reported as unsolved.

use num_complex::Complex64;
use syntra_core::{Bindings, Expr};

use crate::algorithms::companion::numeric_roots;
use crate::algorithms::cubic_quartic::{cubic_roots, quartic_roots};
use crate::algorithms::gcd::squarefree;
use crate::algorithms::rational_roots::rational_roots;
use crate::dense::{simplify_coeff, Poly};

/// Damping hint for quadratic factors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Damping {
    /// Complex pair written as `σ ± jω`.
    Under,
    /// Repeated real root.
    Critical,
    /// Distinct roots `(-b ± sqrt(disc))/2a`.
    Over,
}

/// A root with its multiplicity.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Root {
    /// The root value.
    pub value: Expr,
    /// Multiplicity, at least one.
    pub multiplicity: usize,
}

/// Non-fatal shortfalls of the root search.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum RootWarning {
    /// Some roots are floating point approximations.
    Numerical {
        /// Degree of the factor solved numerically.
        degree: usize,
    },
    /// Roots of a symbolic factor could not be found.
    Incomplete {
        /// Degree of the unsolved factor.
        remaining_degree: usize,
    },
}

impl std::fmt::Display for RootWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RootWarning::Numerical { degree } => {
                write!(f, "roots of a degree {degree} factor approximated numerically")
            }
            RootWarning::Incomplete { remaining_degree } => {
                write!(f, "unable to find roots of a degree {remaining_degree} symbolic factor")
            }
        }
    }
}

/// Roots found for a polynomial, with any warnings raised on the way.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RootSet {
    /// Distinct roots with multiplicities, in discovery order.
    pub roots: Vec<Root>,
    /// Warnings raised during the search.
    pub warnings: Vec<RootWarning>,
}

impl RootSet {
    /// Adds `value` with multiplicity `n`, merging structurally equal roots.
    pub fn push(&mut self, value: Expr, n: usize) {
        if n == 0 {
            return;
        }
        match self.roots.iter_mut().find(|r| r.value == value) {
            Some(root) => root.multiplicity += n,
            None => self.roots.push(Root {
                value,
                multiplicity: n,
            }),
        }
    }

    /// Merges another set, scaling its multiplicities by `times`.
    pub fn extend_scaled(&mut self, other: RootSet, times: usize) {
        for root in other.roots {
            self.push(root.value, root.multiplicity * times);
        }
        for warning in other.warnings {
            if !self.warnings.contains(&warning) {
                self.warnings.push(warning);
            }
        }
    }

    /// Total number of roots counted with multiplicity.
    #[must_use]
    pub fn total_multiplicity(&self) -> usize {
        self.roots.iter().map(|r| r.multiplicity).sum()
    }
}

/// Finds the roots of `poly`.
///
/// Failures never abort the search; they show up as [`RootWarning`]s.
#[must_use]
pub fn find_roots(poly: &Poly, damping: Option<Damping>) -> RootSet {
    let mut set = RootSet::default();
    if poly.is_zero() || poly.degree() == 0 {
        return set;
    }

    let zeros = poly.zero_root_multiplicity();
    set.push(Expr::zero(), zeros);
    let mut rest = poly.unshift(zeros);

    if rest.is_exact() {
        let (rational, deflated) = rational_roots(&rest);
        for r in rational {
            set.push(Expr::number(r), 1);
        }
        rest = deflated;
    }

    for (factor, times) in squarefree(&rest) {
        set.extend_scaled(solve_squarefree(&factor, damping), times);
    }
    set
}

/// Roots of a factor with no rational roots left to peel off.
///
/// Degrees up to four are solved in closed form; numeric coefficients of
/// higher degree (or floating point cubics and quartics) go to the
/// companion matrix.
fn solve_squarefree(p: &Poly, damping: Option<Damping>) -> RootSet {
    let mut set = RootSet::default();
    let closed = match p.degree() {
        0 => Some(Vec::new()),
        1 => Some(vec![linear_root(p)]),
        2 => Some(quadratic_roots(&p.coeff(2), &p.coeff(1), &p.coeff(0), damping)),
        3 => cubic_roots(p),
        4 => quartic_roots(p),
        _ => None,
    };
    if let Some(roots) = closed {
        for r in roots {
            set.push(r, 1);
        }
        return set;
    }

    let d = p.degree();
    if let Some(values) = numeric_coefficients(p) {
        log::warn!("approximating roots of degree {d} polynomial numerically");
        set.warnings.push(RootWarning::Numerical { degree: d });
        match numeric_roots(&values) {
            Some(roots) => {
                for z in roots {
                    set.push(complex_to_expr(z), 1);
                }
            }
            None => {
                log::warn!("numeric root search failed for degree {d} polynomial");
                set.warnings.push(RootWarning::Incomplete { remaining_degree: d });
            }
        }
    } else {
        log::warn!("unable to find roots of degree {d} symbolic polynomial");
        set.warnings.push(RootWarning::Incomplete { remaining_degree: d });
    }
    set
}

fn linear_root(p: &Poly) -> Expr {
    simplify_coeff(&(-p.coeff(0) / p.coeff(1)))
}

/// Roots of `a x^2 + b x + c`.
#[must_use]
pub fn quadratic_roots(a: &Expr, b: &Expr, c: &Expr, damping: Option<Damping>) -> Vec<Expr> {
    let two_a = 2 * a;
    let sigma = simplify_coeff(&(-b / &two_a));
    let disc = (b.powi(2) - 4 * a * c).expand();

    let damping = damping.or_else(|| {
        disc.as_number().map(|d| match d.signum() {
            0 => Damping::Critical,
            s if s < 0 => Damping::Under,
            _ => Damping::Over,
        })
    });

    match damping {
        Some(Damping::Critical) => vec![sigma.clone(), sigma],
        Some(Damping::Under) => {
            let omega = simplify_coeff(&((-&disc).expand().sqrt() / &two_a));
            let jw = Expr::j() * omega;
            vec![
                simplify_coeff(&(&sigma + &jw)),
                simplify_coeff(&(&sigma - &jw)),
            ]
        }
        Some(Damping::Over) | None => {
            let root = disc.sqrt();
            vec![
                simplify_coeff(&((-b + &root) / &two_a)),
                simplify_coeff(&((-b - &root) / &two_a)),
            ]
        }
    }
}

fn numeric_coefficients(p: &Poly) -> Option<Vec<Complex64>> {
    if p.coeffs().iter().any(|c| !c.free_symbols().is_empty()) {
        return None;
    }
    let bindings = Bindings::new();
    p.coeffs().iter().map(|c| c.eval_complex(&bindings).ok()).collect()
}

fn complex_to_expr(z: Complex64) -> Expr {
    if z.im == 0.0 {
        Expr::float(z.re)
    } else {
        Expr::float(z.re) + Expr::float(z.im) * Expr::j()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syntra_core::Symbol;

    fn poly(cs: &[i64]) -> Poly {
        Poly::new(cs.iter().copied().map(Expr::int).collect())
    }

    #[test]
    fn test_zero_and_rational_roots() {
        // s^2 (s + 1)
        let set = find_roots(&poly(&[0, 0, 1, 1]), None);
        assert_eq!(set.roots[0], Root { value: Expr::zero(), multiplicity: 2 });
        assert_eq!(set.roots[1], Root { value: Expr::int(-1), multiplicity: 1 });
        assert!(set.warnings.is_empty());
    }

    #[test]
    fn test_complex_pair() {
        // s^2 + 2s + 5
        let set = find_roots(&poly(&[5, 2, 1]), None);
        let values: Vec<_> = set.roots.iter().map(|r| r.value.clone()).collect();
        assert!(values.contains(&(Expr::int(-1) + 2 * Expr::j())));
        assert!(values.contains(&(Expr::int(-1) - 2 * Expr::j())));
    }

    #[test]
    fn test_critical_damping_doubles_root() {
        let set = find_roots(&poly(&[1, 2, 1]), Some(Damping::Critical));
        assert_eq!(set.roots, vec![Root { value: Expr::int(-1), multiplicity: 2 }]);
    }

    #[test]
    fn test_symbolic_quadratic() {
        let s = Symbol::new("s");
        let a = Expr::sym("a");
        let x = Expr::symbol(&s);
        let p = Poly::from_expr(&(&x * &x + &a * &x), &s).unwrap();
        let set = find_roots(&p, None);
        assert_eq!(set.total_multiplicity(), 2);
        assert!(set.roots.iter().any(|r| r.value == -&a));
    }

    fn assert_all_roots(p: &Poly, set: &RootSet, env: &Bindings) {
        assert_eq!(set.total_multiplicity(), p.degree());
        for r in &set.roots {
            let z = r.value.eval_complex(env).unwrap();
            let value = p
                .coeffs()
                .iter()
                .rev()
                .fold(Complex64::new(0.0, 0.0), |acc, c| acc * z + c.eval_complex(env).unwrap());
            assert!(value.norm() < 1e-8, "{} is not a root of {p}", r.value);
        }
    }

    #[test]
    fn test_irreducible_cubic_is_exact() {
        // s^3 + 2s + 1 has no rational roots
        let p = poly(&[1, 2, 0, 1]);
        let set = find_roots(&p, None);
        assert!(set.warnings.is_empty());
        assert_all_roots(&p, &set, &Bindings::new());
        let has_float = |e: &Expr| e.as_number().is_some_and(|n| !n.is_exact());
        assert!(set.roots.iter().all(|r| !r.value.any(has_float)));
    }

    #[test]
    fn test_symbolic_cubic() {
        let s = Symbol::new("s");
        let x = Expr::symbol(&s);
        let p = Poly::from_expr(&(x.powi(3) + Expr::sym("a") * &x + 1), &s).unwrap();
        let set = find_roots(&p, None);
        assert!(set.warnings.is_empty());
        assert_all_roots(&p, &set, &Bindings::new().with("a", 2.0));
    }

    #[test]
    fn test_symbolic_quintic_incomplete() {
        let s = Symbol::new("s");
        let x = Expr::symbol(&s);
        let p = Poly::from_expr(&(x.powi(5) + Expr::sym("a") * &x + 1), &s).unwrap();
        let set = find_roots(&p, None);
        assert!(set.roots.is_empty());
        assert_eq!(set.warnings, vec![RootWarning::Incomplete { remaining_degree: 5 }]);
    }

    #[test]
    fn test_quartic_closed_forms() {
        // s^4 + 1 has four complex roots on the unit circle
        let p = poly(&[1, 0, 0, 0, 1]);
        let set = find_roots(&p, None);
        assert!(set.warnings.is_empty());
        assert_all_roots(&p, &set, &Bindings::new());
        // s^4 + s + 1 needs the resolvent cubic
        let p = poly(&[1, 1, 0, 0, 1]);
        let set = find_roots(&p, None);
        assert!(set.warnings.is_empty());
        assert_all_roots(&p, &set, &Bindings::new());
    }

    #[test]
    fn test_repeated_irreducible_factor() {
        // (s^2 + s + 1)^2 (s + 3)
        let base = poly(&[1, 1, 1]);
        let p = base.mul(&base).mul(&poly(&[3, 1]));
        let set = find_roots(&p, None);
        assert_eq!(set.roots.len(), 3);
        assert!(set.roots.iter().filter(|r| r.multiplicity == 2).count() == 2);
        assert_all_roots(&p, &set, &Bindings::new());
    }

    #[test]
    fn test_numeric_quintic_warns() {
        // s^5 + s + 3 has no rational roots
        let p = poly(&[3, 1, 0, 0, 0, 1]);
        let set = find_roots(&p, None);
        assert_eq!(set.warnings, vec![RootWarning::Numerical { degree: 5 }]);
        assert_all_roots(&p, &set, &Bindings::new());
    }

    #[test]
    fn test_float_quartic_goes_numeric() {
        // 1.5 s^4 + 0.5
        let p = Poly::new(vec![
            Expr::float(0.5),
            Expr::zero(),
            Expr::zero(),
            Expr::zero(),
            Expr::float(1.5),
        ]);
        let set = find_roots(&p, None);
        assert_eq!(set.warnings, vec![RootWarning::Numerical { degree: 4 }]);
        assert_all_roots(&p, &set, &Bindings::new());
    }

    #[test]
    fn test_biquadratic() {
        // s^4 - 5s^2 + 4 = (s^2 - 1)(s^2 - 4), all rational
        let set = find_roots(&poly(&[4, 0, -5, 0, 1]), None);
        assert_eq!(set.total_multiplicity(), 4);
        // s^4 - 4s^2 + 1 needs the inner quadratic
        let set = find_roots(&poly(&[1, 0, -4, 0, 1]), None);
        assert_eq!(set.total_multiplicity(), 4);
        assert!(set.warnings.is_empty());
    }
}
