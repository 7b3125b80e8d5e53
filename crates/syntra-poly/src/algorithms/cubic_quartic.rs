//! Closed-form roots of cubics and quartics.
//!
//! Cubics go through the depressed form `y^3 + p y + q` and Cardano's
//! formula, switching to the trigonometric form when a real cubic has
//! three real roots. Quartics are reduced to `y^4 + p y^2 + q y + r` and
//! split into two quadratics with Ferrari's resolvent.
//!
//! Square and cube roots of symbol-free radicands are taken so that a
//! real radicand gives a real root; the complex structure of the result
//! then matches its numeric value.

use num_complex::Complex64;
use syntra_core::{Bindings, Expr};

use crate::dense::{simplify_coeff, Poly};
use crate::roots::find_roots;

/// Relative size below which a numeric imaginary part counts as zero.
const REAL_TOL: f64 = 1.0e-12;

/// Roots of a cubic, repeated by multiplicity.
///
/// Returns `None` for floating point coefficients, which are left to the
/// numeric solver.
#[must_use]
pub fn cubic_roots(poly: &Poly) -> Option<Vec<Expr>> {
    if poly.degree() != 3 || has_float(poly) {
        return None;
    }
    let lead = poly.coeff(3);
    let b = simplify_coeff(&(poly.coeff(2) / &lead));
    let c = simplify_coeff(&(poly.coeff(1) / &lead));
    let d = simplify_coeff(&(poly.coeff(0) / &lead));

    // x = y - b/3
    let shift = simplify_coeff(&(&b / 3));
    let p = simplify_coeff(&(&c - b.powi(2) / 3));
    let q = simplify_coeff(&(2 * b.powi(3) / 27 - &b * &c / 3 + &d));
    let depressed = depressed_cubic(&p, &q);
    Some(
        depressed
            .into_iter()
            .map(|y| simplify_coeff(&(y - &shift)))
            .collect(),
    )
}

/// Roots of a quartic, repeated by multiplicity.
///
/// Returns `None` for floating point coefficients, or if the resolvent
/// cubic yields no usable root.
#[must_use]
pub fn quartic_roots(poly: &Poly) -> Option<Vec<Expr>> {
    if poly.degree() != 4 || has_float(poly) {
        return None;
    }
    let lead = poly.coeff(4);
    let a = simplify_coeff(&(poly.coeff(3) / &lead));
    let b = simplify_coeff(&(poly.coeff(2) / &lead));
    let c = simplify_coeff(&(poly.coeff(1) / &lead));
    let d = simplify_coeff(&(poly.coeff(0) / &lead));

    // x = y - a/4
    let shift = simplify_coeff(&(&a / 4));
    let p = simplify_coeff(&(&b - 3 * a.powi(2) / 8));
    let q = simplify_coeff(&(&c - &a * &b / 2 + a.powi(3) / 8));
    let r = simplify_coeff(
        &(&d - &a * &c / 4 + a.powi(2) * &b / 16 - 3 * a.powi(4) / 256),
    );

    let depressed = if q.is_zero() {
        // biquadratic: y^2 = z with z^2 + p z + r = 0
        let mut out = Vec::with_capacity(4);
        for z in monic_quadratic(&p, &r) {
            let w = sqrt_of(&z);
            out.push(simplify_coeff(&-&w));
            out.push(w);
        }
        out
    } else if r.is_zero() {
        let mut out = vec![Expr::zero()];
        out.extend(depressed_cubic(&p, &q));
        out
    } else {
        ferrari(&p, &q, &r)?
    };
    Some(
        depressed
            .into_iter()
            .map(|y| simplify_coeff(&(y - &shift)))
            .collect(),
    )
}

/// Roots of `y^3 + p y + q`.
fn depressed_cubic(p: &Expr, q: &Expr) -> Vec<Expr> {
    if q.is_zero() {
        // y (y^2 + p)
        let w = sqrt_of(&simplify_coeff(&-p));
        return vec![Expr::zero(), simplify_coeff(&-&w), w];
    }
    let (xi, xi_bar) = cube_roots_of_unity();
    if p.is_zero() {
        let u = cbrt_of(&simplify_coeff(&-q));
        return vec![
            u.clone(),
            simplify_coeff(&(&xi * &u)),
            simplify_coeff(&(&xi_bar * &u)),
        ];
    }

    let disc = simplify_coeff(&(q.powi(2) / 4 + p.powi(3) / 27));
    if disc.is_zero() {
        // a double root
        let single = simplify_coeff(&(3 * q / p));
        let double = simplify_coeff(&(-3 * q / (2 * p)));
        return vec![single, double.clone(), double];
    }
    if is_real_valued(p) && is_real_valued(q) && real_sign(&disc) == Some(-1) {
        return trigonometric_cubic(p, q);
    }

    let half_q = simplify_coeff(&(q / 2));
    let w = sqrt_of(&disc);
    let mut radicand = simplify_coeff(&(-&half_q + &w));
    if numeric(&radicand).is_some_and(|z| z.norm() <= REAL_TOL) {
        radicand = simplify_coeff(&(-&half_q - &w));
    }
    let u = cbrt_of(&radicand);
    let v = simplify_coeff(&(-p / (3 * &u)));
    vec![
        simplify_coeff(&(&u + &v)),
        simplify_coeff(&(&xi * &u + &xi_bar * &v)),
        simplify_coeff(&(&xi_bar * &u + &xi * &v)),
    ]
}

/// Three real roots `2 sqrt(-p/3) cos(θ/3 - 2πk/3)` of a real cubic.
fn trigonometric_cubic(p: &Expr, q: &Expr) -> Vec<Expr> {
    let scale = 2 * simplify_coeff(&(-p / 3)).sqrt();
    // cos θ = (3q / 2p) sqrt(-3/p)
    let cos_theta =
        simplify_coeff(&(3 * q / (2 * p))) * simplify_coeff(&(Expr::int(-3) / p)).sqrt();
    let sin_theta = simplify_coeff(&(1 - cos_theta.powi(2))).sqrt();
    let third = Expr::atan2(&sin_theta, &cos_theta) / 3;
    (0..3_i64)
        .map(|k| {
            let angle = &third - Expr::rational(2 * k, 3) * Expr::pi();
            simplify_coeff(&(&scale * angle.cos()))
        })
        .collect()
}

/// Roots `y` of `y^4 + p y^2 + q y + r` with `q` and `r` non-zero.
///
/// For a resolvent root `m`, the quartic is the difference of the squares
/// `(y^2 + p/2 + m)^2` and `2m (y - q/4m)^2`.
fn ferrari(p: &Expr, q: &Expr, r: &Expr) -> Option<Vec<Expr>> {
    let resolvent = Poly::new(vec![
        -q.powi(2),
        2 * p.powi(2) - 8 * r,
        8 * p,
        Expr::int(8),
    ]);
    let candidates: Vec<Expr> = find_roots(&resolvent, None)
        .roots
        .into_iter()
        .map(|root| root.value)
        .filter(|m| !m.is_zero())
        .collect();
    // a real cubic ending in -q^2 always has a positive real root
    let m = candidates
        .iter()
        .filter_map(|m| numeric(m).map(|z| (m, z)))
        .filter(|(_, z)| z.re > 0.0 && z.im.abs() <= REAL_TOL * (1.0 + z.re))
        .max_by(|a, b| a.1.re.total_cmp(&b.1.re))
        .map(|(m, _)| m.clone())
        .or_else(|| candidates.first().cloned())?;

    let s = sqrt_of(&simplify_coeff(&(2 * &m)));
    let base = simplify_coeff(&(p / 2 + &m));
    let skew = simplify_coeff(&(q / (2 * &s)));
    let mut out = Vec::with_capacity(4);
    for sigma in [1_i64, -1] {
        // y^2 - σ s y + (p/2 + m + σ q / 2s)
        let b = simplify_coeff(&(-sigma * &s));
        let c = simplify_coeff(&(&base + sigma * &skew));
        out.extend(monic_quadratic(&b, &c));
    }
    Some(out)
}

/// Roots of `y^2 + b y + c`.
fn monic_quadratic(b: &Expr, c: &Expr) -> Vec<Expr> {
    let disc = simplify_coeff(&(b.powi(2) - 4 * c));
    let w = sqrt_of(&disc);
    vec![
        simplify_coeff(&((-b + &w) / 2)),
        simplify_coeff(&((-b - &w) / 2)),
    ]
}

/// `(-1 + j sqrt 3)/2` and its conjugate.
fn cube_roots_of_unity() -> (Expr, Expr) {
    let im = Expr::j() * Expr::int(3).sqrt() / 2;
    let re = Expr::rational(-1, 2);
    (&re + &im, re - im)
}

/// A square root of `z`.
///
/// Symbol-free radicands get the principal root written as `x + j y`
/// with real `x` and `y`.
fn sqrt_of(z: &Expr) -> Expr {
    if z.is_zero() {
        return Expr::zero();
    }
    if !z.free_symbols().is_empty() {
        return z.sqrt();
    }
    let (re, im) = z.re_im();
    let (re, im) = (simplify_coeff(&re), simplify_coeff(&im));
    if im.is_zero() {
        return match real_sign(&re) {
            Some(-1) => simplify_coeff(&(Expr::j() * simplify_coeff(&-&re).sqrt())),
            _ => re.sqrt(),
        };
    }
    let modulus = simplify_coeff(&(re.powi(2) + im.powi(2))).sqrt();
    let x = simplify_coeff(&((&modulus + &re) / 2)).sqrt();
    let y = simplify_coeff(&((&modulus - &re) / 2)).sqrt();
    let y = match real_sign(&im) {
        Some(-1) => -y,
        _ => y,
    };
    simplify_coeff(&(x + Expr::j() * y))
}

/// A cube root of `z`, real whenever `z` is real and symbol-free.
fn cbrt_of(z: &Expr) -> Expr {
    let third = Expr::rational(1, 3);
    if z.is_zero() {
        return Expr::zero();
    }
    if z.free_symbols().is_empty() && is_real_valued(z) && real_sign(z) == Some(-1) {
        return simplify_coeff(&-simplify_coeff(&-z).pow(&third));
    }
    z.pow(&third)
}

fn has_float(poly: &Poly) -> bool {
    poly.coeffs()
        .iter()
        .any(|c| c.any(|e| e.as_number().is_some_and(|n| !n.is_exact())))
}

fn numeric(e: &Expr) -> Option<Complex64> {
    if !e.free_symbols().is_empty() {
        return None;
    }
    e.eval_complex(&Bindings::new()).ok()
}

fn is_real_valued(e: &Expr) -> bool {
    e.im().expand().is_zero()
}

/// Sign of the real part of a symbol-free expression.
fn real_sign(e: &Expr) -> Option<i8> {
    if let Some(n) = e.as_number() {
        return Some(n.signum());
    }
    let z = numeric(e)?;
    if z.re.abs() <= REAL_TOL * (1.0 + z.im.abs()) {
        return Some(0);
    }
    Some(if z.re < 0.0 { -1 } else { 1 })
}
