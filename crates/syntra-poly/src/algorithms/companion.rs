//! Numeric polynomial roots.
//!
//! Roots are the eigenvalues of the companion matrix, each refined by a few
//! Newton steps on the original coefficients. Tiny real or imaginary parts
//! are flushed to zero and complex roots are re-paired so that conjugates
//! are exact mirror images.
//!
//! The Schur iteration is capped. Companion matrices with all eigenvalues
//! on one circle (such as that of `x^4 + 1`) can stall it, in which case
//! the roots come from a capped Durand-Kerner iteration instead.

use nalgebra::{DMatrix, Schur};
use num_complex::Complex64;

const LEADING_ZERO_TOL: f64 = 1.0e-12;
const RESULT_ZERO_TOL: f64 = 1.0e-10;
const NEWTON_STEPS: usize = 4;
const MAX_SCHUR_ITERS: usize = 500;
const MAX_DURAND_KERNER_ITERS: usize = 1_000;
const DURAND_KERNER_TOL: f64 = 1.0e-14;
/// Residual, relative to the coefficient scale, accepted from Durand-Kerner.
const ACCEPT_TOL: f64 = 1.0e-8;

/// Numeric roots of the polynomial with ascending coefficients `coeffs`.
///
/// Returns `None` if the leading coefficient vanishes or neither the
/// eigenvalue nor the fallback iteration converges.
#[must_use]
pub fn numeric_roots(coeffs: &[Complex64]) -> Option<Vec<Complex64>> {
    let coeffs = trim_trailing_zeros(coeffs);
    if coeffs.len() <= 1 {
        return Some(Vec::new());
    }
    let degree = coeffs.len() - 1;
    let leading = coeffs[degree];
    if leading.norm() <= LEADING_ZERO_TOL {
        return None;
    }
    if degree == 1 {
        return Some(vec![canonicalize_root(-coeffs[0] / leading)]);
    }

    let mut companion = DMatrix::<Complex64>::zeros(degree, degree);
    for row in 1..degree {
        companion[(row, row - 1)] = Complex64::new(1.0, 0.0);
    }
    for column in 0..degree {
        companion[(0, column)] = -coeffs[degree - 1 - column] / leading;
    }

    let raw: Vec<Complex64> = match Schur::try_new(companion, f64::EPSILON, MAX_SCHUR_ITERS)
        .and_then(|schur| schur.eigenvalues())
    {
        Some(eigenvalues) => eigenvalues.iter().copied().collect(),
        None => {
            log::debug!("schur iteration stalled on degree {degree} companion matrix");
            durand_kerner(coeffs)?
        }
    };
    let mut roots: Vec<Complex64> = raw
        .into_iter()
        .map(|z| canonicalize_root(polish(coeffs, z)))
        .collect();

    if coeffs.iter().all(|c| c.im == 0.0) {
        pair_conjugates(&mut roots);
    }
    Some(roots)
}

fn trim_trailing_zeros(coeffs: &[Complex64]) -> &[Complex64] {
    let scale = coeffs.iter().map(|c| c.norm()).fold(0.0_f64, f64::max);
    let tol = if scale == 0.0 {
        LEADING_ZERO_TOL
    } else {
        LEADING_ZERO_TOL * scale
    };
    let end = coeffs
        .iter()
        .rposition(|c| c.norm() > tol)
        .map_or(0, |i| i + 1);
    &coeffs[..end]
}

/// Simultaneous Weierstrass iteration on the monic polynomial.
fn durand_kerner(coeffs: &[Complex64]) -> Option<Vec<Complex64>> {
    let degree = coeffs.len() - 1;
    let leading = coeffs[degree];
    let monic: Vec<Complex64> = coeffs.iter().map(|&c| c / leading).collect();
    // start on a circle of the Cauchy bound radius, off the real axis
    let radius = 1.0 + monic[..degree].iter().map(|c| c.norm()).fold(0.0_f64, f64::max);
    let mut z: Vec<Complex64> = (0..degree)
        .map(|k| {
            let angle = 0.4 + std::f64::consts::TAU * k as f64 / degree as f64;
            Complex64::from_polar(radius, angle)
        })
        .collect();

    for _ in 0..MAX_DURAND_KERNER_ITERS {
        let mut moved = 0.0_f64;
        for i in 0..degree {
            let mut den = Complex64::new(1.0, 0.0);
            for (k, &other) in z.iter().enumerate() {
                if k != i {
                    den *= z[i] - other;
                }
            }
            if den.norm() == 0.0 {
                den = Complex64::new(f64::EPSILON, 0.0);
            }
            let step = horner(&monic, z[i]).0 / den;
            if !step.is_finite() {
                return None;
            }
            z[i] -= step;
            moved = moved.max(step.norm() / (1.0 + z[i].norm()));
        }
        if moved <= DURAND_KERNER_TOL {
            break;
        }
    }

    let scale = monic.iter().map(|c| c.norm()).fold(1.0_f64, f64::max);
    let converged = z.iter().all(|&r| {
        let size = 1.0 + r.norm().powi(i32::try_from(degree).unwrap_or(i32::MAX));
        horner(&monic, r).0.norm() <= ACCEPT_TOL * scale * size
    });
    converged.then_some(z)
}

fn horner(coeffs: &[Complex64], z: Complex64) -> (Complex64, Complex64) {
    let mut value = Complex64::new(0.0, 0.0);
    let mut slope = Complex64::new(0.0, 0.0);
    for &c in coeffs.iter().rev() {
        slope = slope * z + value;
        value = value * z + c;
    }
    (value, slope)
}

fn polish(coeffs: &[Complex64], mut z: Complex64) -> Complex64 {
    for _ in 0..NEWTON_STEPS {
        let (value, slope) = horner(coeffs, z);
        if slope.norm() == 0.0 || !value.is_finite() {
            break;
        }
        let next = z - value / slope;
        if !next.is_finite() {
            break;
        }
        // keep the step only if it does not move away from a root
        if horner(coeffs, next).0.norm() > value.norm() {
            break;
        }
        z = next;
    }
    z
}

fn canonicalize_root(z: Complex64) -> Complex64 {
    if !z.re.is_finite() || !z.im.is_finite() {
        return z;
    }
    let mut real = z.re;
    let mut imag = z.im;
    let scale = 1.0 + real.abs();
    if imag.abs() <= RESULT_ZERO_TOL * scale {
        imag = 0.0;
    }
    if real.abs() <= RESULT_ZERO_TOL * (1.0 + imag.abs()) {
        real = 0.0;
    }
    Complex64::new(real, imag)
}

/// For real polynomials, replaces each lower-half-plane root by the exact
/// conjugate of its nearest upper-half-plane partner.
fn pair_conjugates(roots: &mut [Complex64]) {
    let mut used = vec![false; roots.len()];
    for i in 0..roots.len() {
        if roots[i].im <= 0.0 || used[i] {
            continue;
        }
        let target = roots[i].conj();
        let partner = (0..roots.len())
            .filter(|&k| !used[k] && k != i && roots[k].im < 0.0)
            .min_by(|&a, &b| {
                (roots[a] - target)
                    .norm()
                    .total_cmp(&(roots[b] - target).norm())
            });
        if let Some(k) = partner {
            roots[k] = target;
            used[k] = true;
            used[i] = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn real(cs: &[f64]) -> Vec<Complex64> {
        cs.iter().map(|&c| Complex64::new(c, 0.0)).collect()
    }

    #[test]
    fn test_cubic_real_roots() {
        // (x - 1)(x - 2)(x - 3)
        let mut roots = numeric_roots(&real(&[-6.0, 11.0, -6.0, 1.0])).unwrap();
        roots.sort_by(|a, b| a.re.total_cmp(&b.re));
        for (r, expected) in roots.iter().zip([1.0, 2.0, 3.0]) {
            assert!((r.re - expected).abs() < 1e-9);
            assert!(r.im.abs() < 1e-9);
        }
    }

    #[test]
    fn test_conjugates_are_exact() {
        // (x^2 + 2x + 5)(x + 7)
        let roots = numeric_roots(&real(&[35.0, 19.0, 9.0, 1.0])).unwrap();
        let upper: Vec<_> = roots.iter().filter(|r| r.im > 0.0).collect();
        let lower: Vec<_> = roots.iter().filter(|r| r.im < 0.0).collect();
        assert_eq!(upper.len(), 1);
        assert_eq!(lower.len(), 1);
        assert_eq!(upper[0].conj(), *lower[0]);
        assert!((upper[0] - Complex64::new(-1.0, 2.0)).norm() < 1e-9);
    }

    fn assert_roots_of(coeffs: &[Complex64], roots: &[Complex64]) {
        assert_eq!(roots.len(), coeffs.len() - 1);
        for &r in roots {
            assert!(horner(coeffs, r).0.norm() < 1e-9, "{r} is not a root");
        }
    }

    #[test]
    fn test_roots_on_unit_circle() {
        // x^4 + 1
        let coeffs = real(&[1.0, 0.0, 0.0, 0.0, 1.0]);
        let roots = numeric_roots(&coeffs).unwrap();
        assert_roots_of(&coeffs, &roots);
        assert_eq!(roots.iter().filter(|r| r.im > 0.0).count(), 2);
        // x^6 - 1 and x^5 + 1
        for cs in [
            [-1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0].as_slice(),
            [1.0, 0.0, 0.0, 0.0, 0.0, 1.0].as_slice(),
        ] {
            let coeffs = real(cs);
            assert_roots_of(&coeffs, &numeric_roots(&coeffs).unwrap());
        }
    }

    #[test]
    fn test_quintic() {
        // x^5 + x + 3
        let coeffs = real(&[3.0, 1.0, 0.0, 0.0, 0.0, 1.0]);
        assert_roots_of(&coeffs, &numeric_roots(&coeffs).unwrap());
    }

    #[test]
    fn test_durand_kerner_alone() {
        // (x^2 + 1)(x - 2)
        let coeffs = real(&[-2.0, 1.0, -2.0, 1.0]);
        let roots = durand_kerner(&coeffs).unwrap();
        assert_roots_of(&coeffs, &roots);
    }

    #[test]
    fn test_zero_leading_trimmed() {
        let roots = numeric_roots(&real(&[2.0, 1.0, 0.0])).unwrap();
        assert_eq!(roots.len(), 1);
        assert!((roots[0].re + 2.0).abs() < 1e-12);
    }
}
