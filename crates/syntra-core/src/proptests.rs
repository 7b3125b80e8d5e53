//! Property-based tests for canonical construction.

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use crate::eval::Bindings;
    use crate::expr::Expr;

    // Small integer-coefficient polynomials in x, built through the operators
    fn small_poly() -> impl Strategy<Value = Expr> {
        proptest::collection::vec(-20i64..20i64, 1..=4).prop_map(|coeffs| {
            let x = Expr::sym("x");
            coeffs
                .iter()
                .enumerate()
                .map(|(k, c)| Expr::int(*c) * x.powi(k as i64))
                .sum()
        })
    }

    fn at(e: &Expr, x: f64) -> f64 {
        e.eval_f64(&Bindings::new().with("x", x)).unwrap_or(f64::NAN)
    }

    proptest! {
        #[test]
        fn add_commutative(a in small_poly(), b in small_poly()) {
            prop_assert_eq!(&a + &b, &b + &a);
        }

        #[test]
        fn mul_commutative(a in small_poly(), b in small_poly()) {
            prop_assert_eq!(&a * &b, &b * &a);
        }

        #[test]
        fn sub_self_is_zero(a in small_poly()) {
            prop_assert!((&a - &a).is_zero());
        }

        #[test]
        fn expand_preserves_value(a in small_poly(), b in small_poly(), x in -3.0f64..3.0) {
            let prod = &a * &b;
            let lhs = at(&prod, x);
            let rhs = at(&prod.expand(), x);
            prop_assert!((lhs - rhs).abs() <= 1e-6 * (1.0 + lhs.abs()));
        }

        #[test]
        fn expand_is_idempotent(a in small_poly(), b in small_poly()) {
            let once = (&a * &b).expand();
            prop_assert_eq!(once.expand(), once);
        }

        #[test]
        fn together_preserves_value(a in small_poly(), b in small_poly(), x in 0.5f64..3.0) {
            let xe = Expr::sym("x");
            let e = &a / (&xe + 4) + &b / &xe;
            let (n, d) = e.numer_denom();
            let lhs = at(&e, x);
            let rhs = at(&n, x) / at(&d, x);
            prop_assert!((lhs - rhs).abs() <= 1e-6 * (1.0 + lhs.abs()));
        }
    }
}
