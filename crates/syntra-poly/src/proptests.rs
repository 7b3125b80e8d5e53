//! Property-based tests for polynomial arithmetic and root finding.

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use syntra_core::{Expr, Symbol};

    use crate::dense::Poly;
    use crate::roots::find_roots;

    fn small_coeff() -> impl Strategy<Value = Expr> {
        (-20i64..20i64).prop_map(Expr::int)
    }

    fn small_poly() -> impl Strategy<Value = Poly> {
        proptest::collection::vec(small_coeff(), 1..=4).prop_map(Poly::new)
    }

    fn nonzero_poly() -> impl Strategy<Value = Poly> {
        small_poly().prop_filter("polynomial must be non-zero", |p| !p.is_zero())
    }

    proptest! {
        #[test]
        fn poly_mul_commutative(a in small_poly(), b in small_poly()) {
            prop_assert_eq!(a.mul(&b), b.mul(&a));
        }

        #[test]
        fn poly_distributive(a in small_poly(), b in small_poly(), c in small_poly()) {
            prop_assert_eq!(a.mul(&b.add(&c)), a.mul(&b).add(&a.mul(&c)));
        }

        #[test]
        fn poly_div_rem_reconstructs(a in small_poly(), b in nonzero_poly()) {
            let (q, r) = a.div_rem(&b).unwrap();
            prop_assert_eq!(q.mul(&b).add(&r), a);
            prop_assert!(r.is_zero() || r.degree() < b.degree());
        }

        #[test]
        fn expr_round_trip(a in small_poly()) {
            let s = Symbol::new("s");
            prop_assert_eq!(Poly::from_expr(&a.to_expr(&s), &s).unwrap(), a);
        }

        #[test]
        fn roots_from_integer_factors(r1 in -6i64..6, r2 in -6i64..6, r3 in -6i64..6) {
            // (x - r1)(x - r2)(x - r3) always has exact roots
            let p = Poly::linear_factor(&Expr::int(r1))
                .mul(&Poly::linear_factor(&Expr::int(r2)))
                .mul(&Poly::linear_factor(&Expr::int(r3)));
            let set = find_roots(&p, None);
            prop_assert_eq!(set.total_multiplicity(), 3);
            prop_assert!(set.warnings.is_empty());
            for root in &set.roots {
                prop_assert!(p.eval(&root.value).is_zero());
            }
        }
    }
}
