//! Property-based tests for decomposition and partial fractions.

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use syntra_core::{Bindings, Expr, Symbol};

    use crate::partial_fractions::Method;
    use crate::rational_func::RationalFunction;

    fn s() -> Symbol {
        Symbol::new("s")
    }

    fn close(a: &Expr, b: &Expr, at: f64) -> bool {
        let env = Bindings::new().with("s", at);
        match (a.eval_complex(&env), b.eval_complex(&env)) {
            (Ok(va), Ok(vb)) => (va - vb).norm() <= 1e-8 * (1.0 + vb.norm()),
            _ => false,
        }
    }

    /// `num / Π (s - p_i)` with distinct integer poles kept away from the
    /// sample points and a numerator that never vanishes.
    fn rational() -> impl Strategy<Value = Expr> {
        (
            proptest::collection::btree_set(-6i64..0, 1..=3),
            proptest::collection::vec(-5i64..5, 0..=2),
            1i64..5,
        )
            .prop_map(|(poles, lower, lead)| {
                let x = Expr::symbol(&s());
                let numer: Expr = lower
                    .iter()
                    .chain(std::iter::once(&lead))
                    .enumerate()
                    .map(|(k, &c)| c * x.powi(k as i64))
                    .sum();
                let denom: Expr = poles.iter().map(|&p| &x - Expr::int(p)).product();
                numer / denom
            })
    }

    proptest! {
        #[test]
        fn decomposition_reconstructs(e in rational(), delay in 0i64..4) {
            let x = Expr::symbol(&s());
            let e = e * (-delay * x).exp();
            let rf = RationalFunction::new(&e, &s()).unwrap();
            let (b, a, t, undef) = rf.decompose();
            let rebuilt = rf.reattach(&b / &a);
            prop_assert_eq!(t, Expr::int(delay));
            prop_assert!(undef.is_one());
            prop_assert!(close(&rebuilt, &e, 0.37));
        }

        #[test]
        fn partfrac_preserves_value(e in rational()) {
            let rf = RationalFunction::new(&e, &s()).unwrap();
            let pf = rf.partfrac(true, None, Method::Sub).unwrap();
            for at in [0.5, 1.25, 3.0] {
                prop_assert!(close(&pf, &e, at));
            }
        }

        #[test]
        fn residue_methods_agree(e in rational()) {
            let rf = RationalFunction::new(&e, &s()).unwrap();
            let sub = rf.as_qrpo(None, Method::Sub).unwrap();
            let ec = rf.as_qrpo(None, Method::Ec).unwrap();
            prop_assert_eq!(sub.quotient, ec.quotient);
            prop_assert_eq!(sub.residues, ec.residues);
        }

        #[test]
        fn partfrac_idempotent(e in rational()) {
            let rf = RationalFunction::new(&e, &s()).unwrap();
            let once = rf.partfrac(true, None, Method::Sub).unwrap();
            let again = RationalFunction::new(&once, &s())
                .unwrap()
                .partfrac(true, None, Method::Sub)
                .unwrap();
            prop_assert!(close(&once, &again, 0.8));
        }
    }
}
