//! Property-based tests for transform round trips and linearity.

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use syntra_core::{Bindings, Expr, Symbol};

    use crate::engine::TransformEngine;
    use crate::options::TransformOptions;

    fn s() -> Symbol {
        Symbol::new("s")
    }

    fn t() -> Symbol {
        Symbol::new("t")
    }

    fn close_at(a: &Expr, b: &Expr, var: &str, at: f64) -> bool {
        let env = Bindings::new().with(var, at);
        match (a.eval_complex(&env), b.eval_complex(&env)) {
            (Ok(va), Ok(vb)) => (va - vb).norm() <= 1e-8 * (1.0 + vb.norm()),
            _ => false,
        }
    }

    /// `num / Π (s - p_i)`: strictly proper, with distinct negative
    /// integer poles.
    fn stable() -> impl Strategy<Value = Expr> {
        proptest::collection::btree_set(-5i64..0, 2..=3)
            .prop_flat_map(|poles| {
                let n = poles.len();
                (
                    Just(poles),
                    proptest::collection::vec(-4i64..5, 0..n - 1),
                    1i64..5,
                )
            })
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
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn laplace_round_trip(h in stable()) {
            let engine = TransformEngine::new();
            let opts = TransformOptions::default();
            let x = engine.inverse_laplace(&h, &s(), &t(), &opts).unwrap();
            let back = engine.laplace(&x, &t(), &s(), &opts).unwrap();
            for at in [0.5, 1.5, 4.0] {
                prop_assert!(close_at(&back, &h, "s", at), "{} != {}", back, h);
            }
        }

        #[test]
        fn inverse_laplace_is_linear(a in stable(), b in stable(), ca in -3i64..4, cb in -3i64..4) {
            let engine = TransformEngine::new();
            let opts = TransformOptions::default();
            let sum = ca * a.clone() + cb * b.clone();
            let whole = engine.inverse_laplace(&sum, &s(), &t(), &opts).unwrap();
            let xa = engine.inverse_laplace(&a, &s(), &t(), &opts).unwrap();
            let xb = engine.inverse_laplace(&b, &s(), &t(), &opts).unwrap();
            let parts = ca * xa + cb * xb;
            for at in [0.25, 1.0, 2.5] {
                prop_assert!(close_at(&whole, &parts, "t", at));
            }
        }

        #[test]
        fn delay_shifts_time(h in stable(), d in 1i64..4) {
            let engine = TransformEngine::new();
            let opts = TransformOptions::default();
            let sv = Expr::symbol(&s());
            let x = engine.inverse_laplace(&h, &s(), &t(), &opts).unwrap();
            let delayed = engine
                .inverse_laplace(&(&h * (-d * &sv).exp()), &s(), &t(), &opts)
                .unwrap();
            let tv = Expr::symbol(&t());
            let shifted = x.subs_symbol(&t(), &(&tv - d));
            for at in [0.5, 2.0, 5.5] {
                let expected = if at < d as f64 {
                    Expr::zero()
                } else {
                    shifted.clone()
                };
                prop_assert!(close_at(&delayed, &expected, "t", at));
            }
        }
    }
}
