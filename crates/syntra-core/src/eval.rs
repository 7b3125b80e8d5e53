//! Numeric evaluation.

use std::f64::consts::PI;

use num_complex::Complex64;
use rustc_hash::FxHashMap;

use crate::error::EvalError;
use crate::expr::{Expr, ExprNode, Func};
use crate::symbol::Symbol;

/// Largest number of terms evaluated for a finite sum.
const MAX_SUM_TERMS: i64 = 100_000;

/// Relative tolerance for treating a complex value as real.
const REAL_TOLERANCE: f64 = 1e-9;

/// Numeric values for free symbols, keyed by name.
#[derive(Clone, Debug, Default)]
pub struct Bindings {
    values: FxHashMap<String, Complex64>,
}

impl Bindings {
    /// Creates an empty set of bindings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a binding, builder style.
    #[must_use]
    pub fn with(mut self, name: &str, value: impl Into<Complex64>) -> Self {
        self.set(name, value);
        self
    }

    /// Adds or replaces a binding.
    pub fn set(&mut self, name: &str, value: impl Into<Complex64>) {
        self.values.insert(name.to_owned(), value.into());
    }

    /// Looks up a binding.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Complex64> {
        self.values.get(name).copied()
    }
}

impl Expr {
    /// Evaluates to a complex number.
    ///
    /// `Heaviside(0)` evaluates to one half. Distributions evaluate to zero
    /// away from their support and fail at it.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError`] for unbound symbols, unresolved signals,
    /// unevaluated integrals and singular values.
    pub fn eval_complex(&self, bindings: &Bindings) -> Result<Complex64, EvalError> {
        let value = match self.node() {
            ExprNode::Number(n) => Complex64::new(n.to_f64(), 0.0),
            ExprNode::ImaginaryUnit => Complex64::i(),
            ExprNode::Pi => Complex64::new(PI, 0.0),
            ExprNode::Symbol(s) => bindings
                .get(s.name())
                .ok_or_else(|| EvalError::UnboundSymbol(s.name().to_owned()))?,
            ExprNode::Add(terms) => {
                let mut acc = Complex64::new(0.0, 0.0);
                for t in terms {
                    acc += t.eval_complex(bindings)?;
                }
                acc
            }
            ExprNode::Mul(factors) => {
                let mut acc = Complex64::new(1.0, 0.0);
                for f in factors {
                    acc *= f.eval_complex(bindings)?;
                }
                acc
            }
            ExprNode::Pow { base, exp } => {
                let b = base.eval_complex(bindings)?;
                eval_pow(self, b, exp, bindings)?
            }
            ExprNode::Func { func, args } => {
                let mut values = Vec::with_capacity(args.len());
                for a in args {
                    values.push(a.eval_complex(bindings)?);
                }
                eval_func(self, *func, &values)?
            }
            ExprNode::Undefined { name, .. } => {
                return Err(EvalError::UnresolvedFunction(name.to_string()))
            }
            ExprNode::Sum {
                body,
                var,
                lower,
                upper,
            } => eval_sum(body, var, lower, upper, bindings)?,
            ExprNode::Derivative { .. } | ExprNode::Integral { .. } | ExprNode::Equality { .. } => {
                return Err(EvalError::Unsupported(self.to_string()))
            }
        };
        if value.re.is_finite() && value.im.is_finite() {
            Ok(value)
        } else {
            Err(EvalError::Singular(self.to_string()))
        }
    }

    /// Evaluates to a real number.
    ///
    /// # Errors
    ///
    /// As [`Expr::eval_complex`], plus [`EvalError::NotReal`] when the
    /// imaginary part is not negligible.
    pub fn eval_f64(&self, bindings: &Bindings) -> Result<f64, EvalError> {
        let z = self.eval_complex(bindings)?;
        if z.im.abs() <= REAL_TOLERANCE * (1.0 + z.re.abs()) {
            Ok(z.re)
        } else {
            Err(EvalError::NotReal { re: z.re, im: z.im })
        }
    }
}

fn eval_pow(whole: &Expr, b: Complex64, exp: &Expr, bindings: &Bindings) -> Result<Complex64, EvalError> {
    if let Some(k) = exp.as_i64() {
        if b == Complex64::new(0.0, 0.0) && k < 0 {
            return Err(EvalError::Singular(whole.to_string()));
        }
        if let Ok(k) = i32::try_from(k) {
            return Ok(b.powi(k));
        }
    }
    let e = exp.eval_complex(bindings)?;
    if b == Complex64::new(0.0, 0.0) {
        return if e.re > 0.0 {
            Ok(Complex64::new(0.0, 0.0))
        } else {
            Err(EvalError::Singular(whole.to_string()))
        };
    }
    if b.im == 0.0 && b.re > 0.0 && e.im == 0.0 {
        return Ok(Complex64::new(b.re.powf(e.re), 0.0));
    }
    Ok(b.powc(e))
}

fn eval_func(whole: &Expr, func: Func, v: &[Complex64]) -> Result<Complex64, EvalError> {
    let z = v[0];
    let real = |x: f64| Complex64::new(x, 0.0);
    Ok(match func {
        Func::Exp => z.exp(),
        Func::Log => {
            if z == real(0.0) {
                return Err(EvalError::Singular(whole.to_string()));
            }
            z.ln()
        }
        Func::Sin => z.sin(),
        Func::Cos => z.cos(),
        Func::Atan2 => real(v[0].re.atan2(v[1].re)),
        Func::Abs => real(z.norm()),
        Func::Sign => real(if z.re == 0.0 { 0.0 } else { z.re.signum() }),
        Func::Heaviside => real(if z.re > 0.0 {
            1.0
        } else if z.re < 0.0 {
            0.0
        } else {
            0.5
        }),
        Func::DiracDelta(_) => {
            if z.re == 0.0 {
                return Err(EvalError::Singular(whole.to_string()));
            }
            real(0.0)
        }
        Func::UnitStep => real(if z.re >= 0.0 { 1.0 } else { 0.0 }),
        Func::UnitImpulse => real(if z.re == 0.0 { 1.0 } else { 0.0 }),
        Func::Rect => {
            let a = z.re.abs();
            real(if a < 0.5 {
                1.0
            } else if a > 0.5 {
                0.0
            } else {
                0.5
            })
        }
        Func::Tri => real((1.0 - z.re.abs()).max(0.0)),
        Func::Sinc => {
            if z == real(0.0) {
                real(1.0)
            } else {
                let x = z * PI;
                x.sin() / x
            }
        }
    })
}

fn eval_sum(
    body: &Expr,
    var: &Symbol,
    lower: &Expr,
    upper: &Expr,
    bindings: &Bindings,
) -> Result<Complex64, EvalError> {
    let bound = |e: &Expr| -> Result<i64, EvalError> {
        let v = e.eval_f64(bindings)?;
        if v.fract() != 0.0 || v.abs() > 1e15 {
            return Err(EvalError::Unsupported(format!("sum limit {e}")));
        }
        Ok(v as i64)
    };
    let (lo, hi) = (bound(lower)?, bound(upper)?);
    if hi.saturating_sub(lo) > MAX_SUM_TERMS {
        return Err(EvalError::Unsupported(format!("sum over {lo}..={hi}")));
    }
    let mut local = bindings.clone();
    let mut acc = Complex64::new(0.0, 0.0);
    for k in lo..=hi {
        local.set(var.name(), k as f64);
        acc += body.eval_complex(&local)?;
    }
    Ok(acc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eval_polynomial() {
        let x = Expr::sym("x");
        let e = x.powi(2) + 3 * &x + 1;
        let v = e.eval_f64(&Bindings::new().with("x", 2.0)).unwrap();
        assert!((v - 11.0).abs() < 1e-12);
    }

    #[test]
    fn test_eval_complex_exponential() {
        let e = (Expr::j() * Expr::pi()).exp();
        assert_eq!(e, Expr::int(-1));
        let w = Expr::sym("w");
        let z = (Expr::j() * &w).exp().eval_complex(&Bindings::new().with("w", PI / 2.0)).unwrap();
        assert!((z - Complex64::i()).norm() < 1e-12);
    }

    #[test]
    fn test_unbound_symbol() {
        let err = Expr::sym("q").eval_f64(&Bindings::new()).unwrap_err();
        assert_eq!(err, EvalError::UnboundSymbol("q".into()));
    }

    #[test]
    fn test_heaviside_half_at_zero() {
        let t = Expr::sym("t");
        let v = t.heaviside().eval_f64(&Bindings::new().with("t", 0.0)).unwrap();
        assert!((v - 0.5).abs() < 1e-15);
    }

    #[test]
    fn test_finite_sum() {
        let k = Symbol::integer("k");
        let sum = Expr::summation(&Expr::symbol(&k), &k, &Expr::int(1), &Expr::int(10));
        assert!((sum.eval_f64(&Bindings::new()).unwrap() - 55.0).abs() < 1e-12);
    }
}
