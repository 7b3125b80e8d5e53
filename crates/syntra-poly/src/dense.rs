//! Dense univariate polynomials with expression coefficients.
//!
//! Coefficients may be exact numbers, floats or symbolic expressions free
//! of the polynomial variable. Every coefficient is kept expanded so that
//! zero tests are structural.

use syntra_core::{Expr, ExprNode, Symbol};

use crate::error::{PolyError, PolyResult};

/// A dense univariate polynomial.
///
/// Coefficients are stored in ascending degree order with no trailing
/// zeros; the zero polynomial is `[0]`.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Poly {
    coeffs: Vec<Expr>,
}

/// Brings a coefficient to expanded form and detects hidden zeros.
#[must_use]
pub fn simplify_coeff(c: &Expr) -> Expr {
    let e = c.expand();
    if e.is_number() || !matches!(e.node(), ExprNode::Add(_)) {
        return e;
    }
    let (n, _) = e.numer_denom();
    if n.expand().is_zero() {
        Expr::zero()
    } else {
        e
    }
}

impl Poly {
    /// Creates a polynomial from ascending coefficients.
    #[must_use]
    pub fn new(coeffs: Vec<Expr>) -> Self {
        let mut coeffs: Vec<Expr> = coeffs.iter().map(simplify_coeff).collect();
        while coeffs.len() > 1 && coeffs.last().is_some_and(Expr::is_zero) {
            coeffs.pop();
        }
        if coeffs.is_empty() {
            coeffs.push(Expr::zero());
        }
        Self { coeffs }
    }

    /// The zero polynomial.
    #[must_use]
    pub fn zero() -> Self {
        Self {
            coeffs: vec![Expr::zero()],
        }
    }

    /// The constant polynomial 1.
    #[must_use]
    pub fn one() -> Self {
        Self {
            coeffs: vec![Expr::one()],
        }
    }

    /// A constant polynomial.
    #[must_use]
    pub fn constant(c: Expr) -> Self {
        Self::new(vec![c])
    }

    /// The monomial `c * x^n`.
    #[must_use]
    pub fn monomial(c: Expr, n: usize) -> Self {
        let mut coeffs = vec![Expr::zero(); n + 1];
        coeffs[n] = c;
        Self::new(coeffs)
    }

    /// The linear polynomial `x - root`.
    #[must_use]
    pub fn linear_factor(root: &Expr) -> Self {
        Self::new(vec![-root, Expr::one()])
    }

    /// Reads `expr` as a polynomial in `var`.
    ///
    /// # Errors
    ///
    /// Returns [`PolyError::NotPolynomial`] if `var` occurs other than in
    /// non-negative integer powers.
    pub fn from_expr(expr: &Expr, var: &Symbol) -> PolyResult<Self> {
        let x = Expr::symbol(var);
        let not_poly = || PolyError::NotPolynomial {
            expr: expr.to_string(),
            var: var.to_string(),
        };
        if !expr.has_symbol(var) {
            return Ok(Self::constant(expr.clone()));
        }

        let mut buckets: Vec<Vec<Expr>> = Vec::new();
        for term in expr.expand().terms() {
            let mut degree = 0usize;
            let mut rest = Vec::new();
            for factor in term.factors() {
                if !factor.has_symbol(var) {
                    rest.push(factor);
                    continue;
                }
                let (base, exp) = factor.as_base_exp();
                let k = exp
                    .as_i64()
                    .filter(|k| *k > 0 && base == x)
                    .ok_or_else(not_poly)?;
                degree += usize::try_from(k).map_err(|_| not_poly())?;
            }
            if buckets.len() <= degree {
                buckets.resize(degree + 1, Vec::new());
            }
            buckets[degree].push(Expr::mul_all(rest));
        }
        Ok(Self::new(buckets.into_iter().map(Expr::add_all).collect()))
    }

    /// Converts back to an expression in `var`.
    #[must_use]
    pub fn to_expr(&self, var: &Symbol) -> Expr {
        let x = Expr::symbol(var);
        Expr::add_all(
            self.coeffs
                .iter()
                .enumerate()
                .filter(|(_, c)| !c.is_zero())
                .map(|(k, c)| c * x.powi(k as i64)),
        )
    }

    /// Degree; zero for constants including the zero polynomial.
    #[must_use]
    pub fn degree(&self) -> usize {
        self.coeffs.len() - 1
    }

    /// Returns true for the zero polynomial.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.coeffs.len() == 1 && self.coeffs[0].is_zero()
    }

    /// Leading coefficient.
    #[must_use]
    pub fn leading_coeff(&self) -> &Expr {
        &self.coeffs[self.coeffs.len() - 1]
    }

    /// Coefficient of `x^i`.
    #[must_use]
    pub fn coeff(&self, i: usize) -> Expr {
        self.coeffs.get(i).cloned().unwrap_or_else(Expr::zero)
    }

    /// All coefficients in ascending order.
    #[must_use]
    pub fn coeffs(&self) -> &[Expr] {
        &self.coeffs
    }

    /// Returns true if every coefficient is a numeric literal.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        self.coeffs.iter().all(Expr::is_number)
    }

    /// Returns true if every coefficient is an exact rational.
    #[must_use]
    pub fn is_exact(&self) -> bool {
        self.coeffs
            .iter()
            .all(|c| c.as_number().is_some_and(|n| n.is_exact()))
    }

    /// Evaluates at `x` using Horner's method.
    #[must_use]
    pub fn eval(&self, x: &Expr) -> Expr {
        let mut result = Expr::zero();
        for c in self.coeffs.iter().rev() {
            result = (result * x + c).expand();
        }
        simplify_coeff(&result)
    }

    /// Sum.
    #[must_use]
    pub fn add(&self, other: &Self) -> Self {
        let len = self.coeffs.len().max(other.coeffs.len());
        Self::new((0..len).map(|i| self.coeff(i) + other.coeff(i)).collect())
    }

    /// Negation.
    #[must_use]
    pub fn neg(&self) -> Self {
        Self::new(self.coeffs.iter().map(|c| -c).collect())
    }

    /// Difference.
    #[must_use]
    pub fn sub(&self, other: &Self) -> Self {
        self.add(&other.neg())
    }

    /// Product (schoolbook).
    #[must_use]
    pub fn mul(&self, other: &Self) -> Self {
        if self.is_zero() || other.is_zero() {
            return Self::zero();
        }
        let mut result = vec![Vec::new(); self.coeffs.len() + other.coeffs.len() - 1];
        for (i, a) in self.coeffs.iter().enumerate() {
            for (j, b) in other.coeffs.iter().enumerate() {
                result[i + j].push(a * b);
            }
        }
        Self::new(result.into_iter().map(Expr::add_all).collect())
    }

    /// Multiplies every coefficient by `c`.
    #[must_use]
    pub fn scale(&self, c: &Expr) -> Self {
        if c.is_zero() {
            return Self::zero();
        }
        Self::new(self.coeffs.iter().map(|x| x * c).collect())
    }

    /// Formal derivative.
    #[must_use]
    pub fn derivative(&self) -> Self {
        if self.degree() == 0 {
            return Self::zero();
        }
        Self::new(
            self.coeffs
                .iter()
                .enumerate()
                .skip(1)
                .map(|(i, c)| c * (i as i64))
                .collect(),
        )
    }

    /// Multiplies by `x^n`.
    #[must_use]
    pub fn shift(&self, n: usize) -> Self {
        if self.is_zero() || n == 0 {
            return self.clone();
        }
        let mut coeffs = vec![Expr::zero(); n];
        coeffs.extend(self.coeffs.iter().cloned());
        Self::new(coeffs)
    }

    /// Raises to a non-negative power by repeated squaring.
    #[must_use]
    pub fn pow(&self, n: u32) -> Self {
        let mut result = Self::one();
        let mut base = self.clone();
        let mut exp = n;
        while exp > 0 {
            if exp & 1 == 1 {
                result = result.mul(&base);
            }
            exp >>= 1;
            if exp > 0 {
                base = base.mul(&base);
            }
        }
        result
    }

    /// Long division: returns `(q, r)` with `self = q*other + r` and
    /// `deg r < deg other`.
    ///
    /// # Errors
    ///
    /// Returns [`PolyError::DivisionByZero`] if `other` is zero.
    pub fn div_rem(&self, other: &Self) -> PolyResult<(Self, Self)> {
        if other.is_zero() {
            return Err(PolyError::DivisionByZero);
        }
        let d = other.degree();
        if self.degree() < d || self.is_zero() {
            return Ok((Self::zero(), self.clone()));
        }

        let lead_inv = other.leading_coeff().recip();
        let mut rem: Vec<Expr> = self.coeffs.clone();
        let mut quot = vec![Expr::zero(); self.degree() - d + 1];

        while rem.len() > d {
            let top = rem.len() - 1;
            let q = simplify_coeff(&(&rem[top] * &lead_inv));
            let shift = top - d;
            for (i, c) in other.coeffs.iter().enumerate().take(d) {
                rem[shift + i] = simplify_coeff(&(&rem[shift + i] - &q * c));
            }
            // the leading term cancels by construction
            rem.pop();
            quot[shift] = q;
        }
        Ok((Self::new(quot), Self::new(rem)))
    }

    /// Divides every coefficient by the leading coefficient.
    #[must_use]
    pub fn make_monic(&self) -> Self {
        if self.is_zero() || self.leading_coeff().is_one() {
            return self.clone();
        }
        self.scale(&self.leading_coeff().recip())
    }

    /// Number of leading zero coefficients, i.e. the multiplicity of `x = 0`.
    #[must_use]
    pub fn zero_root_multiplicity(&self) -> usize {
        if self.is_zero() {
            return 0;
        }
        self.coeffs.iter().take_while(|c| c.is_zero()).count()
    }

    /// Removes the factor `x^k`.
    #[must_use]
    pub fn unshift(&self, k: usize) -> Self {
        Self::new(self.coeffs.iter().skip(k).cloned().collect())
    }
}

impl std::fmt::Display for Poly {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_expr(&Symbol::new("x")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s() -> Symbol {
        Symbol::new("s")
    }

    fn poly(cs: &[i64]) -> Poly {
        Poly::new(cs.iter().copied().map(Expr::int).collect())
    }

    #[test]
    fn test_from_expr_collects_powers() {
        let x = Expr::symbol(&s());
        let e = (&x + 1) * (&x + 2);
        let p = Poly::from_expr(&e, &s()).unwrap();
        assert_eq!(p, poly(&[2, 3, 1]));
    }

    #[test]
    fn test_from_expr_rejects_negative_power() {
        let x = Expr::symbol(&s());
        assert!(Poly::from_expr(&x.recip(), &s()).is_err());
        assert!(Poly::from_expr(&x.exp(), &s()).is_err());
    }

    #[test]
    fn test_symbolic_coefficients() {
        let x = Expr::symbol(&s());
        let a = Expr::sym("a");
        let p = Poly::from_expr(&(&a * &x + &a * 3), &s()).unwrap();
        assert_eq!(p.degree(), 1);
        assert_eq!(p.coeff(0), 3 * &a);
    }

    #[test]
    fn test_div_rem() {
        // (x^3 - 1) / (x - 1) = x^2 + x + 1
        let (q, r) = poly(&[-1, 0, 0, 1]).div_rem(&poly(&[-1, 1])).unwrap();
        assert_eq!(q, poly(&[1, 1, 1]));
        assert!(r.is_zero());
    }

    #[test]
    fn test_div_rem_by_constant() {
        // (x + 3) / 2 = x/2 + 3/2
        let (q, r) = poly(&[3, 1]).div_rem(&poly(&[2])).unwrap();
        assert_eq!(q, Poly::new(vec![Expr::rational(3, 2), Expr::rational(1, 2)]));
        assert!(r.is_zero());
        let (q, r) = poly(&[5]).div_rem(&poly(&[5])).unwrap();
        assert_eq!(q, Poly::one());
        assert!(r.is_zero());
    }

    #[test]
    fn test_div_rem_leaves_constant_remainder() {
        // x^2 + 1 = (x - 1)(x + 1) + 2
        let (q, r) = poly(&[1, 0, 1]).div_rem(&poly(&[-1, 1])).unwrap();
        assert_eq!(q, poly(&[1, 1]));
        assert_eq!(r, poly(&[2]));
    }

    #[test]
    fn test_mul_and_eval() {
        let p = poly(&[1, 2]).mul(&poly(&[3, 4]));
        assert_eq!(p, poly(&[3, 10, 8]));
        assert_eq!(p.eval(&Expr::int(2)), Expr::int(55));
    }

    #[test]
    fn test_eval_complex_point() {
        // s^2 + 2s + 5 vanishes at -1 + 2j
        let p = poly(&[5, 2, 1]);
        let root = Expr::int(-1) + 2 * Expr::j();
        assert!(p.eval(&root).is_zero());
    }
}
