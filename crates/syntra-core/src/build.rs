//! Canonicalising constructors.
//!
//! Every compound expression is built here. The rules are deliberately
//! local and cheap: flattening, numeric folding, like-term collection,
//! exponent merging and a handful of exact function values. Anything
//! needing global rewriting (expansion, common denominators) lives in
//! [`crate::expand`].

use std::collections::BTreeMap;
use std::sync::Arc;

use num_traits::{One, Zero};

use crate::expr::{Args, Expr, ExprNode, Func, Terms};
use crate::number::Number;
use crate::symbol::Symbol;

impl Expr {
    /// Builds the canonical sum of `terms`.
    pub fn add_all<I: IntoIterator<Item = Expr>>(terms: I) -> Expr {
        let mut constant = Number::zero();
        let mut collected: BTreeMap<Expr, Number> = BTreeMap::new();
        let mut stack: Vec<Expr> = terms.into_iter().collect();

        while let Some(term) = stack.pop() {
            match term.node() {
                ExprNode::Add(inner) => stack.extend(inner.iter().cloned()),
                ExprNode::Number(n) => constant = &constant + n,
                _ => {
                    let (coeff, rest) = term.split_coeff();
                    let entry = collected.entry(rest).or_insert_with(Number::zero);
                    let updated = &*entry + &coeff;
                    *entry = updated;
                }
            }
        }

        let mut out: Vec<Expr> = collected
            .into_iter()
            .filter(|(_, coeff)| !coeff.is_zero())
            .map(|(rest, coeff)| Expr::scaled(coeff, &rest))
            .collect();

        if out.is_empty() {
            return Expr::number(constant);
        }
        if !constant.is_zero() {
            out.push(Expr::number(constant));
        }
        if out.len() == 1 {
            return out.pop().unwrap_or_else(Expr::zero);
        }
        out.sort();
        Expr::from_node(ExprNode::Add(out.into_iter().collect()))
    }

    /// Builds the canonical product of `factors`.
    pub fn mul_all<I: IntoIterator<Item = Expr>>(factors: I) -> Expr {
        let mut coeff = Number::one();
        let mut imaginary = 0u32;
        let mut exp_args: Vec<Expr> = Vec::new();
        let mut powers: BTreeMap<Expr, Vec<Expr>> = BTreeMap::new();
        let mut stack: Vec<Expr> = factors.into_iter().collect();

        while let Some(factor) = stack.pop() {
            match factor.node() {
                ExprNode::Mul(inner) => stack.extend(inner.iter().cloned()),
                ExprNode::Number(n) => coeff = &coeff * n,
                ExprNode::ImaginaryUnit => imaginary += 1,
                ExprNode::Func {
                    func: Func::Exp,
                    args,
                } => exp_args.push(args[0].clone()),
                _ => {
                    let (base, exp) = factor.as_base_exp();
                    powers.entry(base).or_default().push(exp);
                }
            }
        }

        if coeff.is_zero() {
            return Expr::number(coeff);
        }

        let mut rebuilt: Vec<Expr> = Vec::new();
        let mut needs_pass = false;

        if !exp_args.is_empty() {
            let e = Expr::add_all(exp_args).exp();
            if !e.is_one() {
                needs_pass |= e.func_arg(Func::Exp).is_none();
                rebuilt.push(e);
            }
        }

        for (base, exps) in powers {
            let p = base.pow(&Expr::add_all(exps));
            if p.is_one() {
                continue;
            }
            needs_pass |= matches!(
                p.node(),
                ExprNode::Number(_)
                    | ExprNode::Mul(_)
                    | ExprNode::ImaginaryUnit
                    | ExprNode::Func { func: Func::Exp, .. }
            );
            rebuilt.push(p);
        }

        match imaginary % 4 {
            1 => rebuilt.push(Expr::j()),
            2 => coeff = -coeff,
            3 => {
                coeff = -coeff;
                rebuilt.push(Expr::j());
            }
            _ => {}
        }

        if needs_pass {
            return Expr::mul_all(std::iter::once(Expr::number(coeff)).chain(rebuilt));
        }

        if rebuilt.is_empty() {
            return Expr::number(coeff);
        }
        if rebuilt.len() == 1 {
            let only = rebuilt.pop().unwrap_or_else(Expr::one);
            if coeff.is_one() {
                return only;
            }
            if let ExprNode::Add(terms) = only.node() {
                return Expr::add_all(
                    terms
                        .iter()
                        .map(|t| Expr::mul_all([Expr::number(coeff.clone()), t.clone()])),
                );
            }
            rebuilt.push(only);
        }

        rebuilt.sort();
        if !coeff.is_one() {
            rebuilt.insert(0, Expr::number(coeff));
        }
        Expr::from_node(ExprNode::Mul(rebuilt.into_iter().collect()))
    }

    /// `self^exp`.
    #[must_use]
    pub fn pow(&self, exp: &Expr) -> Expr {
        if exp.is_zero() || self.is_one() {
            return Expr::one();
        }
        if exp.is_one() {
            return self.clone();
        }

        match (self.node(), exp.node()) {
            (ExprNode::Number(b), ExprNode::Number(e)) => {
                if let Some(value) = b.pow_number(e) {
                    return Expr::number(value);
                }
                if b.is_negative() {
                    // (-a)^(k/2) = j^k * a^(k/2)
                    let doubled = e * &Number::integer(2);
                    let k = doubled.to_i64().or_else(|| {
                        let f = doubled.to_f64();
                        (f.fract() == 0.0 && f.abs() < 1e6).then_some(f as i64)
                    });
                    if let Some(k) = k {
                        let magnitude = Expr::number(b.abs()).pow(exp);
                        return Expr::mul_all([Expr::j().powi(k), magnitude]);
                    }
                }
            }
            (ExprNode::ImaginaryUnit, ExprNode::Number(e)) => {
                if let Some(k) = e.to_i64() {
                    return match k.rem_euclid(4) {
                        0 => Expr::one(),
                        1 => Expr::j(),
                        2 => Expr::int(-1),
                        _ => Expr::scaled(Number::integer(-1), &Expr::j()),
                    };
                }
            }
            (ExprNode::Pow { base, exp: inner }, ExprNode::Number(e)) if e.is_integer() => {
                return base.pow(&Expr::mul_all([inner.clone(), exp.clone()]));
            }
            (ExprNode::Mul(factors), ExprNode::Number(e)) if e.is_integer() => {
                return Expr::mul_all(factors.iter().map(|f| f.pow(exp)));
            }
            (
                ExprNode::Func {
                    func: Func::Exp,
                    args,
                },
                ExprNode::Number(e),
            ) if e.is_integer() => {
                return Expr::mul_all([args[0].clone(), exp.clone()]).exp();
            }
            _ => {}
        }

        Expr::from_node(ExprNode::Pow {
            base: self.clone(),
            exp: exp.clone(),
        })
    }

    /// `self^k` for an integer `k`.
    #[must_use]
    pub fn powi(&self, k: i64) -> Expr {
        self.pow(&Expr::int(k))
    }

    /// `1/self`.
    #[must_use]
    pub fn recip(&self) -> Expr {
        self.powi(-1)
    }

    /// Principal square root.
    #[must_use]
    pub fn sqrt(&self) -> Expr {
        self.pow(&Expr::rational(1, 2))
    }

    /// Splits into numeric coefficient and remaining factor.
    #[must_use]
    pub fn split_coeff(&self) -> (Number, Expr) {
        match self.node() {
            ExprNode::Number(n) => (n.clone(), Expr::one()),
            ExprNode::Mul(factors) => match factors[0].node() {
                ExprNode::Number(n) => {
                    let rest: Terms = factors[1..].iter().cloned().collect();
                    let rest = if rest.len() == 1 {
                        rest[0].clone()
                    } else {
                        Expr::from_node(ExprNode::Mul(rest))
                    };
                    (n.clone(), rest)
                }
                _ => (Number::one(), self.clone()),
            },
            _ => (Number::one(), self.clone()),
        }
    }

    /// Multiplies an already canonical non-numeric `rest` by `coeff`.
    fn scaled(coeff: Number, rest: &Expr) -> Expr {
        if coeff.is_one() {
            return rest.clone();
        }
        let mut factors: Terms = Terms::new();
        factors.push(Expr::number(coeff));
        match rest.node() {
            ExprNode::Mul(inner) => factors.extend(inner.iter().cloned()),
            _ => factors.push(rest.clone()),
        }
        Expr::from_node(ExprNode::Mul(factors))
    }

    /// Returns true if the expression carries an explicit negative sign.
    #[must_use]
    pub fn has_negative_sign(&self) -> bool {
        match self.node() {
            ExprNode::Number(n) => n.is_negative(),
            ExprNode::Mul(factors) => factors[0].is_negative_number(),
            _ => false,
        }
    }

    /// Applies a known function, evaluating trivial cases exactly.
    pub fn apply<I: IntoIterator<Item = Expr>>(func: Func, args: I) -> Expr {
        let args: Args = args.into_iter().collect();
        debug_assert_eq!(args.len(), func.arity(), "wrong arity for {}", func.name());
        if let Some(value) = simplify_func(func, &args) {
            return value;
        }
        Expr::from_node(ExprNode::Func { func, args })
    }

    /// `exp(self)`.
    #[must_use]
    pub fn exp(&self) -> Expr {
        Expr::apply(Func::Exp, [self.clone()])
    }

    /// `log(self)`.
    #[must_use]
    pub fn log(&self) -> Expr {
        Expr::apply(Func::Log, [self.clone()])
    }

    /// `sin(self)`.
    #[must_use]
    pub fn sin(&self) -> Expr {
        Expr::apply(Func::Sin, [self.clone()])
    }

    /// `cos(self)`.
    #[must_use]
    pub fn cos(&self) -> Expr {
        Expr::apply(Func::Cos, [self.clone()])
    }

    /// `abs(self)`.
    #[must_use]
    pub fn abs(&self) -> Expr {
        Expr::apply(Func::Abs, [self.clone()])
    }

    /// `sign(self)`.
    #[must_use]
    pub fn sign(&self) -> Expr {
        Expr::apply(Func::Sign, [self.clone()])
    }

    /// `atan2(y, x)`.
    #[must_use]
    pub fn atan2(y: &Expr, x: &Expr) -> Expr {
        Expr::apply(Func::Atan2, [y.clone(), x.clone()])
    }

    /// Continuous unit step `H(self)`.
    #[must_use]
    pub fn heaviside(&self) -> Expr {
        Expr::apply(Func::Heaviside, [self.clone()])
    }

    /// Dirac delta `δ(self)`.
    #[must_use]
    pub fn dirac_delta(&self) -> Expr {
        self.dirac_delta_deriv(0)
    }

    /// `k`-th derivative of the Dirac delta evaluated at `self`.
    #[must_use]
    pub fn dirac_delta_deriv(&self, k: u32) -> Expr {
        Expr::apply(Func::DiracDelta(k), [self.clone()])
    }

    /// Discrete unit step `u[self]`.
    #[must_use]
    pub fn unit_step(&self) -> Expr {
        Expr::apply(Func::UnitStep, [self.clone()])
    }

    /// Discrete unit impulse `δ[self]`.
    #[must_use]
    pub fn unit_impulse(&self) -> Expr {
        Expr::apply(Func::UnitImpulse, [self.clone()])
    }

    /// Rectangle pulse.
    #[must_use]
    pub fn rect(&self) -> Expr {
        Expr::apply(Func::Rect, [self.clone()])
    }

    /// Triangle pulse.
    #[must_use]
    pub fn tri(&self) -> Expr {
        Expr::apply(Func::Tri, [self.clone()])
    }

    /// Normalised sinc.
    #[must_use]
    pub fn sinc(&self) -> Expr {
        Expr::apply(Func::Sinc, [self.clone()])
    }

    /// Application of an unresolved signal, e.g. `x(t)`.
    pub fn undefined<I: IntoIterator<Item = Expr>>(name: &str, args: I) -> Expr {
        Expr::from_node(ExprNode::Undefined {
            name: Arc::from(name),
            args: args.into_iter().collect(),
        })
    }

    /// Unevaluated `order`-th derivative of `expr` with respect to `var`.
    #[must_use]
    pub fn derivative(expr: &Expr, var: &Symbol, order: u32) -> Expr {
        if order == 0 {
            return expr.clone();
        }
        if let ExprNode::Derivative {
            expr: inner,
            var: v,
            order: k,
        } = expr.node()
        {
            if v == var {
                return Expr::derivative(inner, var, k + order);
            }
        }
        Expr::from_node(ExprNode::Derivative {
            expr: expr.clone(),
            var: var.clone(),
            order,
        })
    }

    /// Unevaluated definite integral.
    #[must_use]
    pub fn integral(body: &Expr, var: &Symbol, lower: &Expr, upper: &Expr) -> Expr {
        Expr::from_node(ExprNode::Integral {
            body: body.clone(),
            var: var.clone(),
            lower: lower.clone(),
            upper: upper.clone(),
        })
    }

    /// Unevaluated definite sum.
    #[must_use]
    pub fn summation(body: &Expr, var: &Symbol, lower: &Expr, upper: &Expr) -> Expr {
        if body.is_zero() {
            return Expr::zero();
        }
        Expr::from_node(ExprNode::Sum {
            body: body.clone(),
            var: var.clone(),
            lower: lower.clone(),
            upper: upper.clone(),
        })
    }

    /// The equation `lhs = rhs`.
    #[must_use]
    pub fn equality(lhs: &Expr, rhs: &Expr) -> Expr {
        Expr::from_node(ExprNode::Equality {
            lhs: lhs.clone(),
            rhs: rhs.clone(),
        })
    }

    /// Positive infinity, represented as `1/0`.
    #[must_use]
    pub fn infinity() -> Expr {
        Expr::from_node(ExprNode::Pow {
            base: Expr::zero(),
            exp: Expr::int(-1),
        })
    }

    /// Rebuilds this node from new children through the canonical constructors.
    ///
    /// `children` must have the shape returned by [`Expr::children`].
    #[must_use]
    pub fn with_children(&self, children: Vec<Expr>) -> Expr {
        match self.node() {
            ExprNode::Number(_) | ExprNode::ImaginaryUnit | ExprNode::Pi | ExprNode::Symbol(_) => {
                self.clone()
            }
            ExprNode::Add(_) => Expr::add_all(children),
            ExprNode::Mul(_) => Expr::mul_all(children),
            ExprNode::Pow { .. } => children[0].pow(&children[1]),
            ExprNode::Func { func, .. } => Expr::apply(*func, children),
            ExprNode::Undefined { name, .. } => Expr::from_node(ExprNode::Undefined {
                name: name.clone(),
                args: children.into_iter().collect(),
            }),
            ExprNode::Derivative { var, order, .. } => Expr::derivative(&children[0], var, *order),
            ExprNode::Integral { var, .. } => {
                Expr::integral(&children[0], var, &children[1], &children[2])
            }
            ExprNode::Sum { var, .. } => {
                Expr::summation(&children[0], var, &children[1], &children[2])
            }
            ExprNode::Equality { .. } => Expr::equality(&children[0], &children[1]),
        }
    }

    /// Applies `f` to every child and rebuilds.
    #[must_use]
    pub fn map_children<F: FnMut(&Expr) -> Expr>(&self, mut f: F) -> Expr {
        if self.is_atom() {
            return self.clone();
        }
        let children = self.children().iter().map(&mut f).collect();
        self.with_children(children)
    }
}

/// Rational multiple of π in the argument, if the argument is exactly `r*pi`.
fn pi_multiple(arg: &Expr) -> Option<Number> {
    match arg.node() {
        ExprNode::Pi => Some(Number::one()),
        ExprNode::Mul(factors) if factors.len() == 2 => match (factors[0].node(), factors[1].node()) {
            (ExprNode::Number(n), ExprNode::Pi) if n.is_exact() => Some(n.clone()),
            _ => None,
        },
        _ => None,
    }
}

/// Rational multiple of `j*pi` in the argument.
fn imaginary_pi_multiple(arg: &Expr) -> Option<Number> {
    let (coeff, rest) = arg.split_coeff();
    if !coeff.is_exact() {
        return None;
    }
    match rest.node() {
        ExprNode::Mul(inner)
            if inner.len() == 2
                && matches!(inner[0].node(), ExprNode::ImaginaryUnit)
                && matches!(inner[1].node(), ExprNode::Pi) =>
        {
            Some(coeff)
        }
        _ => None,
    }
}

fn simplify_func(func: Func, args: &[Expr]) -> Option<Expr> {
    let arg = &args[0];
    let num = arg.as_number();

    match func {
        Func::Exp => {
            if arg.is_zero() {
                return Some(Expr::one());
            }
            if let Some(n) = num.filter(|n| !n.is_exact()) {
                return Some(Expr::float(n.to_f64().exp()));
            }
            if let Some(r) = imaginary_pi_multiple(arg) {
                // exp(j*pi*r) for integer and half-integer r
                let twice = (&r * &Number::integer(2)).to_i64()?;
                return Some(Expr::j().powi(twice));
            }
            None
        }
        Func::Log => {
            if arg.is_one() {
                return Some(Expr::zero());
            }
            if let Some(n) = num.filter(|n| !n.is_exact() && n.is_positive()) {
                return Some(Expr::float(n.to_f64().ln()));
            }
            arg.func_arg(Func::Exp).cloned()
        }
        Func::Sin => {
            if arg.is_zero() {
                return Some(Expr::zero());
            }
            if let Some(n) = num.filter(|n| !n.is_exact()) {
                return Some(Expr::float(n.to_f64().sin()));
            }
            if pi_multiple(arg).is_some_and(|r| r.is_integer()) {
                return Some(Expr::zero());
            }
            if arg.has_negative_sign() {
                return Some(-(-arg).sin());
            }
            None
        }
        Func::Cos => {
            if arg.is_zero() {
                return Some(Expr::one());
            }
            if let Some(n) = num.filter(|n| !n.is_exact()) {
                return Some(Expr::float(n.to_f64().cos()));
            }
            if let Some(k) = pi_multiple(arg).and_then(|r| r.to_i64()) {
                return Some(Expr::int(if k.rem_euclid(2) == 0 { 1 } else { -1 }));
            }
            if arg.has_negative_sign() {
                return Some((-arg).cos());
            }
            None
        }
        Func::Atan2 => atan2_exact(&args[0], &args[1]),
        Func::Abs => {
            if let Some(n) = num {
                return Some(Expr::number(n.abs()));
            }
            match arg.node() {
                ExprNode::ImaginaryUnit => Some(Expr::one()),
                ExprNode::Pi => Some(arg.clone()),
                ExprNode::Symbol(s) if s.assumptions().is_nonnegative() => Some(arg.clone()),
                _ => None,
            }
        }
        Func::Sign => num.map(|n| Expr::int(i64::from(n.signum()))),
        Func::Heaviside => match num.map(Number::signum) {
            Some(1) => Some(Expr::one()),
            Some(-1) => Some(Expr::zero()),
            _ => None,
        },
        Func::DiracDelta(_) => num.filter(|n| !n.is_zero()).map(|_| Expr::zero()),
        Func::UnitStep => num.map(|n| Expr::int(i64::from(n.signum() >= 0))),
        Func::UnitImpulse => num.map(|n| Expr::int(i64::from(n.is_zero()))),
        Func::Rect => {
            let n = num?;
            if !n.is_exact() {
                let a = n.to_f64().abs();
                return Some(Expr::float(if a < 0.5 {
                    1.0
                } else if a > 0.5 {
                    0.0
                } else {
                    0.5
                }));
            }
            match n.abs().cmp(&Number::ratio(1, 2)) {
                std::cmp::Ordering::Less => Some(Expr::one()),
                std::cmp::Ordering::Greater => Some(Expr::zero()),
                std::cmp::Ordering::Equal => None,
            }
        }
        Func::Tri => {
            let n = num?;
            if !n.is_exact() {
                return Some(Expr::float((1.0 - n.to_f64().abs()).max(0.0)));
            }
            let a = n.abs();
            if a >= Number::one() {
                Some(Expr::zero())
            } else {
                Some(Expr::number(&Number::one() - &a))
            }
        }
        Func::Sinc => {
            if arg.is_zero() {
                return Some(Expr::one());
            }
            let n = num?;
            if n.is_integer() {
                return Some(Expr::zero());
            }
            if !n.is_exact() {
                let x = std::f64::consts::PI * n.to_f64();
                return Some(Expr::float(x.sin() / x));
            }
            None
        }
    }
}

fn atan2_exact(y: &Expr, x: &Expr) -> Option<Expr> {
    let (yn, xn) = (y.as_number(), x.as_number());
    if let (Some(a), Some(b)) = (yn, xn) {
        if !a.is_exact() || !b.is_exact() {
            return Some(Expr::float(a.to_f64().atan2(b.to_f64())));
        }
    }
    let ys = yn.map(Number::signum);
    let xs = xn.map(Number::signum);
    let quarter = |k: i64| Expr::mul_all([Expr::rational(k, 4), Expr::pi()]);
    match (ys, xs) {
        (Some(0), Some(1)) => Some(Expr::zero()),
        (Some(0), Some(-1)) => Some(Expr::pi()),
        (Some(1), Some(0)) => Some(quarter(2)),
        (Some(-1), Some(0)) => Some(quarter(-2)),
        (Some(ysign), Some(xsign)) if ysign != 0 && xsign != 0 => {
            let (a, b) = (yn?.abs(), xn?.abs());
            if a != b {
                return None;
            }
            Some(match (ysign, xsign) {
                (1, 1) => quarter(1),
                (1, _) => quarter(3),
                (_, 1) => quarter(-1),
                _ => quarter(-3),
            })
        }
        (Some(0), None) => {
            // atan2(0, x) for a symbol known to be positive
            match x.node() {
                ExprNode::Symbol(s) if s.assumptions().positive => Some(Expr::zero()),
                _ => None,
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_terms_collect() {
        let x = Expr::sym("x");
        let sum = Expr::add_all([x.clone(), x.clone(), Expr::int(3), Expr::int(-3)]);
        assert_eq!(sum, Expr::mul_all([Expr::int(2), x]));
    }

    #[test]
    fn test_powers_merge() {
        let x = Expr::sym("x");
        let prod = Expr::mul_all([x.clone(), x.powi(2), x.powi(-3)]);
        assert!(prod.is_one());
    }

    #[test]
    fn test_imaginary_unit_squares() {
        let j = Expr::j();
        assert_eq!(Expr::mul_all([j.clone(), j.clone()]), Expr::int(-1));
        assert_eq!(j.powi(3), Expr::mul_all([Expr::int(-1), j]));
    }

    #[test]
    fn test_negative_square_root_is_imaginary() {
        let root = Expr::int(-16).sqrt();
        assert_eq!(root, Expr::mul_all([Expr::int(4), Expr::j()]));
    }

    #[test]
    fn test_exponentials_merge() {
        let t = Expr::sym("t");
        let prod = Expr::mul_all([t.exp(), (-&t).exp()]);
        assert!(prod.is_one());
    }

    #[test]
    fn test_coefficient_distributes_over_sum() {
        let x = Expr::sym("x");
        let sum = Expr::add_all([x.clone(), Expr::int(1)]);
        let prod = Expr::mul_all([Expr::int(2), sum]);
        assert_eq!(prod, Expr::add_all([Expr::mul_all([Expr::int(2), x]), Expr::int(2)]));
    }

    #[test]
    fn test_trig_parity() {
        let t = Expr::sym("t");
        assert_eq!((-&t).cos(), t.cos());
        assert_eq!((-&t).sin(), -t.sin());
        assert_eq!(Expr::pi().cos(), Expr::int(-1));
    }

    #[test]
    fn test_step_functions() {
        assert!(Expr::int(3).heaviside().is_one());
        assert!(Expr::int(-3).heaviside().is_zero());
        assert!(Expr::int(0).unit_step().is_one());
        assert!(Expr::int(2).unit_impulse().is_zero());
        assert!(Expr::int(1).dirac_delta().is_zero());
    }

    #[test]
    fn test_atan2_quadrants() {
        let quarter = Expr::mul_all([Expr::rational(1, 4), Expr::pi()]);
        assert_eq!(Expr::atan2(&Expr::int(1), &Expr::int(1)), quarter);
        assert_eq!(Expr::atan2(&Expr::int(0), &Expr::int(-2)), Expr::pi());
    }
}
