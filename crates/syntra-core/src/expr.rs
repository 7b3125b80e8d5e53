//! Expression node types.
//!
//! Expressions are immutable trees shared through [`Arc`]. Nodes are only
//! ever created through the canonicalising constructors in [`crate::build`],
//! so structural equality, hashing and ordering are meaningful.

use std::fmt;
use std::sync::Arc;

use num_traits::{One, Zero};
use smallvec::SmallVec;

use crate::number::Number;
use crate::symbol::Symbol;

/// Argument list for sums and products.
pub type Terms = SmallVec<[Expr; 4]>;

/// Argument list for function applications.
pub type Args = SmallVec<[Expr; 2]>;

/// Known functions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Func {
    /// Natural exponential.
    Exp,
    /// Natural logarithm.
    Log,
    /// Sine.
    Sin,
    /// Cosine.
    Cos,
    /// Two-argument arctangent `atan2(y, x)`.
    Atan2,
    /// Absolute value.
    Abs,
    /// Sign function.
    Sign,
    /// Continuous unit step.
    Heaviside,
    /// Dirac delta and its derivatives; the payload is the derivative order.
    DiracDelta(u32),
    /// Discrete unit step `u[n]`, one for `n >= 0`.
    UnitStep,
    /// Discrete unit impulse `δ[n]`.
    UnitImpulse,
    /// Rectangle pulse of unit width centred at zero.
    Rect,
    /// Triangle pulse of half-width one.
    Tri,
    /// Normalised sinc, `sin(πx)/(πx)`.
    Sinc,
}

impl Func {
    /// Display name of the function.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Func::Exp => "exp",
            Func::Log => "log",
            Func::Sin => "sin",
            Func::Cos => "cos",
            Func::Atan2 => "atan2",
            Func::Abs => "abs",
            Func::Sign => "sign",
            Func::Heaviside => "Heaviside",
            Func::DiracDelta(_) => "DiracDelta",
            Func::UnitStep => "UnitStep",
            Func::UnitImpulse => "UnitImpulse",
            Func::Rect => "rect",
            Func::Tri => "tri",
            Func::Sinc => "sinc",
        }
    }

    /// Number of arguments the function takes.
    #[must_use]
    pub fn arity(self) -> usize {
        match self {
            Func::Atan2 => 2,
            _ => 1,
        }
    }
}

/// An expression node.
///
/// Variant order matters: derived ordering puts numbers first, which makes
/// the numeric coefficient the leading factor of every product.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ExprNode {
    // === Atoms ===
    /// Numeric literal.
    Number(Number),
    /// The imaginary unit `j`.
    ImaginaryUnit,
    /// The constant π.
    Pi,
    /// A symbolic variable.
    Symbol(Symbol),

    // === Compound Expressions ===
    /// Sum of at least two terms, at most one of which is a number.
    Add(Terms),
    /// Product of at least two factors, at most one of which is a number.
    Mul(Terms),
    /// Power `base^exp`.
    Pow {
        /// The base.
        base: Expr,
        /// The exponent.
        exp: Expr,
    },

    // === Functions ===
    /// Application of a known function.
    Func {
        /// Which function.
        func: Func,
        /// Its arguments.
        args: Args,
    },
    /// Application of an unresolved signal such as `x(t)` or `V(s)`.
    Undefined {
        /// Signal name.
        name: Arc<str>,
        /// Arguments.
        args: Args,
    },
    /// Unevaluated derivative.
    Derivative {
        /// Differentiated expression.
        expr: Expr,
        /// Variable of differentiation.
        var: Symbol,
        /// Derivative order, at least one.
        order: u32,
    },
    /// Unevaluated definite integral.
    Integral {
        /// Integrand.
        body: Expr,
        /// Integration variable.
        var: Symbol,
        /// Lower limit.
        lower: Expr,
        /// Upper limit.
        upper: Expr,
    },
    /// Unevaluated definite sum.
    Sum {
        /// Summand.
        body: Expr,
        /// Summation index.
        var: Symbol,
        /// Lower limit.
        lower: Expr,
        /// Upper limit.
        upper: Expr,
    },
    /// An equation `lhs = rhs`.
    Equality {
        /// Left-hand side.
        lhs: Expr,
        /// Right-hand side.
        rhs: Expr,
    },
}

/// An immutable, cheaply clonable expression.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Expr(Arc<ExprNode>);

impl Expr {
    /// Wraps a node without canonicalisation.
    ///
    /// Only the constructors in [`crate::build`] should call this.
    pub(crate) fn from_node(node: ExprNode) -> Self {
        Expr(Arc::new(node))
    }

    /// Returns the underlying node.
    #[must_use]
    pub fn node(&self) -> &ExprNode {
        &self.0
    }

    // === Atoms ===

    /// Creates a numeric literal.
    #[must_use]
    pub fn number(value: Number) -> Self {
        Expr::from_node(ExprNode::Number(value))
    }

    /// Creates an exact integer.
    #[must_use]
    pub fn int(value: i64) -> Self {
        Expr::number(Number::integer(value))
    }

    /// Creates the exact rational `num / den`.
    #[must_use]
    pub fn rational(num: i64, den: i64) -> Self {
        Expr::number(Number::ratio(num, den))
    }

    /// Creates a float literal.
    #[must_use]
    pub fn float(value: f64) -> Self {
        Expr::number(Number::float(value))
    }

    /// Zero.
    #[must_use]
    pub fn zero() -> Self {
        Expr::int(0)
    }

    /// One.
    #[must_use]
    pub fn one() -> Self {
        Expr::int(1)
    }

    /// The imaginary unit.
    #[must_use]
    pub fn j() -> Self {
        Expr::from_node(ExprNode::ImaginaryUnit)
    }

    /// The constant π.
    #[must_use]
    pub fn pi() -> Self {
        Expr::from_node(ExprNode::Pi)
    }

    /// Creates a symbol expression.
    #[must_use]
    pub fn symbol(symbol: &Symbol) -> Self {
        Expr::from_node(ExprNode::Symbol(symbol.clone()))
    }

    /// Creates a symbol with no assumptions.
    #[must_use]
    pub fn sym(name: &str) -> Self {
        Expr::symbol(&Symbol::new(name))
    }

    // === Queries ===

    /// Returns the number if this is a numeric literal.
    #[must_use]
    pub fn as_number(&self) -> Option<&Number> {
        match self.node() {
            ExprNode::Number(n) => Some(n),
            _ => None,
        }
    }

    /// Returns the symbol if this is a bare symbol.
    #[must_use]
    pub fn as_symbol(&self) -> Option<&Symbol> {
        match self.node() {
            ExprNode::Symbol(s) => Some(s),
            _ => None,
        }
    }

    /// Returns true for numeric literals.
    #[must_use]
    pub fn is_number(&self) -> bool {
        matches!(self.node(), ExprNode::Number(_))
    }

    /// Returns true for an exact or floating zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.as_number().is_some_and(Zero::is_zero)
    }

    /// Returns true for an exact or floating one.
    #[must_use]
    pub fn is_one(&self) -> bool {
        self.as_number().is_some_and(One::is_one)
    }

    /// Returns true for a numeric literal below zero.
    #[must_use]
    pub fn is_negative_number(&self) -> bool {
        self.as_number().is_some_and(Number::is_negative)
    }

    /// Returns the exact integer value of a numeric literal.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        self.as_number().and_then(Number::to_i64)
    }

    /// Returns the function and arguments of a known function application.
    #[must_use]
    pub fn as_func(&self) -> Option<(Func, &[Expr])> {
        match self.node() {
            ExprNode::Func { func, args } => Some((*func, args.as_slice())),
            _ => None,
        }
    }

    /// Returns the argument if this is an application of `func`.
    #[must_use]
    pub fn func_arg(&self, func: Func) -> Option<&Expr> {
        match self.as_func() {
            Some((f, args)) if f == func => args.first(),
            _ => None,
        }
    }

    /// Terms of a sum; a non-sum is a single term.
    #[must_use]
    pub fn terms(&self) -> Vec<Expr> {
        match self.node() {
            ExprNode::Add(terms) => terms.to_vec(),
            _ => vec![self.clone()],
        }
    }

    /// Factors of a product; a non-product is a single factor.
    #[must_use]
    pub fn factors(&self) -> Vec<Expr> {
        match self.node() {
            ExprNode::Mul(factors) => factors.to_vec(),
            _ => vec![self.clone()],
        }
    }

    /// Splits into `(base, exponent)`, with exponent one for non-powers.
    #[must_use]
    pub fn as_base_exp(&self) -> (Expr, Expr) {
        match self.node() {
            ExprNode::Pow { base, exp } => (base.clone(), exp.clone()),
            _ => (self.clone(), Expr::one()),
        }
    }

    /// Returns true if this node has no children.
    #[must_use]
    pub fn is_atom(&self) -> bool {
        matches!(
            self.node(),
            ExprNode::Number(_) | ExprNode::ImaginaryUnit | ExprNode::Pi | ExprNode::Symbol(_)
        )
    }

    /// Returns true for applications of unresolved signals and their derivatives.
    #[must_use]
    pub fn is_undefined_function(&self) -> bool {
        match self.node() {
            ExprNode::Undefined { .. } => true,
            ExprNode::Derivative { expr, .. } => expr.is_undefined_function(),
            _ => false,
        }
    }

    /// Returns the children of this node.
    #[must_use]
    pub fn children(&self) -> Vec<Expr> {
        match self.node() {
            ExprNode::Number(_) | ExprNode::ImaginaryUnit | ExprNode::Pi | ExprNode::Symbol(_) => {
                Vec::new()
            }
            ExprNode::Add(args) | ExprNode::Mul(args) => args.to_vec(),
            ExprNode::Pow { base, exp } => vec![base.clone(), exp.clone()],
            ExprNode::Func { args, .. } | ExprNode::Undefined { args, .. } => args.to_vec(),
            ExprNode::Derivative { expr, .. } => vec![expr.clone()],
            ExprNode::Integral {
                body, lower, upper, ..
            }
            | ExprNode::Sum {
                body, lower, upper, ..
            } => vec![body.clone(), lower.clone(), upper.clone()],
            ExprNode::Equality { lhs, rhs } => vec![lhs.clone(), rhs.clone()],
        }
    }

    /// Number of nodes in the tree.
    #[must_use]
    pub fn size(&self) -> usize {
        1 + self.children().iter().map(Expr::size).sum::<usize>()
    }
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl From<i64> for Expr {
    fn from(value: i64) -> Self {
        Expr::int(value)
    }
}

impl From<f64> for Expr {
    fn from(value: f64) -> Self {
        Expr::float(value)
    }
}

impl From<Number> for Expr {
    fn from(value: Number) -> Self {
        Expr::number(value)
    }
}

impl From<&Symbol> for Expr {
    fn from(value: &Symbol) -> Self {
        Expr::symbol(value)
    }
}

impl From<Symbol> for Expr {
    fn from(value: Symbol) -> Self {
        Expr::symbol(&value)
    }
}
