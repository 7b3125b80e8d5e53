//! Term classification.
//!
//! Each term is classified once before dispatch so that strategies can be
//! selected with a `match` rather than by repeated structural probing.

use syntra_core::{Expr, ExprNode, Func, Symbol};

/// Shape of a term with respect to the transform variable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExprKind {
    /// Free of the variable.
    Constant,
    /// The variable itself.
    Symbol,
    /// An unresolved signal, its derivative, or an unevaluated operator.
    Unresolved,
    /// A known function of the variable.
    Function(Func),
    /// A product involving the variable.
    Product,
    /// A power involving the variable.
    Power,
    /// A sum involving the variable.
    Sum,
}

impl ExprKind {
    /// Classifies `expr` with respect to `var`.
    #[must_use]
    pub fn of(expr: &Expr, var: &Symbol) -> Self {
        if !expr.has_symbol(var) {
            return ExprKind::Constant;
        }
        match expr.node() {
            ExprNode::Symbol(_) => ExprKind::Symbol,
            ExprNode::Add(_) => ExprKind::Sum,
            ExprNode::Mul(_) => ExprKind::Product,
            ExprNode::Pow { .. } => ExprKind::Power,
            ExprNode::Func { func, .. } => ExprKind::Function(*func),
            _ => ExprKind::Unresolved,
        }
    }
}

/// Returns true if some factor of `expr` is an unresolved signal.
#[must_use]
pub fn has_unresolved_factor(expr: &Expr) -> bool {
    expr.factors()
        .iter()
        .any(|f| f.is_undefined_function() || f.as_base_exp().0.is_undefined_function())
}
