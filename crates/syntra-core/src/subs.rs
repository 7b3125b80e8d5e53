//! Substitution and structural queries.

use std::collections::BTreeSet;

use hashbrown::HashMap;

use crate::expr::{Expr, ExprNode, Func};
use crate::symbol::Symbol;

impl Expr {
    /// Replaces every occurrence of `old` with `new`.
    #[must_use]
    pub fn subs(&self, old: &Expr, new: &Expr) -> Expr {
        self.subs_many(&[(old.clone(), new.clone())])
    }

    /// Replaces every occurrence of `var` with `value`.
    #[must_use]
    pub fn subs_symbol(&self, var: &Symbol, value: &Expr) -> Expr {
        self.subs(&Expr::symbol(var), value)
    }

    /// Simultaneous substitution. Shared subtrees are rewritten once.
    #[must_use]
    pub fn subs_many(&self, pairs: &[(Expr, Expr)]) -> Expr {
        let mut memo: HashMap<Expr, Expr> = HashMap::new();
        subs_rec(self, pairs, &mut memo)
    }

    /// Top-down rewrite: `f` either replaces a node or lets the walk descend.
    #[must_use]
    pub fn rewrite<F: FnMut(&Expr) -> Option<Expr>>(&self, f: &mut F) -> Expr {
        if let Some(replacement) = f(self) {
            return replacement;
        }
        if self.is_atom() {
            return self.clone();
        }
        let children = self.children().iter().map(|c| c.rewrite(f)).collect();
        self.with_children(children)
    }

    /// Returns true if `needle` occurs anywhere in the tree.
    #[must_use]
    pub fn has(&self, needle: &Expr) -> bool {
        self == needle || self.children().iter().any(|c| c.has(needle))
    }

    /// Returns true if the free symbol `var` occurs in the tree.
    #[must_use]
    pub fn has_symbol(&self, var: &Symbol) -> bool {
        match self.node() {
            ExprNode::Symbol(s) => s == var,
            ExprNode::Integral { var: bound, .. } | ExprNode::Sum { var: bound, .. }
                if bound == var =>
            {
                let children = self.children();
                children[1].has_symbol(var) || children[2].has_symbol(var)
            }
            _ => self.children().iter().any(|c| c.has_symbol(var)),
        }
    }

    /// Returns true if any node satisfies `pred`.
    #[must_use]
    pub fn any<P: Fn(&Expr) -> bool + Copy>(&self, pred: P) -> bool {
        pred(self) || self.children().iter().any(|c| c.any(pred))
    }

    /// Returns true if the known function `func` is applied anywhere.
    #[must_use]
    pub fn has_func(&self, func: Func) -> bool {
        self.any(|e| e.as_func().is_some_and(|(f, _)| f == func))
    }

    /// Returns true if an unresolved signal or unevaluated operator occurs.
    #[must_use]
    pub fn has_unevaluated(&self) -> bool {
        self.any(|e| {
            matches!(
                e.node(),
                ExprNode::Undefined { .. }
                    | ExprNode::Derivative { .. }
                    | ExprNode::Integral { .. }
                    | ExprNode::Sum { .. }
            )
        })
    }

    /// Free symbols in the tree. Bound integration and summation indices are excluded.
    #[must_use]
    pub fn free_symbols(&self) -> BTreeSet<Symbol> {
        let mut out = BTreeSet::new();
        collect_symbols(self, &mut out);
        out
    }

    /// Collects every node satisfying `pred`, outermost first.
    #[must_use]
    pub fn find_all<P: Fn(&Expr) -> bool + Copy>(&self, pred: P) -> Vec<Expr> {
        let mut out = Vec::new();
        find_rec(self, pred, &mut out);
        out
    }
}

fn subs_rec(e: &Expr, pairs: &[(Expr, Expr)], memo: &mut HashMap<Expr, Expr>) -> Expr {
    if let Some((_, new)) = pairs.iter().find(|(old, _)| old == e) {
        return new.clone();
    }
    if e.is_atom() {
        return e.clone();
    }
    if let Some(done) = memo.get(e) {
        return done.clone();
    }
    let children = e.children().iter().map(|c| subs_rec(c, pairs, memo)).collect();
    let rebuilt = e.with_children(children);
    memo.insert(e.clone(), rebuilt.clone());
    rebuilt
}

fn collect_symbols(e: &Expr, out: &mut BTreeSet<Symbol>) {
    match e.node() {
        ExprNode::Symbol(s) => {
            out.insert(s.clone());
        }
        ExprNode::Integral {
            body,
            var,
            lower,
            upper,
        }
        | ExprNode::Sum {
            body,
            var,
            lower,
            upper,
        } => {
            let mut inner = BTreeSet::new();
            collect_symbols(body, &mut inner);
            inner.remove(var);
            out.extend(inner);
            collect_symbols(lower, out);
            collect_symbols(upper, out);
        }
        _ => {
            for child in e.children() {
                collect_symbols(&child, out);
            }
        }
    }
}

fn find_rec<P: Fn(&Expr) -> bool + Copy>(e: &Expr, pred: P, out: &mut Vec<Expr>) {
    if pred(e) {
        if !out.contains(e) {
            out.push(e.clone());
        }
        return;
    }
    for child in e.children() {
        find_rec(&child, pred, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subs_recanonicalises() {
        let x = Expr::sym("x");
        let y = Expr::sym("y");
        let e = &x + &y;
        assert_eq!(e.subs(&y, &x), 2 * &x);
        assert!(e.subs(&y, &-&x).is_zero());
    }

    #[test]
    fn test_free_symbols_skip_bound_index() {
        let n = Symbol::integer("n");
        let k = Symbol::integer("k");
        let body = Expr::symbol(&k) * Expr::sym("a");
        let sum = Expr::summation(&body, &k, &Expr::zero(), &Expr::symbol(&n));
        let free = sum.free_symbols();
        assert!(free.contains(&n));
        assert!(!free.contains(&k));
        assert!(!sum.has_symbol(&k));
    }

    #[test]
    fn test_has_func() {
        let t = Expr::sym("t");
        assert!((t.exp() * t.heaviside()).has_func(Func::Heaviside));
        assert!(!t.exp().has_func(Func::Sin));
    }
}
