//! Shared rational-function views.
//!
//! Building a [`RationalFunction`] runs a decomposition, and its root
//! searches are memoised inside the view, so transforms look views up
//! here instead of building their own. Entries are interned: the map
//! gives an index into a vector of views that are never removed short of
//! [`RationalViews::clear`].

use std::sync::Arc;

use hashbrown::HashMap;
use parking_lot::RwLock;
use syntra_core::{Expr, Symbol};
use syntra_ratfun::{RationalFunction, RationalResult};

#[derive(Default)]
struct Interned {
    index: HashMap<(Expr, Symbol), u32>,
    views: Vec<Arc<RationalFunction>>,
}

/// Side table from `(expression, variable)` to its rational view.
#[derive(Default)]
pub struct RationalViews {
    inner: RwLock<Interned>,
}

impl RationalViews {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the view of `expr` in `var`, building it on first use.
    ///
    /// Failed decompositions are not remembered.
    ///
    /// # Errors
    ///
    /// Propagates the decomposition error.
    pub fn get_or_build(&self, expr: &Expr, var: &Symbol) -> RationalResult<Arc<RationalFunction>> {
        let key = (expr.clone(), var.clone());
        {
            let inner = self.inner.read();
            if let Some(&i) = inner.index.get(&key) {
                return Ok(Arc::clone(&inner.views[i as usize]));
            }
        }

        let view = Arc::new(RationalFunction::new(expr, var)?);
        let mut inner = self.inner.write();
        if let Some(&i) = inner.index.get(&key) {
            return Ok(Arc::clone(&inner.views[i as usize]));
        }
        let i = u32::try_from(inner.views.len()).unwrap_or(u32::MAX);
        if i == u32::MAX {
            return Ok(view);
        }
        inner.views.push(Arc::clone(&view));
        inner.index.insert(key, i);
        Ok(view)
    }

    /// Number of stored views.
    pub fn len(&self) -> usize {
        self.inner.read().views.len()
    }

    /// Returns true if no view is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every view.
    pub fn clear(&self) {
        let mut inner = self.inner.write();
        inner.index.clear();
        inner.views.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_views_are_shared() {
        let views = RationalViews::new();
        let s = Symbol::new("s");
        let e = Expr::one() / (Expr::symbol(&s) + 1);
        let a = views.get_or_build(&e, &s).unwrap();
        let b = views.get_or_build(&e, &s).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(views.len(), 1);
    }

    #[test]
    fn test_failures_not_stored() {
        let views = RationalViews::new();
        let s = Symbol::new("s");
        assert!(views.get_or_build(&Expr::symbol(&s).sin(), &s).is_err());
        assert!(views.is_empty());
    }
}
