//! Per-transformer result cache.
//!
//! Results are cached before the constant factor is reapplied and before
//! the trailing unit step is attached, so `3*X(s)` and `X(s)` share an
//! entry.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use syntra_core::{Expr, Symbol};

use crate::options::TransformOptions;
use crate::transformer::Partial;

/// What a cached result depends on.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    expr: Expr,
    var: Symbol,
    conjvar: Symbol,
    options: TransformOptions,
}

impl CacheKey {
    /// Creates a key.
    #[must_use]
    pub fn new(expr: &Expr, var: &Symbol, conjvar: &Symbol, options: &TransformOptions) -> Self {
        Self {
            expr: expr.clone(),
            var: var.clone(),
            conjvar: conjvar.clone(),
            options: options.clone(),
        }
    }
}

/// Thread-safe map from [`CacheKey`] to partial results.
pub struct TransformCache {
    entries: RwLock<FxHashMap<CacheKey, Partial>>,
}

impl TransformCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(FxHashMap::default()),
        }
    }

    /// Looks up a result.
    pub fn get(&self, key: &CacheKey) -> Option<Partial> {
        self.entries.read().get(key).cloned()
    }

    /// Stores a result unless another thread got there first, and returns
    /// the stored value.
    pub fn insert(&self, key: CacheKey, value: Partial) -> Partial {
        self.entries.write().entry(key).or_insert(value).clone()
    }

    /// Number of cached results.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Drops every cached result.
    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

impl Default for TransformCache {
    fn default() -> Self {
        Self::new()
    }
}
