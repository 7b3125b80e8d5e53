//! The transform engine.
//!
//! One [`TransformEngine`] owns a [`Transformer`] per transform kind and
//! the rational-view side table they share. Transforms call back into the
//! engine for nested transforms, so caches are shared across rules.

use once_cell::sync::Lazy;
use rayon::prelude::*;
use syntra_core::{Expr, Symbol};

use crate::dft::Dft;
use crate::dtft::{Dtft, Idtft};
use crate::error::TransformResult;
use crate::fourier::{Fourier, InverseFourier};
use crate::hilbert::Hilbert;
use crate::laplace::{InverseLaplace, Laplace};
use crate::options::TransformOptions;
use crate::transformer::Transformer;
use crate::views::RationalViews;
use crate::ztransform::{InverseZTransform, ZTransform};

/// Which transform to run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransformKind {
    /// Unilateral Laplace, `t -> s`.
    Laplace,
    /// Inverse Laplace, `s -> t`.
    InverseLaplace,
    /// Bilateral Fourier, `t -> f`.
    Fourier,
    /// Inverse Fourier, `f -> t`.
    InverseFourier,
    /// Unilateral z-transform, `n -> z`.
    ZTransform,
    /// Inverse z-transform, `z -> n`.
    InverseZTransform,
    /// Discrete Fourier transform, `n -> k`.
    Dft,
    /// Inverse DFT, `k -> n`.
    Idft,
    /// Discrete-time Fourier transform, `n -> F`.
    Dtft,
    /// Inverse DTFT, `F -> n`.
    Idtft,
    /// Hilbert transform, `t -> t`.
    Hilbert,
    /// Inverse Hilbert transform.
    InverseHilbert,
}

impl TransformKind {
    /// Every kind, in declaration order.
    pub const ALL: [TransformKind; 12] = [
        TransformKind::Laplace,
        TransformKind::InverseLaplace,
        TransformKind::Fourier,
        TransformKind::InverseFourier,
        TransformKind::ZTransform,
        TransformKind::InverseZTransform,
        TransformKind::Dft,
        TransformKind::Idft,
        TransformKind::Dtft,
        TransformKind::Idtft,
        TransformKind::Hilbert,
        TransformKind::InverseHilbert,
    ];
}

static GLOBAL: Lazy<TransformEngine> = Lazy::new(TransformEngine::new);

/// All transforms plus their shared state.
pub struct TransformEngine {
    laplace: Transformer<Laplace>,
    inverse_laplace: Transformer<InverseLaplace>,
    fourier: Transformer<Fourier>,
    inverse_fourier: Transformer<InverseFourier>,
    ztransform: Transformer<ZTransform>,
    inverse_ztransform: Transformer<InverseZTransform>,
    dft: Transformer<Dft>,
    idft: Transformer<Dft>,
    dtft: Transformer<Dtft>,
    idtft: Transformer<Idtft>,
    hilbert: Transformer<Hilbert>,
    inverse_hilbert: Transformer<Hilbert>,
    views: RationalViews,
}

impl TransformEngine {
    /// Creates an engine with empty caches.
    #[must_use]
    pub fn new() -> Self {
        Self {
            laplace: Transformer::new(Laplace),
            inverse_laplace: Transformer::new(InverseLaplace),
            fourier: Transformer::new(Fourier),
            inverse_fourier: Transformer::new(InverseFourier),
            ztransform: Transformer::new(ZTransform),
            inverse_ztransform: Transformer::new(InverseZTransform),
            dft: Transformer::new(Dft::forward()),
            idft: Transformer::new(Dft::inverse()),
            dtft: Transformer::new(Dtft),
            idtft: Transformer::new(Idtft),
            hilbert: Transformer::new(Hilbert::forward()),
            inverse_hilbert: Transformer::new(Hilbert::inverse()),
            views: RationalViews::new(),
        }
    }

    /// The process-wide engine.
    pub fn global() -> &'static TransformEngine {
        &GLOBAL
    }

    /// The shared rational-view table.
    pub fn views(&self) -> &RationalViews {
        &self.views
    }

    /// Runs the transform `kind` on `expr`.
    ///
    /// # Errors
    ///
    /// See [`crate::TransformError`].
    pub fn transform(
        &self,
        kind: TransformKind,
        expr: &Expr,
        var: &Symbol,
        conjvar: &Symbol,
        options: &TransformOptions,
    ) -> TransformResult<Expr> {
        match kind {
            TransformKind::Laplace => self.laplace.transform(self, expr, var, conjvar, options),
            TransformKind::InverseLaplace => {
                self.inverse_laplace
                    .transform(self, expr, var, conjvar, options)
            }
            TransformKind::Fourier => self.fourier.transform(self, expr, var, conjvar, options),
            TransformKind::InverseFourier => {
                self.inverse_fourier
                    .transform(self, expr, var, conjvar, options)
            }
            TransformKind::ZTransform => {
                self.ztransform.transform(self, expr, var, conjvar, options)
            }
            TransformKind::InverseZTransform => {
                self.inverse_ztransform
                    .transform(self, expr, var, conjvar, options)
            }
            TransformKind::Dft => self.dft.transform(self, expr, var, conjvar, options),
            TransformKind::Idft => self.idft.transform(self, expr, var, conjvar, options),
            TransformKind::Dtft => self.dtft.transform(self, expr, var, conjvar, options),
            TransformKind::Idtft => self.idtft.transform(self, expr, var, conjvar, options),
            TransformKind::Hilbert => self.hilbert.transform(self, expr, var, conjvar, options),
            TransformKind::InverseHilbert => {
                self.inverse_hilbert
                    .transform(self, expr, var, conjvar, options)
            }
        }
    }

    /// Runs the same transform over many expressions in parallel.
    ///
    /// Results come back in input order.
    pub fn transform_batch(
        &self,
        kind: TransformKind,
        exprs: &[Expr],
        var: &Symbol,
        conjvar: &Symbol,
        options: &TransformOptions,
    ) -> Vec<TransformResult<Expr>> {
        exprs
            .par_iter()
            .map(|e| self.transform(kind, e, var, conjvar, options))
            .collect()
    }

    // === Named entry points ===

    /// Unilateral Laplace transform.
    ///
    /// # Errors
    ///
    /// See [`crate::TransformError`].
    pub fn laplace(
        &self,
        expr: &Expr,
        t: &Symbol,
        s: &Symbol,
        options: &TransformOptions,
    ) -> TransformResult<Expr> {
        self.transform(TransformKind::Laplace, expr, t, s, options)
    }

    /// Inverse Laplace transform.
    ///
    /// # Errors
    ///
    /// See [`crate::TransformError`].
    pub fn inverse_laplace(
        &self,
        expr: &Expr,
        s: &Symbol,
        t: &Symbol,
        options: &TransformOptions,
    ) -> TransformResult<Expr> {
        self.transform(TransformKind::InverseLaplace, expr, s, t, options)
    }

    /// Fourier transform.
    ///
    /// # Errors
    ///
    /// See [`crate::TransformError`].
    pub fn fourier(
        &self,
        expr: &Expr,
        t: &Symbol,
        f: &Symbol,
        options: &TransformOptions,
    ) -> TransformResult<Expr> {
        self.transform(TransformKind::Fourier, expr, t, f, options)
    }

    /// Inverse Fourier transform.
    ///
    /// # Errors
    ///
    /// See [`crate::TransformError`].
    pub fn inverse_fourier(
        &self,
        expr: &Expr,
        f: &Symbol,
        t: &Symbol,
        options: &TransformOptions,
    ) -> TransformResult<Expr> {
        self.transform(TransformKind::InverseFourier, expr, f, t, options)
    }

    /// Unilateral z-transform.
    ///
    /// # Errors
    ///
    /// See [`crate::TransformError`].
    pub fn ztransform(
        &self,
        expr: &Expr,
        n: &Symbol,
        z: &Symbol,
        options: &TransformOptions,
    ) -> TransformResult<Expr> {
        self.transform(TransformKind::ZTransform, expr, n, z, options)
    }

    /// Inverse z-transform.
    ///
    /// # Errors
    ///
    /// See [`crate::TransformError`].
    pub fn inverse_ztransform(
        &self,
        expr: &Expr,
        z: &Symbol,
        n: &Symbol,
        options: &TransformOptions,
    ) -> TransformResult<Expr> {
        self.transform(TransformKind::InverseZTransform, expr, z, n, options)
    }

    /// Discrete Fourier transform of length `options.dft_length`.
    ///
    /// # Errors
    ///
    /// See [`crate::TransformError`].
    pub fn dft(
        &self,
        expr: &Expr,
        n: &Symbol,
        k: &Symbol,
        options: &TransformOptions,
    ) -> TransformResult<Expr> {
        self.transform(TransformKind::Dft, expr, n, k, options)
    }

    /// Inverse discrete Fourier transform.
    ///
    /// # Errors
    ///
    /// See [`crate::TransformError`].
    pub fn idft(
        &self,
        expr: &Expr,
        k: &Symbol,
        n: &Symbol,
        options: &TransformOptions,
    ) -> TransformResult<Expr> {
        self.transform(TransformKind::Idft, expr, k, n, options)
    }

    /// Discrete-time Fourier transform in normalised frequency.
    ///
    /// # Errors
    ///
    /// See [`crate::TransformError`].
    pub fn dtft(
        &self,
        expr: &Expr,
        n: &Symbol,
        f: &Symbol,
        options: &TransformOptions,
    ) -> TransformResult<Expr> {
        self.transform(TransformKind::Dtft, expr, n, f, options)
    }

    /// Inverse discrete-time Fourier transform.
    ///
    /// # Errors
    ///
    /// See [`crate::TransformError`].
    pub fn idtft(
        &self,
        expr: &Expr,
        f: &Symbol,
        n: &Symbol,
        options: &TransformOptions,
    ) -> TransformResult<Expr> {
        self.transform(TransformKind::Idtft, expr, f, n, options)
    }

    /// Hilbert transform.
    ///
    /// # Errors
    ///
    /// See [`crate::TransformError`].
    pub fn hilbert(
        &self,
        expr: &Expr,
        t: &Symbol,
        options: &TransformOptions,
    ) -> TransformResult<Expr> {
        self.transform(TransformKind::Hilbert, expr, t, t, options)
    }

    /// Inverse Hilbert transform.
    ///
    /// # Errors
    ///
    /// See [`crate::TransformError`].
    pub fn inverse_hilbert(
        &self,
        expr: &Expr,
        t: &Symbol,
        options: &TransformOptions,
    ) -> TransformResult<Expr> {
        self.transform(TransformKind::InverseHilbert, expr, t, t, options)
    }

    // === Cache management ===

    /// Number of cached results for `kind`.
    #[must_use]
    pub fn cache_len(&self, kind: TransformKind) -> usize {
        match kind {
            TransformKind::Laplace => self.laplace.cache_len(),
            TransformKind::InverseLaplace => self.inverse_laplace.cache_len(),
            TransformKind::Fourier => self.fourier.cache_len(),
            TransformKind::InverseFourier => self.inverse_fourier.cache_len(),
            TransformKind::ZTransform => self.ztransform.cache_len(),
            TransformKind::InverseZTransform => self.inverse_ztransform.cache_len(),
            TransformKind::Dft => self.dft.cache_len(),
            TransformKind::Idft => self.idft.cache_len(),
            TransformKind::Dtft => self.dtft.cache_len(),
            TransformKind::Idtft => self.idtft.cache_len(),
            TransformKind::Hilbert => self.hilbert.cache_len(),
            TransformKind::InverseHilbert => self.inverse_hilbert.cache_len(),
        }
    }

    /// Drops every cached result and rational view.
    pub fn clear_caches(&self) {
        self.laplace.clear_cache();
        self.inverse_laplace.clear_cache();
        self.fourier.clear_cache();
        self.inverse_fourier.clear_cache();
        self.ztransform.clear_cache();
        self.inverse_ztransform.clear_cache();
        self.dft.clear_cache();
        self.idft.clear_cache();
        self.dtft.clear_cache();
        self.idtft.clear_cache();
        self.hilbert.clear_cache();
        self.inverse_hilbert.clear_cache();
        self.views.clear();
    }
}

impl Default for TransformEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_is_used_and_cleared() {
        let engine = TransformEngine::new();
        let s = Symbol::new("s");
        let t = Symbol::new("t");
        let h = Expr::one() / (Expr::symbol(&s) + 1);
        let opts = TransformOptions::default();

        let first = engine.inverse_laplace(&h, &s, &t, &opts).unwrap();
        assert!(engine.cache_len(TransformKind::InverseLaplace) > 0);
        let second = engine.inverse_laplace(&h, &s, &t, &opts).unwrap();
        assert_eq!(first, second);

        engine.clear_caches();
        assert_eq!(engine.cache_len(TransformKind::InverseLaplace), 0);
        assert!(engine.views().is_empty());
    }

    #[test]
    fn test_batch_preserves_order() {
        let engine = TransformEngine::new();
        let s = Symbol::new("s");
        let t = Symbol::new("t");
        let x = Expr::symbol(&s);
        let exprs: Vec<Expr> = (1..=4).map(|a| Expr::one() / (&x + a)).collect();
        let opts = TransformOptions::default().with_causal(true);
        let results = engine.transform_batch(TransformKind::InverseLaplace, &exprs, &s, &t, &opts);
        for (a, r) in (1..=4).zip(results) {
            assert_eq!(r.unwrap(), (-a * Expr::symbol(&t)).exp());
        }
    }
}
