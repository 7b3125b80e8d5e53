//! # Syntra
//!
//! Symbolic signal transforms with pole-residue analysis.
//!
//! Syntra turns rational functions of one variable into their poles,
//! zeros, residues and presentation forms, and uses that machinery to
//! compute transform pairs symbolically.
//!
//! ## Features
//!
//! - **Rational functions**: `B/A * exp(-delay*x) * undef` decomposition,
//!   exact roots where a closed form exists
//! - **Presentation forms**: canonical, general, zero-pole-gain,
//!   time-constant and partial fractions
//! - **Transforms**: Laplace, Fourier, z, DFT, DTFT and Hilbert, each with
//!   its inverse, behind one cached pipeline
//! - **Batches**: many expressions transformed in parallel
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use syntra::prelude::*;
//!
//! let (s, t) = (Symbol::new("s"), Symbol::new("t"));
//! let h = (Expr::symbol(&s) + 1).recip();
//! let x = syntra::inverse_laplace(&h, &s, &t, &TransformOptions::default())?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub use syntra_core as core;
pub use syntra_poly as poly;
pub use syntra_ratfun as ratfun;
pub use syntra_transform as transform;

use syntra_core::{Expr, Symbol};
use syntra_transform::{TransformEngine, TransformResult};

pub use syntra_transform::TransformOptions;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use syntra_core::{Bindings, Expr, Func, Symbol};
    pub use syntra_poly::{Damping, Poly};
    pub use syntra_ratfun::{Method, Pole, Qrpo, RationalFunction};
    pub use syntra_transform::{
        TransformEngine, TransformError, TransformKind, TransformOptions, TransformResult,
    };
}

macro_rules! transform_fn {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        ///
        /// Runs on the process-wide engine, so results are cached across
        /// calls.
        ///
        /// # Errors
        ///
        /// See [`syntra_transform::TransformError`].
        pub fn $name(
            expr: &Expr,
            var: &Symbol,
            conjvar: &Symbol,
            options: &TransformOptions,
        ) -> TransformResult<Expr> {
            TransformEngine::global().$name(expr, var, conjvar, options)
        }
    };
}

transform_fn!(
    /// Unilateral Laplace transform, `t -> s`.
    laplace
);
transform_fn!(
    /// Inverse Laplace transform, `s -> t`.
    inverse_laplace
);
transform_fn!(
    /// Fourier transform in ordinary frequency, `t -> f`.
    fourier
);
transform_fn!(
    /// Inverse Fourier transform, `f -> t`.
    inverse_fourier
);
transform_fn!(
    /// Unilateral z-transform, `n -> z`.
    ztransform
);
transform_fn!(
    /// Inverse z-transform, `z -> n`.
    inverse_ztransform
);
transform_fn!(
    /// Discrete Fourier transform, `n -> k`; needs a DFT length.
    dft
);
transform_fn!(
    /// Inverse DFT, `k -> n`; needs a DFT length.
    idft
);
transform_fn!(
    /// Discrete-time Fourier transform, `n -> F`.
    dtft
);
transform_fn!(
    /// Inverse DTFT, `F -> n`.
    idtft
);

/// Hilbert transform in `t`.
///
/// # Errors
///
/// See [`syntra_transform::TransformError`].
pub fn hilbert(expr: &Expr, t: &Symbol, options: &TransformOptions) -> TransformResult<Expr> {
    TransformEngine::global().hilbert(expr, t, options)
}

/// Inverse Hilbert transform in `t`.
///
/// # Errors
///
/// See [`syntra_transform::TransformError`].
pub fn inverse_hilbert(
    expr: &Expr,
    t: &Symbol,
    options: &TransformOptions,
) -> TransformResult<Expr> {
    TransformEngine::global().inverse_hilbert(expr, t, options)
}
