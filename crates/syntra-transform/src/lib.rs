//! # syntra-transform
//!
//! Symbolic integral transforms built on the rational-function view.
//!
//! This crate provides:
//! - Laplace and inverse Laplace (unilateral)
//! - Fourier and inverse Fourier in ordinary frequency
//! - z-transform and inverse z-transform (unilateral)
//! - DFT, DTFT and their inverses
//! - Hilbert transform and its inverse
//!
//! Every transform runs the same [`Transformer`] pipeline: domain check,
//! constant factoring, a per-transform cache, an attempt on the whole
//! expression as a rational function and then per-term dispatch over the
//! shape of each term. A [`TransformEngine`] owns one transformer per
//! [`TransformKind`] and the rational views they share.
//!
//! ```ignore
//! use syntra_core::{Expr, Symbol};
//! use syntra_transform::{TransformEngine, TransformOptions};
//!
//! let (s, t) = (Symbol::new("s"), Symbol::new("t"));
//! let x = (Expr::symbol(&s) + 1).recip();
//! let h = TransformEngine::global()
//!     .inverse_laplace(&x, &s, &t, &TransformOptions::default())?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::many_single_char_names)]

pub mod cache;
pub mod dft;
pub mod dtft;
pub mod engine;
pub mod error;
pub mod fourier;
pub mod hilbert;
pub mod kind;
pub mod laplace;
pub mod options;
pub mod transformer;
pub mod util;
pub mod views;
pub mod ztransform;

#[cfg(test)]
mod proptests;

pub use engine::{TransformEngine, TransformKind};
pub use error::{TransformError, TransformResult};
pub use kind::ExprKind;
pub use options::TransformOptions;
pub use transformer::{Context, Partial, TransformRules, Transformer};
