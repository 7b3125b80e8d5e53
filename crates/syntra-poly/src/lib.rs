//! # syntra-poly
//!
//! Univariate polynomials for the syntra transform engine.
//!
//! This crate provides:
//! - Dense polynomials whose coefficients are syntra expressions
//! - Long division and exact GCD
//! - Root finding: zero and rational roots, closed forms up to degree four,
//!   and a numeric companion-matrix fallback
//!
//! ## Exactness
//!
//! Exact coefficients give exact roots whenever a closed form exists.
//! Numeric approximations are only used for numeric coefficients and are
//! always reported through [`RootWarning::Numerical`].

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_wrap)]

pub mod algorithms;
pub mod dense;
pub mod error;
pub mod roots;

#[cfg(test)]
mod proptests;

pub use dense::Poly;
pub use error::{PolyError, PolyResult};
pub use roots::{find_roots, quadratic_roots, Damping, Root, RootSet, RootWarning};
