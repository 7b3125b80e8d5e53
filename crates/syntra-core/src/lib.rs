//! # syntra-core
//!
//! Expression substrate for the syntra transform engine.
//!
//! This crate provides:
//! - Exact rational and floating point numbers
//! - Immutable, shareable expression trees with canonical constructors
//! - Expansion, common denominators, substitution and differentiation
//! - Real/imaginary splitting and complex numeric evaluation
//!
//! ## Design Principles
//!
//! - **Canonical by construction**: sums and products are flattened,
//!   folded and sorted when built, so structural equality is meaningful
//! - **Cheap sharing**: an [`Expr`] is a reference-counted pointer and
//!   clones never copy a tree
//! - **Real symbols**: `j` is the only source of imaginary parts

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]

pub mod build;
pub mod calculus;
pub mod complex;
pub mod display;
pub mod error;
pub mod eval;
pub mod expand;
pub mod expr;
pub mod number;
pub mod ops;
pub mod subs;
pub mod symbol;

#[cfg(test)]
mod proptests;

pub use error::EvalError;
pub use eval::Bindings;
pub use expr::{Expr, ExprNode, Func};
pub use number::Number;
pub use symbol::{Assumptions, Symbol};
