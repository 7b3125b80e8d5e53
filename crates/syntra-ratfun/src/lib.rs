//! # syntra-ratfun
//!
//! Rational-function analysis for the syntra transform engine.
//!
//! This crate provides:
//! - [`RationalFunction`], the view `(B/A) * exp(-delay*x) * undef`
//! - Poles and zeros with multiplicities, exact where possible
//! - Residues and the quotient/residue/pole/order split ([`Qrpo`])
//! - Presentation forms: canonical, general, standard, time-constant,
//!   zero-pole-gain and partial fractions
//!
//! Root sets are computed on first use and cached inside the view, so a
//! single [`RationalFunction`] can be queried repeatedly at no extra cost.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::many_single_char_names)]

pub mod error;
mod forms;
pub mod linsolve;
pub mod partial_fractions;
pub mod pole;
mod rational_func;
mod residue;
pub mod simplify;

#[cfg(test)]
mod proptests;

pub use error::{RationalError, RationalResult};
pub use partial_fractions::{Method, Qrpo};
pub use pole::Pole;
pub use rational_func::RationalFunction;
