//! Polynomial algorithms.
//!
//! This module contains:
//! - Euclidean GCD and square-free decomposition over exact rationals
//! - Rational root search with repeated deflation
//! - Cardano and Ferrari closed forms for cubics and quartics
//! - Numeric roots from the companion matrix, polished by Newton steps

pub mod companion;
pub mod cubic_quartic;
pub mod gcd;
pub mod rational_roots;
