//! Unilateral Laplace transform and its inverse.

mod forward;
mod inverse;

pub use forward::Laplace;
pub use inverse::InverseLaplace;
