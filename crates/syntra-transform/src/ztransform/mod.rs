//! Unilateral z-transform and its inverse.

mod forward;
mod inverse;

pub use forward::ZTransform;
pub use inverse::InverseZTransform;
