//! Bilateral Fourier transform in ordinary frequency and its inverse.
//!
//! `X(f) = ∫ x(t) exp(-j 2π f t) dt`.

mod forward;
mod inverse;

pub use forward::Fourier;
pub use inverse::InverseFourier;
