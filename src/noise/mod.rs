//! Forward diffusion: mixing clean signals with Gaussian noise.
//!
//! Responsibilities:
//!
//! - validate timestep indices against a schedule
//! - draw `ε` from a caller-supplied RNG
//! - apply `x_t = sqrt(ᾱ_t)·x_0 + sqrt(1-ᾱ_t)·ε` per batch element (parallel)

pub mod forward;

pub use forward::*;
