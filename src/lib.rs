//! `diff-recon` library crate.
//!
//! The core is two pieces:
//!
//! - [`schedule::NoiseSchedule`]: an immutable linear beta schedule with its
//!   cumulative-product coefficient tables
//! - [`noise::add_noise`]: the forward diffusion step
//!   `x_t = sqrt(ᾱ_t)·x_0 + sqrt(1-ᾱ_t)·ε` with an injected RNG
//!
//! Around it sit the image source (phantom k-space, masking, centered FFT),
//! terminal plotting, reports and exports used by the `diffrecon` binary.
//!
//! ```no_run
//! use diff_recon::domain::Signal;
//! use diff_recon::noise::add_noise;
//! use diff_recon::schedule::NoiseSchedule;
//! use rand::SeedableRng;
//!
//! let schedule = NoiseSchedule::build(1000, 1e-4, 0.02)?;
//! let x_0 = Signal::new(vec![2, 4, 4], vec![0.5_f32; 32])?;
//! let mut rng = rand::rngs::StdRng::seed_from_u64(0);
//! let (x_t, eps) = add_noise(&schedule, &x_0, &[10, 900], &mut rng)?;
//! assert_eq!(x_t.shape(), eps.shape());
//! # Ok::<(), diff_recon::error::DiffusionError>(())
//! ```

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod io;
pub mod math;
pub mod noise;
pub mod plot;
pub mod report;
pub mod schedule;
pub mod source;
