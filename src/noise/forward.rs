//! The forward noiser.
//!
//! All randomness comes in through an explicit `rng` argument. There is no
//! process-wide generator, so a fixed seed reproduces `(x_t, ε)` bit for bit,
//! and concurrent callers can each own an independent stream.

use rand::Rng;
use rayon::prelude::*;
use tracing::debug;

use crate::domain::{Scalar, Signal};
use crate::error::DiffusionError;
use crate::schedule::NoiseSchedule;

/// Noise `x_0` to the per-element timesteps `t`.
///
/// Returns `(x_t, ε)`, both shaped exactly like `x_0`. `x_0` is not modified.
///
/// Errors (checked before any randomness is consumed):
/// - [`DiffusionError::ShapeMismatch`] if `t.len()` differs from the batch size
/// - [`DiffusionError::TimestepOutOfRange`] if any `t[b] >= T`
pub fn add_noise<T, R>(
    schedule: &NoiseSchedule,
    x_0: &Signal<T>,
    t: &[usize],
    rng: &mut R,
) -> Result<(Signal<T>, Signal<T>), DiffusionError>
where
    T: Scalar,
    R: Rng + ?Sized,
{
    check_timesteps(schedule, x_0, t)?;

    // Drawn sequentially in row-major order so a given seed maps to a fixed ε.
    let eps: Vec<T> = (0..x_0.as_slice().len())
        .map(|_| T::standard_normal(rng))
        .collect();
    let noise = Signal::new(x_0.shape().to_vec(), eps)?;

    let noisy = mix(schedule, x_0, t, &noise)?;
    Ok((noisy, noise))
}

/// Deterministic part of the forward process: combine `x_0` and a given `ε`.
///
/// For each batch element `b`, the scalar pair `(sqrt(ᾱ_{t[b]}), sqrt(1-ᾱ_{t[b]}))`
/// scales every value of that element uniformly.
pub fn mix<T: Scalar>(
    schedule: &NoiseSchedule,
    x_0: &Signal<T>,
    t: &[usize],
    noise: &Signal<T>,
) -> Result<Signal<T>, DiffusionError> {
    check_timesteps(schedule, x_0, t)?;
    if noise.shape() != x_0.shape() {
        return Err(DiffusionError::ShapeMismatch {
            what: "noise shape vs signal shape",
            expected: format!("{:?}", x_0.shape()),
            actual: format!("{:?}", noise.shape()),
        });
    }

    let n = x_0.element_len();
    debug!(batch = x_0.batch_size(), element_len = n, "forward noising");

    let mut out = vec![T::from_f64(0.0); x_0.as_slice().len()];
    if n > 0 {
        let c1s = schedule.sqrt_alphas_cumprod();
        let c2s = schedule.sqrt_one_minus_alphas_cumprod();
        out.par_chunks_mut(n)
            .zip(x_0.as_slice().par_chunks(n))
            .zip(noise.as_slice().par_chunks(n))
            .zip(t.par_iter())
            .for_each(|(((dst, x), eps), &step)| {
                let c1 = T::from_f64(c1s[step]);
                let c2 = T::from_f64(c2s[step]);
                for ((d, &xv), &ev) in dst.iter_mut().zip(x).zip(eps) {
                    *d = c1 * xv + c2 * ev;
                }
            });
    }

    Signal::new(x_0.shape().to_vec(), out)
}

/// Draw one uniform timestep in `[0, T-1]` per batch element.
pub fn sample_timesteps<R: Rng + ?Sized>(
    schedule: &NoiseSchedule,
    batch_size: usize,
    rng: &mut R,
) -> Vec<usize> {
    let count = schedule.timestep_count();
    (0..batch_size).map(|_| rng.gen_range(0..count)).collect()
}

fn check_timesteps<T: Scalar>(
    schedule: &NoiseSchedule,
    x_0: &Signal<T>,
    t: &[usize],
) -> Result<(), DiffusionError> {
    if t.len() != x_0.batch_size() {
        return Err(DiffusionError::ShapeMismatch {
            what: "timestep count vs batch size",
            expected: x_0.batch_size().to_string(),
            actual: t.len().to_string(),
        });
    }
    for &step in t {
        schedule.check_timestep(step)?;
    }
    Ok(())
}
