//! Linear beta schedule and its derived coefficient tables.
//!
//! For `T` steps and a beta range `[β_start, β_end]`:
//!
//! ```text
//! β_i      = linspace(β_start, β_end, T)[i]
//! α_i      = 1 - β_i
//! ᾱ_i      = α_0 · α_1 · … · α_i
//! c1_i     = sqrt(ᾱ_i)
//! c2_i     = sqrt(1 - ᾱ_i)
//! ```
//!
//! `c1_i² + c2_i² = 1` holds to rounding for every `i`.

use tracing::{debug, warn};

use crate::domain::ScheduleConfig;
use crate::error::DiffusionError;
use crate::math::linspace;

/// Precomputed, immutable diffusion schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct NoiseSchedule {
    config: ScheduleConfig,
    betas: Vec<f64>,
    alphas: Vec<f64>,
    alphas_cumprod: Vec<f64>,
    sqrt_alphas_cumprod: Vec<f64>,
    sqrt_one_minus_alphas_cumprod: Vec<f64>,
}

impl NoiseSchedule {
    /// Build a linear schedule.
    ///
    /// Fails with [`DiffusionError::Configuration`] if `timestep_count < 1` or
    /// either beta lies outside the open interval `(0, 1)`.
    ///
    /// `beta_start > beta_end` is accepted as given (a decreasing schedule);
    /// it is logged but neither reordered nor rejected.
    pub fn build(
        timestep_count: usize,
        beta_start: f64,
        beta_end: f64,
    ) -> Result<Self, DiffusionError> {
        if timestep_count < 1 {
            return Err(DiffusionError::configuration(
                "timestep_count must be >= 1.",
            ));
        }
        check_beta("beta_start", beta_start)?;
        check_beta("beta_end", beta_end)?;
        if beta_start > beta_end {
            warn!(
                beta_start,
                beta_end, "beta_start > beta_end: building a decreasing beta schedule"
            );
        }

        let betas = linspace(beta_start, beta_end, timestep_count);
        let alphas: Vec<f64> = betas.iter().map(|b| 1.0 - b).collect();

        // Running product in increasing index order; the order fixes rounding.
        let mut alphas_cumprod = Vec::with_capacity(timestep_count);
        let mut prod = 1.0;
        for &alpha in &alphas {
            prod *= alpha;
            alphas_cumprod.push(prod);
        }

        let sqrt_alphas_cumprod: Vec<f64> = alphas_cumprod.iter().map(|a| a.sqrt()).collect();
        let sqrt_one_minus_alphas_cumprod: Vec<f64> =
            alphas_cumprod.iter().map(|a| (1.0 - a).sqrt()).collect();

        debug!(
            timestep_count,
            beta_start,
            beta_end,
            alpha_bar_first = alphas_cumprod[0],
            alpha_bar_last = alphas_cumprod[timestep_count - 1],
            "built noise schedule"
        );

        Ok(Self {
            config: ScheduleConfig {
                timestep_count,
                beta_start,
                beta_end,
            },
            betas,
            alphas,
            alphas_cumprod,
            sqrt_alphas_cumprod,
            sqrt_one_minus_alphas_cumprod,
        })
    }

    pub fn from_config(config: &ScheduleConfig) -> Result<Self, DiffusionError> {
        Self::build(config.timestep_count, config.beta_start, config.beta_end)
    }

    pub fn config(&self) -> &ScheduleConfig {
        &self.config
    }

    /// Total number of diffusion steps (T).
    pub fn timestep_count(&self) -> usize {
        self.betas.len()
    }

    /// Largest valid timestep index (`T - 1`).
    pub fn last_index(&self) -> usize {
        self.betas.len() - 1
    }

    pub fn betas(&self) -> &[f64] {
        &self.betas
    }

    pub fn alphas(&self) -> &[f64] {
        &self.alphas
    }

    pub fn alphas_cumprod(&self) -> &[f64] {
        &self.alphas_cumprod
    }

    pub fn sqrt_alphas_cumprod(&self) -> &[f64] {
        &self.sqrt_alphas_cumprod
    }

    pub fn sqrt_one_minus_alphas_cumprod(&self) -> &[f64] {
        &self.sqrt_one_minus_alphas_cumprod
    }

    /// Ensure `t` indexes a row of the schedule.
    pub fn check_timestep(&self, t: usize) -> Result<(), DiffusionError> {
        if t >= self.timestep_count() {
            return Err(DiffusionError::TimestepOutOfRange {
                index: t,
                timestep_count: self.timestep_count(),
            });
        }
        Ok(())
    }

    /// Signal and noise coefficients `(sqrt(ᾱ_t), sqrt(1 - ᾱ_t))` at step `t`.
    pub fn coefficients(&self, t: usize) -> Result<(f64, f64), DiffusionError> {
        self.check_timestep(t)?;
        Ok((
            self.sqrt_alphas_cumprod[t],
            self.sqrt_one_minus_alphas_cumprod[t],
        ))
    }

    /// Signal-to-noise ratio `ᾱ_t / (1 - ᾱ_t)` per step.
    ///
    /// Infinite where `ᾱ_t` rounds to exactly 1.
    pub fn snr(&self) -> Vec<f64> {
        self.alphas_cumprod
            .iter()
            .map(|&a| if a < 1.0 { a / (1.0 - a) } else { f64::INFINITY })
            .collect()
    }
}

fn check_beta(name: &str, value: f64) -> Result<(), DiffusionError> {
    if value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(DiffusionError::configuration(format!(
            "{name} must lie in the open interval (0, 1), got {value}."
        )))
    }
}
