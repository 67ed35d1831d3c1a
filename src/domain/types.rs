//! Shared configuration types.
//!
//! These are plain serializable values so they can be:
//!
//! - filled from CLI flags
//! - loaded from an experiment TOML file
//! - embedded in exported schedule JSON

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Parameters of the linear beta schedule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Total number of diffusion steps (T).
    pub timestep_count: usize,
    /// Noise injected at the first step.
    pub beta_start: f64,
    /// Noise injected at the last step.
    pub beta_end: f64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            timestep_count: 1000,
            beta_start: 1e-4,
            beta_end: 0.02,
        }
    }
}

/// Synthetic measurement volume used as the clean-image source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhantomConfig {
    /// Square image side (pixels).
    pub size: usize,
    /// Number of slices in the generated volume.
    pub slices: usize,
    /// Seed for per-slice variation and measurement noise.
    pub seed: u64,
    /// Complex Gaussian measurement noise, relative to the peak k-space magnitude.
    pub noise_level: f64,
}

impl Default for PhantomConfig {
    fn default() -> Self {
        Self {
            size: 128,
            slices: 5,
            seed: 42,
            noise_level: 0.0,
        }
    }
}

/// Everything an experiment TOML file can set.
///
/// ```toml
/// [schedule]
/// timestep_count = 1000
/// beta_start = 1e-4
/// beta_end = 0.02
///
/// [phantom]
/// size = 128
/// seed = 7
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub schedule: ScheduleConfig,
    pub phantom: PhantomConfig,
}

/// Frequency-domain mask applied before the inverse transform.
///
/// The window is the central half of each axis: rows `h/4 .. 3h/4` and
/// columns `w/4 .. 3w/4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum MaskKind {
    /// Keep every frequency.
    #[default]
    None,
    /// Keep the central window only (low frequencies).
    LowPass,
    /// Zero the central window (keep high frequencies).
    HighPass,
}

impl MaskKind {
    pub const ALL: [MaskKind; 3] = [MaskKind::None, MaskKind::LowPass, MaskKind::HighPass];

    pub fn display_name(self) -> &'static str {
        match self {
            MaskKind::None => "none",
            MaskKind::LowPass => "low_pass",
            MaskKind::HighPass => "high_pass",
        }
    }
}
