//! Shared forward-process workflow used by the CLI.
//!
//! Keeping this in one place avoids mixing the core workflow with printing:
//! image source -> batch -> schedule -> add_noise -> per-frame stats
//!
//! The CLI can then focus on presentation (strips, tables, exports).

use nalgebra::DMatrix;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;

use crate::domain::{MaskKind, PhantomConfig, ScheduleConfig, Signal};
use crate::error::AppError;
use crate::noise::add_noise;
use crate::report::{FrameStats, frame_stats};
use crate::schedule::NoiseSchedule;
use crate::source::{
    ImageSource, PhantomSource, generate_volume, images_to_signal, log_magnitude, middle_slice,
    normalize_max, reconstruct, signal_element_to_image,
};

/// Steps of the original progression figure, defined for `T = 1000`.
const REFERENCE_STEPS: [usize; 5] = [0, 50, 150, 400, 999];
const REFERENCE_LAST: usize = 999;

/// Inputs of a `forward` run.
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardConfig {
    pub schedule: ScheduleConfig,
    pub phantom: PhantomConfig,
    pub mask: MaskKind,
    pub steps: Vec<usize>,
    pub noise_seed: u64,
}

/// All computed outputs of a single `forward` run.
#[derive(Debug, Clone)]
pub struct ForwardRun {
    pub schedule: NoiseSchedule,
    pub steps: Vec<usize>,
    /// One copy of the clean image per step (`[B, H, W]`).
    pub x_0: Signal<f32>,
    pub x_t: Signal<f32>,
    pub noise: Signal<f32>,
    pub stats: Vec<FrameStats>,
}

impl ForwardRun {
    pub fn clean_image(&self) -> Result<DMatrix<f64>, AppError> {
        signal_element_to_image(&self.x_0, 0)
    }

    /// `("t=<step>", x_t[b])` for every batch element.
    pub fn frames(&self) -> Result<Vec<(String, DMatrix<f64>)>, AppError> {
        self.steps
            .iter()
            .enumerate()
            .map(|(b, &t)| Ok((format!("t={t}"), signal_element_to_image(&self.x_t, b)?)))
            .collect()
    }
}

/// One row of the mask comparison.
#[derive(Debug, Clone)]
pub struct MaskView {
    pub mask: MaskKind,
    pub kspace_log: DMatrix<f64>,
    pub image: DMatrix<f64>,
}

/// The reference progression `0, 50, 150, 400, 999` rescaled to `timestep_count`.
pub fn default_steps(timestep_count: usize) -> Vec<usize> {
    let last = timestep_count.saturating_sub(1);
    let mut steps: Vec<usize> = REFERENCE_STEPS
        .iter()
        .map(|&s| ((s as f64 / REFERENCE_LAST as f64) * last as f64).round() as usize)
        .collect();
    steps.dedup();
    steps
}

/// Execute the forward workflow with the phantom image source.
pub fn run_forward(config: &ForwardConfig) -> Result<ForwardRun, AppError> {
    let source = PhantomSource {
        phantom: config.phantom,
        mask: config.mask,
    };
    run_forward_with_source(config, &source)
}

/// Execute the forward workflow with any image source.
pub fn run_forward_with_source(
    config: &ForwardConfig,
    source: &dyn ImageSource,
) -> Result<ForwardRun, AppError> {
    // 1) Schedule.
    let schedule = NoiseSchedule::from_config(&config.schedule)?;
    if config.steps.is_empty() {
        return Err(AppError::new(2, "At least one timestep is required."));
    }

    // 2) Clean image, replicated once per requested step.
    let clean = source.clean_image()?;
    info!(rows = clean.nrows(), cols = clean.ncols(), "loaded clean image");
    let x_0 = images_to_signal(&vec![clean; config.steps.len()])?;

    // 3) Forward process.
    let mut rng = StdRng::seed_from_u64(config.noise_seed);
    let (x_t, noise) = add_noise(&schedule, &x_0, &config.steps, &mut rng)?;
    info!(steps = ?config.steps, seed = config.noise_seed, "noised batch");

    // 4) Per-frame statistics.
    let stats = config
        .steps
        .iter()
        .enumerate()
        .map(|(b, &t)| {
            let (clean, noisy) = x_0.element(b).zip(x_t.element(b)).ok_or_else(|| {
                AppError::new(4, format!("Batch element {b} missing from forward output."))
            })?;
            Ok(frame_stats(t, &schedule, clean, noisy)?)
        })
        .collect::<Result<Vec<_>, AppError>>()?;

    Ok(ForwardRun {
        schedule,
        steps: config.steps.clone(),
        x_0,
        x_t,
        noise,
        stats,
    })
}

/// Reconstruct the middle slice under every mask.
pub fn run_compare(phantom: &PhantomConfig) -> Result<Vec<MaskView>, AppError> {
    let volume = generate_volume(phantom)?;
    let slice = middle_slice(&volume).ok_or_else(|| AppError::new(3, "Volume has no slices."))?;
    info!(slices = volume.len(), "generated volume for mask comparison");

    MaskKind::ALL
        .iter()
        .map(|&mask| {
            let recon = reconstruct(slice, mask);
            Ok(MaskView {
                mask,
                kspace_log: log_magnitude(&recon.kspace),
                image: normalize_max(&recon.image)?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Gradient;

    impl ImageSource for Gradient {
        fn clean_image(&self) -> Result<DMatrix<f64>, AppError> {
            Ok(DMatrix::from_fn(8, 8, |i, j| (i + j) as f64 / 14.0))
        }
    }

    fn config(steps: Vec<usize>) -> ForwardConfig {
        ForwardConfig {
            schedule: ScheduleConfig::default(),
            phantom: PhantomConfig {
                size: 16,
                slices: 1,
                ..PhantomConfig::default()
            },
            mask: MaskKind::None,
            steps,
            noise_seed: 3,
        }
    }

    #[test]
    fn default_steps_match_reference_at_1000() {
        assert_eq!(default_steps(1000), vec![0, 50, 150, 400, 999]);
        assert_eq!(default_steps(1), vec![0]);
        assert_eq!(*default_steps(100).last().unwrap(), 99);
    }

    #[test]
    fn forward_run_produces_one_frame_per_step() {
        let run = run_forward_with_source(&config(vec![0, 500, 999]), &Gradient).unwrap();
        assert_eq!(run.x_t.shape(), &[3, 8, 8]);
        assert_eq!(run.noise.shape(), run.x_t.shape());
        assert_eq!(run.stats.len(), 3);
        assert_eq!(run.frames().unwrap().len(), 3);
        assert!(run.stats[0].corr_with_clean > run.stats[2].corr_with_clean);
    }

    #[test]
    fn forward_run_is_reproducible() {
        let a = run_forward_with_source(&config(vec![10, 20]), &Gradient).unwrap();
        let b = run_forward_with_source(&config(vec![10, 20]), &Gradient).unwrap();
        assert_eq!(a.x_t, b.x_t);
    }

    #[test]
    fn forward_run_surfaces_index_error() {
        let err = run_forward_with_source(&config(vec![1000]), &Gradient).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn forward_run_rejects_empty_steps() {
        assert_eq!(
            run_forward_with_source(&config(Vec::new()), &Gradient).unwrap_err().exit_code(),
            2
        );
    }

    #[test]
    fn phantom_forward_run_works_end_to_end() {
        let run = run_forward(&config(vec![0, 999])).unwrap();
        assert_eq!(run.x_0.shape(), &[2, 16, 16]);
        let clean = run.clean_image().unwrap();
        assert!((clean.max() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn compare_covers_every_mask() {
        let views = run_compare(&PhantomConfig {
            size: 16,
            slices: 3,
            ..PhantomConfig::default()
        })
        .unwrap();
        assert_eq!(views.len(), 3);
        assert_eq!(views[1].mask, MaskKind::LowPass);
        assert!(views.iter().all(|v| v.image.shape() == (16, 16)));
    }
}
