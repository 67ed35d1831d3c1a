//! Reporting utilities: per-frame statistics and formatted terminal output.

pub mod format;

pub use format::*;

use serde::{Deserialize, Serialize};

use crate::domain::Scalar;
use crate::error::DiffusionError;
use crate::schedule::NoiseSchedule;

/// Summary of one noised batch element against its clean source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameStats {
    pub t: usize,
    pub signal_coef: f64,
    pub noise_coef: f64,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
    /// Pearson correlation between `x_t` and `x_0` (0 when either is constant).
    pub corr_with_clean: f64,
}

/// Compute [`FrameStats`] for a noised element `noisy` produced from `clean` at step `t`.
pub fn frame_stats<T: Scalar>(
    t: usize,
    schedule: &NoiseSchedule,
    clean: &[T],
    noisy: &[T],
) -> Result<FrameStats, DiffusionError> {
    let (signal_coef, noise_coef) = schedule.coefficients(t)?;
    if clean.len() != noisy.len() {
        return Err(DiffusionError::ShapeMismatch {
            what: "clean vs noisy element length",
            expected: clean.len().to_string(),
            actual: noisy.len().to_string(),
        });
    }

    let x: Vec<f64> = noisy.iter().map(|v| v.to_f64()).collect();
    let c: Vec<f64> = clean.iter().map(|v| v.to_f64()).collect();
    let n = x.len().max(1) as f64;

    let mean = x.iter().sum::<f64>() / n;
    let var = x.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let min = x.iter().copied().fold(f64::INFINITY, f64::min);
    let max = x.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    Ok(FrameStats {
        t,
        signal_coef,
        noise_coef,
        mean,
        std: var.sqrt(),
        min: if x.is_empty() { 0.0 } else { min },
        max: if x.is_empty() { 0.0 } else { max },
        corr_with_clean: pearson(&x, &c),
    })
}

fn pearson(a: &[f64], b: &[f64]) -> f64 {
    if a.is_empty() {
        return 0.0;
    }
    let n = a.len() as f64;
    let ma = a.iter().sum::<f64>() / n;
    let mb = b.iter().sum::<f64>() / n;
    let mut cov = 0.0;
    let mut va = 0.0;
    let mut vb = 0.0;
    for (&x, &y) in a.iter().zip(b) {
        cov += (x - ma) * (y - mb);
        va += (x - ma).powi(2);
        vb += (y - mb).powi(2);
    }
    let denom = (va * vb).sqrt();
    if denom > 0.0 { cov / denom } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::domain::Signal;
    use crate::noise::add_noise;

    #[test]
    fn correlation_with_clean_decays_over_time() {
        let s = NoiseSchedule::build(1000, 1e-4, 0.02).unwrap();
        let clean: Vec<f32> = (0..256).map(|i| (i as f32 / 255.0).sin()).collect();
        let x_0 = Signal::new(vec![3, 256], clean.repeat(3)).unwrap();
        let t = [0, 150, 999];
        let (x_t, _) = add_noise(&s, &x_0, &t, &mut StdRng::seed_from_u64(3)).unwrap();

        let stats: Vec<FrameStats> = t
            .iter()
            .enumerate()
            .map(|(b, &step)| frame_stats(step, &s, &clean, x_t.element(b).unwrap()).unwrap())
            .collect();

        assert!(stats[0].corr_with_clean > 0.99);
        assert!(stats[0].corr_with_clean > stats[1].corr_with_clean);
        assert!(stats[2].corr_with_clean.abs() < 0.3);
        assert!(stats[2].signal_coef < 0.01);
    }

    #[test]
    fn constant_input_has_zero_correlation() {
        let s = NoiseSchedule::build(10, 1e-4, 0.02).unwrap();
        let st = frame_stats(0, &s, &[1.0_f64; 4], &[2.0, 2.0, 2.0, 2.0]).unwrap();
        assert_eq!(st.corr_with_clean, 0.0);
        assert_eq!(st.std, 0.0);
        assert_eq!(st.mean, 2.0);
    }

    #[test]
    fn stats_propagate_index_and_length_errors() {
        let s = NoiseSchedule::build(10, 1e-4, 0.02).unwrap();
        assert!(matches!(
            frame_stats(10, &s, &[0.0_f32], &[0.0]),
            Err(DiffusionError::TimestepOutOfRange { .. })
        ));
        assert!(matches!(
            frame_stats(0, &s, &[0.0_f32], &[0.0, 1.0]),
            Err(DiffusionError::ShapeMismatch { .. })
        ));
    }
}
