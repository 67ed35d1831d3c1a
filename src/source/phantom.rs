//! Synthetic k-space volumes.
//!
//! Each slice is a modified Shepp–Logan head phantom, scaled toward the edges
//! of the volume (anatomy narrows away from the middle slice), with small
//! seeded intensity jitter on the interior structures. Slices are moved to
//! k-space with [`fft2c`] and can carry complex Gaussian measurement noise.
//!
//! Output is a pure function of [`PhantomConfig`].

use nalgebra::DMatrix;
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;
use rustfft::num_complex::Complex64;
use tracing::debug;

use crate::domain::PhantomConfig;
use crate::error::AppError;
use crate::source::fft::fft2c;
use crate::source::kspace::KSpaceVolume;

/// Smallest supported image side.
const MIN_SIZE: usize = 4;

/// How much the outermost slice shrinks relative to the middle one.
const EDGE_SHRINK: f64 = 0.15;

/// Std dev of the per-slice intensity jitter on interior ellipses.
const INTENSITY_JITTER: f64 = 0.02;

#[derive(Debug, Clone, Copy)]
struct Ellipse {
    intensity: f64,
    a: f64,
    b: f64,
    x0: f64,
    y0: f64,
    phi_deg: f64,
}

const fn e(intensity: f64, a: f64, b: f64, x0: f64, y0: f64, phi_deg: f64) -> Ellipse {
    Ellipse {
        intensity,
        a,
        b,
        x0,
        y0,
        phi_deg,
    }
}

/// Modified Shepp–Logan (Toft) ellipse table.
const SHEPP_LOGAN: [Ellipse; 10] = [
    e(1.0, 0.69, 0.92, 0.0, 0.0, 0.0),
    e(-0.8, 0.6624, 0.874, 0.0, -0.0184, 0.0),
    e(-0.2, 0.11, 0.31, 0.22, 0.0, -18.0),
    e(-0.2, 0.16, 0.41, -0.22, 0.0, 18.0),
    e(0.1, 0.21, 0.25, 0.0, 0.35, 0.0),
    e(0.1, 0.046, 0.046, 0.0, 0.1, 0.0),
    e(0.1, 0.046, 0.046, 0.0, -0.1, 0.0),
    e(0.1, 0.046, 0.023, -0.08, -0.605, 0.0),
    e(0.1, 0.023, 0.023, 0.0, -0.606, 0.0),
    e(0.1, 0.023, 0.046, 0.06, -0.605, 0.0),
];

/// Generate a k-space volume.
pub fn generate_volume(config: &PhantomConfig) -> Result<KSpaceVolume, AppError> {
    if config.size < MIN_SIZE {
        return Err(AppError::new(2, format!("Phantom size must be >= {MIN_SIZE}.")));
    }
    if config.slices == 0 {
        return Err(AppError::new(2, "Phantom slice count must be > 0."));
    }
    if !(config.noise_level.is_finite() && config.noise_level >= 0.0) {
        return Err(AppError::new(2, "Phantom noise level must be finite and >= 0."));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let jitter = Normal::new(0.0, INTENSITY_JITTER)
        .map_err(|e| AppError::new(4, format!("Jitter distribution error: {e}")))?;
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    let mid = config.slices / 2;
    let half_span = mid.max(1) as f64;

    let mut slices = Vec::with_capacity(config.slices);
    for s in 0..config.slices {
        let distance = (s as f64 - mid as f64).abs() / half_span;
        let scale = 1.0 - EDGE_SHRINK * distance.min(1.0);

        // The two outer shells keep their intensity so the background stays at 0.
        let ellipses: Vec<Ellipse> = SHEPP_LOGAN
            .iter()
            .enumerate()
            .map(|(idx, el)| {
                let intensity = if idx < 2 {
                    el.intensity
                } else {
                    el.intensity + jitter.sample(&mut rng)
                };
                Ellipse {
                    intensity,
                    a: el.a * scale,
                    b: el.b * scale,
                    x0: el.x0 * scale,
                    y0: el.y0 * scale,
                    ..*el
                }
            })
            .collect();

        let image = rasterize(&ellipses, config.size);
        let mut k = fft2c(&image.map(|v| Complex64::new(v, 0.0)));

        if config.noise_level > 0.0 {
            let peak = k.iter().map(|v| v.norm()).fold(0.0, f64::max);
            let sigma = config.noise_level * peak;
            for v in k.iter_mut() {
                *v += Complex64::new(normal.sample(&mut rng), normal.sample(&mut rng)) * sigma;
            }
        }

        slices.push(k);
    }

    debug!(
        size = config.size,
        slices = config.slices,
        seed = config.seed,
        noise_level = config.noise_level,
        "generated phantom k-space volume"
    );

    Ok(KSpaceVolume { slices })
}

/// Sum ellipse intensities on an `n × n` grid spanning `[-1, 1]²` (row 0 at the top).
fn rasterize(ellipses: &[Ellipse], n: usize) -> DMatrix<f64> {
    let to_unit = |p: usize| 2.0 * (p as f64 + 0.5) / n as f64 - 1.0;
    DMatrix::from_fn(n, n, |i, j| {
        let x = to_unit(j);
        let y = -to_unit(i);
        ellipses
            .iter()
            .filter(|el| contains(el, x, y))
            .map(|el| el.intensity)
            .sum::<f64>()
    })
}

fn contains(el: &Ellipse, x: f64, y: f64) -> bool {
    let (sin, cos) = el.phi_deg.to_radians().sin_cos();
    let dx = x - el.x0;
    let dy = y - el.y0;
    let xr = dx * cos + dy * sin;
    let yr = -dx * sin + dy * cos;
    (xr / el.a).powi(2) + (yr / el.b).powi(2) <= 1.0
}
