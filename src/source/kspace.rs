//! k-space volumes, masking and magnitude helpers.

use nalgebra::DMatrix;
use rustfft::num_complex::Complex64;

pub use crate::domain::MaskKind;

/// Offset added before taking the log of k-space magnitudes (avoids `ln(0)`).
const LOG_EPS: f64 = 1e-9;

/// A stack of 2D k-space slices (`slices × h × w`).
#[derive(Debug, Clone, PartialEq)]
pub struct KSpaceVolume {
    pub slices: Vec<DMatrix<Complex64>>,
}

impl KSpaceVolume {
    pub fn len(&self) -> usize {
        self.slices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }
}

/// The slice at index `len / 2`, or `None` for an empty volume.
pub fn middle_slice(volume: &KSpaceVolume) -> Option<&DMatrix<Complex64>> {
    volume.slices.get(volume.len() / 2)
}

/// Zero the frequencies rejected by `mask`.
pub fn apply_mask(k: &DMatrix<Complex64>, mask: MaskKind) -> DMatrix<Complex64> {
    let (h, w) = k.shape();
    let rows = h / 4..3 * h / 4;
    let cols = w / 4..3 * w / 4;
    let zero = Complex64::new(0.0, 0.0);

    match mask {
        MaskKind::None => k.clone(),
        MaskKind::LowPass => DMatrix::from_fn(h, w, |i, j| {
            if rows.contains(&i) && cols.contains(&j) { k[(i, j)] } else { zero }
        }),
        MaskKind::HighPass => DMatrix::from_fn(h, w, |i, j| {
            if rows.contains(&i) && cols.contains(&j) { zero } else { k[(i, j)] }
        }),
    }
}

/// Element-wise magnitude.
pub fn complex_abs(k: &DMatrix<Complex64>) -> DMatrix<f64> {
    k.map(|v| v.norm())
}

/// `ln(|k| + 1e-9)`, the usual way to look at k-space.
pub fn log_magnitude(k: &DMatrix<Complex64>) -> DMatrix<f64> {
    k.map(|v| (v.norm() + LOG_EPS).ln())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ones(h: usize, w: usize) -> DMatrix<Complex64> {
        DMatrix::from_element(h, w, Complex64::new(1.0, -1.0))
    }

    fn count_nonzero(k: &DMatrix<Complex64>) -> usize {
        k.iter().filter(|v| v.norm() > 0.0).count()
    }

    #[test]
    fn low_pass_keeps_central_window_only() {
        let k = apply_mask(&ones(8, 12), MaskKind::LowPass);
        assert_eq!(count_nonzero(&k), 4 * 6);
        assert!(k[(2, 3)].norm() > 0.0);
        assert!(k[(5, 8)].norm() > 0.0);
        assert_eq!(k[(1, 3)].norm(), 0.0);
        assert_eq!(k[(6, 8)].norm(), 0.0);
    }

    #[test]
    fn high_pass_is_complement_of_low_pass() {
        let k = ones(8, 8);
        let low = apply_mask(&k, MaskKind::LowPass);
        let high = apply_mask(&k, MaskKind::HighPass);
        assert_eq!(low.clone() + high, k);
        assert_eq!(count_nonzero(&low) + count_nonzero(&apply_mask(&k, MaskKind::HighPass)), 64);
    }

    #[test]
    fn no_mask_is_identity() {
        let k = ones(5, 5);
        assert_eq!(apply_mask(&k, MaskKind::None), k);
    }

    #[test]
    fn middle_slice_picks_half_index() {
        let volume = KSpaceVolume {
            slices: (0..5)
                .map(|s| DMatrix::from_element(2, 2, Complex64::new(s as f64, 0.0)))
                .collect(),
        };
        assert_eq!(middle_slice(&volume).unwrap()[(0, 0)].re, 2.0);
        assert!(middle_slice(&KSpaceVolume { slices: Vec::new() }).is_none());
    }

    #[test]
    fn log_magnitude_is_finite_at_zero() {
        let k = DMatrix::from_element(2, 2, Complex64::new(0.0, 0.0));
        let m = log_magnitude(&k);
        assert!(m.iter().all(|v| v.is_finite()));
        assert!((complex_abs(&ones(1, 1))[(0, 0)] - 2f64.sqrt()).abs() < 1e-12);
    }
}
