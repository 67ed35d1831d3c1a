//! Centered, orthonormal 2D FFT.
//!
//! k-space is stored with the zero frequency in the middle of the matrix, so
//! both transforms wrap the plain FFT in shifts:
//!
//! ```text
//! fft2c(x)  = fftshift(fft2(ifftshift(x)))   / sqrt(h·w)
//! ifft2c(k) = fftshift(ifft2(ifftshift(k)))  / sqrt(h·w)
//! ```
//!
//! With the `1/sqrt(N)` scaling on both directions, `ifft2c(fft2c(x)) == x`
//! up to rounding and energy is preserved.

use std::sync::Arc;

use nalgebra::DMatrix;
use rayon::prelude::*;
use rustfft::num_complex::Complex64;
use rustfft::{Fft, FftDirection, FftPlanner};

/// Forward centered FFT (image -> k-space).
pub fn fft2c(x: &DMatrix<Complex64>) -> DMatrix<Complex64> {
    centered(x, FftDirection::Forward)
}

/// Inverse centered FFT (k-space -> image).
pub fn ifft2c(k: &DMatrix<Complex64>) -> DMatrix<Complex64> {
    centered(k, FftDirection::Inverse)
}

fn centered(x: &DMatrix<Complex64>, direction: FftDirection) -> DMatrix<Complex64> {
    if x.is_empty() {
        return x.clone();
    }
    let shifted = ifftshift(x);
    let transformed = fft2(shifted, direction);
    fftshift(&transformed)
}

/// Unshifted 2D transform with orthonormal scaling.
fn fft2(mut x: DMatrix<Complex64>, direction: FftDirection) -> DMatrix<Complex64> {
    let (h, w) = x.shape();
    let mut planner = FftPlanner::<f64>::new();

    // Storage is column-major, so each column is a contiguous run of `h` values.
    let col_fft = planner.plan_fft(h, direction);
    transform_columns(&mut x, &col_fft);

    // Rows become columns after a transpose.
    let row_fft = planner.plan_fft(w, direction);
    let mut xt = x.transpose();
    transform_columns(&mut xt, &row_fft);

    let scale = 1.0 / ((h * w) as f64).sqrt();
    xt.transpose().map(|v| v * scale)
}

fn transform_columns(x: &mut DMatrix<Complex64>, fft: &Arc<dyn Fft<f64>>) {
    let len = x.nrows();
    x.as_mut_slice()
        .par_chunks_mut(len)
        .for_each(|column| fft.process(column));
}

/// Move the zero-frequency bin to the center.
pub fn fftshift(x: &DMatrix<Complex64>) -> DMatrix<Complex64> {
    let (h, w) = x.shape();
    roll(x, h / 2, w / 2)
}

/// Inverse of [`fftshift`] (differs from it for odd sizes).
pub fn ifftshift(x: &DMatrix<Complex64>) -> DMatrix<Complex64> {
    let (h, w) = x.shape();
    roll(x, h - h / 2, w - w / 2)
}

fn roll(x: &DMatrix<Complex64>, shift_rows: usize, shift_cols: usize) -> DMatrix<Complex64> {
    let (h, w) = x.shape();
    if h == 0 || w == 0 {
        return x.clone();
    }
    DMatrix::from_fn(h, w, |i, j| {
        let src_i = (i + h - shift_rows % h) % h;
        let src_j = (j + w - shift_cols % w) % w;
        x[(src_i, src_j)]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(h: usize, w: usize) -> DMatrix<Complex64> {
        DMatrix::from_fn(h, w, |i, j| {
            Complex64::new((i * 7 + j * 3) as f64 % 5.0, (i + 2 * j) as f64 % 3.0 - 1.0)
        })
    }

    fn max_abs_diff(a: &DMatrix<Complex64>, b: &DMatrix<Complex64>) -> f64 {
        a.iter()
            .zip(b.iter())
            .map(|(x, y)| (x - y).norm())
            .fold(0.0, f64::max)
    }

    #[test]
    fn inverse_undoes_forward() {
        for &(h, w) in &[(8, 8), (6, 10), (5, 7)] {
            let x = sample(h, w);
            let back = ifft2c(&fft2c(&x));
            assert!(max_abs_diff(&x, &back) < 1e-10, "{h}x{w} round trip failed");
        }
    }

    #[test]
    fn constant_image_concentrates_at_center() {
        let n = 8;
        let x = DMatrix::from_element(n, n, Complex64::new(1.0, 0.0));
        let k = fft2c(&x);
        // DC term of an orthonormal transform is sum / sqrt(N) = N / sqrt(N).
        assert!((k[(n / 2, n / 2)].re - n as f64).abs() < 1e-10);
        let off_center: f64 = k
            .iter()
            .enumerate()
            .filter(|(idx, _)| *idx != (n / 2) * n + n / 2)
            .map(|(_, v)| v.norm())
            .sum();
        assert!(off_center < 1e-9);
    }

    #[test]
    fn transform_preserves_energy() {
        let x = sample(12, 12);
        let k = fft2c(&x);
        let e_x: f64 = x.iter().map(|v| v.norm_sqr()).sum();
        let e_k: f64 = k.iter().map(|v| v.norm_sqr()).sum();
        assert!((e_x - e_k).abs() < 1e-9 * e_x.max(1.0));
    }

    #[test]
    fn shifts_are_inverse_for_odd_sizes() {
        let x = sample(5, 7);
        assert_eq!(ifftshift(&fftshift(&x)), x);
        assert_ne!(fftshift(&x), ifftshift(&x));
    }
}
