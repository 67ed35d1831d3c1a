//! Clean-image source for the forward process.
//!
//! The diffusion core only needs a real-valued, normalized batch. This module
//! produces one the way the MRI pipeline does:
//!
//! k-space volume -> middle slice -> optional frequency mask -> centered inverse
//! FFT -> magnitude -> divide by max -> `[B, H, W]` signal
//!
//! Measurement files are out of scope, so volumes come from a seeded phantom.

use nalgebra::DMatrix;
use rustfft::num_complex::Complex64;

use crate::domain::{MaskKind, PhantomConfig, Scalar, Signal};
use crate::error::AppError;

pub mod fft;
pub mod kspace;
pub mod phantom;

pub use fft::{fft2c, ifft2c};
pub use kspace::{KSpaceVolume, apply_mask, complex_abs, log_magnitude, middle_slice};
pub use phantom::generate_volume;

/// Anything that can hand the forward process one clean image.
pub trait ImageSource {
    fn clean_image(&self) -> Result<DMatrix<f64>, AppError>;
}

/// Phantom-backed [`ImageSource`]: middle slice, masked, reconstructed, normalized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhantomSource {
    pub phantom: PhantomConfig,
    pub mask: MaskKind,
}

impl ImageSource for PhantomSource {
    fn clean_image(&self) -> Result<DMatrix<f64>, AppError> {
        let volume = generate_volume(&self.phantom)?;
        let slice = middle_slice(&volume).ok_or_else(|| AppError::new(3, "Volume has no slices."))?;
        let recon = reconstruct(slice, self.mask);
        normalize_max(&recon.image)
    }
}

/// Magnitude image and the (masked) k-space it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconstruction {
    pub image: DMatrix<f64>,
    pub kspace: DMatrix<Complex64>,
}

/// Mask a k-space slice and transform it to a magnitude image.
pub fn reconstruct(slice: &DMatrix<Complex64>, mask: MaskKind) -> Reconstruction {
    let kspace = apply_mask(slice, mask);
    let image = complex_abs(&ifft2c(&kspace));
    Reconstruction { image, kspace }
}

/// Scale an image so its maximum becomes 1.
pub fn normalize_max(image: &DMatrix<f64>) -> Result<DMatrix<f64>, AppError> {
    let max = image.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !(max.is_finite() && max > 0.0) {
        return Err(AppError::new(
            3,
            format!("Cannot normalize image with maximum {max} (must be finite and > 0)."),
        ));
    }
    Ok(image.map(|v| v / max))
}

/// Stack equally-shaped images into a row-major `[B, H, W]` signal.
pub fn images_to_signal(images: &[DMatrix<f64>]) -> Result<Signal<f32>, AppError> {
    let Some(first) = images.first() else {
        return Err(AppError::new(3, "No images to stack."));
    };
    let (h, w) = first.shape();
    let mut data = Vec::with_capacity(images.len() * h * w);
    for (idx, img) in images.iter().enumerate() {
        if img.shape() != (h, w) {
            return Err(AppError::new(
                3,
                format!("Image {idx} is {:?}, expected {:?}.", img.shape(), (h, w)),
            ));
        }
        for i in 0..h {
            for j in 0..w {
                data.push(img[(i, j)] as f32);
            }
        }
    }
    Ok(Signal::new(vec![images.len(), h, w], data)?)
}

/// Batch element `b` of a `[B, H, W]` signal as an `H × W` image.
pub fn signal_element_to_image<T: Scalar>(
    signal: &Signal<T>,
    b: usize,
) -> Result<DMatrix<f64>, AppError> {
    let &[_, h, w] = signal.shape() else {
        return Err(AppError::new(
            3,
            format!("Expected a [B, H, W] signal, got shape {:?}.", signal.shape()),
        ));
    };
    let element = signal
        .element(b)
        .ok_or_else(|| AppError::new(3, format!("Batch index {b} out of range.")))?;
    Ok(DMatrix::from_fn(h, w, |i, j| element[i * w + j].to_f64()))
}
