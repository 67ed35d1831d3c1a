//! Batched signal tensors.
//!
//! A [`Signal`] is a dense, row-major buffer plus a shape whose first axis is
//! the batch. The remaining axes are whatever the caller needs (`[B, H, W]`
//! for single-channel images, `[B, C, H, W]` with channels, `[B]` for scalars).
//! The forward process only ever looks at "batch element `b`" as a contiguous
//! slice of `element_len()` values, so no dimensionality is hardcoded.

use std::fmt::Debug;
use std::ops::{Add, Mul};

use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

use crate::error::DiffusionError;

/// Element type of a [`Signal`].
pub trait Scalar:
    Copy + Debug + PartialEq + Send + Sync + Add<Output = Self> + Mul<Output = Self> + 'static
{
    fn from_f64(value: f64) -> Self;
    fn to_f64(self) -> f64;
    /// Draw one standard-normal value.
    fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> Self;
}

macro_rules! impl_scalar {
    ($($ty:ty),*) => {
        $(
            impl Scalar for $ty {
                #[inline]
                fn from_f64(value: f64) -> Self {
                    value as $ty
                }

                #[inline]
                fn to_f64(self) -> f64 {
                    self as f64
                }

                #[inline]
                fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> Self {
                    StandardNormal.sample(rng)
                }
            }
        )*
    };
}

impl_scalar!(f32, f64);

/// Dense batch of equally-shaped elements.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal<T: Scalar> {
    shape: Vec<usize>,
    data: Vec<T>,
}

impl<T: Scalar> Signal<T> {
    /// Wrap `data` (row-major) with the given shape.
    ///
    /// `shape[0]` is the batch size. The data length must equal the product of
    /// all dimensions.
    pub fn new(shape: Vec<usize>, data: Vec<T>) -> Result<Self, DiffusionError> {
        if shape.is_empty() {
            return Err(DiffusionError::InvalidSignal {
                message: "shape must have at least a batch dimension".to_string(),
            });
        }
        let expected = shape.iter().product::<usize>();
        if expected != data.len() {
            return Err(DiffusionError::InvalidSignal {
                message: format!(
                    "shape {shape:?} describes {expected} values but {} were given",
                    data.len()
                ),
            });
        }
        Ok(Self { shape, data })
    }

    pub fn zeros(shape: Vec<usize>) -> Result<Self, DiffusionError> {
        let len = shape.iter().product::<usize>();
        Self::new(shape, vec![T::from_f64(0.0); len])
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn batch_size(&self) -> usize {
        self.shape[0]
    }

    /// Number of values in one batch element (product of the non-batch axes).
    pub fn element_len(&self) -> usize {
        self.shape[1..].iter().product()
    }

    /// Batch element `b` as a contiguous slice.
    pub fn element(&self, b: usize) -> Option<&[T]> {
        if b >= self.batch_size() {
            return None;
        }
        let n = self.element_len();
        Some(&self.data[b * n..(b + 1) * n])
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Convert element-wise into another scalar type, keeping the shape.
    pub fn map<U: Scalar>(&self, f: impl Fn(T) -> U) -> Signal<U> {
        Signal {
            shape: self.shape.clone(),
            data: self.data.iter().map(|&v| f(v)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_length_mismatch() {
        let err = Signal::<f32>::new(vec![2, 3], vec![0.0; 5]).unwrap_err();
        assert!(matches!(err, DiffusionError::InvalidSignal { .. }));
    }

    #[test]
    fn new_rejects_empty_shape() {
        assert!(Signal::<f64>::new(Vec::new(), Vec::new()).is_err());
    }

    #[test]
    fn elements_are_contiguous_rows() {
        let data: Vec<f64> = (0..12).map(f64::from).collect();
        let s = Signal::new(vec![2, 2, 3], data).unwrap();
        assert_eq!(s.batch_size(), 2);
        assert_eq!(s.element_len(), 6);
        assert_eq!(s.element(1).unwrap(), &[6.0, 7.0, 8.0, 9.0, 10.0, 11.0]);
        assert!(s.element(2).is_none());
    }

    #[test]
    fn rank_one_signal_has_scalar_elements() {
        let s = Signal::new(vec![3], vec![1.0_f32, 2.0, 3.0]).unwrap();
        assert_eq!(s.element_len(), 1);
        assert_eq!(s.element(2).unwrap(), &[3.0]);
    }

    #[test]
    fn map_preserves_shape() {
        let s = Signal::new(vec![1, 2], vec![0.5_f64, 1.5]).unwrap();
        let m: Signal<f32> = s.map(|v| v as f32);
        assert_eq!(m.shape(), &[1, 2]);
        assert_eq!(m.as_slice(), &[0.5_f32, 1.5]);
    }
}
