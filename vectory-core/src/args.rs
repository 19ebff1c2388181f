//! Coefficient arguments of `scal` and `axpy`.

use alloc::vec::Vec;

use ndarray::Array1;
use num_complex::Complex;

/// A uniform factor or one factor per vector.
#[derive(Debug, Clone, PartialEq)]
pub enum Coeffs<E> {
    /// Applied to every vector.
    Scalar(E),
    /// `k`-th entry applies to the `k`-th vector.
    PerVector(Array1<E>),
}

impl<E: Copy> Coeffs<E> {
    /// Factor for the `k`-th vector.
    pub fn get(&self, k: usize) -> E {
        match self {
            Coeffs::Scalar(a) => *a,
            Coeffs::PerVector(a) => a[k],
        }
    }

    /// Number of factors, `None` for a uniform factor.
    pub fn len(&self) -> Option<usize> {
        match self {
            Coeffs::Scalar(_) => None,
            Coeffs::PerVector(a) => Some(a.len()),
        }
    }
}

impl<E> From<Array1<E>> for Coeffs<E> {
    fn from(a: Array1<E>) -> Self {
        Coeffs::PerVector(a)
    }
}

impl<E> From<Vec<E>> for Coeffs<E> {
    fn from(a: Vec<E>) -> Self {
        Coeffs::PerVector(Array1::from(a))
    }
}

impl<E: Clone> From<&[E]> for Coeffs<E> {
    fn from(a: &[E]) -> Self {
        Coeffs::PerVector(Array1::from(a.to_vec()))
    }
}

macro_rules! impl_scalar_coeffs {
    ($($t:ty),*) => {$(
        impl From<$t> for Coeffs<$t> {
            fn from(a: $t) -> Self {
                Coeffs::Scalar(a)
            }
        }
    )*};
}

impl_scalar_coeffs!(f32, f64, Complex<f32>, Complex<f64>);
