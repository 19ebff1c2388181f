//! Element types vector arrays can hold.

use core::fmt::Debug;
use core::ops::Neg;

use ndarray::{LinalgScalar, ScalarOperand};
use num_complex::Complex;
use num_traits::Float;

/// Real or complex floating point element of a vector.
///
/// Inner products are antilinear in the first argument, so every implementation has to provide [`Scalar::conj`].
pub trait Scalar: LinalgScalar + ScalarOperand + Neg<Output = Self> + Debug + PartialEq + Send + Sync {
    /// The underlying real type, used for norms.
    type Real: Float + ScalarOperand + Debug + Send + Sync;

    /// Complex conjugate. The identity for real types.
    fn conj(&self) -> Self;
    /// Real part.
    fn re(&self) -> Self::Real;
    /// Imaginary part. Zero for real types.
    fn im(&self) -> Self::Real;
    /// Modulus.
    fn abs(&self) -> Self::Real;
    /// Squared modulus.
    fn abs_sqr(&self) -> Self::Real;
    /// Embeds a real number.
    fn from_real(re: Self::Real) -> Self;
}

macro_rules! impl_real {
    ($($t:ty),*) => {$(
        impl Scalar for $t {
            type Real = $t;
            fn conj(&self) -> Self {
                *self
            }
            fn re(&self) -> Self::Real {
                *self
            }
            fn im(&self) -> Self::Real {
                0.0
            }
            fn abs(&self) -> Self::Real {
                Float::abs(*self)
            }
            fn abs_sqr(&self) -> Self::Real {
                *self * *self
            }
            fn from_real(re: Self::Real) -> Self {
                re
            }
        }
    )*};
}

macro_rules! impl_complex {
    ($($t:ty),*) => {$(
        impl Scalar for Complex<$t> {
            type Real = $t;
            fn conj(&self) -> Self {
                Complex::new(self.re, -self.im)
            }
            fn re(&self) -> Self::Real {
                self.re
            }
            fn im(&self) -> Self::Real {
                self.im
            }
            fn abs(&self) -> Self::Real {
                Float::hypot(self.re, self.im)
            }
            fn abs_sqr(&self) -> Self::Real {
                self.re * self.re + self.im * self.im
            }
            fn from_real(re: Self::Real) -> Self {
                Complex::new(re, 0.0)
            }
        }
    )*};
}

impl_real!(f32, f64);
impl_complex!(f32, f64);
