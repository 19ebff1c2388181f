//! Inner products and norms with respect to an operator.

use ndarray::{Array1, Array2};
use num_traits::Float;
use vectory_core::{
    array::{Elem, Real, VectorArray},
    scalar::Scalar,
    space::VectorSpace,
};

use crate::{error::OperatorError, operator::Operator};

/// Inner products of vector arrays, either Euclidean or induced by a product operator.
///
/// Passing `None` as product falls back to [`VectorArray::dot`] and the l2-norms.
pub trait ProductExt<S: VectorSpace> {
    /// Matrix of inner products `(self[i], other[j])`.
    fn inner(&self, other: &Self, product: Option<&dyn Operator<S>>) -> Result<Array2<Elem<S>>, OperatorError>;

    /// Inner products `(self[i], other[i])`.
    fn pairwise_inner(&self, other: &Self, product: Option<&dyn Operator<S>>)
        -> Result<Array1<Elem<S>>, OperatorError>;

    /// Norms of the vectors.
    fn norm(&self, product: Option<&dyn Operator<S>>) -> Result<Array1<Real<S>>, OperatorError>;

    /// Squared norms of the vectors.
    fn norm2(&self, product: Option<&dyn Operator<S>>) -> Result<Array1<Real<S>>, OperatorError>;

    /// Gram matrix of the vectors.
    fn gramian(&self, product: Option<&dyn Operator<S>>) -> Result<Array2<Elem<S>>, OperatorError>;
}

impl<S: VectorSpace> ProductExt<S> for VectorArray<S> {
    fn inner(&self, other: &Self, product: Option<&dyn Operator<S>>) -> Result<Array2<Elem<S>>, OperatorError> {
        match product {
            None => Ok(self.dot(other)?),
            Some(op) => op.apply2(self, other, None),
        }
    }

    fn pairwise_inner(
        &self,
        other: &Self,
        product: Option<&dyn Operator<S>>,
    ) -> Result<Array1<Elem<S>>, OperatorError> {
        match product {
            None => Ok(self.pairwise_dot(other)?),
            Some(op) => op.pairwise_apply2(self, other, None),
        }
    }

    fn norm(&self, product: Option<&dyn Operator<S>>) -> Result<Array1<Real<S>>, OperatorError> {
        match product {
            None => Ok(self.l2_norm()?),
            Some(_) => Ok(self.norm2(product)?.mapv(Float::sqrt)),
        }
    }

    fn norm2(&self, product: Option<&dyn Operator<S>>) -> Result<Array1<Real<S>>, OperatorError> {
        match product {
            None => Ok(self.l2_norm2()?),
            Some(op) => Ok(op.pairwise_apply2(self, self, None)?.mapv(|x| Scalar::re(&x))),
        }
    }

    fn gramian(&self, product: Option<&dyn Operator<S>>) -> Result<Array2<Elem<S>>, OperatorError> {
        self.inner(self, product)
    }
}
