//! The operator contract.

use ndarray::{Array1, Array2};
use vectory_core::{
    array::{Elem, VectorArray},
    error::VectorArrayError,
    space::VectorSpace,
};
use vectory_params::{parameter::Parameter, parametric::Parametric};

use crate::error::OperatorError;

/// A possibly parameter dependent map between vector arrays of the spaces [`Operator::source`] and
/// [`Operator::range`].
///
/// Only [`Operator::apply`] is required. The adjoint and the inverse are optional capabilities, the default
/// implementations fail with [`OperatorError::NotSupported`].
pub trait Operator<S: VectorSpace>: Parametric {
    /// Space of the arrays the operator is applied to.
    fn source(&self) -> &S;

    /// Space of the results.
    fn range(&self) -> &S;

    /// Whether the operator is linear.
    fn linear(&self) -> bool;

    /// Applies the operator to every vector of `u`.
    fn apply(&self, u: &VectorArray<S>, mu: Option<&Parameter>) -> Result<VectorArray<S>, OperatorError>;

    /// Applies the adjoint operator to every vector of `v`.
    fn apply_adjoint(&self, _v: &VectorArray<S>, _mu: Option<&Parameter>) -> Result<VectorArray<S>, OperatorError> {
        Err(OperatorError::NotSupported("apply_adjoint".into()))
    }

    /// Solves `self(u) = v` for every vector of `v`, in the least squares sense if `least_squares` is set.
    fn apply_inverse(
        &self,
        _v: &VectorArray<S>,
        _mu: Option<&Parameter>,
        _least_squares: bool,
    ) -> Result<VectorArray<S>, OperatorError> {
        Err(OperatorError::NotSupported("apply_inverse".into()))
    }

    /// Matrix of the bilinear form `(v[i], self(u[j]))`.
    fn apply2(
        &self,
        v: &VectorArray<S>,
        u: &VectorArray<S>,
        mu: Option<&Parameter>,
    ) -> Result<Array2<Elem<S>>, OperatorError> {
        check_range(self, v)?;
        let au = self.apply(u, mu)?;
        Ok(v.dot(&au)?)
    }

    /// The bilinear form evaluated at corresponding vectors, `(v[i], self(u[i]))`.
    fn pairwise_apply2(
        &self,
        v: &VectorArray<S>,
        u: &VectorArray<S>,
        mu: Option<&Parameter>,
    ) -> Result<Array1<Elem<S>>, OperatorError> {
        check_range(self, v)?;
        if v.len() != u.len() {
            return Err(VectorArrayError::DimensionMismatch {
                op: "pairwise_apply2",
                expected: v.len(),
                actual: u.len(),
            }
            .into());
        }
        let au = self.apply(u, mu)?;
        Ok(v.pairwise_dot(&au)?)
    }
}

fn check_range<S: VectorSpace, O: Operator<S> + ?Sized>(op: &O, v: &VectorArray<S>) -> Result<(), OperatorError> {
    if v.space() != op.range() {
        return Err(VectorArrayError::SpaceMismatch.into());
    }
    Ok(())
}
