//! Operators given by a dense matrix.

use nalgebra::{ComplexField, DMatrix};
use ndarray::{Array2, ArrayView2};
use vectory_core::{
    array::VectorArray,
    error::VectorArrayError,
    scalar::Scalar,
    space::{VectorSpace, VectorSpaceExt},
};
use vectory_linalg::{error::OperatorError, operator::Operator};
use vectory_params::{
    parameter::Parameter,
    parametric::{ParameterProfile, Parametric},
};

use crate::{
    config::{DenseSolver, SolverOptions},
    dense::NdVectorSpace,
};

/// The linear operator `u -> A u` for a matrix `A` with `range.dim()` rows and `source.dim()` columns.
#[derive(Debug, Clone)]
pub struct NdMatrixOperator<E: Scalar> {
    matrix: Array2<E>,
    source: NdVectorSpace<E>,
    range: NdVectorSpace<E>,
    options: SolverOptions,
    profile: ParameterProfile,
}

impl<E: Scalar> NdMatrixOperator<E> {
    /// Operator between anonymous spaces of fitting dimensions.
    pub fn new(matrix: Array2<E>) -> Self {
        let (rows, cols) = matrix.dim();
        Self {
            matrix,
            source: NdVectorSpace::new(cols),
            range: NdVectorSpace::new(rows),
            options: SolverOptions::default(),
            profile: ParameterProfile::empty(),
        }
    }

    /// Operator between the given spaces.
    pub fn with_spaces(
        matrix: Array2<E>,
        source: NdVectorSpace<E>,
        range: NdVectorSpace<E>,
    ) -> Result<Self, OperatorError> {
        let (rows, cols) = matrix.dim();
        for (op, expected, actual) in [("source", source.dim(), cols), ("range", range.dim(), rows)] {
            if expected != actual {
                return Err(VectorArrayError::DimensionMismatch { op, expected, actual }.into());
            }
        }
        Ok(Self {
            source,
            range,
            ..Self::new(matrix)
        })
    }

    /// Replaces the options used by [`Operator::apply_inverse`].
    pub fn with_solver_options(mut self, options: SolverOptions) -> Self {
        self.options = options;
        self
    }

    /// The matrix.
    pub fn matrix(&self) -> ArrayView2<'_, E> {
        self.matrix.view()
    }

    fn check_source(&self, u: &VectorArray<NdVectorSpace<E>>) -> Result<(), OperatorError> {
        if u.space() != &self.source {
            return Err(VectorArrayError::SpaceMismatch.into());
        }
        Ok(())
    }

    fn check_range(&self, v: &VectorArray<NdVectorSpace<E>>) -> Result<(), OperatorError> {
        if v.space() != &self.range {
            return Err(VectorArrayError::SpaceMismatch.into());
        }
        Ok(())
    }
}

impl<E: Scalar> Parametric for NdMatrixOperator<E> {
    fn parameter_profile(&self) -> &ParameterProfile {
        &self.profile
    }
}

impl<E: Scalar + ComplexField> Operator<NdVectorSpace<E>> for NdMatrixOperator<E> {
    fn source(&self) -> &NdVectorSpace<E> {
        &self.source
    }

    fn range(&self) -> &NdVectorSpace<E> {
        &self.range
    }

    fn linear(&self) -> bool {
        true
    }

    fn apply(
        &self,
        u: &VectorArray<NdVectorSpace<E>>,
        mu: Option<&Parameter>,
    ) -> Result<VectorArray<NdVectorSpace<E>>, OperatorError> {
        self.check_source(u)?;
        self.parse_parameter(mu.into())?;
        let x = u.to_numpy()?;
        Ok(self.range.from_numpy_owned(x.dot(&self.matrix.t()))?)
    }

    fn apply_adjoint(
        &self,
        v: &VectorArray<NdVectorSpace<E>>,
        mu: Option<&Parameter>,
    ) -> Result<VectorArray<NdVectorSpace<E>>, OperatorError> {
        self.check_range(v)?;
        self.parse_parameter(mu.into())?;
        let y = v.to_numpy()?;
        let conj = self.matrix.mapv(|x| Scalar::conj(&x));
        Ok(self.source.from_numpy_owned(y.dot(&conj))?)
    }

    fn apply_inverse(
        &self,
        v: &VectorArray<NdVectorSpace<E>>,
        mu: Option<&Parameter>,
        least_squares: bool,
    ) -> Result<VectorArray<NdVectorSpace<E>>, OperatorError> {
        if least_squares {
            return Err(OperatorError::NotSupported("least squares solves of dense matrices".into()));
        }
        let (rows, cols) = self.matrix.dim();
        if rows != cols {
            return Err(OperatorError::NotSupported("inverse of a non-square matrix".into()));
        }
        self.check_range(v)?;
        self.parse_parameter(mu.into())?;

        let y = v.to_numpy()?;
        let a = DMatrix::from_fn(rows, cols, |i, j| self.matrix[[i, j]]);
        let b = DMatrix::from_fn(rows, y.nrows(), |i, j| y[[j, i]]);
        log::debug!(
            "solving {rows}x{cols} system for {} right hand sides using {:?}",
            y.nrows(),
            self.options.solver
        );
        let x = match self.options.solver {
            DenseSolver::Lu => a.lu().solve(&b).ok_or(OperatorError::Singular)?,
            DenseSolver::Cholesky => a.cholesky().ok_or(OperatorError::Singular)?.solve(&b),
        };
        let x = Array2::from_shape_fn((y.nrows(), cols), |(j, i)| x[(i, j)]);
        Ok(self.source.from_numpy_owned(x)?)
    }
}
