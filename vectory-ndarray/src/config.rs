//! Options of the dense solvers.

use alloc::{format, string::String};
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Options of [`NdMatrixOperator::apply_inverse`](crate::operator::NdMatrixOperator).
#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(default)]
pub struct SolverOptions {
    /// Factorization used to solve linear systems.
    pub solver: DenseSolver,
}

/// Factorization of a dense matrix.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DenseSolver {
    /// LU decomposition with partial pivoting.
    #[default]
    Lu,
    /// Cholesky decomposition. Only for Hermitian positive definite matrices.
    Cholesky,
}

impl FromStr for DenseSolver {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lu" => Ok(DenseSolver::Lu),
            "cholesky" => Ok(DenseSolver::Cholesky),
            _ => Err(format!("unknown dense solver: {s}")),
        }
    }
}
