//! Dense ndarray backend of vectory.
//!
//! [`NdVectorSpace`](dense::NdVectorSpace) keeps all vectors of an array in the rows of one matrix, which is what
//! most numerical code wants. [`NdListVectorSpace`](list::NdListVectorSpace) stores one `Array1` per vector and
//! stands in for solvers handing out individual vector objects.

#![warn(missing_docs)]
#![no_std]
extern crate alloc;
#[cfg(test)]
extern crate std;

pub mod dense;

pub mod list;

pub mod operator;

pub mod config;

pub mod prelude {
    //! A prelude module re-exporting commonly used items.

    pub use crate::config::{DenseSolver, SolverOptions};
    pub use crate::dense::{NdDenseRepr, NdVectorSpace};
    pub use crate::list::{nd_list_space, NdListBackend, NdListVectorSpace, NdVector};
    pub use crate::operator::NdMatrixOperator;
}
