//! Core crate of vectory.
//!
//! A [`VectorArray`](array::VectorArray) is an ordered collection of vectors of one
//! [`VectorSpace`](space::VectorSpace). The numeric kernels live in a storage backend implementing
//! [`VectorRepr`](repr::VectorRepr); this crate adds indexing, views and copy-on-write bookkeeping on top.

#![warn(missing_docs)]
#![no_std]
extern crate alloc;
#[cfg(test)]
extern crate std;

// core concepts

pub mod scalar;

pub mod index;

pub mod repr;

pub mod space;

pub mod array;

// backends built on core concepts

pub mod list;

// common

pub mod args;

pub mod error;

pub mod prelude {
    //! A prelude module re-exporting commonly used items.

    pub use crate::args::Coeffs;
    pub use crate::array::{Elem, Real, VectorArray};
    pub use crate::error::VectorArrayError;
    pub use crate::index::{Index, NormInd, Rows, SliceSpec};
    pub use crate::repr::VectorRepr;
    pub use crate::scalar::Scalar;
    pub use crate::space::{VectorSpace, VectorSpaceExt};
}
