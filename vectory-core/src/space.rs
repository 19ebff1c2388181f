//! Vector spaces: identity and factory of vector arrays.

use core::fmt::Debug;

use ndarray::{Array2, ArrayView2};
use uuid::Uuid;

use crate::{
    array::{Elem, VectorArray},
    error::VectorArrayError,
    repr::VectorRepr,
};

/// A space of vectors of fixed dimension.
///
/// Equality decides which arrays may be combined. Spaces backed by opaque external storage compare by identity (see
/// [`SpaceToken`]); a space type may define structural equality instead.
pub trait VectorSpace: Clone + PartialEq + Debug {
    /// Storage backing arrays of this space.
    type Repr: VectorRepr;

    /// Dimension of the vectors.
    fn dim(&self) -> usize;

    /// Optional identifier telling apart spaces of the same kind and dimension.
    fn id(&self) -> Option<&str>;

    /// Storage holding `count` zero vectors. `reserve` is a capacity hint and has no observable effect.
    fn zeros_repr(&self, count: usize, reserve: usize) -> Self::Repr;

    /// Storage holding a copy of the rows of `data`.
    fn repr_from_dense(
        &self,
        _data: ArrayView2<'_, <Self::Repr as VectorRepr>::Elem>,
    ) -> Result<Self::Repr, VectorArrayError> {
        Err(VectorArrayError::not_supported("construction from dense data"))
    }

    /// Storage taking over the rows of `data`. Backends able to adopt the buffer should override this.
    fn repr_from_dense_owned(
        &self,
        data: Array2<<Self::Repr as VectorRepr>::Elem>,
    ) -> Result<Self::Repr, VectorArrayError> {
        self.repr_from_dense(data.view())
    }
}

/// Array constructors available for every [`VectorSpace`].
pub trait VectorSpaceExt: VectorSpace {
    /// Array of `count` zero vectors.
    fn zeros(&self, count: usize) -> VectorArray<Self>;

    /// Array of `count` zero vectors with room for `reserve` vectors.
    fn zeros_reserved(&self, count: usize, reserve: usize) -> VectorArray<Self>;

    /// Array without vectors.
    fn empty(&self, reserve: usize) -> VectorArray<Self>;

    /// Wraps backend storage into an array of this space. The array takes ownership of the storage.
    fn make_array(&self, repr: Self::Repr) -> Result<VectorArray<Self>, VectorArrayError>;

    /// Array holding a copy of the rows of `data`.
    fn from_numpy(&self, data: ArrayView2<'_, Elem<Self>>) -> Result<VectorArray<Self>, VectorArrayError>;

    /// Array adopting the rows of `data`, without copying where the backend allows it.
    fn from_numpy_owned(&self, data: Array2<Elem<Self>>) -> Result<VectorArray<Self>, VectorArrayError>;

    /// Whether `array` belongs to this space.
    fn contains(&self, array: &VectorArray<Self>) -> bool;
}

impl<S: VectorSpace> VectorSpaceExt for S {
    fn zeros(&self, count: usize) -> VectorArray<Self> {
        self.zeros_reserved(count, 0)
    }

    fn zeros_reserved(&self, count: usize, reserve: usize) -> VectorArray<Self> {
        VectorArray::from_repr_unchecked(self.clone(), self.zeros_repr(count, reserve))
    }

    fn empty(&self, reserve: usize) -> VectorArray<Self> {
        self.zeros_reserved(0, reserve)
    }

    fn make_array(&self, repr: Self::Repr) -> Result<VectorArray<Self>, VectorArrayError> {
        if repr.dim() != self.dim() {
            return Err(VectorArrayError::DimensionMismatch {
                op: "make_array",
                expected: self.dim(),
                actual: repr.dim(),
            });
        }
        Ok(VectorArray::from_repr_unchecked(self.clone(), repr))
    }

    fn from_numpy(&self, data: ArrayView2<'_, Elem<Self>>) -> Result<VectorArray<Self>, VectorArrayError> {
        check_columns(self, data.ncols())?;
        let repr = self.repr_from_dense(data)?;
        self.make_array(repr)
    }

    fn from_numpy_owned(&self, data: Array2<Elem<Self>>) -> Result<VectorArray<Self>, VectorArrayError> {
        check_columns(self, data.ncols())?;
        let repr = self.repr_from_dense_owned(data)?;
        self.make_array(repr)
    }

    fn contains(&self, array: &VectorArray<Self>) -> bool {
        array.space() == self
    }
}

fn check_columns<S: VectorSpace>(space: &S, ncols: usize) -> Result<(), VectorArrayError> {
    if ncols != space.dim() {
        return Err(VectorArrayError::DimensionMismatch {
            op: "from_numpy",
            expected: space.dim(),
            actual: ncols,
        });
    }
    Ok(())
}

/// Identity of a vector space.
///
/// Every token created by [`SpaceToken::new`] is distinct, clones compare equal. Spaces deriving `PartialEq` over a
/// token get identity equality: a space equals its clones and nothing else.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct SpaceToken {
    id: Uuid,
}

impl SpaceToken {
    /// Creates a fresh identity.
    pub fn new() -> Self {
        Self { id: Uuid::new_v4() }
    }
}

impl Default for SpaceToken {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for SpaceToken {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "{}", self.id)
    }
}
