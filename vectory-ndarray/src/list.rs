//! One `Array1` per vector, plugged into the list adapter of `vectory-core`.
//!
//! This is how vectors of a solver that hands out individual vector objects are represented. Arrays of
//! [`NdListVectorSpace`] compare by identity and never share a buffer between vectors.

use alloc::{string::String, vec::Vec};
use core::marker::PhantomData;

use ndarray::{Array1, ArrayView1};
use num_traits::Zero;
use vectory_core::{
    error::VectorArrayError,
    list::{ImplReal, ListBackend, ListVectorSpace, VectorImpl},
    scalar::Scalar,
};

/// A single dense vector.
#[derive(Debug, Clone, PartialEq)]
pub struct NdVector<E> {
    data: Array1<E>,
}

impl<E: Scalar> NdVector<E> {
    /// Wraps `data`.
    pub fn new(data: Array1<E>) -> Self {
        Self { data }
    }

    /// The entries.
    pub fn data(&self) -> ArrayView1<'_, E> {
        self.data.view()
    }
}

impl<E: Scalar> VectorImpl for NdVector<E> {
    type Elem = E;

    fn dim(&self) -> usize {
        self.data.len()
    }

    fn scal(&mut self, alpha: E) {
        self.data.mapv_inplace(|x| x * alpha);
    }

    fn axpy(&mut self, alpha: E, x: &Self) {
        self.data.scaled_add(alpha, &x.data);
    }

    fn inner(&self, other: &Self) -> E {
        self.data
            .iter()
            .zip(other.data.iter())
            .fold(E::zero(), |acc, (a, b)| acc + Scalar::conj(a) * *b)
    }

    fn l1_norm(&self) -> ImplReal<Self> {
        self.data.iter().fold(<ImplReal<Self> as Zero>::zero(), |acc, x| acc + Scalar::abs(x))
    }

    fn l2_norm2(&self) -> ImplReal<Self> {
        self.data.iter().fold(<ImplReal<Self> as Zero>::zero(), |acc, x| acc + x.abs_sqr())
    }

    fn amax(&self) -> (usize, ImplReal<Self>) {
        self.data
            .iter()
            .map(Scalar::abs)
            .enumerate()
            .fold((0, <ImplReal<Self> as Zero>::zero()), |best, (i, x)| if x > best.1 { (i, x) } else { best })
    }

    fn dofs(&self, dofs: &[usize]) -> Vec<E> {
        dofs.iter().map(|&d| self.data[d]).collect()
    }

    fn to_dense(&self) -> Result<Array1<E>, VectorArrayError> {
        Ok(self.data.clone())
    }

    fn real(&self) -> Self {
        Self::new(self.data.mapv(|x| E::from_real(x.re())))
    }

    fn imag(&self) -> Self {
        Self::new(self.data.mapv(|x| E::from_real(x.im())))
    }

    fn conj(&self) -> Self {
        Self::new(self.data.mapv(|x| Scalar::conj(&x)))
    }
}

/// Creates [`NdVector`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct NdListBackend<E> {
    _elem: PhantomData<fn() -> E>,
}

impl<E: Scalar> ListBackend for NdListBackend<E> {
    type Vector = NdVector<E>;

    fn zero_vector(&self, dim: usize) -> NdVector<E> {
        NdVector::new(Array1::zeros(dim))
    }

    fn vector_from_dense(&self, data: ArrayView1<'_, E>) -> Result<NdVector<E>, VectorArrayError> {
        Ok(NdVector::new(data.to_owned()))
    }
}

/// Space of arrays of [`NdVector`]s.
pub type NdListVectorSpace<E> = ListVectorSpace<NdListBackend<E>>;

/// New space of [`NdVector`]s of dimension `dim`, distinct from every other space.
pub fn nd_list_space<E: Scalar>(dim: usize, id: Option<String>) -> NdListVectorSpace<E> {
    ListVectorSpace::new(NdListBackend { _elem: PhantomData }, dim, id)
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use ndarray::array;
    use vectory_core::space::VectorSpaceExt;

    use super::*;

    #[test]
    fn identity_equality() {
        let a = nd_list_space::<f64>(2, None);
        assert_eq!(a, a.clone());
        assert_ne!(a, nd_list_space(2, None));
    }

    #[test]
    fn vectors_are_adopted() -> anyhow::Result<()> {
        let space = nd_list_space(3, Some("velocity".into()));
        let a = space.make_array_from(vec![
            NdVector::new(array![1.0, -4.0, 2.0]),
            NdVector::new(array![0.0, 0.5, 0.0]),
        ])?;
        assert_eq!(a.with_repr(|r, _| r.vectors()[1].data().to_owned())?, array![0.0, 0.5, 0.0]);
        assert_eq!(a.amax()?, (array![1, 1], array![4.0, 0.5]));
        assert_eq!(a.dofs(&[2, 0])?, array![[2.0, 1.0], [0.0, 0.0]]);
        assert!(matches!(
            space.make_array_from(vec![NdVector::new(array![1.0])]),
            Err(VectorArrayError::DimensionMismatch { .. })
        ));
        let b = space.from_numpy(a.to_numpy()?.view())?;
        assert_eq!(b.to_numpy()?, a.to_numpy()?);
        Ok(())
    }
}
