//! Vector arrays over vectors owned by external code.
//!
//! Solver libraries usually hand out opaque vector objects that only support a handful of per-vector operations.
//! [`ListRepr`] stores such vectors in a `Vec` and implements the bulk [`VectorRepr`] contract on top of the
//! per-vector [`VectorImpl`] contract.

use alloc::{string::String, vec::Vec};
use core::fmt;

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use num_traits::{Float, Zero};

use crate::{
    args::Coeffs,
    array::VectorArray,
    error::VectorArrayError,
    index::Rows,
    repr::VectorRepr,
    scalar::Scalar,
    space::{SpaceToken, VectorSpace, VectorSpaceExt},
};

/// Real type of a vector implementation.
pub type ImplReal<V> = <<V as VectorImpl>::Elem as Scalar>::Real;

/// A single vector of an external library.
pub trait VectorImpl: Clone {
    /// Element type.
    type Elem: Scalar;

    /// Dimension.
    fn dim(&self) -> usize;

    /// `self *= alpha`.
    fn scal(&mut self, alpha: Self::Elem);

    /// `self += alpha * x`.
    fn axpy(&mut self, alpha: Self::Elem, x: &Self);

    /// Inner product, antilinear in `self`.
    fn inner(&self, other: &Self) -> Self::Elem;

    /// l1-norm.
    fn l1_norm(&self) -> ImplReal<Self>;

    /// Squared l2-norm.
    fn l2_norm2(&self) -> ImplReal<Self>;

    /// l2-norm.
    fn l2_norm(&self) -> ImplReal<Self> {
        Float::sqrt(self.l2_norm2())
    }

    /// Index and modulus of the entry of largest modulus.
    fn amax(&self) -> (usize, ImplReal<Self>);

    /// Selected entries.
    fn dofs(&self, dofs: &[usize]) -> Vec<Self::Elem>;

    /// Dense copy of the entries.
    fn to_dense(&self) -> Result<Array1<Self::Elem>, VectorArrayError> {
        Err(VectorArrayError::not_supported("dense export of external vectors"))
    }

    /// Real part.
    fn real(&self) -> Self {
        self.clone()
    }

    /// Imaginary part.
    fn imag(&self) -> Self {
        let mut v = self.clone();
        v.scal(Self::Elem::zero());
        v
    }

    /// Complex conjugate.
    fn conj(&self) -> Self {
        self.clone()
    }
}

/// Factory of the vectors of a [`ListVectorSpace`].
pub trait ListBackend: Clone + fmt::Debug {
    /// The vector type.
    type Vector: VectorImpl;

    /// New zero vector.
    fn zero_vector(&self, dim: usize) -> Self::Vector;

    /// New vector holding a copy of `data`.
    fn vector_from_dense(
        &self,
        _data: ArrayView1<'_, <Self::Vector as VectorImpl>::Elem>,
    ) -> Result<Self::Vector, VectorArrayError> {
        Err(VectorArrayError::not_supported("dense import of external vectors"))
    }
}

/// A `Vec` of external vectors.
#[derive(Clone)]
pub struct ListRepr<B: ListBackend> {
    backend: B,
    dim: usize,
    vectors: Vec<B::Vector>,
}

impl<B: ListBackend> ListRepr<B> {
    /// Wraps `vectors`, which must all have dimension `dim`.
    pub fn from_vectors(backend: B, dim: usize, vectors: Vec<B::Vector>) -> Result<Self, VectorArrayError> {
        if let Some(v) = vectors.iter().find(|v| v.dim() != dim) {
            return Err(VectorArrayError::DimensionMismatch {
                op: "from_vectors",
                expected: dim,
                actual: v.dim(),
            });
        }
        Ok(Self { backend, dim, vectors })
    }

    /// The stored vectors.
    pub fn vectors(&self) -> &[B::Vector] {
        &self.vectors
    }

    fn selected<'a>(&'a self, rows: Rows<'a>) -> impl Iterator<Item = &'a B::Vector> + 'a {
        (0..rows.count(self.vectors.len())).map(move |k| &self.vectors[rows.get(k)])
    }

    fn map_selected(&self, rows: Rows<'_>, f: impl Fn(&B::Vector) -> B::Vector) -> Self {
        Self {
            backend: self.backend.clone(),
            dim: self.dim,
            vectors: self.selected(rows).map(f).collect(),
        }
    }
}

impl<B: ListBackend> VectorRepr for ListRepr<B> {
    type Elem = <B::Vector as VectorImpl>::Elem;

    fn dim(&self) -> usize {
        self.dim
    }

    fn len(&self) -> usize {
        self.vectors.len()
    }

    fn gather(&self, rows: Rows<'_>) -> Self {
        self.map_selected(rows, Clone::clone)
    }

    fn append(&mut self, other: Self) -> Result<(), VectorArrayError> {
        self.vectors.extend(other.vectors);
        Ok(())
    }

    fn remove(&mut self, rows: &[usize]) {
        let mut k = 0;
        let mut pos = 0;
        self.vectors.retain(|_| {
            let keep = rows.get(k) != Some(&pos);
            if !keep {
                k += 1;
            }
            pos += 1;
            keep
        });
    }

    fn scal(&mut self, rows: Rows<'_>, alpha: &Coeffs<Self::Elem>) {
        for k in 0..rows.count(self.vectors.len()) {
            let i = rows.get(k);
            self.vectors[i].scal(alpha.get(k));
        }
    }

    fn axpy(&mut self, rows: Rows<'_>, alpha: &Coeffs<Self::Elem>, x: &Self, x_rows: Rows<'_>) {
        let broadcast = x_rows.count(x.vectors.len()) == 1;
        for k in 0..rows.count(self.vectors.len()) {
            let xv = &x.vectors[x_rows.get(if broadcast { 0 } else { k })];
            self.vectors[rows.get(k)].axpy(alpha.get(k), xv);
        }
    }

    fn dot(&self, rows: Rows<'_>, other: &Self, other_rows: Rows<'_>) -> Array2<Self::Elem> {
        let a: Vec<_> = self.selected(rows).collect();
        let b: Vec<_> = other.selected(other_rows).collect();
        Array2::from_shape_fn((a.len(), b.len()), |(i, j)| a[i].inner(b[j]))
    }

    fn pairwise_dot(&self, rows: Rows<'_>, other: &Self, other_rows: Rows<'_>) -> Array1<Self::Elem> {
        self.selected(rows)
            .zip(other.selected(other_rows))
            .map(|(a, b)| a.inner(b))
            .collect()
    }

    fn lincomb(&self, rows: Rows<'_>, coeffs: ArrayView2<'_, Self::Elem>) -> Self {
        let sources: Vec<_> = self.selected(rows).collect();
        let vectors = coeffs
            .rows()
            .into_iter()
            .map(|c| {
                let mut v = self.backend.zero_vector(self.dim);
                for (&alpha, x) in c.iter().zip(&sources) {
                    v.axpy(alpha, x);
                }
                v
            })
            .collect();
        Self {
            backend: self.backend.clone(),
            dim: self.dim,
            vectors,
        }
    }

    fn l1_norm(&self, rows: Rows<'_>) -> Array1<ImplReal<B::Vector>> {
        self.selected(rows).map(VectorImpl::l1_norm).collect()
    }

    fn l2_norm2(&self, rows: Rows<'_>) -> Array1<ImplReal<B::Vector>> {
        self.selected(rows).map(VectorImpl::l2_norm2).collect()
    }

    fn l2_norm(&self, rows: Rows<'_>) -> Array1<ImplReal<B::Vector>> {
        self.selected(rows).map(VectorImpl::l2_norm).collect()
    }

    fn amax(&self, rows: Rows<'_>) -> (Array1<usize>, Array1<ImplReal<B::Vector>>) {
        let (indices, values): (Vec<_>, Vec<_>) = self.selected(rows).map(VectorImpl::amax).unzip();
        (Array1::from(indices), Array1::from(values))
    }

    fn dofs(&self, rows: Rows<'_>, dofs: &[usize]) -> Array2<Self::Elem> {
        let values: Vec<_> = self.selected(rows).map(|v| v.dofs(dofs)).collect();
        Array2::from_shape_fn((values.len(), dofs.len()), |(i, j)| values[i][j])
    }

    fn real(&self, rows: Rows<'_>) -> Self {
        self.map_selected(rows, VectorImpl::real)
    }

    fn imag(&self, rows: Rows<'_>) -> Self {
        self.map_selected(rows, VectorImpl::imag)
    }

    fn conj(&self, rows: Rows<'_>) -> Self {
        self.map_selected(rows, VectorImpl::conj)
    }

    fn to_dense(&self, rows: Rows<'_>) -> Result<Array2<Self::Elem>, VectorArrayError> {
        let mut out = Array2::zeros((rows.count(self.vectors.len()), self.dim));
        for (mut row, v) in out.rows_mut().into_iter().zip(self.selected(rows)) {
            row.assign(&v.to_dense()?);
        }
        Ok(out)
    }
}

/// Space of [`ListRepr`] arrays. Two spaces are equal only if one is a clone of the other.
#[derive(Clone)]
pub struct ListVectorSpace<B: ListBackend> {
    dim: usize,
    id: Option<String>,
    backend: B,
    token: SpaceToken,
}

impl<B: ListBackend> ListVectorSpace<B> {
    /// Creates a new space, distinct from every other space.
    pub fn new(backend: B, dim: usize, id: Option<String>) -> Self {
        Self {
            dim,
            id,
            backend,
            token: SpaceToken::new(),
        }
    }

    /// The backend creating the vectors.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Array taking ownership of externally created vectors.
    pub fn make_array_from(&self, vectors: Vec<B::Vector>) -> Result<VectorArray<Self>, VectorArrayError> {
        self.make_array(ListRepr::from_vectors(self.backend.clone(), self.dim, vectors)?)
    }
}

impl<B: ListBackend> PartialEq for ListVectorSpace<B> {
    fn eq(&self, other: &Self) -> bool {
        self.token == other.token
    }
}

impl<B: ListBackend> fmt::Debug for ListVectorSpace<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.id {
            Some(id) => write!(f, "ListVectorSpace({}, {})", self.dim, id),
            None => write!(f, "ListVectorSpace({})", self.dim),
        }
    }
}

impl<B: ListBackend> VectorSpace for ListVectorSpace<B> {
    type Repr = ListRepr<B>;

    fn dim(&self) -> usize {
        self.dim
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn zeros_repr(&self, count: usize, reserve: usize) -> Self::Repr {
        let mut vectors = Vec::with_capacity(reserve.max(count));
        vectors.extend((0..count).map(|_| self.backend.zero_vector(self.dim)));
        ListRepr {
            backend: self.backend.clone(),
            dim: self.dim,
            vectors,
        }
    }

    fn repr_from_dense(&self, data: ArrayView2<'_, <B::Vector as VectorImpl>::Elem>) -> Result<Self::Repr, VectorArrayError> {
        let vectors = data
            .rows()
            .into_iter()
            .map(|row| self.backend.vector_from_dense(row))
            .collect::<Result<Vec<_>, _>>()?;
        ListRepr::from_vectors(self.backend.clone(), self.dim, vectors)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Plain `Vec<f64>` vectors exercising the list adapter.

    use alloc::vec::Vec;

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    pub struct ToyVector(Vec<f64>);

    impl ToyVector {
        pub fn new(v: Vec<f64>) -> Self {
            Self(v)
        }
    }

    impl VectorImpl for ToyVector {
        type Elem = f64;
        fn dim(&self) -> usize {
            self.0.len()
        }
        fn scal(&mut self, alpha: f64) {
            self.0.iter_mut().for_each(|x| *x *= alpha);
        }
        fn axpy(&mut self, alpha: f64, x: &Self) {
            self.0.iter_mut().zip(&x.0).for_each(|(y, x)| *y += alpha * x);
        }
        fn inner(&self, other: &Self) -> f64 {
            self.0.iter().zip(&other.0).map(|(a, b)| a * b).sum()
        }
        fn l1_norm(&self) -> f64 {
            self.0.iter().map(|x| Float::abs(*x)).sum()
        }
        fn l2_norm2(&self) -> f64 {
            self.inner(self)
        }
        fn amax(&self) -> (usize, f64) {
            self.0
                .iter()
                .map(|x| Float::abs(*x))
                .enumerate()
                .fold((0, 0.0), |best, (i, x)| if x > best.1 { (i, x) } else { best })
        }
        fn dofs(&self, dofs: &[usize]) -> Vec<f64> {
            dofs.iter().map(|&d| self.0[d]).collect()
        }
        fn to_dense(&self) -> Result<Array1<f64>, VectorArrayError> {
            Ok(Array1::from(self.0.clone()))
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct ToyBackend;

    impl ListBackend for ToyBackend {
        type Vector = ToyVector;
        fn zero_vector(&self, dim: usize) -> ToyVector {
            ToyVector(alloc::vec![0.0; dim])
        }
        fn vector_from_dense(&self, data: ArrayView1<'_, f64>) -> Result<ToyVector, VectorArrayError> {
            Ok(ToyVector(data.to_vec()))
        }
    }

    pub type ToySpace = ListVectorSpace<ToyBackend>;

    pub fn toy_space(dim: usize) -> ToySpace {
        ListVectorSpace::new(ToyBackend, dim, None)
    }
}
