//! Vector arrays stored as rows of a single `Array2`.

use alloc::{string::String, vec::Vec};
use core::marker::PhantomData;

use ndarray::{s, Array1, Array2, ArrayView2, Axis, CowArray, Ix2};
use num_traits::Zero;
use rand::{distributions::Standard, prelude::Distribution, Rng};
use vectory_core::{
    args::Coeffs,
    array::VectorArray,
    error::VectorArrayError,
    index::Rows,
    repr::{ReprReal, VectorRepr},
    scalar::Scalar,
    space::{VectorSpace, VectorSpaceExt},
};

/// Dense storage: row `i` of `data` is the `i`-th vector.
#[derive(Debug, Clone, PartialEq)]
pub struct NdDenseRepr<E> {
    data: Array2<E>,
}

impl<E: Scalar> NdDenseRepr<E> {
    /// Wraps `data`, taking ownership.
    pub fn new(data: Array2<E>) -> Self {
        Self { data }
    }

    /// The stored vectors, one per row.
    pub fn data(&self) -> ArrayView2<'_, E> {
        self.data.view()
    }

    /// Unwraps the stored matrix.
    pub fn into_data(self) -> Array2<E> {
        self.data
    }

    fn rows_view(&self, rows: Rows<'_>) -> CowArray<'_, E, Ix2> {
        match rows {
            Rows::All => self.data.view().into(),
            Rows::Range { start, step: 1, len } => self.data.slice(s![start..start + len, ..]).into(),
            rows => self.data.select(Axis(0), &rows.positions(self.data.nrows())).into(),
        }
    }

    fn map_rows(&self, rows: Rows<'_>, f: impl FnMut(E) -> E) -> Self {
        Self {
            data: self.rows_view(rows).mapv(f),
        }
    }
}

impl<E: Scalar> VectorRepr for NdDenseRepr<E> {
    type Elem = E;

    fn dim(&self) -> usize {
        self.data.ncols()
    }

    fn len(&self) -> usize {
        self.data.nrows()
    }

    fn gather(&self, rows: Rows<'_>) -> Self {
        Self {
            data: self.rows_view(rows).into_owned(),
        }
    }

    fn append(&mut self, other: Self) -> Result<(), VectorArrayError> {
        let (expected, actual) = (self.dim(), other.dim());
        self.data
            .append(Axis(0), other.data.view())
            .map_err(|_| VectorArrayError::DimensionMismatch {
                op: "append",
                expected,
                actual,
            })
    }

    fn remove(&mut self, rows: &[usize]) {
        let mut removed = rows.iter().peekable();
        let keep: Vec<usize> = (0..self.len())
            .filter(|i| {
                if removed.peek() == Some(&i) {
                    removed.next();
                    false
                } else {
                    true
                }
            })
            .collect();
        self.data = self.data.select(Axis(0), &keep);
    }

    fn scal(&mut self, rows: Rows<'_>, alpha: &Coeffs<E>) {
        if let (Rows::All, Coeffs::Scalar(a)) = (rows, alpha) {
            let a = *a;
            self.data.mapv_inplace(|x| x * a);
            return;
        }
        for k in 0..rows.count(self.len()) {
            let a = alpha.get(k);
            self.data.row_mut(rows.get(k)).mapv_inplace(|x| x * a);
        }
    }

    fn axpy(&mut self, rows: Rows<'_>, alpha: &Coeffs<E>, x: &Self, x_rows: Rows<'_>) {
        let broadcast = x_rows.count(x.len()) == 1;
        for k in 0..rows.count(self.len()) {
            let xi = x_rows.get(if broadcast { 0 } else { k });
            self.data
                .row_mut(rows.get(k))
                .scaled_add(alpha.get(k), &x.data.row(xi));
        }
    }

    fn dot(&self, rows: Rows<'_>, other: &Self, other_rows: Rows<'_>) -> Array2<E> {
        let a = self.rows_view(rows).mapv(|x| Scalar::conj(&x));
        a.dot(&other.rows_view(other_rows).t())
    }

    fn pairwise_dot(&self, rows: Rows<'_>, other: &Self, other_rows: Rows<'_>) -> Array1<E> {
        let (a, b) = (self.rows_view(rows), other.rows_view(other_rows));
        a.rows()
            .into_iter()
            .zip(b.rows())
            .map(|(x, y)| {
                x.iter()
                    .zip(y.iter())
                    .fold(E::zero(), |acc, (p, q)| acc + Scalar::conj(p) * *q)
            })
            .collect()
    }

    fn lincomb(&self, rows: Rows<'_>, coeffs: ArrayView2<'_, E>) -> Self {
        Self {
            data: coeffs.dot(&self.rows_view(rows)),
        }
    }

    fn l1_norm(&self, rows: Rows<'_>) -> Array1<ReprReal<Self>> {
        self.rows_view(rows)
            .rows()
            .into_iter()
            .map(|r| r.iter().fold(<ReprReal<Self> as Zero>::zero(), |acc, x| acc + Scalar::abs(x)))
            .collect()
    }

    fn l2_norm2(&self, rows: Rows<'_>) -> Array1<ReprReal<Self>> {
        self.rows_view(rows)
            .rows()
            .into_iter()
            .map(|r| r.iter().fold(<ReprReal<Self> as Zero>::zero(), |acc, x| acc + x.abs_sqr()))
            .collect()
    }

    fn amax(&self, rows: Rows<'_>) -> (Array1<usize>, Array1<ReprReal<Self>>) {
        let (indices, values): (Vec<_>, Vec<_>) = self
            .rows_view(rows)
            .rows()
            .into_iter()
            .map(|r| {
                r.iter()
                    .map(Scalar::abs)
                    .enumerate()
                    .fold((0, <ReprReal<Self> as Zero>::zero()), |best, (i, x)| if x > best.1 { (i, x) } else { best })
            })
            .unzip();
        (Array1::from(indices), Array1::from(values))
    }

    fn dofs(&self, rows: Rows<'_>, dofs: &[usize]) -> Array2<E> {
        self.rows_view(rows).select(Axis(1), dofs)
    }

    fn real(&self, rows: Rows<'_>) -> Self {
        self.map_rows(rows, |x| E::from_real(x.re()))
    }

    fn imag(&self, rows: Rows<'_>) -> Self {
        self.map_rows(rows, |x| E::from_real(x.im()))
    }

    fn conj(&self, rows: Rows<'_>) -> Self {
        self.map_rows(rows, |x| Scalar::conj(&x))
    }

    fn to_dense(&self, rows: Rows<'_>) -> Result<Array2<E>, VectorArrayError> {
        Ok(self.rows_view(rows).into_owned())
    }
}

/// Space of [`NdDenseRepr`] arrays.
///
/// Spaces are equal if they have the same dimension and identifier, so arrays created from independently
/// constructed spaces can be combined.
#[derive(Debug, Clone, PartialEq)]
pub struct NdVectorSpace<E> {
    dim: usize,
    id: Option<String>,
    _elem: PhantomData<fn() -> E>,
}

impl<E: Scalar> NdVectorSpace<E> {
    /// Space of vectors of dimension `dim`.
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            id: None,
            _elem: PhantomData,
        }
    }

    /// Space of vectors of dimension `dim`, told apart from other spaces of that dimension by `id`.
    pub fn with_id(dim: usize, id: impl Into<String>) -> Self {
        Self {
            dim,
            id: Some(id.into()),
            _elem: PhantomData,
        }
    }

    /// `count` vectors with entries drawn uniformly from `[0, 1)`. Complex entries get a zero imaginary part.
    pub fn random(&self, count: usize, rng: &mut impl Rng) -> Result<VectorArray<Self>, VectorArrayError>
    where
        Standard: Distribution<E::Real>,
    {
        let data = Array2::from_shape_fn((count, self.dim), |_| E::from_real(rng.gen()));
        self.from_numpy_owned(data)
    }
}

impl<E: Scalar> VectorSpace for NdVectorSpace<E> {
    type Repr = NdDenseRepr<E>;

    fn dim(&self) -> usize {
        self.dim
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn zeros_repr(&self, count: usize, reserve: usize) -> NdDenseRepr<E> {
        let mut data = Array2::zeros((count, self.dim));
        let extra = reserve.saturating_sub(count);
        if extra > 0 && data.reserve_rows(extra).is_err() {
            log::debug!("ignoring capacity hint of {reserve} vectors");
        }
        NdDenseRepr { data }
    }

    fn repr_from_dense(&self, data: ArrayView2<'_, E>) -> Result<NdDenseRepr<E>, VectorArrayError> {
        Ok(NdDenseRepr {
            data: data.to_owned(),
        })
    }

    fn repr_from_dense_owned(&self, data: Array2<E>) -> Result<NdDenseRepr<E>, VectorArrayError> {
        Ok(NdDenseRepr { data })
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use approx::assert_abs_diff_eq;
    use ndarray::array;
    use num_complex::Complex64;
    use rand::{rngs::StdRng, SeedableRng};
    use vectory_core::index::SliceSpec;

    use super::*;

    #[test]
    fn structural_equality() {
        assert_eq!(NdVectorSpace::<f64>::new(3), NdVectorSpace::new(3));
        assert_ne!(NdVectorSpace::<f64>::new(3), NdVectorSpace::with_id(3, "state"));
        assert_ne!(NdVectorSpace::<f64>::new(3), NdVectorSpace::new(2));
    }

    #[test]
    fn owned_data_is_adopted() -> anyhow::Result<()> {
        let data = array![[1.0, 2.0], [3.0, 4.0]];
        let ptr = data.as_ptr();
        let a = NdVectorSpace::new(2).from_numpy_owned(data)?;
        assert!(a.with_repr(|r, _| core::ptr::eq(r.data().as_ptr(), ptr))?);
        Ok(())
    }

    #[test]
    fn strided_views() -> anyhow::Result<()> {
        let space = NdVectorSpace::new(2);
        let a = space.from_numpy(array![[1.0, 0.0], [2.0, 0.0], [3.0, 0.0], [4.0, 0.0]].view())?;
        let v = a.index(SliceSpec::new(Some(3), None, Some(-2))?)?;
        assert_eq!(v.to_numpy()?, array![[4.0, 0.0], [2.0, 0.0]]);
        assert_abs_diff_eq!(v.l1_norm()?, array![4.0, 2.0]);
        Ok(())
    }

    #[test]
    fn complex_parts() -> anyhow::Result<()> {
        let space = NdVectorSpace::new(2);
        let a = space.from_numpy(array![[Complex64::new(1.0, 2.0), Complex64::new(-3.0, 0.5)]].view())?;
        assert_eq!(a.real()?.to_numpy()?, array![[Complex64::new(1.0, 0.0), Complex64::new(-3.0, 0.0)]]);
        assert_eq!(a.imag()?.to_numpy()?, array![[Complex64::new(2.0, 0.0), Complex64::new(0.5, 0.0)]]);
        assert_eq!(a.conj()?.to_numpy()?, array![[Complex64::new(1.0, -2.0), Complex64::new(-3.0, -0.5)]]);
        assert_abs_diff_eq!(a.l2_norm2()?, array![14.25]);
        Ok(())
    }

    #[test]
    fn capacity_hint_is_invisible() -> anyhow::Result<()> {
        let space = NdVectorSpace::<f64>::new(3);
        let mut a = space.zeros_reserved(1, 10);
        let mut b = space.random(4, &mut StdRng::seed_from_u64(3))?;
        a.append(&mut b, false)?;
        assert_eq!(a.len(), 5);
        assert!(b.to_numpy()?.iter().all(|x| (0.0..1.0).contains(x)));
        Ok(())
    }
}
