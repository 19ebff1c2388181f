//! Storage backend contract of vector arrays.

use ndarray::{Array1, Array2, ArrayView2};
use num_traits::{Float, Zero};

use crate::{args::Coeffs, error::VectorArrayError, index::Rows, scalar::Scalar};

/// Real type of the elements of a representation.
pub type ReprReal<R> = <<R as VectorRepr>::Elem as Scalar>::Real;

/// Bulk storage of a sequence of vectors of equal dimension.
///
/// A `VectorRepr` only holds data and runs the numeric kernels. Views, copy-on-write and validation of indices,
/// lengths and spaces are handled by [`VectorArray`](crate::array::VectorArray), so implementations may assume
/// that
///
/// - every row in a [`Rows`] argument is smaller than [`VectorRepr::len`],
/// - [`Coeffs::PerVector`] factors have exactly one entry per selected row,
/// - `x_rows` in [`VectorRepr::axpy`] selects either one row (broadcast) or as many rows as `rows`,
/// - every other argument has the documented size.
///
/// `Clone` must produce independent storage; it is called when copy-on-write storage gets materialized.
pub trait VectorRepr: Clone {
    /// Element type.
    type Elem: Scalar;

    /// Dimension of the stored vectors.
    fn dim(&self) -> usize;

    /// Number of stored vectors.
    fn len(&self) -> usize;

    /// Whether no vector is stored.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copies the selected rows, in order, into new storage.
    fn gather(&self, rows: Rows<'_>) -> Self;

    /// Appends all vectors of `other`.
    fn append(&mut self, other: Self) -> Result<(), VectorArrayError>;

    /// Removes rows. `rows` is sorted and free of duplicates.
    fn remove(&mut self, rows: &[usize]);

    /// Scales the selected rows in place.
    fn scal(&mut self, rows: Rows<'_>, alpha: &Coeffs<Self::Elem>);

    /// `self[rows] += alpha * x[x_rows]`.
    fn axpy(&mut self, rows: Rows<'_>, alpha: &Coeffs<Self::Elem>, x: &Self, x_rows: Rows<'_>);

    /// Matrix of inner products, antilinear in `self`.
    fn dot(&self, rows: Rows<'_>, other: &Self, other_rows: Rows<'_>) -> Array2<Self::Elem>;

    /// Inner products of corresponding rows, antilinear in `self`.
    fn pairwise_dot(&self, rows: Rows<'_>, other: &Self, other_rows: Rows<'_>) -> Array1<Self::Elem>;

    /// Linear combinations of the selected rows. `coeffs` has one column per selected row and yields one vector per
    /// row.
    fn lincomb(&self, rows: Rows<'_>, coeffs: ArrayView2<'_, Self::Elem>) -> Self;

    /// l1-norms of the selected rows.
    fn l1_norm(&self, rows: Rows<'_>) -> Array1<ReprReal<Self>>;

    /// Squared l2-norms of the selected rows.
    fn l2_norm2(&self, rows: Rows<'_>) -> Array1<ReprReal<Self>>;

    /// l2-norms of the selected rows.
    fn l2_norm(&self, rows: Rows<'_>) -> Array1<ReprReal<Self>> {
        self.l2_norm2(rows).mapv(Float::sqrt)
    }

    /// Position and modulus of the entry of largest modulus of each selected row. Only called for `dim() > 0`.
    fn amax(&self, rows: Rows<'_>) -> (Array1<usize>, Array1<ReprReal<Self>>);

    /// Entries `dofs` of the selected rows, one matrix row per vector. Every DOF is smaller than `dim()`.
    fn dofs(&self, rows: Rows<'_>, dofs: &[usize]) -> Array2<Self::Elem>;

    /// Real parts of the selected rows. Real backends keep the default.
    fn real(&self, rows: Rows<'_>) -> Self {
        self.gather(rows)
    }

    /// Imaginary parts of the selected rows. Real backends keep the default, which yields zero vectors.
    fn imag(&self, rows: Rows<'_>) -> Self {
        let mut res = self.gather(rows);
        res.scal(Rows::All, &Coeffs::Scalar(Self::Elem::zero()));
        res
    }

    /// Complex conjugates of the selected rows. Real backends keep the default.
    fn conj(&self, rows: Rows<'_>) -> Self {
        self.gather(rows)
    }

    /// Dense copy of the selected rows, one matrix row per vector.
    fn to_dense(&self, _rows: Rows<'_>) -> Result<Array2<Self::Elem>, VectorArrayError> {
        Err(VectorArrayError::not_supported("dense export"))
    }
}
