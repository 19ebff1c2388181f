//! Vector arrays: ordered, mutable collections of vectors of one space.
//!
//! # Storage and aliasing
//!
//! An owned array keeps its storage in a slot shared with the views created from it. The slot holds the backend
//! storage behind an `Rc`, which is what makes [`VectorArray::copy`] cheap: a shallow copy shares that `Rc` with its
//! source, and the first in-place operation on either side materializes independent storage.
//!
//! Views ([`VectorArray::index`]) hold a non-owning back-reference to the slot of their base array together with
//! the selected positions. Scaling or `axpy` through a view modifies the base storage, hence every other view of the
//! same elements. Views never keep their base alive. Using a view after its base has been dropped fails with
//! [`VectorArrayError::DanglingView`], using it after vectors were removed from the base fails with
//! [`VectorArrayError::StaleView`].
//!
//! Arrays are neither `Send` nor `Sync`. Backends wrapping external solvers are generally not thread safe, so arrays
//! of one space must not be used from several threads.

use alloc::{
    rc::{Rc, Weak},
    vec::Vec,
};
use core::{
    cell::{RefCell, RefMut},
    fmt,
    mem,
    ops::{Add, Mul, Neg, Sub},
};

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use num_traits::One;

use crate::{
    args::Coeffs,
    error::VectorArrayError,
    index::{normalize_ind, Index, NormInd, Rows},
    repr::VectorRepr,
    scalar::Scalar,
    space::VectorSpace,
};

/// Element type of arrays of the space `S`.
pub type Elem<S> = <<S as VectorSpace>::Repr as VectorRepr>::Elem;
/// Real type of arrays of the space `S`.
pub type Real<S> = <Elem<S> as Scalar>::Real;

struct Slot<R> {
    data: Rc<R>,
    // bumped whenever vectors are removed, outdating existing views
    generation: u64,
}

type SlotCell<R> = RefCell<Slot<R>>;

// Borrows of a slot never outlive a method call, and a mutable borrow is only taken after all arguments sharing the
// slot have been copied out. Shared borrows therefore cannot fail. A mutable borrow fails if it is requested from
// inside a `with_repr` closure reading the same storage, which is reported as a usage error.
enum Handle<R> {
    Owned(Rc<SlotCell<R>>),
    View {
        base: Weak<SlotCell<R>>,
        ind: NormInd,
        unique: bool,
        generation: u64,
    },
}

/// An ordered collection of vectors of the space `S`.
pub struct VectorArray<S: VectorSpace> {
    space: S,
    handle: Handle<S::Repr>,
}

fn rows_of(ind: Option<&NormInd>) -> Rows<'_> {
    ind.map_or(Rows::All, NormInd::as_rows)
}

fn slot_mut<R>(cell: &SlotCell<R>) -> Result<RefMut<'_, Slot<R>>, VectorArrayError> {
    cell.try_borrow_mut()
        .map_err(|_| VectorArrayError::usage("cannot modify vectors while they are borrowed by `with_repr`"))
}

impl<S: VectorSpace> VectorArray<S> {
    pub(crate) fn from_repr_unchecked(space: S, repr: S::Repr) -> Self {
        Self {
            space,
            handle: Handle::Owned(Rc::new(RefCell::new(Slot {
                data: Rc::new(repr),
                generation: 0,
            }))),
        }
    }

    fn target(&self) -> Result<(Rc<SlotCell<S::Repr>>, Option<&NormInd>), VectorArrayError> {
        match &self.handle {
            Handle::Owned(cell) => Ok((Rc::clone(cell), None)),
            Handle::View {
                base,
                ind,
                generation,
                ..
            } => {
                let cell = base.upgrade().ok_or(VectorArrayError::DanglingView)?;
                if cell.borrow().generation != *generation {
                    return Err(VectorArrayError::StaleView);
                }
                Ok((cell, Some(ind)))
            }
        }
    }

    fn shares_storage(&self, other: &Self) -> bool {
        let ptr = |a: &Self| match &a.handle {
            Handle::Owned(cell) => Rc::as_ptr(cell),
            Handle::View { base, .. } => base.as_ptr(),
        };
        core::ptr::eq(ptr(self), ptr(other))
    }

    fn wrap(&self, repr: S::Repr) -> Self {
        Self::from_repr_unchecked(self.space.clone(), repr)
    }

    /// Runs `f` on the backend storage and the rows this array refers to.
    ///
    /// While `f` runs, in-place operations on arrays sharing the storage fail with [`VectorArrayError::Usage`].
    pub fn with_repr<T>(&self, f: impl FnOnce(&S::Repr, Rows<'_>) -> T) -> Result<T, VectorArrayError> {
        let (cell, ind) = self.target()?;
        let slot = cell.borrow();
        Ok(f(&*slot.data, rows_of(ind)))
    }

    fn with_repr_mut<T>(&mut self, f: impl FnOnce(&mut S::Repr, Rows<'_>) -> T) -> Result<T, VectorArrayError> {
        if let Handle::View { unique: false, .. } = &self.handle {
            return Err(VectorArrayError::usage(
                "cannot modify a view with repeated indices in place",
            ));
        }
        let (cell, ind) = self.target()?;
        let mut slot = slot_mut(&cell)?;
        if Rc::strong_count(&slot.data) > 1 {
            log::trace!("materializing shared storage of {} vectors", slot.data.len());
        }
        Ok(f(Rc::make_mut(&mut slot.data), rows_of(ind)))
    }

    fn gathered(&self) -> Result<S::Repr, VectorArrayError> {
        self.with_repr(|r, rows| match rows {
            Rows::All => r.clone(),
            rows => r.gather(rows),
        })
    }

    fn check_space(&self, other: &Self) -> Result<(), VectorArrayError> {
        if self.space != other.space {
            return Err(VectorArrayError::SpaceMismatch);
        }
        Ok(())
    }

    fn check_coeffs(&self, alpha: &Coeffs<Elem<S>>, op: &'static str) -> Result<(), VectorArrayError> {
        match alpha.len() {
            Some(n) if n != self.len() => Err(VectorArrayError::DimensionMismatch {
                op,
                expected: self.len(),
                actual: n,
            }),
            _ => Ok(()),
        }
    }

    /// The space the vectors belong to.
    pub fn space(&self) -> &S {
        &self.space
    }

    /// Dimension of the vectors.
    pub fn dim(&self) -> usize {
        self.space.dim()
    }

    /// Number of vectors.
    pub fn len(&self) -> usize {
        match &self.handle {
            Handle::Owned(cell) => cell.borrow().data.len(),
            Handle::View { ind, .. } => ind.len(),
        }
    }

    /// Whether the array holds no vectors.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether this array is a view into another array.
    pub fn is_view(&self) -> bool {
        matches!(self.handle, Handle::View { .. })
    }

    /// `count` zero vectors of the same space.
    pub fn zeros(&self, count: usize) -> Self {
        self.wrap(self.space.zeros_repr(count, 0))
    }

    /// Empty array of the same space.
    pub fn empty(&self) -> Self {
        self.zeros(0)
    }

    /// View of the vectors selected by `ind`.
    ///
    /// Views of views refer directly to the base storage.
    pub fn index(&self, ind: impl Into<Index>) -> Result<Self, VectorArrayError> {
        let ind = ind.into();
        let (base, ind, generation) = match &self.handle {
            Handle::Owned(cell) => {
                let slot = cell.borrow();
                let norm = normalize_ind(&ind, slot.data.len())?;
                (Rc::downgrade(cell), norm, slot.generation)
            }
            Handle::View {
                base,
                ind: own,
                generation,
                ..
            } => {
                self.target()?;
                (base.clone(), own.compose(&ind)?, *generation)
            }
        };
        log::trace!("view of {} vectors", ind.len());
        Ok(Self {
            space: self.space.clone(),
            handle: Handle::View {
                base,
                unique: ind.is_unique(),
                ind,
                generation,
            },
        })
    }

    /// Copy of the array.
    ///
    /// A shallow copy (`deep == false`) of an owned array shares its storage until one of the two is modified in
    /// place. Copies of views are always independent.
    pub fn copy(&self, deep: bool) -> Result<Self, VectorArrayError> {
        let data = match &self.handle {
            Handle::Owned(cell) => {
                let slot = cell.borrow();
                if deep {
                    Rc::new((*slot.data).clone())
                } else {
                    Rc::clone(&slot.data)
                }
            }
            Handle::View { .. } => Rc::new(self.gathered()?),
        };
        Ok(Self {
            space: self.space.clone(),
            handle: Handle::Owned(Rc::new(RefCell::new(Slot { data, generation: 0 }))),
        })
    }

    /// Appends the vectors of `other`.
    ///
    /// With `remove_from_other`, the vectors are removed from `other`, which allows moving instead of copying the
    /// storage. Fails for views.
    pub fn append(&mut self, other: &mut Self, remove_from_other: bool) -> Result<(), VectorArrayError> {
        if self.is_view() {
            return Err(VectorArrayError::usage("cannot append to a view"));
        }
        self.check_space(other)?;
        let incoming = match &other.handle {
            Handle::View { .. } if remove_from_other => {
                return Err(VectorArrayError::usage("cannot remove vectors from a view"));
            }
            Handle::Owned(cell) if remove_from_other => {
                let mut slot = slot_mut(cell)?;
                let data = mem::replace(&mut slot.data, Rc::new(other.space.zeros_repr(0, 0)));
                slot.generation += 1;
                Rc::try_unwrap(data).unwrap_or_else(|shared| {
                    log::debug!("copying {} shared vectors on append", shared.len());
                    (*shared).clone()
                })
            }
            _ => other.gathered()?,
        };
        log::debug!("appending {} vectors", incoming.len());
        self.with_repr_mut(|r, _| r.append(incoming))?
    }

    /// Removes the vectors selected by `ind`. Fails for views.
    ///
    /// Outstanding views of this array become stale.
    pub fn remove(&mut self, ind: impl Into<Index>) -> Result<(), VectorArrayError> {
        let cell = match &self.handle {
            Handle::Owned(cell) => Rc::clone(cell),
            Handle::View { .. } => {
                return Err(VectorArrayError::usage("cannot delete vectors from a view"));
            }
        };
        let mut slot = slot_mut(&cell)?;
        let ind = normalize_ind(&ind.into(), slot.data.len())?;
        let mut rows: Vec<usize> = ind.iter().collect();
        rows.sort_unstable();
        rows.dedup();
        if rows.is_empty() {
            return Ok(());
        }
        log::debug!("removing {} of {} vectors", rows.len(), slot.data.len());
        Rc::make_mut(&mut slot.data).remove(&rows);
        slot.generation += 1;
        Ok(())
    }

    /// Scales every vector by `alpha`, a single factor or one factor per vector.
    ///
    /// Scaling a view scales the corresponding vectors of its base.
    pub fn scal(&mut self, alpha: impl Into<Coeffs<Elem<S>>>) -> Result<(), VectorArrayError> {
        let alpha = alpha.into();
        self.check_coeffs(&alpha, "scal")?;
        self.with_repr_mut(|r, rows| r.scal(rows, &alpha))
    }

    /// `self += alpha * x`. `x` holds either one vector, which is added to every vector, or `len()` vectors.
    pub fn axpy(&mut self, alpha: impl Into<Coeffs<Elem<S>>>, x: &Self) -> Result<(), VectorArrayError> {
        self.check_space(x)?;
        let alpha = alpha.into();
        self.check_coeffs(&alpha, "axpy")?;
        let (len, x_len) = (self.len(), x.len());
        if x_len != 1 && x_len != len {
            return Err(VectorArrayError::DimensionMismatch {
                op: "axpy",
                expected: len,
                actual: x_len,
            });
        }
        if self.shares_storage(x) {
            let x = x.gathered()?;
            return self.with_repr_mut(|r, rows| r.axpy(rows, &alpha, &x, Rows::All));
        }
        let (x_cell, x_ind) = x.target()?;
        let x_slot = x_cell.borrow();
        self.with_repr_mut(|r, rows| r.axpy(rows, &alpha, &*x_slot.data, rows_of(x_ind)))
    }

    /// Matrix of inner products `(self[i], other[j])`, antilinear in `self`.
    pub fn dot(&self, other: &Self) -> Result<Array2<Elem<S>>, VectorArrayError> {
        self.check_space(other)?;
        let (a_cell, a_ind) = self.target()?;
        let (b_cell, b_ind) = other.target()?;
        let (a, b) = (a_cell.borrow(), b_cell.borrow());
        Ok(a.data.dot(rows_of(a_ind), &*b.data, rows_of(b_ind)))
    }

    /// Inner products `(self[i], other[i])`, antilinear in `self`.
    pub fn pairwise_dot(&self, other: &Self) -> Result<Array1<Elem<S>>, VectorArrayError> {
        self.check_space(other)?;
        if self.len() != other.len() {
            return Err(VectorArrayError::DimensionMismatch {
                op: "pairwise_dot",
                expected: self.len(),
                actual: other.len(),
            });
        }
        let (a_cell, a_ind) = self.target()?;
        let (b_cell, b_ind) = other.target()?;
        let (a, b) = (a_cell.borrow(), b_cell.borrow());
        Ok(a.data.pairwise_dot(rows_of(a_ind), &*b.data, rows_of(b_ind)))
    }

    /// Linear combinations: row `i` of `coefficients` yields the `i`-th vector of the result.
    pub fn lincomb(&self, coefficients: ArrayView2<'_, Elem<S>>) -> Result<Self, VectorArrayError> {
        if coefficients.ncols() != self.len() {
            return Err(VectorArrayError::DimensionMismatch {
                op: "lincomb",
                expected: self.len(),
                actual: coefficients.ncols(),
            });
        }
        let repr = self.with_repr(|r, rows| r.lincomb(rows, coefficients))?;
        Ok(self.wrap(repr))
    }

    /// Single linear combination of the vectors.
    pub fn lincomb_vec(&self, coefficients: ArrayView1<'_, Elem<S>>) -> Result<Self, VectorArrayError> {
        self.lincomb(coefficients.insert_axis(Axis(0)))
    }

    /// l1-norms of the vectors.
    pub fn l1_norm(&self) -> Result<Array1<Real<S>>, VectorArrayError> {
        self.with_repr(|r, rows| r.l1_norm(rows))
    }

    /// l2-norms of the vectors.
    pub fn l2_norm(&self) -> Result<Array1<Real<S>>, VectorArrayError> {
        self.with_repr(|r, rows| r.l2_norm(rows))
    }

    /// Squared l2-norms of the vectors.
    pub fn l2_norm2(&self) -> Result<Array1<Real<S>>, VectorArrayError> {
        self.with_repr(|r, rows| r.l2_norm2(rows))
    }

    /// l-infinity norms of the vectors. All zero for spaces of dimension zero.
    pub fn sup_norm(&self) -> Result<Array1<Real<S>>, VectorArrayError> {
        if self.dim() == 0 {
            return Ok(Array1::zeros(self.len()));
        }
        Ok(self.amax()?.1)
    }

    /// For each vector, the index and modulus of its entry of largest modulus.
    pub fn amax(&self) -> Result<(Array1<usize>, Array1<Real<S>>), VectorArrayError> {
        if self.dim() == 0 {
            return Err(VectorArrayError::usage("amax of vectors of dimension zero"));
        }
        self.with_repr(|r, rows| r.amax(rows))
    }

    /// The entries `dofs` of every vector, one row per vector.
    pub fn dofs(&self, dofs: &[usize]) -> Result<Array2<Elem<S>>, VectorArrayError> {
        let dim = self.dim();
        if let Some(&index) = dofs.iter().find(|&&d| d >= dim) {
            return Err(VectorArrayError::DofOutOfRange { index, dim });
        }
        self.with_repr(|r, rows| r.dofs(rows, dofs))
    }

    /// Real parts of the vectors.
    pub fn real(&self) -> Result<Self, VectorArrayError> {
        let repr = self.with_repr(|r, rows| r.real(rows))?;
        Ok(self.wrap(repr))
    }

    /// Imaginary parts of the vectors.
    pub fn imag(&self) -> Result<Self, VectorArrayError> {
        let repr = self.with_repr(|r, rows| r.imag(rows))?;
        Ok(self.wrap(repr))
    }

    /// Complex conjugates of the vectors.
    pub fn conj(&self) -> Result<Self, VectorArrayError> {
        let repr = self.with_repr(|r, rows| r.conj(rows))?;
        Ok(self.wrap(repr))
    }

    /// Dense copy of the vectors, one row per vector.
    pub fn to_numpy(&self) -> Result<Array2<Elem<S>>, VectorArrayError> {
        self.with_repr(|r, rows| r.to_dense(rows))?
    }

    /// `self += other`.
    pub fn iadd(&mut self, other: &Self) -> Result<(), VectorArrayError> {
        self.axpy(Coeffs::Scalar(<Elem<S> as One>::one()), other)
    }

    /// `self -= other`.
    pub fn isub(&mut self, other: &Self) -> Result<(), VectorArrayError> {
        self.axpy(Coeffs::Scalar(-<Elem<S> as One>::one()), other)
    }

    /// `self *= alpha`.
    pub fn imul(&mut self, alpha: impl Into<Coeffs<Elem<S>>>) -> Result<(), VectorArrayError> {
        self.scal(alpha)
    }
}

impl<S: VectorSpace> fmt::Debug for VectorArray<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VectorArray")
            .field("space", &self.space)
            .field("len", &self.len())
            .field("view", &self.is_view())
            .finish()
    }
}

impl<S: VectorSpace> Add<&VectorArray<S>> for &VectorArray<S> {
    type Output = Result<VectorArray<S>, VectorArrayError>;
    fn add(self, rhs: &VectorArray<S>) -> Self::Output {
        let mut res = self.copy(false)?;
        res.iadd(rhs)?;
        Ok(res)
    }
}

impl<S: VectorSpace> Sub<&VectorArray<S>> for &VectorArray<S> {
    type Output = Result<VectorArray<S>, VectorArrayError>;
    fn sub(self, rhs: &VectorArray<S>) -> Self::Output {
        let mut res = self.copy(false)?;
        res.isub(rhs)?;
        Ok(res)
    }
}

impl<S: VectorSpace> Mul<Elem<S>> for &VectorArray<S> {
    type Output = Result<VectorArray<S>, VectorArrayError>;
    fn mul(self, rhs: Elem<S>) -> Self::Output {
        let mut res = self.copy(false)?;
        res.scal(Coeffs::Scalar(rhs))?;
        Ok(res)
    }
}

impl<S: VectorSpace> Neg for &VectorArray<S> {
    type Output = Result<VectorArray<S>, VectorArrayError>;
    fn neg(self) -> Self::Output {
        self * -<Elem<S> as One>::one()
    }
}

/// Adding the integer `0` copies the array, so that arrays can be summed starting from `0`. Any other integer is an
/// error.
impl<S: VectorSpace> Add<i32> for &VectorArray<S> {
    type Output = Result<VectorArray<S>, VectorArrayError>;
    fn add(self, rhs: i32) -> Self::Output {
        if rhs != 0 {
            return Err(VectorArrayError::usage("only 0 can be added to a vector array"));
        }
        self.copy(false)
    }
}

impl<S: VectorSpace> Add<&VectorArray<S>> for i32 {
    type Output = Result<VectorArray<S>, VectorArrayError>;
    fn add(self, rhs: &VectorArray<S>) -> Self::Output {
        rhs + self
    }
}
