//! Index specifications and their normalization.
//!
//! Vector arrays accept three kinds of indices, mirroring numpy: a single (possibly negative) integer, a slice and a
//! list of (possibly negative, possibly repeated) integers. The functions in this module validate indices against an
//! array length, count the vectors they select and bring them into the length-independent [`NormInd`] form used by
//! views and deletions.

use alloc::collections::BTreeSet;
use alloc::vec::Vec;
use core::ops::{Range, RangeFrom, RangeFull, RangeTo};

use crate::error::VectorArrayError;

/// A slice `start:stop:step` with numpy semantics.
///
/// The step is never zero; see [`SliceSpec::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SliceSpec {
    start: Option<isize>,
    stop: Option<isize>,
    step: Option<isize>,
}

impl SliceSpec {
    /// The slice `:` selecting everything.
    pub const FULL: SliceSpec = SliceSpec {
        start: None,
        stop: None,
        step: None,
    };

    /// Creates a slice. Fails if `step` is `Some(0)`.
    pub fn new(
        start: Option<isize>,
        stop: Option<isize>,
        step: Option<isize>,
    ) -> Result<Self, VectorArrayError> {
        if step == Some(0) {
            return Err(VectorArrayError::ZeroSliceStep);
        }
        Ok(Self { start, stop, step })
    }

    /// Resolves the slice against a sequence of length `len`, returning `(start, stop, step)` exactly like Python's
    /// `slice.indices`.
    pub fn indices(&self, len: usize) -> (isize, isize, isize) {
        let len = len as isize;
        let step = self.step.unwrap_or(1);
        let (lower, upper) = if step < 0 { (-1, len - 1) } else { (0, len) };
        let clamp = |bound: isize| {
            let bound = if bound < 0 { bound + len } else { bound };
            bound.clamp(lower, upper)
        };
        let start = match self.start {
            Some(s) => clamp(s),
            None if step < 0 => upper,
            None => lower,
        };
        let stop = match self.stop {
            Some(s) => clamp(s),
            None if step < 0 => lower,
            None => upper,
        };
        (start, stop, step)
    }

    /// Number of elements the slice selects from a sequence of length `len`.
    pub fn len_for(&self, len: usize) -> usize {
        let (start, stop, step) = self.indices(len);
        range_len(start, stop, step)
    }

    fn normalize(&self, len: usize) -> NormInd {
        let (start, stop, step) = self.indices(len);
        let count = range_len(start, stop, step);
        NormInd::Range {
            start: if count == 0 { 0 } else { start as usize },
            step: if count <= 1 { 1 } else { step },
            len: count,
        }
    }
}

fn range_len(start: isize, stop: isize, step: isize) -> usize {
    if (step > 0 && start < stop) || (step < 0 && stop < start) {
        (start.abs_diff(stop) - 1) / step.unsigned_abs() + 1
    } else {
        0
    }
}

/// User facing index into a vector array.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Index {
    /// A single position; negative values count from the end.
    Int(isize),
    /// A slice.
    Slice(SliceSpec),
    /// Arbitrary positions, repetitions allowed; negative values count from the end.
    List(Vec<isize>),
}

impl Index {
    /// The index selecting all vectors.
    pub const ALL: Index = Index::Slice(SliceSpec::FULL);
}

impl From<SliceSpec> for Index {
    fn from(s: SliceSpec) -> Self {
        Index::Slice(s)
    }
}

impl From<RangeFull> for Index {
    fn from(_: RangeFull) -> Self {
        Index::ALL
    }
}

impl From<&Index> for Index {
    fn from(ind: &Index) -> Self {
        ind.clone()
    }
}

macro_rules! impl_index_from {
    ($($t:ty),*) => {$(
        impl From<$t> for Index {
            fn from(i: $t) -> Self {
                Index::Int(i as isize)
            }
        }
        impl From<Range<$t>> for Index {
            fn from(r: Range<$t>) -> Self {
                Index::Slice(SliceSpec { start: Some(r.start as isize), stop: Some(r.end as isize), step: None })
            }
        }
        impl From<RangeFrom<$t>> for Index {
            fn from(r: RangeFrom<$t>) -> Self {
                Index::Slice(SliceSpec { start: Some(r.start as isize), stop: None, step: None })
            }
        }
        impl From<RangeTo<$t>> for Index {
            fn from(r: RangeTo<$t>) -> Self {
                Index::Slice(SliceSpec { start: None, stop: Some(r.end as isize), step: None })
            }
        }
        impl From<Vec<$t>> for Index {
            fn from(v: Vec<$t>) -> Self {
                Index::List(v.into_iter().map(|i| i as isize).collect())
            }
        }
        impl From<&[$t]> for Index {
            fn from(v: &[$t]) -> Self {
                Index::List(v.iter().map(|&i| i as isize).collect())
            }
        }
        impl<const N: usize> From<[$t; N]> for Index {
            fn from(v: [$t; N]) -> Self {
                Index::List(v.iter().map(|&i| i as isize).collect())
            }
        }
    )*};
}

impl_index_from!(i32, i64, isize, usize);

/// Canonical, length independent form of an index. All positions are non-negative.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NormInd {
    /// Positions `start + k * step` for `k` in `0..len`.
    Range {
        /// First position (`0` if `len == 0`).
        start: usize,
        /// Non-zero stride.
        step: isize,
        /// Number of positions.
        len: usize,
    },
    /// Explicit positions.
    List(Vec<usize>),
}

impl NormInd {
    /// Number of selected positions, counting repetitions.
    pub fn len(&self) -> usize {
        match self {
            NormInd::Range { len, .. } => *len,
            NormInd::List(l) => l.len(),
        }
    }

    /// Whether no position is selected.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The `k`-th selected position. `k` must be smaller than [`NormInd::len`].
    pub fn get(&self, k: usize) -> usize {
        match self {
            NormInd::Range { start, step, .. } => (*start as isize + k as isize * step) as usize,
            NormInd::List(l) => l[k],
        }
    }

    /// Iterates over the selected positions in order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len()).map(move |k| self.get(k))
    }

    /// Whether no position is selected twice.
    pub fn is_unique(&self) -> bool {
        match self {
            NormInd::Range { .. } => true,
            NormInd::List(l) => l.iter().collect::<BTreeSet<_>>().len() == l.len(),
        }
    }

    /// Borrowed form handed to storage backends.
    pub fn as_rows(&self) -> Rows<'_> {
        match self {
            NormInd::Range { start, step, len } => Rows::Range {
                start: *start,
                step: *step,
                len: *len,
            },
            NormInd::List(l) => Rows::List(l),
        }
    }

    /// Composes `self` with an index into the selection, so that indexing with the result is the same as first
    /// selecting `self` and then `ind`.
    pub fn compose(&self, ind: &Index) -> Result<NormInd, VectorArrayError> {
        let inner = normalize_ind(ind, self.len())?;
        let composed = match (self, &inner) {
            (_, NormInd::Range { start: s, len, .. }) if *len <= 1 => Some(NormInd::Range {
                start: if *len == 0 { 0 } else { self.get(*s) },
                step: 1,
                len: *len,
            }),
            // overflowing step products fall back to explicit positions
            (NormInd::Range { step, .. }, NormInd::Range { start: s, step: st, len }) => {
                step.checked_mul(*st).map(|step| NormInd::Range {
                    start: self.get(*s),
                    step,
                    len: *len,
                })
            }
            _ => None,
        };
        Ok(composed.unwrap_or_else(|| NormInd::List(inner.iter().map(|k| self.get(k)).collect())))
    }
}

/// Row selection passed from vector arrays to storage backends.
///
/// Positions are guaranteed to be valid for the storage they are passed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rows<'a> {
    /// Every row of the storage.
    All,
    /// Rows `start + k * step` for `k` in `0..len`.
    Range {
        /// First row.
        start: usize,
        /// Non-zero stride.
        step: isize,
        /// Number of rows.
        len: usize,
    },
    /// Explicit rows, possibly repeated.
    List(&'a [usize]),
}

impl Rows<'_> {
    /// Number of selected rows when the storage holds `total` rows.
    pub fn count(&self, total: usize) -> usize {
        match self {
            Rows::All => total,
            Rows::Range { len, .. } => *len,
            Rows::List(l) => l.len(),
        }
    }

    /// The `k`-th selected row.
    pub fn get(&self, k: usize) -> usize {
        match self {
            Rows::All => k,
            Rows::Range { start, step, .. } => (*start as isize + k as isize * step) as usize,
            Rows::List(l) => l[k],
        }
    }

    /// Materializes the selected rows.
    pub fn positions(&self, total: usize) -> Vec<usize> {
        (0..self.count(total)).map(|k| self.get(k)).collect()
    }
}

fn in_range(i: isize, len: usize) -> bool {
    let len = len as isize;
    -len <= i && i < len
}

fn wrap(i: isize, len: usize) -> usize {
    if i < 0 {
        (i + len as isize) as usize
    } else {
        i as usize
    }
}

/// Whether `ind` is an admissible index for a sequence of length `len`.
pub fn check_ind(ind: &Index, len: usize) -> bool {
    match ind {
        Index::Int(i) => in_range(*i, len),
        Index::Slice(_) => true,
        Index::List(l) => l.iter().all(|&i| in_range(i, len)),
    }
}

/// Like [`check_ind`], additionally requiring that no position is addressed twice.
pub fn check_ind_unique(ind: &Index, len: usize) -> bool {
    match ind {
        Index::Int(i) => in_range(*i, len),
        Index::Slice(_) => true,
        Index::List(l) => {
            l.iter().all(|&i| in_range(i, len))
                && l.iter().map(|&i| wrap(i, len)).collect::<BTreeSet<_>>().len() == l.len()
        }
    }
}

/// Number of vectors `ind` selects from a sequence of length `len`, counting repetitions.
pub fn len_ind(ind: &Index, len: usize) -> usize {
    match ind {
        Index::Int(_) => 1,
        Index::Slice(s) => s.len_for(len),
        Index::List(l) => l.len(),
    }
}

/// Number of distinct positions `ind` selects from a sequence of length `len`.
pub fn len_ind_unique(ind: &Index, len: usize) -> usize {
    match ind {
        Index::Int(_) => 1,
        Index::Slice(s) => s.len_for(len),
        Index::List(l) => l.iter().map(|&i| wrap(i, len)).collect::<BTreeSet<_>>().len(),
    }
}

/// Validates `ind` against `len` and brings it into canonical form.
pub fn normalize_ind(ind: &Index, len: usize) -> Result<NormInd, VectorArrayError> {
    match ind {
        Index::Int(i) => {
            if !in_range(*i, len) {
                return Err(VectorArrayError::IndexOutOfRange { index: *i, len });
            }
            Ok(NormInd::Range {
                start: wrap(*i, len),
                step: 1,
                len: 1,
            })
        }
        Index::Slice(s) => Ok(s.normalize(len)),
        Index::List(l) => l
            .iter()
            .map(|&i| {
                if in_range(i, len) {
                    Ok(wrap(i, len))
                } else {
                    Err(VectorArrayError::IndexOutOfRange { index: i, len })
                }
            })
            .collect::<Result<Vec<_>, _>>()
            .map(NormInd::List),
    }
}

/// Index expressing `a[ind][ind_ind]` directly against a sequence `a` of length `len`.
pub fn sub_index(ind: &Index, ind_ind: &Index, len: usize) -> Result<NormInd, VectorArrayError> {
    normalize_ind(ind, len)?.compose(ind_ind)
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;

    use super::*;

    fn slice(start: Option<isize>, stop: Option<isize>, step: Option<isize>) -> Index {
        Index::Slice(SliceSpec::new(start, stop, step).unwrap())
    }

    #[test]
    fn slice_indices_match_python() {
        assert_eq!(SliceSpec::FULL.indices(5), (0, 5, 1));
        let s = SliceSpec::new(None, None, Some(-1)).unwrap();
        assert_eq!(s.indices(5), (4, -1, -1));
        assert_eq!(s.len_for(5), 5);
        let s = SliceSpec::new(Some(-2), None, None).unwrap();
        assert_eq!(s.indices(5), (3, 5, 1));
        let s = SliceSpec::new(Some(10), Some(-10), Some(-3)).unwrap();
        assert_eq!(s.indices(5), (4, -1, -3));
        assert_eq!(s.len_for(5), 2);
        assert_eq!(SliceSpec::new(Some(3), Some(1), None).unwrap().len_for(5), 0);
    }

    #[test]
    fn zero_step_is_rejected() {
        assert_eq!(
            SliceSpec::new(None, None, Some(0)),
            Err(VectorArrayError::ZeroSliceStep)
        );
    }

    #[test]
    fn checks_and_counts() {
        let l = Index::from([0, -1, 0]);
        assert!(check_ind(&l, 3));
        assert!(!check_ind_unique(&l, 3));
        assert!(check_ind_unique(&Index::from([0, -1]), 3));
        assert!(!check_ind_unique(&Index::from([2, -1]), 3));
        assert!(!check_ind(&Index::Int(3), 3));
        assert!(check_ind(&Index::Int(-3), 3));
        assert!(!check_ind(&Index::Int(-4), 3));
        assert_eq!(len_ind(&l, 3), 3);
        assert_eq!(len_ind_unique(&l, 3), 2);
        assert_eq!(len_ind(&Index::from(1..), 3), 2);
    }

    #[test]
    fn normalize_negative() -> Result<(), VectorArrayError> {
        assert_eq!(normalize_ind(&Index::Int(-1), 5)?, NormInd::Range { start: 4, step: 1, len: 1 });
        assert_eq!(normalize_ind(&Index::from(vec![-1, 0, -1]), 5)?, NormInd::List(vec![4, 0, 4]));
        let r = normalize_ind(&Index::from(-2..), 5)?;
        assert_eq!(r.iter().collect::<Vec<_>>(), vec![3, 4]);
        assert_eq!(
            normalize_ind(&Index::from([5]), 5),
            Err(VectorArrayError::IndexOutOfRange { index: 5, len: 5 })
        );
        Ok(())
    }

    #[test]
    fn compose_ranges_stays_range() -> Result<(), VectorArrayError> {
        let r = sub_index(&slice(Some(1), None, Some(2)), &slice(None, None, Some(-1)), 8)?;
        assert_eq!(r, NormInd::Range { start: 7, step: -2, len: 4 });
        Ok(())
    }

    #[test]
    fn extreme_steps() -> Result<(), VectorArrayError> {
        assert_eq!(len_ind(&slice(None, None, Some(isize::MIN)), 5), 1);
        assert_eq!(len_ind(&slice(None, None, Some(isize::MAX)), 5), 1);
        assert_eq!(SliceSpec::new(None, None, Some(isize::MIN))?.indices(5), (4, -1, isize::MIN));
        assert_eq!(
            normalize_ind(&slice(None, None, Some(isize::MIN)), 5)?,
            NormInd::Range { start: 4, step: 1, len: 1 }
        );

        let r = sub_index(&slice(None, None, Some(isize::MAX)), &slice(None, None, Some(2)), 5)?;
        assert_eq!(r, NormInd::Range { start: 0, step: 1, len: 1 });
        let r = sub_index(&slice(None, None, Some(isize::MIN + 1)), &slice(None, None, Some(-3)), 5)?;
        assert_eq!(r.iter().collect::<Vec<_>>(), vec![4]);
        Ok(())
    }
}
