use alloc::string::String;
use thiserror::Error;

/// Error raised by vector array operations and index handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VectorArrayError {
    /// An integer index does not address an element of the array.
    #[error("index {index} is out of range for length {len}")]
    IndexOutOfRange {
        /// The offending index, as given by the caller.
        index: isize,
        /// Length the index was checked against.
        len: usize,
    },
    /// A slice was constructed with step zero.
    #[error("slice step cannot be zero")]
    ZeroSliceStep,
    /// Illegal use of an array, e.g. appending to a view.
    #[error("usage error: {0}")]
    Usage(String),
    /// The operands belong to different vector spaces.
    #[error("vector spaces do not match")]
    SpaceMismatch,
    /// Lengths or dimensions of the operands are incompatible.
    #[error("dimension mismatch in {op}: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Name of the operation that detected the mismatch.
        op: &'static str,
        /// The admissible size.
        expected: usize,
        /// The size that was passed.
        actual: usize,
    },
    /// A DOF index is not smaller than the space dimension.
    #[error("dof index {index} is out of range for dimension {dim}")]
    DofOutOfRange {
        /// The offending DOF index.
        index: usize,
        /// Dimension of the space.
        dim: usize,
    },
    /// The array a view refers to has been dropped.
    #[error("the base array of this view has been dropped")]
    DanglingView,
    /// Vectors were deleted from the array a view refers to.
    #[error("the base array of this view was modified by a deletion")]
    StaleView,
    /// The backend does not provide the requested operation.
    #[error("not supported: {0}")]
    NotSupported(String),
}

impl VectorArrayError {
    pub(crate) fn usage(msg: &str) -> Self {
        Self::Usage(msg.into())
    }
    pub(crate) fn not_supported(msg: &str) -> Self {
        Self::NotSupported(msg.into())
    }
}
