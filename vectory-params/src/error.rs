use thiserror::Error;

/// Error raised while building parameter types or interpreting parameter values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParameterError {
    /// Malformed parameter type or parameter value.
    #[error("invalid parameter specification: {0}")]
    Validation(String),
    /// The value does not belong to the expected parameter type, or a value was given where none is expected.
    #[error("parameter type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// The expected parameter type.
        expected: String,
        /// What was given instead.
        actual: String,
    },
    /// The names of a mapping do not match the names of the parameter type.
    #[error("components do not match: expected {expected:?}, got {actual:?}")]
    ComponentMismatch {
        /// Names of the parameter type.
        expected: Vec<String>,
        /// Names that were given.
        actual: Vec<String>,
    },
    /// A sequence has the wrong number of entries.
    #[error("parameter length does not match: expected {expected}, got {actual}")]
    LengthMismatch {
        /// Number of components of the parameter type.
        expected: usize,
        /// Number of entries that were given.
        actual: usize,
    },
    /// A component has the wrong shape.
    #[error("shape of component {name} does not match: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        /// The component.
        name: String,
        /// Declared shape.
        expected: Vec<usize>,
        /// Shape of the given value.
        actual: Vec<usize>,
    },
    /// Two parameter types declare the same name with different shapes.
    #[error("component dimensions of {name} do not match ({existing:?} and {incoming:?})")]
    Conflict {
        /// The global parameter name.
        name: String,
        /// Shape already in the merged type.
        existing: Vec<usize>,
        /// Shape of the conflicting declaration.
        incoming: Vec<usize>,
    },
}
