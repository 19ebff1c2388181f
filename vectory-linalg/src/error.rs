use alloc::string::String;
use thiserror::Error;
use vectory_core::error::VectorArrayError;
use vectory_params::error::ParameterError;

/// Error raised when applying an operator.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OperatorError {
    /// Invalid operand arrays.
    #[error(transparent)]
    Array(#[from] VectorArrayError),
    /// Invalid parameter.
    #[error(transparent)]
    Parameter(#[from] ParameterError),
    /// The operator does not provide the requested operation.
    #[error("not supported: {0}")]
    NotSupported(String),
    /// The operator cannot be inverted.
    #[error("operator is singular")]
    Singular,
}
