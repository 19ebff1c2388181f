//! Parameters of vectory.
//!
//! A [`ParameterType`](parameter_type::ParameterType) declares names and shapes, a
//! [`Parameter`](parameter::Parameter) assigns tensors to them, and objects depending on a parameter expose a
//! [`ParameterProfile`](parametric::ParameterProfile) through the [`Parametric`](parametric::Parametric) trait.

#![warn(missing_docs)]

// core concepts

pub mod parameter_type;

pub mod parameter;

pub mod parametric;

pub mod space;

// common

pub mod config;

pub mod error;

pub mod prelude {
    //! A prelude module re-exporting commonly used items.

    pub use crate::config::FloatCmp;
    pub use crate::error::ParameterError;
    pub use crate::parameter::{parse_parameter, ParamValue, Parameter, ParameterInput};
    pub use crate::parameter_type::{ParameterType, Shape, ShapeSpec};
    pub use crate::parametric::{GlobalNames, ParameterProfile, Parametric, ProfileSpec};
    pub use crate::space::CubicParameterSpace;
}
