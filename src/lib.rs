//! Vector arrays and parameters for parametrized numerical models.
//!
//! This crate bundles the vectory workspace. Every member is re-exported under a short name, and
//! [`prelude`] collects the items most programs need.

/// vector arrays, spaces, views and index normalization
pub use vectory_core as vectors;

/// parameter types, parameters and the parametric capability
pub use vectory_params as params;

/// operators and operator-induced inner products
pub use vectory_linalg as linalg;

/// dense ndarray backend
pub use vectory_ndarray as nd;

pub mod prelude {
    //! A prelude module re-exporting commonly used items of all member crates.

    pub use vectory_core::prelude::*;
    pub use vectory_linalg::prelude::*;
    pub use vectory_ndarray::prelude::*;
    pub use vectory_params::prelude::*;
}
