//! Operators acting on vector arrays and inner products induced by them.

#![warn(missing_docs)]
#![no_std]
extern crate alloc;
#[cfg(test)]
extern crate std;

pub mod operator;

pub mod product;

pub mod error;

pub mod prelude {
    //! A prelude module re-exporting commonly used items.

    pub use crate::error::OperatorError;
    pub use crate::operator::Operator;
    pub use crate::product::ProductExt;
}
