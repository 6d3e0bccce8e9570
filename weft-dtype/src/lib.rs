//! The column type model for weft.
//!
//! This crate contains the closed set of column types ([`FieldType`]), the naming strategies that
//! translate host field names into column names, and (optionally) the bridge to Arrow schemas.

pub use decimal::*;
pub use dtype::*;
pub use field::*;
pub use logical::*;
pub use naming::*;
pub use nullability::*;
pub use ptype::*;
pub use record::*;
pub use temporal::*;

#[cfg(feature = "arrow")]
pub mod arrow;
mod decimal;
mod dtype;
mod field;
mod logical;
mod naming;
mod nullability;
mod ptype;
mod record;
mod temporal;
