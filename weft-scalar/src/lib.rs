//! Column values and the conversions between host values and column values.
//!
//! [`Value`] is the unit exchanged with the storage engine. [`ScalarType`] binds host Rust types
//! to column types, and [`marshal`] coerces a value into the exact representation of its column.

pub use decimal::{DecimalConfig, RoundingMode, from_float, from_integer, rescale, unscaled_digits};
pub use marshal::{ValueErrorMode, marshal};
pub use pvalue::PValue;
pub use record::GenericRecord;
pub use scalar_type::{FieldOverrides, ScalarType, TypeContext};
pub use temporal::{convert_timestamp, truncate_time, truncate_timestamp};
pub use value::Value;

mod decimal;
mod marshal;
mod pvalue;
mod record;
mod scalar_type;
mod temporal;
mod value;
