//! Write models: how host records become record columns.
//!
//! A [`WriteRecordModel`] is an ordered list of named, typed fields, each with an accessor reading
//! its value from a host record. Models are built programmatically with
//! [`WriteRecordModel::builder`] or declared with [`record_model!`], which assembles the same
//! builder calls. A [`RecordWriter`] marshals records through a model into a
//! [`RecordSink`](weft_io::RecordSink).

pub use accessor::{Accessor, ClosureAccessor, PrimitiveAccessor};
pub use model::{RecordType, WriteField, WriteModelBuilder, WriteRecordModel};
#[cfg(feature = "serde")]
pub use options::deserialize_batch_size;
pub use options::{DEFAULT_BATCH_SIZE, WriteOptions, check_batch_size};
pub use writer::RecordWriter;

mod accessor;
mod macros;
mod model;
mod options;
mod writer;

static_assertions::assert_impl_all!(WriteRecordModel<String>: Send, Sync);

#[doc(hidden)]
pub mod __private {
    use std::vec::IntoIter;

    pub use weft_dtype::{DecimalDType, FieldType, LogicalTag};
    pub use weft_error::WeftResult;
    pub use weft_scalar::{FieldOverrides, ScalarType, TypeContext, Value};
    use weft_error::{ContextExt, weft_bail, weft_err};

    use crate::RecordType;

    /// The column type of a declared record used as a field.
    pub fn record_field_type<T: RecordType>(ctx: &TypeContext<'_>) -> WeftResult<FieldType> {
        if ctx.overrides() != &FieldOverrides::default() {
            weft_bail!(SchemaMismatch: "field options cannot be applied to a record field");
        }
        Ok(T::write_model(&ctx.nested())?.field_type().clone())
    }

    /// The field values of a declared record, checked against the number of declared fields.
    pub fn record_values(value: Value, name: &str, fields: usize) -> WeftResult<IntoIter<Value>> {
        match value {
            Value::Record(values) if values.len() == fields => Ok(values.to_vec().into_iter()),
            Value::Record(values) => Err(weft_err!(
                SchemaMismatch: "{name} declares {fields} fields but the value holds {}",
                values.len()
            )),
            Value::Null => Err(weft_err!(UnexpectedNull: "{name} is null")),
            other => Err(weft_err!(
                SchemaMismatch: "expected {name} but found a {} value",
                other.kind()
            )),
        }
    }

    /// Reads the next field of a declared record.
    pub fn field_from_value<F: ScalarType>(values: &mut IntoIter<Value>, name: &str) -> WeftResult<F> {
        F::from_value(values.next().unwrap_or(Value::Null))
            .with_context(|| format!("reading field {name}"))
    }
}
