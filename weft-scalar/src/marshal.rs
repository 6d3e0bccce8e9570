//! Coercion of host values into the exact shape of a column type.

use std::sync::Arc;

use weft_dtype::{Field, FieldPath, FieldType};
use weft_error::{ContextExt, WeftResult, weft_bail, weft_err};

use crate::decimal::{self, DecimalConfig};
use crate::temporal::{truncate_time, truncate_timestamp};
use crate::{PValue, Value};

/// What to do when a single value cannot be converted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValueErrorMode {
    /// Fail the record
    #[default]
    Fail,
    /// Replace the value with null when the column allows it, logging a warning
    NullOnError,
}

/// Converts `value` into the representation stored for a column of type `dtype`.
///
/// Integers are coerced to the declared width with a checked conversion, decimals are rescaled to
/// the declared precision and scale, temporal values are truncated to the column resolution and
/// nested values are visited recursively. `path` names the value in error messages.
pub fn marshal(
    value: Value,
    dtype: &FieldType,
    decimals: &DecimalConfig,
    path: &FieldPath,
) -> WeftResult<Value> {
    let value = match (value, dtype) {
        (Value::Null, dt) if dt.is_nullable() => Value::Null,
        (Value::Null, dt) => {
            weft_bail!(UnexpectedNull: "{path} is null but the column {dt} is not nullable")
        }
        (Value::Bool(b), FieldType::Bool(_)) => Value::Bool(b),
        (Value::Primitive(p), FieldType::Primitive(ptype, _)) => Value::Primitive(
            p.try_cast(*ptype)
                .with_context(|| format!("writing {path}"))?,
        ),
        (Value::Decimal(d), FieldType::Decimal(dt, _)) => Value::Decimal(
            decimal::rescale(d, dt, decimals.rounding())
                .with_context(|| format!("writing {path}"))?,
        ),
        (Value::Primitive(p), FieldType::Decimal(dt, _)) => {
            let d = match p {
                PValue::F32(f) => decimal::from_float(f64::from(f), dt, decimals.rounding()),
                PValue::F64(f) => decimal::from_float(f, dt, decimals.rounding()),
                int => int
                    .as_i64()
                    .ok_or_else(|| weft_err!(AssertionFailed: "integer {int} is not an i64"))
                    .and_then(|i| decimal::from_integer(i, dt)),
            };
            Value::Decimal(d.with_context(|| format!("writing {path}"))?)
        }
        (Value::Utf8(s), FieldType::Utf8(..)) => Value::Utf8(s),
        (Value::Binary(b), FieldType::Binary(..)) => Value::Binary(b),
        (Value::Utf8(s), FieldType::Binary(..)) => {
            Value::Binary(bytes::Bytes::copy_from_slice(s.as_bytes()))
        }
        (Value::Date(d), FieldType::Date(_)) => Value::Date(d),
        (Value::Time(t), FieldType::Time(_)) => Value::Time(truncate_time(t)?),
        (Value::Timestamp(ts), FieldType::Timestamp(unit, _)) => {
            Value::Timestamp(truncate_timestamp(ts, *unit)?)
        }
        (Value::List(items), FieldType::List(element, _)) => {
            let element_path = path.child(Field::Element);
            Value::List(
                items
                    .iter()
                    .map(|item| marshal(item.clone(), element, decimals, &element_path))
                    .collect::<WeftResult<Arc<[_]>>>()?,
            )
        }
        (Value::Map(entries), FieldType::Map(key, value, _)) => {
            let key_path = path.child(Field::Key);
            let value_path = path.child(Field::Value);
            Value::Map(
                entries
                    .iter()
                    .map(|(k, v)| {
                        Ok((
                            marshal(k.clone(), key, decimals, &key_path)?,
                            marshal(v.clone(), value, decimals, &value_path)?,
                        ))
                    })
                    .collect::<WeftResult<Arc<[_]>>>()?,
            )
        }
        (Value::Record(values), FieldType::Record(fields, _)) => {
            if values.len() != fields.len() {
                weft_bail!(
                    SchemaMismatch: "{path} has {} values but the record declares {} fields",
                    values.len(),
                    fields.len()
                );
            }
            Value::Record(
                values
                    .iter()
                    .zip(fields.iter())
                    .map(|(v, (name, dt))| {
                        marshal(v.clone(), dt, decimals, &path.child(name.as_ref()))
                    })
                    .collect::<WeftResult<Arc<[_]>>>()?,
            )
        }
        (value, dt) => {
            weft_bail!(SchemaMismatch: "{path}: a {} value cannot be written to a {dt} column", value.kind())
        }
    };
    Ok(value)
}
