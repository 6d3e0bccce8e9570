use std::fmt::{Display, Formatter, Write};
use std::sync::Arc;

use bytes::Bytes;
use itertools::Itertools;
use jiff::civil::{Date, DateTime, Time};
use rust_decimal::Decimal;
use weft_dtype::{FieldType, PType};

use crate::pvalue::PValue;

/// A single column value, the unit exchanged with the storage engine.
///
/// A `Value` does not know its [`FieldType`]; the write model and the read plan pair every value
/// with the type it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// An absent value
    Null,
    Bool(bool),
    Primitive(PValue),
    Decimal(Decimal),
    Utf8(Arc<str>),
    Binary(Bytes),
    Date(Date),
    /// Time of day, microsecond resolution
    Time(Time),
    /// Local timestamp, resolution given by the column type
    Timestamp(DateTime),
    List(Arc<[Value]>),
    /// Entries in insertion order
    Map(Arc<[(Value, Value)]>),
    /// Field values in declaration order
    Record(Arc<[Value]>),
}

impl Value {
    /// Returns `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short name of the kind of value, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Primitive(p) => match p.ptype() {
                PType::I8 => "i8",
                PType::I16 => "i16",
                PType::I32 => "i32",
                PType::I64 => "i64",
                PType::F32 => "f32",
                PType::F64 => "f64",
            },
            Value::Decimal(_) => "decimal",
            Value::Utf8(_) => "utf8",
            Value::Binary(_) => "binary",
            Value::Date(_) => "date",
            Value::Time(_) => "time",
            Value::Timestamp(_) => "timestamp",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Record(_) => "record",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_pvalue(&self) -> Option<PValue> {
        match self {
            Value::Primitive(p) => Some(*p),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Utf8(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Value::Decimal(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&[Value]> {
        match self {
            Value::Record(fields) => Some(fields),
            _ => None,
        }
    }

    /// The value a not-null column of type `dtype` holds when nothing else is known.
    ///
    /// Numbers are zero, booleans `false`, strings and binaries empty, collections empty and
    /// records hold the zero value of every field. Temporal types have no zero and stay null.
    pub fn zero(dtype: &FieldType) -> Value {
        match dtype {
            FieldType::Bool(_) => Value::Bool(false),
            FieldType::Primitive(ptype, _) => Value::Primitive(match ptype {
                PType::I8 => PValue::I8(0),
                PType::I16 => PValue::I16(0),
                PType::I32 => PValue::I32(0),
                PType::I64 => PValue::I64(0),
                PType::F32 => PValue::F32(0.0),
                PType::F64 => PValue::F64(0.0),
            }),
            FieldType::Decimal(d, _) => Value::Decimal(Decimal::new(0, u32::from(d.scale()))),
            FieldType::Utf8(..) => Value::Utf8("".into()),
            FieldType::Binary(..) => Value::Binary(Bytes::new()),
            FieldType::List(..) => Value::List(Arc::new([])),
            FieldType::Map(..) => Value::Map(Arc::new([])),
            FieldType::Record(fields, _) => Value::Record(
                fields
                    .dtypes()
                    .iter()
                    .map(|dt| {
                        if dt.is_nullable() {
                            Value::Null
                        } else {
                            Value::zero(dt)
                        }
                    })
                    .collect(),
            ),
            FieldType::Date(_) | FieldType::Time(_) | FieldType::Timestamp(..) => Value::Null,
        }
    }
}

fn to_hex(slice: &[u8]) -> Result<String, std::fmt::Error> {
    let mut output = String::new();
    for byte in slice {
        write!(output, "{byte:02x}")?;
    }
    Ok(output)
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Primitive(p) => write!(f, "{p}"),
            Value::Decimal(d) => write!(f, "{d}"),
            Value::Utf8(s) => write!(f, "\"{s}\""),
            Value::Binary(b) => {
                if b.len() > 10 {
                    write!(
                        f,
                        "{}..{}",
                        to_hex(&b[0..5])?,
                        to_hex(&b[b.len() - 5..b.len()])?
                    )
                } else {
                    write!(f, "{}", to_hex(b)?)
                }
            }
            Value::Date(d) => write!(f, "{d}"),
            Value::Time(t) => write!(f, "{t}"),
            Value::Timestamp(ts) => write!(f, "{ts}"),
            Value::List(items) => write!(f, "[{}]", items.iter().format(", ")),
            Value::Map(entries) => write!(
                f,
                "{{{}}}",
                entries
                    .iter()
                    .map(|(k, v)| format!("{k}: {v}"))
                    .format(", ")
            ),
            Value::Record(fields) => write!(f, "({})", fields.iter().format(", ")),
        }
    }
}

impl From<PValue> for Value {
    fn from(value: PValue) -> Self {
        Value::Primitive(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

macro_rules! value_from_primitive {
    ($($T:ty),*) => {
        $(
            impl From<$T> for Value {
                fn from(value: $T) -> Self {
                    Value::Primitive(PValue::from(value))
                }
            }
        )*
    };
}

value_from_primitive!(i8, i16, i32, i64, f32, f64);

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Utf8(value.into())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Utf8(value.into())
    }
}

impl From<Decimal> for Value {
    fn from(value: Decimal) -> Self {
        Value::Decimal(value)
    }
}

impl From<Bytes> for Value {
    fn from(value: Bytes) -> Self {
        Value::Binary(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(value.into())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use weft_dtype::Nullability::{NonNullable, Nullable};
    use weft_dtype::{FieldType, LogicalTag, PType, RecordFields};

    use super::*;

    #[test]
    fn display() {
        let value = Value::Record(
            vec![
                Value::from(1i64),
                Value::from("a"),
                Value::from(vec![Value::from(true), Value::Null]),
            ]
            .into(),
        );
        assert_eq!(value.to_string(), r#"(1, "a", [true, null])"#);
    }

    #[test]
    fn zero_of_record() {
        let fields: RecordFields = [
            ("id", FieldType::Primitive(PType::I32, NonNullable)),
            ("name", FieldType::Utf8(LogicalTag::None, Nullable)),
            (
                "tags",
                FieldType::List(Arc::new(FieldType::Bool(Nullable)), NonNullable),
            ),
        ]
        .into_iter()
        .collect();
        let zero = Value::zero(&FieldType::Record(fields, NonNullable));
        assert_eq!(
            zero,
            Value::Record(vec![Value::from(0i32), Value::Null, Value::List(Arc::new([]))].into())
        );
    }

    #[test]
    fn option_into_value() {
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some(2i32)), Value::from(2i32));
    }
}
