use std::fmt::{Display, Formatter};

use bytes::Bytes;
use itertools::Itertools;
use jiff::civil::{Date, DateTime, Time};
use num_traits::NumCast;
use rust_decimal::Decimal;
use uuid::Uuid;
use weft_dtype::{FieldType, PType};
use weft_error::{WeftResult, weft_bail, weft_err};
use weft_scalar::{PValue, Value};

/// A value as produced by a relational driver.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    TinyInt(i8),
    SmallInt(i16),
    Int(i32),
    BigInt(i64),
    Real(f32),
    Double(f64),
    Decimal(Decimal),
    String(String),
    Bytes(Bytes),
    Date(Date),
    Time(Time),
    Timestamp(DateTime),
    Uuid(Uuid),
    Json(serde_json::Value),
    Array(Vec<SqlValue>),
    /// A driver specific object, carried as its textual form
    Other(String),
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    fn pvalue(&self) -> Option<PValue> {
        Some(match self {
            SqlValue::TinyInt(v) => PValue::I8(*v),
            SqlValue::SmallInt(v) => PValue::I16(*v),
            SqlValue::Int(v) => PValue::I32(*v),
            SqlValue::BigInt(v) => PValue::I64(*v),
            SqlValue::Real(v) => PValue::F32(*v),
            SqlValue::Double(v) => PValue::F64(*v),
            _ => return None,
        })
    }

    /// Converts the driver value into a value of a column of type `dtype`.
    ///
    /// Any value degrades to its textual form for a string column; bytes that are not UTF-8
    /// render as `0x` hex. Numbers are converted to the
    /// width of the column; `DOUBLE` values read from `REAL` columns are rounded to `f32`.
    pub fn to_value(&self, dtype: &FieldType) -> WeftResult<Value> {
        if self.is_null() {
            return Ok(Value::Null);
        }
        Ok(match (self, dtype) {
            (SqlValue::Bytes(b), FieldType::Utf8(..)) => match std::str::from_utf8(b) {
                Ok(text) => Value::from(text),
                Err(_) => Value::from(self.to_string()),
            },
            (SqlValue::String(s) | SqlValue::Other(s), FieldType::Utf8(..)) => {
                Value::from(s.as_str())
            }
            (other, FieldType::Utf8(..)) => Value::from(other.to_string()),
            (SqlValue::Bytes(b), FieldType::Binary(..)) => Value::Binary(b.clone()),
            (SqlValue::String(s), FieldType::Binary(..)) => {
                Value::Binary(Bytes::copy_from_slice(s.as_bytes()))
            }
            (SqlValue::Bool(b), FieldType::Bool(_)) => Value::Bool(*b),
            (SqlValue::Double(v), FieldType::Primitive(PType::F32, _)) => {
                let narrowed = <f32 as NumCast>::from(*v)
                    .ok_or_else(|| weft_err!(NarrowingConversion: "{v} does not fit f32"))?;
                Value::Primitive(PValue::F32(narrowed))
            }
            (value, FieldType::Primitive(ptype, _)) => match value.pvalue() {
                Some(p) => Value::Primitive(p.try_cast(*ptype)?),
                None => mismatch(value, dtype)?,
            },
            (SqlValue::Decimal(d), FieldType::Decimal(..)) => Value::Decimal(*d),
            (value, FieldType::Decimal(..)) => match value.pvalue() {
                Some(p) => Value::Primitive(p),
                None => mismatch(value, dtype)?,
            },
            (SqlValue::Date(d), FieldType::Date(_)) => Value::Date(*d),
            (SqlValue::Timestamp(ts), FieldType::Date(_)) => Value::Date(ts.date()),
            (SqlValue::Time(t), FieldType::Time(_)) => Value::Time(*t),
            (SqlValue::Timestamp(ts), FieldType::Time(_)) => Value::Time(ts.time()),
            (SqlValue::Timestamp(ts), FieldType::Timestamp(..)) => Value::Timestamp(*ts),
            (SqlValue::Date(d), FieldType::Timestamp(..)) => {
                Value::Timestamp(d.to_datetime(Time::midnight()))
            }
            (value, _) => mismatch(value, dtype)?,
        })
    }

    fn kind(&self) -> &'static str {
        match self {
            SqlValue::Null => "null",
            SqlValue::Bool(_) => "boolean",
            SqlValue::TinyInt(_) => "tinyint",
            SqlValue::SmallInt(_) => "smallint",
            SqlValue::Int(_) => "integer",
            SqlValue::BigInt(_) => "bigint",
            SqlValue::Real(_) => "real",
            SqlValue::Double(_) => "double",
            SqlValue::Decimal(_) => "decimal",
            SqlValue::String(_) => "string",
            SqlValue::Bytes(_) => "bytes",
            SqlValue::Date(_) => "date",
            SqlValue::Time(_) => "time",
            SqlValue::Timestamp(_) => "timestamp",
            SqlValue::Uuid(_) => "uuid",
            SqlValue::Json(_) => "json",
            SqlValue::Array(_) => "array",
            SqlValue::Other(_) => "other",
        }
    }
}

fn mismatch(value: &SqlValue, dtype: &FieldType) -> WeftResult<Value> {
    weft_bail!(SchemaMismatch: "a {} value cannot be exported as {dtype}", value.kind())
}

impl Display for SqlValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SqlValue::Null => write!(f, "null"),
            SqlValue::Bool(v) => write!(f, "{v}"),
            SqlValue::TinyInt(v) => write!(f, "{v}"),
            SqlValue::SmallInt(v) => write!(f, "{v}"),
            SqlValue::Int(v) => write!(f, "{v}"),
            SqlValue::BigInt(v) => write!(f, "{v}"),
            SqlValue::Real(v) => write!(f, "{v}"),
            SqlValue::Double(v) => write!(f, "{v}"),
            SqlValue::Decimal(v) => write!(f, "{v}"),
            SqlValue::String(v) | SqlValue::Other(v) => write!(f, "{v}"),
            SqlValue::Bytes(b) => write!(f, "0x{}", b.iter().map(|byte| format!("{byte:02x}")).join("")),
            SqlValue::Date(v) => write!(f, "{v}"),
            SqlValue::Time(v) => write!(f, "{v}"),
            SqlValue::Timestamp(v) => write!(f, "{v}"),
            SqlValue::Uuid(v) => write!(f, "{}", v.hyphenated()),
            SqlValue::Json(v) => write!(f, "{v}"),
            SqlValue::Array(items) => write!(f, "[{}]", items.iter().format(", ")),
        }
    }
}

macro_rules! sql_value_from {
    ($T:ty, $variant:ident) => {
        impl From<$T> for SqlValue {
            fn from(value: $T) -> Self {
                SqlValue::$variant(value)
            }
        }
    };
}

sql_value_from!(bool, Bool);
sql_value_from!(i8, TinyInt);
sql_value_from!(i16, SmallInt);
sql_value_from!(i32, Int);
sql_value_from!(i64, BigInt);
sql_value_from!(f32, Real);
sql_value_from!(f64, Double);
sql_value_from!(Decimal, Decimal);
sql_value_from!(String, String);
sql_value_from!(Bytes, Bytes);
sql_value_from!(Date, Date);
sql_value_from!(Time, Time);
sql_value_from!(DateTime, Timestamp);
sql_value_from!(Uuid, Uuid);
sql_value_from!(serde_json::Value, Json);

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::String(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use jiff::civil::{date, time};
    use rstest::rstest;
    use weft_dtype::LogicalTag;
    use weft_dtype::Nullability::Nullable;
    use weft_error::WeftError;

    use super::*;

    fn utf8() -> FieldType {
        FieldType::Utf8(LogicalTag::None, Nullable)
    }

    #[rstest]
    #[case(SqlValue::from(Uuid::from_u128(0x67e5_5044_10b1_426f_9247_bb68_0e5f_e0c8)), "67e55044-10b1-426f-9247-bb680e5fe0c8")]
    #[case(SqlValue::from(serde_json::json!({"a": [1, 2]})), r#"{"a":[1,2]}"#)]
    #[case(SqlValue::Array(vec![1i32.into(), SqlValue::Null, 3i32.into()]), "[1, null, 3]")]
    #[case(SqlValue::from(42i64), "42")]
    #[case(SqlValue::Other("(1,2)".to_string()), "(1,2)")]
    #[case(SqlValue::from(date(2024, 2, 29)), "2024-02-29")]
    #[case(SqlValue::from(Bytes::from_static(b"plain")), "plain")]
    #[case(SqlValue::from(Bytes::from_static(&[0xff, 0xfe, 0x01])), "0xfffe01")]
    fn degrades_to_text(#[case] value: SqlValue, #[case] expected: &str) {
        assert_eq!(value.to_value(&utf8()).unwrap(), Value::from(expected));
    }

    #[rstest]
    #[case(SqlValue::from(5i16), PType::I32, Value::from(5i32))]
    #[case(SqlValue::from(1.5f64), PType::F32, Value::from(1.5f32))]
    #[case(SqlValue::from(7i32), PType::I8, Value::from(7i8))]
    fn numbers_take_the_column_width(#[case] value: SqlValue, #[case] ptype: PType, #[case] expected: Value) {
        assert_eq!(
            value.to_value(&FieldType::Primitive(ptype, Nullable)).unwrap(),
            expected
        );
    }

    #[test]
    fn narrowing_fails() {
        assert!(matches!(
            SqlValue::from(300i32).to_value(&FieldType::Primitive(PType::I8, Nullable)),
            Err(WeftError::NarrowingConversion(..))
        ));
    }

    #[test]
    fn temporal_and_decimal() {
        let ts = date(2024, 1, 2).at(3, 4, 5, 0);
        assert_eq!(
            SqlValue::from(ts).to_value(&FieldType::Date(Nullable)).unwrap(),
            Value::Date(date(2024, 1, 2))
        );
        assert_eq!(
            SqlValue::from(date(2024, 1, 2))
                .to_value(&FieldType::Timestamp(weft_dtype::TimeUnit::Millis, Nullable))
                .unwrap(),
            Value::Timestamp(date(2024, 1, 2).at(0, 0, 0, 0))
        );
        assert_eq!(
            SqlValue::from(time(1, 2, 3, 0))
                .to_value(&FieldType::Time(Nullable))
                .unwrap(),
            Value::Time(time(1, 2, 3, 0))
        );
        let d = Decimal::from_str("1.25").unwrap();
        assert_eq!(
            SqlValue::from(d)
                .to_value(&FieldType::decimal(10, 2, Nullable).unwrap())
                .unwrap(),
            Value::Decimal(d)
        );
    }

    #[test]
    fn null_and_mismatch() {
        assert_eq!(
            SqlValue::Null
                .to_value(&FieldType::Bool(Nullable))
                .unwrap(),
            Value::Null
        );
        assert!(matches!(
            SqlValue::from("yes").to_value(&FieldType::Bool(Nullable)),
            Err(WeftError::SchemaMismatch(..))
        ));
    }
}
