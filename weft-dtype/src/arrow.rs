//! Conversion between weft schemas and Arrow schemas.
//!
//! Logical tags have no Arrow counterpart and travel as field metadata under
//! [`LOGICAL_TYPE_KEY`]. Timestamps carry no time zone.

use std::collections::HashMap;
use std::sync::Arc;

use arrow_schema::{DataType, Field, FieldRef, Fields, Schema, TimeUnit as ArrowTimeUnit};
use weft_error::{WeftResult, weft_bail, weft_err};

use crate::{
    DecimalDType, FieldType, LogicalTag, Nullability, PType, RecordFields, TimeUnit,
};

/// Field metadata key holding the name of a [`LogicalTag`].
pub const LOGICAL_TYPE_KEY: &str = "weft.logical_type";

impl From<TimeUnit> for ArrowTimeUnit {
    fn from(value: TimeUnit) -> Self {
        match value {
            TimeUnit::Millis => Self::Millisecond,
            TimeUnit::Micros => Self::Microsecond,
        }
    }
}

impl TryFrom<ArrowTimeUnit> for TimeUnit {
    type Error = weft_error::WeftError;

    fn try_from(value: ArrowTimeUnit) -> WeftResult<Self> {
        Ok(match value {
            ArrowTimeUnit::Millisecond => Self::Millis,
            ArrowTimeUnit::Microsecond => Self::Micros,
            _ => weft_bail!(SchemaMismatch: "unsupported Arrow time unit {value:?}"),
        })
    }
}

impl FieldType {
    /// The Arrow data type this type is stored as.
    pub fn to_arrow_data_type(&self) -> DataType {
        match self {
            FieldType::Bool(_) => DataType::Boolean,
            FieldType::Primitive(ptype, _) => match ptype {
                PType::I8 => DataType::Int8,
                PType::I16 => DataType::Int16,
                PType::I32 => DataType::Int32,
                PType::I64 => DataType::Int64,
                PType::F32 => DataType::Float32,
                PType::F64 => DataType::Float64,
            },
            FieldType::Utf8(..) => DataType::Utf8,
            FieldType::Binary(..) => DataType::Binary,
            FieldType::Decimal(d, _) => DataType::Decimal128(d.precision(), d.scale() as i8),
            FieldType::Date(_) => DataType::Date32,
            FieldType::Time(_) => DataType::Time64(ArrowTimeUnit::Microsecond),
            FieldType::Timestamp(unit, _) => DataType::Timestamp((*unit).into(), None),
            FieldType::List(element, _) => {
                DataType::List(Arc::new(element.to_arrow_field("element")))
            }
            FieldType::Map(key, value, _) => {
                let entries = Field::new(
                    "key_value",
                    DataType::Struct(Fields::from(vec![
                        key.to_arrow_field("key"),
                        value.to_arrow_field("value"),
                    ])),
                    false,
                );
                DataType::Map(Arc::new(entries), false)
            }
            FieldType::Record(fields, _) => DataType::Struct(fields.to_arrow_fields()),
        }
    }

    /// An Arrow field named `name` with this type, nullability and logical tag.
    pub fn to_arrow_field(&self, name: &str) -> Field {
        let field = Field::new(name, self.to_arrow_data_type(), self.is_nullable());
        match self.logical_tag() {
            LogicalTag::None => field,
            tag => field.with_metadata(HashMap::from([(
                LOGICAL_TYPE_KEY.to_string(),
                tag.name().to_string(),
            )])),
        }
    }

    /// The Arrow schema of a top-level record.
    pub fn to_arrow_schema(&self) -> WeftResult<Schema> {
        let fields = self
            .as_record()
            .ok_or_else(|| weft_err!("only records convert to an Arrow schema, found {self}"))?;
        Ok(Schema::new(fields.to_arrow_fields()))
    }

    /// Converts an Arrow field back into a weft type.
    pub fn from_arrow_field(field: &Field) -> WeftResult<Self> {
        let nullability = Nullability::from(field.is_nullable());
        let tag = match field.metadata().get(LOGICAL_TYPE_KEY) {
            None => LogicalTag::None,
            Some(name) => LogicalTag::from_name(name).ok_or_else(
                || weft_err!(SchemaMismatch: "unknown logical type {name} on field {}", field.name()),
            )?,
        };

        let dtype = match field.data_type() {
            DataType::Boolean => FieldType::Bool(nullability),
            DataType::Int8 => FieldType::Primitive(PType::I8, nullability),
            DataType::Int16 => FieldType::Primitive(PType::I16, nullability),
            DataType::Int32 => FieldType::Primitive(PType::I32, nullability),
            DataType::Int64 => FieldType::Primitive(PType::I64, nullability),
            DataType::Float32 => FieldType::Primitive(PType::F32, nullability),
            DataType::Float64 => FieldType::Primitive(PType::F64, nullability),
            DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => {
                FieldType::Utf8(LogicalTag::None, nullability)
            }
            DataType::Binary | DataType::LargeBinary | DataType::BinaryView => {
                FieldType::Binary(LogicalTag::None, nullability)
            }
            DataType::Decimal128(precision, scale) => {
                let scale = u8::try_from(*scale).map_err(
                    |_| weft_err!(InvalidDecimalSpec: "negative scale {scale} on {}", field.name()),
                )?;
                FieldType::Decimal(DecimalDType::try_new(*precision, scale)?, nullability)
            }
            DataType::Date32 => FieldType::Date(nullability),
            DataType::Time64(ArrowTimeUnit::Microsecond) => FieldType::Time(nullability),
            DataType::Timestamp(unit, _) => {
                FieldType::Timestamp(TimeUnit::try_from(*unit)?, nullability)
            }
            DataType::List(element) | DataType::LargeList(element) => FieldType::List(
                Arc::new(FieldType::from_arrow_field(element)?),
                nullability,
            ),
            DataType::Map(entries, _) => {
                let DataType::Struct(kv) = entries.data_type() else {
                    weft_bail!(SchemaMismatch: "map entries of {} are not a struct", field.name());
                };
                if kv.len() != 2 {
                    weft_bail!(SchemaMismatch: "map entries of {} must have two fields", field.name());
                }
                FieldType::Map(
                    Arc::new(FieldType::from_arrow_field(&kv[0])?),
                    Arc::new(FieldType::from_arrow_field(&kv[1])?),
                    nullability,
                )
            }
            DataType::Struct(fields) => {
                FieldType::Record(RecordFields::from_arrow_fields(fields)?, nullability)
            }
            other => weft_bail!(SchemaMismatch: "unsupported Arrow type {other} on {}", field.name()),
        };

        dtype.with_logical_tag(tag)
    }

    /// Converts an Arrow schema into a non-nullable record.
    pub fn from_arrow_schema(schema: &Schema) -> WeftResult<Self> {
        Ok(FieldType::Record(
            RecordFields::from_arrow_fields(schema.fields())?,
            Nullability::NonNullable,
        ))
    }
}

impl RecordFields {
    /// The Arrow fields of this record.
    pub fn to_arrow_fields(&self) -> Fields {
        self.iter()
            .map(|(name, dtype)| dtype.to_arrow_field(name))
            .collect::<Vec<_>>()
            .into()
    }

    /// Builds a record from Arrow fields.
    pub fn from_arrow_fields(fields: &Fields) -> WeftResult<Self> {
        let names = fields
            .iter()
            .map(|f| Arc::<str>::from(f.name().as_str()))
            .collect::<Vec<_>>();
        let dtypes = fields
            .iter()
            .map(|f: &FieldRef| FieldType::from_arrow_field(f))
            .collect::<WeftResult<Vec<_>>>()?;
        RecordFields::try_new(names.into(), dtypes)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow_schema::{DataType, TimeUnit as ArrowTimeUnit};

    use super::LOGICAL_TYPE_KEY;
    use crate::Nullability::{NonNullable, Nullable};
    use crate::{FieldType, LogicalTag, PType, RecordFields, TimeUnit};

    fn schema() -> FieldType {
        let address: RecordFields = [
            ("city", FieldType::Utf8(LogicalTag::None, Nullable)),
            ("zip", FieldType::Primitive(PType::I32, NonNullable)),
        ]
        .into_iter()
        .collect();
        let fields: RecordFields = [
            ("id", FieldType::Primitive(PType::I64, NonNullable)),
            ("payload", FieldType::Utf8(LogicalTag::Json, Nullable)),
            ("shape", FieldType::Binary(LogicalTag::Geometry, Nullable)),
            ("salary", FieldType::decimal(10, 2, Nullable).unwrap()),
            ("born", FieldType::Date(Nullable)),
            ("at", FieldType::Timestamp(TimeUnit::Micros, NonNullable)),
            (
                "tags",
                FieldType::List(
                    Arc::new(FieldType::Utf8(LogicalTag::None, NonNullable)),
                    Nullable,
                ),
            ),
            (
                "scores",
                FieldType::Map(
                    Arc::new(FieldType::Utf8(LogicalTag::None, NonNullable)),
                    Arc::new(FieldType::Primitive(PType::F64, Nullable)),
                    Nullable,
                ),
            ),
            ("address", FieldType::Record(address, Nullable)),
        ]
        .into_iter()
        .collect();
        FieldType::Record(fields, NonNullable)
    }

    #[test]
    fn to_arrow() {
        let arrow = schema().to_arrow_schema().unwrap();
        assert_eq!(arrow.fields().len(), 9);
        assert_eq!(arrow.field(0).data_type(), &DataType::Int64);
        assert!(!arrow.field(0).is_nullable());
        assert_eq!(
            arrow.field(1).metadata().get(LOGICAL_TYPE_KEY).map(String::as_str),
            Some("json")
        );
        assert_eq!(arrow.field(3).data_type(), &DataType::Decimal128(10, 2));
        assert_eq!(
            arrow.field(5).data_type(),
            &DataType::Timestamp(ArrowTimeUnit::Microsecond, None)
        );
    }

    #[test]
    fn from_arrow_restores_tree() {
        let dtype = schema();
        let arrow = dtype.to_arrow_schema().unwrap();
        assert_eq!(FieldType::from_arrow_schema(&arrow).unwrap(), dtype);
    }

    #[test]
    fn non_record_has_no_schema() {
        assert!(FieldType::Bool(Nullable).to_arrow_schema().is_err());
    }
}
