use std::collections::HashSet;
use std::fmt::Write;

use log::{debug, warn};
use weft_dtype::{
    DecimalDType, FieldType, LogicalTag, MAX_PRECISION, NamingConfig, Nullability, PType,
    RecordFields, TimeUnit,
};

use crate::column::ColumnInfo;
use crate::types::SqlType;

/// Precision and scale of decimal columns whose driver reports no precision.
pub const FALLBACK_DECIMAL: (u8, u8) = (18, 10);

/// Configuration of schema inference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct InferOptions {
    naming: NamingConfig,
}

impl InferOptions {
    pub fn new(naming: NamingConfig) -> Self {
        Self { naming }
    }

    /// How column labels become field names.
    pub fn naming(&self) -> &NamingConfig {
        &self.naming
    }
}

/// The record type of a result set with `columns`.
///
/// Inference never fails: columns of unknown type are exported as nullable strings, and a label
/// that resolves to a name already taken gets the first free `_2`, `_3`, ... suffix.
pub fn infer_schema(columns: &[ColumnInfo], options: &InferOptions) -> FieldType {
    let mut taken = HashSet::with_capacity(columns.len());
    let fields = columns
        .iter()
        .map(|column| {
            let name = unique_name(options.naming().resolve(column.label(), None), &mut taken);
            (name, infer_field_type(column))
        })
        .collect::<RecordFields>();
    FieldType::Record(fields, Nullability::NonNullable)
}

fn unique_name(name: String, taken: &mut HashSet<String>) -> String {
    if taken.insert(name.clone()) {
        return name;
    }
    let unique = (2..)
        .map(|n| format!("{name}_{n}"))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_default();
    warn!("column {name} appears more than once, exporting it as {unique}");
    taken.insert(unique.clone());
    unique
}

/// The column type of a single result set column.
pub fn infer_field_type(column: &ColumnInfo) -> FieldType {
    let n = Nullability::from(column.nullable());
    let type_name = column.type_name();
    let named = |name: &str| type_name.eq_ignore_ascii_case(name);

    let Some(sql_type) = column.sql_type() else {
        return fallback(column);
    };
    match sql_type {
        SqlType::Boolean | SqlType::Bit => FieldType::Bool(n),
        SqlType::TinyInt => FieldType::Primitive(PType::I8, n),
        SqlType::SmallInt => FieldType::Primitive(PType::I16, n),
        SqlType::Integer => FieldType::Primitive(PType::I32, n),
        SqlType::BigInt => FieldType::Primitive(PType::I64, n),
        SqlType::Real => FieldType::Primitive(PType::F32, n),
        SqlType::Float | SqlType::Double => FieldType::Primitive(PType::F64, n),
        SqlType::Numeric | SqlType::Decimal => match decimal_dtype(column) {
            Some(dtype) => FieldType::Decimal(dtype, n),
            None => fallback(column),
        },
        t if t.is_character() => {
            if named("JSON") || named("JSONB") {
                FieldType::Utf8(LogicalTag::Json, n)
            } else if named("BLOB") {
                FieldType::Binary(LogicalTag::None, n)
            } else {
                FieldType::Utf8(LogicalTag::None, n)
            }
        }
        SqlType::Binary | SqlType::VarBinary | SqlType::LongVarBinary | SqlType::Blob => {
            FieldType::Binary(LogicalTag::None, n)
        }
        SqlType::Array => FieldType::Utf8(LogicalTag::None, n),
        SqlType::Date => FieldType::Date(n),
        SqlType::Time | SqlType::TimeWithTimezone => FieldType::Time(n),
        SqlType::Timestamp | SqlType::TimestampWithTimezone => {
            FieldType::Timestamp(TimeUnit::Millis, n)
        }
        SqlType::Other if named("JSON") || named("JSONB") => FieldType::Utf8(LogicalTag::Json, n),
        SqlType::Other if named("UUID") => FieldType::Utf8(LogicalTag::None, n),
        _ => fallback(column),
    }
}

fn decimal_dtype(column: &ColumnInfo) -> Option<DecimalDType> {
    let (precision, scale) = if column.precision() <= 0 {
        FALLBACK_DECIMAL
    } else {
        let precision = u8::try_from(column.precision().min(i32::from(MAX_PRECISION))).ok()?;
        let scale = u8::try_from(column.scale().clamp(0, i32::from(precision))).ok()?;
        (precision, scale)
    };
    if column.precision() > i32::from(MAX_PRECISION) {
        debug!(
            "column {} has precision {} above {MAX_PRECISION}, clamping",
            column.label(),
            column.precision()
        );
    }
    DecimalDType::try_new(precision, scale).ok()
}

fn fallback(column: &ColumnInfo) -> FieldType {
    debug!(
        "column {} has unsupported type {} ({}), exporting it as a nullable string",
        column.label(),
        column.type_code(),
        column.type_name()
    );
    FieldType::Utf8(LogicalTag::None, Nullability::Nullable)
}

/// A printable listing of `columns`, one line per column.
pub fn describe_columns(columns: &[ColumnInfo]) -> String {
    let mut listing = String::from("Schema Information:\n==================\n");
    for column in columns {
        // Writing into a String cannot fail.
        let _ = writeln!(listing, "{column}");
    }
    listing
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use weft_dtype::ColumnNamingStrategy;

    use super::*;

    #[rstest]
    #[case(ColumnInfo::of("a", SqlType::Bit).with_nullable(false), "bool")]
    #[case(ColumnInfo::of("a", SqlType::TinyInt), "i8?")]
    #[case(ColumnInfo::of("a", SqlType::SmallInt), "i16?")]
    #[case(ColumnInfo::of("a", SqlType::Integer).with_nullable(false), "i32")]
    #[case(ColumnInfo::of("a", SqlType::Real), "f32?")]
    #[case(ColumnInfo::of("a", SqlType::Float), "f64?")]
    #[case(ColumnInfo::of("a", SqlType::Numeric).with_precision_scale(12, 3), "decimal(12,3)?")]
    #[case(ColumnInfo::of("a", SqlType::Decimal), "decimal(18,10)?")]
    #[case(ColumnInfo::of("a", SqlType::Decimal).with_precision_scale(40, 35), "decimal(28,28)?")]
    #[case(ColumnInfo::of("a", SqlType::Decimal).with_precision_scale(10, -2), "decimal(10,0)?")]
    #[case(ColumnInfo::of("a", SqlType::VarChar).with_type_name("uuid"), "utf8?")]
    #[case(ColumnInfo::of("a", SqlType::VarChar).with_type_name("JSONB"), "utf8[json]?")]
    #[case(ColumnInfo::of("a", SqlType::VarChar).with_type_name("BLOB"), "binary?")]
    #[case(ColumnInfo::of("a", SqlType::LongVarBinary), "binary?")]
    #[case(ColumnInfo::of("a", SqlType::Blob), "binary?")]
    #[case(ColumnInfo::of("a", SqlType::Array), "utf8?")]
    #[case(ColumnInfo::of("a", SqlType::Date), "date?")]
    #[case(ColumnInfo::of("a", SqlType::TimeWithTimezone), "time?")]
    #[case(ColumnInfo::of("a", SqlType::Timestamp).with_nullable(false), "timestamp[ms]")]
    #[case(ColumnInfo::of("a", SqlType::Other).with_type_name("json"), "utf8[json]?")]
    #[case(ColumnInfo::of("a", SqlType::Other).with_type_name("UUID").with_nullable(false), "utf8")]
    fn decision_table(#[case] column: ColumnInfo, #[case] expected: &str) {
        assert_eq!(infer_field_type(&column).to_string(), expected);
    }

    #[rstest]
    #[case(ColumnInfo::new("a", 9999).with_nullable(false))]
    #[case(ColumnInfo::of("a", SqlType::Other).with_type_name("hstore").with_nullable(false))]
    #[case(ColumnInfo::of("a", SqlType::Struct).with_nullable(false))]
    fn unknown_types_are_nullable_strings(#[case] column: ColumnInfo) {
        assert_eq!(
            infer_field_type(&column),
            FieldType::Utf8(LogicalTag::None, Nullability::Nullable)
        );
    }

    #[test]
    fn schema_follows_naming() {
        let columns = [
            ColumnInfo::of("employeeId", SqlType::BigInt).with_nullable(false),
            ColumnInfo::of("firstName", SqlType::VarChar),
        ];
        assert_eq!(
            infer_schema(&columns, &InferOptions::default()).to_string(),
            "{employeeId=i64, firstName=utf8?}"
        );
        let snake = InferOptions::new(NamingConfig::new(ColumnNamingStrategy::SnakeCase));
        assert_eq!(
            infer_schema(&columns, &snake).to_string(),
            "{employee_id=i64, first_name=utf8?}"
        );
    }

    #[test]
    fn repeated_labels_get_suffixes() {
        let columns = [
            ColumnInfo::of("id", SqlType::BigInt).with_nullable(false),
            ColumnInfo::of("ID", SqlType::Integer),
            ColumnInfo::of("id_2", SqlType::VarChar),
            ColumnInfo::of("Id", SqlType::Bit),
        ];
        let snake = InferOptions::new(NamingConfig::new(ColumnNamingStrategy::SnakeCase));
        let schema = infer_schema(&columns, &snake);
        assert_eq!(
            schema.to_string(),
            "{id=i64, id_2=i32?, id_2_2=utf8?, id_3=bool?}"
        );
        let fields = schema.as_record().unwrap();
        assert!(RecordFields::try_new(fields.names().clone(), fields.dtypes().to_vec()).is_ok());
    }

    #[test]
    fn describe() {
        let columns = [ColumnInfo::of("id", SqlType::BigInt).with_nullable(false)];
        assert_eq!(
            describe_columns(&columns),
            "Schema Information:\n==================\nid                   BIGINT          REQUIRED\n"
        );
    }
}
