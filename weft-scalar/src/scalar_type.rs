//! Bindings between host Rust types and column types.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use std::sync::Arc;

use bytes::Bytes;
use jiff::civil::{Date, DateTime, Time};
use rust_decimal::Decimal;
use uuid::Uuid;
use weft_dtype::{
    DecimalDType, FieldType, LogicalTag, NamingConfig, Nullability, PType, TimeUnit,
};
use weft_error::{WeftResult, weft_bail, weft_err};

use crate::decimal::DecimalConfig;
use crate::{PValue, Value};

/// Per-field options declared next to a field, overriding the context defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldOverrides {
    /// Precision and scale of a decimal field
    pub decimal: Option<DecimalDType>,
    /// Logical annotation of a string or binary field
    pub logical_tag: LogicalTag,
    /// Resolution of a timestamp field
    pub time_unit: Option<TimeUnit>,
}

/// Everything needed to derive the column type of a host type.
///
/// Field overrides apply to the field they are declared on, including the elements of a list or
/// the values of a map held by that field, and are reset when descending into a nested record.
#[derive(Debug, Clone, Copy)]
pub struct TypeContext<'a> {
    naming: &'a NamingConfig,
    decimals: &'a DecimalConfig,
    time_unit: TimeUnit,
    overrides: FieldOverrides,
}

impl<'a> TypeContext<'a> {
    pub fn new(naming: &'a NamingConfig, decimals: &'a DecimalConfig, time_unit: TimeUnit) -> Self {
        Self {
            naming,
            decimals,
            time_unit,
            overrides: FieldOverrides::default(),
        }
    }

    /// The context for a field carrying `overrides`.
    pub fn for_field(&self, overrides: FieldOverrides) -> Self {
        Self { overrides, ..*self }
    }

    /// The context for the fields of a nested record.
    pub fn nested(&self) -> Self {
        self.for_field(FieldOverrides::default())
    }

    pub fn naming(&self) -> &'a NamingConfig {
        self.naming
    }

    pub fn decimals(&self) -> &'a DecimalConfig {
        self.decimals
    }

    pub fn overrides(&self) -> &FieldOverrides {
        &self.overrides
    }

    /// Precision and scale for a decimal field: the declared ones, else the configured default.
    pub fn decimal_dtype(&self) -> WeftResult<DecimalDType> {
        self.overrides
            .decimal
            .or(self.decimals.default_dtype())
            .ok_or_else(|| {
                weft_err!(InvalidDecimalSpec: "decimal field without precision and scale, and no default decimal configured")
            })
    }

    /// Resolution for a timestamp field: the declared one, else the configured default.
    pub fn time_unit(&self) -> TimeUnit {
        self.overrides.time_unit.unwrap_or(self.time_unit)
    }

    /// Applies the declared logical tag to `dtype`.
    pub fn tagged(&self, dtype: FieldType) -> WeftResult<FieldType> {
        dtype.with_logical_tag(self.overrides.logical_tag)
    }

    /// Fails unless the field declares nothing that a type of kind `what` would ignore.
    fn plain(&self, what: &str) -> WeftResult<()> {
        if self.overrides.logical_tag.is_some() {
            weft_bail!(SchemaMismatch: "logical type {} cannot annotate {what}", self.overrides.logical_tag);
        }
        Ok(())
    }
}

/// A host type that maps onto a column type.
///
/// Plain types map to not-null columns; `Option<T>` maps to the nullable version of `T`.
pub trait ScalarType: Sized {
    /// The column type of this host type in `ctx`.
    fn field_type(ctx: &TypeContext<'_>) -> WeftResult<FieldType>;

    /// The column value of `self`.
    fn to_value(&self) -> Value;

    /// Reads a host value back from a column value.
    fn from_value(value: Value) -> WeftResult<Self>;
}

fn unexpected<T>(value: &Value, expected: &str) -> WeftResult<T> {
    if value.is_null() {
        weft_bail!(UnexpectedNull: "expected {expected} but found null")
    }
    weft_bail!(SchemaMismatch: "expected {expected} but found a {} value", value.kind())
}

impl ScalarType for bool {
    fn field_type(ctx: &TypeContext<'_>) -> WeftResult<FieldType> {
        ctx.plain("bool")?;
        Ok(FieldType::Bool(Nullability::NonNullable))
    }

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn from_value(value: Value) -> WeftResult<Self> {
        match value {
            Value::Bool(b) => Ok(b),
            other => unexpected(&other, "bool"),
        }
    }
}

macro_rules! primitive_scalar_type {
    ($T:ty, $PT:tt) => {
        impl ScalarType for $T {
            fn field_type(ctx: &TypeContext<'_>) -> WeftResult<FieldType> {
                ctx.plain(stringify!($T))?;
                Ok(FieldType::Primitive(PType::$PT, Nullability::NonNullable))
            }

            fn to_value(&self) -> Value {
                Value::Primitive(PValue::$PT(*self))
            }

            fn from_value(value: Value) -> WeftResult<Self> {
                match value {
                    Value::Primitive(p) => <$T>::try_from(p),
                    other => unexpected(&other, stringify!($T)),
                }
            }
        }
    };
}

primitive_scalar_type!(i8, I8);
primitive_scalar_type!(i16, I16);
primitive_scalar_type!(i32, I32);
primitive_scalar_type!(i64, I64);
primitive_scalar_type!(f32, F32);
primitive_scalar_type!(f64, F64);

impl ScalarType for String {
    fn field_type(ctx: &TypeContext<'_>) -> WeftResult<FieldType> {
        ctx.tagged(FieldType::Utf8(LogicalTag::None, Nullability::NonNullable))
    }

    fn to_value(&self) -> Value {
        Value::Utf8(self.as_str().into())
    }

    fn from_value(value: Value) -> WeftResult<Self> {
        match value {
            Value::Utf8(s) => Ok(s.to_string()),
            other => unexpected(&other, "utf8"),
        }
    }
}

impl ScalarType for Arc<str> {
    fn field_type(ctx: &TypeContext<'_>) -> WeftResult<FieldType> {
        String::field_type(ctx)
    }

    fn to_value(&self) -> Value {
        Value::Utf8(self.clone())
    }

    fn from_value(value: Value) -> WeftResult<Self> {
        match value {
            Value::Utf8(s) => Ok(s),
            other => unexpected(&other, "utf8"),
        }
    }
}

impl ScalarType for Bytes {
    fn field_type(ctx: &TypeContext<'_>) -> WeftResult<FieldType> {
        ctx.tagged(FieldType::Binary(LogicalTag::None, Nullability::NonNullable))
    }

    fn to_value(&self) -> Value {
        Value::Binary(self.clone())
    }

    fn from_value(value: Value) -> WeftResult<Self> {
        match value {
            Value::Binary(b) => Ok(b),
            other => unexpected(&other, "binary"),
        }
    }
}

/// UUIDs are stored as their hyphenated string form.
impl ScalarType for Uuid {
    fn field_type(ctx: &TypeContext<'_>) -> WeftResult<FieldType> {
        ctx.plain("uuid")?;
        Ok(FieldType::Utf8(LogicalTag::None, Nullability::NonNullable))
    }

    fn to_value(&self) -> Value {
        Value::Utf8(self.hyphenated().to_string().into())
    }

    fn from_value(value: Value) -> WeftResult<Self> {
        match value {
            Value::Utf8(s) => Uuid::parse_str(&s)
                .map_err(|e| weft_err!(SchemaMismatch: "{s} is not a uuid: {e}")),
            other => unexpected(&other, "uuid"),
        }
    }
}

impl ScalarType for Decimal {
    fn field_type(ctx: &TypeContext<'_>) -> WeftResult<FieldType> {
        ctx.plain("decimal")?;
        Ok(FieldType::Decimal(
            ctx.decimal_dtype()?,
            Nullability::NonNullable,
        ))
    }

    fn to_value(&self) -> Value {
        Value::Decimal(*self)
    }

    fn from_value(value: Value) -> WeftResult<Self> {
        match value {
            Value::Decimal(d) => Ok(d),
            other => unexpected(&other, "decimal"),
        }
    }
}

impl ScalarType for Date {
    fn field_type(ctx: &TypeContext<'_>) -> WeftResult<FieldType> {
        ctx.plain("date")?;
        Ok(FieldType::Date(Nullability::NonNullable))
    }

    fn to_value(&self) -> Value {
        Value::Date(*self)
    }

    fn from_value(value: Value) -> WeftResult<Self> {
        match value {
            Value::Date(d) => Ok(d),
            other => unexpected(&other, "date"),
        }
    }
}

impl ScalarType for Time {
    fn field_type(ctx: &TypeContext<'_>) -> WeftResult<FieldType> {
        ctx.plain("time")?;
        Ok(FieldType::Time(Nullability::NonNullable))
    }

    fn to_value(&self) -> Value {
        Value::Time(*self)
    }

    fn from_value(value: Value) -> WeftResult<Self> {
        match value {
            Value::Time(t) => Ok(t),
            other => unexpected(&other, "time"),
        }
    }
}

impl ScalarType for DateTime {
    fn field_type(ctx: &TypeContext<'_>) -> WeftResult<FieldType> {
        ctx.plain("timestamp")?;
        Ok(FieldType::Timestamp(
            ctx.time_unit(),
            Nullability::NonNullable,
        ))
    }

    fn to_value(&self) -> Value {
        Value::Timestamp(*self)
    }

    fn from_value(value: Value) -> WeftResult<Self> {
        match value {
            Value::Timestamp(ts) => Ok(ts),
            other => unexpected(&other, "timestamp"),
        }
    }
}

impl<T: ScalarType> ScalarType for Option<T> {
    fn field_type(ctx: &TypeContext<'_>) -> WeftResult<FieldType> {
        Ok(T::field_type(ctx)?.as_nullable())
    }

    fn to_value(&self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }

    fn from_value(value: Value) -> WeftResult<Self> {
        match value {
            Value::Null => Ok(None),
            v => T::from_value(v).map(Some),
        }
    }
}

impl<T: ScalarType> ScalarType for Vec<T> {
    fn field_type(ctx: &TypeContext<'_>) -> WeftResult<FieldType> {
        Ok(FieldType::List(
            Arc::new(T::field_type(ctx)?),
            Nullability::NonNullable,
        ))
    }

    fn to_value(&self) -> Value {
        Value::List(self.iter().map(ScalarType::to_value).collect())
    }

    fn from_value(value: Value) -> WeftResult<Self> {
        match value {
            Value::List(items) => items.iter().cloned().map(T::from_value).collect(),
            other => unexpected(&other, "list"),
        }
    }
}

fn map_type<K: ScalarType, V: ScalarType>(ctx: &TypeContext<'_>) -> WeftResult<FieldType> {
    let key = K::field_type(&ctx.nested())?;
    if key.is_nullable() {
        weft_bail!(SchemaMismatch: "map keys cannot be nullable, found {key}");
    }
    Ok(FieldType::Map(
        Arc::new(key),
        Arc::new(V::field_type(ctx)?),
        Nullability::NonNullable,
    ))
}

fn map_entries<K: ScalarType, V: ScalarType>(value: Value) -> WeftResult<Vec<(K, V)>> {
    match value {
        Value::Map(entries) => entries
            .iter()
            .map(|(k, v)| Ok((K::from_value(k.clone())?, V::from_value(v.clone())?)))
            .collect(),
        other => unexpected(&other, "map"),
    }
}

impl<K, V> ScalarType for BTreeMap<K, V>
where
    K: ScalarType + Ord,
    V: ScalarType,
{
    fn field_type(ctx: &TypeContext<'_>) -> WeftResult<FieldType> {
        map_type::<K, V>(ctx)
    }

    fn to_value(&self) -> Value {
        Value::Map(
            self.iter()
                .map(|(k, v)| (k.to_value(), v.to_value()))
                .collect(),
        )
    }

    fn from_value(value: Value) -> WeftResult<Self> {
        Ok(map_entries(value)?.into_iter().collect())
    }
}

/// Entries are written in the map's iteration order.
impl<K, V> ScalarType for HashMap<K, V>
where
    K: ScalarType + Eq + Hash,
    V: ScalarType,
{
    fn field_type(ctx: &TypeContext<'_>) -> WeftResult<FieldType> {
        map_type::<K, V>(ctx)
    }

    fn to_value(&self) -> Value {
        Value::Map(
            self.iter()
                .map(|(k, v)| (k.to_value(), v.to_value()))
                .collect(),
        )
    }

    fn from_value(value: Value) -> WeftResult<Self> {
        Ok(map_entries(value)?.into_iter().collect())
    }
}
