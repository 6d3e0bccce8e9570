use std::fmt::{Display, Formatter};

use itertools::Itertools;
use weft_dtype::{FieldNames, FieldType};
use weft_error::{WeftResult, weft_bail};

use crate::Value;

/// A record whose shape is only known at runtime: field names paired with values.
#[derive(Debug, Clone, PartialEq)]
pub struct GenericRecord {
    names: FieldNames,
    values: Vec<Value>,
}

impl GenericRecord {
    /// Pairs `names` with `values`, which must be of the same length.
    pub fn try_new(names: FieldNames, values: Vec<Value>) -> WeftResult<Self> {
        if names.len() != values.len() {
            weft_bail!(
                "record has {} names but {} values",
                names.len(),
                values.len()
            );
        }
        Ok(Self { names, values })
    }

    /// Builds a record of type `dtype` out of a [`Value::Record`].
    pub fn from_value(dtype: &FieldType, value: Value) -> WeftResult<Self> {
        let Some(fields) = dtype.as_record() else {
            weft_bail!(SchemaMismatch: "{dtype} is not a record type");
        };
        match value {
            Value::Record(values) => Self::try_new(fields.names().clone(), values.to_vec()),
            other => weft_bail!(SchemaMismatch: "expected a record but found a {} value", other.kind()),
        }
    }

    pub fn names(&self) -> &FieldNames {
        &self.names
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The value of field `name`, `None` if the record has no such field.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.names
            .iter()
            .position(|n| n.as_ref() == name)
            .map(|idx| &self.values[idx])
    }

    /// The value at position `index`.
    pub fn get_index(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// The nested record held by field `name`, typed by the field's own type.
    pub fn nested(&self, dtype: &FieldType, name: &str) -> WeftResult<Option<GenericRecord>> {
        let Some(fields) = dtype.as_record() else {
            weft_bail!(SchemaMismatch: "{dtype} is not a record type");
        };
        let Some(index) = fields.find_name(name) else {
            weft_bail!(MissingColumn: "no field named {name}");
        };
        match self.values.get(index) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => Ok(Some(Self::from_value(
                &fields.dtypes()[index],
                value.clone(),
            )?)),
        }
    }

    /// Converts the record back into a [`Value::Record`].
    pub fn into_value(self) -> Value {
        Value::Record(self.values.into())
    }
}

impl Display for GenericRecord {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{{}}}",
            self.names
                .iter()
                .zip(self.values.iter())
                .map(|(n, v)| format!("{n}: {v}"))
                .join(", ")
        )
    }
}
