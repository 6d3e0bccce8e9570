//! Selectors for fields in (possibly nested) records.
//!
//! A [`FieldPath`] names the position of a value in a schema tree and is attached to value-time
//! errors, so a failure deep inside a record reads `$address.$geo.$lat`.

use core::fmt;
use std::fmt::{Display, Formatter};

use itertools::Itertools;
use weft_error::{WeftResult, weft_bail};

use crate::FieldType;

/// A single step into a nested type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Field {
    /// A record field selected by name
    Name(String),
    /// A record field selected by position
    Index(usize),
    /// The element of a list
    Element,
    /// The key of a map entry
    Key,
    /// The value of a map entry
    Value,
}

impl Field {
    /// The type this selector picks out of `dtype`.
    pub fn select<'a>(&self, dtype: &'a FieldType) -> WeftResult<&'a FieldType> {
        match (self, dtype) {
            (Field::Name(_) | Field::Index(_), FieldType::Record(fields, _)) => {
                Ok(fields.field_info(self)?.dtype)
            }
            (Field::Element, FieldType::List(element, _)) => Ok(element),
            (Field::Key, FieldType::Map(key, ..)) => Ok(key),
            (Field::Value, FieldType::Map(_, value, _)) => Ok(value),
            _ => weft_bail!("cannot select {self} from {dtype}"),
        }
    }
}

impl From<&str> for Field {
    fn from(value: &str) -> Self {
        Field::Name(value.into())
    }
}

impl From<String> for Field {
    fn from(value: String) -> Self {
        Field::Name(value)
    }
}

impl From<usize> for Field {
    fn from(value: usize) -> Self {
        Field::Index(value)
    }
}

impl Display for Field {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Field::Name(name) => write!(f, "${name}"),
            Field::Index(idx) => write!(f, "[{idx}]"),
            Field::Element => write!(f, "[]"),
            Field::Key => write!(f, "key"),
            Field::Value => write!(f, "value"),
        }
    }
}

/// A path through a (possibly nested) schema, composed of a sequence of field selectors
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldPath(Vec<Field>);

impl FieldPath {
    /// The selector for the root (i.e., the top-level record itself)
    pub fn root() -> Self {
        Self(vec![])
    }

    /// Constructs a new `FieldPath` from a single field selector
    pub fn from_name<F: Into<Field>>(name: F) -> Self {
        Self(vec![name.into()])
    }

    /// Returns the sequence of field selectors that make up this path
    pub fn path(&self) -> &[Field] {
        &self.0
    }

    /// Returns `true` for the root path
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Pushes a new field selector to the end of this path
    pub fn push<F: Into<Field>>(&mut self, field: F) {
        self.0.push(field.into());
    }

    /// Returns a copy of this path extended by `field`
    pub fn child<F: Into<Field>>(&self, field: F) -> Self {
        let mut path = self.clone();
        path.push(field);
        path
    }

    /// Resolves the type found at this path, starting from `dtype`.
    pub fn resolve<'a>(&self, dtype: &'a FieldType) -> WeftResult<&'a FieldType> {
        self.0.iter().try_fold(dtype, |dt, field| field.select(dt))
    }
}

impl FromIterator<Field> for FieldPath {
    fn from_iter<T: IntoIterator<Item = Field>>(iter: T) -> Self {
        FieldPath(iter.into_iter().collect())
    }
}

impl From<Field> for FieldPath {
    fn from(value: Field) -> Self {
        FieldPath(vec![value])
    }
}

impl From<Vec<Field>> for FieldPath {
    fn from(value: Vec<Field>) -> Self {
        FieldPath(value)
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "$");
        }
        Display::fmt(&self.0.iter().format("."), f)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::Nullability::{NonNullable, Nullable};
    use crate::{LogicalTag, PType, RecordFields};

    #[test]
    fn display() {
        let path = FieldPath::from_name("address").child("geo").child("lat");
        assert_eq!(path.to_string(), "$address.$geo.$lat");
        assert_eq!(FieldPath::root().to_string(), "$");
        assert_eq!(
            FieldPath::from_name("tags").child(Field::Element).to_string(),
            "$tags.[]"
        );
    }

    #[test]
    fn resolve() {
        let geo: RecordFields = [("lat", FieldType::Primitive(PType::F64, NonNullable))]
            .into_iter()
            .collect();
        let root: RecordFields = [
            ("geo", FieldType::Record(geo, Nullable)),
            (
                "tags",
                FieldType::List(
                    Arc::new(FieldType::Utf8(LogicalTag::None, NonNullable)),
                    Nullable,
                ),
            ),
        ]
        .into_iter()
        .collect();
        let root = FieldType::Record(root, NonNullable);

        assert_eq!(
            FieldPath::from_name("geo").child("lat").resolve(&root).unwrap(),
            &FieldType::Primitive(PType::F64, NonNullable)
        );
        assert_eq!(
            FieldPath::from_name("tags")
                .child(Field::Element)
                .resolve(&root)
                .unwrap(),
            &FieldType::Utf8(LogicalTag::None, NonNullable)
        );
        assert!(FieldPath::from_name("geo").child(Field::Key).resolve(&root).is_err());
    }
}
