use std::collections::HashSet;
use std::sync::Arc;

use itertools::Itertools;
use weft_error::{WeftResult, weft_bail, weft_err};

use crate::{Field, FieldName, FieldNames, FieldType};

/// Information about a single field in a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldInfo<'a> {
    /// The position index of the field within the enclosing record
    pub index: usize,
    /// The name of the field
    pub name: FieldName,
    /// The type of the field
    pub dtype: &'a FieldType,
}

/// Type information for a record column: ordered names and their types.
///
/// Names are unique within one record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RecordFields {
    names: FieldNames,
    dtypes: Arc<[FieldType]>,
}

impl RecordFields {
    /// Create a new record from names and types, rejecting duplicate names.
    pub fn try_new(names: FieldNames, dtypes: Vec<FieldType>) -> WeftResult<Self> {
        if names.len() != dtypes.len() {
            weft_bail!(
                "length mismatch between names ({}) and dtypes ({})",
                names.len(),
                dtypes.len()
            );
        }

        let mut seen = HashSet::with_capacity(names.len());
        for name in names.iter() {
            if !seen.insert(name.as_ref()) {
                weft_bail!(DuplicateField: "field {name} is already defined");
            }
        }

        Ok(Self {
            names,
            dtypes: dtypes.into(),
        })
    }

    /// A record without any field.
    pub fn empty() -> Self {
        Self {
            names: Arc::new([]),
            dtypes: Arc::new([]),
        }
    }

    /// Get the names of the fields
    pub fn names(&self) -> &FieldNames {
        &self.names
    }

    /// Get the types of the fields
    pub fn dtypes(&self) -> &[FieldType] {
        &self.dtypes
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` if the record has no field
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Find the index of a field by name.
    pub fn find_name(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n.as_ref() == name)
    }

    /// Get the type of the field at `index`
    pub fn field_type(&self, index: usize) -> Option<&FieldType> {
        self.dtypes.get(index)
    }

    /// Get the name, index and type of a field
    pub fn field_info(&self, field: &Field) -> WeftResult<FieldInfo<'_>> {
        let index = match field {
            Field::Name(name) => self
                .find_name(name)
                .ok_or_else(|| weft_err!(MissingColumn: "unknown field name {name}"))?,
            Field::Index(index) => *index,
            Field::Element | Field::Key | Field::Value => {
                weft_bail!(SchemaMismatch: "{field} does not select a record field")
            }
        };

        let name = self
            .names
            .get(index)
            .cloned()
            .ok_or_else(|| weft_err!(MissingColumn: "field index {index} out of bounds"))?;

        Ok(FieldInfo {
            index,
            name,
            dtype: &self.dtypes[index],
        })
    }

    /// Iterate over `(name, type)` pairs in declaration order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&FieldName, &FieldType)> + '_ {
        self.names.iter().zip_eq(self.dtypes.iter())
    }

    /// Project a subset of fields, in the order given.
    pub fn project(&self, projection: &[Field]) -> WeftResult<Self> {
        let mut names = Vec::with_capacity(projection.len());
        let mut dtypes = Vec::with_capacity(projection.len());

        for field in projection {
            let FieldInfo { name, dtype, .. } = self.field_info(field)?;
            names.push(name);
            dtypes.push(dtype.clone());
        }

        Self::try_new(names.into(), dtypes)
    }
}

impl<T, V> FromIterator<(T, V)> for RecordFields
where
    T: Into<FieldName>,
    V: Into<FieldType>,
{
    /// Collects pairs without checking uniqueness; use [`RecordFields::try_new`] for untrusted input.
    fn from_iter<I: IntoIterator<Item = (T, V)>>(iter: I) -> Self {
        let (names, dtypes): (Vec<_>, Vec<_>) = iter
            .into_iter()
            .map(|(name, dtype)| (name.into(), dtype.into()))
            .unzip();
        Self {
            names: names.into(),
            dtypes: dtypes.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use weft_error::WeftError;

    use crate::Nullability::{NonNullable, Nullable};
    use crate::{Field, FieldType, LogicalTag, PType, RecordFields};

    fn fields() -> RecordFields {
        RecordFields::try_new(
            vec!["A".into(), "B".into(), "C".into()].into(),
            vec![
                FieldType::Bool(NonNullable),
                FieldType::Primitive(PType::I8, Nullable),
                FieldType::Utf8(LogicalTag::None, Nullable),
            ],
        )
        .unwrap()
    }

    #[test]
    fn duplicate_names() {
        let err = RecordFields::try_new(
            vec!["a".into(), "a".into()].into(),
            vec![FieldType::Bool(Nullable), FieldType::Bool(Nullable)],
        )
        .unwrap_err();
        assert!(matches!(err, WeftError::DuplicateField(..)));
    }

    #[test]
    fn lookups() {
        let fields = fields();
        assert_eq!(fields.find_name("B"), Some(1));
        assert_eq!(fields.find_name("b"), None);

        let info = fields.field_info(&Field::from("C")).unwrap();
        assert_eq!(info.index, 2);
        assert_eq!(info.dtype, &FieldType::Utf8(LogicalTag::None, Nullable));
        assert!(matches!(
            fields.field_info(&Field::Index(3)),
            Err(WeftError::MissingColumn(..))
        ));
    }

    #[test]
    fn element_selector_is_not_a_record_field() {
        let fields = fields();
        for selector in [Field::Element, Field::Key, Field::Value] {
            assert!(matches!(
                fields.field_info(&selector),
                Err(WeftError::SchemaMismatch(..))
            ));
        }
        assert!(fields.project(&[Field::Element]).is_err());
    }

    #[test]
    fn project() {
        let projected = fields()
            .project(&[Field::from("C"), Field::Index(0)])
            .unwrap();
        let names: Vec<&str> = projected.names().iter().map(|n| n.as_ref()).collect();
        assert_eq!(names, vec!["C", "A"]);
        assert_eq!(projected.dtypes()[1], FieldType::Bool(NonNullable));
    }
}
