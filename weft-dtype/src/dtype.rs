use std::fmt::{Display, Formatter};
use std::sync::Arc;

use FieldType::*;
use itertools::Itertools;
use weft_error::{WeftResult, weft_bail};

use crate::nullability::Nullability;
use crate::{DecimalDType, LogicalTag, PType, RecordFields, TimeUnit};

/// A name for a field in a record
pub type FieldName = Arc<str>;
/// An ordered list of field names in a record
pub type FieldNames = Arc<[FieldName]>;

/// The column types of a weft schema.
///
/// A schema is a tree of `FieldType`s rooted at a [`FieldType::Record`]. Every node carries its
/// own nullability, which is independent of the nullability of its children.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FieldType {
    /// `true` or `false`
    Bool(Nullability),
    /// Fixed-width numeric types
    Primitive(PType, Nullability),
    /// UTF-8 strings, optionally annotated as JSON
    Utf8(LogicalTag, Nullability),
    /// Binary data, optionally annotated as JSON, BSON, geometry or geography
    Binary(LogicalTag, Nullability),
    /// Exact decimals with a fixed precision and scale
    Decimal(DecimalDType, Nullability),
    /// A calendar date
    Date(Nullability),
    /// A time of day with microsecond resolution
    Time(Nullability),
    /// A local timestamp with the given resolution
    Timestamp(TimeUnit, Nullability),
    /// An ordered list of elements of a single type
    List(Arc<FieldType>, Nullability),
    /// A list of key-value entries. Keys are never null.
    Map(Arc<FieldType>, Arc<FieldType>, Nullability),
    /// An ordered list of named fields
    Record(RecordFields, Nullability),
}

impl FieldType {
    /// Builds a checked decimal type.
    pub fn decimal(precision: u8, scale: u8, nullability: Nullability) -> WeftResult<Self> {
        Ok(Decimal(DecimalDType::try_new(precision, scale)?, nullability))
    }

    /// Get the nullability of the FieldType
    pub fn nullability(&self) -> Nullability {
        match self {
            Bool(n)
            | Primitive(_, n)
            | Utf8(_, n)
            | Binary(_, n)
            | Decimal(_, n)
            | Date(n)
            | Time(n)
            | Timestamp(_, n)
            | List(_, n)
            | Map(_, _, n)
            | Record(_, n) => *n,
        }
    }

    /// Check if the FieldType is nullable
    pub fn is_nullable(&self) -> bool {
        self.nullability() == Nullability::Nullable
    }

    /// Get a new FieldType with `Nullability::NonNullable` (but otherwise the same as `self`)
    pub fn as_nonnullable(&self) -> Self {
        self.with_nullability(Nullability::NonNullable)
    }

    /// Get a new FieldType with `Nullability::Nullable` (but otherwise the same as `self`)
    pub fn as_nullable(&self) -> Self {
        self.with_nullability(Nullability::Nullable)
    }

    /// Get a new FieldType with the given nullability (but otherwise the same as `self`)
    pub fn with_nullability(&self, nullability: Nullability) -> Self {
        match self {
            Bool(_) => Bool(nullability),
            Primitive(p, _) => Primitive(*p, nullability),
            Utf8(t, _) => Utf8(*t, nullability),
            Binary(t, _) => Binary(*t, nullability),
            Decimal(d, _) => Decimal(*d, nullability),
            Date(_) => Date(nullability),
            Time(_) => Time(nullability),
            Timestamp(u, _) => Timestamp(*u, nullability),
            List(e, _) => List(e.clone(), nullability),
            Map(k, v, _) => Map(k.clone(), v.clone(), nullability),
            Record(r, _) => Record(r.clone(), nullability),
        }
    }

    /// Replaces precision and scale of a decimal type.
    pub fn with_precision_scale(&self, precision: u8, scale: u8) -> WeftResult<Self> {
        match self {
            Decimal(_, n) => Self::decimal(precision, scale, *n),
            _ => weft_bail!(InvalidDecimalSpec: "{self} is not a decimal type"),
        }
    }

    /// Annotates a string or binary type with a logical tag.
    pub fn with_logical_tag(&self, tag: LogicalTag) -> WeftResult<Self> {
        match self {
            Utf8(_, n) if tag.valid_for_utf8() => Ok(Utf8(tag, *n)),
            Binary(_, n) if tag.valid_for_binary() => Ok(Binary(tag, *n)),
            _ if !tag.is_some() => Ok(self.clone()),
            _ => weft_bail!(SchemaMismatch: "logical type {tag} cannot annotate {self}"),
        }
    }

    /// The logical tag of the type, [`LogicalTag::None`] for types that cannot carry one.
    pub fn logical_tag(&self) -> LogicalTag {
        match self {
            Utf8(t, _) | Binary(t, _) => *t,
            _ => LogicalTag::None,
        }
    }

    /// Check if `self` and `other` are equal, ignoring nullability at the top level
    pub fn eq_ignore_nullability(&self, other: &Self) -> bool {
        self.as_nullable().eq(&other.as_nullable())
    }

    /// Check if `self` has the same storage as `other`, ignoring nullability and logical tags
    /// at the top level.
    pub fn eq_storage(&self, other: &Self) -> bool {
        match (self, other) {
            (Utf8(..), Utf8(..)) | (Binary(..), Binary(..)) => true,
            _ => self.eq_ignore_nullability(other),
        }
    }

    /// Check if `self` is a fixed-width numeric or boolean type
    pub fn is_primitive(&self) -> bool {
        matches!(self, Bool(_) | Primitive(..))
    }

    /// Check if `self` is a record
    pub fn is_record(&self) -> bool {
        matches!(self, Record(..))
    }

    /// Check if `self` is an integer
    pub fn is_int(&self) -> bool {
        PType::try_from(self).is_ok_and(PType::is_int)
    }

    /// Check if `self` is a floating point number
    pub fn is_float(&self) -> bool {
        PType::try_from(self).is_ok_and(PType::is_float)
    }

    /// Get the `RecordFields` if `self` is a record, otherwise `None`
    pub fn as_record(&self) -> Option<&RecordFields> {
        match self {
            Record(r, _) => Some(r),
            _ => None,
        }
    }

    /// Get the inner type if `self` is a list, otherwise `None`
    pub fn as_list_element(&self) -> Option<&FieldType> {
        match self {
            List(e, _) => Some(e.as_ref()),
            _ => None,
        }
    }

    /// Get the key and value types if `self` is a map, otherwise `None`
    pub fn as_map_entry(&self) -> Option<(&FieldType, &FieldType)> {
        match self {
            Map(k, v, _) => Some((k.as_ref(), v.as_ref())),
            _ => None,
        }
    }

    /// Checks the structural rules a schema tree has to satisfy.
    ///
    /// Record names are unique by construction of [`RecordFields`], so this verifies logical tags
    /// and map keys throughout the tree.
    pub fn validate(&self) -> WeftResult<()> {
        match self {
            Utf8(t, _) if !t.valid_for_utf8() => {
                weft_bail!(SchemaMismatch: "logical type {t} cannot annotate utf8")
            }
            List(e, _) => e.validate(),
            Map(k, v, _) => {
                if k.is_nullable() {
                    weft_bail!(SchemaMismatch: "map keys cannot be nullable, found {k}");
                }
                k.validate()?;
                v.validate()
            }
            Record(r, _) => r.dtypes().iter().try_for_each(FieldType::validate),
            _ => Ok(()),
        }
    }
}

impl Display for FieldType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Bool(n) => write!(f, "bool{n}"),
            Primitive(pt, n) => write!(f, "{pt}{n}"),
            Utf8(LogicalTag::None, n) => write!(f, "utf8{n}"),
            Utf8(t, n) => write!(f, "utf8[{t}]{n}"),
            Binary(LogicalTag::None, n) => write!(f, "binary{n}"),
            Binary(t, n) => write!(f, "binary[{t}]{n}"),
            Decimal(d, n) => write!(f, "{d}{n}"),
            Date(n) => write!(f, "date{n}"),
            Time(n) => write!(f, "time{n}"),
            Timestamp(u, n) => write!(f, "timestamp[{u}]{n}"),
            List(e, n) => write!(f, "list({e}){n}"),
            Map(k, v, n) => write!(f, "map({k}, {v}){n}"),
            Record(r, n) => write!(
                f,
                "{{{}}}{}",
                r.names()
                    .iter()
                    .zip(r.dtypes().iter())
                    .map(|(name, dt)| format!("{name}={dt}"))
                    .join(", "),
                n
            ),
        }
    }
}

static_assertions::assert_impl_all!(FieldType: Send, Sync);

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use weft_error::WeftError;

    use super::*;
    use crate::Nullability::{NonNullable, Nullable};

    fn person() -> FieldType {
        Record(
            RecordFields::try_new(
                vec!["id".into(), "name".into(), "tags".into()].into(),
                vec![
                    Primitive(PType::I64, NonNullable),
                    Utf8(LogicalTag::None, Nullable),
                    List(Arc::new(Utf8(LogicalTag::None, NonNullable)), Nullable),
                ],
            )
            .unwrap(),
            NonNullable,
        )
    }

    #[test]
    fn nullability_round_trip() {
        let dt = Primitive(PType::I32, NonNullable);
        assert!(!dt.is_nullable());
        assert!(dt.as_nullable().is_nullable());
        assert_eq!(dt.as_nullable().as_nonnullable(), dt);
        assert!(dt.eq_ignore_nullability(&dt.as_nullable()));
    }

    #[test]
    fn collection_nullability_is_independent() {
        let list = List(Arc::new(Primitive(PType::I32, NonNullable)), Nullable);
        let inner = list.as_nonnullable();
        assert!(!inner.is_nullable());
        assert!(!inner.as_list_element().unwrap().is_nullable());
    }

    #[test]
    fn display() {
        assert_eq!(
            person().to_string(),
            "{id=i64, name=utf8?, tags=list(utf8)?}"
        );
        assert_eq!(
            Map(
                Arc::new(Utf8(LogicalTag::None, NonNullable)),
                Arc::new(FieldType::decimal(10, 2, Nullable).unwrap()),
                NonNullable
            )
            .to_string(),
            "map(utf8, decimal(10,2)?)"
        );
        assert_eq!(
            Timestamp(TimeUnit::Micros, Nullable).to_string(),
            "timestamp[us]?"
        );
        assert_eq!(Utf8(LogicalTag::Json, NonNullable).to_string(), "utf8[json]");
    }

    #[rstest]
    #[case(Utf8(LogicalTag::None, Nullable), LogicalTag::Json, true)]
    #[case(Utf8(LogicalTag::None, Nullable), LogicalTag::Bson, false)]
    #[case(Utf8(LogicalTag::None, Nullable), LogicalTag::Geometry, false)]
    #[case(Binary(LogicalTag::None, Nullable), LogicalTag::Geography, true)]
    #[case(Binary(LogicalTag::None, Nullable), LogicalTag::Bson, true)]
    #[case(Primitive(PType::I32, Nullable), LogicalTag::Json, false)]
    #[case(Primitive(PType::I32, Nullable), LogicalTag::None, true)]
    fn logical_tags(#[case] dt: FieldType, #[case] tag: LogicalTag, #[case] valid: bool) {
        match dt.with_logical_tag(tag) {
            Ok(tagged) => {
                assert!(valid);
                assert_eq!(tagged.logical_tag(), tag);
            }
            Err(err) => {
                assert!(!valid);
                assert!(matches!(err, WeftError::SchemaMismatch(..)));
            }
        }
    }

    #[test]
    fn precision_scale() {
        let dt = FieldType::decimal(10, 2, Nullable).unwrap();
        assert_eq!(
            dt.with_precision_scale(12, 4).unwrap(),
            FieldType::decimal(12, 4, Nullable).unwrap()
        );
        assert!(matches!(
            dt.with_precision_scale(2, 4),
            Err(WeftError::InvalidDecimalSpec(..))
        ));
        assert!(matches!(
            Bool(Nullable).with_precision_scale(2, 1),
            Err(WeftError::InvalidDecimalSpec(..))
        ));
    }

    #[test]
    fn nullable_map_keys_are_invalid() {
        let map = Map(
            Arc::new(Utf8(LogicalTag::None, Nullable)),
            Arc::new(Bool(Nullable)),
            Nullable,
        );
        assert!(matches!(map.validate(), Err(WeftError::SchemaMismatch(..))));
        assert!(person().validate().is_ok());
    }
}
