use std::fmt::{Display, Formatter};

/// Whether a column may hold null.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Nullability {
    NonNullable,
    Nullable,
}

/// `true` is nullable, matching the `nullable` flag of column metadata.
impl From<bool> for Nullability {
    fn from(nullable: bool) -> Self {
        if nullable {
            Self::Nullable
        } else {
            Self::NonNullable
        }
    }
}

/// Rendered as a `?` suffix on nullable types and as nothing otherwise.
impl Display for Nullability {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonNullable => Ok(()),
            Self::Nullable => f.write_str("?"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Nullability;

    #[test]
    fn from_metadata_flag() {
        assert_eq!(Nullability::from(true), Nullability::Nullable);
        assert_eq!(Nullability::from(false), Nullability::NonNullable);
        assert_eq!(format!("i64{}", Nullability::Nullable), "i64?");
    }
}
