use std::fmt::{Display, Formatter};

/// Logical annotation refining how the bytes of a `Utf8` or `Binary` column are interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LogicalTag {
    /// No annotation
    #[default]
    None,
    /// A JSON document
    Json,
    /// A BSON document
    Bson,
    /// A geometry in well-known binary form
    Geometry,
    /// A geography in well-known binary form
    Geography,
}

impl LogicalTag {
    /// Whether the tag can annotate a string column.
    pub fn valid_for_utf8(self) -> bool {
        matches!(self, Self::None | Self::Json)
    }

    /// Whether the tag can annotate a binary column.
    pub fn valid_for_binary(self) -> bool {
        true
    }

    /// Returns `true` unless the tag is [`LogicalTag::None`].
    pub fn is_some(self) -> bool {
        self != Self::None
    }

    /// Stable lowercase name, used in rendered schemas and Arrow metadata.
    pub fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Json => "json",
            Self::Bson => "bson",
            Self::Geometry => "geometry",
            Self::Geography => "geography",
        }
    }

    /// The inverse of [`LogicalTag::name`].
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "none" => Some(Self::None),
            "json" => Some(Self::Json),
            "bson" => Some(Self::Bson),
            "geometry" => Some(Self::Geometry),
            "geography" => Some(Self::Geography),
            _ => None,
        }
    }
}

impl Display for LogicalTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
