use weft_dtype::FieldType;

/// What a read asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestedShape {
    /// A record type, typically the column type of a host type. Names are final.
    Record(FieldType),
    /// Top-level columns by name, read with their stored types. Names go through the alias table
    /// and the naming strategy.
    Projection(Vec<String>),
}

impl From<FieldType> for RequestedShape {
    fn from(value: FieldType) -> Self {
        RequestedShape::Record(value)
    }
}

impl<S: Into<String>> FromIterator<S> for RequestedShape {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        RequestedShape::Projection(iter.into_iter().map(Into::into).collect())
    }
}
