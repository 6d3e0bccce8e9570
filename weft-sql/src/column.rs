use std::fmt::{Display, Formatter};

use crate::types::SqlType;

/// Metadata of one result set column, as reported by the driver.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColumnInfo {
    label: String,
    name: String,
    type_code: i32,
    type_name: String,
    class_name: String,
    precision: i32,
    scale: i32,
    nullable: bool,
    auto_increment: bool,
}

impl ColumnInfo {
    /// A nullable column labelled `label` of driver type `type_code`.
    ///
    /// The column name defaults to the label and the type name to the standard name of the code.
    pub fn new(label: impl Into<String>, type_code: i32) -> Self {
        let label = label.into();
        Self {
            name: label.clone(),
            label,
            type_code,
            type_name: SqlType::from_code(type_code)
                .map(|t| t.name().to_string())
                .unwrap_or_default(),
            class_name: String::new(),
            precision: 0,
            scale: 0,
            nullable: true,
            auto_increment: false,
        }
    }

    /// Shorthand for [`ColumnInfo::new`] with a known type.
    pub fn of(label: impl Into<String>, sql_type: SqlType) -> Self {
        Self::new(label, sql_type.code())
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// The vendor type name, e.g. `UUID` or `JSONB`.
    pub fn with_type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = type_name.into();
        self
    }

    pub fn with_class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = class_name.into();
        self
    }

    pub fn with_precision_scale(mut self, precision: i32, scale: i32) -> Self {
        self.precision = precision;
        self.scale = scale;
        self
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn with_auto_increment(mut self, auto_increment: bool) -> Self {
        self.auto_increment = auto_increment;
        self
    }

    /// The name the column is exported under, before the naming strategy is applied.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_code(&self) -> i32 {
        self.type_code
    }

    /// The standard type of the column, `None` for vendor specific codes.
    pub fn sql_type(&self) -> Option<SqlType> {
        SqlType::from_code(self.type_code)
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn precision(&self) -> i32 {
        self.precision
    }

    pub fn scale(&self) -> i32 {
        self.scale
    }

    pub fn nullable(&self) -> bool {
        self.nullable
    }

    pub fn auto_increment(&self) -> bool {
        self.auto_increment
    }
}

impl Display for ColumnInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let line = format!(
            "{:<20} {:<15} {:<10} {}",
            self.label,
            self.type_name,
            if self.nullable { "NULLABLE" } else { "REQUIRED" },
            if self.auto_increment { "AUTO_INC" } else { "" }
        );
        write!(f, "{}", line.trim_end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_the_code() {
        let column = ColumnInfo::of("createdAt", SqlType::Timestamp);
        assert_eq!(column.name(), "createdAt");
        assert_eq!(column.type_name(), "TIMESTAMP");
        assert!(column.nullable());
        assert_eq!(ColumnInfo::new("x", 4242).type_name(), "");
    }

    #[test]
    fn display() {
        let column = ColumnInfo::of("id", SqlType::BigInt)
            .with_nullable(false)
            .with_auto_increment(true);
        assert_eq!(
            column.to_string(),
            "id                   BIGINT          REQUIRED   AUTO_INC"
        );
        assert_eq!(
            ColumnInfo::of("name", SqlType::VarChar).to_string(),
            "name                 VARCHAR         NULLABLE"
        );
    }
}
