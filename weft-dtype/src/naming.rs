//! Translation of host field names into column names.

use std::collections::HashMap;

/// How host field names become column names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ColumnNamingStrategy {
    /// Use the host field name unchanged
    #[default]
    FieldName,
    /// Convert camelCase host names to snake_case
    SnakeCase,
}

impl ColumnNamingStrategy {
    /// Applies the strategy to a host field name.
    pub fn apply(self, name: &str) -> String {
        match self {
            Self::FieldName => name.to_string(),
            Self::SnakeCase => camel_to_snake(name),
        }
    }
}

/// Inserts `_` at every lowercase→uppercase transition and lowercases the result.
///
/// Names that are already snake_case come back unchanged.
pub fn camel_to_snake(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for c in name.chars() {
        if c.is_uppercase() && prev_lower {
            out.push('_');
        }
        prev_lower = c.is_lowercase();
        out.extend(c.to_lowercase());
    }
    out
}

/// Normal form used when matching column names loosely: snake_case, lowercased.
pub fn normalize_name(name: &str) -> String {
    camel_to_snake(name).to_lowercase()
}

/// Naming configuration threaded through model construction and reads.
///
/// Resolution order for a host field: the alias declared on the field, then the alias table keyed
/// by host field name, then the strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NamingConfig {
    strategy: ColumnNamingStrategy,
    aliases: HashMap<String, String>,
}

impl NamingConfig {
    /// Configuration using `strategy` and no aliases.
    pub fn new(strategy: ColumnNamingStrategy) -> Self {
        Self {
            strategy,
            aliases: HashMap::new(),
        }
    }

    /// Sets the naming strategy.
    pub fn with_strategy(mut self, strategy: ColumnNamingStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Maps host field `field` to column name `column`, overriding the strategy.
    pub fn with_alias(mut self, field: impl Into<String>, column: impl Into<String>) -> Self {
        self.aliases.insert(field.into(), column.into());
        self
    }

    /// The configured strategy.
    pub fn strategy(&self) -> ColumnNamingStrategy {
        self.strategy
    }

    /// The alias table.
    pub fn aliases(&self) -> &HashMap<String, String> {
        &self.aliases
    }

    /// The column name for host field `field`, given the alias declared on the field, if any.
    pub fn resolve(&self, field: &str, declared_alias: Option<&str>) -> String {
        if let Some(alias) = declared_alias {
            return alias.to_string();
        }
        if let Some(alias) = self.aliases.get(field) {
            return alias.clone();
        }
        self.strategy.apply(field)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("isActiveBoolean", "is_active_boolean")]
    #[case("employeeId", "employee_id")]
    #[case("id", "id")]
    #[case("already_snake", "already_snake")]
    #[case("HTTPServer", "httpserver")]
    #[case("userID", "user_id")]
    #[case("", "")]
    fn camel_case(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(camel_to_snake(input), expected);
    }

    #[rstest]
    #[case("isActiveBoolean")]
    #[case("employeeId")]
    #[case("a1B2c")]
    fn idempotent(#[case] input: &str) {
        let once = camel_to_snake(input);
        assert_eq!(camel_to_snake(&once), once);
    }

    #[test]
    fn resolution_order() {
        let naming = NamingConfig::new(ColumnNamingStrategy::SnakeCase)
            .with_alias("employeeId", "emp");

        assert_eq!(naming.resolve("employeeId", Some("EMP_ID")), "EMP_ID");
        assert_eq!(naming.resolve("employeeId", None), "emp");
        assert_eq!(naming.resolve("firstName", None), "first_name");
        assert_eq!(
            NamingConfig::default().resolve("firstName", None),
            "firstName"
        );
    }

    #[test]
    fn normal_form() {
        assert_eq!(normalize_name("firstName"), normalize_name("FIRST_NAME"));
        assert_eq!(normalize_name("first_name"), "first_name");
    }
}
