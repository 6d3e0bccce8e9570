use weft_dtype::{NamingConfig, TimeUnit};
use weft_scalar::{DecimalConfig, TypeContext, ValueErrorMode};

/// How requested names are matched against stored names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FieldMatchingStrategy {
    /// Names match exactly; every type difference that is not a widening is an error
    Strict,
    /// Names also match on their snake_case, case-insensitive form; incompatible nullable fields
    /// read as null
    #[default]
    BestEffort,
}

/// How a read reacts to differences between the stored schema and the requested shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ReadPolicy {
    fail_on_missing_column: bool,
    fail_narrowing_primitive_conversion: bool,
    fail_on_null_for_primitives: bool,
    field_matching: FieldMatchingStrategy,
    value_errors: ValueErrorMode,
}

impl Default for ReadPolicy {
    fn default() -> Self {
        Self {
            fail_on_missing_column: true,
            fail_narrowing_primitive_conversion: true,
            fail_on_null_for_primitives: false,
            field_matching: FieldMatchingStrategy::BestEffort,
            value_errors: ValueErrorMode::Fail,
        }
    }
}

impl ReadPolicy {
    /// Whether a nullable requested field absent from the stored schema is an error.
    pub fn with_fail_on_missing_column(mut self, fail: bool) -> Self {
        self.fail_on_missing_column = fail;
        self
    }

    /// Whether narrowing conversions are rejected when the plan is built, rather than checked
    /// for every value.
    pub fn with_fail_narrowing_primitive_conversion(mut self, fail: bool) -> Self {
        self.fail_narrowing_primitive_conversion = fail;
        self
    }

    /// Whether a nullable stored column read into a not-null primitive is rejected when the plan
    /// is built, rather than checked for every value.
    pub fn with_fail_on_null_for_primitives(mut self, fail: bool) -> Self {
        self.fail_on_null_for_primitives = fail;
        self
    }

    pub fn with_field_matching(mut self, field_matching: FieldMatchingStrategy) -> Self {
        self.field_matching = field_matching;
        self
    }

    pub fn with_value_errors(mut self, value_errors: ValueErrorMode) -> Self {
        self.value_errors = value_errors;
        self
    }

    pub fn fail_on_missing_column(&self) -> bool {
        self.fail_on_missing_column
    }

    pub fn fail_narrowing_primitive_conversion(&self) -> bool {
        self.fail_narrowing_primitive_conversion
    }

    pub fn fail_on_null_for_primitives(&self) -> bool {
        self.fail_on_null_for_primitives
    }

    pub fn field_matching(&self) -> FieldMatchingStrategy {
        self.field_matching
    }

    pub fn value_errors(&self) -> ValueErrorMode {
        self.value_errors
    }

    pub(crate) fn is_strict(&self) -> bool {
        self.field_matching == FieldMatchingStrategy::Strict
    }
}

/// Configuration of a read: the policy plus what is needed to derive host shapes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ReadOptions {
    policy: ReadPolicy,
    naming: NamingConfig,
    decimals: DecimalConfig,
    time_unit: TimeUnit,
}

impl ReadOptions {
    pub fn with_policy(mut self, policy: ReadPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_naming(mut self, naming: NamingConfig) -> Self {
        self.naming = naming;
        self
    }

    pub fn with_decimals(mut self, decimals: DecimalConfig) -> Self {
        self.decimals = decimals;
        self
    }

    pub fn with_time_unit(mut self, time_unit: TimeUnit) -> Self {
        self.time_unit = time_unit;
        self
    }

    pub fn policy(&self) -> &ReadPolicy {
        &self.policy
    }

    pub fn naming(&self) -> &NamingConfig {
        &self.naming
    }

    /// The context host types derive their requested shape in.
    pub fn type_context(&self) -> TypeContext<'_> {
        TypeContext::new(&self.naming, &self.decimals, self.time_unit)
    }
}

#[cfg(test)]
mod tests {
    use weft_scalar::ValueErrorMode;

    use super::*;

    #[test]
    fn defaults() {
        let policy = ReadPolicy::default();
        assert!(policy.fail_on_missing_column());
        assert!(policy.fail_narrowing_primitive_conversion());
        assert!(!policy.fail_on_null_for_primitives());
        assert_eq!(policy.field_matching(), FieldMatchingStrategy::BestEffort);
        assert_eq!(policy.value_errors(), ValueErrorMode::Fail);
    }
}
