use weft_dtype::{ColumnNamingStrategy, NamingConfig, TimeUnit};
use weft_error::{WeftResult, weft_bail};
use weft_scalar::{DecimalConfig, RoundingMode, TypeContext, ValueErrorMode};

/// Number of records marshaled before a batch is handed to the sink.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Fails with `InvalidArgument` unless `batch_size` is positive.
pub fn check_batch_size(batch_size: usize) -> WeftResult<usize> {
    if batch_size == 0 {
        weft_bail!("batch size must be positive");
    }
    Ok(batch_size)
}

/// Deserializes a batch size, rejecting 0.
#[cfg(feature = "serde")]
pub fn deserialize_batch_size<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let batch_size = <usize as serde::Deserialize>::deserialize(deserializer)?;
    check_batch_size(batch_size).map_err(serde::de::Error::custom)
}

/// Configuration of write model construction and record writing.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WriteOptions {
    naming: NamingConfig,
    decimals: DecimalConfig,
    time_unit: TimeUnit,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "deserialize_batch_size"))]
    batch_size: usize,
    value_errors: ValueErrorMode,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            naming: NamingConfig::default(),
            decimals: DecimalConfig::default(),
            time_unit: TimeUnit::Millis,
            batch_size: DEFAULT_BATCH_SIZE,
            value_errors: ValueErrorMode::Fail,
        }
    }
}

impl WriteOptions {
    pub fn with_naming(mut self, naming: NamingConfig) -> Self {
        self.naming = naming;
        self
    }

    pub fn with_naming_strategy(mut self, strategy: ColumnNamingStrategy) -> Self {
        self.naming = self.naming.with_strategy(strategy);
        self
    }

    pub fn with_alias(mut self, field: impl Into<String>, column: impl Into<String>) -> Self {
        self.naming = self.naming.with_alias(field, column);
        self
    }

    /// Precision and scale of decimal fields that do not declare their own.
    pub fn with_default_decimal(mut self, precision: u8, scale: u8) -> WeftResult<Self> {
        self.decimals = self.decimals.with_default(precision, scale)?;
        Ok(self)
    }

    pub fn with_rounding(mut self, rounding: RoundingMode) -> Self {
        self.decimals = self.decimals.with_rounding(rounding);
        self
    }

    /// Resolution of timestamp fields that do not declare their own.
    pub fn with_time_unit(mut self, time_unit: TimeUnit) -> Self {
        self.time_unit = time_unit;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> WeftResult<Self> {
        self.batch_size = check_batch_size(batch_size)?;
        Ok(self)
    }

    pub fn with_value_errors(mut self, value_errors: ValueErrorMode) -> Self {
        self.value_errors = value_errors;
        self
    }

    pub fn naming(&self) -> &NamingConfig {
        &self.naming
    }

    pub fn decimals(&self) -> &DecimalConfig {
        &self.decimals
    }

    pub fn time_unit(&self) -> TimeUnit {
        self.time_unit
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn value_errors(&self) -> ValueErrorMode {
        self.value_errors
    }

    /// The context host types derive their column types in.
    pub fn type_context(&self) -> TypeContext<'_> {
        TypeContext::new(&self.naming, &self.decimals, self.time_unit)
    }
}
