use log::{debug, info};
use weft_dtype::{ColumnNamingStrategy, FieldType, NamingConfig};
use weft_error::{WeftResult, weft_bail, weft_err};
use weft_io::RecordSink;
use weft_model::{
    DEFAULT_BATCH_SIZE, RecordWriter, WriteOptions, WriteRecordModel, check_batch_size,
};
use weft_scalar::{DecimalConfig, GenericRecord, RoundingMode, Value};

use crate::infer::{InferOptions, describe_columns, infer_schema};
use crate::result_set::{ResultSet, analyze_columns};

/// Rows fetched from the server per round trip unless configured otherwise.
pub const DEFAULT_FETCH_SIZE: usize = 1000;

/// Rows between two progress messages of an export.
pub const PROGRESS_INTERVAL: u64 = 10_000;

/// Configuration of a dynamic export.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ExportConfig {
    #[cfg_attr(
        feature = "serde",
        serde(deserialize_with = "weft_model::deserialize_batch_size")
    )]
    batch_size: usize,
    fetch_size: usize,
    naming: NamingConfig,
    decimals: DecimalConfig,
    schema_info: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            fetch_size: DEFAULT_FETCH_SIZE,
            naming: NamingConfig::new(ColumnNamingStrategy::SnakeCase),
            decimals: DecimalConfig::default(),
            schema_info: false,
        }
    }
}

impl ExportConfig {
    /// Rows handed to the sink at once. Fails with `InvalidArgument` for 0.
    pub fn with_batch_size(mut self, batch_size: usize) -> WeftResult<Self> {
        self.batch_size = check_batch_size(batch_size)?;
        Ok(self)
    }

    /// Fetch size hint passed to the result set, 0 leaves the driver default.
    pub fn with_fetch_size(mut self, fetch_size: usize) -> Self {
        self.fetch_size = fetch_size;
        self
    }

    /// How column labels become field names. Defaults to snake_case.
    pub fn with_naming(mut self, naming: NamingConfig) -> Self {
        self.naming = naming;
        self
    }

    pub fn with_naming_strategy(mut self, strategy: ColumnNamingStrategy) -> Self {
        self.naming = self.naming.with_strategy(strategy);
        self
    }

    /// Rounding applied to decimal values with more fractional digits than their column.
    pub fn with_rounding(mut self, rounding: RoundingMode) -> Self {
        self.decimals = self.decimals.with_rounding(rounding);
        self
    }

    /// Whether the column listing is logged before the export starts.
    pub fn with_schema_info(mut self, schema_info: bool) -> Self {
        self.schema_info = schema_info;
        self
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn fetch_size(&self) -> usize {
        self.fetch_size
    }

    pub fn naming(&self) -> &NamingConfig {
        &self.naming
    }

    pub fn schema_info(&self) -> bool {
        self.schema_info
    }

    fn write_options(&self) -> WeftResult<WriteOptions> {
        let mut options = WriteOptions::default().with_batch_size(self.batch_size)?;
        if let Some(rounding) = self.decimals.rounding() {
            options = options.with_rounding(rounding);
        }
        Ok(options)
    }
}

/// A write model over [`GenericRecord`]s of type `schema`, field `i` reading value `i`.
pub fn dynamic_model(schema: &FieldType) -> WeftResult<WriteRecordModel<GenericRecord>> {
    let Some(fields) = schema.as_record() else {
        weft_bail!(SchemaMismatch: "dynamic model schema {schema} is not a record");
    };
    fields
        .iter()
        .enumerate()
        .fold(WriteRecordModel::builder(), |builder, (index, (name, dtype))| {
            builder.with_closure_field(name.clone(), dtype.clone(), move |record: &GenericRecord| {
                record.get_index(index).cloned().unwrap_or(Value::Null)
            })
        })
        .build()
}

/// Exports result sets of any shape, inferring the schema from their metadata.
#[derive(Debug, Clone, Default)]
pub struct DynamicExporter {
    config: ExportConfig,
}

impl DynamicExporter {
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Streams every remaining row of `result_set` into `sink`, returning the number of rows.
    ///
    /// Errors raised by the result set or the sink are returned unchanged.
    pub fn export<R, S>(&self, mut result_set: R, sink: S) -> WeftResult<u64>
    where
        R: ResultSet,
        S: RecordSink,
    {
        if self.config.fetch_size > 0 {
            result_set.set_fetch_size(self.config.fetch_size);
        }

        let columns = analyze_columns(&result_set)?;
        if self.config.schema_info {
            info!("{}", describe_columns(&columns));
        }
        let schema = infer_schema(&columns, &InferOptions::new(self.config.naming.clone()));
        let fields = schema
            .as_record()
            .ok_or_else(|| weft_err!(AssertionFailed: "inferred schema {schema} is not a record"))?;
        let names = fields.names().clone();
        let dtypes = fields.dtypes().to_vec();
        debug!("exporting result set as {schema}");

        let model = dynamic_model(&schema)?;
        let mut writer = RecordWriter::try_new(model, sink, self.config.write_options()?)?;

        let mut rows: u64 = 0;
        while result_set.next()? {
            let mut values = Vec::with_capacity(dtypes.len());
            for (index, dtype) in dtypes.iter().enumerate() {
                let value = result_set.get(index)?;
                let value = if result_set.was_null() {
                    Value::Null
                } else {
                    value.to_value(dtype).map_err(|e| {
                        e.with_context(format!("exporting column {} of row {rows}", names[index]))
                    })?
                };
                values.push(value);
            }
            writer.write(&GenericRecord::try_new(names.clone(), values)?)?;
            rows += 1;
            if rows % PROGRESS_INTERVAL == 0 {
                info!("exported {rows} rows");
            }
        }

        writer.close()?;
        info!("export completed, {rows} rows");
        Ok(rows)
    }
}
