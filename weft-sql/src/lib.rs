//! Dynamic schemas for relational result sets.
//!
//! [`infer_schema`] builds a record type from the column metadata a driver reports, without a
//! declared host type. [`DynamicExporter`] uses it to stream any [`ResultSet`] into a
//! [`RecordSink`](weft_io::RecordSink), converting driver values with [`SqlValue::to_value`].

pub use column::ColumnInfo;
pub use exporter::{DEFAULT_FETCH_SIZE, DynamicExporter, ExportConfig, PROGRESS_INTERVAL, dynamic_model};
pub use infer::{FALLBACK_DECIMAL, InferOptions, describe_columns, infer_field_type, infer_schema};
pub use result_set::{ResultSet, VecResultSet, analyze_columns};
pub use types::SqlType;
pub use value::SqlValue;

mod column;
mod exporter;
mod infer;
mod result_set;
mod types;
mod value;
