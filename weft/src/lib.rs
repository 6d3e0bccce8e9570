//! Maps host record types to columnar schemas and back.
//!
//! Writing goes through a [`WriteRecordModel`], declared with [`record_model!`] or assembled with
//! [`WriteRecordModel::builder`], and a [`RecordWriter`]. Reading reconciles the stored schema
//! with a requested shape into a [`ReadPlan`] and streams records with a [`ReadSession`]. With
//! the `sql` feature, [`sql::infer_schema`] derives schemas from relational column metadata.

pub use weft_model::{RecordType, RecordWriter, WriteOptions, WriteRecordModel, record_model};
pub use weft_read::{ReadOptions, ReadPlan, ReadPolicy, ReadSession, RequestedShape};
pub use weft_scalar::{GenericRecord, ScalarType, Value};
#[cfg(feature = "sql")]
pub use weft_sql as sql;
pub use {
    weft_dtype as dtype, weft_error as error, weft_io as io, weft_model as model,
    weft_read as read, weft_scalar as scalar,
};
