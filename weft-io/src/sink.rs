use weft_dtype::FieldType;
use weft_error::WeftResult;
use weft_scalar::Value;

/// Receives marshaled rows from a record writer.
///
/// Every row holds one value per field of the record type passed to [`RecordSink::open`], each
/// already in the exact representation of its column.
pub trait RecordSink {
    /// Prepares the sink for rows of `schema`, which is always a record type.
    fn open(&mut self, schema: &FieldType) -> WeftResult<()>;

    /// Appends a batch of rows.
    fn write_batch(&mut self, rows: Vec<Vec<Value>>) -> WeftResult<()>;

    /// Flushes and seals the sink. No batch follows.
    fn finish(&mut self) -> WeftResult<()>;
}

impl<S: RecordSink + ?Sized> RecordSink for &mut S {
    fn open(&mut self, schema: &FieldType) -> WeftResult<()> {
        (**self).open(schema)
    }

    fn write_batch(&mut self, rows: Vec<Vec<Value>>) -> WeftResult<()> {
        (**self).write_batch(rows)
    }

    fn finish(&mut self) -> WeftResult<()> {
        (**self).finish()
    }
}

impl<S: RecordSink + ?Sized> RecordSink for Box<S> {
    fn open(&mut self, schema: &FieldType) -> WeftResult<()> {
        self.as_mut().open(schema)
    }

    fn write_batch(&mut self, rows: Vec<Vec<Value>>) -> WeftResult<()> {
        self.as_mut().write_batch(rows)
    }

    fn finish(&mut self) -> WeftResult<()> {
        self.as_mut().finish()
    }
}
