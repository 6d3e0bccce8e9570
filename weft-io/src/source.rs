use weft_dtype::FieldType;
use weft_error::WeftResult;
use weft_scalar::Value;

/// Produces stored rows for a read session.
pub trait RecordSource {
    /// The stored schema, a record type.
    fn schema(&self) -> &FieldType;

    /// Starts a scan returning the top-level columns at `projection`, in that order.
    fn scan(&mut self, projection: &[usize]) -> WeftResult<()>;

    /// The next projected row, `None` once the source is exhausted.
    fn next_row(&mut self) -> WeftResult<Option<Vec<Value>>>;
}

impl<S: RecordSource + ?Sized> RecordSource for &mut S {
    fn schema(&self) -> &FieldType {
        (**self).schema()
    }

    fn scan(&mut self, projection: &[usize]) -> WeftResult<()> {
        (**self).scan(projection)
    }

    fn next_row(&mut self) -> WeftResult<Option<Vec<Value>>> {
        (**self).next_row()
    }
}
