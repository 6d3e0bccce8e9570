use std::sync::Arc;

use log::{debug, trace, warn};
use weft_dtype::FieldPath;
use weft_error::{WeftResult, weft_bail};
use weft_io::RecordSink;
use weft_scalar::{Value, ValueErrorMode, marshal};

use crate::model::{RecordType, WriteRecordModel};
use crate::options::{WriteOptions, check_batch_size};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriterState {
    Open,
    Failed,
}

/// Writes host records to a [`RecordSink`] through a write model.
///
/// Records are marshaled into rows and handed to the sink in batches of
/// [`WriteOptions::batch_size`] rows. A record that cannot be marshaled is rejected without
/// touching the pending batch. A failure of the sink is fatal: the writer refuses every further
/// call with `InvalidState`.
pub struct RecordWriter<T, S: RecordSink> {
    model: Arc<WriteRecordModel<T>>,
    sink: S,
    options: WriteOptions,
    pending: Vec<Vec<Value>>,
    rows: u64,
    state: WriterState,
}

impl<T: RecordType, S: RecordSink> RecordWriter<T, S> {
    /// A writer for a declared host type.
    pub fn for_type(sink: S, options: WriteOptions) -> WeftResult<Self> {
        let model = WriteRecordModel::<T>::of(&options)?;
        Self::try_new(model, sink, options)
    }
}

impl<T, S: RecordSink> RecordWriter<T, S> {
    /// Opens `sink` with the record type of `model`.
    pub fn try_new(
        model: impl Into<Arc<WriteRecordModel<T>>>,
        mut sink: S,
        options: WriteOptions,
    ) -> WeftResult<Self> {
        check_batch_size(options.batch_size())?;
        let model = model.into();
        sink.open(model.field_type())?;
        debug!(
            "record writer opened for {} with batch size {}",
            model.field_type(),
            options.batch_size()
        );
        Ok(Self {
            model,
            sink,
            pending: Vec::with_capacity(options.batch_size()),
            options,
            rows: 0,
            state: WriterState::Open,
        })
    }

    pub fn model(&self) -> &WriteRecordModel<T> {
        &self.model
    }

    /// Number of records accepted so far, including those not yet handed to the sink.
    pub fn rows_written(&self) -> u64 {
        self.rows
    }

    fn check_open(&self) -> WeftResult<()> {
        if self.state == WriterState::Failed {
            weft_bail!(InvalidState: "record writer failed earlier and cannot be used anymore");
        }
        Ok(())
    }

    fn marshal_row(&self, record: &T) -> WeftResult<Vec<Value>> {
        if self.options.value_errors() == ValueErrorMode::Fail {
            return self.model.marshal(record, self.options.decimals());
        }
        self.model
            .fields()
            .iter()
            .map(|field| {
                let path = FieldPath::from_name(field.name().as_ref());
                match marshal(
                    field.accessor().get(record),
                    field.dtype(),
                    self.options.decimals(),
                    &path,
                ) {
                    Err(err) if err.is_value_error() && field.dtype().is_nullable() => {
                        warn!("writing null for {path}: {err}");
                        Ok(Value::Null)
                    }
                    result => result,
                }
            })
            .collect()
    }

    /// Writes a single record.
    pub fn write(&mut self, record: &T) -> WeftResult<()> {
        self.check_open()?;
        let row = self.marshal_row(record)?;
        self.pending.push(row);
        self.rows += 1;
        if self.pending.len() >= self.options.batch_size() {
            self.flush()?;
        }
        Ok(())
    }

    /// Writes a slice of records. Either every record is accepted or none is.
    pub fn write_batch(&mut self, records: &[T]) -> WeftResult<()> {
        self.check_open()?;
        let rows = records
            .iter()
            .map(|r| self.marshal_row(r))
            .collect::<WeftResult<Vec<_>>>()?;
        self.rows += rows.len() as u64;
        self.pending.extend(rows);
        if self.pending.len() >= self.options.batch_size() {
            self.flush()?;
        }
        Ok(())
    }

    /// Writes every record of `records`, returning how many were written.
    pub fn write_all<'a, I>(&mut self, records: I) -> WeftResult<u64>
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
    {
        let before = self.rows;
        for record in records {
            self.write(record)?;
        }
        Ok(self.rows - before)
    }

    /// Hands the pending rows to the sink.
    pub fn flush(&mut self) -> WeftResult<()> {
        self.check_open()?;
        while !self.pending.is_empty() {
            let take = self.pending.len().min(self.options.batch_size());
            let batch: Vec<_> = self.pending.drain(..take).collect();
            trace!("handing batch of {} rows to the sink", batch.len());
            if let Err(err) = self.sink.write_batch(batch) {
                self.state = WriterState::Failed;
                return Err(err);
            }
        }
        Ok(())
    }

    /// Flushes the pending rows, finishes the sink and returns it.
    pub fn close(mut self) -> WeftResult<S> {
        self.flush()?;
        self.sink.finish()?;
        debug!("record writer closed after {} rows", self.rows);
        Ok(self.sink)
    }
}

#[cfg(test)]
mod tests {
    use weft_dtype::Nullability::{NonNullable, Nullable};
    use weft_dtype::{FieldType, PType};
    use weft_error::{WeftError, WeftResult};
    use weft_io::{MemoryTable, RecordSink};
    use weft_scalar::{Value, ValueErrorMode};

    use super::RecordWriter;
    use crate::{WriteOptions, WriteRecordModel};

    struct Reading {
        sensor: i64,
        value: Option<i64>,
    }

    fn model() -> WriteRecordModel<Reading> {
        WriteRecordModel::builder()
            .with_i64_field("sensor", FieldType::Primitive(PType::I64, NonNullable), |r: &Reading| r.sensor)
            .with_field("value", FieldType::Primitive(PType::I8, Nullable), |r: &Reading| {
                Value::from(r.value)
            })
            .build()
            .unwrap()
    }

    fn reading(sensor: i64, value: i64) -> Reading {
        Reading {
            sensor,
            value: Some(value),
        }
    }

    #[derive(Default)]
    struct CountingSink {
        batches: Vec<usize>,
        fail: bool,
        finished: bool,
    }

    impl RecordSink for CountingSink {
        fn open(&mut self, _schema: &FieldType) -> WeftResult<()> {
            Ok(())
        }

        fn write_batch(&mut self, rows: Vec<Vec<Value>>) -> WeftResult<()> {
            if self.fail {
                return Err(WeftError::external(std::io::Error::other("disk full")));
            }
            self.batches.push(rows.len());
            Ok(())
        }

        fn finish(&mut self) -> WeftResult<()> {
            self.finished = true;
            Ok(())
        }
    }

    #[test]
    fn batches_rows() {
        let options = WriteOptions::default().with_batch_size(2).unwrap();
        let mut writer = RecordWriter::try_new(model(), CountingSink::default(), options).unwrap();
        let readings: Vec<_> = (0..5).map(|i| reading(i, i)).collect();
        assert_eq!(writer.write_all(&readings).unwrap(), 5);
        let sink = writer.close().unwrap();
        assert_eq!(sink.batches, vec![2, 2, 1]);
        assert!(sink.finished);
    }

    #[test]
    fn failing_record_leaves_no_partial_batch() {
        let mut writer =
            RecordWriter::try_new(model(), MemoryTable::new(), WriteOptions::default()).unwrap();
        let err = writer
            .write_batch(&[reading(1, 1), reading(2, 1000)])
            .unwrap_err();
        assert!(matches!(err.root(), WeftError::NarrowingConversion(..)));
        writer.write(&reading(3, 3)).unwrap();
        let table = writer.close().unwrap();
        assert_eq!(table.rows(), &[vec![Value::from(3i64), Value::from(3i8)]]);
    }

    #[test]
    fn null_on_error() {
        let options = WriteOptions::default().with_value_errors(ValueErrorMode::NullOnError);
        let mut writer = RecordWriter::try_new(model(), MemoryTable::new(), options).unwrap();
        writer.write(&reading(1, 1000)).unwrap();
        let table = writer.close().unwrap();
        assert_eq!(table.rows(), &[vec![Value::from(1i64), Value::Null]]);
    }

    #[test]
    fn sink_failure_is_fatal() {
        let sink = CountingSink {
            fail: true,
            ..Default::default()
        };
        let options = WriteOptions::default().with_batch_size(1).unwrap();
        let mut writer = RecordWriter::try_new(model(), sink, options).unwrap();
        let err = writer.write(&reading(1, 1)).unwrap_err();
        assert!(err.is_external());
        assert!(matches!(
            writer.write(&reading(2, 2)),
            Err(WeftError::InvalidState(..))
        ));
    }
}
