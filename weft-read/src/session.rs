use std::sync::Arc;

use log::{debug, trace};
use weft_dtype::{FieldNames, FieldPath};
use weft_error::{ContextExt, WeftResult, weft_bail, weft_err};
use weft_io::RecordSource;
use weft_scalar::{GenericRecord, ScalarType, Value};

use crate::convert::convert_record;
use crate::plan::ReadPlan;
use crate::policy::ReadOptions;
use crate::shape::RequestedShape;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    Ready,
    Streaming,
    Closed,
}

/// Streams records out of a [`RecordSource`] through a [`ReadPlan`].
///
/// The session scans the projection of the plan as soon as it is created. It closes when the
/// source is exhausted, when [`ReadSession::close`] is called or on the first error; reading a
/// closed session fails with `InvalidState`.
pub struct ReadSession<S: RecordSource> {
    source: S,
    plan: Arc<ReadPlan>,
    names: FieldNames,
    state: SessionState,
    rows: u64,
}

impl<S: RecordSource> ReadSession<S> {
    /// Starts reading `source` with a plan built for its schema.
    pub fn new(mut source: S, plan: impl Into<Arc<ReadPlan>>) -> WeftResult<Self> {
        let plan = plan.into();
        let names = plan
            .target()
            .as_record()
            .map(|fields| fields.names().clone())
            .ok_or_else(|| weft_err!(AssertionFailed: "read plan target {} is not a record", plan.target()))?;
        source.scan(plan.projection())?;
        debug!(
            "read session scanning columns {:?} of {} into {}",
            plan.projection(),
            source.schema(),
            plan.target()
        );
        Ok(Self {
            source,
            plan,
            names,
            state: SessionState::Ready,
            rows: 0,
        })
    }

    /// Reconciles the schema of `source` with `shape` and starts reading it.
    pub fn open(source: S, shape: &RequestedShape, options: &ReadOptions) -> WeftResult<Self> {
        let plan = ReadPlan::for_source(&source, shape, options)?;
        Self::new(source, plan)
    }

    /// Starts reading `source` into host type `T`.
    pub fn for_type<T: ScalarType>(source: S, options: &ReadOptions) -> WeftResult<Self> {
        let plan = ReadPlan::for_type::<T>(source.schema(), options)?;
        Self::new(source, plan)
    }

    pub fn plan(&self) -> &ReadPlan {
        &self.plan
    }

    /// Number of records produced so far.
    pub fn rows_read(&self) -> u64 {
        self.rows
    }

    pub fn is_closed(&self) -> bool {
        self.state == SessionState::Closed
    }

    /// The next record, `None` once the source is exhausted.
    pub fn next_record(&mut self) -> WeftResult<Option<GenericRecord>> {
        self.next_values()?
            .map(|values| GenericRecord::try_new(self.names.clone(), values))
            .transpose()
    }

    /// The next record as host type `T`, `None` once the source is exhausted.
    pub fn next_as<T: ScalarType>(&mut self) -> WeftResult<Option<T>> {
        let row = self.rows;
        self.next_values()?
            .map(|values| {
                T::from_value(Value::Record(values.into()))
                    .with_context(|| format!("reading row {row}"))
            })
            .transpose()
    }

    /// Closes the session. Closing twice is a no-op.
    pub fn close(&mut self) {
        if self.state != SessionState::Closed {
            debug!("read session closed after {} rows", self.rows);
            self.state = SessionState::Closed;
        }
    }

    /// Closes the session and hands the source back.
    pub fn into_source(mut self) -> S {
        self.close();
        self.source
    }

    fn next_values(&mut self) -> WeftResult<Option<Vec<Value>>> {
        if self.state == SessionState::Closed {
            weft_bail!(InvalidState: "read session is closed");
        }
        self.state = SessionState::Streaming;

        let row = match self.source.next_row() {
            Ok(Some(row)) => row,
            Ok(None) => {
                self.close();
                return Ok(None);
            }
            Err(err) => {
                self.close();
                return Err(err);
            }
        };

        let width = self.plan.projection().len();
        if row.len() != width {
            self.close();
            weft_bail!(SchemaMismatch: "source returned {} values for a projection of {width} columns", row.len());
        }

        match convert_record(&row, self.plan.root(), self.plan.value_errors(), &FieldPath::root()) {
            Ok(values) => {
                self.rows += 1;
                trace!("read row {}", self.rows);
                Ok(Some(values))
            }
            Err(err) => {
                let row = self.rows;
                self.close();
                Err(err.with_context(format!("reading row {row}")))
            }
        }
    }
}

impl<S: RecordSource> Iterator for ReadSession<S> {
    type Item = WeftResult<GenericRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.is_closed() {
            return None;
        }
        self.next_record().transpose()
    }
}
