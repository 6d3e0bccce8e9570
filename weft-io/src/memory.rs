use log::debug;
use weft_dtype::{FieldType, Nullability, RecordFields};
use weft_error::{WeftResult, weft_bail, weft_err};
use weft_scalar::Value;

use crate::{RecordSink, RecordSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TableState {
    Empty,
    Open,
    Finished,
}

#[derive(Debug, Clone)]
struct Scan {
    projection: Vec<usize>,
    cursor: usize,
}

/// A table held in memory, written through [`RecordSink`] and read through [`RecordSource`].
#[derive(Debug, Clone)]
pub struct MemoryTable {
    schema: FieldType,
    rows: Vec<Vec<Value>>,
    state: TableState,
    scan: Option<Scan>,
}

impl Default for MemoryTable {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTable {
    /// An empty table, waiting to be opened by a writer.
    pub fn new() -> Self {
        Self {
            schema: FieldType::Record(RecordFields::empty(), Nullability::NonNullable),
            rows: Vec::new(),
            state: TableState::Empty,
            scan: None,
        }
    }

    /// A finished table holding `rows` of `schema`.
    pub fn try_from_rows(schema: FieldType, rows: Vec<Vec<Value>>) -> WeftResult<Self> {
        let width = schema
            .as_record()
            .ok_or_else(|| weft_err!(SchemaMismatch: "table schema {schema} is not a record"))?
            .len();
        if let Some(row) = rows.iter().find(|row| row.len() != width) {
            weft_bail!(SchemaMismatch: "row of {} values in a table of {width} columns", row.len());
        }
        Ok(Self {
            schema,
            rows,
            state: TableState::Finished,
            scan: None,
        })
    }

    /// The stored rows.
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Number of stored rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the table holds no row.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether a writer finished the table.
    pub fn is_finished(&self) -> bool {
        self.state == TableState::Finished
    }
}

impl RecordSink for MemoryTable {
    fn open(&mut self, schema: &FieldType) -> WeftResult<()> {
        if self.state != TableState::Empty {
            weft_bail!(InvalidState: "memory table is already opened");
        }
        if !schema.is_record() {
            weft_bail!(SchemaMismatch: "table schema {schema} is not a record");
        }
        debug!("opening memory table with schema {schema}");
        self.schema = schema.clone();
        self.state = TableState::Open;
        Ok(())
    }

    fn write_batch(&mut self, rows: Vec<Vec<Value>>) -> WeftResult<()> {
        if self.state != TableState::Open {
            weft_bail!(InvalidState: "memory table is not open for writing");
        }
        let width = self.schema.as_record().map_or(0, RecordFields::len);
        if let Some(row) = rows.iter().find(|row| row.len() != width) {
            weft_bail!(SchemaMismatch: "row of {} values in a table of {width} columns", row.len());
        }
        self.rows.extend(rows);
        Ok(())
    }

    fn finish(&mut self) -> WeftResult<()> {
        if self.state != TableState::Open {
            weft_bail!(InvalidState: "memory table is not open for writing");
        }
        debug!("memory table finished with {} rows", self.rows.len());
        self.state = TableState::Finished;
        Ok(())
    }
}

impl RecordSource for MemoryTable {
    fn schema(&self) -> &FieldType {
        &self.schema
    }

    fn scan(&mut self, projection: &[usize]) -> WeftResult<()> {
        if self.state != TableState::Finished {
            weft_bail!(InvalidState: "memory table can only be scanned once it is finished");
        }
        let width = self.schema.as_record().map_or(0, RecordFields::len);
        if let Some(idx) = projection.iter().find(|&&idx| idx >= width) {
            weft_bail!(MissingColumn: "column {idx} is out of bounds for a table of {width} columns");
        }
        self.scan = Some(Scan {
            projection: projection.to_vec(),
            cursor: 0,
        });
        Ok(())
    }

    fn next_row(&mut self) -> WeftResult<Option<Vec<Value>>> {
        let Some(scan) = self.scan.as_mut() else {
            weft_bail!(InvalidState: "next_row called before scan");
        };
        let Some(row) = self.rows.get(scan.cursor) else {
            return Ok(None);
        };
        scan.cursor += 1;
        Ok(Some(
            scan.projection.iter().map(|&idx| row[idx].clone()).collect(),
        ))
    }
}
