use std::collections::VecDeque;

use log::debug;
use weft_error::{ContextExt, WeftResult, weft_bail, weft_err};

use crate::column::ColumnInfo;
use crate::value::SqlValue;

/// A forward-only cursor over the rows of a query, the relational source of a dynamic export.
///
/// Column indices are zero based.
pub trait ResultSet {
    /// Metadata of every column, in order.
    fn columns(&self) -> WeftResult<Vec<ColumnInfo>>;

    /// Hint of how many rows to fetch from the server per round trip.
    fn set_fetch_size(&mut self, _rows: usize) {}

    /// Moves to the next row, returning `false` once the rows are exhausted.
    fn next(&mut self) -> WeftResult<bool>;

    /// The value of column `index` in the current row.
    fn get(&mut self, index: usize) -> WeftResult<SqlValue>;

    /// Whether the last value returned by [`ResultSet::get`] was SQL `NULL`.
    fn was_null(&self) -> bool;
}

impl<R: ResultSet + ?Sized> ResultSet for &mut R {
    fn columns(&self) -> WeftResult<Vec<ColumnInfo>> {
        (**self).columns()
    }

    fn set_fetch_size(&mut self, rows: usize) {
        (**self).set_fetch_size(rows)
    }

    fn next(&mut self) -> WeftResult<bool> {
        (**self).next()
    }

    fn get(&mut self, index: usize) -> WeftResult<SqlValue> {
        (**self).get(index)
    }

    fn was_null(&self) -> bool {
        (**self).was_null()
    }
}

/// Reads the column metadata of `result_set`.
pub fn analyze_columns<R: ResultSet + ?Sized>(result_set: &R) -> WeftResult<Vec<ColumnInfo>> {
    let columns = result_set
        .columns()
        .context("reading result set metadata")?;
    for (index, column) in columns.iter().enumerate() {
        debug!(
            "column {index}: {} ({}, code {})",
            column.label(),
            column.type_name(),
            column.type_code()
        );
    }
    Ok(columns)
}

/// A result set over rows held in memory.
#[derive(Debug, Clone, Default)]
pub struct VecResultSet {
    columns: Vec<ColumnInfo>,
    rows: VecDeque<Vec<SqlValue>>,
    current: Option<Vec<SqlValue>>,
    last_null: bool,
    fetch_size: usize,
}

impl VecResultSet {
    /// Fails with `SchemaMismatch` when a row does not have one value per column.
    pub fn try_new(columns: Vec<ColumnInfo>, rows: Vec<Vec<SqlValue>>) -> WeftResult<Self> {
        if let Some(row) = rows.iter().find(|row| row.len() != columns.len()) {
            weft_bail!(
                SchemaMismatch: "row of {} values in a result set of {} columns",
                row.len(),
                columns.len()
            );
        }
        Ok(Self {
            columns,
            rows: rows.into(),
            current: None,
            last_null: false,
            fetch_size: 0,
        })
    }

    /// The last fetch size hint, 0 when none was given.
    pub fn fetch_size(&self) -> usize {
        self.fetch_size
    }

    /// Rows not consumed yet.
    pub fn remaining(&self) -> usize {
        self.rows.len()
    }
}

impl ResultSet for VecResultSet {
    fn columns(&self) -> WeftResult<Vec<ColumnInfo>> {
        Ok(self.columns.clone())
    }

    fn set_fetch_size(&mut self, rows: usize) {
        self.fetch_size = rows;
    }

    fn next(&mut self) -> WeftResult<bool> {
        self.current = self.rows.pop_front();
        Ok(self.current.is_some())
    }

    fn get(&mut self, index: usize) -> WeftResult<SqlValue> {
        let row = self
            .current
            .as_ref()
            .ok_or_else(|| weft_err!(InvalidState: "result set is not positioned on a row"))?;
        let value = row
            .get(index)
            .cloned()
            .ok_or_else(|| weft_err!("column {index} out of bounds for {} columns", row.len()))?;
        self.last_null = value.is_null();
        Ok(value)
    }

    fn was_null(&self) -> bool {
        self.last_null
    }
}

#[cfg(test)]
mod tests {
    use weft_error::WeftError;

    use super::*;
    use crate::types::SqlType;

    #[test]
    fn cursor() {
        let mut rs = VecResultSet::try_new(
            vec![ColumnInfo::of("id", SqlType::Integer)],
            vec![vec![1i32.into()], vec![SqlValue::Null]],
        )
        .unwrap();
        assert!(matches!(rs.get(0), Err(WeftError::InvalidState(..))));
        assert!(rs.next().unwrap());
        assert_eq!(rs.get(0).unwrap(), SqlValue::Int(1));
        assert!(!rs.was_null());
        assert!(matches!(rs.get(1), Err(WeftError::InvalidArgument(..))));
        assert!(rs.next().unwrap());
        assert_eq!(rs.get(0).unwrap(), SqlValue::Null);
        assert!(rs.was_null());
        assert!(!rs.next().unwrap());
        assert_eq!(rs.remaining(), 0);
    }

    #[test]
    fn rows_must_match_columns() {
        assert!(matches!(
            VecResultSet::try_new(vec![ColumnInfo::of("id", SqlType::Integer)], vec![vec![]]),
            Err(WeftError::SchemaMismatch(..))
        ));
    }
}
