//! The execution boundary statements run against.
//!
//! Statements never talk to a database directly. They compile to SQL text with
//! `?` placeholders plus an ordered bind list, and hand both to a [`Conn`]: a
//! connection or transaction handle that can prepare the text once and run it.
//! The `postgres` feature implements these traits for tokio-postgres clients and
//! transactions; tests use an in-memory implementation.
//!
//! Connection lifecycle, pooling, transaction boundaries, retries and
//! cancellation all belong to the implementation, not to this crate.

use crate::error::{OrmError, OrmResult};
use crate::scan::Scan;
use crate::value::Value;
use std::future::Future;

/// Result of a statement that returns no rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExecResult {
    pub rows_affected: u64,
}

/// A connection or transaction handle that can prepare statements.
pub trait Conn: Send + Sync {
    type Statement<'c>: Prepared
    where
        Self: 'c;

    /// Prepare `sql` (with `?` placeholders) for execution.
    fn prepare<'c>(
        &'c self,
        sql: &str,
    ) -> impl Future<Output = OrmResult<Self::Statement<'c>>> + Send;
}

/// A prepared statement.
pub trait Prepared: Send + Sync {
    type Row: RowCursor;
    type Rows: RowsCursor;

    /// Run the statement for at most one row.
    ///
    /// Errors are deferred to [`RowCursor::scan`].
    fn query_row(&self, binds: &[Value]) -> impl Future<Output = Self::Row> + Send;

    /// Run the statement and return a cursor over every matching row.
    fn query(&self, binds: &[Value]) -> impl Future<Output = OrmResult<Self::Rows>> + Send;

    /// Run a statement that returns no rows.
    fn exec(&self, binds: &[Value]) -> impl Future<Output = OrmResult<ExecResult>> + Send;
}

/// Cursor over the single row of [`Prepared::query_row`].
pub trait RowCursor: Send {
    /// Write the row's columns into `targets`, positionally.
    ///
    /// Returns `OrmError::NotFound` when the query produced no row, and any
    /// error the query itself raised.
    fn scan(self, targets: &mut [&mut dyn Scan]) -> OrmResult<()>;
}

/// Cursor over the rows of [`Prepared::query`].
pub trait RowsCursor: Send {
    /// Advance to the next row. `false` at the end or on error; check
    /// [`RowsCursor::err`] after the loop.
    fn next(&mut self) -> impl Future<Output = bool> + Send;

    /// Write the current row's columns into `targets`, positionally.
    fn scan(&mut self, targets: &mut [&mut dyn Scan]) -> OrmResult<()>;

    /// Release the cursor. Safe to call more than once.
    fn close(&mut self);

    /// The error that ended iteration, if any.
    fn err(&mut self) -> OrmResult<()>;
}

/// Write `values` into `targets` one by one, labelling failures with the column
/// position. Shared by cursor implementations.
pub fn assign_row(
    targets: &mut [&mut dyn Scan],
    values: impl ExactSizeIterator<Item = Value>,
) -> OrmResult<()> {
    if targets.len() != values.len() {
        return Err(OrmError::driver(format!(
            "expected {} destination arguments in scan, not {}",
            values.len(),
            targets.len()
        )));
    }
    for (idx, (target, value)) in targets.iter_mut().zip(values).enumerate() {
        target
            .assign(value)
            .map_err(|e| OrmError::decode(idx.to_string(), e.to_string()))?;
    }
    Ok(())
}
