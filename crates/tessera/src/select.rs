//! SELECT statements over typed columns.
//!
//! # Example
//! ```ignore
//! let users = Users::new();
//! let stmt = tessera::select(&[&users]).where_([users.id.eq(5)]);
//! assert_eq!(stmt.compile().sql, "SELECT id, name FROM users WHERE id = ?");
//!
//! let mut user = User::default();
//! stmt.first(&client, [Dest::record(&mut user)]).await?;
//!
//! let mut all: Vec<User> = Vec::new();
//! tessera::select(&[&users]).all(&client, [Dest::sequence(&mut all)]).await?;
//! ```

use crate::client::{Conn, Prepared, RowCursor, RowsCursor};
use crate::compiled::Compiled;
use crate::config::ExecConfig;
use crate::error::{OrmError, OrmResult};
use crate::filter::{Filter, and};
use crate::scan::{Dest, Sequence, flat_len, flatten};
use crate::schema::{ColumnRef, Columns, OrderBy};
use crate::trace;
use std::collections::BTreeSet;

/// Start a SELECT of every column yielded by `sources`, in order.
pub fn select(sources: &[&dyn Columns]) -> SelectStmt {
    SelectStmt {
        columns: sources.iter().flat_map(|s| s.columns()).collect(),
        filters: Vec::new(),
        order: Vec::new(),
        config: ExecConfig::default(),
    }
}

/// A SELECT statement builder.
///
/// Builder methods consume and return the statement; clone it to branch.
/// Clones share nothing.
#[derive(Debug, Clone)]
pub struct SelectStmt {
    columns: Vec<ColumnRef>,
    filters: Vec<Filter>,
    order: Vec<OrderBy>,
    config: ExecConfig,
}

impl SelectStmt {
    /// Append top-level filters; all top-level filters are AND-ed.
    pub fn where_(mut self, filters: impl IntoIterator<Item = Filter>) -> Self {
        self.filters.extend(filters);
        self
    }

    /// Append ORDER BY terms.
    pub fn order_by(mut self, order: impl IntoIterator<Item = OrderBy>) -> Self {
        self.order.extend(order);
        self
    }

    pub fn with_config(mut self, config: ExecConfig) -> Self {
        self.config = config;
        self
    }

    pub fn columns(&self) -> &[ColumnRef] {
        &self.columns
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    /// Distinct table names of the selected columns, sorted.
    pub fn table_names(&self) -> Vec<&str> {
        self.columns
            .iter()
            .map(|c| c.table().name())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Render the SQL text and bind list.
    ///
    /// Columns, filters and ordering are table-qualified only when the selected
    /// columns span more than one table.
    pub fn compile(&self) -> Compiled {
        let tables = self.table_names();
        let qualified = tables.len() > 1;

        let cols: Vec<String> = self.columns.iter().map(|c| c.render(qualified)).collect();
        let mut sql = format!("SELECT {} FROM {}", cols.join(", "), tables.join(", "));

        let predicate = and(self.filters.iter().cloned());
        let condition = predicate.render_unwrapped(qualified);
        if !condition.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&condition);
        }

        if !self.order.is_empty() {
            let order: Vec<String> = self.order.iter().map(|o| o.render(qualified)).collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&order.join(", "));
        }

        Compiled::new(sql, predicate.binds())
    }

    fn check_arity(&self, got: usize) -> OrmResult<()> {
        if self.config.check_arity && got != self.columns.len() {
            return Err(OrmError::Arity {
                expected: self.columns.len(),
                got,
            });
        }
        Ok(())
    }

    /// Fetch at most one row into `dests`.
    ///
    /// Records among `dests` are flattened into their fields, so the flattened
    /// destinations must line up with the selected columns. No matching row is
    /// `OrmError::NotFound`.
    pub async fn first<'d, C: Conn>(
        &self,
        conn: &C,
        dests: impl IntoIterator<Item = Dest<'d>>,
    ) -> OrmResult<()> {
        let mut targets = flatten(dests.into_iter().collect())?;
        self.check_arity(targets.len())?;

        let compiled = self.compile();
        trace::statement(&self.config, "select.first", &compiled);
        let stmt = conn.prepare(&compiled.sql).await?;
        let row = stmt.query_row(&compiled.binds).await;
        row.scan(&mut targets)
    }

    /// Fetch every matching row, growing each sequence in `dests` by one element
    /// per row.
    ///
    /// Every destination must be a [`Dest::sequence`]; anything else fails with
    /// `OrmError::NotASequence` before a query is sent.
    pub async fn all<'d, C: Conn>(
        &self,
        conn: &C,
        dests: impl IntoIterator<Item = Dest<'d>>,
    ) -> OrmResult<()> {
        let mut seqs: Vec<&mut dyn Sequence> = Vec::new();
        for (index, dest) in dests.into_iter().enumerate() {
            match dest.into_sequence() {
                Ok(seq) => seqs.push(seq),
                Err(kind) => return Err(OrmError::NotASequence { index, kind }),
            }
        }
        if self.config.check_arity {
            let width = flat_len(seqs.iter_mut().map(|s| s.grow()).collect());
            for seq in seqs.iter_mut() {
                seq.shrink();
            }
            self.check_arity(width?)?;
        }

        let compiled = self.compile();
        trace::statement(&self.config, "select.all", &compiled);
        let stmt = conn.prepare(&compiled.sql).await?;
        let mut rows = stmt.query(&compiled.binds).await?;

        let outcome = match drain(&mut rows, &mut seqs).await {
            Ok(count) => rows.err().map(|()| count),
            Err(e) => Err(e),
        };
        rows.close();

        let count = outcome?;
        trace::rows_appended(&self.config, "select.all", count);
        Ok(())
    }
}

/// Scan each remaining row into a fresh element of every sequence.
///
/// A row that fails to scan leaves no partial elements behind.
async fn drain<R: RowsCursor>(rows: &mut R, seqs: &mut [&mut dyn Sequence]) -> OrmResult<usize> {
    let mut count = 0;
    while rows.next().await {
        let scanned = match flatten(seqs.iter_mut().map(|s| s.grow()).collect()) {
            Ok(mut targets) => rows.scan(&mut targets),
            Err(e) => Err(e),
        };
        if let Err(e) = scanned {
            for seq in seqs.iter_mut() {
                seq.shrink();
            }
            return Err(e);
        }
        count += 1;
    }
    Ok(count)
}
