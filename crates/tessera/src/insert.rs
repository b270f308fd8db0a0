//! INSERT statements from flat records.

use crate::client::{Conn, ExecResult, Prepared};
use crate::compiled::Compiled;
use crate::config::ExecConfig;
use crate::error::{OrmError, OrmResult};
use crate::schema::Table;
use crate::trace;
use crate::value::Value;

/// A flat record that can be written as one row.
///
/// Usually derived:
///
/// ```ignore
/// #[derive(tessera::Insertable)]
/// #[allow(non_snake_case)]
/// struct Person {
///     Name: String,
///     Age: i32,
/// }
/// ```
pub trait Insertable {
    /// Column names, in declaration order.
    const COLUMNS: &'static [&'static str];

    /// Field values, aligned with [`Insertable::COLUMNS`].
    fn values(&self) -> Vec<Value>;
}

/// Start an INSERT into `table`.
pub fn insert(table: &Table) -> InsertStmt {
    InsertStmt {
        table: table.clone(),
        config: ExecConfig::default(),
    }
}

#[derive(Debug, Clone)]
pub struct InsertStmt {
    table: Table,
    config: ExecConfig,
}

impl InsertStmt {
    pub fn with_config(mut self, config: ExecConfig) -> Self {
        self.config = config;
        self
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Render `INSERT INTO <table> (<cols>) VALUES (?, …)` with the record's
    /// field values as binds.
    pub fn compile<R: Insertable>(&self, record: &R) -> Compiled {
        let placeholders = vec!["?"; R::COLUMNS.len()].join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.table.name(),
            R::COLUMNS.join(", "),
            placeholders
        );
        Compiled::new(sql, record.values())
    }

    /// Insert every column of `record` as one row.
    pub async fn values<R, C>(&self, conn: &C, record: &R) -> OrmResult<ExecResult>
    where
        R: Insertable + Sync,
        C: Conn,
    {
        if R::COLUMNS.is_empty() {
            return Err(OrmError::validation(format!(
                "insert into {}: record has no columns",
                self.table
            )));
        }

        let compiled = self.compile(record);
        trace::statement(&self.config, "insert.values", &compiled);
        let stmt = conn.prepare(&compiled.sql).await?;
        stmt.exec(&compiled.binds).await
    }
}
