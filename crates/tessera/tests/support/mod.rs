//! In-memory execution backend for integration tests.
//!
//! `MemoryConn` serves canned rows for every statement and records what it
//! was asked to prepare, which binds it received and how often cursors were
//! closed.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tessera::{
    Conn, ExecResult, OrmError, OrmResult, Prepared, RowCursor, RowsCursor, Scan, Value,
    assign_row,
};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[derive(Debug, Default)]
pub struct Log {
    pub prepared: Vec<String>,
    pub binds: Vec<Vec<Value>>,
    pub closed: usize,
}

#[derive(Default)]
pub struct MemoryConn {
    rows: Vec<Vec<Value>>,
    fail_after: Option<usize>,
    prepare_error: Option<String>,
    log: Arc<Mutex<Log>>,
}

impl MemoryConn {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(rows: Vec<Vec<Value>>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    /// End iteration with an error after `n` rows have been produced.
    pub fn fail_after(mut self, n: usize) -> Self {
        self.fail_after = Some(n);
        self
    }

    pub fn failing_prepare(mut self, message: &str) -> Self {
        self.prepare_error = Some(message.to_string());
        self
    }

    pub fn prepared(&self) -> Vec<String> {
        self.log.lock().unwrap().prepared.clone()
    }

    pub fn binds(&self) -> Vec<Vec<Value>> {
        self.log.lock().unwrap().binds.clone()
    }

    pub fn closed(&self) -> usize {
        self.log.lock().unwrap().closed
    }

    fn record_binds(&self, binds: &[Value]) {
        self.log.lock().unwrap().binds.push(binds.to_vec());
    }
}

impl Conn for MemoryConn {
    type Statement<'c> = MemoryStatement<'c>;

    async fn prepare<'c>(&'c self, sql: &str) -> OrmResult<MemoryStatement<'c>> {
        self.log.lock().unwrap().prepared.push(sql.to_string());
        if let Some(message) = &self.prepare_error {
            return Err(OrmError::driver(message.clone()));
        }
        Ok(MemoryStatement { conn: self })
    }
}

pub struct MemoryStatement<'c> {
    conn: &'c MemoryConn,
}

impl Prepared for MemoryStatement<'_> {
    type Row = MemoryRow;
    type Rows = MemoryRows;

    async fn query_row(&self, binds: &[Value]) -> MemoryRow {
        self.conn.record_binds(binds);
        MemoryRow {
            row: self.conn.rows.first().cloned(),
        }
    }

    async fn query(&self, binds: &[Value]) -> OrmResult<MemoryRows> {
        self.conn.record_binds(binds);
        Ok(MemoryRows {
            pending: self.conn.rows.iter().cloned().collect(),
            current: None,
            produced: 0,
            fail_after: self.conn.fail_after,
            error: None,
            closed: false,
            log: Arc::clone(&self.conn.log),
        })
    }

    async fn exec(&self, binds: &[Value]) -> OrmResult<ExecResult> {
        self.conn.record_binds(binds);
        Ok(ExecResult { rows_affected: 1 })
    }
}

pub struct MemoryRow {
    row: Option<Vec<Value>>,
}

impl RowCursor for MemoryRow {
    fn scan(self, targets: &mut [&mut dyn Scan]) -> OrmResult<()> {
        match self.row {
            Some(values) => assign_row(targets, values.into_iter()),
            None => Err(OrmError::not_found("no rows in result set")),
        }
    }
}

pub struct MemoryRows {
    pending: VecDeque<Vec<Value>>,
    current: Option<Vec<Value>>,
    produced: usize,
    fail_after: Option<usize>,
    error: Option<OrmError>,
    closed: bool,
    log: Arc<Mutex<Log>>,
}

impl RowsCursor for MemoryRows {
    async fn next(&mut self) -> bool {
        if self.closed {
            return false;
        }
        if self.fail_after == Some(self.produced) {
            self.error = Some(OrmError::driver("connection reset"));
            self.current = None;
            return false;
        }
        self.current = self.pending.pop_front();
        if self.current.is_some() {
            self.produced += 1;
        }
        self.current.is_some()
    }

    fn scan(&mut self, targets: &mut [&mut dyn Scan]) -> OrmResult<()> {
        match &self.current {
            Some(values) => assign_row(targets, values.clone().into_iter()),
            None => Err(OrmError::driver("scan called without a current row")),
        }
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.log.lock().unwrap().closed += 1;
        }
    }

    fn err(&mut self) -> OrmResult<()> {
        match self.error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
