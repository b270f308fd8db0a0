//! PostgreSQL execution via tokio-postgres.
//!
//! [`Conn`] is implemented for `tokio_postgres::Client`,
//! `tokio_postgres::Transaction` and, with the `pool` feature, the deadpool
//! client and transaction wrappers. Statements are prepared once per call; `?`
//! placeholders are rewritten to `$n` before preparing.

use crate::client::{Conn, ExecResult, Prepared, RowCursor, RowsCursor, assign_row};
use crate::error::{OrmError, OrmResult};
use crate::scan::Scan;
use crate::value::Value;
use bytes::BytesMut;
use chrono::{DateTime, NaiveDateTime, Utc};
use futures_util::{StreamExt, TryStreamExt};
use std::error::Error;
use std::pin::Pin;
use tokio_postgres::types::{IsNull, ToSql, Type, to_sql_checked};
use tokio_postgres::{GenericClient, Row, RowStream, Statement};
use uuid::Uuid;

/// Rewrite `?` placeholders to PostgreSQL's `$1, $2, …`.
///
/// Question marks inside single-quoted literals and double-quoted identifiers
/// are left alone.
pub fn to_pg_placeholders(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len() + 8);
    let mut n = 0;
    let mut quote: Option<char> = None;

    for ch in sql.chars() {
        match quote {
            Some(q) if ch == q => quote = None,
            Some(_) => {}
            None if ch == '\'' || ch == '"' => quote = Some(ch),
            None if ch == '?' => {
                n += 1;
                out.push('$');
                out.push_str(&n.to_string());
                continue;
            }
            None => {}
        }
        out.push(ch);
    }
    out
}

impl ToSql for Value {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(v) => v.to_sql_checked(ty, out),
            Value::Int(v) => {
                if *ty == Type::INT2 {
                    i16::try_from(*v)?.to_sql_checked(ty, out)
                } else if *ty == Type::INT4 {
                    i32::try_from(*v)?.to_sql_checked(ty, out)
                } else {
                    v.to_sql_checked(ty, out)
                }
            }
            Value::Float(v) => {
                if *ty == Type::FLOAT4 {
                    (*v as f32).to_sql_checked(ty, out)
                } else {
                    v.to_sql_checked(ty, out)
                }
            }
            Value::Text(v) => v.to_sql_checked(ty, out),
            Value::Bytes(v) => v.to_sql_checked(ty, out),
            Value::Uuid(v) => v.to_sql_checked(ty, out),
            Value::Timestamp(v) => {
                if *ty == Type::TIMESTAMP {
                    v.naive_utc().to_sql_checked(ty, out)
                } else {
                    v.to_sql_checked(ty, out)
                }
            }
            Value::Json(v) => v.to_sql_checked(ty, out),
        }
    }

    // Each variant checks the parameter type itself.
    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

fn column_value(row: &Row, idx: usize) -> OrmResult<Value> {
    let column = &row.columns()[idx];
    let ty = column.type_();

    macro_rules! get {
        ($t:ty, $wrap:expr) => {
            row.try_get::<_, Option<$t>>(idx).map(|v| v.map($wrap))
        };
    }

    let decoded = if *ty == Type::BOOL {
        get!(bool, Value::Bool)
    } else if *ty == Type::INT2 {
        get!(i16, |v| Value::Int(v.into()))
    } else if *ty == Type::INT4 {
        get!(i32, |v| Value::Int(v.into()))
    } else if *ty == Type::INT8 {
        get!(i64, Value::Int)
    } else if *ty == Type::FLOAT4 {
        get!(f32, |v| Value::Float(v.into()))
    } else if *ty == Type::FLOAT8 {
        get!(f64, Value::Float)
    } else if *ty == Type::TEXT
        || *ty == Type::VARCHAR
        || *ty == Type::BPCHAR
        || *ty == Type::NAME
    {
        get!(String, Value::Text)
    } else if *ty == Type::BYTEA {
        get!(Vec<u8>, Value::Bytes)
    } else if *ty == Type::UUID {
        get!(Uuid, Value::Uuid)
    } else if *ty == Type::TIMESTAMPTZ {
        get!(DateTime<Utc>, Value::Timestamp)
    } else if *ty == Type::TIMESTAMP {
        get!(NaiveDateTime, |v| Value::Timestamp(v.and_utc()))
    } else if *ty == Type::JSON || *ty == Type::JSONB {
        get!(serde_json::Value, Value::Json)
    } else {
        return Err(OrmError::decode(
            column.name(),
            format!("unsupported column type {}", ty),
        ));
    };

    decoded
        .map(|v| v.unwrap_or(Value::Null))
        .map_err(|e| OrmError::decode(column.name(), e.to_string()))
}

fn row_values(row: &Row) -> OrmResult<Vec<Value>> {
    (0..row.len()).map(|idx| column_value(row, idx)).collect()
}

/// A statement prepared on a tokio-postgres client or transaction.
pub struct PgStatement<'c, C> {
    client: &'c C,
    statement: Statement,
}

impl<C> PgStatement<'_, C> {
    pub fn statement(&self) -> &Statement {
        &self.statement
    }
}

async fn prepare_on<'c, C>(client: &'c C, sql: &str) -> OrmResult<PgStatement<'c, C>>
where
    C: GenericClient + Sync,
{
    let text = to_pg_placeholders(sql);
    let statement = client
        .prepare(&text)
        .await
        .map_err(OrmError::from_db_error)?;
    Ok(PgStatement { client, statement })
}

impl<C> Prepared for PgStatement<'_, C>
where
    C: GenericClient + Sync,
{
    type Row = PgRow;
    type Rows = PgRows;

    async fn query_row(&self, binds: &[Value]) -> PgRow {
        let outcome = match self.client.query_raw(&self.statement, binds.iter()).await {
            Ok(stream) => {
                let mut stream = Box::pin(stream);
                match stream.try_next().await {
                    Ok(Some(row)) => Ok(row),
                    Ok(None) => Err(OrmError::not_found("query returned no rows")),
                    Err(e) => Err(OrmError::from_db_error(e)),
                }
            }
            Err(e) => Err(OrmError::from_db_error(e)),
        };
        PgRow { outcome }
    }

    async fn query(&self, binds: &[Value]) -> OrmResult<PgRows> {
        let stream = self
            .client
            .query_raw(&self.statement, binds.iter())
            .await
            .map_err(OrmError::from_db_error)?;
        Ok(PgRows {
            stream: Some(Box::pin(stream)),
            current: None,
            error: None,
        })
    }

    async fn exec(&self, binds: &[Value]) -> OrmResult<ExecResult> {
        let rows_affected = self
            .client
            .execute_raw(&self.statement, binds.iter())
            .await
            .map_err(OrmError::from_db_error)?;
        Ok(ExecResult { rows_affected })
    }
}

/// The single row fetched by `query_row`, or the error that replaced it.
pub struct PgRow {
    outcome: OrmResult<Row>,
}

impl RowCursor for PgRow {
    fn scan(self, targets: &mut [&mut dyn Scan]) -> OrmResult<()> {
        let row = self.outcome?;
        assign_row(targets, row_values(&row)?.into_iter())
    }
}

/// A streaming cursor over the rows of `query`.
pub struct PgRows {
    stream: Option<Pin<Box<RowStream>>>,
    current: Option<Row>,
    error: Option<OrmError>,
}

impl RowsCursor for PgRows {
    async fn next(&mut self) -> bool {
        let Some(stream) = self.stream.as_mut() else {
            return false;
        };
        let polled = stream.next().await;
        match polled {
            Some(Ok(row)) => {
                self.current = Some(row);
                true
            }
            Some(Err(e)) => {
                self.error = Some(OrmError::from_db_error(e));
                self.close();
                false
            }
            None => {
                self.close();
                false
            }
        }
    }

    fn scan(&mut self, targets: &mut [&mut dyn Scan]) -> OrmResult<()> {
        let row = self
            .current
            .as_ref()
            .ok_or_else(|| OrmError::driver("scan called without a current row"))?;
        assign_row(targets, row_values(row)?.into_iter())
    }

    fn close(&mut self) {
        self.stream = None;
        self.current = None;
    }

    fn err(&mut self) -> OrmResult<()> {
        match self.error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

macro_rules! impl_conn {
    ($($ty:ty),+ $(,)?) => {$(
        impl Conn for $ty {
            type Statement<'c>
                = PgStatement<'c, Self>
            where
                Self: 'c;

            async fn prepare<'c>(&'c self, sql: &str) -> OrmResult<Self::Statement<'c>> {
                prepare_on(self, sql).await
            }
        }
    )+};
}

impl_conn!(tokio_postgres::Client, tokio_postgres::Transaction<'_>);

#[cfg(feature = "pool")]
impl Conn for deadpool_postgres::Client {
    type Statement<'c>
        = PgStatement<'c, tokio_postgres::Client>
    where
        Self: 'c;

    async fn prepare<'c>(&'c self, sql: &str) -> OrmResult<Self::Statement<'c>> {
        // Delegate to the deref target (ClientWrapper / tokio_postgres::Client).
        let client: &tokio_postgres::Client = self;
        prepare_on(client, sql).await
    }
}

#[cfg(feature = "pool")]
impl<'a> Conn for deadpool_postgres::Transaction<'a> {
    type Statement<'c>
        = PgStatement<'c, tokio_postgres::Transaction<'a>>
    where
        Self: 'c;

    async fn prepare<'c>(&'c self, sql: &str) -> OrmResult<Self::Statement<'c>> {
        let tx: &tokio_postgres::Transaction<'a> = self;
        prepare_on(tx, sql).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_are_numbered_in_order() {
        assert_eq!(
            to_pg_placeholders("SELECT id FROM users WHERE age > ? AND name = ?"),
            "SELECT id FROM users WHERE age > $1 AND name = $2"
        );
        assert_eq!(
            to_pg_placeholders("INSERT INTO people (Name, Age) VALUES (?, ?)"),
            "INSERT INTO people (Name, Age) VALUES ($1, $2)"
        );
    }

    #[test]
    fn quoted_question_marks_are_kept() {
        assert_eq!(
            to_pg_placeholders("SELECT '?', \"a?b\" FROM t WHERE x = ?"),
            "SELECT '?', \"a?b\" FROM t WHERE x = $1"
        );
        // doubled quote inside a literal
        assert_eq!(
            to_pg_placeholders("SELECT 'it''s?' WHERE y = ?"),
            "SELECT 'it''s?' WHERE y = $1"
        );
    }

    #[test]
    fn no_placeholders_is_unchanged() {
        assert_eq!(to_pg_placeholders("SELECT a.x, b.y FROM a, b"), "SELECT a.x, b.y FROM a, b");
    }

    #[test]
    fn int_binds_narrow_to_parameter_type() {
        let mut buf = BytesMut::new();
        assert!(matches!(
            Value::Int(7).to_sql(&Type::INT4, &mut buf),
            Ok(IsNull::No)
        ));
        assert_eq!(buf.len(), 4);

        let mut buf = BytesMut::new();
        assert!(Value::Int(70_000).to_sql(&Type::INT2, &mut buf).is_err());
    }

    #[test]
    fn null_binds_to_any_type() {
        let mut buf = BytesMut::new();
        assert!(matches!(
            Value::Null.to_sql(&Type::UUID, &mut buf),
            Ok(IsNull::Yes)
        ));
        assert!(buf.is_empty());
    }

    #[test]
    fn mismatched_bind_is_rejected() {
        let mut buf = BytesMut::new();
        assert!(Value::Bool(true).to_sql(&Type::INT4, &mut buf).is_err());
    }
}
