//! # tessera
//!
//! Typed SQL statements over declared tables, with results mapped back into
//! (possibly nested) Rust structs.
//!
//! ## Features
//!
//! - **Typed columns**: `Column<T>` only compares against values of kind `T`
//! - **Composable filters**: value and column comparisons, nested `and` / `or`
//! - **Deterministic SQL**: the same statement always compiles to the same text
//!   and bind list (`?` placeholders, binds in order)
//! - **Nested mapping**: records flatten into their scalar fields, depth-first,
//!   so one row can fill a struct that embeds other structs
//! - **Transaction-friendly**: run statements against any [`Conn`], including
//!   tokio-postgres clients, transactions and pooled clients
//!
//! ## Example
//!
//! ```ignore
//! use tessera::prelude::*;
//!
//! tessera::table! {
//!     pub struct Users("users") {
//!         id: i64,
//!         name: String,
//!     }
//! }
//!
//! #[derive(Debug, Default, Record)]
//! struct User {
//!     id: i64,
//!     name: String,
//! }
//!
//! let users = Users::new();
//! let stmt = select(&[&users]).where_([users.id.eq(5)]);
//! assert_eq!(stmt.compile().sql, "SELECT id, name FROM users WHERE id = ?");
//!
//! let mut user = User::default();
//! stmt.first(&client, [Dest::record(&mut user)]).await?;
//! ```

// Lets the derive macros' `tessera::` paths resolve inside this crate too.
extern crate self as tessera;

pub mod client;
pub mod compiled;
pub mod config;
pub mod error;
pub mod filter;
pub mod insert;
pub mod prelude;
pub mod scan;
pub mod schema;
pub mod select;
pub mod value;

mod trace;

pub use client::{Conn, ExecResult, Prepared, RowCursor, RowsCursor, assign_row};
pub use compiled::Compiled;
pub use config::ExecConfig;
pub use error::{OrmError, OrmResult};
pub use filter::{BoolOp, CompareOp, Filter, and, or};
pub use insert::{InsertStmt, Insertable, insert};
pub use scan::{Dest, Record, Scan, Sequence, flat_len, flatten};
pub use schema::{Column, ColumnGroup, ColumnRef, Columns, Direction, OrderBy, Table};
pub use select::{SelectStmt, select};
pub use value::{FromValue, Literal, ToValue, Value};

#[cfg(feature = "derive")]
pub use tessera_derive::{Insertable, Record};

#[cfg(feature = "postgres")]
pub mod postgres;

#[cfg(feature = "postgres")]
pub use postgres::{PgRow, PgRows, PgStatement, to_pg_placeholders};

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(feature = "pool")]
pub use pool::{create_pool, create_pool_with_config};

#[cfg(feature = "pool")]
pub use deadpool_postgres;

#[cfg(feature = "postgres")]
pub use tokio_postgres;
