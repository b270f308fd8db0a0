//! Convenient imports for typical `tessera` usage.
//!
//! ```ignore
//! use tessera::prelude::*;
//! ```

// With the `derive` feature these names also bring the derive macros.
pub use crate::{
    Column, Columns, Conn, Dest, ExecConfig, Filter, Insertable, OrmError, OrmResult, Record,
    Table, Value, and, insert, or, select,
};

#[cfg(feature = "pool")]
pub use crate::{create_pool, create_pool_with_config};
