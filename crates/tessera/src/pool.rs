//! Connection pool helpers.
//!
//! Pooled clients implement [`Conn`](crate::Conn) directly:
//!
//! ```ignore
//! let pool = tessera::create_pool(&std::env::var("DATABASE_URL")?)?;
//! let client = pool.get().await?;
//! tessera::select(&[&users]).all(&client, [Dest::sequence(&mut rows)]).await?;
//! ```

use crate::error::{OrmError, OrmResult};
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use tokio_postgres::NoTls;

/// Create a pool of 16 connections from a database URL, without TLS.
pub fn create_pool(database_url: &str) -> OrmResult<Pool> {
    create_pool_with_config(database_url, 16)
}

/// Create a pool with a custom maximum size.
pub fn create_pool_with_config(database_url: &str, max_size: usize) -> OrmResult<Pool> {
    if max_size == 0 {
        return Err(OrmError::validation("pool max_size must be at least 1"));
    }

    let pg_config: tokio_postgres::Config = database_url
        .parse()
        .map_err(|e: tokio_postgres::Error| OrmError::Connection(e.to_string()))?;

    let manager = Manager::from_config(
        pg_config,
        NoTls,
        ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        },
    );
    Pool::builder(manager)
        .max_size(max_size)
        .build()
        .map_err(|e| OrmError::Pool(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_url_is_a_connection_error() {
        let err = create_pool("not a url ::").unwrap_err();
        assert!(matches!(err, OrmError::Connection(_)));
    }

    #[test]
    fn zero_sized_pool_is_rejected() {
        let err = create_pool_with_config("postgres://localhost/db", 0).unwrap_err();
        assert!(matches!(err, OrmError::Validation(_)));
    }
}
