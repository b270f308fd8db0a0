//! `tracing` events for executed statements.

use crate::compiled::Compiled;
use crate::config::ExecConfig;
use tracing::Level;

/// Dispatch a tracing event at a runtime-determined level.
macro_rules! emit_at_level {
    ($level:expr, $($field:tt)*) => {
        match $level {
            Level::ERROR => tracing::error!($($field)*),
            Level::WARN  => tracing::warn!($($field)*),
            Level::INFO  => tracing::info!($($field)*),
            Level::DEBUG => tracing::debug!($($field)*),
            Level::TRACE => tracing::trace!($($field)*),
        }
    };
}

pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

fn display_sql(config: &ExecConfig, sql: &str) -> String {
    match config.max_sql_length {
        Some(max) if sql.len() > max => format!("{}...", truncate_sql_bytes(sql, max)),
        _ => sql.to_string(),
    }
}

/// Emit the event for a statement about to be sent.
pub(crate) fn statement(config: &ExecConfig, op: &'static str, compiled: &Compiled) {
    let sql = display_sql(config, &compiled.sql);
    let param_count = compiled.binds.len();
    if config.log_binds {
        let binds = tracing::field::debug(&compiled.binds);
        emit_at_level!(config.log_level, target: "tessera.sql", op, param_count, sql = %sql, binds);
    } else {
        emit_at_level!(config.log_level, target: "tessera.sql", op, param_count, sql = %sql);
    }
}

/// Emit the row count appended by a multi-row read.
pub(crate) fn rows_appended(config: &ExecConfig, op: &'static str, rows: usize) {
    emit_at_level!(config.log_level, target: "tessera.sql", op, rows, "rows appended");
}
