use tracing::Level;

/// Execution options attached to a statement.
///
/// Defaults: destination arity is checked before querying, SQL is logged at
/// `DEBUG` truncated to 200 bytes, binds are not logged.
#[derive(Debug, Clone)]
pub struct ExecConfig {
    /// Compare the flattened destination count with the selected column count
    /// before sending the query.
    pub check_arity: bool,
    /// Tracing event level for executed statements.
    pub log_level: Level,
    /// Truncate logged SQL (in bytes). `None` means no truncation.
    pub max_sql_length: Option<usize>,
    /// Include bind values in the log event.
    pub log_binds: bool,
}

impl Default for ExecConfig {
    fn default() -> Self {
        Self {
            check_arity: true,
            log_level: Level::DEBUG,
            max_sql_length: Some(200),
            log_binds: false,
        }
    }
}

impl ExecConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Leave arity mismatches to the backend's scan, which reports them when
    /// the first row arrives.
    pub fn unchecked_arity(mut self) -> Self {
        self.check_arity = false;
        self
    }

    /// Override the tracing event level.
    pub fn log_level(mut self, level: Level) -> Self {
        self.log_level = level;
        self
    }

    /// Set maximum SQL length to log.
    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    /// Disable SQL truncation.
    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }

    /// Log bind values alongside the SQL.
    pub fn log_binds(mut self, enabled: bool) -> Self {
        self.log_binds = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = ExecConfig::new();
        assert!(cfg.check_arity);
        assert_eq!(cfg.log_level, Level::DEBUG);
        assert_eq!(cfg.max_sql_length, Some(200));
        assert!(!cfg.log_binds);
    }

    #[test]
    fn builder_overrides() {
        let cfg = ExecConfig::new()
            .unchecked_arity()
            .log_level(Level::INFO)
            .no_truncate()
            .log_binds(true);
        assert!(!cfg.check_arity);
        assert_eq!(cfg.log_level, Level::INFO);
        assert_eq!(cfg.max_sql_length, None);
        assert!(cfg.log_binds);
    }
}
