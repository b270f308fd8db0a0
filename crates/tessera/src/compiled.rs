use crate::value::Value;
use serde::{Deserialize, Serialize};

/// SQL text with `?` placeholders and the bind values for them, in order.
///
/// This is the contract with the execution backend: the same builder state
/// always compiles to the same `Compiled`, so it can be cached, compared or
/// stored as an expectation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Compiled {
    pub sql: String,
    pub binds: Vec<Value>,
}

impl Compiled {
    pub fn new(sql: impl Into<String>, binds: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            binds,
        }
    }

    /// Number of `?` placeholders in the SQL text.
    pub fn placeholder_count(&self) -> usize {
        self.sql.matches('?').count()
    }
}
