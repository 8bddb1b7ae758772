use crate::error::{OrmError, OrmResult};
use chrono::FixedOffset;
use serde::Deserialize;

/// Settings for an [`Orm`](crate::Orm).
///
/// Deserializable from any serde format; missing keys take their defaults.
///
/// ```toml
/// dialect = "opengauss"
/// utc_offset_seconds = 28800
/// default_bulk = 500
/// log_sql = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OrmConfig {
    /// Registered dialect name or alias.
    pub dialect: String,
    /// Offset from UTC applied to time values when collecting and scanning.
    pub utc_offset_seconds: i32,
    /// Rows per statement for bulk inserts.
    pub default_bulk: usize,
    /// Wrap the querier in a [`TracingQuerier`](crate::monitor::TracingQuerier).
    pub log_sql: bool,
    /// SQL longer than this is truncated in log events.
    pub max_sql_length: usize,
}

impl Default for OrmConfig {
    fn default() -> Self {
        Self {
            dialect: String::new(),
            utc_offset_seconds: 0,
            default_bulk: 100,
            log_sql: false,
            max_sql_length: 200,
        }
    }
}

impl OrmConfig {
    pub fn new(dialect: impl Into<String>) -> Self {
        Self {
            dialect: dialect.into(),
            ..Self::default()
        }
    }

    pub fn with_utc_offset(mut self, seconds: i32) -> Self {
        self.utc_offset_seconds = seconds;
        self
    }

    pub fn with_default_bulk(mut self, bulk: usize) -> Self {
        self.default_bulk = bulk;
        self
    }

    /// Log every executed statement through `tracing`.
    pub fn log_sql(mut self) -> Self {
        self.log_sql = true;
        self
    }

    pub fn with_max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = len;
        self
    }

    /// The configured offset, or `Validation` when it is out of range (±24h).
    pub fn time_zone(&self) -> OrmResult<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset_seconds).ok_or_else(|| {
            OrmError::validation(format!(
                "utc offset {} seconds is out of range",
                self.utc_offset_seconds
            ))
        })
    }
}
