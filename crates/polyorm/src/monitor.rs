//! Statement logging around a [`Querier`].
//!
//! ```rust,ignore
//! use polyorm::monitor::TracingQuerier;
//! use std::time::Duration;
//! use tracing::Level;
//!
//! let querier = TracingQuerier::new(client)
//!     .level(Level::INFO)
//!     .max_sql_length(500)
//!     .slow_query_threshold(Duration::from_secs(1));
//! ```

use crate::client::{ExecResult, Querier};
use crate::error::OrmResult;
use crate::row::Row;
use crate::value::Value;
use std::time::{Duration, Instant};
use tracing::Level;

fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

/// The kind of statement, from its leading keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryType {
    Select,
    Insert,
    Update,
    Delete,
    /// Catalog and DDL statements (`SHOW`, `DESCRIBE`, `CREATE`, ...).
    Other,
}

impl QueryType {
    pub fn from_sql(sql: &str) -> Self {
        let keyword = sql
            .trim_start_matches(|c: char| c.is_whitespace() || c == '(')
            .split(|c: char| !c.is_ascii_alphabetic())
            .next()
            .unwrap_or("");
        if keyword.eq_ignore_ascii_case("SELECT") {
            QueryType::Select
        } else if keyword.eq_ignore_ascii_case("INSERT") {
            QueryType::Insert
        } else if keyword.eq_ignore_ascii_case("UPDATE") {
            QueryType::Update
        } else if keyword.eq_ignore_ascii_case("DELETE") {
            QueryType::Delete
        } else {
            QueryType::Other
        }
    }
}

/// A [`Querier`] that emits one `tracing` event per executed statement.
///
/// Events carry the statement kind, parameter count, elapsed time and row
/// count (or the error). Statements slower than the slow-query threshold are
/// additionally reported at `WARN`.
#[derive(Debug, Clone)]
pub struct TracingQuerier<Q> {
    inner: Q,
    /// Event level for every statement.
    pub level: Level,
    /// Truncate long SQL strings (in bytes, on a char boundary). `None` disables truncation.
    pub max_sql_length: Option<usize>,
    pub slow_query_threshold: Option<Duration>,
}

impl<Q: Querier> TracingQuerier<Q> {
    pub fn new(inner: Q) -> Self {
        Self {
            inner,
            level: Level::DEBUG,
            max_sql_length: Some(200),
            slow_query_threshold: None,
        }
    }

    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }

    pub fn slow_query_threshold(mut self, threshold: Duration) -> Self {
        self.slow_query_threshold = Some(threshold);
        self
    }

    pub fn inner(&self) -> &Q {
        &self.inner
    }

    pub fn into_inner(self) -> Q {
        self.inner
    }

    pub(crate) fn truncate_sql(&self, sql: &str) -> String {
        match self.max_sql_length {
            Some(max) if sql.len() > max => format!("{}...", truncate_sql_bytes(sql, max)),
            _ => sql.to_string(),
        }
    }

    fn emit<T>(
        &self,
        sql: &str,
        params: usize,
        elapsed: Duration,
        result: &OrmResult<T>,
        rows: impl Fn(&T) -> u64,
    ) {
        macro_rules! emit_at_level {
            ($level:expr, $($field:tt)*) => {
                match $level {
                    Level::ERROR => tracing::error!($($field)*),
                    Level::WARN => tracing::warn!($($field)*),
                    Level::INFO => tracing::info!($($field)*),
                    Level::DEBUG => tracing::debug!($($field)*),
                    Level::TRACE => tracing::trace!($($field)*),
                }
            };
        }

        let query_type = QueryType::from_sql(sql);
        let sql = self.truncate_sql(sql);
        let elapsed_ms = elapsed.as_secs_f64() * 1000.0;
        match result {
            Ok(value) => emit_at_level!(
                self.level,
                target: "polyorm.sql",
                query_type = ?query_type,
                params,
                elapsed_ms,
                rows = rows(value),
                sql = %sql,
                "statement completed"
            ),
            Err(err) => emit_at_level!(
                self.level,
                target: "polyorm.sql",
                query_type = ?query_type,
                params,
                elapsed_ms,
                error = %err,
                sql = %sql,
                "statement failed"
            ),
        }

        if let Some(threshold) = self.slow_query_threshold {
            if elapsed >= threshold {
                tracing::warn!(
                    target: "polyorm.sql",
                    query_type = ?query_type,
                    elapsed_ms,
                    sql = %sql,
                    "slow query"
                );
            }
        }
    }
}

#[async_trait::async_trait]
impl<Q: Querier> Querier for TracingQuerier<Q> {
    async fn query(&self, sql: &str, params: &[Value]) -> OrmResult<Vec<Row>> {
        let start = Instant::now();
        let result = self.inner.query(sql, params).await;
        self.emit(sql, params.len(), start.elapsed(), &result, |rows| rows.len() as u64);
        result
    }

    async fn query_opt(&self, sql: &str, params: &[Value]) -> OrmResult<Option<Row>> {
        let start = Instant::now();
        let result = self.inner.query_opt(sql, params).await;
        self.emit(sql, params.len(), start.elapsed(), &result, |row| u64::from(row.is_some()));
        result
    }

    async fn query_one(&self, sql: &str, params: &[Value]) -> OrmResult<Row> {
        let start = Instant::now();
        let result = self.inner.query_one(sql, params).await;
        self.emit(sql, params.len(), start.elapsed(), &result, |_| 1);
        result
    }

    async fn execute(&self, sql: &str, params: &[Value]) -> OrmResult<ExecResult> {
        let start = Instant::now();
        let result = self.inner.execute(sql, params).await;
        self.emit(sql, params.len(), start.elapsed(), &result, |res| res.rows_affected);
        result
    }
}
