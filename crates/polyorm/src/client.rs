//! Execution boundary.
//!
//! Dialect code never opens connections. It hands finished statements and
//! their bound values to a [`Querier`], which may be a connection, a
//! transaction, or a test double.

use crate::error::{OrmError, OrmResult};
use crate::row::Row;
use crate::value::Value;

/// Outcome of a statement executed with [`Querier::execute`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecResult {
    /// Number of rows the statement touched.
    pub rows_affected: u64,
    /// Generated key reported by the driver, when it reports one.
    pub last_insert_id: Option<i64>,
}

impl ExecResult {
    pub fn new(rows_affected: u64) -> Self {
        Self {
            rows_affected,
            last_insert_id: None,
        }
    }

    pub fn with_last_insert_id(mut self, id: i64) -> Self {
        self.last_insert_id = Some(id);
        self
    }
}

/// A trait for anything that can run dialect-ready SQL.
///
/// Statements arrive with native placeholders already in place (`:1`, `$1`,
/// `@p1` or `?`), and `params` holds exactly one value per placeholder.
#[async_trait::async_trait]
pub trait Querier: Send + Sync {
    /// Execute a query and return all rows.
    async fn query(&self, sql: &str, params: &[Value]) -> OrmResult<Vec<Row>>;

    /// Execute a query and return the first row, if any.
    ///
    /// The default implementation calls [`Querier::query`] and keeps the first row.
    async fn query_opt(&self, sql: &str, params: &[Value]) -> OrmResult<Option<Row>> {
        Ok(self.query(sql, params).await?.into_iter().next())
    }

    /// Execute a query and return the **first** row.
    ///
    /// Returns `OrmError::NotFound` if no rows are returned.
    async fn query_one(&self, sql: &str, params: &[Value]) -> OrmResult<Row> {
        self.query_opt(sql, params)
            .await?
            .ok_or_else(|| OrmError::not_found("Expected 1 row, got 0"))
    }

    /// Execute a statement and return the affected row count and generated key.
    async fn execute(&self, sql: &str, params: &[Value]) -> OrmResult<ExecResult>;
}

#[async_trait::async_trait]
impl<T: Querier + ?Sized> Querier for std::sync::Arc<T> {
    async fn query(&self, sql: &str, params: &[Value]) -> OrmResult<Vec<Row>> {
        (**self).query(sql, params).await
    }

    async fn query_opt(&self, sql: &str, params: &[Value]) -> OrmResult<Option<Row>> {
        (**self).query_opt(sql, params).await
    }

    async fn query_one(&self, sql: &str, params: &[Value]) -> OrmResult<Row> {
        (**self).query_one(sql, params).await
    }

    async fn execute(&self, sql: &str, params: &[Value]) -> OrmResult<ExecResult> {
        (**self).execute(sql, params).await
    }
}
