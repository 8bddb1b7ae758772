//! Database dialects.
//!
//! [`DbBaser`] is the single capability interface every dialect implements.
//! Shared behavior lives in the free functions of [`base`]; the trait's
//! default methods call them with `self`, so a dialect overrides exactly the
//! operations it needs and every shared algorithm still dispatches to those
//! overrides.
//!
//! | dialect | marks | quote | returning id |
//! |---------|-------|-------|--------------|
//! | Oracle | `:1` | none | no |
//! | DM | `:1` | none | no |
//! | openGauss | `$1` | `"` | integer keys |
//! | SQL Server | `@p1` | none | no |
//! | Taos | `?` | none | no |

pub mod base;
pub mod dm;
pub mod marks;
pub mod opengauss;
pub mod oracle;
pub mod registry;
pub mod sqlserver;
pub mod taos;
pub mod types;

#[cfg(test)]
mod tests;

pub use dm::Dm;
pub use opengauss::OpenGauss;
pub use oracle::Oracle;
pub use registry::{DialectRegistration, dialect, dialect_names};
pub use sqlserver::SqlServer;
pub use taos::Taos;
pub use types::{operator_condition, render_column_type, validate_operator};

use crate::client::Querier;
use crate::error::OrmResult;
use crate::model::{FieldInfo, Model, ModelInfo};
use crate::value::Value;
use chrono::FixedOffset;
use std::collections::HashMap;

/// Logical operator name → SQL fragment with one `?`.
pub type OperatorTable = HashMap<&'static str, &'static str>;

/// Logical type key → column definition template.
pub type TypeTable = HashMap<&'static str, &'static str>;

/// One column as reported by a catalog query, lower-cased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: String,
    pub nullable: String,
}

/// Dialect-specific SQL generation and execution.
///
/// Instances are stateless and shared behind `Arc`.
#[async_trait::async_trait]
pub trait DbBaser: Send + Sync {
    /// Registry name, e.g. `"oracle"`.
    fn name(&self) -> &'static str;

    /// SQL fragment for a logical operator, `None` when the dialect has no such operator.
    fn operator_sql(&self, operator: &str) -> Option<&'static str>;

    /// Wrap the left-hand column of a comparison (casts, `UPPER()`, `DATE()`).
    fn generate_operator_left_col(&self, field: &FieldInfo, operator: &str, left_col: &mut String) {
        let _ = (field, operator, left_col);
    }

    /// The full column type table.
    fn db_types(&self) -> &'static TypeTable;

    /// Identifier delimiter, placed on both sides of every table and column name.
    fn table_quote(&self) -> &'static str;

    /// Rewrite canonical `?` marks into native placeholders.
    ///
    /// Applied exactly once per generated statement, by [`base::prepare`].
    fn replace_marks(&self, query: &mut String) {
        let _ = query;
    }

    /// Whether an insert can return the generated key inline.
    ///
    /// When `query` is given and the answer is `true`, the returning clause is appended.
    fn has_returning_id(&self, mi: &ModelInfo, query: Option<&mut String>) -> bool {
        let _ = (mi, query);
        false
    }

    fn support_update_join(&self) -> bool {
        true
    }

    /// Largest LIMIT accepted; 0 means unlimited.
    fn max_limit(&self) -> u64 {
        u64::MAX
    }

    fn show_tables_query(&self) -> String;

    fn show_columns_query(&self, table: &str) -> String;

    /// Best-effort index presence check; any failure reads as `false`.
    async fn index_exists(&self, q: &dyn Querier, table: &str, name: &str) -> bool;

    async fn get_tables(&self, q: &dyn Querier) -> OrmResult<HashMap<String, bool>> {
        base::get_tables(self, q).await
    }

    async fn get_columns(
        &self,
        q: &dyn Querier,
        table: &str,
    ) -> OrmResult<HashMap<String, ColumnInfo>> {
        base::get_columns(self, q, table).await
    }

    /// Resynchronize sequences after rows were inserted with explicit auto values.
    async fn setval(&self, q: &dyn Querier, mi: &ModelInfo, auto_fields: &[String]) -> OrmResult<()> {
        let _ = (q, mi, auto_fields);
        Ok(())
    }

    async fn insert(
        &self,
        q: &dyn Querier,
        mi: &ModelInfo,
        model: &mut dyn Model,
        tz: FixedOffset,
    ) -> OrmResult<i64> {
        base::insert(self, q, mi, model, tz).await
    }

    /// Insert the given values (one or more rows of `names.len()` values each).
    async fn insert_value(
        &self,
        q: &dyn Querier,
        mi: &ModelInfo,
        is_multi: bool,
        names: &[String],
        values: &[Value],
    ) -> OrmResult<i64> {
        base::insert_value(self, q, mi, is_multi, names, values).await
    }

    async fn insert_multi(
        &self,
        q: &dyn Querier,
        mi: &ModelInfo,
        rows: &mut [&mut dyn Model],
        bulk: usize,
        tz: FixedOffset,
    ) -> OrmResult<i64> {
        base::insert_multi(self, q, mi, rows, bulk, tz).await
    }

    async fn read(
        &self,
        q: &dyn Querier,
        mi: &ModelInfo,
        model: &mut dyn Model,
        tz: FixedOffset,
        cols: &[&str],
        for_update: bool,
    ) -> OrmResult<()> {
        base::read(self, q, mi, model, tz, cols, for_update).await
    }

    async fn update(
        &self,
        q: &dyn Querier,
        mi: &ModelInfo,
        model: &mut dyn Model,
        tz: FixedOffset,
        cols: &[&str],
    ) -> OrmResult<i64> {
        base::update(self, q, mi, model, tz, cols).await
    }

    async fn delete(
        &self,
        q: &dyn Querier,
        mi: &ModelInfo,
        model: &mut dyn Model,
        tz: FixedOffset,
        cols: &[&str],
    ) -> OrmResult<i64> {
        base::delete(self, q, mi, model, tz, cols).await
    }

    /// Apply reverse-relation delete rules for a removed parent key.
    async fn delete_rels(&self, q: &dyn Querier, mi: &ModelInfo, pk: &Value) -> OrmResult<()> {
        base::delete_rels(self, q, mi, pk).await
    }
}
