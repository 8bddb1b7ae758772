//! DM (Dameng) dialect.
//!
//! Oracle-compatible vocabulary with `:N` parameters. Catalog lookups accept
//! `schema.table` names and list tables per owner.

use super::base::{self, escape_literal, trace_sql};
use super::marks::rewrite_numbered;
use super::registry::DialectRegistration;
use super::{DbBaser, OperatorTable, TypeTable};
use crate::client::Querier;
use crate::error::{OrmResult, Phase};
use crate::model::ModelInfo;
use crate::value::Value;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

static OPERATORS: LazyLock<OperatorTable> = LazyLock::new(|| {
    HashMap::from([
        ("exact", "= ?"),
        ("gt", "> ?"),
        ("gte", ">= ?"),
        ("lt", "< ?"),
        ("lte", "<= ?"),
    ])
});

static TYPES: LazyLock<TypeTable> = LazyLock::new(|| {
    HashMap::from([
        ("auto", "NOT NULL PRIMARY KEY"),
        ("pk", "NOT NULL PRIMARY KEY"),
        ("bool", "bool"),
        ("string", "VARCHAR2(%d)"),
        ("string-char", "CHAR(%d)"),
        ("string-text", "VARCHAR2(%d)"),
        ("time.Time-date", "DATE"),
        ("time.Time", "TIMESTAMP"),
        ("int8", "INTEGER"),
        ("int16", "INTEGER"),
        ("int32", "INTEGER"),
        ("int64", "INTEGER"),
        ("uint8", "INTEGER"),
        ("uint16", "INTEGER"),
        ("uint32", "INTEGER"),
        ("uint64", "INTEGER"),
        ("float64", "NUMBER"),
        ("float64-decimal", "NUMBER(%d, %d)"),
    ])
});

#[derive(Debug, Clone, Copy, Default)]
pub struct Dm;

impl Dm {
    pub fn new() -> Self {
        Self
    }
}

/// `schema.table` → `table`.
fn bare_table(table: &str) -> &str {
    match table.split_once('.') {
        Some((_, name)) => name,
        None => table,
    }
}

fn build() -> Arc<dyn DbBaser> {
    Arc::new(Dm)
}

inventory::submit! {
    DialectRegistration { name: "dm", aliases: &["dameng"], build }
}

#[async_trait::async_trait]
impl DbBaser for Dm {
    fn name(&self) -> &'static str {
        "dm"
    }

    fn operator_sql(&self, operator: &str) -> Option<&'static str> {
        OPERATORS.get(operator).copied()
    }

    fn db_types(&self) -> &'static TypeTable {
        &TYPES
    }

    fn table_quote(&self) -> &'static str {
        ""
    }

    fn replace_marks(&self, query: &mut String) {
        rewrite_numbered(query, ":");
    }

    fn show_tables_query(&self) -> String {
        "select TABLE_NAME, OWNER from SYS.ALL_TABLES order by OWNER, TABLE_NAME".to_string()
    }

    fn show_columns_query(&self, table: &str) -> String {
        format!(
            "SELECT COLUMN_NAME,DATA_TYPE,NULLABLE FROM ALL_TAB_COLUMNS WHERE TABLE_NAME ='{}'",
            escape_literal(&bare_table(table).to_uppercase())
        )
    }

    async fn index_exists(&self, q: &dyn Querier, table: &str, name: &str) -> bool {
        let sql = "SELECT COUNT(*) FROM USER_IND_COLUMNS, USER_INDEXES \
                   WHERE USER_IND_COLUMNS.INDEX_NAME = USER_INDEXES.INDEX_NAME \
                   AND USER_IND_COLUMNS.TABLE_NAME = ? AND USER_IND_COLUMNS.INDEX_NAME = ?";
        let args = [
            Value::Text(bare_table(table).to_uppercase()),
            Value::Text(name.to_uppercase()),
        ];
        base::count_exists(self, q, sql.to_string(), &args).await
    }

    /// Tables keyed `owner.table`.
    async fn get_tables(&self, q: &dyn Querier) -> OrmResult<HashMap<String, bool>> {
        let sql = self.show_tables_query();
        trace_sql(self, Phase::Introspection, &sql, 0);
        let rows = q
            .query(&sql, &[])
            .await
            .map_err(|e| e.in_phase(Phase::Introspection))?;

        let mut tables = HashMap::with_capacity(rows.len());
        for row in rows {
            let table: String = row.try_get(0)?;
            let schema: String = row.try_get(1)?;
            if !table.is_empty() {
                tables.insert(
                    format!("{}.{}", schema.to_lowercase(), table.to_lowercase()),
                    true,
                );
            }
        }
        Ok(tables)
    }

    async fn insert_value(
        &self,
        q: &dyn Querier,
        mi: &ModelInfo,
        is_multi: bool,
        names: &[String],
        values: &[Value],
    ) -> OrmResult<i64> {
        let mut stmt = base::build_insert(self, mi, is_multi, names, values, true, |_| "?".to_string())?;
        base::prepare(self, &mut stmt.sql);
        base::exec_insert(self, q, mi, is_multi, stmt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_prefix_is_stripped() {
        assert_eq!(bare_table("sysdba.orders"), "orders");
        assert_eq!(bare_table("orders"), "orders");
        assert!(Dm.show_columns_query("SYSDBA.orders").ends_with("TABLE_NAME ='ORDERS'"));
    }
}
