//! Oracle dialect.
//!
//! Unquoted identifiers, `:N` parameters, no returning clause. Inserts number
//! their marks inline and substitute sequence defaults (`SEQ.NEXTVAL`) as
//! literals; every other statement goes through [`Oracle::replace_marks`].

use super::base::{self, escape_literal};
use super::marks::rewrite_numbered;
use super::registry::DialectRegistration;
use super::{DbBaser, OperatorTable, TypeTable};
use crate::client::Querier;
use crate::error::OrmResult;
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
pub struct Oracle;

impl Oracle {
    pub fn new() -> Self {
        Self
    }
}

fn build() -> Arc<dyn DbBaser> {
    Arc::new(Oracle)
}

inventory::submit! {
    DialectRegistration { name: "oracle", aliases: &["oci8", "godror"], build }
}

#[async_trait::async_trait]
impl DbBaser for Oracle {
    fn name(&self) -> &'static str {
        "oracle"
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
        "SELECT TABLE_NAME FROM USER_TABLES".to_string()
    }

    fn show_columns_query(&self, table: &str) -> String {
        format!(
            "SELECT COLUMN_NAME, DATA_TYPE, NULLABLE FROM ALL_TAB_COLUMNS WHERE TABLE_NAME = '{}'",
            escape_literal(&table.to_uppercase())
        )
    }

    async fn index_exists(&self, q: &dyn Querier, table: &str, name: &str) -> bool {
        let sql = "SELECT COUNT(*) FROM USER_IND_COLUMNS, USER_INDEXES \
                   WHERE USER_IND_COLUMNS.INDEX_NAME = USER_INDEXES.INDEX_NAME \
                   AND USER_IND_COLUMNS.TABLE_NAME = ? AND USER_IND_COLUMNS.INDEX_NAME = ?";
        let args = [
            Value::Text(table.to_uppercase()),
            Value::Text(name.to_uppercase()),
        ];
        base::count_exists(self, q, sql.to_string(), &args).await
    }

    async fn insert_value(
        &self,
        q: &dyn Querier,
        mi: &ModelInfo,
        is_multi: bool,
        names: &[String],
        values: &[Value],
    ) -> OrmResult<i64> {
        let stmt = base::build_insert(self, mi, is_multi, names, values, true, |n| format!(":{n}"))?;
        base::exec_insert(self, q, mi, is_multi, stmt).await
    }
}
