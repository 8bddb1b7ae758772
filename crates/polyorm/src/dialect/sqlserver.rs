//! SQL Server dialect: unquoted identifiers and `@pN` parameters.

use super::base::{self, escape_literal};
use super::marks::rewrite_numbered;
use super::registry::DialectRegistration;
use super::{DbBaser, OperatorTable, TypeTable};
use crate::client::Querier;
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
        ("auto", "IDENTITY(1,1) NOT NULL PRIMARY KEY"),
        ("pk", "NOT NULL PRIMARY KEY"),
        ("bool", "bool"),
        ("string", "varchar(%d)"),
        ("string-char", "char(%d)"),
        ("string-text", "text"),
        ("time.Time-date", "date"),
        ("time.Time", "datetime"),
        ("int8", "tinyint"),
        ("int16", "smallint"),
        ("int32", "int"),
        ("int64", "bigint"),
        ("uint8", "tinyint"),
        ("uint16", "smallint"),
        ("uint32", "int"),
        ("uint64", "bigint"),
        ("float64", "float(53)"),
        ("float64-decimal", "number(%d, %d)"),
    ])
});

#[derive(Debug, Clone, Copy, Default)]
pub struct SqlServer;

impl SqlServer {
    pub fn new() -> Self {
        Self
    }
}

fn build() -> Arc<dyn DbBaser> {
    Arc::new(SqlServer)
}

inventory::submit! {
    DialectRegistration { name: "sqlserver", aliases: &["mssql"], build }
}

#[async_trait::async_trait]
impl DbBaser for SqlServer {
    fn name(&self) -> &'static str {
        "sqlserver"
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
        rewrite_numbered(query, "@p");
    }

    fn show_tables_query(&self) -> String {
        "SELECT NAME FROM SYSOBJECTS WHERE XTYPE='U'".to_string()
    }

    fn show_columns_query(&self, table: &str) -> String {
        format!(
            "SELECT COLUMN_NAME, DATA_TYPE, IS_NULLABLE FROM INFORMATION_SCHEMA.COLUMNS \
             WHERE TABLE_NAME = '{}'",
            escape_literal(&table.to_uppercase())
        )
    }

    async fn index_exists(&self, q: &dyn Querier, table: &str, name: &str) -> bool {
        let sql = "SELECT COUNT(*) FROM sys.indexes WHERE object_id = OBJECT_ID(?) AND name = ?";
        let args = [
            Value::Text(table.to_uppercase()),
            Value::Text(name.to_uppercase()),
        ];
        base::count_exists(self, q, sql.to_string(), &args).await
    }
}
