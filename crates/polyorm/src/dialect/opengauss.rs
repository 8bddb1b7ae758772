//! openGauss dialect (Postgres family).
//!
//! Double-quoted identifiers, `$N` parameters, `RETURNING` for integer keys,
//! serial sequences resynchronized with `setval` after explicit key inserts.

use super::base::{self, escape_literal, quote, trace_sql};
use super::marks::rewrite_numbered;
use super::registry::DialectRegistration;
use super::{DbBaser, OperatorTable, TypeTable};
use crate::client::Querier;
use crate::error::{OrmResult, Phase};
use crate::model::{FieldInfo, ModelInfo};
use crate::value::Value;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

static OPERATORS: LazyLock<OperatorTable> = LazyLock::new(|| {
    HashMap::from([
        ("exact", "= ?"),
        ("iexact", "= UPPER(?)"),
        ("contains", "LIKE ?"),
        ("icontains", "LIKE UPPER(?)"),
        ("gt", "> ?"),
        ("gte", ">= ?"),
        ("lt", "< ?"),
        ("lte", "<= ?"),
        ("eq", "= ?"),
        ("ne", "!= ?"),
        ("startswith", "LIKE ?"),
        ("endswith", "LIKE ?"),
        ("istartswith", "LIKE UPPER(?)"),
        ("iendswith", "LIKE UPPER(?)"),
    ])
});

static TYPES: LazyLock<TypeTable> = LazyLock::new(|| {
    HashMap::from([
        ("auto", "BIGSERIAL NOT NULL PRIMARY KEY"),
        ("pk", "NOT NULL PRIMARY KEY"),
        ("bool", "bool"),
        ("string", "varchar(%d)"),
        ("string-char", "char(%d)"),
        ("string-text", "text"),
        ("string-uuid", "uuid"),
        ("time.Time-datetime", "datetime"),
        ("time.Time-date", "date"),
        ("time.Time", "timestamp with time zone"),
        ("int8", r#"smallint CHECK("%COL%" >= -127 AND "%COL%" <= 128)"#),
        ("int16", "smallint"),
        ("int32", "integer"),
        ("int64", "bigint"),
        ("uint8", r#"smallint CHECK("%COL%" >= 0 AND "%COL%" <= 255)"#),
        ("uint16", r#"integer CHECK("%COL%" >= 0)"#),
        ("uint32", r#"bigint CHECK("%COL%" >= 0)"#),
        ("uint64", r#"bigint CHECK("%COL%" >= 0)"#),
        ("float64", "double precision"),
        ("float64-decimal", "numeric(%d, %d)"),
        ("json", "json"),
        ("jsonb", "jsonb"),
    ])
});

#[derive(Debug, Clone, Copy, Default)]
pub struct OpenGauss;

impl OpenGauss {
    pub fn new() -> Self {
        Self
    }
}

fn build() -> Arc<dyn DbBaser> {
    Arc::new(OpenGauss)
}

inventory::submit! {
    DialectRegistration { name: "opengauss", aliases: &["gauss", "og"], build }
}

#[async_trait::async_trait]
impl DbBaser for OpenGauss {
    fn name(&self) -> &'static str {
        "opengauss"
    }

    fn operator_sql(&self, operator: &str) -> Option<&'static str> {
        OPERATORS.get(operator).copied()
    }

    fn generate_operator_left_col(&self, _field: &FieldInfo, operator: &str, left_col: &mut String) {
        match operator {
            "contains" | "startswith" | "endswith" => {
                *left_col = format!("{left_col}::text");
            }
            "iexact" | "icontains" | "istartswith" | "iendswith" => {
                *left_col = format!("UPPER({left_col}::text)");
            }
            _ => {}
        }
    }

    fn db_types(&self) -> &'static TypeTable {
        &TYPES
    }

    fn table_quote(&self) -> &'static str {
        "\""
    }

    fn replace_marks(&self, query: &mut String) {
        rewrite_numbered(query, "$");
    }

    fn has_returning_id(&self, mi: &ModelInfo, query: Option<&mut String>) -> bool {
        let pk = mi.pk();
        if !pk.field_type.is_integer() && !pk.field_type.is_positive_integer() {
            return false;
        }
        if let Some(query) = query {
            query.push_str(&format!(r#" RETURNING "{}""#, pk.column));
        }
        true
    }

    fn support_update_join(&self) -> bool {
        false
    }

    fn max_limit(&self) -> u64 {
        0
    }

    fn show_tables_query(&self) -> String {
        "SELECT table_name FROM information_schema.tables WHERE table_type = 'BASE TABLE' \
         AND table_schema NOT IN ('pg_catalog', 'information_schema')"
            .to_string()
    }

    fn show_columns_query(&self, table: &str) -> String {
        format!(
            "SELECT column_name, data_type, is_nullable FROM information_schema.columns \
             WHERE table_schema NOT IN ('pg_catalog', 'information_schema') AND table_name = '{}'",
            escape_literal(table)
        )
    }

    async fn index_exists(&self, q: &dyn Querier, table: &str, name: &str) -> bool {
        let sql = "SELECT COUNT(*) FROM pg_indexes WHERE tablename = ? AND indexname = ?";
        let args = [Value::Text(table.to_string()), Value::Text(name.to_string())];
        base::count_exists(self, q, sql.to_string(), &args).await
    }

    async fn setval(&self, q: &dyn Querier, mi: &ModelInfo, auto_fields: &[String]) -> OrmResult<()> {
        for name in auto_fields {
            let sql = format!(
                "SELECT setval(pg_get_serial_sequence('{}', '{}'), (SELECT MAX({}) FROM {}))",
                escape_literal(&mi.table),
                escape_literal(name),
                quote(self, name),
                quote(self, &mi.table)
            );
            trace_sql(self, Phase::Sequence, &sql, 0);
            q.query(&sql, &[])
                .await
                .map_err(|e| e.in_phase(Phase::Sequence))?;
        }
        Ok(())
    }
}
