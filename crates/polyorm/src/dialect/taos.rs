//! TDengine (Taos) dialect.
//!
//! Placeholders stay `?`. Pattern operators escape with a backslash, date
//! columns compare through `DATE()`, and joined updates are unsupported.

use super::base::{self, trace_sql};
use super::registry::DialectRegistration;
use super::{ColumnInfo, DbBaser, OperatorTable, TypeTable};
use crate::client::Querier;
use crate::error::{OrmError, OrmResult, Phase};
use crate::model::{FieldInfo, FieldType};
use crate::value::Value;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

/// `DESCRIBE` takes the name unquoted: letters, digits, `_`, and one optional `db.` prefix.
fn is_plain_identifier(name: &str) -> bool {
    let mut parts = name.split('.');
    let valid = |p: &str| !p.is_empty() && p.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(a), None, _) => valid(a),
        (Some(a), Some(b), None) => valid(a) && valid(b),
        _ => false,
    }
}

static OPERATORS: LazyLock<OperatorTable> = LazyLock::new(|| {
    HashMap::from([
        ("exact", "= ?"),
        ("iexact", r"LIKE ? ESCAPE '\'"),
        ("contains", r"LIKE ? ESCAPE '\'"),
        ("icontains", r"LIKE ? ESCAPE '\'"),
        ("gt", "> ?"),
        ("gte", ">= ?"),
        ("lt", "< ?"),
        ("lte", "<= ?"),
        ("eq", "= ?"),
        ("ne", "!= ?"),
        ("startswith", r"LIKE ? ESCAPE '\'"),
        ("endswith", r"LIKE ? ESCAPE '\'"),
        ("istartswith", r"LIKE ? ESCAPE '\'"),
        ("iendswith", r"LIKE ? ESCAPE '\'"),
    ])
});

static TYPES: LazyLock<TypeTable> = LazyLock::new(|| {
    HashMap::from([
        ("auto", "integer NOT NULL PRIMARY KEY AUTOINCREMENT"),
        ("pk", "NOT NULL PRIMARY KEY"),
        ("bool", "bool"),
        ("string", "binary(%d)"),
        ("binary", "nchar(%d)"),
        ("time.Time", "timestamp"),
        ("int8", "tinyint"),
        ("int16", "smallint"),
        ("int32", "int"),
        ("int64", "bigint"),
        ("float32", "float"),
        ("float64", "double"),
    ])
});

#[derive(Debug, Clone, Copy, Default)]
pub struct Taos;

impl Taos {
    pub fn new() -> Self {
        Self
    }
}

fn build() -> Arc<dyn DbBaser> {
    Arc::new(Taos)
}

inventory::submit! {
    DialectRegistration { name: "taos", aliases: &["tdengine"], build }
}

#[async_trait::async_trait]
impl DbBaser for Taos {
    fn name(&self) -> &'static str {
        "taos"
    }

    fn operator_sql(&self, operator: &str) -> Option<&'static str> {
        OPERATORS.get(operator).copied()
    }

    fn generate_operator_left_col(&self, field: &FieldInfo, _operator: &str, left_col: &mut String) {
        if field.field_type == FieldType::Date {
            *left_col = format!("DATE({left_col})");
        }
    }

    fn db_types(&self) -> &'static TypeTable {
        &TYPES
    }

    fn table_quote(&self) -> &'static str {
        ""
    }

    fn support_update_join(&self) -> bool {
        false
    }

    fn max_limit(&self) -> u64 {
        i64::MAX as u64
    }

    fn show_tables_query(&self) -> String {
        "SHOW TABLES".to_string()
    }

    fn show_columns_query(&self, table: &str) -> String {
        format!("DESCRIBE {table}")
    }

    async fn index_exists(&self, q: &dyn Querier, table: &str, name: &str) -> bool {
        let sql = "SELECT COUNT(*) FROM information_schema.ins_indexes \
                   WHERE table_name = ? AND index_name = ?";
        let args = [
            Value::Text(table.to_lowercase()),
            Value::Text(name.to_lowercase()),
        ];
        base::count_exists(self, q, sql.to_string(), &args).await
    }

    /// `DESCRIBE` reports field, type, length and note; every column reads as `not null`.
    async fn get_columns(
        &self,
        q: &dyn Querier,
        table: &str,
    ) -> OrmResult<HashMap<String, ColumnInfo>> {
        if !is_plain_identifier(table) {
            return Err(OrmError::validation(format!("invalid table name '{table}'")));
        }
        let sql = self.show_columns_query(table);
        trace_sql(self, Phase::Introspection, &sql, 0);
        let rows = q
            .query(&sql, &[])
            .await
            .map_err(|e| e.in_phase(Phase::Introspection))?;

        let mut columns = HashMap::with_capacity(rows.len());
        for row in rows {
            let name: String = row.try_get(0)?;
            let data_type: String = row.try_get(1)?;
            let info = ColumnInfo {
                name: name.to_lowercase(),
                data_type: data_type.to_lowercase(),
                nullable: "not null".to_string(),
            };
            columns.insert(info.name.clone(), info);
        }
        Ok(columns)
    }
}
