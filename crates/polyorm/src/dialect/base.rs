//! Shared statement generation and execution.
//!
//! Every function takes the dialect as `&D` and calls back into it for
//! quoting, marks, returning-id support and sequence handling, so one copy of
//! each algorithm serves all dialects.

use super::{ColumnInfo, DbBaser};
use crate::client::Querier;
use crate::error::{OrmError, OrmResult, Phase};
use crate::model::{FieldType, Model, ModelInfo, OnDelete};
use crate::row::Row;
use crate::value::Value;
use chrono::{FixedOffset, Utc};
use std::collections::HashMap;

/// Flags for [`collect_values`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectOptions {
    /// Leave out database-generated columns.
    pub skip_auto: bool,
    /// Collecting for an INSERT: zero auto keys are dropped, `auto_now*` stamped.
    pub insert: bool,
    /// Collecting for an UPDATE: `auto_now` stamped.
    pub update: bool,
}

impl CollectOptions {
    pub fn insert() -> Self {
        Self {
            insert: true,
            ..Self::default()
        }
    }

    pub fn update() -> Self {
        Self {
            skip_auto: true,
            update: true,
            ..Self::default()
        }
    }
}

/// Values gathered from a model, in column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collected {
    pub values: Vec<Value>,
    pub names: Vec<String>,
    /// Auto columns that carried an explicit (non-zero) value.
    pub auto_fields: Vec<String>,
}

/// Collect the values of `cols` from `model`.
pub fn collect_values(
    mi: &ModelInfo,
    model: &mut dyn Model,
    cols: &[&str],
    opts: CollectOptions,
    tz: FixedOffset,
) -> OrmResult<Collected> {
    let mut out = Collected {
        values: Vec::with_capacity(cols.len()),
        names: Vec::with_capacity(cols.len()),
        auto_fields: Vec::new(),
    };

    for col in cols {
        let fi = mi.field(col)?;
        if opts.skip_auto && fi.auto {
            continue;
        }

        let mut value = model.column_value(&fi.column).unwrap_or(Value::Null);

        if opts.insert && fi.auto {
            if value.is_zero() {
                continue;
            }
            out.auto_fields.push(fi.column.clone());
        }

        let stamp = (opts.insert && (fi.auto_now || fi.auto_now_add)) || (opts.update && fi.auto_now);
        if stamp {
            let now = Utc::now().with_timezone(&tz);
            value = match fi.field_type {
                FieldType::Date => Value::Date(now.date_naive()),
                _ => Value::DateTime(now),
            };
            model.set_column_value(&fi.column, value.clone())?;
        } else {
            value = value.in_time_zone(tz);
        }

        out.values.push(value);
        out.names.push(fi.column.clone());
    }

    Ok(out)
}

/// The primary key column and its value, when the value is set (non-null, non-zero).
pub fn get_exist_pk(mi: &ModelInfo, model: &dyn Model) -> Option<(String, Value)> {
    let pk = mi.pk();
    let value = model.column_value(&pk.column)?;
    if value.is_zero() {
        return None;
    }
    Some((pk.column.clone(), value))
}

/// Write a result row back into the model, one value per `mi.dbcols()`.
pub fn set_cols_values(
    mi: &ModelInfo,
    model: &mut dyn Model,
    row: Row,
    tz: FixedOffset,
) -> OrmResult<()> {
    let cols = mi.dbcols();
    if row.len() != cols.len() {
        return Err(OrmError::ArgumentMismatch {
            expected: cols.len(),
            got: row.len(),
        });
    }
    for (col, value) in cols.iter().zip(row.into_values()) {
        model.set_column_value(col, value.in_time_zone(tz))?;
    }
    Ok(())
}

/// `Q` + `ident` + `Q`.
pub fn quote<D: DbBaser + ?Sized>(d: &D, ident: &str) -> String {
    let q = d.table_quote();
    format!("{q}{ident}{q}")
}

/// Quote each name and join with `", "`.
pub fn quote_list<D: DbBaser + ?Sized>(d: &D, names: &[String]) -> String {
    names
        .iter()
        .map(|n| quote(d, n))
        .collect::<Vec<_>>()
        .join(", ")
}

/// `"a" = ? AND "b" = ?`
fn where_marks<D: DbBaser + ?Sized>(d: &D, names: &[String]) -> String {
    names
        .iter()
        .map(|n| format!("{} = ?", quote(d, n)))
        .collect::<Vec<_>>()
        .join(" AND ")
}

/// Escape a value for interpolation into a catalog query string literal.
pub fn escape_literal(s: &str) -> String {
    s.replace('\'', "''")
}

/// Finish a statement: rewrite marks into the dialect's syntax.
///
/// This is the only caller of [`DbBaser::replace_marks`] for generated statements.
pub fn prepare<D: DbBaser + ?Sized>(d: &D, query: &mut String) {
    d.replace_marks(query);
}

pub(crate) fn trace_sql<D: DbBaser + ?Sized>(d: &D, phase: Phase, sql: &str, params: usize) {
    tracing::debug!(
        target: "polyorm.sql",
        dialect = d.name(),
        phase = phase.as_str(),
        params,
        sql,
        "executing statement"
    );
}

/// An INSERT statement with the values it binds.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement {
    pub sql: String,
    pub params: Vec<Value>,
}

/// Assemble `INSERT INTO QtQ (QaQ, QbQ) VALUES (m, m)[, (m, m)...]`.
///
/// `values` holds one or more rows of `names.len()` values. With
/// `substitute_sequences`, columns flagged as sequence defaults get their
/// `initial` literal in place of a mark and their value is not bound.
/// `mark` renders the placeholder for the n-th bound value (1-based).
pub fn build_insert<D, F>(
    d: &D,
    mi: &ModelInfo,
    is_multi: bool,
    names: &[String],
    values: &[Value],
    substitute_sequences: bool,
    mark: F,
) -> OrmResult<InsertStatement>
where
    D: DbBaser + ?Sized,
    F: Fn(usize) -> String,
{
    if names.is_empty() {
        return Err(OrmError::validation(format!(
            "no columns to insert for model '{}'",
            mi.name
        )));
    }
    if values.len() % names.len() != 0 || values.is_empty() {
        return Err(OrmError::ArgumentMismatch {
            expected: names.len(),
            got: values.len(),
        });
    }
    let rows = values.len() / names.len();
    if !is_multi && rows != 1 {
        return Err(OrmError::ArgumentMismatch {
            expected: names.len(),
            got: values.len(),
        });
    }

    let mut literals: Vec<Option<&str>> = Vec::with_capacity(names.len());
    for name in names {
        let literal = if substitute_sequences {
            let fi = mi.field(name)?;
            if fi.is_sequence_default() {
                let expr = fi.initial.as_deref().ok_or_else(|| {
                    OrmError::validation(format!(
                        "sequence column '{}' on model '{}' has no default expression",
                        fi.column, mi.name
                    ))
                })?;
                Some(expr)
            } else {
                None
            }
        } else {
            None
        };
        literals.push(literal);
    }

    let mut params = Vec::with_capacity(values.len());
    let mut groups = Vec::with_capacity(rows);
    for row in values.chunks(names.len()) {
        let mut marks = Vec::with_capacity(names.len());
        for (literal, value) in literals.iter().zip(row) {
            match literal {
                Some(expr) => marks.push((*expr).to_string()),
                None => {
                    params.push(value.clone());
                    marks.push(mark(params.len()));
                }
            }
        }
        groups.push(marks.join(", "));
    }

    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote(d, &mi.table),
        quote_list(d, names),
        groups.join("), (")
    );
    Ok(InsertStatement { sql, params })
}

/// Run an assembled insert: returning-id scan for single rows when the
/// dialect supports it, otherwise a plain execute.
///
/// Returns rows affected for multi-row inserts and the generated key (or 0)
/// for single rows.
pub async fn exec_insert<D: DbBaser + ?Sized>(
    d: &D,
    q: &dyn Querier,
    mi: &ModelInfo,
    is_multi: bool,
    stmt: InsertStatement,
) -> OrmResult<i64> {
    let InsertStatement { mut sql, params } = stmt;

    if is_multi || !d.has_returning_id(mi, Some(&mut sql)) {
        trace_sql(d, Phase::Insert, &sql, params.len());
        let res = q
            .execute(&sql, &params)
            .await
            .map_err(|e| e.in_phase(Phase::Insert))?;
        if is_multi {
            return Ok(i64::try_from(res.rows_affected).unwrap_or(i64::MAX));
        }
        return Ok(res.last_insert_id.unwrap_or(0));
    }

    trace_sql(d, Phase::Insert, &sql, params.len());
    let row = q
        .query_one(&sql, &params)
        .await
        .map_err(|e| e.in_phase(Phase::Insert))?;
    row.try_get::<i64>(0)
}

/// Default insert: `?` marks rewritten by the dialect.
pub async fn insert_value<D: DbBaser + ?Sized>(
    d: &D,
    q: &dyn Querier,
    mi: &ModelInfo,
    is_multi: bool,
    names: &[String],
    values: &[Value],
) -> OrmResult<i64> {
    let mut stmt = build_insert(d, mi, is_multi, names, values, false, |_| "?".to_string())?;
    prepare(d, &mut stmt.sql);
    exec_insert(d, q, mi, is_multi, stmt).await
}

fn dbcols(mi: &ModelInfo) -> Vec<&str> {
    mi.dbcols().iter().map(String::as_str).collect()
}

/// Insert one model. A generated key is written back into an auto primary key.
pub async fn insert<D: DbBaser + ?Sized>(
    d: &D,
    q: &dyn Querier,
    mi: &ModelInfo,
    model: &mut dyn Model,
    tz: FixedOffset,
) -> OrmResult<i64> {
    let c = collect_values(mi, model, &dbcols(mi), CollectOptions::insert(), tz)?;
    let id = d.insert_value(q, mi, false, &c.names, &c.values).await?;

    if !c.auto_fields.is_empty() {
        d.setval(q, mi, &c.auto_fields).await?;
    } else if id > 0 && mi.pk().auto {
        let pk = mi.pk();
        let value = if pk.field_type.is_positive_integer() {
            Value::U64(id.unsigned_abs())
        } else {
            Value::I64(id)
        };
        model.set_column_value(&pk.column, value)?;
    }
    Ok(id)
}

/// Insert many models, `bulk` rows per statement.
///
/// A final partial batch is flushed once. Rows must produce the same columns
/// as the first row. Batches that succeeded before a failing batch stay
/// written; the error is returned.
pub async fn insert_multi<D: DbBaser + ?Sized>(
    d: &D,
    q: &dyn Querier,
    mi: &ModelInfo,
    rows: &mut [&mut dyn Model],
    bulk: usize,
    tz: FixedOffset,
) -> OrmResult<i64> {
    if bulk == 0 {
        return Err(OrmError::validation("bulk size must be greater than 0"));
    }

    let cols = dbcols(mi);
    let length = rows.len();
    let mut cnt: i64 = 0;
    let mut names: Vec<String> = Vec::new();
    let mut auto_fields: Vec<String> = Vec::new();
    let mut values: Vec<Value> = Vec::new();

    for (i, row) in rows.iter_mut().enumerate() {
        let i = i + 1;
        let c = collect_values(mi, &mut **row, &cols, CollectOptions::insert(), tz)?;

        if i == 1 {
            names = c.names;
            auto_fields = c.auto_fields;
            values.reserve(bulk.min(length) * names.len());
        } else if c.values.len() != names.len() || c.names != names {
            return Err(OrmError::ArgumentMismatch {
                expected: names.len(),
                got: c.values.len(),
            });
        }
        values.extend(c.values);

        if i % bulk == 0 || i == length {
            cnt += d.insert_value(q, mi, true, &names, &values).await?;
            values.clear();
        }
    }

    if !auto_fields.is_empty() {
        d.setval(q, mi, &auto_fields).await?;
    }
    Ok(cnt)
}

/// WHERE columns and values: explicit `cols`, or the existing primary key.
fn where_values(
    mi: &ModelInfo,
    model: &mut dyn Model,
    cols: &[&str],
    tz: FixedOffset,
) -> OrmResult<(Vec<String>, Vec<Value>)> {
    if !cols.is_empty() {
        let c = collect_values(mi, model, cols, CollectOptions::default(), tz)?;
        return Ok((c.names, c.values));
    }
    let (column, value) = get_exist_pk(mi, model).ok_or_else(|| OrmError::missing_pk(&mi.name))?;
    Ok((vec![column], vec![value]))
}

/// Read one row into `model`.
pub async fn read<D: DbBaser + ?Sized>(
    d: &D,
    q: &dyn Querier,
    mi: &ModelInfo,
    model: &mut dyn Model,
    tz: FixedOffset,
    cols: &[&str],
    for_update: bool,
) -> OrmResult<()> {
    let (where_cols, args) = where_values(mi, model, cols, tz)?;

    let mut sql = format!(
        "SELECT {} FROM {} WHERE {}",
        quote_list(d, mi.dbcols()),
        quote(d, &mi.table),
        where_marks(d, &where_cols)
    );
    if for_update {
        sql.push_str(" FOR UPDATE");
    }
    prepare(d, &mut sql);

    trace_sql(d, Phase::Read, &sql, args.len());
    let row = q
        .query_opt(&sql, &args)
        .await
        .map_err(|e| e.in_phase(Phase::Read))?
        .ok_or_else(|| OrmError::not_found(format!("{} matching {:?}", mi.name, where_cols)))?;

    set_cols_values(mi, model, row, tz)
}

/// Update the row identified by the model's primary key.
///
/// Empty `cols` updates every non-auto column. `auto_now` columns are always
/// refreshed.
pub async fn update<D: DbBaser + ?Sized>(
    d: &D,
    q: &dyn Querier,
    mi: &ModelInfo,
    model: &mut dyn Model,
    tz: FixedOffset,
    cols: &[&str],
) -> OrmResult<i64> {
    let (pk_name, pk_value) = get_exist_pk(mi, model).ok_or_else(|| OrmError::missing_pk(&mi.name))?;

    let mut cols: Vec<&str> = if cols.is_empty() {
        dbcols(mi)
    } else {
        cols.to_vec()
    };
    for fi in mi.fields().iter().filter(|f| f.auto_now) {
        if !cols.iter().any(|c| mi.get_by_any(c).is_some_and(|f| f.column == fi.column)) {
            cols.push(&fi.column);
        }
    }

    let c = collect_values(mi, model, &cols, CollectOptions::update(), tz)?;
    if c.names.is_empty() {
        return Err(OrmError::validation(format!(
            "no columns to update for model '{}'",
            mi.name
        )));
    }

    let mut values = c.values;
    values.push(pk_value);

    let sets = c
        .names
        .iter()
        .map(|n| format!("{} = ?", quote(d, n)))
        .collect::<Vec<_>>()
        .join(", ");
    let mut sql = format!(
        "UPDATE {} SET {} WHERE {} = ?",
        quote(d, &mi.table),
        sets,
        quote(d, &pk_name)
    );
    prepare(d, &mut sql);

    trace_sql(d, Phase::Update, &sql, values.len());
    let res = q
        .execute(&sql, &values)
        .await
        .map_err(|e| e.in_phase(Phase::Update))?;
    Ok(i64::try_from(res.rows_affected).unwrap_or(i64::MAX))
}

/// Delete by explicit columns or by primary key.
///
/// When a row was removed, an auto primary key on the model is reset to zero
/// and reverse relations are processed.
pub async fn delete<D: DbBaser + ?Sized>(
    d: &D,
    q: &dyn Querier,
    mi: &ModelInfo,
    model: &mut dyn Model,
    tz: FixedOffset,
    cols: &[&str],
) -> OrmResult<i64> {
    let (where_cols, args) = where_values(mi, model, cols, tz)?;
    let parent_key = get_exist_pk(mi, model).map(|(_, v)| v);

    let mut sql = format!(
        "DELETE FROM {} WHERE {}",
        quote(d, &mi.table),
        where_marks(d, &where_cols)
    );
    prepare(d, &mut sql);

    trace_sql(d, Phase::Delete, &sql, args.len());
    let res = q
        .execute(&sql, &args)
        .await
        .map_err(|e| e.in_phase(Phase::Delete))?;
    let num = i64::try_from(res.rows_affected).unwrap_or(i64::MAX);

    if num > 0 {
        let pk = mi.pk();
        if pk.auto {
            model.set_column_value(&pk.column, pk.zero_value())?;
        }
        if let Some(key) = parent_key {
            d.delete_rels(q, mi, &key).await?;
        }
    }
    Ok(num)
}

/// Cascade or null out child rows that reference a deleted parent.
pub async fn delete_rels<D: DbBaser + ?Sized>(
    d: &D,
    q: &dyn Querier,
    mi: &ModelInfo,
    pk: &Value,
) -> OrmResult<()> {
    for rel in mi.reverse_relations() {
        let mut sql = match rel.on_delete {
            OnDelete::DoNothing => continue,
            OnDelete::Cascade => format!(
                "DELETE FROM {} WHERE {} = ?",
                quote(d, &rel.table),
                quote(d, &rel.column)
            ),
            OnDelete::SetNull => format!(
                "UPDATE {} SET {} = NULL WHERE {} = ?",
                quote(d, &rel.table),
                quote(d, &rel.column),
                quote(d, &rel.column)
            ),
        };
        prepare(d, &mut sql);

        trace_sql(d, Phase::Delete, &sql, 1);
        q.execute(&sql, std::slice::from_ref(pk))
            .await
            .map_err(|e| e.in_phase(Phase::Delete))?;
    }
    Ok(())
}

/// Run the dialect's table listing; keys are lower-case table names.
pub async fn get_tables<D: DbBaser + ?Sized>(
    d: &D,
    q: &dyn Querier,
) -> OrmResult<HashMap<String, bool>> {
    let sql = d.show_tables_query();
    trace_sql(d, Phase::Introspection, &sql, 0);
    let rows = q
        .query(&sql, &[])
        .await
        .map_err(|e| e.in_phase(Phase::Introspection))?;

    let mut tables = HashMap::with_capacity(rows.len());
    for row in rows {
        let name: String = row.try_get(0)?;
        if !name.is_empty() {
            tables.insert(name.to_lowercase(), true);
        }
    }
    Ok(tables)
}

/// Run the dialect's column listing (name, type, nullability), lower-cased.
pub async fn get_columns<D: DbBaser + ?Sized>(
    d: &D,
    q: &dyn Querier,
    table: &str,
) -> OrmResult<HashMap<String, ColumnInfo>> {
    let sql = d.show_columns_query(table);
    trace_sql(d, Phase::Introspection, &sql, 0);
    let rows = q
        .query(&sql, &[])
        .await
        .map_err(|e| e.in_phase(Phase::Introspection))?;

    let mut columns = HashMap::with_capacity(rows.len());
    for row in rows {
        let name: String = row.try_get(0)?;
        let data_type: Option<String> = row.try_get(1)?;
        let nullable: Option<String> = row.try_get(2)?;
        let info = ColumnInfo {
            name: name.to_lowercase(),
            data_type: data_type.unwrap_or_default().to_lowercase(),
            nullable: nullable.unwrap_or_default().to_lowercase(),
        };
        columns.insert(info.name.clone(), info);
    }
    Ok(columns)
}

/// Run a `SELECT COUNT(*) ...` with `?` marks; true when the count is positive.
///
/// Errors are logged and read as `false`.
pub async fn count_exists<D: DbBaser + ?Sized>(
    d: &D,
    q: &dyn Querier,
    mut sql: String,
    args: &[Value],
) -> bool {
    prepare(d, &mut sql);
    trace_sql(d, Phase::Introspection, &sql, args.len());

    let count = match q.query_opt(&sql, args).await {
        Ok(Some(row)) => row.try_get::<i64>(0),
        Ok(None) => Ok(0),
        Err(e) => Err(e),
    };
    match count {
        Ok(n) => n > 0,
        Err(err) => {
            tracing::debug!(
                target: "polyorm.sql",
                dialect = d.name(),
                error = %err,
                "existence check failed, treating as absent"
            );
            false
        }
    }
}
