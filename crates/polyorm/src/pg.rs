//! [`Querier`] for `tokio-postgres` clients and transactions.
//!
//! openGauss speaks the Postgres wire protocol, so the openGauss dialect can
//! run directly on a `tokio_postgres::Client`.

use crate::client::{ExecResult, Querier};
use crate::error::{OrmError, OrmResult};
use crate::row::Row;
use crate::value::Value;
use bytes::BytesMut;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use std::error::Error;
use std::sync::Arc;
use tokio_postgres::types::{IsNull, ToSql, Type};

/// Binds a [`Value`] to whatever parameter type the server inferred.
#[derive(Debug)]
struct PgParam<'a>(&'a Value);

fn encode_int(v: i64, ty: &Type, out: &mut BytesMut) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
    match *ty {
        Type::INT2 => i16::try_from(v)?.to_sql(ty, out),
        Type::INT4 => i32::try_from(v)?.to_sql(ty, out),
        Type::OID => u32::try_from(v)?.to_sql(ty, out),
        Type::FLOAT8 => (v as f64).to_sql(ty, out),
        Type::TEXT | Type::VARCHAR | Type::BPCHAR => v.to_string().to_sql(ty, out),
        _ => v.to_sql(ty, out),
    }
}

impl ToSql for PgParam<'_> {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self.0 {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(v) => v.to_sql(ty, out),
            Value::I64(v) => encode_int(*v, ty, out),
            Value::U64(v) => encode_int(i64::try_from(*v)?, ty, out),
            Value::F64(v) if *ty == Type::FLOAT4 => (*v as f32).to_sql(ty, out),
            Value::F64(v) => v.to_sql(ty, out),
            Value::Text(v) => v.as_str().to_sql(ty, out),
            Value::Bytes(v) => v.as_slice().to_sql(ty, out),
            Value::Date(v) => v.to_sql(ty, out),
            Value::DateTime(v) if *ty == Type::TIMESTAMP => v.naive_local().to_sql(ty, out),
            Value::DateTime(v) => v.to_sql(ty, out),
            Value::Json(v) => v.to_sql(ty, out),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    tokio_postgres::types::to_sql_checked!();
}

fn decode_column(row: &tokio_postgres::Row, idx: usize, ty: &Type) -> OrmResult<Value> {
    fn get<'a, T>(row: &'a tokio_postgres::Row, idx: usize) -> OrmResult<Option<T>>
    where
        T: tokio_postgres::types::FromSql<'a>,
    {
        Ok(row.try_get::<_, Option<T>>(idx)?)
    }

    let value = match *ty {
        Type::BOOL => get::<bool>(row, idx)?.map(Value::Bool),
        Type::INT2 => get::<i16>(row, idx)?.map(|v| Value::I64(v.into())),
        Type::INT4 => get::<i32>(row, idx)?.map(|v| Value::I64(v.into())),
        Type::INT8 => get::<i64>(row, idx)?.map(Value::I64),
        Type::OID => get::<u32>(row, idx)?.map(|v| Value::I64(v.into())),
        Type::FLOAT4 => get::<f32>(row, idx)?.map(|v| Value::F64(v.into())),
        Type::FLOAT8 => get::<f64>(row, idx)?.map(Value::F64),
        Type::BYTEA => get::<Vec<u8>>(row, idx)?.map(Value::Bytes),
        Type::DATE => get::<NaiveDate>(row, idx)?.map(Value::Date),
        Type::TIMESTAMPTZ => get::<DateTime<FixedOffset>>(row, idx)?.map(Value::DateTime),
        Type::TIMESTAMP => get::<NaiveDateTime>(row, idx)?
            .map(|v| Value::DateTime(v.and_utc().fixed_offset())),
        Type::JSON | Type::JSONB => get::<serde_json::Value>(row, idx)?.map(Value::Json),
        _ => match row.try_get::<_, Option<String>>(idx) {
            Ok(v) => v.map(Value::Text),
            Err(_) => {
                let column = row.columns()[idx].name();
                return Err(OrmError::decode(
                    column,
                    format!("unsupported column type {ty}"),
                ));
            }
        },
    };
    Ok(value.unwrap_or(Value::Null))
}

fn decode_rows(rows: Vec<tokio_postgres::Row>) -> OrmResult<Vec<Row>> {
    let Some(first) = rows.first() else {
        return Ok(Vec::new());
    };
    let columns: Arc<[String]> = first
        .columns()
        .iter()
        .map(|c| c.name().to_string())
        .collect();

    rows.iter()
        .map(|row| {
            let values = row
                .columns()
                .iter()
                .enumerate()
                .map(|(idx, col)| decode_column(row, idx, col.type_()))
                .collect::<OrmResult<Vec<_>>>()?;
            Row::new(columns.clone(), values)
        })
        .collect()
}

macro_rules! impl_querier {
    ($ty:ty) => {
        #[async_trait::async_trait]
        impl Querier for $ty {
            async fn query(&self, sql: &str, params: &[Value]) -> OrmResult<Vec<Row>> {
                let params: Vec<PgParam<'_>> = params.iter().map(PgParam).collect();
                let refs: Vec<&(dyn ToSql + Sync)> =
                    params.iter().map(|p| p as &(dyn ToSql + Sync)).collect();
                let rows = <$ty>::query(self, sql, &refs).await?;
                decode_rows(rows)
            }

            async fn execute(&self, sql: &str, params: &[Value]) -> OrmResult<ExecResult> {
                let params: Vec<PgParam<'_>> = params.iter().map(PgParam).collect();
                let refs: Vec<&(dyn ToSql + Sync)> =
                    params.iter().map(|p| p as &(dyn ToSql + Sync)).collect();
                let n = <$ty>::execute(self, sql, &refs).await?;
                Ok(ExecResult::new(n))
            }
        }
    };
}

impl_querier!(tokio_postgres::Client);
impl_querier!(tokio_postgres::Transaction<'_>);
