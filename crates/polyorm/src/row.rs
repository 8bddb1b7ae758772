//! Result rows returned by a `Querier`.

use crate::error::{OrmError, OrmResult};
use crate::value::{FromValue, Value};
use std::sync::Arc;

/// One result row: column names shared across the result set plus owned values.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    /// Build a row. The value count must match the column count.
    pub fn new(columns: Arc<[String]>, values: Vec<Value>) -> OrmResult<Self> {
        if columns.len() != values.len() {
            return Err(OrmError::ArgumentMismatch {
                expected: columns.len(),
                got: values.len(),
            });
        }
        Ok(Self { columns, values })
    }

    /// Build a row from positional values with generated column names (`col0`, `col1`, ...).
    pub fn from_values(values: Vec<Value>) -> Self {
        let columns: Arc<[String]> = (0..values.len()).map(|i| format!("col{i}")).collect();
        Self { columns, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    /// Raw value by position.
    pub fn get(&self, idx: usize) -> Option<&Value> {
        self.values.get(idx)
    }

    /// Typed value by position.
    pub fn try_get<T: FromValue>(&self, idx: usize) -> OrmResult<T> {
        let value = self
            .values
            .get(idx)
            .cloned()
            .ok_or_else(|| OrmError::decode(format!("#{idx}"), "column index out of range"))?;
        T::from_value(value).map_err(|e| match e {
            OrmError::Decode { message, .. } => {
                let column = self.columns.get(idx).cloned().unwrap_or_default();
                OrmError::Decode { column, message }
            }
            other => other,
        })
    }

    /// Typed value by column name (case-insensitive).
    pub fn try_get_by_name<T: FromValue>(&self, column: &str) -> OrmResult<T> {
        let idx = self
            .columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(column))
            .ok_or_else(|| OrmError::decode(column, "no such column"))?;
        self.try_get(idx)
    }
}
