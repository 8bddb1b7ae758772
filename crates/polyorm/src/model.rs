//! Model metadata consumed by the dialect layer.
//!
//! [`ModelInfo`] describes a table: its name, its ordered columns and the one
//! primary key. [`Model`] is the value-collection capability: dialect code
//! reads and writes column values through it without knowing the concrete
//! struct.

use crate::error::{OrmError, OrmResult};
use crate::value::Value;
use std::collections::HashSet;

/// Logical column type category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    Bool,
    /// Variable length string (`string`).
    VarChar,
    /// Fixed width string (`string-char`).
    Char,
    /// Unbounded text (`string-text`).
    Text,
    Uuid,
    Binary,
    Date,
    /// Wall-clock datetime without zone (`time.Time-datetime`).
    DateTime,
    /// Zoned timestamp (`time.Time`).
    Timestamp,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    Decimal,
    Json,
    Jsonb,
}

impl FieldType {
    /// Key into a dialect's type table.
    pub fn type_key(self) -> &'static str {
        match self {
            FieldType::Bool => "bool",
            FieldType::VarChar => "string",
            FieldType::Char => "string-char",
            FieldType::Text => "string-text",
            FieldType::Uuid => "string-uuid",
            FieldType::Binary => "binary",
            FieldType::Date => "time.Time-date",
            FieldType::DateTime => "time.Time-datetime",
            FieldType::Timestamp => "time.Time",
            FieldType::Int8 => "int8",
            FieldType::Int16 => "int16",
            FieldType::Int32 => "int32",
            FieldType::Int64 => "int64",
            FieldType::UInt8 => "uint8",
            FieldType::UInt16 => "uint16",
            FieldType::UInt32 => "uint32",
            FieldType::UInt64 => "uint64",
            FieldType::Float32 => "float32",
            FieldType::Float64 => "float64",
            FieldType::Decimal => "float64-decimal",
            FieldType::Json => "json",
            FieldType::Jsonb => "jsonb",
        }
    }

    /// Signed integer types.
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            FieldType::Int8 | FieldType::Int16 | FieldType::Int32 | FieldType::Int64
        )
    }

    /// Unsigned integer types.
    pub fn is_positive_integer(self) -> bool {
        matches!(
            self,
            FieldType::UInt8 | FieldType::UInt16 | FieldType::UInt32 | FieldType::UInt64
        )
    }

    pub fn is_float(self) -> bool {
        matches!(
            self,
            FieldType::Float32 | FieldType::Float64 | FieldType::Decimal
        )
    }

    pub fn is_time(self) -> bool {
        matches!(
            self,
            FieldType::Date | FieldType::DateTime | FieldType::Timestamp
        )
    }
}

/// What happens to child rows when the parent row is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnDelete {
    #[default]
    Cascade,
    SetNull,
    DoNothing,
}

/// A foreign key in another table that points at this model's primary key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReverseRelation {
    pub table: String,
    pub column: String,
    pub on_delete: OnDelete,
}

impl ReverseRelation {
    pub fn new(table: impl Into<String>, column: impl Into<String>, on_delete: OnDelete) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
            on_delete,
        }
    }
}

/// Column metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInfo {
    /// Struct field name.
    pub name: String,
    /// Database column name.
    pub column: String,
    pub field_type: FieldType,
    pub pk: bool,
    /// Value generated by the database (identity/serial).
    pub auto: bool,
    /// Value drawn from a database sequence.
    pub sequence: bool,
    /// Insert uses `initial` as a literal instead of a bound value.
    pub col_default: bool,
    pub null: bool,
    /// Stamp with the current time on insert and update.
    pub auto_now: bool,
    /// Stamp with the current time on insert only.
    pub auto_now_add: bool,
    /// Default-value SQL expression, e.g. `SEQ_USERS.NEXTVAL`.
    pub initial: Option<String>,
    pub size: usize,
    pub digits: usize,
    pub decimals: usize,
}

impl FieldInfo {
    /// A plain column whose field name and column name are the same.
    pub fn new(column: impl Into<String>, field_type: FieldType) -> Self {
        let column = column.into();
        Self {
            name: column.clone(),
            column,
            field_type,
            pk: false,
            auto: false,
            sequence: false,
            col_default: false,
            null: false,
            auto_now: false,
            auto_now_add: false,
            initial: None,
            size: 255,
            digits: 0,
            decimals: 0,
        }
    }

    /// Auto-generated integer primary key.
    pub fn auto_pk(column: impl Into<String>, field_type: FieldType) -> Self {
        Self::new(column, field_type).pk().auto()
    }

    pub fn field_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn pk(mut self) -> Self {
        self.pk = true;
        self
    }

    pub fn auto(mut self) -> Self {
        self.auto = true;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.null = true;
        self
    }

    /// Fill this column from a sequence expression on insert.
    pub fn sequence_default(mut self, expr: impl Into<String>) -> Self {
        self.sequence = true;
        self.col_default = true;
        self.initial = Some(expr.into());
        self
    }

    pub fn auto_now(mut self) -> Self {
        self.auto_now = true;
        self
    }

    pub fn auto_now_add(mut self) -> Self {
        self.auto_now_add = true;
        self
    }

    pub fn size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    pub fn decimal(mut self, digits: usize, decimals: usize) -> Self {
        self.digits = digits;
        self.decimals = decimals;
        self
    }

    /// Whether insert substitutes the `initial` literal for this column.
    pub fn is_sequence_default(&self) -> bool {
        self.sequence && self.col_default
    }

    /// The zero value used to reset this key after a delete.
    pub fn zero_value(&self) -> Value {
        if self.field_type.is_positive_integer() {
            Value::U64(0)
        } else {
            Value::I64(0)
        }
    }
}

/// Table metadata for one model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelInfo {
    /// Full model name, used in error messages.
    pub name: String,
    pub table: String,
    fields: Vec<FieldInfo>,
    dbcols: Vec<String>,
    pk: usize,
    reverse: Vec<ReverseRelation>,
}

impl ModelInfo {
    pub fn builder(name: impl Into<String>, table: impl Into<String>) -> ModelInfoBuilder {
        ModelInfoBuilder {
            name: name.into(),
            table: table.into(),
            fields: Vec::new(),
            reverse: Vec::new(),
        }
    }

    pub fn fields(&self) -> &[FieldInfo] {
        &self.fields
    }

    /// Column names in declaration order.
    pub fn dbcols(&self) -> &[String] {
        &self.dbcols
    }

    pub fn pk(&self) -> &FieldInfo {
        &self.fields[self.pk]
    }

    /// Look up a field by column name or struct field name.
    pub fn get_by_any(&self, name: &str) -> Option<&FieldInfo> {
        self.fields
            .iter()
            .find(|f| f.column == name)
            .or_else(|| self.fields.iter().find(|f| f.name == name))
    }

    /// Like [`ModelInfo::get_by_any`], failing with `UnknownField`.
    pub fn field(&self, name: &str) -> OrmResult<&FieldInfo> {
        self.get_by_any(name).ok_or_else(|| OrmError::UnknownField {
            model: self.name.clone(),
            name: name.to_string(),
        })
    }

    pub fn reverse_relations(&self) -> &[ReverseRelation] {
        &self.reverse
    }
}

/// Builder for [`ModelInfo`].
#[derive(Debug, Clone)]
#[must_use]
pub struct ModelInfoBuilder {
    name: String,
    table: String,
    fields: Vec<FieldInfo>,
    reverse: Vec<ReverseRelation>,
}

impl ModelInfoBuilder {
    pub fn field(mut self, field: FieldInfo) -> Self {
        self.fields.push(field);
        self
    }

    pub fn reverse(mut self, relation: ReverseRelation) -> Self {
        self.reverse.push(relation);
        self
    }

    /// Validate and build: exactly one primary key, unique column names.
    pub fn build(self) -> OrmResult<ModelInfo> {
        if self.table.is_empty() {
            return Err(OrmError::validation(format!(
                "model '{}' has an empty table name",
                self.name
            )));
        }

        let mut seen = HashSet::new();
        for f in &self.fields {
            if !seen.insert(f.column.as_str()) {
                return Err(OrmError::validation(format!(
                    "model '{}' declares column '{}' twice",
                    self.name, f.column
                )));
            }
        }

        let pks: Vec<usize> = self
            .fields
            .iter()
            .enumerate()
            .filter(|(_, f)| f.pk)
            .map(|(i, _)| i)
            .collect();
        let pk = match pks.as_slice() {
            [pk] => *pk,
            [] => return Err(OrmError::missing_pk(self.name)),
            _ => {
                return Err(OrmError::validation(format!(
                    "model '{}' declares {} primary keys",
                    self.name,
                    pks.len()
                )));
            }
        };

        let dbcols = self.fields.iter().map(|f| f.column.clone()).collect();
        Ok(ModelInfo {
            name: self.name,
            table: self.table,
            fields: self.fields,
            dbcols,
            pk,
            reverse: self.reverse,
        })
    }
}

/// Column-level access to a model instance.
///
/// Implementations map column names to struct fields. Unknown columns should
/// return `None` / `OrmError::UnknownField`.
pub trait Model: Send + Sync {
    /// Current value of a column.
    fn column_value(&self, column: &str) -> Option<Value>;

    /// Overwrite a column with a value read from (or generated by) the database.
    fn set_column_value(&mut self, column: &str, value: Value) -> OrmResult<()>;
}

/// A model type with static metadata.
pub trait ModelMeta: Model {
    fn model_info() -> &'static ModelInfo;
}
