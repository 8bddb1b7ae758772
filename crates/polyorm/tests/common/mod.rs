#![allow(dead_code)]

use chrono::{DateTime, FixedOffset, NaiveDate};
use polyorm::{
    ExecResult, FieldInfo, FieldType, FromValue, Model, ModelInfo, ModelMeta, OnDelete, OrmError,
    OrmResult, Querier, ReverseRelation, Row, Value,
};
use std::collections::VecDeque;
use std::sync::{LazyLock, Mutex};

/// A statement the mock received.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub sql: String,
    pub params: Vec<Value>,
}

pub enum Response {
    Rows(Vec<Row>),
    Exec(ExecResult),
    Error(OrmError),
}

/// Records every statement and answers from a script, in order.
///
/// With the script exhausted, queries return no rows and executes report 0 rows.
#[derive(Default)]
pub struct MockQuerier {
    calls: Mutex<Vec<Call>>,
    script: Mutex<VecDeque<Response>>,
}

impl MockQuerier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, response: Response) -> &Self {
        self.script.lock().unwrap().push_back(response);
        self
    }

    pub fn rows(&self, rows: Vec<Vec<Value>>) -> &Self {
        self.push(Response::Rows(rows.into_iter().map(Row::from_values).collect()))
    }

    pub fn affected(&self, n: u64) -> &Self {
        self.push(Response::Exec(ExecResult::new(n)))
    }

    pub fn fail(&self, message: &str) -> &Self {
        self.push(Response::Error(OrmError::Driver(message.to_string())))
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn sqls(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.sql).collect()
    }

    fn record(&self, sql: &str, params: &[Value]) -> Option<Response> {
        self.calls.lock().unwrap().push(Call {
            sql: sql.to_string(),
            params: params.to_vec(),
        });
        self.script.lock().unwrap().pop_front()
    }
}

#[async_trait::async_trait]
impl Querier for MockQuerier {
    async fn query(&self, sql: &str, params: &[Value]) -> OrmResult<Vec<Row>> {
        match self.record(sql, params) {
            Some(Response::Rows(rows)) => Ok(rows),
            Some(Response::Exec(_)) | None => Ok(Vec::new()),
            Some(Response::Error(err)) => Err(err),
        }
    }

    async fn execute(&self, sql: &str, params: &[Value]) -> OrmResult<ExecResult> {
        match self.record(sql, params) {
            Some(Response::Exec(res)) => Ok(res),
            Some(Response::Rows(rows)) => Ok(ExecResult::new(rows.len() as u64)),
            None => Ok(ExecResult::new(0)),
            Some(Response::Error(err)) => Err(err),
        }
    }
}

pub fn utc() -> FixedOffset {
    FixedOffset::east_opt(0).unwrap()
}

fn unknown(model: &str, column: &str) -> OrmError {
    OrmError::UnknownField {
        model: model.to_string(),
        name: column.to_string(),
    }
}

// ── Models ──

/// `user` with an auto-increment key and two child tables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct User {
    pub id: i64,
    pub name: String,
}

static USER_INFO: LazyLock<ModelInfo> = LazyLock::new(|| {
    ModelInfo::builder("app.User", "user")
        .field(FieldInfo::auto_pk("id", FieldType::Int64))
        .field(FieldInfo::new("name", FieldType::VarChar).size(64))
        .reverse(ReverseRelation::new("post", "user_id", OnDelete::Cascade))
        .reverse(ReverseRelation::new("comment", "user_id", OnDelete::SetNull))
        .reverse(ReverseRelation::new("audit", "user_id", OnDelete::DoNothing))
        .build()
        .unwrap()
});

impl User {
    pub fn named(name: &str) -> Self {
        Self {
            id: 0,
            name: name.to_string(),
        }
    }
}

impl Model for User {
    fn column_value(&self, column: &str) -> Option<Value> {
        match column {
            "id" => Some(Value::I64(self.id)),
            "name" => Some(Value::Text(self.name.clone())),
            _ => None,
        }
    }

    fn set_column_value(&mut self, column: &str, value: Value) -> OrmResult<()> {
        match column {
            "id" => self.id = i64::from_value(value)?,
            "name" => self.name = String::from_value(value)?,
            _ => return Err(unknown("app.User", column)),
        }
        Ok(())
    }
}

impl ModelMeta for User {
    fn model_info() -> &'static ModelInfo {
        &USER_INFO
    }
}

/// `orders` keyed by an Oracle/DM sequence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Order {
    pub id: i64,
    pub amount: f64,
    pub note: String,
}

static ORDER_INFO: LazyLock<ModelInfo> = LazyLock::new(|| {
    ModelInfo::builder("shop.Order", "orders")
        .field(
            FieldInfo::new("id", FieldType::Int64)
                .pk()
                .sequence_default("SEQ_ORDERS.NEXTVAL"),
        )
        .field(FieldInfo::new("amount", FieldType::Decimal).decimal(10, 2))
        .field(FieldInfo::new("note", FieldType::VarChar))
        .build()
        .unwrap()
});

impl Order {
    pub fn new(amount: f64, note: &str) -> Self {
        Self {
            id: 0,
            amount,
            note: note.to_string(),
        }
    }
}

impl Model for Order {
    fn column_value(&self, column: &str) -> Option<Value> {
        match column {
            "id" => Some(Value::I64(self.id)),
            "amount" => Some(Value::F64(self.amount)),
            "note" => Some(Value::Text(self.note.clone())),
            _ => None,
        }
    }

    fn set_column_value(&mut self, column: &str, value: Value) -> OrmResult<()> {
        match column {
            "id" => self.id = i64::from_value(value)?,
            "amount" => self.amount = f64::from_value(value)?,
            "note" => self.note = String::from_value(value)?,
            _ => return Err(unknown("shop.Order", column)),
        }
        Ok(())
    }
}

impl ModelMeta for Order {
    fn model_info() -> &'static ModelInfo {
        &ORDER_INFO
    }
}

/// `article` with an unsigned key and timestamps maintained on write.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Article {
    pub id: u64,
    pub title: String,
    pub created: Option<DateTime<FixedOffset>>,
    pub updated: Option<DateTime<FixedOffset>>,
}

static ARTICLE_INFO: LazyLock<ModelInfo> = LazyLock::new(|| {
    ModelInfo::builder("blog.Article", "article")
        .field(FieldInfo::auto_pk("id", FieldType::UInt64))
        .field(FieldInfo::new("title", FieldType::VarChar))
        .field(FieldInfo::new("created", FieldType::Timestamp).auto_now_add())
        .field(FieldInfo::new("updated", FieldType::Timestamp).auto_now())
        .build()
        .unwrap()
});

impl Model for Article {
    fn column_value(&self, column: &str) -> Option<Value> {
        match column {
            "id" => Some(Value::U64(self.id)),
            "title" => Some(Value::Text(self.title.clone())),
            "created" => Some(self.created.into()),
            "updated" => Some(self.updated.into()),
            _ => None,
        }
    }

    fn set_column_value(&mut self, column: &str, value: Value) -> OrmResult<()> {
        match column {
            "id" => self.id = u64::from_value(value)?,
            "title" => self.title = String::from_value(value)?,
            "created" => self.created = Option::from_value(value)?,
            "updated" => self.updated = Option::from_value(value)?,
            _ => return Err(unknown("blog.Article", column)),
        }
        Ok(())
    }
}

impl ModelMeta for Article {
    fn model_info() -> &'static ModelInfo {
        &ARTICLE_INFO
    }
}

/// One column per value category; `fields()` lists them for building a
/// `ModelInfo` per dialect.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub id: u64,
    pub flag: bool,
    pub count: i32,
    pub ratio: f64,
    pub price: f64,
    pub label: String,
    pub day: NaiveDate,
    pub at: DateTime<FixedOffset>,
    pub doc: serde_json::Value,
}

impl Sample {
    pub fn fields() -> Vec<FieldInfo> {
        vec![
            FieldInfo::auto_pk("id", FieldType::UInt64),
            FieldInfo::new("flag", FieldType::Bool),
            FieldInfo::new("count", FieldType::Int32),
            FieldInfo::new("ratio", FieldType::Float64),
            FieldInfo::new("price", FieldType::Decimal).decimal(10, 2),
            FieldInfo::new("label", FieldType::VarChar).size(32),
            FieldInfo::new("day", FieldType::Date),
            FieldInfo::new("at", FieldType::Timestamp),
            FieldInfo::new("doc", FieldType::Json),
        ]
    }

    pub fn blank() -> Self {
        Self {
            id: 0,
            flag: false,
            count: 0,
            ratio: 0.0,
            price: 0.0,
            label: String::new(),
            day: NaiveDate::from_ymd_opt(1970, 1, 1).unwrap(),
            at: DateTime::parse_from_rfc3339("1970-01-01T00:00:00+00:00").unwrap(),
            doc: serde_json::Value::Null,
        }
    }
}

impl Model for Sample {
    fn column_value(&self, column: &str) -> Option<Value> {
        match column {
            "id" => Some(Value::U64(self.id)),
            "flag" => Some(Value::Bool(self.flag)),
            "count" => Some(Value::I64(i64::from(self.count))),
            "ratio" => Some(Value::F64(self.ratio)),
            "price" => Some(Value::F64(self.price)),
            "label" => Some(Value::Text(self.label.clone())),
            "day" => Some(Value::Date(self.day)),
            "at" => Some(Value::DateTime(self.at)),
            "doc" => Some(Value::Json(self.doc.clone())),
            _ => None,
        }
    }

    fn set_column_value(&mut self, column: &str, value: Value) -> OrmResult<()> {
        match column {
            "id" => self.id = u64::from_value(value)?,
            "flag" => self.flag = bool::from_value(value)?,
            "count" => self.count = i32::from_value(value)?,
            "ratio" => self.ratio = f64::from_value(value)?,
            "price" => self.price = f64::from_value(value)?,
            "label" => self.label = String::from_value(value)?,
            "day" => self.day = NaiveDate::from_value(value)?,
            "at" => self.at = DateTime::from_value(value)?,
            "doc" => self.doc = serde_json::Value::from_value(value)?,
            _ => return Err(unknown("lab.Sample", column)),
        }
        Ok(())
    }
}
