mod common;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use common::{MockQuerier, Response, Sample};
use polyorm::dialect::{self, DbBaser, render_column_type};
use polyorm::{ExecResult, Model, ModelInfo, Value};
use serde_json::json;

/// The sample model restricted to the categories `d` declares a column type for.
fn sample_info(d: &dyn DbBaser) -> ModelInfo {
    Sample::fields()
        .into_iter()
        .filter(|fi| fi.pk || render_column_type(d, fi).is_ok())
        .fold(ModelInfo::builder("lab.Sample", "sample"), |b, fi| b.field(fi))
        .build()
        .unwrap()
}

fn sample() -> Sample {
    Sample {
        id: 0,
        flag: true,
        count: -42,
        ratio: 0.125,
        price: 19.99,
        label: "widget".to_string(),
        day: NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(),
        at: DateTime::parse_from_rfc3339("2024-05-01T12:30:00+00:00").unwrap(),
        doc: json!({"tags": ["a", "b"], "n": 1}),
    }
}

/// What a driver hands back for a bound value: timestamps come back in UTC.
fn stored(value: &Value) -> Value {
    match value {
        Value::DateTime(dt) => Value::DateTime(dt.with_timezone(&Utc).fixed_offset()),
        other => other.clone(),
    }
}

#[tokio::test]
async fn insert_then_read_every_declared_category() {
    let tz = FixedOffset::east_opt(8 * 3600).unwrap();

    for name in dialect::dialect_names() {
        let d = dialect::dialect(name).unwrap();
        let mi = sample_info(d.as_ref());
        let mock = MockQuerier::new();

        if d.has_returning_id(&mi, None) {
            mock.rows(vec![vec![Value::I64(5)]]);
        } else {
            mock.push(Response::Exec(ExecResult::new(1).with_last_insert_id(5)));
        }

        let mut original = sample();
        let id = d.insert(&mock, &mi, &mut original, tz).await.unwrap();
        assert_eq!(id, 5, "{name}");
        assert_eq!(original.id, 5, "{name}");

        let bound = mock.calls()[0].params.clone();
        assert_eq!(bound.len(), mi.dbcols().len() - 1, "{name}");
        let mut row = vec![Value::U64(5)];
        row.extend(bound.iter().map(stored));
        mock.rows(vec![row]);

        let mut loaded = Sample::blank();
        loaded.id = 5;
        d.read(&mock, &mi, &mut loaded, tz, &[], false).await.unwrap();

        for col in mi.dbcols() {
            assert_eq!(
                loaded.column_value(col),
                original.column_value(col),
                "{name}: column {col}"
            );
        }
        if mi.field("at").is_ok() {
            assert_eq!(loaded.at.offset().local_minus_utc(), 8 * 3600, "{name}");
        }
    }
}

#[test]
fn every_dialect_declares_the_core_categories() {
    for name in dialect::dialect_names() {
        let d = dialect::dialect(name).unwrap();
        let mi = sample_info(d.as_ref());
        for col in ["flag", "count", "ratio", "label", "at"] {
            assert!(mi.field(col).is_ok(), "{name} is missing {col}");
        }
    }
}
