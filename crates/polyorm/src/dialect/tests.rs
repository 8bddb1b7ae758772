use super::*;
use crate::error::OrmError;
use crate::model::FieldType;

fn rewritten(d: &dyn DbBaser, sql: &str) -> String {
    let mut s = sql.to_string();
    base::prepare(d, &mut s);
    s
}

#[test]
fn native_marks_per_dialect() {
    let sql = "SELECT a FROM t WHERE b = ? AND c = ?";
    assert_eq!(rewritten(&Oracle, sql), "SELECT a FROM t WHERE b = :1 AND c = :2");
    assert_eq!(rewritten(&Dm, sql), "SELECT a FROM t WHERE b = :1 AND c = :2");
    assert_eq!(rewritten(&OpenGauss, sql), "SELECT a FROM t WHERE b = $1 AND c = $2");
    assert_eq!(rewritten(&SqlServer, sql), "SELECT a FROM t WHERE b = @p1 AND c = @p2");
    assert_eq!(rewritten(&Taos, sql), sql);
}

#[test]
fn statements_without_marks_are_untouched() {
    let sql = "SELECT COUNT(*) FROM t";
    for name in dialect_names() {
        let d = dialect(name).unwrap();
        assert_eq!(rewritten(d.as_ref(), sql), sql, "{name}");
    }
}

#[test]
fn identifiers_are_quoted_once() {
    assert_eq!(base::quote(&OpenGauss, "user"), r#""user""#);
    assert_eq!(base::quote(&Oracle, "USERS"), "USERS");
    assert_eq!(
        base::quote_list(&OpenGauss, &["id".to_string(), "name".to_string()]),
        r#""id", "name""#
    );
    assert_eq!(base::quote_list(&SqlServer, &["id".to_string()]), "id");
}

#[test]
fn registry_resolves_names_and_aliases() {
    assert_eq!(dialect_names(), ["dm", "opengauss", "oracle", "sqlserver", "taos"]);
    assert_eq!(dialect("MSSQL").unwrap().name(), "sqlserver");
    assert_eq!(dialect("dameng").unwrap().name(), "dm");
    assert_eq!(dialect("tdengine").unwrap().name(), "taos");
    assert_eq!(dialect("godror").unwrap().name(), "oracle");
    assert_eq!(dialect("gauss").unwrap().name(), "opengauss");

    let err = dialect("mysql").err().unwrap();
    assert!(matches!(err, OrmError::UnknownDialect(ref n) if n == "mysql"));
}

#[test]
fn operator_vocabulary_differs_by_dialect() {
    assert_eq!(OpenGauss.operator_sql("icontains"), Some("LIKE UPPER(?)"));
    assert_eq!(Taos.operator_sql("contains"), Some(r"LIKE ? ESCAPE '\'"));
    assert_eq!(Oracle.operator_sql("exact"), Some("= ?"));
    assert_eq!(Oracle.operator_sql("contains"), None);
    assert_eq!(SqlServer.operator_sql("iendswith"), None);

    let err = validate_operator(&Dm, "icontains").unwrap_err();
    assert!(matches!(
        err,
        OrmError::UnknownOperator { dialect: "dm", ref operator } if operator == "icontains"
    ));
}

#[test]
fn left_column_is_wrapped_not_the_template() {
    let name = FieldInfo::new("name", FieldType::VarChar);
    assert_eq!(
        operator_condition(&OpenGauss, &name, "icontains").unwrap(),
        r#"UPPER("name"::text) LIKE UPPER(?)"#
    );
    assert_eq!(
        operator_condition(&OpenGauss, &name, "contains").unwrap(),
        r#""name"::text LIKE ?"#
    );
    assert_eq!(
        operator_condition(&OpenGauss, &name, "gt").unwrap(),
        r#""name" > ?"#
    );

    let day = FieldInfo::new("day", FieldType::Date);
    assert_eq!(operator_condition(&Taos, &day, "exact").unwrap(), "DATE(day) = ?");
    assert_eq!(operator_condition(&Taos, &name, "exact").unwrap(), "name = ?");
}

#[test]
fn column_types_fill_width_and_column_name() {
    let level = FieldInfo::new("level", FieldType::Int8);
    assert_eq!(
        render_column_type(&OpenGauss, &level).unwrap(),
        r#"smallint CHECK("level" >= -127 AND "level" <= 128)"#
    );

    let price = FieldInfo::new("price", FieldType::Decimal).decimal(10, 2);
    assert_eq!(render_column_type(&Oracle, &price).unwrap(), "NUMBER(10, 2)");
    assert_eq!(render_column_type(&SqlServer, &price).unwrap(), "number(10, 2)");

    let title = FieldInfo::new("title", FieldType::VarChar).size(64);
    assert_eq!(render_column_type(&Dm, &title).unwrap(), "VARCHAR2(64)");
    assert_eq!(render_column_type(&Taos, &title).unwrap(), "binary(64)");
}

#[test]
fn primary_keys_use_auto_or_pk_entry() {
    let id = FieldInfo::auto_pk("id", FieldType::Int64);
    assert_eq!(
        render_column_type(&OpenGauss, &id).unwrap(),
        "BIGSERIAL NOT NULL PRIMARY KEY"
    );
    assert_eq!(
        render_column_type(&SqlServer, &id).unwrap(),
        "IDENTITY(1,1) NOT NULL PRIMARY KEY"
    );

    let code = FieldInfo::new("code", FieldType::Int32).pk();
    assert_eq!(
        render_column_type(&Oracle, &code).unwrap(),
        "INTEGER NOT NULL PRIMARY KEY"
    );
}

#[test]
fn missing_type_entry_is_reported() {
    let price = FieldInfo::new("price", FieldType::Decimal);
    let err = render_column_type(&Taos, &price).unwrap_err();
    assert!(matches!(
        err,
        OrmError::UnsupportedType { dialect: "taos", ref key } if key == "float64-decimal"
    ));
}

#[test]
fn returning_clause_only_for_integer_keys() {
    let users = ModelInfo::builder("app.User", "user")
        .field(FieldInfo::auto_pk("id", FieldType::Int64))
        .field(FieldInfo::new("name", FieldType::VarChar))
        .build()
        .unwrap();
    let mut sql = String::from(r#"INSERT INTO "user" ("name") VALUES ($1)"#);
    assert!(OpenGauss.has_returning_id(&users, Some(&mut sql)));
    assert_eq!(sql, r#"INSERT INTO "user" ("name") VALUES ($1) RETURNING "id""#);

    let tokens = ModelInfo::builder("app.Token", "token")
        .field(FieldInfo::new("key", FieldType::VarChar).pk())
        .build()
        .unwrap();
    let mut sql = String::from("INSERT");
    assert!(!OpenGauss.has_returning_id(&tokens, Some(&mut sql)));
    assert_eq!(sql, "INSERT");

    let others: [&dyn DbBaser; 4] = [&Oracle, &Dm, &SqlServer, &Taos];
    for d in others {
        assert!(!d.has_returning_id(&users, None), "{}", d.name());
    }
}

#[test]
fn capability_flags() {
    assert!(!OpenGauss.support_update_join());
    assert_eq!(OpenGauss.max_limit(), 0);
    assert!(!Taos.support_update_join());
    assert_eq!(Taos.max_limit(), 9_223_372_036_854_775_807);
    assert!(Oracle.support_update_join());
    assert_eq!(Oracle.max_limit(), u64::MAX);
}

#[test]
fn catalog_queries_normalize_table_case() {
    assert!(Oracle.show_columns_query("orders").ends_with("TABLE_NAME = 'ORDERS'"));
    assert!(SqlServer.show_columns_query("orders").ends_with("TABLE_NAME = 'ORDERS'"));
    assert!(OpenGauss.show_columns_query("o'rders").ends_with("table_name = 'o''rders'"));
    assert_eq!(Taos.show_columns_query("meters"), "DESCRIBE meters");
}
