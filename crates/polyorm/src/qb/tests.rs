use super::QueryBuilder;

#[test]
fn test_select_with_paging() {
    let mut qb = QueryBuilder::new();
    qb.select(&["name", "age"])
        .from(&["users"])
        .where_("age > ?")
        .and("name LIKE ?")
        .order_by(&["name"])
        .desc()
        .limit(10)
        .offset(20);

    assert_eq!(
        qb.to_string(),
        "SELECT name, age FROM users WHERE age > ? AND name LIKE ? ORDER BY name DESC LIMIT 10 OFFSET 20"
    );
}

#[test]
fn test_joins() {
    let mut qb = QueryBuilder::new();
    qb.select(&["u.name", "p.title"])
        .from(&["users u"])
        .inner_join("posts p")
        .on("p.user_id = u.id")
        .left_join("tags t")
        .on("t.post_id = p.id")
        .right_join("audit a")
        .on("a.user_id = u.id");

    assert_eq!(
        qb.to_string(),
        "SELECT u.name, p.title FROM users u INNER JOIN posts p ON p.user_id = u.id \
         LEFT JOIN tags t ON t.post_id = p.id RIGHT JOIN audit a ON a.user_id = u.id"
    );
}

#[test]
fn test_in_group_having_for_update() {
    let mut qb = QueryBuilder::new();
    qb.select(&["status", "COUNT(*)"])
        .from(&["orders"])
        .where_("status")
        .in_(&["'new'", "'paid'"])
        .or("id = ?")
        .group_by(&["status"])
        .having("COUNT(*) > 1")
        .asc()
        .for_update();

    assert_eq!(
        qb.to_string(),
        "SELECT status, COUNT(*) FROM orders WHERE status IN ( 'new', 'paid' ) OR id = ? \
         GROUP BY status HAVING COUNT(*) > 1 ASC FOR UPDATE"
    );
}

#[test]
fn test_write_statements() {
    let mut insert = QueryBuilder::new();
    insert.insert_into("users", &["name", "age"]).values(&["?", "?"]);
    assert_eq!(insert.to_string(), "INSERT INTO users ( name, age ) VALUES ( ?, ? )");

    let mut bare = QueryBuilder::new();
    bare.insert_into("users", &[]).values(&["DEFAULT"]);
    assert_eq!(bare.to_string(), "INSERT INTO users VALUES ( DEFAULT )");

    let mut update = QueryBuilder::new();
    update.update(&["users"]).set(&["name = ?", "age = ?"]).where_("id = ?");
    assert_eq!(update.to_string(), "UPDATE users SET name = ?, age = ? WHERE id = ?");

    let mut delete = QueryBuilder::new();
    delete.delete(&[]).from(&["users"]).where_("id = ?");
    assert_eq!(delete.to_string(), "DELETE FROM users WHERE id = ?");

    let mut multi = QueryBuilder::new();
    multi.delete(&["u", "p"]).from(&["users u", "posts p"]);
    assert_eq!(multi.to_string(), "DELETE u, p FROM users u, posts p");
}

#[test]
fn test_subquery() {
    let mut inner = QueryBuilder::new();
    inner.select(&["id"]).from(&["users"]).where_("active = ?");
    let sub = QueryBuilder::subquery(&inner.to_string(), "active_users");
    assert_eq!(sub, "(SELECT id FROM users WHERE active = ?) AS active_users");

    let mut qb = QueryBuilder::new();
    qb.select(&["*"]).from(&[sub.as_str()]);
    assert_eq!(
        qb.to_string(),
        "SELECT * FROM (SELECT id FROM users WHERE active = ?) AS active_users"
    );
}

#[test]
fn test_to_string_is_idempotent() {
    let mut qb = QueryBuilder::new();
    qb.select(&["1"]);
    let first = qb.to_string();
    assert_eq!(qb.to_string(), first);
    assert_eq!(qb.tokens(), ["SELECT", "1"]);

    qb.from(&["dual"]);
    assert_eq!(qb.to_string(), "SELECT 1 FROM dual");
    assert_eq!(QueryBuilder::default().to_string(), "");
}
