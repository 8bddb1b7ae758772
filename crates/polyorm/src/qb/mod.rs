//! Token query builder.
//!
//! [`QueryBuilder`] appends clause keywords and caller-supplied fragments in
//! call order and joins them with single spaces. It performs no quoting, no
//! placeholder rewriting and no grammar checks: fragments are expected to be
//! valid for the target dialect already.
//!
//! # Usage
//!
//! ```ignore
//! use polyorm::qb::QueryBuilder;
//!
//! let mut qb = QueryBuilder::new();
//! qb.select(&["name", "age"])
//!     .from(&["users"])
//!     .where_("age > ?")
//!     .order_by(&["name"])
//!     .desc()
//!     .limit(10);
//!
//! assert_eq!(
//!     qb.to_string(),
//!     "SELECT name, age FROM users WHERE age > ? ORDER BY name DESC LIMIT 10"
//! );
//! ```

use std::fmt;

const COMMA_SPACE: &str = ", ";

/// Ordered SQL tokens for one statement.
///
/// Single owner: every appending method takes `&mut self`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryBuilder {
    tokens: Vec<String>,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tokens appended so far.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    fn push(&mut self, token: impl Into<String>) -> &mut Self {
        self.tokens.push(token.into());
        self
    }

    fn push_list(&mut self, keyword: &str, items: &[&str]) -> &mut Self {
        self.push(keyword).push(items.join(COMMA_SPACE))
    }

    // ==================== SELECT ====================

    pub fn select(&mut self, fields: &[&str]) -> &mut Self {
        self.push_list("SELECT", fields)
    }

    pub fn for_update(&mut self) -> &mut Self {
        self.push("FOR UPDATE")
    }

    pub fn from(&mut self, tables: &[&str]) -> &mut Self {
        self.push_list("FROM", tables)
    }

    pub fn inner_join(&mut self, table: &str) -> &mut Self {
        self.push("INNER JOIN").push(table)
    }

    pub fn left_join(&mut self, table: &str) -> &mut Self {
        self.push("LEFT JOIN").push(table)
    }

    pub fn right_join(&mut self, table: &str) -> &mut Self {
        self.push("RIGHT JOIN").push(table)
    }

    pub fn on(&mut self, cond: &str) -> &mut Self {
        self.push("ON").push(cond)
    }

    // ==================== Conditions ====================

    pub fn where_(&mut self, cond: &str) -> &mut Self {
        self.push("WHERE").push(cond)
    }

    pub fn and(&mut self, cond: &str) -> &mut Self {
        self.push("AND").push(cond)
    }

    pub fn or(&mut self, cond: &str) -> &mut Self {
        self.push("OR").push(cond)
    }

    /// `IN ( a, b )`
    pub fn in_(&mut self, vals: &[&str]) -> &mut Self {
        self.push("IN")
            .push("(")
            .push(vals.join(COMMA_SPACE))
            .push(")")
    }

    // ==================== Ordering / paging ====================

    pub fn order_by(&mut self, fields: &[&str]) -> &mut Self {
        self.push_list("ORDER BY", fields)
    }

    pub fn asc(&mut self) -> &mut Self {
        self.push("ASC")
    }

    pub fn desc(&mut self) -> &mut Self {
        self.push("DESC")
    }

    pub fn limit(&mut self, limit: u64) -> &mut Self {
        self.push("LIMIT").push(limit.to_string())
    }

    pub fn offset(&mut self, offset: u64) -> &mut Self {
        self.push("OFFSET").push(offset.to_string())
    }

    pub fn group_by(&mut self, fields: &[&str]) -> &mut Self {
        self.push_list("GROUP BY", fields)
    }

    pub fn having(&mut self, cond: &str) -> &mut Self {
        self.push("HAVING").push(cond)
    }

    // ==================== Writes ====================

    pub fn update(&mut self, tables: &[&str]) -> &mut Self {
        self.push_list("UPDATE", tables)
    }

    /// `SET a = ?, b = ?` from already formatted assignments.
    pub fn set(&mut self, kv: &[&str]) -> &mut Self {
        self.push_list("SET", kv)
    }

    /// `DELETE`, followed by the tables when any are given.
    pub fn delete(&mut self, tables: &[&str]) -> &mut Self {
        self.push("DELETE");
        if !tables.is_empty() {
            self.push(tables.join(COMMA_SPACE));
        }
        self
    }

    /// `INSERT INTO table`, followed by `( fields )` when any are given.
    pub fn insert_into(&mut self, table: &str, fields: &[&str]) -> &mut Self {
        self.push("INSERT INTO").push(table);
        if !fields.is_empty() {
            self.push("(").push(fields.join(COMMA_SPACE)).push(")");
        }
        self
    }

    pub fn values(&mut self, vals: &[&str]) -> &mut Self {
        self.push("VALUES")
            .push("(")
            .push(vals.join(COMMA_SPACE))
            .push(")")
    }

    /// `(sub) AS alias`, for use as a FROM or IN fragment.
    pub fn subquery(sub: &str, alias: &str) -> String {
        format!("({sub}) AS {alias}")
    }
}

impl fmt::Display for QueryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tokens.join(" "))
    }
}

#[cfg(test)]
mod tests;
