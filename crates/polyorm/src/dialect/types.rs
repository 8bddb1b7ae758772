//! Operator and column-type helpers on top of the per-dialect tables.

use super::DbBaser;
use super::base::quote;
use crate::error::{OrmError, OrmResult};
use crate::model::{FieldInfo, FieldType};

/// The operator template, or `UnknownOperator`.
pub fn validate_operator<D: DbBaser + ?Sized>(d: &D, operator: &str) -> OrmResult<&'static str> {
    d.operator_sql(operator)
        .ok_or_else(|| OrmError::UnknownOperator {
            dialect: d.name(),
            operator: operator.to_string(),
        })
}

/// A comparison fragment for `field`, e.g. `UPPER("name"::text) LIKE UPPER(?)`.
pub fn operator_condition<D: DbBaser + ?Sized>(
    d: &D,
    field: &FieldInfo,
    operator: &str,
) -> OrmResult<String> {
    let template = validate_operator(d, operator)?;
    let mut left = quote(d, &field.column);
    d.generate_operator_left_col(field, operator, &mut left);
    Ok(format!("{left} {template}"))
}

/// Fill each `%d` in order with `args`; missing args leave the specifier in place.
fn fill_specifiers(template: &str, args: &[usize]) -> String {
    let mut out = String::with_capacity(template.len() + 8);
    let mut args = args.iter();
    let mut rest = template;
    while let Some(pos) = rest.find("%d") {
        out.push_str(&rest[..pos]);
        match args.next() {
            Some(n) => out.push_str(&n.to_string()),
            None => out.push_str("%d"),
        }
        rest = &rest[pos + 2..];
    }
    out.push_str(rest);
    out
}

/// Render the column definition for `field` from the dialect's type table.
///
/// Auto fields use the `auto` entry; other primary keys get the `pk` entry
/// appended. `%d` takes the field size (or digits and decimals for decimal
/// columns) and `%COL%` the column name.
pub fn render_column_type<D: DbBaser + ?Sized>(d: &D, field: &FieldInfo) -> OrmResult<String> {
    let types = d.db_types();
    let lookup = |key: &str| {
        types
            .get(key)
            .copied()
            .ok_or_else(|| OrmError::UnsupportedType {
                dialect: d.name(),
                key: key.to_string(),
            })
    };

    let mut col = if field.auto {
        lookup("auto")?.to_string()
    } else {
        let template = lookup(field.field_type.type_key())?;
        match field.field_type {
            FieldType::Decimal => fill_specifiers(template, &[field.digits, field.decimals]),
            _ => fill_specifiers(template, &[field.size]),
        }
    };

    if field.pk && !field.auto {
        col.push(' ');
        col.push_str(lookup("pk")?);
    }

    Ok(col.replace("%COL%", &field.column))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_specifiers_in_order() {
        assert_eq!(fill_specifiers("NUMBER(%d, %d)", &[10, 2]), "NUMBER(10, 2)");
        assert_eq!(fill_specifiers("varchar(%d)", &[64]), "varchar(64)");
        assert_eq!(fill_specifiers("text", &[64]), "text");
        assert_eq!(fill_specifiers("x(%d,%d)", &[1]), "x(1,%d)");
    }
}
