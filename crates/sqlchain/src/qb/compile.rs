//! Pure rendering of a [`ClauseModel`] into SQL text and bindings.

use crate::error::{DbError, DbResult};
use crate::qb::clause::{
    BindingCategory, ClauseModel, HavingClause, JoinClause, OrderClause, WhereClause,
};
use crate::value::Value;

/// SQL text plus the flattened binding sequence, ready for execution.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    pub sql: String,
    pub bindings: Vec<Value>,
}

/// Compile a SELECT.
///
/// Clause order is fixed: SELECT/FROM, joins, WHERE, GROUP BY, HAVING,
/// ORDER BY, LIMIT/OFFSET, then each UNION fragment.
pub fn compile_select(model: &ClauseModel) -> DbResult<CompiledQuery> {
    if model.table.trim().is_empty() {
        return Err(DbError::malformed("no table selected"));
    }

    let mut sql = format!("SELECT {} FROM {}", model.select, model.table);

    for join in &model.joins {
        sql.push(' ');
        sql.push_str(&compile_join(join));
    }

    if !model.wheres.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&compile_wheres(&model.wheres)?);
    }

    if !model.groups.is_empty() {
        sql.push_str(" GROUP BY ");
        sql.push_str(&model.groups.join(", "));
    }

    if !model.havings.is_empty() {
        sql.push_str(" HAVING ");
        sql.push_str(&compile_havings(&model.havings));
    }

    if !model.orders.is_empty() {
        sql.push_str(" ORDER BY ");
        sql.push_str(&compile_orders(&model.orders));
    }

    // OFFSET without LIMIT is dropped.
    if let Some(limit) = model.limit {
        sql.push_str(&format!(" LIMIT {}", limit));
        if let Some(offset) = model.offset {
            sql.push_str(&format!(" OFFSET {}", offset));
        }
    }

    for union in &model.unions {
        sql.push_str(&format!(" UNION ({})", union));
    }

    check_bindings(model)?;

    Ok(CompiledQuery {
        sql,
        bindings: model.bindings.flatten(),
    })
}

/// Check that WHERE and HAVING bindings line up with the placeholders
/// emitted for them.
///
/// Raw select and union text is passed through verbatim and not inspected.
fn check_bindings(model: &ClauseModel) -> DbResult<()> {
    let expected = [
        (
            BindingCategory::Where,
            model.wheres.iter().map(WhereClause::placeholder_count).sum::<usize>(),
        ),
        (BindingCategory::Having, model.havings.len()),
    ];
    for (category, placeholders) in expected {
        let bound = model.bindings.get(category).len();
        if bound != placeholders {
            return Err(DbError::malformed(format!(
                "{} {} placeholders but {} bindings",
                category.as_str(),
                placeholders,
                bound
            )));
        }
    }
    Ok(())
}

fn compile_join(join: &JoinClause) -> String {
    format!(
        "{} JOIN {} ON {} {} {}",
        join.kind.as_sql(),
        join.table,
        join.first,
        join.operator,
        join.second
    )
}

/// Render WHERE fragments.
///
/// Every fragment is joined with the connector of the *first* entry; the
/// connectors stored on later entries are not consulted.
pub(crate) fn compile_wheres(wheres: &[WhereClause]) -> DbResult<String> {
    let first = wheres
        .first()
        .ok_or_else(|| DbError::malformed("WHERE list has no first entry"))?;
    let glue = format!(" {} ", first.boolean().as_sql());

    let fragments: Vec<String> = wheres.iter().map(compile_where).collect();
    Ok(fragments.join(&glue))
}

fn compile_where(clause: &WhereClause) -> String {
    match clause {
        WhereClause::Basic {
            column, operator, ..
        } => format!("{} {} ?", column, operator),
        WhereClause::In { column, values, .. } => {
            format!("{} IN ({})", column, placeholders(values.len()))
        }
        WhereClause::NotIn { column, values, .. } => {
            format!("{} NOT IN ({})", column, placeholders(values.len()))
        }
        WhereClause::Null { column, .. } => format!("{} IS NULL", column),
        WhereClause::NotNull { column, .. } => format!("{} IS NOT NULL", column),
    }
}

fn compile_havings(havings: &[HavingClause]) -> String {
    havings
        .iter()
        .map(|h| format!("{} {} ?", h.column, h.operator))
        .collect::<Vec<_>>()
        .join(" AND ")
}

fn compile_orders(orders: &[OrderClause]) -> String {
    orders
        .iter()
        .map(|o| format!("{} {}", o.column, o.direction.as_sql()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// `?, ?, ?` with `n` placeholders.
fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qb::clause::{Boolean, Direction, JoinKind};

    fn basic(column: &str, value: i64, boolean: Boolean) -> WhereClause {
        WhereClause::Basic {
            column: column.into(),
            operator: "=".into(),
            value: Value::Int(value),
            boolean,
        }
    }

    #[test]
    fn test_bare_table() {
        let compiled = compile_select(&ClauseModel::new("users")).unwrap();
        assert_eq!(compiled.sql, "SELECT * FROM users");
        assert!(compiled.bindings.is_empty());
    }

    #[test]
    fn test_missing_table_is_malformed() {
        let err = compile_select(&ClauseModel::default()).unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn test_empty_where_list_is_malformed() {
        assert!(compile_wheres(&[]).unwrap_err().is_malformed());
    }

    #[test]
    fn test_single_where_entry() {
        let sql = compile_wheres(&[basic("id", 1, Boolean::Or)]).unwrap();
        assert_eq!(sql, "id = ?");
    }

    #[test]
    fn test_first_connector_governs() {
        let sql = compile_wheres(&[
            basic("a", 1, Boolean::Or),
            basic("b", 2, Boolean::And),
            basic("c", 3, Boolean::And),
        ])
        .unwrap();
        assert_eq!(sql, "a = ? OR b = ? OR c = ?");
    }

    #[test]
    fn test_clause_order() {
        let mut model = ClauseModel::new("orders o");
        model.select = "o.user_id, COUNT(*) AS n".into();
        model.unions.push("SELECT user_id, 0 FROM archived".into());
        model.orders.push(OrderClause {
            column: "n".into(),
            direction: Direction::Desc,
        });
        model.havings.push(HavingClause {
            column: "COUNT(*)".into(),
            operator: ">".into(),
            value: Value::Int(2),
            boolean: Boolean::Or,
        });
        model.bindings.push(BindingCategory::Having, Value::Int(2));
        model.groups.push("o.user_id".into());
        model.wheres.push(WhereClause::NotNull {
            column: "o.paid_at".into(),
            boolean: Boolean::And,
        });
        model.joins.push(JoinClause {
            table: "users u".into(),
            first: "u.id".into(),
            operator: "=".into(),
            second: "o.user_id".into(),
            kind: JoinKind::Left,
        });
        model.limit = Some(5);
        model.offset = Some(10);

        let compiled = compile_select(&model).unwrap();
        assert_eq!(
            compiled.sql,
            "SELECT o.user_id, COUNT(*) AS n FROM orders o \
             LEFT JOIN users u ON u.id = o.user_id \
             WHERE o.paid_at IS NOT NULL \
             GROUP BY o.user_id \
             HAVING COUNT(*) > ? \
             ORDER BY n DESC \
             LIMIT 5 OFFSET 10 \
             UNION (SELECT user_id, 0 FROM archived)"
        );
        assert_eq!(compiled.bindings, vec![Value::Int(2)]);
    }

    #[test]
    fn test_where_binding_mismatch_is_malformed() {
        let mut model = ClauseModel::new("users");
        model.wheres.push(basic("id", 1, Boolean::And));
        let err = compile_select(&model).unwrap_err();
        assert!(err.is_malformed());
        assert!(err.to_string().contains("where 1 placeholders but 0 bindings"));

        model.bindings.push(BindingCategory::Where, Value::Int(1));
        model.bindings.push(BindingCategory::Where, Value::Int(2));
        assert!(compile_select(&model).unwrap_err().is_malformed());
    }

    #[test]
    fn test_having_binding_mismatch_is_malformed() {
        let mut model = ClauseModel::new("orders");
        model.havings.push(HavingClause {
            column: "COUNT(*)".into(),
            operator: ">".into(),
            value: Value::Int(1),
            boolean: Boolean::And,
        });
        assert!(compile_select(&model).unwrap_err().is_malformed());
    }

    #[test]
    fn test_question_marks_in_verbatim_text() {
        let mut model = ClauseModel::new("users");
        model.select = "name, 'why?' AS q".into();
        model
            .unions
            .push("SELECT name, 'ok?' FROM admins WHERE note = 'ok?'".into());
        model.wheres.push(WhereClause::Null {
            column: "a?b".into(),
            boolean: Boolean::And,
        });
        model.wheres.push(basic("id", 7, Boolean::And));
        model.bindings.push(BindingCategory::Where, Value::Int(7));

        let compiled = compile_select(&model).unwrap();
        assert_eq!(
            compiled.sql,
            "SELECT name, 'why?' AS q FROM users WHERE a?b IS NULL AND id = ? \
             UNION (SELECT name, 'ok?' FROM admins WHERE note = 'ok?')"
        );
        assert_eq!(compiled.bindings, vec![Value::Int(7)]);
    }

    #[test]
    fn test_empty_in_list_renders_empty_parens() {
        let sql = compile_where(&WhereClause::In {
            column: "id".into(),
            values: Vec::new(),
            boolean: Boolean::And,
        });
        assert_eq!(sql, "id IN ()");
    }
}
