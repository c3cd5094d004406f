//! SELECT query builder with positional `?` bindings.

use crate::connection::{Connection, run_query};
use crate::error::{DbError, DbResult};
use crate::qb::clause::{
    BindingCategory, Boolean, ClauseModel, Direction, HavingClause, JoinClause, JoinKind,
    OrderClause, WhereClause,
};
use crate::qb::compile::{CompiledQuery, compile_select};
use crate::row::{FromRow, Row};
use crate::value::{FromValue, Value};

/// Column alias read back by the aggregate shortcuts.
const AGGREGATE_ALIAS: &str = "aggregate";

/// SELECT query builder.
///
/// Every mutator consumes the builder and hands it back, so calls chain.
/// Execution methods borrow any [`Connection`].
#[derive(Clone, Debug)]
pub struct SelectQb {
    model: ClauseModel,
}

impl SelectQb {
    /// Create a new SELECT query builder for a table.
    pub fn new(table: &str) -> Self {
        Self {
            model: ClauseModel::new(table),
        }
    }

    /// Re-target the builder. All clauses and bindings are discarded.
    pub fn table(mut self, table: &str) -> Self {
        self.model = ClauseModel::new(table);
        self
    }

    /// Discard all clauses and bindings, keeping the table.
    pub fn reset(mut self) -> Self {
        self.model.reset();
        self
    }

    /// Accumulated clause state.
    pub fn model(&self) -> &ClauseModel {
        &self.model
    }

    // ==================== SELECT columns ====================

    /// Set SELECT columns, joined with `, `.
    ///
    /// An empty list keeps `*`.
    pub fn select<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let cols: Vec<String> = columns.into_iter().map(|c| c.as_ref().to_string()).collect();
        self.model.select = if cols.is_empty() {
            "*".to_string()
        } else {
            cols.join(", ")
        };
        self
    }

    /// Replace the SELECT expression verbatim, registering `bindings` for its placeholders.
    pub fn select_raw<I, V>(mut self, expr: &str, bindings: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.model.select = expr.to_string();
        self.model
            .bindings
            .extend(BindingCategory::Select, bindings.into_iter().map(Into::into));
        self
    }

    // ==================== WHERE ====================

    fn push_basic(mut self, column: &str, operator: &str, value: Value, boolean: Boolean) -> Self {
        self.model.bindings.push(BindingCategory::Where, value.clone());
        self.model.wheres.push(WhereClause::Basic {
            column: column.to_string(),
            operator: operator.to_string(),
            value,
            boolean,
        });
        self
    }

    /// Add WHERE: column operator value
    pub fn where_<V: Into<Value>>(self, column: &str, operator: &str, value: V) -> Self {
        self.push_basic(column, operator, value.into(), Boolean::And)
    }

    /// Add WHERE: column = value
    pub fn where_eq<V: Into<Value>>(self, column: &str, value: V) -> Self {
        self.push_basic(column, "=", value.into(), Boolean::And)
    }

    /// Add an OR WHERE: column operator value
    ///
    /// Only the first WHERE entry's connector is rendered, so this joins with
    /// `OR` only when it is the first condition.
    pub fn or_where<V: Into<Value>>(self, column: &str, operator: &str, value: V) -> Self {
        self.push_basic(column, operator, value.into(), Boolean::Or)
    }

    /// Add an OR WHERE: column = value
    pub fn or_where_eq<V: Into<Value>>(self, column: &str, value: V) -> Self {
        self.push_basic(column, "=", value.into(), Boolean::Or)
    }

    fn push_in<I, V>(mut self, column: &str, values: I, boolean: Boolean, negate: bool) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        self.model
            .bindings
            .extend(BindingCategory::Where, values.iter().cloned());
        let column = column.to_string();
        self.model.wheres.push(if negate {
            WhereClause::NotIn {
                column,
                values,
                boolean,
            }
        } else {
            WhereClause::In {
                column,
                values,
                boolean,
            }
        });
        self
    }

    /// Add WHERE: column IN (values...)
    pub fn where_in<I, V>(self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.push_in(column, values, Boolean::And, false)
    }

    /// Add an OR WHERE: column IN (values...)
    pub fn or_where_in<I, V>(self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.push_in(column, values, Boolean::Or, false)
    }

    /// Add WHERE: column NOT IN (values...)
    pub fn where_not_in<I, V>(self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.push_in(column, values, Boolean::And, true)
    }

    /// Add an OR WHERE: column NOT IN (values...)
    pub fn or_where_not_in<I, V>(self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.push_in(column, values, Boolean::Or, true)
    }

    fn push_null(mut self, column: &str, boolean: Boolean, negate: bool) -> Self {
        let column = column.to_string();
        self.model.wheres.push(if negate {
            WhereClause::NotNull { column, boolean }
        } else {
            WhereClause::Null { column, boolean }
        });
        self
    }

    /// Add WHERE: column IS NULL
    pub fn where_null(self, column: &str) -> Self {
        self.push_null(column, Boolean::And, false)
    }

    /// Add an OR WHERE: column IS NULL
    pub fn or_where_null(self, column: &str) -> Self {
        self.push_null(column, Boolean::Or, false)
    }

    /// Add WHERE: column IS NOT NULL
    pub fn where_not_null(self, column: &str) -> Self {
        self.push_null(column, Boolean::And, true)
    }

    /// Add an OR WHERE: column IS NOT NULL
    pub fn or_where_not_null(self, column: &str) -> Self {
        self.push_null(column, Boolean::Or, true)
    }

    // ==================== JOIN ====================

    fn push_join(
        mut self,
        kind: JoinKind,
        table: &str,
        first: &str,
        operator: &str,
        second: &str,
    ) -> Self {
        self.model.joins.push(JoinClause {
            table: table.to_string(),
            first: first.to_string(),
            operator: operator.to_string(),
            second: second.to_string(),
            kind,
        });
        self
    }

    /// Add INNER JOIN table ON first operator second.
    pub fn join(self, table: &str, first: &str, operator: &str, second: &str) -> Self {
        self.push_join(JoinKind::Inner, table, first, operator, second)
    }

    /// Add INNER JOIN table ON first = second.
    pub fn join_eq(self, table: &str, first: &str, second: &str) -> Self {
        self.push_join(JoinKind::Inner, table, first, "=", second)
    }

    /// Add LEFT JOIN.
    pub fn left_join(self, table: &str, first: &str, operator: &str, second: &str) -> Self {
        self.push_join(JoinKind::Left, table, first, operator, second)
    }

    /// Add LEFT JOIN ... ON first = second.
    pub fn left_join_eq(self, table: &str, first: &str, second: &str) -> Self {
        self.push_join(JoinKind::Left, table, first, "=", second)
    }

    /// Add RIGHT JOIN.
    pub fn right_join(self, table: &str, first: &str, operator: &str, second: &str) -> Self {
        self.push_join(JoinKind::Right, table, first, operator, second)
    }

    /// Add RIGHT JOIN ... ON first = second.
    pub fn right_join_eq(self, table: &str, first: &str, second: &str) -> Self {
        self.push_join(JoinKind::Right, table, first, "=", second)
    }

    // ==================== Grouping ====================

    /// Append GROUP BY columns.
    ///
    /// Accepts one or many names: `group_by(["a"])`, `group_by(vec!["a", "b"])`.
    pub fn group_by<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.model
            .groups
            .extend(columns.into_iter().map(|c| c.as_ref().to_string()));
        self
    }

    fn push_having(mut self, column: &str, operator: &str, value: Value, boolean: Boolean) -> Self {
        self.model.bindings.push(BindingCategory::Having, value.clone());
        self.model.havings.push(HavingClause {
            column: column.to_string(),
            operator: operator.to_string(),
            value,
            boolean,
        });
        self
    }

    /// Add HAVING: column operator value
    pub fn having<V: Into<Value>>(self, column: &str, operator: &str, value: V) -> Self {
        self.push_having(column, operator, value.into(), Boolean::And)
    }

    /// Add HAVING: column = value
    pub fn having_eq<V: Into<Value>>(self, column: &str, value: V) -> Self {
        self.push_having(column, "=", value.into(), Boolean::And)
    }

    /// Add a HAVING entry flagged OR. HAVING is always rendered AND-joined.
    pub fn or_having<V: Into<Value>>(self, column: &str, operator: &str, value: V) -> Self {
        self.push_having(column, operator, value.into(), Boolean::Or)
    }

    // ==================== Ordering ====================

    /// Add ORDER BY column direction.
    pub fn order_by(mut self, column: &str, direction: Direction) -> Self {
        self.model.orders.push(OrderClause {
            column: column.to_string(),
            direction,
        });
        self
    }

    /// Add ORDER BY column ASC.
    pub fn order_by_asc(self, column: &str) -> Self {
        self.order_by(column, Direction::Asc)
    }

    /// Add ORDER BY column DESC.
    pub fn order_by_desc(self, column: &str) -> Self {
        self.order_by(column, Direction::Desc)
    }

    // ==================== Pagination ====================

    /// Set LIMIT.
    pub fn limit(mut self, n: u64) -> Self {
        self.model.limit = Some(n);
        self
    }

    /// Set OFFSET. Rendered only when a LIMIT is also set.
    pub fn offset(mut self, n: u64) -> Self {
        self.model.offset = Some(n);
        self
    }

    // ==================== UNION ====================

    /// Append a raw query, rendered as ` UNION (<query>)`.
    ///
    /// Parenthesised compound members and a LIMIT ahead of `UNION` are
    /// MySQL-style. SQLite rejects both at prepare time.
    pub fn union(mut self, query: &str) -> Self {
        self.model.unions.push(query.to_string());
        self
    }

    /// Append a raw query with values for its `?` placeholders.
    ///
    /// Rendered like [`union`](Self::union), with the same SQLite caveat.
    pub fn union_with<I, V>(mut self, query: &str, bindings: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.model.unions.push(query.to_string());
        self.model
            .bindings
            .extend(BindingCategory::Union, bindings.into_iter().map(Into::into));
        self
    }

    // ==================== Build helpers ====================

    /// Compile SQL text and flattened bindings.
    pub fn build(&self) -> DbResult<CompiledQuery> {
        compile_select(&self.model)
    }

    /// Get the compiled SQL string.
    pub fn to_sql(&self) -> DbResult<String> {
        self.build().map(|c| c.sql)
    }

    /// Bindings in placeholder order: select, join, where, having, order, union.
    pub fn bindings(&self) -> Vec<Value> {
        self.model.bindings.flatten()
    }

    // ==================== Execution ====================

    /// Execute and return all rows.
    pub fn get<C: Connection>(&self, conn: &C) -> DbResult<Vec<Row>> {
        let compiled = self.build()?;
        run_query(conn, &compiled.sql, &compiled.bindings)
    }

    /// Execute and map every row to `T`.
    pub fn get_as<T: FromRow, C: Connection>(&self, conn: &C) -> DbResult<Vec<T>> {
        let rows = self.get(conn)?;
        rows.iter().map(T::from_row).collect()
    }

    /// Execute with LIMIT 1 and return the first row, if any.
    ///
    /// The limit is written into this builder and stays there.
    pub fn first<C: Connection>(&mut self, conn: &C) -> DbResult<Option<Row>> {
        self.model.limit = Some(1);
        let rows = self.get(conn)?;
        Ok(rows.into_iter().next())
    }

    /// Like [`first`](Self::first), mapping the row to `T`.
    pub fn first_as<T: FromRow, C: Connection>(&mut self, conn: &C) -> DbResult<Option<T>> {
        let row = self.first(conn)?;
        row.as_ref().map(T::from_row).transpose()
    }

    /// Read one column of the first row.
    pub fn value<T: FromValue, C: Connection>(
        &mut self,
        conn: &C,
        column: &str,
    ) -> DbResult<Option<T>> {
        match self.first(conn)? {
            Some(row) => row.try_get::<Option<T>>(column),
            None => Ok(None),
        }
    }

    // ==================== Aggregates ====================

    /// Run `<expr> as aggregate` and return the value; NULL counts as absent.
    fn aggregate<C: Connection>(&mut self, conn: &C, expr: String) -> DbResult<Option<Value>> {
        self.model.select = format!("{} as {}", expr, AGGREGATE_ALIAS);
        let value = self
            .first(conn)?
            .and_then(|mut row| row.take(AGGREGATE_ALIAS))
            .filter(|v| !v.is_null());
        Ok(value)
    }

    /// `COUNT(*)`; 0 when no row comes back.
    pub fn count<C: Connection>(&mut self, conn: &C) -> DbResult<i64> {
        match self.aggregate(conn, "COUNT(*)".to_string())? {
            Some(value) => value.as_i64().ok_or_else(|| {
                DbError::decode(
                    AGGREGATE_ALIAS,
                    format!("expected integer, got {}", value.type_name()),
                )
            }),
            None => Ok(0),
        }
    }

    /// `MAX(column)`; `None` when absent.
    pub fn max<C: Connection>(&mut self, conn: &C, column: &str) -> DbResult<Option<Value>> {
        self.aggregate(conn, format!("MAX({})", column))
    }

    /// `MIN(column)`; `None` when absent.
    pub fn min<C: Connection>(&mut self, conn: &C, column: &str) -> DbResult<Option<Value>> {
        self.aggregate(conn, format!("MIN({})", column))
    }

    /// `SUM(column)`; integer 0 when absent.
    pub fn sum<C: Connection>(&mut self, conn: &C, column: &str) -> DbResult<Value> {
        Ok(self
            .aggregate(conn, format!("SUM({})", column))?
            .unwrap_or(Value::Int(0)))
    }

    /// `AVG(column)`; integer 0 when absent.
    pub fn avg<C: Connection>(&mut self, conn: &C, column: &str) -> DbResult<Value> {
        Ok(self
            .aggregate(conn, format!("AVG({})", column))?
            .unwrap_or(Value::Int(0)))
    }
}
