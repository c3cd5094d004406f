//! Clause model accumulated by the fluent builder.

use crate::value::Value;
use std::fmt;

/// Connector between WHERE/HAVING fragments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Boolean {
    #[default]
    And,
    Or,
}

impl Boolean {
    pub fn as_sql(self) -> &'static str {
        match self {
            Boolean::And => "AND",
            Boolean::Or => "OR",
        }
    }
}

impl fmt::Display for Boolean {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// JOIN kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
}

impl JoinKind {
    pub fn as_sql(self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER",
            JoinKind::Left => "LEFT",
            JoinKind::Right => "RIGHT",
        }
    }
}

/// ORDER BY direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn as_sql(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// One WHERE entry.
#[derive(Debug, Clone, PartialEq)]
pub enum WhereClause {
    /// `column operator ?`
    Basic {
        column: String,
        operator: String,
        value: Value,
        boolean: Boolean,
    },
    /// `column IN (?, ...)`
    In {
        column: String,
        values: Vec<Value>,
        boolean: Boolean,
    },
    /// `column NOT IN (?, ...)`
    NotIn {
        column: String,
        values: Vec<Value>,
        boolean: Boolean,
    },
    /// `column IS NULL`
    Null { column: String, boolean: Boolean },
    /// `column IS NOT NULL`
    NotNull { column: String, boolean: Boolean },
}

impl WhereClause {
    /// Connector requested when the entry was added.
    pub fn boolean(&self) -> Boolean {
        match self {
            WhereClause::Basic { boolean, .. }
            | WhereClause::In { boolean, .. }
            | WhereClause::NotIn { boolean, .. }
            | WhereClause::Null { boolean, .. }
            | WhereClause::NotNull { boolean, .. } => *boolean,
        }
    }

    pub fn column(&self) -> &str {
        match self {
            WhereClause::Basic { column, .. }
            | WhereClause::In { column, .. }
            | WhereClause::NotIn { column, .. }
            | WhereClause::Null { column, .. }
            | WhereClause::NotNull { column, .. } => column,
        }
    }

    /// Number of placeholders this entry renders.
    pub fn placeholder_count(&self) -> usize {
        match self {
            WhereClause::Basic { .. } => 1,
            WhereClause::In { values, .. } | WhereClause::NotIn { values, .. } => values.len(),
            WhereClause::Null { .. } | WhereClause::NotNull { .. } => 0,
        }
    }
}

/// One JOIN entry. Joins compare columns and never carry bindings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinClause {
    pub table: String,
    pub first: String,
    pub operator: String,
    pub second: String,
    pub kind: JoinKind,
}

/// One HAVING entry.
#[derive(Debug, Clone, PartialEq)]
pub struct HavingClause {
    pub column: String,
    pub operator: String,
    pub value: Value,
    /// Stored but not rendered: HAVING fragments are always AND-joined.
    pub boolean: Boolean,
}

/// One ORDER BY entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderClause {
    pub column: String,
    pub direction: Direction,
}

/// Binding category. Placeholders are emitted in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingCategory {
    Select,
    Join,
    Where,
    Having,
    Order,
    Union,
}

impl BindingCategory {
    /// All categories in flattening order.
    pub const ALL: [BindingCategory; 6] = [
        BindingCategory::Select,
        BindingCategory::Join,
        BindingCategory::Where,
        BindingCategory::Having,
        BindingCategory::Order,
        BindingCategory::Union,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BindingCategory::Select => "select",
            BindingCategory::Join => "join",
            BindingCategory::Where => "where",
            BindingCategory::Having => "having",
            BindingCategory::Order => "order",
            BindingCategory::Union => "union",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Per-category binding lists.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings {
    lists: [Vec<Value>; 6],
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one value to a category.
    pub fn push(&mut self, category: BindingCategory, value: Value) {
        self.lists[category.index()].push(value);
    }

    /// Append values to a category, keeping their order.
    pub fn extend(&mut self, category: BindingCategory, values: impl IntoIterator<Item = Value>) {
        self.lists[category.index()].extend(values);
    }

    /// Values registered under one category.
    pub fn get(&self, category: BindingCategory) -> &[Value] {
        &self.lists[category.index()]
    }

    /// Total number of values across categories.
    pub fn len(&self) -> usize {
        self.lists.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.iter().all(Vec::is_empty)
    }

    /// Concatenate every category in [`BindingCategory::ALL`] order.
    pub fn flatten(&self) -> Vec<Value> {
        let mut out = Vec::with_capacity(self.len());
        for category in BindingCategory::ALL {
            out.extend(self.get(category).iter().cloned());
        }
        out
    }
}

/// Full state of one SELECT under construction.
#[derive(Debug, Clone, PartialEq)]
pub struct ClauseModel {
    pub table: String,
    pub select: String,
    pub wheres: Vec<WhereClause>,
    pub joins: Vec<JoinClause>,
    pub groups: Vec<String>,
    pub havings: Vec<HavingClause>,
    pub orders: Vec<OrderClause>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub unions: Vec<String>,
    pub bindings: Bindings,
}

impl ClauseModel {
    /// Fresh state targeting `table`.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            select: "*".to_string(),
            wheres: Vec::new(),
            joins: Vec::new(),
            groups: Vec::new(),
            havings: Vec::new(),
            orders: Vec::new(),
            limit: None,
            offset: None,
            unions: Vec::new(),
            bindings: Bindings::new(),
        }
    }

    /// Restore every clause to its default, keeping the table.
    pub fn reset(&mut self) {
        let table = std::mem::take(&mut self.table);
        *self = Self::new(table);
    }
}

impl Default for ClauseModel {
    fn default() -> Self {
        Self::new(String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bindings_flatten_in_category_order() {
        let mut b = Bindings::new();
        b.push(BindingCategory::Having, Value::Int(3));
        b.push(BindingCategory::Where, Value::Int(2));
        b.push(BindingCategory::Select, Value::Int(1));
        b.extend(BindingCategory::Where, [Value::Int(4), Value::Int(5)]);
        assert_eq!(b.len(), 5);
        assert_eq!(
            b.flatten(),
            vec![Value::Int(1), Value::Int(2), Value::Int(4), Value::Int(5), Value::Int(3)]
        );
        assert!(b.get(BindingCategory::Join).is_empty());
    }

    #[test]
    fn test_reset_keeps_table() {
        let mut model = ClauseModel::new("users");
        model.select = "id".into();
        model.limit = Some(3);
        model.bindings.push(BindingCategory::Where, Value::Int(1));
        model.reset();
        assert_eq!(model, ClauseModel::new("users"));
    }

    #[test]
    fn test_placeholder_count() {
        let w = WhereClause::In {
            column: "id".into(),
            values: vec![Value::Int(1), Value::Int(2)],
            boolean: Boolean::And,
        };
        assert_eq!(w.placeholder_count(), 2);
        let w = WhereClause::Null {
            column: "deleted_at".into(),
            boolean: Boolean::Or,
        };
        assert_eq!(w.placeholder_count(), 0);
        assert_eq!(w.boolean(), Boolean::Or);
    }
}
