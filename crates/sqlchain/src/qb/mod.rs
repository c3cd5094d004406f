//! Fluent SELECT query builder.
//!
//! Calls accumulate into a [`ClauseModel`]; [`compile_select`] renders it
//! into SQL text with `?` placeholders plus the binding sequence, and the
//! execution methods hand both to a [`Connection`](crate::Connection).
//!
//! # Usage
//!
//! ```ignore
//! use sqlchain::qb;
//!
//! let users = qb::table("users")
//!     .where_eq("active", 1)
//!     .order_by_asc("name")
//!     .limit(10)
//!     .get(&conn)?;
//!
//! let admins = qb::table("users").where_in("role", ["admin", "owner"]).count(&conn)?;
//! ```
//!
//! # WHERE connectors
//!
//! WHERE fragments are joined with the connector of the first condition.
//! `where_(..).or_where(..)` renders `a AND b`, and `or_where(..).where_(..)`
//! renders `a OR b`.

mod clause;
mod compile;
mod select;

pub use clause::{
    BindingCategory, Bindings, Boolean, ClauseModel, Direction, HavingClause, JoinClause,
    JoinKind, OrderClause, WhereClause,
};
pub use compile::{CompiledQuery, compile_select};
pub use select::SelectQb;

/// Create a SELECT query builder for the given table.
///
/// # Example
/// ```ignore
/// let qb = sqlchain::qb::table("users").where_eq("id", 1);
/// ```
pub fn table(table: &str) -> SelectQb {
    SelectQb::new(table)
}
