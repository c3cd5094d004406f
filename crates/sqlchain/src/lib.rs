//! # sqlchain
//!
//! A lightweight fluent SELECT builder for relational databases.
//!
//! ## Features
//!
//! - **Fluent clauses**: `select`, `where_`, `where_in`, `join`, `group_by`,
//!   `having`, `order_by`, `limit`/`offset`, `union`
//! - **Positional bindings**: SQL uses `?` placeholders; bindings are kept per
//!   clause category and flattened in placeholder order
//! - **Pure compilation**: [`qb::compile_select`] turns the clause model into SQL
//!   without touching a connection
//! - **Pluggable connections**: anything implementing [`Connection`] executes
//!   queries; `rusqlite::Connection` does out of the box (`sqlite` feature)
//! - **Query hooks**: observe or veto statements through a [`Db`] context
//!
//! ## Query Builder (qb)
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
//! let total = qb::table("orders").where_in("status", ["paid", "shipped"]).sum(&conn, "total")?;
//! ```

pub mod config;
pub mod connection;
pub mod context;
pub mod error;
pub mod monitor;
pub mod prelude;
pub mod qb;
pub mod row;
pub mod value;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::{DbConfig, EnvSource};
pub use connection::{Connection, Statement, run_query};
pub use context::{Db, MonitoredStatement};
pub use error::{DbError, DbResult};
pub use monitor::{
    CompositeHook, HookAction, QueryContext, QueryHook, QueryResult, QueryStats, QueryType,
    StatsHook,
};
#[cfg(feature = "tracing")]
pub use monitor::TracingSqlHook;
pub use qb::{CompiledQuery, Direction, SelectQb, table};
pub use row::{FromRow, Row};
pub use value::{FromValue, Value};
