//! Statement hooks for observing SQL execution.
//!
//! Hooks are attached to a [`Db`](crate::Db) context and see every statement
//! it runs:
//!
//! ```rust,ignore
//! use sqlchain::monitor::{StatsHook, TracingSqlHook};
//! use std::sync::Arc;
//!
//! let stats = Arc::new(StatsHook::new());
//! let db = Db::new(conn)
//!     .add_hook(TracingSqlHook::new())
//!     .add_hook_arc(stats.clone());
//!
//! db.table("users").where_eq("active", 1).get(&db)?;
//! println!("{:?}", stats.stats());
//! ```

mod hooks;
#[cfg(feature = "tracing")]
mod tracing_hook;
mod types;

pub use hooks::{CompositeHook, QueryStats, StatsHook};
#[cfg(feature = "tracing")]
pub use tracing_hook::TracingSqlHook;
pub use types::{HookAction, QueryContext, QueryHook, QueryResult, QueryType};

/// Truncate a string to at most `max_bytes`, respecting UTF-8 boundaries.
#[cfg_attr(not(feature = "tracing"), allow(dead_code))]
pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

#[cfg(test)]
mod tests;
