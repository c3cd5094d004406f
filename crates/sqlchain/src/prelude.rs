//! Convenient imports for typical `sqlchain` usage.
//!
//! ```ignore
//! use sqlchain::prelude::*;
//! ```

pub use crate::{
    Connection, Db, DbConfig, DbError, DbResult, Direction, FromRow, Row, SelectQb, Value, table,
};
