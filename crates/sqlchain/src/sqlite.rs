//! SQLite adapter over `rusqlite`.
//!
//! `rusqlite::Connection` implements [`Connection`] directly, so it can be
//! handed to any builder or wrapped in a [`Db`](crate::Db):
//!
//! ```ignore
//! let conn = sqlchain::sqlite::open_in_memory()?;
//! conn.execute_batch("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT)")?;
//! let n = sqlchain::qb::table("users").count(&conn)?;
//! ```
//!
//! SQLite does not accept the `UNION (<query>)` form produced by
//! [`SelectQb::union`](crate::SelectQb::union), nor a LIMIT before `UNION`;
//! such statements fail with [`DbError::Prepare`].

use crate::config::DbConfig;
use crate::connection::{Connection, Statement};
use crate::error::{DbError, DbResult};
use crate::row::Row;
use crate::value::Value;
use rusqlite::types::ValueRef;

/// Path that opens a private in-memory database.
pub const MEMORY: &str = ":memory:";

/// Open the database named by `config.database` (a file path or `:memory:`).
///
/// Host, port and credentials do not apply to SQLite and are ignored.
pub fn open(config: &DbConfig) -> DbResult<rusqlite::Connection> {
    let conn = if config.database == MEMORY {
        rusqlite::Connection::open_in_memory()
    } else {
        rusqlite::Connection::open(&config.database)
    };
    let conn =
        conn.map_err(|e| DbError::ConnectionFailure(format!("{}: {e}", config.database)))?;

    #[cfg(feature = "tracing")]
    tracing::debug!(target: "sqlchain.sql", database = %config.database, "opened sqlite database");

    Ok(conn)
}

/// Open a fresh in-memory database.
pub fn open_in_memory() -> DbResult<rusqlite::Connection> {
    rusqlite::Connection::open_in_memory()
        .map_err(|e| DbError::ConnectionFailure(e.to_string()))
}

/// Prepared SQLite statement; rows are buffered at execution time.
pub struct SqliteStatement<'conn> {
    stmt: rusqlite::Statement<'conn>,
    rows: Option<Vec<Row>>,
}

impl Connection for rusqlite::Connection {
    type Statement<'conn> = SqliteStatement<'conn>;

    fn prepare<'conn>(&'conn self, sql: &str) -> DbResult<SqliteStatement<'conn>> {
        let stmt = rusqlite::Connection::prepare(self, sql)
            .map_err(|e| DbError::prepare(sql, e.to_string()))?;
        Ok(SqliteStatement { stmt, rows: None })
    }
}

impl Statement for SqliteStatement<'_> {
    fn bind(&mut self, index: usize, value: &Value) -> DbResult<()> {
        let result = match value {
            Value::Null => self.stmt.raw_bind_parameter(index, rusqlite::types::Null),
            Value::Bool(v) => self.stmt.raw_bind_parameter(index, *v),
            Value::Int(v) => self.stmt.raw_bind_parameter(index, *v),
            Value::Float(v) => self.stmt.raw_bind_parameter(index, *v),
            Value::Text(v) => self.stmt.raw_bind_parameter(index, v.as_str()),
            Value::Bytes(v) => self.stmt.raw_bind_parameter(index, v.as_slice()),
        };
        result.map_err(|e| DbError::bind(index, e.to_string()))
    }

    fn execute(&mut self) -> DbResult<()> {
        let columns: Vec<String> = self
            .stmt
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect();

        let mut out = Vec::new();
        let mut rows = self.stmt.raw_query();
        while let Some(row) = rows.next().map_err(|e| DbError::execution(e.to_string()))? {
            let mut mapped = Row::new();
            for (i, name) in columns.iter().enumerate() {
                let value = row
                    .get_ref(i)
                    .map_err(|e| DbError::decode(name.as_str(), e.to_string()))?;
                mapped.insert(name.as_str(), from_value_ref(value));
            }
            out.push(mapped);
        }
        self.rows = Some(out);
        Ok(())
    }

    fn fetch_all(&mut self) -> DbResult<Vec<Row>> {
        self.rows
            .take()
            .ok_or_else(|| DbError::execution("fetch_all called before execute"))
    }
}

fn from_value_ref(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(v) => Value::Int(v),
        ValueRef::Real(v) => Value::Float(v),
        ValueRef::Text(bytes) => Value::Text(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::Bytes(bytes.to_vec()),
    }
}
