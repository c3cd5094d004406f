//! Connection capability consumed by the executor.

use crate::error::DbResult;
use crate::row::Row;
use crate::value::Value;

/// A database connection that can prepare `?`-placeholder statements.
///
/// The executor borrows a connection for the duration of one statement and
/// never manages its lifetime. Anything implementing this trait can run a
/// [`SelectQb`](crate::SelectQb): a driver adapter, the [`Db`](crate::Db)
/// context, or an in-memory double in tests.
pub trait Connection {
    /// Prepared statement type, borrowing the connection.
    type Statement<'conn>: Statement
    where
        Self: 'conn;

    /// Prepare a statement.
    ///
    /// Fails with [`DbError::Prepare`](crate::DbError::Prepare) when the SQL is rejected.
    fn prepare<'conn>(&'conn self, sql: &str) -> DbResult<Self::Statement<'conn>>;
}

/// A borrowed connection is a connection, so a [`Db`](crate::Db) can wrap
/// `&conn` without taking ownership.
impl<C: Connection + ?Sized> Connection for &C {
    type Statement<'conn>
        = C::Statement<'conn>
    where
        Self: 'conn;

    fn prepare<'conn>(&'conn self, sql: &str) -> DbResult<Self::Statement<'conn>> {
        (**self).prepare(sql)
    }
}

/// A prepared statement.
pub trait Statement {
    /// Bind a value to a 1-based placeholder position.
    fn bind(&mut self, index: usize, value: &Value) -> DbResult<()>;

    /// Execute the statement.
    ///
    /// Fails with [`DbError::Execution`](crate::DbError::Execution) on constraint
    /// violations, connectivity loss or type mismatches.
    fn execute(&mut self) -> DbResult<()>;

    /// Return all rows produced by the last execution.
    fn fetch_all(&mut self) -> DbResult<Vec<Row>>;
}

/// Prepare `sql`, bind `bindings` positionally (1-based), execute and fetch.
///
/// No partial results: either every row is returned or the first error is.
pub fn run_query<C: Connection>(
    conn: &C,
    sql: &str,
    bindings: &[Value],
) -> DbResult<Vec<Row>> {
    let mut stmt = conn.prepare(sql)?;
    for (i, value) in bindings.iter().enumerate() {
        stmt.bind(i + 1, value)?;
    }
    stmt.execute()?;
    stmt.fetch_all()
}
