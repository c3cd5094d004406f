//! In-memory connection double for unit tests.

use crate::connection::{Connection, Statement};
use crate::error::{DbError, DbResult};
use crate::row::Row;
use crate::value::Value;
use std::cell::RefCell;

/// Records every statement it sees and answers with canned rows.
#[derive(Default)]
pub struct MockConnection {
    rows: Vec<Row>,
    fail_execute: Option<String>,
    pub log: RefCell<Vec<Executed>>,
}

/// One prepared statement as observed by the mock.
#[derive(Debug, Clone, PartialEq)]
pub struct Executed {
    pub sql: String,
    pub bound: Vec<(usize, Value)>,
    pub executed: bool,
}

impl MockConnection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(rows: Vec<Row>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            fail_execute: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn last(&self) -> Executed {
        self.log.borrow().last().cloned().expect("no statement prepared")
    }
}

pub struct MockStatement<'a> {
    conn: &'a MockConnection,
    index: usize,
    executed: bool,
}

impl Connection for MockConnection {
    type Statement<'conn> = MockStatement<'conn>;

    fn prepare<'conn>(&'conn self, sql: &str) -> DbResult<MockStatement<'conn>> {
        if sql.contains("FORM") {
            return Err(DbError::prepare(sql, "syntax error near FORM"));
        }
        let mut log = self.log.borrow_mut();
        log.push(Executed {
            sql: sql.to_string(),
            bound: Vec::new(),
            executed: false,
        });
        Ok(MockStatement {
            conn: self,
            index: log.len() - 1,
            executed: false,
        })
    }
}

impl Statement for MockStatement<'_> {
    fn bind(&mut self, index: usize, value: &Value) -> DbResult<()> {
        self.conn.log.borrow_mut()[self.index]
            .bound
            .push((index, value.clone()));
        Ok(())
    }

    fn execute(&mut self) -> DbResult<()> {
        if let Some(message) = &self.conn.fail_execute {
            return Err(DbError::execution(message.clone()));
        }
        self.executed = true;
        self.conn.log.borrow_mut()[self.index].executed = true;
        Ok(())
    }

    fn fetch_all(&mut self) -> DbResult<Vec<Row>> {
        if !self.executed {
            return Err(DbError::execution("statement not executed"));
        }
        let sql = self.conn.log.borrow()[self.index].sql.clone();
        let limit = sql
            .split(" LIMIT ")
            .nth(1)
            .and_then(|rest| rest.split_whitespace().next())
            .and_then(|n| n.parse::<usize>().ok());
        let rows = self.conn.rows.iter().take(limit.unwrap_or(usize::MAX));
        Ok(rows.cloned().collect())
    }
}
