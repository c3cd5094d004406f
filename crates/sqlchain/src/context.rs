//! Per-request database context.

use crate::connection::{Connection, Statement};
use crate::error::{DbError, DbResult};
use crate::monitor::{CompositeHook, HookAction, QueryContext, QueryHook, QueryResult};
use crate::qb::SelectQb;
use crate::row::Row;
use crate::value::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A connection plus the hooks that observe it.
///
/// Build one per logical request and pass it to the builders that need it;
/// nothing is cached process-wide. `Db` is itself a [`Connection`], so any
/// builder executes through it:
///
/// ```ignore
/// let db = Db::new(conn).add_hook(TracingSqlHook::new());
/// let rows = db.table("users").where_eq("active", 1).get(&db)?;
/// ```
pub struct Db<C> {
    conn: C,
    hook: Option<Arc<dyn QueryHook>>,
    tag: Option<String>,
}

impl<C: Connection> Db<C> {
    /// Wrap a connection with no hooks.
    pub fn new(conn: C) -> Self {
        Self {
            conn,
            hook: None,
            tag: None,
        }
    }

    /// Set a query hook, replacing any existing one.
    pub fn with_hook<H: QueryHook + 'static>(mut self, hook: H) -> Self {
        self.hook = Some(Arc::new(hook));
        self
    }

    /// Add a query hook.
    ///
    /// If a hook is already set, this composes it with the new hook (existing first).
    pub fn add_hook<H: QueryHook + 'static>(self, hook: H) -> Self {
        self.add_hook_arc(Arc::new(hook))
    }

    /// Add a query hook from an `Arc`.
    pub fn add_hook_arc(mut self, hook: Arc<dyn QueryHook>) -> Self {
        self.hook = Some(match self.hook.take() {
            None => hook,
            Some(existing) => Arc::new(CompositeHook::new().add_arc(existing).add_arc(hook)),
        });
        self
    }

    /// Tag every statement run through this context (shown by hooks).
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Start a SELECT on `table`.
    pub fn table(&self, table: &str) -> SelectQb {
        SelectQb::new(table)
    }

    /// Get a reference to the inner connection.
    pub fn inner(&self) -> &C {
        &self.conn
    }

    /// Get the inner connection, consuming this context.
    pub fn into_inner(self) -> C {
        self.conn
    }
}

impl<C: Connection> Connection for Db<C> {
    type Statement<'conn>
        = MonitoredStatement<'conn, C::Statement<'conn>>
    where
        Self: 'conn;

    fn prepare<'conn>(&'conn self, sql: &str) -> DbResult<Self::Statement<'conn>> {
        let mut ctx = QueryContext::new(sql, 0);
        if let Some(tag) = &self.tag {
            ctx = ctx.with_tag(tag.clone());
        }

        let started = Instant::now();
        match self.conn.prepare(sql) {
            Ok(inner) => Ok(MonitoredStatement {
                inner,
                hook: self.hook.as_deref(),
                ctx,
                elapsed: Duration::ZERO,
            }),
            Err(err) => {
                if let Some(hook) = &self.hook {
                    hook.after_query(&ctx, started.elapsed(), &QueryResult::error(err.to_string()));
                }
                Err(err)
            }
        }
    }
}

/// Statement wrapper that reports to the context's hooks.
pub struct MonitoredStatement<'a, S> {
    inner: S,
    hook: Option<&'a dyn QueryHook>,
    ctx: QueryContext,
    elapsed: Duration,
}

impl<S> MonitoredStatement<'_, S> {
    fn report(&self, result: &QueryResult) {
        if let Some(hook) = self.hook {
            hook.after_query(&self.ctx, self.elapsed, result);
        }
    }

    fn fail(&self, err: DbError) -> DbError {
        self.report(&QueryResult::error(err.to_string()));
        err
    }
}

impl<S: Statement> Statement for MonitoredStatement<'_, S> {
    fn bind(&mut self, index: usize, value: &Value) -> DbResult<()> {
        self.inner.bind(index, value).map_err(|e| self.fail(e))?;
        self.ctx.param_count = self.ctx.param_count.max(index);
        Ok(())
    }

    fn execute(&mut self) -> DbResult<()> {
        if let Some(hook) = self.hook {
            if let HookAction::Abort(reason) = hook.before_query(&self.ctx) {
                return Err(self.fail(DbError::execution(format!("aborted by hook: {reason}"))));
            }
        }

        let started = Instant::now();
        let result = self.inner.execute();
        self.elapsed += started.elapsed();
        result.map_err(|e| self.fail(e))
    }

    fn fetch_all(&mut self) -> DbResult<Vec<Row>> {
        let started = Instant::now();
        let result = self.inner.fetch_all();
        self.elapsed += started.elapsed();
        match result {
            Ok(rows) => {
                self.report(&QueryResult::Rows(rows.len()));
                Ok(rows)
            }
            Err(err) => Err(self.fail(err)),
        }
    }
}
