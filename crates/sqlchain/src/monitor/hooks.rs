use super::types::{HookAction, QueryContext, QueryHook, QueryResult, QueryType};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Runs several hooks in order.
///
/// The first `Abort` wins; later hooks do not see the statement.
#[derive(Default, Clone)]
pub struct CompositeHook {
    hooks: Vec<Arc<dyn QueryHook>>,
}

impl CompositeHook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a hook.
    #[allow(clippy::should_implement_trait)]
    pub fn add<H: QueryHook + 'static>(self, hook: H) -> Self {
        self.add_arc(Arc::new(hook))
    }

    /// Add a hook from an `Arc`.
    pub fn add_arc(mut self, hook: Arc<dyn QueryHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl QueryHook for CompositeHook {
    fn before_query(&self, ctx: &QueryContext) -> HookAction {
        for hook in &self.hooks {
            if let HookAction::Abort(reason) = hook.before_query(ctx) {
                return HookAction::Abort(reason);
            }
        }
        HookAction::Continue
    }

    fn after_query(&self, ctx: &QueryContext, duration: Duration, result: &QueryResult) {
        for hook in &self.hooks {
            hook.after_query(ctx, duration, result);
        }
    }
}

/// Aggregated counters collected by [`StatsHook`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryStats {
    pub total_queries: u64,
    pub failed_queries: u64,
    pub select_count: u64,
    pub rows_returned: u64,
    pub total_duration: Duration,
    pub max_duration: Duration,
    pub slowest_query: Option<String>,
}

/// Hook that counts statements, failures, rows and time spent.
#[derive(Debug, Default)]
pub struct StatsHook {
    total_queries: AtomicU64,
    failed_queries: AtomicU64,
    select_count: AtomicU64,
    rows_returned: AtomicU64,
    total_duration_nanos: AtomicU64,
    max_duration_nanos: AtomicU64,
    slowest_query: Mutex<Option<String>>,
}

impl StatsHook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the counters.
    pub fn stats(&self) -> QueryStats {
        QueryStats {
            total_queries: self.total_queries.load(Ordering::Relaxed),
            failed_queries: self.failed_queries.load(Ordering::Relaxed),
            select_count: self.select_count.load(Ordering::Relaxed),
            rows_returned: self.rows_returned.load(Ordering::Relaxed),
            total_duration: Duration::from_nanos(self.total_duration_nanos.load(Ordering::Relaxed)),
            max_duration: Duration::from_nanos(self.max_duration_nanos.load(Ordering::Relaxed)),
            slowest_query: self
                .slowest_query
                .lock()
                .map(|q| q.clone())
                .unwrap_or_default(),
        }
    }

    /// Reset all counters to zero.
    pub fn reset(&self) {
        self.total_queries.store(0, Ordering::Relaxed);
        self.failed_queries.store(0, Ordering::Relaxed);
        self.select_count.store(0, Ordering::Relaxed);
        self.rows_returned.store(0, Ordering::Relaxed);
        self.total_duration_nanos.store(0, Ordering::Relaxed);
        self.max_duration_nanos.store(0, Ordering::Relaxed);
        if let Ok(mut q) = self.slowest_query.lock() {
            *q = None;
        }
    }
}

impl QueryHook for StatsHook {
    fn after_query(&self, ctx: &QueryContext, duration: Duration, result: &QueryResult) {
        self.total_queries.fetch_add(1, Ordering::Relaxed);
        if ctx.query_type == QueryType::Select {
            self.select_count.fetch_add(1, Ordering::Relaxed);
        }
        match result {
            QueryResult::Rows(n) => {
                self.rows_returned.fetch_add(*n as u64, Ordering::Relaxed);
            }
            QueryResult::Error(_) => {
                self.failed_queries.fetch_add(1, Ordering::Relaxed);
            }
        }

        let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
        self.total_duration_nanos.fetch_add(nanos, Ordering::Relaxed);
        let prev = self.max_duration_nanos.fetch_max(nanos, Ordering::Relaxed);
        if nanos > prev {
            if let Ok(mut q) = self.slowest_query.lock() {
                *q = Some(ctx.sql.clone());
            }
        }
    }
}
