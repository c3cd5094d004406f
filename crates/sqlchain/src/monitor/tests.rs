use super::*;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

#[test]
fn test_query_type_detection() {
    assert_eq!(QueryType::from_sql("SELECT * FROM users"), QueryType::Select);
    assert_eq!(QueryType::from_sql("  select id FROM users"), QueryType::Select);
    assert_eq!(QueryType::from_sql("(SELECT 1) UNION (SELECT 2)"), QueryType::Select);
    assert_eq!(QueryType::from_sql("PRAGMA foreign_keys = ON"), QueryType::Other);
    assert_eq!(QueryType::from_sql("SEL"), QueryType::Other);
}

#[test]
fn test_truncate_respects_char_boundary() {
    assert_eq!(truncate_sql_bytes("abc", 10), "abc");
    assert_eq!(truncate_sql_bytes("héllo", 2), "h");
}

#[test]
fn test_error_result_truncated() {
    let long = "x".repeat(600);
    match QueryResult::error(long) {
        QueryResult::Error(msg) => {
            assert_eq!(msg.len(), 515);
            assert!(msg.ends_with("..."));
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(QueryResult::Rows(3).to_string(), "3 rows");
}

struct Named(&'static str, Arc<Mutex<Vec<&'static str>>>);

impl QueryHook for Named {
    fn before_query(&self, _ctx: &QueryContext) -> HookAction {
        self.1.lock().unwrap().push(self.0);
        if self.0 == "stop" {
            HookAction::Abort("stopped".into())
        } else {
            HookAction::Continue
        }
    }
}

#[test]
fn test_composite_hook_order_and_abort() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let hook = CompositeHook::new()
        .add(Named("first", calls.clone()))
        .add(Named("stop", calls.clone()))
        .add(Named("never", calls.clone()));
    assert_eq!(hook.len(), 3);

    let ctx = QueryContext::new("SELECT 1", 0);
    assert_eq!(hook.before_query(&ctx), HookAction::Abort("stopped".into()));
    assert_eq!(calls.lock().unwrap().as_slice(), &["first", "stop"]);
}

#[test]
fn test_stats_hook() {
    let stats = StatsHook::new();
    let fast = QueryContext::new("SELECT * FROM a", 0);
    let slow = QueryContext::new("SELECT * FROM b", 1).with_tag("b");

    stats.after_query(&fast, Duration::from_millis(1), &QueryResult::Rows(4));
    stats.after_query(&slow, Duration::from_millis(9), &QueryResult::Rows(1));
    stats.after_query(&fast, Duration::from_millis(2), &QueryResult::error("boom".into()));

    let snapshot = stats.stats();
    assert_eq!(snapshot.total_queries, 3);
    assert_eq!(snapshot.failed_queries, 1);
    assert_eq!(snapshot.select_count, 3);
    assert_eq!(snapshot.rows_returned, 5);
    assert_eq!(snapshot.total_duration, Duration::from_millis(12));
    assert_eq!(snapshot.max_duration, Duration::from_millis(9));
    assert_eq!(snapshot.slowest_query.as_deref(), Some("SELECT * FROM b"));

    stats.reset();
    assert_eq!(stats.stats(), QueryStats::default());
}

#[cfg(feature = "tracing")]
#[test]
fn test_tracing_hook_continues() {
    let hook = TracingSqlHook::new().max_sql_length(8);
    let ctx = QueryContext::new("SELECT * FROM users WHERE id = ?", 1);
    assert_eq!(hook.before_query(&ctx), HookAction::Continue);
    hook.after_query(&ctx, Duration::from_micros(5), &QueryResult::Rows(0));
}
