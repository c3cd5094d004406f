use std::fmt;
use std::time::Duration;

/// The type of SQL statement being executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryType {
    /// SELECT query (including `(SELECT ...) UNION ...` forms)
    Select,
    /// Anything else passed through a raw connection
    Other,
}

impl QueryType {
    /// Detect query type from the SQL string.
    pub fn from_sql(sql: &str) -> Self {
        let trimmed = sql.trim_start().trim_start_matches('(').trim_start();
        let is_select = trimmed
            .get(..6)
            .is_some_and(|kw| kw.eq_ignore_ascii_case("SELECT"));
        if is_select {
            QueryType::Select
        } else {
            QueryType::Other
        }
    }
}

/// Context information about the statement being executed.
#[derive(Debug, Clone)]
pub struct QueryContext {
    /// SQL sent to the connection.
    pub sql: String,
    /// Number of values bound so far.
    pub param_count: usize,
    /// Detected query type.
    pub query_type: QueryType,
    /// Optional name identifying the call site.
    pub tag: Option<String>,
}

impl QueryContext {
    /// Create a new query context.
    pub fn new(sql: &str, param_count: usize) -> Self {
        Self {
            sql: sql.to_string(),
            param_count,
            query_type: QueryType::from_sql(sql),
            tag: None,
        }
    }

    /// Add a tag to identify this query.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }
}

/// Maximum length for error messages in `QueryResult::Error`.
const MAX_ERROR_LEN: usize = 512;

/// Outcome of a statement, as reported to hooks.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    /// Statement executed and returned this many rows.
    Rows(usize),
    /// Statement failed (message truncated to 512 bytes).
    Error(String),
}

impl QueryResult {
    /// Create an error result, truncating the message.
    pub fn error(msg: String) -> Self {
        if msg.len() > MAX_ERROR_LEN {
            Self::Error(format!("{}...", super::truncate_sql_bytes(&msg, MAX_ERROR_LEN)))
        } else {
            Self::Error(msg)
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, QueryResult::Error(_))
    }
}

impl fmt::Display for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryResult::Rows(n) => write!(f, "{n} rows"),
            QueryResult::Error(e) => write!(f, "error: {e}"),
        }
    }
}

/// Action to take after a hook inspects a statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookAction {
    /// Execute the statement.
    Continue,
    /// Refuse to execute; surfaces as an execution error.
    Abort(String),
}

/// Trait for hooking into the statement lifecycle.
///
/// `before_query` runs once all values are bound, right before execution;
/// `after_query` runs when rows are fetched or execution fails.
pub trait QueryHook: Send + Sync {
    fn before_query(&self, ctx: &QueryContext) -> HookAction {
        let _ = ctx;
        HookAction::Continue
    }

    fn after_query(&self, _ctx: &QueryContext, _duration: Duration, _result: &QueryResult) {}
}
