//! Error types for sqlchain

use thiserror::Error;

/// Result type alias for sqlchain operations
pub type DbResult<T> = Result<T, DbError>;

/// Error types for query building and execution
#[derive(Debug, Error)]
pub enum DbError {
    /// A required connection parameter is absent
    #[error("Missing configuration: {0}")]
    MissingConfiguration(String),

    /// A connection parameter is present but its value is unusable
    #[error("Invalid configuration for {key}: {message}")]
    InvalidConfiguration { key: String, message: String },

    /// Underlying connection setup failed
    #[error("Connection failure: {0}")]
    ConnectionFailure(String),

    /// The compiled SQL was rejected when preparing the statement
    #[error("Prepare error: {message} (sql: {sql})")]
    Prepare { sql: String, message: String },

    /// A value could not be bound to its placeholder
    #[error("Bind error at position {index}: {message}")]
    Bind { index: usize, message: String },

    /// Statement execution failed
    #[error("Execution error: {0}")]
    Execution(String),

    /// Builder state violates a compilation contract
    #[error("Malformed query state: {0}")]
    MalformedQueryState(String),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },
}

impl DbError {
    /// Create a missing configuration error for a key
    pub fn missing_config(key: impl Into<String>) -> Self {
        Self::MissingConfiguration(key.into())
    }

    /// Create an invalid configuration error for a key
    pub fn invalid_config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create a prepare error for a statement
    pub fn prepare(sql: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Prepare {
            sql: sql.into(),
            message: message.into(),
        }
    }

    /// Create a bind error for a 1-based placeholder position
    pub fn bind(index: usize, message: impl Into<String>) -> Self {
        Self::Bind {
            index,
            message: message.into(),
        }
    }

    /// Create an execution error
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution(message.into())
    }

    /// Create a malformed query state error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedQueryState(message.into())
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Check if this is a missing configuration error
    pub fn is_missing_configuration(&self) -> bool {
        matches!(self, Self::MissingConfiguration(_))
    }

    /// Check if a configuration value was present but invalid
    pub fn is_invalid_configuration(&self) -> bool {
        matches!(self, Self::InvalidConfiguration { .. })
    }

    /// Check if this is a connection failure
    pub fn is_connection_failure(&self) -> bool {
        matches!(self, Self::ConnectionFailure(_))
    }

    /// Check if the database rejected or failed the statement
    pub fn is_statement_error(&self) -> bool {
        matches!(
            self,
            Self::Prepare { .. } | Self::Bind { .. } | Self::Execution(_)
        )
    }

    /// Check if this is a malformed query state error
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedQueryState(_))
    }
}
