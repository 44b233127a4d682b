//! Error types for druid-link.

use thiserror::Error;

/// Errors that can occur while configuring or executing a Druid SQL query.
#[derive(Error, Debug)]
pub enum DruidLinkError {
    /// The client or query was configured incorrectly.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A configuration mutator was invoked after the query executed.
    #[error("{operation} cannot be set because the query has already been executed")]
    AlreadyExecuted {
        /// The operation that was attempted.
        operation: String,
    },

    /// The request failed below the HTTP layer (connection, TLS, DNS, ...).
    #[error("Transport error {code}: {message}")]
    Transport {
        /// Coarse classification of where the failure happened.
        code: String,
        /// Human-readable description from the transport.
        message: String,
    },

    /// The request timed out before a response was received.
    #[error("The query timed out before it could be executed")]
    Timeout,

    /// The server reported a failure executing the query, or returned an
    /// error body we could not interpret.
    #[error("{0}")]
    Query(String),

    /// The response stream ended before its terminating blank line.
    #[error("The query result is incomplete and can't be trusted")]
    ResultTruncated,

    /// A response line violated the expected scalar-array row grammar.
    #[error("The query result could not be parsed: {0}")]
    ResultUnparseable(String),
}

/// Result type for druid-link operations.
pub type Result<T> = std::result::Result<T, DruidLinkError>;
