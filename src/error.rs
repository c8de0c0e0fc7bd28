//! Error types for sql-tracer.
//!
//! Defines the main error enum used throughout the application.

use thiserror::Error;

/// Main error type for sql-tracer operations.
#[derive(Error, Debug)]
pub enum TracerError {
    /// Database connection errors (host unreachable, auth failed, etc.)
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query execution errors reported outside the driver.
    #[error("Query error: {0}")]
    Query(String),

    /// Configuration errors (invalid config file, bad arguments, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Keyring and password prompt errors.
    #[error("Secret storage error: {0}")]
    Secret(String),

    /// Internal application errors (unexpected states, bugs, etc.)
    #[error("Internal error: {0}")]
    Internal(String),

    /// Source file and report file I/O.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Errors raised by the database driver while executing a statement.
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    /// Errors raised while writing the CSV export.
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl TracerError {
    /// Creates a connection error with the given message.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a query error with the given message.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a secret storage error with the given message.
    pub fn secret(msg: impl Into<String>) -> Self {
        Self::Secret(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Connection(_) => "Connection Error",
            Self::Query(_) | Self::Database(_) => "Query Error",
            Self::Config(_) => "Configuration Error",
            Self::Secret(_) => "Secret Storage Error",
            Self::Internal(_) => "Internal Error",
            Self::Io(_) => "I/O Error",
            Self::Csv(_) => "Export Error",
        }
    }
}

/// Result type alias using TracerError.
pub type Result<T> = std::result::Result<T, TracerError>;
