//! Mock database clients for testing.
//!
//! Provides an in-memory client returning a scripted result and a client
//! that always fails.

use super::{ColumnInfo, DatabaseClient, QueryResult, Row};
use crate::error::{Result, TracerError};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// A mock database client that returns a predefined result.
///
/// Records every executed statement so tests can assert on what was sent
/// and how many times.
#[derive(Debug, Default)]
pub struct MockDatabaseClient {
    result: QueryResult,
    calls: AtomicUsize,
    executed: Mutex<Vec<String>>,
}

impl MockDatabaseClient {
    /// Creates a mock that returns an empty result with no columns.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock that returns the given columns and rows.
    pub fn with_rows(columns: &[&str], rows: Vec<Row>) -> Self {
        let columns = columns
            .iter()
            .map(|name| ColumnInfo::new(*name, "VARCHAR"))
            .collect();
        Self::with_result(QueryResult::with_data(columns, rows))
    }

    /// Creates a mock that returns the given result.
    pub fn with_result(result: QueryResult) -> Self {
        Self {
            result,
            ..Self::default()
        }
    }

    /// Returns how many statements were executed.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Returns the statements executed so far, in order.
    pub fn executed(&self) -> Vec<String> {
        self.executed
            .lock()
            .map(|sqls| sqls.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl DatabaseClient for MockDatabaseClient {
    async fn execute_query(&self, sql: &str) -> Result<QueryResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut executed) = self.executed.lock() {
            executed.push(sql.to_string());
        }
        Ok(self.result.clone())
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// A client whose every statement fails with the given message.
#[derive(Debug)]
pub struct FailingDatabaseClient {
    message: String,
}

impl FailingDatabaseClient {
    /// Creates a client that fails with `message`.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl DatabaseClient for FailingDatabaseClient {
    async fn execute_query(&self, _sql: &str) -> Result<QueryResult> {
        Err(TracerError::query(self.message.clone()))
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
