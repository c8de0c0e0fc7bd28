//! Statement execution with timing capture.
//!
//! Wraps a `DatabaseClient` call with wall-clock timestamps so the report
//! writer can record when the statement ran and how long it took.

use chrono::{Local, NaiveDateTime, SubsecRound, TimeDelta};
use tracing::debug;

use crate::db::{DatabaseClient, Row};
use crate::error::Result;

/// Executes statements on an injected database client.
pub struct QueryExecutor<'a> {
    db: &'a dyn DatabaseClient,
}

impl<'a> QueryExecutor<'a> {
    /// Creates a new query executor.
    pub fn new(db: &'a dyn DatabaseClient) -> Self {
        Self { db }
    }

    /// Runs `sql` and captures its timing, rows and column names.
    ///
    /// Driver errors are returned as-is.
    pub async fn execute(&self, sql: &str) -> Result<ExecutionResult> {
        debug!("Executing: {sql}");

        let execution_start = now();
        let result = self.db.execute_query(sql).await?;
        let execution_end = now();

        let column_names = result.column_names();
        let outcome = ExecutionResult::new(
            execution_start,
            execution_end,
            result.rows,
            column_names,
        );

        debug!(
            "Statement returned {} rows in {}",
            outcome.row_count(),
            outcome.duration
        );
        Ok(outcome)
    }
}

/// Local wall-clock time at microsecond precision.
fn now() -> NaiveDateTime {
    Local::now().naive_local().trunc_subsecs(6)
}

/// Outcome of one statement execution.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionResult {
    /// Local time just before the statement was sent.
    pub execution_start: NaiveDateTime,
    /// Local time just after the statement returned.
    pub execution_end: NaiveDateTime,
    /// `execution_end - execution_start`.
    pub duration: TimeDelta,
    /// Result rows in fetch order.
    pub rows: Vec<Row>,
    /// One name per result column.
    pub column_names: Vec<String>,
}

impl ExecutionResult {
    /// Builds a result, deriving the duration from the two timestamps.
    pub fn new(
        execution_start: NaiveDateTime,
        execution_end: NaiveDateTime,
        rows: Vec<Row>,
        column_names: Vec<String>,
    ) -> Self {
        Self {
            execution_start,
            execution_end,
            duration: execution_end - execution_start,
            rows,
            column_names,
        }
    }

    /// Number of fetched rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}
