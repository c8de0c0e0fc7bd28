//! MySQL database client implementation.
//!
//! Provides the `MySqlClient` struct that implements the `DatabaseClient` trait
//! for MySQL and MariaDB servers using sqlx.

use crate::config::ConnectionConfig;
use crate::db::{ColumnInfo, DatabaseClient, QueryResult, Row, Value};
use crate::error::{Result, TracerError};
use crate::report::format_duration;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use sqlx::mysql::{MySql, MySqlColumn, MySqlPool, MySqlPoolOptions, MySqlRow};
use sqlx::{Column as SqlxColumn, Decode, Executor, Row as SqlxRow, Statement, Type, TypeInfo};
use std::time::Duration;
use tracing::{debug, warn};

/// MySQL database client.
#[derive(Debug)]
pub struct MySqlClient {
    pool: MySqlPool,
}

impl MySqlClient {
    /// Connects to the server described by `config`.
    ///
    /// A single attempt is made; failures are reported with a readable
    /// message.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let conn_str = config.to_connection_string()?;

        let pool = MySqlPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(10))
            .connect(&conn_str)
            .await
            .map_err(|e| map_connection_error(e, config))?;

        debug!("Connected to {}", config.display_string());
        Ok(Self { pool })
    }
}

#[async_trait]
impl DatabaseClient for MySqlClient {
    async fn execute_query(&self, sql: &str) -> Result<QueryResult> {
        // One connection per statement, released when `conn` drops.
        let mut conn = self.pool.acquire().await?;

        let result: Vec<MySqlRow> = sqlx::query(sql).fetch_all(&mut *conn).await?;

        let columns = match result.first() {
            Some(first_row) => column_info(first_row.columns()),
            None => match (&mut *conn).prepare(sql).await {
                Ok(statement) => column_info(statement.columns()),
                Err(e) => {
                    warn!("Could not read column metadata for empty result: {e}");
                    Vec::new()
                }
            },
        };

        let rows: Vec<Row> = result.iter().map(|row| convert_row(row, &columns)).collect();
        debug!("Fetched {} rows, {} columns", rows.len(), columns.len());

        Ok(QueryResult { columns, rows })
    }

    async fn close(&self) -> Result<()> {
        self.pool.close().await;
        Ok(())
    }
}

fn column_info(columns: &[MySqlColumn]) -> Vec<ColumnInfo> {
    columns
        .iter()
        .map(|col| ColumnInfo::new(col.name(), col.type_info().name()))
        .collect()
}

/// Converts a sqlx MySqlRow to our Row type, using the column types read
/// alongside the result.
fn convert_row(row: &MySqlRow, columns: &[ColumnInfo]) -> Row {
    columns
        .iter()
        .enumerate()
        .map(|(i, col)| convert_value(row, i, &col.data_type))
        .collect()
}

/// Converts a single column value from a MySqlRow to our Value type.
///
/// NULL is only produced for SQL NULL. A value the typed decoder rejects
/// (JSON documents, zero dates) falls back to its raw bytes.
fn convert_value(row: &MySqlRow, index: usize, type_name: &str) -> Value {
    let type_name = type_name.to_uppercase();

    if type_name.ends_with("UNSIGNED") {
        return decode(row, index, Value::UInt);
    }

    match type_name.as_str() {
        // TINYINT(1) is reported as BOOLEAN but exported as its number.
        "BOOLEAN" | "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => {
            decode(row, index, Value::Int)
        }

        "YEAR" => match row.try_get_unchecked::<Option<u16>, _>(index) {
            Ok(v) => v.map(|year| Value::UInt(year as u64)).into(),
            Err(e) => raw_value(row, index, &e),
        },

        "FLOAT" => decode(row, index, |v: f32| Value::Float(v as f64)),

        "DOUBLE" => decode(row, index, Value::Float),

        // Sent as text on the wire; read it without a type check.
        "DECIMAL" => match row.try_get_unchecked::<Option<String>, _>(index) {
            Ok(v) => v.into(),
            Err(e) => raw_value(row, index, &e),
        },

        "DATE" => decode(row, index, |v: NaiveDate| Value::String(v.to_string())),

        // TIME is an interval: it may be negative or exceed 24 hours.
        "TIME" => decode(row, index, |v: TimeDelta| Value::String(format_duration(v))),

        "DATETIME" | "TIMESTAMP" => {
            decode(row, index, |v: NaiveDateTime| Value::String(v.to_string()))
        }

        "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" | "BIT"
        | "GEOMETRY" => match row.try_get_unchecked::<Option<Vec<u8>>, _>(index) {
            Ok(v) => v.into(),
            Err(e) => {
                warn!("Column {index} ({type_name}) could not be read: {e}");
                Value::Null
            }
        },

        // For all other types, try to get as string
        _ => decode(row, index, Value::String),
    }
}

/// Decodes a nullable column as `T`, falling back to the raw value when the
/// column does not decode as `T`.
fn decode<'r, T>(row: &'r MySqlRow, index: usize, map: impl FnOnce(T) -> Value) -> Value
where
    T: Decode<'r, MySql> + Type<MySql>,
{
    match row.try_get::<Option<T>, _>(index) {
        Ok(Some(v)) => map(v),
        Ok(None) => Value::Null,
        Err(e) => raw_value(row, index, &e),
    }
}

/// Reads the column's bytes as they came off the wire, as lossy UTF-8.
fn raw_value(row: &MySqlRow, index: usize, error: &sqlx::Error) -> Value {
    match row.try_get_unchecked::<Option<Vec<u8>>, _>(index) {
        Ok(Some(bytes)) => {
            debug!("Column {index} kept as raw text: {error}");
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        }
        Ok(None) => Value::Null,
        Err(raw_error) => {
            warn!("Column {index} could not be decoded: {error} ({raw_error})");
            Value::Null
        }
    }
}

/// Maps sqlx connection errors to user-friendly messages.
fn map_connection_error(error: sqlx::Error, config: &ConnectionConfig) -> TracerError {
    let host = config.host.as_deref().unwrap_or("localhost");
    let port = config.port;
    let user = config.user.as_deref().unwrap_or("unknown");
    let database = config.database.as_deref().unwrap_or("unknown");

    let error_str = error.to_string().to_lowercase();

    if error_str.contains("connection refused") || error_str.contains("could not connect") {
        TracerError::connection(format!(
            "Cannot connect to {host}:{port}. Check that the server is running."
        ))
    } else if error_str.contains("access denied") {
        TracerError::connection(format!(
            "Access denied for user '{user}'. Check your credentials or use --ask-password."
        ))
    } else if error_str.contains("unknown database") {
        TracerError::connection(format!("Database '{database}' does not exist."))
    } else if error_str.contains("timed out") || error_str.contains("timeout") {
        TracerError::connection(format!(
            "Connection to {host}:{port} timed out. The server may be overloaded or unreachable."
        ))
    } else {
        TracerError::connection(error.to_string())
    }
}
