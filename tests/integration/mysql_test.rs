//! Live MySQL tests.
//!
//! Executes real statements through `MySqlClient` and the full query
//! pipeline. Skipped unless DATABASE_URL points at a MySQL server.

use sql_tracer::config::ConnectionConfig;
use sql_tracer::db::{DatabaseClient, MySqlClient, Value};
use sql_tracer::query::Query;
use sql_tracer::sql::TemplateVars;
use std::fs;
use std::sync::Arc;
use tempfile::tempdir;

/// Helper to get test database URL from environment.
fn get_test_database_url() -> Option<String> {
    std::env::var("DATABASE_URL").ok()
}

/// Helper to create a test client.
async fn get_test_client() -> Option<MySqlClient> {
    let url = get_test_database_url()?;
    let config = ConnectionConfig::from_connection_string(&url).ok()?;
    MySqlClient::connect(&config).await.ok()
}

#[tokio::test]
async fn test_value_conversions() {
    let Some(client) = get_test_client().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let result = client
        .execute_query(
            "SELECT CAST(-5 AS SIGNED) AS i, CAST(5 AS UNSIGNED) AS u, 1.5e0 AS f, \
             CAST('12.50' AS DECIMAL(6,2)) AS d, DATE('1992-03-04') AS day, NULL AS nothing",
        )
        .await
        .unwrap();

    assert_eq!(
        result.column_names(),
        vec!["i", "u", "f", "d", "day", "nothing"]
    );
    let row = &result.rows[0];
    assert_eq!(row[0], Value::Int(-5));
    assert_eq!(row[1], Value::UInt(5));
    assert_eq!(row[2], Value::Float(1.5));
    assert_eq!(row[3], Value::from("12.50"));
    assert_eq!(row[4], Value::from("1992-03-04"));
    assert_eq!(row[5], Value::Null);

    client.close().await.unwrap();
}

#[tokio::test]
async fn test_export_against_mysql() {
    let Some(client) = get_test_client().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };
    let client: Arc<dyn DatabaseClient> = Arc::new(client);

    let dir = tempdir().unwrap();
    let source = dir.path().join("greeting.sql");
    fs::write(
        &source,
        "SELECT 'hello' AS greeting -- say hi\nFROM DUAL\nWHERE ${filter}\n",
    )
    .unwrap();

    let query = Query::new(&source, TemplateVars::new(), client.clone());
    let (report, export) = query.export(None).await.unwrap();

    assert_eq!(
        query.executable_str().unwrap(),
        "SELECT 'hello' AS greeting FROM DUAL"
    );
    assert!(report.is_file());
    assert_eq!(
        fs::read_to_string(export).unwrap(),
        "\"greeting\"\r\n\"hello\"\r\n"
    );

    client.close().await.unwrap();
}

#[tokio::test]
async fn test_values_outside_typed_decoding() {
    let Some(client) = get_test_client().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let result = client
        .execute_query(
            "SELECT CAST('{\"a\": 1}' AS JSON) AS doc, CAST('25:30:00' AS TIME) AS long_time, \
             CAST('-01:00:00' AS TIME) AS negative_time, CAST('09:00:05' AS TIME) AS short_time, \
             CAST(NULL AS JSON) AS no_doc",
        )
        .await
        .unwrap();

    let row: Vec<String> = result.rows[0].iter().map(|v| v.to_csv_field()).collect();
    assert_eq!(
        row,
        vec!["{\"a\": 1}", "1 day, 1:30:00", "-1 day, 23:00:00", "9:00:05", ""]
    );
    assert_eq!(result.rows[0][4], Value::Null);

    client.close().await.unwrap();
}

#[tokio::test]
async fn test_boolean_literals_export_as_numbers() {
    let Some(client) = get_test_client().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let result = client
        .execute_query("SELECT TRUE AS yes, FALSE AS no, b'101' AS bits")
        .await
        .unwrap();

    let row = &result.rows[0];
    assert_eq!(row[0], Value::Int(1));
    assert_eq!(row[1], Value::Int(0));
    assert_eq!(row[2], Value::Bytes(vec![5]));

    client.close().await.unwrap();
}
