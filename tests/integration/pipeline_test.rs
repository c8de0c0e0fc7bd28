//! End-to-end pipeline tests.
//!
//! Source file -> interpolation -> normalization -> execution -> report and
//! export, with a mock database client.

use pretty_assertions::assert_eq;
use sql_tracer::db::{MockDatabaseClient, Value};
use sql_tracer::query::Query;
use sql_tracer::sql::TemplateVars;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::tempdir;

const ORDERS_SQL: &str = "\
-- Orders placed by a customer
SELECT id,   total   -- amounts in EUR
FROM orders
WHERE customer_id = ${customer}
AND created_at >= '${since}'
# newest first
ORDER BY id DESC
";

fn vars(pairs: &[(&str, &str)]) -> TemplateVars {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Splits a report into the copied source and the footer lines.
fn split_report<'a>(report: &'a str, source: &str) -> (&'a str, Vec<&'a str>) {
    let (copy, footer) = report.split_at(source.len());
    (copy, footer.lines().collect())
}

#[tokio::test]
async fn test_export_pipeline() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("orders.sql");
    fs::write(&source, ORDERS_SQL).unwrap();

    let client = Arc::new(MockDatabaseClient::with_rows(
        &["id", "total"],
        vec![
            vec![Value::Int(12), Value::from("19.90")],
            vec![Value::Int(7), Value::Null],
        ],
    ));
    let query = Query::new(&source, vars(&[("customer", "42")]), client.clone());

    let out = tempdir().unwrap();
    let (report, export) = query.export(Some(out.path())).await.unwrap();

    // The optional date filter was dropped along with the comments.
    assert_eq!(
        client.executed(),
        vec!["SELECT id, total FROM orders WHERE customer_id = 42 ORDER BY id DESC"]
    );

    let report_name = report.file_name().unwrap().to_string_lossy().into_owned();
    assert!(report_name.ends_with("_orders.sql"), "{report_name}");
    assert_eq!(report.parent(), Some(out.path()));
    assert_eq!(export, report.with_extension("csv"));

    let report_text = fs::read_to_string(&report).unwrap();
    let (copy, footer) = split_report(&report_text, ORDERS_SQL);
    assert_eq!(copy, ORDERS_SQL);
    assert_eq!(footer.len(), 6);
    assert_eq!(footer[0], "");
    assert!(footer[1].starts_with("-- START TIME: "));
    assert!(footer[2].starts_with("-- END TIME: "));
    assert!(footer[3].starts_with("-- DURATION: 0:00:"));
    assert_eq!(footer[4], "-- ROWS COUNT: 2");
    let export_name = export.file_name().unwrap().to_string_lossy().into_owned();
    assert_eq!(footer[5], format!("-- RESULT FILE: {export_name}"));

    assert_eq!(
        fs::read_to_string(&export).unwrap(),
        "\"id\",\"total\"\r\n\"12\",\"19.90\"\r\n\"7\",\"\"\r\n"
    );

    // The source itself is untouched.
    assert_eq!(fs::read_to_string(&source).unwrap(), ORDERS_SQL);
}

#[tokio::test]
async fn test_empty_result_pipeline() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("orders.sql");
    fs::write(&source, ORDERS_SQL).unwrap();

    let client = Arc::new(MockDatabaseClient::with_rows(&["id", "total"], vec![]));
    let query = Query::new(
        &source,
        vars(&[("customer", "1"), ("since", "2024-01-01")]),
        client.clone(),
    );

    let (report, export) = query.export(None).await.unwrap();

    assert_eq!(report.parent(), Some(dir.path()));
    assert!(!export.exists());
    let report_text = fs::read_to_string(&report).unwrap();
    assert!(report_text.ends_with("-- ROWS COUNT: 0\n-- RESULT FILE: None\n"));
    assert_eq!(
        client.executed(),
        vec![
            "SELECT id, total FROM orders WHERE customer_id = 1 AND created_at >= '2024-01-01' ORDER BY id DESC"
        ]
    );
}

#[tokio::test]
async fn test_queries_share_one_client() {
    let dir = tempdir().unwrap();
    let first = dir.path().join("first.sql");
    let second = dir.path().join("second.sql");
    fs::write(&first, "SELECT 1\n").unwrap();
    fs::write(&second, "SELECT 2\n").unwrap();

    let client = Arc::new(MockDatabaseClient::with_rows(&["n"], vec![vec![Value::Int(1)]]));
    let queries = [
        Query::new(&first, TemplateVars::new(), client.clone()),
        Query::new(&second, TemplateVars::new(), client.clone()),
    ];

    for query in &queries {
        query.export(None).await.unwrap();
    }

    assert_eq!(client.executed(), vec!["SELECT 1", "SELECT 2"]);
    // Two reports and two exports next to the two sources.
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 6);
}

#[tokio::test]
async fn test_missing_source_fails_before_execution() {
    let client = Arc::new(MockDatabaseClient::new());
    let query = Query::new(
        Path::new("/nonexistent/dir/query.sql"),
        TemplateVars::new(),
        client.clone(),
    );

    assert!(query.export(None).await.is_err());
    assert_eq!(client.call_count(), 0);
}
