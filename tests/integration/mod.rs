//! Integration tests for sql-tracer.

pub mod mysql_test;
pub mod pipeline_test;
