//! sql-tracer - run SQL files against MySQL and keep a trace of each run.
//!
//! This library exposes the core modules for use by the binary and in
//! integration tests.

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod query;
pub mod report;
pub mod secrets;
pub mod sql;
