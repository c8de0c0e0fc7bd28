//! SQL file queries.
//!
//! A [`Query`] wraps one source file and its template values. The source file
//! is never modified. Derived values are computed on first access and cached
//! for the lifetime of the query:
//!
//! - [`Query::interpolated`] reads the file and resolves placeholders,
//! - [`Query::executable_str`] normalizes that text into one line,
//! - [`Query::result`] executes the statement. This hits the database, so
//!   the first call is not free.

pub mod executor;

pub use executor::{ExecutionResult, QueryExecutor};

use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use tokio::sync::OnceCell;

use crate::db::DatabaseClient;
use crate::error::Result;
use crate::report;
use crate::sql::{interpolate, normalize, TemplateVars};

/// A SQL statement loaded from a file.
pub struct Query {
    source: PathBuf,
    name: String,
    template_vars: TemplateVars,
    client: Arc<dyn DatabaseClient>,
    interpolated: OnceLock<String>,
    executable_str: OnceLock<String>,
    result: OnceCell<ExecutionResult>,
}

impl Query {
    /// Creates a query for `source`, executed on `client` when needed.
    pub fn new(
        source: impl Into<PathBuf>,
        template_vars: TemplateVars,
        client: Arc<dyn DatabaseClient>,
    ) -> Self {
        let source = source.into();
        let name = source
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            source,
            name,
            template_vars,
            client,
            interpolated: OnceLock::new(),
            executable_str: OnceLock::new(),
            result: OnceCell::new(),
        }
    }

    /// Path of the source file.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Source file name without its extension.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Template values substituted into the source.
    pub fn template_vars(&self) -> &TemplateVars {
        &self.template_vars
    }

    /// Source text with placeholders resolved and unresolved lines removed.
    pub fn interpolated(&self) -> Result<&str> {
        if let Some(text) = self.interpolated.get() {
            return Ok(text.as_str());
        }
        let raw = std::fs::read_to_string(&self.source)?;
        let text = interpolate(&raw, &self.template_vars);
        Ok(self.interpolated.get_or_init(|| text).as_str())
    }

    /// Single-line statement sent to the database.
    pub fn executable_str(&self) -> Result<&str> {
        if let Some(sql) = self.executable_str.get() {
            return Ok(sql.as_str());
        }
        let sql = normalize(self.interpolated()?);
        Ok(self.executable_str.get_or_init(|| sql).as_str())
    }

    /// Result of executing the statement. Executes it on first call.
    pub async fn result(&self) -> Result<&ExecutionResult> {
        self.result
            .get_or_try_init(|| async move {
                let sql = self.executable_str()?;
                QueryExecutor::new(self.client.as_ref()).execute(sql).await
            })
            .await
    }

    /// Writes the report and CSV export, executing the statement if needed.
    ///
    /// Returns `(report_path, export_path)`; see [`report::write`].
    pub async fn export(&self, destination: Option<&Path>) -> Result<(PathBuf, PathBuf)> {
        let result = self.result().await?;
        report::write(&self.source, result, destination)
    }

    /// Prints the statement and its results to standard output.
    pub async fn display(&self) -> Result<()> {
        let mut buf = Vec::new();
        self.display_to(&mut buf).await?;
        io::stdout().lock().write_all(&buf)?;
        Ok(())
    }

    /// Writes the display output of [`Query::display`] to `out`.
    pub async fn display_to<W: Write>(&self, out: &mut W) -> Result<()> {
        let result = self.result().await?;

        writeln!(out, "source: {}", self.source.display())?;
        writeln!(out, "sql: {}", self.executable_str()?)?;
        writeln!(
            out,
            "execution time: {}",
            report::format_duration(result.duration)
        )?;
        writeln!(out, "rows count: {}", result.row_count())?;
        writeln!(out, "columns: ({})", result.column_names.join(", "))?;
        for row in &result.rows {
            let values: Vec<String> = row.iter().map(|v| v.to_display_string()).collect();
            writeln!(out, "({})", values.join(", "))?;
        }
        Ok(())
    }
}

impl fmt::Debug for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("source", &self.source)
            .field("name", &self.name)
            .field("template_vars", &self.template_vars)
            .field("interpolated", &self.interpolated.get())
            .field("executable_str", &self.executable_str.get())
            .field("result", &self.result.get())
            .finish_non_exhaustive()
    }
}
