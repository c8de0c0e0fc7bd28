//! Execution reports and CSV exports.
//!
//! For a source file `sample-query.sql` executed at `1992-03-04T11:00:05.654321`
//! two files are produced:
//!
//! - `1992-03-04T11-00-05_sample-query.sql`: the untouched source followed by
//!   a footer recording start, end, duration, row count and export file name.
//! - `1992-03-04T11-00-05_sample-query.csv`: the rows, every field quoted.
//!   Only written when the statement returned at least one row.
//!
//! Names have second precision, so exporting the same file twice within one
//! second overwrites the first pair.

use chrono::{NaiveDateTime, TimeDelta, Timelike};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{Result, TracerError};
use crate::query::ExecutionResult;

/// Marker written in place of the export name when there are no rows.
const NO_EXPORT: &str = "None";

/// Writes the report and, when rows exist, the CSV export.
///
/// Returns `(report_path, export_path)`. `export_path` is returned even when
/// no export was written. Files go to `destination` when given, otherwise
/// next to `source`.
pub fn write(
    source: &Path,
    result: &ExecutionResult,
    destination: Option<&Path>,
) -> Result<(PathBuf, PathBuf)> {
    let (report_path, export_path) = artifact_paths(source, result, destination)?;

    // Byte copy of the source. Permissions are not carried over.
    let mut report = File::create(&report_path)?;
    io::copy(&mut File::open(source)?, &mut report)?;
    debug!("Copied {} to {}", source.display(), report_path.display());

    let export_name = if result.row_count() > 0 {
        export_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
    } else {
        None
    };

    report.write_all(footer(result, export_name.as_deref()).as_bytes())?;
    report.flush()?;
    info!("Report written to {}", report_path.display());

    if result.row_count() > 0 {
        write_export(&export_path, result)?;
        info!(
            "Exported {} rows to {}",
            result.row_count(),
            export_path.display()
        );
    }

    Ok((report_path, export_path))
}

/// Computes where the report and the export of `source` are written.
pub fn artifact_paths(
    source: &Path,
    result: &ExecutionResult,
    destination: Option<&Path>,
) -> Result<(PathBuf, PathBuf)> {
    let file_name = source.file_name().ok_or_else(|| {
        TracerError::internal(format!("Source path has no file name: {}", source.display()))
    })?;

    let directory = match destination {
        Some(dir) => dir,
        None => source.parent().unwrap_or_else(|| Path::new("")),
    };

    let mut report_name = file_prefix(&result.execution_start);
    report_name.push_str(&file_name.to_string_lossy());

    let report_path = directory.join(report_name);
    let export_path = report_path.with_extension("csv");

    Ok((report_path, export_path))
}

/// Renders the footer appended to the report.
pub fn footer(result: &ExecutionResult, export_name: Option<&str>) -> String {
    format!(
        "\n-- START TIME: {}\n-- END TIME: {}\n-- DURATION: {}\n-- ROWS COUNT: {}\n-- RESULT FILE: {}\n",
        isoformat(&result.execution_start),
        isoformat(&result.execution_end),
        format_duration(result.duration),
        result.row_count(),
        export_name.unwrap_or(NO_EXPORT),
    )
}

fn write_export(path: &Path, result: &ExecutionResult) -> Result<()> {
    let file = BufWriter::new(File::create(path)?);
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::CRLF)
        .from_writer(file);

    writer.write_record(&result.column_names)?;
    for row in &result.rows {
        writer.write_record(row.iter().map(|value| value.to_csv_field()))?;
    }
    writer.flush()?;
    Ok(())
}

/// `YYYY-MM-DDTHH-MM-SS_`, the prefix shared by both artifact names.
pub fn file_prefix(timestamp: &NaiveDateTime) -> String {
    timestamp.format("%Y-%m-%dT%H-%M-%S_").to_string()
}

/// ISO-8601 timestamp; the fraction is only shown when non-zero.
pub fn isoformat(timestamp: &NaiveDateTime) -> String {
    let micros = timestamp.nanosecond() / 1_000;
    let mut out = timestamp.format("%Y-%m-%dT%H:%M:%S").to_string();
    if micros != 0 {
        out.push_str(&format!(".{micros:06}"));
    }
    out
}

/// Renders a duration as `[D day[s], ]H:MM:SS[.ffffff]`.
///
/// Negative durations (clock moved backwards) borrow a negative day count so
/// the clock part stays positive, e.g. `-1 day, 23:59:59.500000`.
pub fn format_duration(duration: TimeDelta) -> String {
    const MICROS_PER_DAY: i64 = 86_400 * 1_000_000;

    let total = duration.num_microseconds().unwrap_or(i64::MAX);
    let days = total.div_euclid(MICROS_PER_DAY);
    let rest = total.rem_euclid(MICROS_PER_DAY);

    let micros = rest % 1_000_000;
    let seconds = rest / 1_000_000;
    let (hours, minutes, seconds) = (seconds / 3600, seconds / 60 % 60, seconds % 60);

    let mut out = String::new();
    if days != 0 {
        let plural = if days.abs() == 1 { "" } else { "s" };
        out.push_str(&format!("{days} day{plural}, "));
    }
    out.push_str(&format!("{hours}:{minutes:02}:{seconds:02}"));
    if micros != 0 {
        out.push_str(&format!(".{micros:06}"));
    }
    out
}
