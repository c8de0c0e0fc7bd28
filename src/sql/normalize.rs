//! Collapses interpolated SQL into a single executable line.

use regex::Regex;
use std::sync::LazyLock;

static INLINE_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(--|#).*").expect("comment pattern is valid"));

static SPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" +").expect("space pattern is valid"));

/// Produces the single-line statement sent to the database.
///
/// Blank lines and full-line `--`/`#` comments are dropped, inline comments
/// are cut, and each remaining line is trimmed and single-spaced before the
/// lines are joined with one space. Normalizing twice gives the same result.
pub fn normalize(text: &str) -> String {
    text.lines()
        .filter(|line| !is_comment(line) && !is_blank(line))
        .map(|line| normalize_space(strip_inline_comment(line).trim()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Collapses runs of spaces into a single space. Tabs are left alone.
pub fn normalize_space(line: &str) -> String {
    SPACE_RUN.replace_all(line, " ").into_owned()
}

/// Cuts everything from the first `--` or `#` onwards.
///
/// Markers inside string literals are cut too; this is a text filter, not a
/// SQL lexer.
pub fn strip_inline_comment(line: &str) -> &str {
    match INLINE_COMMENT.find(line) {
        Some(m) => &line[..m.start()],
        None => line,
    }
}

/// Returns true when the line holds only whitespace.
pub fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Returns true when the trimmed line starts with a comment marker.
pub fn is_comment(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.starts_with("--") || trimmed.starts_with('#')
}
