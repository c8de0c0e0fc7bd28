//! `${key}` placeholder interpolation.
//!
//! Substitution is "safe": a placeholder without a value is left as-is and
//! never raises. A second pass then drops every line that still carries a
//! placeholder, so optional clauses vanish when their value is omitted:
//!
//! ```sql
//! SELECT * FROM users
//! WHERE active = 1
//! AND country = '${country}'
//! ```
//!
//! Without a `country` value the `AND` line is removed entirely.

use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::LazyLock;

/// Placeholder names and the values substituted for them.
pub type TemplateVars = HashMap<String, String>;

/// Placeholders a value can be substituted into: ASCII identifiers.
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([_a-zA-Z][_a-zA-Z0-9]*)\}").expect("placeholder pattern is valid")
});

/// Anything placeholder-shaped, substitutable or not, marks a line for removal.
static UNRESOLVED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{\w+\}").expect("unresolved pattern is valid"));

/// Substitutes placeholders and strips lines with unresolved ones.
///
/// Stripping works on whole lines and ignores SQL syntax: a placeholder in a
/// trailing comment removes the statement text on that line as well.
pub fn interpolate(raw: &str, vars: &TemplateVars) -> String {
    let substituted = PLACEHOLDER.replace_all(raw, |caps: &Captures<'_>| {
        match vars.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        }
    });

    substituted
        .split_inclusive('\n')
        .filter(|line| !UNRESOLVED.is_match(line))
        .collect()
}
