//! SQL text processing.
//!
//! Turns a raw SQL file into the single-line statement sent to the database:
//! placeholders are interpolated first, then comments and layout are removed.

mod normalize;
mod template;

pub use normalize::{is_blank, is_comment, normalize, normalize_space, strip_inline_comment};
pub use template::{interpolate, TemplateVars};
