//! Identifier predicate shared by every entity key.

use once_cell::sync::Lazy;
use regex::Regex;

/// Pattern for `resource_id`, `job_id` and `mode_id`.
pub const IDENTIFIER_PATTERN: &str = "^[A-Za-z_][A-Za-z0-9_]*$";

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(IDENTIFIER_PATTERN).expect("identifier pattern is a valid regex"));

/// Whether `id` is a well-formed entity identifier.
pub fn is_valid_identifier(id: &str) -> bool {
    IDENTIFIER.is_match(id)
}
