//! Label normalization for domain lookups.

use std::sync::LazyLock;

use regex::Regex;

static NON_ALPHANUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9]").expect("valid regex"));

/// Strips everything except ASCII letters and digits, then lowercases.
///
/// `"Dry Seed (DS)"` and `"Dry Seed DS"` both become `"dryseedds"`.
#[must_use]
pub fn normalize_label(label: &str) -> String {
    NON_ALPHANUMERIC.replace_all(label, "").to_lowercase()
}
