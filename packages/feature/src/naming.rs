//! Feature class naming rules.

use std::sync::LazyLock;

use regex::Regex;

/// Runs of characters that are not letters, digits or underscores.
static INVALID_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w]+").expect("valid regex"));

/// Turns an arbitrary file stem into a valid feature class name.
///
/// Each run of invalid characters becomes a single `_`, and a name that does
/// not start with a letter or underscore gets a leading `_`.
#[must_use]
pub fn sanitize_name(name: &str) -> String {
    let sanitized = INVALID_RUN.replace_all(name, "_").into_owned();
    match sanitized.chars().next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => sanitized,
        _ => format!("_{sanitized}"),
    }
}

/// Returns `base` if `taken` rejects it, otherwise `base_1`, `base_2`, ...
/// until a free name is found.
pub fn unique_name(base: &str, mut taken: impl FnMut(&str) -> bool) -> String {
    if !taken(base) {
        return base.to_string();
    }
    (1_u32..)
        .map(|i| format!("{base}_{i}"))
        .find(|candidate| !taken(candidate))
        .unwrap_or_else(|| base.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_invalid_runs_with_single_underscore() {
        assert_eq!(sanitize_name("Track log - day 2"), "Track_log_day_2");
        assert_eq!(sanitize_name("lines(v2).final"), "lines_v2_final");
    }

    #[test]
    fn prefixes_names_starting_with_digit() {
        assert_eq!(sanitize_name("2024 points"), "_2024_points");
        assert_eq!(sanitize_name("-lines"), "_lines");
    }

    #[test]
    fn keeps_valid_names() {
        assert_eq!(sanitize_name("C50903_Points"), "C50903_Points");
    }

    #[test]
    fn unique_name_appends_counter() {
        let existing = ["pts", "pts_1"];
        assert_eq!(unique_name("pts", |n| existing.contains(&n)), "pts_2");
        assert_eq!(unique_name("lines", |n| existing.contains(&n)), "lines");
    }
}
