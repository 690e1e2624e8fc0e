//! Ordered label/code tables.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::DomainError;
use crate::normalize::normalize_label;

/// One `label -> code` row as written in a domain file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DomainEntry {
    pub label: String,
    pub code: String,
}

#[derive(Debug, Deserialize)]
struct DomainFile {
    #[serde(default)]
    entries: Vec<DomainEntry>,
}

/// A coded-value domain.
///
/// Lookups go through [`normalize_label`]. When two labels normalize to the
/// same key the later entry wins; decoding returns the first label listed
/// for a code.
#[derive(Debug, Clone)]
pub struct DomainTable {
    name: String,
    entries: Vec<DomainEntry>,
    by_label: BTreeMap<String, String>,
}

impl DomainTable {
    #[must_use]
    pub fn from_entries(name: impl Into<String>, entries: Vec<DomainEntry>) -> Self {
        let name = name.into();
        let mut by_label = BTreeMap::new();

        for entry in &entries {
            let key = normalize_label(&entry.label);
            match by_label.insert(key, entry.code.clone()) {
                Some(previous) if previous != entry.code => log::debug!(
                    "{name}: '{}' overrides code {previous} with {}",
                    entry.label,
                    entry.code
                ),
                _ => {}
            }
        }

        Self {
            name,
            entries,
            by_label,
        }
    }

    /// Parses a table from TOML with an `[[entries]]` array of
    /// `label`/`code` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Parse`] if the TOML is malformed.
    pub fn parse(name: &str, toml_str: &str) -> Result<Self, DomainError> {
        let file: DomainFile = toml::from_str(toml_str).map_err(|source| DomainError::Parse {
            name: name.to_string(),
            source,
        })?;
        Ok(Self::from_entries(name, file.entries))
    }

    /// Concatenates tables in order into a single lookup.
    #[must_use]
    pub fn chain(name: impl Into<String>, tables: &[&Self]) -> Self {
        let entries = tables
            .iter()
            .flat_map(|t| t.entries.iter().cloned())
            .collect();
        Self::from_entries(name, entries)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn entries(&self) -> &[DomainEntry] {
        &self.entries
    }

    /// Number of distinct normalized labels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_label.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_label.is_empty()
    }

    /// Returns the code for a free-text label.
    #[must_use]
    pub fn lookup(&self, label: &str) -> Option<&str> {
        self.by_label
            .get(&normalize_label(label))
            .map(String::as_str)
    }

    /// Returns the first label listed for a numeric code.
    #[must_use]
    pub fn decode(&self, code: i64) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.code.trim().parse::<i64>().ok() == Some(code))
            .map(|e| e.label.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(label: &str, code: &str) -> DomainEntry {
        DomainEntry {
            label: label.to_string(),
            code: code.to_string(),
        }
    }

    #[test]
    fn later_duplicate_wins_on_lookup() {
        let table = DomainTable::from_entries(
            "lines",
            vec![entry("Division Break", "89"), entry("Division-Break", "12")],
        );
        assert_eq!(table.lookup("division break"), Some("12"));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn decode_uses_first_label() {
        let table = DomainTable::from_entries(
            "points",
            vec![entry("Dry Seed DS", "19"), entry("Dry Seed (DS)", "19")],
        );
        assert_eq!(table.decode(19), Some("Dry Seed DS"));
        assert_eq!(table.decode(20), None);
    }

    #[test]
    fn parses_entries_array() {
        let table = DomainTable::parse(
            "slope",
            r#"
            [[entries]]
            label = "0 to 15"
            code = "0"

            [[entries]]
            label = "above 35"
            code = "3"
            "#,
        )
        .unwrap();
        assert_eq!(table.lookup("Above 35"), Some("3"));
        assert_eq!(table.entries().len(), 2);
    }

    #[test]
    fn malformed_toml_names_the_table() {
        let err = DomainTable::parse("broken", "[[entries]]\nlabel = 3").unwrap_err();
        assert!(err.to_string().contains("broken"));
    }

    #[test]
    fn chain_preserves_order_for_overrides() {
        let rl = DomainTable::from_entries("rl", vec![entry("Division Break", "89")]);
        let fl = DomainTable::from_entries("fl", vec![entry("Division Break", "12")]);
        assert_eq!(
            DomainTable::chain("combined", &[&rl, &fl]).lookup("Division Break"),
            Some("12")
        );
        assert_eq!(
            DomainTable::chain("combined", &[&fl, &rl]).lookup("Division Break"),
            Some("89")
        );
    }
}
