//! Domain registry: the coded-value tables baked into the binary.
//!
//! Each `.toml` file in `packages/domain/domains/` is embedded at compile
//! time via [`include_str!`] and parsed once on first use.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::table::DomainTable;

/// The coded-value domains used by the rehab feature classes.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DomainKind {
    /// Rehab point treatment (`RPtType`, `RPtType2`, `RPtType3`).
    PointTreatment,
    /// Rehab line treatment (`RLType`, `RLType2`/`RLType_2`, ...).
    LineTreatment,
    /// Fire line type (`FLType`, `FLType2`).
    FireLine,
    /// Line width class (`LineWidth`).
    LineWidth,
    /// Average slope class (`AvgSlope`).
    AvgSlope,
}

impl DomainKind {
    pub const ALL: &[Self] = &[
        Self::PointTreatment,
        Self::LineTreatment,
        Self::FireLine,
        Self::LineWidth,
        Self::AvgSlope,
    ];

    const fn source(self) -> &'static str {
        match self {
            Self::PointTreatment => include_str!("../domains/point_treatment.toml"),
            Self::LineTreatment => include_str!("../domains/line_treatment.toml"),
            Self::FireLine => include_str!("../domains/fire_line.toml"),
            Self::LineWidth => include_str!("../domains/line_width.toml"),
            Self::AvgSlope => include_str!("../domains/avg_slope.toml"),
        }
    }
}

static TABLES: LazyLock<BTreeMap<DomainKind, DomainTable>> = LazyLock::new(|| {
    DomainKind::ALL
        .iter()
        .map(|kind| {
            let table = DomainTable::parse(kind.as_ref(), kind.source())
                .unwrap_or_else(|e| panic!("Failed to parse {kind}.toml: {e}"));
            (*kind, table)
        })
        .collect()
});

static LINE_CODES: LazyLock<DomainTable> = LazyLock::new(|| {
    DomainTable::chain(
        "line_codes",
        &[
            table(DomainKind::LineTreatment),
            table(DomainKind::FireLine),
            table(DomainKind::LineWidth),
            table(DomainKind::AvgSlope),
        ],
    )
});

/// Returns an embedded domain table.
///
/// # Panics
///
/// Panics if an embedded TOML file is malformed (the files ship with the
/// crate, so this is caught by the tests below).
#[must_use]
pub fn table(kind: DomainKind) -> &'static DomainTable {
    &TABLES[&kind]
}

/// The single lookup used to translate every line domain field.
///
/// Line treatment, fire line, width and slope entries are concatenated in
/// that order, so a label shared by two lists resolves to the later list's
/// code ("Division Break" becomes the fire line code 12, not the treatment
/// code 89).
#[must_use]
pub fn line_codes() -> &'static DomainTable {
    &LINE_CODES
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPECTED_ENTRY_COUNTS: &[(DomainKind, usize)] = &[
        (DomainKind::PointTreatment, 88),
        (DomainKind::LineTreatment, 28),
        (DomainKind::FireLine, 45),
        (DomainKind::LineWidth, 5),
        (DomainKind::AvgSlope, 4),
    ];

    #[test]
    fn loads_all_tables() {
        for (kind, count) in EXPECTED_ENTRY_COUNTS {
            assert_eq!(table(*kind).entries().len(), *count, "{kind}");
        }
    }

    #[test]
    fn point_punctuation_variants_share_a_code() {
        let points = table(DomainKind::PointTreatment);
        assert_eq!(points.lookup("Dry Seed (DS)"), Some("19"));
        assert_eq!(points.lookup("Dry Seed DS"), Some("19"));
        assert_eq!(points.lookup("dry seed ds"), Some("19"));
    }

    #[test]
    fn point_lookup_misses_unknown_labels() {
        assert_eq!(table(DomainKind::PointTreatment).lookup("Helipad"), None);
    }

    #[test]
    fn division_break_resolves_to_fire_line_code() {
        assert_eq!(table(DomainKind::LineTreatment).lookup("Division Break"), Some("89"));
        assert_eq!(line_codes().lookup("Division Break"), Some("12"));
    }

    #[test]
    fn line_codes_cover_width_and_slope() {
        assert_eq!(line_codes().lookup("20m and wider"), Some("4"));
        assert_eq!(line_codes().lookup("above 35"), Some("3"));
        assert_eq!(line_codes().lookup("Steep Slopes >35% (SS)"), Some("10"));
        assert_eq!(line_codes().lookup("Trail TR"), Some("34"));
    }

    #[test]
    fn decode_returns_first_listed_label() {
        assert_eq!(table(DomainKind::PointTreatment).decode(19), Some("Dry Seed DS"));
        assert_eq!(table(DomainKind::LineTreatment).decode(1), Some("Clean Ditch (CD)"));
        assert_eq!(table(DomainKind::FireLine).decode(37), Some("Containment / Control Line"));
    }

    #[test]
    fn every_code_is_numeric() {
        for kind in DomainKind::ALL {
            for entry in table(*kind).entries() {
                assert!(
                    entry.code.parse::<i64>().is_ok(),
                    "{kind}: '{}' has code '{}'",
                    entry.label,
                    entry.code
                );
            }
        }
    }
}
