#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CSV reports for a fire's rehab point and line feature classes.
//!
//! Four files are written per fire: treatment counts for points
//! ([`stats::point_stats`]), counts, lengths and widths per line treatment
//! and fire line type ([`stats::line_stats`]), and one row per feature for
//! each class ([`features`]). Coded domain values are decoded back to
//! labels.

pub mod features;
pub mod stats;
pub mod width;

use std::path::{Path, PathBuf};

use wildfire_rehab_domain::DomainTable;
use wildfire_rehab_feature::FeatureError;
use wildfire_rehab_feature::models::{FeatureClass, FieldValue, FireNumber};
use wildfire_rehab_feature::paths::ensure_dir;

pub use width::extract_width_from_comments;

/// Errors that can occur while building or writing a report.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// I/O error (creating the reports folder).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV writing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Reading feature data failed.
    #[error(transparent)]
    Feature(#[from] FeatureError),

    /// A field the report groups on is not in the class.
    #[error("{report}: {class} has no '{field}' field")]
    MissingField {
        report: &'static str,
        class: String,
        field: &'static str,
    },

    /// None of the report's fields exist in the class.
    #[error("{report}: {class} has none of the fields to export")]
    NoFields { report: &'static str, class: String },
}

/// Alternate field names accepted for a canonical field.
const FIELD_SYNONYMS: &[(&str, &str)] = &[
    ("RLType", "RLType1"),
    ("FLType", "FLType1"),
    ("Comments", "Description"),
];

/// Returns the field of `class` that holds `canonical`: the field itself,
/// else its synonym.
#[must_use]
pub fn resolve_field<'a>(class: &'a FeatureClass, canonical: &str) -> Option<&'a str> {
    let schema = &class.schema;
    if let Some(field) = schema.field(canonical) {
        return Some(field.name.as_str());
    }
    FIELD_SYNONYMS
        .iter()
        .filter(|(canon, _)| *canon == canonical)
        .find_map(|(_, alt)| schema.field(alt))
        .map(|field| field.name.as_str())
}

/// Decodes a stored code to the first label listed for it, or
/// `Unknown (<value>)`.
#[must_use]
pub fn decode_value(table: &DomainTable, value: &FieldValue) -> String {
    value
        .as_i64()
        .and_then(|code| table.decode(code))
        .map_or_else(|| format!("Unknown ({value})"), ToString::to_string)
}

/// Renders a value as a CSV cell. Doubles keep a decimal point.
#[must_use]
pub fn cell(value: &FieldValue) -> String {
    match value {
        FieldValue::Double(n) => format!("{n:?}"),
        other => other.to_string(),
    }
}

/// Where [`write_reports`] put each file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub point_stats: PathBuf,
    pub line_stats: PathBuf,
    pub point_features: PathBuf,
    pub line_features: PathBuf,
}

impl ReportPaths {
    #[must_use]
    pub fn new(out_dir: &Path, fire: &FireNumber) -> Self {
        Self {
            point_stats: out_dir.join(format!("{fire}_Point_Stats.csv")),
            line_stats: out_dir.join(format!("{fire}_Line_Stats.csv")),
            point_features: out_dir.join(format!("{fire}_Point_Feature_Report.csv")),
            line_features: out_dir.join(format!("{fire}_Line_Feature_Report.csv")),
        }
    }
}

/// A header and rows ready to be written as CSV.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Writes the table to `path`, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Csv`] if the file cannot be written.
    pub fn write(&self, path: &Path) -> Result<(), ReportError> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(&self.header)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Writes all four reports for `fire` into `out_dir`, creating it if
/// needed.
///
/// # Errors
///
/// Returns [`ReportError`] if a report cannot be built or written. Reports
/// already written stay on disk.
pub fn write_reports(
    points: &FeatureClass,
    lines: &FeatureClass,
    fire: &FireNumber,
    out_dir: &Path,
) -> Result<ReportPaths, ReportError> {
    ensure_dir(out_dir)?;
    let paths = ReportPaths::new(out_dir, fire);
    log::info!("Reports folder: {}", out_dir.display());

    stats::point_stats(points)?.write(&paths.point_stats)?;
    log::info!("Point stats: {}", paths.point_stats.display());

    stats::line_stats(lines)?.write(&paths.line_stats)?;
    log::info!("Line stats: {}", paths.line_stats.display());

    features::point_feature_report(points)?.write(&paths.point_features)?;
    log::info!("Point feature report: {}", paths.point_features.display());

    features::line_feature_report(lines).write(&paths.line_features)?;
    log::info!("Line feature report: {}", paths.line_features.display());

    Ok(paths)
}


#[cfg(test)]
mod tests {
    use wildfire_rehab_domain::{DomainKind, table};
    use wildfire_rehab_feature::models::{FieldDef, GeometryKind};

    use super::*;
    use crate::testing::{add_line, add_point, class};

    #[test]
    fn resolves_synonyms() {
        let lines = class(
            "lines",
            GeometryKind::Polyline,
            &[FieldDef::text("RLType1", Some(5)), FieldDef::text("FLType", Some(5))],
        );
        assert_eq!(resolve_field(&lines, "RLType"), Some("RLType1"));
        assert_eq!(resolve_field(&lines, "FLType"), Some("FLType"));
        assert_eq!(resolve_field(&lines, "Comments"), None);
    }

    #[test]
    fn decodes_first_listed_label() {
        let points = table(DomainKind::PointTreatment);
        assert_eq!(decode_value(points, &FieldValue::from("19")), "Dry Seed DS");
        assert_eq!(decode_value(points, &FieldValue::Integer(2)), "Berm Breach BB");
        assert_eq!(decode_value(points, &FieldValue::from("777")), "Unknown (777)");
        assert_eq!(decode_value(points, &FieldValue::Null), "Unknown ()");
    }

    #[test]
    fn writes_all_four_reports() {
        let mut points = class(
            "points",
            GeometryKind::Point,
            &[FieldDef::text("Label", Some(50)), FieldDef::text("RPtType", Some(5))],
        );
        add_point(
            &mut points,
            &[("Label", FieldValue::from("P1")), ("RPtType", FieldValue::from("19"))],
        );
        let mut lines = class(
            "lines",
            GeometryKind::Polyline,
            &[FieldDef::text("RLType", Some(5)), FieldDef::text("FLType", Some(5))],
        );
        add_line(&mut lines, &[(0.0, 0.0), (3.0, 4.0)], &[("RLType", FieldValue::from("2"))]);

        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("Outputs").join("Reports");
        let fire = FireNumber::parse("C50903").unwrap();
        let paths = write_reports(&points, &lines, &fire, &out).unwrap();

        assert!(paths.point_stats.ends_with("C50903_Point_Stats.csv"));
        let point_stats = std::fs::read_to_string(&paths.point_stats).unwrap();
        assert_eq!(point_stats, "RPtType,COUNT_OBJECTID\nDry Seed DS,1\n");

        let line_features = std::fs::read_to_string(&paths.line_features).unwrap();
        let mut rows = line_features.lines();
        assert_eq!(
            rows.next(),
            Some("Label,CaptureDate,RLType,FLType,FLType2,RLType_2,RLType_3,LineWidth,Comments,Status")
        );
        assert_eq!(rows.next(), Some(",,Dry Seed (DS),,,,,,,"));

        assert!(paths.line_stats.is_file());
        assert!(paths.point_features.is_file());
    }
}
