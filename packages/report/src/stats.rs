//! Grouped summary reports.

use std::collections::BTreeMap;

use geo::{Geometry, LineString};
use wildfire_rehab_domain::{DomainKind, table};
use wildfire_rehab_feature::models::{FeatureClass, FieldValue};

use crate::{ReportError, Table, decode_value, extract_width_from_comments, resolve_field};

/// Orders grouped codes numerically, then by text; nulls first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct GroupKey {
    code: Option<i64>,
    text: String,
}

impl GroupKey {
    fn of(value: &FieldValue) -> Self {
        Self {
            code: value.as_i64(),
            text: value.to_string(),
        }
    }
}

/// Planar length of a line geometry in its own units.
#[must_use]
pub fn planar_length(geometry: &Geometry<f64>) -> f64 {
    fn part(ls: &LineString<f64>) -> f64 {
        ls.lines().map(|l| l.dx().hypot(l.dy())).sum()
    }

    match geometry {
        Geometry::Line(l) => l.dx().hypot(l.dy()),
        Geometry::LineString(ls) => part(ls),
        Geometry::MultiLineString(mls) => mls.0.iter().map(part).sum(),
        _ => 0.0,
    }
}

/// Feature count per `RPtType` code, decoded.
///
/// # Errors
///
/// Returns [`ReportError::MissingField`] if `points` has no `RPtType`.
pub fn point_stats(points: &FeatureClass) -> Result<Table, ReportError> {
    const FIELD: &str = "RPtType";

    if !points.has_field(FIELD) {
        return Err(ReportError::MissingField {
            report: "Point stats",
            class: points.name.clone(),
            field: FIELD,
        });
    }

    let mut counts: BTreeMap<GroupKey, (FieldValue, usize)> = BTreeMap::new();
    for feature in &points.features {
        let value = feature.get(FIELD);
        counts
            .entry(GroupKey::of(value))
            .or_insert_with(|| (value.clone(), 0))
            .1 += 1;
    }

    let codes = table(DomainKind::PointTreatment);
    Ok(Table {
        header: vec![FIELD.to_string(), "COUNT_OBJECTID".to_string()],
        rows: counts
            .values()
            .map(|(value, count)| vec![decode_value(codes, value), count.to_string()])
            .collect(),
    })
}

#[derive(Debug, Default)]
struct LineGroup {
    rl: FieldValue,
    fl: FieldValue,
    count: usize,
    length: f64,
    widths: Vec<f64>,
}

/// Count, total length and average comment width per (`RLType`, `FLType`).
///
/// `RLType1`, `FLType1` and `Description` stand in for missing `RLType`,
/// `FLType` and `Comments`. Without a comments field the `Width` column is
/// empty.
///
/// # Errors
///
/// Returns [`ReportError::MissingField`] if either grouping field is
/// missing.
pub fn line_stats(lines: &FeatureClass) -> Result<Table, ReportError> {
    let require = |field: &'static str| {
        resolve_field(lines, field).ok_or_else(|| ReportError::MissingField {
            report: "Line stats",
            class: lines.name.clone(),
            field,
        })
    };
    let rl_field = require("RLType")?;
    let fl_field = require("FLType")?;
    let comments_field = resolve_field(lines, "Comments");
    if comments_field.is_none() {
        log::warn!(
            "Line stats: {} has no Comments/Description field; Width will be empty",
            lines.name
        );
    }

    let mut groups: BTreeMap<(GroupKey, GroupKey), LineGroup> = BTreeMap::new();
    for feature in &lines.features {
        let rl = feature.get(rl_field);
        let fl = feature.get(fl_field);
        let group = groups
            .entry((GroupKey::of(rl), GroupKey::of(fl)))
            .or_insert_with(|| LineGroup {
                rl: rl.clone(),
                fl: fl.clone(),
                ..LineGroup::default()
            });

        group.count += 1;
        group.length += feature.geometry.as_ref().map_or(0.0, planar_length);
        if let Some(width) = comments_field
            .and_then(|field| feature.get(field).as_str())
            .and_then(extract_width_from_comments)
        {
            group.widths.push(width);
        }
    }

    let rl_codes = table(DomainKind::LineTreatment);
    let fl_codes = table(DomainKind::FireLine);

    let rows = groups
        .values()
        .map(|group| {
            vec![
                decode_value(rl_codes, &group.rl),
                decode_value(fl_codes, &group.fl),
                group.count.to_string(),
                format!("{:?}", group.length),
                average(&group.widths).map_or_else(String::new, |w| format!("{w:.1}")),
            ]
        })
        .collect();

    Ok(Table {
        header: ["RLType", "FLType", "COUNT_OBJECTID", "SUM_Shape_Length", "Width"]
            .map(String::from)
            .to_vec(),
        rows,
    })
}

#[allow(clippy::cast_precision_loss)]
fn average(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use wildfire_rehab_feature::models::{FieldDef, GeometryKind};

    use super::*;
    use crate::testing::{add_line, add_point, class};

    #[test]
    fn counts_points_per_code() {
        let mut points = class("points", GeometryKind::Point, &[FieldDef::text("RPtType", Some(5))]);
        for code in ["19", "2", "19", "500"] {
            add_point(&mut points, &[("RPtType", FieldValue::from(code))]);
        }
        add_point(&mut points, &[]);

        let report = point_stats(&points).unwrap();
        assert_eq!(
            report.rows,
            vec![
                vec!["Unknown ()", "1"],
                vec!["Berm Breach BB", "1"],
                vec!["Dry Seed DS", "2"],
                vec!["Unknown (500)", "1"],
            ]
        );
    }

    #[test]
    fn point_stats_needs_rpttype() {
        let points = class("points", GeometryKind::Point, &[]);
        assert!(matches!(
            point_stats(&points),
            Err(ReportError::MissingField { field: "RPtType", .. })
        ));
    }

    #[test]
    fn groups_lines_with_length_and_width() {
        let mut lines = class(
            "lines",
            GeometryKind::Polyline,
            &[
                FieldDef::text("RLType1", Some(5)),
                FieldDef::text("FLType", Some(5)),
                FieldDef::text("Description", Some(255)),
            ],
        );
        let dry_seed_trail = [("RLType1", FieldValue::from("2")), ("FLType", FieldValue::from("34"))];
        add_line(
            &mut lines,
            &[(0.0, 0.0), (3.0, 4.0)],
            &[dry_seed_trail[0].clone(), dry_seed_trail[1].clone(), ("Description", FieldValue::from("5m"))],
        );
        add_line(
            &mut lines,
            &[(0.0, 0.0), (0.0, 2.5)],
            &[dry_seed_trail[0].clone(), dry_seed_trail[1].clone(), ("Description", FieldValue::from("5-7m"))],
        );
        add_line(&mut lines, &[(0.0, 0.0), (1.0, 0.0)], &[("RLType1", FieldValue::from("6"))]);

        let report = line_stats(&lines).unwrap();
        assert_eq!(
            report.header,
            vec!["RLType", "FLType", "COUNT_OBJECTID", "SUM_Shape_Length", "Width"]
        );
        assert_eq!(
            report.rows,
            vec![
                vec!["Dry Seed (DS)", "Trail", "2", "7.5", "5.5"],
                vec!["Pull Back (PB)", "Unknown ()", "1", "1.0", ""],
            ]
        );
    }

    #[test]
    fn line_stats_needs_grouping_fields() {
        let lines = class("lines", GeometryKind::Polyline, &[FieldDef::text("RLType", Some(5))]);
        assert!(matches!(
            line_stats(&lines),
            Err(ReportError::MissingField { field: "FLType", .. })
        ));
    }

    #[test]
    fn multiline_length_sums_parts() {
        let geometry: Geometry<f64> = geo::MultiLineString::new(vec![
            LineString::from(vec![(0.0, 0.0), (3.0, 4.0)]),
            LineString::from(vec![(10.0, 0.0), (10.0, 1.0), (11.0, 1.0)]),
        ])
        .into();
        assert!((planar_length(&geometry) - 7.0).abs() < 1e-12);
    }
}
