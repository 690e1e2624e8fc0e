//! One-row-per-feature reports.

use wildfire_rehab_domain::{DomainKind, table};
use wildfire_rehab_feature::models::{FeatureClass, FieldValue};

use crate::{ReportError, Table, cell, decode_value, resolve_field};

const POINT_FIELDS: &[&str] = &["Label", "CaptureDate", "RPtType", "Comments", "Status"];

const LINE_FIELDS: &[&str] = &[
    "Label",
    "CaptureDate",
    "RLType",
    "FLType",
    "FLType2",
    "RLType_2",
    "RLType_3",
    "LineWidth",
    "Comments",
    "Status",
];

/// Decodes a coded cell; nulls stay empty.
fn decode_cell(kind: DomainKind, value: &FieldValue) -> String {
    if value.is_null() {
        String::new()
    } else {
        decode_value(table(kind), value)
    }
}

/// Points with the report fields `points` actually has.
///
/// `RPtType` is decoded and `Label` gets a leading `'` so spreadsheets keep
/// it as text.
///
/// # Errors
///
/// Returns [`ReportError::NoFields`] if none of the report fields exist.
pub fn point_feature_report(points: &FeatureClass) -> Result<Table, ReportError> {
    let (fields, missing): (Vec<&str>, Vec<&str>) =
        POINT_FIELDS.iter().copied().partition(|f| points.has_field(f));
    if !missing.is_empty() {
        log::warn!(
            "Point feature report: {} is missing {}",
            points.name,
            missing.join(", ")
        );
    }
    if fields.is_empty() {
        return Err(ReportError::NoFields {
            report: "Point feature report",
            class: points.name.clone(),
        });
    }

    let rows = points
        .features
        .iter()
        .map(|feature| {
            fields
                .iter()
                .map(|field| {
                    let value = feature.get(field);
                    match *field {
                        "RPtType" => decode_cell(DomainKind::PointTreatment, value),
                        "Label" if !value.is_null() => format!("'{}", cell(value)),
                        _ => cell(value),
                    }
                })
                .collect()
        })
        .collect();

    Ok(Table {
        header: fields.iter().map(ToString::to_string).collect(),
        rows,
    })
}

/// Lines under the full report header; fields the class lacks are left
/// empty. Treatment and fire line codes are decoded.
#[must_use]
pub fn line_feature_report(lines: &FeatureClass) -> Table {
    let columns: Vec<(&str, Option<&str>)> = LINE_FIELDS
        .iter()
        .map(|canonical| (*canonical, resolve_field(lines, canonical)))
        .collect();

    let missing: Vec<&str> = columns
        .iter()
        .filter(|(_, actual)| actual.is_none())
        .map(|(canonical, _)| *canonical)
        .collect();
    if !missing.is_empty() {
        log::warn!(
            "Line feature report: {} is missing {} (left empty)",
            lines.name,
            missing.join(", ")
        );
    }

    let rows = lines
        .features
        .iter()
        .map(|feature| {
            columns
                .iter()
                .map(|(canonical, actual)| {
                    let Some(actual) = actual else {
                        return String::new();
                    };
                    let value = feature.get(actual);
                    match *canonical {
                        "RLType" | "RLType_2" | "RLType_3" => {
                            decode_cell(DomainKind::LineTreatment, value)
                        }
                        "FLType" | "FLType2" => decode_cell(DomainKind::FireLine, value),
                        _ => cell(value),
                    }
                })
                .collect()
        })
        .collect();

    Table {
        header: LINE_FIELDS.iter().map(ToString::to_string).collect(),
        rows,
    }
}
