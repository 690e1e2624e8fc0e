//! Translation of free-text labels into coded domain values.
//!
//! Each source feature contributes one label per target domain field
//! (a "slot"). Slots fall back to `sym_name` when their own field is blank.
//! Labels are looked up through [`DomainTable::lookup`]; a miss is warned
//! about and counted as skipped, and the target keeps its prior value.

use std::collections::BTreeMap;
use std::sync::Arc;

use wildfire_rehab_domain::{DomainKind, DomainTable, line_codes, table};
use wildfire_rehab_feature::models::{Feature, FeatureClass, FieldType, FieldValue, Schema};
use wildfire_rehab_feature::progress::ProgressCallback;

use crate::index::SourceIndex;
use crate::{FeatureKind, ReconcileError, expect_geometry};

/// Source field used as the fallback label for every slot.
pub const SYMBOL_FIELD: &str = "sym_name";

/// Outcome of a domain pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DomainStats {
    /// Target features that received at least one code.
    pub updated: usize,
    /// Unmatched target features plus labels missing from the table.
    pub skipped: usize,
}

impl std::fmt::Display for DomainStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "updated {}, skipped {}", self.updated, self.skipped)
    }
}

/// Converts a code to the value type of the target field.
///
/// Integer fields receive the parsed code; everything else gets the code
/// text.
#[must_use]
pub fn coded_value(schema: &Schema, field: &str, code: &str) -> FieldValue {
    let field_type = schema.field(field).map(|f| f.field_type);
    match field_type {
        Some(FieldType::Integer) => code
            .trim()
            .parse::<i64>()
            .map_or_else(|_| FieldValue::from(code), FieldValue::Integer),
        Some(FieldType::Double) => code
            .trim()
            .parse::<f64>()
            .map_or_else(|_| FieldValue::from(code), FieldValue::Double),
        _ => FieldValue::from(code),
    }
}

/// Copies coded values for the given kind of features.
///
/// # Errors
///
/// See [`copy_point_domains`] and [`copy_line_domains`].
pub fn copy_domains(
    source: &FeatureClass,
    target: &mut FeatureClass,
    kind: FeatureKind,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<DomainStats, ReconcileError> {
    match kind {
        FeatureKind::Points => copy_point_domains(source, target, progress),
        FeatureKind::Lines => copy_line_domains(source, target, progress),
    }
}

/// Writes `RPtType`, `RPtType2` and `RPtType3` codes onto coinciding target
/// points.
///
/// `RPtType` is taken from `sym_name` as stored, so a whitespace-only symbol
/// is a failed lookup rather than a blank; `RPtType2` and `RPtType3` use
/// their own source values and fall back to `sym_name` when blank.
///
/// # Errors
///
/// Returns [`ReconcileError`] if either class is not a point class or the
/// source cannot be reprojected.
pub fn copy_point_domains(
    source: &FeatureClass,
    target: &mut FeatureClass,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<DomainStats, ReconcileError> {
    expect_geometry(source, FeatureKind::Points)?;
    expect_geometry(target, FeatureKind::Points)?;
    warn_missing_symbol(source);

    let fields: Vec<&'static str> = ["RPtType", "RPtType2", "RPtType3"]
        .into_iter()
        .filter(|f| target.has_field(f))
        .collect();

    let slots = |feature: &Feature| {
        let sym = feature.get(SYMBOL_FIELD).raw_label();
        let own_or_sym = |field: &str| feature.get(field).label().or_else(|| sym.clone());
        BTreeMap::from([
            ("RPtType", sym.clone()),
            ("RPtType2", own_or_sym("RPtType2")),
            ("RPtType3", own_or_sym("RPtType3")),
        ])
    };

    apply_codes(
        source,
        target,
        &fields,
        table(DomainKind::PointTreatment),
        slots,
        progress,
    )
}

/// Writes line treatment, fire line, width and slope codes onto coinciding
/// target lines.
///
/// Every label falls back to the raw `sym_name` when blank. `RLType2` and
/// `RLType3` only reach `RLType_2`/`RLType_3` when `sym_name` is empty too.
/// Those slots are written to `RLType2`/`RLType3` alone: a target spelling
/// the field `RLType_2`/`RLType_3` keeps its values. All fields are looked up
/// in the combined [`line_codes`] table.
///
/// # Errors
///
/// Returns [`ReconcileError`] if either class is not a line class or the
/// source cannot be reprojected.
pub fn copy_line_domains(
    source: &FeatureClass,
    target: &mut FeatureClass,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<DomainStats, ReconcileError> {
    expect_geometry(source, FeatureKind::Lines)?;
    expect_geometry(target, FeatureKind::Lines)?;
    warn_missing_symbol(source);

    let pick = |preferred: &'static str, alternate: &'static str| {
        if target.has_field(preferred) {
            preferred
        } else {
            alternate
        }
    };
    let fields: Vec<&'static str> = [
        "RLType",
        pick("RLType2", "RLType_2"),
        pick("RLType3", "RLType_3"),
        "FLType",
        "FLType2",
        "LineWidth",
        "AvgSlope",
    ]
    .into_iter()
    .filter(|f| target.has_field(f))
    .collect();

    for field in fields.iter().filter(|f| f.contains('_')) {
        log::warn!(
            "{} field '{field}' is not written; only RLType2/RLType3 receive codes",
            target.name
        );
    }

    let slots = |feature: &Feature| {
        let sym = feature.get(SYMBOL_FIELD).raw_label();
        let own = |field: &str| feature.get(field).label();
        BTreeMap::from([
            ("RLType", own("RLType").or_else(|| sym.clone())),
            (
                "RLType2",
                own("RLType2")
                    .or_else(|| sym.clone())
                    .or_else(|| own("RLType_2")),
            ),
            (
                "RLType3",
                own("RLType3")
                    .or_else(|| sym.clone())
                    .or_else(|| own("RLType_3")),
            ),
            ("FLType", own("FLType").or_else(|| sym.clone())),
            ("FLType2", own("FLType2").or_else(|| sym.clone())),
            ("LineWidth", own("LineWidth").or_else(|| sym.clone())),
            ("AvgSlope", own("AvgSlope").or_else(|| sym.clone())),
        ])
    };

    apply_codes(source, target, &fields, line_codes(), slots, progress)
}

fn warn_missing_symbol(source: &FeatureClass) {
    if !source.has_field(SYMBOL_FIELD) {
        log::warn!(
            "{} has no '{SYMBOL_FIELD}' field; labels will not fall back to the symbol name",
            source.name
        );
    }
}

fn apply_codes<F>(
    source: &FeatureClass,
    target: &mut FeatureClass,
    fields: &[&'static str],
    codes: &DomainTable,
    slots: F,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<DomainStats, ReconcileError>
where
    F: Fn(&Feature) -> BTreeMap<&'static str, Option<String>>,
{
    if fields.is_empty() {
        log::warn!("{} has none of the expected domain fields; skipping", target.name);
        return Ok(DomainStats::default());
    }

    let index = SourceIndex::build(source, target.schema.spatial_reference)?;
    let schema = target.schema.clone();
    let mut stats = DomainStats::default();

    progress.set_total(target.len() as u64);
    for feature in &mut target.features {
        progress.inc(1);
        let Some((fingerprint, hit)) = index.find(feature) else {
            stats.skipped += 1;
            continue;
        };
        let slot_labels = slots(hit);

        let mut changed = false;
        for field in fields {
            let Some(label) = slot_labels.get(*field).and_then(Option::as_deref) else {
                continue;
            };
            let Some(code) = codes.lookup(label) else {
                log::warn!(
                    "No {} code for '{label}' ({field} at {fingerprint})",
                    codes.name()
                );
                stats.skipped += 1;
                continue;
            };
            feature.set(field, coded_value(&schema, field, code));
            changed = true;
        }
        if changed {
            stats.updated += 1;
        }
    }
    progress.finish(format!("Domains: {stats}"));

    log::info!("Domain codes on {}: {stats}", target.name);
    Ok(stats)
}
