//! Attribute transfer between coincident features.

use std::sync::Arc;

use wildfire_rehab_feature::models::{FeatureClass, FieldValue, Schema};
use wildfire_rehab_feature::progress::ProgressCallback;

use crate::fingerprint::Fingerprint;
use crate::index::SourceIndex;
use crate::mapping::FieldMapping;
use crate::{FeatureKind, ReconcileError, expect_geometry};

/// Outcome of an attribute join.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JoinStats {
    /// Target features that received at least one value.
    pub updated: usize,
    /// Target features with no coinciding source feature.
    pub unmatched: usize,
    /// Individual values skipped because they were wider than the field.
    pub skipped_values: usize,
}

impl std::fmt::Display for JoinStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "updated {}, unmatched {}, skipped values {}",
            self.updated, self.unmatched, self.skipped_values
        )
    }
}

/// Result of checking a value against a target field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fit {
    Fits,
    /// Text longer than the field width: `(length, width)`.
    TooWide(usize, usize),
}

/// Checks whether `value` can be written to `field` without truncation.
///
/// Only text values going into a text field with a declared width can
/// overflow.
#[must_use]
pub fn check_width(schema: &Schema, field: &str, value: &FieldValue) -> Fit {
    let Some(width) = schema.field(field).and_then(|f| f.text_width()) else {
        return Fit::Fits;
    };
    if value.as_str().is_none() {
        return Fit::Fits;
    }
    let length = value.char_len();
    if length > width {
        Fit::TooWide(length, width)
    } else {
        Fit::Fits
    }
}

/// Copies mapped attribute values from `source` onto every coinciding
/// feature of `target`.
///
/// Null source values are never written. A text value wider than its
/// target field is skipped with a warning while the feature's other fields
/// are still applied. An empty field mapping is warned about and leaves
/// `target` untouched.
///
/// # Errors
///
/// Returns [`ReconcileError`] if either class has the wrong geometry kind
/// or the source cannot be reprojected into the target's reference.
pub fn copy_attributes(
    source: &FeatureClass,
    target: &mut FeatureClass,
    kind: FeatureKind,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<JoinStats, ReconcileError> {
    expect_geometry(source, kind)?;
    expect_geometry(target, kind)?;

    let mapping = FieldMapping::discover(kind, &source.schema, &target.schema);
    if mapping.is_empty() {
        log::warn!(
            "No attribute fields to copy from {} to {}; skipping",
            source.name,
            target.name
        );
        return Ok(JoinStats::default());
    }
    log::info!("Copying attributes: {mapping}");

    let index = SourceIndex::build(source, target.schema.spatial_reference)?;
    let schema = target.schema.clone();
    let mut stats = JoinStats::default();

    progress.set_total(target.len() as u64);
    for feature in &mut target.features {
        progress.inc(1);
        let Some((fingerprint, hit)) = index.find(feature) else {
            stats.unmatched += 1;
            continue;
        };

        let mut assigned = false;
        for (target_field, source_field) in mapping.iter() {
            let value = hit.get(source_field);
            if value.is_null() {
                continue;
            }
            match check_width(&schema, target_field, value) {
                Fit::Fits => {
                    feature.set(target_field, value.clone());
                    assigned = true;
                }
                Fit::TooWide(length, width) => {
                    warn_too_wide(target_field, &fingerprint, length, width);
                    stats.skipped_values += 1;
                }
            }
        }
        if assigned {
            stats.updated += 1;
        }
    }
    progress.finish(format!("Attributes: {stats}"));

    log::info!("Attribute copy into {}: {stats}", target.name);
    if stats.skipped_values > 0 {
        log::warn!(
            "Skipped {} field assignment(s) due to length constraints",
            stats.skipped_values
        );
    }
    Ok(stats)
}

fn warn_too_wide(field: &str, fingerprint: &Fingerprint, length: usize, width: usize) {
    log::warn!("Skipping '{field}' at {fingerprint}: value length {length} > {width}");
}
