//! Batch loading and reprojection of collected input files.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use walkdir::WalkDir;
use wildfire_rehab_feature::FeatureError;
use wildfire_rehab_feature::gdb::{ClassRef, Geodatabase};
use wildfire_rehab_feature::models::{FeatureClass, SpatialReference};
use wildfire_rehab_feature::naming::sanitize_name;
use wildfire_rehab_feature::progress::ProgressCallback;
use wildfire_rehab_feature::store::{self, DATA_EXTENSION};
use wildfire_rehab_projection::CoordTransform;

use crate::ReconcileError;

/// Suffix appended to reprojected copies of WGS 84 inputs.
pub const REPROJECTED_SUFFIX: &str = "_BC";

/// Counts from [`load_inputs`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    /// Input files examined.
    pub processed: usize,
    /// Classes written into the geodatabase.
    pub added: usize,
    /// Inputs left out because no transform exists for their reference.
    pub skipped: usize,
}

/// Counts from [`reproject_batch`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReprojectSummary {
    /// Classes written, by name.
    pub written: Vec<String>,
    /// Inputs that were not in WGS 84.
    pub skipped: usize,
}

/// Lists the data files directly inside `folder`, sorted by name.
///
/// # Errors
///
/// Returns [`FeatureError::NotFound`] if `folder` is not a directory, or a
/// walk error if it cannot be read.
pub fn list_inputs(folder: &Path) -> Result<Vec<PathBuf>, FeatureError> {
    if !folder.is_dir() {
        return Err(FeatureError::NotFound(folder.to_path_buf()));
    }

    let mut inputs = Vec::new();
    for entry in WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type().is_file()
            && path.extension().is_some_and(|ext| ext == DATA_EXTENSION)
        {
            inputs.push(path.to_path_buf());
        }
    }
    Ok(inputs)
}

/// Returns a copy of `class` with every geometry transformed.
///
/// # Errors
///
/// Returns [`ReconcileError::Projection`] if a geometry cannot be
/// transformed.
pub fn project_class(
    class: &FeatureClass,
    transform: &CoordTransform,
) -> Result<FeatureClass, ReconcileError> {
    let mut projected = class.clone();
    projected.schema.spatial_reference = transform.target();
    for feature in &mut projected.features {
        if let Some(geometry) = &feature.geometry {
            feature.geometry = Some(transform.transform_geometry(geometry)?);
        }
    }
    Ok(projected)
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Loads every input file in `folder` into `dataset` of `gdb`, projected to
/// `target`.
///
/// Each class is named after its sanitized file stem, made unique within the
/// dataset. Inputs whose reference has no transform to `target` are skipped
/// with a warning.
///
/// # Errors
///
/// Returns [`ReconcileError`] if the folder cannot be listed, an input
/// cannot be read, or a class cannot be written.
pub fn load_inputs(
    folder: &Path,
    gdb: &Geodatabase,
    dataset: &str,
    target: SpatialReference,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<LoadSummary, ReconcileError> {
    let inputs = list_inputs(folder)?;
    let mut summary = LoadSummary::default();
    progress.set_total(inputs.len() as u64);

    for path in &inputs {
        summary.processed += 1;
        progress.inc(1);

        let class = store::read_feature_class(path)?;
        let from = class.schema.spatial_reference;
        let transform = match CoordTransform::new(from, target) {
            Ok(transform) => transform,
            Err(e) => {
                log::warn!("Skipping {}: {e}", path.display());
                summary.skipped += 1;
                continue;
            }
        };

        let mut projected = project_class(&class, &transform)?;
        projected.name = gdb.unique_class_name(Some(dataset), &sanitize_name(&file_stem(path)));
        gdb.write_class(Some(dataset), &projected)?;
        summary.added += 1;

        if transform.is_identity() {
            log::info!("Copied {} to {dataset}/{}", path.display(), projected.name);
        } else {
            log::info!(
                "Projected {} ({from}) to {dataset}/{}",
                path.display(),
                projected.name
            );
        }
    }
    progress.finish(format!("Loaded {} input(s)", summary.added));

    log::info!(
        "Inputs: processed {}, added {}, skipped {}",
        summary.processed,
        summary.added,
        summary.skipped
    );
    Ok(summary)
}

/// Reprojects WGS 84 inputs to `target` as `<name>_BC` classes in
/// `dataset` of `gdb`, replacing earlier outputs of the same name.
///
/// # Errors
///
/// Returns [`ReconcileError`] if an input cannot be read or an output
/// cannot be written.
pub fn reproject_batch(
    inputs: &[PathBuf],
    gdb: &Geodatabase,
    dataset: Option<&str>,
    target: SpatialReference,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<ReprojectSummary, ReconcileError> {
    let mut summary = ReprojectSummary::default();
    progress.set_total(inputs.len() as u64);

    for path in inputs {
        progress.inc(1);
        let class = store::read_feature_class(path)?;
        if class.schema.spatial_reference != SpatialReference::WGS84 {
            log::info!(
                "{} is in {}, not WGS 84; skipping",
                path.display(),
                class.schema.spatial_reference
            );
            summary.skipped += 1;
            continue;
        }

        let transform = CoordTransform::new(SpatialReference::WGS84, target)?;
        let mut projected = project_class(&class, &transform)?;
        projected.name = format!("{}{REPROJECTED_SUFFIX}", sanitize_name(&file_stem(path)));

        let output = ClassRef::new(dataset, &projected.name);
        if gdb.exists(&output) {
            log::info!("Replacing existing {output}");
            gdb.delete_class(&output)?;
        }
        gdb.write_class(dataset, &projected)?;
        log::info!("Reprojected {} to {output}", path.display());
        summary.written.push(projected.name);
    }
    progress.finish(format!("Reprojected {} input(s)", summary.written.len()));

    if summary.written.is_empty() {
        log::warn!("No WGS 84 inputs found to reproject");
    }
    Ok(summary)
}
