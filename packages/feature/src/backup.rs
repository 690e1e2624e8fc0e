//! Geodatabase backup by recursive directory copy.

use std::fs;
use std::path::Path;

use walkdir::WalkDir;

use crate::FeatureError;

/// Copies the geodatabase directory `source` to `destination`.
///
/// Returns the number of files copied.
///
/// # Errors
///
/// Returns [`FeatureError::NotFound`] if `source` is not a directory,
/// [`FeatureError::AlreadyExists`] if `destination` exists, or an I/O error
/// if copying fails.
pub fn backup_geodatabase(source: &Path, destination: &Path) -> Result<u64, FeatureError> {
    if !source.is_dir() {
        return Err(FeatureError::NotFound(source.to_path_buf()));
    }
    if destination.exists() {
        return Err(FeatureError::AlreadyExists(destination.to_path_buf()));
    }

    let mut copied = 0_u64;
    for entry in WalkDir::new(source).sort_by_file_name() {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| FeatureError::Format {
                message: format!("{} escaped {}: {e}", entry.path().display(), source.display()),
            })?;
        let target = destination.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else if entry.file_type().is_file() {
            fs::copy(entry.path(), &target)?;
            copied += 1;
        }
    }

    log::info!(
        "Backed up {} to {} ({copied} file(s))",
        source.display(),
        destination.display()
    );

    Ok(copied)
}
