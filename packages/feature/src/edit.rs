//! Edit sessions over a single feature class.
//!
//! An [`EditSession`] loads a class into memory, hands out mutable access,
//! and writes it back only on [`EditSession::commit`]. Dropping a session
//! without committing discards its changes, so a stage that fails halfway
//! leaves the stored class exactly as it was before the stage started.

use std::path::{Path, PathBuf};

use wildfire_rehab_feature_models::FeatureClass;

use crate::FeatureError;
use crate::gdb::{ClassRef, Geodatabase};
use crate::store;

/// Pending edits to one stored feature class.
pub struct EditSession {
    path: PathBuf,
    class: FeatureClass,
    committed: bool,
}

impl EditSession {
    /// Starts a session on the class stored at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`FeatureError`] if the class cannot be read.
    pub fn start(path: &Path) -> Result<Self, FeatureError> {
        let class = store::read_feature_class(path)?;
        log::debug!("Started edit session on {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            class,
            committed: false,
        })
    }

    /// Starts a session on a class inside a geodatabase.
    ///
    /// # Errors
    ///
    /// Returns [`FeatureError`] if the class cannot be read.
    pub fn start_in(gdb: &Geodatabase, class: &ClassRef) -> Result<Self, FeatureError> {
        Self::start(&gdb.class_path(class))
    }

    #[must_use]
    pub const fn class(&self) -> &FeatureClass {
        &self.class
    }

    pub const fn class_mut(&mut self) -> &mut FeatureClass {
        &mut self.class
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persists the edited class.
    ///
    /// # Errors
    ///
    /// Returns [`FeatureError`] if writing fails; the stored class is then
    /// left unchanged.
    pub fn commit(mut self) -> Result<(), FeatureError> {
        store::write_feature_class(&self.path, &self.class)?;
        self.committed = true;
        log::debug!("Committed edits to {}", self.path.display());
        Ok(())
    }
}

impl Drop for EditSession {
    fn drop(&mut self) {
        if !self.committed {
            log::warn!("Discarding uncommitted edits to {}", self.path.display());
        }
    }
}

/// Runs `edit` inside a session on `path`, committing on success.
///
/// When `edit` fails, the error is logged with `stage` as context and the
/// session is dropped without writing anything.
///
/// # Errors
///
/// Returns the error from starting the session, from `edit`, or from the
/// commit.
pub fn with_edit<T, E>(
    path: &Path,
    stage: &str,
    edit: impl FnOnce(&mut FeatureClass) -> Result<T, E>,
) -> Result<T, E>
where
    E: From<FeatureError> + std::fmt::Display,
{
    let mut session = EditSession::start(path)?;
    match edit(session.class_mut()) {
        Ok(value) => {
            session.commit()?;
            Ok(value)
        }
        Err(e) => {
            log::error!("{stage} failed on {}: {e}", path.display());
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use wildfire_rehab_feature_models::{GeometryKind, Schema, SpatialReference};

    use super::*;

    fn seeded(dir: &Path) -> PathBuf {
        let path = dir.join("pts.geojson");
        let fc = FeatureClass::new(
            "pts",
            Schema::new(GeometryKind::Point, SpatialReference::BC_ALBERS),
        );
        store::write_feature_class(&path, &fc).unwrap();
        path
    }

    #[test]
    fn commit_persists_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = seeded(dir.path());

        let mut session = EditSession::start(&path).unwrap();
        session.class_mut().insert(None, BTreeMap::new());
        session.commit().unwrap();

        assert_eq!(store::read_feature_class(&path).unwrap().len(), 1);
    }

    #[test]
    fn dropping_session_discards_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = seeded(dir.path());

        {
            let mut session = EditSession::start(&path).unwrap();
            session.class_mut().insert(None, BTreeMap::new());
        }

        assert!(store::read_feature_class(&path).unwrap().is_empty());
    }

    #[test]
    fn failed_edit_is_not_committed() {
        let dir = tempfile::tempdir().unwrap();
        let path = seeded(dir.path());

        let result: Result<(), FeatureError> = with_edit(&path, "test stage", |class| {
            class.insert(None, BTreeMap::new());
            Err(FeatureError::Format {
                message: "boom".to_string(),
            })
        });

        assert!(result.is_err());
        assert!(store::read_feature_class(&path).unwrap().is_empty());
    }

    #[test]
    fn successful_edit_returns_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = seeded(dir.path());

        let oid = with_edit::<_, FeatureError>(&path, "test stage", |class| {
            Ok(class.insert(None, BTreeMap::new()))
        })
        .unwrap();

        assert_eq!(oid, 1);
        assert_eq!(store::read_feature_class(&path).unwrap().len(), 1);
    }
}
