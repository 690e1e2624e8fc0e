#![allow(clippy::module_name_repetitions)]
//! Canonical paths for one fire's season folder.
//!
//! Everything for a fire lives under
//! `<season_root>/<year>/<district>/<fire_code>/<fire_number>/`.

use std::path::{Path, PathBuf};

use wildfire_rehab_feature_models::FireNumber;

/// Folder layout of a single fire.
#[derive(Debug, Clone)]
pub struct FireLayout {
    season_root: PathBuf,
    year: i32,
    fire: FireNumber,
}

/// Outcome of [`FireLayout::create_folder_tree`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FolderSetup {
    pub created: Vec<PathBuf>,
    /// Folders that were already present and left untouched.
    pub existing: Vec<PathBuf>,
}

impl FireLayout {
    #[must_use]
    pub fn new(season_root: impl Into<PathBuf>, year: i32, fire: FireNumber) -> Self {
        Self {
            season_root: season_root.into(),
            year,
            fire,
        }
    }

    #[must_use]
    pub const fn fire(&self) -> &FireNumber {
        &self.fire
    }

    #[must_use]
    pub const fn year(&self) -> i32 {
        self.year
    }

    #[must_use]
    pub fn fire_dir(&self) -> PathBuf {
        self.season_root
            .join(self.year.to_string())
            .join(self.fire.district().to_string())
            .join(self.fire.fire_code())
            .join(self.fire.as_str())
    }

    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.fire_dir().join("Data")
    }

    /// `Data/<fire>_Rehab.gdb`
    #[must_use]
    pub fn gdb_path(&self) -> PathBuf {
        self.data_dir().join(format!("{}_Rehab.gdb", self.fire))
    }

    #[must_use]
    pub fn outgoing_dir(&self) -> PathBuf {
        self.data_dir().join("Outgoing")
    }

    /// `Data/Outgoing/<fire>_Rehab_Backup.gdb`
    #[must_use]
    pub fn backup_gdb_path(&self) -> PathBuf {
        self.outgoing_dir()
            .join(format!("{}_Rehab_Backup.gdb", self.fire))
    }

    #[must_use]
    pub fn outputs_dir(&self) -> PathBuf {
        self.fire_dir().join("Outputs")
    }

    #[must_use]
    pub fn maps_dir(&self) -> PathBuf {
        self.outputs_dir().join("Maps")
    }

    #[must_use]
    pub fn kml_dir(&self) -> PathBuf {
        self.outputs_dir().join("KML")
    }

    #[must_use]
    pub fn reports_dir(&self) -> PathBuf {
        self.outputs_dir().join("Reports")
    }

    /// Leaf folders of the fire's working tree.
    #[must_use]
    pub fn folder_tree(&self) -> Vec<PathBuf> {
        vec![
            self.maps_dir(),
            self.kml_dir(),
            self.reports_dir(),
            self.outgoing_dir(),
        ]
    }

    /// Creates the missing folders of [`Self::folder_tree`].
    ///
    /// Existing folders are reported and never modified.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if a folder cannot be created.
    pub fn create_folder_tree(&self) -> std::io::Result<FolderSetup> {
        let mut setup = FolderSetup::default();
        for dir in self.folder_tree() {
            if dir.exists() {
                log::warn!(
                    "Folder already exists and will not be modified: {}",
                    dir.display()
                );
                setup.existing.push(dir);
            } else {
                ensure_dir(&dir)?;
                log::info!("Created folder {}", dir.display());
                setup.created.push(dir);
            }
        }
        Ok(setup)
    }
}

/// Ensures a directory exists, creating it if necessary.
///
/// # Errors
///
/// Returns an I/O error if the directory cannot be created.
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(root: &Path) -> FireLayout {
        FireLayout::new(root, 2025, FireNumber::parse("G70422").unwrap())
    }

    #[test]
    fn fire_dir_nests_year_district_and_code() {
        let l = layout(Path::new("/season"));
        assert_eq!(
            l.fire_dir(),
            PathBuf::from("/season/2025/PrinceGeorge/G7/G70422")
        );
        assert_eq!(
            l.gdb_path(),
            PathBuf::from("/season/2025/PrinceGeorge/G7/G70422/Data/G70422_Rehab.gdb")
        );
        assert_eq!(
            l.backup_gdb_path(),
            PathBuf::from(
                "/season/2025/PrinceGeorge/G7/G70422/Data/Outgoing/G70422_Rehab_Backup.gdb"
            )
        );
    }

    #[test]
    fn folder_tree_creation_keeps_existing_folders() {
        let dir = tempfile::tempdir().unwrap();
        let l = layout(dir.path());
        std::fs::create_dir_all(l.maps_dir()).unwrap();
        std::fs::write(l.maps_dir().join("keep.pdf"), "x").unwrap();

        let setup = l.create_folder_tree().unwrap();
        assert_eq!(setup.existing, vec![l.maps_dir()]);
        assert_eq!(setup.created.len(), 3);
        assert!(l.maps_dir().join("keep.pdf").is_file());
        assert!(l.outgoing_dir().is_dir());

        let again = l.create_folder_tree().unwrap();
        assert!(again.created.is_empty());
        assert_eq!(again.existing.len(), 4);
    }
}
