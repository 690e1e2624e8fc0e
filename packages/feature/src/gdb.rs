//! File geodatabase layout.
//!
//! ```text
//! C50903_Rehab.gdb/
//!   wildfireBC_Rehab/                 feature dataset
//!     wildfireBC_rehabPoint.geojson
//!     wildfireBC_rehabPoint.schema.toml
//!     wildfireBC_rehabLine.geojson
//!     wildfireBC_rehabLine.schema.toml
//!   Self_Intersection_Points.geojson  class at the geodatabase root
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use wildfire_rehab_feature_models::{FeatureClass, Schema, Workspace};

use crate::FeatureError;
use crate::naming::unique_name;
use crate::store::{self, DATA_EXTENSION, SCHEMA_SUFFIX};

/// Location of a feature class inside a geodatabase.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassRef {
    /// Feature dataset holding the class; `None` for root-level classes.
    pub dataset: Option<String>,
    pub name: String,
}

impl ClassRef {
    #[must_use]
    pub fn new(dataset: Option<&str>, name: &str) -> Self {
        Self {
            dataset: dataset.map(str::to_string),
            name: name.to_string(),
        }
    }

    /// Parses `dataset/class` or a bare `class`.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value.trim().split_once('/') {
            Some((dataset, name)) => Self::new(Some(dataset), name),
            None => Self::new(None, value.trim()),
        }
    }
}

impl std::fmt::Display for ClassRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.dataset {
            Some(dataset) => write!(f, "{dataset}/{}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// An opened file geodatabase directory.
#[derive(Debug, Clone)]
pub struct Geodatabase {
    root: PathBuf,
}

impl Geodatabase {
    /// Opens an existing geodatabase directory.
    ///
    /// # Errors
    ///
    /// Returns [`FeatureError::NotFound`] if `root` is not a directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, FeatureError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(FeatureError::NotFound(root));
        }
        Ok(Self { root })
    }

    /// Creates the geodatabase directory (and parents) if needed.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the directory cannot be created.
    pub fn create(root: impl Into<PathBuf>) -> Result<Self, FeatureError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Opens the geodatabase behind a workspace.
    ///
    /// # Errors
    ///
    /// Returns [`FeatureError::UnsupportedWorkspace`] for enterprise
    /// workspaces, or [`FeatureError::NotFound`] if the file workspace is
    /// missing.
    pub fn from_workspace(workspace: &Workspace) -> Result<Self, FeatureError> {
        match workspace {
            Workspace::File { path } => Self::open(path.clone()),
            Workspace::Enterprise { .. } => Err(FeatureError::UnsupportedWorkspace(format!(
                "enterprise geodatabase {workspace} cannot be edited from a file workspace tool"
            ))),
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn workspace(&self) -> Workspace {
        Workspace::File {
            path: self.root.clone(),
        }
    }

    /// Data file path of a class.
    #[must_use]
    pub fn class_path(&self, class: &ClassRef) -> PathBuf {
        let dir = class
            .dataset
            .as_ref()
            .map_or_else(|| self.root.clone(), |dataset| self.root.join(dataset));
        dir.join(format!("{}.{DATA_EXTENSION}", class.name))
    }

    #[must_use]
    pub fn exists(&self, class: &ClassRef) -> bool {
        self.class_path(class).is_file()
    }

    /// Reads a class.
    ///
    /// # Errors
    ///
    /// Returns [`FeatureError`] if the class is missing or unreadable.
    pub fn read_class(&self, class: &ClassRef) -> Result<FeatureClass, FeatureError> {
        let mut fc = store::read_feature_class(&self.class_path(class))?;
        fc.name.clone_from(&class.name);
        Ok(fc)
    }

    /// Writes a class into `dataset`, replacing any existing data.
    ///
    /// # Errors
    ///
    /// Returns [`FeatureError`] if writing fails.
    pub fn write_class(&self, dataset: Option<&str>, fc: &FeatureClass) -> Result<(), FeatureError> {
        store::write_feature_class(&self.class_path(&ClassRef::new(dataset, &fc.name)), fc)
    }

    /// Creates an empty class.
    ///
    /// # Errors
    ///
    /// Returns [`FeatureError::AlreadyExists`] if the class is present.
    pub fn create_class(
        &self,
        dataset: Option<&str>,
        name: &str,
        schema: Schema,
    ) -> Result<FeatureClass, FeatureError> {
        let class = ClassRef::new(dataset, name);
        let path = self.class_path(&class);
        if path.exists() {
            return Err(FeatureError::AlreadyExists(path));
        }
        let fc = FeatureClass::new(name, schema);
        store::write_feature_class(&path, &fc)?;
        log::info!("Created feature class {class} in {}", self.root.display());
        Ok(fc)
    }

    /// Deletes a class if it exists.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if removal fails.
    pub fn delete_class(&self, class: &ClassRef) -> Result<(), FeatureError> {
        store::delete_feature_class(&self.class_path(class))
    }

    /// Lists class names directly inside `dataset`, sorted.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the directory cannot be read.
    pub fn list_classes(&self, dataset: Option<&str>) -> Result<Vec<String>, FeatureError> {
        let dir = dataset.map_or_else(|| self.root.clone(), |d| self.root.join(d));
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let suffix = format!(".{DATA_EXTENSION}");
        let mut names = Vec::new();
        for entry in fs::read_dir(dir)? {
            let file_name = entry?.file_name().to_string_lossy().into_owned();
            if file_name.ends_with(SCHEMA_SUFFIX) || file_name.starts_with('.') {
                continue;
            }
            if let Some(name) = file_name.strip_suffix(&suffix) {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Returns `base` or the first free `base_N` inside `dataset`.
    #[must_use]
    pub fn unique_class_name(&self, dataset: Option<&str>, base: &str) -> String {
        unique_name(base, |candidate| {
            self.exists(&ClassRef::new(dataset, candidate))
        })
    }
}

#[cfg(test)]
mod tests {
    use wildfire_rehab_feature_models::{GeometryKind, SpatialReference};

    use super::*;

    fn schema() -> Schema {
        Schema::new(GeometryKind::Point, SpatialReference::BC_ALBERS)
    }

    #[test]
    fn class_paths_follow_dataset_layout() {
        let dir = tempfile::tempdir().unwrap();
        let gdb = Geodatabase::open(dir.path()).unwrap();
        assert_eq!(
            gdb.class_path(&ClassRef::new(Some("wildfireBC_Rehab"), "wildfireBC_rehabPoint")),
            dir.path()
                .join("wildfireBC_Rehab")
                .join("wildfireBC_rehabPoint.geojson")
        );
        assert_eq!(
            gdb.class_path(&ClassRef::new(None, "QA")),
            dir.path().join("QA.geojson")
        );
    }

    #[test]
    fn create_list_and_unique_names() {
        let dir = tempfile::tempdir().unwrap();
        let gdb = Geodatabase::open(dir.path()).unwrap();

        gdb.create_class(Some("Input"), "tracks", schema()).unwrap();
        assert!(matches!(
            gdb.create_class(Some("Input"), "tracks", schema()),
            Err(FeatureError::AlreadyExists(_))
        ));
        assert_eq!(gdb.unique_class_name(Some("Input"), "tracks"), "tracks_1");
        assert_eq!(gdb.unique_class_name(Some("Input"), "points"), "points");
        assert_eq!(gdb.list_classes(Some("Input")).unwrap(), vec!["tracks"]);
        assert!(gdb.list_classes(Some("Missing")).unwrap().is_empty());

        gdb.delete_class(&ClassRef::new(Some("Input"), "tracks"))
            .unwrap();
        assert!(gdb.list_classes(Some("Input")).unwrap().is_empty());
    }

    #[test]
    fn enterprise_workspace_is_unsupported() {
        let ws = Workspace::Enterprise {
            connection: "rehab.sde".to_string(),
            database: None,
        };
        assert!(matches!(
            Geodatabase::from_workspace(&ws),
            Err(FeatureError::UnsupportedWorkspace(_))
        ));
    }

    #[test]
    fn class_ref_parses_dataset_prefix() {
        assert_eq!(
            ClassRef::parse("wildfireBC_Rehab/wildfireBC_rehabLine"),
            ClassRef::new(Some("wildfireBC_Rehab"), "wildfireBC_rehabLine")
        );
        assert_eq!(ClassRef::parse("QA"), ClassRef::new(None, "QA"));
    }
}
