//! Optional TOML configuration.
//!
//! Read from the file named by `WILDFIRE_REHAB_CONFIG`, else
//! `wildfire_rehab.toml` in the working directory. Every key has a default,
//! and a missing file means all defaults.

use std::path::{Path, PathBuf};

use chrono::Datelike;
use serde::Deserialize;
use wildfire_rehab_feature::gdb::{ClassRef, Geodatabase};
use wildfire_rehab_feature::models::{FireNumber, SpatialReference};
use wildfire_rehab_feature::paths::FireLayout;
use wildfire_rehab_reconcile::FeatureKind;

/// Environment variable that points at a config file.
pub const CONFIG_ENV: &str = "WILDFIRE_REHAB_CONFIG";

/// Config file looked for in the working directory.
pub const CONFIG_FILE: &str = "wildfire_rehab.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Folder holding the per-year fire season trees.
    pub fire_season_root: PathBuf,
    /// Feature dataset of the rehab classes.
    pub feature_dataset: String,
    pub point_class: String,
    pub line_class: String,
    /// Dataset that loaded input files are written to.
    pub input_dataset: String,
    /// EPSG code every rehab class is stored in.
    pub rehab_epsg: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fire_season_root: PathBuf::from("FireSeasonWork"),
            feature_dataset: "wildfireBC_Rehab".to_string(),
            point_class: "wildfireBC_rehabPoint".to_string(),
            line_class: "wildfireBC_rehabLine".to_string(),
            input_dataset: "Input".to_string(),
            rehab_epsg: SpatialReference::BC_ALBERS.epsg(),
        }
    }
}

impl Config {
    /// Loads the config from `WILDFIRE_REHAB_CONFIG` or `wildfire_rehab.toml`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file named by the environment variable is
    /// missing, or if a config file cannot be read or parsed.
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Self::from_file(Path::new(&path));
        }

        let path = Path::new(CONFIG_FILE);
        if path.is_file() {
            Self::from_file(path)
        } else {
            log::debug!("No {CONFIG_FILE}; using defaults");
            Ok(Self::default())
        }
    }

    /// Parses the config file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
        let config = toml::from_str(&text)
            .map_err(|e| format!("Failed to parse {}: {e}", path.display()))?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    #[must_use]
    pub const fn rehab_reference(&self) -> SpatialReference {
        SpatialReference(self.rehab_epsg)
    }

    #[must_use]
    pub fn layout(&self, fire: &FireNumber, year: Option<i32>) -> FireLayout {
        FireLayout::new(
            &self.fire_season_root,
            year.unwrap_or_else(current_year),
            fire.clone(),
        )
    }

    /// Opens the fire's rehab geodatabase.
    ///
    /// # Errors
    ///
    /// Returns an error if the geodatabase does not exist.
    pub fn open_gdb(
        &self,
        fire: &FireNumber,
        year: Option<i32>,
    ) -> Result<Geodatabase, Box<dyn std::error::Error>> {
        Ok(Geodatabase::open(self.layout(fire, year).gdb_path())?)
    }

    /// The rehab class holding `kind` features.
    #[must_use]
    pub fn rehab_class(&self, kind: FeatureKind) -> ClassRef {
        let name = match kind {
            FeatureKind::Points => &self.point_class,
            FeatureKind::Lines => &self.line_class,
        };
        ClassRef::new(Some(&self.feature_dataset), name)
    }
}

/// The fire season defaults to the current calendar year.
#[must_use]
pub fn current_year() -> i32 {
    chrono::Local::now().year()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(
            &path,
            "fire_season_root = '/data/FireSeasonWork'\nline_class = 'rehabLines'\n",
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.fire_season_root, PathBuf::from("/data/FireSeasonWork"));
        assert_eq!(config.line_class, "rehabLines");
        assert_eq!(config.point_class, "wildfireBC_rehabPoint");
        assert_eq!(config.rehab_reference(), SpatialReference::BC_ALBERS);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "point_layer = 'x'\n").unwrap();
        assert!(Config::from_file(&path).is_err());
    }

    #[test]
    fn rehab_classes_live_in_the_feature_dataset() {
        let config = Config::default();
        assert_eq!(
            config.rehab_class(FeatureKind::Lines).to_string(),
            "wildfireBC_Rehab/wildfireBC_rehabLine"
        );
    }

    #[test]
    fn layout_uses_given_year() {
        let config = Config::default();
        let fire = FireNumber::parse("G80123").unwrap();
        let layout = config.layout(&fire, Some(2024));
        assert!(
            layout
                .gdb_path()
                .starts_with(Path::new("FireSeasonWork").join("2024"))
        );
    }
}
