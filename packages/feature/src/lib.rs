#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Storage layer for rehab feature data.
//!
//! A file geodatabase is a directory of feature datasets, each holding
//! feature classes persisted as a `GeoJSON` `FeatureCollection` with a TOML
//! schema sidecar (see [`store`]). [`gdb::Geodatabase`] resolves classes
//! inside that layout, [`edit::EditSession`] scopes a batch of mutations,
//! and [`paths::FireLayout`] knows where a fire's folders and geodatabases
//! live on disk.

pub mod backup;
pub mod edit;
pub mod gdb;
pub mod naming;
pub mod paths;
pub mod progress;
pub mod store;

use std::path::PathBuf;

pub use wildfire_rehab_feature_models as models;

/// Errors that can occur while reading or writing feature data.
#[derive(Debug, thiserror::Error)]
pub enum FeatureError {
    /// I/O error (file read/write).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// `GeoJSON` parsing or geometry conversion failed.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// A schema sidecar could not be parsed.
    #[error("Schema parse error: {0}")]
    SchemaParse(#[from] toml::de::Error),

    /// A schema sidecar could not be written.
    #[error("Schema write error: {0}")]
    SchemaWrite(#[from] toml::ser::Error),

    /// Directory traversal failed.
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// A required file or directory does not exist.
    #[error("Not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The destination of a create or copy already exists.
    #[error("Already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    /// The workspace kind cannot be opened for editing.
    #[error("Unsupported workspace: {0}")]
    UnsupportedWorkspace(String),

    /// Stored data does not have the expected shape.
    #[error("Format error: {message}")]
    Format {
        /// Description of what went wrong.
        message: String,
    },
}
