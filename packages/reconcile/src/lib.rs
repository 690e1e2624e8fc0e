#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Reconciles field-collected features into the rehab feature classes.
//!
//! Source and target features are joined on a rounded-coordinate
//! [`fingerprint::Fingerprint`]: the centroid of a point, or the first and
//! last vertex of a line, rounded to the millimetre in the target's spatial
//! reference. Matched targets receive attribute values ([`attributes`]) and
//! coded domain values translated from free-text labels ([`domains`]).
//! [`pipeline`] chains the stages, each inside its own edit session.
//!
//! The crate also carries the batch jobs that surround an import: loading
//! and reprojecting input files ([`inputs`]) and the line intersection
//! check ([`intersections`]).

pub mod attributes;
pub mod defaults;
pub mod domains;
pub mod fingerprint;
pub mod geometry;
pub mod index;
pub mod inputs;
pub mod intersections;
pub mod mapping;
pub mod pipeline;
pub mod status;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use wildfire_rehab_feature::FeatureError;
use wildfire_rehab_feature::models::{FeatureClass, GeometryKind};
use wildfire_rehab_projection::ProjectionError;

pub use defaults::Defaults;
pub use pipeline::{ImportReport, ImportRequest, Stage, StageOutcome, run_import};

/// Errors that can occur while reconciling feature classes.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    /// Reading or writing feature data failed.
    #[error(transparent)]
    Feature(#[from] FeatureError),

    /// A geometry could not be reprojected.
    #[error(transparent)]
    Projection(#[from] ProjectionError),

    /// A feature class has the wrong geometry kind for the operation.
    #[error("{class} has {found} geometry, expected {expected}")]
    GeometryMismatch {
        class: String,
        expected: GeometryKind,
        found: GeometryKind,
    },

    /// No object ids were selected.
    #[error("No features selected")]
    EmptySelection,

    /// A parameter needed by the requested work was not supplied.
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    /// An import stage failed; later stages did not run.
    #[error("Stage '{stage}' failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: Box<ReconcileError>,
    },
}

/// Which pair of rehab feature classes an operation works on.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FeatureKind {
    Points,
    Lines,
}

impl FeatureKind {
    pub const ALL: &[Self] = &[Self::Points, Self::Lines];

    #[must_use]
    pub const fn geometry(self) -> GeometryKind {
        match self {
            Self::Points => GeometryKind::Point,
            Self::Lines => GeometryKind::Polyline,
        }
    }
}

/// Fails unless `class` stores `kind` geometry.
///
/// # Errors
///
/// Returns [`ReconcileError::GeometryMismatch`] on a mismatch.
pub fn expect_geometry(class: &FeatureClass, kind: FeatureKind) -> Result<(), ReconcileError> {
    let found = class.schema.geometry;
    if found == kind.geometry() {
        Ok(())
    } else {
        Err(ReconcileError::GeometryMismatch {
            class: class.name.clone(),
            expected: kind.geometry(),
            found,
        })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Builders shared by the unit tests.

    use geo::{Geometry, LineString, Point};
    use wildfire_rehab_feature::models::{
        FeatureClass, FieldDef, FieldValue, GeometryKind, Schema, SpatialReference,
    };

    pub fn albers_points(name: &str, fields: Vec<FieldDef>) -> FeatureClass {
        class(name, GeometryKind::Point, fields)
    }

    pub fn albers_lines(name: &str, fields: Vec<FieldDef>) -> FeatureClass {
        class(name, GeometryKind::Polyline, fields)
    }

    fn class(name: &str, geometry: GeometryKind, fields: Vec<FieldDef>) -> FeatureClass {
        let mut schema = Schema::new(geometry, SpatialReference::BC_ALBERS);
        for field in fields {
            schema.add_field(field);
        }
        FeatureClass::new(name, schema)
    }

    pub fn point(x: f64, y: f64) -> Option<Geometry<f64>> {
        Some(Geometry::Point(Point::new(x, y)))
    }

    pub fn line(coords: &[(f64, f64)]) -> Option<Geometry<f64>> {
        Some(Geometry::LineString(LineString::from(coords.to_vec())))
    }

    pub fn add(
        class: &mut FeatureClass,
        geometry: Option<Geometry<f64>>,
        attributes: &[(&str, FieldValue)],
    ) -> i64 {
        class.insert(
            geometry,
            attributes
                .iter()
                .map(|(k, v)| ((*k).to_string(), v.clone()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::albers_lines;

    #[test]
    fn feature_kind_parses_from_cli_text() {
        assert_eq!("points".parse::<FeatureKind>().unwrap(), FeatureKind::Points);
        assert_eq!("lines".parse::<FeatureKind>().unwrap(), FeatureKind::Lines);
        assert!("polygons".parse::<FeatureKind>().is_err());
    }

    #[test]
    fn geometry_mismatch_names_the_class() {
        let lines = albers_lines("wildfireBC_rehabLine", vec![]);
        let err = expect_geometry(&lines, FeatureKind::Points).unwrap_err();
        assert_eq!(
            err.to_string(),
            "wildfireBC_rehabLine has polyline geometry, expected point"
        );
        assert!(expect_geometry(&lines, FeatureKind::Lines).is_ok());
    }
}
