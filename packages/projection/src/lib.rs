#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Coordinate transforms for rehab data.
//!
//! Field data arrives in WGS 84 (or NAD83) longitude/latitude; the rehab
//! geodatabase is in NAD83 / BC Environment Albers. A [`CoordTransform`]
//! is built once for a source/target [`SpatialReference`] pair and then
//! applied to coordinates or whole geometries. The projection math is
//! done by `proj4rs`.
//!
//! NAD83 and WGS 84 are treated as coincident; they differ by roughly a
//! metre across the province.

use std::fmt;

use geo::MapCoords;
use proj4rs::Proj;
use wildfire_rehab_feature_models::SpatialReference;

/// Geographic longitude/latitude, used for both EPSG 4326 and 4269.
const GEOGRAPHIC_DEF: &str = "+proj=longlat +datum=WGS84 +no_defs";

/// EPSG 3005, NAD83 / BC Environment Albers.
const BC_ALBERS_DEF: &str = "+proj=aea +lat_0=45 +lon_0=-126 +lat_1=50 +lat_2=58.5 \
     +x_0=1000000 +y_0=0 +ellps=GRS80 +towgs84=0,0,0,0,0,0,0 +units=m +no_defs";

/// EPSG 3857, spherical Web Mercator.
const WEB_MERCATOR_DEF: &str =
    "+proj=merc +a=6378137 +b=6378137 +lat_ts=0 +lon_0=0 +x_0=0 +y_0=0 +k=1 +units=m +no_defs";

/// Latitude limit of the square Web Mercator world.
pub const MERCATOR_MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// Errors that can occur while transforming coordinates.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProjectionError {
    /// No transform is known between the two spatial references.
    #[error("Unsupported transform from {from} to {to}")]
    Unsupported {
        from: SpatialReference,
        to: SpatialReference,
    },

    /// The projection definition of a spatial reference was rejected.
    #[error("Invalid definition for {reference}: {message}")]
    Definition {
        reference: SpatialReference,
        message: String,
    },

    /// A coordinate falls outside the valid area of the target projection.
    #[error("Coordinate ({x}, {y}) is outside the range of {to}")]
    OutOfRange { x: f64, y: f64, to: SpatialReference },

    /// The projection library failed on a coordinate.
    #[error("Failed to transform ({x}, {y}) to {to}: {message}")]
    Transform {
        x: f64,
        y: f64,
        to: SpatialReference,
        message: String,
    },
}

const fn definition(reference: SpatialReference) -> Option<&'static str> {
    match reference {
        SpatialReference::WGS84 | SpatialReference::NAD83 => Some(GEOGRAPHIC_DEF),
        SpatialReference::BC_ALBERS => Some(BC_ALBERS_DEF),
        SpatialReference::WEB_MERCATOR => Some(WEB_MERCATOR_DEF),
        _ => None,
    }
}

const fn is_geographic(reference: SpatialReference) -> bool {
    matches!(reference, SpatialReference::WGS84 | SpatialReference::NAD83)
}

fn parse(reference: SpatialReference, def: &str) -> Result<Proj, ProjectionError> {
    Proj::from_proj_string(def).map_err(|e| ProjectionError::Definition {
        reference,
        message: e.to_string(),
    })
}

/// A reusable transform from one spatial reference to another.
pub struct CoordTransform {
    from: SpatialReference,
    to: SpatialReference,
    /// Source and target projections; `None` for identity transforms.
    projs: Option<(Proj, Proj)>,
}

impl fmt::Debug for CoordTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoordTransform")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("identity", &self.is_identity())
            .finish()
    }
}

impl CoordTransform {
    /// Builds the transform from `from` to `to`.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectionError::Unsupported`] if either spatial reference
    /// is not one of EPSG 4326, 4269, 3005 or 3857.
    pub fn new(from: SpatialReference, to: SpatialReference) -> Result<Self, ProjectionError> {
        let (Some(from_def), Some(to_def)) = (definition(from), definition(to)) else {
            return Err(ProjectionError::Unsupported { from, to });
        };

        let projs = if from == to || (is_geographic(from) && is_geographic(to)) {
            None
        } else {
            Some((parse(from, from_def)?, parse(to, to_def)?))
        };

        log::debug!(
            "Transform {from} -> {to}{}",
            if projs.is_none() { " (identity)" } else { "" }
        );
        Ok(Self { from, to, projs })
    }

    #[must_use]
    pub const fn source(&self) -> SpatialReference {
        self.from
    }

    #[must_use]
    pub const fn target(&self) -> SpatialReference {
        self.to
    }

    /// `true` when coordinates pass through unchanged.
    #[must_use]
    pub const fn is_identity(&self) -> bool {
        self.projs.is_none()
    }

    /// Transforms a single coordinate. Geographic coordinates are in
    /// degrees on both sides.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectionError::OutOfRange`] if the coordinate cannot be
    /// represented in the target projection, or
    /// [`ProjectionError::Transform`] if the projection library rejects it.
    pub fn transform_coord(&self, x: f64, y: f64) -> Result<(f64, f64), ProjectionError> {
        let Some((src, dst)) = &self.projs else {
            return Ok((x, y));
        };

        if self.to == SpatialReference::WEB_MERCATOR
            && is_geographic(self.from)
            && y.abs() > MERCATOR_MAX_LATITUDE
        {
            return Err(ProjectionError::OutOfRange { x, y, to: self.to });
        }

        let mut point = if is_geographic(self.from) {
            (x.to_radians(), y.to_radians(), 0.0)
        } else {
            (x, y, 0.0)
        };
        proj4rs::transform::transform(src, dst, &mut point).map_err(|e| {
            ProjectionError::Transform {
                x,
                y,
                to: self.to,
                message: e.to_string(),
            }
        })?;

        if is_geographic(self.to) {
            Ok((point.0.to_degrees(), point.1.to_degrees()))
        } else {
            Ok((point.0, point.1))
        }
    }

    /// Transforms every coordinate of a geometry.
    ///
    /// # Errors
    ///
    /// Returns the first [`ProjectionError`] hit by any coordinate.
    pub fn transform_geometry(
        &self,
        geometry: &geo::Geometry<f64>,
    ) -> Result<geo::Geometry<f64>, ProjectionError> {
        if self.is_identity() {
            return Ok(geometry.clone());
        }
        geometry.try_map_coords(|coord| {
            self.transform_coord(coord.x, coord.y)
                .map(|(x, y)| geo::coord! { x: x, y: y })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn near(actual: (f64, f64), expected: (f64, f64), tolerance: f64) -> bool {
        (actual.0 - expected.0).abs() < tolerance && (actual.1 - expected.1).abs() < tolerance
    }

    #[test]
    fn same_reference_is_identity() {
        let t = CoordTransform::new(SpatialReference::BC_ALBERS, SpatialReference::BC_ALBERS)
            .unwrap();
        assert!(t.is_identity());
        assert_eq!(t.transform_coord(1.5, 2.5).unwrap(), (1.5, 2.5));
    }

    #[test]
    fn nad83_and_wgs84_are_coincident() {
        let t = CoordTransform::new(SpatialReference::NAD83, SpatialReference::WGS84).unwrap();
        assert!(t.is_identity());
    }

    #[test]
    fn unknown_reference_is_unsupported() {
        assert!(matches!(
            CoordTransform::new(SpatialReference(32610), SpatialReference::BC_ALBERS),
            Err(ProjectionError::Unsupported {
                from: SpatialReference(32610),
                to: SpatialReference::BC_ALBERS,
            })
        ));
    }

    #[test]
    fn albers_origin_maps_to_false_easting() {
        let t = CoordTransform::new(SpatialReference::WGS84, SpatialReference::BC_ALBERS)
            .unwrap();
        assert!(near(t.transform_coord(-126.0, 45.0).unwrap(), (1_000_000.0, 0.0), 1e-3));
    }

    #[test]
    fn wgs84_to_albers_geometry() {
        let t = CoordTransform::new(SpatialReference::WGS84, SpatialReference::BC_ALBERS)
            .unwrap();
        let line: geo::Geometry<f64> =
            geo::LineString::from(vec![(-126.0, 45.0), (-123.3656, 48.4284)]).into();
        let projected = t.transform_geometry(&line).unwrap();

        let geo::Geometry::LineString(ls) = projected else {
            panic!("expected a line string");
        };
        assert!((ls.0[0].x - 1_000_000.0).abs() < 1e-3);
        assert!((ls.0[1].x - 1_195_327.903).abs() < 0.01);
    }

    #[test]
    fn albers_round_trips_to_degrees() {
        let forward =
            CoordTransform::new(SpatialReference::NAD83, SpatialReference::BC_ALBERS).unwrap();
        let inverse =
            CoordTransform::new(SpatialReference::BC_ALBERS, SpatialReference::NAD83).unwrap();

        let (x, y) = forward.transform_coord(-122.75, 53.92).unwrap();
        assert!(near(inverse.transform_coord(x, y).unwrap(), (-122.75, 53.92), 1e-8));
    }

    #[test]
    fn wgs84_to_web_mercator_easting() {
        let t = CoordTransform::new(SpatialReference::WGS84, SpatialReference::WEB_MERCATOR)
            .unwrap();
        let (x, _) = t.transform_coord(-122.75, 53.92).unwrap();
        assert!((x - -13_664_467.495).abs() < 0.01);
    }

    #[test]
    fn mercator_to_albers_goes_through_geographic() {
        let to_merc =
            CoordTransform::new(SpatialReference::WGS84, SpatialReference::WEB_MERCATOR).unwrap();
        let merc_to_albers =
            CoordTransform::new(SpatialReference::WEB_MERCATOR, SpatialReference::BC_ALBERS)
                .unwrap();
        let direct =
            CoordTransform::new(SpatialReference::WGS84, SpatialReference::BC_ALBERS).unwrap();

        let (mx, my) = to_merc.transform_coord(-122.75, 53.92).unwrap();
        let via = merc_to_albers.transform_coord(mx, my).unwrap();
        let expected = direct.transform_coord(-122.75, 53.92).unwrap();
        assert!(near(via, expected, 1e-3));
    }

    #[test]
    fn polar_point_is_out_of_range_for_mercator() {
        let t = CoordTransform::new(SpatialReference::WGS84, SpatialReference::WEB_MERCATOR)
            .unwrap();
        assert!(matches!(
            t.transform_coord(0.0, 89.9),
            Err(ProjectionError::OutOfRange { .. })
        ));
    }
}
