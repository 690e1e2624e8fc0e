//! Geometry copy from a collected class into a rehab class.

use std::collections::BTreeMap;
use std::sync::Arc;

use wildfire_rehab_feature::models::{FeatureClass, FieldValue};
use wildfire_rehab_feature::progress::ProgressCallback;
use wildfire_rehab_projection::CoordTransform;

use crate::{FeatureKind, ReconcileError, expect_geometry};

/// Field reset to an empty string on every inserted feature.
pub const FIRE_NUMBER_FIELD: &str = "Fire_Num";

/// Inserts every source geometry into `target`, reprojected into the
/// target's spatial reference. Attributes stay blank apart from
/// `Fire_Num`, which is set to `""` when the target has that field.
///
/// Returns the number of inserted features.
///
/// # Errors
///
/// Returns [`ReconcileError`] if either class has the wrong geometry kind
/// or a geometry cannot be reprojected.
pub fn copy_geometry(
    source: &FeatureClass,
    target: &mut FeatureClass,
    kind: FeatureKind,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<usize, ReconcileError> {
    expect_geometry(source, kind)?;
    expect_geometry(target, kind)?;

    let transform = CoordTransform::new(
        source.schema.spatial_reference,
        target.schema.spatial_reference,
    )?;
    let reset_fire_number = target.has_field(FIRE_NUMBER_FIELD);

    progress.set_total(source.len() as u64);
    let mut inserted = 0;
    for feature in &source.features {
        progress.inc(1);
        let geometry = feature
            .geometry
            .as_ref()
            .map(|g| transform.transform_geometry(g))
            .transpose()?;

        let mut attributes = BTreeMap::new();
        if reset_fire_number {
            attributes.insert(FIRE_NUMBER_FIELD.to_string(), FieldValue::from(""));
        }
        target.insert(geometry, attributes);
        inserted += 1;
    }
    progress.finish(format!("Copied {inserted} geometries"));

    log::info!(
        "Copied {inserted} {kind} from {} into {}",
        source.name,
        target.name
    );
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use geo::Geometry;
    use wildfire_rehab_feature::models::{FieldDef, GeometryKind, Schema, SpatialReference};
    use wildfire_rehab_feature::progress::null_progress;

    use super::*;
    use crate::testing::{add, albers_lines, albers_points, point};

    #[test]
    fn inserts_with_blank_fire_number() {
        let mut source = albers_points("collected", vec![FieldDef::text("name", None)]);
        add(&mut source, point(1.0, 2.0), &[("name", FieldValue::from("x"))]);
        add(&mut source, point(3.0, 4.0), &[]);

        let mut target = albers_points("rehab", vec![FieldDef::text("Fire_Num", Some(10))]);
        add(&mut target, point(9.0, 9.0), &[("Fire_Num", FieldValue::from("C50903"))]);

        let inserted =
            copy_geometry(&source, &mut target, FeatureKind::Points, &null_progress()).unwrap();

        assert_eq!(inserted, 2);
        assert_eq!(target.len(), 3);
        let new = target.feature(2).unwrap();
        assert_eq!(new.get("Fire_Num"), &FieldValue::from(""));
        assert!(new.get("name").is_null());
        assert_eq!(target.feature(1).unwrap().get("Fire_Num"), &FieldValue::from("C50903"));
    }

    #[test]
    fn skips_fire_number_when_target_lacks_it() {
        let mut source = albers_points("collected", vec![]);
        add(&mut source, point(1.0, 2.0), &[]);
        let mut target = albers_points("rehab", vec![]);

        copy_geometry(&source, &mut target, FeatureKind::Points, &null_progress()).unwrap();
        assert!(target.features[0].attributes.is_empty());
    }

    #[test]
    fn reprojects_into_target_reference() {
        let mut source = FeatureClass::new(
            "gps",
            Schema::new(GeometryKind::Point, SpatialReference::WGS84),
        );
        add(&mut source, point(-126.0, 45.0), &[]);
        let mut target = albers_points("rehab", vec![]);

        copy_geometry(&source, &mut target, FeatureKind::Points, &null_progress()).unwrap();

        let Some(Geometry::Point(p)) = &target.features[0].geometry else {
            panic!("expected a point");
        };
        assert!((p.x() - 1_000_000.0).abs() < 1e-6);
        assert!(p.y().abs() < 1e-6);
    }

    #[test]
    fn rejects_mismatched_kinds() {
        let source = albers_lines("collected", vec![]);
        let mut target = albers_points("rehab", vec![]);
        assert!(matches!(
            copy_geometry(&source, &mut target, FeatureKind::Points, &null_progress()),
            Err(ReconcileError::GeometryMismatch { .. })
        ));
        assert!(target.is_empty());
    }
}
