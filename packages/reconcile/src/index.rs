//! Fingerprint index over a source feature class.

use std::collections::HashMap;

use wildfire_rehab_feature::models::{Feature, FeatureClass, GeometryKind, SpatialReference};
use wildfire_rehab_projection::CoordTransform;

use crate::ReconcileError;
use crate::fingerprint::Fingerprint;

/// Source features keyed by their fingerprint in the target's spatial
/// reference.
///
/// When two source features share a fingerprint the later one wins.
#[derive(Debug)]
pub struct SourceIndex<'a> {
    kind: GeometryKind,
    entries: HashMap<Fingerprint, &'a Feature>,
}

impl<'a> SourceIndex<'a> {
    /// Indexes `source`, reprojecting each geometry into `target_sr` before
    /// fingerprinting. Features without a geometry are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::Projection`] if no transform exists or a
    /// geometry cannot be reprojected.
    pub fn build(
        source: &'a FeatureClass,
        target_sr: SpatialReference,
    ) -> Result<Self, ReconcileError> {
        let kind = source.schema.geometry;
        let transform = CoordTransform::new(source.schema.spatial_reference, target_sr)?;
        let mut entries = HashMap::with_capacity(source.len());

        for feature in &source.features {
            let Some(geometry) = &feature.geometry else {
                continue;
            };
            let projected = transform.transform_geometry(geometry)?;
            let Some(fingerprint) = Fingerprint::of(kind, &projected) else {
                continue;
            };
            if let Some(previous) = entries.insert(fingerprint, feature) {
                log::debug!(
                    "{}: OBJECTID {} replaces OBJECTID {} at {fingerprint}",
                    source.name,
                    feature.object_id,
                    previous.object_id
                );
            }
        }

        log::info!(
            "Indexed {} source feature(s) from {}",
            entries.len(),
            source.name
        );

        Ok(Self { kind, entries })
    }

    /// Fingerprint of a target feature, computed the same way as the keys.
    #[must_use]
    pub fn fingerprint(&self, feature: &Feature) -> Option<Fingerprint> {
        feature
            .geometry
            .as_ref()
            .and_then(|g| Fingerprint::of(self.kind, g))
    }

    #[must_use]
    pub fn get(&self, fingerprint: &Fingerprint) -> Option<&'a Feature> {
        self.entries.get(fingerprint).copied()
    }

    /// Looks up the source feature coinciding with `target`.
    #[must_use]
    pub fn find(&self, target: &Feature) -> Option<(Fingerprint, &'a Feature)> {
        let fingerprint = self.fingerprint(target)?;
        self.get(&fingerprint).map(|source| (fingerprint, source))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
