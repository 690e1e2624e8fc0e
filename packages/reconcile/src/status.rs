//! Bulk `Status` updates on selected features.

use wildfire_rehab_feature::models::{FeatureClass, FieldValue, RehabStatus};

use crate::ReconcileError;

const STATUS: &str = "Status";

/// Sets `Status` to `status` on every feature whose object id is in
/// `selection`. Returns the number of features changed.
///
/// Object ids that are not in `target` are warned about and ignored.
///
/// # Errors
///
/// Returns [`ReconcileError::EmptySelection`] when `selection` is empty.
pub fn update_status(
    target: &mut FeatureClass,
    selection: &[i64],
    status: RehabStatus,
) -> Result<usize, ReconcileError> {
    if selection.is_empty() {
        return Err(ReconcileError::EmptySelection);
    }
    if !target.has_field(STATUS) {
        log::warn!("{} has no '{STATUS}' field; nothing updated", target.name);
        return Ok(0);
    }

    let mut updated = 0;
    for oid in selection {
        match target.feature_mut(*oid) {
            Some(feature) => {
                feature.set(STATUS, FieldValue::from(status.as_ref()));
                updated += 1;
            }
            None => log::warn!("{} has no feature with OBJECTID {oid}", target.name),
        }
    }

    log::info!("Set {STATUS} = {status} on {updated} feature(s) of {}", target.name);
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use wildfire_rehab_feature::models::FieldDef;

    use super::*;
    use crate::testing::{add, albers_points, point};

    fn target() -> FeatureClass {
        let mut target = albers_points("rehab", vec![FieldDef::text(STATUS, Some(50))]);
        add(&mut target, point(0.0, 0.0), &[(STATUS, FieldValue::from("RehabCompleted"))]);
        add(&mut target, point(1.0, 0.0), &[]);
        target
    }

    #[test]
    fn retires_selected_features() {
        let mut target = target();
        assert_eq!(update_status(&mut target, &[2], RehabStatus::Retired).unwrap(), 1);
        assert_eq!(target.feature(2).unwrap().get(STATUS), &FieldValue::from("Retired"));
        assert_eq!(
            target.feature(1).unwrap().get(STATUS),
            &FieldValue::from("RehabCompleted")
        );
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let mut target = target();
        assert_eq!(
            update_status(&mut target, &[1, 42], RehabStatus::RehabPfrArchCompleted).unwrap(),
            1
        );
        assert_eq!(
            target.feature(1).unwrap().get(STATUS),
            &FieldValue::from("RehabPFR/ArchCompleted")
        );
    }

    #[test]
    fn empty_selection_is_an_error() {
        let mut target = target();
        assert!(matches!(
            update_status(&mut target, &[], RehabStatus::Retired),
            Err(ReconcileError::EmptySelection)
        ));
    }
}
