//! Fills blank fire identification and status fields.

use wildfire_rehab_domain::status::{is_placeholder_status, normalize_status};
use wildfire_rehab_feature::models::{FeatureClass, FieldValue, FireNumber};

const FIRE_NUMBER: &str = "Fire_Num";
const FIRE_NAME: &str = "Fire_Name";
const STATUS: &str = "Status";

/// Values written into blank `Fire_Num`, `Fire_Name` and `Status` fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Defaults {
    pub fire_number: FireNumber,
    pub fire_name: String,
    /// Status as entered; normalized before it is written.
    pub status: String,
}

/// Fills `Fire_Num`, `Fire_Name` and `Status` where they are null or empty.
///
/// A `Status` of `RehabRequiresFieldVerification` counts as blank. Returns
/// the number of features changed; when any of the three fields is missing
/// from `target` nothing is changed.
pub fn fill_defaults(target: &mut FeatureClass, defaults: &Defaults) -> usize {
    let missing: Vec<&str> = [FIRE_NUMBER, FIRE_NAME, STATUS]
        .into_iter()
        .filter(|f| !target.has_field(f))
        .collect();
    if !missing.is_empty() {
        log::warn!(
            "{} is missing field(s) {}; not filling defaults",
            target.name,
            missing.join(", ")
        );
        return 0;
    }

    let status = normalize_status(&defaults.status);
    let fire_number = defaults.fire_number.as_str();
    let mut updated = 0;

    for feature in &mut target.features {
        let mut changed = false;

        if feature.get(FIRE_NUMBER).is_blank() {
            feature.set(FIRE_NUMBER, fire_number);
            changed = true;
        }
        if feature.get(FIRE_NAME).is_blank() {
            feature.set(FIRE_NAME, defaults.fire_name.as_str());
            changed = true;
        }
        let current = feature.get(STATUS);
        if current.is_null() || current.as_str().is_some_and(is_placeholder_status) {
            feature.set(STATUS, FieldValue::from(status.as_str()));
            changed = true;
        }

        if changed {
            updated += 1;
        }
    }

    log::info!("Filled defaults on {updated} feature(s) of {}", target.name);
    updated
}

#[cfg(test)]
mod tests {
    use wildfire_rehab_domain::status::REQUIRES_FIELD_VERIFICATION;
    use wildfire_rehab_feature::models::FieldDef;

    use super::*;
    use crate::testing::{add, albers_points, point};

    fn defaults(status: &str) -> Defaults {
        Defaults {
            fire_number: FireNumber::parse("C50903").unwrap(),
            fire_name: "Hart Lake".to_string(),
            status: status.to_string(),
        }
    }

    fn target() -> FeatureClass {
        albers_points(
            "rehab",
            vec![
                FieldDef::text(FIRE_NUMBER, Some(10)),
                FieldDef::text(FIRE_NAME, Some(50)),
                FieldDef::text(STATUS, Some(50)),
            ],
        )
    }

    #[test]
    fn fills_blanks_and_placeholder_status() {
        let mut target = target();
        let blank = add(&mut target, point(0.0, 0.0), &[(FIRE_NUMBER, FieldValue::from(""))]);
        let placeholder = add(
            &mut target,
            point(1.0, 0.0),
            &[
                (FIRE_NUMBER, FieldValue::from("K20001")),
                (FIRE_NAME, FieldValue::from("Other")),
                (STATUS, FieldValue::from(REQUIRES_FIELD_VERIFICATION)),
            ],
        );

        assert_eq!(fill_defaults(&mut target, &defaults("Complete")), 2);

        let blank = target.feature(blank).unwrap();
        assert_eq!(blank.get(FIRE_NUMBER), &FieldValue::from("C50903"));
        assert_eq!(blank.get(FIRE_NAME), &FieldValue::from("Hart Lake"));
        assert_eq!(blank.get(STATUS), &FieldValue::from("RehabCompleted"));

        let placeholder = target.feature(placeholder).unwrap();
        assert_eq!(placeholder.get(FIRE_NUMBER), &FieldValue::from("K20001"));
        assert_eq!(placeholder.get(STATUS), &FieldValue::from("RehabCompleted"));
    }

    #[test]
    fn other_statuses_are_kept() {
        let mut target = target();
        let oid = add(
            &mut target,
            point(0.0, 0.0),
            &[
                (FIRE_NUMBER, FieldValue::from("C50903")),
                (FIRE_NAME, FieldValue::from("Hart Lake")),
                (STATUS, FieldValue::from("RehabFieldVerified")),
            ],
        );

        assert_eq!(fill_defaults(&mut target, &defaults("Obligations Transferred")), 0);
        assert_eq!(
            target.feature(oid).unwrap().get(STATUS),
            &FieldValue::from("RehabFieldVerified")
        );
    }

    #[test]
    fn unrecognized_status_is_written_verbatim() {
        let mut target = target();
        let oid = add(&mut target, point(0.0, 0.0), &[]);
        fill_defaults(&mut target, &defaults("Pending review"));
        assert_eq!(
            target.feature(oid).unwrap().get(STATUS),
            &FieldValue::from("Pending review")
        );
    }

    #[test]
    fn missing_field_skips_the_pass() {
        let mut target = albers_points("rehab", vec![FieldDef::text(FIRE_NUMBER, Some(10))]);
        let oid = add(&mut target, point(0.0, 0.0), &[]);
        assert_eq!(fill_defaults(&mut target, &defaults("Complete")), 0);
        assert!(target.feature(oid).unwrap().get(FIRE_NUMBER).is_null());
    }
}
