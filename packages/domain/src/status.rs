//! `Status` field vocabulary.

use wildfire_rehab_feature_models::RehabStatus;

/// Status value that default filling treats as blank.
pub const REQUIRES_FIELD_VERIFICATION: &str = "RehabRequiresFieldVerification";

/// Maps the human wording of a status to its stored value.
///
/// Unrecognized input is returned unchanged, so stored values such as
/// `Retired` or `RehabFieldVerified` pass straight through.
#[must_use]
pub fn normalize_status(input: &str) -> String {
    let status = match input {
        "Field Verified" => RehabStatus::RehabFieldVerified,
        "Completed" | "Complete" | "Rehab Completed" | "Rehab Complete" => {
            RehabStatus::RehabCompleted
        }
        "Obligations Transferred" => RehabStatus::RehabObligationsTransferred,
        other => return other.to_string(),
    };
    status.to_string()
}

/// `true` when an existing status may be overwritten by default filling.
#[must_use]
pub fn is_placeholder_status(value: &str) -> bool {
    value.is_empty() || value == REQUIRES_FIELD_VERIFICATION
}
