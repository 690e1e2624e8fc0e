//! Multi-stage import of a collected class into a rehab class.
//!
//! Stages run in a fixed order, each inside its own edit session on the
//! target. A stage that fails is not committed and stops the run; stages
//! committed before it stay committed.

use std::path::PathBuf;
use std::sync::Arc;

use strum_macros::{AsRefStr, Display, EnumString};
use wildfire_rehab_feature::FeatureError;
use wildfire_rehab_feature::edit::with_edit;
use wildfire_rehab_feature::models::FeatureClass;
use wildfire_rehab_feature::progress::ProgressCallback;
use wildfire_rehab_feature::store;

use crate::attributes::{JoinStats, copy_attributes};
use crate::defaults::{Defaults, fill_defaults};
use crate::domains::{DomainStats, copy_domains};
use crate::geometry::copy_geometry;
use crate::{FeatureKind, ReconcileError};

/// One step of an import.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString, AsRefStr,
)]
#[strum(serialize_all = "kebab-case")]
pub enum Stage {
    CopyGeometry,
    CopyAttributes,
    CopyDomains,
    FillDefaults,
}

impl Stage {
    pub const ALL: &[Self] = &[
        Self::CopyGeometry,
        Self::CopyAttributes,
        Self::CopyDomains,
        Self::FillDefaults,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::CopyGeometry => "Copy geometry",
            Self::CopyAttributes => "Copy attributes by location",
            Self::CopyDomains => "Copy domain codes by location",
            Self::FillDefaults => "Fill fire number, name and status",
        }
    }
}

/// What to import and where.
#[derive(Debug, Clone)]
pub struct ImportRequest {
    pub kind: FeatureKind,
    /// Stored collected class.
    pub source: PathBuf,
    /// Stored rehab class that receives the edits.
    pub target: PathBuf,
    /// Stages to run; order and duplicates are ignored.
    pub stages: Vec<Stage>,
    /// Required when [`Stage::FillDefaults`] is selected.
    pub defaults: Option<Defaults>,
}

/// Result of one stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOutcome {
    Inserted(usize),
    Attributes(JoinStats),
    Domains(DomainStats),
    Filled(usize),
}

impl std::fmt::Display for StageOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Inserted(n) => write!(f, "inserted {n}"),
            Self::Attributes(stats) => write!(f, "{stats}"),
            Self::Domains(stats) => write!(f, "{stats}"),
            Self::Filled(n) => write!(f, "filled {n}"),
        }
    }
}

/// Outcomes of a completed import, in stage order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub stages: Vec<(Stage, StageOutcome)>,
}

impl ImportReport {
    #[must_use]
    pub fn outcome(&self, stage: Stage) -> Option<StageOutcome> {
        self.stages
            .iter()
            .find(|(s, _)| *s == stage)
            .map(|(_, outcome)| *outcome)
    }
}

/// Runs the selected stages of `request`.
///
/// `progress` is called once per stage with the stage label and returns the
/// indicator that stage reports to.
///
/// # Errors
///
/// Returns [`ReconcileError::MissingParameter`] before doing any work when
/// no stage is selected or defaults are needed but absent, a
/// [`FeatureError`] when the source or target cannot be read, and
/// [`ReconcileError::Stage`] wrapping the first stage failure.
pub fn run_import(
    request: &ImportRequest,
    progress: impl Fn(&str) -> Arc<dyn ProgressCallback>,
) -> Result<ImportReport, ReconcileError> {
    let mut stages = request.stages.clone();
    stages.sort_unstable();
    stages.dedup();

    if stages.is_empty() {
        return Err(ReconcileError::MissingParameter("stages"));
    }
    if stages.contains(&Stage::FillDefaults) && request.defaults.is_none() {
        return Err(ReconcileError::MissingParameter(
            "fire number, fire name and status",
        ));
    }
    if !request.target.is_file() {
        return Err(FeatureError::NotFound(request.target.clone()).into());
    }

    let source = store::read_feature_class(&request.source)?;
    log::info!(
        "Importing {} from {} into {} ({} stage(s))",
        request.kind,
        request.source.display(),
        request.target.display(),
        stages.len()
    );

    let mut report = ImportReport::default();
    for (i, stage) in stages.iter().copied().enumerate() {
        log::info!("[{}/{}] {}", i + 1, stages.len(), stage.label());
        let bar = progress(stage.label());

        let result = with_edit(
            &request.target,
            stage.label(),
            |target: &mut FeatureClass| -> Result<StageOutcome, ReconcileError> {
                run_stage(stage, request, &source, target, &bar)
            },
        );

        match result {
            Ok(outcome) => {
                log::info!("{}: {outcome}", stage.label());
                report.stages.push((stage, outcome));
            }
            Err(e) => {
                bar.finish_and_clear();
                for skipped in &stages[i + 1..] {
                    log::warn!("{}: not run", skipped.label());
                }
                return Err(ReconcileError::Stage {
                    stage,
                    source: Box::new(e),
                });
            }
        }
    }

    Ok(report)
}

fn run_stage(
    stage: Stage,
    request: &ImportRequest,
    source: &FeatureClass,
    target: &mut FeatureClass,
    bar: &Arc<dyn ProgressCallback>,
) -> Result<StageOutcome, ReconcileError> {
    let kind = request.kind;
    Ok(match stage {
        Stage::CopyGeometry => StageOutcome::Inserted(copy_geometry(source, target, kind, bar)?),
        Stage::CopyAttributes => {
            StageOutcome::Attributes(copy_attributes(source, target, kind, bar)?)
        }
        Stage::CopyDomains => StageOutcome::Domains(copy_domains(source, target, kind, bar)?),
        Stage::FillDefaults => {
            let defaults = request
                .defaults
                .as_ref()
                .ok_or(ReconcileError::MissingParameter("defaults"))?;
            StageOutcome::Filled(fill_defaults(target, defaults))
        }
    })
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use wildfire_rehab_feature::models::{FieldDef, FieldValue, FireNumber};
    use wildfire_rehab_feature::progress::null_progress;

    use super::*;
    use crate::testing::{add, albers_lines, albers_points, point};

    fn rehab_points() -> FeatureClass {
        albers_points(
            "wildfireBC_rehabPoint",
            vec![
                FieldDef::text("Fire_Num", Some(10)),
                FieldDef::text("Fire_Name", Some(50)),
                FieldDef::text("Status", Some(50)),
                FieldDef::text("Label", Some(50)),
                FieldDef::text("RPtType", Some(5)),
            ],
        )
    }

    fn collected_points() -> FeatureClass {
        let mut source = albers_points(
            "collected",
            vec![FieldDef::text("name", None), FieldDef::text("sym_name", None)],
        );
        add(
            &mut source,
            point(100.0006, 200.0004),
            &[
                ("name", FieldValue::from("P1")),
                ("sym_name", FieldValue::from("Dry Seed (DS)")),
            ],
        );
        source
    }

    fn write(dir: &Path, name: &str, class: &FeatureClass) -> PathBuf {
        let path = dir.join(format!("{name}.geojson"));
        store::write_feature_class(&path, class).unwrap();
        path
    }

    fn request(source: PathBuf, target: PathBuf, stages: &[Stage]) -> ImportRequest {
        ImportRequest {
            kind: FeatureKind::Points,
            source,
            target,
            stages: stages.to_vec(),
            defaults: Some(Defaults {
                fire_number: FireNumber::parse("C50903").unwrap(),
                fire_name: "Hart Lake".to_string(),
                status: "Field Verified".to_string(),
            }),
        }
    }

    #[test]
    fn full_point_import() {
        let dir = tempfile::tempdir().unwrap();
        let source = write(dir.path(), "collected", &collected_points());
        let target = write(dir.path(), "rehab", &rehab_points());

        let report = run_import(
            &request(source, target.clone(), Stage::ALL),
            |_| null_progress(),
        )
        .unwrap();

        assert_eq!(report.outcome(Stage::CopyGeometry), Some(StageOutcome::Inserted(1)));
        assert_eq!(report.stages.len(), 4);

        let stored = store::read_feature_class(&target).unwrap();
        let feature = &stored.features[0];
        assert_eq!(feature.get("Label"), &FieldValue::from("P1"));
        assert_eq!(feature.get("RPtType"), &FieldValue::from("19"));
        assert_eq!(feature.get("Fire_Num"), &FieldValue::from("C50903"));
        assert_eq!(feature.get("Status"), &FieldValue::from("RehabFieldVerified"));
    }

    #[test]
    fn stages_run_in_fixed_order() {
        let dir = tempfile::tempdir().unwrap();
        let source = write(dir.path(), "collected", &collected_points());
        let target = write(dir.path(), "rehab", &rehab_points());

        let report = run_import(
            &request(
                source,
                target,
                &[Stage::CopyAttributes, Stage::CopyGeometry, Stage::CopyGeometry],
            ),
            |_| null_progress(),
        )
        .unwrap();

        let order: Vec<Stage> = report.stages.iter().map(|(s, _)| *s).collect();
        assert_eq!(order, vec![Stage::CopyGeometry, Stage::CopyAttributes]);
    }

    #[test]
    fn failing_stage_stops_but_keeps_earlier_commits() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = albers_lines("collected", vec![]);
        add(&mut source, crate::testing::line(&[(0.0, 0.0), (1.0, 1.0)]), &[]);
        let source = write(dir.path(), "collected", &source);
        let target = write(dir.path(), "rehab", &rehab_points());

        let mut req = request(source, target.clone(), &[Stage::CopyGeometry, Stage::FillDefaults]);
        req.kind = FeatureKind::Lines;

        let err = run_import(&req, |_| null_progress()).unwrap_err();
        assert!(matches!(
            err,
            ReconcileError::Stage {
                stage: Stage::CopyGeometry,
                ..
            }
        ));
        assert!(store::read_feature_class(&target).unwrap().is_empty());
    }

    #[test]
    fn fill_defaults_requires_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let source = write(dir.path(), "collected", &collected_points());
        let target = write(dir.path(), "rehab", &rehab_points());
        let mut req = request(source, target.clone(), &[Stage::CopyGeometry, Stage::FillDefaults]);
        req.defaults = None;

        assert!(matches!(
            run_import(&req, |_| null_progress()),
            Err(ReconcileError::MissingParameter(_))
        ));
        assert!(store::read_feature_class(&target).unwrap().is_empty());
    }

    #[test]
    fn missing_target_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let source = write(dir.path(), "collected", &collected_points());
        let req = request(source, dir.path().join("nope.geojson"), &[Stage::CopyGeometry]);
        assert!(matches!(
            run_import(&req, |_| null_progress()),
            Err(ReconcileError::Feature(FeatureError::NotFound(_)))
        ));
    }

    #[test]
    fn stage_names_parse() {
        assert_eq!("copy-domains".parse::<Stage>().unwrap(), Stage::CopyDomains);
        assert_eq!(Stage::FillDefaults.to_string(), "fill-defaults");
    }
}
