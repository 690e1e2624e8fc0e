//! The operations behind each subcommand and menu entry.

use std::path::{Path, PathBuf};

use wildfire_rehab_cli_utils::{IndicatifProgress, MultiProgress};
use wildfire_rehab_domain::{DomainKind, table};
use wildfire_rehab_feature::backup::backup_geodatabase;
use wildfire_rehab_feature::edit::with_edit;
use wildfire_rehab_feature::gdb::ClassRef;
use wildfire_rehab_feature::models::{FeatureClass, FireNumber, RehabStatus};
use wildfire_rehab_reconcile::inputs::{list_inputs, load_inputs, reproject_batch};
use wildfire_rehab_reconcile::intersections::{OUTPUT_CLASS, detect_intersections};
use wildfire_rehab_reconcile::status::update_status;
use wildfire_rehab_reconcile::{
    Defaults, FeatureKind, ImportRequest, ReconcileError, Stage, run_import,
};
use wildfire_rehab_report::write_reports;

use crate::config::Config;

type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Which fire, and which season folder it is filed under.
#[derive(Debug, Clone)]
pub struct FireArgs {
    pub fire: FireNumber,
    /// Defaults to the current year.
    pub year: Option<i32>,
}

/// Creates the fire's folder tree.
pub fn setup(config: &Config, fire: &FireArgs) -> CommandResult {
    let layout = config.layout(&fire.fire, fire.year);
    let setup = layout.create_folder_tree()?;

    for path in &setup.created {
        println!("Created  {}", path.display());
    }
    for path in &setup.existing {
        println!("Exists   {}", path.display());
    }
    log::info!(
        "Folder setup for {}: {} created, {} already present",
        fire.fire,
        setup.created.len(),
        setup.existing.len()
    );
    Ok(())
}

/// Copies the rehab geodatabase into `Data/Outgoing`.
pub fn backup(config: &Config, fire: &FireArgs) -> CommandResult {
    let layout = config.layout(&fire.fire, fire.year);
    let destination = layout.backup_gdb_path();
    let files = backup_geodatabase(&layout.gdb_path(), &destination)?;
    println!("Backed up {files} file(s) to {}", destination.display());
    Ok(())
}

/// Loads every input file in `folder` into the input dataset.
pub fn load(config: &Config, multi: &MultiProgress, fire: &FireArgs, folder: &Path) -> CommandResult {
    let gdb = config.open_gdb(&fire.fire, fire.year)?;
    let bar = IndicatifProgress::files_bar(multi, "Loading inputs");
    let summary = load_inputs(
        folder,
        &gdb,
        &config.input_dataset,
        config.rehab_reference(),
        &bar,
    )?;
    println!(
        "Processed {}, added {}, skipped {}",
        summary.processed, summary.added, summary.skipped
    );
    Ok(())
}

/// Reprojects WGS 84 inputs into the geodatabase as `<name>_BC` classes.
///
/// A single directory argument is expanded to the input files inside it.
pub fn reproject(
    config: &Config,
    multi: &MultiProgress,
    fire: &FireArgs,
    inputs: &[PathBuf],
    dataset: Option<&str>,
) -> CommandResult {
    let inputs = match inputs {
        [dir] if dir.is_dir() => list_inputs(dir)?,
        _ => inputs.to_vec(),
    };
    let gdb = config.open_gdb(&fire.fire, fire.year)?;
    let bar = IndicatifProgress::files_bar(multi, "Reprojecting");
    let summary = reproject_batch(&inputs, &gdb, dataset, config.rehab_reference(), &bar)?;

    for name in &summary.written {
        println!("Wrote {name}");
    }
    if summary.skipped > 0 {
        println!("Skipped {} input(s) not in WGS 84", summary.skipped);
    }
    Ok(())
}

/// Parameters of [`import`].
#[derive(Debug, Clone)]
pub struct ImportArgs {
    pub kind: FeatureKind,
    /// Collected class, as `dataset/class` or `class`.
    pub source: String,
    /// Empty means every stage.
    pub stages: Vec<Stage>,
    pub fire_name: Option<String>,
    pub status: Option<String>,
}

/// Runs an import of collected features into a rehab class.
pub fn import(
    config: &Config,
    multi: &MultiProgress,
    fire: &FireArgs,
    args: ImportArgs,
) -> CommandResult {
    let gdb = config.open_gdb(&fire.fire, fire.year)?;
    let stages = if args.stages.is_empty() {
        Stage::ALL.to_vec()
    } else {
        args.stages
    };

    let defaults = match (args.fire_name, args.status) {
        (Some(fire_name), Some(status)) => Some(Defaults {
            fire_number: fire.fire.clone(),
            fire_name,
            status,
        }),
        _ => None,
    };

    let request = ImportRequest {
        kind: args.kind,
        source: gdb.class_path(&ClassRef::parse(&args.source)),
        target: gdb.class_path(&config.rehab_class(args.kind)),
        stages,
        defaults,
    };

    let report = run_import(&request, |label| IndicatifProgress::features_bar(multi, label))?;
    for (stage, outcome) in &report.stages {
        println!("{:<40} {outcome}", stage.label());
    }
    Ok(())
}

/// Sets `Status` on the features with the given object ids.
pub fn set_status(
    config: &Config,
    fire: &FireArgs,
    kind: FeatureKind,
    ids: &[i64],
    status: RehabStatus,
) -> CommandResult {
    let gdb = config.open_gdb(&fire.fire, fire.year)?;
    let class = config.rehab_class(kind);
    let updated = with_edit(
        &gdb.class_path(&class),
        "Update status",
        |target: &mut FeatureClass| -> Result<usize, ReconcileError> {
            update_status(target, ids, status)
        },
    )?;
    println!("Set {status} on {updated} feature(s) of {class}");
    Ok(())
}

/// Checks a line class for self-intersections and crossings.
pub fn intersections(
    config: &Config,
    multi: &MultiProgress,
    fire: &FireArgs,
    input: Option<&str>,
    output: Option<&str>,
    ignore_touches: bool,
) -> CommandResult {
    let gdb = config.open_gdb(&fire.fire, fire.year)?;
    let input = input.map_or_else(|| config.rehab_class(FeatureKind::Lines), ClassRef::parse);
    let bar = IndicatifProgress::features_bar(multi, "Checking intersections");

    let (class, count) = detect_intersections(
        &gdb,
        &input,
        output.unwrap_or(OUTPUT_CLASS),
        ignore_touches,
        &bar,
    )?;
    println!("Found {count} intersection(s); written to {class}");
    Ok(())
}

/// Writes the four CSV reports, by default into `Outputs/Reports`.
pub fn reports(config: &Config, fire: &FireArgs, out_dir: Option<PathBuf>) -> CommandResult {
    let layout = config.layout(&fire.fire, fire.year);
    let gdb = config.open_gdb(&fire.fire, fire.year)?;
    let points = gdb.read_class(&config.rehab_class(FeatureKind::Points))?;
    let lines = gdb.read_class(&config.rehab_class(FeatureKind::Lines))?;

    let out_dir = out_dir.unwrap_or_else(|| layout.reports_dir());
    let paths = write_reports(&points, &lines, &fire.fire, &out_dir)?;
    for path in [
        &paths.point_stats,
        &paths.line_stats,
        &paths.point_features,
        &paths.line_features,
    ] {
        println!("Wrote {}", path.display());
    }
    Ok(())
}

/// Looks up a label's code, or a code's label, in one domain.
pub fn domain(kind: DomainKind, label: Option<&str>, code: Option<i64>) -> CommandResult {
    let table = table(kind);

    if let Some(label) = label {
        match table.lookup(label) {
            Some(code) => println!("{label} -> {code}"),
            None => println!("{label}: not in {kind}"),
        }
    }
    if let Some(code) = code {
        match table.decode(code) {
            Some(label) => println!("{code} -> {label}"),
            None => println!("{code}: not in {kind}"),
        }
    }
    if label.is_none() && code.is_none() {
        for entry in table.entries() {
            println!("{:>4}  {}", entry.code, entry.label);
        }
    }
    Ok(())
}
