//! Menu-driven front end for the subcommands.

use std::path::PathBuf;

use dialoguer::{Confirm, MultiSelect, Select};
use wildfire_rehab_cli_utils::{MultiProgress, prompt_optional, prompt_text};
use wildfire_rehab_domain::DomainKind;
use wildfire_rehab_feature::models::{FireNumber, RehabStatus};
use wildfire_rehab_reconcile::intersections::OUTPUT_CLASS;
use wildfire_rehab_reconcile::{FeatureKind, Stage};

use crate::commands::{self, FireArgs, ImportArgs};
use crate::config::{Config, current_year};

/// Top-level actions in the menu.
enum Action {
    Setup,
    Backup,
    LoadInputs,
    Reproject,
    ImportPoints,
    ImportLines,
    UpdateStatus,
    Intersections,
    Reports,
    Domain,
}

impl Action {
    const ALL: &[Self] = &[
        Self::Setup,
        Self::Backup,
        Self::LoadInputs,
        Self::Reproject,
        Self::ImportPoints,
        Self::ImportLines,
        Self::UpdateStatus,
        Self::Intersections,
        Self::Reports,
        Self::Domain,
    ];

    const fn label(&self) -> &'static str {
        match self {
            Self::Setup => "Set up fire folders",
            Self::Backup => "Back up rehab geodatabase",
            Self::LoadInputs => "Load input files",
            Self::Reproject => "Reproject WGS 84 inputs",
            Self::ImportPoints => "Import collected points",
            Self::ImportLines => "Import collected lines",
            Self::UpdateStatus => "Update status of features",
            Self::Intersections => "Check line intersections",
            Self::Reports => "Write CSV reports",
            Self::Domain => "Look up a domain code",
        }
    }
}

/// Prompts for an action and its parameters, then runs it.
///
/// # Errors
///
/// Returns an error if a prompt fails or the chosen action fails.
pub fn run(config: &Config, multi: &MultiProgress) -> Result<(), Box<dyn std::error::Error>> {
    println!("Wildfire Rehab Toolchain");
    println!();

    let labels: Vec<&str> = Action::ALL.iter().map(Action::label).collect();
    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    match Action::ALL[idx] {
        Action::Setup => commands::setup(config, &prompt_fire()?),
        Action::Backup => commands::backup(config, &prompt_fire()?),
        Action::LoadInputs => {
            let fire = prompt_fire()?;
            let folder = prompt_text("Folder of input files", None)?;
            commands::load(config, multi, &fire, &PathBuf::from(folder))
        }
        Action::Reproject => {
            let fire = prompt_fire()?;
            let inputs = prompt_text("Input file or folder", None)?;
            let dataset = prompt_optional("Feature dataset (empty for root)")?;
            commands::reproject(config, multi, &fire, &[PathBuf::from(inputs)], dataset.as_deref())
        }
        Action::ImportPoints => import(config, multi, FeatureKind::Points),
        Action::ImportLines => import(config, multi, FeatureKind::Lines),
        Action::UpdateStatus => update_status(config),
        Action::Intersections => {
            let fire = prompt_fire()?;
            let output = prompt_text("Output class name", Some(OUTPUT_CLASS))?;
            let ignore_touches = Confirm::new()
                .with_prompt("Ignore lines that only meet at endpoints?")
                .default(true)
                .interact()?;
            commands::intersections(config, multi, &fire, None, Some(&output), ignore_touches)
        }
        Action::Reports => commands::reports(config, &prompt_fire()?, None),
        Action::Domain => domain(),
    }
}

fn prompt_fire() -> Result<FireArgs, Box<dyn std::error::Error>> {
    let fire: FireNumber = prompt_text("Fire number", None)?.parse()?;
    let year: i32 = prompt_text("Fire season year", Some(&current_year().to_string()))?.parse()?;
    Ok(FireArgs {
        fire,
        year: Some(year),
    })
}

fn import(
    config: &Config,
    multi: &MultiProgress,
    kind: FeatureKind,
) -> Result<(), Box<dyn std::error::Error>> {
    let fire = prompt_fire()?;
    let source = prompt_text("Collected class (dataset/class)", None)?;

    let labels: Vec<&str> = Stage::ALL.iter().map(|s| s.label()).collect();
    let defaults: Vec<bool> = vec![true; labels.len()];
    let selected = MultiSelect::new()
        .with_prompt("Stages to run (space=toggle, enter=confirm)")
        .items(&labels)
        .defaults(&defaults)
        .interact()?;
    if selected.is_empty() {
        println!("No stages selected.");
        return Ok(());
    }
    let stages: Vec<Stage> = selected.iter().map(|&i| Stage::ALL[i]).collect();

    let (fire_name, status) = if stages.contains(&Stage::FillDefaults) {
        (
            Some(prompt_text("Fire name", None)?),
            Some(prompt_text("Status", Some("Completed"))?),
        )
    } else {
        (None, None)
    };

    commands::import(
        config,
        multi,
        &fire,
        ImportArgs {
            kind,
            source,
            stages,
            fire_name,
            status,
        },
    )
}

fn update_status(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let fire = prompt_fire()?;
    let kinds: Vec<String> = FeatureKind::ALL.iter().map(ToString::to_string).collect();
    let kind = FeatureKind::ALL[Select::new()
        .with_prompt("Which class?")
        .items(&kinds)
        .default(0)
        .interact()?];

    let ids = prompt_text("Object ids (comma-separated)", None)?
        .split(',')
        .map(|id| id.trim().parse::<i64>())
        .collect::<Result<Vec<_>, _>>()?;

    let statuses: Vec<String> = RehabStatus::ALL.iter().map(ToString::to_string).collect();
    let status = RehabStatus::ALL[Select::new()
        .with_prompt("New status")
        .items(&statuses)
        .default(0)
        .interact()?];

    commands::set_status(config, &fire, kind, &ids, status)
}

fn domain() -> Result<(), Box<dyn std::error::Error>> {
    let kinds: Vec<String> = DomainKind::ALL.iter().map(ToString::to_string).collect();
    let kind = DomainKind::ALL[Select::new()
        .with_prompt("Domain")
        .items(&kinds)
        .default(0)
        .interact()?];

    let label = prompt_optional("Label (empty to list the table)")?;
    commands::domain(kind, label.as_deref(), None)
}
