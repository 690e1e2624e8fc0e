#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end for the wildfire rehab toolchain.
//!
//! Each subcommand maps to one step of a fire's rehab workflow: folder
//! setup, backup, loading and reprojecting collected data, importing it
//! into the rehab classes, status updates, the line intersection check and
//! the CSV reports. Run without a subcommand for an interactive menu.
//!
//! Uses `indicatif-log-bridge` (via [`wildfire_rehab_cli_utils::init_logger`])
//! so log lines and progress bars never fight for the terminal.

mod commands;
mod config;
mod interactive;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use wildfire_rehab_domain::DomainKind;
use wildfire_rehab_feature::models::{FireNumber, RehabStatus};
use wildfire_rehab_reconcile::{FeatureKind, Stage};

use crate::commands::{FireArgs, ImportArgs};
use crate::config::Config;

#[derive(Parser)]
#[command(name = "wildfire_rehab", about = "Wildfire rehab data toolchain")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct FireOpts {
    /// Fire number (e.g., "C50903")
    #[arg(long)]
    fire: FireNumber,
    /// Fire season year (defaults to the current year)
    #[arg(long)]
    year: Option<i32>,
}

impl From<FireOpts> for FireArgs {
    fn from(opts: FireOpts) -> Self {
        Self {
            fire: opts.fire,
            year: opts.year,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create the fire's folder tree (Outputs/Maps, Outputs/KML, ...)
    Setup {
        #[command(flatten)]
        fire: FireOpts,
    },
    /// Copy the rehab geodatabase to `Data/Outgoing`
    Backup {
        #[command(flatten)]
        fire: FireOpts,
    },
    /// Load every input file in a folder into the `Input` dataset
    LoadInputs {
        #[command(flatten)]
        fire: FireOpts,
        /// Folder holding the collected files
        folder: PathBuf,
    },
    /// Reproject WGS 84 input files to the rehab projection (`<name>_BC`)
    Reproject {
        #[command(flatten)]
        fire: FireOpts,
        /// Input files, or a single folder of them
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Feature dataset to write into (root if not given)
        #[arg(long)]
        dataset: Option<String>,
    },
    /// Import collected features into a rehab class
    Import {
        #[command(flatten)]
        fire: FireOpts,
        /// Which rehab class to import into
        #[arg(long)]
        kind: FeatureKind,
        /// Collected class in the geodatabase (`dataset/class` or `class`)
        #[arg(long)]
        source: String,
        /// Comma-separated stages (copy-geometry, copy-attributes,
        /// copy-domains, fill-defaults). All when not given.
        #[arg(long, value_delimiter = ',')]
        stages: Vec<Stage>,
        /// Fire name written into blank `Fire_Name` fields
        #[arg(long)]
        fire_name: Option<String>,
        /// Status written into blank `Status` fields (e.g., "Completed")
        #[arg(long)]
        status: Option<String>,
    },
    /// Set `Status` on selected features
    UpdateStatus {
        #[command(flatten)]
        fire: FireOpts,
        #[arg(long)]
        kind: FeatureKind,
        /// Comma-separated object ids
        #[arg(long, value_delimiter = ',', required = true)]
        ids: Vec<i64>,
        /// New status (e.g., "Retired", "RehabPFR/ArchCompleted")
        #[arg(long)]
        status: RehabStatus,
    },
    /// Find self-intersections and crossings in a line class
    Intersections {
        #[command(flatten)]
        fire: FireOpts,
        /// Line class to check (defaults to the rehab line class)
        #[arg(long)]
        input: Option<String>,
        /// Output class name
        #[arg(long)]
        output: Option<String>,
        /// Do not report lines that only meet at endpoints
        #[arg(long)]
        ignore_touches: bool,
    },
    /// Write the point and line CSV reports
    Reports {
        #[command(flatten)]
        fire: FireOpts,
        /// Output folder (defaults to `Outputs/Reports`)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Look up codes in a domain table, or list it
    Domain {
        /// Domain (point_treatment, line_treatment, fire_line, line_width,
        /// avg_slope)
        kind: DomainKind,
        /// Label to translate to a code
        label: Option<String>,
        /// Code to translate to its label
        #[arg(long)]
        code: Option<i64>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = wildfire_rehab_cli_utils::init_logger();
    let cli = Cli::parse();
    let config = Config::load()?;

    let Some(command) = cli.command else {
        return interactive::run(&config, &multi);
    };

    match command {
        Commands::Setup { fire } => commands::setup(&config, &fire.into())?,
        Commands::Backup { fire } => commands::backup(&config, &fire.into())?,
        Commands::LoadInputs { fire, folder } => {
            commands::load(&config, &multi, &fire.into(), &folder)?;
        }
        Commands::Reproject {
            fire,
            inputs,
            dataset,
        } => commands::reproject(&config, &multi, &fire.into(), &inputs, dataset.as_deref())?,
        Commands::Import {
            fire,
            kind,
            source,
            stages,
            fire_name,
            status,
        } => commands::import(
            &config,
            &multi,
            &fire.into(),
            ImportArgs {
                kind,
                source,
                stages,
                fire_name,
                status,
            },
        )?,
        Commands::UpdateStatus {
            fire,
            kind,
            ids,
            status,
        } => commands::set_status(&config, &fire.into(), kind, &ids, status)?,
        Commands::Intersections {
            fire,
            input,
            output,
            ignore_touches,
        } => commands::intersections(
            &config,
            &multi,
            &fire.into(),
            input.as_deref(),
            output.as_deref(),
            ignore_touches,
        )?,
        Commands::Reports { fire, out } => commands::reports(&config, &fire.into(), out)?,
        Commands::Domain { kind, label, code } => {
            commands::domain(kind, label.as_deref(), code)?;
        }
    }

    Ok(())
}
