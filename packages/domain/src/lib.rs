#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Coded-value domains for rehab features.
//!
//! Field crews record treatments as free-text labels ("Dry Seed (DS)",
//! "Dry Seed DS", ...). The rehab geodatabase stores small integer codes.
//! A [`DomainTable`] maps normalized labels to codes (see
//! [`normalize_label`]) and decodes codes back to a display label for
//! reports. The tables themselves live in `domains/*.toml` and are embedded
//! at compile time (see [`registry`]).

pub mod normalize;
pub mod registry;
pub mod status;
pub mod table;

pub use normalize::normalize_label;
pub use registry::{DomainKind, line_codes, table};
pub use table::{DomainEntry, DomainTable};

/// Errors that can occur while loading domain tables.
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    /// A domain table file is not valid TOML or has the wrong shape.
    #[error("Domain table parse error in {name}: {source}")]
    Parse {
        name: String,
        #[source]
        source: toml::de::Error,
    },
}
