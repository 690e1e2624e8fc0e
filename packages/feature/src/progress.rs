//! Progress reporting for long-running feature passes.
//!
//! Reconciliation stages and report exports walk every feature of a class.
//! They report through [`ProgressCallback`] so the CLI can render bars while
//! library callers and tests stay silent.

use std::sync::Arc;

/// Receives progress updates from a feature pass.
pub trait ProgressCallback: Send + Sync {
    /// Sets the number of units the pass will process.
    fn set_total(&self, total: u64);

    /// Advances by `delta` units.
    fn inc(&self, delta: u64);

    /// Replaces the text shown next to the indicator.
    fn set_message(&self, msg: String);

    /// Completes the indicator, leaving `msg` visible.
    fn finish(&self, msg: String);

    /// Completes the indicator and removes it.
    fn finish_and_clear(&self);
}

/// Discards every update.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
    fn finish_and_clear(&self) {}
}

#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}
