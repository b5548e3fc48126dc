//! Owned data crossing between the UI thread and run workers.
//!
//! Everything here is `Send + 'static`: a worker gets a snapshot of the
//! buffer and shared handles to the settings, never a reference into
//! `AppState`.

use std::path::PathBuf;
use std::sync::Arc;

use codesniff_core::report::ReportParser;
use codesniff_core::{RunOutcome, RunTicket, Settings};

/// Everything a worker needs to run the tool once.
#[derive(Debug, Clone)]
pub struct RunJob {
    pub ticket: RunTicket,
    /// Buffer content at the time the run was requested.
    pub content: String,
    pub path: PathBuf,
    pub settings: Arc<Settings>,
    pub parser: Arc<dyn ReportParser>,
}

/// Result posted back to the UI thread. Carried boxed inside
/// `AppEvent::RunFinished` to keep the event enum small.
#[derive(Debug)]
pub struct RunCompletion {
    pub ticket: RunTicket,
    pub outcome: RunOutcome,
}
