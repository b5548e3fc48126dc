//! Per-buffer run state.
//!
//! Every buffer that has been checked or fixed gets a [`BufferSession`] in
//! the [`SessionRegistry`]. Runs are identified by a [`RunTicket`] carrying a
//! sequence number that is never reused, even across a close and reopen of the
//! same buffer; a completion is applied only if its ticket is
//! still the newest one for a buffer that is still open. Everything else is
//! dropped as stale, so a slow run can never overwrite a newer result.
//!
//! The registry is owned by the UI thread. Background runs only ever hold a
//! ticket, never a reference into the registry.

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::config::OverlapPolicy;
use crate::error::{Result, SnifferError};
use crate::interpret::{EmptyReason, RunOutcome, RunResult};
use crate::invoker::RunMode;
use crate::markers::Markers;
use crate::navigate::ResultView;
use crate::report::ReportParser;

/// Identity of a buffer, issued by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(pub u64);

impl fmt::Display for BufferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle of the most recent run for a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunPhase {
    #[default]
    Idle,
    Running,
    FindingsReady,
    FixReady,
    Empty,
    Failed,
}

/// Handle for one outstanding run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunTicket {
    pub buffer: BufferId,
    pub seq: u64,
    pub mode: RunMode,
    /// Line count of the buffer when the run started; findings beyond it
    /// are dropped.
    pub line_count: usize,
}

/// What the host has to do after a completion was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    /// Show these markers; the result view holds the report.
    Findings { markers: Markers },
    /// Replace the buffer content; the result view holds the diff.
    Fix { fixed_content: String },
    Empty(EmptyReason),
    Failed(String),
    /// A newer run started, or the buffer was closed. Nothing changed.
    Stale,
}

/// Run state and last result for one buffer.
#[derive(Debug, Default)]
pub struct BufferSession {
    phase: RunPhase,
    latest_seq: u64,
    in_flight: Option<u64>,
    view: Option<ResultView>,
    markers: Markers,
}

impl BufferSession {
    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    /// Result rows currently shown for this buffer, if any.
    pub fn view(&self) -> Option<&ResultView> {
        self.view.as_ref()
    }

    pub fn markers(&self) -> &Markers {
        &self.markers
    }

    pub fn is_running(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Forgets markers, e.g. after the buffer content was replaced.
    pub fn clear_markers(&mut self) {
        self.markers = Markers::default();
    }
}

/// All sessions, keyed by buffer.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    policy: OverlapPolicy,
    next_seq: u64,
    sessions: HashMap<BufferId, BufferSession>,
}

impl SessionRegistry {
    pub fn new(policy: OverlapPolicy) -> Self {
        Self {
            policy,
            next_seq: 0,
            sessions: HashMap::new(),
        }
    }

    pub fn policy(&self) -> OverlapPolicy {
        self.policy
    }

    /// Creates the session for `buffer` if it does not exist yet.
    pub fn open(&mut self, buffer: BufferId) -> &mut BufferSession {
        self.sessions.entry(buffer).or_default()
    }

    /// Tears down the session; late completions for it become stale.
    pub fn close(&mut self, buffer: BufferId) -> Option<BufferSession> {
        self.sessions.remove(&buffer)
    }

    pub fn session(&self, buffer: BufferId) -> Option<&BufferSession> {
        self.sessions.get(&buffer)
    }

    pub fn session_mut(&mut self, buffer: BufferId) -> Option<&mut BufferSession> {
        self.sessions.get_mut(&buffer)
    }

    pub fn view(&self, buffer: BufferId) -> Option<&ResultView> {
        self.session(buffer).and_then(BufferSession::view)
    }

    pub fn markers(&self, buffer: BufferId) -> Option<&Markers> {
        self.session(buffer).map(BufferSession::markers)
    }

    pub fn phase(&self, buffer: BufferId) -> RunPhase {
        self.session(buffer).map_or(RunPhase::Idle, BufferSession::phase)
    }

    /// Starts a run for `buffer`, creating its session on first use.
    ///
    /// # Errors
    ///
    /// With [`OverlapPolicy::Reject`], returns [`SnifferError::RunInFlight`]
    /// while an earlier run for the same buffer is outstanding.
    pub fn begin_run(
        &mut self,
        buffer: BufferId,
        mode: RunMode,
        line_count: usize,
    ) -> Result<RunTicket> {
        let policy = self.policy;
        self.next_seq += 1;
        let seq = self.next_seq;
        let session = self.open(buffer);

        if let Some(outstanding) = session.in_flight {
            match policy {
                OverlapPolicy::Reject => return Err(SnifferError::RunInFlight(buffer)),
                OverlapPolicy::Supersede => {
                    debug!(%buffer, superseded = outstanding, "superseding outstanding run");
                }
            }
        }

        session.latest_seq = seq;
        session.in_flight = Some(seq);
        session.phase = RunPhase::Running;

        Ok(RunTicket {
            buffer,
            seq,
            mode,
            line_count,
        })
    }

    /// Applies a finished run if `ticket` is still current.
    ///
    /// A fresh result replaces the previous view and markers wholesale; an
    /// empty or failed run clears them.
    pub fn complete(
        &mut self,
        ticket: RunTicket,
        outcome: RunOutcome,
        parser: &dyn ReportParser,
    ) -> Applied {
        let Some(session) = self.sessions.get_mut(&ticket.buffer) else {
            debug!(buffer = %ticket.buffer, seq = ticket.seq, "dropping result for closed buffer");
            return Applied::Stale;
        };
        if session.latest_seq != ticket.seq {
            debug!(
                buffer = %ticket.buffer,
                seq = ticket.seq,
                latest = session.latest_seq,
                "dropping stale result"
            );
            return Applied::Stale;
        }

        session.in_flight = None;
        session.view = None;
        session.markers = Markers::default();

        match outcome {
            RunOutcome::Ready(RunResult::FindingsReport { findings, report }) => {
                session.phase = RunPhase::FindingsReady;
                session.view = Some(ResultView::findings(&report, parser));
                session.markers = Markers::from_findings(&findings, ticket.line_count);
                Applied::Findings {
                    markers: session.markers.clone(),
                }
            }
            RunOutcome::Ready(RunResult::FixDiff(diff)) => {
                session.phase = RunPhase::FixReady;
                session.view = Some(ResultView::diff(&diff));
                Applied::Fix {
                    fixed_content: diff.fixed_content,
                }
            }
            RunOutcome::Empty(reason) => {
                session.phase = RunPhase::Empty;
                Applied::Empty(reason)
            }
            RunOutcome::Failed(e) => {
                session.phase = RunPhase::Failed;
                Applied::Failed(e.to_string())
            }
        }
    }
}
