//! Blocking run worker.
//!
//! `std::process` is synchronous, so every run goes through tokio's blocking
//! pool. There is no cancellation: a superseded run finishes and its result
//! is dropped as stale by the session registry.

use tracing::{info_span, warn};

use crate::event::{AppEvent, EventSender};
use crate::runner::types::{RunCompletion, RunJob};

/// Runs `job` on the blocking pool and posts one `RunFinished` event.
pub fn spawn_run(job: RunJob, event_tx: EventSender) {
    tokio::task::spawn_blocking(move || {
        let completion = execute(job);
        if event_tx.send(AppEvent::RunFinished(Box::new(completion))).is_err() {
            warn!("event loop gone; dropping run result");
        }
    });
}

/// Invokes the tool and interprets its output on the current thread.
pub fn execute(job: RunJob) -> RunCompletion {
    let span = info_span!(
        "run",
        buffer = %job.ticket.buffer,
        seq = job.ticket.seq,
        mode = %job.ticket.mode,
    );
    let _entered = span.enter();

    let outcome = codesniff_core::run(
        job.ticket.mode,
        &job.content,
        &job.path,
        &job.settings,
        job.parser.as_ref(),
    );
    RunCompletion {
        ticket: job.ticket,
        outcome,
    }
}
