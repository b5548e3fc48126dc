//! codesniff-core: everything codesniff knows about PHP_CodeSniffer, with no
//! terminal code.
//!
//! - [`invoker`] builds argv and runs `phpcs` / `phpcbf` over stdin.
//! - [`report`] parses check reports into [`report::Finding`]s.
//! - [`diff`] turns fixer output into hunks.
//! - [`interpret`] folds raw output into a [`interpret::RunOutcome`].
//! - [`navigate`] maps clicks on result rows back to source lines.
//! - [`session`] keeps per-buffer run state and rejects stale results.

pub mod config;
pub mod diff;
pub mod error;
pub mod interpret;
pub mod invoker;
pub mod markers;
pub mod navigate;
pub mod report;
pub mod session;

pub use config::Settings;
pub use error::{Result, SnifferError};
pub use interpret::{run, EmptyReason, RunOutcome, RunResult};
pub use invoker::RunMode;
pub use session::{Applied, BufferId, RunTicket, SessionRegistry};
