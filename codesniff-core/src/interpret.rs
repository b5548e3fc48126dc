//! Turning raw tool output into a [`RunOutcome`].

use std::path::Path;

use tracing::warn;

use crate::config::Settings;
use crate::diff::FixDiff;
use crate::error::SnifferError;
use crate::invoker::{invoke, RawOutput, RunMode};
use crate::report::{Finding, ReportParser};

/// Lowest exit code that can mean "something went wrong" rather than
/// "found or fixed problems".
///
/// phpcs 3.x uses 3 for processing errors, while 4.x reports issues as a
/// bitmask where 3 means fixable plus non-fixable. A check whose report has
/// findings is therefore never a failure, whatever the exit code.
pub const TOOL_ERROR_EXIT: i32 = 3;

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunResult {
    /// Check mode: findings plus the report text shown in the results panel.
    FindingsReport {
        findings: Vec<Finding>,
        report: String,
    },
    /// Fix mode: a non-empty diff and the content the buffer becomes.
    FixDiff(FixDiff),
}

/// Why a run legitimately produced nothing to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyReason {
    NoIssues,
    NoChanges,
}

impl EmptyReason {
    pub fn message(self) -> &'static str {
        match self {
            EmptyReason::NoIssues => "PHP_CodeSniffer found no issues",
            EmptyReason::NoChanges => "PHP_CodeSniffer did not make any changes",
        }
    }
}

/// Final state of one invocation.
#[derive(Debug)]
pub enum RunOutcome {
    Ready(RunResult),
    Empty(EmptyReason),
    Failed(SnifferError),
}

/// Invokes the tool and interprets its output. Never panics and never
/// returns early: every failure is folded into [`RunOutcome::Failed`].
pub fn run(
    mode: RunMode,
    content: &str,
    file_path: &Path,
    settings: &Settings,
    parser: &dyn ReportParser,
) -> RunOutcome {
    match invoke(mode, content, file_path, settings) {
        Ok(raw) => interpret(mode, raw, content, program_name(mode, settings), parser),
        Err(e) => {
            warn!(%mode, "run failed: {e}");
            RunOutcome::Failed(e)
        }
    }
}

fn program_name(mode: RunMode, settings: &Settings) -> &str {
    match mode {
        RunMode::Check => &settings.phpcs_path,
        RunMode::Fix => &settings.phpcbf_path,
    }
}

/// Interprets `raw` for `mode`. `original` is the buffer content the tool
/// was fed; `program` only feeds error messages.
pub fn interpret(
    mode: RunMode,
    raw: RawOutput,
    original: &str,
    program: &str,
    parser: &dyn ReportParser,
) -> RunOutcome {
    match mode {
        RunMode::Check => interpret_report(raw, program, parser),
        RunMode::Fix => match tool_failure(&raw, program) {
            Some(failure) => failed(mode, failure),
            None => interpret_fix(raw, original, program),
        },
    }
}

fn failed(mode: RunMode, failure: SnifferError) -> RunOutcome {
    warn!(%mode, "{failure}");
    RunOutcome::Failed(failure)
}

fn tool_failure(raw: &RawOutput, program: &str) -> Option<SnifferError> {
    match raw.exit_code {
        Some(code) if code < TOOL_ERROR_EXIT => None,
        code => Some(SnifferError::ToolFailed {
            program: program.to_owned(),
            code,
            detail: first_message(&raw.stderr)
                .or_else(|| first_message(&raw.stdout))
                .unwrap_or_else(|| "no details".to_owned()),
        }),
    }
}

fn first_message(bytes: &[u8]) -> Option<String> {
    String::from_utf8_lossy(bytes)
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_owned)
}

/// The report decides first: findings mean `Ready` whatever the exit code.
/// Only a report without findings falls back to the exit code.
fn interpret_report(raw: RawOutput, program: &str, parser: &dyn ReportParser) -> RunOutcome {
    let text = String::from_utf8_lossy(&raw.stdout).into_owned();
    let report = parser.present(text);
    let findings = parser.parse(&report);
    if findings.is_empty() {
        if let Some(failure) = tool_failure(&raw, program) {
            return failed(RunMode::Check, failure);
        }
        if report.trim().is_empty() {
            return RunOutcome::Empty(EmptyReason::NoIssues);
        }
    }
    RunOutcome::Ready(RunResult::FindingsReport { findings, report })
}

fn interpret_fix(raw: RawOutput, original: &str, program: &str) -> RunOutcome {
    let fixed = match String::from_utf8(raw.stdout) {
        Ok(fixed) => fixed,
        Err(e) => return RunOutcome::Failed(SnifferError::Encoding(e)),
    };
    if fixed.is_empty() && !original.is_empty() {
        return RunOutcome::Failed(SnifferError::NoOutput {
            program: program.to_owned(),
        });
    }
    match FixDiff::between(original, fixed) {
        Some(diff) => RunOutcome::Ready(RunResult::FixDiff(diff)),
        None => RunOutcome::Empty(EmptyReason::NoChanges),
    }
}
