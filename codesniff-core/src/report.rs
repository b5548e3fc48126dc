//! Check-mode report parsing.
//!
//! phpcs prints a human-readable report; these parsers turn it into
//! [`Finding`]s for the gutter and answer the two questions the results
//! panel asks about a clicked row: which source line does it point at, and
//! is it the "fix this file" button.

use std::fmt;
use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::config::{ReportFormat, Settings};

/// `<non-digit prefix><digits><optional whitespace>:` as printed by the
/// plugin report (`" [x] Line 12 : message"`).
static FINDING_ROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^:0-9]+([0-9]+)\s*:").expect("finding row pattern is valid")
});

const PLUGIN_FIX_BUTTON: &str = "[ Click here to fix this file ]";
const FULL_FIX_BANNER: &str = "PHPCBF CAN FIX";
const FULL_FIX_BUTTON: &str = "CLICK HERE TO FIX";

/// Severity of one reported issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("error"),
            Severity::Warning => f.write_str("warning"),
        }
    }
}

/// One reported issue at a 1-based source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Finding {
    pub line: usize,
    pub severity: Severity,
}

/// A finding together with the 0-based report row it was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportEntry {
    pub row: usize,
    pub finding: Finding,
}

/// A report layout the results panel knows how to read.
pub trait ReportParser: Send + Sync + fmt::Debug {
    /// Single pass over `report`, yielding every finding row in order.
    fn scan(&self, report: &str) -> Vec<ReportEntry>;

    /// Source line a single report row points at, if any.
    fn target_line(&self, line: &str) -> Option<usize>;

    /// Whether clicking this row should run the fixer.
    fn is_fix_trigger(&self, line: &str) -> bool;

    /// Findings only, in report order.
    fn parse(&self, report: &str) -> Vec<Finding> {
        self.scan(report).into_iter().map(|e| e.finding).collect()
    }

    /// Rewrites raw tool output into the text shown in the results panel.
    fn present(&self, report: String) -> String {
        report
    }
}

/// Returns the parser matching `settings.report_format`.
pub fn parser_for(settings: &Settings) -> Arc<dyn ReportParser> {
    match settings.report_format {
        ReportFormat::Full => Arc::new(FullReportParser),
        ReportFormat::Plugin => Arc::new(PluginReportParser),
    }
}

/// Parses a plugin-format report. See [`PluginReportParser`].
pub fn parse_findings(report: &str) -> Vec<Finding> {
    PluginReportParser.parse(report)
}

/// Reads the sectioned plugin report:
///
/// ```text
///  Errors:
///  [x] Line 3 : Missing semicolon
///  Warnings:
///  [ ] Line 7 : Unused variable
/// ```
///
/// Rows before the first section header have no severity and are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct PluginReportParser;

impl ReportParser for PluginReportParser {
    fn scan(&self, report: &str) -> Vec<ReportEntry> {
        let mut section: Option<Severity> = None;
        let mut entries = Vec::new();

        for (row, line) in report.lines().enumerate() {
            match line.trim() {
                "Errors:" => {
                    section = Some(Severity::Error);
                    continue;
                }
                "Warnings:" => {
                    section = Some(Severity::Warning);
                    continue;
                }
                _ => {}
            }
            let (Some(severity), Some(line)) = (section, self.target_line(line)) else {
                continue;
            };
            entries.push(ReportEntry {
                row,
                finding: Finding { line, severity },
            });
        }

        entries
    }

    fn target_line(&self, line: &str) -> Option<usize> {
        let caps = FINDING_ROW.captures(line)?;
        caps[1].parse().ok().filter(|&n| n > 0)
    }

    fn is_fix_trigger(&self, line: &str) -> bool {
        line.contains(PLUGIN_FIX_BUTTON)
    }
}

/// Reads phpcs's built-in `full` report, where every finding is a
/// `LINE | TYPE | MESSAGE` row.
#[derive(Debug, Clone, Copy, Default)]
pub struct FullReportParser;

impl FullReportParser {
    fn split_row(line: &str) -> Option<(usize, Severity)> {
        // The message column may itself contain `|`.
        let parts: Vec<&str> = line.splitn(3, '|').collect();
        let [number, kind, _message] = parts.as_slice() else {
            return None;
        };
        let number: usize = number.trim().parse().ok().filter(|&n| n > 0)?;
        let severity = if kind.trim() == "ERROR" {
            Severity::Error
        } else {
            Severity::Warning
        };
        Some((number, severity))
    }
}

impl ReportParser for FullReportParser {
    fn scan(&self, report: &str) -> Vec<ReportEntry> {
        report
            .lines()
            .enumerate()
            .filter_map(|(row, line)| {
                let (line, severity) = Self::split_row(line)?;
                Some(ReportEntry {
                    row,
                    finding: Finding { line, severity },
                })
            })
            .collect()
    }

    fn target_line(&self, line: &str) -> Option<usize> {
        Self::split_row(line).map(|(number, _)| number)
    }

    fn is_fix_trigger(&self, line: &str) -> bool {
        line.contains(FULL_FIX_BUTTON)
    }

    fn present(&self, report: String) -> String {
        if report.contains(FULL_FIX_BANNER) {
            report.replace(FULL_FIX_BANNER, FULL_FIX_BUTTON)
        } else {
            report
        }
    }
}
