//! Gutter markers derived from findings.

use std::collections::BTreeSet;

use crate::report::{Finding, Severity};

/// Error and warning lines for one buffer, 1-based.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Markers {
    errors: BTreeSet<usize>,
    warnings: BTreeSet<usize>,
}

impl Markers {
    /// Collects marker lines, dropping any finding outside `1..=line_count`.
    ///
    /// `line_count` must describe the buffer the tool analysed; markers are
    /// not adjusted if the buffer changes afterwards.
    pub fn from_findings(findings: &[Finding], line_count: usize) -> Self {
        let mut markers = Self::default();
        for finding in findings {
            if finding.line == 0 || finding.line > line_count {
                continue;
            }
            match finding.severity {
                Severity::Error => markers.errors.insert(finding.line),
                Severity::Warning => markers.warnings.insert(finding.line),
            };
        }
        markers
    }

    pub fn errors(&self) -> &BTreeSet<usize> {
        &self.errors
    }

    pub fn warnings(&self) -> &BTreeSet<usize> {
        &self.warnings
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }

    /// The marker to draw on `line`; errors win over warnings.
    pub fn severity_at(&self, line: usize) -> Option<Severity> {
        if self.errors.contains(&line) {
            Some(Severity::Error)
        } else if self.warnings.contains(&line) {
            Some(Severity::Warning)
        } else {
            None
        }
    }

    /// Every marked line in ascending order, for next/previous navigation.
    pub fn lines(&self) -> Vec<usize> {
        self.errors.union(&self.warnings).copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_findings_are_dropped() {
        let findings = [
            Finding { line: 0, severity: Severity::Error },
            Finding { line: 2, severity: Severity::Error },
            Finding { line: 11, severity: Severity::Warning },
        ];
        let markers = Markers::from_findings(&findings, 10);
        assert_eq!(markers.lines(), vec![2]);
    }

    #[test]
    fn error_wins_over_warning() {
        let findings = [
            Finding { line: 4, severity: Severity::Warning },
            Finding { line: 4, severity: Severity::Error },
            Finding { line: 5, severity: Severity::Warning },
        ];
        let markers = Markers::from_findings(&findings, 10);
        assert_eq!(markers.severity_at(4), Some(Severity::Error));
        assert_eq!(markers.severity_at(5), Some(Severity::Warning));
        assert_eq!(markers.severity_at(6), None);
        assert_eq!(markers.lines(), vec![4, 5]);
    }
}
