//! The results panel's content and what clicking one of its rows does.

use std::sync::LazyLock;

use regex::Regex;

use crate::diff::FixDiff;
use crate::report::ReportParser;

/// `@@ -a[,b] +c[,d] @@`; captures `c`.
static HUNK_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@@ -\d+(?:,\d+)? \+(\d+)(?:,\d+)? @@").expect("hunk header pattern is valid")
});

/// What the results panel is currently showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    /// A check report.
    Findings,
    /// A fix diff.
    Diff,
}

/// Rows of the results panel for one buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultView {
    pub kind: ViewKind,
    pub lines: Vec<String>,
    /// Rows worth stopping at with next/previous: finding rows or hunk headers.
    pub anchors: Vec<usize>,
}

impl ResultView {
    /// A findings view over `report`.
    pub fn findings(report: &str, parser: &dyn ReportParser) -> Self {
        let anchors = parser.scan(report).into_iter().map(|e| e.row).collect();
        Self {
            kind: ViewKind::Findings,
            lines: report.lines().map(str::to_owned).collect(),
            anchors,
        }
    }

    /// A diff view over `diff`.
    pub fn diff(diff: &FixDiff) -> Self {
        let lines = diff.view_lines();
        let anchors = lines
            .iter()
            .enumerate()
            .filter(|(_, line)| line.starts_with("@@"))
            .map(|(row, _)| row)
            .collect();
        Self {
            kind: ViewKind::Diff,
            lines,
            anchors,
        }
    }

    /// First anchor strictly after `row`.
    pub fn next_anchor(&self, row: usize) -> Option<usize> {
        self.anchors.iter().copied().find(|&a| a > row)
    }

    /// Last anchor strictly before `row`.
    pub fn prev_anchor(&self, row: usize) -> Option<usize> {
        self.anchors.iter().rev().copied().find(|&a| a < row)
    }
}

/// The host action for a clicked results row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickAction {
    /// Move the source view to this 1-based line.
    JumpTo(usize),
    /// Run the fixer on the buffer.
    RunFix,
    Nothing,
}

/// Maps a click on `row` of `view` to an action.
pub fn resolve_click(view: &ResultView, row: usize, parser: &dyn ReportParser) -> ClickAction {
    let Some(line) = view.lines.get(row) else {
        return ClickAction::Nothing;
    };
    match view.kind {
        ViewKind::Findings if parser.is_fix_trigger(line) => ClickAction::RunFix,
        ViewKind::Findings => parser
            .target_line(line)
            .map_or(ClickAction::Nothing, ClickAction::JumpTo),
        ViewKind::Diff => diff_click_target(&view.lines, row)
            .map_or(ClickAction::Nothing, ClickAction::JumpTo),
    }
}

/// Maps a row of a rendered diff to a line of the fixed content.
///
/// Walks back from `row` (inclusive) to the nearest hunk header, counting
/// rows that are not removals; the header's `+start` plus that count, minus
/// one, is the target. Returns `None` above the first hunk.
pub fn diff_click_target<S: AsRef<str>>(lines: &[S], row: usize) -> Option<usize> {
    let mut offset = 0usize;
    for line in lines.get(..=row)?.iter().rev() {
        let line = line.as_ref();
        if line.starts_with("@@") {
            let start: usize = HUNK_HEADER.captures(line)?[1].parse().ok()?;
            return Some((start + offset).saturating_sub(1).max(1));
        }
        if !line.starts_with('-') {
            offset += 1;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::PluginReportParser;

    #[test]
    fn two_rows_below_header_maps_to_start_plus_one() {
        let lines = ["@@ -10,5 +12,5 @@", " a", " b", " c"];
        assert_eq!(diff_click_target(&lines, 2), Some(13));
    }

    #[test]
    fn removed_rows_do_not_advance() {
        let lines = ["@@ -1,3 +1,3 @@", " a", "-b", "+B", " c"];
        assert_eq!(diff_click_target(&lines, 3), Some(2));
        assert_eq!(diff_click_target(&lines, 4), Some(3));
    }

    #[test]
    fn nearest_header_wins() {
        let lines = [
            "@@ -1,2 +1,2 @@",
            " a",
            "@@ -40,2 +41,2 @@",
            " x",
        ];
        assert_eq!(diff_click_target(&lines, 3), Some(41));
    }

    #[test]
    fn short_headers_still_parse() {
        let lines = ["@@ -3 +3 @@", "+new"];
        assert_eq!(diff_click_target(&lines, 1), Some(3));
    }

    #[test]
    fn rows_above_first_hunk_map_nowhere() {
        let lines = ["", " made fixes", "--- Original", "+++ Fixed", "@@ -1,1 +1,1 @@"];
        assert_eq!(diff_click_target(&lines, 3), None);
        assert_eq!(diff_click_target(&lines, 99), None);
    }

    #[test]
    fn findings_click_jumps_or_fixes() {
        let report = " Errors:\n [x] Line 7 : Missing semicolon\n [ Click here to fix this file ]";
        let parser = PluginReportParser;
        let view = ResultView::findings(report, &parser);
        assert_eq!(resolve_click(&view, 1, &parser), ClickAction::JumpTo(7));
        assert_eq!(resolve_click(&view, 2, &parser), ClickAction::RunFix);
        assert_eq!(resolve_click(&view, 0, &parser), ClickAction::Nothing);
        assert_eq!(view.anchors, vec![1]);
    }

    #[test]
    fn anchors_step_between_hunks() {
        let diff = FixDiff::between(
            &(1..=30).map(|n| format!("{n}\n")).collect::<String>(),
            (1..=30)
                .map(|n| if n == 2 || n == 25 { "x\n".to_owned() } else { format!("{n}\n") })
                .collect(),
        )
        .unwrap();
        let view = ResultView::diff(&diff);
        assert_eq!(view.anchors.len(), 2);
        assert_eq!(view.next_anchor(0), Some(view.anchors[0]));
        assert_eq!(view.next_anchor(view.anchors[0]), Some(view.anchors[1]));
        assert_eq!(view.prev_anchor(view.anchors[1]), Some(view.anchors[0]));
        assert_eq!(view.next_anchor(view.anchors[1]), None);
    }
}
