//! Property and end-to-end checks for report parsing, fix diffs and click
//! mapping.

use codesniff_core::diff::{apply_hunks, compute_fix_diff, render_unified, FixDiff};
use codesniff_core::navigate::{diff_click_target, resolve_click, ClickAction, ResultView};
use codesniff_core::report::{parse_findings, Finding, PluginReportParser, Severity};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn text_from(lines: &[String], crlf: bool, trailing: bool) -> String {
    let sep = if crlf { "\r\n" } else { "\n" };
    let mut text = lines.join(sep);
    if trailing && !lines.is_empty() {
        text.push_str(sep);
    }
    text
}

proptest! {
    #[test]
    fn n_error_rows_give_n_errors_in_order(lines in prop::collection::vec(1usize..5000, 0..40)) {
        let mut report = String::from(" Errors:\n");
        for line in &lines {
            report.push_str(&format!(" [x] Line {line} : Something is off\n"));
        }
        let expected: Vec<Finding> = lines
            .iter()
            .map(|&line| Finding { line, severity: Severity::Error })
            .collect();
        prop_assert_eq!(parse_findings(&report), expected);
    }

    #[test]
    fn headerless_reports_have_no_findings(lines in prop::collection::vec(1usize..5000, 0..20)) {
        let report: String = lines
            .iter()
            .map(|line| format!(" Line {line} : Something is off\n"))
            .collect();
        prop_assert!(parse_findings(&report).is_empty());
    }

    #[test]
    fn identical_input_has_no_hunks(
        lines in prop::collection::vec("[a-c ;]{0,6}", 0..30),
        crlf in any::<bool>(),
        trailing in any::<bool>(),
    ) {
        let text = text_from(&lines, crlf, trailing);
        prop_assert!(compute_fix_diff(&text, &text).is_empty());
    }

    #[test]
    fn hunks_apply_back_to_fixed(
        before in prop::collection::vec("[a-c ;]{0,4}", 0..30),
        after in prop::collection::vec("[a-c ;]{0,4}", 0..30),
        crlf in any::<bool>(),
        trailing_before in any::<bool>(),
        trailing_after in any::<bool>(),
    ) {
        let original = text_from(&before, crlf, trailing_before);
        let fixed = text_from(&after, crlf, trailing_after);
        let hunks = compute_fix_diff(&original, &fixed);
        prop_assert_eq!(apply_hunks(&original, &hunks).unwrap(), fixed);
    }

    #[test]
    fn every_rendered_header_is_clickable(
        before in prop::collection::vec("[ab]{0,2}", 1..25),
        after in prop::collection::vec("[ab]{0,2}", 1..25),
    ) {
        let original = text_from(&before, false, true);
        let fixed = text_from(&after, false, true);
        let rows = render_unified(&compute_fix_diff(&original, &fixed));
        for (row, line) in rows.iter().enumerate() {
            if line.starts_with("@@") {
                prop_assert!(diff_click_target(&rows, row).is_some());
            }
        }
    }
}

#[test]
fn end_to_end_report_example() {
    let report = " Errors:\n  3: Missing semicolon\n Warnings:\n  7: Unused variable";
    assert_eq!(
        parse_findings(report),
        vec![
            Finding { line: 3, severity: Severity::Error },
            Finding { line: 7, severity: Severity::Warning },
        ]
    );
}

#[test]
fn click_two_rows_below_header() {
    let rows = ["@@ -10,5 +12,5 @@", " $a = 1;", " $b = 2;", " $c = 3;"];
    assert_eq!(diff_click_target(&rows, 2), Some(13));
}

#[test]
fn click_in_rendered_fix_lands_on_changed_line() {
    let original: String = (1..=12).map(|n| format!("$v{n} = {n}\n")).collect();
    let fixed = original.replace("$v9 = 9\n", "$v9 = 9;\n");
    let diff = FixDiff::between(&original, fixed).unwrap();
    let view = ResultView::diff(&diff);

    let added = view
        .lines
        .iter()
        .position(|line| line == "+$v9 = 9;")
        .unwrap();
    assert_eq!(
        resolve_click(&view, added, &PluginReportParser),
        ClickAction::JumpTo(9)
    );
}
