//! Pre-styled lines for the source and results panels.
//!
//! Styling happens once per load, fix, or completion, never per frame. All
//! output is `Line<'static>` so it can live in `AppState`.

use std::collections::HashMap;
use std::sync::LazyLock;

use codesniff_core::navigate::{ResultView, ViewKind};
use codesniff_core::report::{ReportParser, Severity};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use similar::{ChangeTag, TextDiff};
use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::parsing::SyntaxSet;

use crate::theme::Theme;

static PS: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static TS: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

const SYNTAX_THEME: &str = "base16-ocean.dark";

/// Highlights `text` line by line using the syntax for `ext`.
///
/// Falls back to plain text for unknown extensions, and to unstyled lines
/// if no syntect theme is available.
pub fn highlight_source(text: &str, ext: &str) -> Vec<Line<'static>> {
    let syntax = PS
        .find_syntax_by_extension(ext)
        .unwrap_or_else(|| PS.find_syntax_plain_text());
    let Some(theme) = TS.themes.get(SYNTAX_THEME).or_else(|| TS.themes.values().next()) else {
        return text.lines().map(|l| Line::raw(l.to_owned())).collect();
    };

    let mut h = HighlightLines::new(syntax, theme);
    text.split_inclusive('\n')
        .map(|line| {
            // Highlight with the terminator so multi-line constructs keep
            // their state, then drop it from the spans.
            let spans = h.highlight_line(line, &PS).unwrap_or_default();
            let spans: Vec<Span<'static>> = spans
                .into_iter()
                .map(|(style, part)| syntect_to_span(style, part.trim_end_matches(['\n', '\r'])))
                .filter(|span| !span.content.is_empty())
                .collect();
            Line::from(spans)
        })
        .collect()
}

/// Converts a syntect (Style, &str) pair to an owned ratatui Span.
fn syntect_to_span(style: syntect::highlighting::Style, content: &str) -> Span<'static> {
    use syntect::highlighting::{Color as SC, FontStyle};
    let to_color = |c: SC| -> Option<Color> {
        if c.a > 0 { Some(Color::Rgb(c.r, c.g, c.b)) } else { None }
    };
    let mut ratatui_style = Style::default();
    if let Some(fg) = to_color(style.foreground) {
        ratatui_style = ratatui_style.fg(fg);
    }
    if style.font_style.contains(FontStyle::BOLD) {
        ratatui_style = ratatui_style.add_modifier(Modifier::BOLD);
    }
    if style.font_style.contains(FontStyle::ITALIC) {
        ratatui_style = ratatui_style.add_modifier(Modifier::ITALIC);
    }
    if style.font_style.contains(FontStyle::UNDERLINE) {
        ratatui_style = ratatui_style.add_modifier(Modifier::UNDERLINED);
    }
    Span::styled(content.to_owned(), ratatui_style)
}

/// Styles every row of a result view.
pub fn style_results(
    view: &ResultView,
    parser: &dyn ReportParser,
    theme: &Theme,
) -> Vec<Line<'static>> {
    match view.kind {
        ViewKind::Findings => style_findings(&view.lines, parser, theme),
        ViewKind::Diff => style_diff(&view.lines, theme),
    }
}

/// Colors finding rows by severity and makes the fix trigger stand out.
fn style_findings(
    lines: &[String],
    parser: &dyn ReportParser,
    theme: &Theme,
) -> Vec<Line<'static>> {
    let severities: HashMap<usize, Severity> = parser
        .scan(&lines.join("\n"))
        .into_iter()
        .map(|entry| (entry.row, entry.finding.severity))
        .collect();

    lines
        .iter()
        .enumerate()
        .map(|(row, line)| {
            let style = if parser.is_fix_trigger(line) {
                Style::default().fg(theme.fix_trigger).add_modifier(Modifier::BOLD)
            } else {
                let color = severities
                    .get(&row)
                    .map_or(theme.dimmed, |&severity| theme.marker(severity));
                Style::default().fg(color)
            };
            Line::from(Span::styled(line.clone(), style))
        })
        .collect()
}

/// Colors a rendered unified diff, with word-level emphasis on adjacent
/// removed/added pairs.
fn style_diff(lines: &[String], theme: &Theme) -> Vec<Line<'static>> {
    let mut out: Vec<Line<'static>> = Vec::with_capacity(lines.len());
    let mut row = 0;

    while row < lines.len() {
        let line = lines[row].as_str();
        let next = lines.get(row + 1).map(String::as_str);

        match (line.chars().next(), next) {
            (Some('-'), Some(added))
                if !line.starts_with("---")
                    && added.starts_with('+')
                    && !added.starts_with("+++") =>
            {
                let (old_spans, new_spans) = word_diff_spans(&line[1..], &added[1..], theme);
                let mut old_line = vec![Span::styled("-", Style::default().fg(theme.diff_removed))];
                old_line.extend(old_spans);
                let mut new_line = vec![Span::styled("+", Style::default().fg(theme.diff_added))];
                new_line.extend(new_spans);
                out.push(Line::from(old_line));
                out.push(Line::from(new_line));
                row += 2;
                continue;
            }
            _ => out.push(Line::from(Span::styled(line.to_owned(), diff_row_style(line, theme)))),
        }
        row += 1;
    }
    out
}

fn diff_row_style(line: &str, theme: &Theme) -> Style {
    if line.starts_with("@@") {
        Style::default().fg(theme.diff_hunk_header)
    } else if line.starts_with("---") || line.starts_with("+++") {
        Style::default().add_modifier(Modifier::BOLD)
    } else if line.starts_with('+') {
        Style::default().fg(theme.diff_added)
    } else if line.starts_with('-') {
        Style::default().fg(theme.diff_removed)
    } else {
        Style::default().fg(theme.dimmed)
    }
}

/// Computes word-level diff spans for a removed/added line pair.
///
/// Changed words are bold; unchanged words keep the base diff color.
fn word_diff_spans(
    old_line: &str,
    new_line: &str,
    theme: &Theme,
) -> (Vec<Span<'static>>, Vec<Span<'static>>) {
    let diff = TextDiff::from_words(old_line, new_line);
    let mut old_spans: Vec<Span<'static>> = Vec::new();
    let mut new_spans: Vec<Span<'static>> = Vec::new();

    for op in diff.ops() {
        for change in diff.iter_inline_changes(op) {
            for (emphasized, value) in change.iter_strings_lossy() {
                let text = value.into_owned();
                match change.tag() {
                    ChangeTag::Delete => {
                        let style = emphasized_style(theme.diff_removed, emphasized);
                        old_spans.push(Span::styled(text, style));
                    }
                    ChangeTag::Insert => {
                        let style = emphasized_style(theme.diff_added, emphasized);
                        new_spans.push(Span::styled(text, style));
                    }
                    ChangeTag::Equal => {
                        let span = Span::styled(text, Style::default().fg(theme.dimmed));
                        old_spans.push(span.clone());
                        new_spans.push(span);
                    }
                }
            }
        }
    }
    (old_spans, new_spans)
}

fn emphasized_style(color: Color, emphasized: bool) -> Style {
    let style = Style::default().fg(color);
    if emphasized {
        style.add_modifier(Modifier::BOLD)
    } else {
        style
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codesniff_core::config::{MarkerStyle, MarkerStyles};
    use codesniff_core::diff::FixDiff;
    use codesniff_core::report::PluginReportParser;
    use pretty_assertions::assert_eq;

    fn text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn source_lines_match_buffer_lines() {
        let src = "<?php\r\necho 1;\n\n$x = 2;";
        let lines = highlight_source(src, "php");
        let rendered: Vec<String> = lines.iter().map(text).collect();
        assert_eq!(rendered, vec!["<?php", "echo 1;", "", "$x = 2;"]);
    }

    #[test]
    fn styled_diff_keeps_row_count_and_text() {
        let diff = FixDiff::between("a = 1\nb = 2\n", "a = 1;\nb = 2\n".to_owned()).unwrap();
        let view = ResultView::diff(&diff);
        let styled = style_results(&view, &PluginReportParser, &Theme::dark());
        assert_eq!(styled.len(), view.lines.len());
        let rendered: Vec<String> = styled.iter().map(text).collect();
        assert_eq!(rendered, view.lines);
    }

    #[test]
    fn finding_rows_are_colored_by_severity() {
        let report = " Errors:\n Line 3: a\n Warnings:\n Line 4: b";
        let view = ResultView::findings(report, &PluginReportParser);
        let styled = style_results(&view, &PluginReportParser, &Theme::dark());
        assert_eq!(styled[1].spans[0].style.fg, Some(Color::Red));
        assert_eq!(styled[3].spans[0].style.fg, Some(Color::Yellow));
    }

    #[test]
    fn finding_rows_follow_configured_marker_colors() {
        let markers = MarkerStyles {
            error: MarkerStyle {
                color: Some("magenta".to_owned()),
                symbol: None,
            },
            ..MarkerStyles::default()
        };
        let theme = Theme::dark().with_markers(&markers);
        let report = " Errors:\n Line 3: a\n Warnings:\n Line 4: b";
        let view = ResultView::findings(report, &PluginReportParser);
        let styled = style_results(&view, &PluginReportParser, &theme);
        assert_eq!(styled[1].spans[0].style.fg, Some(Color::Magenta));
        assert_eq!(styled[3].spans[0].style.fg, Some(theme.marker_warning));
    }

    #[test]
    fn diff_rows_use_theme_colors() {
        let theme = Theme::catppuccin_mocha();
        let diff = FixDiff::between("a\nb\n", "a\nc\nd\n".to_owned()).unwrap();
        let view = ResultView::diff(&diff);
        let styled = style_results(&view, &PluginReportParser, &theme);
        let header = view.lines.iter().position(|l| l.starts_with("@@")).unwrap();
        assert_eq!(styled[header].spans[0].style.fg, Some(theme.diff_hunk_header));
        let added = view.lines.iter().position(|l| l == "+d").unwrap();
        assert_eq!(styled[added].spans[0].style.fg, Some(theme.diff_added));
    }
}
