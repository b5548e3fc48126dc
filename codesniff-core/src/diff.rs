//! Fix-mode diffing between the buffer and the fixer's rewritten content.
//!
//! Hunks keep every line's terminator, so [`apply_hunks`] can rebuild the
//! fixed text byte for byte. Rendering strips terminators again.

use similar::{Algorithm, ChangeTag, TextDiff};

use crate::error::{Result, SnifferError};

/// Unchanged lines kept around each change, same as `diff -u`.
pub const CONTEXT_RADIUS: usize = 3;

/// Label of the left-hand side in the rendered diff.
pub const ORIGINAL_LABEL: &str = "Original";
/// Label of the right-hand side in the rendered diff.
pub const FIXED_LABEL: &str = "Fixed";

/// First line of the results panel after a successful fix.
pub const FIX_PREAMBLE: &str = " PHP_CodeSniffer made the following fixes to this file:";

/// How a line in a hunk relates to the two versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineTag {
    Context,
    Added,
    Removed,
}

impl LineTag {
    /// The unified-diff prefix character.
    pub fn prefix(self) -> char {
        match self {
            LineTag::Context => ' ',
            LineTag::Added => '+',
            LineTag::Removed => '-',
        }
    }
}

impl From<ChangeTag> for LineTag {
    fn from(tag: ChangeTag) -> Self {
        match tag {
            ChangeTag::Equal => LineTag::Context,
            ChangeTag::Insert => LineTag::Added,
            ChangeTag::Delete => LineTag::Removed,
        }
    }
}

/// One line of a hunk. `text` includes its terminator when it had one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffLine {
    pub tag: LineTag,
    pub text: String,
}

impl DiffLine {
    /// Line content without `\n` / `\r\n` / `\r`.
    pub fn content(&self) -> &str {
        self.text.trim_end_matches(['\n', '\r'])
    }
}

/// A contiguous block of changes plus surrounding context.
///
/// Starts follow the unified convention: 1-based, and an empty range points
/// at the line just before it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffHunk {
    pub original_start: usize,
    pub original_count: usize,
    pub fixed_start: usize,
    pub fixed_count: usize,
    pub lines: Vec<DiffLine>,
}

impl DiffHunk {
    /// `@@ -a,b +c,d @@`, always in the comma form so every header can be
    /// parsed back by the click mapping.
    pub fn header(&self) -> String {
        format!(
            "@@ -{},{} +{},{} @@",
            self.original_start, self.original_count, self.fixed_start, self.fixed_count
        )
    }

    /// 0-based index of the first original line covered by this hunk.
    fn original_index(&self) -> usize {
        if self.original_count == 0 {
            self.original_start
        } else {
            self.original_start.saturating_sub(1)
        }
    }
}

/// The result of a fix run: the hunks and the content the buffer becomes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixDiff {
    pub hunks: Vec<DiffHunk>,
    pub fixed_content: String,
}

impl FixDiff {
    /// Diffs `original` against `fixed`; `None` when nothing changed.
    pub fn between(original: &str, fixed: String) -> Option<Self> {
        let hunks = compute_fix_diff(original, &fixed);
        if hunks.is_empty() {
            None
        } else {
            Some(Self {
                hunks,
                fixed_content: fixed,
            })
        }
    }

    /// Rows for the results panel: preamble, then the unified diff.
    pub fn view_lines(&self) -> Vec<String> {
        let mut lines = vec![String::new(), FIX_PREAMBLE.to_owned(), String::new()];
        lines.extend(render_unified(&self.hunks));
        lines
    }
}

/// Myers line diff of `original` against `fixed`, grouped into hunks with
/// [`CONTEXT_RADIUS`] lines of context. Identical input yields no hunks.
pub fn compute_fix_diff(original: &str, fixed: &str) -> Vec<DiffHunk> {
    let diff = TextDiff::configure()
        .algorithm(Algorithm::Myers)
        .diff_lines(original, fixed);

    diff.grouped_ops(CONTEXT_RADIUS)
        .into_iter()
        .filter(|group| {
            group
                .iter()
                .any(|op| !matches!(op, similar::DiffOp::Equal { .. }))
        })
        .filter_map(|group| {
            let first = group.first()?;
            let last = group.last()?;
            let old = first.old_range().start..last.old_range().end;
            let new = first.new_range().start..last.new_range().end;

            let lines = group
                .iter()
                .flat_map(|op| diff.iter_changes(op))
                .map(|change| DiffLine {
                    tag: change.tag().into(),
                    text: change.value().to_owned(),
                })
                .collect();

            Some(DiffHunk {
                original_start: unified_start(old.start, old.len()),
                original_count: old.len(),
                fixed_start: unified_start(new.start, new.len()),
                fixed_count: new.len(),
                lines,
            })
        })
        .collect()
}

fn unified_start(index: usize, len: usize) -> usize {
    if len == 0 {
        index
    } else {
        index + 1
    }
}

/// Renders hunks as unified diff rows, file headers first.
pub fn render_unified(hunks: &[DiffHunk]) -> Vec<String> {
    if hunks.is_empty() {
        return Vec::new();
    }
    let mut out = vec![format!("--- {ORIGINAL_LABEL}"), format!("+++ {FIXED_LABEL}")];
    for hunk in hunks {
        out.push(hunk.header());
        out.extend(
            hunk.lines
                .iter()
                .map(|line| format!("{}{}", line.tag.prefix(), line.content())),
        );
    }
    out
}

/// Applies `hunks` to `original`, verifying every context and removed line.
///
/// # Errors
///
/// Returns [`SnifferError::Patch`] when a hunk is out of order, out of range,
/// or does not match the text it covers.
pub fn apply_hunks(original: &str, hunks: &[DiffHunk]) -> Result<String> {
    let source = split_lines_inclusive(original);
    let mut out = String::with_capacity(original.len());
    let mut cursor = 0usize;

    for hunk in hunks {
        let begin = hunk.original_index();
        if begin < cursor || begin > source.len() {
            return Err(SnifferError::patch(format!(
                "hunk {} starts outside the remaining text",
                hunk.header()
            )));
        }
        source[cursor..begin].iter().for_each(|l| out.push_str(l));
        cursor = begin;

        for line in &hunk.lines {
            match line.tag {
                LineTag::Added => out.push_str(&line.text),
                LineTag::Context | LineTag::Removed => {
                    if source.get(cursor).copied() != Some(line.text.as_str()) {
                        return Err(SnifferError::patch(format!(
                            "line {} does not match hunk {}",
                            cursor + 1,
                            hunk.header()
                        )));
                    }
                    if line.tag == LineTag::Context {
                        out.push_str(&line.text);
                    }
                    cursor += 1;
                }
            }
        }
    }

    source[cursor..].iter().for_each(|l| out.push_str(l));
    Ok(out)
}

/// Splits after `\n`, `\r\n` or a lone `\r`, keeping terminators. This is the
/// same tokenisation the line diff uses.
fn split_lines_inclusive(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                lines.push(&text[start..=i]);
                start = i + 1;
            }
            b'\r' => {
                let end = if bytes.get(i + 1) == Some(&b'\n') { i + 1 } else { i };
                lines.push(&text[start..=end]);
                start = end + 1;
                i = end;
            }
            _ => {}
        }
        i += 1;
    }
    if start < text.len() {
        lines.push(&text[start..]);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn identical_input_has_no_hunks() {
        let text = "<?php\necho 1;\n";
        assert!(compute_fix_diff(text, text).is_empty());
        assert!(FixDiff::between(text, text.to_owned()).is_none());
        assert!(compute_fix_diff("", "").is_empty());
    }

    #[test]
    fn single_change_hunk_shape() {
        let original = "a\nb\nc\nd\ne\nf\ng\nh\n";
        let fixed = "a\nb\nc\nd\nE\nf\ng\nh\n";
        let hunks = compute_fix_diff(original, fixed);
        assert_eq!(hunks.len(), 1);
        let hunk = &hunks[0];
        assert_eq!(hunk.header(), "@@ -2,7 +2,7 @@");
        let tags: String = hunk.lines.iter().map(|l| l.tag.prefix()).collect();
        assert_eq!(tags, "   -+   ");
    }

    #[test]
    fn distant_changes_split_into_hunks() {
        let original: String = (1..=20).map(|n| format!("line {n}\n")).collect();
        let fixed = original
            .replace("line 2\n", "line two\n")
            .replace("line 18\n", "line eighteen\n");
        let hunks = compute_fix_diff(&original, &fixed);
        assert_eq!(hunks.len(), 2);
        assert_eq!(hunks[0].original_start, 1);
        assert_eq!(hunks[1].fixed_start, 15);
    }

    #[test]
    fn pure_insertion_at_top_uses_zero_start() {
        let hunks = compute_fix_diff("", "<?php\n");
        assert_eq!(hunks[0].header(), "@@ -0,0 +1,1 @@");
    }

    #[test]
    fn rendered_diff_has_labels_and_no_terminators() {
        let diff = FixDiff::between("x = 1\n", "x = 1;\n".to_owned()).unwrap();
        let rows = diff.view_lines();
        assert_eq!(
            rows,
            vec![
                "".to_owned(),
                FIX_PREAMBLE.to_owned(),
                "".to_owned(),
                "--- Original".to_owned(),
                "+++ Fixed".to_owned(),
                "@@ -1,1 +1,1 @@".to_owned(),
                "-x = 1".to_owned(),
                "+x = 1;".to_owned(),
            ]
        );
    }

    #[test]
    fn apply_keeps_missing_trailing_newline() {
        let original = "a\r\nb\r\nc";
        let fixed = "a\r\nB\r\nc\n";
        let hunks = compute_fix_diff(original, fixed);
        assert_eq!(apply_hunks(original, &hunks).unwrap(), fixed);
    }

    #[test]
    fn apply_rejects_mismatched_context() {
        let hunks = compute_fix_diff("a\nb\n", "a\nc\n");
        let err = apply_hunks("z\nb\n", &hunks).unwrap_err();
        assert!(matches!(err, SnifferError::Patch(_)));
    }

    #[test]
    fn lone_carriage_returns_split_lines() {
        assert_eq!(split_lines_inclusive("a\rb\r\nc"), vec!["a\r", "b\r\n", "c"]);
    }
}
