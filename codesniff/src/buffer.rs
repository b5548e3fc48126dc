//! Open files.
//!
//! A buffer is read-mostly: its content changes only when a fix is applied,
//! and it is written back with an explicit save.

use std::io;
use std::path::{Path, PathBuf};

use codesniff_core::BufferId;
use ratatui::text::Line;
use tracing::{debug, info};

use crate::highlight::highlight_source;

/// One open file plus its view state.
#[derive(Debug)]
pub struct Buffer {
    pub id: BufferId,
    pub path: PathBuf,
    text: String,
    highlighted: Vec<Line<'static>>,
    /// Content differs from what is on disk.
    pub dirty: bool,

    /// 1-based line the source cursor sits on.
    pub cursor_line: usize,
    /// First visible source row, 0-based.
    pub source_scroll: usize,

    /// Styled rows of the current result view.
    pub result_lines: Vec<Line<'static>>,
    /// Selected results row, 0-based.
    pub results_cursor: usize,
    pub results_scroll: usize,
}

impl Buffer {
    /// Reads `path` into a new buffer. A file that does not exist yet opens
    /// empty and is created on first save.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the file exists but cannot be read, or is not UTF-8.
    pub fn open(id: BufferId, path: &Path) -> io::Result<Self> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "opening new file");
                String::new()
            }
            Err(e) => return Err(e),
        };
        Ok(Self::from_text(id, path.to_path_buf(), text))
    }

    pub fn from_text(id: BufferId, path: PathBuf, text: String) -> Self {
        let highlighted = highlight_source(&text, extension(&path));
        Self {
            id,
            path,
            text,
            highlighted,
            dirty: false,
            cursor_line: 1,
            source_scroll: 0,
            result_lines: Vec::new(),
            results_cursor: 0,
            results_scroll: 0,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn highlighted(&self) -> &[Line<'static>] {
        &self.highlighted
    }

    pub fn line_count(&self) -> usize {
        self.text.lines().count()
    }

    /// Short label for the buffer list and status bar.
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// Replaces the content, e.g. with fixer output. Marks the buffer dirty
    /// and keeps the cursor inside the new text.
    pub fn replace_content(&mut self, text: String) {
        if text == self.text {
            return;
        }
        self.highlighted = highlight_source(&text, extension(&self.path));
        self.text = text;
        self.dirty = true;
        self.cursor_line = self.cursor_line.clamp(1, self.line_count().max(1));
    }

    /// Writes the content back to `path`.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the file cannot be written.
    pub fn save(&mut self) -> io::Result<()> {
        std::fs::write(&self.path, &self.text)?;
        self.dirty = false;
        info!(path = %self.path.display(), bytes = self.text.len(), "saved buffer");
        Ok(())
    }
}

fn extension(path: &Path) -> &str {
    path.extension().and_then(|e| e.to_str()).unwrap_or("txt")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replacing_content_marks_dirty_and_clamps_cursor() {
        let mut buf = Buffer::from_text(BufferId(1), "a.php".into(), "1\n2\n3\n4\n".to_owned());
        buf.cursor_line = 4;
        buf.replace_content("1\n2\n".to_owned());
        assert!(buf.dirty);
        assert_eq!(buf.cursor_line, 2);
        assert_eq!(buf.highlighted().len(), 2);
    }

    #[test]
    fn identical_replacement_is_a_no_op() {
        let mut buf = Buffer::from_text(BufferId(1), "a.php".into(), "x\n".to_owned());
        buf.replace_content("x\n".to_owned());
        assert!(!buf.dirty);
    }
}
