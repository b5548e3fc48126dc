//! Central application state for codesniff.
//!
//! This module owns all mutable UI state: open buffers, the session registry,
//! focus, scroll positions and the status message. No ratatui rendering
//! lives here; `app.rs` is state read by the render module and mutated by
//! the keybinding dispatcher and by run completions.

use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use codesniff_core::navigate::{resolve_click, ClickAction};
use codesniff_core::report::{parser_for, ReportParser};
use codesniff_core::{Applied, BufferId, RunMode, SessionRegistry, Settings};
use ratatui::layout::Rect;
use ratatui::widgets::ListState;
use tracing::{debug, info};

use crate::buffer::Buffer;
use crate::highlight::style_results;
use crate::runner::types::{RunCompletion, RunJob};
use crate::theme::Theme;

/// Ticks (250 ms each) a status message stays visible.
pub const STATUS_TTL_TICKS: u8 = 16;

/// Which keybinding set is active.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Normal,
    /// Full-screen help overlay is shown above all panels.
    HelpOverlay,
    /// Quit-confirmation dialog shown when buffers have unsaved changes.
    ConfirmQuit,
    /// Close-confirmation dialog for a buffer with unsaved changes.
    ConfirmClose,
}

/// Which panel currently has keyboard focus.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum PanelFocus {
    /// Left panel listing open buffers.
    Buffers,
    /// Centre panel with the source and its gutter.
    #[default]
    Source,
    /// Right panel with the check report or fix diff.
    Results,
}

impl PanelFocus {
    /// Cycle order: `Buffers` → `Source` → `Results` → `Buffers`.
    pub fn next(self) -> Self {
        match self {
            PanelFocus::Buffers => PanelFocus::Source,
            PanelFocus::Source => PanelFocus::Results,
            PanelFocus::Results => PanelFocus::Buffers,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            PanelFocus::Buffers => PanelFocus::Results,
            PanelFocus::Source => PanelFocus::Buffers,
            PanelFocus::Results => PanelFocus::Source,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Error,
}

/// A transient message in the status bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub kind: StatusKind,
    ticks_left: u8,
}

/// All mutable UI state passed through every render cycle.
pub struct AppState {
    pub mode: Mode,
    pub focus: PanelFocus,

    pub buffers: Vec<Buffer>,
    /// Index into `buffers` of the buffer shown in the source panel.
    pub active: usize,
    /// Selection in the buffer list; may differ from `active` until Enter.
    pub buffer_list_state: ListState,

    pub sessions: SessionRegistry,
    pub settings: Arc<Settings>,
    pub parser: Arc<dyn ReportParser>,
    /// Colors for the panels, also baked into cached result rows.
    pub theme: Arc<Theme>,

    pub show_results: bool,
    pub status: Option<StatusMessage>,
    pub help_scroll: u16,

    /// `[buffers, source, results]` as drawn in the last frame; zero-sized
    /// when hidden. Used for mouse hit-testing.
    pub panel_rects: [Rect; 3],
    /// Set by the renderer when side panels are collapsed.
    pub compact: bool,

    /// Inner heights cached after each render for page-wise scrolling.
    pub buffer_list_viewport_height: u16,
    pub source_viewport_height: u16,
    pub results_viewport_height: u16,

    next_buffer_id: u64,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        let parser = parser_for(&settings);
        let theme = Theme::from_name(&settings.theme).with_markers(&settings.markers);
        Self {
            mode: Mode::default(),
            focus: PanelFocus::default(),
            buffers: Vec::new(),
            active: 0,
            buffer_list_state: ListState::default(),
            sessions: SessionRegistry::new(settings.overlap_policy),
            settings: Arc::new(settings),
            parser,
            theme: Arc::new(theme),
            show_results: true,
            status: None,
            help_scroll: 0,
            panel_rects: [Rect::default(); 3],
            compact: false,
            buffer_list_viewport_height: 0,
            source_viewport_height: 0,
            results_viewport_height: 0,
            next_buffer_id: 0,
        }
    }

    // -----------------------------------------------------------------------
    // Buffers
    // -----------------------------------------------------------------------

    /// Opens `path`, or selects it if it is already open.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the file exists but cannot be read as UTF-8 text.
    pub fn open_file(&mut self, path: &Path) -> io::Result<BufferId> {
        let path = absolute_path(path)?;
        if let Some(idx) = self.buffers.iter().position(|b| b.path == path) {
            self.select_buffer(idx);
            return Ok(self.buffers[idx].id);
        }
        let id = self.next_id();
        let buffer = Buffer::open(id, &path)?;
        info!(buffer = %id, path = %path.display(), lines = buffer.line_count(), "opened buffer");
        Ok(self.adopt(buffer))
    }

    fn next_id(&mut self) -> BufferId {
        self.next_buffer_id += 1;
        BufferId(self.next_buffer_id)
    }

    fn adopt(&mut self, buffer: Buffer) -> BufferId {
        let id = buffer.id;
        self.sessions.open(id);
        self.buffers.push(buffer);
        self.select_buffer(self.buffers.len() - 1);
        id
    }

    pub fn active_buffer(&self) -> Option<&Buffer> {
        self.buffers.get(self.active)
    }

    fn buffer_index(&self, id: BufferId) -> Option<usize> {
        self.buffers.iter().position(|b| b.id == id)
    }

    pub fn select_buffer(&mut self, idx: usize) {
        if idx < self.buffers.len() {
            self.active = idx;
            self.buffer_list_state.select(Some(idx));
        }
    }

    pub fn next_buffer(&mut self) {
        if !self.buffers.is_empty() {
            self.select_buffer((self.active + 1) % self.buffers.len());
        }
    }

    pub fn prev_buffer(&mut self) {
        if !self.buffers.is_empty() {
            let len = self.buffers.len();
            self.select_buffer((self.active + len - 1) % len);
        }
    }

    /// Makes the buffer highlighted in the buffer list the active one.
    pub fn open_selected_buffer(&mut self) {
        if let Some(idx) = self.buffer_list_state.selected() {
            self.select_buffer(idx.min(self.buffers.len().saturating_sub(1)));
            self.focus = PanelFocus::Source;
        }
    }

    pub fn has_unsaved(&self) -> bool {
        self.buffers.iter().any(|b| b.dirty)
    }

    /// Asks for confirmation first when the active buffer is dirty.
    pub fn request_close(&mut self) {
        match self.active_buffer().map(|b| b.dirty) {
            Some(true) => self.mode = Mode::ConfirmClose,
            Some(false) => self.close_active(),
            None => {}
        }
    }

    /// Closes the active buffer. Results still in flight for it are dropped
    /// when they arrive.
    pub fn close_active(&mut self) {
        if self.active >= self.buffers.len() {
            return;
        }
        let buffer = self.buffers.remove(self.active);
        self.sessions.close(buffer.id);
        info!(buffer = %buffer.id, path = %buffer.path.display(), "closed buffer");
        self.set_info(format!("closed {}", buffer.name()));

        if self.buffers.is_empty() {
            self.active = 0;
            self.buffer_list_state.select(None);
        } else {
            self.select_buffer(self.active.min(self.buffers.len() - 1));
        }
    }

    /// Saves the active buffer; returns a check job when run-on-save applies.
    pub fn save_active(&mut self) -> Option<RunJob> {
        let buffer = self.buffers.get_mut(self.active)?;
        let path = buffer.path.clone();
        let name = buffer.name();
        match buffer.save() {
            Ok(()) => {
                self.set_info(format!("wrote {name}"));
                if self.settings.runs_on_save(&path) {
                    return self.request_run(RunMode::Check);
                }
                None
            }
            Err(e) => {
                self.set_error(format!("cannot write {}: {e}", path.display()));
                None
            }
        }
    }

    /// Returns `true` when the app may quit right away; otherwise switches
    /// to the confirmation dialog.
    pub fn request_quit(&mut self) -> bool {
        if self.has_unsaved() {
            self.mode = Mode::ConfirmQuit;
            false
        } else {
            true
        }
    }

    // -----------------------------------------------------------------------
    // Runs
    // -----------------------------------------------------------------------

    /// Starts a run on the active buffer.
    ///
    /// Returns the job to hand to the runner, or `None` when there is no
    /// buffer or the overlap policy refused the run.
    pub fn request_run(&mut self, mode: RunMode) -> Option<RunJob> {
        let buffer = self.buffers.get(self.active)?;
        let (id, line_count) = (buffer.id, buffer.line_count());
        let (content, path, name) = (buffer.text().to_owned(), buffer.path.clone(), buffer.name());

        match self.sessions.begin_run(id, mode, line_count) {
            Ok(ticket) => {
                let tool = match mode {
                    RunMode::Check => "phpcs",
                    RunMode::Fix => "phpcbf",
                };
                self.set_info(format!("running {tool} on {name}..."));
                Some(RunJob {
                    ticket,
                    content,
                    path,
                    settings: Arc::clone(&self.settings),
                    parser: Arc::clone(&self.parser),
                })
            }
            Err(e) => {
                self.set_error(e.to_string());
                None
            }
        }
    }

    /// Applies a finished run if it is still current for an open buffer.
    pub fn apply_completion(&mut self, completion: RunCompletion) {
        let RunCompletion { ticket, outcome } = completion;
        let applied = self.sessions.complete(ticket, outcome, self.parser.as_ref());
        let Some(idx) = self.buffer_index(ticket.buffer) else {
            debug!(buffer = %ticket.buffer, "completion for closed buffer");
            return;
        };
        let name = self.buffers[idx].name();

        match applied {
            Applied::Stale => {
                debug!(buffer = %ticket.buffer, seq = ticket.seq, "ignored stale completion");
                return;
            }
            Applied::Findings { markers } => {
                self.show_results = true;
                self.set_info(format!(
                    "{name}: errors on {} lines, warnings on {} lines",
                    markers.errors().len(),
                    markers.warnings().len()
                ));
            }
            Applied::Fix { fixed_content } => {
                self.buffers[idx].replace_content(fixed_content);
                self.show_results = true;
                self.set_info(format!("{name}: fixes applied, press w to save"));
            }
            Applied::Empty(reason) => self.set_info(format!("{name}: {}", reason.message())),
            Applied::Failed(message) => self.set_error(format!("{name}: {message}")),
        }
        self.refresh_results(idx);
    }

    fn refresh_results(&mut self, idx: usize) {
        let buffer = &mut self.buffers[idx];
        buffer.result_lines = self
            .sessions
            .view(buffer.id)
            .map(|view| style_results(view, self.parser.as_ref(), &self.theme))
            .unwrap_or_default();
        buffer.results_cursor = 0;
        buffer.results_scroll = 0;
    }

    /// Acts on the selected results row: jump to its source line or run the
    /// fixer. Returns a job when a run was started.
    pub fn activate_result_row(&mut self) -> Option<RunJob> {
        let buffer = self.buffers.get(self.active)?;
        let view = self.sessions.view(buffer.id)?;
        let action = resolve_click(view, buffer.results_cursor, self.parser.as_ref());
        match action {
            ClickAction::JumpTo(line) => {
                self.jump_to(line);
                None
            }
            ClickAction::RunFix => self.request_run(RunMode::Fix),
            ClickAction::Nothing => None,
        }
    }

    /// Selects results row `row` (clamped) and activates it.
    pub fn click_result_row(&mut self, row: usize) -> Option<RunJob> {
        let buffer = self.buffers.get_mut(self.active)?;
        if row >= buffer.result_lines.len() {
            return None;
        }
        buffer.results_cursor = row;
        self.activate_result_row()
    }

    /// Moves the source cursor to 1-based `line` and scrolls it into view.
    pub fn jump_to(&mut self, line: usize) {
        let height = usize::from(self.source_viewport_height).max(1);
        let Some(buffer) = self.buffers.get_mut(self.active) else {
            return;
        };
        buffer.cursor_line = line.clamp(1, buffer.line_count().max(1));
        let row = buffer.cursor_line - 1;
        if row < buffer.source_scroll || row >= buffer.source_scroll + height {
            buffer.source_scroll = row.saturating_sub(height / 2);
        }
        if self.compact {
            self.focus = PanelFocus::Source;
        }
    }

    /// Ages the status message.
    pub fn tick(&mut self) {
        if let Some(status) = self.status.as_mut() {
            status.ticks_left = status.ticks_left.saturating_sub(1);
            if status.ticks_left == 0 {
                self.status = None;
            }
        }
    }

    pub fn set_info(&mut self, text: impl Into<String>) {
        self.set_status(text.into(), StatusKind::Info);
    }

    pub fn set_error(&mut self, text: impl Into<String>) {
        self.set_status(text.into(), StatusKind::Error);
    }

    fn set_status(&mut self, text: String, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text,
            kind,
            ticks_left: STATUS_TTL_TICKS,
        });
    }

    // -----------------------------------------------------------------------
    // Focus and scrolling
    // -----------------------------------------------------------------------

    pub fn toggle_results(&mut self) {
        self.show_results = !self.show_results;
        if !self.show_results && self.focus == PanelFocus::Results {
            self.focus = PanelFocus::Source;
        }
    }

    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
        while !self.is_visible(self.focus) {
            self.focus = self.focus.next();
        }
    }

    pub fn focus_prev(&mut self) {
        self.focus = self.focus.prev();
        while !self.is_visible(self.focus) {
            self.focus = self.focus.prev();
        }
    }

    /// Whether `panel` can hold focus. The buffer list is hidden in the
    /// compact layout; the source panel always can.
    fn is_visible(&self, panel: PanelFocus) -> bool {
        match panel {
            PanelFocus::Buffers => !self.compact,
            PanelFocus::Source => true,
            PanelFocus::Results => self.show_results,
        }
    }

    /// Moves the focused panel's cursor down by `lines` rows.
    pub fn scroll_down(&mut self, lines: usize) {
        self.move_cursor(lines as isize);
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.move_cursor(-(lines as isize));
    }

    pub fn scroll_top(&mut self) {
        self.move_cursor(isize::MIN / 2);
    }

    pub fn scroll_bottom(&mut self) {
        self.move_cursor(isize::MAX / 2);
    }

    pub fn half_page_down(&mut self) {
        self.scroll_down((self.focused_viewport_height() / 2).max(1));
    }

    pub fn half_page_up(&mut self) {
        self.scroll_up((self.focused_viewport_height() / 2).max(1));
    }

    fn focused_viewport_height(&self) -> usize {
        usize::from(match self.focus {
            PanelFocus::Buffers => self.buffer_list_viewport_height,
            PanelFocus::Source => self.source_viewport_height,
            PanelFocus::Results => self.results_viewport_height,
        })
    }

    fn move_cursor(&mut self, delta: isize) {
        match self.focus {
            PanelFocus::Buffers => {
                let len = self.buffers.len();
                if len == 0 {
                    return;
                }
                let current = self.buffer_list_state.selected().unwrap_or(self.active);
                self.buffer_list_state
                    .select(Some(offset_clamped(current, delta, len - 1)));
            }
            PanelFocus::Source => {
                let height = usize::from(self.source_viewport_height).max(1);
                let Some(buffer) = self.buffers.get_mut(self.active) else {
                    return;
                };
                let last = buffer.line_count().max(1);
                buffer.cursor_line = offset_clamped(buffer.cursor_line - 1, delta, last - 1) + 1;
                buffer.source_scroll =
                    keep_visible(buffer.cursor_line - 1, buffer.source_scroll, height);
            }
            PanelFocus::Results => {
                let height = usize::from(self.results_viewport_height).max(1);
                let Some(buffer) = self.buffers.get_mut(self.active) else {
                    return;
                };
                let Some(last) = buffer.result_lines.len().checked_sub(1) else {
                    return;
                };
                buffer.results_cursor = offset_clamped(buffer.results_cursor, delta, last);
                buffer.results_scroll =
                    keep_visible(buffer.results_cursor, buffer.results_scroll, height);
            }
        }
    }

    /// `]`: next finding or hunk row in the results panel, or the next
    /// marked line in the source.
    pub fn next_anchor(&mut self) {
        self.step_anchor(true);
    }

    /// `[`: counterpart of [`AppState::next_anchor`].
    pub fn prev_anchor(&mut self) {
        self.step_anchor(false);
    }

    fn step_anchor(&mut self, forward: bool) {
        let Some(buffer) = self.buffers.get(self.active) else {
            return;
        };
        let id = buffer.id;

        if self.focus == PanelFocus::Results {
            let cursor = buffer.results_cursor;
            let Some(view) = self.sessions.view(id) else {
                return;
            };
            let target = if forward {
                view.next_anchor(cursor)
            } else {
                view.prev_anchor(cursor)
            };
            if let Some(row) = target {
                let height = usize::from(self.results_viewport_height).max(1);
                let buffer = &mut self.buffers[self.active];
                buffer.results_cursor = row;
                buffer.results_scroll = keep_visible(row, buffer.results_scroll, height);
            }
            return;
        }

        let cursor = buffer.cursor_line;
        let lines = self
            .sessions
            .markers(id)
            .map(|markers| markers.lines())
            .unwrap_or_default();
        let target = if forward {
            lines.into_iter().find(|&l| l > cursor)
        } else {
            lines.into_iter().rev().find(|&l| l < cursor)
        };
        match target {
            Some(line) => self.jump_to(line),
            None => self.set_info("no more markers"),
        }
    }
}

/// Makes `path` absolute against the working directory and drops `.` and
/// `..` components, so per-folder rulesets match however the file was named.
fn absolute_path(path: &Path) -> io::Result<PathBuf> {
    let mut resolved = PathBuf::new();
    for component in std::path::absolute(path)?.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            other => resolved.push(other),
        }
    }
    Ok(resolved)
}

fn offset_clamped(current: usize, delta: isize, last: usize) -> usize {
    current.saturating_add_signed(delta).min(last)
}

/// Scroll offset that keeps `row` inside a `height`-row window.
fn keep_visible(row: usize, scroll: usize, height: usize) -> usize {
    if row < scroll {
        row
    } else if row >= scroll + height {
        row + 1 - height
    } else {
        scroll
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use codesniff_core::config::{OverlapPolicy, ReportFormat, StandardSetting};
    use codesniff_core::invoker::CommandLine;
    use codesniff_core::diff::FixDiff;
    use codesniff_core::report::parse_findings;
    use codesniff_core::{EmptyReason, RunOutcome, RunResult, SnifferError};
    use pretty_assertions::assert_eq;

    const REPORT: &str = " Errors:\n [x] Line 2 : Missing semicolon\n Warnings:\n [ ] Line 4 : Unused variable\n [ Click here to fix this file ]\n";

    fn plugin_settings() -> Settings {
        Settings {
            report_format: ReportFormat::Plugin,
            report_path: Some("/opt/report.php".into()),
            ..Settings::default()
        }
    }

    fn state_with(settings: Settings, text: &str) -> AppState {
        let mut state = AppState::new(settings);
        state.source_viewport_height = 10;
        state.results_viewport_height = 10;
        let id = state.next_id();
        state.adopt(Buffer::from_text(id, "/srv/a.php".into(), text.to_owned()));
        state
    }

    fn findings() -> RunOutcome {
        RunOutcome::Ready(RunResult::FindingsReport {
            findings: parse_findings(REPORT),
            report: REPORT.to_owned(),
        })
    }

    fn finish(state: &mut AppState, job: RunJob, outcome: RunOutcome) {
        state.apply_completion(RunCompletion {
            ticket: job.ticket,
            outcome,
        });
    }

    #[test]
    fn check_completion_sets_markers_and_results() {
        let mut state = state_with(plugin_settings(), "<?php\n$a = 1\n\n$b = 2;\n");
        let job = state.request_run(RunMode::Check).unwrap();
        assert_eq!(job.content, "<?php\n$a = 1\n\n$b = 2;\n");
        finish(&mut state, job, findings());

        let id = state.buffers[0].id;
        assert_eq!(state.sessions.markers(id).unwrap().lines(), vec![2, 4]);
        assert_eq!(state.buffers[0].result_lines.len(), 5);
        assert_eq!(state.status.as_ref().unwrap().kind, StatusKind::Info);
    }

    #[test]
    fn stale_completion_changes_nothing() {
        let mut state = state_with(plugin_settings(), "<?php\n$a = 1\n\n$b = 2;\n");
        let first = state.request_run(RunMode::Check).unwrap();
        let second = state.request_run(RunMode::Check).unwrap();

        finish(&mut state, second, RunOutcome::Empty(EmptyReason::NoIssues));
        finish(&mut state, first, findings());

        let id = state.buffers[0].id;
        assert!(state.sessions.markers(id).unwrap().is_empty());
        assert!(state.buffers[0].result_lines.is_empty());
    }

    #[test]
    fn reject_policy_reports_busy_buffer() {
        let settings = Settings {
            overlap_policy: OverlapPolicy::Reject,
            ..plugin_settings()
        };
        let mut state = state_with(settings, "<?php\n");
        assert!(state.request_run(RunMode::Check).is_some());
        assert!(state.request_run(RunMode::Fix).is_none());
        assert_eq!(state.status.as_ref().unwrap().kind, StatusKind::Error);
    }

    #[test]
    fn fix_completion_replaces_buffer() {
        let mut state = state_with(plugin_settings(), "<?php\n$a = 1\n");
        let job = state.request_run(RunMode::Fix).unwrap();
        let diff = FixDiff::between(&job.content, "<?php\n$a = 1;\n".to_owned()).unwrap();
        finish(&mut state, job, RunOutcome::Ready(RunResult::FixDiff(diff)));

        let buffer = &state.buffers[0];
        assert_eq!(buffer.text(), "<?php\n$a = 1;\n");
        assert!(buffer.dirty);
        assert!(state.sessions.markers(buffer.id).unwrap().is_empty());
        assert!(!buffer.result_lines.is_empty());
    }

    #[test]
    fn failure_shows_error_status() {
        let mut state = state_with(plugin_settings(), "<?php\n");
        let job = state.request_run(RunMode::Check).unwrap();
        finish(
            &mut state,
            job,
            RunOutcome::Failed(SnifferError::NoOutput {
                program: "phpcs".to_owned(),
            }),
        );
        let status = state.status.as_ref().unwrap();
        assert_eq!(status.kind, StatusKind::Error);
        assert!(status.text.contains("phpcs"));
    }

    #[test]
    fn activating_rows_jumps_or_fixes() {
        let mut state = state_with(plugin_settings(), "<?php\n$a = 1\n\n$b = 2;\n");
        let job = state.request_run(RunMode::Check).unwrap();
        finish(&mut state, job, findings());

        assert!(state.click_result_row(3).is_none());
        assert_eq!(state.buffers[0].cursor_line, 4);

        let fix = state.click_result_row(4).unwrap();
        assert_eq!(fix.ticket.mode, RunMode::Fix);
    }

    #[test]
    fn anchors_step_through_findings() {
        let mut state = state_with(plugin_settings(), "<?php\n$a = 1\n\n$b = 2;\n");
        let job = state.request_run(RunMode::Check).unwrap();
        finish(&mut state, job, findings());

        state.focus = PanelFocus::Results;
        state.next_anchor();
        assert_eq!(state.buffers[0].results_cursor, 1);
        state.next_anchor();
        assert_eq!(state.buffers[0].results_cursor, 3);

        state.focus = PanelFocus::Source;
        state.next_anchor();
        assert_eq!(state.buffers[0].cursor_line, 2);
        state.next_anchor();
        assert_eq!(state.buffers[0].cursor_line, 4);
        state.prev_anchor();
        assert_eq!(state.buffers[0].cursor_line, 2);
    }

    #[test]
    fn status_expires_after_ttl() {
        let mut state = AppState::new(Settings::default());
        state.set_info("hello");
        for _ in 0..STATUS_TTL_TICKS - 1 {
            state.tick();
        }
        assert!(state.status.is_some());
        state.tick();
        assert!(state.status.is_none());
    }

    #[test]
    fn closing_buffer_drops_late_result() {
        let mut state = state_with(plugin_settings(), "<?php\n");
        let job = state.request_run(RunMode::Check).unwrap();
        state.close_active();
        finish(&mut state, job, findings());
        assert!(state.buffers.is_empty());
    }

    #[test]
    fn dirty_buffers_need_confirmation() {
        let mut state = state_with(plugin_settings(), "<?php\n");
        assert!(state.request_quit());
        state.buffers[0].replace_content("<?php\n\n".to_owned());
        assert!(!state.request_quit());
        assert_eq!(state.mode, Mode::ConfirmQuit);

        state.mode = Mode::Normal;
        state.request_close();
        assert_eq!(state.mode, Mode::ConfirmClose);
        assert_eq!(state.buffers.len(), 1);
    }

    #[test]
    fn save_triggers_check_when_enabled() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("a.php");
        let settings = Settings {
            run_on_save: true,
            ..plugin_settings()
        };
        let mut state = AppState::new(settings);
        state.open_file(&path).unwrap();
        state.buffers[0].replace_content("<?php\n".to_owned());

        let job = state.save_active().unwrap();
        assert_eq!(job.ticket.mode, RunMode::Check);
        assert!(!state.buffers[0].dirty);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<?php\n");
    }

    #[test]
    fn cursor_movement_keeps_row_visible() {
        assert_eq!(keep_visible(15, 0, 10), 6);
        assert_eq!(keep_visible(2, 5, 10), 2);
        assert_eq!(keep_visible(7, 5, 10), 5);
        assert_eq!(offset_clamped(3, -10, 9), 0);
        assert_eq!(offset_clamped(3, 100, 9), 9);
    }

    #[test]
    fn relative_path_picks_up_folder_ruleset() {
        let cwd = std::env::current_dir().unwrap();
        let mut folders = BTreeMap::new();
        folders.insert(cwd.display().to_string(), "PSR12".to_owned());
        folders.insert("_default".to_owned(), "Squiz".to_owned());
        let settings = Settings {
            phpcs_standard: Some(StandardSetting::PerFolder(folders)),
            ..Settings::default()
        };
        let mut state = AppState::new(settings);
        state.open_file(Path::new("not_yet_created.php")).unwrap();

        let job = state.request_run(RunMode::Check).unwrap();
        assert_eq!(job.path, cwd.join("not_yet_created.php"));
        let argv = CommandLine::for_mode(RunMode::Check, &job.path, &job.settings);
        assert!(argv.args.contains(&"--standard=PSR12".to_owned()), "{argv}");
    }

    #[test]
    fn same_file_named_two_ways_is_one_buffer() {
        let cwd = std::env::current_dir().unwrap();
        let mut state = AppState::new(Settings::default());
        let first = state.open_file(Path::new("x.php")).unwrap();
        let second = state.open_file(Path::new("./sub/../x.php")).unwrap();
        assert_eq!(first, second);
        assert_eq!(state.buffers.len(), 1);
        assert_eq!(state.buffers[0].path, cwd.join("x.php"));
    }
}
