//! Responsive 3-panel layout engine for codesniff.
//!
//! Pure layout arithmetic, called inside `terminal.draw()` on every render so
//! every frame reflects the current terminal size.
//!
//! # Panel geometry
//!
//! | Terminal width | Layout |
//! |----------------|--------|
//! | `>= 100` cols  | Buffers 20% / Source / Results 40% (when shown) |
//! | `< 100` cols   | One panel: Results while it has focus, else Source |
//!
//! `Spacing::Overlap(1)` combined with `Block::merge_borders(MergeStrategy::Fuzzy)`
//! makes adjacent panel borders share a single column.

use codesniff_core::session::RunPhase;
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Margin, Rect, Spacing},
    style::{Modifier, Style},
    symbols::merge::MergeStrategy,
    text::{Line, Span},
    widgets::{Block, BorderType, Paragraph},
};

use crate::app::{AppState, Mode, PanelFocus, StatusKind};
use crate::theme::Theme;

/// Below this width side panels collapse.
pub const COMPACT_WIDTH: u16 = 100;

/// Panel areas for one frame. Hidden panels are zero-sized.
#[derive(Debug, Clone, Copy)]
pub struct Panels {
    pub buffers: Rect,
    pub source: Rect,
    pub results: Rect,
    pub status_bar: Rect,
}

/// Splits the frame for the current focus and terminal width.
pub fn compute_layout(frame: &Frame, state: &AppState) -> Panels {
    let area = frame.area();
    let [main_area, status_bar] =
        area.layout(&Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]));

    if area.width < COMPACT_WIDTH {
        let results_first = state.show_results && state.focus == PanelFocus::Results;
        let (source, results) = if results_first {
            (Rect::default(), main_area)
        } else {
            (main_area, Rect::default())
        };
        return Panels {
            buffers: Rect::default(),
            source,
            results,
            status_bar,
        };
    }

    let results_pct = if state.show_results { 40 } else { 0 };
    let horizontal = Layout::horizontal([
        Constraint::Percentage(20),
        Constraint::Fill(1),
        Constraint::Percentage(results_pct),
    ])
    .spacing(Spacing::Overlap(1));
    let [buffers, source, results] = main_area.layout(&horizontal);

    Panels {
        buffers,
        source,
        results: if state.show_results { results } else { Rect::default() },
        status_bar,
    }
}

/// The inner `Rect` of a panel after removing its 1-cell border.
pub fn inner_rect(area: Rect) -> Rect {
    area.inner(Margin { vertical: 1, horizontal: 1 })
}

/// Builds a bordered `Block` for a panel; thick border when focused.
pub fn panel_block<'a>(title: &'a str, is_focused: bool, theme: &'a Theme) -> Block<'a> {
    let border_style = if is_focused {
        Style::default().fg(theme.border_active)
    } else {
        Style::default().fg(theme.border_inactive)
    };
    let border_type = if is_focused { BorderType::Thick } else { BorderType::Plain };

    Block::bordered()
        .title(title)
        .border_type(border_type)
        .border_style(border_style)
        .merge_borders(MergeStrategy::Fuzzy)
}

/// Renders the 1-row status bar: mode, active buffer, run phase, and the
/// current status message.
pub fn render_status_bar(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let mode_text = match state.mode {
        Mode::Normal | Mode::HelpOverlay => " NORMAL ",
        Mode::ConfirmQuit => " QUIT? y/n ",
        Mode::ConfirmClose => " CLOSE? y/n ",
    };
    let mut spans = vec![Span::styled(
        mode_text,
        Style::default().fg(theme.status_mode_normal).add_modifier(Modifier::BOLD),
    )];

    if let Some(buffer) = state.active_buffer() {
        let dirty = if buffer.dirty { " [+]" } else { "" };
        spans.push(Span::raw(format!(" {}{dirty} ", buffer.name())));
        let phase = match state.sessions.phase(buffer.id) {
            RunPhase::Running => Some("running"),
            RunPhase::Failed => Some("failed"),
            _ => None,
        };
        if let Some(phase) = phase {
            spans.push(Span::styled(
                format!("({phase}) "),
                Style::default().fg(theme.buffer_running),
            ));
        }
    }

    if let Some(status) = &state.status {
        let color = match status.kind {
            StatusKind::Info => theme.status_info,
            StatusKind::Error => theme.status_error,
        };
        spans.push(Span::styled(format!(" {}", status.text), Style::default().fg(color)));
    }

    frame.render_widget(
        Paragraph::new(Line::from(spans))
            .style(Style::default().bg(theme.status_bar_bg).fg(theme.status_bar_fg)),
        area,
    );
}
