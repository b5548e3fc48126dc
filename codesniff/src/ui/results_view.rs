//! Results panel renderer for codesniff.
//!
//! Shows the active buffer's check report or fix diff using the rows styled
//! in `highlight`, with manual virtual scrolling and the selected row
//! highlighted.

use codesniff_core::navigate::ViewKind;
use codesniff_core::session::RunPhase;
use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::Line,
    widgets::{List, ListItem},
};

use crate::app::{AppState, PanelFocus};
use crate::theme::Theme;
use crate::ui::layout::{inner_rect, panel_block};

/// Renders the results panel for the active buffer.
pub fn render_results(
    frame: &mut Frame,
    area: Rect,
    focus: PanelFocus,
    state: &AppState,
    theme: &Theme,
) {
    let is_focused = focus == PanelFocus::Results;
    let buffer = state.active_buffer();
    let view = buffer.and_then(|b| state.sessions.view(b.id));
    let title = match view.map(|v| v.kind) {
        Some(ViewKind::Findings) => "Report",
        Some(ViewKind::Diff) => "Fixes",
        None => "Results",
    };
    frame.render_widget(panel_block(title, is_focused, theme), area);
    let inner = inner_rect(area);

    let Some(buffer) = buffer.filter(|b| !b.result_lines.is_empty()) else {
        let msg = match buffer.map(|b| state.sessions.phase(b.id)) {
            Some(RunPhase::Running) => "Running...",
            Some(_) => "Press c to check or f to fix this file.",
            None => "",
        };
        frame.render_widget(List::new(vec![ListItem::new(Line::raw(msg))]), inner);
        return;
    };

    let total = buffer.result_lines.len();
    let visible_start = buffer.results_scroll.min(total.saturating_sub(1));
    let visible_end = (visible_start + inner.height as usize).min(total);

    let items: Vec<ListItem> = buffer.result_lines[visible_start..visible_end]
        .iter()
        .enumerate()
        .map(|(offset, line)| {
            let item = ListItem::new(line.clone());
            if visible_start + offset == buffer.results_cursor && is_focused {
                item.style(Style::default().bg(theme.cursor_line))
            } else {
                item
            }
        })
        .collect();

    frame.render_widget(List::new(items), inner);
}
