//! Source panel renderer for codesniff.
//!
//! Renders the active buffer with a gutter of line numbers and markers. Only
//! the visible window of pre-highlighted lines is materialised per frame.

use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{List, ListItem},
};

use crate::app::{AppState, PanelFocus};
use crate::theme::Theme;
use crate::ui::layout::{inner_rect, panel_block};

/// Renders the source panel for the active buffer.
pub fn render_source(
    frame: &mut Frame,
    area: Rect,
    focus: PanelFocus,
    state: &AppState,
    theme: &Theme,
) {
    let is_focused = focus == PanelFocus::Source;
    let Some(buffer) = state.active_buffer() else {
        frame.render_widget(panel_block("Source", is_focused, theme), area);
        let hint = List::new(vec![ListItem::new(Line::raw(
            "No file open. Start codesniff with one or more PHP files.",
        ))]);
        frame.render_widget(hint, inner_rect(area));
        return;
    };

    let title = if buffer.dirty {
        format!("{} [+]", buffer.path.display())
    } else {
        buffer.path.display().to_string()
    };
    frame.render_widget(panel_block(&title, is_focused, theme), area);

    let inner = inner_rect(area);
    let lines = buffer.highlighted();
    let total = lines.len();
    let visible_start = buffer.source_scroll.min(total.saturating_sub(1));
    let visible_end = (visible_start + inner.height as usize).min(total);
    let number_width = total.max(1).to_string().len();
    let markers = state.sessions.markers(buffer.id);

    let items: Vec<ListItem> = lines[visible_start..visible_end]
        .iter()
        .enumerate()
        .map(|(offset, line)| {
            let number = visible_start + offset + 1;
            let marker = match markers.and_then(|m| m.severity_at(number)) {
                Some(severity) => Span::styled(
                    format!("{} ", state.settings.markers.symbol(severity)),
                    Style::default().fg(theme.marker(severity)),
                ),
                None => Span::raw("  "),
            };
            let mut spans = vec![
                marker,
                Span::styled(
                    format!("{number:>number_width$} "),
                    Style::default().fg(theme.gutter),
                ),
            ];
            spans.extend(line.spans.iter().cloned());

            let row = Line::from(spans);
            if number == buffer.cursor_line {
                ListItem::new(row).style(Style::default().bg(theme.cursor_line))
            } else {
                ListItem::new(row)
            }
        })
        .collect();

    frame.render_widget(List::new(items), inner);
}
