//! Buffer list panel renderer for codesniff.
//!
//! Each entry shows a marker summary, the file name, and flags for unsaved
//! changes or a run in flight.

use codesniff_core::report::Severity;
use codesniff_core::session::RunPhase;
use ratatui::{
    Frame,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem},
};

use crate::app::{AppState, PanelFocus};
use crate::buffer::Buffer;
use crate::theme::Theme;
use crate::ui::layout::panel_block;

/// Longest file name shown before it is truncated from the left.
const MAX_NAME_LEN: usize = 28;

/// Renders the buffer list using the stateful `ListState` selection.
pub fn render_buffer_list(
    frame: &mut Frame,
    area: ratatui::layout::Rect,
    focus: PanelFocus,
    state: &mut AppState,
    theme: &Theme,
) {
    let is_focused = focus == PanelFocus::Buffers;
    let title = format!("Buffers ({})", state.buffers.len());
    let block = panel_block(&title, is_focused, theme);

    let shared: &AppState = state;
    let items: Vec<ListItem> = if shared.buffers.is_empty() {
        vec![ListItem::new(Line::raw("No files open"))]
    } else {
        shared
            .buffers
            .iter()
            .enumerate()
            .map(|(idx, buffer)| buffer_item(buffer, idx == shared.active, shared, theme))
            .collect()
    };

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().fg(theme.border_active).add_modifier(Modifier::REVERSED));

    frame.render_stateful_widget(list, area, &mut state.buffer_list_state);
}

/// `● 2 ▲ 1  name.php [+]`; the active buffer is bold.
fn buffer_item(buffer: &Buffer, active: bool, state: &AppState, theme: &Theme) -> ListItem<'static> {
    let mut spans = Vec::new();

    if let Some(markers) = state.sessions.markers(buffer.id) {
        for (severity, count) in [
            (Severity::Error, markers.errors().len()),
            (Severity::Warning, markers.warnings().len()),
        ] {
            if count > 0 {
                let symbol = state.settings.markers.symbol(severity);
                spans.push(Span::styled(
                    format!("{symbol} {count} "),
                    Style::default().fg(theme.marker(severity)),
                ));
            }
        }
    }

    let name = buffer.name();
    let display = if name.chars().count() > MAX_NAME_LEN {
        let skip = name.chars().count() - (MAX_NAME_LEN - 3);
        let tail: String = name.chars().skip(skip).collect();
        format!("...{tail}")
    } else {
        name
    };
    let name_style = if active {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    spans.push(Span::styled(display, name_style));

    if buffer.dirty {
        spans.push(Span::styled(" [+]", Style::default().fg(theme.buffer_modified)));
    }
    if state.sessions.phase(buffer.id) == RunPhase::Running {
        spans.push(Span::styled(" …", Style::default().fg(theme.buffer_running)));
    }

    ListItem::new(Line::from(spans))
}
