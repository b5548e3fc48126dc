//! UI rendering module for codesniff.
//!
//! `render()` is the single entry point called by the event loop's
//! `terminal.draw()` closure. Layout arithmetic lives in `layout.rs`; each
//! panel has its own module.

mod layout;
pub mod buffer_list;
pub mod help;
pub mod keybindings;
pub mod results_view;
pub mod source_view;

use ratatui::Frame;

use crate::app::{AppState, Mode};
use crate::theme::Theme;
use layout::{compute_layout, inner_rect, render_status_bar, COMPACT_WIDTH};

/// Renders one complete frame.
///
/// Panel rects and inner heights are written back into `state` so the next
/// keypress or mouse click can use them.
pub fn render(frame: &mut Frame, state: &mut AppState, theme: &Theme) {
    let panels = compute_layout(frame, state);

    state.compact = frame.area().width < COMPACT_WIDTH;
    state.panel_rects = [panels.buffers, panels.source, panels.results];
    state.buffer_list_viewport_height = inner_rect(panels.buffers).height;
    state.source_viewport_height = inner_rect(panels.source).height;
    state.results_viewport_height = inner_rect(panels.results).height;

    let focus = state.focus;

    if panels.buffers.width > 0 {
        buffer_list::render_buffer_list(frame, panels.buffers, focus, state, theme);
    }
    if panels.source.width > 0 {
        source_view::render_source(frame, panels.source, focus, state, theme);
    }
    if panels.results.width > 0 {
        results_view::render_results(frame, panels.results, focus, state, theme);
    }

    render_status_bar(frame, panels.status_bar, state, theme);

    if state.mode == Mode::HelpOverlay {
        help::render_help_overlay(frame, theme, state.help_scroll);
    }
}
