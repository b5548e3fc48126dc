//! Keybinding dispatcher for codesniff.
//!
//! Translates raw crossterm `KeyEvent`s and `MouseEvent`s into `AppState`
//! mutations and returns a `KeyAction` telling the event loop whether to
//! continue, quit, or start a tool run. The dispatcher branches first on
//! `state.mode` so each mode has an isolated handler.

use codesniff_core::RunMode;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::{Position, Rect};

use crate::app::{AppState, Mode, PanelFocus};
use crate::runner::types::RunJob;

/// Control-flow signal returned from the dispatcher.
#[derive(Debug)]
pub enum KeyAction {
    Continue,
    Quit,
    /// Hand this job to the runner.
    Run(RunJob),
}

impl From<Option<RunJob>> for KeyAction {
    fn from(job: Option<RunJob>) -> Self {
        job.map_or(KeyAction::Continue, KeyAction::Run)
    }
}

/// Dispatches a key event to the handler matching the current mode.
pub fn handle_key(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match state.mode {
        Mode::HelpOverlay => handle_help(key, state),
        Mode::ConfirmQuit => handle_confirm_quit(key, state),
        Mode::ConfirmClose => handle_confirm_close(key, state),
        Mode::Normal => handle_normal(key, state),
    }
}

// ---------------------------------------------------------------------------
// Normal mode
// ---------------------------------------------------------------------------

fn handle_normal(key: KeyEvent, state: &mut AppState) -> KeyAction {
    if let Some(action) = handle_scroll_key(key, state) {
        return action;
    }

    match key.code {
        KeyCode::Char('H') => {
            state.focus_prev();
            KeyAction::Continue
        }
        KeyCode::Char('L') => {
            state.focus_next();
            KeyAction::Continue
        }

        KeyCode::Char('{') => {
            state.prev_buffer();
            KeyAction::Continue
        }
        KeyCode::Char('}') => {
            state.next_buffer();
            KeyAction::Continue
        }

        KeyCode::Char('[') => {
            state.prev_anchor();
            KeyAction::Continue
        }
        KeyCode::Char(']') => {
            state.next_anchor();
            KeyAction::Continue
        }

        KeyCode::Char('c') => state.request_run(RunMode::Check).into(),
        KeyCode::Char('f') => state.request_run(RunMode::Fix).into(),

        KeyCode::Enter => match state.focus {
            PanelFocus::Buffers => {
                state.open_selected_buffer();
                KeyAction::Continue
            }
            PanelFocus::Results => state.activate_result_row().into(),
            PanelFocus::Source => KeyAction::Continue,
        },

        KeyCode::Char('w') => state.save_active().into(),
        KeyCode::Char('x') => {
            state.request_close();
            KeyAction::Continue
        }
        KeyCode::Char('p') => {
            state.toggle_results();
            KeyAction::Continue
        }

        KeyCode::Char('?') => {
            state.help_scroll = 0;
            state.mode = Mode::HelpOverlay;
            KeyAction::Continue
        }

        KeyCode::Char('q') | KeyCode::Esc => {
            if state.request_quit() {
                KeyAction::Quit
            } else {
                KeyAction::Continue
            }
        }

        _ => KeyAction::Continue,
    }
}

/// j / k / g / G and Ctrl-d / Ctrl-u. Returns `None` when the key is not a
/// scroll key.
fn handle_scroll_key(key: KeyEvent, state: &mut AppState) -> Option<KeyAction> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Char('j') | KeyCode::Down => state.scroll_down(1),
        KeyCode::Char('k') | KeyCode::Up => state.scroll_up(1),
        KeyCode::Char('g') | KeyCode::Home => state.scroll_top(),
        KeyCode::Char('G') | KeyCode::End => state.scroll_bottom(),
        KeyCode::Char('d') if ctrl => state.half_page_down(),
        KeyCode::Char('u') if ctrl => state.half_page_up(),
        KeyCode::PageDown => state.half_page_down(),
        KeyCode::PageUp => state.half_page_up(),
        _ => return None,
    }
    Some(KeyAction::Continue)
}

// ---------------------------------------------------------------------------
// Overlays and dialogs
// ---------------------------------------------------------------------------

fn handle_help(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match key.code {
        KeyCode::Char('j') => state.help_scroll = state.help_scroll.saturating_add(1),
        KeyCode::Char('k') => state.help_scroll = state.help_scroll.saturating_sub(1),
        KeyCode::Char('g') => state.help_scroll = 0,
        KeyCode::Char('?') | KeyCode::Esc | KeyCode::Char('q') => state.mode = Mode::Normal,
        _ => {}
    }
    KeyAction::Continue
}

/// `y` quits, `n` / `Esc` cancels.
fn handle_confirm_quit(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => KeyAction::Quit,
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            state.mode = Mode::Normal;
            KeyAction::Continue
        }
        _ => KeyAction::Continue,
    }
}

/// `y` drops the unsaved buffer, `n` / `Esc` keeps it.
fn handle_confirm_close(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            state.mode = Mode::Normal;
            state.close_active();
            KeyAction::Continue
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            state.mode = Mode::Normal;
            KeyAction::Continue
        }
        _ => KeyAction::Continue,
    }
}

// ---------------------------------------------------------------------------
// Mouse events
// ---------------------------------------------------------------------------

/// Left click focuses a panel; on the results panel it also selects and
/// activates the clicked row, and on the buffer list it opens the buffer.
/// The wheel scrolls the focused panel by 3 rows.
pub fn handle_mouse(mouse: MouseEvent, state: &mut AppState) -> KeyAction {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) if state.mode == Mode::Normal => {
            handle_mouse_click(mouse.column, mouse.row, state)
        }
        MouseEventKind::ScrollUp => {
            if state.mode == Mode::HelpOverlay {
                state.help_scroll = state.help_scroll.saturating_sub(3);
            } else {
                state.scroll_up(3);
            }
            KeyAction::Continue
        }
        MouseEventKind::ScrollDown => {
            if state.mode == Mode::HelpOverlay {
                state.help_scroll = state.help_scroll.saturating_add(3);
            } else {
                state.scroll_down(3);
            }
            KeyAction::Continue
        }
        _ => KeyAction::Continue,
    }
}

fn handle_mouse_click(col: u16, row: u16, state: &mut AppState) -> KeyAction {
    let pos = Position { x: col, y: row };
    let [buffers, source, results] = state.panel_rects;

    if buffers.width > 0 && buffers.contains(pos) {
        state.focus = PanelFocus::Buffers;
        if let Some(offset) = inner_row(buffers, pos) {
            let idx = state.buffer_list_state.offset() + offset;
            if idx < state.buffers.len() {
                state.buffer_list_state.select(Some(idx));
                state.open_selected_buffer();
            }
        }
        KeyAction::Continue
    } else if source.width > 0 && source.contains(pos) {
        state.focus = PanelFocus::Source;
        if let (Some(offset), Some(buffer)) = (inner_row(source, pos), state.active_buffer()) {
            let line = buffer.source_scroll + offset + 1;
            if line <= buffer.line_count() {
                state.jump_to(line);
            }
        }
        KeyAction::Continue
    } else if results.width > 0 && results.contains(pos) {
        state.focus = PanelFocus::Results;
        let clicked = inner_row(results, pos)
            .zip(state.active_buffer())
            .map(|(offset, buffer)| buffer.results_scroll + offset);
        match clicked {
            Some(row) => state.click_result_row(row).into(),
            None => KeyAction::Continue,
        }
    } else {
        KeyAction::Continue
    }
}

/// Row inside the panel's border, or `None` on the border itself.
fn inner_row(panel: Rect, pos: Position) -> Option<usize> {
    let top = panel.y + 1;
    let bottom = panel.y + panel.height.saturating_sub(1);
    (pos.y >= top && pos.y < bottom).then(|| usize::from(pos.y - top))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: crossterm::event::KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn check_without_buffer_does_nothing() {
        let mut state = AppState::new(codesniff_core::Settings::default());
        assert!(matches!(handle_key(key(KeyCode::Char('c')), &mut state), KeyAction::Continue));
    }

    #[test]
    fn help_opens_and_closes() {
        let mut state = AppState::new(codesniff_core::Settings::default());
        handle_key(key(KeyCode::Char('?')), &mut state);
        assert_eq!(state.mode, Mode::HelpOverlay);
        handle_key(key(KeyCode::Esc), &mut state);
        assert_eq!(state.mode, Mode::Normal);
    }

    #[test]
    fn quit_without_unsaved_buffers() {
        let mut state = AppState::new(codesniff_core::Settings::default());
        assert!(matches!(handle_key(key(KeyCode::Char('q')), &mut state), KeyAction::Quit));
    }

    #[test]
    fn clicks_on_borders_hit_no_row() {
        let panel = Rect::new(0, 0, 20, 10);
        assert_eq!(inner_row(panel, Position { x: 3, y: 0 }), None);
        assert_eq!(inner_row(panel, Position { x: 3, y: 1 }), Some(0));
        assert_eq!(inner_row(panel, Position { x: 3, y: 8 }), Some(7));
        assert_eq!(inner_row(panel, Position { x: 3, y: 9 }), None);
    }
}
