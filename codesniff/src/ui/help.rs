//! Help overlay renderer for codesniff.
//!
//! Draws a centred modal over the panels, erasing the background with `Clear`
//! inside the same `terminal.draw()` closure as everything else.

use ratatui::{
    Frame,
    layout::Constraint,
    text::{Line, Text},
    widgets::{Block, Clear, Paragraph, Wrap},
};

use crate::theme::Theme;

/// Renders the help overlay, scrolled by `help_scroll` rows.
///
/// Skipped on terminals narrower than 60 columns.
pub fn render_help_overlay(frame: &mut Frame, theme: &Theme, help_scroll: u16) {
    if frame.area().width < 60 {
        return;
    }

    let overlay_area = frame
        .area()
        .centered(Constraint::Percentage(80), Constraint::Percentage(80));

    frame.render_widget(Clear, overlay_area);

    let block = Block::bordered()
        .title(" Help: j/k scroll, ? or Esc to dismiss ")
        .border_style(ratatui::style::Style::default().fg(theme.border_active));

    frame.render_widget(
        Paragraph::new(build_help_text())
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((help_scroll, 0)),
        overlay_area,
    );
}

fn build_help_text() -> Text<'static> {
    Text::from(vec![
        Line::from("Navigation"),
        Line::from("  j / k         Move down / up one line"),
        Line::from("  g / G         Jump to top / bottom"),
        Line::from("  Ctrl-d / u    Move half a page down / up"),
        Line::from("  H / L         Move panel focus left / right"),
        Line::from("  { / }         Previous / next buffer"),
        Line::from(""),
        Line::from("PHP_CodeSniffer"),
        Line::from("  c             Check the buffer with phpcs"),
        Line::from("  f             Fix the buffer with phpcbf"),
        Line::from("  Enter         Jump to the selected report or diff line,"),
        Line::from("                or run the fixer on the fix button"),
        Line::from("  [ / ]         Previous / next finding or hunk (results),"),
        Line::from("                previous / next marked line (source)"),
        Line::from("  Click         Select and activate a results row"),
        Line::from(""),
        Line::from("Buffers"),
        Line::from("  Enter         Open the buffer selected in the list"),
        Line::from("  w             Write the buffer to disk"),
        Line::from("  x             Close the buffer"),
        Line::from("  p             Show / hide the results panel"),
        Line::from(""),
        Line::from("General"),
        Line::from("  ?             Open / close this help overlay"),
        Line::from("  q / Esc       Quit (confirms if buffers are unsaved)"),
    ])
}
