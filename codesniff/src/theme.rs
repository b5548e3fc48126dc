//! Color theme system for codesniff.
//!
//! A `Theme` holds the colors of the editor chrome: borders, gutter, cursor
//! line, status bar, the two marker severities and the results panel rows. Two built-in themes are
//! provided:
//!
//! - `dark` uses ANSI 16 colors so it works on any terminal.
//! - `catppuccin_mocha` uses the Catppuccin Mocha palette in RGB and needs
//!   truecolor.
//!
//! Marker colors can be overridden per severity in the config file.

use std::str::FromStr;

use codesniff_core::config::MarkerStyles;
use codesniff_core::report::Severity;
use ratatui::style::Color;
use tracing::warn;

/// All chrome colors used across codesniff's UI surfaces.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Border color for the focused panel.
    pub border_active: Color,
    pub border_inactive: Color,

    /// Line numbers in the source gutter.
    pub gutter: Color,
    /// Background of the cursor line in the source view and of the selected
    /// row in the results panel.
    pub cursor_line: Color,

    pub marker_error: Color,
    pub marker_warning: Color,

    /// Buffer list entries with unsaved changes.
    pub buffer_modified: Color,
    /// Buffer list entries with a run in flight.
    pub buffer_running: Color,

    pub status_bar_bg: Color,
    pub status_bar_fg: Color,
    pub status_mode_normal: Color,
    pub status_info: Color,
    pub status_error: Color,

    /// Added and removed rows of a fix diff.
    pub diff_added: Color,
    pub diff_removed: Color,
    pub diff_hunk_header: Color,
    /// Context rows and report lines that are not findings.
    pub dimmed: Color,
    /// The "fix this file" row of a check report.
    pub fix_trigger: Color,
}

impl Theme {
    /// The built-in dark theme using ANSI 16 colors.
    pub fn dark() -> Self {
        Self {
            border_active: Color::Cyan,
            border_inactive: Color::DarkGray,

            gutter: Color::DarkGray,
            cursor_line: Color::Indexed(236),

            marker_error: Color::Red,
            marker_warning: Color::Yellow,

            buffer_modified: Color::Yellow,
            buffer_running: Color::Cyan,

            status_bar_bg: Color::DarkGray,
            status_bar_fg: Color::White,
            status_mode_normal: Color::Cyan,
            status_info: Color::Green,
            status_error: Color::LightRed,

            diff_added: Color::Green,
            diff_removed: Color::Red,
            diff_hunk_header: Color::Cyan,
            dimmed: Color::DarkGray,
            fix_trigger: Color::Green,
        }
    }

    /// The Catppuccin Mocha theme using RGB truecolor values.
    ///
    /// Palette source: <https://github.com/catppuccin/catppuccin> Mocha variant.
    pub fn catppuccin_mocha() -> Self {
        let green = Color::Rgb(166, 227, 161); // #a6e3a1
        let red = Color::Rgb(243, 139, 168); // #f38ba8
        let yellow = Color::Rgb(249, 226, 175); // #f9e2af
        let teal = Color::Rgb(148, 226, 213); // #94e2d5
        let lavender = Color::Rgb(180, 190, 254); // #b4befe
        let overlay1 = Color::Rgb(127, 132, 156); // #7f849c
        let surface0 = Color::Rgb(49, 50, 68); // #313244
        let surface1 = Color::Rgb(69, 71, 90); // #45475a
        let sapphire = Color::Rgb(116, 199, 236); // #74c7ec
        let text = Color::Rgb(205, 214, 244); // #cdd6f4
        let peach = Color::Rgb(250, 179, 135); // #fab387

        Self {
            border_active: lavender,
            border_inactive: overlay1,

            gutter: overlay1,
            cursor_line: surface0,

            marker_error: red,
            marker_warning: yellow,

            buffer_modified: peach,
            buffer_running: teal,

            status_bar_bg: surface1,
            status_bar_fg: text,
            status_mode_normal: lavender,
            status_info: green,
            status_error: red,

            diff_added: green,
            diff_removed: red,
            diff_hunk_header: sapphire,
            dimmed: overlay1,
            fix_trigger: green,
        }
    }

    /// Resolves a theme name to a built-in theme.
    ///
    /// Unknown names fall back to `dark()` with a logged warning.
    pub fn from_name(name: &str) -> Self {
        match name {
            "catppuccin-mocha" | "catppuccin_mocha" => Self::catppuccin_mocha(),
            "dark" => Self::dark(),
            other => {
                warn!(theme = other, "unknown theme, falling back to 'dark'");
                Self::dark()
            }
        }
    }

    /// Applies configured marker colors on top of the theme defaults.
    ///
    /// Only colors set explicitly in the config override the theme; names
    /// ratatui cannot parse are logged and ignored.
    pub fn with_markers(mut self, markers: &MarkerStyles) -> Self {
        if markers.error.color.is_some() {
            if let Some(color) = parse_color(markers.color(Severity::Error)) {
                self.marker_error = color;
            }
        }
        if markers.warning.color.is_some() {
            if let Some(color) = parse_color(markers.color(Severity::Warning)) {
                self.marker_warning = color;
            }
        }
        self
    }

    pub fn marker(&self, severity: Severity) -> Color {
        match severity {
            Severity::Error => self.marker_error,
            Severity::Warning => self.marker_warning,
        }
    }
}

fn parse_color(name: &str) -> Option<Color> {
    match Color::from_str(name) {
        Ok(color) => Some(color),
        Err(_) => {
            warn!(color = name, "unrecognised marker color");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codesniff_core::config::MarkerStyle;

    #[test]
    fn configured_marker_colors_override_theme() {
        let markers = MarkerStyles {
            error: MarkerStyle {
                color: Some("#ff8800".to_owned()),
                symbol: None,
            },
            warning: MarkerStyle::default(),
        };
        let theme = Theme::catppuccin_mocha().with_markers(&markers);
        assert_eq!(theme.marker(Severity::Error), Color::Rgb(0xff, 0x88, 0x00));
        assert_eq!(
            theme.marker(Severity::Warning),
            Theme::catppuccin_mocha().marker_warning
        );
    }

    #[test]
    fn bad_color_names_are_ignored() {
        let markers = MarkerStyles {
            error: MarkerStyle {
                color: Some("not-a-color".to_owned()),
                symbol: None,
            },
            warning: MarkerStyle::default(),
        };
        let theme = Theme::dark().with_markers(&markers);
        assert_eq!(theme.marker_error, Color::Red);
    }
}
