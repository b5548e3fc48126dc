//! User settings for codesniff.
//!
//! Settings are read from a TOML file. Every key is optional; a missing file
//! or an empty table yields [`Settings::default`]. The lookup order for the
//! file itself lives in [`config_path`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{Result, SnifferError};
use crate::report::Severity;

/// Key of the per-folder ruleset table used when no folder matches.
pub const DEFAULT_STANDARD_KEY: &str = "_default";

/// Which report layout phpcs is asked to print in check mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// phpcs's built-in `full` report (`LINE | TYPE | MESSAGE` rows).
    #[default]
    Full,
    /// A custom report definition passed via `report_path`, printing
    /// `Errors:` / `Warnings:` sections.
    Plugin,
}

/// What happens when a run is requested while another is still outstanding
/// for the same buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlapPolicy {
    /// Start the new run; the older run's result is dropped on arrival.
    #[default]
    Supersede,
    /// Refuse the new run until the outstanding one completes.
    Reject,
}

/// `phpcs_standard` is either one ruleset for everything or a table mapping
/// folders to rulesets.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum StandardSetting {
    Global(String),
    PerFolder(BTreeMap<String, String>),
}

/// Gutter marker appearance for one severity. Unset fields fall back to
/// the per-severity defaults in [`MarkerStyles::color`] and
/// [`MarkerStyles::symbol`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MarkerStyle {
    /// Color name understood by ratatui (`"red"`, `"#ff8800"`, ...).
    pub color: Option<String>,
    /// Single glyph drawn in the gutter.
    pub symbol: Option<String>,
}

/// Marker styles for both severities.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MarkerStyles {
    pub error: MarkerStyle,
    pub warning: MarkerStyle,
}

impl MarkerStyles {
    fn style(&self, severity: Severity) -> &MarkerStyle {
        match severity {
            Severity::Error => &self.error,
            Severity::Warning => &self.warning,
        }
    }

    pub fn color(&self, severity: Severity) -> &str {
        let fallback = match severity {
            Severity::Error => "red",
            Severity::Warning => "yellow",
        };
        self.style(severity).color.as_deref().unwrap_or(fallback)
    }

    pub fn symbol(&self, severity: Severity) -> &str {
        let fallback = match severity {
            Severity::Error => "●",
            Severity::Warning => "▲",
        };
        self.style(severity).symbol.as_deref().unwrap_or(fallback)
    }
}

/// All recognised configuration keys.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Path to the `phpcs` binary (check mode).
    pub phpcs_path: String,
    /// Path to the `phpcbf` binary (fix mode).
    pub phpcbf_path: String,
    /// Optional interpreter that runs the tool, e.g. `/usr/bin/php`.
    pub php_path: Option<String>,
    pub phpcs_standard: Option<StandardSetting>,
    /// Extra flags passed through to both tools untouched.
    pub additional_args: Vec<String>,
    pub report_format: ReportFormat,
    /// Report definition file, required by [`ReportFormat::Plugin`].
    pub report_path: Option<PathBuf>,
    /// `--report-width` used with the full report so rows never wrap.
    pub report_width: u32,
    /// Prefix stdin with `phpcs_input_file: <path>` so path-sensitive
    /// sniffs still apply to piped content.
    pub send_input_path: bool,
    pub run_on_save: bool,
    /// Extensions (without the dot) that trigger a check on save.
    pub run_on_save_extensions: Vec<String>,
    pub overlap_policy: OverlapPolicy,
    pub theme: String,
    pub markers: MarkerStyles,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            phpcs_path: "phpcs".to_owned(),
            phpcbf_path: "phpcbf".to_owned(),
            php_path: None,
            phpcs_standard: None,
            additional_args: Vec::new(),
            report_format: ReportFormat::default(),
            report_path: None,
            report_width: 300,
            send_input_path: true,
            run_on_save: false,
            run_on_save_extensions: vec!["php".to_owned(), "inc".to_owned()],
            overlap_policy: OverlapPolicy::default(),
            theme: "dark".to_owned(),
            markers: MarkerStyles::default(),
        }
    }
}

impl Settings {
    /// Parses settings from TOML text. `origin` is only used in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`SnifferError::Config`] on malformed TOML, unknown enum values,
    /// or a `plugin` report format without a `report_path`.
    pub fn from_toml(raw: &str, origin: &Path) -> Result<Self> {
        let settings: Settings =
            toml::from_str(raw).map_err(|e| SnifferError::config(origin, e.to_string()))?;
        settings.validate(origin)?;
        Ok(settings)
    }

    /// Reads and parses the settings file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`SnifferError::Config`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| SnifferError::config(path, e.to_string()))?;
        let settings = Self::from_toml(&raw, path)?;
        debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    /// Loads settings from the default location, falling back to defaults.
    ///
    /// A missing file is normal. A broken file is logged and ignored so a typo
    /// never prevents startup.
    pub fn load_or_default() -> Self {
        let path = config_path();
        if !path.exists() {
            return Self::default();
        }
        match Self::load(&path) {
            Ok(settings) => settings,
            Err(e) => {
                warn!("{e}; using default settings");
                Self::default()
            }
        }
    }

    fn validate(&self, origin: &Path) -> Result<()> {
        if self.report_format == ReportFormat::Plugin && self.report_path.is_none() {
            return Err(SnifferError::config(
                origin,
                "report_format = \"plugin\" requires report_path",
            ));
        }
        Ok(())
    }

    /// Resolves the ruleset for `file_path`.
    ///
    /// With a per-folder table the longest folder key containing the file
    /// wins; [`DEFAULT_STANDARD_KEY`] is the fallback. Empty values mean
    /// "let phpcs decide" and resolve to `None`.
    pub fn standard_for(&self, file_path: &Path) -> Option<&str> {
        let standard = match self.phpcs_standard.as_ref()? {
            StandardSetting::Global(name) => name.as_str(),
            StandardSetting::PerFolder(map) => map
                .iter()
                .filter(|(folder, _)| folder.as_str() != DEFAULT_STANDARD_KEY)
                .filter(|(folder, _)| file_path.starts_with(Path::new(folder.as_str())))
                .max_by_key(|(folder, _)| Path::new(folder.as_str()).components().count())
                .map(|(_, name)| name.as_str())
                .or_else(|| map.get(DEFAULT_STANDARD_KEY).map(String::as_str))?,
        };
        if standard.trim().is_empty() {
            None
        } else {
            Some(standard)
        }
    }

    /// Whether saving `path` should trigger a check.
    pub fn runs_on_save(&self, path: &Path) -> bool {
        if !self.run_on_save {
            return false;
        }
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                self.run_on_save_extensions
                    .iter()
                    .any(|wanted| wanted.trim_start_matches('.').eq_ignore_ascii_case(ext))
            })
    }
}

/// Returns the path to the codesniff config file.
///
/// Prefers `$XDG_CONFIG_HOME/codesniff/config.toml`; falls back to
/// `~/.config/codesniff/config.toml` when the env var is absent.
pub fn config_path() -> PathBuf {
    xdg_dir("XDG_CONFIG_HOME", ".config").join("config.toml")
}

/// Returns the default log file path under the XDG state directory.
pub fn default_log_path() -> PathBuf {
    xdg_dir("XDG_STATE_HOME", ".local/state").join("codesniff.log")
}

fn xdg_dir(var: &str, home_fallback: &str) -> PathBuf {
    let base = std::env::var(var)
        .ok()
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join(home_fallback))
        })
        .unwrap_or_else(|| PathBuf::from(home_fallback));
    base.join("codesniff")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> Settings {
        Settings::from_toml(raw, Path::new("test.toml")).unwrap()
    }

    #[test]
    fn empty_file_gives_defaults() {
        assert_eq!(parse(""), Settings::default());
    }

    #[test]
    fn global_standard_applies_everywhere() {
        let s = parse(r#"phpcs_standard = "PSR12""#);
        assert_eq!(s.standard_for(Path::new("/any/file.php")), Some("PSR12"));
    }

    #[test]
    fn per_folder_standard_prefers_deepest_match() {
        let s = parse(
            r#"
            [phpcs_standard]
            "/srv/app" = "PSR12"
            "/srv/app/legacy" = "PEAR"
            _default = "Squiz"
            "#,
        );
        assert_eq!(s.standard_for(Path::new("/srv/app/src/a.php")), Some("PSR12"));
        assert_eq!(s.standard_for(Path::new("/srv/app/legacy/b.php")), Some("PEAR"));
        assert_eq!(s.standard_for(Path::new("/home/me/c.php")), Some("Squiz"));
    }

    #[test]
    fn per_folder_without_default_resolves_to_none() {
        let s = parse(
            r#"
            [phpcs_standard]
            "/srv/app" = "PSR12"
            "#,
        );
        assert_eq!(s.standard_for(Path::new("/elsewhere/a.php")), None);
    }

    #[test]
    fn folder_match_is_component_wise() {
        let s = parse(
            r#"
            [phpcs_standard]
            "/srv/app" = "PSR12"
            _default = "Squiz"
            "#,
        );
        assert_eq!(s.standard_for(Path::new("/srv/application/a.php")), Some("Squiz"));
    }

    #[test]
    fn blank_standard_is_ignored() {
        let s = parse(r#"phpcs_standard = "  ""#);
        assert_eq!(s.standard_for(Path::new("a.php")), None);
    }

    #[test]
    fn plugin_format_requires_report_path() {
        let err = Settings::from_toml(r#"report_format = "plugin""#, Path::new("c.toml"))
            .unwrap_err();
        assert!(matches!(err, SnifferError::Config { .. }));
        assert!(err.to_string().contains("report_path"));
    }

    #[test]
    fn unknown_overlap_policy_is_rejected() {
        let err = Settings::from_toml(r#"overlap_policy = "queue""#, Path::new("c.toml"))
            .unwrap_err();
        assert!(matches!(err, SnifferError::Config { .. }));
    }

    #[test]
    fn run_on_save_checks_extension() {
        let s = parse(
            r#"
            run_on_save = true
            run_on_save_extensions = [".inc"]
            "#,
        );
        assert!(s.runs_on_save(Path::new("lib/a.INC")));
        assert!(!s.runs_on_save(Path::new("lib/a.php")));
        assert!(!Settings::default().runs_on_save(Path::new("a.php")));
    }

    #[test]
    fn marker_styles_merge_with_defaults() {
        let s = parse(
            r#"
            [markers.warning]
            color = "magenta"
            "#,
        );
        assert_eq!(s.markers.color(Severity::Warning), "magenta");
        assert_eq!(s.markers.symbol(Severity::Warning), "▲");
        assert_eq!(s.markers.color(Severity::Error), "red");
    }
}
