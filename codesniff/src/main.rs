//! codesniff: PHP_CodeSniffer in the terminal.
//!
//! Entry point for the `codesniff` binary. Wires together the terminal
//! lifecycle (`tui`), the unified event bus (`event`), the open buffers and
//! their run sessions (`app`), the background runner (`runner`), and the
//! panels (`ui`).
//!
//! # Startup sequence
//!
//! 1. Parse the command line and start file logging. The TUI owns the
//!    terminal, so log output never goes to stderr.
//! 2. Load settings and theme, open the files named on the command line.
//! 3. `install_panic_hook()`, then `register_sigterm()`, then `init_tui()`.
//! 4. Create the event channel and `spawn_event_task()`.
//!
//! `restore_tui()` is reached from the single exit point of the event loop.
//! Inside the loop `?` is only used on `terminal.draw()`.

mod app;
mod buffer;
mod event;
mod highlight;
mod runner;
mod theme;
mod tui;
mod ui;

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::Parser;
use codesniff_core::{config, RunMode, Settings};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::event::AppEvent;
use crate::ui::keybindings::{handle_key, handle_mouse, KeyAction};

/// Environment variable holding the log filter, e.g. `codesniff=debug`.
const LOG_ENV: &str = "CODESNIFF_LOG";

#[derive(Parser, Debug)]
#[command(name = "codesniff")]
#[command(author, version, about = "Check and fix PHP files with PHP_CodeSniffer")]
struct Cli {
    /// Files to open
    files: Vec<PathBuf>,

    /// Settings file (defaults to $XDG_CONFIG_HOME/codesniff/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Check the first file right after startup
    #[arg(long)]
    check: bool,

    /// Log file (defaults to $XDG_STATE_HOME/codesniff/codesniff.log)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

/// Sends tracing output to `path`, appending.
///
/// The filter comes from `CODESNIFF_LOG` and defaults to `info`.
fn init_logging(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn load_settings(explicit: Option<&Path>) -> std::io::Result<Settings> {
    match explicit {
        Some(path) => Settings::load(path).map_err(std::io::Error::other),
        None => Ok(Settings::load_or_default()),
    }
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let cli = Cli::parse();

    let log_path = cli.log_file.clone().unwrap_or_else(config::default_log_path);
    init_logging(&log_path)?;

    let settings = load_settings(cli.config.as_deref())?;
    info!(
        config = %cli.config.clone().unwrap_or_else(config::config_path).display(),
        files = cli.files.len(),
        "starting codesniff"
    );

    let mut state = app::AppState::new(settings);
    let theme = Arc::clone(&state.theme);
    for path in &cli.files {
        if let Err(e) = state.open_file(path) {
            warn!(path = %path.display(), error = %e, "cannot open file");
            state.set_error(format!("{}: {e}", path.display()));
        }
    }

    tui::install_panic_hook();
    let term_flag = tui::register_sigterm()?;
    let mut terminal = tui::init_tui()?;

    let (tx, mut rx) = event::channel();
    event::spawn_event_task(tx.clone());

    if cli.check && !state.buffers.is_empty() {
        state.select_buffer(0);
        if let Some(job) = state.request_run(RunMode::Check) {
            runner::worker::spawn_run(job, tx.clone());
        }
    }

    'event_loop: loop {
        tokio::select! {
            // Heartbeat so SIGTERM is noticed even when no events arrive.
            _ = tokio::time::sleep(Duration::from_millis(50)) => {
                if term_flag.load(Ordering::Relaxed) {
                    info!("SIGTERM received");
                    break 'event_loop;
                }
            }
            maybe_event = rx.recv() => {
                let action = match maybe_event {
                    Some(AppEvent::Render) => {
                        terminal.draw(|frame| ui::render(frame, &mut state, &theme))?;
                        KeyAction::Continue
                    }
                    Some(AppEvent::Key(key)) => handle_key(key, &mut state),
                    Some(AppEvent::Mouse(mouse)) => handle_mouse(mouse, &mut state),
                    // ratatui picks up the new size on the next Render.
                    Some(AppEvent::Resize(_, _)) => KeyAction::Continue,
                    Some(AppEvent::Tick) => {
                        state.tick();
                        KeyAction::Continue
                    }
                    Some(AppEvent::RunFinished(completion)) => {
                        state.apply_completion(*completion);
                        KeyAction::Continue
                    }
                    Some(AppEvent::Quit) | None => KeyAction::Quit,
                };

                match action {
                    KeyAction::Continue => {}
                    KeyAction::Run(job) => runner::worker::spawn_run(job, tx.clone()),
                    KeyAction::Quit => break 'event_loop,
                }

                if term_flag.load(Ordering::Relaxed) {
                    break 'event_loop;
                }
            }
        }
    }

    tui::restore_tui()?;
    info!("codesniff exited");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_files_and_flags() {
        let cli = Cli::parse_from(["codesniff", "--check", "-c", "cfg.toml", "a.php", "b.php"]);
        assert!(cli.check);
        assert_eq!(cli.config, Some(PathBuf::from("cfg.toml")));
        assert_eq!(cli.files, vec![PathBuf::from("a.php"), PathBuf::from("b.php")]);
        assert_eq!(cli.log_file, None);
    }

    #[test]
    fn explicit_missing_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_settings(Some(&dir.path().join("absent.toml"))).is_err());
    }

    #[test]
    fn explicit_config_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "phpcs_path = \"/opt/phpcs\"\n").unwrap();
        let settings = load_settings(Some(&path)).unwrap();
        assert_eq!(settings.phpcs_path, "/opt/phpcs");
    }
}
