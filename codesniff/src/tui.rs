//! Entering and leaving the full-screen terminal.
//!
//! codesniff draws on stderr so stdout stays free for redirection. Mouse
//! capture is on while the TUI runs, since clicking a results row is how
//! a finding is followed.

use std::io::{stderr, BufWriter, Stderr};
use std::panic;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use signal_hook::consts::SIGTERM;

pub type Tui = Terminal<CrosstermBackend<BufWriter<Stderr>>>;

/// Switches to raw mode and the alternate screen.
///
/// Every exit path must call [`restore_tui`]; ratatui does not undo this on
/// drop.
pub fn init_tui() -> std::io::Result<Tui> {
    enable_raw_mode()?;
    let mut screen = BufWriter::new(stderr());
    execute!(screen, EnterAlternateScreen, EnableMouseCapture)?;
    Terminal::new(CrosstermBackend::new(screen))
}

/// Leaves the alternate screen and raw mode. Safe to call twice.
pub fn restore_tui() -> std::io::Result<()> {
    disable_raw_mode()?;
    execute!(stderr(), DisableMouseCapture, LeaveAlternateScreen)
}

/// Chains a hook in front of the current panic hook so the panic message is
/// printed on a usable terminal. Install before [`init_tui`].
pub fn install_panic_hook() {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let _ = restore_tui();
        previous(info);
    }));
}

/// Returns a flag that flips to `true` once SIGTERM arrives.
pub fn register_sigterm() -> std::io::Result<Arc<AtomicBool>> {
    let received = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(SIGTERM, Arc::clone(&received))?;
    Ok(received)
}
