//! The single channel every part of codesniff talks to the UI through.
//!
//! Terminal input, the two timers and finished tool runs all arrive as
//! [`AppEvent`]s on one unbounded tokio channel. Only the main loop
//! receives.

use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyEvent, KeyEventKind, MouseEvent};
use futures::{FutureExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::interval;

use crate::runner::types::RunCompletion;

/// How often status messages age.
pub const TICK_EVERY: Duration = Duration::from_millis(250);
/// How often a frame is drawn (about 30 FPS).
pub const RENDER_EVERY: Duration = Duration::from_millis(33);

pub type EventSender = mpsc::UnboundedSender<AppEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<AppEvent>;

#[derive(Debug)]
pub enum AppEvent {
    /// Key press. Release and repeat events never get here.
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize(u16, u16),
    Tick,
    Render,
    /// A phpcs / phpcbf run finished on a blocking worker.
    RunFinished(Box<RunCompletion>),
    /// The terminal input stream ended.
    Quit,
}

pub fn channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

/// Maps a crossterm event onto the bus, dropping the ones codesniff ignores.
fn translate(event: Event) -> Option<AppEvent> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => Some(AppEvent::Key(key)),
        Event::Mouse(mouse) => Some(AppEvent::Mouse(mouse)),
        Event::Resize(cols, rows) => Some(AppEvent::Resize(cols, rows)),
        _ => None,
    }
}

/// Starts the task that forwards terminal input and timer ticks to `tx`.
///
/// The task stops after sending [`AppEvent::Quit`] when the input stream
/// ends, or as soon as the receiver is gone.
pub fn spawn_event_task(tx: EventSender) {
    tokio::spawn(async move {
        let mut ticks = interval(TICK_EVERY);
        let mut frames = interval(RENDER_EVERY);
        let mut input = EventStream::new();

        loop {
            let next = tokio::select! {
                _ = ticks.tick() => Some(AppEvent::Tick),
                _ = frames.tick() => Some(AppEvent::Render),
                read = input.next().fuse() => match read {
                    Some(Ok(event)) => translate(event),
                    Some(Err(e)) => {
                        tracing::warn!(error = %e, "terminal input error");
                        None
                    }
                    None => {
                        let _ = tx.send(AppEvent::Quit);
                        break;
                    }
                },
            };
            if let Some(event) = next {
                if tx.send(event).is_err() {
                    break;
                }
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEventState, KeyModifiers};

    fn key(kind: KeyEventKind) -> Event {
        Event::Key(KeyEvent {
            code: KeyCode::Char('c'),
            modifiers: KeyModifiers::NONE,
            kind,
            state: KeyEventState::NONE,
        })
    }

    #[test]
    fn only_key_presses_are_forwarded() {
        assert!(matches!(translate(key(KeyEventKind::Press)), Some(AppEvent::Key(_))));
        assert!(translate(key(KeyEventKind::Release)).is_none());
        assert!(translate(key(KeyEventKind::Repeat)).is_none());
    }

    #[test]
    fn resize_and_focus_events() {
        assert!(matches!(translate(Event::Resize(80, 24)), Some(AppEvent::Resize(80, 24))));
        assert!(translate(Event::FocusGained).is_none());
    }
}
