//! Tool runs off the UI thread.
//!
//! Each run is one `spawn_blocking` unit that invokes phpcs or phpcbf,
//! interprets the output, and posts exactly one `AppEvent::RunFinished`.
pub mod types;
pub mod worker;
