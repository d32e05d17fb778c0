//! Control and status plane for a background file-watching test runner.
//!
//! Operators steer the watcher (root, ignored paths, pause, manual runs)
//! over HTTP, poll or long-poll the runner's status, fetch the latest
//! result, and fire sound or push notifications when a run completes. The
//! watcher consumes commands from a [`watch_bus`] channel; the runner is
//! reached through the [`executor::Executor`] trait.

pub mod cli;
pub mod config;
pub mod executor;
pub mod longpoll;
pub mod notify;
pub mod routes;
pub mod state;
pub mod telemetry;
pub mod validate;

pub use routes::build_router;
pub use state::{AppState, RunResult};
