//! Shared state behind every control-plane request.
//!
//! The watch root, the latest run result and the pause flag live together
//! under one lock so a results snapshot always carries the pause flag that
//! was current when it was taken. Notification settings are read-only after
//! start-up.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use metrics::counter;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};
use watch_bus::{BusError, CommandBridge, WatchCommand};

use crate::{
    config::NotificationConfig,
    executor::Executor,
    longpoll::{LongPoll, StatusSignal},
    notify::Notifier,
};

/// Outcome of a test run as reported by the watcher.
///
/// The control plane does not interpret the contents; it only stamps the
/// current pause flag onto it before handing it out.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    #[serde(rename = "Paused", default)]
    pub paused: bool,
    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Error)]
pub enum ControlError {
    #[error("{root} is not a directory")]
    RootNotFound { root: String },
    #[error(transparent)]
    Bus(#[from] BusError),
    #[error("pause toggle did not complete")]
    Interrupted,
}

#[derive(Debug)]
struct Snapshot {
    root: PathBuf,
    latest: Option<RunResult>,
    paused: bool,
}

struct Inner {
    commands: CommandBridge,
    executor: Arc<dyn Executor>,
    longpoll: LongPoll,
    config: NotificationConfig,
    notifier: Notifier,
    snapshot: Mutex<Snapshot>,
    pause_gate: tokio::sync::Mutex<()>,
}

#[derive(Clone)]
pub struct AppState {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("snapshot", &*self.inner.snapshot.lock())
            .field("longpoll", &self.inner.longpoll)
            .finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(
        root: impl Into<PathBuf>,
        commands: CommandBridge,
        executor: Arc<dyn Executor>,
        signal: StatusSignal,
        config: NotificationConfig,
    ) -> Self {
        let longpoll = LongPoll::new(executor.clone(), signal);
        Self {
            inner: Arc::new(Inner {
                commands,
                executor,
                longpoll,
                config,
                notifier: Notifier::default(),
                snapshot: Mutex::new(Snapshot {
                    root: root.into(),
                    latest: None,
                    paused: false,
                }),
                pause_gate: tokio::sync::Mutex::new(()),
            }),
        }
    }

    /// Watcher callback: records the root it ran in and what it produced.
    pub fn receive_update(&self, root: impl Into<PathBuf>, result: RunResult) {
        let mut snapshot = self.inner.snapshot.lock();
        snapshot.root = root.into();
        snapshot.latest = Some(result);
    }

    pub fn current_root(&self) -> PathBuf {
        self.inner.snapshot.lock().root.clone()
    }

    pub fn paused(&self) -> bool {
        self.inner.snapshot.lock().paused
    }

    /// Latest result with the current pause flag applied, if any run finished yet.
    pub fn results(&self) -> Option<RunResult> {
        let snapshot = self.inner.snapshot.lock();
        snapshot.latest.clone().map(|mut result| {
            result.paused = snapshot.paused;
            result
        })
    }

    pub fn config(&self) -> &NotificationConfig {
        &self.inner.config
    }

    pub fn status(&self) -> String {
        self.inner.executor.status()
    }

    pub async fn wait_for_status(&self, timeout: Duration) -> String {
        self.inner.longpoll.wait(timeout).await
    }

    pub async fn adjust_root(&self, root: &str) -> Result<(), ControlError> {
        let is_dir = tokio::fs::metadata(Path::new(root))
            .await
            .map(|meta| meta.is_dir())
            .unwrap_or(false);
        if !is_dir {
            return Err(ControlError::RootNotFound {
                root: root.to_string(),
            });
        }
        self.dispatch(WatchCommand::AdjustRoot(PathBuf::from(root)))
            .await
    }

    /// Blank path lists are ignored without error.
    pub async fn ignore(&self, paths: &str) -> Result<(), ControlError> {
        if paths.is_empty() {
            return Ok(());
        }
        self.dispatch(WatchCommand::Ignore(paths.to_string())).await
    }

    /// Blank path lists are ignored without error.
    pub async fn reinstate(&self, paths: &str) -> Result<(), ControlError> {
        if paths.is_empty() {
            return Ok(());
        }
        self.dispatch(WatchCommand::Reinstate(paths.to_string()))
            .await
    }

    /// Queues a run and returns straight away.
    ///
    /// The dispatch runs on a detached task; its outcome is only logged.
    pub fn execute(&self) {
        let state = self.clone();
        tokio::spawn(async move {
            if let Err(err) = state.dispatch(WatchCommand::Execute).await {
                warn!(error = %err, "execute request dropped");
            }
        });
    }

    /// Flips the pause flag, telling the watcher first, and returns the new value.
    ///
    /// The dispatch and the flip run on their own task, so a caller that
    /// goes away mid-toggle cannot leave the watcher paused while the flag
    /// still says otherwise.
    pub async fn toggle_pause(&self) -> Result<bool, ControlError> {
        let state = self.clone();
        tokio::spawn(async move { state.toggle_pause_detached().await })
            .await
            .map_err(|err| {
                warn!(error = %err, "pause toggle task failed");
                ControlError::Interrupted
            })?
    }

    async fn toggle_pause_detached(&self) -> Result<bool, ControlError> {
        let _gate = self.inner.pause_gate.lock().await;
        let command = if self.paused() {
            WatchCommand::Resume
        } else {
            WatchCommand::Pause
        };
        self.dispatch(command).await?;

        let mut snapshot = self.inner.snapshot.lock();
        snapshot.paused = !snapshot.paused;
        Ok(snapshot.paused)
    }

    pub async fn send_push(&self, title: &str, body: &str) {
        // Outcome is already logged and counted by the notifier.
        let _ = self
            .inner
            .notifier
            .send(&self.inner.config, title, body)
            .await;
    }

    async fn dispatch(&self, command: WatchCommand) -> Result<(), ControlError> {
        let instruction = command.instruction();
        let details = command.details();
        self.inner.commands.dispatch(command).await?;
        counter!("watch_commands_total", 1, "instruction" => instruction.as_str());
        info!(instruction = instruction.as_str(), %details, "watch command delivered");
        Ok(())
    }
}
