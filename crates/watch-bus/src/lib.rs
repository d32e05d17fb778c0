//! Typed command channel between the control plane and the file watcher.
//!
//! The channel behaves as a rendezvous: [`CommandBridge::dispatch`] resolves
//! only after the watcher has pulled the command off the bus, so a request
//! handler that awaits it knows the watcher has seen the command.

use std::path::PathBuf;

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

/// Kind of a [`WatchCommand`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Instruction {
    AdjustRoot,
    Ignore,
    Reinstate,
    Execute,
    Pause,
    Resume,
}

impl Instruction {
    pub fn as_str(self) -> &'static str {
        match self {
            Instruction::AdjustRoot => "adjust_root",
            Instruction::Ignore => "ignore",
            Instruction::Reinstate => "reinstate",
            Instruction::Execute => "execute",
            Instruction::Pause => "pause",
            Instruction::Resume => "resume",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchCommand {
    /// Move the watch root to a directory.
    AdjustRoot(PathBuf),
    /// Stop watching the encoded path list (forwarded verbatim).
    Ignore(String),
    /// Resume watching the encoded path list (forwarded verbatim).
    Reinstate(String),
    Execute,
    Pause,
    Resume,
}

impl WatchCommand {
    pub fn instruction(&self) -> Instruction {
        match self {
            WatchCommand::AdjustRoot(_) => Instruction::AdjustRoot,
            WatchCommand::Ignore(_) => Instruction::Ignore,
            WatchCommand::Reinstate(_) => Instruction::Reinstate,
            WatchCommand::Execute => Instruction::Execute,
            WatchCommand::Pause => Instruction::Pause,
            WatchCommand::Resume => Instruction::Resume,
        }
    }

    /// Payload as the watcher sees it; empty for commands without one.
    pub fn details(&self) -> String {
        match self {
            WatchCommand::AdjustRoot(root) => root.to_string_lossy().into_owned(),
            WatchCommand::Ignore(paths) | WatchCommand::Reinstate(paths) => paths.clone(),
            WatchCommand::Execute | WatchCommand::Pause | WatchCommand::Resume => String::new(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BusError {
    #[error("watcher is no longer receiving commands")]
    Closed,
}

pub type BusResult<T> = Result<T, BusError>;

#[derive(Debug)]
struct Envelope {
    command: WatchCommand,
    ack: oneshot::Sender<()>,
}

/// Sending half, shared by every request handler.
#[derive(Debug, Clone)]
pub struct CommandBridge {
    tx: mpsc::Sender<Envelope>,
}

/// Receiving half, owned by the watcher.
#[derive(Debug)]
pub struct CommandReceiver {
    rx: mpsc::Receiver<Envelope>,
}

pub fn channel() -> (CommandBridge, CommandReceiver) {
    let (tx, rx) = mpsc::channel(1);
    (CommandBridge { tx }, CommandReceiver { rx })
}

impl CommandBridge {
    /// Hands `command` to the watcher and waits until it has been taken.
    ///
    /// Concurrent callers are served first come, first served, so commands
    /// reach the watcher in the order their dispatches complete.
    pub async fn dispatch(&self, command: WatchCommand) -> BusResult<()> {
        let (ack, accepted) = oneshot::channel();
        self.tx
            .send(Envelope { command, ack })
            .await
            .map_err(|_| BusError::Closed)?;
        accepted.await.map_err(|_| BusError::Closed)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl CommandReceiver {
    /// Takes the next command, releasing the dispatcher waiting on it.
    ///
    /// Returns `None` once every [`CommandBridge`] has been dropped.
    pub async fn recv(&mut self) -> Option<WatchCommand> {
        let Envelope { command, ack } = self.rx.recv().await?;
        // The dispatcher may have given up waiting; the command still counts.
        let _ = ack.send(());
        Some(command)
    }

    /// Non-blocking variant of [`recv`](Self::recv).
    pub fn try_recv(&mut self) -> Option<WatchCommand> {
        let Envelope { command, ack } = self.rx.try_recv().ok()?;
        let _ = ack.send(());
        Some(command)
    }
}
