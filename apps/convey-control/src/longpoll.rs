//! Long-poll rendezvous between status requests and the executor.
//!
//! A request registers a [`Waiter`] on the shared [`StatusSignal`] and then
//! sleeps until either the executor offers a new status or its deadline
//! passes. A timed-out request withdraws its waiter explicitly, keeping any
//! status that landed at the last moment. Disconnected requests withdraw by
//! dropping it: axum drops the handler future when the client goes away,
//! taking the waiter with it.

use std::{sync::Arc, time::Duration};

use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::executor::Executor;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(60_000);
pub const MAX_TIMEOUT_MS: i64 = 180_000;

#[derive(Debug, Clone, Default)]
pub struct StatusSignal {
    waiters: Arc<Mutex<Vec<oneshot::Sender<String>>>>,
}

#[derive(Debug)]
pub struct Waiter {
    rx: oneshot::Receiver<String>,
}

impl StatusSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self) -> Waiter {
        let (tx, rx) = oneshot::channel();
        let mut waiters = self.waiters.lock();
        waiters.retain(|waiter| !waiter.is_closed());
        waiters.push(tx);
        Waiter { rx }
    }

    /// Fulfils every live waiter with `status`, returning how many took it.
    pub fn offer(&self, status: &str) -> usize {
        let waiters = std::mem::take(&mut *self.waiters.lock());
        waiters
            .into_iter()
            .map(|waiter| waiter.send(status.to_owned()))
            .filter(Result::is_ok)
            .count()
    }

    /// Waiters still able to receive a status.
    pub fn pending(&self) -> usize {
        self.waiters
            .lock()
            .iter()
            .filter(|waiter| !waiter.is_closed())
            .count()
    }
}

impl Waiter {
    /// Resolves with the offered status, or `None` if the signal went away.
    pub async fn recv(self) -> Option<String> {
        self.rx.await.ok()
    }

    /// Like [`recv`](Self::recv), but gives up after `timeout`.
    pub async fn recv_timeout(mut self, timeout: Duration) -> Option<String> {
        let outcome = tokio::time::timeout(timeout, &mut self.rx).await;
        match outcome {
            Ok(status) => status.ok(),
            Err(_) => self.withdraw(),
        }
    }

    /// Stops accepting offers and returns one that already landed.
    ///
    /// Once this returns, `offer` no longer counts the waiter as reached, so
    /// a status is either handed back here or left for the executor to latch.
    pub fn withdraw(mut self) -> Option<String> {
        self.rx.close();
        self.rx.try_recv().ok()
    }
}

#[derive(Clone)]
pub struct LongPoll {
    executor: Arc<dyn Executor>,
    signal: StatusSignal,
}

impl std::fmt::Debug for LongPoll {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LongPoll")
            .field("pending", &self.signal.pending())
            .finish()
    }
}

impl LongPoll {
    pub fn new(executor: Arc<dyn Executor>, signal: StatusSignal) -> Self {
        Self { executor, signal }
    }

    /// Waits for the next status change, up to `timeout`.
    ///
    /// A change the executor latched while nobody was waiting is returned
    /// at once. On timeout the result is empty. The waiter is registered
    /// before the latch is checked, so a change landing between the two is
    /// delivered through the waiter rather than lost.
    pub async fn wait(&self, timeout: Duration) -> String {
        let waiter = self.signal.register();
        if self.executor.clear_status_flag() {
            return self.executor.status();
        }

        waiter.recv_timeout(timeout).await.unwrap_or_default()
    }
}

/// Client-supplied timeout in milliseconds; anything unparsable or outside
/// `0..=180000` falls back to the one-minute default.
pub fn parse_timeout(raw: Option<&str>) -> Duration {
    match raw.and_then(|value| value.trim().parse::<i64>().ok()) {
        Some(ms) if (0..=MAX_TIMEOUT_MS).contains(&ms) => Duration::from_millis(ms as u64),
        _ => DEFAULT_TIMEOUT,
    }
}
