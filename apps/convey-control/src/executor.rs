use parking_lot::Mutex;

use crate::longpoll::StatusSignal;

/// The test runner as seen by the control plane.
pub trait Executor: Send + Sync {
    /// Current status, e.g. `idle` or `executing`.
    fn status(&self) -> String;

    /// Returns whether a status change is pending and clears the latch.
    fn clear_status_flag(&self) -> bool;
}

/// In-process status holder that feeds long-poll waiters.
///
/// A status change is handed to every waiter currently registered on the
/// [`StatusSignal`]. When nobody is waiting the change is latched instead,
/// and the next long-poll request picks it up without blocking.
#[derive(Debug)]
pub struct StatusBoard {
    inner: Mutex<BoardState>,
    signal: StatusSignal,
}

#[derive(Debug)]
struct BoardState {
    status: String,
    pending: bool,
}

impl StatusBoard {
    pub fn new(signal: StatusSignal, initial: impl Into<String>) -> Self {
        Self {
            inner: Mutex::new(BoardState {
                status: initial.into(),
                pending: false,
            }),
            signal,
        }
    }

    pub fn set_status(&self, status: impl Into<String>) {
        let mut state = self.inner.lock();
        state.status = status.into();
        let delivered = self.signal.offer(&state.status);
        state.pending = delivered == 0;
    }
}

impl Executor for StatusBoard {
    fn status(&self) -> String {
        self.inner.lock().status.clone()
    }

    fn clear_status_flag(&self) -> bool {
        std::mem::take(&mut self.inner.lock().pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn change_without_waiters_is_latched_once() {
        let board = StatusBoard::new(StatusSignal::new(), "idle");
        assert!(!board.clear_status_flag());

        board.set_status("executing");
        assert_eq!(board.status(), "executing");
        assert!(board.clear_status_flag());
        assert!(!board.clear_status_flag());
    }

    #[tokio::test]
    async fn change_with_waiter_is_delivered_not_latched() {
        let signal = StatusSignal::new();
        let board = StatusBoard::new(signal.clone(), "idle");
        let waiter = signal.register();

        board.set_status("parsing");
        assert!(!board.clear_status_flag());
        assert_eq!(waiter.recv().await.as_deref(), Some("parsing"));
    }
}
