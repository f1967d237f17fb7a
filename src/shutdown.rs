//! Run-wide cancellation and deadline propagation.
//!
//! A [`RunContext`] carries an optional absolute deadline plus a shared
//! cancellation flag. Clones observe the same flag; child contexts created
//! with [`RunContext::child_with_timeout`] additionally tighten the deadline.
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::watch;
use tokio::time::{Instant, sleep_until};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StopReason {
    #[error("deadline exceeded")]
    DeadlineExceeded,
    #[error("cancelled")]
    Cancelled,
}

/// Triggers cancellation for every context created from the same root.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

#[derive(Debug, Clone)]
pub struct RunContext {
    deadline: Option<Instant>,
    cancel_rx: watch::Receiver<bool>,
}

impl RunContext {
    /// Creates a root context with no deadline.
    #[must_use]
    pub fn new() -> (Self, CancelHandle) {
        Self::root(None)
    }

    /// Creates a root context that expires `timeout` from now.
    ///
    /// A timeout too large to represent yields a context without a deadline.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> (Self, CancelHandle) {
        Self::root(Instant::now().checked_add(timeout))
    }

    fn root(deadline: Option<Instant>) -> (Self, CancelHandle) {
        let (tx, cancel_rx) = watch::channel(false);
        (
            Self {
                deadline,
                cancel_rx,
            },
            CancelHandle { tx: Arc::new(tx) },
        )
    }

    /// Derives a context whose deadline is the earlier of the inherited one
    /// and `now + timeout`. A zero timeout inherits the parent unchanged.
    #[must_use]
    pub fn child_with_timeout(&self, timeout: Duration) -> Self {
        if timeout.is_zero() {
            return self.clone();
        }
        let local = Instant::now().checked_add(timeout);
        let deadline = match (self.deadline, local) {
            (Some(parent), Some(local)) => Some(parent.min(local)),
            (Some(parent), None) => Some(parent),
            (None, local) => local,
        };
        Self {
            deadline,
            cancel_rx: self.cancel_rx.clone(),
        }
    }

    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Non-blocking check of whether the context has already fired.
    #[must_use]
    pub fn stop_reason(&self) -> Option<StopReason> {
        if *self.cancel_rx.borrow() {
            return Some(StopReason::Cancelled);
        }
        match self.deadline {
            Some(deadline) if deadline <= Instant::now() => Some(StopReason::DeadlineExceeded),
            Some(_) | None => None,
        }
    }

    /// Resolves once the context is cancelled or its deadline passes.
    pub async fn done(&self) -> StopReason {
        if let Some(reason) = self.stop_reason() {
            return reason;
        }
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    biased;
                    () = self.cancelled() => StopReason::Cancelled,
                    () = sleep_until(deadline) => StopReason::DeadlineExceeded,
                }
            }
            None => {
                self.cancelled().await;
                StopReason::Cancelled
            }
        }
    }

    async fn cancelled(&self) {
        let mut cancel_rx = self.cancel_rx.clone();
        if cancel_rx.wait_for(|cancelled| *cancelled).await.is_err() {
            // Every handle is gone, so cancellation can no longer happen.
            std::future::pending::<()>().await;
        }
    }
}
