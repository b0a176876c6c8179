//! Cancellation tied to the lifetime of a dashboard view.
//!
//! A view owns a [`ViewLifetime`] and hands a [`TeardownToken`] to every
//! fetch it starts. Tearing the view down (or dropping the lifetime) makes
//! all pending `run` calls return `SharedError::Cancelled` and drops the
//! wrapped futures, which aborts their in-flight requests.

use shared::{Result, SharedError};
use std::future::Future;
use tokio::sync::watch;

pub struct ViewLifetime {
    sender: watch::Sender<bool>,
}

impl ViewLifetime {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self { sender }
    }

    pub fn token(&self) -> TeardownToken {
        TeardownToken {
            receiver: self.sender.subscribe(),
        }
    }

    /// Cancels every token handed out by this lifetime.
    pub fn teardown(self) {
        self.sender.send_replace(true);
    }
}

impl Default for ViewLifetime {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone)]
pub struct TeardownToken {
    receiver: watch::Receiver<bool>,
}

impl TeardownToken {
    pub fn is_cancelled(&self) -> bool {
        *self.receiver.borrow() || self.receiver.has_changed().is_err()
    }

    /// Resolves once the owning view is torn down or dropped.
    pub async fn cancelled(&self) {
        let mut receiver = self.receiver.clone();
        loop {
            if *receiver.borrow_and_update() {
                return;
            }
            if receiver.changed().await.is_err() {
                return;
            }
        }
    }

    /// Drives `future` unless the view is torn down first.
    pub async fn run<F, T>(&self, future: F) -> Result<T>
    where
        F: Future<Output = T>,
    {
        if self.is_cancelled() {
            return Err(SharedError::Cancelled);
        }
        tokio::select! {
            biased;
            _ = self.cancelled() => Err(SharedError::Cancelled),
            output = future => Ok(output),
        }
    }
}
