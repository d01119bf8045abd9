//! Observable reporter state.

use std::fmt;

use tokio::sync::watch;

/// Where the reporter is in its connection lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReporterState {
    /// No worker is running.
    Stopped,
    /// Looking for a reachable endpoint, or cooling down before the next try.
    Connecting,
    /// Connected; reports and heartbeats are flowing.
    Active,
    /// The connection failed and is being torn down.
    Closing,
}

impl fmt::Display for ReporterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Stopped => "stopped",
            Self::Connecting => "connecting",
            Self::Active => "active",
            Self::Closing => "closing",
        })
    }
}

/// Reporter state backed by a [`watch`] channel.
///
/// Multiple subscribers can observe transitions without polling.
pub struct StateWatch {
    tx: watch::Sender<ReporterState>,
}

impl Default for StateWatch {
    fn default() -> Self {
        Self::new()
    }
}

impl StateWatch {
    /// Create a watch initialized to [`ReporterState::Stopped`].
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ReporterState::Stopped);
        Self { tx }
    }

    /// Set the current state, notifying subscribers on change.
    pub fn set(&self, state: ReporterState) {
        self.tx.send_if_modified(|current| {
            if *current == state {
                return false;
            }
            tracing::debug!("Reporter state {current} -> {state}");
            *current = state;
            true
        });
    }

    /// Return a new subscriber receiver.
    pub fn subscribe(&self) -> watch::Receiver<ReporterState> {
        self.tx.subscribe()
    }

    /// Return the current state without blocking.
    pub fn current(&self) -> ReporterState {
        *self.tx.borrow()
    }
}

/// Resolve once `true` is published on `shutdown` or its sender is gone.
pub(crate) async fn cancelled(shutdown: &mut watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|stop| *stop).await;
}
