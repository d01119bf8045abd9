//! Reconnection loop around the session.
//!
//! Connect (first endpoint first), run a session, and when it fails wait out
//! a cooldown before starting over from the top of the endpoint list: the
//! short error cooldown after a transport failure, the long outage cooldown
//! when no endpoint accepted at all. Every wait is cut short by shutdown.

use std::future::Future;
use std::time::Duration;

use herald_net::{Connection, Connector, Resolve};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::sync::watch;

use crate::report::ReportSource;
use crate::session::{SessionEnd, run_session};
use crate::state::{ReporterState, StateWatch, cancelled};
use crate::timing::ReporterTiming;

/// Source of fresh connections for the supervisor.
pub(crate) trait Dial: Send + Sync {
    type Stream: AsyncRead + AsyncWrite + Unpin + Send;

    /// One pass over every endpoint. `None` means nothing accepted.
    fn dial(&self) -> impl Future<Output = Option<Self::Stream>> + Send;
}

impl<R: Resolve> Dial for Connector<R> {
    type Stream = TcpStream;

    fn dial(&self) -> impl Future<Output = Option<TcpStream>> + Send {
        async move { self.connect().await.map(Connection::into_stream) }
    }
}

/// Run until shutdown is requested.
pub(crate) async fn supervise<D: Dial>(
    connector: D,
    source: &ReportSource,
    timing: &ReporterTiming,
    state: &StateWatch,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        if *shutdown.borrow() {
            break;
        }
        state.set(ReporterState::Connecting);

        let connection = tokio::select! {
            connection = connector.dial() => connection,
            _ = cancelled(&mut shutdown) => break,
        };

        let cooldown = match connection {
            Some(connection) => {
                let end = run_session(connection, source, timing, state, &mut shutdown).await;
                match end {
                    SessionEnd::Cancelled => break,
                    SessionEnd::Failed(e) => {
                        state.set(ReporterState::Closing);
                        tracing::debug!("Disconnected reporter: {e}");
                        tracing::debug!("Reconnecting in {:?}...", timing.error_cooldown);
                        timing.error_cooldown
                    }
                }
            }
            None => {
                tracing::debug!(
                    "All reporters are down, trying again in {:?}",
                    timing.outage_cooldown
                );
                timing.outage_cooldown
            }
        };

        state.set(ReporterState::Connecting);
        if !sleep_unless_cancelled(cooldown, &mut shutdown).await {
            break;
        }
    }

    tracing::debug!("Stopping reporter");
}

/// Sleep for `delay`. Returns `false` if shutdown interrupted the sleep.
async fn sleep_unless_cancelled(delay: Duration, shutdown: &mut watch::Receiver<bool>) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(delay) => true,
        _ = cancelled(shutdown) => false,
    }
}
