//! Start, stop and reload of the background reporter.

use std::sync::Arc;

use herald_config::{Settings, SettingsLoader};
use herald_net::{Connector, ConnectorConfig};
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::ReporterError;
use crate::host::{HostServer, VersionInfo};
use crate::report::ReportSource;
use crate::state::{ReporterState, StateWatch};
use crate::supervisor::supervise;
use crate::timing::ReporterTiming;

struct Worker {
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// Reports a game server to the server list.
///
/// Hooks (`player_joined`, `player_left`, `report_now`) are synchronous and
/// may be called from any thread; they only queue a report. The connection
/// itself lives on one background task owned by this controller.
pub struct Reporter {
    source: Arc<ReportSource>,
    loader: SettingsLoader,
    timing: ReporterTiming,
    state: Arc<StateWatch>,
    worker: Mutex<Option<Worker>>,
}

impl Reporter {
    /// Create a stopped reporter with already-loaded `settings`.
    ///
    /// `loader` is used again on [`reload`](Self::reload).
    pub fn new(
        loader: SettingsLoader,
        settings: Settings,
        host: Arc<dyn HostServer>,
        version: VersionInfo,
        timing: ReporterTiming,
    ) -> Self {
        Self {
            source: Arc::new(ReportSource::new(host, version, settings)),
            loader,
            timing,
            state: Arc::new(StateWatch::new()),
            worker: Mutex::new(None),
        }
    }

    /// Start the background worker. Does nothing if it is already running.
    ///
    /// The state is [`ReporterState::Connecting`] when this returns.
    pub fn start(&self) -> Result<(), ReporterError> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| ReporterError::NoRuntime)?;

        let mut worker = self.worker.lock();
        if worker.is_some() {
            tracing::warn!("Reporter already running, ignoring start");
            return Ok(());
        }

        let settings = self.source.settings();
        let connector = Connector::new(
            settings.config.endpoints.clone(),
            ConnectorConfig::for_heartbeat(
                self.timing.connect_timeout,
                self.timing.heartbeat_interval,
            ),
        );
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        self.state.set(ReporterState::Connecting);

        let source = Arc::clone(&self.source);
        let state = Arc::clone(&self.state);
        let timing = self.timing;
        let handle = runtime.spawn(async move {
            supervise(connector, &source, &timing, &state, shutdown_rx).await;
        });

        tracing::info!(
            "Reporter started with {} endpoint(s)",
            settings.config.endpoints.len()
        );
        *worker = Some(Worker {
            shutdown_tx,
            handle,
        });
        Ok(())
    }

    /// Stop the worker and close its connection.
    ///
    /// Waits at most `shutdown_grace` for the worker to finish, then aborts
    /// it. Safe to call when already stopped.
    pub async fn stop(&self) {
        let worker = self.worker.lock().take();
        let Some(Worker {
            shutdown_tx,
            mut handle,
        }) = worker
        else {
            return;
        };

        let _ = shutdown_tx.send(true);
        if tokio::time::timeout(self.timing.shutdown_grace, &mut handle)
            .await
            .is_err()
        {
            tracing::warn!(
                "Reporter did not stop within {:?}, aborting",
                self.timing.shutdown_grace
            );
            handle.abort();
            let _ = handle.await;
        }

        self.state.set(ReporterState::Stopped);
        tracing::info!("Reporter stopped");
    }

    /// Stop, re-read the settings, and start again.
    ///
    /// If loading fails the previous settings stay in effect, the reporter is
    /// restarted with them, and the load error is returned.
    pub async fn reload(&self) -> Result<(), ReporterError> {
        self.stop().await;

        let outcome = match self.loader.load() {
            Ok(settings) => {
                self.source.replace_settings(settings);
                tracing::info!("Reloaded reporting settings");
                Ok(())
            }
            Err(e) => {
                tracing::error!("Failed to reload reporting settings, keeping previous: {e}");
                Err(ReporterError::Config(e))
            }
        };

        self.start()?;
        outcome
    }

    /// A player joined: update the roster and queue a report.
    pub fn player_joined(&self, name: &str) {
        self.source.player_joined(name);
    }

    /// A player left: update the roster and queue a report.
    pub fn player_left(&self, name: &str) {
        self.source.player_left(name);
    }

    /// Queue a report for the current status.
    pub fn report_now(&self) {
        self.source.report_now();
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ReporterState {
        self.state.current()
    }

    /// Subscribe to state transitions.
    pub fn subscribe(&self) -> watch::Receiver<ReporterState> {
        self.state.subscribe()
    }

    /// Players currently on the roster.
    pub fn players(&self) -> Vec<String> {
        self.source.players()
    }

    /// Settings currently in effect.
    pub fn settings(&self) -> Arc<Settings> {
        self.source.settings()
    }
}
