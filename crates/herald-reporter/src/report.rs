//! Builds report frames and feeds them to the outbound queue.
//!
//! The roster lock is held from mutation through snapshot, encoding and
//! enqueue, so reports reach the queue in the order the roster changed.
//! Lock order is roster, then settings, then queue.

use std::sync::Arc;

use herald_config::Settings;
use herald_net::{FrameConfig, MessageType, OutboundQueue, encode_frame};
use herald_report::encode_report;
use parking_lot::{Mutex, RwLock};

use crate::error::ReporterError;
use crate::host::{HostServer, VersionInfo, build_descriptor};

/// Everything a report is made from, shared by the hooks and the session.
pub(crate) struct ReportSource {
    host: Arc<dyn HostServer>,
    version: VersionInfo,
    settings: RwLock<Arc<Settings>>,
    roster: Mutex<Vec<String>>,
    queue: OutboundQueue,
    frame_config: FrameConfig,
}

impl ReportSource {
    pub(crate) fn new(host: Arc<dyn HostServer>, version: VersionInfo, settings: Settings) -> Self {
        Self {
            host,
            version,
            settings: RwLock::new(Arc::new(settings)),
            roster: Mutex::new(Vec::new()),
            queue: OutboundQueue::new(),
            frame_config: FrameConfig::default(),
        }
    }

    pub(crate) fn queue(&self) -> &OutboundQueue {
        &self.queue
    }

    /// Current settings snapshot.
    pub(crate) fn settings(&self) -> Arc<Settings> {
        Arc::clone(&*self.settings.read())
    }

    pub(crate) fn replace_settings(&self, settings: Settings) {
        *self.settings.write() = Arc::new(settings);
    }

    /// Players online, in join order.
    pub(crate) fn players(&self) -> Vec<String> {
        self.roster.lock().clone()
    }

    pub(crate) fn player_joined(&self, name: &str) {
        let mut roster = self.roster.lock();
        roster.push(name.to_string());
        self.enqueue_report(&roster);
    }

    pub(crate) fn player_left(&self, name: &str) {
        let mut roster = self.roster.lock();
        match roster.iter().position(|p| p == name) {
            Some(index) => {
                roster.remove(index);
            }
            None => tracing::debug!("Player {name} left but was not on the roster"),
        }
        self.enqueue_report(&roster);
    }

    pub(crate) fn report_now(&self) {
        let roster = self.roster.lock();
        self.enqueue_report(&roster);
    }

    /// Drop whatever an earlier connection left queued and queue a fresh
    /// report, so a new session always opens with the full current status.
    pub(crate) fn restart_queue(&self) {
        let roster = self.roster.lock();
        let dropped = self.queue.clear();
        if dropped > 0 {
            tracing::debug!("Discarded {dropped} stale frame(s)");
        }
        self.enqueue_report(&roster);
    }

    fn enqueue_report(&self, players: &[String]) {
        match self.build_frame(players) {
            Ok(frame) => {
                match players.len() {
                    1 => tracing::debug!("Sending report: 1 player."),
                    n => tracing::debug!("Sending report: {n} players."),
                }
                self.queue.enqueue(frame);
            }
            Err(e) => tracing::warn!("Dropping report: {e}"),
        }
    }

    fn build_frame(&self, players: &[String]) -> Result<Vec<u8>, ReporterError> {
        let settings = self.settings();
        let descriptor = build_descriptor(&settings, self.host.status(), &self.version, players);
        let payload = encode_report(settings.identity.as_str(), &descriptor)?;
        Ok(encode_frame(
            MessageType::Report,
            &payload,
            &self.frame_config,
        )?)
    }

    #[cfg(test)]
    pub(crate) fn with_frame_config(mut self, frame_config: FrameConfig) -> Self {
        self.frame_config = frame_config;
        self
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::host::HostStatus;
    use herald_config::{ReportingConfig, ReportingIdentity};
    use herald_net::{HEADER_LEN, REPORTING_PROTOCOL_ID};
    use herald_report::decode_report;

    pub(crate) fn test_settings(endpoints: Vec<String>) -> Settings {
        Settings {
            config: ReportingConfig {
                endpoints,
                ..Default::default()
            },
            identity: ReportingIdentity::from_token("test-token"),
            description: "Test server".into(),
        }
    }

    pub(crate) fn test_source() -> ReportSource {
        let host = HostStatus {
            server_name: "Kerbin Outpost".into(),
            port: 6702,
            max_players: 8,
            ..Default::default()
        };
        ReportSource::new(
            Arc::new(host),
            VersionInfo {
                protocol_version: 48,
                program_version: "v0.3.8.5".into(),
            },
            test_settings(vec!["127.0.0.1:9001".into()]),
        )
    }

    /// Decode the players list carried by a queued report frame.
    pub(crate) fn players_in(frame: &[u8]) -> Vec<String> {
        assert_eq!(&frame[..4], &REPORTING_PROTOCOL_ID.to_le_bytes());
        decode_report(&frame[HEADER_LEN..]).unwrap().descriptor.players
    }

    #[test]
    fn test_roster_changes_queue_reports_in_order() {
        let source = test_source();
        source.player_joined("Alice");
        source.player_joined("Bob");
        source.player_left("Alice");

        let frames = source.queue().drain_all();
        let rosters: Vec<_> = frames.iter().map(|f| players_in(f)).collect();
        assert_eq!(
            rosters,
            vec![vec!["Alice"], vec!["Alice", "Bob"], vec!["Bob"]]
        );
    }

    #[test]
    fn test_report_carries_identity_and_settings() {
        let source = test_source();
        source.report_now();
        let frame = source.queue().drain_all().remove(0);
        let report = decode_report(&frame[HEADER_LEN..]).unwrap();
        assert_eq!(
            report.identity,
            ReportingIdentity::from_token("test-token").as_str()
        );
        assert_eq!(report.descriptor.server_name, "Kerbin Outpost");
        assert_eq!(report.descriptor.description, "Test server");
        assert_eq!(report.descriptor.protocol_version, 48);
    }

    #[test]
    fn test_restart_queue_replaces_stale_frames() {
        let source = test_source();
        source.player_joined("Alice");
        source.queue().enqueue(vec![9, 9, 9]);
        source.restart_queue();

        let frames = source.queue().drain_all();
        assert_eq!(frames.len(), 1);
        assert_eq!(players_in(&frames[0]), vec!["Alice"]);
    }

    #[test]
    fn test_unknown_player_leaving_still_reports() {
        let source = test_source();
        source.player_joined("Alice");
        source.player_left("Mallory");
        assert_eq!(source.players(), vec!["Alice"]);
        assert_eq!(source.queue().len(), 2);
    }

    #[test]
    fn test_oversize_report_dropped_without_panic() {
        let source = test_source().with_frame_config(FrameConfig {
            max_payload_size: 16,
        });
        source.player_joined("Alice");
        assert!(source.queue().is_empty());
        assert_eq!(source.players(), vec!["Alice"]);
    }

    #[test]
    fn test_replaced_settings_used_for_next_report() {
        let source = test_source();
        let mut settings = test_settings(vec!["127.0.0.1:9001".into()]);
        settings.description = "Reloaded".into();
        source.replace_settings(settings);
        source.report_now();

        let frame = source.queue().drain_all().remove(0);
        let report = decode_report(&frame[HEADER_LEN..]).unwrap();
        assert_eq!(report.descriptor.description, "Reloaded");
    }
}
