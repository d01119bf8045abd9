//! Timing knobs for the reporter.

use std::time::Duration;

/// Every interval the reporter waits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReporterTiming {
    /// Bound for one connect attempt and one DNS lookup. Default: 5 s.
    pub connect_timeout: Duration,
    /// Idle time after which a heartbeat is sent. Default: 10 s.
    pub heartbeat_interval: Duration,
    /// Longest wait for the queue signal before re-checking. Default: 100 ms.
    pub poll_interval: Duration,
    /// Pause after a session ends on a transport error. Default: 5 s.
    pub error_cooldown: Duration,
    /// Pause after no endpoint could be reached at all. Default: 60 s.
    pub outage_cooldown: Duration,
    /// How long `stop` waits for the worker before aborting it. Default: 2 s.
    pub shutdown_grace: Duration,
}

impl Default for ReporterTiming {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            heartbeat_interval: Duration::from_secs(10),
            poll_interval: Duration::from_millis(100),
            error_cooldown: Duration::from_secs(5),
            outage_cooldown: Duration::from_secs(60),
            shutdown_grace: Duration::from_secs(2),
        }
    }
}
