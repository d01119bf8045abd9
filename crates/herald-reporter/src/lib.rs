//! Reports a running game server to the server list.
//!
//! [`Reporter`] owns one background task that connects to the first reachable
//! list endpoint, sends a full status report on connect and whenever the host
//! calls a hook, and keeps the link alive with heartbeats. A failed link is
//! retried after a cooldown; [`Reporter::reload`] restarts with fresh
//! settings.

mod command;
mod error;
mod host;
mod lifecycle;
mod report;
mod session;
mod state;
mod supervisor;
mod timing;

pub use command::{COMMANDS, CommandError, OperatorCommand};
pub use error::ReporterError;
pub use host::{HostServer, HostStatus, VersionInfo, build_descriptor};
pub use lifecycle::Reporter;
pub use state::{ReporterState, StateWatch};
pub use timing::ReporterTiming;
