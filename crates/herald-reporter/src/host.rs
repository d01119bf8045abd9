//! The game server the reporter describes.

use herald_config::Settings;
use herald_report::{GameMode, ModControlMode, ServerDescriptor, WarpMode};

/// Live status the host exposes, read fresh for every report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostStatus {
    /// Display name of the server.
    pub server_name: String,
    /// Game port.
    pub port: i32,
    /// HTTP status port, 0 when disabled.
    pub http_port: i32,
    /// Player cap.
    pub max_players: i32,
    /// Mod enforcement mode.
    pub mod_control: ModControlMode,
    /// Hash of the mod control file.
    pub mod_control_sha: String,
    /// Game mode.
    pub game_mode: GameMode,
    /// Whether cheats are enabled.
    pub cheats: bool,
    /// Warp coordination mode.
    pub warp_mode: WarpMode,
    /// Size of the universe directory in bytes.
    pub universe_size: i64,
}

/// Versions of the host program, fixed for the process lifetime.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionInfo {
    /// Game protocol version.
    pub protocol_version: i32,
    /// Human-readable program version.
    pub program_version: String,
}

/// A game server that can be reported.
pub trait HostServer: Send + Sync {
    /// Current status snapshot.
    fn status(&self) -> HostStatus;
}

/// A fixed status is a host that never changes.
impl HostServer for HostStatus {
    fn status(&self) -> HostStatus {
        self.clone()
    }
}

/// Merge host status, versions, settings and the roster into one snapshot.
pub fn build_descriptor(
    settings: &Settings,
    status: HostStatus,
    version: &VersionInfo,
    players: &[String],
) -> ServerDescriptor {
    let config = &settings.config;
    ServerDescriptor {
        server_name: status.server_name,
        description: settings.description.clone(),
        port: status.port,
        game_address: config.game_address.clone(),
        protocol_version: version.protocol_version,
        program_version: version.program_version.clone(),
        max_players: status.max_players,
        mod_control: status.mod_control,
        mod_control_sha: status.mod_control_sha,
        game_mode: status.game_mode,
        cheats: status.cheats,
        warp_mode: status.warp_mode,
        universe_size: status.universe_size,
        banner: config.banner.clone(),
        homepage: config.homepage.clone(),
        http_port: status.http_port,
        admin: config.admin.clone(),
        team: config.team.clone(),
        location: config.location.clone(),
        fixed_ip: config.fixed_ip,
        players: players.to_vec(),
    }
}
