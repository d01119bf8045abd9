//! Server status snapshot carried by every report.

use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Ordinal enums
// ---------------------------------------------------------------------------

/// Error returned when parsing one of the mode enums from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParseModeError {
    kind: &'static str,
    value: String,
}

macro_rules! ordinal_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $( $(#[$vmeta:meta])* $variant:ident = $ordinal:literal, $text:literal; )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl $name {
            /// Wire ordinal of this value.
            pub fn ordinal(self) -> i32 {
                match self {
                    $( Self::$variant => $ordinal, )+
                }
            }

            /// Map a wire ordinal back to a value.
            pub fn from_ordinal(ordinal: i32) -> Option<Self> {
                match ordinal {
                    $( $ordinal => Some(Self::$variant), )+
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(match self {
                    $( Self::$variant => $text, )+
                })
            }
        }

        impl FromStr for $name {
            type Err = ParseModeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let lowered = s.trim().to_ascii_lowercase();
                match lowered.as_str() {
                    $( $text => Ok(Self::$variant), )+
                    _ => Err(ParseModeError {
                        kind: $kind,
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

ordinal_enum! {
    /// How strictly the game server enforces its mod list.
    ModControlMode, "mod control mode" {
        /// No mod checking.
        Disabled = 0, "disabled";
        /// Parts outside the whitelist are not synced.
        #[default]
        StopInvalidPartSync = 1, "stop-invalid-part-sync";
        /// Vessels with parts outside the whitelist cannot launch.
        StopInvalidPartLaunch = 2, "stop-invalid-part-launch";
    }
}

ordinal_enum! {
    /// Game mode of the hosted universe.
    GameMode, "game mode" {
        /// Everything unlocked.
        #[default]
        Sandbox = 0, "sandbox";
        /// Science progression without funds.
        Science = 1, "science";
        /// Full career mode.
        Career = 2, "career";
    }
}

ordinal_enum! {
    /// How time warp is coordinated between players.
    WarpMode, "warp mode" {
        /// The master controller forces warp on everyone.
        McwForce = 0, "mcw-force";
        /// The master controller warps after a vote.
        McwVote = 1, "mcw-vote";
        /// Everyone follows the lowest requested rate.
        McwLowest = 2, "mcw-lowest";
        /// Subspace warping with simple sync.
        SubspaceSimple = 3, "subspace-simple";
        /// Full subspace warping.
        #[default]
        Subspace = 4, "subspace";
        /// No warp coordination.
        NoControl = 5, "none";
    }
}

// ---------------------------------------------------------------------------
// ServerDescriptor
// ---------------------------------------------------------------------------

/// Complete server status at one instant. Rebuilt for every report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerDescriptor {
    /// Display name of the server.
    pub server_name: String,
    /// Free-text description.
    pub description: String,
    /// Game port.
    pub port: i32,
    /// Address players should connect to; empty lets the list use the
    /// connection's public address.
    pub game_address: String,
    /// Game protocol version.
    pub protocol_version: i32,
    /// Game server program version.
    pub program_version: String,
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
    /// URL of the server banner image.
    pub banner: String,
    /// URL of the server homepage.
    pub homepage: String,
    /// Port of the server's HTTP status page (0 when disabled).
    pub http_port: i32,
    /// Player running the server.
    pub admin: String,
    /// Group running the server.
    pub team: String,
    /// Two-letter country code.
    pub location: String,
    /// Whether the server has a fixed address.
    pub fixed_ip: bool,
    /// Names of the players currently online, in join order.
    pub players: Vec<String>,
}
