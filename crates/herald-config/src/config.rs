//! The structured reporter configuration record and its RON persistence.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// File name of the structured settings record.
pub const SETTINGS_FILE: &str = "ReportingSettings.ron";

/// Endpoints written into a freshly created settings file.
pub const DEFAULT_ENDPOINTS: [&str; 3] = [
    "server.game.api.d-mp.org:9001",
    "godarklight.info.tm:9001",
    "ksp-dmp.sundevil.pl:12401",
];

const SETTINGS_HEADER: &str = "\
// All settings are optional. The defaults work, although game_address should be set to a DNS name.
// The server name and port are detected from the game server itself.
// game_address: domain name / IP shown on the list. Empty uses the public address of the connection.
// banner: HTTP address of the server picture. homepage: HTTP address of the server website.
// admin: player running the server. team: group running the server.
// location: two letter country code, autodetected when empty.
// fixed_ip: whether the server has a fixed address.
// endpoints: list receivers as dns:port, ipv4:port or [ipv6]:port. They sync with each other,
// so connecting to any of them is fine; later entries are failover targets.
";

/// Reporter settings persisted as `ReportingSettings.ron`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReportingConfig {
    /// List receivers, tried in order.
    pub endpoints: Vec<String>,
    /// Address shown on the list; empty means "use my public address".
    pub game_address: String,
    /// URL of the server banner image.
    pub banner: String,
    /// URL of the server homepage.
    pub homepage: String,
    /// Player running the server.
    pub admin: String,
    /// Group running the server.
    pub team: String,
    /// Two-letter country code.
    pub location: String,
    /// Whether the server has a fixed address.
    pub fixed_ip: bool,
    /// Log filter used when `RUST_LOG` is not set.
    pub log_level: String,
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            endpoints: DEFAULT_ENDPOINTS.iter().map(|e| e.to_string()).collect(),
            game_address: String::new(),
            banner: String::new(),
            homepage: String::new(),
            admin: String::new(),
            team: String::new(),
            location: String::new(),
            fixed_ip: false,
            log_level: "info".to_string(),
        }
    }
}

impl ReportingConfig {
    /// Load the config from `settings_dir`, or create a default settings file.
    pub fn load_or_create(settings_dir: &Path) -> Result<Self, ConfigError> {
        let path = settings_dir.join(SETTINGS_FILE);

        if path.exists() {
            let config = Self::load(settings_dir)?;
            log::info!("Loaded reporting settings from {}", path.display());
            Ok(config)
        } else {
            let config = Self::default();
            config.save(settings_dir)?;
            log::info!("Created default reporting settings at {}", path.display());
            Ok(config)
        }
    }

    /// Load the config from `settings_dir`. The file must exist.
    pub fn load(settings_dir: &Path) -> Result<Self, ConfigError> {
        let path = settings_dir.join(SETTINGS_FILE);
        let contents = std::fs::read_to_string(&path).map_err(ConfigError::ReadError)?;
        ron::from_str(&contents).map_err(ConfigError::ParseError)
    }

    /// Save the config to `settings_dir`.
    ///
    /// The record is written to a `.new` sibling first and renamed over the
    /// real file, so a crash never leaves a half-written settings file.
    pub fn save(&self, settings_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(settings_dir).map_err(ConfigError::WriteError)?;

        let path = settings_dir.join(SETTINGS_FILE);
        let staging = settings_dir.join(format!("{SETTINGS_FILE}.new"));

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(2)
            .separate_tuple_members(true)
            .enumerate_arrays(false);
        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&staging, format!("{SETTINGS_HEADER}{serialized}\n"))
            .map_err(ConfigError::WriteError)?;
        std::fs::rename(&staging, &path).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Check the invariants the reporter relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoints.iter().all(|e| e.trim().is_empty()) {
            return Err(ConfigError::NoEndpoints);
        }
        Ok(())
    }
}
