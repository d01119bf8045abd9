//! One-shot migration of the legacy `key=value` settings file.
//!
//! The old format is one `key = value` pair per line. The `description` key is
//! special: its value and every following line, verbatim, form the server
//! description.

use std::path::Path;

use crate::config::ReportingConfig;
use crate::description::write_description_if_absent;
use crate::error::ConfigError;

/// File name of the legacy flat settings file.
pub const LEGACY_SETTINGS_FILE: &str = "ReportingSettings.txt";

/// Receiver appended to every migrated endpoint list.
pub const MIGRATION_ENDPOINT: &str = "godarklight.info.tm:9001";

/// Contents of a parsed legacy file.
#[derive(Debug, Clone, PartialEq)]
pub struct LegacySettings {
    /// Settings carried over. Endpoints start empty, not at the defaults.
    pub config: ReportingConfig,
    /// Captured description, each line terminated by `\n`.
    pub description: String,
}

/// Parse the text of a legacy settings file.
///
/// Lines without `=` are logged and skipped. Unknown keys are ignored.
pub fn parse_legacy(text: &str) -> LegacySettings {
    let mut config = ReportingConfig {
        endpoints: Vec::new(),
        ..Default::default()
    };
    let mut description: Option<String> = None;

    for line in text.lines() {
        if let Some(desc) = description.as_mut() {
            desc.push_str(line);
            desc.push('\n');
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            log::error!("Error reading legacy settings file, no '=' in line: {line:?}");
            continue;
        };
        let value = value.trim();

        match key.trim() {
            "reporting" => config.endpoints.push(value.to_string()),
            "gameAddress" => config.game_address = value.to_string(),
            "banner" => config.banner = value.to_string(),
            "homepage" => config.homepage = value.to_string(),
            "admin" => config.admin = value.to_string(),
            "team" => config.team = value.to_string(),
            "location" => config.location = value.to_string(),
            "fixedIP" => config.fixed_ip = value == "true",
            "description" => description = Some(format!("{value}\n")),
            _ => {}
        }
    }

    LegacySettings {
        config,
        description: description.unwrap_or_default(),
    }
}

/// Migrate a legacy file in `settings_dir`, if there is one.
///
/// On success the structured file is written, the description file is
/// written unless it already exists, and the legacy file is deleted. Returns
/// `None` when there was nothing to migrate.
pub fn migrate(settings_dir: &Path) -> Result<Option<ReportingConfig>, ConfigError> {
    let path = settings_dir.join(LEGACY_SETTINGS_FILE);
    if !path.exists() {
        return Ok(None);
    }

    let text = std::fs::read_to_string(&path).map_err(ConfigError::ReadError)?;
    let LegacySettings {
        mut config,
        description,
    } = parse_legacy(&text);
    config.endpoints.push(MIGRATION_ENDPOINT.to_string());

    config.save(settings_dir)?;
    write_description_if_absent(settings_dir, &description)?;
    std::fs::remove_file(&path).map_err(ConfigError::WriteError)?;

    log::debug!("Upgraded reporting settings file");
    Ok(Some(config))
}
