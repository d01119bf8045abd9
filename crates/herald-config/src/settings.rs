//! Assembles everything the reporter needs from the settings directory.

use std::path::{Path, PathBuf};

use crate::cli::CliArgs;
use crate::config::ReportingConfig;
use crate::description::load_or_create_description;
use crate::error::ConfigError;
use crate::identity::ReportingIdentity;
use crate::legacy;

/// Immutable settings snapshot. A reload builds a new one.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Structured settings, CLI overrides already applied.
    pub config: ReportingConfig,
    /// Identity hash sent with every report.
    pub identity: ReportingIdentity,
    /// Server description.
    pub description: String,
}

/// Default settings directory: `<os config dir>/herald`.
pub fn default_settings_dir() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join("herald"))
        .ok_or(ConfigError::NoSettingsDir)
}

/// Loads [`Settings`] from one directory, with fixed CLI overrides.
#[derive(Debug, Clone)]
pub struct SettingsLoader {
    dir: PathBuf,
    overrides: CliArgs,
}

impl SettingsLoader {
    /// Loader for `dir` without overrides.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            overrides: CliArgs::default(),
        }
    }

    /// Loader for the directory named by `args`, or the default directory.
    pub fn from_cli(args: &CliArgs) -> Result<Self, ConfigError> {
        let dir = match &args.config {
            Some(dir) => dir.clone(),
            None => default_settings_dir()?,
        };
        Ok(Self {
            dir,
            overrides: args.clone(),
        })
    }

    /// The settings directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Load token, settings (migrating a legacy file first) and description.
    pub fn load(&self) -> Result<Settings, ConfigError> {
        let identity = ReportingIdentity::load_or_create(&self.dir)?;

        let mut config = match legacy::migrate(&self.dir)? {
            Some(config) => config,
            None => ReportingConfig::load_or_create(&self.dir)?,
        };
        config.apply_cli_overrides(&self.overrides);
        config.validate()?;

        let description = load_or_create_description(&self.dir)?;

        Ok(Settings {
            config,
            identity,
            description,
        })
    }
}
