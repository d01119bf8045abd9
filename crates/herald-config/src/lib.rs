//! Settings for the Herald server-list reporter.
//!
//! Everything lives in one settings directory: a RON record with the endpoint
//! list and list metadata, a secret token from which the server identity is
//! derived, and a free-text description. A legacy flat settings file found in
//! the same directory is migrated on first load. CLI overrides are applied on
//! top of every load.

mod cli;
mod config;
mod description;
mod error;
mod identity;
mod legacy;
mod settings;

pub use cli::CliArgs;
pub use config::{DEFAULT_ENDPOINTS, ReportingConfig, SETTINGS_FILE};
pub use description::{DESCRIPTION_FILE, load_or_create_description};
pub use error::ConfigError;
pub use identity::{ReportingIdentity, TOKEN_FILE};
pub use legacy::{LEGACY_SETTINGS_FILE, LegacySettings, MIGRATION_ENDPOINT, parse_legacy};
pub use settings::{Settings, SettingsLoader, default_settings_dir};
