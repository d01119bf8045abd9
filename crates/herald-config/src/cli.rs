//! Command-line overrides for the reporter settings.

use std::path::PathBuf;

use crate::ReportingConfig;

/// Reporter command-line arguments.
///
/// Flattened into the binary's own parser. CLI values override settings loaded
/// from `ReportingSettings.ron` and survive a reload.
#[derive(clap::Args, Debug, Clone, Default, PartialEq)]
pub struct CliArgs {
    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to the settings directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Report receiver as host:port; repeat to list several. Replaces the
    /// configured list.
    #[arg(long = "endpoint", value_name = "HOST:PORT")]
    pub endpoints: Vec<String>,

    /// Address shown on the list.
    #[arg(long)]
    pub game_address: Option<String>,
}

impl ReportingConfig {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if !args.endpoints.is_empty() {
            self.endpoints = args.endpoints.clone();
        }
        if let Some(ref addr) = args.game_address {
            self.game_address = addr.clone();
        }
        if let Some(ref level) = args.log_level {
            self.log_level = level.clone();
        }
    }
}
