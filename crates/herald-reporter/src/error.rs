//! Reporter error type.

use herald_config::ConfigError;
use herald_net::FrameError;
use herald_report::EncodeError;

/// Errors surfaced by the reporter.
///
/// Nothing here is fatal to the host: report failures drop one report,
/// reload failures keep the previous settings.
#[derive(Debug, thiserror::Error)]
pub enum ReporterError {
    /// Settings could not be loaded.
    #[error("settings error: {0}")]
    Config(#[from] ConfigError),

    /// A report payload could not be encoded.
    #[error("report encoding failed: {0}")]
    Encode(#[from] EncodeError),

    /// A report could not be framed.
    #[error("report framing failed: {0}")]
    Frame(#[from] FrameError),

    /// `start` was called outside a Tokio runtime.
    #[error("no Tokio runtime available to run the reporter")]
    NoRuntime,
}
