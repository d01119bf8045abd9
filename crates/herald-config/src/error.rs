//! Configuration error types.

/// Errors that can occur when loading, saving, or parsing reporter settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read a settings file from disk.
    #[error("failed to read config: {0}")]
    ReadError(#[source] std::io::Error),

    /// Failed to write a settings file to disk.
    #[error("failed to write config: {0}")]
    WriteError(#[source] std::io::Error),

    /// Failed to parse RON content.
    #[error("failed to parse config: {0}")]
    ParseError(#[source] ron::error::SpannedError),

    /// Failed to serialize config to RON.
    #[error("failed to serialize config: {0}")]
    SerializeError(#[source] ron::Error),

    /// The endpoint list is empty, so there is nothing to report to.
    #[error("no reporting endpoints configured")]
    NoEndpoints,

    /// The OS did not provide a configuration directory.
    #[error("could not determine a settings directory")]
    NoSettingsDir,
}
