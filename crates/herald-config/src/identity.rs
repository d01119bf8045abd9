//! Persistent server identity.
//!
//! A random token is generated once and stored next to the settings. The
//! identity sent to the list is the SHA-256 of that token, so the token itself
//! never leaves the machine.

use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::ConfigError;

/// File holding the secret token.
pub const TOKEN_FILE: &str = "ReportingToken.txt";

/// Stable identity of this server on the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportingIdentity {
    hash: String,
}

impl ReportingIdentity {
    /// Derive the identity from token text. The text is hashed as-is.
    pub fn from_token(token: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        Self {
            hash: format!("{:x}", hasher.finalize()),
        }
    }

    /// Read the token from `settings_dir`, creating it on first use.
    pub fn load_or_create(settings_dir: &Path) -> Result<Self, ConfigError> {
        let path = settings_dir.join(TOKEN_FILE);

        let token = if path.exists() {
            std::fs::read_to_string(&path).map_err(ConfigError::ReadError)?
        } else {
            std::fs::create_dir_all(settings_dir).map_err(ConfigError::WriteError)?;
            let token = uuid::Uuid::new_v4().to_string();
            std::fs::write(&path, &token).map_err(ConfigError::WriteError)?;
            log::info!("Generated reporting token at {}", path.display());
            token
        };

        Ok(Self::from_token(&token))
    }

    /// Lowercase hex digest, 64 characters.
    pub fn as_str(&self) -> &str {
        &self.hash
    }
}

impl std::fmt::Display for ReportingIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.hash)
    }
}
