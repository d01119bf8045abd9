//! Free-text server description stored in its own file.

use std::path::Path;

use crate::error::ConfigError;

/// File holding the server description.
pub const DESCRIPTION_FILE: &str = "ReportingDescription.txt";

/// Read the description, creating an empty file if there is none yet.
pub fn load_or_create_description(settings_dir: &Path) -> Result<String, ConfigError> {
    write_description_if_absent(settings_dir, "")?;
    std::fs::read_to_string(settings_dir.join(DESCRIPTION_FILE)).map_err(ConfigError::ReadError)
}

/// Write `text` as the description unless one already exists.
///
/// Returns whether the file was written.
pub fn write_description_if_absent(settings_dir: &Path, text: &str) -> Result<bool, ConfigError> {
    let path = settings_dir.join(DESCRIPTION_FILE);
    if path.exists() {
        return Ok(false);
    }
    std::fs::create_dir_all(settings_dir).map_err(ConfigError::WriteError)?;
    std::fs::write(&path, text).map_err(ConfigError::WriteError)?;
    Ok(true)
}
