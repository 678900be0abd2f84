use std::path::{Path, PathBuf};

use crate::app_dirs::{self, AppDirError};

use super::errors::ConfigError;
use super::types::ControllerSettings;

/// Default filename used to store controller settings.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Resolve the settings file path, ensuring the parent directory exists.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    let dir = app_dirs::app_root_dir().map_err(map_app_dir_error)?;
    Ok(dir.join(CONFIG_FILE_NAME))
}

/// Load settings from the app directory, returning defaults if missing.
pub fn load_or_default() -> Result<ControllerSettings, ConfigError> {
    load_from(&config_path()?)
}

/// Persist settings into the app directory.
pub fn save(settings: &ControllerSettings) -> Result<(), ConfigError> {
    save_to(&config_path()?, settings)
}

/// Load settings from `path`, returning defaults if the file does not exist.
pub fn load_from(path: &Path) -> Result<ControllerSettings, ConfigError> {
    if !path.exists() {
        tracing::debug!("No settings at {}, using defaults", path.display());
        return Ok(ControllerSettings::default());
    }
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str::<ControllerSettings>(&text)
        .map(ControllerSettings::normalized)
        .map_err(|source| ConfigError::ParseToml {
            path: path.to_path_buf(),
            source,
        })
}

/// Write settings to `path` as TOML, creating parent directories.
pub fn save_to(path: &Path, settings: &ControllerSettings) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| ConfigError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let text = toml::to_string_pretty(settings).map_err(|source| ConfigError::SerializeToml {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, text).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn map_app_dir_error(error: AppDirError) -> ConfigError {
    match error {
        AppDirError::NoBaseDir => ConfigError::NoConfigDir,
        AppDirError::CreateDir { path, source } => ConfigError::CreateDir { path, source },
    }
}
