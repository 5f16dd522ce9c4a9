//! User configuration loading for embedmap.
//!
//! User config location: $XDG_CONFIG_HOME/embedmap/embedmap.toml
//! Fallback: the platform config directory (via `dirs`), e.g.
//! ~/.config/embedmap/embedmap.toml on Linux.

use std::fs;
use std::path::PathBuf;

use thiserror::Error;

use super::settings::Settings;

const CONFIG_DIR_NAME: &str = "embedmap";
const CONFIG_FILE_NAME: &str = "embedmap.toml";

#[derive(Debug, Error)]
pub enum UserConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type UserConfigResult<T> = Result<T, UserConfigError>;

/// Returns the path to the user configuration file.
///
/// 1. If $XDG_CONFIG_HOME is set: $XDG_CONFIG_HOME/embedmap/embedmap.toml
/// 2. Otherwise: `dirs::config_dir()`/embedmap/embedmap.toml
///
/// Returns None if neither can be determined.
pub fn user_config_path() -> Option<PathBuf> {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .or_else(dirs::config_dir)?;
    Some(base.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Load the user configuration file.
///
/// Returns `Ok(None)` when no file exists.
pub fn load_user_config() -> UserConfigResult<Option<Settings>> {
    let Some(path) = user_config_path() else {
        return Ok(None);
    };
    if !path.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(&path).map_err(|source| UserConfigError::Io {
        path: path.clone(),
        source,
    })?;
    toml::from_str(&contents)
        .map(Some)
        .map_err(|source| UserConfigError::Parse { path, source })
}
