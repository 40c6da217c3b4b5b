use std::path::{Path, PathBuf};

use crate::config::types::Settings;
use crate::error::ConfigError;

/// Discover and load the settings file.
///
/// Priority:
/// 1. `--config` flag (explicit path)
/// 2. `$ZENHUB_EXPORT_CONFIG` environment variable
/// 3. `$XDG_CONFIG_HOME/zenhub-export/config.toml`
/// 4. `~/.config/zenhub-export/config.toml`
///
/// With no file anywhere, defaults are used. An explicit path that cannot be
/// read is an error; discovered paths are only used when they exist.
pub fn load_settings(explicit_path: Option<&Path>) -> Result<Settings, ConfigError> {
    let path = match explicit_path {
        Some(path) => Some(path.to_path_buf()),
        None => find_settings_file(),
    };

    let settings = match path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading settings");
            parse_settings_file(&path)?
        }
        None => Settings::default(),
    };

    settings.validate()?;
    Ok(settings)
}

fn parse_settings_file(path: &Path) -> Result<Settings, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn find_settings_file() -> Option<PathBuf> {
    // $ZENHUB_EXPORT_CONFIG
    if let Ok(path) = std::env::var("ZENHUB_EXPORT_CONFIG") {
        let p = PathBuf::from(&path);
        if p.is_file() {
            return Some(p);
        }
    }

    // $XDG_CONFIG_HOME/zenhub-export/config.toml
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        let p = PathBuf::from(xdg).join("zenhub-export/config.toml");
        if p.is_file() {
            return Some(p);
        }
    }

    // ~/.config/zenhub-export/config.toml
    if let Ok(home) = std::env::var("HOME") {
        let p = PathBuf::from(home).join(".config/zenhub-export/config.toml");
        if p.is_file() {
            return Some(p);
        }
    }

    None
}
