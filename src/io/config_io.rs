use std::fs;
use std::path::{Path, PathBuf};

use crate::model::config::ThreadConfig;

const APP_DIR: &str = "deck-threads";

/// Error type for config loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse config.toml: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Default config file path, respecting XDG_CONFIG_HOME
pub fn config_path() -> PathBuf {
    let config_dir = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| dirs_home().join(".config"));
    config_dir.join(APP_DIR).join("config.toml")
}

/// Default store directory, respecting XDG_DATA_HOME
pub fn default_store_dir() -> PathBuf {
    let data_dir = std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| dirs_home().join(".local").join("share"));
    data_dir.join(APP_DIR)
}

fn dirs_home() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/"))
}

/// Read a config file. A missing file yields the defaults.
pub fn read_config_from(path: &Path) -> Result<ThreadConfig, ConfigError> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(ThreadConfig::default());
    }
    let text = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(toml::from_str(&text)?)
}

/// Read the config from `--config` if given, else from the default location.
pub fn read_config(explicit: Option<&Path>) -> Result<ThreadConfig, ConfigError> {
    match explicit {
        Some(path) => read_config_from(path),
        None => read_config_from(&config_path()),
    }
}

/// Where the comment store lives under this config
pub fn store_dir(config: &ThreadConfig) -> PathBuf {
    config.store.dir.clone().unwrap_or_else(default_store_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = read_config_from(&tmp.path().join("nope.toml")).unwrap();
        assert_eq!(config.display.indent, 2);
        assert_eq!(config.display.date_format, "%H:%M:%S - %Y-%m-%d");
        assert!(config.store.dir.is_none());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(
            &path,
            r#"[user]
id = "alice"
display_name = "Alice A."

[display]
indent = 4
"#,
        )
        .unwrap();

        let config = read_config_from(&path).unwrap();
        assert_eq!(config.user.id, "alice");
        assert_eq!(config.user.display_name(), "Alice A.");
        assert_eq!(config.display.indent, 4);
        assert_eq!(config.display.max_width, 100);
    }

    #[test]
    fn test_store_dir_override() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "[store]\ndir = \"/srv/comments\"\n").unwrap();
        let config = read_config_from(&path).unwrap();
        assert_eq!(store_dir(&config), PathBuf::from("/srv/comments"));
    }

    #[test]
    fn test_bad_toml_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "[display\nindent = ").unwrap();
        assert!(matches!(read_config_from(&path), Err(ConfigError::ParseError(_))));
    }
}
