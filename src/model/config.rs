use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration from config.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThreadConfig {
    #[serde(default)]
    pub user: UserConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

/// Identity stamped on comments created from this machine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(default = "default_user_id")]
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl Default for UserConfig {
    fn default() -> Self {
        UserConfig {
            id: default_user_id(),
            display_name: None,
        }
    }
}

impl UserConfig {
    /// Display name, falling back to the user id
    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.id)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory holding comments.json. Absent = XDG data dir.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// chrono format string for comment timestamps
    #[serde(default = "default_date_format")]
    pub date_format: String,
    /// Spaces per reply level
    #[serde(default = "default_indent")]
    pub indent: usize,
    /// Outline lines are truncated to this many terminal cells (0 = no limit)
    #[serde(default = "default_max_width")]
    pub max_width: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            date_format: default_date_format(),
            indent: default_indent(),
            max_width: default_max_width(),
        }
    }
}

fn default_user_id() -> String {
    std::env::var("USER").unwrap_or_else(|_| "me".to_string())
}

fn default_date_format() -> String {
    "%H:%M:%S - %Y-%m-%d".to_string()
}

fn default_indent() -> usize {
    2
}

fn default_max_width() -> usize {
    100
}
