//! Configuration file loading and parsing
//!
//! Loads configuration from `~/.config/equipment-portal/config.toml`

use anyhow::Context;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const APP_NAME: &str = "高校大型仪器设备共享服务平台";

/// Main configuration file structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    pub app: AppConfig,
    pub router: RouterConfig,
    pub ui: UiConfig,
    pub log: LogConfig,
}

/// Application identity and start page
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Shown after the page title in the window title
    pub name: String,
    pub title_separator: String,
    /// Path opened at startup
    pub initial_path: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: APP_NAME.to_string(),
            title_separator: portal_nav::title::DEFAULT_SEPARATOR.to_string(),
            initial_path: "/".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    pub max_history: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            max_history: portal_nav::router::DEFAULT_MAX_HISTORY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Event poll interval in milliseconds
    pub tick_rate_ms: u64,
    /// Also write the title to the terminal window
    pub terminal_title: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: 100,
            terminal_title: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `tracing` filter directive, e.g. `info` or `portal_nav=debug`
    pub level: String,
    /// Log file; defaults to the cache directory
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl PortalConfig {
    /// Get the config directory path (~/.config/equipment-portal)
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("equipment-portal"))
    }

    /// Get the config file path (~/.config/equipment-portal/config.toml)
    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("config.toml"))
    }

    /// Load from an explicit path, or from the default location if a file
    /// exists there. Defaults otherwise.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        match explicit {
            Some(path) => Self::load_from(path),
            None => match Self::config_path() {
                Some(path) if path.exists() => Self::load_from(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: PortalConfig = toml::from_str(&content)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = PortalConfig::default();
        assert_eq!(config.app.name, APP_NAME);
        assert_eq!(config.app.title_separator, " - ");
        assert_eq!(config.app.initial_path, "/");
        assert_eq!(config.router.max_history, 50);
        assert_eq!(config.ui.tick_rate_ms, 100);
        assert!(config.ui.terminal_title);
        assert_eq!(config.log.level, "info");
        assert!(config.log.file.is_none());
    }

    #[test]
    fn test_parse_partial_config() {
        let toml_content = r#"
[app]
initial_path = "/equipment"

[ui]
terminal_title = false
"#;
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(toml_content.as_bytes()).unwrap();

        let config = PortalConfig::load_from(file.path()).unwrap();
        assert_eq!(config.app.initial_path, "/equipment");
        assert_eq!(config.app.name, APP_NAME);
        assert!(!config.ui.terminal_title);
        assert_eq!(config.ui.tick_rate_ms, 100);
    }

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[app]
name = "Instrument Portal"
title_separator = " | "
initial_path = "/reservations"

[router]
max_history = 5

[ui]
tick_rate_ms = 250
terminal_title = true

[log]
level = "debug"
file = "/tmp/portal.log"
"#;
        let config: PortalConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.app.name, "Instrument Portal");
        assert_eq!(config.router.max_history, 5);
        assert_eq!(config.ui.tick_rate_ms, 250);
        assert_eq!(config.log.file, Some(PathBuf::from("/tmp/portal.log")));
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[router]\nmax_history = \"many\"\n").unwrap();
        assert!(PortalConfig::load_from(file.path()).is_err());
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        assert!(PortalConfig::load(Some(&missing)).is_err());
    }
}
