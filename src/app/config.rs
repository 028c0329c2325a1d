//! Configuration for the emulator and the headless runner

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::emulator::{DEFAULT_TAB_SIZE, MAX_COLUMNS, MAX_ROWS};

/// Emulator configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmulatorConfig {
    /// Terminal type, used as the key mapping prefix
    pub term_type: String,
    /// Initial grid width
    pub columns: usize,
    /// Initial grid height
    pub rows: usize,
    pub tab_size: usize,
    pub auto_wrap: bool,
    /// Default `tracing` filter when `RUST_LOG` is not set
    pub log_filter: String,
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        Self {
            term_type: "xterm".to_string(),
            columns: 80,
            rows: 24,
            tab_size: DEFAULT_TAB_SIZE,
            auto_wrap: true,
            log_filter: "warn".to_string(),
        }
    }
}

impl EmulatorConfig {
    /// Load and validate configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: EmulatorConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration from the default location or return the default
    pub fn load_or_default() -> Self {
        let Some(path) = default_config_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load(&path) {
            Ok(config) => {
                debug!("Loaded configuration from {}", path.display());
                config
            }
            Err(e) => {
                warn!("Ignoring configuration {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.columns == 0 || self.rows == 0 {
            return Err(ConfigError::Invalid(format!(
                "grid size {}x{} must not be empty",
                self.columns, self.rows
            )));
        }
        if self.columns > MAX_COLUMNS || self.rows > MAX_ROWS {
            return Err(ConfigError::Invalid(format!(
                "grid size {}x{} exceeds {}x{}",
                self.columns, self.rows, MAX_COLUMNS, MAX_ROWS
            )));
        }
        if self.tab_size == 0 {
            return Err(ConfigError::Invalid("tab_size must be at least 1".to_string()));
        }
        if self.term_type.trim().is_empty() {
            return Err(ConfigError::Invalid("term_type must not be empty".to_string()));
        }
        Ok(())
    }
}

/// `$XDG_CONFIG_HOME/vtx-terminal/config.json`, or under `$HOME/.config`
pub fn default_config_path() -> Option<PathBuf> {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))?;
    Some(base.join("vtx-terminal").join("config.json"))
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
