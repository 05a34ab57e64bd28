use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// User settings stored in settings.toml
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Extension of timelog files
    pub file_ext: String,
    /// Base name used by `timelog new`
    pub file_name: String,
    /// Rows shown in the recent records table
    pub recent_records: usize,
    /// Verbose logging (debug level by default)
    pub debug: bool,
    /// Override for the log directory
    pub log_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            file_ext: "timelog".to_string(),
            file_name: "时光日志".to_string(),
            recent_records: 5,
            debug: false,
            log_dir: None,
        }
    }
}

impl Settings {
    /// Parse settings from TOML
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let settings: Self = toml::from_str(input).context("failed to parse settings TOML")?;
        if settings.file_ext.is_empty() || settings.file_ext.contains('.') {
            anyhow::bail!("file_ext must be a bare extension, got {:?}", settings.file_ext);
        }
        Ok(settings)
    }

    /// Load settings from `path`; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read settings at {}", path.display()))?;
        Self::from_toml_str(&raw).with_context(|| format!("invalid settings at {}", path.display()))
    }
}

/// Location of settings.toml
///
/// Precedence: `TIMELOG_CONFIG` env var > platform config dir.
pub fn settings_path() -> PathBuf {
    if let Ok(path) = std::env::var("TIMELOG_CONFIG") {
        return PathBuf::from(path);
    }
    dirs::config_dir()
        .map(|dir| dir.join("timelog"))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("settings.toml")
}
