//! Configuration loading and root folder resolution
//!
//! Bootstrap configuration is a small TOML file. Sources are consulted in
//! priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file in the user config directory
//! 4. Compiled defaults (fallback)
//!
//! A missing config file is never fatal: a warning is logged and compiled
//! defaults are used.

use crate::{time, Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "CELLAR_CONFIG";

/// Environment variable naming the data root folder
pub const ROOT_FOLDER_ENV_VAR: &str = "CELLAR_ROOT_FOLDER";

/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "cellar.db";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Data folder holding the database (optional)
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub advisor: AdvisorSettings,

    #[serde(default)]
    pub ai: AiSettings,
}

/// Logging configuration; logs always go to stderr
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Tunables for the readiness and recommendation engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisorSettings {
    /// Shortlist size returned by a recommendation
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// How long a shown bottle stays in rotation state
    #[serde(default = "default_rotation_window_days")]
    pub rotation_window_days: i64,

    /// Bottles opened within this many days are penalized
    #[serde(default = "default_history_window_days")]
    pub history_window_days: i64,

    /// Cached structural profiles older than this are regenerated
    #[serde(default = "default_profile_max_age_days")]
    pub profile_max_age_days: i64,
}

impl Default for AdvisorSettings {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            rotation_window_days: default_rotation_window_days(),
            history_window_days: default_history_window_days(),
            profile_max_age_days: default_profile_max_age_days(),
        }
    }
}

/// AI profile generator connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiSettings {
    /// Profile generation endpoint; AI generation is disabled when absent
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Bearer token sent with each request
    #[serde(default)]
    pub api_key: Option<String>,

    /// Per-request timeout
    #[serde(default = "default_ai_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            timeout_ms: default_ai_timeout_ms(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_top_k() -> usize {
    3
}

fn default_rotation_window_days() -> i64 {
    3
}

fn default_history_window_days() -> i64 {
    7
}

fn default_profile_max_age_days() -> i64 {
    30
}

fn default_ai_timeout_ms() -> u64 {
    8000
}

impl TomlConfig {
    /// Parse and validate a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate TOML content
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the engine cannot honor
    pub fn validate(&self) -> Result<()> {
        let advisor = &self.advisor;
        if advisor.top_k == 0 {
            return Err(Error::Config("advisor.top_k must be at least 1".to_string()));
        }
        for (key, value) in [
            ("rotation_window_days", advisor.rotation_window_days),
            ("history_window_days", advisor.history_window_days),
            ("profile_max_age_days", advisor.profile_max_age_days),
        ] {
            if !(1..=time::MAX_WINDOW_DAYS).contains(&value) {
                return Err(Error::Config(format!(
                    "advisor.{} must be between 1 and {}, got {}",
                    key,
                    time::MAX_WINDOW_DAYS,
                    value
                )));
            }
        }
        if self.ai.timeout_ms == 0 {
            return Err(Error::Config("ai.timeout_ms must be greater than 0".to_string()));
        }
        Ok(())
    }
}

/// Locate the config file, if any
///
/// CLI argument > `CELLAR_CONFIG` > `<config dir>/cellar/config.toml`.
/// Returns `None` when no candidate exists.
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    dirs::config_dir()
        .map(|d| d.join("cellar").join("config.toml"))
        .filter(|p| p.exists())
}

/// Load configuration with graceful degradation
///
/// An explicitly named file that cannot be read or parsed is an error; an
/// absent default file falls back to compiled defaults.
pub fn load_config(cli_arg: Option<&Path>) -> Result<TomlConfig> {
    match resolve_config_path(cli_arg) {
        Some(path) if path.exists() => {
            info!("Loading config from {}", path.display());
            TomlConfig::load(&path)
        }
        Some(path) => Err(Error::Config(format!(
            "Config file not found: {}",
            path.display()
        ))),
        None => {
            warn!("No config file found, using compiled defaults");
            Ok(TomlConfig::default())
        }
    }
}

/// Data root folder resolution
///
/// 1. Command-line argument
/// 2. `CELLAR_ROOT_FOLDER` environment variable
/// 3. `root_folder` from the TOML config
/// 4. OS-dependent compiled default
#[derive(Debug, Clone, Default)]
pub struct RootFolderResolver {
    cli_arg: Option<PathBuf>,
    toml_value: Option<PathBuf>,
}

impl RootFolderResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cli_arg(mut self, path: Option<PathBuf>) -> Self {
        self.cli_arg = path;
        self
    }

    pub fn with_toml_value(mut self, path: Option<PathBuf>) -> Self {
        self.toml_value = path;
        self
    }

    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.cli_arg {
            debug!("Root folder from command line: {}", path.display());
            return path.clone();
        }

        if let Ok(path) = std::env::var(ROOT_FOLDER_ENV_VAR) {
            if !path.is_empty() {
                debug!("Root folder from {}: {}", ROOT_FOLDER_ENV_VAR, path);
                return PathBuf::from(path);
            }
        }

        if let Some(path) = &self.toml_value {
            debug!("Root folder from config file: {}", path.display());
            return path.clone();
        }

        default_root_folder()
    }
}

/// OS-dependent default root folder
pub fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("cellar"))
        .unwrap_or_else(|| PathBuf::from("./cellar_data"))
}

/// Creates the root folder and locates files inside it
#[derive(Debug, Clone)]
pub struct RootFolderInitializer {
    root: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn ensure_directory_exists(&self) -> Result<()> {
        if !self.root.exists() {
            std::fs::create_dir_all(&self.root)?;
            info!("Created root folder: {}", self.root.display());
        }
        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        self.root.join(DATABASE_FILE)
    }
}
