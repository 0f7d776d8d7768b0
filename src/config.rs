//! Application configuration.
//!
//! Configuration is loaded from a TOML file at:
//! 1. the `--config` command-line path
//! 2. `$BOUNCESCAN_CONFIG` (environment variable)
//! 3. `~/.config/bouncescan/config.toml` (Linux/macOS)
//!    `%APPDATA%\bouncescan\config.toml` (Windows)
//! 4. Built-in defaults
//!
//! `$BOUNCESCAN_PASSWORD` overrides `mailbox.password` so secrets can stay
//! out of the file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{BounceError, Result};

/// Environment variable that points at the config file.
pub const CONFIG_ENV: &str = "BOUNCESCAN_CONFIG";

/// Environment variable that overrides the mailbox password.
pub const PASSWORD_ENV: &str = "BOUNCESCAN_PASSWORD";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    /// Remote mailbox to scan.
    pub mailbox: MailboxConfig,
    pub report: ReportConfig,
}

/// General behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Override cache directory for logs.
    pub cache_dir: Option<PathBuf>,
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub log_level: String,
}

/// IMAP connection settings.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MailboxConfig {
    pub host: String,
    /// IMAPS port (implicit TLS).
    pub port: u16,
    pub user: String,
    pub password: String,
    /// Folder opened read-only.
    pub folder: String,
}

impl std::fmt::Debug for MailboxConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailboxConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("folder", &self.folder)
            .finish()
    }
}

/// Report output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Print headers and body of every `Unknown` bounce to stderr.
    pub print_unknown_details: bool,
}

// ── Default implementations ─────────────────────────────────────

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            cache_dir: None,
            log_level: "warn".to_string(),
        }
    }
}

impl Default for MailboxConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 993,
            user: String::new(),
            password: String::new(),
            folder: "INBOX".to_string(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            print_unknown_details: true,
        }
    }
}

// ── Load ────────────────────────────────────────────────────────

/// Load configuration, searching standard locations.
///
/// Returns the default configuration if no file is found or on parse error.
pub fn load_config(explicit: Option<&Path>) -> Config {
    let mut config = match config_file_path(explicit).filter(|path| path.exists()) {
        Some(path) => read_config(&path).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Using default config");
            Config::default()
        }),
        None => Config::default(),
    };

    if let Ok(password) = std::env::var(PASSWORD_ENV) {
        config.mailbox.password = password;
    }
    config
}

/// Read and parse one config file.
pub fn read_config(path: &Path) -> Result<Config> {
    let contents = std::fs::read_to_string(path).map_err(|e| BounceError::io(path, e))?;
    let config = toml::from_str::<Config>(&contents).map_err(|e| BounceError::Config {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    tracing::info!(path = %path.display(), "Loaded config");
    Ok(config)
}

/// Determine the config file path (explicit path, then env var, then standard dirs).
pub fn config_file_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Ok(env_path) = std::env::var(CONFIG_ENV) {
        return Some(PathBuf::from(env_path));
    }
    dirs::config_dir().map(|d| d.join("bouncescan").join("config.toml"))
}

/// Return the cache directory for logs.
pub fn cache_dir(config: &Config) -> PathBuf {
    if let Some(ref dir) = config.general.cache_dir {
        return dir.clone();
    }
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("bouncescan")
}
