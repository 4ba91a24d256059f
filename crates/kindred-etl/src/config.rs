use anyhow::{Context, Result};
use confyg::{env, Confygery};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::driver::{RangeSource, RankOptions};

/// Configuration for kindred.
///
/// Configuration is loaded from multiple sources with the following priority:
/// 1. CLI arguments (highest priority)
/// 2. Environment variables (KINDRED_* prefix)
/// 3. Config file (~/.config/kindred/config.toml)
/// 4. Built-in defaults (lowest priority)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the SQLite database.
    ///
    /// Can be set via:
    /// - CLI: --db /path/to/db
    /// - ENV: KINDRED_DATABASE_PATH
    /// - Config: database_path = "/path/to/db"
    /// - Default: ~/.local/share/kindred/kindred.db
    #[serde(default = "default_db_path")]
    pub database_path: PathBuf,

    /// Number of related artists kept per artist.
    ///
    /// Can be set via:
    /// - CLI: kindred rank --k 10
    /// - ENV: KINDRED_NEIGHBORS
    /// - Config: neighbors = 10
    #[serde(default = "default_neighbors")]
    pub neighbors: usize,

    /// Where normalization ranges come from: `artists` derives them from
    /// the averaged artist vectors, `tracks` from the individual tracks of
    /// the latest snapshot.
    #[serde(default)]
    pub range_source: RangeSource,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logger settings, applied once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_true")]
    pub coloured: bool,
    #[serde(default)]
    pub report_caller: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            coloured: true,
            report_caller: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: default_db_path(),
            neighbors: default_neighbors(),
            range_source: RangeSource::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// Searches for config file at: ~/.config/kindred/config.toml
    /// Reads environment variables with KINDRED_ prefix.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load() -> Result<Self> {
        let config_path = config_file_path();

        let mut builder = Confygery::new().context("Failed to create config builder")?;

        if config_path.exists() {
            let path_str = config_path
                .to_str()
                .ok_or_else(|| anyhow::anyhow!("Config path contains invalid UTF-8"))?;
            builder
                .add_file(path_str)
                .context("Failed to load config file")?;
        }

        let env_opts = env::Options::with_top_level("kindred");
        builder
            .add_env(env_opts)
            .context("Failed to load environment variables")?;

        let config: Self = builder.build().context("Failed to build configuration")?;

        Ok(config)
    }

    /// Load configuration with custom database path.
    ///
    /// This is used when the --db CLI flag is provided.
    pub fn load_with_db_path(db_path: PathBuf) -> Result<Self> {
        let mut config = Self::load()?;
        config.database_path = db_path;
        Ok(config)
    }

    /// Ranking options as configured.
    #[must_use]
    pub fn rank_options(&self) -> RankOptions {
        RankOptions {
            k: self.neighbors,
            range_source: self.range_source,
        }
    }
}

fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("kindred")
        .join("kindred.db")
}

const fn default_neighbors() -> usize {
    kindred_similarity::DEFAULT_K
}

fn default_log_level() -> String {
    "info".to_string()
}

const fn default_true() -> bool {
    true
}

/// Get the config file path.
///
/// Returns:
/// - Linux: ~/.config/kindred/config.toml
/// - macOS: ~/Library/Application Support/kindred/config.toml
/// - Windows: %APPDATA%\kindred\config.toml
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("kindred")
        .join("config.toml")
}

/// Get the example config file content.
pub fn example_config() -> &'static str {
    r#"# Kindred Configuration File
#
# Configuration is loaded from multiple sources with the following priority:
# 1. CLI arguments (highest priority)
# 2. Environment variables (KINDRED_* prefix)
# 3. This config file
# 4. Built-in defaults (lowest priority)

# Path to the SQLite database
#
# Holds the ingested snapshots and the related-artist table
#
# Can also be set via:
# - CLI: kindred --db /custom/path.db rank
# - Environment: KINDRED_DATABASE_PATH=/custom/path.db
#
# Default: Platform-specific data directory
#database_path = "/path/to/custom/kindred.db"

# Related artists kept per artist
neighbors = 5

# Normalization ranges: "artists" (per-artist averages) or "tracks"
# (individual tracks of the latest snapshot)
range_source = "artists"

[logging]
level = "info"
coloured = true
report_caller = false
"#
}

/// Create default config file if it doesn't exist.
///
/// Returns true if a new file was created, false if it already existed.
pub fn ensure_config_file() -> Result<bool> {
    let config_path = config_file_path();

    if config_path.exists() {
        return Ok(false);
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    std::fs::write(&config_path, example_config()).context("Failed to write config file")?;

    Ok(true)
}
