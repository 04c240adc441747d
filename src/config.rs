// Configuration loading and parsing (stat-tracker.toml).

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_CONFIG_PATH: &str = "stat-tracker.toml";

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },
}

// ---------------------------------------------------------------------------
// TOML structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the whole stat-tracker.toml file.
#[derive(Debug, Clone, Deserialize)]
struct ConfigFile {
    league: LeagueSection,
    #[serde(default)]
    paths: PathsSection,
}

#[derive(Debug, Clone, Deserialize)]
struct LeagueSection {
    name: String,
    season: String,
}

#[derive(Debug, Clone, Deserialize)]
struct PathsSection {
    #[serde(default = "default_games_dir")]
    games_dir: String,
    #[serde(default = "default_output_dir")]
    output_dir: String,
}

impl Default for PathsSection {
    fn default() -> Self {
        PathsSection {
            games_dir: default_games_dir(),
            output_dir: default_output_dir(),
        }
    }
}

fn default_games_dir() -> String {
    "raw_games".to_string()
}

fn default_output_dir() -> String {
    "output".to_string()
}

// ---------------------------------------------------------------------------
// Public config
// ---------------------------------------------------------------------------

/// Assembled CLI configuration: the league/season every ingested file is
/// attributed to, plus input and output directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub league: String,
    pub season: String,
    pub games_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl Config {
    /// Load and validate a config file.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let file: ConfigFile = toml::from_str(&raw).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
        Config::from_file(file)
    }

    fn from_file(file: ConfigFile) -> Result<Config, ConfigError> {
        if file.league.name.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                field: "league.name".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        if file.league.season.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                field: "league.season".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        Ok(Config {
            league: file.league.name.trim().to_string(),
            season: file.league.season.trim().to_string(),
            games_dir: PathBuf::from(file.paths.games_dir),
            output_dir: PathBuf::from(file.paths.output_dir),
        })
    }
}
