use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::capture::MediaDirs;
use crate::constants::DEFAULT_DB_NAME;
use crate::error::ConfigError;

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_db_name() -> String {
    DEFAULT_DB_NAME.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Application configuration file structure (TOML)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Directory holding the database and lock file (default: data)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Database file stem, stored as `<data_dir>/<db_name>.sqlite` (default: context_monitoring)
    #[serde(default = "default_db_name")]
    pub db_name: String,
    /// Where heart-rate videos are written (default: <data_dir>/movies)
    pub video_dir: Option<PathBuf>,
    /// Where respiratory audio is written (default: <data_dir>/music)
    pub audio_dir: Option<PathBuf>,
    /// Default log filter when RUST_LOG is unset (default: info)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            db_name: default_db_name(),
            video_dir: None,
            audio_dir: None,
            log_level: default_log_level(),
        }
    }
}

impl AppConfig {
    /// Read and validate a TOML config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: AppConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Config file if given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Validate the database name
    ///
    /// The name becomes part of file names, so it must be non-empty and free of path separators.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.db_name.trim().is_empty() {
            return Err(ConfigError::Invalid("db_name must not be empty".to_string()));
        }
        if self.db_name.contains(['/', '\\']) || self.db_name == ".." || self.db_name == "." {
            return Err(ConfigError::Invalid(format!(
                "db_name '{}' must be a plain file name",
                self.db_name
            )));
        }
        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        crate::db::database_path(&self.data_dir, &self.db_name)
    }

    pub fn media_dirs(&self) -> MediaDirs {
        MediaDirs {
            video_dir: self
                .video_dir
                .clone()
                .unwrap_or_else(|| self.data_dir.join("movies")),
            audio_dir: self
                .audio_dir
                .clone()
                .unwrap_or_else(|| self.data_dir.join("music")),
        }
    }
}
