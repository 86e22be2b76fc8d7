//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `ncemacros.toml` in the working directory unless a path is
//! given. Every field has a sensible default so the default file is
//! optional. Environment variables take precedence over file values, and
//! command-line flags over both.

use std::path::Path;

use ncemacros_domain::id::MacroCount;
use ncemacros_domain::station::CommandStation;
use serde::Deserialize;

const DEFAULT_PATH: &str = "ncemacros.toml";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Macro set settings.
    pub provisioning: ProvisioningConfig,
    /// Database settings.
    pub database: DatabaseConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Which macros to provision.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProvisioningConfig {
    /// Command station whose macro table size is used by default.
    pub station: CommandStation,
    /// Explicit number of macros, overriding the station preset.
    pub macro_count: Option<u32>,
}

/// `SQLite` database configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL or file path.
    pub url: String,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `path`, or from `ncemacros.toml` if present,
    /// then apply environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly given file is missing, if the TOML
    /// file is malformed, or if an environment override is invalid.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::from_optional_file(Path::new(DEFAULT_PATH))?,
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(ConfigError::Parse)
    }

    fn from_optional_file(path: &Path) -> Result<Self, ConfigError> {
        match Self::from_file(path) {
            Err(ConfigError::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {
                Ok(Self::default())
            }
            other => other,
        }
    }

    fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(val) = lookup("NCEMACROS_STATION") {
            self.provisioning.station = val
                .parse::<CommandStation>()
                .map_err(|err| ConfigError::Validation(format!("NCEMACROS_STATION: {err}")))?;
        }
        if let Some(val) = lookup("NCEMACROS_MACRO_COUNT") {
            let count = val.parse::<u32>().map_err(|err| {
                ConfigError::Validation(format!("NCEMACROS_MACRO_COUNT: {err}"))
            })?;
            self.provisioning.macro_count = Some(count);
        }
        if let Some(val) = lookup("NCEMACROS_DATABASE_URL") {
            self.database.url = val;
        }
        if let Some(val) = lookup("NCEMACROS_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = lookup("RUST_LOG") {
            self.logging.filter = val;
        }
        Ok(())
    }

    /// Check semantic constraints once every source has been applied.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] for a zero or oversized macro
    /// count, or an empty database URL.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.macro_count()?;
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::Validation(
                "database url must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Number of macros to provision: the explicit count if set, the
    /// station preset otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if the explicit count is zero or
    /// larger than the macro address space.
    pub fn macro_count(&self) -> Result<MacroCount, ConfigError> {
        match self.provisioning.macro_count {
            None => Ok(self.provisioning.station.macro_count()),
            Some(0) => Err(ConfigError::Validation(
                "macro count must be positive".to_string(),
            )),
            Some(count) => {
                MacroCount::new(count).map_err(|err| ConfigError::Validation(err.to_string()))
            }
        }
    }

    /// Return the database URL in `sqlx`-compatible format.
    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database.url
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:ncemacros.db?mode=rwc".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "ncemacros=info".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
