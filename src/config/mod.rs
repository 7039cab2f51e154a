// Required external crates for configuration management and serialization
use serde::Deserialize;
use std::path::{Path, PathBuf};
use config::{Config, ConfigError, Environment, File};

/// Configuration for the vocabulary resource
#[derive(Debug, Deserialize, Clone)]
pub struct VocabularyConfig {
    /// http(s) URL of the metadata resource, or a local file path
    pub source: String,
    /// Timeout for fetching a remote vocabulary, in seconds
    pub fetch_timeout_secs: u64,
}

/// Configuration for the model artifacts
#[derive(Debug, Deserialize, Clone)]
pub struct ModelConfig {
    /// Directory where model artifacts are stored
    pub directory: PathBuf,
    /// LSTM artifact file, relative to `directory`
    pub lstm: PathBuf,
    /// RNN artifact file, relative to `directory`
    pub rnn: PathBuf,
}

impl ModelConfig {
    /// Full path of the LSTM artifact
    pub fn lstm_path(&self) -> PathBuf {
        self.directory.join(&self.lstm)
    }

    /// Full path of the RNN artifact
    pub fn rnn_path(&self) -> PathBuf {
        self.directory.join(&self.rnn)
    }
}

/// Configuration for the HTTP server
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,
    /// Port number to listen on
    pub port: u16,
}

/// Configuration for application logging
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Log level (debug, info, warn, error)
    pub level: String,
    /// Optional log directory; logs go to stdout when unset
    pub file: Option<PathBuf>,
}

/// Main settings struct that contains all configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub vocabulary: VocabularyConfig,
    pub models: ModelConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

impl Settings {
    /// Creates a new Settings instance from `./config` in the current directory.
    pub fn new() -> Result<Self, ConfigError> {
        let config_dir = std::env::current_dir()
            .map_err(|e| ConfigError::Message(
                format!("Failed to get current directory: {}", e)
            ))?
            .join("config");

        Self::from_dir(&config_dir)
    }

    /// Loads settings from a config directory in the following order of
    /// precedence (highest to lowest):
    /// 1. Environment variables prefixed with REELSENSE_ (nested keys use `__`)
    /// 2. Local config file (local.toml) if present
    /// 3. Default config file (default.toml)
    pub fn from_dir(config_dir: &Path) -> Result<Self, ConfigError> {
        if !config_dir.exists() {
            return Err(ConfigError::Message(
                format!("Config directory not found at: {}", config_dir.display())
            ));
        }

        let default_config = config_dir.join("default.toml");
        if !default_config.exists() {
            return Err(ConfigError::Message(
                format!("Default configuration file not found at: {}", default_config.display())
            ));
        }

        let local_config = config_dir.join("local.toml");

        // Convert paths to strings and keep them alive
        let default_config_path = default_config.to_string_lossy();
        let local_config_path = local_config.to_string_lossy();

        let settings = Config::builder()
            .add_source(File::with_name(&default_config_path))
            .add_source(File::with_name(&local_config_path).required(false))
            .add_source(Environment::with_prefix("REELSENSE").separator("__"))
            .build()?
            .try_deserialize::<Settings>()?;

        settings.validate()?;

        Ok(settings)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<(), ConfigError> {
        if self.vocabulary.source.trim().is_empty() {
            return Err(ConfigError::Message(
                "vocabulary.source must not be empty".to_string()
            ));
        }

        if self.vocabulary.fetch_timeout_secs == 0 {
            return Err(ConfigError::Message(
                "vocabulary.fetch_timeout_secs must be greater than 0".to_string()
            ));
        }

        if self.models.lstm.as_os_str().is_empty() || self.models.rnn.as_os_str().is_empty() {
            return Err(ConfigError::Message(
                "models.lstm and models.rnn must name an artifact file".to_string()
            ));
        }

        if !(1..=65535).contains(&self.server.port) {
            return Err(ConfigError::Message(
                format!("Port must be between 1 and 65535, got: {}", self.server.port)
            ));
        }

        match self.logging.level.to_lowercase().as_str() {
            "error" | "warn" | "info" | "debug" | "trace" => Ok(()),
            _ => Err(ConfigError::Message(
                format!("Invalid logging level: {}. Must be one of: error, warn, info, debug, trace",
                    self.logging.level)
            )),
        }?;

        // Create log directory if configured and doesn't exist
        if let Some(log_dir) = &self.logging.file {
            if !log_dir.exists() {
                std::fs::create_dir_all(log_dir).map_err(|e| {
                    ConfigError::Message(format!(
                        "Failed to create log directory at {}: {}",
                        log_dir.display(), e
                    ))
                })?;
            }
        }

        Ok(())
    }
}
