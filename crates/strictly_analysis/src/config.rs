//! Engine configuration: command line, search budget and stream limits.

use crate::error::ConfigError;
use derive_getters::Getters;
use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Environment variable naming the engine executable.
pub const ENGINE_PATH_VAR: &str = "ULTIMATTT_PATH";

/// Configuration for the external analysis engine.
#[derive(Debug, Clone, PartialEq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_")]
pub struct EngineConfig {
    /// Command used to start the engine (program and leading arguments).
    /// `analyze <position> --limit <time> --table-mem <size>` is appended.
    #[serde(default = "default_command")]
    command: Vec<String>,

    /// Time budget passed as `--limit` (e.g. "2m").
    #[serde(default = "default_time_limit")]
    time_limit: String,

    /// Transposition table size passed as `--table-mem` (e.g. "10M").
    #[serde(default = "default_table_mem")]
    table_mem: String,

    /// Evaluations are published only once depth exceeds this.
    #[serde(default = "default_publish_depth")]
    publish_depth: u32,

    /// Reading stops after the first report at or beyond this depth.
    #[serde(default = "default_max_depth")]
    max_depth: u32,

    /// Reported values are clamped to `[-eval_clamp, eval_clamp]`.
    #[serde(default = "default_eval_clamp")]
    eval_clamp: f64,
}

fn default_command() -> Vec<String> {
    vec!["ultimattt".to_string()]
}

fn default_time_limit() -> String {
    "2m".to_string()
}

fn default_table_mem() -> String {
    "10M".to_string()
}

fn default_publish_depth() -> u32 {
    8
}

fn default_max_depth() -> u32 {
    30
}

fn default_eval_clamp() -> f64 {
    100.0
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            command: default_command(),
            time_limit: default_time_limit(),
            table_mem: default_table_mem(),
            publish_depth: default_publish_depth(),
            max_depth: default_max_depth(),
            eval_clamp: default_eval_clamp(),
        }
    }
}

impl EngineConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        info!(command = ?config.command, "Config loaded successfully");
        Ok(config)
    }

    /// Loads the file if it exists, falls back to defaults otherwise, then
    /// applies the engine path from the environment.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config = if path.as_ref().exists() {
            Self::from_file(path)?
        } else {
            info!("Config file not found, using defaults");
            Self::default()
        };
        Ok(config.apply_env())
    }

    /// Replaces the engine program with `ULTIMATTT_PATH` when it is set.
    #[instrument(skip(self))]
    pub fn apply_env(self) -> Self {
        match std::env::var(ENGINE_PATH_VAR) {
            Ok(path) if !path.trim().is_empty() => {
                info!(path = %path, "Using engine from environment");
                self.with_command(vec![path])
            }
            _ => self,
        }
    }

    /// Checks the invariants the session relies on.
    #[instrument(skip(self))]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.command.is_empty() {
            return Err(ConfigError::new("Engine command must not be empty"));
        }
        if !(self.eval_clamp.is_finite() && self.eval_clamp > 0.0) {
            return Err(ConfigError::new(format!(
                "eval_clamp must be a positive number, got {}",
                self.eval_clamp
            )));
        }
        if self.max_depth <= self.publish_depth {
            return Err(ConfigError::new(format!(
                "max_depth ({}) must exceed publish_depth ({})",
                self.max_depth, self.publish_depth
            )));
        }
        Ok(())
    }

    /// Stream limits applied by every analysis session.
    pub fn limits(&self) -> StreamLimits {
        StreamLimits {
            publish_depth: self.publish_depth,
            max_depth: self.max_depth,
            eval_clamp: self.eval_clamp,
        }
    }
}

/// Depth thresholds and clamp applied while consuming engine reports.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StreamLimits {
    /// Evaluations are published only once depth exceeds this.
    pub publish_depth: u32,
    /// Reading stops after the first report at or beyond this depth.
    pub max_depth: u32,
    /// Reported values are clamped to `[-eval_clamp, eval_clamp]`.
    pub eval_clamp: f64,
}

impl Default for StreamLimits {
    fn default() -> Self {
        EngineConfig::default().limits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "time_limit = \"30s\"\ncommand = [\"/opt/ultimattt\", \"--quiet\"]").unwrap();

        let config = EngineConfig::from_file(file.path()).unwrap();
        assert_eq!(config.time_limit(), "30s");
        assert_eq!(config.command(), &["/opt/ultimattt", "--quiet"]);
        assert_eq!(config.table_mem(), "10M");
        assert_eq!(*config.max_depth(), 30);
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "this is not toml !!!").unwrap();
        assert!(EngineConfig::from_file(file.path()).is_err());
    }

    #[test]
    fn test_validate_rejects_inverted_depths() {
        let config = EngineConfig::default().with_max_depth(4);
        assert!(config.validate().is_err());
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_limits_defaults() {
        let limits = StreamLimits::default();
        assert_eq!(limits.publish_depth, 8);
        assert_eq!(limits.max_depth, 30);
        assert_eq!(limits.eval_clamp, 100.0);
    }
}
