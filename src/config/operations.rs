//! Config loading and validation.

use super::model::Config;
use crate::error::{LittlejohnError, Result};
use std::path::Path;
use tracing_subscriber::EnvFilter;

impl Config {
    /// Load config from a YAML file.
    ///
    /// # Returns
    ///
    /// * `Ok(Config)` - Successfully loaded and validated config
    /// * `Err(LittlejohnError::UserError)` - Read error, parse error or validation failure
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            LittlejohnError::UserError(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Parse config from a YAML string. An empty document yields the defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = if yaml.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(yaml).map_err(|e| {
                LittlejohnError::UserError(format!("failed to parse config YAML: {}", e))
            })?
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate config values.
    ///
    /// - `jobs` must be positive
    /// - `output_buffer` must be positive
    /// - `log_level` must be a valid tracing filter directive
    pub fn validate(&self) -> Result<()> {
        if self.jobs == 0 {
            return Err(LittlejohnError::UserError(
                "config validation failed: jobs must be greater than 0".to_string(),
            ));
        }

        if self.output_buffer == 0 {
            return Err(LittlejohnError::UserError(
                "config validation failed: output_buffer must be greater than 0".to_string(),
            ));
        }

        if let Err(e) = EnvFilter::try_new(&self.log_level) {
            return Err(LittlejohnError::UserError(format!(
                "config validation failed: invalid log_level '{}': {}",
                self.log_level, e
            )));
        }

        Ok(())
    }

    /// Output path, or `None` when results go to standard output.
    pub fn output_path(&self) -> Option<&Path> {
        if self.output.is_empty() {
            None
        } else {
            Some(Path::new(&self.output))
        }
    }
}
