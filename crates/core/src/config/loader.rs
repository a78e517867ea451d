//! Configuration file loading

use super::schema::ConfigSchema;
use crate::error::{Error, Result};
use crate::validation::{ValidationResult, Validator};
use std::path::{Path, PathBuf};

/// Configuration wrapper
#[derive(Debug, Clone)]
pub struct Config {
    pub schema: ConfigSchema,
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file path or use defaults
    ///
    /// An explicit path must exist; discovery falls back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) if !p.exists() => return Err(Error::config_not_found(p)),
            Some(p) => Some(p.to_path_buf()),
            None => find_config_file(),
        };

        let schema = if let Some(ref p) = config_path {
            load_config_file(p)?
        } else {
            ConfigSchema::default()
        };

        let config = Self {
            schema,
            path: config_path,
        };
        config.validate().to_result()?;
        Ok(config)
    }

    /// Load with defaults only (no file)
    pub fn defaults() -> Self {
        Self {
            schema: ConfigSchema::default(),
            path: None,
        }
    }

    /// Check values that serde cannot constrain
    pub fn validate(&self) -> ValidationResult {
        let app = &self.schema.app;
        Validator::new()
            .required("app.package_name", &app.package_name)
            .pattern(
                "app.package_name",
                &app.package_name,
                r"^[a-zA-Z][a-zA-Z0-9_]*(\.[a-zA-Z][a-zA-Z0-9_]*)+$",
                "a dotted Java package name",
            )
            .required("app.settings_channel", &app.settings_channel)
            .range("app.min_sdk", app.min_sdk, 1, 99)
            .one_of(
                "rules.environment",
                &self.schema.rules.environment,
                &["development", "staging", "production"],
            )
            .validate()
    }
}

/// Find configuration file in standard locations
fn find_config_file() -> Option<PathBuf> {
    let candidates = [".boofer.toml", "boofer.toml", ".config/boofer.toml"];

    candidates
        .iter()
        .map(PathBuf::from)
        .find(|candidate| candidate.exists())
}

/// Load and parse a TOML configuration file
fn load_config_file(path: &Path) -> Result<ConfigSchema> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;

    toml::from_str(&content).map_err(|e| {
        Error::config(format!("Failed to parse config file {}: {}", path.display(), e))
            .with_source(e)
    })
}
