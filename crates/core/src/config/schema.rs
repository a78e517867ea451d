//! Configuration schema definitions
//!
//! Every field has a default so an empty or missing `.boofer.toml` is valid.

use serde::{Deserialize, Serialize};

/// Root configuration schema
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigSchema {
    #[serde(default)]
    pub app: AppConfig,

    #[serde(default)]
    pub rules: RulesConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Android application identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application package name, used in settings intents
    #[serde(default = "default_package_name")]
    pub package_name: String,

    /// Name of the method channel exposing the settings bridge
    #[serde(default = "default_settings_channel")]
    pub settings_channel: String,

    /// Lowest supported Android API level
    #[serde(default = "default_min_sdk")]
    pub min_sdk: u32,

    /// Path to the release signing properties
    #[serde(default = "default_key_properties")]
    pub key_properties: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            package_name: default_package_name(),
            settings_channel: default_settings_channel(),
            min_sdk: default_min_sdk(),
            key_properties: default_key_properties(),
        }
    }
}

fn default_package_name() -> String {
    "com.shaadow.boofer.android".to_string()
}

fn default_settings_channel() -> String {
    "com.shaadow.boofer/settings".to_string()
}

// Firebase Messaging needs Android 6.0
fn default_min_sdk() -> u32 {
    23
}

fn default_key_properties() -> String {
    "android/key.properties".to_string()
}

/// Security rules deployment configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RulesConfig {
    /// Production rules file
    #[serde(default = "default_production_rules")]
    pub production: String,

    /// Temporary allow-all rules file used for local debugging
    #[serde(default = "default_testing_rules")]
    pub testing: String,

    /// Environment the rules are deployed to: development, staging, production
    #[serde(default = "default_environment")]
    pub environment: String,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            production: default_production_rules(),
            testing: default_testing_rules(),
            environment: default_environment(),
        }
    }
}

fn default_production_rules() -> String {
    "firebase/firestore.rules".to_string()
}

fn default_testing_rules() -> String {
    "firebase/firestore.testing.rules".to_string()
}

fn default_environment() -> String {
    "production".to_string()
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Show the event target in log lines
    #[serde(default)]
    pub show_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            show_target: false,
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}
