//! Core utilities for Boofer platform tools
//!
//! This crate provides shared functionality used by the Android and
//! security-rules crates:
//!
//! - **Error handling**: structured errors with codes, context, and recovery suggestions
//! - **Configuration**: TOML-based configuration with defaults and validation
//! - **Validation**: fluent validators that collect every failure
//!
//! # Example
//!
//! ```rust,no_run
//! use boofer_core::config::Config;
//!
//! let config = Config::load(None).expect("invalid configuration");
//! println!("package: {}", config.schema.app.package_name);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
#[allow(missing_docs)]
pub mod error;
pub mod validation;

pub use error::{Error, ErrorCode, Result, ResultExt};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{exit_codes, Error, ErrorCode, Result, ResultExt};
    pub use crate::validation::{ValidationResult, Validator};
}
