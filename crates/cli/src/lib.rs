//! Terminal output helpers for Boofer tools
//!
//! Provides consistent status lines, headers and key/value rows.

#![warn(missing_docs)]

pub mod output;
