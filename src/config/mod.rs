//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (service defaults, polling cadence, export names)
//! - CLI option types and parsing

mod constants;
mod types;

// Re-export all constants
pub use constants::*;
pub use types::{Cli, Command, Config, ExportArgs, LogFormat, LogLevel, ServiceArgs};
