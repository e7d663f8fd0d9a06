//! Application initialization.
//!
//! This module provides functions to initialize the shared resources of a run:
//! - Logger (plain or JSON, via `env_logger`)
//! - HTTP client for the analysis service
//!
//! All initialization functions return `InitializationError` on failure.

mod client;
mod logger;

// Re-export public API
pub use client::init_client;
pub use logger::init_logger_with;
