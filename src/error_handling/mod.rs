//! Error handling.
//!
//! Errors are grouped by the component that surfaces them:
//! - **Initialization**: logger and HTTP client setup
//! - **Api**: one failed call to the analysis service
//! - **Job**: submission and polling failures that end a job
//! - **Export**: failures that abort an export before any file is written
//! - **RenderingUnavailable**: a missing chart snapshot, recovered per report section

mod types;

// Re-export public API
pub use types::{ApiError, ExportError, InitializationError, JobError, RenderingUnavailable};
