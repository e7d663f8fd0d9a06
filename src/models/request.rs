//! Analysis submission built from user input.

use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_RESOURCE_LIMIT, RESOURCE_LIMIT_MAX, RESOURCE_LIMIT_MIN};
use crate::error_handling::JobError;

/// Options sent alongside the URL list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisOptions {
    /// Include sub-resource sizing (images, scripts, stylesheets)
    pub fetch_resources: bool,
    /// Cap on sub-resources counted, within `[RESOURCE_LIMIT_MIN, RESOURCE_LIMIT_MAX]`
    pub resource_limit: u32,
    /// Enable extended network probing
    pub check_advanced: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            fetch_resources: true,
            resource_limit: DEFAULT_RESOURCE_LIMIT,
            check_advanced: true,
        }
    }
}

/// An immutable, validated batch of URLs plus options.
///
/// URLs are trimmed and blank entries dropped; order and duplicates are kept
/// exactly as given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    urls: Vec<String>,
    options: AnalysisOptions,
}

impl AnalysisRequest {
    /// Validates user input into a request.
    ///
    /// # Errors
    ///
    /// Returns `JobError::InvalidRequest` if no non-blank URL remains or the
    /// resource limit is out of range.
    pub fn new<I, S>(urls: I, options: AnalysisOptions) -> Result<Self, JobError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let urls: Vec<String> = urls
            .into_iter()
            .map(|u| u.as_ref().trim().to_string())
            .filter(|u| !u.is_empty())
            .collect();

        if urls.is_empty() {
            return Err(JobError::InvalidRequest(
                "at least one non-empty URL is required".to_string(),
            ));
        }
        if !(RESOURCE_LIMIT_MIN..=RESOURCE_LIMIT_MAX).contains(&options.resource_limit) {
            return Err(JobError::InvalidRequest(format!(
                "resource limit {} is outside {}..={}",
                options.resource_limit, RESOURCE_LIMIT_MIN, RESOURCE_LIMIT_MAX
            )));
        }

        Ok(Self { urls, options })
    }

    /// Builds a request from newline-separated text, skipping `#` comment lines.
    pub fn from_lines(text: &str, options: AnalysisOptions) -> Result<Self, JobError> {
        Self::new(
            text.lines().filter(|line| !line.trim_start().starts_with('#')),
            options,
        )
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    pub fn options(&self) -> AnalysisOptions {
        self.options
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}
