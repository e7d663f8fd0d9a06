//! Data model shared by the poller, the aggregators, and the exporters.

mod record;
mod request;
mod status;

pub use record::{fields, ResultRecord};
pub use request::{AnalysisOptions, AnalysisRequest};
pub use status::{JobId, JobState, JobStatus};
