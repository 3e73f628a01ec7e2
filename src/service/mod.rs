//! Request handling around the analysis core
//!
//! Upload validation, temporary staging, per-client rate limiting and the
//! append-only analysis log. An HTTP front end only has to turn a request
//! into an [`AnalysisRequest`] and a [`ServiceError`] into a response.

pub mod config;
mod journal;
mod pipeline;
mod rate_limit;
mod upload;

pub use config::ServiceConfig;
pub use journal::{AnalysisLog, ConsoleAnalysisLog, FileAnalysisLog, LogEntry};
pub use pipeline::{AnalysisRequest, AnalysisService};
pub use rate_limit::{IntervalRateLimiter, RateLimiter, Unlimited};
pub use upload::{StagedUpload, Upload};

use crate::error::AnalysisError;
use std::time::Duration;
use thiserror::Error;

/// Errors a request can fail with
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Missing file, empty filename, disallowed extension, bad size
    #[error("{0}")]
    InputValidation(String),

    #[error("too many requests, retry in {} seconds", retry_after.as_secs().max(1))]
    RateLimited { retry_after: Duration },

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    /// Staging the upload failed
    #[error("failed to stage upload: {0}")]
    Io(#[from] std::io::Error),
}

impl ServiceError {
    /// HTTP status an outer layer should answer with
    pub fn status_code(&self) -> u16 {
        match self {
            ServiceError::InputValidation(_) => 400,
            ServiceError::RateLimited { .. } => 429,
            ServiceError::Analysis(AnalysisError::Decode(_)) => 422,
            ServiceError::Analysis(_) => 500,
            ServiceError::Io(_) => 500,
        }
    }

    /// Seconds a rate-limited client should wait, rounded up
    pub fn retry_after_secs(&self) -> Option<u64> {
        match self {
            ServiceError::RateLimited { retry_after } => {
                let secs = retry_after.as_secs();
                Some(if retry_after.subsec_nanos() > 0 { secs + 1 } else { secs })
            }
            _ => None,
        }
    }
}
