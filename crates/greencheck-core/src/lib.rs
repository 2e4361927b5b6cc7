//! Verification orchestration engine for NAFDAC Greenbook product checks.
//!
//! A verification attempt submits either a photographed product image or a
//! manually typed registration number to the remote verification service,
//! while an illustrative stage-by-stage progress timeline runs on its own
//! wall-clock timetable. The [`orchestrator`] joins the two timelines and
//! publishes a single normalized [`VerificationOutcome`] for display.

use thiserror::Error;

pub mod client;
pub mod orchestrator;
pub mod outcome;
pub mod progress;
pub mod request;

pub use client::{GreenbookClient, ServiceResponse};
pub use orchestrator::{AttemptReport, Phase, Submission, Verifier, run_attempt};
pub use outcome::{ProductRecord, VerificationOutcome};
pub use progress::{ProgressEvent, ProgressPlan, Stage, StageStatus};
pub use request::{VerificationMode, VerificationRequest};

/// User-safe message shown for any transport or protocol failure.
pub const DISPATCH_FAILURE_MESSAGE: &str = "Failed to verify product. Please try again.";

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("verification service returned HTTP {0}")]
    Status(reqwest::StatusCode),
    #[error("{0}")]
    Validation(String),
}

impl CoreError {
    /// True for errors raised locally before any network activity.
    pub fn is_validation(&self) -> bool {
        matches!(self, CoreError::Validation(_))
    }
}

/// Configuration for the verification engine.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the verification API (the `/verify` and `/validate`
    /// routes are appended to this).
    pub api_base_url: String,
    /// Optional bound on the remote call. None means the dispatcher waits
    /// indefinitely for the service or its own transport failure.
    pub request_timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:3000".into(),
            request_timeout_secs: None,
        }
    }
}
