//! Job intake: captures the job description and turns it into a `JobProfile`.

pub mod document;
pub mod handlers;
pub mod service;

use serde::Serialize;

pub use document::UploadedDocument;
pub use service::JobIntake;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IntakeStatus {
    #[default]
    Idle,
    /// `AnalyzeJob` is outstanding; new submissions are refused.
    Pending,
}

/// Intake form state. The draft survives validation errors and failed analyses.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IntakeState {
    pub status: IntakeStatus,
    pub draft: String,
    pub uploaded_file: Option<String>,
    /// Last message to show inline, cleared by the next successful step.
    pub error: Option<String>,
}
