use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::collaborators::{call_with_timeout, JobAnalyzer, Operation};
use crate::errors::AppError;
use crate::intake::{IntakeState, IntakeStatus, UploadedDocument};
use crate::models::JobProfile;
use crate::session::SessionHandle;

pub const EMPTY_DESCRIPTION_MESSAGE: &str = "Please enter a job description or upload a file";
pub const ANALYSIS_FAILED_MESSAGE: &str =
    "An error occurred while analyzing the job description. Please try again.";

/// Drives the intake step: document loading, validation and the `AnalyzeJob` call.
pub struct JobIntake {
    analyzer: Arc<dyn JobAnalyzer>,
    timeout: Duration,
}

impl JobIntake {
    pub fn new(analyzer: Arc<dyn JobAnalyzer>, timeout: Duration) -> Self {
        Self { analyzer, timeout }
    }

    /// Replaces the draft with the document's text. Rejected documents leave the draft as it was.
    pub async fn load_document(
        &self,
        handle: &SessionHandle,
        document: UploadedDocument,
    ) -> Result<IntakeState, AppError> {
        let mut entry = handle.lock().await;
        entry.ensure_idle()?;

        match document.draft_text() {
            Ok(text) => {
                entry.intake.draft = text;
                entry.intake.uploaded_file = Some(document.file_name);
                entry.intake.error = None;
                entry.touch();
                Ok(entry.intake.clone())
            }
            Err(e) => {
                if let AppError::Validation(msg) = &e {
                    entry.intake.error = Some(msg.clone());
                }
                Err(e)
            }
        }
    }

    /// Submits the draft (optionally replaced by `raw_text`) for analysis and stores the profile.
    pub async fn submit(
        &self,
        handle: &SessionHandle,
        raw_text: Option<String>,
    ) -> Result<JobProfile, AppError> {
        let (session_id, text) = {
            let mut entry = handle.lock().await;
            entry.ensure_idle()?;

            // Rejected submissions never touch the draft.
            let text = raw_text.unwrap_or_else(|| entry.intake.draft.clone());
            if !entry.session.questions().is_empty() {
                return Err(AppError::ContractViolation(
                    "an interview is already under way; reset the session before submitting a new job"
                        .to_string(),
                ));
            }
            if text.trim().is_empty() {
                entry.intake.error = Some(EMPTY_DESCRIPTION_MESSAGE.to_string());
                return Err(AppError::Validation(EMPTY_DESCRIPTION_MESSAGE.to_string()));
            }

            entry.begin_call(Operation::AnalyzeJob)?;
            entry.intake.draft = text.clone();
            entry.intake.status = IntakeStatus::Pending;
            entry.intake.error = None;
            (entry.id, text)
        };

        info!("Session {session_id}: analyzing job description ({} chars)", text.len());
        let result = call_with_timeout(
            Operation::AnalyzeJob,
            self.timeout,
            self.analyzer.analyze(&text),
        )
        .await;

        let mut entry = handle.lock().await;
        entry.end_call(Operation::AnalyzeJob);
        entry.intake.status = IntakeStatus::Idle;

        let mut profile = match result {
            Ok(profile) => profile,
            Err(e) => {
                warn!("Session {session_id}: job analysis failed: {e}");
                entry.intake.error = Some(ANALYSIS_FAILED_MESSAGE.to_string());
                return Err(AppError::external(Operation::AnalyzeJob, e));
            }
        };
        profile.raw_content = text;

        entry.session.set_profile(profile.clone())?;
        info!(
            "Session {session_id}: job profile ready ('{}' at {})",
            profile.title, profile.company
        );
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use bytes::Bytes;
    use tokio::sync::Notify;
    use uuid::Uuid;

    use super::*;
    use crate::intake::document::UNSUPPORTED_TYPE_MESSAGE;
    use crate::collaborators::doubles::StubAnalyzer;
    use crate::session::fixtures::five_questions;
    use crate::session::SessionEntry;

    fn handle() -> SessionHandle {
        Arc::new(tokio::sync::Mutex::new(SessionEntry::new(Uuid::new_v4())))
    }

    fn intake(analyzer: Arc<StubAnalyzer>) -> JobIntake {
        JobIntake::new(analyzer, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_submit_stores_profile() {
        let analyzer = Arc::new(StubAnalyzer::default());
        let h = handle();
        let profile = intake(analyzer.clone())
            .submit(&h, Some("Frontend Developer\nReact".to_string()))
            .await
            .unwrap();

        assert_eq!(profile.raw_content, "Frontend Developer\nReact");
        let entry = h.lock().await;
        assert_eq!(entry.session.job_profile(), Some(&profile));
        assert_eq!(entry.intake.status, IntakeStatus::Idle);
        assert!(entry.in_flight().is_none());
        assert_eq!(analyzer.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_blank_text_never_calls_analyzer() {
        let analyzer = Arc::new(StubAnalyzer::default());
        let h = handle();
        let err = intake(analyzer.clone())
            .submit(&h, Some("   \n\t".to_string()))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(analyzer.calls.load(Ordering::SeqCst), 0);
        let entry = h.lock().await;
        assert_eq!(entry.intake.error.as_deref(), Some(EMPTY_DESCRIPTION_MESSAGE));
        assert!(entry.session.job_profile().is_none());
    }

    #[tokio::test]
    async fn test_analysis_failure_keeps_draft_and_no_profile() {
        let analyzer = Arc::new(StubAnalyzer {
            fail: true,
            ..Default::default()
        });
        let h = handle();
        let svc = intake(analyzer.clone());
        let err = svc
            .submit(&h, Some("Data Engineer".to_string()))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AppError::ExternalCall {
                operation: Operation::AnalyzeJob,
                ..
            }
        ));
        {
            let entry = h.lock().await;
            assert!(entry.session.job_profile().is_none());
            assert_eq!(entry.intake.draft, "Data Engineer");
            assert_eq!(entry.intake.status, IntakeStatus::Idle);
            assert_eq!(entry.intake.error.as_deref(), Some(ANALYSIS_FAILED_MESSAGE));
            assert!(entry.in_flight().is_none());
        }

        // Retry with the preserved draft.
        let err = svc.submit(&h, None).await.unwrap_err();
        assert!(matches!(err, AppError::ExternalCall { .. }));
        assert_eq!(analyzer.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_submit_while_pending_is_busy() {
        let h = handle();
        h.lock().await.begin_call(Operation::AnalyzeJob).unwrap();
        let analyzer = Arc::new(StubAnalyzer::default());
        let err = intake(analyzer.clone())
            .submit(&h, Some("Designer".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Busy(Operation::AnalyzeJob)));
        assert_eq!(analyzer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_submit_after_interview_started_is_rejected() {
        let h = handle();
        h.lock().await.session.set_questions(five_questions()).unwrap();
        let analyzer = Arc::new(StubAnalyzer::default());
        let err = intake(analyzer.clone())
            .submit(&h, Some("Designer".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ContractViolation(_)));
        assert_eq!(analyzer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_rejected_document_leaves_draft_untouched() {
        let h = handle();
        h.lock().await.intake.draft = "typed by hand".to_string();
        let svc = intake(Arc::new(StubAnalyzer::default()));

        let doc = UploadedDocument {
            file_name: "photo.png".to_string(),
            content_type: "image/png".to_string(),
            bytes: Bytes::from_static(b"\x89PNG"),
        };
        let err = svc.load_document(&h, doc).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let entry = h.lock().await;
        assert_eq!(entry.intake.draft, "typed by hand");
        assert!(entry.intake.error.is_some());
        assert!(entry.intake.uploaded_file.is_none());
    }

    #[tokio::test]
    async fn test_rejected_document_keeps_previous_upload() {
        let h = handle();
        let svc = intake(Arc::new(StubAnalyzer::default()));
        let offer = UploadedDocument {
            file_name: "offer.txt".to_string(),
            content_type: "text/plain".to_string(),
            bytes: Bytes::from_static(b"Rust Engineer\nCompany: Acme"),
        };
        svc.load_document(&h, offer).await.unwrap();

        let photo = UploadedDocument {
            file_name: "photo.png".to_string(),
            content_type: "image/png".to_string(),
            bytes: Bytes::from_static(b"\x89PNG"),
        };
        let err = svc.load_document(&h, photo).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let entry = h.lock().await;
        assert_eq!(entry.intake.draft, "Rust Engineer\nCompany: Acme");
        assert_eq!(entry.intake.uploaded_file.as_deref(), Some("offer.txt"));
        assert_eq!(entry.intake.error.as_deref(), Some(UNSUPPORTED_TYPE_MESSAGE));
    }

    #[tokio::test]
    async fn test_blank_submit_keeps_existing_draft() {
        let h = handle();
        h.lock().await.intake.draft = "Senior Rust Engineer\nCompany: Acme".to_string();
        let analyzer = Arc::new(StubAnalyzer::default());

        let err = intake(analyzer.clone())
            .submit(&h, Some("   ".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(analyzer.calls.load(Ordering::SeqCst), 0);

        let entry = h.lock().await;
        assert_eq!(entry.intake.draft, "Senior Rust Engineer\nCompany: Acme");
        assert_eq!(entry.intake.error.as_deref(), Some(EMPTY_DESCRIPTION_MESSAGE));
    }

    #[tokio::test]
    async fn test_submit_during_interview_keeps_existing_draft() {
        let h = handle();
        {
            let mut entry = h.lock().await;
            entry.intake.draft = "original".to_string();
            entry.session.set_questions(five_questions()).unwrap();
        }
        let err = intake(Arc::new(StubAnalyzer::default()))
            .submit(&h, Some("other job".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ContractViolation(_)));
        assert_eq!(h.lock().await.intake.draft, "original");
    }

    #[tokio::test]
    async fn test_intake_is_pending_while_analysis_runs() {
        let gate = Arc::new(Notify::new());
        let analyzer = Arc::new(StubAnalyzer {
            gate: Some(gate.clone()),
            ..Default::default()
        });
        let svc = Arc::new(intake(analyzer.clone()));
        let h = handle();

        let task = {
            let svc = svc.clone();
            let h = h.clone();
            tokio::spawn(async move { svc.submit(&h, Some("Rust Engineer".to_string())).await })
        };
        loop {
            if h.lock().await.in_flight().is_some() {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(h.lock().await.intake.status, IntakeStatus::Pending);

        let err = svc
            .submit(&h, Some("Another job".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Busy(Operation::AnalyzeJob)));
        assert_eq!(h.lock().await.intake.draft, "Rust Engineer");

        gate.notify_one();
        let profile = task.await.unwrap().unwrap();
        assert_eq!(profile.raw_content, "Rust Engineer");
        assert_eq!(analyzer.calls.load(Ordering::SeqCst), 1);

        let entry = h.lock().await;
        assert_eq!(entry.intake.status, IntakeStatus::Idle);
        assert!(entry.in_flight().is_none());
        assert!(entry.session.job_profile().is_some());
    }

    #[tokio::test]
    async fn test_text_document_then_submit_without_text() {
        let h = handle();
        let svc = intake(Arc::new(StubAnalyzer::default()));
        let doc = UploadedDocument {
            file_name: "offer.txt".to_string(),
            content_type: "text/plain".to_string(),
            bytes: Bytes::from_static(b"QA Engineer\nCompany: Beta"),
        };
        let state = svc.load_document(&h, doc).await.unwrap();
        assert_eq!(state.uploaded_file.as_deref(), Some("offer.txt"));

        let profile = svc.submit(&h, None).await.unwrap();
        assert_eq!(profile.raw_content, "QA Engineer\nCompany: Beta");
    }
}
