pub mod health;

use std::future::Future;

use anyhow::anyhow;
use axum::{
    routing::{get, post},
    Router,
};

use crate::errors::AppError;
use crate::state::AppState;
use crate::{intake, interview, results, session};

/// Runs a session step on its own task so it completes even if the client goes away.
pub async fn run_detached<T, F>(step: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>> + Send + 'static,
    T: Send + 'static,
{
    tokio::spawn(step)
        .await
        .map_err(|e| AppError::Internal(anyhow!("session task failed: {e}")))?
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Sessions
        .route(
            "/api/v1/sessions",
            post(session::handlers::handle_create_session)
                .get(session::handlers::handle_list_sessions),
        )
        .route(
            "/api/v1/sessions/:id",
            get(session::handlers::handle_get_session)
                .delete(session::handlers::handle_delete_session),
        )
        .route(
            "/api/v1/sessions/:id/reset",
            post(session::handlers::handle_reset_session),
        )
        // Job intake
        .route(
            "/api/v1/sessions/:id/job",
            post(intake::handlers::handle_submit_job),
        )
        .route(
            "/api/v1/sessions/:id/job/document",
            post(intake::handlers::handle_upload_document),
        )
        // Interview
        .route(
            "/api/v1/sessions/:id/interview/start",
            post(interview::handlers::handle_start_interview),
        )
        .route(
            "/api/v1/sessions/:id/interview/answers",
            post(interview::handlers::handle_submit_answer),
        )
        .route(
            "/api/v1/sessions/:id/interview/evaluate",
            post(interview::handlers::handle_evaluate),
        )
        // Results
        .route(
            "/api/v1/sessions/:id/results",
            get(results::handlers::handle_get_results),
        )
        .route(
            "/api/v1/sessions/:id/results/report.txt",
            get(results::handlers::handle_get_text_report),
        )
        .with_state(state)
}
