use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::{Prompt, TurnOutcome};
use crate::models::Evaluation;
use crate::routes::run_detached;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SubmitAnswerRequest {
    pub text: String,
}

/// POST /api/v1/sessions/:id/interview/start
pub async fn handle_start_interview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Prompt>, AppError> {
    let handle = state.sessions.get(id).await?;
    let engine = state.engine.clone();
    let prompt = run_detached(async move { engine.start(&handle).await }).await?;
    Ok(Json(prompt))
}

/// POST /api/v1/sessions/:id/interview/answers
pub async fn handle_submit_answer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SubmitAnswerRequest>,
) -> Result<Json<TurnOutcome>, AppError> {
    let handle = state.sessions.get(id).await?;
    let engine = state.engine.clone();
    let outcome =
        run_detached(async move { engine.submit_answer(&handle, &req.text).await }).await?;
    Ok(Json(outcome))
}

/// POST /api/v1/sessions/:id/interview/evaluate
pub async fn handle_evaluate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Evaluation>, AppError> {
    let handle = state.sessions.get(id).await?;
    let engine = state.engine.clone();
    let evaluation = run_detached(async move { engine.evaluate(&handle).await }).await?;
    Ok(Json(evaluation))
}
