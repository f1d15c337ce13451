use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::errors::AppError;
use crate::results::{project, ResultsReport};
use crate::state::AppState;

async fn load_report(state: &AppState, id: Uuid) -> Result<ResultsReport, AppError> {
    let handle = state.sessions.get(id).await?;
    let entry = handle.lock().await;
    project(&entry.session).map_err(|reason| AppError::NotReady(reason.to_string()))
}

/// GET /api/v1/sessions/:id/results
pub async fn handle_get_results(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ResultsReport>, AppError> {
    Ok(Json(load_report(&state, id).await?))
}

/// GET /api/v1/sessions/:id/results/report.txt
pub async fn handle_get_text_report(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let report = load_report(&state, id).await?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        report.render_text(),
    ))
}
