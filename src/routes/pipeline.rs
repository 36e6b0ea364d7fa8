use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::services::pipeline::BatchReport;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/refresh", post(refresh))
}

#[derive(Debug, Deserialize)]
struct RefreshRequest {
    symbols: Vec<String>,
}

/// POST /api/pipeline/refresh
///
/// Run the full pipeline for each requested symbol. Per-symbol failures
/// are reported in the body, not as an error status.
async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<BatchReport>, AppError> {
    if req.symbols.is_empty() {
        return Err(AppError::Validation("symbols must not be empty".into()));
    }

    let symbols: Vec<String> = req
        .symbols
        .iter()
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect();
    if symbols.is_empty() {
        return Err(AppError::Validation("symbols must not be empty".into()));
    }

    info!("POST /api/pipeline/refresh - {} symbols", symbols.len());
    let report = state.pipeline.run_batch(&symbols).await;
    Ok(Json(report))
}
