use crate::error::{AppError, Result};
use crate::AppState;
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    records: u64,
}

async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>> {
    let records = state
        .store
        .count()
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        records,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
