use crate::error::{AppError, Result};
use crate::services::CrossoverEngine;
use crate::types::StrategyPerformance;
use crate::AppState;
use axum::{extract::State, routing::get, Json, Router};
use tracing::warn;

/// GET /strategy/performance
///
/// Reads the configured CSV on every call; nothing is cached.
async fn get_performance(State(state): State<AppState>) -> Result<Json<StrategyPerformance>> {
    let engine = CrossoverEngine::from(state.config.crossover);
    let path = state.config.signal_csv_path.clone();

    let performance = tokio::task::spawn_blocking(move || engine.evaluate_file(&path))
        .await
        .map_err(|e| {
            AppError::Internal(format!("Error calculating strategy performance: {}", e))
        })?
        .map_err(|e| {
            warn!("Strategy evaluation failed: {}", e);
            AppError::from(e)
        })?;

    Ok(Json(performance))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/strategy/performance", get(get_performance))
}
