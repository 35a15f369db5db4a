use crate::error::{AppError, Result};
use crate::services::{validate_new_record, ValidationErrors};
use crate::types::{MarketRecord, NewMarketRecord};
use crate::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::{debug, info};

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 1000;

/// Query parameters for paging through stored records.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PageQuery {
    /// Apply defaults and bounds, returning `(limit, offset)`.
    fn resolve(&self) -> std::result::Result<(u32, u64), ValidationErrors> {
        let limit = self.limit.unwrap_or(DEFAULT_LIMIT);
        let offset = self.offset.unwrap_or(0);

        let mut errors = ValidationErrors::default();
        if limit < 1 {
            errors.push("limit", "Input should be greater than or equal to 1");
        } else if limit > MAX_LIMIT {
            errors.push(
                "limit",
                format!("Input should be less than or equal to {}", MAX_LIMIT),
            );
        }
        if offset < 0 {
            errors.push("offset", "Input should be greater than or equal to 0");
        }
        errors.into_result()?;

        Ok((limit as u32, offset as u64))
    }
}

/// GET /data
async fn list_records(
    State(state): State<AppState>,
    query: std::result::Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<Vec<MarketRecord>>> {
    let Query(page) = query.map_err(|r| ValidationErrors::single("query", r.body_text()))?;
    let (limit, offset) = page.resolve()?;

    let records = state
        .store
        .list(limit, offset)
        .map_err(|e| AppError::Internal(format!("Error fetching data: {}", e)))?;

    debug!(limit, offset, returned = records.len(), "Listed market records");
    Ok(Json(records))
}

/// POST /data
async fn create_record(
    State(state): State<AppState>,
    payload: std::result::Result<Json<NewMarketRecord>, JsonRejection>,
) -> Result<(StatusCode, Json<MarketRecord>)> {
    let Json(record) = payload.map_err(|r| ValidationErrors::single("body", r.body_text()))?;
    validate_new_record(&record)?;

    let created = state
        .store
        .create(&record)
        .map_err(|e| AppError::Internal(format!("Error creating record: {}", e)))?;

    info!(id = created.id, datetime = %created.datetime, "Created market record");
    Ok((StatusCode::CREATED, Json(created)))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/data", get(list_records).post(create_record))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(limit: Option<i64>, offset: Option<i64>) -> PageQuery {
        PageQuery { limit, offset }
    }

    #[test]
    fn test_page_defaults() {
        assert_eq!(PageQuery::default().resolve().unwrap(), (50, 0));
    }

    #[test]
    fn test_page_bounds() {
        assert_eq!(page(Some(1), Some(0)).resolve().unwrap(), (1, 0));
        assert_eq!(page(Some(1000), Some(25)).resolve().unwrap(), (1000, 25));
        assert!(page(Some(0), None).resolve().is_err());
        assert!(page(Some(1001), None).resolve().is_err());
        assert!(page(None, Some(-1)).resolve().is_err());
    }

    #[test]
    fn test_page_reports_every_field() {
        let errors = page(Some(0), Some(-5)).resolve().unwrap_err();
        let fields: Vec<&str> = errors.errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["limit", "offset"]);
    }
}
