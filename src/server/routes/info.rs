use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use crate::server::app::AppState;
use crate::utils::error::ApiError;

/// Shared-cache lifetime for successful lookups (30 days)
pub const CACHE_SUCCESS: &str = "s-maxage=2592000, stale-while-revalidate";

#[derive(Debug, Deserialize)]
pub struct InfoParams {
    pub q: Option<String>,
    pub f: Option<String>,
}

/// `GET /api/info?q=<query>&f=<format>`
pub async fn info_handler(
    State(state): State<AppState>,
    params: Result<Query<InfoParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = params.map_err(|rejection| ApiError::Validation(rejection.body_text()))?;

    let document = state
        .facade
        .get_info(params.q.as_deref(), params.f.as_deref())
        .await?;

    Ok(([(header::CACHE_CONTROL, CACHE_SUCCESS)], Json(document)).into_response())
}
