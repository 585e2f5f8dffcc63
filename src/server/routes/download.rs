use axum::{
    body::Body,
    extract::{rejection::QueryRejection, Query, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::info;

use crate::downloader::{content_disposition, DownloadPlan};
use crate::server::app::AppState;
use crate::utils::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct DownloadParams {
    pub url: Option<String>,
    pub f: Option<String>,
}

/// `GET /api/download?url=<url>&f=<format>`
///
/// Resolves the media through the info façade and streams it through
/// ffmpeg as mp4 (or mp3 for audio-only sources).
pub async fn download_handler(
    State(state): State<AppState>,
    params: Result<Query<DownloadParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = params.map_err(|rejection| ApiError::Validation(rejection.body_text()))?;

    let url = match params.url.as_deref() {
        Some(url) if !url.trim().is_empty() => url,
        _ => {
            return Err(ApiError::Validation(
                "URL parameter is required and cannot be empty".to_string(),
            ))
        }
    };

    let info = state
        .facade
        .get_info(Some(url), params.f.as_deref())
        .await
        .map_err(|e| ApiError::Validation(format!("Info fetch failed: {}", e)))?;

    let plan = DownloadPlan::from_info(&info)?;
    let disposition = HeaderValue::from_str(&content_disposition(&plan.filename()))
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let stream = state.transcoder.start(&plan).await?;
    info!(
        inputs = plan.inputs.len(),
        audio_only = plan.audio_only,
        "Streaming {}",
        plan.filename()
    );

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(plan.content_type())),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        Body::from_stream(stream),
    )
        .into_response())
}
