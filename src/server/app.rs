//! Application setup and router configuration.

use std::any::Any;
use std::sync::Arc;

use axum::{
    response::{IntoResponse, Response},
    routing::{any, get},
    Router,
};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

use crate::downloader::Transcoder;
use crate::facade::InfoFacade;
use crate::server::routes::{download_handler, info_handler, version_handler};
use crate::utils::error::ApiError;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub facade: Arc<InfoFacade>,
    pub transcoder: Arc<Transcoder>,
}

impl AppState {
    pub fn new(facade: InfoFacade, transcoder: Transcoder) -> Self {
        Self {
            facade: Arc::new(facade),
            transcoder: Arc::new(transcoder),
        }
    }
}

/// Build the Axum application router
///
/// Every non-success response leaving this router is plain text with
/// `Cache-Control: no-store, max-age=0`, including unknown routes, wrong
/// methods and handler panics.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/api/info", get(info_handler).fallback(method_not_allowed))
        .route(
            "/api/download",
            get(download_handler).fallback(method_not_allowed),
        )
        .route("/api/version", any(version_handler))
        .fallback(not_found)
        .with_state(state)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "handler panicked".to_string()
    };

    ApiError::Internal(message).into_response()
}
