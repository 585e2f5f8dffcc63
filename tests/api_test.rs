//! Router-level tests driving the full HTTP surface with an in-memory extractor.

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;
use ytinfo::downloader::Transcoder;
use ytinfo::{build_app, AppState, ExtractionError, ExtractionOptions, Extractor, InfoFacade};

const NO_STORE: &str = "no-store, max-age=0";
const CACHE_SUCCESS: &str = "s-maxage=2592000, stale-while-revalidate";

#[derive(Clone)]
enum Outcome {
    Document(Value),
    DownloadError(&'static str),
    Failure(&'static str),
    Panic(&'static str),
}

struct ScriptedExtractor {
    outcome: Outcome,
    calls: Mutex<Vec<(String, ExtractionOptions)>>,
}

impl ScriptedExtractor {
    fn new(outcome: Outcome) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<(String, ExtractionOptions)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Extractor for ScriptedExtractor {
    fn id(&self) -> &'static str {
        "scripted"
    }

    fn version(&self) -> &str {
        "2024.08.06"
    }

    async fn extract_info(
        &self,
        query: &str,
        options: &ExtractionOptions,
    ) -> Result<Value, ExtractionError> {
        self.calls
            .lock()
            .unwrap()
            .push((query.to_string(), options.clone()));
        match &self.outcome {
            Outcome::Document(doc) => Ok(doc.clone()),
            Outcome::DownloadError(msg) => Err(ExtractionError::Download(msg.to_string())),
            Outcome::Failure(msg) => Err(ExtractionError::Failed(msg.to_string())),
            Outcome::Panic(msg) => panic!("{}", msg),
        }
    }
}

fn app(extractor: Arc<ScriptedExtractor>) -> Router {
    app_with_ffmpeg(extractor, Transcoder::new("/nonexistent/ffmpeg"))
}

fn app_with_ffmpeg(extractor: Arc<ScriptedExtractor>, transcoder: Transcoder) -> Router {
    let facade = InfoFacade::new(extractor, Duration::from_secs(5));
    build_app(AppState::new(facade, transcoder))
}

async fn send(app: Router, method: Method, uri: &str) -> Response {
    app.oneshot(
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri).await
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn header_str<'a>(response: &'a Response, name: header::HeaderName) -> Option<&'a str> {
    response.headers().get(name).and_then(|v| v.to_str().ok())
}

/// Asserts the shape every failure must have and returns the body.
async fn assert_plain_uncached(response: Response, status: StatusCode) -> String {
    assert_eq!(response.status(), status);
    assert_eq!(header_str(&response, header::CACHE_CONTROL), Some(NO_STORE));
    assert!(header_str(&response, header::CONTENT_TYPE)
        .unwrap_or_default()
        .starts_with("text/plain"));
    body_text(response).await
}

// ============================================================
// /api/info
// ============================================================

#[tokio::test]
async fn blank_query_is_rejected_for_any_format() {
    let extractor = ScriptedExtractor::new(Outcome::Document(json!({})));

    for uri in [
        "/api/info",
        "/api/info?q=",
        "/api/info?q=%20%20%20",
        "/api/info?q=%09&f=best",
        "/api/info?f=bestvideo+best",
    ] {
        let response = get(app(extractor.clone()), uri).await;
        let body = assert_plain_uncached(response, StatusCode::BAD_REQUEST).await;
        assert_eq!(
            body,
            "Query parameter 'q' is required and must be a non-empty string."
        );
    }
    assert!(extractor.calls().is_empty());
}

#[tokio::test]
async fn success_returns_document_with_shared_cache_header() {
    let doc = json!({
        "id": "abc",
        "title": "Example",
        "formats": [{"format_id": "22", "url": "https://cdn/22"}],
        "duration": 61.5
    });
    let extractor = ScriptedExtractor::new(Outcome::Document(doc.clone()));

    let response = get(
        app(extractor.clone()),
        "/api/info?q=https%3A%2F%2Fexample.com%2Fvideo",
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header_str(&response, header::CACHE_CONTROL), Some(CACHE_SUCCESS));
    assert_eq!(
        header_str(&response, header::CONTENT_TYPE),
        Some("application/json")
    );
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body, doc);

    let calls = extractor.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "https://example.com/video");
    assert_eq!(calls[0].1, ExtractionOptions::default());
}

#[tokio::test]
async fn format_spaces_become_plus() {
    let extractor = ScriptedExtractor::new(Outcome::Document(json!({})));

    // A literal '+' in a query string decodes to a space.
    let response = get(app(extractor.clone()), "/api/info?q=cats&f=bestvideo+best").await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get(app(extractor.clone()), "/api/info?q=cats&f=bestvideo%20best").await;
    assert_eq!(response.status(), StatusCode::OK);

    let calls = extractor.calls();
    assert_eq!(calls.len(), 2);
    assert!(calls.iter().all(|(_, opts)| opts.format == "bestvideo+best"));
}

#[tokio::test]
async fn known_extraction_failure_is_400() {
    let extractor = ScriptedExtractor::new(Outcome::DownloadError("no such video"));
    let response = get(app(extractor), "/api/info?q=https%3A%2F%2Fexample.com%2Fvideo").await;
    let body = assert_plain_uncached(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(body, "Download error: no such video");
}

#[tokio::test]
async fn unknown_failure_is_500() {
    let extractor = ScriptedExtractor::new(Outcome::Failure("boom"));
    let response = get(app(extractor), "/api/info?q=anything").await;
    let body = assert_plain_uncached(response, StatusCode::INTERNAL_SERVER_ERROR).await;
    assert_eq!(body, "Internal server error: boom");
}

#[tokio::test]
async fn panicking_extractor_is_500_plain_text() {
    let extractor = ScriptedExtractor::new(Outcome::Panic("kaboom"));
    let response = get(app(extractor), "/api/info?q=anything").await;
    let body = assert_plain_uncached(response, StatusCode::INTERNAL_SERVER_ERROR).await;
    assert_eq!(body, "Internal server error: kaboom");
}

#[tokio::test]
async fn malformed_query_string_is_400_plain_text() {
    let extractor = ScriptedExtractor::new(Outcome::Document(json!({})));
    let response = get(app(extractor.clone()), "/api/info?q=a&q=b").await;
    let body = assert_plain_uncached(response, StatusCode::BAD_REQUEST).await;
    assert!(!body.is_empty());
    assert!(extractor.calls().is_empty());
}

#[tokio::test]
async fn repeated_requests_are_not_cached_by_the_service() {
    let extractor = ScriptedExtractor::new(Outcome::Document(json!({"id": "x"})));

    for _ in 0..2 {
        let response = get(app(extractor.clone()), "/api/info?q=cats&f=best").await;
        assert_eq!(response.status(), StatusCode::OK);
    }
    assert_eq!(extractor.calls().len(), 2);
}

#[tokio::test]
async fn wrong_method_on_info_is_plain_text() {
    let extractor = ScriptedExtractor::new(Outcome::Document(json!({})));
    let response = send(app(extractor), Method::POST, "/api/info?q=cats").await;
    let body = assert_plain_uncached(response, StatusCode::METHOD_NOT_ALLOWED).await;
    assert_eq!(body, "Method Not Allowed");
}

// ============================================================
// /api/version and fallbacks
// ============================================================

#[tokio::test]
async fn version_is_plain_text_for_any_method() {
    let extractor = ScriptedExtractor::new(Outcome::Failure("unused"));

    for method in [Method::GET, Method::POST, Method::DELETE] {
        let response = send(app(extractor.clone()), method, "/api/version").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(header_str(&response, header::CACHE_CONTROL).is_none());
        assert_eq!(body_text(response).await, "2024.08.06");
    }
    assert!(extractor.calls().is_empty());
}

#[tokio::test]
async fn unknown_route_is_plain_text_404() {
    let extractor = ScriptedExtractor::new(Outcome::Document(json!({})));
    for uri in ["/docs", "/redoc", "/openapi.json", "/api/nope"] {
        let response = get(app(extractor.clone()), uri).await;
        let body = assert_plain_uncached(response, StatusCode::NOT_FOUND).await;
        assert_eq!(body, "Not Found");
    }
}

// ============================================================
// /api/download
// ============================================================

#[tokio::test]
async fn download_requires_url() {
    let extractor = ScriptedExtractor::new(Outcome::Document(json!({})));
    let response = get(app(extractor.clone()), "/api/download?url=%20").await;
    let body = assert_plain_uncached(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(body, "URL parameter is required and cannot be empty");
    assert!(extractor.calls().is_empty());
}

#[tokio::test]
async fn download_reports_info_failures_as_400() {
    let extractor = ScriptedExtractor::new(Outcome::Failure("boom"));
    let response = get(app(extractor), "/api/download?url=https%3A%2F%2Fexample.com%2Fv").await;
    let body = assert_plain_uncached(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(body, "Info fetch failed: Internal server error: boom");
}

#[tokio::test]
async fn download_rejects_playlists() {
    let extractor = ScriptedExtractor::new(Outcome::Document(json!({"entries": []})));
    let response = get(app(extractor), "/api/download?url=lofi").await;
    let body = assert_plain_uncached(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(body, "This endpoint does not support playlists");
}

#[tokio::test]
async fn download_without_ffmpeg_is_500() {
    let extractor = ScriptedExtractor::new(Outcome::Document(json!({
        "url": "https://cdn/a",
        "acodec": "mp4a",
        "vcodec": "avc1",
        "title": "clip"
    })));
    let response = get(app(extractor.clone()), "/api/download?url=https%3A%2F%2Fexample.com%2Fv&f=best").await;
    let body = assert_plain_uncached(response, StatusCode::INTERNAL_SERVER_ERROR).await;
    assert!(body.starts_with("FFmpeg error: "));
    assert_eq!(extractor.calls()[0].1.format, "best");
}

#[cfg(unix)]
mod scripted_ffmpeg {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn fake_ffmpeg(dir: &TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("ffmpeg");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn playable() -> Arc<ScriptedExtractor> {
        ScriptedExtractor::new(Outcome::Document(json!({
            "url": "https://cdn/a",
            "acodec": "mp4a",
            "vcodec": "avc1",
            "title": "clip"
        })))
    }

    #[tokio::test]
    async fn ffmpeg_failing_before_output_is_500_not_empty_200() {
        let dir = TempDir::new().unwrap();
        let ffmpeg = fake_ffmpeg(
            &dir,
            "echo 'https://cdn/a: Server returned 403 Forbidden' >&2\nexit 1",
        );

        let response = get(
            app_with_ffmpeg(playable(), Transcoder::new(ffmpeg)),
            "/api/download?url=x",
        )
        .await;
        assert!(header_str(&response, header::CONTENT_DISPOSITION).is_none());
        let body = assert_plain_uncached(response, StatusCode::INTERNAL_SERVER_ERROR).await;
        assert!(body.starts_with("FFmpeg error: "), "{}", body);
        assert!(body.contains("403 Forbidden"), "{}", body);
    }

    #[tokio::test]
    async fn ffmpeg_output_is_streamed_as_attachment() {
        let dir = TempDir::new().unwrap();
        let ffmpeg = fake_ffmpeg(&dir, "printf 'mp4-bytes'");

        let response = get(
            app_with_ffmpeg(playable(), Transcoder::new(ffmpeg)),
            "/api/download?url=x",
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(header_str(&response, header::CONTENT_TYPE), Some("video/mp4"));
        assert_eq!(
            header_str(&response, header::CONTENT_DISPOSITION),
            Some("attachment; filename=\"clip.mp4\"")
        );
        assert_eq!(body_text(response).await, "mp4-bytes");
    }
}
