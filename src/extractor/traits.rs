use crate::extractor::models::ExtractionOptions;
use crate::utils::error::ExtractionError;
use async_trait::async_trait;
use serde_json::Value;

/// Core trait for media metadata extractors
///
/// This trait isolates the HTTP layer from the specific extraction backend
/// (yt-dlp subprocess, in-memory fake in tests, ...).
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Returns a unique identifier for this extractor (e.g., "ytdlp")
    fn id(&self) -> &'static str;

    /// Version of the underlying extraction engine
    fn version(&self) -> &str;

    /// Resolves `query` (a URL or search text) into its metadata document
    /// without downloading any media.
    ///
    /// Must return `ExtractionError::Download` when the engine reports it
    /// could not resolve the query; any other variant is treated as an
    /// unexpected failure.
    async fn extract_info(
        &self,
        query: &str,
        options: &ExtractionOptions,
    ) -> Result<Value, ExtractionError>;
}
