//! Request-to-extraction façade
//!
//! Validates the raw `(q, f)` pair, builds per-request [`ExtractionOptions`],
//! calls the extractor under a request-level timeout and folds every outcome
//! into `Result<Value, ApiError>`.

use crate::extractor::models::{ExtractionOptions, DEFAULT_FORMAT};
use crate::extractor::traits::Extractor;
use crate::utils::error::ApiError;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub const MISSING_QUERY_MESSAGE: &str =
    "Query parameter 'q' is required and must be a non-empty string.";

pub struct InfoFacade {
    extractor: Arc<dyn Extractor>,
    request_timeout: Duration,
}

impl InfoFacade {
    pub fn new(extractor: Arc<dyn Extractor>, request_timeout: Duration) -> Self {
        Self {
            extractor,
            request_timeout,
        }
    }

    /// Resolve `query` into the extractor's metadata document.
    ///
    /// `query` is forwarded untrimmed once it is known to contain something
    /// other than whitespace.
    pub async fn get_info(
        &self,
        query: Option<&str>,
        format: Option<&str>,
    ) -> Result<Value, ApiError> {
        let query = match query {
            Some(q) if !q.trim().is_empty() => q,
            _ => return Err(ApiError::Validation(MISSING_QUERY_MESSAGE.to_string())),
        };

        let options = ExtractionOptions::for_format(format.unwrap_or(DEFAULT_FORMAT));
        debug!(
            extractor = self.extractor.id(),
            query,
            format = %options.format,
            "Resolving info"
        );

        match tokio::time::timeout(
            self.request_timeout,
            self.extractor.extract_info(query, &options),
        )
        .await
        {
            Ok(result) => result.map_err(ApiError::from),
            Err(_) => Err(ApiError::Internal(format!(
                "extraction timed out after {}s",
                self.request_timeout.as_secs()
            ))),
        }
    }

    pub fn version(&self) -> &str {
        self.extractor.version()
    }
}
