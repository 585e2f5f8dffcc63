//! Data structures describing an extraction request

use std::time::Duration;

/// Format selector used when the caller does not provide one
pub const DEFAULT_FORMAT: &str = "bestvideo+bestaudio/best";

/// Search prefix applied to queries that are not URLs
pub const DEFAULT_SEARCH: &str = "ytsearch10";

pub const DEFAULT_RETRIES: u32 = 3;
pub const DEFAULT_ENCODING: &str = "utf8";
pub const DEFAULT_SOCKET_TIMEOUT_SECS: u64 = 10;

/// Options handed to the extractor on every call.
///
/// Built fresh for each request; nothing here is shared between requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionOptions {
    pub default_search: String,
    pub format: String,
    pub retries: u32,
    pub encoding: String,
    pub socket_timeout_secs: u64,
}

impl ExtractionOptions {
    /// Options for the given raw format specifier (`f` query parameter)
    pub fn for_format(format: &str) -> Self {
        Self {
            format: normalize_format(format),
            ..Self::default()
        }
    }

    /// Upper bound the backend may spend on its own attempts
    pub fn attempt_budget(&self) -> Duration {
        Duration::from_secs(self.socket_timeout_secs * (u64::from(self.retries) + 1))
    }
}

impl Default for ExtractionOptions {
    fn default() -> Self {
        Self {
            default_search: DEFAULT_SEARCH.to_string(),
            format: DEFAULT_FORMAT.to_string(),
            retries: DEFAULT_RETRIES,
            encoding: DEFAULT_ENCODING.to_string(),
            socket_timeout_secs: DEFAULT_SOCKET_TIMEOUT_SECS,
        }
    }
}

/// Spaces in a query-string format selector stand for `+`
pub fn normalize_format(format: &str) -> String {
    format.replace(' ', "+")
}
