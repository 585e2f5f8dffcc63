//! Application configuration

use crate::extractor::models::ExtractionOptions;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Slack on top of the extractor's own retry budget before a request is abandoned
const REQUEST_TIMEOUT_GRACE_SECS: u64 = 20;

/// Application settings, from command-line flags or the environment
#[derive(Debug, Clone, Parser)]
#[command(name = "ytinfo", version, about = "HTTP API for yt-dlp metadata extraction")]
pub struct AppSettings {
    /// Address to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// yt-dlp executable (auto-detected when unset)
    #[arg(long, env = "YTDLP_PATH")]
    pub ytdlp_path: Option<PathBuf>,

    /// ffmpeg executable used by /api/download (auto-detected when unset)
    #[arg(long, env = "FFMPEG_PATH")]
    pub ffmpeg_path: Option<PathBuf>,

    /// Seconds before an extraction is abandoned
    #[arg(long = "request-timeout", env = "REQUEST_TIMEOUT_SECS")]
    pub request_timeout_secs: Option<u64>,
}

impl AppSettings {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Explicit timeout, or the extractor's worst case plus a grace period
    pub fn request_timeout(&self) -> Duration {
        match self.request_timeout_secs {
            Some(secs) => Duration::from_secs(secs.max(1)),
            None => {
                ExtractionOptions::default().attempt_budget()
                    + Duration::from_secs(REQUEST_TIMEOUT_GRACE_SECS)
            }
        }
    }
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            ytdlp_path: None,
            ffmpeg_path: None,
            request_timeout_secs: None,
        }
    }
}
