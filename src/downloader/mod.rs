//! Streaming downloads: info document -> ffmpeg -> HTTP body

pub mod ffmpeg;
pub mod plan;

pub use ffmpeg::{FfmpegStream, Transcoder};
pub use plan::{content_disposition, DownloadPlan};
