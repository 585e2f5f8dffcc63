//! ytinfo library

pub mod downloader;
pub mod extractor;
pub mod facade;
pub mod server;
pub mod utils;

// Re-export main types for easier use
pub use extractor::{ExtractionOptions, Extractor, YtDlpExtractor};
pub use facade::InfoFacade;
pub use server::{build_app, AppState};
pub use utils::{ApiError, AppSettings, ExtractionError};
