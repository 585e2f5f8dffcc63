pub mod models;
pub mod traits;
pub mod ytdlp;

pub use models::{ExtractionOptions, DEFAULT_FORMAT, DEFAULT_SEARCH};
pub use traits::Extractor;
pub use ytdlp::YtDlpExtractor;
