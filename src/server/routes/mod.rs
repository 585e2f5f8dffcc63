// HTTP routes
pub mod download;
pub mod info;
pub mod version;

pub use download::*;
pub use info::*;
pub use version::*;
