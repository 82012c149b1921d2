//! Ports to the remote asset directory, plus the default HTTP binding.

mod directory;
mod error;
mod http;

pub use directory::{CreatedRecord, EntityDirectory};
pub use error::DirectoryError;
pub use http::HttpEntityDirectory;
