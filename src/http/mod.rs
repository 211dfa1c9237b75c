//! HTTP protocol vocabulary.
mod method;
mod status;

pub use method::{Method, UnknownMethod};
pub use status::StatusCode;

/// The only HTTP version accepted in a request line.
pub const HTTP_VERSION: &str = "1.1";
