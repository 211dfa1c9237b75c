//! HTTP Response.
//!
//! Responses are not built as values, they are written straight to the connection through a
//! [`ResponseWriter`], which enforces that the status line, headers and body are written in
//! that order.
use crate::headers::HeaderMap;

mod error;
mod writer;

pub use error::WriteError;
pub use writer::{ResponseWriter, WriteState};


/// Headers for a response with a fixed length body of `content_length` bytes.
///
/// Sets `content-length`, `connection: close` and `content-type: text/plain`. Use
/// [`replace_headers`] to change the content type.
pub fn default_headers(content_length: usize) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("content-length", itoa::Buffer::new().format(content_length));
    headers.insert("connection", "close");
    headers.insert("content-type", "text/plain");
    headers
}

/// Headers for a response with a chunked body.
///
/// If trailers will be written, each trailer name must be declared beforehand with
/// `headers.append("trailer", name)`.
pub fn chunked_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("content-type", "text/plain");
    headers.insert("transfer-encoding", "chunked");
    headers
}

/// Overwrite the values of `target` with the ones in `replacements`.
///
/// Only fields that already exist in `target` are replaced, other fields in `replacements` are
/// ignored.
pub fn replace_headers(target: &mut HeaderMap, replacements: &HeaderMap) {
    for (name, value) in replacements {
        if let Some(current) = target.get_mut(name) {
            value.clone_into(current);
        }
    }
}
