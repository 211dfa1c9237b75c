//! HTTP Request.
//!
//! A [`Request`] is read from a byte stream with [`request_from_reader`], which drives a
//! [`RequestParser`] over whatever the stream returns on each read.
use bytes::Bytes;

use crate::{headers::HeaderMap, http::Method};

mod error;
mod parser;
mod reader;

pub use error::{Kind, ParseError, RequestError};
pub use parser::{ParseState, RequestParser};
pub use reader::request_from_reader;

#[cfg(test)]
mod test;

/// HTTP Request line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestLine {
    pub method: Method,
    /// Request target, e.g: `/search?q=rust`, kept as is.
    pub target: String,
    /// Version number without the `HTTP/` prefix, which is always `"1.1"`.
    pub version: String,
}

/// HTTP Request.
#[derive(Clone, Debug, Default)]
pub struct Request {
    request_line: Option<RequestLine>,
    headers: HeaderMap,
    body: Bytes,
}

/// Constructor
impl Request {
    /// Create [`Request`] from its components.
    #[inline]
    pub fn new(request_line: Option<RequestLine>, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            request_line,
            headers,
            body,
        }
    }
}

impl Request {
    /// Returns shared reference to [`RequestLine`].
    ///
    /// This is `None` if the stream ended before a complete request line was received.
    #[inline]
    pub fn request_line(&self) -> Option<&RequestLine> {
        self.request_line.as_ref()
    }

    /// Returns the request method.
    #[inline]
    pub fn method(&self) -> Option<Method> {
        self.request_line.as_ref().map(|line| line.method)
    }

    /// Returns the request target, or an empty string if there is no request line.
    #[inline]
    pub fn target(&self) -> &str {
        self.request_line
            .as_ref()
            .map_or("", |line| line.target.as_str())
    }

    /// Returns shared reference to [`HeaderMap`].
    #[inline]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns mutable reference to [`HeaderMap`].
    #[inline]
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Returns the request body.
    #[inline]
    pub fn body(&self) -> &Bytes {
        &self.body
    }
}

/// Destructor
impl Request {
    /// Destruct request into its components.
    #[inline]
    pub fn into_parts(self) -> (Option<RequestLine>, HeaderMap, Bytes) {
        (self.request_line, self.headers, self.body)
    }

    /// Destruct request into its body.
    #[inline]
    pub fn into_body(self) -> Bytes {
        self.body
    }
}
