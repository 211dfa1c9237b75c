use std::io;

use crate::{headers::HeaderError, http::UnknownMethod};

/// An error that can occur while parsing a request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseError {
    /// Request line does not consist of exactly three space separated parts.
    RequestLineParts(usize),
    /// Method is not recognized.
    UnknownMethod(UnknownMethod),
    /// Request line is not valid UTF-8.
    InvalidUtf8,
    /// Protocol version other than `HTTP/1.1`.
    UnsupportedVersion(String),
    /// Invalid header field line.
    Header(HeaderError),
    /// `Content-Length` is not a decimal number.
    InvalidContentLength(String),
    /// More body bytes received than `Content-Length` declares.
    BodyTooLong { len: usize, declared: usize },
    /// Parser was called again after the request was complete.
    Done,
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::UnknownMethod(err) => Some(err),
            Self::Header(err) => Some(err),
            _ => None,
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::RequestLineParts(n) => {
                write!(f, "request line supposed to have three parts, got: {n}")
            }
            Self::UnknownMethod(err) => std::fmt::Display::fmt(err, f),
            Self::InvalidUtf8 => f.write_str("request line is not valid UTF-8"),
            Self::UnsupportedVersion(version) => {
                write!(f, "HTTP Version is unsupported: {version}")
            }
            Self::Header(err) => std::fmt::Display::fmt(err, f),
            Self::InvalidContentLength(value) => write!(f, "invalid content-length: {value:?}"),
            Self::BodyTooLong { len, declared } => write!(
                f,
                "length of body ({len}) is greater than the content-length ({declared})"
            ),
            Self::Done => f.write_str("trying to read data in done state"),
        }
    }
}

impl From<HeaderError> for ParseError {
    #[inline]
    fn from(v: HeaderError) -> Self {
        Self::Header(v)
    }
}

impl From<UnknownMethod> for ParseError {
    #[inline]
    fn from(v: UnknownMethod) -> Self {
        Self::UnknownMethod(v)
    }
}

// ===== Request Error =====

/// An error that can occur while reading a request from a stream.
pub struct RequestError {
    kind: Box<Kind>,
}

#[derive(Debug)]
pub enum Kind {
    Parse(ParseError),
    Io(io::Error),
}

impl RequestError {
    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    /// Returns the parse error, if this error was caused by malformed input.
    pub fn as_parse_error(&self) -> Option<&ParseError> {
        match self.kind.as_ref() {
            Kind::Parse(err) => Some(err),
            Kind::Io(_) => None,
        }
    }
}

impl From<ParseError> for RequestError {
    #[inline]
    fn from(v: ParseError) -> Self {
        Self {
            kind: Box::new(Kind::Parse(v)),
        }
    }
}

impl From<io::Error> for RequestError {
    #[inline]
    fn from(v: io::Error) -> Self {
        Self {
            kind: Box::new(Kind::Io(v)),
        }
    }
}

impl std::error::Error for RequestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self.kind.as_ref() {
            Kind::Parse(err) => Some(err),
            Kind::Io(err) => Some(err),
        }
    }
}

impl std::fmt::Display for RequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind.as_ref() {
            Kind::Parse(err) => write!(f, "error during parsing: {err}"),
            Kind::Io(err) => write!(f, "error reading request: {err}"),
        }
    }
}

impl std::fmt::Debug for RequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("RequestError").field(&self.kind).finish()
    }
}
