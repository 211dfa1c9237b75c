use crate::headers::HeaderError;

/// An error that can occur when decoding a chunked body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChunkedError {
    /// Chunk size is not a hexadecimal number.
    InvalidChunkSize,
    /// Chunk data is not followed by CRLF.
    InvalidSeparator,
    /// Invalid trailer field.
    Trailer(HeaderError),
    /// Input ended before the last chunk.
    Incomplete,
}

impl From<HeaderError> for ChunkedError {
    #[inline]
    fn from(v: HeaderError) -> Self {
        Self::Trailer(v)
    }
}

impl std::error::Error for ChunkedError {}

impl std::fmt::Display for ChunkedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidChunkSize => f.write_str("invalid chunk size"),
            Self::InvalidSeparator => f.write_str("chunk data is not terminated by CRLF"),
            Self::Trailer(err) => write!(f, "invalid trailer: {err}"),
            Self::Incomplete => f.write_str("chunked body is incomplete"),
        }
    }
}
