use bytes::{Buf, Bytes, BytesMut};

use super::ChunkedError;
use crate::common::{CRLF, ParseResult, find_crlf};
use crate::headers::{HeaderMap, Parsed};

/// Incremental decoder for `transfer-encoding: chunked` bodies.
///
/// Chunk extensions are ignored. Trailer fields after the last chunk are collected into a
/// [`HeaderMap`], see [`ChunkedDecoder::trailers`].
#[derive(Clone, Debug, Default)]
pub struct ChunkedDecoder {
    phase: Phase,
    trailers: HeaderMap,
}

#[derive(Clone, Copy, Debug, Default)]
enum Phase {
    #[default]
    Size,
    Data(usize),
    DataEnd,
    Trailers,
    Eof,
}

impl ChunkedDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the last chunk and trailers have been decoded.
    pub fn is_eof(&self) -> bool {
        matches!(self.phase, Phase::Eof)
    }

    /// Returns the trailer fields decoded so far.
    pub fn trailers(&self) -> &HeaderMap {
        &self.trailers
    }

    pub fn into_trailers(self) -> HeaderMap {
        self.trailers
    }

    /// Decode the next piece of chunk data from `buffer`, returns `None` once the body ended.
    ///
    /// Decoded bytes are removed from `buffer`. The returned data may be only part of a chunk if
    /// `buffer` does not hold all of it yet.
    pub fn decode(&mut self, buffer: &mut BytesMut) -> ParseResult<Option<Bytes>, ChunkedError> {
        use ParseResult as Result;

        loop {
            match self.phase {
                Phase::Size => {
                    let Some(end) = find_crlf(buffer) else {
                        return Result::Pending;
                    };
                    let line = &buffer[..end];
                    let digits = match line.iter().position(|&b| b == b';') {
                        Some(ext) => &line[..ext],
                        None => line,
                    };
                    let Some(size) = parse_hex(digits) else {
                        return Result::Err(ChunkedError::InvalidChunkSize);
                    };
                    buffer.advance(end + CRLF.len());
                    self.phase = match size {
                        0 => Phase::Trailers,
                        size => Phase::Data(size),
                    };
                }
                Phase::Data(remaining) => {
                    if buffer.is_empty() {
                        return Result::Pending;
                    }
                    let len = remaining.min(buffer.len());
                    let data = buffer.split_to(len).freeze();
                    self.phase = match remaining - len {
                        0 => Phase::DataEnd,
                        leftover => Phase::Data(leftover),
                    };
                    return Result::Ok(Some(data));
                }
                Phase::DataEnd => match buffer.first_chunk::<2>() {
                    Some(CRLF) => {
                        buffer.advance(CRLF.len());
                        self.phase = Phase::Size;
                    }
                    Some(_) => return Result::Err(ChunkedError::InvalidSeparator),
                    None => return Result::Pending,
                },
                Phase::Trailers => match self.trailers.parse(buffer) {
                    Result::Ok(Parsed { consumed, done }) => {
                        buffer.advance(consumed);
                        if done {
                            self.phase = Phase::Eof;
                        }
                    }
                    Result::Pending => return Result::Pending,
                    Result::Err(err) => return Result::Err(err.into()),
                },
                Phase::Eof => return Result::Ok(None),
            }
        }
    }
}

fn parse_hex(digits: &[u8]) -> Option<usize> {
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_hexdigit) {
        return None;
    }
    let digits = std::str::from_utf8(digits).ok()?;
    usize::from_str_radix(digits, 16).ok()
}

/// Decode a complete chunked body, returning the data and trailers.
///
/// Bytes after the end of the body are ignored.
pub fn decode_chunked(bytes: &[u8]) -> Result<(Bytes, HeaderMap), ChunkedError> {
    let mut buffer = BytesMut::from(bytes);
    let mut decoder = ChunkedDecoder::new();
    let mut body = BytesMut::new();

    loop {
        match decoder.decode(&mut buffer) {
            ParseResult::Ok(Some(data)) => body.extend_from_slice(&data),
            ParseResult::Ok(None) => break,
            ParseResult::Pending => return Err(ChunkedError::Incomplete),
            ParseResult::Err(err) => return Err(err),
        }
    }

    Ok((body.freeze(), decoder.into_trailers()))
}
