use bytes::{BufMut, BytesMut};
use tokio::io::{AsyncWrite, AsyncWriteExt};

use super::WriteError;
use crate::common::CRLF;
use crate::headers::HeaderMap;
use crate::http::StatusCode;

const LAST_CHUNK: &[u8] = b"0\r\n";

/// Response writing phase.
///
/// Phases only ever move forward, in declaration order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WriteState {
    #[default]
    Initialized,
    Headers,
    Body,
    Done,
}

/// Writes an HTTP/1.1 response to `W`.
///
/// The response is written in order: [`write_status_line`], [`write_headers`], then the body.
/// The body is either written at once with [`write_body`], or as a chunked body with any
/// number of [`write_chunked_body`] calls followed by [`write_chunked_body_done`] or
/// [`write_trailers`]. Calling a method out of order returns [`WriteError::State`] and writes
/// nothing.
///
/// It is the caller's responsibility that the headers match the body, i.e. `content-length`
/// for a fixed body, `transfer-encoding: chunked` and a `trailer` declaration for chunked ones.
///
/// [`write_status_line`]: ResponseWriter::write_status_line
/// [`write_headers`]: ResponseWriter::write_headers
/// [`write_body`]: ResponseWriter::write_body
/// [`write_chunked_body`]: ResponseWriter::write_chunked_body
/// [`write_chunked_body_done`]: ResponseWriter::write_chunked_body_done
/// [`write_trailers`]: ResponseWriter::write_trailers
#[derive(Debug)]
pub struct ResponseWriter<W> {
    io: W,
    state: WriteState,
    buffer: BytesMut,
}

impl<W> ResponseWriter<W> {
    /// Create new [`ResponseWriter`] that writes to `io`.
    pub fn new(io: W) -> Self {
        Self {
            io,
            state: WriteState::Initialized,
            buffer: BytesMut::new(),
        }
    }

    #[inline]
    pub fn state(&self) -> WriteState {
        self.state
    }

    /// Returns shared reference to the underlying IO.
    #[inline]
    pub fn get_ref(&self) -> &W {
        &self.io
    }

    /// Returns the underlying IO.
    #[inline]
    pub fn into_inner(self) -> W {
        self.io
    }

    fn expect_state(&self, expected: WriteState) -> Result<(), WriteError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(WriteError::State {
                expected,
                actual: self.state,
            })
        }
    }
}

impl<W> ResponseWriter<W>
where
    W: AsyncWrite + Unpin,
{
    /// Write `HTTP/1.1 <code> <reason>`.
    ///
    /// Only `200`, `400` and `500` are supported.
    pub async fn write_status_line(&mut self, status: StatusCode) -> Result<(), WriteError> {
        self.expect_state(WriteState::Initialized)?;
        let Some(line) = status.status_line() else {
            return Err(WriteError::UnrecognizedStatus(status));
        };
        self.io.write_all(line.as_bytes()).await?;
        self.state = WriteState::Headers;
        Ok(())
    }

    /// Write all header fields followed by the empty line.
    pub async fn write_headers(&mut self, headers: &HeaderMap) -> Result<(), WriteError> {
        self.expect_state(WriteState::Headers)?;
        put_fields(&mut self.buffer, headers);
        self.buffer.put_slice(CRLF);
        self.write_buffer().await?;
        self.state = WriteState::Body;
        Ok(())
    }

    /// Write the whole body, completing the response.
    pub async fn write_body(&mut self, body: &[u8]) -> Result<usize, WriteError> {
        self.expect_state(WriteState::Body)?;
        self.io.write_all(body).await?;
        self.io.flush().await?;
        self.state = WriteState::Done;
        Ok(body.len())
    }

    /// Write `chunk` as a single chunk of a chunked body.
    ///
    /// An empty `chunk` is written as a zero sized chunk, which the peer reads as the end of
    /// the body. Use [`write_chunked_body_done`] or [`write_trailers`] to end the body instead.
    ///
    /// [`write_chunked_body_done`]: ResponseWriter::write_chunked_body_done
    /// [`write_trailers`]: ResponseWriter::write_trailers
    pub async fn write_chunked_body(&mut self, chunk: &[u8]) -> Result<usize, WriteError> {
        self.expect_state(WriteState::Body)?;
        put_hex(&mut self.buffer, chunk.len());
        self.buffer.put_slice(CRLF);
        self.write_buffer().await?;
        self.io.write_all(chunk).await?;
        self.io.write_all(CRLF).await?;
        Ok(chunk.len())
    }

    /// Write the last chunk without trailers, completing the response.
    pub async fn write_chunked_body_done(&mut self) -> Result<(), WriteError> {
        self.expect_state(WriteState::Body)?;
        self.buffer.put_slice(LAST_CHUNK);
        self.buffer.put_slice(CRLF);
        self.write_buffer().await?;
        self.io.flush().await?;
        self.state = WriteState::Done;
        Ok(())
    }

    /// Write the last chunk followed by `trailers`, completing the response.
    pub async fn write_trailers(&mut self, trailers: &HeaderMap) -> Result<(), WriteError> {
        self.expect_state(WriteState::Body)?;
        self.buffer.put_slice(LAST_CHUNK);
        put_fields(&mut self.buffer, trailers);
        self.buffer.put_slice(CRLF);
        self.write_buffer().await?;
        self.io.flush().await?;
        self.state = WriteState::Done;
        Ok(())
    }

    async fn write_buffer(&mut self) -> Result<(), WriteError> {
        let result = self.io.write_all(&self.buffer).await;
        self.buffer.clear();
        Ok(result?)
    }
}

fn put_fields(buffer: &mut BytesMut, fields: &HeaderMap) {
    for (name, value) in fields {
        buffer.put_slice(name.as_bytes());
        buffer.put_slice(b": ");
        buffer.put_slice(value.as_bytes());
        buffer.put_slice(CRLF);
    }
}

fn put_hex(buffer: &mut BytesMut, mut value: usize) {
    const DIGITS: &[u8; 16] = b"0123456789ABCDEF";

    let mut digits = [0u8; usize::BITS as usize / 4];
    let mut start = digits.len();
    loop {
        start -= 1;
        digits[start] = DIGITS[value & 0xF];
        value >>= 4;
        if value == 0 {
            break;
        }
    }
    buffer.put_slice(&digits[start..]);
}
