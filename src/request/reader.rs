use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt};

use super::{Request, RequestError, RequestParser};
use crate::log::debug;

const INITIAL_BUFFER_SIZE: usize = 1024;

/// Read a single [`Request`] from `reader`.
///
/// Reads are fed to a [`RequestParser`] as they arrive, so any split of the message across
/// reads gives the same result. If the stream ends before the request is complete, whatever has
/// been parsed so far is returned without error, including a request without a request line
/// or with a shorter body than `Content-Length` declares.
///
/// # Errors
///
/// Returns an error if reading fails or if the received bytes are not a valid request.
pub async fn request_from_reader<R>(mut reader: R) -> Result<Request, RequestError>
where
    R: AsyncRead + Unpin,
{
    let mut buffer = ReadBuffer::with_capacity(INITIAL_BUFFER_SIZE);
    let mut parser = RequestParser::new();

    while !parser.is_done() {
        let read = reader.read(buffer.spare_mut()).await?;
        if read == 0 {
            debug!("stream ended in {:?} state", parser.state());
            parser.finish();
            break;
        }
        buffer.fill(read);

        let consumed = parser.parse(buffer.filled())?;
        buffer.consume(consumed);
    }

    Ok(parser.into_request())
}

/// Growable read buffer.
///
/// `buf[..filled]` holds bytes that are read but not yet consumed by the parser, the rest is
/// free space for the next read.
#[derive(Debug)]
struct ReadBuffer {
    buf: BytesMut,
    filled: usize,
}

impl ReadBuffer {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::zeroed(capacity.max(1)),
            filled: 0,
        }
    }

    /// Returns the free tail, doubling the buffer first if it is full.
    fn spare_mut(&mut self) -> &mut [u8] {
        if self.filled == self.buf.len() {
            let len = self.buf.len();
            self.buf.resize(len * 2, 0);
        }
        &mut self.buf[self.filled..]
    }

    fn fill(&mut self, read: usize) {
        debug_assert!(self.filled + read <= self.buf.len());
        self.filled += read;
    }

    fn filled(&self) -> &[u8] {
        &self.buf[..self.filled]
    }

    /// Drop the first `consumed` bytes, moving the rest to the front.
    fn consume(&mut self, consumed: usize) {
        if consumed == 0 {
            return;
        }
        self.buf.copy_within(consumed..self.filled, 0);
        self.filled -= consumed;
    }

    #[cfg(test)]
    fn capacity(&self) -> usize {
        self.buf.len()
    }
}

#[cfg(test)]
mod test {
    use super::ReadBuffer;

    #[test]
    fn read_buffer_grow_and_compact() {
        let mut buffer = ReadBuffer::with_capacity(4);

        buffer.spare_mut()[..4].copy_from_slice(b"GET ");
        buffer.fill(4);
        assert_eq!(buffer.capacity(), 4);

        let spare = buffer.spare_mut();
        assert_eq!(spare.len(), 4);
        spare[..2].copy_from_slice(b"/ ");
        buffer.fill(2);
        assert_eq!(buffer.capacity(), 8);
        assert_eq!(buffer.filled(), b"GET / ");

        buffer.consume(4);
        assert_eq!(buffer.filled(), b"/ ");
        assert_eq!(buffer.spare_mut().len(), 6);
    }
}
