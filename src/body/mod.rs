//! Message body codecs.
mod chunked;
mod error;

pub use chunked::{ChunkedDecoder, decode_chunked};
pub use error::ChunkedError;
