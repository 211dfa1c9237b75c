//! HTTP header fields.
//!
//! [`HeaderMap`] keeps one value per lower-cased field name and knows how to parse itself from
//! a byte stream one field line at a time, see [`HeaderMap::parse`].
mod error;
mod map;
mod parse;

pub use error::HeaderError;
pub use map::{HeaderMap, Iter};
pub use parse::Parsed;
