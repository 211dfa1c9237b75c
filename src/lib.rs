//! HTTP/1.1 Wire Toolkit
//!
//! Incremental request parsing, response writing and a one-request-per-connection server.
#![warn(missing_debug_implementations)]

mod log;
mod common;
mod matches;

pub mod http;
pub mod headers;
pub mod body;
pub mod request;
pub mod response;
pub mod server;

pub use common::ParseResult;
pub use matches::is_token_char;
pub use headers::HeaderMap;
pub use request::{Request, request_from_reader};
pub use response::ResponseWriter;
pub use server::{Handler, HandlerError, Server};
