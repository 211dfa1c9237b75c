//! Incremental HTTP/1.1 request parser.
//!
//! [`RequestParser::parse_single`] performs one step of the state machine on whatever bytes are
//! given. If the bytes do not hold a complete request line or field line, it returns
//! [`ParseResult::Pending`] and consumes nothing, so the caller can read more and call again
//! with the extended buffer.
use bytes::BytesMut;
use std::cmp::Ordering;

use super::{ParseError, Request, RequestLine};
use crate::common::{CRLF, ParseResult, find_crlf};
use crate::headers::{HeaderMap, Parsed};
use crate::http::{HTTP_VERSION, Method};

/// Request parsing phase.
///
/// Phases only ever move forward, in declaration order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ParseState {
    #[default]
    Initialized,
    ParsingHeaders,
    ParsingBody,
    Done,
}

/// Request parser state machine.
#[derive(Debug, Default)]
pub struct RequestParser {
    state: ParseState,
    request_line: Option<RequestLine>,
    headers: HeaderMap,
    body: BytesMut,
}

impl RequestParser {
    /// Create new parser, waiting for a request line.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn state(&self) -> ParseState {
        self.state
    }

    #[inline]
    pub fn is_done(&self) -> bool {
        self.state == ParseState::Done
    }

    /// Parse as much of `bytes` as possible, returning the number of bytes consumed.
    ///
    /// Stops when the request is complete or when more bytes are required. Any unconsumed bytes
    /// must be given again, at the front of the buffer, on the next call.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Done`] if the request is already complete, or the error of the
    /// first step that fails.
    pub fn parse(&mut self, bytes: &[u8]) -> Result<usize, ParseError> {
        if self.is_done() {
            return Err(ParseError::Done);
        }

        let mut total = 0;

        while !self.is_done() {
            match self.parse_single(&bytes[total..]) {
                ParseResult::Ok(consumed) => total += consumed,
                ParseResult::Pending => break,
                ParseResult::Err(err) => return Err(err),
            }
        }

        Ok(total)
    }

    /// Perform a single parsing step for the current state.
    ///
    /// `Ok(0)` is only returned together with a state transition, insufficient input is always
    /// [`ParseResult::Pending`].
    pub fn parse_single(&mut self, bytes: &[u8]) -> ParseResult<usize, ParseError> {
        use ParseResult as Result;

        match self.state {
            ParseState::Initialized => match parse_request_line(bytes) {
                Result::Ok((request_line, consumed)) => {
                    self.request_line = Some(request_line);
                    self.state = ParseState::ParsingHeaders;
                    Result::Ok(consumed)
                }
                Result::Pending => Result::Pending,
                Result::Err(err) => Result::Err(err),
            },
            ParseState::ParsingHeaders => match self.headers.parse(bytes) {
                Result::Ok(Parsed { consumed, done }) => {
                    if done {
                        self.state = ParseState::ParsingBody;
                    }
                    Result::Ok(consumed)
                }
                Result::Pending => Result::Pending,
                Result::Err(err) => Result::Err(err.into()),
            },
            ParseState::ParsingBody => self.parse_body(bytes),
            ParseState::Done => Result::Err(ParseError::Done),
        }
    }

    fn parse_body(&mut self, bytes: &[u8]) -> ParseResult<usize, ParseError> {
        use ParseResult as Result;

        let declared = match self.content_length() {
            Ok(Some(declared)) => declared,
            Ok(None) => {
                self.state = ParseState::Done;
                return Result::Ok(0);
            }
            Err(err) => return Result::Err(err),
        };

        if bytes.is_empty() && self.body.len() < declared {
            return Result::Pending;
        }

        self.body.extend_from_slice(bytes);

        match self.body.len().cmp(&declared) {
            Ordering::Less => Result::Ok(bytes.len()),
            Ordering::Equal => {
                self.state = ParseState::Done;
                Result::Ok(bytes.len())
            }
            Ordering::Greater => Result::Err(ParseError::BodyTooLong {
                len: self.body.len(),
                declared,
            }),
        }
    }

    fn content_length(&self) -> Result<Option<usize>, ParseError> {
        match self.headers.get("content-length") {
            Some(value) => match value.parse() {
                Ok(len) => Ok(Some(len)),
                Err(_) => Err(ParseError::InvalidContentLength(value.to_owned())),
            },
            None => Ok(None),
        }
    }

    /// Mark the request as complete regardless of the current state.
    ///
    /// Used when the stream ends early, whatever was parsed so far is the request.
    #[inline]
    pub fn finish(&mut self) {
        self.state = ParseState::Done;
    }

    /// Returns the parsed [`Request`].
    pub fn into_request(self) -> Request {
        Request::new(self.request_line, self.headers, self.body.freeze())
    }
}

// ===== Request Line =====

/// Parse `METHOD SP TARGET SP HTTP/1.1 CRLF`, returning the line and its length including the
/// terminator.
fn parse_request_line(bytes: &[u8]) -> ParseResult<(RequestLine, usize), ParseError> {
    use ParseResult as Result;

    let Some(end) = find_crlf(bytes) else {
        return Result::Pending;
    };

    let Ok(line) = std::str::from_utf8(&bytes[..end]) else {
        return Result::Err(ParseError::InvalidUtf8);
    };
    let parts = line.split(' ').collect::<Vec<_>>();
    let &[method, target, protocol] = parts.as_slice() else {
        return Result::Err(ParseError::RequestLineParts(parts.len()));
    };

    let method = match method.parse::<Method>() {
        Ok(ok) => ok,
        Err(err) => return Result::Err(err.into()),
    };

    let version = match protocol.split_once('/') {
        Some(("HTTP", HTTP_VERSION)) => HTTP_VERSION,
        Some(("HTTP", version)) => {
            return Result::Err(ParseError::UnsupportedVersion(version.to_owned()));
        }
        _ => return Result::Err(ParseError::UnsupportedVersion(protocol.to_owned())),
    };

    Result::Ok((
        RequestLine {
            method,
            target: target.to_owned(),
            version: version.to_owned(),
        },
        end + CRLF.len(),
    ))
}
