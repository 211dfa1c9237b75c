use std::{
    io,
    pin::Pin,
    task::{Context, Poll},
};
use tokio::io::{AsyncRead, ReadBuf};

use super::*;
use crate::common::ParseResult;
use crate::headers::HeaderError;

/// Reader that returns at most `per_read` bytes on every read.
struct ChunkReader {
    data: &'static [u8],
    per_read: usize,
    pos: usize,
}

impl ChunkReader {
    fn new(data: &'static [u8], per_read: usize) -> Self {
        Self { data, per_read, pos: 0 }
    }
}

impl AsyncRead for ChunkReader {
    fn poll_read(
        mut self: Pin<&mut Self>,
        _: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let me = &mut *self;
        let end = usize::min(me.pos + me.per_read, me.data.len());
        let len = usize::min(end - me.pos, buf.remaining());
        buf.put_slice(&me.data[me.pos..me.pos + len]);
        me.pos += len;
        Poll::Ready(Ok(()))
    }
}

async fn read(data: &'static [u8], per_read: usize) -> Result<Request, RequestError> {
    request_from_reader(ChunkReader::new(data, per_read)).await
}

const CURL_GET: &[u8] = b"GET / HTTP/1.1\r\nHost: localhost:42069\r\nUser-Agent: curl/7.81.0\r\nAccept: */*\r\n\r\n";

const STANDARD_BODY: &[u8] = b"POST /submit HTTP/1.1\r\nHost: localhost:42069\r\nContent-Length: 13\r\n\r\nhello world!\n";

#[tokio::test]
async fn test_request_line() {
    macro_rules! test {
        ($input:expr, $per_read:expr; $m:ident, $target:literal) => {
            let request = read($input, $per_read).await.unwrap();
            let line = request.request_line().unwrap();
            assert_eq!(line.method, Method::$m);
            assert_eq!(line.target, $target);
            assert_eq!(line.version, "1.1");
        };
    }

    test!(CURL_GET, 3; GET, "/");
    test!(b"GET /coffee HTTP/1.1\r\nHost: localhost:42069\r\nUser-Agent: curl/7.81.0\r\nAccept: */*\r\n\r\n", 1; GET, "/coffee");
    test!(b"POST /coffee HTTP/1.1\r\nHost: localhost:42069\r\nUser-Agent: curl/7.81.0\r\nAccept: */*\r\n\r\n", 80; POST, "/coffee");
    test!(b"DELETE /search?q=rust&page=2 HTTP/1.1\r\n\r\n", 5; DELETE, "/search?q=rust&page=2");
    test!(b"OPTIONS * HTTP/1.1\r\n\r\n", 2; OPTIONS, "*");
}

#[tokio::test]
async fn test_chunk_size_independence() {
    let whole = read(CURL_GET, CURL_GET.len()).await.unwrap();

    for per_read in 1..=CURL_GET.len() {
        let request = read(CURL_GET, per_read).await.unwrap();
        assert_eq!(request.request_line(), whole.request_line(), "per read {per_read}");
        assert_eq!(request.headers(), whole.headers(), "per read {per_read}");
        assert!(request.body().is_empty());
    }
}

#[tokio::test]
async fn test_request_line_errors() {
    macro_rules! test {
        ($input:expr, $per_read:expr; $err:pat, $msg:literal) => {
            let err = read($input, $per_read).await.unwrap_err();
            assert!(matches!(err.as_parse_error(), Some($err)), "{err:?}");
            assert_eq!(err.to_string(), $msg);
        };
    }

    test!(
        b"/coffee HTTP/1.1\r\nHost: localhost:42069\r\nUser-Agent: curl/7.81.0\r\nAccept: */*\r\n\r\n", 4;
        ParseError::RequestLineParts(2),
        "error during parsing: request line supposed to have three parts, got: 2"
    );
    test!(
        b"GET  /coffee HTTP/1.1\r\n\r\n", 4;
        ParseError::RequestLineParts(4),
        "error during parsing: request line supposed to have three parts, got: 4"
    );
    test!(
        b"BLA /coffee HTTP/2.1\r\nHost: localhost:42069\r\nUser-Agent: curl/7.81.0\r\nAccept: */*\r\n\r\n", 12;
        ParseError::UnknownMethod(_),
        "error during parsing: BLA is not a valid method"
    );
    test!(
        b"GET /coffee HTTP/2.1\r\nHost: localhost:42069\r\nUser-Agent: curl/7.81.0\r\nAccept: */*\r\n\r\n", 5;
        ParseError::UnsupportedVersion(_),
        "error during parsing: HTTP Version is unsupported: 2.1"
    );
    test!(
        b"GET /coffee HTTP1.1\r\n\r\n", 5;
        ParseError::UnsupportedVersion(_),
        "error during parsing: HTTP Version is unsupported: HTTP1.1"
    );
}

#[tokio::test]
async fn test_headers() {
    let request = read(CURL_GET, 50).await.unwrap();
    assert_eq!(request.headers().get("host"), Some("localhost:42069"));
    assert_eq!(request.headers().get("user-agent"), Some("curl/7.81.0"));
    assert_eq!(request.headers().get("accept"), Some("*/*"));

    let request = read(b"GET / HTTP/1.1\r\na: 1\r\nb: 2\r\nc: 3\r\n\r\n", 50).await.unwrap();
    assert_eq!(request.headers().len(), 3);
    assert_eq!(request.headers().get("a"), Some("1"));
    assert_eq!(request.headers().get("b"), Some("2"));
    assert_eq!(request.headers().get("c"), Some("3"));

    let request = read(b"GET / HTTP/1.1\r\n\r\n", 50).await.unwrap();
    assert!(request.headers().is_empty());

    let request = read(b"GET / HTTP/1.1\r\nHOST: localhost:42069\r\nCACHE-CONTROL: no-cache\r\n\r\n", 7)
        .await
        .unwrap();
    assert_eq!(request.headers().get("host"), Some("localhost:42069"));
    assert_eq!(request.headers().get("cache-control"), Some("no-cache"));

    let request = read(b"GET / HTTP/1.1\r\nAccept: text/html\r\naccept: */*\r\n\r\n", 3).await.unwrap();
    assert_eq!(request.headers().get("accept"), Some("*/*"));
}

#[tokio::test]
async fn test_header_errors() {
    let err = read(b"GET / HTTP/1.1\r\nHost localhost:42069\r\n\r\n", 3).await.unwrap_err();
    assert!(matches!(
        err.as_parse_error(),
        Some(ParseError::Header(HeaderError::InvalidCharacter { ch: ' ', .. }))
    ));

    let err = read(b"GET / HTTP/1.1\r\nHost\r\n\r\n", 3).await.unwrap_err();
    assert_eq!(
        err.as_parse_error(),
        Some(&ParseError::Header(HeaderError::MissingSeparator))
    );

    let err = read(b"GET / HTTP/1.1\r\nHost : localhost:42069\r\n\r\n", 3).await.unwrap_err();
    assert_eq!(
        err.as_parse_error(),
        Some(&ParseError::Header(HeaderError::InvalidFieldName))
    );
}

#[tokio::test]
async fn test_invalid_utf8_is_rejected() {
    let err = read(b"GET /caf\xe9 HTTP/1.1\r\nHost: a\r\n\r\n", 64).await.unwrap_err();
    assert_eq!(err.as_parse_error(), Some(&ParseError::InvalidUtf8));
    assert_eq!(err.to_string(), "error during parsing: request line is not valid UTF-8");

    let err = read(b"GET /cafe HTTP/1.1\r\nX-Name: Jos\xe9\r\n\r\n", 3).await.unwrap_err();
    assert_eq!(
        err.as_parse_error(),
        Some(&ParseError::Header(HeaderError::InvalidUtf8))
    );

    // multi-byte characters are kept as is
    let request = read("GET /caf\u{e9} HTTP/1.1\r\nX-Name: Jos\u{e9}\r\n\r\n".as_bytes(), 1)
        .await
        .unwrap();
    assert_eq!(request.target(), "/caf\u{e9}");
    assert_eq!(request.headers().get("x-name"), Some("Jos\u{e9}"));
}

#[tokio::test]
async fn test_body() {
    let whole = read(STANDARD_BODY, STANDARD_BODY.len()).await.unwrap();
    assert_eq!(whole.body().as_ref(), b"hello world!\n");

    for per_read in 1..=STANDARD_BODY.len() {
        let request = read(STANDARD_BODY, per_read).await.unwrap();
        assert_eq!(request.body(), whole.body(), "per read {per_read}");
        assert_eq!(request.method(), Some(Method::POST));
        assert_eq!(request.target(), "/submit");
    }

    let request = read(b"POST /submit HTTP/1.1\r\nContent-Length: 0\r\n\r\n", 3).await.unwrap();
    assert!(request.body().is_empty());

    // without `Content-Length` trailing bytes are not a body
    let request = read(b"POST /submit HTTP/1.1\r\nHost: a\r\n\r\nignored", 64).await.unwrap();
    assert!(request.body().is_empty());
}

#[tokio::test]
async fn test_body_larger_than_initial_buffer() {
    const BODY: [u8; 5000] = [b'x'; 5000];

    let mut message = b"POST /upload HTTP/1.1\r\nContent-Length: 5000\r\n\r\n".to_vec();
    message.extend_from_slice(&BODY);
    let message: &'static [u8] = message.leak();

    for per_read in [1, 7, 1000, 4096, message.len()] {
        let request = read(message, per_read).await.unwrap();
        assert_eq!(request.body().as_ref(), &BODY[..], "per read {per_read}");
    }
}

#[tokio::test]
async fn test_body_too_long() {
    let err = read(b"POST /submit HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello world", 1024)
        .await
        .unwrap_err();
    assert_eq!(
        err.as_parse_error(),
        Some(&ParseError::BodyTooLong { len: 11, declared: 5 })
    );
    assert_eq!(
        err.to_string(),
        "error during parsing: length of body (11) is greater than the content-length (5)"
    );
}

#[tokio::test]
async fn test_invalid_content_length() {
    let err = read(b"POST /submit HTTP/1.1\r\nContent-Length: lots\r\n\r\nhello", 1024)
        .await
        .unwrap_err();
    assert!(matches!(
        err.as_parse_error(),
        Some(ParseError::InvalidContentLength(value)) if value == "lots"
    ));
}

#[tokio::test]
async fn test_end_of_stream_is_lenient() {
    let request = read(b"GE", 3).await.unwrap();
    assert!(request.request_line().is_none());
    assert_eq!(request.target(), "");

    let request = read(b"", 3).await.unwrap();
    assert!(request.request_line().is_none());

    let request = read(b"GET / HTTP/1.1\r\nConnection: keep-alive\r\n", 3).await.unwrap();
    assert_eq!(request.method(), Some(Method::GET));
    assert_eq!(request.target(), "/");
    assert_eq!(request.headers().get("connection"), Some("keep-alive"));

    let request = read(b"POST /submit HTTP/1.1\r\nContent-Length: 20\r\n\r\npartial content", 3)
        .await
        .unwrap();
    assert_eq!(request.body().as_ref(), b"partial content");
}

#[test]
fn test_parser_states() {
    let mut parser = RequestParser::new();
    assert_eq!(parser.state(), ParseState::Initialized);

    assert_eq!(parser.parse_single(b"GET / HTTP/1.1"), ParseResult::Pending);
    assert_eq!(parser.state(), ParseState::Initialized);

    assert_eq!(parser.parse_single(b"GET / HTTP/1.1\r\nHost"), ParseResult::Ok(16));
    assert_eq!(parser.state(), ParseState::ParsingHeaders);

    assert_eq!(parser.parse_single(b"Host: a\r\n"), ParseResult::Ok(9));
    assert_eq!(parser.state(), ParseState::ParsingHeaders);

    // end of headers goes through the body state even without a body
    assert_eq!(parser.parse_single(b"\r\n"), ParseResult::Ok(2));
    assert_eq!(parser.state(), ParseState::ParsingBody);

    assert_eq!(parser.parse_single(b""), ParseResult::Ok(0));
    assert_eq!(parser.state(), ParseState::Done);

    assert_eq!(parser.parse_single(b"more"), ParseResult::Err(ParseError::Done));
    assert_eq!(parser.parse(b"more"), Err(ParseError::Done));

    let request = parser.into_request();
    assert_eq!(request.headers().get("host"), Some("a"));
}

#[test]
fn test_parse_loop() {
    let mut parser = RequestParser::new();

    // partial field line is left for the next call
    let consumed = parser.parse(b"PUT /a HTTP/1.1\r\nContent-Length: 4\r\nX-Pa").unwrap();
    assert_eq!(consumed, 36);
    assert_eq!(parser.state(), ParseState::ParsingHeaders);

    let consumed = parser.parse(b"X-Partial: yes\r\n\r\nab").unwrap();
    assert_eq!(consumed, 20);
    assert_eq!(parser.state(), ParseState::ParsingBody);

    assert_eq!(parser.parse(b"").unwrap(), 0);
    assert_eq!(parser.state(), ParseState::ParsingBody);

    assert_eq!(parser.parse(b"cd").unwrap(), 2);
    assert!(parser.is_done());

    let request = parser.into_request();
    assert_eq!(request.body().as_ref(), b"abcd");
    assert_eq!(request.headers().get("x-partial"), Some("yes"));
}

#[test]
fn test_parse_body_overflow_in_one_buffer() {
    let mut parser = RequestParser::new();
    let err = parser
        .parse(b"POST / HTTP/1.1\r\nContent-Length: 3\r\n\r\nabcd")
        .unwrap_err();
    assert_eq!(err, ParseError::BodyTooLong { len: 4, declared: 3 });
}
