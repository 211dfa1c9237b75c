use super::{HeaderError, HeaderMap};
use crate::common::{CRLF, ParseResult, find_crlf};
use crate::matches::is_token_char;

/// Progress of a successful [`HeaderMap::parse`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Parsed {
    /// Number of bytes consumed from the input.
    pub consumed: usize,
    /// `true` if the empty line ending the header section was consumed.
    pub done: bool,
}

impl HeaderMap {
    /// Parse a single field line from the start of `bytes` into the map.
    ///
    /// Returns [`ParseResult::Pending`] if `bytes` does not contain a complete line yet. An empty
    /// line marks the end of the header section and is reported with [`Parsed::done`].
    ///
    /// Leading spaces of the field name are ignored, but whitespace between the name and the
    /// `:` is an error. The value is trimmed on both sides. The name is stored lower-cased,
    /// replacing any previous value.
    ///
    /// Field lines must be valid UTF-8, bytes are never replaced.
    ///
    /// On error nothing is consumed and the map is left unchanged.
    pub fn parse(&mut self, bytes: &[u8]) -> ParseResult<Parsed, HeaderError> {
        use ParseResult as Result;

        if bytes.starts_with(CRLF) {
            return Result::Ok(Parsed {
                consumed: CRLF.len(),
                done: true,
            });
        }

        let Some(end) = find_crlf(bytes) else {
            return Result::Pending;
        };
        let Ok(line) = std::str::from_utf8(&bytes[..end]) else {
            return Result::Err(HeaderError::InvalidUtf8);
        };

        let Some((name, value)) = line.split_once(':') else {
            return Result::Err(HeaderError::MissingSeparator);
        };

        let name = name.trim_start_matches(' ');
        if name.is_empty() || name.ends_with([' ', '\t']) {
            return Result::Err(HeaderError::InvalidFieldName);
        }
        if let Some(ch) = name.chars().find(|&ch| !is_token_char(ch)) {
            return Result::Err(HeaderError::InvalidCharacter {
                name: name.to_owned(),
                ch,
            });
        }

        let value = value.trim_matches([' ', '\t']);

        self.insert(name, value);

        Result::Ok(Parsed {
            consumed: end + CRLF.len(),
            done: false,
        })
    }
}
