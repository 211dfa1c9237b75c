//! Types shared by the incremental parsers.

/// Outcome of a single incremental parsing step.
///
/// Running out of bytes is not an error: it is reported as [`Pending`] so that callers can read
/// more input and retry with the extended buffer.
///
/// [`Pending`]: ParseResult::Pending
#[derive(Debug, PartialEq, Eq)]
pub enum ParseResult<T, E> {
    /// Bytes is not sufficient for parsing, more IO read is required.
    Pending,
    /// Parse success.
    Ok(T),
    /// Parse failed.
    Err(E),
}

impl<T, E> ParseResult<T, E> {
    /// Returns `true` if the parse result is [`Pending`].
    ///
    /// [`Pending`]: ParseResult::Pending
    #[inline]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Returns `true` if the parse result is [`Ok`].
    ///
    /// [`Ok`]: ParseResult::Ok
    #[inline]
    pub const fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(..))
    }

    /// Returns `true` if the parse result is [`Err`].
    ///
    /// [`Err`]: ParseResult::Err
    #[inline]
    pub const fn is_err(&self) -> bool {
        matches!(self, Self::Err(..))
    }

    /// Maps the error value, leaving [`Pending`] and [`Ok`] untouched.
    ///
    /// [`Pending`]: ParseResult::Pending
    /// [`Ok`]: ParseResult::Ok
    #[inline]
    pub fn map_err<F, O>(self, f: O) -> ParseResult<T, F>
    where
        O: FnOnce(E) -> F,
    {
        match self {
            Self::Pending => ParseResult::Pending,
            Self::Ok(ok) => ParseResult::Ok(ok),
            Self::Err(err) => ParseResult::Err(f(err)),
        }
    }

    /// Convert to `Option<Result<T, E>>`, where `None` is [`Pending`].
    ///
    /// [`Pending`]: ParseResult::Pending
    #[inline]
    pub fn into_option(self) -> Option<Result<T, E>> {
        match self {
            Self::Pending => None,
            Self::Ok(ok) => Some(Ok(ok)),
            Self::Err(err) => Some(Err(err)),
        }
    }
}

pub(crate) const CRLF: &[u8; 2] = b"\r\n";

/// Returns the index of the first CRLF in `bytes`.
pub(crate) fn find_crlf(bytes: &[u8]) -> Option<usize> {
    bytes.windows(CRLF.len()).position(|w| w == CRLF)
}
