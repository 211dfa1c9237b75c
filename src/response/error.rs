use std::io;

use super::WriteState;
use crate::http::StatusCode;

/// An error that can occur while writing a response.
#[derive(Debug)]
pub enum WriteError {
    /// Writer method called out of order.
    State {
        expected: WriteState,
        actual: WriteState,
    },
    /// Status code without a known reason phrase.
    UnrecognizedStatus(StatusCode),
    /// Writing to the underlying IO failed.
    Io(io::Error),
}

impl WriteError {
    /// Returns `true` if the error is caused by calling writer methods out of order.
    pub fn is_state(&self) -> bool {
        matches!(self, Self::State { .. })
    }
}

impl From<io::Error> for WriteError {
    #[inline]
    fn from(v: io::Error) -> Self {
        Self::Io(v)
    }
}

impl std::error::Error for WriteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl std::fmt::Display for WriteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::State { expected, actual } => {
                write!(f, "writer expected to be in {expected:?} state, got: {actual:?}")
            }
            Self::UnrecognizedStatus(status) => {
                write!(f, "unrecognized status code: {}", status.as_u16())
            }
            Self::Io(err) => write!(f, "failed to write response: {err}"),
        }
    }
}
