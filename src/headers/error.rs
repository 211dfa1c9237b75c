/// An error that can occur when parsing a header field line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HeaderError {
    /// Field line does not contain a `:`.
    MissingSeparator,
    /// Field line is not valid UTF-8.
    InvalidUtf8,
    /// Field name is empty or has whitespace before the `:`.
    InvalidFieldName,
    /// Field name contains a character outside of `token`.
    InvalidCharacter {
        /// The offending field name.
        name: String,
        /// The first invalid character.
        ch: char,
    },
}

impl std::error::Error for HeaderError {}

impl std::fmt::Display for HeaderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingSeparator => f.write_str("field line is missing the ':' separator"),
            Self::InvalidFieldName => f.write_str("invalid field name"),
            Self::InvalidUtf8 => f.write_str("field line is not valid UTF-8"),
            Self::InvalidCharacter { name, ch } => {
                write!(f, "invalid header name {name:?}: contains invalid character {ch:?}")
            }
        }
    }
}
