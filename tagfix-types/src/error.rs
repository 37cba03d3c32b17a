//! Parse errors for the line-oriented text formats.

use thiserror::Error;

/// Errors raised while reading patches or patch files.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PatchParseError {
    /// A patch token did not start with `+` or `-`.
    #[error("invalid patch token '{token}': expected a leading '+' or '-'")]
    InvalidToken { token: String },

    /// A patch-file line could not be split into `package: patch`.
    #[error("cannot parse line {line_no}: '{line}'")]
    InvalidLine { line_no: usize, line: String },

    /// A valid line whose patch body contained a bad token.
    #[error("line {line_no}: {source}")]
    InvalidLineToken {
        line_no: usize,
        #[source]
        source: Box<PatchParseError>,
    },

    #[error("io error: {message}")]
    Io { message: String },
}

/// Errors raised while reading a tag database.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DatabaseParseError {
    #[error("cannot parse tag database line {line_no}: '{line}'")]
    InvalidLine { line_no: usize, line: String },

    #[error("io error: {message}")]
    Io { message: String },
}

impl From<std::io::Error> for PatchParseError {
    fn from(e: std::io::Error) -> Self {
        PatchParseError::Io {
            message: e.to_string(),
        }
    }
}

impl From<std::io::Error> for DatabaseParseError {
    fn from(e: std::io::Error) -> Self {
        DatabaseParseError::Io {
            message: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_line_carries_offending_text() {
        let err = PatchParseError::InvalidLine {
            line_no: 3,
            line: "foo bar".to_string(),
        };
        assert!(err.to_string().contains("'foo bar'"));
        assert!(err.to_string().contains("line 3"));
    }
}
