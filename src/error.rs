//! Error types for the kifu crate

use thiserror::Error;

/// Main error type for loading, parsing and reading game records.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Filesystem failure, including file-not-found, passed through as-is.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("board size {value:?} is not in range 1-19")]
    BadBoardSize { value: String },

    #[error("{format} parser failed: {reason}")]
    ParserFail { format: &'static str, reason: String },

    #[error("invalid {what} value {value:?}")]
    InvalidValue { what: &'static str, value: String },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn parser_fail(format: &'static str, reason: impl Into<String>) -> Self {
        Error::ParserFail { format, reason: reason.into() }
    }

    pub(crate) fn invalid_value(what: &'static str, value: impl Into<String>) -> Self {
        Error::InvalidValue { what, value: value.into() }
    }

    /// True for the one failure kind the loader may recover from by trying
    /// a legacy adapter.
    pub fn is_parse_failure(&self) -> bool {
        matches!(self, Error::ParserFail { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }
}
