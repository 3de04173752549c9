use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// The query text did not start with INSERT, UPDATE, SELECT, or DELETE.
    #[error("unsupported query: {0}")]
    UnsupportedQuery(String),

    /// The query started with a supported keyword but did not match the
    /// shape that statement requires.
    #[error("malformed {statement} statement: {message}")]
    MalformedStatement {
        statement: &'static str,
        message: String,
    },

    #[error("unexpected character '{0}' in query")]
    UnexpectedCharacter(char),

    #[error("unterminated string literal")]
    UnterminatedString,

    /// The table set is closed; queries may only name the five known tables.
    #[error("unknown table: {0}")]
    UnknownTable(String),

    /// Backing file existed but could not be read or parsed, and the store
    /// was opened with recovery disabled.
    #[error("corrupted database file: {0}")]
    Corrupted(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn malformed(statement: &'static str, message: impl Into<String>) -> Self {
        Error::MalformedStatement {
            statement,
            message: message.into(),
        }
    }
}
