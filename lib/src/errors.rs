//! Error type shared by every layer of the store.

use std::fmt;

/// Errors surfaced by encoding, planning, scopes and the storage engines.
#[derive(Debug)]
pub enum Error {
    /// A NaN reached the order-preserving number encoding.
    NotANumber,
    /// A term that cannot be stored (forbidden characters, misplaced default graph, bad range bound).
    InvalidTerm(String),
    /// Stored data failed to decode.
    Corrupt(String),
    /// A pattern that is malformed regardless of the index set.
    InvalidPattern(String),
    /// No configured index can answer the pattern.
    UnsupportedPattern(String),
    /// A custom index set failed validation.
    InvalidIndex(String),
    /// Engine level failure (closed engine, poisoned lock, held lock file).
    Backend(String),
    Io(std::io::Error),
    Sled(sled::Error),
    Json(serde_json::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NotANumber => write!(f, "cannot encode NaN"),
            Error::InvalidTerm(m) => write!(f, "invalid term: {}", m),
            Error::Corrupt(m) => write!(f, "corrupt data: {}", m),
            Error::InvalidPattern(m) => write!(f, "invalid pattern: {}", m),
            Error::UnsupportedPattern(m) => write!(f, "unsupported pattern: {}", m),
            Error::InvalidIndex(m) => write!(f, "invalid index: {}", m),
            Error::Backend(m) => write!(f, "backend error: {}", m),
            Error::Io(e) => write!(f, "{}", e),
            Error::Sled(e) => write!(f, "sled error: {}", e),
            Error::Json(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Sled(e) => Some(e),
            Error::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<sled::Error> for Error {
    fn from(e: sled::Error) -> Self {
        match e {
            sled::Error::Io(e) => Error::Io(e),
            other => Error::Sled(other),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Json(e)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
