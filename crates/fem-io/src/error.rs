//! Error types for fem-io

use fem_model::{ElementFamily, ModelError};
use fem_sol::ParseError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, IoError>;

#[derive(Error, Debug)]
pub enum IoError {
    #[error("line {line}: {message}")]
    MalformedRecord { line: usize, message: String },

    #[error("name {0:?} cannot be written: it is empty, padded, or contains a comma or line break")]
    InvalidName(String),

    #[error("section '{section}' cannot be used by {family} elements")]
    SectionMismatch {
        section: String,
        family: ElementFamily,
    },

    #[error("snapshot schema version {found} is not supported (expected {expected})")]
    SchemaVersion { found: u32, expected: u32 },

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl IoError {
    pub(crate) fn malformed(line: usize, message: impl Into<String>) -> Self {
        IoError::MalformedRecord {
            line,
            message: message.into(),
        }
    }
}

impl From<ParseError> for IoError {
    fn from(err: ParseError) -> Self {
        IoError::MalformedRecord {
            line: err.line,
            message: err.message,
        }
    }
}
