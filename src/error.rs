//! Error types.
//!
//! - [`ConfigError`] - bad settings found at startup, always fatal
//! - [`ParseError`] - a line or value could not be parsed
//! - [`LineError`] - anything that goes wrong with one input line; routed
//!   through the [`ErrorPolicy`](crate::processing::ErrorPolicy)
//! - [`CidrqError`] - what a run returns to its caller

use crate::models::PrefixParseError;
use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {kind} '{value}' (expected one of: {expected})")]
    InvalidChoice {
        kind: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("invalid field number {0} (fields are numbered from 1)")]
    InvalidField(usize),
    #[error("a non-empty delimiter is required when fields are selected")]
    MissingDelimiter,
    #[error("file {} does not exist", .0.display())]
    MissingFile(PathBuf),
    #[error("cannot read {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("settings file {}: {message}", .path.display())]
    Settings { path: PathBuf, message: String },
    #[error("logging setup failed: {0}")]
    Logging(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("field {field} not found in line: {line}")]
    FieldNotFound { field: usize, line: String },
    #[error(transparent)]
    InvalidValue(#[from] PrefixParseError),
    #[error("line is not valid UTF-8")]
    InvalidUtf8,
}

#[derive(Debug, thiserror::Error)]
pub enum LineError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// A handler refused an otherwise well-formed line.
    #[error("{0}")]
    Rejected(String),
    /// Writing output failed. Never recovered by the error policy.
    #[error("write failed: {0}")]
    Write(#[from] io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum CidrqError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Line(#[from] LineError),
    #[error("io: {0}")]
    Io(#[from] io::Error),
    #[error("line {line} exceeds the maximum length of {max} bytes")]
    LineTooLong { line: usize, max: usize },
}

impl From<ParseError> for CidrqError {
    fn from(e: ParseError) -> CidrqError {
        CidrqError::Line(LineError::Parse(e))
    }
}

pub type Result<T, E = CidrqError> = std::result::Result<T, E>;
