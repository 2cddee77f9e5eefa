use std::path::PathBuf;

use thiserror::Error;

/// A single attribute value that could not be read as a number.
///
/// Non-fatal: the normalizer marks the field as missing on that record and
/// keeps going. Collected so the caller can report them in one place.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("record `{record_id}`: field `{field}` = {raw}: {reason}")]
pub struct FieldParseError {
    pub record_id: String,
    pub field: &'static str,
    /// The offending value as it appeared in the source, JSON-encoded.
    pub raw: String,
    pub reason: String,
}

#[derive(Debug, Error)]
pub enum FireError {
    /// The input file is missing, unreadable, malformed, or lacks a required column.
    #[error("data source {}: {reason}", path.display())]
    DataSource { path: PathBuf, reason: String },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl FireError {
    pub(crate) fn data_source(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::DataSource { path: path.into(), reason: reason.into() }
    }
}

pub type Result<T> = std::result::Result<T, FireError>;
