//! Error types for showpack

use std::fmt;

/// Main error type for showpack operations
///
/// Archive safety violations each get their own variant so callers can
/// tell an oversized entry apart from a traversal attempt or a malformed
/// record and report the rejection reason precisely.
#[derive(Debug)]
pub enum ShowPackError {
    /// Archive buffer exceeds the configured maximum size
    ArchiveTooLarge(String),

    /// Archive declares more entries than the configured limit
    TooManyEntries(String),

    /// Entry name failed path-safety validation
    UnsafePath(String),

    /// Entry name appears more than once in the central directory
    DuplicatePath(String),

    /// Entry's uncompressed size exceeds its per-file cap
    EntryTooLarge(String),

    /// Sum of extracted bytes would exceed the aggregate cap
    TotalSizeExceeded(String),

    /// Compression method other than store or deflate
    UnsupportedMethod(String),

    /// Structural damage: bad signature, truncated record, size or CRC mismatch
    MalformedArchive(String),

    /// Project archive is missing its project data entry
    MissingProject(String),

    /// Show encoding error
    EncodeError(String),

    /// IO error
    IoError(std::io::Error),

    /// JSON parsing error
    JsonError(serde_json::Error),

    /// Generic error with message
    Generic(String),
}

impl fmt::Display for ShowPackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShowPackError::ArchiveTooLarge(msg) => write!(f, "Archive too large: {msg}"),
            ShowPackError::TooManyEntries(msg) => write!(f, "Too many entries: {msg}"),
            ShowPackError::UnsafePath(msg) => write!(f, "Unsafe path: {msg}"),
            ShowPackError::DuplicatePath(msg) => write!(f, "Duplicate path: {msg}"),
            ShowPackError::EntryTooLarge(msg) => write!(f, "Entry too large: {msg}"),
            ShowPackError::TotalSizeExceeded(msg) => write!(f, "Total size exceeded: {msg}"),
            ShowPackError::UnsupportedMethod(msg) => write!(f, "Unsupported method: {msg}"),
            ShowPackError::MalformedArchive(msg) => write!(f, "Malformed archive: {msg}"),
            ShowPackError::MissingProject(msg) => write!(f, "Missing project data: {msg}"),
            ShowPackError::EncodeError(msg) => write!(f, "Encode error: {msg}"),
            ShowPackError::IoError(err) => write!(f, "IO error: {err}"),
            ShowPackError::JsonError(err) => write!(f, "JSON error: {err}"),
            ShowPackError::Generic(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for ShowPackError {}

impl From<std::io::Error> for ShowPackError {
    fn from(err: std::io::Error) -> Self {
        ShowPackError::IoError(err)
    }
}

impl From<serde_json::Error> for ShowPackError {
    fn from(err: serde_json::Error) -> Self {
        ShowPackError::JsonError(err)
    }
}

/// Result type for showpack operations
pub type Result<T> = std::result::Result<T, ShowPackError>;
