//! Standard exit codes for the showpack binary
//!
//! These exit codes give scripts wrapping the CLI a stable way to tell
//! why a command failed without parsing stderr.

/// Successful execution
pub const EXIT_SUCCESS: i32 = 0;

/// Generic error (avoid using - be more specific)
pub const EXIT_ERROR: i32 = 1;

/// Panic or unrecoverable error
pub const EXIT_PANIC: i32 = 101;

/// Show binary format error (bad magic, truncated header)
pub const EXIT_FORMAT_ERROR: i32 = 102;

/// Archive error (unsafe path, size limit, malformed record)
pub const EXIT_ARCHIVE_ERROR: i32 = 103;

/// Invalid command-line arguments
pub const EXIT_INVALID_ARGS: i32 = 105;

/// I/O error (file not found, permission denied, disk error)
pub const EXIT_IO_ERROR: i32 = 106;

/// Project parsing error (invalid JSON, missing required fields)
pub const EXIT_PROJECT_ERROR: i32 = 109;
