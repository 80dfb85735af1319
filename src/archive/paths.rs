//! Entry-name path safety validation
//!
//! A pure predicate over candidate entry names, kept free of archive
//! state so the zip-slip rules can be tested on their own.

/// Maximum accepted entry-name length in bytes
pub const MAX_NAME_BYTES: usize = 4096;

/// Check whether an archive entry name is safe to extract.
///
/// Accepted names are non-empty relative paths using forward slashes,
/// with no `.` or `..` segments, no NUL bytes, no Windows drive letters,
/// and no leading slash.
pub fn is_safe_entry_name(name: &str) -> bool {
    if name.is_empty() || name.len() > MAX_NAME_BYTES {
        return false;
    }
    if name.contains('\0') || name.contains('\\') {
        return false;
    }
    if name.starts_with('/') {
        return false;
    }
    // Drive letters ("C:...") and other scheme-like prefixes
    if name.contains(':') {
        return false;
    }
    for segment in name.split('/') {
        if segment.is_empty() || segment == "." || segment == ".." {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::{MAX_NAME_BYTES, is_safe_entry_name};

    #[test]
    fn test_accepts_plain_relative_names() {
        assert!(is_safe_entry_name("project.json"));
        assert!(is_safe_entry_name("audio/track1.mp3"));
        assert!(is_safe_entry_name("a/b/c/d.bin"));
    }

    #[test]
    fn test_rejects_traversal() {
        assert!(!is_safe_entry_name("../etc/passwd"));
        assert!(!is_safe_entry_name("audio/../../x"));
        assert!(!is_safe_entry_name(".."));
        assert!(!is_safe_entry_name("audio/.."));
    }

    #[test]
    fn test_rejects_absolute_and_drive_paths() {
        assert!(!is_safe_entry_name("/etc/passwd"));
        assert!(!is_safe_entry_name("C:\\windows\\system32"));
        assert!(!is_safe_entry_name("C:/windows/system32"));
    }

    #[test]
    fn test_rejects_odd_segments() {
        assert!(!is_safe_entry_name(""));
        assert!(!is_safe_entry_name("."));
        assert!(!is_safe_entry_name("./x"));
        assert!(!is_safe_entry_name("a//b"));
        assert!(!is_safe_entry_name("a/"));
        assert!(!is_safe_entry_name("a\0b"));
        assert!(!is_safe_entry_name("a\\b"));
    }

    #[test]
    fn test_rejects_oversized_names() {
        let long = "x".repeat(MAX_NAME_BYTES + 1);
        assert!(!is_safe_entry_name(&long));
        let max = "x".repeat(MAX_NAME_BYTES);
        assert!(is_safe_entry_name(&max));
    }
}
