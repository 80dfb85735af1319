//! Resource limits and options for archive operations

use std::fmt;

use super::paths::MAX_NAME_BYTES;

/// Options for writing an archive
#[derive(Debug, Clone, Default)]
pub struct WriteOptions {
    /// Deflate entry payloads instead of storing them raw
    pub compress: bool,
}

/// Per-name size cap callback; `None` falls back to the global per-file cap
pub type NameSizeLimit = Box<dyn Fn(&str) -> Option<u64> + Send + Sync>;

/// Predicate deciding whether an entry should be extracted at all
pub type NameFilter = Box<dyn Fn(&str) -> bool + Send + Sync>;

/// Resource limits enforced while reading an archive.
///
/// Every limit is checked before decompression is attempted so that an
/// adversarial archive cannot force unbounded CPU or memory use.
pub struct ReadLimits {
    /// Maximum accepted size of the whole archive buffer
    pub max_archive_bytes: u64,

    /// Maximum number of entries declared in the central directory
    pub max_entries: usize,

    /// Aggregate cap across all extracted entries
    pub max_total_uncompressed: u64,

    /// Per-file cap applied when no name-specific cap is given
    pub max_file_uncompressed: u64,

    /// Maximum entry-name length in bytes
    pub max_filename_bytes: usize,

    /// Optional name-specific size cap, consulted before the global cap
    pub per_name_limit: Option<NameSizeLimit>,

    /// Optional predicate; entries it rejects are skipped without extraction
    pub name_filter: Option<NameFilter>,
}

impl ReadLimits {
    /// Resolve the effective uncompressed-size cap for one entry name
    pub fn effective_file_limit(&self, name: &str) -> u64 {
        if let Some(ref per_name) = self.per_name_limit {
            if let Some(limit) = per_name(name) {
                return limit;
            }
        }
        self.max_file_uncompressed
    }

    /// Check whether the filter accepts (or is absent for) an entry name
    pub fn accepts(&self, name: &str) -> bool {
        match self.name_filter {
            Some(ref filter) => filter(name),
            None => true,
        }
    }
}

impl Default for ReadLimits {
    fn default() -> Self {
        ReadLimits {
            max_archive_bytes: 1024 * 1024 * 1024,         // 1 GiB
            max_entries: 1024,
            max_total_uncompressed: 2 * 1024 * 1024 * 1024, // 2 GiB
            max_file_uncompressed: 512 * 1024 * 1024,       // 512 MiB
            max_filename_bytes: MAX_NAME_BYTES,
            per_name_limit: None,
            name_filter: None,
        }
    }
}

impl fmt::Debug for ReadLimits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadLimits")
            .field("max_archive_bytes", &self.max_archive_bytes)
            .field("max_entries", &self.max_entries)
            .field("max_total_uncompressed", &self.max_total_uncompressed)
            .field("max_file_uncompressed", &self.max_file_uncompressed)
            .field("max_filename_bytes", &self.max_filename_bytes)
            .field("per_name_limit", &self.per_name_limit.is_some())
            .field("name_filter", &self.name_filter.is_some())
            .finish()
    }
}
