//! Constrained ZIP-subset archive container
//!
//! Implements the safe subset of the ZIP format used by project archives:
//! local file headers, store or deflate payloads, a central directory, and
//! an end-of-central-directory record. ZIP64, encryption, multi-disk
//! archives, and data descriptors are deliberately unsupported. The reader
//! treats every input as adversarial: entry names are validated against
//! traversal, and all size limits are enforced before any decompression
//! work is performed.

pub mod limits;
pub mod paths;
pub mod reader;
pub mod writer;

pub use limits::{ReadLimits, WriteOptions};
pub use paths::is_safe_entry_name;
pub use reader::read_archive;
pub use writer::write_archive;

// Record signatures (ZIP appnote, little-endian on the wire)
pub(crate) const LOCAL_HEADER_SIG: u32 = 0x0403_4b50;
pub(crate) const CENTRAL_HEADER_SIG: u32 = 0x0201_4b50;
pub(crate) const EOCD_SIG: u32 = 0x0605_4b50;

// Fixed record sizes
pub(crate) const LOCAL_HEADER_SIZE: usize = 30;
pub(crate) const CENTRAL_HEADER_SIZE: usize = 46;
pub(crate) const EOCD_SIZE: usize = 22;

// EOCD may be followed by a comment of up to 65535 bytes
pub(crate) const MAX_COMMENT_BYTES: usize = 0xFFFF;

// General purpose flag bit 11: entry name is UTF-8
pub(crate) const FLAG_UTF8_NAME: u16 = 0x0800;

// Compression methods
pub(crate) const METHOD_STORE: u16 = 0;
pub(crate) const METHOD_DEFLATE: u16 = 8;

// Placeholder DOS timestamp (1980-01-01 00:00) for deterministic output
pub(crate) const DOS_TIME_PLACEHOLDER: u16 = 0;
pub(crate) const DOS_DATE_PLACEHOLDER: u16 = 0x0021;

// "Version needed to extract" for the deflate/store subset
pub(crate) const VERSION_NEEDED: u16 = 20;
