//! Archive writer: local headers, central directory, EOCD
//!
//! Entries are emitted strictly in the order given, so the byte layout of
//! the output is deterministic for a given input sequence.

use std::collections::HashSet;
use std::io::Write;

use flate2::Compression;
use flate2::write::DeflateEncoder;
use log::{debug, trace};

use crate::exceptions::{Result, ShowPackError};

use super::limits::WriteOptions;
use super::paths::is_safe_entry_name;
use super::{
    CENTRAL_HEADER_SIG, DOS_DATE_PLACEHOLDER, DOS_TIME_PLACEHOLDER, EOCD_SIG, FLAG_UTF8_NAME,
    LOCAL_HEADER_SIG, METHOD_DEFLATE, METHOD_STORE, VERSION_NEEDED,
};

// Central-directory record accumulated while local headers are written
struct CentralRecord {
    name: Vec<u8>,
    method: u16,
    crc32: u32,
    compressed_size: u32,
    uncompressed_size: u32,
    local_offset: u32,
}

/// Write an archive from an ordered sequence of (name, bytes) entries.
///
/// CRC-32 is always computed over the raw bytes; when `compress` is set,
/// payloads are deflated, otherwise stored verbatim.
pub fn write_archive(entries: &[(String, Vec<u8>)], options: &WriteOptions) -> Result<Vec<u8>> {
    if entries.len() > u16::MAX as usize {
        return Err(ShowPackError::ArchiveTooLarge(format!(
            "{} entries do not fit in a 16-bit entry count",
            entries.len()
        )));
    }

    let mut out: Vec<u8> = Vec::new();
    let mut central: Vec<CentralRecord> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();

    for (name, data) in entries {
        if !is_safe_entry_name(name) {
            return Err(ShowPackError::UnsafePath(format!(
                "refusing to write entry '{name}'"
            )));
        }
        if !seen.insert(name.as_str()) {
            return Err(ShowPackError::DuplicatePath(format!(
                "entry '{name}' written twice"
            )));
        }

        let mut crc = flate2::Crc::new();
        crc.update(data);
        let crc32 = crc.sum();

        let (method, payload) = if options.compress {
            (METHOD_DEFLATE, deflate(data)?)
        } else {
            (METHOD_STORE, data.clone())
        };

        if data.len() > u32::MAX as usize || payload.len() > u32::MAX as usize {
            return Err(ShowPackError::ArchiveTooLarge(format!(
                "entry '{name}' does not fit in a 32-bit size field"
            )));
        }

        if out.len() > u32::MAX as usize {
            return Err(ShowPackError::ArchiveTooLarge(format!(
                "entry '{name}' would start past the 32-bit offset limit"
            )));
        }
        let local_offset = out.len() as u32;
        trace!(
            "writing entry '{}': {} -> {} bytes at offset {}",
            name,
            data.len(),
            payload.len(),
            local_offset
        );

        let name_bytes = name.as_bytes();
        out.extend_from_slice(&LOCAL_HEADER_SIG.to_le_bytes());
        out.extend_from_slice(&VERSION_NEEDED.to_le_bytes());
        out.extend_from_slice(&FLAG_UTF8_NAME.to_le_bytes());
        out.extend_from_slice(&method.to_le_bytes());
        out.extend_from_slice(&DOS_TIME_PLACEHOLDER.to_le_bytes());
        out.extend_from_slice(&DOS_DATE_PLACEHOLDER.to_le_bytes());
        out.extend_from_slice(&crc32.to_le_bytes());
        out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        out.extend_from_slice(&(data.len() as u32).to_le_bytes());
        out.extend_from_slice(&(name_bytes.len() as u16).to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes()); // extra field length
        out.extend_from_slice(name_bytes);
        out.extend_from_slice(&payload);

        central.push(CentralRecord {
            name: name_bytes.to_vec(),
            method,
            crc32,
            compressed_size: payload.len() as u32,
            uncompressed_size: data.len() as u32,
            local_offset,
        });
    }

    if out.len() > u32::MAX as usize {
        return Err(ShowPackError::ArchiveTooLarge(
            "central directory would start past the 32-bit offset limit".to_string(),
        ));
    }
    let central_offset = out.len() as u32;
    for record in &central {
        out.extend_from_slice(&CENTRAL_HEADER_SIG.to_le_bytes());
        out.extend_from_slice(&VERSION_NEEDED.to_le_bytes()); // version made by
        out.extend_from_slice(&VERSION_NEEDED.to_le_bytes()); // version needed
        out.extend_from_slice(&FLAG_UTF8_NAME.to_le_bytes());
        out.extend_from_slice(&record.method.to_le_bytes());
        out.extend_from_slice(&DOS_TIME_PLACEHOLDER.to_le_bytes());
        out.extend_from_slice(&DOS_DATE_PLACEHOLDER.to_le_bytes());
        out.extend_from_slice(&record.crc32.to_le_bytes());
        out.extend_from_slice(&record.compressed_size.to_le_bytes());
        out.extend_from_slice(&record.uncompressed_size.to_le_bytes());
        out.extend_from_slice(&(record.name.len() as u16).to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes()); // extra field length
        out.extend_from_slice(&0u16.to_le_bytes()); // comment length
        out.extend_from_slice(&0u16.to_le_bytes()); // disk number start
        out.extend_from_slice(&0u16.to_le_bytes()); // internal attributes
        out.extend_from_slice(&0u32.to_le_bytes()); // external attributes
        out.extend_from_slice(&record.local_offset.to_le_bytes());
        out.extend_from_slice(&record.name);
    }
    if out.len() > u32::MAX as usize {
        return Err(ShowPackError::ArchiveTooLarge(
            "central directory extends past the 32-bit size limit".to_string(),
        ));
    }
    let central_size = out.len() as u32 - central_offset;

    out.extend_from_slice(&EOCD_SIG.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes()); // this disk
    out.extend_from_slice(&0u16.to_le_bytes()); // central directory disk
    out.extend_from_slice(&(central.len() as u16).to_le_bytes());
    out.extend_from_slice(&(central.len() as u16).to_le_bytes());
    out.extend_from_slice(&central_size.to_le_bytes());
    out.extend_from_slice(&central_offset.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes()); // comment length

    debug!(
        "archive written: {} entries, {} bytes",
        central.len(),
        out.len()
    );
    Ok(out)
}

fn deflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .map_err(|e| ShowPackError::Generic(format!("deflate failed: {e}")))?;
    encoder
        .finish()
        .map_err(|e| ShowPackError::Generic(format!("deflate failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::super::limits::WriteOptions;
    use super::super::{EOCD_SIG, LOCAL_HEADER_SIG};
    use super::write_archive;
    use crate::exceptions::ShowPackError;

    fn entry(name: &str, data: &[u8]) -> (String, Vec<u8>) {
        (name.to_string(), data.to_vec())
    }

    #[test]
    fn test_layout_starts_with_local_header_and_ends_with_eocd() {
        let bytes = write_archive(
            &[entry("a.txt", b"hello")],
            &WriteOptions { compress: false },
        )
        .unwrap();

        let sig = u32::from_le_bytes(bytes[0..4].try_into().unwrap());
        assert_eq!(sig, LOCAL_HEADER_SIG);
        let eocd = u32::from_le_bytes(bytes[bytes.len() - 22..bytes.len() - 18].try_into().unwrap());
        assert_eq!(eocd, EOCD_SIG);
    }

    #[test]
    fn test_entry_order_is_preserved_in_bytes() {
        let a = write_archive(
            &[entry("a", b"1"), entry("b", b"2")],
            &WriteOptions::default(),
        )
        .unwrap();
        let b = write_archive(
            &[entry("b", b"2"), entry("a", b"1")],
            &WriteOptions::default(),
        )
        .unwrap();
        assert_ne!(a, b);

        // Same input sequence must be byte-identical
        let a2 = write_archive(
            &[entry("a", b"1"), entry("b", b"2")],
            &WriteOptions::default(),
        )
        .unwrap();
        assert_eq!(a, a2);
    }

    #[test]
    fn test_rejects_unsafe_and_duplicate_names() {
        let err = write_archive(&[entry("../x", b"")], &WriteOptions::default()).unwrap_err();
        assert!(matches!(err, ShowPackError::UnsafePath(_)));

        let err = write_archive(
            &[entry("x", b"1"), entry("x", b"2")],
            &WriteOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ShowPackError::DuplicatePath(_)));
    }

    #[test]
    fn test_rejects_more_entries_than_the_count_field_holds() {
        // One past the EOCD entry-count width; must error, not wrap to 1.
        let entries: Vec<(String, Vec<u8>)> = (0..=u16::MAX as usize + 1)
            .map(|i| entry(&format!("e{i}"), b""))
            .collect();
        let err = write_archive(&entries, &WriteOptions { compress: false }).unwrap_err();
        assert!(matches!(err, ShowPackError::ArchiveTooLarge(_)));
    }
}
