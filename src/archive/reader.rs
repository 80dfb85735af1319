//! Archive reader with adversarial-input defenses
//!
//! The reader anchors on the end-of-central-directory record, walks the
//! central directory, and extracts each accepted entry. Entry names are
//! validated against traversal, and per-entry plus aggregate size caps are
//! checked against the declared sizes before any inflate work starts, so a
//! decompression bomb is rejected for the price of a header parse. Any
//! violation aborts the whole read; no partial result is ever returned.

use std::collections::HashSet;
use std::io::Read;

use flate2::read::DeflateDecoder;
use log::{debug, trace};

use crate::exceptions::{Result, ShowPackError};

use super::limits::ReadLimits;
use super::paths::is_safe_entry_name;
use super::{
    CENTRAL_HEADER_SIG, CENTRAL_HEADER_SIZE, EOCD_SIG, EOCD_SIZE, LOCAL_HEADER_SIG,
    LOCAL_HEADER_SIZE, MAX_COMMENT_BYTES, METHOD_DEFLATE, METHOD_STORE,
};

const INFLATE_CHUNK: usize = 64 * 1024;

/// Read an archive, returning extracted entries in central-directory order.
pub fn read_archive(data: &[u8], limits: &ReadLimits) -> Result<Vec<(String, Vec<u8>)>> {
    if data.len() as u64 > limits.max_archive_bytes {
        return Err(ShowPackError::ArchiveTooLarge(format!(
            "{} bytes exceeds limit of {}",
            data.len(),
            limits.max_archive_bytes
        )));
    }

    let eocd_pos = find_eocd(data)?;
    let entry_count = read_u16(data, eocd_pos + 10)? as usize;
    let central_size = read_u32(data, eocd_pos + 12)? as usize;
    let central_offset = read_u32(data, eocd_pos + 16)? as usize;

    debug!(
        "EOCD at {}: {} entries, central directory {}+{}",
        eocd_pos, entry_count, central_offset, central_size
    );

    if entry_count > limits.max_entries {
        return Err(ShowPackError::TooManyEntries(format!(
            "{} entries exceeds limit of {}",
            entry_count, limits.max_entries
        )));
    }
    if central_offset
        .checked_add(central_size)
        .is_none_or(|end| end > eocd_pos)
    {
        return Err(ShowPackError::MalformedArchive(
            "central directory extends past its end record".to_string(),
        ));
    }

    let mut entries: Vec<(String, Vec<u8>)> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut total_extracted: u64 = 0;
    let mut pos = central_offset;

    for _ in 0..entry_count {
        if pos + CENTRAL_HEADER_SIZE > central_offset + central_size {
            return Err(ShowPackError::MalformedArchive(
                "central directory record truncated".to_string(),
            ));
        }
        if read_u32(data, pos)? != CENTRAL_HEADER_SIG {
            return Err(ShowPackError::MalformedArchive(format!(
                "bad central directory signature at offset {pos}"
            )));
        }

        let method = read_u16(data, pos + 10)?;
        let stored_crc = read_u32(data, pos + 16)?;
        let compressed_size = read_u32(data, pos + 20)? as usize;
        let uncompressed_size = read_u32(data, pos + 24)? as u64;
        let name_len = read_u16(data, pos + 28)? as usize;
        let extra_len = read_u16(data, pos + 30)? as usize;
        let comment_len = read_u16(data, pos + 32)? as usize;
        let local_offset = read_u32(data, pos + 42)? as usize;

        if name_len > limits.max_filename_bytes {
            return Err(ShowPackError::UnsafePath(format!(
                "entry name of {} bytes exceeds limit of {}",
                name_len, limits.max_filename_bytes
            )));
        }
        let name_end = pos + CENTRAL_HEADER_SIZE + name_len;
        if name_end > data.len() {
            return Err(ShowPackError::MalformedArchive(
                "entry name extends past end of buffer".to_string(),
            ));
        }
        let name = std::str::from_utf8(&data[pos + CENTRAL_HEADER_SIZE..name_end])
            .map_err(|_| {
                ShowPackError::UnsafePath("entry name is not valid UTF-8".to_string())
            })?
            .to_string();

        if !is_safe_entry_name(&name) {
            return Err(ShowPackError::UnsafePath(format!(
                "entry name '{name}' failed safety validation"
            )));
        }
        if !seen.insert(name.clone()) {
            return Err(ShowPackError::DuplicatePath(format!(
                "entry '{name}' appears more than once"
            )));
        }

        pos = name_end + extra_len + comment_len;

        if !limits.accepts(&name) {
            trace!("entry '{}' skipped by filter", name);
            continue;
        }

        // Size checks happen before any decompression is attempted
        let file_limit = limits.effective_file_limit(&name);
        if uncompressed_size > file_limit {
            return Err(ShowPackError::EntryTooLarge(format!(
                "entry '{name}' declares {uncompressed_size} bytes, limit is {file_limit}"
            )));
        }
        if total_extracted + uncompressed_size > limits.max_total_uncompressed {
            return Err(ShowPackError::TotalSizeExceeded(format!(
                "extracting '{}' would exceed the total limit of {}",
                name, limits.max_total_uncompressed
            )));
        }

        let payload = slice_local_payload(data, local_offset, compressed_size, &name)?;
        let bytes = match method {
            METHOD_STORE => payload.to_vec(),
            METHOD_DEFLATE => inflate_bounded(payload, file_limit, &name)?,
            other => {
                return Err(ShowPackError::UnsupportedMethod(format!(
                    "entry '{name}' uses compression method {other}"
                )));
            }
        };

        if uncompressed_size != 0 && bytes.len() as u64 != uncompressed_size {
            return Err(ShowPackError::MalformedArchive(format!(
                "entry '{}' declared {} bytes but produced {}",
                name,
                uncompressed_size,
                bytes.len()
            )));
        }

        // A zero stored CRC is tolerated for legacy writers; any other value
        // must match the extracted bytes.
        if stored_crc != 0 {
            let mut crc = flate2::Crc::new();
            crc.update(&bytes);
            if crc.sum() != stored_crc {
                return Err(ShowPackError::MalformedArchive(format!(
                    "entry '{name}' failed CRC-32 verification"
                )));
            }
        }

        // Re-check against actual output: a forged zero declared size passes
        // the pre-check above without contributing to the running total.
        total_extracted += bytes.len() as u64;
        if total_extracted > limits.max_total_uncompressed {
            return Err(ShowPackError::TotalSizeExceeded(format!(
                "entry '{}' pushed extracted output past the total limit of {}",
                name, limits.max_total_uncompressed
            )));
        }
        trace!("extracted '{}': {} bytes", name, bytes.len());
        entries.push((name, bytes));
    }

    debug!(
        "archive read: {} entries extracted, {} bytes total",
        entries.len(),
        total_extracted
    );
    Ok(entries)
}

/// Scan backward from the end of the buffer for the EOCD signature,
/// allowing for a trailing comment of up to 65535 bytes.
fn find_eocd(data: &[u8]) -> Result<usize> {
    if data.len() < EOCD_SIZE {
        return Err(ShowPackError::MalformedArchive(format!(
            "{} bytes is too short to hold an end-of-central-directory record",
            data.len()
        )));
    }
    let latest = data.len() - EOCD_SIZE;
    let earliest = latest.saturating_sub(MAX_COMMENT_BYTES);
    for pos in (earliest..=latest).rev() {
        if data[pos..pos + 4] == EOCD_SIG.to_le_bytes() {
            return Ok(pos);
        }
    }
    Err(ShowPackError::MalformedArchive(
        "end-of-central-directory record not found".to_string(),
    ))
}

/// Locate an entry's payload via its local header, using the *local*
/// header's name/extra lengths (they may differ from the central record).
fn slice_local_payload<'a>(
    data: &'a [u8],
    local_offset: usize,
    compressed_size: usize,
    name: &str,
) -> Result<&'a [u8]> {
    if local_offset + LOCAL_HEADER_SIZE > data.len() {
        return Err(ShowPackError::MalformedArchive(format!(
            "local header for '{name}' lies past end of buffer"
        )));
    }
    if read_u32(data, local_offset)? != LOCAL_HEADER_SIG {
        return Err(ShowPackError::MalformedArchive(format!(
            "bad local header signature for '{name}'"
        )));
    }
    let name_len = read_u16(data, local_offset + 26)? as usize;
    let extra_len = read_u16(data, local_offset + 28)? as usize;
    let start = local_offset + LOCAL_HEADER_SIZE + name_len + extra_len;
    let end = start.checked_add(compressed_size).ok_or_else(|| {
        ShowPackError::MalformedArchive(format!("payload range overflow for '{name}'"))
    })?;
    if end > data.len() {
        return Err(ShowPackError::MalformedArchive(format!(
            "payload for '{name}' extends past end of buffer"
        )));
    }
    Ok(&data[start..end])
}

/// Streaming inflate bounded by `limit`; aborts mid-stream once the output
/// crosses the cap instead of finishing and discarding.
fn inflate_bounded(payload: &[u8], limit: u64, name: &str) -> Result<Vec<u8>> {
    let mut decoder = DeflateDecoder::new(payload);
    let mut out: Vec<u8> = Vec::new();
    let mut chunk = [0u8; INFLATE_CHUNK];
    loop {
        let n = decoder.read(&mut chunk).map_err(|e| {
            ShowPackError::MalformedArchive(format!("inflate failed for '{name}': {e}"))
        })?;
        if n == 0 {
            break;
        }
        out.extend_from_slice(&chunk[..n]);
        if out.len() as u64 > limit {
            return Err(ShowPackError::EntryTooLarge(format!(
                "entry '{name}' inflated past its limit of {limit} bytes"
            )));
        }
    }
    Ok(out)
}

fn read_u16(data: &[u8], pos: usize) -> Result<u16> {
    data.get(pos..pos + 2)
        .and_then(|b| b.try_into().ok())
        .map(u16::from_le_bytes)
        .ok_or_else(|| {
            ShowPackError::MalformedArchive(format!("truncated field at offset {pos}"))
        })
}

fn read_u32(data: &[u8], pos: usize) -> Result<u32> {
    data.get(pos..pos + 4)
        .and_then(|b| b.try_into().ok())
        .map(u32::from_le_bytes)
        .ok_or_else(|| {
            ShowPackError::MalformedArchive(format!("truncated field at offset {pos}"))
        })
}

#[cfg(test)]
mod tests {
    use super::super::limits::{ReadLimits, WriteOptions};
    use super::super::writer::write_archive;
    use super::read_archive;
    use crate::exceptions::ShowPackError;

    fn entry(name: &str, data: &[u8]) -> (String, Vec<u8>) {
        (name.to_string(), data.to_vec())
    }

    fn roundtrip(entries: &[(String, Vec<u8>)], compress: bool) -> Vec<(String, Vec<u8>)> {
        let bytes = write_archive(entries, &WriteOptions { compress }).unwrap();
        read_archive(&bytes, &ReadLimits::default()).unwrap()
    }

    #[test]
    fn test_roundtrip_stored_and_deflated() {
        let entries = vec![
            entry("project.json", b"{\"name\":\"demo\"}"),
            entry("audio/a.mp3", &[0u8; 3000]),
            entry("audio/b.wav", b"RIFFxxxx"),
        ];
        assert_eq!(roundtrip(&entries, false), entries);
        assert_eq!(roundtrip(&entries, true), entries);
    }

    #[test]
    fn test_empty_archive_roundtrips() {
        assert_eq!(roundtrip(&[], false), vec![]);
    }

    #[test]
    fn test_trailing_comment_is_tolerated() {
        let mut bytes = write_archive(&[entry("a", b"x")], &WriteOptions::default()).unwrap();
        // Patch in a comment after the EOCD record
        let comment = b"written by tests";
        let len = bytes.len();
        bytes[len - 2..len].copy_from_slice(&(comment.len() as u16).to_le_bytes());
        bytes.extend_from_slice(comment);

        let entries = read_archive(&bytes, &ReadLimits::default()).unwrap();
        assert_eq!(entries, vec![entry("a", b"x")]);
    }

    #[test]
    fn test_garbage_and_short_buffers_are_malformed() {
        for data in [&b""[..], &b"PK"[..], &[0u8; 64][..]] {
            let err = read_archive(data, &ReadLimits::default()).unwrap_err();
            assert!(matches!(err, ShowPackError::MalformedArchive(_)));
        }
    }

    #[test]
    fn test_entry_count_limit() {
        let bytes = write_archive(
            &[entry("a", b"1"), entry("b", b"2"), entry("c", b"3")],
            &WriteOptions::default(),
        )
        .unwrap();
        let limits = ReadLimits {
            max_entries: 2,
            ..ReadLimits::default()
        };
        let err = read_archive(&bytes, &limits).unwrap_err();
        assert!(matches!(err, ShowPackError::TooManyEntries(_)));
    }

    #[test]
    fn test_unsafe_entry_name_rejected() {
        // Forge the name after writing: same length, then bypass the writer's
        // own validation by patching both name copies.
        let mut bytes = write_archive(&[entry("aa/bb", b"data")], &WriteOptions::default()).unwrap();
        let forged = b"../bb";
        let positions: Vec<usize> = (0..bytes.len() - 5)
            .filter(|&i| &bytes[i..i + 5] == b"aa/bb")
            .collect();
        assert_eq!(positions.len(), 2); // local header + central directory
        for pos in positions {
            bytes[pos..pos + 5].copy_from_slice(forged);
        }

        let err = read_archive(&bytes, &ReadLimits::default()).unwrap_err();
        assert!(matches!(err, ShowPackError::UnsafePath(_)));
    }

    #[test]
    fn test_per_entry_size_limit_checked_before_inflate() {
        let big = vec![0u8; 100_000];
        let bytes = write_archive(
            &[entry("big.bin", &big)],
            &WriteOptions { compress: true },
        )
        .unwrap();
        let limits = ReadLimits {
            max_file_uncompressed: 10_000,
            ..ReadLimits::default()
        };
        let err = read_archive(&bytes, &limits).unwrap_err();
        assert!(matches!(err, ShowPackError::EntryTooLarge(_)));
    }

    #[test]
    fn test_per_name_size_callback() {
        let bytes = write_archive(
            &[entry("small.txt", &[7u8; 64]), entry("other.bin", &[7u8; 64])],
            &WriteOptions::default(),
        )
        .unwrap();
        let limits = ReadLimits {
            per_name_limit: Some(Box::new(|name| {
                if name == "small.txt" { Some(16) } else { None }
            })),
            ..ReadLimits::default()
        };
        let err = read_archive(&bytes, &limits).unwrap_err();
        match err {
            ShowPackError::EntryTooLarge(msg) => assert!(msg.contains("small.txt")),
            other => panic!("expected EntryTooLarge, got {other}"),
        }
    }

    #[test]
    fn test_aggregate_size_limit() {
        let bytes = write_archive(
            &[entry("a", &[1u8; 600]), entry("b", &[2u8; 600])],
            &WriteOptions::default(),
        )
        .unwrap();
        // Each entry fits on its own, but the pair does not
        let limits = ReadLimits {
            max_file_uncompressed: 1000,
            max_total_uncompressed: 1000,
            ..ReadLimits::default()
        };
        let err = read_archive(&bytes, &limits).unwrap_err();
        assert!(matches!(err, ShowPackError::TotalSizeExceeded(_)));
    }

    #[test]
    fn test_aggregate_limit_holds_when_declared_sizes_are_zeroed() {
        let mut bytes = write_archive(
            &[entry("a", &[1u8; 600]), entry("b", &[2u8; 600])],
            &WriteOptions { compress: false },
        )
        .unwrap();
        // Forge both central records to declare zero uncompressed bytes so
        // the pre-decompression total check sees nothing to count
        let central_offset =
            u32::from_le_bytes(bytes[bytes.len() - 6..bytes.len() - 2].try_into().unwrap())
                as usize;
        for record in [central_offset, central_offset + 46 + 1] {
            bytes[record + 24..record + 28].copy_from_slice(&0u32.to_le_bytes());
        }

        let limits = ReadLimits {
            max_total_uncompressed: 1000,
            ..ReadLimits::default()
        };
        let err = read_archive(&bytes, &limits).unwrap_err();
        assert!(matches!(err, ShowPackError::TotalSizeExceeded(_)));
    }

    #[test]
    fn test_filtered_entries_do_not_count_toward_totals() {
        let bytes = write_archive(
            &[entry("a.skip", &[1u8; 600]), entry("b.keep", &[2u8; 600])],
            &WriteOptions::default(),
        )
        .unwrap();
        let limits = ReadLimits {
            max_total_uncompressed: 1000,
            name_filter: Some(Box::new(|name| name.ends_with(".keep"))),
            ..ReadLimits::default()
        };
        let entries = read_archive(&bytes, &limits).unwrap();
        assert_eq!(entries, vec![entry("b.keep", &[2u8; 600])]);
    }

    #[test]
    fn test_unsupported_method_rejected() {
        let mut bytes = write_archive(&[entry("a", b"xx")], &WriteOptions::default()).unwrap();
        // Method field lives at offset 10 of both the local and central headers
        let central_offset =
            u32::from_le_bytes(bytes[bytes.len() - 6..bytes.len() - 2].try_into().unwrap())
                as usize;
        bytes[central_offset + 10..central_offset + 12].copy_from_slice(&12u16.to_le_bytes());

        let err = read_archive(&bytes, &ReadLimits::default()).unwrap_err();
        assert!(matches!(err, ShowPackError::UnsupportedMethod(_)));
    }

    #[test]
    fn test_corrupted_payload_fails_crc() {
        let mut bytes = write_archive(
            &[entry("a.bin", &[0x55u8; 256])],
            &WriteOptions::default(),
        )
        .unwrap();
        // Flip one payload byte (stored method: payload starts after the
        // 30-byte local header and 5-byte name)
        bytes[30 + 5 + 17] ^= 0xFF;
        let err = read_archive(&bytes, &ReadLimits::default()).unwrap_err();
        assert!(matches!(err, ShowPackError::MalformedArchive(_)));
    }

    #[test]
    fn test_archive_size_limit() {
        let bytes = write_archive(&[entry("a", &[0u8; 4096])], &WriteOptions::default()).unwrap();
        let limits = ReadLimits {
            max_archive_bytes: 1024,
            ..ReadLimits::default()
        };
        let err = read_archive(&bytes, &limits).unwrap_err();
        assert!(matches!(err, ShowPackError::ArchiveTooLarge(_)));
    }
}
