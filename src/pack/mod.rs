//! Portable project archive packaging
//!
//! Bundles the editor's project JSON together with its audio assets into a
//! single archive file: one fixed `project.json` entry plus one
//! `audio/{id}.{ext}` entry per asset. Audio crosses this boundary as
//! base64 data URLs, the form the editor holds it in.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use log::debug;

use crate::archive::{ReadLimits, WriteOptions, read_archive, write_archive};
use crate::exceptions::{Result, ShowPackError};

/// Fixed name of the project text entry
pub const PROJECT_ENTRY_NAME: &str = "project.json";

/// Path prefix for audio asset entries
pub const AUDIO_PREFIX: &str = "audio/";

// Cap for the project text entry; audio entries use the global default
const PROJECT_ENTRY_LIMIT: u64 = 64 * 1024 * 1024;

/// Result of unpacking a project archive
#[derive(Debug, Clone)]
pub struct UnpackedProject {
    /// UTF-8 project text, exactly as packed
    pub project_text: String,

    /// Audio assets as (id, base64 data URL) pairs, in archive order
    pub audio_assets: Vec<(String, String)>,
}

/// Pack project text and audio assets into a single archive file.
///
/// Audio is supplied as (id, data URL) pairs; each is decoded to raw bytes
/// and stored under `audio/{id}.{ext}` with the extension chosen from the
/// data URL's MIME type. Entries are stored uncompressed by default since
/// audio payloads are already compressed formats.
pub fn pack(project_text: &str, audio_assets: &[(String, String)]) -> Result<Vec<u8>> {
    let mut entries: Vec<(String, Vec<u8>)> = Vec::with_capacity(1 + audio_assets.len());
    entries.push((
        PROJECT_ENTRY_NAME.to_string(),
        project_text.as_bytes().to_vec(),
    ));

    for (id, data_url) in audio_assets {
        let (mime, bytes) = parse_data_url(data_url).map_err(|reason| {
            ShowPackError::Generic(format!("invalid data URL for audio asset '{id}': {reason}"))
        })?;
        let name = format!("{AUDIO_PREFIX}{id}.{}", extension_for_mime(&mime));
        debug!("packing audio asset '{}' as '{}' ({} bytes)", id, name, bytes.len());
        entries.push((name, bytes));
    }

    write_archive(&entries, &WriteOptions { compress: false })
}

/// Unpack a project archive. The project text entry is required; audio
/// entries are re-encoded as data URLs with the MIME type inferred from
/// the file extension.
pub fn unpack(data: &[u8]) -> Result<UnpackedProject> {
    let limits = ReadLimits {
        per_name_limit: Some(Box::new(|name| {
            if name == PROJECT_ENTRY_NAME {
                Some(PROJECT_ENTRY_LIMIT)
            } else {
                None
            }
        })),
        ..ReadLimits::default()
    };
    let entries = read_archive(data, &limits)?;

    let mut project_text: Option<String> = None;
    let mut audio_assets: Vec<(String, String)> = Vec::new();

    for (name, bytes) in entries {
        if name == PROJECT_ENTRY_NAME {
            let text = String::from_utf8(bytes).map_err(|_| {
                ShowPackError::MalformedArchive(
                    "project entry is not valid UTF-8".to_string(),
                )
            })?;
            project_text = Some(text);
        } else if let Some(filename) = name.strip_prefix(AUDIO_PREFIX) {
            let (id, ext) = match filename.rsplit_once('.') {
                Some((id, ext)) => (id, ext),
                None => (filename, ""),
            };
            let url = format!(
                "data:{};base64,{}",
                mime_for_extension(ext),
                BASE64.encode(&bytes)
            );
            audio_assets.push((id.to_string(), url));
        }
        // Unknown entries are ignored for forward compatibility
    }

    let project_text = project_text.ok_or_else(|| {
        ShowPackError::MissingProject(format!("no '{PROJECT_ENTRY_NAME}' entry in archive"))
    })?;

    debug!(
        "unpacked project: {} chars, {} audio assets",
        project_text.len(),
        audio_assets.len()
    );
    Ok(UnpackedProject {
        project_text,
        audio_assets,
    })
}

/// Split a base64 data URL into its MIME type and decoded payload
pub fn parse_data_url(url: &str) -> std::result::Result<(String, Vec<u8>), String> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| "missing 'data:' scheme".to_string())?;
    let (mime, payload) = rest
        .split_once(";base64,")
        .ok_or_else(|| "missing ';base64,' marker".to_string())?;
    let bytes = BASE64
        .decode(payload.as_bytes())
        .map_err(|e| format!("base64 decode failed: {e}"))?;
    Ok((mime.to_string(), bytes))
}

/// File extension for an audio MIME type; unknown types fall back to "bin"
pub fn extension_for_mime(mime: &str) -> &'static str {
    match mime.to_ascii_lowercase().as_str() {
        "audio/mpeg" | "audio/mp3" => "mp3",
        "audio/wav" | "audio/x-wav" | "audio/wave" => "wav",
        "audio/ogg" => "ogg",
        "audio/mp4" | "audio/x-m4a" => "m4a",
        "audio/aac" => "aac",
        "audio/flac" | "audio/x-flac" => "flac",
        _ => "bin",
    }
}

/// MIME type for a file extension; unknown extensions fall back to
/// application/octet-stream
pub fn mime_for_extension(ext: &str) -> &'static str {
    match ext.to_ascii_lowercase().as_str() {
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" => "audio/ogg",
        "m4a" => "audio/mp4",
        "aac" => "audio/aac",
        "flac" => "audio/flac",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD as BASE64;

    use super::{PROJECT_ENTRY_NAME, pack, parse_data_url, unpack};
    use crate::archive::{ReadLimits, WriteOptions, read_archive, write_archive};
    use crate::exceptions::ShowPackError;

    fn data_url(mime: &str, bytes: &[u8]) -> String {
        format!("data:{};base64,{}", mime, BASE64.encode(bytes))
    }

    #[test]
    fn test_pack_unpack_roundtrip() {
        let text = r#"{"name":"demo","duration_ms":1000}"#;
        let mp3 = vec![0x49u8, 0x44, 0x33, 0x04, 0, 0, 0, 0, 1, 2, 3];
        let wav = vec![0x52u8; 4096];
        let assets = vec![
            ("intro".to_string(), data_url("audio/mpeg", &mp3)),
            ("outro".to_string(), data_url("audio/wav", &wav)),
        ];

        let archive = pack(text, &assets).unwrap();
        let unpacked = unpack(&archive).unwrap();

        assert_eq!(unpacked.project_text, text);
        assert_eq!(unpacked.audio_assets.len(), 2);
        assert_eq!(unpacked.audio_assets[0].0, "intro");
        let (mime, bytes) = parse_data_url(&unpacked.audio_assets[0].1).unwrap();
        assert_eq!(mime, "audio/mpeg");
        assert_eq!(bytes, mp3);
        let (mime, bytes) = parse_data_url(&unpacked.audio_assets[1].1).unwrap();
        assert_eq!(mime, "audio/wav");
        assert_eq!(bytes, wav);
    }

    #[test]
    fn test_entry_names_and_extensions() {
        let assets = vec![
            ("a".to_string(), data_url("audio/flac", b"flacdata")),
            ("b".to_string(), data_url("application/weird", b"blob")),
        ];
        let archive = pack("{}", &assets).unwrap();
        let entries = read_archive(&archive, &ReadLimits::default()).unwrap();
        let names: Vec<&str> = entries.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec![PROJECT_ENTRY_NAME, "audio/a.flac", "audio/b.bin"]);
    }

    #[test]
    fn test_missing_project_entry_is_fatal() {
        let archive = write_archive(
            &[("audio/x.mp3".to_string(), vec![1, 2, 3])],
            &WriteOptions::default(),
        )
        .unwrap();
        let err = unpack(&archive).unwrap_err();
        assert!(matches!(err, ShowPackError::MissingProject(_)));
    }

    #[test]
    fn test_bad_data_url_fails_pack() {
        let assets = vec![("x".to_string(), "not a data url".to_string())];
        let err = pack("{}", &assets).unwrap_err();
        assert!(matches!(err, ShowPackError::Generic(_)));
    }

    #[test]
    fn test_unknown_entries_are_ignored() {
        let archive = write_archive(
            &[
                (PROJECT_ENTRY_NAME.to_string(), b"{}".to_vec()),
                ("notes/readme.txt".to_string(), b"hi".to_vec()),
            ],
            &WriteOptions::default(),
        )
        .unwrap();
        let unpacked = unpack(&archive).unwrap();
        assert_eq!(unpacked.project_text, "{}");
        assert!(unpacked.audio_assets.is_empty());
    }
}
