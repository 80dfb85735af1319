//! High-level file API for showpack operations
//!
//! Thin wrappers tying the pure codec/archive functions to files on disk,
//! used by the CLI and by embedding tools.

use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use log::info;

use crate::exceptions::{Result, ShowPackError};
use crate::pack::{self, mime_for_extension, parse_data_url};
use crate::show::{self, DecodedShow, Project, ValidationWarning};

/// Encode a project JSON file into a show binary; returns the event count.
pub fn encode_show_file(project_path: &Path, output_path: &Path) -> Result<usize> {
    let text = std::fs::read_to_string(project_path)?;
    let project: Project = serde_json::from_str(&text)?;
    let (bytes, event_count) = show::encode(&project)?;
    std::fs::write(output_path, &bytes)?;
    info!(
        "encoded {} -> {} ({} events, {} bytes)",
        project_path.display(),
        output_path.display(),
        event_count,
        bytes.len()
    );
    Ok(event_count)
}

/// Decode and validate a show binary for inspection.
pub fn inspect_show_file(path: &Path) -> Result<(DecodedShow, Vec<ValidationWarning>)> {
    let bytes = std::fs::read(path)?;
    let decoded = show::decode(&bytes)
        .map_err(|e| ShowPackError::Generic(format!("{}: {e}", path.display())))?;
    let warnings = show::validate(&decoded);
    Ok((decoded, warnings))
}

/// Pack a project JSON file and audio files into a single archive.
///
/// Each audio file becomes an asset whose id is the file stem and whose
/// MIME type follows from its extension.
pub fn pack_project_file(
    project_path: &Path,
    audio_files: &[PathBuf],
    output_path: &Path,
) -> Result<()> {
    let text = std::fs::read_to_string(project_path)?;

    let mut assets: Vec<(String, String)> = Vec::with_capacity(audio_files.len());
    for file in audio_files {
        let id = file
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| {
                ShowPackError::Generic(format!("audio file {} has no usable name", file.display()))
            })?
            .to_string();
        let ext = file.extension().and_then(|e| e.to_str()).unwrap_or("");
        let bytes = std::fs::read(file)?;
        let url = format!(
            "data:{};base64,{}",
            mime_for_extension(ext),
            BASE64.encode(&bytes)
        );
        assets.push((id, url));
    }

    let archive = pack::pack(&text, &assets)?;
    std::fs::write(output_path, &archive)?;
    info!(
        "packed {} + {} audio files -> {} ({} bytes)",
        project_path.display(),
        audio_files.len(),
        output_path.display(),
        archive.len()
    );
    Ok(())
}

/// Unpack a project archive into a directory; returns the written paths.
pub fn unpack_project_file(archive_path: &Path, out_dir: &Path) -> Result<Vec<PathBuf>> {
    let bytes = std::fs::read(archive_path)?;
    let unpacked = pack::unpack(&bytes)?;

    std::fs::create_dir_all(out_dir)?;
    let mut written = Vec::new();

    let project_file = out_dir.join(pack::PROJECT_ENTRY_NAME);
    std::fs::write(&project_file, unpacked.project_text.as_bytes())?;
    written.push(project_file);

    if !unpacked.audio_assets.is_empty() {
        let audio_dir = out_dir.join("audio");
        std::fs::create_dir_all(&audio_dir)?;
        for (id, url) in &unpacked.audio_assets {
            let (mime, data) = parse_data_url(url)
                .map_err(|reason| ShowPackError::Generic(format!("asset '{id}': {reason}")))?;
            let file = audio_dir.join(format!("{id}.{}", pack::extension_for_mime(&mime)));
            std::fs::write(&file, &data)?;
            written.push(file);
        }
    }

    info!(
        "unpacked {} -> {} ({} files)",
        archive_path.display(),
        out_dir.display(),
        written.len()
    );
    Ok(written)
}
