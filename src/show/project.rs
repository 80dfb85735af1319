//! External Project data contract
//!
//! These structs mirror the editor's project JSON. The codec only reads
//! them; mutation and editing semantics live with the editor, not here.

use serde::{Deserialize, Serialize};

use super::constants::PROP_COUNT;

/// A complete editable show project
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Project {
    #[serde(default)]
    pub name: String,

    /// Total show duration in milliseconds
    #[serde(default)]
    pub duration_ms: u32,

    #[serde(default)]
    pub tracks: Vec<Track>,

    #[serde(default)]
    pub prop_groups: Vec<PropGroup>,

    #[serde(default)]
    pub hardware_profiles: Vec<HardwareProfile>,

    /// Individual prop-id to profile-id overrides, applied after ranges
    #[serde(default)]
    pub patch_table: Vec<PatchEntry>,

    /// Up to four cues, slots A-D
    #[serde(default)]
    pub cues: Vec<Cue>,
}

/// One timeline track; only `kind == "led"` tracks are encoded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    #[serde(default)]
    pub name: String,

    #[serde(rename = "type", default = "default_track_kind")]
    pub kind: String,

    /// Optional prop group this track targets, by name
    #[serde(default)]
    pub group: Option<String>,

    /// Explicit prop ids targeted in addition to the group
    #[serde(default)]
    pub props: Vec<u32>,

    #[serde(default)]
    pub clips: Vec<Clip>,
}

/// One timed effect clip on a track
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clip {
    pub start_ms: u32,
    pub duration_ms: u32,

    #[serde(default)]
    pub effect: String,

    /// Speed multiplier; quantized to a byte at encode time
    #[serde(default = "default_speed")]
    pub speed: f32,

    /// Width in [0, 1]; quantized to a byte at encode time
    #[serde(default)]
    pub width: f32,

    /// Hex color strings like "#ff8800"
    #[serde(default)]
    pub color1: String,

    #[serde(default)]
    pub color2: String,
}

/// Named group of props, ids given in range notation ("1-5, 8, 10-12")
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropGroup {
    pub name: String,

    #[serde(default)]
    pub ids: String,
}

/// Hardware description for a family of props
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HardwareProfile {
    pub id: u32,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub led_count: u16,

    #[serde(default)]
    pub led_type: String,

    #[serde(default)]
    pub color_order: String,

    #[serde(default = "default_brightness")]
    pub brightness: u8,

    /// Prop ids this profile claims, in range notation
    #[serde(default)]
    pub assigned: String,
}

/// One prop-id to profile-id override; wins over range assignment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatchEntry {
    pub prop_id: u32,
    pub profile_id: u32,
}

/// One show cue; `id` names a slot A-D
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cue {
    pub id: String,

    /// Millisecond time, or null when unset
    pub time_ms: Option<u32>,

    #[serde(default)]
    pub enabled: bool,
}

fn default_track_kind() -> String {
    "led".to_string()
}

fn default_speed() -> f32 {
    1.0
}

fn default_brightness() -> u8 {
    255
}

/// Parse compact id-range notation ("1-5, 8, 10-12") into a flat id list.
///
/// Malformed segments are skipped; order follows the notation, duplicates
/// are kept (the mask absorbs them). Ranges are clamped to the prop
/// address space, so "1-4294967295" yields 1..=224 instead of gigabytes.
pub fn parse_id_ranges(notation: &str) -> Vec<u32> {
    let mut ids = Vec::new();
    for segment in notation.split(',') {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        if let Some((lo, hi)) = segment.split_once('-') {
            let lo = lo.trim().parse::<u32>();
            let hi = hi.trim().parse::<u32>();
            if let (Ok(lo), Ok(hi)) = (lo, hi) {
                let hi = hi.min(PROP_COUNT as u32);
                if lo <= hi {
                    ids.extend(lo..=hi);
                }
            }
        } else if let Ok(id) = segment.parse::<u32>() {
            ids.push(id);
        }
    }
    ids
}
