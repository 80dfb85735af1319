//! Show binary encoder
//!
//! Turns a Project value into the firmware binary: header, 224-entry prop
//! configuration table, 48-byte event records, and an optional cue trailer.
//! Malformed per-clip input (unknown effect names, unparseable colors)
//! degrades to safe defaults instead of aborting the encode, since projects
//! come out of an interactive editor and may be partially invalid.

use std::collections::HashMap;

use log::{debug, trace};

use crate::exceptions::{Result, ShowPackError};

use super::constants::{
    CONFIG_TABLE_SIZE, CUE_BLOCK_SIZE, CUE_SLOTS, CUE_TAG, CUE_UNSET, CUE_VERSION,
    DEFAULT_BRIGHTNESS, DEFAULT_LED_COUNT, EFFECT_OFF, EVENT_SIZE, HEADER_SIZE, PROP_COUNT,
    SHOW_MAGIC, SHOW_VERSION, color_order_code, effect_code, led_type_code,
};
use super::mask::PropMask;
use super::project::{Cue, HardwareProfile, Project, parse_id_ranges};

/// One event record ready for serialization
#[derive(Debug, Clone)]
struct EventRecord {
    start_ms: u32,
    duration_ms: u32,
    effect: u8,
    speed: u8,
    width: u8,
    color1: u32,
    color2: u32,
    mask: PropMask,
}

impl EventRecord {
    fn off(start_ms: u32, duration_ms: u32, mask: PropMask) -> Self {
        EventRecord {
            start_ms,
            duration_ms,
            effect: EFFECT_OFF,
            speed: 0,
            width: 0,
            color1: 0,
            color2: 0,
            mask,
        }
    }

    fn pack_into(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.start_ms.to_le_bytes());
        out.extend_from_slice(&self.duration_ms.to_le_bytes());
        out.push(self.effect);
        out.push(self.speed);
        out.push(self.width);
        out.push(0); // reserved
        out.extend_from_slice(&self.color1.to_le_bytes());
        out.extend_from_slice(&self.color2.to_le_bytes());
        for word in self.mask.0 {
            out.extend_from_slice(&word.to_le_bytes());
        }
    }
}

/// Encode a project into the show binary, returning the bytes and the
/// number of events emitted (including synthesized OFF events).
pub fn encode(project: &Project) -> Result<(Vec<u8>, usize)> {
    let assignments = resolve_assignments(project);
    let events = build_events(project);

    if events.len() > u16::MAX as usize {
        return Err(ShowPackError::EncodeError(format!(
            "{} events exceed the format's 16-bit event count",
            events.len()
        )));
    }

    let cue_times = cue_slot_times(&project.cues);
    let has_cues = cue_times.iter().any(|&t| t != CUE_UNSET);

    let mut out = Vec::with_capacity(
        HEADER_SIZE
            + CONFIG_TABLE_SIZE
            + events.len() * EVENT_SIZE
            + if has_cues { CUE_BLOCK_SIZE } else { 0 },
    );

    // Header
    out.extend_from_slice(SHOW_MAGIC);
    out.extend_from_slice(&SHOW_VERSION.to_le_bytes());
    out.extend_from_slice(&(events.len() as u16).to_le_bytes());
    out.extend_from_slice(&[0u8; 8]); // reserved

    // Dense 224-entry configuration table
    for prop_index in 0..PROP_COUNT {
        match assignments[prop_index] {
            Some(profile) => {
                out.extend_from_slice(&profile.led_count.to_le_bytes());
                out.push(led_type_code(&profile.led_type));
                out.push(color_order_code(&profile.color_order));
                out.push(profile.brightness);
            }
            None => {
                out.extend_from_slice(&DEFAULT_LED_COUNT.to_le_bytes());
                out.push(0);
                out.push(0);
                out.push(DEFAULT_BRIGHTNESS);
            }
        }
        out.extend_from_slice(&[0u8; 3]); // reserved
    }

    for event in &events {
        event.pack_into(&mut out);
    }

    if has_cues {
        out.extend_from_slice(CUE_TAG);
        out.extend_from_slice(&CUE_VERSION.to_le_bytes());
        out.extend_from_slice(&(CUE_SLOTS as u16).to_le_bytes());
        for time in cue_times {
            out.extend_from_slice(&time.to_le_bytes());
        }
        out.extend_from_slice(&[0u8; 8]); // reserved
    }

    debug!(
        "encoded show '{}': {} events, {} bytes, cues={}",
        project.name,
        events.len(),
        out.len(),
        has_cues
    );
    Ok((out, events.len()))
}

/// Resolve per-prop hardware profiles: range assignment first, in profile
/// order, then patch-table overrides which always win.
fn resolve_assignments(project: &Project) -> Vec<Option<&HardwareProfile>> {
    let mut assignments: Vec<Option<&HardwareProfile>> = vec![None; PROP_COUNT];

    for profile in &project.hardware_profiles {
        for id in parse_id_ranges(&profile.assigned) {
            if (1..=PROP_COUNT as u32).contains(&id) {
                assignments[(id - 1) as usize] = Some(profile);
            }
        }
    }

    for patch in &project.patch_table {
        if !(1..=PROP_COUNT as u32).contains(&patch.prop_id) {
            continue;
        }
        if let Some(profile) = project
            .hardware_profiles
            .iter()
            .find(|p| p.id == patch.profile_id)
        {
            assignments[(patch.prop_id - 1) as usize] = Some(profile);
        }
    }

    assignments
}

/// Build the event list: per LED track, clips sorted by start time with
/// synthesized OFF events filling the gaps and trailing up to the show end.
fn build_events(project: &Project) -> Vec<EventRecord> {
    let groups: HashMap<&str, Vec<u32>> = project
        .prop_groups
        .iter()
        .map(|g| (g.name.as_str(), parse_id_ranges(&g.ids)))
        .collect();

    let mut events = Vec::new();
    for track in &project.tracks {
        if !track.kind.eq_ignore_ascii_case("led") {
            continue;
        }

        let mut mask = PropMask::from_ids(track.props.iter().copied());
        if let Some(ref group_name) = track.group {
            if let Some(ids) = groups.get(group_name.as_str()) {
                for &id in ids {
                    mask.set(id);
                }
            }
        }
        if mask.is_empty() {
            trace!("track '{}' targets no props, skipped", track.name);
            continue;
        }

        let mut clips: Vec<_> = track.clips.iter().collect();
        clips.sort_by_key(|c| c.start_ms);

        let mut cursor: u32 = 0;
        for clip in clips {
            if clip.start_ms > cursor {
                events.push(EventRecord::off(cursor, clip.start_ms - cursor, mask));
            }
            events.push(EventRecord {
                start_ms: clip.start_ms,
                duration_ms: clip.duration_ms,
                effect: effect_code(&clip.effect),
                speed: quantize_speed(clip.speed),
                width: quantize_width(clip.width),
                color1: parse_color(&clip.color1),
                color2: parse_color(&clip.color2),
                mask,
            });
            cursor = cursor.max(clip.start_ms.saturating_add(clip.duration_ms));
        }
        if cursor < project.duration_ms {
            events.push(EventRecord::off(cursor, project.duration_ms - cursor, mask));
        }
    }
    events
}

/// Cue times per slot A-D; sentinel for disabled, null-timed, or absent cues
fn cue_slot_times(cues: &[Cue]) -> [u32; CUE_SLOTS] {
    let mut times = [CUE_UNSET; CUE_SLOTS];
    for cue in cues {
        let Some(slot) = cue_slot(&cue.id) else {
            continue;
        };
        if cue.enabled {
            if let Some(time) = cue.time_ms {
                times[slot] = time;
            }
        }
    }
    times
}

fn cue_slot(id: &str) -> Option<usize> {
    match id.trim().to_ascii_uppercase().as_str() {
        "A" => Some(0),
        "B" => Some(1),
        "C" => Some(2),
        "D" => Some(3),
        _ => None,
    }
}

/// Speed multiplier to byte: non-positive values are treated as 1.0, then
/// scaled by 50 and clamped to [0, 255].
pub fn quantize_speed(multiplier: f32) -> u8 {
    let multiplier = if multiplier <= 0.0 { 1.0 } else { multiplier };
    (multiplier * 50.0).round().clamp(0.0, 255.0) as u8
}

/// Width [0, 1] to byte [0, 255]
pub fn quantize_width(width: f32) -> u8 {
    (width.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Hex color string ("#ff8800" or "ff8800") to a 24-bit RGB value;
/// unparseable input degrades to 0.
pub fn parse_color(color: &str) -> u32 {
    let hex = color.trim().trim_start_matches('#');
    if hex.is_empty() {
        return 0;
    }
    u32::from_str_radix(hex, 16).map(|v| v & 0x00FF_FFFF).unwrap_or(0)
}
