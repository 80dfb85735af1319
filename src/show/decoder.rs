//! Show binary decoder
//!
//! A total function over arbitrary byte buffers: corrupted or foreign
//! files produce a structured [`DecodeError`] value, never a panic.
//! Truncation past the header is tolerated so legacy and damaged files can
//! still be inspected; only a short buffer or wrong magic is fatal.

use std::fmt;

use log::debug;
use serde::Serialize;

use super::constants::{
    CONFIG_TABLE_SIZE, CUE_BLOCK_SIZE, CUE_SLOTS, CUE_TAG, CUE_UNSET, EVENT_SIZE, HEADER_SIZE,
    MASK_WORDS, PROP_COUNT, SHOW_MAGIC, SHOW_VERSION,
};
use super::mask::PropMask;

/// Structured decode failure; the only two hard errors the decoder has
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DecodeError {
    /// Buffer is shorter than the fixed header
    TooShort { len: usize },

    /// Magic bytes at offset 0 do not match
    BadMagic { found: [u8; 4] },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::TooShort { len } => {
                write!(f, "buffer of {len} bytes is shorter than the {HEADER_SIZE}-byte header")
            }
            DecodeError::BadMagic { found } => {
                write!(f, "magic mismatch: found {:02x?}", found)
            }
        }
    }
}

impl std::error::Error for DecodeError {}

/// One prop's configuration record from the LUT
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PropConfig {
    pub led_count: u16,
    pub led_type: u8,
    pub color_order: u8,
    pub brightness: u8,
}

/// One decoded event record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedEvent {
    pub start_ms: u32,
    pub duration_ms: u32,
    pub effect: u8,
    pub speed: u8,
    pub width: u8,
    pub color1: u32,
    pub color2: u32,
    pub mask: PropMask,

    /// Population count over the mask words
    pub prop_count: u32,
}

impl DecodedEvent {
    /// Event end time, saturating at u32::MAX
    pub fn end_ms(&self) -> u32 {
        self.start_ms.saturating_add(self.duration_ms)
    }
}

/// Decoded cue trailer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CueBlock {
    /// Byte offset of the trailer within the file
    pub offset: usize,
    pub version: u16,
    pub count: u16,

    /// Slot times A-D; `None` where the sentinel marks an unset slot
    pub times: [Option<u32>; CUE_SLOTS],
}

/// Summary statistics over a decoded show
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShowSummary {
    pub total_events: usize,
    pub max_end_ms: u32,

    /// Props with a nonzero configured LED count
    pub configured_props: usize,
    pub file_size: usize,
}

/// A fully decoded show binary
#[derive(Debug, Clone, Serialize)]
pub struct DecodedShow {
    pub version: u16,

    /// Event count the header declared (may exceed what was parsed)
    pub declared_events: u16,

    /// Parsed LUT entries; shorter than 224 when the buffer is truncated
    pub configs: Vec<PropConfig>,

    pub events: Vec<DecodedEvent>,
    pub cues: Option<CueBlock>,
    pub summary: ShowSummary,
}

/// Decode a show binary. Tolerates truncation anywhere past the header;
/// fails only on a short buffer or a magic mismatch.
pub fn decode(data: &[u8]) -> Result<DecodedShow, DecodeError> {
    if data.len() < HEADER_SIZE {
        return Err(DecodeError::TooShort { len: data.len() });
    }
    if &data[0..4] != SHOW_MAGIC {
        let mut found = [0u8; 4];
        found.copy_from_slice(&data[0..4]);
        return Err(DecodeError::BadMagic { found });
    }

    let version = u16::from_le_bytes([data[4], data[5]]);
    let declared_events = u16::from_le_bytes([data[6], data[7]]);

    // Version 3 carries the dense LUT; earlier formats go straight to events
    let mut configs = Vec::new();
    let events_start = if version == SHOW_VERSION {
        let table_end = HEADER_SIZE + CONFIG_TABLE_SIZE;
        let mut offset = HEADER_SIZE;
        while configs.len() < PROP_COUNT && offset + 8 <= data.len().min(table_end) {
            configs.push(PropConfig {
                led_count: u16::from_le_bytes([data[offset], data[offset + 1]]),
                led_type: data[offset + 2],
                color_order: data[offset + 3],
                brightness: data[offset + 4],
            });
            offset += 8;
        }
        table_end
    } else {
        HEADER_SIZE
    };

    let mut events = Vec::new();
    let mut offset = events_start;
    while events.len() < declared_events as usize && offset + EVENT_SIZE <= data.len() {
        let mut mask = PropMask::new();
        for (i, word) in mask.0.iter_mut().enumerate().take(MASK_WORDS) {
            let pos = offset + 20 + i * 4;
            *word = u32::from_le_bytes([data[pos], data[pos + 1], data[pos + 2], data[pos + 3]]);
        }
        let event = DecodedEvent {
            start_ms: u32::from_le_bytes([
                data[offset],
                data[offset + 1],
                data[offset + 2],
                data[offset + 3],
            ]),
            duration_ms: u32::from_le_bytes([
                data[offset + 4],
                data[offset + 5],
                data[offset + 6],
                data[offset + 7],
            ]),
            effect: data[offset + 8],
            speed: data[offset + 9],
            width: data[offset + 10],
            color1: u32::from_le_bytes([
                data[offset + 12],
                data[offset + 13],
                data[offset + 14],
                data[offset + 15],
            ]),
            color2: u32::from_le_bytes([
                data[offset + 16],
                data[offset + 17],
                data[offset + 18],
                data[offset + 19],
            ]),
            prop_count: mask.count(),
            mask,
        };
        events.push(event);
        offset += EVENT_SIZE;
    }

    // Positional cue-trailer detection: present only when exactly one
    // trailer-sized block remains after the last parsed event
    let cues = if data.len().checked_sub(offset) == Some(CUE_BLOCK_SIZE)
        && &data[offset..offset + 4] == CUE_TAG
    {
        let mut times = [None; CUE_SLOTS];
        for (i, slot) in times.iter_mut().enumerate() {
            let pos = offset + 8 + i * 4;
            let raw =
                u32::from_le_bytes([data[pos], data[pos + 1], data[pos + 2], data[pos + 3]]);
            *slot = if raw == CUE_UNSET { None } else { Some(raw) };
        }
        Some(CueBlock {
            offset,
            version: u16::from_le_bytes([data[offset + 4], data[offset + 5]]),
            count: u16::from_le_bytes([data[offset + 6], data[offset + 7]]),
            times,
        })
    } else {
        None
    };

    let summary = ShowSummary {
        total_events: events.len(),
        max_end_ms: events.iter().map(DecodedEvent::end_ms).max().unwrap_or(0),
        configured_props: configs.iter().filter(|c| c.led_count > 0).count(),
        file_size: data.len(),
    };

    debug!(
        "decoded show: version {}, {}/{} events, {} configs, cues={}",
        version,
        events.len(),
        declared_events,
        configs.len(),
        cues.is_some()
    );

    Ok(DecodedShow {
        version,
        declared_events,
        configs,
        events,
        cues,
        summary,
    })
}
