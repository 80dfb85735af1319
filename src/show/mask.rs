//! Fixed-size 224-bit prop mask
//!
//! Bit i set means prop id i+1 is targeted. Kept as 7 packed u32 words so
//! the mask stays a fixed-cost value type that serializes directly into
//! event records.

use serde::Serialize;

use super::constants::{MASK_WORDS, PROP_COUNT};

/// 224-bit prop membership set stored as 7 little-endian u32 words
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PropMask(pub [u32; MASK_WORDS]);

impl PropMask {
    /// Empty mask targeting no props
    pub fn new() -> Self {
        PropMask([0; MASK_WORDS])
    }

    /// Set the bit for a prop id; ids outside [1, 224] are ignored
    pub fn set(&mut self, prop_id: u32) {
        if prop_id < 1 || prop_id > PROP_COUNT as u32 {
            return;
        }
        let bit = prop_id - 1;
        self.0[(bit / 32) as usize] |= 1 << (bit % 32);
    }

    /// Check whether a prop id is targeted
    pub fn contains(&self, prop_id: u32) -> bool {
        if prop_id < 1 || prop_id > PROP_COUNT as u32 {
            return false;
        }
        let bit = prop_id - 1;
        self.0[(bit / 32) as usize] & (1 << (bit % 32)) != 0
    }

    /// Number of targeted props
    pub fn count(&self) -> u32 {
        self.0.iter().map(|w| w.count_ones()).sum()
    }

    /// True when no prop is targeted
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|&w| w == 0)
    }

    /// Bitwise intersection with another mask
    pub fn intersection(&self, other: &PropMask) -> PropMask {
        let mut words = [0u32; MASK_WORDS];
        for (i, word) in words.iter_mut().enumerate() {
            *word = self.0[i] & other.0[i];
        }
        PropMask(words)
    }

    /// True when at least one prop is targeted by both masks
    pub fn intersects(&self, other: &PropMask) -> bool {
        self.0.iter().zip(other.0.iter()).any(|(a, b)| a & b != 0)
    }

    /// Build a mask from an iterator of prop ids, dropping out-of-range ids
    pub fn from_ids<I: IntoIterator<Item = u32>>(ids: I) -> Self {
        let mut mask = PropMask::new();
        for id in ids {
            mask.set(id);
        }
        mask
    }
}
