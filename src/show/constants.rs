// Core show binary format constants that never change
// All multi-byte fields are little-endian on the wire

/// Magic bytes at offset 0 of every show binary
pub const SHOW_MAGIC: &[u8; 4] = b"LSHW";

/// Current format version
pub const SHOW_VERSION: u16 = 3;

// Fixed sizes - part of the format specification
pub const HEADER_SIZE: usize = 16; // magic + version + count + reserved
pub const PROP_COUNT: usize = 224; // fixed address space, never resized
pub const PROP_CONFIG_SIZE: usize = 8; // one LUT record
pub const CONFIG_TABLE_SIZE: usize = PROP_COUNT * PROP_CONFIG_SIZE; // 1792
pub const EVENT_SIZE: usize = 48;
pub const MASK_WORDS: usize = 7; // 224 bits as 7 x u32

// Cue trailer - positional, appended after the last event
pub const CUE_TAG: &[u8; 4] = b"CUE1";
pub const CUE_VERSION: u16 = 1;
pub const CUE_SLOTS: usize = 4; // slots A-D
pub const CUE_BLOCK_SIZE: usize = 32; // tag + version + count + 4 times + reserved
pub const CUE_UNSET: u32 = 0xFFFF_FFFF; // sentinel for a disabled/unset slot

// Event effect codes - part of format spec
pub const EFFECT_OFF: u8 = 0;
pub const EFFECT_SOLID: u8 = 1;
pub const EFFECT_GRADIENT: u8 = 2;
pub const EFFECT_PULSE: u8 = 3;
pub const EFFECT_CHASE: u8 = 4;
pub const EFFECT_RAINBOW: u8 = 5;
pub const EFFECT_STROBE: u8 = 6;
pub const EFFECT_SPARKLE: u8 = 7;
pub const EFFECT_METEOR: u8 = 8;
pub const EFFECT_WAVE: u8 = 9;
pub const EFFECT_FIRE: u8 = 10;
pub const EFFECT_TWINKLE: u8 = 11;

/// Fallback for clip effect names the table does not know
pub const DEFAULT_EFFECT: u8 = EFFECT_SOLID;

// LUT defaults for props no profile claims
pub const DEFAULT_LED_COUNT: u16 = 164;
pub const DEFAULT_BRIGHTNESS: u8 = 255;

/// Map a clip effect name to its firmware code.
///
/// Unknown names degrade to [`DEFAULT_EFFECT`] rather than failing, since
/// interactively edited projects may carry names from newer editors.
pub fn effect_code(name: &str) -> u8 {
    match name.to_ascii_lowercase().as_str() {
        "off" => EFFECT_OFF,
        "solid" => EFFECT_SOLID,
        "gradient" => EFFECT_GRADIENT,
        "pulse" => EFFECT_PULSE,
        "chase" => EFFECT_CHASE,
        "rainbow" => EFFECT_RAINBOW,
        "strobe" => EFFECT_STROBE,
        "sparkle" => EFFECT_SPARKLE,
        "meteor" => EFFECT_METEOR,
        "wave" => EFFECT_WAVE,
        "fire" => EFFECT_FIRE,
        "twinkle" => EFFECT_TWINKLE,
        _ => DEFAULT_EFFECT,
    }
}

/// Map an LED chip name to its LUT code (6 known values, default 0)
pub fn led_type_code(name: &str) -> u8 {
    match name.to_ascii_lowercase().as_str() {
        "ws2811" => 0,
        "ws2812" => 1,
        "ws2812b" => 2,
        "sk6812" => 3,
        "apa102" => 4,
        "sm16703" => 5,
        _ => 0,
    }
}

/// Map a color-order name to its LUT code (6 known values, default 0)
pub fn color_order_code(name: &str) -> u8 {
    match name.to_ascii_lowercase().as_str() {
        "rgb" => 0,
        "rbg" => 1,
        "grb" => 2,
        "gbr" => 3,
        "brg" => 4,
        "bgr" => 5,
        _ => 0,
    }
}
