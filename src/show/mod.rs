//! Show binary codec
//!
//! Encode, decode, and validate the fixed little-endian binary format the
//! prop firmware consumes: a 16-byte header, a dense 224-entry per-prop
//! configuration table, 48-byte event records, and an optional 32-byte cue
//! trailer. `encode` consumes the editor's Project value; `decode` and
//! `validate` are total and safe to run on arbitrary files.

pub mod constants;
pub mod decoder;
pub mod encoder;
pub mod mask;
pub mod project;
pub mod validator;

pub use decoder::{CueBlock, DecodeError, DecodedEvent, DecodedShow, PropConfig, ShowSummary, decode};
pub use encoder::encode;
pub use mask::PropMask;
pub use project::Project;
pub use validator::{ValidationWarning, validate};
