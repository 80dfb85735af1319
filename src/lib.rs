//! Showpack - show binary codec and portable project archives
//!
//! This crate serializes timed lighting shows for prop firmware, and bundles
//! project data with audio assets into a single portable archive file.

// Enforce strict code quality and reliability
#![deny(
    // Safety
    unsafe_code,

    // Correctness
    missing_debug_implementations,
    unreachable_pub,

    // Future compatibility
    future_incompatible,

    // Rust 2018 idioms
    rust_2018_idioms,

    // All warnings must be fixed
    warnings,
)]
#![warn(
    // Documentation
    missing_docs,

    // Error handling best practices
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::unimplemented,
    clippy::todo,

    // Performance
    clippy::inefficient_to_string,
    clippy::large_enum_variant,

    // Code clarity and maintainability
    clippy::cognitive_complexity,
    clippy::too_many_arguments,
    clippy::type_complexity,

    // Best practices
    clippy::clone_on_ref_ptr,
    clippy::wildcard_imports,
    clippy::enum_glob_use,
    clippy::if_not_else,
    clippy::single_match_else,
    clippy::needless_continue,
    clippy::explicit_iter_loop,
    clippy::explicit_into_iter_loop,
)]
#![allow(
    missing_docs,  // TODO: Complete documentation
)]

pub mod api;
pub mod archive;
pub mod exceptions;
pub mod exit_codes;
pub mod logger;
pub mod pack;
pub mod show;
pub mod version;

// Re-export main API functions
pub use api::{encode_show_file, inspect_show_file, pack_project_file, unpack_project_file};
pub use exceptions::{Result, ShowPackError};

// Re-export codec and archive types for advanced usage
pub use archive::{ReadLimits, WriteOptions};
pub use show::{DecodeError, DecodedShow, PropMask, ValidationWarning};
