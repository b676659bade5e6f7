//! Archive handling utilities.
//!
//! Provides unified archive extraction using native Rust crates for
//! gzip tarballs (flate2 + tar), ZIP (zip crate) and 7z (sevenz-rust2).

pub mod unpack;

pub use unpack::{detect_archive_type, extract_all, ArchiveType};
