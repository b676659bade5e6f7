//! Integrity errors raised by the dataset pipeline.
//!
//! These are never skipped silently: each one means either a corrupted
//! download or a gap in the hand-authored form tables that the dataset
//! maintainer has to fix. Plumbing errors (I/O, decoding) travel as
//! `anyhow::Error` with context instead.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("Invalid checksum for {path}: expected {expected} but got {actual}")]
    ChecksumMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    #[error("Got {count} matching forms instead of 1 for {name}")]
    AmbiguousForm { name: String, count: usize },

    #[error("No form '{form}' registered for entity {index}")]
    UnknownForm { index: u32, form: String },

    #[error("Entity {0} is not in the form registry")]
    UnknownEntity(u32),

    #[error("Cannot resolve a form for {path}: no override matches and the stem is not a registered form name")]
    UnresolvedFile { path: PathBuf },

    #[error("{first} and {second} both resolve to {name} but differ in content")]
    NameCollision {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("No content detected in {path}")]
    NoForeground { path: PathBuf },

    #[error("Unsupported color layout {color} in {path}, expected 3 channels after flattening")]
    UnsupportedColorLayout { path: PathBuf, color: String },

    #[error("Invalid sprite sheet {path}: width {width} is not a multiple of height {height}")]
    BadSpriteSheet {
        path: PathBuf,
        width: u32,
        height: u32,
    },

    #[error("{source_name} needs a manual download.\n\nURL: {url}\nSave as: {path}")]
    ManualDownload {
        source_name: String,
        url: String,
        path: PathBuf,
    },
}
