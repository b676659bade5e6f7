//! Hash utilities for archive verification.
//!
//! Every upstream archive is pinned to a SHA-256 digest, stored as lowercase
//! hex. This module computes and verifies those digests.

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::DatasetError;

/// Read chunk size while hashing.
const CHUNK_SIZE: usize = 64 * 1024;

/// Compute the SHA-256 of a file and return it as lowercase hex.
///
/// Uses streaming to handle large archives without loading them into memory.
pub fn compute_file_hash(path: &Path) -> Result<String> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open file for hashing: {}", path.display()))?;

    let mut reader = BufReader::with_capacity(CHUNK_SIZE, file);
    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut hasher = Sha256::new();

    loop {
        let bytes_read = reader
            .read(&mut buf)
            .with_context(|| format!("Failed to read file for hashing: {}", path.display()))?;

        if bytes_read == 0 {
            break;
        }

        hasher.update(&buf[..bytes_read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Verify a file's digest, failing with [`DatasetError::ChecksumMismatch`].
///
/// The comparison ignores case so digests copied from upstream listings in
/// uppercase still match.
pub fn verify_file_hash(path: &Path, expected_hash: &str) -> Result<()> {
    let actual_hash = compute_file_hash(path)?;
    if !actual_hash.eq_ignore_ascii_case(expected_hash) {
        return Err(DatasetError::ChecksumMismatch {
            path: path.to_path_buf(),
            expected: expected_hash.to_string(),
            actual: actual_hash,
        }
        .into());
    }
    Ok(())
}
