//! SHA-256 computation and verification of fetched archives.
//!
//! Verification runs after the fetch completes and before any install step;
//! a mismatch is fatal and is never retried.

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

const BUF_SIZE: usize = 64 * 1024;

/// Verification failure: either the file could not be read, or its digest
/// does not match the expected one.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("checksum mismatch: expected {expected}, actual {actual}")]
    Mismatch { expected: String, actual: String },
    #[error(transparent)]
    Read(#[from] anyhow::Error),
}

/// Compute SHA-256 of a file and return the digest as lowercase hex.
/// Reads in chunks to keep memory use bounded; suitable for large archives.
pub fn sha256_path(path: &Path) -> Result<String> {
    let mut f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; BUF_SIZE];
    loop {
        let n = f
            .read(&mut buf)
            .with_context(|| format!("read {}", path.display()))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    let digest = hasher.finalize();
    Ok(hex::encode(digest))
}

/// Verify that the file at `path` has the expected SHA-256 digest.
///
/// The comparison is case-insensitive over the hex strings, so formulas may
/// carry upper- or lowercase digests. Fails closed: callers must not proceed
/// to install on error.
pub fn verify_path(path: &Path, expected_hex: &str) -> Result<(), VerifyError> {
    let actual = sha256_path(path)?;
    if actual.eq_ignore_ascii_case(expected_hex) {
        Ok(())
    } else {
        Err(VerifyError::Mismatch {
            expected: expected_hex.to_ascii_lowercase(),
            actual,
        })
    }
}
