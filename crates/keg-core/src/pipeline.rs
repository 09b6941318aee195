//! The install pipeline: resolve → fetch → verify → install.
//!
//! Strictly synchronous and sequential. Verification sits between fetch and
//! install; install never runs unless the archive digest matched, and a
//! mismatching archive is deleted from the cache.

use crate::checksum::{self, VerifyError};
use crate::config::{self, KegConfig};
use crate::fetch::{self, FetchError, FetchOptions};
use crate::formula::{resolve_url, Formula, FormulaError};
use crate::install::{self, InstallError, InstallReport};
use crate::retry::{run_with_retry, RetryPolicy};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Any failure of the pipeline, surfaced to the host unmodified.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Formula(#[from] FormulaError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("checksum mismatch: expected {expected}, actual {actual}")]
    ChecksumMismatch { expected: String, actual: String },
    #[error(transparent)]
    Install(#[from] InstallError),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<VerifyError> for PipelineError {
    fn from(e: VerifyError) -> Self {
        match e {
            VerifyError::Mismatch { expected, actual } => {
                PipelineError::ChecksumMismatch { expected, actual }
            }
            VerifyError::Read(e) => PipelineError::Other(e),
        }
    }
}

/// Host-side knobs for one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Root the install steps copy beneath (e.g. the package manager prefix).
    pub target_root: PathBuf,
    /// Keep the fetched archive in the cache after a successful install.
    pub keep_archive: bool,
}

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct InstallOutcome {
    /// The fully substituted download URL.
    pub url: String,
    /// Where the archive was cached (removed unless `keep_archive`).
    pub archive: PathBuf,
    pub report: InstallReport,
}

fn fetch_options(cfg: &KegConfig) -> FetchOptions {
    FetchOptions {
        connect_timeout: Duration::from_secs(cfg.connect_timeout_secs),
        timeout: Duration::from_secs(cfg.fetch_timeout_secs),
    }
}

fn retry_policy(cfg: &KegConfig) -> RetryPolicy {
    cfg.retry
        .as_ref()
        .map(RetryPolicy::from_config)
        .unwrap_or_default()
}

/// Resolve the formula's URL, fetch the archive into `cache_dir`, and verify
/// its SHA-256. Returns the cached archive path.
///
/// The fetch is retried per the config's policy; a checksum mismatch is
/// fatal, never retried, and removes the offending file so a later run
/// cannot pick it up.
pub fn fetch_verified(
    formula: &Formula,
    cache_dir: &Path,
    cfg: &KegConfig,
) -> Result<PathBuf, PipelineError> {
    formula.validate()?;
    let url = resolve_url(formula);
    let dest = cache_dir.join(fetch::archive_filename(&url));

    let opts = fetch_options(cfg);
    let policy = retry_policy(cfg);
    let bytes = run_with_retry(&policy, || fetch::fetch_to_path(&url, &dest, &opts))?;
    tracing::info!(name = %formula.name, url, bytes, "fetched archive");

    if let Err(e) = checksum::verify_path(&dest, &formula.sha256) {
        if matches!(e, VerifyError::Mismatch { .. }) {
            if let Err(rm) = fs::remove_file(&dest) {
                tracing::warn!("failed to remove mismatching archive {}: {}", dest.display(), rm);
            }
        }
        return Err(e.into());
    }
    Ok(dest)
}

/// Run the full pipeline for one formula: resolve → fetch → verify → install.
pub fn run(
    formula: &Formula,
    opts: &PipelineOptions,
    cfg: &KegConfig,
) -> Result<InstallOutcome, PipelineError> {
    let cache_dir = config::cache_dir(cfg).map_err(PipelineError::Other)?;
    let archive = fetch_verified(formula, &cache_dir, cfg)?;
    let url = resolve_url(formula);

    let report = install::install_archive(&archive, &formula.install, &opts.target_root)?;
    tracing::info!(
        name = %formula.name,
        version = %formula.version,
        files = report.installed.len(),
        root = %opts.target_root.display(),
        "install complete"
    );

    if !opts.keep_archive {
        if let Err(e) = fs::remove_file(&archive) {
            tracing::warn!("failed to remove cached archive {}: {}", archive.display(), e);
        }
    }

    Ok(InstallOutcome {
        url,
        archive,
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetryConfig;

    #[test]
    fn fetch_options_from_config() {
        let cfg = KegConfig {
            connect_timeout_secs: 7,
            fetch_timeout_secs: 99,
            ..KegConfig::default()
        };
        let opts = fetch_options(&cfg);
        assert_eq!(opts.connect_timeout, Duration::from_secs(7));
        assert_eq!(opts.timeout, Duration::from_secs(99));
    }

    #[test]
    fn retry_policy_defaults_when_section_missing() {
        let cfg = KegConfig::default();
        let policy = retry_policy(&cfg);
        assert_eq!(policy.max_attempts, RetryConfig::default().max_attempts);
    }

    #[test]
    fn retry_policy_from_config_section() {
        let cfg = KegConfig {
            retry: Some(RetryConfig {
                max_attempts: 7,
                base_delay_secs: 0.1,
                max_delay_secs: 5,
            }),
            ..KegConfig::default()
        };
        assert_eq!(retry_policy(&cfg).max_attempts, 7);
    }
}
