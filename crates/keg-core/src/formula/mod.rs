//! Formula: the declarative package descriptor.
//!
//! A formula names a package, its version, a download URL template, the
//! expected SHA-256 of the archive, and the copy steps that install files
//! from the extracted archive. It is authored once per release and is
//! immutable at use time; a new release supersedes the file wholesale.

mod resolve;

pub use resolve::{resolve_url, VERSION_TOKEN};

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default destination directory for an install step, relative to the
/// install root.
const DEFAULT_DEST: &str = "bin";

fn default_dest() -> PathBuf {
    PathBuf::from(DEFAULT_DEST)
}

/// One file-copy instruction: a path inside the extracted archive and a
/// destination directory relative to the install root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallStep {
    /// Path of the file inside the extracted archive (e.g. `"guitar-tuner"`).
    pub source: PathBuf,
    /// Destination directory under the install root. Defaults to `"bin"`.
    #[serde(default = "default_dest")]
    pub dest: PathBuf,
}

/// Declarative descriptor for one package release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Formula {
    /// Package identifier.
    pub name: String,
    /// Semantic version string, substituted into `url`.
    pub version: String,
    /// Download URL template; `{version}` is replaced by `version`.
    pub url: String,
    /// Expected SHA-256 of the archive at the resolved URL, as hex.
    pub sha256: String,
    /// Ordered, non-empty copy instructions applied after extraction.
    pub install: Vec<InstallStep>,
}

/// Failure to read, parse, or validate a formula file.
#[derive(Debug, Error)]
pub enum FormulaError {
    #[error("failed to read formula {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse formula {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("formula field `{field}` must not be empty")]
    EmptyField { field: &'static str },
    #[error("formula `sha256` must be 64 hex characters, got {got:?}")]
    BadChecksum { got: String },
    #[error("formula `url` contains neither the {{version}} token nor the version string {version:?}")]
    UrlMissingVersion { version: String },
    #[error("formula `install` must contain at least one step")]
    NoInstallSteps,
    #[error("install step source {path} must be a relative path inside the archive")]
    UnsafeSource { path: PathBuf },
    #[error("install step destination {path} must be a relative path inside the install root")]
    UnsafeDest { path: PathBuf },
}

/// True if `path` is relative and free of `..` (and root/prefix) components,
/// so joining it onto a base directory cannot escape that directory.
pub(crate) fn is_confined(path: &Path) -> bool {
    use std::path::Component;
    path.components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

impl Formula {
    /// Load a formula from a `.toml` or `.json` file and validate it.
    pub fn load(path: &Path) -> Result<Self, FormulaError> {
        let data = fs::read_to_string(path).map_err(|source| FormulaError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let formula: Formula = if is_json {
            serde_json::from_str(&data).map_err(|e| FormulaError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?
        } else {
            toml::from_str(&data).map_err(|e| FormulaError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?
        };

        formula.validate()?;
        Ok(formula)
    }

    /// Check the invariants the pipeline relies on. Runs before any network
    /// traffic so a broken formula fails fast.
    pub fn validate(&self) -> Result<(), FormulaError> {
        if self.name.trim().is_empty() {
            return Err(FormulaError::EmptyField { field: "name" });
        }
        if self.version.trim().is_empty() {
            return Err(FormulaError::EmptyField { field: "version" });
        }
        if self.url.trim().is_empty() {
            return Err(FormulaError::EmptyField { field: "url" });
        }
        if self.sha256.len() != 64 || !self.sha256.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(FormulaError::BadChecksum {
                got: self.sha256.clone(),
            });
        }
        // A fully concrete URL (version already spelled out) is allowed.
        if !self.url.contains(VERSION_TOKEN) && !self.url.contains(&self.version) {
            return Err(FormulaError::UrlMissingVersion {
                version: self.version.clone(),
            });
        }
        if self.install.is_empty() {
            return Err(FormulaError::NoInstallSteps);
        }
        for step in &self.install {
            if !is_confined(&step.source) {
                return Err(FormulaError::UnsafeSource {
                    path: step.source.clone(),
                });
            }
            if !is_confined(&step.dest) {
                return Err(FormulaError::UnsafeDest {
                    path: step.dest.clone(),
                });
            }
        }
        Ok(())
    }
}
