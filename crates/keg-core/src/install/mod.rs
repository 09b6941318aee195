//! Install: extract the verified archive and apply the formula's copy steps.
//!
//! Extraction happens in a scratch directory; each step then copies one file
//! into its destination under the install root. Not transactional: a failed
//! step may leave earlier steps in place.

mod extract;

use crate::formula::InstallStep;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Filesystem or archive-structure failure during install.
#[derive(Debug, Error)]
pub enum InstallError {
    #[error("failed to read archive {path}: {source}")]
    Archive {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to extract archive {path}: {source}")]
    Extract {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("archive does not contain install source {path}")]
    MissingSource { path: PathBuf },
    #[error("install step source {path} must be a relative path inside the archive")]
    UnsafeSource { path: PathBuf },
    #[error("install step destination {path} must be a relative path inside the install root")]
    UnsafeDest { path: PathBuf },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Files placed by a successful install.
#[derive(Debug, Clone, Default)]
pub struct InstallReport {
    pub installed: Vec<PathBuf>,
}

/// Extract the tar+gzip archive at `archive` and copy each step's source
/// file into its destination directory under `target_root`.
///
/// Step paths must be relative with no `..` components, so sources resolve
/// inside the extracted tree and destinations stay under `target_root`.
/// Destination directories are created as needed. `fs::copy` carries the
/// source permission bits over, so executables stay executable. The caller
/// must have verified the archive checksum before calling this.
pub fn install_archive(
    archive: &Path,
    steps: &[InstallStep],
    target_root: &Path,
) -> Result<InstallReport, InstallError> {
    let scratch = tempfile::tempdir().map_err(|source| InstallError::Extract {
        path: archive.to_path_buf(),
        source,
    })?;
    extract::extract_tar_gz(archive, scratch.path())?;

    let mut report = InstallReport::default();
    for step in steps {
        // Steps must stay inside the scratch dir and the install root; `..`,
        // root, or prefix components would resolve elsewhere.
        if !crate::formula::is_confined(&step.source) {
            return Err(InstallError::UnsafeSource {
                path: step.source.clone(),
            });
        }
        if !crate::formula::is_confined(&step.dest) {
            return Err(InstallError::UnsafeDest {
                path: step.dest.clone(),
            });
        }
        let src = scratch.path().join(&step.source);
        if !src.is_file() {
            return Err(InstallError::MissingSource {
                path: step.source.clone(),
            });
        }

        let dest_dir = target_root.join(&step.dest);
        fs::create_dir_all(&dest_dir).map_err(|source| InstallError::Write {
            path: dest_dir.clone(),
            source,
        })?;

        // Install under the source's own file name.
        let file_name = src.file_name().unwrap_or(src.as_os_str());
        let dest = dest_dir.join(file_name);
        fs::copy(&src, &dest).map_err(|source| InstallError::Write {
            path: dest.clone(),
            source,
        })?;
        tracing::info!(src = %step.source.display(), dest = %dest.display(), "installed");
        report.installed.push(dest);
    }
    Ok(report)
}
