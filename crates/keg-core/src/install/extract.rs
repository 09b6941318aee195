//! tar+gzip extraction into the install scratch directory.

use super::InstallError;
use flate2::read::GzDecoder;
use std::fs::File;
use std::path::Path;
use tar::Archive;

/// Unpack the tar+gzip archive at `archive` into `dest`.
///
/// `tar::Archive::unpack` rejects entries that would escape `dest`, so a
/// hostile archive cannot write outside the scratch directory.
pub(super) fn extract_tar_gz(archive: &Path, dest: &Path) -> Result<(), InstallError> {
    let file = File::open(archive).map_err(|source| InstallError::Archive {
        path: archive.to_path_buf(),
        source,
    })?;
    let mut tar = Archive::new(GzDecoder::new(file));
    tar.set_preserve_permissions(true);
    tar.unpack(dest).map_err(|source| InstallError::Extract {
        path: archive.to_path_buf(),
        source,
    })?;
    Ok(())
}
