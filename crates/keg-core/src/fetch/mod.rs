//! Archive fetch: single-stream HTTP(S) GET via libcurl.
//!
//! Writes the response body sequentially to a `.part` file and renames it
//! into place only after the transfer completes, so a half-written download
//! never sits at the final path.

mod filename;

pub use filename::archive_filename;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Timeouts applied to the GET. Derived from `KegConfig` by the pipeline.
#[derive(Debug, Clone, Copy)]
pub struct FetchOptions {
    pub connect_timeout: Duration,
    pub timeout: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(15),
            timeout: Duration::from_secs(600),
        }
    }
}

/// Failure of the archive fetch: curl-level error, non-2xx status, or a
/// local write failure. Curl and HTTP variants are classified for retry;
/// write failures are not retried.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Curl(#[from] curl::Error),
    #[error("GET {url} returned HTTP {code}")]
    Http { url: String, code: u32 },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Download `url` to `dest` with a single GET. Returns the number of bytes
/// written. Follows redirects. On any failure the partial file is removed
/// and `dest` is left untouched.
pub fn fetch_to_path(url: &str, dest: &Path, opts: &FetchOptions) -> Result<u64, FetchError> {
    let part = part_path(dest);
    let file = File::create(&part).map_err(|source| FetchError::Write {
        path: part.clone(),
        source,
    })?;
    let mut out = BufWriter::new(file);
    let mut written: u64 = 0;
    let mut write_err: Option<std::io::Error> = None;

    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    easy.connect_timeout(opts.connect_timeout)?;
    easy.timeout(opts.timeout)?;
    easy.fail_on_error(false)?;

    let perform_result = {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            if write_err.is_some() {
                return Ok(0); // abort transfer
            }
            match out.write_all(data) {
                Ok(()) => {
                    written += data.len() as u64;
                    Ok(data.len())
                }
                Err(e) => {
                    write_err = Some(e);
                    Ok(0)
                }
            }
        })?;
        transfer.perform()
    };

    // A local write failure makes libcurl report an aborted transfer; surface
    // the underlying io error instead.
    if let Some(source) = write_err {
        discard(&part);
        return Err(FetchError::Write { path: part, source });
    }
    if let Err(e) = perform_result {
        discard(&part);
        return Err(FetchError::Curl(e));
    }
    if let Err(source) = out.flush() {
        discard(&part);
        return Err(FetchError::Write { path: part, source });
    }
    drop(out);

    let code = easy.response_code()?;
    if !(200..300).contains(&code) {
        discard(&part);
        return Err(FetchError::Http {
            url: url.to_string(),
            code,
        });
    }

    fs::rename(&part, dest).map_err(|source| FetchError::Write {
        path: dest.to_path_buf(),
        source,
    })?;
    tracing::debug!(url, bytes = written, dest = %dest.display(), "fetch complete");
    Ok(written)
}

fn part_path(dest: &Path) -> PathBuf {
    let mut name = dest.as_os_str().to_os_string();
    name.push(".part");
    PathBuf::from(name)
}

fn discard(part: &Path) {
    if let Err(e) = fs::remove_file(part) {
        tracing::warn!("failed to remove partial file {}: {}", part.display(), e);
    }
}
