//! Integration tests: full resolve → fetch → verify → install pipeline
//! against a local HTTP fixture server.

mod common {
    pub mod fixture_server;
}

use common::fixture_server::{self, FixtureServerOptions};
use flate2::write::GzEncoder;
use flate2::Compression;
use keg_core::config::{KegConfig, RetryConfig};
use keg_core::formula::{Formula, InstallStep};
use keg_core::pipeline::{self, PipelineError, PipelineOptions};
use sha2::{Digest, Sha256};
use std::io::Write;
use std::path::PathBuf;
use tempfile::tempdir;

/// Build an in-memory tar.gz with the given (path, contents, mode) entries.
fn make_tar_gz(entries: &[(&str, &[u8], u32)]) -> Vec<u8> {
    let enc = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(enc);
    for (path, contents, mode) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(contents.len() as u64);
        header.set_mode(*mode);
        header.set_cksum();
        builder.append_data(&mut header, path, *contents).unwrap();
    }
    let mut out = builder.into_inner().unwrap().finish().unwrap();
    out.flush().unwrap();
    out
}

fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

fn formula_for(base_url: &str, sha256: &str) -> Formula {
    Formula {
        name: "guitar-tuner".to_string(),
        version: "0.1.0".to_string(),
        url: format!("{base_url}guitar-tuner_{{version}}.tar.gz"),
        sha256: sha256.to_string(),
        install: vec![InstallStep {
            source: PathBuf::from("guitar-tuner"),
            dest: PathBuf::from("bin"),
        }],
    }
}

fn test_config(cache_dir: &std::path::Path) -> KegConfig {
    KegConfig {
        cache_dir: Some(cache_dir.to_path_buf()),
        ..KegConfig::default()
    }
}

#[test]
fn pipeline_installs_binary_into_target_root() {
    let body = make_tar_gz(&[("guitar-tuner", b"#!/bin/sh\necho 440\n", 0o755)]);
    let digest = sha256_hex(&body);
    let url = fixture_server::start(body);

    let tmp = tempdir().unwrap();
    let cache = tmp.path().join("cache");
    std::fs::create_dir_all(&cache).unwrap();
    let root = tmp.path().join("root");

    let formula = formula_for(&url, &digest);
    let cfg = test_config(&cache);
    let opts = PipelineOptions {
        target_root: root.clone(),
        keep_archive: false,
    };

    let outcome = pipeline::run(&formula, &opts, &cfg).expect("pipeline run");

    assert_eq!(outcome.url, format!("{url}guitar-tuner_0.1.0.tar.gz"));
    let installed = root.join("bin/guitar-tuner");
    assert_eq!(outcome.report.installed, vec![installed.clone()]);
    assert!(installed.is_file());
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(&installed).unwrap().permissions().mode();
        assert_ne!(mode & 0o111, 0, "installed binary must be executable");
    }
    // keep_archive is false, so the cache entry is gone.
    assert!(!outcome.archive.exists());
}

#[test]
fn checksum_mismatch_aborts_before_install() {
    let body = make_tar_gz(&[("guitar-tuner", b"payload", 0o755)]);
    let mut digest = sha256_hex(&body);
    // Flip one character; the formula now lies about the archive.
    let flipped = if digest.starts_with('0') { "1" } else { "0" };
    digest.replace_range(0..1, flipped);
    let url = fixture_server::start(body);

    let tmp = tempdir().unwrap();
    let cache = tmp.path().join("cache");
    std::fs::create_dir_all(&cache).unwrap();
    let root = tmp.path().join("root");

    let formula = formula_for(&url, &digest);
    let cfg = test_config(&cache);
    let opts = PipelineOptions {
        target_root: root.clone(),
        keep_archive: true,
    };

    let err = pipeline::run(&formula, &opts, &cfg).unwrap_err();
    assert!(matches!(err, PipelineError::ChecksumMismatch { .. }));

    // Install never ran: nothing under the target root.
    assert!(!root.exists(), "no files may appear in the target root");
    // The mismatching archive was deleted from the cache.
    assert_eq!(std::fs::read_dir(&cache).unwrap().count(), 0);
}

#[test]
fn http_404_surfaces_as_fetch_error() {
    let url = fixture_server::start_with_options(
        Vec::new(),
        FixtureServerOptions {
            status: 404,
            fail_first: 0,
        },
    );

    let tmp = tempdir().unwrap();
    let cache = tmp.path().join("cache");
    std::fs::create_dir_all(&cache).unwrap();

    let formula = formula_for(&url, &"0".repeat(64));
    let cfg = test_config(&cache);

    let err = pipeline::fetch_verified(&formula, &cache, &cfg).unwrap_err();
    match err {
        PipelineError::Fetch(e) => assert!(e.to_string().contains("404"), "got: {e}"),
        other => panic!("expected fetch error, got {other:?}"),
    }
    // No partial files left behind.
    assert_eq!(std::fs::read_dir(&cache).unwrap().count(), 0);
}

#[test]
fn fetch_retries_through_transient_503() {
    let body = make_tar_gz(&[("guitar-tuner", b"payload", 0o755)]);
    let digest = sha256_hex(&body);
    let url = fixture_server::start_with_options(
        body,
        FixtureServerOptions {
            status: 200,
            fail_first: 2,
        },
    );

    let tmp = tempdir().unwrap();
    let cache = tmp.path().join("cache");
    std::fs::create_dir_all(&cache).unwrap();

    let formula = formula_for(&url, &digest);
    let mut cfg = test_config(&cache);
    cfg.retry = Some(RetryConfig {
        max_attempts: 5,
        base_delay_secs: 0.01,
        max_delay_secs: 1,
    });

    let archive = pipeline::fetch_verified(&formula, &cache, &cfg).expect("fetch after retries");
    assert!(archive.is_file());
}

#[test]
fn fetch_verified_leaves_verified_archive_in_cache() {
    let body = make_tar_gz(&[("guitar-tuner", b"payload", 0o755)]);
    let digest = sha256_hex(&body);
    let url = fixture_server::start(body.clone());

    let tmp = tempdir().unwrap();
    let cache = tmp.path().join("cache");
    std::fs::create_dir_all(&cache).unwrap();

    let formula = formula_for(&url, &digest);
    let cfg = test_config(&cache);

    let archive = pipeline::fetch_verified(&formula, &cache, &cfg).unwrap();
    assert_eq!(
        archive.file_name().unwrap().to_str().unwrap(),
        "guitar-tuner_0.1.0.tar.gz"
    );
    assert_eq!(std::fs::read(&archive).unwrap(), body);
}
