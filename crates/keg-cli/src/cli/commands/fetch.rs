//! `keg fetch <formula>` – fetch and verify the archive without installing.

use anyhow::Result;
use keg_core::config::{self, KegConfig};
use keg_core::formula::Formula;
use keg_core::pipeline;
use std::path::Path;

pub fn run_fetch(formula_path: &Path, out: Option<&Path>, cfg: &KegConfig) -> Result<()> {
    let formula = Formula::load(formula_path)?;
    let out_dir = match out {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            dir.to_path_buf()
        }
        None => config::cache_dir(cfg)?,
    };

    let archive = pipeline::fetch_verified(&formula, &out_dir, cfg)?;
    println!("{}", archive.display());
    Ok(())
}
