//! `keg install <formula>` – run the full pipeline for one formula.

use anyhow::Result;
use keg_core::config::KegConfig;
use keg_core::formula::Formula;
use keg_core::pipeline::{self, PipelineOptions};
use std::path::Path;

pub fn run_install(
    formula_path: &Path,
    root: Option<&Path>,
    keep_archive: bool,
    cfg: &KegConfig,
) -> Result<()> {
    let formula = Formula::load(formula_path)?;
    let target_root = match root {
        Some(r) => r.to_path_buf(),
        None => std::env::current_dir()?,
    };

    let opts = PipelineOptions {
        target_root: target_root.clone(),
        keep_archive,
    };
    let outcome = pipeline::run(&formula, &opts, cfg)?;

    println!(
        "Installed {} {} into {}",
        formula.name,
        formula.version,
        target_root.display()
    );
    for path in &outcome.report.installed {
        println!("  {}", path.display());
    }
    Ok(())
}
