//! `keg show <formula>` – print the parsed formula.

use anyhow::Result;
use keg_core::formula::{resolve_url, Formula};
use std::path::Path;

pub fn run_show(formula_path: &Path) -> Result<()> {
    let formula = Formula::load(formula_path)?;
    println!("name:    {}", formula.name);
    println!("version: {}", formula.version);
    println!("url:     {}", resolve_url(&formula));
    println!("sha256:  {}", formula.sha256);
    println!("install:");
    for step in &formula.install {
        println!("  {} -> {}", step.source.display(), step.dest.display());
    }
    Ok(())
}
