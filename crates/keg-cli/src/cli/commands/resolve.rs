//! `keg resolve <formula>` – print the fully substituted download URL.

use anyhow::Result;
use keg_core::formula::{resolve_url, Formula};
use std::path::Path;

pub fn run_resolve(formula_path: &Path) -> Result<()> {
    let formula = Formula::load(formula_path)?;
    println!("{}", resolve_url(&formula));
    Ok(())
}
