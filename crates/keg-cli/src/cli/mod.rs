//! CLI for the keg binary-package installer.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use keg_core::config;
use std::path::PathBuf;

use commands::{run_checksum, run_fetch, run_install, run_resolve, run_show};

/// Top-level CLI for keg.
#[derive(Debug, Parser)]
#[command(name = "keg")]
#[command(about = "keg: fetch, verify, and install declarative binary packages", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Install a package from a formula file: fetch, verify, install.
    Install {
        /// Path to the formula file (.toml or .json).
        formula: PathBuf,

        /// Install root; step destinations are created beneath it.
        /// Defaults to the current directory.
        #[arg(long, value_name = "DIR")]
        root: Option<PathBuf>,

        /// Keep the fetched archive in the cache after a successful install.
        #[arg(long)]
        keep_archive: bool,
    },

    /// Fetch and verify the archive without installing.
    Fetch {
        /// Path to the formula file.
        formula: PathBuf,

        /// Directory to place the verified archive in (default: the cache dir).
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,
    },

    /// Print the fully substituted download URL of a formula.
    Resolve {
        /// Path to the formula file.
        formula: PathBuf,
    },

    /// Print the parsed formula.
    Show {
        /// Path to the formula file.
        formula: PathBuf,
    },

    /// Compute SHA-256 of a file (e.g. when authoring a formula).
    Checksum {
        /// Path to the file.
        path: PathBuf,
    },
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        cli.command.dispatch()
    }

    fn dispatch(self) -> Result<()> {
        // Only the commands that hit the network need the config; the
        // read-only ones must not create ~/.config/keg as a side effect.
        match self {
            CliCommand::Install {
                formula,
                root,
                keep_archive,
            } => {
                let cfg = config::load_or_init()?;
                tracing::debug!("loaded config: {:?}", cfg);
                run_install(&formula, root.as_deref(), keep_archive, &cfg)?;
            }
            CliCommand::Fetch { formula, out } => {
                let cfg = config::load_or_init()?;
                tracing::debug!("loaded config: {:?}", cfg);
                run_fetch(&formula, out.as_deref(), &cfg)?;
            }
            CliCommand::Resolve { formula } => run_resolve(&formula)?,
            CliCommand::Show { formula } => run_show(&formula)?,
            CliCommand::Checksum { path } => run_checksum(&path)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
