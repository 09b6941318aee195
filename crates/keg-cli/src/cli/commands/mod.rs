//! CLI command handlers, one file per command.

mod checksum;
mod fetch;
mod install;
mod resolve;
mod show;

pub use checksum::run_checksum;
pub use fetch::run_fetch;
pub use install::run_install;
pub use resolve::run_resolve;
pub use show::run_show;
