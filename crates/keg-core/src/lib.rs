pub mod config;
pub mod logging;

pub mod checksum;
pub mod fetch;
pub mod formula;
pub mod install;
pub mod pipeline;
pub mod retry;
