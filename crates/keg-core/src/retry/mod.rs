//! Retry and backoff policy for the archive fetch.
//!
//! The formula itself defines no retry; this is host-side policy applied to
//! the fetch step only. Checksum mismatches and install failures are never
//! retried.

mod classify;
mod policy;
mod run;

pub use classify::classify;
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use run::run_with_retry;
