//! URL resolution: substitute the version into the formula's URL template.

use super::Formula;

/// Placeholder replaced by the formula version in URL templates.
pub const VERSION_TOKEN: &str = "{version}";

/// Produce the concrete download URL for a formula.
///
/// Pure string substitution: every occurrence of `{version}` is replaced by
/// the formula's version. A template without the token (already concrete)
/// passes through unchanged. No error conditions.
pub fn resolve_url(formula: &Formula) -> String {
    formula.url.replace(VERSION_TOKEN, &formula.version)
}
