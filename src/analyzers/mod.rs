//! Pluggable risk analyzers.
//!
//! Every analyzer implements the [`Analyzer`] trait and inspects the same
//! parsed [`Segment`](crate::types::Segment) list, independently of the
//! others. [`all_analyzers`] constructs the fixed set with its configuration
//! (safe hosts, sensitive patterns, oracle timeout) captured at construction
//! time — there is no runtime registration.

pub mod code_injection;
pub mod destructive;
pub mod network;
pub mod package_vuln;
pub mod permissions;
pub mod sensitive_path;

use std::path::Path;
use std::sync::Arc;

use crate::config::Config;
use crate::oracle::Oracle;
use crate::types::{AnalyzerResult, Segment};

/// The closed set of finding categories. See `spec.md` §3.
pub const CATEGORIES: &[&str] = &[
    "destructive",
    "permissions",
    "sensitive-path",
    "network",
    "code-injection",
    "package-vulnerability",
];

/// A pluggable risk analyzer.
///
/// Implementers must be total: an unrecognized arg shape, malformed URL, or
/// unparseable mode must produce no finding, never a panic.
pub trait Analyzer: Send + Sync {
    /// Unique identifier, also used as [`crate::types::Finding::analyzer`].
    fn name(&self) -> &'static str;

    /// Inspects `segments` and returns whatever findings apply.
    ///
    /// `cwd` is threaded through uniformly even though only
    /// [`sensitive_path`] currently uses it.
    fn analyze(&self, segments: &[Segment], cwd: &Path) -> AnalyzerResult;
}

/// Constructs the fixed analyzer set, wiring each one to `config` and the
/// shared [`Oracle`].
pub fn all_analyzers(config: &Config, oracle: &Arc<Oracle>) -> Vec<Box<dyn Analyzer>> {
    vec![
        Box::new(destructive::DestructiveAnalyzer),
        Box::new(permissions::PermissionsAnalyzer),
        Box::new(sensitive_path::SensitivePathAnalyzer::new(config)),
        Box::new(network::NetworkAnalyzer::new(config)),
        Box::new(code_injection::CodeInjectionAnalyzer),
        Box::new(package_vuln::PackageVulnAnalyzer::new(config, Arc::clone(oracle))),
    ]
}

/// Truncates `s` to at most `max_chars` characters, appending `…` when cut.
///
/// Always cuts at a char boundary — a raw byte index can land mid-codepoint
/// on multi-byte UTF-8 and panic.
pub(crate) fn truncate_chars(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let cut = s
        .char_indices()
        .nth(max_chars)
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    format!("{}…", &s[..cut])
}

/// Returns the non-flag (doesn't start with `-`) tokens of `args`, in order.
pub(crate) fn non_flag_args(args: &[String]) -> impl Iterator<Item = &String> {
    args.iter().filter(|a| !a.starts_with('-'))
}
