//! JSON output formatter.
//!
//! `RiskAssessment` already derives `Serialize` in the stable shape `spec.md`
//! §6 specifies, so this is a thin pretty-printing wrapper.

use crate::types::RiskAssessment;

/// Formats a [`RiskAssessment`] as pretty-printed JSON.
///
/// # Panics
///
/// Panics if the report cannot be serialized (should not happen with valid data).
pub fn format(report: &RiskAssessment) -> String {
    serde_json::to_string_pretty(report).expect("JSON serialization failed")
}
