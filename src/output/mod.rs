//! Output formatting for a [`RiskAssessment`].
//!
//! | Format | Module | Use case |
//! |--------|--------|----------|
//! | [`Pretty`](OutputFormat::Pretty) | [`pretty`] | Terminal / human review |
//! | [`Json`](OutputFormat::Json)     | [`json`]   | Automation / scripting  |

pub mod json;
pub mod pretty;

use crate::types::RiskAssessment;

/// Supported output formats for a [`RiskAssessment`].
#[derive(Debug, Clone, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored text.
    Pretty,
    /// Machine-readable JSON, matching `spec.md` §6's stable shape.
    Json,
}

/// Formats a [`RiskAssessment`] in the requested [`OutputFormat`].
pub fn format_assessment(report: &RiskAssessment, format: &OutputFormat) -> String {
    match format {
        OutputFormat::Pretty => pretty::format(report),
        OutputFormat::Json => json::format(report),
    }
}
