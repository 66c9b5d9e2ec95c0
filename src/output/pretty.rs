//! Human-readable colored text formatter.

use colored::Colorize;

use crate::types::{RiskAssessment, RiskLevel};

fn colorize_level(level: RiskLevel, text: &str) -> String {
    match level {
        RiskLevel::None | RiskLevel::Low => text.green().bold().to_string(),
        RiskLevel::Medium => text.yellow().bold().to_string(),
        RiskLevel::High | RiskLevel::Critical => text.red().bold().to_string(),
    }
}

/// Formats a [`RiskAssessment`] as human-readable, ANSI-colored text.
pub fn format(report: &RiskAssessment) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "\n{}\n",
        colorize_level(report.risk_level, &format!("  {}  ", report.risk_level.label()))
    ));
    out.push_str(&format!("  Action: {}\n\n", report.action.to_string().bold()));
    out.push_str(&format!("{}\n\n", report.summary));

    if !report.details.is_empty() {
        out.push_str(&format!("{}\n", "Findings".bold().underline()));
        for finding in &report.details {
            let severity_str = colorize_level(finding.severity, &format!("{:>8}", finding.severity.to_string()));
            out.push_str(&format!(
                "  [{severity_str}] {category:<22} {description}\n",
                category = finding.category.dimmed(),
                description = finding.description,
            ));
        }
        out.push('\n');
    }

    if !report.recommendation.is_empty() {
        out.push_str(&format!("{}\n", report.recommendation));
    }

    if report.partial {
        out.push_str(&format!("\n{}\n", "Note: this assessment is partial — an oracle lookup degraded.".dimmed()));
    }

    out
}
