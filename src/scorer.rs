//! Risk scorer: turns a flat list of [`Finding`]s into one [`RiskAssessment`].
//!
//! Severity isn't simply the maximum individual finding severity — certain
//! combinations of category and count amplify the result. See `spec.md` §4.9.

use std::collections::HashSet;

use crate::types::{Action, ActionPolicy, Finding, RiskLevel};

/// Category pairs that amplify a high+medium mix straight to critical.
const AMPLIFYING_PAIRS: &[(&str, &str)] = &[
    ("permissions", "network"),
    ("permissions", "sensitive-path"),
    ("network", "sensitive-path"),
];

fn count(findings: &[Finding], level: RiskLevel) -> usize {
    findings.iter().filter(|f| f.severity == level).count()
}

fn categories_at_or_above(findings: &[Finding], level: RiskLevel) -> HashSet<&'static str> {
    findings
        .iter()
        .filter(|f| f.severity >= level)
        .map(|f| f.category)
        .collect()
}

fn has_amplifying_pair(categories: &HashSet<&'static str>) -> bool {
    AMPLIFYING_PAIRS
        .iter()
        .any(|(a, b)| categories.contains(a) && categories.contains(b))
}

/// Determines the overall [`RiskLevel`] for a set of findings, per the
/// amplification rules in `spec.md` §4.9.
fn determine_risk_level(findings: &[Finding]) -> RiskLevel {
    if findings.is_empty() {
        return RiskLevel::None;
    }

    let critical = count(findings, RiskLevel::Critical);
    let high = count(findings, RiskLevel::High);
    let medium = count(findings, RiskLevel::Medium);

    if critical >= 1 {
        return RiskLevel::Critical;
    }
    if high >= 2 {
        return RiskLevel::Critical;
    }
    if high >= 1 && medium >= 1 {
        let categories = categories_at_or_above(findings, RiskLevel::Medium);
        if has_amplifying_pair(&categories) {
            return RiskLevel::Critical;
        }
    }
    if medium >= 3 {
        return RiskLevel::High;
    }

    findings.iter().map(|f| f.severity).max().unwrap_or(RiskLevel::None)
}

fn summary_for(level: RiskLevel, findings: &[Finding]) -> String {
    if findings.is_empty() {
        return level.label().to_string();
    }
    if findings.len() == 1 {
        return format!("{}: {}", level.label(), findings[0].description);
    }

    let mut ranked: Vec<&Finding> = findings.iter().collect();
    ranked.sort_by(|a, b| b.severity.cmp(&a.severity));

    let top: Vec<String> = ranked.iter().take(3).map(|f| format!("- {}", f.description)).collect();
    format!("{} — {} issues found:\n{}", level.label(), findings.len(), top.join("\n"))
}

fn recommendation_for(level: RiskLevel, findings: &[Finding]) -> String {
    let categories: HashSet<&'static str> = findings.iter().map(|f| f.category).collect();

    match level {
        RiskLevel::Critical => {
            if categories.contains("destructive") {
                "This command can cause irreversible data loss. Do not run it without manual review.".to_string()
            } else if categories.contains("network") && categories.contains("sensitive-path") {
                "This command may exfiltrate sensitive data over the network. Block it pending review.".to_string()
            } else if categories.contains("package-vulnerability") {
                "This command installs a package with known critical vulnerabilities. Review before proceeding.".to_string()
            } else {
                "This command poses a critical risk. Do not run it without manual review.".to_string()
            }
        }
        RiskLevel::High => {
            if categories.contains("package-vulnerability") {
                "This command installs a package with known vulnerabilities. Review the advisory before proceeding.".to_string()
            } else if categories.contains("permissions") {
                "This command elevates privileges or changes sensitive permissions. Confirm intent before proceeding.".to_string()
            } else if categories.contains("network") {
                "This command communicates over the network in a way that warrants review.".to_string()
            } else {
                "This command carries a high risk. Review it carefully before proceeding.".to_string()
            }
        }
        RiskLevel::Medium => "This command has some risk. Review the details before proceeding.".to_string(),
        _ => "No significant risk detected.".to_string(),
    }
}

/// Scores a finished set of findings into a final assessment.
///
/// `partial` propagates straight through: an oracle timeout degrades the
/// assessment's confidence even when the findings it did gather are all
/// low-severity.
pub fn score(findings: Vec<Finding>, partial: bool, policy: &ActionPolicy) -> crate::types::RiskAssessment {
    let risk_level = determine_risk_level(&findings);
    let action = policy.get(risk_level);
    let summary = summary_for(risk_level, &findings);
    let recommendation = recommendation_for(risk_level, &findings);

    crate::types::RiskAssessment {
        risk_level,
        action,
        summary,
        details: findings,
        recommendation,
        partial,
    }
}

/// Shorthand for the empty/no-findings case, used by the allowlist bypass.
pub fn none_assessment(summary: impl Into<String>) -> crate::types::RiskAssessment {
    crate::types::RiskAssessment {
        risk_level: RiskLevel::None,
        action: Action::Run,
        summary: summary.into(),
        details: Vec::new(),
        recommendation: "No significant risk detected.".to_string(),
        partial: false,
    }
}
