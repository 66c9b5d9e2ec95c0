//! Permissions analyzer.
//!
//! Flags privilege escalation (`sudo`) and dangerous mode/ownership changes
//! (`chmod`, `chown`), with extra weight when the target is a sensitive
//! system path.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::analyzers::{non_flag_args, Analyzer};
use crate::types::{AnalyzerResult, Finding, RiskLevel, Segment};

// Package managers are included alongside the destructive/ownership verbs:
// `sudo npm install` etc. run arbitrary postinstall scripts as root, which is
// as dangerous as the other verbs on this list.
const HIGH_RISK_SUDO_VERBS: &[&str] =
    &["rm", "chmod", "chown", "mkfs", "dd", "kill", "shutdown", "reboot", "npm", "pip", "pip3", "cargo"];

const SENSITIVE_PREFIXES: &[&str] = &[
    "/etc/", "/usr/bin/", "/usr/local/bin/", "/usr/sbin/", "/var/log/", "/boot/", "/sys/", "/proc/",
];

const DANGEROUS_MODES: &[&str] = &["777", "666", "o+w", "a+w", "o+rwx", "a+rwx"];

static RE_OCTAL_MODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-7]{3,4}$").unwrap());
static RE_SYMBOLIC_MODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[ugoa][+-][rwxst]+$").unwrap());

fn is_sensitive_target(token: &str) -> bool {
    SENSITIVE_PREFIXES.iter().any(|p| token.starts_with(p))
}

fn looks_like_mode(token: &str) -> bool {
    RE_OCTAL_MODE.is_match(token) || RE_SYMBOLIC_MODE.is_match(token)
}

fn analyze_chmod(args: &[String], findings: &mut Vec<Finding>) {
    let mode = args.iter().find(|a| looks_like_mode(a));
    let dangerous_mode = mode.is_some_and(|m| DANGEROUS_MODES.contains(&m.as_str()));
    let sensitive_target = non_flag_args(args).any(|a| is_sensitive_target(a));

    let severity = match (dangerous_mode, sensitive_target) {
        (true, true) => Some(RiskLevel::Critical),
        (true, false) => Some(RiskLevel::High),
        (false, true) => Some(RiskLevel::Medium),
        (false, false) => None,
    };

    if let Some(severity) = severity {
        findings.push(Finding {
            category: "permissions",
            severity,
            description: format!(
                "chmod {}changes permissions{}",
                mode.map(|m| format!("{m} ")).unwrap_or_default(),
                if sensitive_target { " on a sensitive system path" } else { "" },
            ),
            analyzer: Some("permissions"),
            source: None,
        });
    }
}

fn analyze_chown(args: &[String], findings: &mut Vec<Finding>) {
    let mut targets = non_flag_args(args);
    targets.next(); // the owner spec (user:group) is never itself a target path
    let sensitive_target = targets.any(|a| is_sensitive_target(a));

    findings.push(Finding {
        category: "permissions",
        severity: if sensitive_target { RiskLevel::High } else { RiskLevel::Medium },
        description: if sensitive_target {
            "chown changes ownership of a sensitive system path".to_string()
        } else {
            "chown changes file ownership".to_string()
        },
        analyzer: Some("permissions"),
        source: None,
    });
}

pub struct PermissionsAnalyzer;

impl Analyzer for PermissionsAnalyzer {
    fn name(&self) -> &'static str {
        "permissions"
    }

    fn analyze(&self, segments: &[Segment], _cwd: &Path) -> AnalyzerResult {
        let mut findings = Vec::new();

        for segment in segments {
            if segment.verb == "sudo" {
                let inner = segment.args.first().map(String::as_str).unwrap_or("");
                let inner_args = if segment.args.is_empty() { &[] } else { &segment.args[1..] };

                let severity = if HIGH_RISK_SUDO_VERBS.contains(&inner) {
                    RiskLevel::High
                } else {
                    RiskLevel::Low
                };
                findings.push(Finding {
                    category: "permissions",
                    severity,
                    description: format!("sudo elevates privileges to run `{inner}`"),
                    analyzer: Some("permissions"),
                    source: None,
                });

                match inner {
                    "chmod" => analyze_chmod(inner_args, &mut findings),
                    "chown" => analyze_chown(inner_args, &mut findings),
                    _ => {}
                }
                continue;
            }

            match segment.verb.as_str() {
                "chmod" => analyze_chmod(&segment.args, &mut findings),
                "chown" => analyze_chown(&segment.args, &mut findings),
                _ => {}
            }
        }

        AnalyzerResult::new(findings)
    }
}
