//! Destructive-operation analyzer.
//!
//! Flags irreversible operations on the filesystem, disk, version control,
//! and databases: `rm -rf`, `truncate`, `mkfs`, `shred`, `dd` onto a device,
//! dangerous `git` invocations, and destructive SQL statements.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use super::truncate_chars;
use crate::analyzers::Analyzer;
use crate::types::{AnalyzerResult, Finding, RiskLevel, Segment};

static RE_SQL_DROP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bdrop\s+(database|table|schema|index)\b").unwrap());

static RE_SQL_TRUNCATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\btruncate\s+table\b").unwrap());

static RE_SQL_DELETE_OR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bdelete\s+from\b.*\bwhere\b.*=.*\bor\b").unwrap());

/// Splits combined short flags (`-rf`, `-fr`) and long forms into a
/// `(force, recursive)` pair. Only tokens starting with `-` are examined —
/// a filename containing the letter `f` never counts as `-f`.
fn rm_flags(args: &[String]) -> (bool, bool) {
    let mut force = false;
    let mut recursive = false;
    for a in args {
        if a == "--force" {
            force = true;
            continue;
        }
        if a == "--recursive" {
            recursive = true;
            continue;
        }
        if a.starts_with("--") {
            continue;
        }
        if let Some(flags) = a.strip_prefix('-') {
            if flags.is_empty() {
                continue;
            }
            for c in flags.chars() {
                match c {
                    'f' | 'F' => force = true,
                    'r' | 'R' => recursive = true,
                    _ => {}
                }
            }
        }
    }
    (force, recursive)
}

fn rm_target_severity(target: &str) -> (RiskLevel, &'static str) {
    static HOME: LazyLock<Option<String>> =
        LazyLock::new(|| dirs::home_dir().map(|p| p.to_string_lossy().into_owned()));

    if target == "/" || target == "/*" {
        return (RiskLevel::Critical, "rm -rf /");
    }
    let is_home = target == "$HOME"
        || target == "~"
        || target.starts_with("~/")
        || HOME.as_deref() == Some(target);
    if is_home {
        return (RiskLevel::Critical, "rm -rf ~");
    }
    if target == "*" {
        return (RiskLevel::High, "rm -rf *");
    }
    (RiskLevel::Medium, "rm -rf <target>")
}

fn analyze_rm(args: &[String], findings: &mut Vec<Finding>) {
    let (force, recursive) = rm_flags(args);
    if force && recursive {
        let target = args.iter().find(|a| !a.starts_with('-'));
        match target {
            Some(t) => {
                let (severity, label) = rm_target_severity(t);
                findings.push(Finding {
                    category: "destructive",
                    severity,
                    description: format!("{label}: deletes {t} with force and recursion"),
                    analyzer: Some("destructive"),
                    source: None,
                });
            }
            None => findings.push(Finding {
                category: "destructive",
                severity: RiskLevel::Medium,
                description: "rm -rf with no target".to_string(),
                analyzer: Some("destructive"),
                source: None,
            }),
        }
    } else if force || recursive {
        findings.push(Finding {
            category: "destructive",
            severity: RiskLevel::Low,
            description: "rm with only one of force/recursive set".to_string(),
            analyzer: Some("destructive"),
            source: None,
        });
    }
}

fn analyze_git(args: &[String], findings: &mut Vec<Finding>) {
    if args.is_empty() {
        return;
    }
    let sub = args[0].as_str();
    let rest = &args[1..];

    let is_force_push = sub == "push"
        && rest.iter().any(|a| {
            a == "-f" || a == "--force" || a == "--force-with-lease"
        });
    let is_reset_hard = sub == "reset" && rest.iter().any(|a| a == "--hard");
    let is_clean_force = sub == "clean" && rest.iter().any(|a| a == "-f");

    if is_force_push {
        let targets_main_or_master = rest.iter().any(|a| {
            a == "main" || a == "master" || a.ends_with("/main") || a.ends_with("/master")
        });
        let severity = if targets_main_or_master {
            RiskLevel::Critical
        } else {
            RiskLevel::High
        };
        findings.push(Finding {
            category: "destructive",
            severity,
            description: "git push --force rewrites remote history".to_string(),
            analyzer: Some("destructive"),
            source: None,
        });
    } else if is_reset_hard {
        findings.push(Finding {
            category: "destructive",
            severity: RiskLevel::High,
            description: "git reset --hard discards uncommitted changes".to_string(),
            analyzer: Some("destructive"),
            source: None,
        });
    } else if is_clean_force {
        findings.push(Finding {
            category: "destructive",
            severity: RiskLevel::High,
            description: "git clean -f deletes untracked files".to_string(),
            analyzer: Some("destructive"),
            source: None,
        });
    }
}

fn analyze_sql(raw_segment: &str, findings: &mut Vec<Finding>) {
    let matched = if RE_SQL_DROP.is_match(raw_segment) {
        true
    } else if RE_SQL_TRUNCATE.is_match(raw_segment) {
        true
    } else {
        RE_SQL_DELETE_OR.is_match(raw_segment)
    };
    if matched {
        findings.push(Finding {
            category: "destructive",
            severity: RiskLevel::Critical,
            description: format!("destructive SQL statement: {}", truncate_chars(raw_segment, 80)),
            analyzer: Some("destructive"),
            source: None,
        });
    }
}

fn analyze_verb(verb: &str, args: &[String], findings: &mut Vec<Finding>) {
    match verb {
        "rm" => analyze_rm(args, findings),
        "truncate" => findings.push(Finding {
            category: "destructive",
            severity: RiskLevel::Medium,
            description: "truncate discards file content".to_string(),
            analyzer: Some("destructive"),
            source: None,
        }),
        "mkfs" => findings.push(Finding {
            category: "destructive",
            severity: RiskLevel::Critical,
            description: "mkfs formats a filesystem, destroying existing data".to_string(),
            analyzer: Some("destructive"),
            source: None,
        }),
        "shred" => findings.push(Finding {
            category: "destructive",
            severity: RiskLevel::High,
            description: "shred irreversibly overwrites file content".to_string(),
            analyzer: Some("destructive"),
            source: None,
        }),
        "dd" => {
            let writes_device = args.iter().any(|a| a.starts_with("of=/dev/"));
            findings.push(Finding {
                category: "destructive",
                severity: if writes_device { RiskLevel::Critical } else { RiskLevel::High },
                description: if writes_device {
                    "dd writes directly to a device node".to_string()
                } else {
                    "dd can overwrite arbitrary files byte-for-byte".to_string()
                },
                analyzer: Some("destructive"),
                source: None,
            });
        }
        "git" => analyze_git(args, findings),
        _ => {}
    }
}

pub struct DestructiveAnalyzer;

impl Analyzer for DestructiveAnalyzer {
    fn name(&self) -> &'static str {
        "destructive"
    }

    fn analyze(&self, segments: &[Segment], _cwd: &Path) -> AnalyzerResult {
        let mut findings = Vec::new();
        for segment in segments {
            analyze_verb(&segment.verb, &segment.args, &mut findings);
            analyze_sql(&segment.raw_segment, &mut findings);
        }
        AnalyzerResult::new(findings)
    }
}
