//! Sensitive-path analyzer.
//!
//! Flags reads and writes that touch credential files, agent configuration,
//! system-auth databases, or other sensitive paths, via a small glob matcher
//! (`**`, `*`, `?`) compiled once at construction time.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::analyzers::{non_flag_args, Analyzer};
use crate::config::Config;
use crate::types::{AnalyzerResult, Finding, RiskLevel, Segment};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tier {
    Credential,
    Agent,
    SystemAuth,
    Other,
}

const READ_VERBS: &[&str] = &["cat", "head", "tail", "less", "more", "bat", "grep", "rg", "awk", "sed", "wc", "sort", "uniq"];
const WRITE_VERBS: &[&str] = &["cp", "mv", "tee", "dd", "install", "rsync", "sed", "awk", "nano", "vim", "vi", "emacs"];

const DEFAULT_PATTERNS: &[(&str, Tier)] = &[
    ("~/.ssh/*", Tier::Credential),
    ("~/.aws/*", Tier::Credential),
    ("~/.config/gcloud/*", Tier::Credential),
    ("*id_rsa*", Tier::Credential),
    ("*.pem", Tier::Credential),
    ("*.key", Tier::Credential),
    ("~/.claude/*", Tier::Agent),
    (".cursorrules", Tier::Agent),
    ("CLAUDE.md", Tier::Agent),
    ("/etc/shadow", Tier::SystemAuth),
    ("/etc/sudoers", Tier::SystemAuth),
    ("/etc/passwd", Tier::Other),
    (".env", Tier::Other),
    ("/usr/bin/*", Tier::Other),
    ("/usr/local/bin/*", Tier::Other),
];

static HOME: LazyLock<Option<String>> =
    LazyLock::new(|| dirs::home_dir().map(|p| p.to_string_lossy().into_owned()));

fn expand_tilde(pattern: &str) -> String {
    match HOME.as_deref() {
        Some(home) => {
            if pattern == "~" {
                home.to_string()
            } else if let Some(rest) = pattern.strip_prefix("~/") {
                format!("{home}/{rest}")
            } else {
                pattern.to_string()
            }
        }
        None => pattern.to_string(),
    }
}

/// Compiles a glob (`**`→`.*`, `*`→`[^/]*`, `?`→`.`) into an anchored regex,
/// escaping every other character first.
fn compile_glob(pattern: &str) -> Regex {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::from("^");
    let mut i = 0usize;
    while i < chars.len() {
        match chars[i] {
            '*' if chars.get(i + 1) == Some(&'*') => {
                out.push_str(".*");
                i += 2;
            }
            '*' => {
                out.push_str("[^/]*");
                i += 1;
            }
            '?' => {
                out.push('.');
                i += 1;
            }
            c => {
                out.push_str(&regex::escape(&c.to_string()));
                i += 1;
            }
        }
    }
    out.push('$');
    Regex::new(&out).unwrap_or_else(|_| Regex::new("$^").unwrap())
}

struct CompiledPattern {
    regex: Regex,
    tier: Tier,
}

pub struct SensitivePathAnalyzer {
    patterns: Vec<CompiledPattern>,
}

impl SensitivePathAnalyzer {
    pub fn new(config: &Config) -> Self {
        let mut patterns: Vec<CompiledPattern> = DEFAULT_PATTERNS
            .iter()
            .map(|(pattern, tier)| CompiledPattern {
                regex: compile_glob(&expand_tilde(pattern)),
                tier: *tier,
            })
            .collect();
        for extra in &config.sensitive_patterns {
            patterns.push(CompiledPattern {
                regex: compile_glob(&expand_tilde(extra)),
                tier: Tier::Other,
            });
        }
        SensitivePathAnalyzer { patterns }
    }

    fn matching_tier(&self, token: &str, cwd: &Path) -> Option<Tier> {
        let raw = token;
        let full = if Path::new(token).is_absolute() {
            token.to_string()
        } else {
            cwd.join(token).to_string_lossy().into_owned()
        };
        let basename = Path::new(token)
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default();

        self.patterns
            .iter()
            .find(|p| p.regex.is_match(&full) || p.regex.is_match(raw) || p.regex.is_match(&basename))
            .map(|p| p.tier)
    }
}

fn severity_for(access_is_write: bool, tier: Tier) -> RiskLevel {
    match (access_is_write, tier) {
        (true, Tier::Credential | Tier::SystemAuth) => RiskLevel::Critical,
        (true, Tier::Agent) => RiskLevel::High,
        (true, Tier::Other) => RiskLevel::Medium,
        (false, Tier::SystemAuth) => RiskLevel::High,
        (false, _) => RiskLevel::Medium,
    }
}

impl Analyzer for SensitivePathAnalyzer {
    fn name(&self) -> &'static str {
        "sensitive-path"
    }

    fn analyze(&self, segments: &[Segment], cwd: &Path) -> AnalyzerResult {
        let mut findings = Vec::new();

        for segment in segments {
            let is_write_verb = WRITE_VERBS.contains(&segment.verb.as_str());
            let is_read_verb = READ_VERBS.contains(&segment.verb.as_str());

            if is_write_verb || is_read_verb {
                for arg in non_flag_args(&segment.args) {
                    if let Some(tier) = self.matching_tier(arg, cwd) {
                        let severity = severity_for(is_write_verb, tier);
                        findings.push(Finding {
                            category: "sensitive-path",
                            severity,
                            description: format!(
                                "{} {}es sensitive path `{arg}`",
                                segment.verb,
                                if is_write_verb { "writ" } else { "read" },
                            ),
                            analyzer: Some("sensitive-path"),
                            source: None,
                        });
                    }
                }
            }

            for redirect in &segment.redirects {
                if let Some(tier) = self.matching_tier(&redirect.target, cwd) {
                    findings.push(Finding {
                        category: "sensitive-path",
                        severity: severity_for(true, tier),
                        description: format!("redirect writes sensitive path `{}`", redirect.target),
                        analyzer: Some("sensitive-path"),
                        source: None,
                    });
                }
            }
        }

        AnalyzerResult::new(findings)
    }
}
