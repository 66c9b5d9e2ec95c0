//! Network analyzer.
//!
//! Flags exfiltration, unencrypted transport, credential headers leaked to
//! non-allowlisted hosts, DNS-channel abuse, and raw socket tools.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::analyzers::Analyzer;
use crate::config::Config;
use crate::types::{AnalyzerResult, Finding, RiskLevel, Segment};

const NETWORK_VERBS: &[&str] = &["curl", "wget", "nc", "netcat", "ncat", "ssh", "scp", "rsync", "ftp", "sftp"];
const DNS_VERBS: &[&str] = &["nslookup", "dig", "host", "drill"];
const RAW_SOCKET_VERBS: &[&str] = &["nc", "netcat", "ncat"];

const UPLOAD_FLAGS: &[&str] = &["-d", "--data", "--data-binary", "-F", "--form", "-T", "--upload-file"];

const DEFAULT_SAFE_HOSTS: &[&str] = &[
    "registry.npmjs.org",
    "pypi.org",
    "crates.io",
    "github.com",
    "raw.githubusercontent.com",
    "api.github.com",
    "localhost",
    "127.0.0.1",
    "::1",
];

static RE_SENSITIVE_DATA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(/etc/passwd|/etc/shadow|\.ssh/|\.aws/|\.env|id_rsa|\.pem$|\.key$|credentials|secret|token)").unwrap()
});

static RE_SUBSHELL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$\(|`").unwrap());

static RE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(https?|ftp)://(?:[^@/?#\s]+@)?([^/?#:\s]+)").unwrap());

static RE_CREDENTIAL_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(Authorization|Bearer|Token|Cookie|X-Api-Key|X-Auth-Token)\b").unwrap()
});

pub struct NetworkAnalyzer {
    safe_hosts: Vec<String>,
}

impl NetworkAnalyzer {
    pub fn new(config: &Config) -> Self {
        let mut safe_hosts: Vec<String> = DEFAULT_SAFE_HOSTS.iter().map(|h| h.to_string()).collect();
        safe_hosts.extend(config.safe_hosts.iter().cloned());
        NetworkAnalyzer { safe_hosts }
    }

    fn is_safe_host(&self, host: &str) -> bool {
        let host = host.to_lowercase();
        self.safe_hosts.iter().any(|h| h.to_lowercase() == host)
    }

    fn extract_url_host(&self, args: &[String]) -> Option<(String, String)> {
        for arg in args {
            if let Some(caps) = RE_URL.captures(arg) {
                let host = caps.get(2).map(|m| m.as_str().to_string()).unwrap_or_default();
                let scheme = caps.get(1).map(|m| m.as_str().to_string()).unwrap_or_default();
                return Some((scheme, host));
            }
            if arg.starts_with("http://") || arg.starts_with("https://") || arg.starts_with("ftp://") {
                return Some((String::new(), String::new()));
            }
        }
        None
    }

    fn header_value<'a>(&self, args: &'a [String]) -> Option<&'a str> {
        let mut iter = args.iter().enumerate();
        while let Some((i, arg)) = iter.next() {
            if arg == "-H" || arg == "--header" {
                return args.get(i + 1).map(String::as_str);
            }
            if let Some(value) = arg.strip_prefix("--header=") {
                return Some(value);
            }
        }
        None
    }

    fn upload_value<'a>(&self, args: &'a [String]) -> Option<(bool, &'a str)> {
        let mut iter = args.iter().enumerate();
        while let Some((i, arg)) = iter.next() {
            if UPLOAD_FLAGS.contains(&arg.as_str()) {
                return Some((true, args.get(i + 1).map(String::as_str).unwrap_or("")));
            }
        }
        None
    }
}

impl Analyzer for NetworkAnalyzer {
    fn name(&self) -> &'static str {
        "network"
    }

    fn analyze(&self, segments: &[Segment], _cwd: &Path) -> AnalyzerResult {
        let mut findings = Vec::new();

        for (i, segment) in segments.iter().enumerate() {
            if DNS_VERBS.contains(&segment.verb.as_str()) {
                if RE_SUBSHELL.is_match(&segment.raw_segment) {
                    findings.push(Finding {
                        category: "network",
                        severity: RiskLevel::Critical,
                        description: "possible DNS exfiltration".to_string(),
                        analyzer: Some("network"),
                        source: None,
                    });
                } else {
                    findings.push(Finding {
                        category: "network",
                        severity: RiskLevel::Low,
                        description: "DNS lookup tool".to_string(),
                        analyzer: Some("network"),
                        source: None,
                    });
                }
                continue;
            }

            if !NETWORK_VERBS.contains(&segment.verb.as_str()) {
                continue;
            }

            if segment.operator.is_none() && i > 0 {
                if let Some(prev) = segments.get(i - 1) {
                    if matches!(prev.operator, Some(crate::types::Operator::Pipe))
                        && RE_SENSITIVE_DATA.is_match(&prev.raw_segment)
                    {
                        findings.push(Finding {
                            category: "network",
                            severity: RiskLevel::Critical,
                            description: "piping sensitive data to a network tool".to_string(),
                            analyzer: Some("network"),
                            source: None,
                        });
                        continue;
                    }
                }
            }

            let uploading = self.upload_value(&segment.args);
            let (scheme, host) = self.extract_url_host(&segment.args).unwrap_or_default();
            let host_is_safe = !host.is_empty() && self.is_safe_host(&host);

            if matches!(segment.verb.as_str(), "curl" | "wget") {
                if let Some(header) = self.header_value(&segment.args) {
                    if !host_is_safe && RE_CREDENTIAL_HEADER.is_match(header) {
                        findings.push(Finding {
                            category: "network",
                            severity: RiskLevel::High,
                            description: "credential header sent to a non-allowlisted host".to_string(),
                            analyzer: Some("network"),
                            source: None,
                        });
                    }
                }
            }

            if let Some((_, data_value)) = uploading {
                if !host.is_empty() && !host_is_safe {
                    let severity = if RE_SENSITIVE_DATA.is_match(data_value) {
                        RiskLevel::Critical
                    } else {
                        RiskLevel::High
                    };
                    findings.push(Finding {
                        category: "network",
                        severity,
                        description: format!("uploads data to non-allowlisted host `{host}`"),
                        analyzer: Some("network"),
                        source: None,
                    });
                }
            } else if scheme.eq_ignore_ascii_case("http") && !host.is_empty() && !host_is_safe {
                findings.push(Finding {
                    category: "network",
                    severity: RiskLevel::Medium,
                    description: format!("clear-text HTTP request to `{host}`"),
                    analyzer: Some("network"),
                    source: None,
                });
            }

            if RAW_SOCKET_VERBS.contains(&segment.verb.as_str()) {
                findings.push(Finding {
                    category: "network",
                    severity: RiskLevel::High,
                    description: "raw socket tool can open arbitrary network connections".to_string(),
                    analyzer: Some("network"),
                    source: None,
                });
            }
        }

        let has_critical = findings.iter().any(|f| f.severity == RiskLevel::Critical);
        let final_is_network = segments
            .last()
            .is_some_and(|s| NETWORK_VERBS.contains(&s.verb.as_str()));
        let chain_exfil = segments.iter().enumerate().any(|(i, s)| {
            i + 1 < segments.len()
                && matches!(s.operator, Some(crate::types::Operator::Pipe))
                && RE_SENSITIVE_DATA.is_match(&s.raw_segment)
        });

        if final_is_network && chain_exfil && !has_critical {
            findings.push(Finding {
                category: "network",
                severity: RiskLevel::Critical,
                description: "chain exfiltration: sensitive data piped through to a network tool".to_string(),
                analyzer: Some("network"),
                source: None,
            });
        }

        AnalyzerResult::new(findings)
    }
}
