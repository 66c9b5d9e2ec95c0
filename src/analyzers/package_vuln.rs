//! Package-vulnerability analyzer.
//!
//! Extracts packages named by `npm`/`pip`/`cargo` install invocations and
//! queries the [`Oracle`] for known vulnerabilities, bounded to a small
//! worker pool so one slow lookup can't stall the others indefinitely.

use std::path::Path;
use std::sync::{Arc, LazyLock};

use rayon::prelude::*;
use regex::Regex;

use crate::analyzers::Analyzer;
use crate::config::Config;
use crate::oracle::{self, Oracle};
use crate::types::{AnalyzerResult, Finding, RiskLevel, Segment};

/// Matches the bound on concurrent oracle fan-out noted in `spec.md` §9.
const MAX_CONCURRENT_LOOKUPS: usize = 10;

static RE_PIP_SPEC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^([^=<>!]+?)(==|>=|<=|~=|!=)(.+)$").unwrap());

struct PendingPackage {
    ecosystem: &'static str,
    name: String,
    version: String,
}

/// Strips a leading `sudo`, returning the inner verb/args if present.
fn strip_sudo<'a>(verb: &'a str, args: &'a [String]) -> (&'a str, &'a [String]) {
    if verb == "sudo" {
        match args.first() {
            Some(inner) => (inner.as_str(), &args[1..]),
            None => (verb, args),
        }
    } else {
        (verb, args)
    }
}

/// `name@version` → version after the last `@`, unless that `@` is the
/// package's own scope marker (`@scope/name`, no version given).
fn split_at_version(token: &str) -> Option<(String, String)> {
    let at = token.rfind('@')?;
    if at == 0 {
        return None;
    }
    let (name, version) = token.split_at(at);
    Some((name.to_string(), version[1..].to_string()))
}

fn extract_npm(args: &[String]) -> Vec<PendingPackage> {
    let Some(sub) = args.first() else { return Vec::new() };
    if !matches!(sub.as_str(), "install" | "i" | "add") {
        return Vec::new();
    }
    args[1..]
        .iter()
        .filter(|a| !a.starts_with('-'))
        .filter_map(|a| split_at_version(a))
        .map(|(name, version)| PendingPackage { ecosystem: "npm", name, version })
        .collect()
}

fn extract_pip(args: &[String]) -> Vec<PendingPackage> {
    let Some(sub) = args.first() else { return Vec::new() };
    if sub != "install" {
        return Vec::new();
    }
    args[1..]
        .iter()
        .filter(|a| !a.starts_with('-'))
        .filter_map(|a| {
            RE_PIP_SPEC.captures(a).map(|caps| PendingPackage {
                ecosystem: "PyPI",
                name: caps[1].to_string(),
                version: caps[3].to_string(),
            })
        })
        .collect()
}

fn extract_cargo(args: &[String]) -> Vec<PendingPackage> {
    let Some(sub) = args.first() else { return Vec::new() };
    if !matches!(sub.as_str(), "add" | "install") {
        return Vec::new();
    }
    args[1..]
        .iter()
        .filter(|a| !a.starts_with('-'))
        .filter_map(|a| split_at_version(a))
        .map(|(name, version)| PendingPackage { ecosystem: "crates.io", name, version })
        .collect()
}

fn extract_packages(verb: &str, args: &[String]) -> Vec<PendingPackage> {
    let (verb, args) = strip_sudo(verb, args);
    match verb {
        "npm" => extract_npm(args),
        "pip" | "pip3" => extract_pip(args),
        "cargo" => extract_cargo(args),
        _ => Vec::new(),
    }
}

fn describe_cve_ids(ids: &[&str]) -> String {
    let shown: Vec<&str> = ids.iter().take(3).copied().collect();
    if ids.len() > 3 {
        format!("{} and {} more", shown.join(", "), ids.len() - 3)
    } else {
        shown.join(", ")
    }
}

pub struct PackageVulnAnalyzer {
    oracle: Arc<Oracle>,
    timeout_ms: u64,
    allowlist: Vec<String>,
    pool: rayon::ThreadPool,
}

impl PackageVulnAnalyzer {
    pub fn new(config: &Config, oracle: Arc<Oracle>) -> Self {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(MAX_CONCURRENT_LOOKUPS)
            .build()
            .unwrap_or_else(|_| rayon::ThreadPoolBuilder::new().build().expect("rayon pool"));
        PackageVulnAnalyzer {
            oracle,
            timeout_ms: config.osv_timeout,
            allowlist: config.package_allowlist.clone(),
            pool,
        }
    }

    fn is_allowlisted(&self, pkg: &PendingPackage) -> bool {
        self.allowlist.iter().any(|entry| {
            entry == &pkg.name || *entry == format!("{}@{}", pkg.name, pkg.version)
        })
    }

    fn finding_for(&self, pkg: &PendingPackage) -> (Option<Finding>, bool) {
        let outcome = self.oracle.query(pkg.ecosystem, &pkg.name, &pkg.version, self.timeout_ms);

        if let Some(error) = outcome.error {
            return (
                Some(Finding {
                    category: "package-vulnerability",
                    severity: RiskLevel::Medium,
                    description: format!("vulnerability status unknown for {}@{}: {error}", pkg.name, pkg.version),
                    analyzer: Some("package-vulnerability"),
                    source: None,
                }),
                true,
            );
        }

        if outcome.vulns.is_empty() {
            return (None, false);
        }

        let highest = outcome
            .vulns
            .iter()
            .filter_map(|v| oracle::highest_score(v))
            .fold(None, |acc: Option<f64>, s| Some(acc.map_or(s, |a| a.max(s))));
        let ids: Vec<&str> = outcome
            .vulns
            .iter()
            .map(|v| v.id.as_str())
            .filter(|id| id.starts_with("CVE-") || id.starts_with("GHSA-"))
            .collect();
        let severity = oracle::score_to_severity(highest);

        let count = outcome.vulns.len();
        let noun = if count == 1 { "vulnerability" } else { "vulnerabilities" };
        let cves = describe_cve_ids(&ids);
        let including = if cves.is_empty() { String::new() } else { format!(" including {cves}") };
        let cvss = highest.map(|s| format!(" (CVSS {s:.1})")).unwrap_or_default();

        (
            Some(Finding {
                category: "package-vulnerability",
                severity,
                description: format!(
                    "`{}@{}` has {count} known {noun}{including}{cvss}",
                    pkg.name, pkg.version,
                ),
                analyzer: Some("package-vulnerability"),
                source: None,
            }),
            false,
        )
    }
}

impl Analyzer for PackageVulnAnalyzer {
    fn name(&self) -> &'static str {
        "package-vulnerability"
    }

    fn analyze(&self, segments: &[Segment], _cwd: &Path) -> AnalyzerResult {
        let packages: Vec<PendingPackage> = segments
            .iter()
            .flat_map(|s| extract_packages(&s.verb, &s.args))
            .filter(|p| !self.is_allowlisted(p))
            .collect();

        if packages.is_empty() {
            return AnalyzerResult::new(Vec::new());
        }

        let outcomes: Vec<(Option<Finding>, bool)> =
            self.pool.install(|| packages.par_iter().map(|p| self.finding_for(p)).collect());

        let mut findings = Vec::with_capacity(outcomes.len());
        let mut partial = false;
        for (finding, errored) in outcomes {
            findings.extend(finding);
            partial |= errored;
        }

        if partial {
            AnalyzerResult::partial(findings)
        } else {
            AnalyzerResult::new(findings)
        }
    }
}
