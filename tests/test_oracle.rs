use std::collections::HashMap;
use std::sync::Mutex;

use flare::oracle::{score_to_severity, OsvBackend, Oracle, SeverityEntry, Vulnerability};
use flare::types::RiskLevel;

struct CountingBackend {
    calls: Mutex<HashMap<String, usize>>,
}

impl CountingBackend {
    fn new() -> Self {
        CountingBackend { calls: Mutex::new(HashMap::new()) }
    }

    fn call_count(&self, ecosystem: &str, name: &str, version: &str) -> usize {
        let key = format!("{ecosystem}:{name}@{version}");
        *self.calls.lock().unwrap().get(&key).unwrap_or(&0)
    }
}

impl OsvBackend for CountingBackend {
    fn query(&self, ecosystem: &str, name: &str, version: &str, _timeout_ms: u64) -> Result<Vec<Vulnerability>, String> {
        let key = format!("{ecosystem}:{name}@{version}");
        *self.calls.lock().unwrap().entry(key).or_insert(0) += 1;
        Ok(Vec::new())
    }
}

struct ErrBackend;
impl OsvBackend for ErrBackend {
    fn query(&self, _ecosystem: &str, _name: &str, _version: &str, _timeout_ms: u64) -> Result<Vec<Vulnerability>, String> {
        Err("OSV lookup failed: request timed out".to_string())
    }
}

#[test]
fn repeated_query_hits_the_cache() {
    let backend = std::sync::Arc::new(CountingBackend::new());
    let oracle = Oracle::new(Box::new(CloneBackend(backend.clone())));

    oracle.query("npm", "left-pad", "1.0.0", 1500);
    oracle.query("npm", "left-pad", "1.0.0", 1500);
    oracle.query("npm", "left-pad", "1.0.0", 1500);

    assert_eq!(backend.call_count("npm", "left-pad", "1.0.0"), 1);
}

#[test]
fn distinct_versions_are_cached_separately() {
    let backend = std::sync::Arc::new(CountingBackend::new());
    let oracle = Oracle::new(Box::new(CloneBackend(backend.clone())));

    oracle.query("npm", "left-pad", "1.0.0", 1500);
    oracle.query("npm", "left-pad", "2.0.0", 1500);

    assert_eq!(backend.call_count("npm", "left-pad", "1.0.0"), 1);
    assert_eq!(backend.call_count("npm", "left-pad", "2.0.0"), 1);
}

#[test]
fn oldest_entry_is_evicted_once_capacity_is_exceeded() {
    let backend = std::sync::Arc::new(CountingBackend::new());
    let oracle = Oracle::new(Box::new(CloneBackend(backend.clone())));

    for i in 0..501 {
        oracle.query("npm", &format!("pkg-{i}"), "1.0.0", 1500);
    }

    // the very first entry should have been evicted to make room for #500
    oracle.query("npm", "pkg-0", "1.0.0", 1500);
    assert_eq!(backend.call_count("npm", "pkg-0", "1.0.0"), 2);

    // the most recent entry should still be cached
    oracle.query("npm", "pkg-500", "1.0.0", 1500);
    assert_eq!(backend.call_count("npm", "pkg-500", "1.0.0"), 1);
}

#[test]
fn backend_error_surfaces_as_query_outcome_error_without_caching() {
    let oracle = Oracle::new(Box::new(ErrBackend));
    let outcome = oracle.query("npm", "left-pad", "1.0.0", 1500);
    assert!(outcome.vulns.is_empty());
    assert!(outcome.error.unwrap().contains("timed out"));
}

#[test]
fn score_to_severity_boundaries() {
    assert_eq!(score_to_severity(None), RiskLevel::Medium);
    assert_eq!(score_to_severity(Some(9.0)), RiskLevel::Critical);
    assert_eq!(score_to_severity(Some(8.9)), RiskLevel::High);
    assert_eq!(score_to_severity(Some(7.0)), RiskLevel::High);
    assert_eq!(score_to_severity(Some(6.9)), RiskLevel::Medium);
    assert_eq!(score_to_severity(Some(4.0)), RiskLevel::Medium);
    assert_eq!(score_to_severity(Some(3.9)), RiskLevel::Low);
}

#[test]
fn highest_score_picks_the_max_across_severity_entries() {
    let vuln = Vulnerability {
        id: "CVE-TEST".to_string(),
        summary: None,
        severity: vec![
            SeverityEntry { kind: "CVSS_V2".to_string(), score: "5.0".to_string() },
            SeverityEntry { kind: "CVSS_V3".to_string(), score: "9.1".to_string() },
        ],
    };
    assert_eq!(flare::oracle::highest_score(&vuln), Some(9.1));
}

#[test]
fn highest_score_ignores_non_cvss_severity_entries() {
    let vuln = Vulnerability {
        id: "CVE-TEST".to_string(),
        summary: None,
        severity: vec![SeverityEntry { kind: "UNKNOWN".to_string(), score: "9.9".to_string() }],
    };
    assert_eq!(flare::oracle::highest_score(&vuln), None);
}

struct CloneBackend(std::sync::Arc<CountingBackend>);
impl OsvBackend for CloneBackend {
    fn query(&self, ecosystem: &str, name: &str, version: &str, timeout_ms: u64) -> Result<Vec<Vulnerability>, String> {
        self.0.query(ecosystem, name, version, timeout_ms)
    }
}
