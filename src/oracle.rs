//! Vulnerability oracle: a bounded, cached client for the OSV database.
//!
//! The HTTP dependency is abstracted behind [`OsvBackend`] so the
//! [`package_vuln`](crate::analyzers::package_vuln) analyzer's tests can
//! stub responses without a real network call, mirroring how a batch OSV
//! client wraps a single client with a fixed timeout.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use serde::Deserialize;

/// Bound on the oracle's in-memory cache; eldest entry evicted on insert.
const CACHE_CAPACITY: usize = 500;

const OSV_ENDPOINT: &str = "https://api.osv.dev/v1/query";

#[derive(Debug, Clone, Deserialize)]
pub struct SeverityEntry {
    #[serde(rename = "type")]
    pub kind: String,
    pub score: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Vulnerability {
    pub id: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub severity: Vec<SeverityEntry>,
}

#[derive(Debug, Default, Deserialize)]
struct OsvResponse {
    #[serde(default)]
    vulns: Vec<Vulnerability>,
}

/// Result of one [`Oracle::query`] call: the known vulnerabilities, plus an
/// in-band error message when the lookup degraded instead of succeeding.
pub struct QueryOutcome {
    pub vulns: Vec<Vulnerability>,
    pub error: Option<String>,
}

/// Abstraction over the OSV HTTP endpoint so it can be stubbed in tests.
pub trait OsvBackend: Send + Sync {
    fn query(&self, ecosystem: &str, name: &str, version: &str, timeout_ms: u64) -> Result<Vec<Vulnerability>, String>;
}

/// Production backend: a `reqwest::blocking::Client` POSTing to `api.osv.dev`.
pub struct HttpOsvBackend {
    client: reqwest::blocking::Client,
}

impl Default for HttpOsvBackend {
    fn default() -> Self {
        HttpOsvBackend {
            client: reqwest::blocking::Client::new(),
        }
    }
}

#[derive(serde::Serialize)]
struct OsvRequestPackage<'a> {
    name: &'a str,
    ecosystem: &'a str,
}

#[derive(serde::Serialize)]
struct OsvRequest<'a> {
    package: OsvRequestPackage<'a>,
    version: &'a str,
}

impl OsvBackend for HttpOsvBackend {
    fn query(&self, ecosystem: &str, name: &str, version: &str, timeout_ms: u64) -> Result<Vec<Vulnerability>, String> {
        let body = OsvRequest {
            package: OsvRequestPackage { name, ecosystem },
            version,
        };

        let response = self
            .client
            .post(OSV_ENDPOINT)
            .timeout(Duration::from_millis(timeout_ms))
            .json(&body)
            .send();

        let response = match response {
            Ok(r) => r,
            Err(e) if e.is_timeout() => return Err("OSV lookup failed: request timed out".to_string()),
            Err(_) => return Err("OSV lookup failed: network error".to_string()),
        };

        if !response.status().is_success() {
            return Err(format!("OSV API returned HTTP {}", response.status().as_u16()));
        }

        response
            .json::<OsvResponse>()
            .map(|r| r.vulns)
            .map_err(|_| "OSV lookup failed: network error".to_string())
    }
}

struct OracleCache {
    map: HashMap<String, Vec<Vulnerability>>,
    order: VecDeque<String>,
}

/// Bounded vulnerability oracle with an in-memory FIFO cache.
///
/// A true LRU is not required — eviction just needs to be deterministic
/// given insertion order, which a FIFO already guarantees. Entries are
/// never mutated after insert.
pub struct Oracle {
    backend: Box<dyn OsvBackend>,
    cache: Mutex<OracleCache>,
}

impl Oracle {
    pub fn new(backend: Box<dyn OsvBackend>) -> Self {
        Oracle {
            backend,
            cache: Mutex::new(OracleCache {
                map: HashMap::new(),
                order: VecDeque::new(),
            }),
        }
    }

    pub fn with_http_backend() -> Self {
        Oracle::new(Box::new(HttpOsvBackend::default()))
    }

    fn cache_key(ecosystem: &str, name: &str, version: &str) -> String {
        format!("{ecosystem}:{name}@{version}")
    }

    pub fn query(&self, ecosystem: &str, name: &str, version: &str, timeout_ms: u64) -> QueryOutcome {
        let key = Self::cache_key(ecosystem, name, version);

        if let Some(vulns) = self.cache.lock().unwrap().map.get(&key).cloned() {
            return QueryOutcome { vulns, error: None };
        }

        match self.backend.query(ecosystem, name, version, timeout_ms) {
            Ok(vulns) => {
                self.store(key, vulns.clone());
                QueryOutcome { vulns, error: None }
            }
            Err(error) => QueryOutcome { vulns: Vec::new(), error: Some(error) },
        }
    }

    fn store(&self, key: String, vulns: Vec<Vulnerability>) {
        let mut cache = self.cache.lock().unwrap();
        if !cache.map.contains_key(&key) {
            if cache.map.len() >= CACHE_CAPACITY {
                if let Some(oldest) = cache.order.pop_front() {
                    cache.map.remove(&oldest);
                }
            }
            cache.order.push_back(key.clone());
        }
        cache.map.insert(key, vulns);
    }
}

/// Highest CVSS score found among a vulnerability's `CVSS_V3`/`CVSS_V2`
/// severity entries, or `None` when it carries no parseable score.
pub fn highest_score(vuln: &Vulnerability) -> Option<f64> {
    vuln.severity
        .iter()
        .filter(|s| matches!(s.kind.as_str(), "CVSS_V3" | "CVSS_V2"))
        .filter_map(|s| cvss_entry_score(&s.score))
        .fold(None, |acc, score| Some(acc.map_or(score, |a: f64| a.max(score))))
}

fn cvss_entry_score(raw: &str) -> Option<f64> {
    if let Ok(n) = raw.parse::<f64>() {
        if (0.0..=10.0).contains(&n) {
            return Some(n);
        }
    }
    if let Some(vector) = raw.strip_prefix("CVSS:") {
        return Some(approximate_cvss_vector(vector));
    }
    None
}

/// Heuristic base-score approximation for a `CVSS:` vector string, per
/// `SPEC_FULL.md` §9: its exact output boundaries are implementation
/// freedom as long as the severity mapping stays well-defined.
fn approximate_cvss_vector(vector: &str) -> f64 {
    let mut fields: HashMap<&str, &str> = HashMap::new();
    for part in vector.split('/') {
        if let Some((k, v)) = part.split_once(':') {
            fields.insert(k, v);
        }
    }

    let impact_letter = |key: &str, fallback_key: &str| -> i32 {
        let value = fields.get(key).or_else(|| fields.get(fallback_key)).copied();
        match value {
            Some("H") => 2,
            Some("L") => 1,
            _ => 0,
        }
    };

    let c = impact_letter("VC", "C");
    let i = impact_letter("VI", "I");
    let a = impact_letter("VA", "A");
    let max_impact = c.max(i).max(a);

    let mut base = match max_impact {
        2 => 7.0,
        1 => 4.0,
        _ => 0.0,
    };

    if fields.get("AC") == Some(&"L") {
        base += 1.0;
    }
    if fields.get("PR") == Some(&"N") {
        base += 1.0;
    }
    if fields.get("S") == Some(&"C") {
        base += 0.5;
    }

    base.min(10.0)
}

/// Maps a CVSS score (or its absence) to a risk severity, per `spec.md` §4.7.
pub fn score_to_severity(score: Option<f64>) -> crate::types::RiskLevel {
    use crate::types::RiskLevel;
    match score {
        None => RiskLevel::Medium,
        Some(s) if s >= 9.0 => RiskLevel::Critical,
        Some(s) if s >= 7.0 => RiskLevel::High,
        Some(s) if s >= 4.0 => RiskLevel::Medium,
        Some(_) => RiskLevel::Low,
    }
}
