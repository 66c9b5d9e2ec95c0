//! Core data types shared across the analysis pipeline.
//!
//! - [`RiskLevel`] — the totally ordered verdict scale, also used as a
//!   finding's individual severity.
//! - [`Action`] and [`ActionPolicy`] — the advisory disposition mapping.
//! - [`Segment`] / [`Redirect`] — parser output.
//! - [`Finding`] / [`AnalyzerResult`] — analyzer output.
//! - [`RiskAssessment`] — the final output of [`crate::assess::assess`].

/// Risk verdict, totally ordered `none < low < medium < high < critical`.
///
/// Doubles as the severity of an individual [`Finding`]; the overall
/// assessment's [`RiskLevel`] is derived from the findings by
/// [`crate::scorer`], not simply the maximum of the individual severities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    None,
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Human-readable prefix used to build the assessment summary line.
    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::None => "No issues",
            RiskLevel::Low => "Low risk",
            RiskLevel::Medium => "Medium risk",
            RiskLevel::High => "High risk",
            RiskLevel::Critical => "Critical risk",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RiskLevel::None => "none",
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        };
        write!(f, "{s}")
    }
}

/// Advisory disposition conveyed to the caller. Flare never enforces this —
/// it is the caller's decision what to do with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Run,
    Warn,
    Ask,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Action::Run => "run",
            Action::Warn => "warn",
            Action::Ask => "ask",
        };
        write!(f, "{s}")
    }
}

/// Total mapping from every [`RiskLevel`] to an [`Action`].
///
/// There is deliberately no [`Default`] impl: §3 of the spec requires
/// callers to supply a policy explicitly. Use [`ActionPolicy::reference`]
/// for the shipped reference policy when one is needed (CLI, tests).
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ActionPolicy {
    pub none: Action,
    pub low: Action,
    pub medium: Action,
    pub high: Action,
    pub critical: Action,
}

impl ActionPolicy {
    /// The reference policy shipped by the core: `{none:run, low:run,
    /// medium:warn, high:ask, critical:ask}`.
    pub fn reference() -> Self {
        ActionPolicy {
            none: Action::Run,
            low: Action::Run,
            medium: Action::Warn,
            high: Action::Ask,
            critical: Action::Ask,
        }
    }

    pub fn get(&self, level: RiskLevel) -> Action {
        match level {
            RiskLevel::None => self.none,
            RiskLevel::Low => self.low,
            RiskLevel::Medium => self.medium,
            RiskLevel::High => self.high,
            RiskLevel::Critical => self.critical,
        }
    }
}

/// A redirect (`>` or `>>`) stripped from a segment body.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Redirect {
    pub kind: RedirectKind,
    pub target: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RedirectKind {
    Append,
    Truncate,
}

/// One parsed command segment — see `spec.md` §3 for the invariants.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Segment {
    pub verb: String,
    pub args: Vec<String>,
    pub operator: Option<Operator>,
    pub redirects: Vec<Redirect>,
    pub raw_segment: String,
    pub position: usize,
}

/// Operator following a [`Segment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum Operator {
    #[serde(rename = "|")]
    Pipe,
    #[serde(rename = "||")]
    Or,
    #[serde(rename = "&&")]
    And,
    #[serde(rename = ";")]
    Semicolon,
}

/// One atomic risk signal emitted by one analyzer.
///
/// `category` is a stable short string drawn from a closed set; see
/// [`crate::analyzers::CATEGORIES`] for the full list.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Finding {
    pub category: &'static str,
    pub severity: RiskLevel,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analyzer: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<FindingSource>,
}

/// Optional source-location context for a finding (used by the static-file
/// scanner collaborator; the shell-command pipeline rarely populates it).
#[derive(Debug, Clone, serde::Serialize)]
pub struct FindingSource {
    pub file: String,
    pub line: usize,
    pub context: String,
}

/// Output of a single analyzer's run over one request's segments.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct AnalyzerResult {
    pub findings: Vec<Finding>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub partial: bool,
}

impl AnalyzerResult {
    pub fn new(findings: Vec<Finding>) -> Self {
        AnalyzerResult {
            findings,
            partial: false,
        }
    }

    pub fn partial(findings: Vec<Finding>) -> Self {
        AnalyzerResult {
            findings,
            partial: true,
        }
    }
}

/// The final, immutable output of one `assess` call.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RiskAssessment {
    pub risk_level: RiskLevel,
    pub action: Action,
    pub summary: String,
    pub details: Vec<Finding>,
    pub recommendation: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub partial: bool,
}
