//! Code-injection analyzer.
//!
//! Flags dynamic execution (`eval`/`exec`/`source`), interpreter inline-code
//! flags, pipe-to-shell chains, and container escape vectors.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::analyzers::Analyzer;
use crate::types::{AnalyzerResult, Finding, RiskLevel, Segment};

const EVAL_VERBS: &[&str] = &["eval", "exec", "source"];
const NETWORK_VERBS: &[&str] = &["curl", "wget", "nc", "netcat", "ncat", "ssh", "scp", "rsync", "ftp", "sftp"];

static RE_SUBSHELL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$\(|`").unwrap());
static RE_FETCH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\b(curl|wget)\b").unwrap());
static RE_DANGEROUS_OPS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\brm\b|\bdel\b|\brmdir\b|os\.system|subprocess|child_process|execSync|spawnSync").unwrap()
});

/// Returns the inline-code flag(s) recognized for a given interpreter verb.
fn inline_flags(verb: &str) -> &'static [&'static str] {
    match verb {
        "bash" | "sh" | "zsh" | "dash" | "python" | "python3" => &["-c"],
        "node" => &["-e", "--eval"],
        "ruby" | "perl" => &["-e"],
        _ => &[],
    }
}

fn is_interpreter(verb: &str) -> bool {
    !inline_flags(verb).is_empty()
}

fn analyze_eval(segment: &Segment, findings: &mut Vec<Finding>) {
    let is_eval = EVAL_VERBS.contains(&segment.verb.as_str())
        || (segment.verb == "." && !segment.args.is_empty());
    if !is_eval {
        return;
    }
    let joined = segment.args.join(" ");
    let severity = if RE_FETCH.is_match(&joined) {
        RiskLevel::Critical
    } else if RE_SUBSHELL.is_match(&joined) {
        RiskLevel::High
    } else {
        RiskLevel::Medium
    };
    findings.push(Finding {
        category: "code-injection",
        severity,
        description: format!("`{}` executes dynamically constructed content", segment.verb),
        analyzer: Some("code-injection"),
        source: None,
    });
}

fn analyze_interpreter(segment: &Segment, findings: &mut Vec<Finding>) {
    let (verb, args, sudo_prefixed) = if segment.verb == "sudo" {
        match segment.args.first() {
            Some(inner) => (inner.as_str(), &segment.args[1..], true),
            None => return,
        }
    } else {
        (segment.verb.as_str(), segment.args.as_slice(), false)
    };

    if !is_interpreter(verb) {
        return;
    }
    let Some(flag) = args.first() else { return };
    if !inline_flags(verb).contains(&flag.as_str()) {
        return;
    }
    let Some(code) = args.get(1) else { return };

    if sudo_prefixed {
        findings.push(Finding {
            category: "code-injection",
            severity: RiskLevel::High,
            description: format!("sudo {verb} {flag} runs inline code with elevated privileges"),
            analyzer: Some("code-injection"),
            source: None,
        });
        return;
    }

    let severity = if RE_DANGEROUS_OPS.is_match(code) {
        RiskLevel::High
    } else {
        RiskLevel::Low
    };
    findings.push(Finding {
        category: "code-injection",
        severity,
        description: format!("{verb} {flag} runs inline code"),
        analyzer: Some("code-injection"),
        source: None,
    });
}

fn analyze_pipe_to_interpreter(segments: &[Segment], i: usize, segment: &Segment, findings: &mut Vec<Finding>) {
    if !NETWORK_VERBS.contains(&segment.verb.as_str()) {
        return;
    }
    if !matches!(segment.operator, Some(crate::types::Operator::Pipe)) {
        return;
    }
    let Some(next) = segments.get(i + 1) else { return };
    let next_verb = if next.verb == "sudo" {
        next.args.first().map(String::as_str).unwrap_or("")
    } else {
        next.verb.as_str()
    };
    if is_interpreter(next_verb) {
        findings.push(Finding {
            category: "code-injection",
            severity: RiskLevel::Critical,
            description: format!("output piped directly into `{next_verb}`"),
            analyzer: Some("code-injection"),
            source: None,
        });
    }
}

fn analyze_docker(segment: &Segment, findings: &mut Vec<Finding>) {
    if segment.verb != "docker" {
        return;
    }
    let Some(subcommand) = segment.args.first() else { return };
    if !matches!(subcommand.as_str(), "run" | "exec" | "create") {
        return;
    }
    let args = &segment.args[1..];

    if args.iter().any(|a| a == "--privileged") {
        findings.push(Finding {
            category: "code-injection",
            severity: RiskLevel::High,
            description: "docker container runs in privileged mode".to_string(),
            analyzer: Some("code-injection"),
            source: None,
        });
    }

    let root_mount = args.iter().enumerate().any(|(i, a)| {
        (a == "-v" || a == "--volume") && args.get(i + 1).is_some_and(|v| v.starts_with("/:/"))
    });
    if root_mount {
        findings.push(Finding {
            category: "code-injection",
            severity: RiskLevel::Critical,
            description: "docker mounts the host root filesystem into the container".to_string(),
            analyzer: Some("code-injection"),
            source: None,
        });
    }

    if args.iter().any(|a| a == "--pid=host" || a == "--net=host") {
        findings.push(Finding {
            category: "code-injection",
            severity: RiskLevel::High,
            description: "docker shares the host's pid or network namespace".to_string(),
            analyzer: Some("code-injection"),
            source: None,
        });
    }
}

pub struct CodeInjectionAnalyzer;

impl Analyzer for CodeInjectionAnalyzer {
    fn name(&self) -> &'static str {
        "code-injection"
    }

    fn analyze(&self, segments: &[Segment], _cwd: &Path) -> AnalyzerResult {
        let mut findings = Vec::new();
        for (i, segment) in segments.iter().enumerate() {
            analyze_eval(segment, &mut findings);
            analyze_interpreter(segment, &mut findings);
            analyze_pipe_to_interpreter(segments, i, segment, &mut findings);
            analyze_docker(segment, &mut findings);
        }
        AnalyzerResult::new(findings)
    }
}
