//! Assessment orchestration.
//!
//! [`assess`] is the single entry point for the whole pipeline: parse the
//! command, run every analyzer in parallel via [rayon], and score the
//! combined findings. Mirrors the shape of the teacher's `audit::run_audit`,
//! substituted from "run scanners over a directory" to "run analyzers over
//! parsed segments".

use std::path::Path;
use std::sync::Arc;

use rayon::prelude::*;

use crate::analyzers::{self, Analyzer};
use crate::config::Config;
use crate::oracle::Oracle;
use crate::parser;
use crate::scorer;
use crate::types::{Finding, RiskAssessment};

/// Assesses the risk of running `command` from `cwd`.
///
/// Never panics and never propagates a parse failure to the caller: per
/// `spec.md` §7, a [`crate::error::ParseError`] is caught here and folded
/// into a synthetic low-confidence assessment.
pub fn assess(command: &str, cwd: &Path, config: &Config, oracle: &Arc<Oracle>) -> RiskAssessment {
    if config.is_allowlisted_command(command) {
        return scorer::none_assessment("Command is in the allowlist.");
    }

    let segments = match parser::parse(command) {
        Ok(segments) => segments,
        Err(e) => {
            return RiskAssessment {
                risk_level: crate::types::RiskLevel::None,
                action: crate::types::Action::Run,
                summary: format!("Analysis error: {e}"),
                details: Vec::new(),
                recommendation: "Could not analyze this command. Proceed with caution.".to_string(),
                partial: false,
            };
        }
    };

    let analyzers = analyzers::all_analyzers(config, oracle);

    let results: Vec<_> = analyzers
        .par_iter()
        .map(|analyzer: &Box<dyn Analyzer>| analyzer.analyze(&segments, cwd))
        .collect();

    let mut findings: Vec<Finding> = Vec::new();
    let mut partial = false;
    for result in results {
        findings.extend(result.findings);
        partial |= result.partial;
    }

    scorer::score(findings, partial, &config.action_policy)
}
