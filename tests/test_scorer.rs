use flare::scorer;
use flare::types::{Action, ActionPolicy, Finding, RiskLevel};

fn finding(category: &'static str, severity: RiskLevel) -> Finding {
    Finding {
        category,
        severity,
        description: format!("{category} finding"),
        analyzer: Some(category),
        source: None,
    }
}

#[test]
fn no_findings_is_none_and_run() {
    let report = scorer::score(Vec::new(), false, &ActionPolicy::reference());
    assert_eq!(report.risk_level, RiskLevel::None);
    assert_eq!(report.action, Action::Run);
}

#[test]
fn single_critical_finding_is_critical() {
    let findings = vec![finding("destructive", RiskLevel::Critical)];
    let report = scorer::score(findings, false, &ActionPolicy::reference());
    assert_eq!(report.risk_level, RiskLevel::Critical);
    assert_eq!(report.action, Action::Ask);
}

#[test]
fn two_high_findings_amplify_to_critical() {
    let findings = vec![
        finding("permissions", RiskLevel::High),
        finding("network", RiskLevel::High),
    ];
    let report = scorer::score(findings, false, &ActionPolicy::reference());
    assert_eq!(report.risk_level, RiskLevel::Critical);
}

#[test]
fn high_plus_medium_with_amplifying_pair_is_critical() {
    let findings = vec![
        finding("permissions", RiskLevel::High),
        finding("network", RiskLevel::Medium),
    ];
    let report = scorer::score(findings, false, &ActionPolicy::reference());
    assert_eq!(report.risk_level, RiskLevel::Critical);
}

#[test]
fn high_plus_medium_without_amplifying_pair_stays_high() {
    let findings = vec![
        finding("destructive", RiskLevel::High),
        finding("code-injection", RiskLevel::Medium),
    ];
    let report = scorer::score(findings, false, &ActionPolicy::reference());
    assert_eq!(report.risk_level, RiskLevel::High);
}

#[test]
fn three_medium_findings_escalate_to_high() {
    let findings = vec![
        finding("network", RiskLevel::Medium),
        finding("sensitive-path", RiskLevel::Medium),
        finding("package-vulnerability", RiskLevel::Medium),
    ];
    let report = scorer::score(findings, false, &ActionPolicy::reference());
    assert_eq!(report.risk_level, RiskLevel::High);
}

#[test]
fn single_low_finding_falls_back_to_max_severity() {
    let findings = vec![finding("network", RiskLevel::Low)];
    let report = scorer::score(findings, false, &ActionPolicy::reference());
    assert_eq!(report.risk_level, RiskLevel::Low);
    assert_eq!(report.action, Action::Run);
}

#[test]
fn partial_flag_propagates_to_the_assessment() {
    let findings = vec![finding("package-vulnerability", RiskLevel::Medium)];
    let report = scorer::score(findings, true, &ActionPolicy::reference());
    assert!(report.partial);
}

#[test]
fn summary_for_single_finding_includes_its_description() {
    let findings = vec![finding("destructive", RiskLevel::Critical)];
    let report = scorer::score(findings, false, &ActionPolicy::reference());
    assert!(report.summary.contains("destructive finding"));
}

#[test]
fn summary_for_multiple_findings_lists_up_to_three() {
    let findings = vec![
        finding("network", RiskLevel::Medium),
        finding("sensitive-path", RiskLevel::Medium),
        finding("package-vulnerability", RiskLevel::Medium),
    ];
    let report = scorer::score(findings, false, &ActionPolicy::reference());
    assert!(report.summary.contains("3 issues found"));
    assert_eq!(report.summary.matches("\n- ").count(), 3);
}

#[test]
fn summary_ranks_highest_severity_findings_first() {
    let findings = vec![
        finding("network", RiskLevel::Low),
        finding("destructive", RiskLevel::Critical),
        finding("permissions", RiskLevel::Medium),
    ];
    let report = scorer::score(findings, false, &ActionPolicy::reference());
    let lines: Vec<&str> = report.summary.lines().collect();
    assert!(lines[1].contains("destructive finding"));
}

#[test]
fn critical_destructive_recommendation_warns_of_data_loss() {
    let findings = vec![finding("destructive", RiskLevel::Critical)];
    let report = scorer::score(findings, false, &ActionPolicy::reference());
    assert!(report.recommendation.contains("irreversible"));
}

#[test]
fn none_assessment_is_run_with_no_findings() {
    let report = scorer::none_assessment("Command is in the allowlist.");
    assert_eq!(report.risk_level, RiskLevel::None);
    assert_eq!(report.action, Action::Run);
    assert_eq!(report.summary, "Command is in the allowlist.");
    assert!(report.details.is_empty());
    assert!(!report.recommendation.is_empty());
}

#[test]
fn custom_policy_is_honored() {
    let findings = vec![finding("network", RiskLevel::Medium)];
    let mut policy = ActionPolicy::reference();
    policy.medium = Action::Ask;
    let report = scorer::score(findings, false, &policy);
    assert_eq!(report.action, Action::Ask);
}
