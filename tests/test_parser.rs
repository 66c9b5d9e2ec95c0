use flare::parser::{parse, MAX_COMMAND_LEN};
use flare::types::Operator;

#[test]
fn splits_on_pipe_and_semicolon() {
    let segments = parse("echo hi | grep h; echo done").unwrap();
    assert_eq!(segments.len(), 3);
    assert_eq!(segments[0].verb, "echo");
    assert_eq!(segments[0].operator, Some(Operator::Pipe));
    assert_eq!(segments[1].verb, "grep");
    assert_eq!(segments[1].operator, Some(Operator::Semicolon));
    assert_eq!(segments[2].verb, "echo");
    assert_eq!(segments[2].operator, None);
}

#[test]
fn collapses_consecutive_operators() {
    let segments = parse("echo a;; echo b").unwrap();
    assert_eq!(segments.len(), 2);
    assert_eq!(segments[0].verb, "echo");
    assert_eq!(segments[1].verb, "echo");
}

#[test]
fn operators_inside_quotes_do_not_split() {
    let segments = parse("echo 'a | b; c'").unwrap();
    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].args, vec!["a | b; c"]);
}

#[test]
fn lifts_subshell_as_its_own_segment() {
    let segments = parse("echo $(rm -rf /)").unwrap();
    assert!(segments.iter().any(|s| s.verb == "rm" && s.args == vec!["-rf", "/"]));
    // the original segment keeps the subshell text verbatim
    assert!(segments[0].raw_segment.contains("$(rm -rf /)"));
}

#[test]
fn lifts_backtick_command() {
    let segments = parse("echo `cat /etc/passwd`").unwrap();
    assert!(segments.iter().any(|s| s.verb == "cat" && s.args == vec!["/etc/passwd"]));
}

#[test]
fn lifts_nested_subshells() {
    let segments = parse("echo $(echo $(rm -rf /))").unwrap();
    assert!(segments.iter().any(|s| s.verb == "rm"));
}

#[test]
fn lifts_process_substitution() {
    let segments = parse("diff <(cat a) <(cat b)").unwrap();
    assert!(segments.iter().filter(|s| s.verb == "cat").count() == 2);
}

#[test]
fn lifts_interpreter_heredoc_body() {
    let command = "bash <<'EOF'\nrm -rf /\nEOF\n";
    let segments = parse(command).unwrap();
    assert!(segments.iter().any(|s| s.verb == "rm"));
}

#[test]
fn does_not_lift_heredoc_for_non_interpreter_verb() {
    let command = "cat <<'EOF'\nrm -rf /\nEOF\n";
    let segments = parse(command).unwrap();
    assert!(!segments.iter().any(|s| s.verb == "rm"));
}

#[test]
fn extracts_truncate_and_append_redirects() {
    let segments = parse("echo hi > out.txt").unwrap();
    assert_eq!(segments[0].verb, "echo");
    assert_eq!(segments[0].args, vec!["hi"]);
    assert_eq!(segments[0].redirects.len(), 1);
    assert_eq!(segments[0].redirects[0].target, "out.txt");

    let segments = parse("echo hi >> out.txt").unwrap();
    assert_eq!(segments[0].redirects[0].target, "out.txt");
}

#[test]
fn expands_tilde_in_args_but_not_verb() {
    let segments = parse("cat ~/.ssh/id_rsa").unwrap();
    assert_eq!(segments[0].verb, "cat");
    assert!(!segments[0].args[0].starts_with('~'));
    assert!(segments[0].args[0].ends_with("/.ssh/id_rsa"));
}

#[test]
fn rejects_commands_over_the_length_cap() {
    let huge = "a".repeat(MAX_COMMAND_LEN + 1);
    let err = parse(&huge).unwrap_err();
    assert_eq!(err.max, MAX_COMMAND_LEN);
    assert_eq!(err.actual, MAX_COMMAND_LEN + 1);
}

#[test]
fn empty_command_produces_no_segments() {
    let segments = parse("").unwrap();
    assert!(segments.is_empty());
}

#[test]
fn is_idempotent_on_a_safe_command() {
    let a = parse("ls -la").unwrap();
    let b = parse("ls -la").unwrap();
    assert_eq!(a, b);
}
