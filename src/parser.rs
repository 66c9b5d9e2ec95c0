//! Shell command parser: turns a raw command string into an ordered list of
//! [`Segment`]s. Deliberately lossy — see `spec.md` §4.1 and §9 for the
//! boundaries of what this is allowed to get wrong.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::ParseError;
use crate::types::{Operator, Redirect, RedirectKind, Segment};

/// Hard cap on input length; anything longer is rejected before any parsing
/// work happens.
pub const MAX_COMMAND_LEN: usize = 10_000;

/// Verbs whose heredoc body is itself executable and therefore lifted as a
/// segment, rather than treated as inert here-doc text.
const INTERPRETER_VERBS: &[&str] = &[
    "bash", "sh", "zsh", "dash", "python", "python3", "node", "ruby", "perl",
];

static HEREDOC_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<<-?\s*(?:'([A-Za-z_][A-Za-z0-9_]*)'|"([A-Za-z_][A-Za-z0-9_]*)"|([A-Za-z_][A-Za-z0-9_]*))"#).unwrap());

static COMMAND_BOUNDARY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[;|&\n]").unwrap());

static HOME_DIR: LazyLock<Option<String>> =
    LazyLock::new(|| dirs::home_dir().map(|p| p.to_string_lossy().into_owned()));

/// Parse a raw command string into its segments.
///
/// The only failure mode is the length cap; everything else the grammar
/// can't make sense of degrades into a segment with a best-effort verb/args
/// split rather than an error.
pub fn parse(input: &str) -> Result<Vec<Segment>, ParseError> {
    let actual = input.chars().count();
    if actual > MAX_COMMAND_LEN {
        return Err(ParseError {
            max: MAX_COMMAND_LEN,
            actual,
        });
    }

    let lifted = lift_subshells(input);
    let raw_segments = split_operators(&lifted);

    let segments = raw_segments
        .into_iter()
        .enumerate()
        .map(|(position, (raw_segment, operator))| build_segment(raw_segment, operator, position))
        .collect();

    Ok(segments)
}

fn build_segment(raw_segment: String, operator: Option<Operator>, position: usize) -> Segment {
    let (body, redirects) = extract_redirects(&raw_segment);
    let mut tokens = tokenize(&body);

    if tokens.is_empty() {
        return Segment {
            verb: String::new(),
            args: Vec::new(),
            operator,
            redirects,
            raw_segment,
            position,
        };
    }

    let verb = tokens.remove(0);
    let args = tokens.iter().map(|t| expand_tilde(t)).collect();

    Segment {
        verb,
        args,
        operator,
        redirects,
        raw_segment,
        position,
    }
}

// ---------------------------------------------------------------------
// Subshell / backtick / process-substitution / heredoc lifting
// ---------------------------------------------------------------------

/// Recursively collects the bodies of `$()`, backticks, `<()`/`>()`, and
/// interpreter heredocs, then appends them to the input joined by `;` so
/// operator-splitting turns each into an ordinary segment.
fn lift_subshells(input: &str) -> String {
    let mut bodies = Vec::new();
    collect_bodies(input, &mut bodies);
    if bodies.is_empty() {
        return input.to_string();
    }
    format!("{input};{}", bodies.join(";"))
}

fn collect_bodies(text: &str, out: &mut Vec<String>) {
    for body in find_balanced(text, "$(") {
        out.push(body.clone());
        collect_bodies(&body, out);
    }
    for body in find_backticked(text) {
        out.push(body.clone());
        collect_bodies(&body, out);
    }
    for body in find_balanced(text, "<(") {
        out.push(body.clone());
        collect_bodies(&body, out);
    }
    for body in find_balanced(text, ">(") {
        out.push(body.clone());
        collect_bodies(&body, out);
    }
    for body in find_interpreter_heredocs(text) {
        out.push(body.clone());
        collect_bodies(&body, out);
    }
}

/// Finds non-overlapping occurrences of `prefix` (`"$("`, `"<("`, `">("`)
/// and returns the text between the matching balanced parenthesis.
fn find_balanced(text: &str, prefix: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let prefix_chars: Vec<char> = prefix.chars().collect();
    let n = chars.len();
    let plen = prefix_chars.len();
    let mut out = Vec::new();
    let mut i = 0usize;
    while i + plen <= n {
        if chars[i..i + plen] == prefix_chars[..] {
            let body_start = i + plen;
            let mut depth = 1i32;
            let mut j = body_start;
            while j < n && depth > 0 {
                match chars[j] {
                    '(' => depth += 1,
                    ')' => depth -= 1,
                    _ => {}
                }
                j += 1;
            }
            if depth == 0 {
                let body_end = j - 1;
                out.push(chars[body_start..body_end].iter().collect());
                i = j;
                continue;
            } else {
                // unbalanced: take the rest of the string as the body.
                out.push(chars[body_start..n].iter().collect());
                break;
            }
        }
        i += 1;
    }
    out
}

fn find_backticked(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let n = chars.len();
    let mut out = Vec::new();
    let mut i = 0usize;
    while i < n {
        if chars[i] == '`' {
            if let Some(end_offset) = chars[i + 1..].iter().position(|&c| c == '`') {
                let end = i + 1 + end_offset;
                out.push(chars[i + 1..end].iter().collect());
                i = end + 1;
                continue;
            } else {
                break;
            }
        }
        i += 1;
    }
    out
}

/// Finds heredoc bodies whose introducing verb is in [`INTERPRETER_VERBS`].
fn find_interpreter_heredocs(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    for m in HEREDOC_MARKER.find_iter(text) {
        let delim = HEREDOC_MARKER
            .captures(&text[m.start()..m.end()])
            .and_then(|c| c.get(1).or_else(|| c.get(2)).or_else(|| c.get(3)))
            .map(|g| g.as_str().to_string());
        let Some(delim) = delim else { continue };

        let preceding = &text[..m.start()];
        let boundary = COMMAND_BOUNDARY
            .find_iter(preceding)
            .last()
            .map(|b| b.end())
            .unwrap_or(0);
        let verb = preceding[boundary..].split_whitespace().next().unwrap_or("");

        if !INTERPRETER_VERBS.contains(&verb) {
            continue;
        }

        let Some(newline_offset) = text[m.end()..].find('\n') else {
            continue;
        };
        let body_start = m.end() + newline_offset + 1;

        let mut cursor = body_start;
        let mut body_end = text.len();
        let mut found = false;
        for line in text[body_start..].split('\n') {
            let line_end = cursor + line.len();
            if line.trim() == delim {
                body_end = cursor;
                found = true;
                break;
            }
            cursor = line_end + 1;
        }
        if found && body_end > body_start {
            out.push(text[body_start..body_end].to_string());
        } else if found {
            out.push(String::new());
        }
    }
    out
}

// ---------------------------------------------------------------------
// Operator splitting
// ---------------------------------------------------------------------

/// Splits on unquoted `&&`, `||`, `|`, `;`, discarding empty segments.
fn split_operators(s: &str) -> Vec<(String, Option<Operator>)> {
    let chars: Vec<char> = s.chars().collect();
    let n = chars.len();
    let mut segments = Vec::new();
    let mut seg_start = 0usize;
    let mut i = 0usize;
    let mut in_single = false;
    let mut in_double = false;
    let mut escaped = false;

    let mut push = |start: usize, end: usize, op: Operator, segments: &mut Vec<(String, Option<Operator>)>| {
        let text: String = chars[start..end].iter().collect();
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            segments.push((trimmed.to_string(), Some(op)));
        }
    };

    while i < n {
        let c = chars[i];
        if escaped {
            escaped = false;
            i += 1;
            continue;
        }
        if c == '\\' && !in_single {
            escaped = true;
            i += 1;
            continue;
        }
        if c == '\'' && !in_double {
            in_single = !in_single;
            i += 1;
            continue;
        }
        if c == '"' && !in_single {
            in_double = !in_double;
            i += 1;
            continue;
        }
        if !in_single && !in_double {
            if c == '&' && i + 1 < n && chars[i + 1] == '&' {
                push(seg_start, i, Operator::And, &mut segments);
                i += 2;
                seg_start = i;
                continue;
            }
            if c == '|' && i + 1 < n && chars[i + 1] == '|' {
                push(seg_start, i, Operator::Or, &mut segments);
                i += 2;
                seg_start = i;
                continue;
            }
            if c == '|' {
                push(seg_start, i, Operator::Pipe, &mut segments);
                i += 1;
                seg_start = i;
                continue;
            }
            if c == ';' {
                push(seg_start, i, Operator::Semicolon, &mut segments);
                i += 1;
                seg_start = i;
                continue;
            }
        }
        i += 1;
    }

    let tail: String = chars[seg_start..n].iter().collect();
    let trimmed = tail.trim();
    if !trimmed.is_empty() {
        segments.push((trimmed.to_string(), None));
    }
    segments
}

// ---------------------------------------------------------------------
// Redirect extraction
// ---------------------------------------------------------------------

/// Strips unquoted `>`/`>>` plus their target from a segment body, returning
/// the stripped body and the extracted [`Redirect`]s in source order.
fn extract_redirects(body: &str) -> (String, Vec<Redirect>) {
    let chars: Vec<char> = body.chars().collect();
    let n = chars.len();
    let mut redirects = Vec::new();
    let mut remove_ranges: Vec<(usize, usize)> = Vec::new();

    let mut i = 0usize;
    let mut in_single = false;
    let mut in_double = false;
    let mut escaped = false;

    while i < n {
        let c = chars[i];
        if escaped {
            escaped = false;
            i += 1;
            continue;
        }
        if c == '\\' && !in_single {
            escaped = true;
            i += 1;
            continue;
        }
        if c == '\'' && !in_double {
            in_single = !in_single;
            i += 1;
            continue;
        }
        if c == '"' && !in_single {
            in_double = !in_double;
            i += 1;
            continue;
        }
        if !in_single && !in_double && c == '>' {
            let redirect_start = i;
            let kind = if i + 1 < n && chars[i + 1] == '>' {
                i += 2;
                RedirectKind::Append
            } else {
                i += 1;
                RedirectKind::Truncate
            };
            while i < n && chars[i].is_whitespace() {
                i += 1;
            }
            let target_start = i;
            let mut t_single = false;
            let mut t_double = false;
            let mut t_escaped = false;
            while i < n {
                let tc = chars[i];
                if t_escaped {
                    t_escaped = false;
                    i += 1;
                    continue;
                }
                if tc == '\\' && !t_single {
                    t_escaped = true;
                    i += 1;
                    continue;
                }
                if tc == '\'' && !t_double {
                    t_single = !t_single;
                    i += 1;
                    continue;
                }
                if tc == '"' && !t_single {
                    t_double = !t_double;
                    i += 1;
                    continue;
                }
                if !t_single && !t_double && tc.is_whitespace() {
                    break;
                }
                i += 1;
            }
            let target_end = i;
            let raw_target: String = chars[target_start..target_end].iter().collect();
            if !raw_target.is_empty() {
                let target = expand_tilde(&unquote_word(&raw_target));
                redirects.push(Redirect { kind, target });
                remove_ranges.push((redirect_start, target_end));
            }
            continue;
        }
        i += 1;
    }

    let mut result = String::new();
    let mut idx = 0usize;
    for (start, end) in &remove_ranges {
        if idx < *start {
            result.extend(&chars[idx..*start]);
        }
        idx = *end;
    }
    if idx < n {
        result.extend(&chars[idx..n]);
    }

    (result, redirects)
}

// ---------------------------------------------------------------------
// Tokenization
// ---------------------------------------------------------------------

/// Whitespace-splits `body` into tokens, stripping quote characters and
/// honoring backslash escapes outside single quotes.
fn tokenize(body: &str) -> Vec<String> {
    let chars: Vec<char> = body.chars().collect();
    let n = chars.len();
    let mut tokens = Vec::new();
    let mut i = 0usize;

    while i < n {
        while i < n && chars[i].is_whitespace() {
            i += 1;
        }
        if i >= n {
            break;
        }
        let mut word = String::new();
        let mut in_single = false;
        let mut in_double = false;
        let mut escaped = false;
        while i < n {
            let c = chars[i];
            if escaped {
                word.push(c);
                escaped = false;
                i += 1;
                continue;
            }
            if c == '\\' && !in_single {
                escaped = true;
                i += 1;
                continue;
            }
            if c == '\'' && !in_double {
                in_single = !in_single;
                i += 1;
                continue;
            }
            if c == '"' && !in_single {
                in_double = !in_double;
                i += 1;
                continue;
            }
            if !in_single && !in_double && c.is_whitespace() {
                break;
            }
            word.push(c);
            i += 1;
        }
        tokens.push(word);
    }
    tokens
}

fn unquote_word(raw: &str) -> String {
    tokenize(raw).into_iter().next().unwrap_or_default()
}

fn expand_tilde(s: &str) -> String {
    match HOME_DIR.as_ref() {
        Some(home) => {
            if s == "~" {
                home.clone()
            } else if let Some(rest) = s.strip_prefix("~/") {
                format!("{home}/{rest}")
            } else {
                s.to_string()
            }
        }
        None => s.to_string(),
    }
}
