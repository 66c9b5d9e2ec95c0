//! Error types for the analysis pipeline.
//!
//! Per §7 of the spec there are exactly two error classes: a single fatal
//! [`ParseError`] raised only by the 10,000-character cap, and oracle
//! degradation, which is never an exception — it is folded into
//! [`crate::types::AnalyzerResult::partial`] and a medium [`crate::types::Finding`].

/// The only fatal error the core can raise: the command string exceeded the
/// parser's length cap.
#[derive(Debug, Clone, thiserror::Error)]
#[error("command exceeds maximum length of {max} characters (got {actual})")]
pub struct ParseError {
    pub max: usize,
    pub actual: usize,
}
