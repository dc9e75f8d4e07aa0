use thiserror::Error;

/// A positioned compile error: the full source text of the path expression,
/// the byte offset the compiler stopped at, and a human-readable description.
/// Evaluation never fails; this is the only error type in the crate.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("syntax error in path {path:?} at character {index}: {message}")]
pub struct SyntaxError {
    pub path: String,
    pub index: usize,
    pub message: String,
}

impl SyntaxError {
    pub(crate) fn new(path: &str, index: usize, message: impl Into<String>) -> Self {
        Self {
            path: path.to_string(),
            index,
            message: message.into(),
        }
    }
}
