use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("uid contains an embedded newline at byte {0}")]
    EmbeddedNewline(usize),
}
