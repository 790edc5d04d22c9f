use thiserror::Error;

/// Failures raised by the content model and collection queries.
///
/// Both kinds signal a caller bug or malformed input rather than a transient
/// condition, so nothing in this crate retries or falls back on them.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ContentsError {
    /// A tolerance, index, delimiter, key or pattern the operation cannot accept.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A group-extraction scan never matched its own reference span.
    #[error("Reference content not found when searching for same {0}")]
    ReferenceNotFound(String),
}

impl ContentsError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        ContentsError::InvalidArgument(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, ContentsError>;
