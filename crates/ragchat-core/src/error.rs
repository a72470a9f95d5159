//! Error type shared by every core operation.
//!
//! Variants fall into four groups, reported by [`RagError::kind`]:
//!
//! | Kind | Variants | Caller action |
//! |------|----------|---------------|
//! | validation | `EmptyId`, `EmptyText`, `EmptyQuery`, `InvalidK`, `DimensionMismatch`, `CapacityExceeded`, `InvalidOptions` | fix the request |
//! | conflict | `DuplicateId` | pick another id |
//! | not found | `NotFound`, `PositionOutOfRange` | none, recoverable |
//! | upstream | `Embedding`, `Generation` | retry later |
//! | internal | `Inconsistent` | server-side bug |
//!
//! Validation and conflict errors are always raised before the content
//! store is touched.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RagError>;

#[derive(Debug, Error)]
pub enum RagError {
    #[error("id must not be empty")]
    EmptyId,

    #[error("text must not be empty")]
    EmptyText,

    #[error("query must not be empty")]
    EmptyQuery,

    #[error("k must be >= 1 (got {0})")]
    InvalidK(usize),

    #[error("vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("content store is full ({capacity} documents)")]
    CapacityExceeded { capacity: usize },

    #[error("invalid generation options: {0}")]
    InvalidOptions(String),

    #[error("document id already exists: {0}")]
    DuplicateId(String),

    #[error("document not found: {0}")]
    NotFound(String),

    #[error("position {position} out of range (store holds {size})")]
    PositionOutOfRange { position: usize, size: usize },

    #[error("embedding failed: {0:#}")]
    Embedding(anyhow::Error),

    #[error("generation failed: {0:#}")]
    Generation(anyhow::Error),

    #[error("content store out of sync: {vectors} vectors, {documents} documents")]
    Inconsistent { vectors: usize, documents: usize },
}

/// Coarse classification used by front-ends to pick a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Conflict,
    NotFound,
    Upstream,
    Internal,
}

impl RagError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RagError::EmptyId
            | RagError::EmptyText
            | RagError::EmptyQuery
            | RagError::InvalidK(_)
            | RagError::DimensionMismatch { .. }
            | RagError::CapacityExceeded { .. }
            | RagError::InvalidOptions(_) => ErrorKind::Validation,
            RagError::DuplicateId(_) => ErrorKind::Conflict,
            RagError::NotFound(_) | RagError::PositionOutOfRange { .. } => ErrorKind::NotFound,
            RagError::Embedding(_) | RagError::Generation(_) => ErrorKind::Upstream,
            RagError::Inconsistent { .. } => ErrorKind::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(RagError::EmptyText.kind(), ErrorKind::Validation);
        assert_eq!(RagError::InvalidK(0).kind(), ErrorKind::Validation);
        assert_eq!(
            RagError::DuplicateId("a".into()).kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            RagError::PositionOutOfRange { position: 3, size: 1 }.kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            RagError::Embedding(anyhow::anyhow!("boom")).kind(),
            ErrorKind::Upstream
        );
        assert_eq!(
            RagError::Inconsistent {
                vectors: 2,
                documents: 1
            }
            .kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn test_upstream_message_includes_cause_chain() {
        let err = RagError::Embedding(anyhow::anyhow!("connection refused").context("ollama"));
        let msg = err.to_string();
        assert!(msg.contains("ollama"), "{}", msg);
        assert!(msg.contains("connection refused"), "{}", msg);
    }
}
