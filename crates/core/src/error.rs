//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// missing references, stock invariants, conflicts). Infrastructure concerns
/// belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// An input field failed validation (e.g. empty or over-long name).
    #[error("{message}")]
    Validation { field: String, message: String },

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// No group is registered under the given share token.
    #[error("group not found")]
    GroupNotFound,

    /// The referenced child does not exist.
    #[error("child not found")]
    ChildNotFound,

    /// A requested resource was not found.
    #[error("not found")]
    NotFound,

    /// The referenced clothing category does not exist.
    #[error("invalid clothing category: {0}")]
    InvalidCategory(i64),

    /// A decrement would drive the stock count below zero.
    #[error("insufficient stock: {available} available, {requested} requested")]
    InsufficientStock { available: i64, requested: i64 },

    /// A conflict occurred (e.g. duplicate share token, lost update race).
    #[error("conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    /// Whether this error means "the addressed resource does not exist".
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::InvalidId(_)
                | Self::GroupNotFound
                | Self::ChildNotFound
                | Self::NotFound
                | Self::InvalidCategory(_)
        )
    }
}
