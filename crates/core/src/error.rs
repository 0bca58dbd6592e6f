//! Domain and store error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Failure reported by a persistence gateway.
///
/// These are propagated unmodified through the services; the HTTP layer decides
/// how they surface.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The addressed row does not exist.
    #[error("record not found")]
    NotFound,

    /// A schema constraint rejected the write (unique slug, foreign key, ...).
    #[error("constraint violation: {0}")]
    Constraint(String),

    /// The backend failed (connection, protocol, row decoding).
    #[error("store backend failure: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn constraint(msg: impl Into<String>) -> Self {
        Self::Constraint(msg.into())
    }

    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures. Store failures are
/// wrapped as-is in [`DomainError::Store`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A requested resource was not found.
    #[error("{0}")]
    NotFound(String),

    /// The request conflicts with existing state (e.g. duplicate user).
    #[error("{0}")]
    Conflict(String),

    /// Credentials or token were rejected.
    #[error("{0}")]
    Unauthorized(String),

    /// The principal lacks the role required for the operation.
    #[error("{0}")]
    Forbidden(String),

    /// Unexpected failure outside the store (hashing, token signing, ...).
    #[error("internal error: {0}")]
    Internal(String),

    /// Error raised by the persistence gateway.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// True for both the domain-level and the store-level not-found signal.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::Store(StoreError::NotFound))
    }
}
