use thiserror::Error;

use storefront_core::DomainError;

use crate::Role;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: missing role '{0}'")]
    Forbidden(String),
}

impl From<AuthzError> for DomainError {
    fn from(err: AuthzError) -> Self {
        DomainError::forbidden(err.to_string())
    }
}

/// Check that a principal holds `required`.
///
/// - No IO
/// - No panics
/// - No business logic (pure policy check)
pub fn require_role(granted: &[Role], required: &Role) -> Result<(), AuthzError> {
    if granted.iter().any(|r| r == required) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(required.as_str().to_string()))
    }
}
