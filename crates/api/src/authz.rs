//! API-side authorization guard for catalog writes.
//!
//! Handlers call this before touching a service, keeping the services auth-agnostic.

use storefront_auth::{AuthzError, Role, require_role};

use crate::context::PrincipalContext;

/// Catalog and category writes are reserved to the `admin` role.
pub fn authorize_admin(principal: &PrincipalContext) -> Result<(), AuthzError> {
    require_role(principal.roles(), &Role::admin())
}
