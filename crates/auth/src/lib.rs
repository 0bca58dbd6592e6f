//! `storefront-auth`: authentication and authorization boundary.
//!
//! This crate is decoupled from HTTP and storage: users are reached through
//! [`UserGateway`], tokens are plain strings.

pub mod authorize;
pub mod claims;
pub mod password;
pub mod roles;
pub mod service;
pub mod tokens;
pub mod user;

pub use authorize::{AuthzError, require_role};
pub use claims::{JwtClaims, TokenKind, TokenValidationError, validate_claims};
pub use roles::Role;
pub use service::{AuthResponse, AuthService, AuthUser, LoginInput, RegisterInput};
pub use tokens::{TokenError, TokenIssuer, TokenPair};
pub use user::{NewUser, User, UserGateway, DEFAULT_AVATAR_PATH};
