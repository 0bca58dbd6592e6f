//! User accounts and the gateway the auth service stores them through.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

use storefront_core::{Entity, StoreError, UserId};

pub const DEFAULT_AVATAR_PATH: &str = "/uploads/default-avatar.png";

/// Stored user account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Unique, stored lowercased.
    pub email: String,
    /// Argon2 PHC string; never leaves the auth crate in a response.
    pub password_hash: String,
    pub name: String,
    pub avatar_path: String,
    pub phone: String,
    pub is_admin: bool,
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> UserId {
        self.id
    }
}

/// Fields supplied when a user is created; the store assigns id and timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub avatar_path: String,
    pub phone: String,
    pub is_admin: bool,
}

#[async_trait]
pub trait UserGateway: Send + Sync {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Fails with `StoreError::Constraint` when the email is taken.
    async fn insert(&self, user: NewUser) -> Result<User, StoreError>;
}

#[async_trait]
impl<S> UserGateway for Arc<S>
where
    S: UserGateway + ?Sized,
{
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        (**self).find_by_id(id).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        (**self).find_by_email(email).await
    }

    async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
        (**self).insert(user).await
    }
}
