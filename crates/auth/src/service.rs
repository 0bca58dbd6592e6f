use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use storefront_core::{DomainError, DomainResult, StoreError, UserId};

use crate::password::{hash_password, verify_password};
use crate::{NewUser, Role, TokenError, TokenIssuer, TokenKind, User, UserGateway, DEFAULT_AVATAR_PATH};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegisterInput {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Public projection of a user returned alongside tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub id: UserId,
    pub email: String,
    pub is_admin: bool,
}

impl From<&User> for AuthUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            is_admin: user.is_admin,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: AuthUser,
    pub access_token: String,
    pub refresh_token: String,
}

/// Registration, login and token refresh over a [`UserGateway`].
#[derive(Debug, Clone)]
pub struct AuthService<U> {
    users: U,
    tokens: TokenIssuer,
    /// Emails that are registered with the admin flag set.
    admin_emails: Vec<String>,
}

impl<U: UserGateway> AuthService<U> {
    pub fn new(users: U, tokens: TokenIssuer) -> Self {
        Self {
            users,
            tokens,
            admin_emails: Vec::new(),
        }
    }

    pub fn with_admin_emails<I, S>(mut self, emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.admin_emails = emails
            .into_iter()
            .map(|e| e.as_ref().trim().to_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        self
    }

    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    #[instrument(skip_all, fields(email = %input.email))]
    pub async fn register(&self, input: RegisterInput) -> DomainResult<AuthResponse> {
        let email = normalize_email(&input.email)?;
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(DomainError::conflict("User already exists"));
        }

        let name = input
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| default_name(&email));

        let is_admin = self.admin_emails.contains(&email);
        let new_user = NewUser {
            email,
            password_hash: hash_password(&input.password)?,
            name,
            avatar_path: DEFAULT_AVATAR_PATH.to_string(),
            phone: String::new(),
            is_admin,
        };

        let user = match self.users.insert(new_user).await {
            Ok(user) => user,
            // Lost a race against a concurrent registration with the same email.
            Err(StoreError::Constraint(_)) => {
                return Err(DomainError::conflict("User already exists"));
            }
            Err(e) => return Err(e.into()),
        };
        info!(user_id = %user.id, "user registered");
        self.respond(&user)
    }

    #[instrument(skip_all, fields(email = %input.email))]
    pub async fn login(&self, input: LoginInput) -> DomainResult<AuthResponse> {
        let user = self.validate_user(&input).await?;
        self.respond(&user)
    }

    /// Exchange a refresh token for a fresh pair.
    #[instrument(skip_all)]
    pub async fn get_new_tokens(&self, refresh_token: &str) -> DomainResult<AuthResponse> {
        self.get_new_tokens_at(refresh_token, Utc::now()).await
    }

    pub async fn get_new_tokens_at(
        &self,
        refresh_token: &str,
        now: DateTime<Utc>,
    ) -> DomainResult<AuthResponse> {
        let claims = self
            .tokens
            .verify(refresh_token, TokenKind::Refresh, now)
            .map_err(|e| {
                warn!(error = %e, "refresh token rejected");
                DomainError::unauthorized("Invalid refresh token")
            })?;

        let user = self
            .users
            .find_by_id(claims.sub)
            .await?
            .ok_or_else(|| DomainError::not_found("User not found"))?;
        self.respond(&user)
    }

    async fn validate_user(&self, input: &LoginInput) -> DomainResult<User> {
        let email = normalize_email(&input.email)?;
        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or_else(|| DomainError::not_found("User not found"))?;

        if !verify_password(&input.password, &user.password_hash)? {
            return Err(DomainError::unauthorized("Invalid password"));
        }
        Ok(user)
    }

    fn respond(&self, user: &User) -> DomainResult<AuthResponse> {
        let pair = self
            .tokens
            .issue_pair(user.id, &Role::for_account(user.is_admin))
            .map_err(|e: TokenError| DomainError::internal(e.to_string()))?;
        Ok(AuthResponse {
            user: AuthUser::from(user),
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
        })
    }
}

fn normalize_email(raw: &str) -> DomainResult<String> {
    let email = raw.trim().to_lowercase();
    if email.is_empty() {
        return Err(DomainError::validation("email cannot be empty"));
    }
    Ok(email)
}

fn default_name(email: &str) -> String {
    email.split('@').next().unwrap_or(email).to_string()
}
