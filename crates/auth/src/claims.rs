use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use storefront_core::UserId;

use crate::Role;

/// Which of the two tokens in a pair a JWT is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// JWT claims model.
///
/// `iat`/`exp` are serialized as unix seconds so standard JWT libraries can check them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject / user identifier.
    pub sub: UserId,

    /// Roles granted to the user when the token was issued.
    #[serde(default)]
    pub roles: Vec<Role>,

    pub kind: TokenKind,

    /// Unique token id.
    pub jti: Uuid,

    /// Issued-at timestamp.
    #[serde(with = "chrono::serde::ts_seconds")]
    pub iat: DateTime<Utc>,

    /// Expiration timestamp.
    #[serde(with = "chrono::serde::ts_seconds")]
    pub exp: DateTime<Utc>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,

    #[error("expected a {expected:?} token, got {found:?}")]
    WrongKind { expected: TokenKind, found: TokenKind },
}

/// Deterministically validate decoded claims.
///
/// Signature verification happens before this, in [`crate::TokenIssuer`].
pub fn validate_claims(
    claims: &JwtClaims,
    expected: TokenKind,
    now: DateTime<Utc>,
) -> Result<(), TokenValidationError> {
    if claims.kind != expected {
        return Err(TokenValidationError::WrongKind {
            expected,
            found: claims.kind,
        });
    }
    if claims.exp <= claims.iat {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < claims.iat {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.exp {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn claims(kind: TokenKind, iat: DateTime<Utc>, ttl_secs: i64) -> JwtClaims {
        JwtClaims {
            sub: UserId::new(1),
            roles: vec![Role::customer()],
            kind,
            jti: Uuid::now_v7(),
            iat,
            exp: iat + Duration::seconds(ttl_secs),
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn accepts_token_inside_window() {
        let c = claims(TokenKind::Access, t0(), 60);
        assert_eq!(validate_claims(&c, TokenKind::Access, t0() + Duration::seconds(30)), Ok(()));
    }

    #[test]
    fn rejects_expired_and_future_tokens() {
        let c = claims(TokenKind::Access, t0(), 60);
        assert_eq!(
            validate_claims(&c, TokenKind::Access, t0() + Duration::seconds(60)),
            Err(TokenValidationError::Expired)
        );
        assert_eq!(
            validate_claims(&c, TokenKind::Access, t0() - Duration::seconds(1)),
            Err(TokenValidationError::NotYetValid)
        );
    }

    #[test]
    fn rejects_inverted_window() {
        let c = claims(TokenKind::Refresh, t0(), 0);
        assert_eq!(
            validate_claims(&c, TokenKind::Refresh, t0()),
            Err(TokenValidationError::InvalidTimeWindow)
        );
    }

    #[test]
    fn refresh_token_is_not_an_access_token() {
        let c = claims(TokenKind::Refresh, t0(), 60);
        assert_eq!(
            validate_claims(&c, TokenKind::Access, t0()),
            Err(TokenValidationError::WrongKind {
                expected: TokenKind::Access,
                found: TokenKind::Refresh,
            })
        );
    }

    #[test]
    fn timestamps_serialize_as_unix_seconds() {
        let c = claims(TokenKind::Access, t0(), 60);
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["iat"], t0().timestamp());
        assert_eq!(json["exp"], t0().timestamp() + 60);
        assert_eq!(json["kind"], "access");
        assert_eq!(json["sub"], 1);
    }
}
