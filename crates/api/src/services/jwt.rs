//! Stateless bearer token issuing and verification.
//!
//! Tokens are HS256 JWTs carrying the account id, email and role. Nothing
//! here touches the database; the denylist check for logged-out tokens
//! happens in the auth extractor against `invalidated_tokens`.

use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use orchard_core::{Role, UserId};

use crate::models::User;

/// Errors from token verification or issuance.
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// The token's expiry has passed.
    #[error("token expired")]
    Expired,

    /// The token is malformed, has a bad signature, or wrong algorithm.
    #[error("invalid token")]
    Invalid,
}

impl From<jsonwebtoken::errors::Error> for JwtError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => Self::Expired,
            _ => Self::Invalid,
        }
    }
}

/// The claims Orchard embeds in every token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Account id.
    pub sub: UserId,
    /// Account email at issue time.
    pub email: String,
    /// Role claim checked by the route guards.
    pub role: Role,
    /// Issued-at, seconds since epoch.
    pub iat: i64,
    /// Expiry, seconds since epoch.
    pub exp: i64,
    /// Unique token id, so two tokens for the same user issued in the same
    /// second still differ (the denylist keys on the full token string).
    pub jti: Uuid,
}

impl Claims {
    /// Expiry as a UTC timestamp.
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0)
            .single()
            .unwrap_or_else(Utc::now)
    }
}

/// A freshly issued token with its expiry.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub role: Role,
}

/// JWT signing/verification service.
#[derive(Clone)]
pub struct JwtService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: u64,
}

impl JwtService {
    /// Create a service from the configured signing secret and token TTL.
    #[must_use]
    pub fn new(secret: &SecretString, ttl_secs: u64) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
            ttl_secs,
        }
    }

    /// Issue a token for `user`, valid for the configured TTL.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::Invalid` if encoding fails.
    pub fn issue(&self, user: &User) -> Result<IssuedToken, JwtError> {
        let now = Utc::now();
        let exp = now + chrono::Duration::seconds(i64::try_from(self.ttl_secs).unwrap_or(3600));

        let claims = Claims {
            sub: user.id,
            email: user.email.as_str().to_owned(),
            role: user.role,
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4(),
        };

        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;

        Ok(IssuedToken {
            token,
            expires_at: claims.expires_at(),
            role: user.role,
        })
    }

    /// Verify a token's signature and expiry and return its claims.
    ///
    /// # Errors
    ///
    /// Returns [`JwtError::Expired`] past the expiry and [`JwtError::Invalid`]
    /// for anything else that fails validation.
    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &validation)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use orchard_core::{Email, Stamp};

    fn secret() -> SecretString {
        SecretString::from("kE9#vQ2mXz7@pLw4nRt8$yUj3fHb6Gd1")
    }

    fn test_user(role: Role) -> User {
        User {
            id: UserId::generate(),
            email: Email::parse("shopper@example.com").unwrap(),
            is_active: true,
            role,
            stamp: Stamp::new(Utc::now()),
        }
    }

    #[test]
    fn test_issue_verify_round_trip() {
        let jwt = JwtService::new(&secret(), 3600);
        let user = test_user(Role::User);

        let issued = jwt.issue(&user).unwrap();
        let claims = jwt.verify(&issued.token).unwrap();

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, "shopper@example.com");
        assert_eq!(claims.role, Role::User);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_role_claim_survives() {
        let jwt = JwtService::new(&secret(), 3600);
        let issued = jwt.issue(&test_user(Role::Admin)).unwrap();
        assert_eq!(jwt.verify(&issued.token).unwrap().role, Role::Admin);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let jwt = JwtService::new(&secret(), 3600);
        let other = JwtService::new(
            &SecretString::from("zW5!bN8qTc2#mVx9kJf4$hRp7dGy1Ls6"),
            3600,
        );

        let issued = jwt.issue(&test_user(Role::User)).unwrap();
        assert!(matches!(other.verify(&issued.token), Err(JwtError::Invalid)));
    }

    #[test]
    fn test_tampered_token_rejected() {
        let jwt = JwtService::new(&secret(), 3600);
        let issued = jwt.issue(&test_user(Role::User)).unwrap();

        let mut tampered = issued.token;
        tampered.pop();
        tampered.push('A');
        assert!(jwt.verify(&tampered).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let jwt = JwtService::new(&secret(), 0);
        let issued = jwt.issue(&test_user(Role::User)).unwrap();

        std::thread::sleep(std::time::Duration::from_millis(1100));
        assert!(matches!(jwt.verify(&issued.token), Err(JwtError::Expired)));
    }

    #[test]
    fn test_two_tokens_differ() {
        let jwt = JwtService::new(&secret(), 3600);
        let user = test_user(Role::User);
        let a = jwt.issue(&user).unwrap();
        let b = jwt.issue(&user).unwrap();
        assert_ne!(a.token, b.token);
    }
}
