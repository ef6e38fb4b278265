use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Role, User};
use crate::utils::AppError;

/// Name of the HTTP-only cookie carrying the session token.
pub const SESSION_COOKIE: &str = "token";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub name: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// Signs and checks HS256 session tokens.
#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl SessionKeys {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn issue(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id,
            name: user.name.clone(),
            role: user.role,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::InternalServerError(format!("token signing failed: {e}")))
    }

    pub fn validate(&self, token: &str) -> Result<Claims, AppError> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "Rejected session token");
                AppError::AuthError("Invalid or expired session".to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> User {
        User {
            id: Uuid::new_v4(),
            name: "Grace".to_string(),
            email: "grace@example.com".to_string(),
            password_hash: String::new(),
            role,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_issue_and_validate() {
        let keys = SessionKeys::new("test-secret", Duration::hours(1));
        let user = user(Role::Organizer);

        let token = keys.issue(&user).unwrap();
        let claims = keys.validate(&token).unwrap();

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.role, Role::Organizer);
        assert_eq!(claims.name, "Grace");
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let issuer = SessionKeys::new("secret-a", Duration::hours(1));
        let verifier = SessionKeys::new("secret-b", Duration::hours(1));

        let token = issuer.issue(&user(Role::Attendee)).unwrap();
        assert!(matches!(
            verifier.validate(&token),
            Err(AppError::AuthError(_))
        ));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        // Past the default 60s leeway
        let keys = SessionKeys::new("test-secret", Duration::minutes(-5));
        let token = keys.issue(&user(Role::Attendee)).unwrap();
        assert!(keys.validate(&token).is_err());
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        let keys = SessionKeys::new("test-secret", Duration::hours(1));
        assert!(keys.validate("not.a.jwt").is_err());
    }
}
