use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use models::Role;

use super::errors::AuthError;

pub const ACCESS: &str = "access";
pub const RESET: &str = "reset";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub role: Role,
    pub typ: String,
    pub iat: i64,
    pub exp: i64,
}

/// HS256 signer/verifier for access and password-reset tokens.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenKeys {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn issue(&self, sub: Uuid, email: &str, role: Role, typ: &str, ttl: Duration) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub,
            email: email.to_string(),
            role,
            typ: typ.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::TokenError(e.to_string()))
    }

    /// Verify signature and expiry, then require the expected `typ`.
    pub fn verify(&self, token: &str, typ: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|_| AuthError::InvalidToken)?;
        if data.claims.typ != typ {
            return Err(AuthError::InvalidToken);
        }
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_token_round_trip() {
        let keys = TokenKeys::new("secret");
        let id = Uuid::new_v4();
        let tok = keys.issue(id, "a@b.c", Role::Technician, ACCESS, Duration::hours(1)).unwrap();
        let claims = keys.verify(&tok, ACCESS).unwrap();
        assert_eq!(claims.sub, id);
        assert_eq!(claims.role, Role::Technician);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn token_kinds_are_not_interchangeable() {
        let keys = TokenKeys::new("secret");
        let reset = keys.issue(Uuid::new_v4(), "a@b.c", Role::User, RESET, Duration::minutes(15)).unwrap();
        assert!(matches!(keys.verify(&reset, ACCESS), Err(AuthError::InvalidToken)));
        assert!(keys.verify(&reset, RESET).is_ok());
    }

    #[test]
    fn rejects_expired_and_foreign_tokens() {
        let keys = TokenKeys::new("secret");
        let expired = keys.issue(Uuid::new_v4(), "a@b.c", Role::User, ACCESS, Duration::hours(-1)).unwrap();
        assert!(keys.verify(&expired, ACCESS).is_err());

        let other = TokenKeys::new("other-secret");
        let tok = other.issue(Uuid::new_v4(), "a@b.c", Role::User, ACCESS, Duration::hours(1)).unwrap();
        assert!(keys.verify(&tok, ACCESS).is_err());
        assert!(keys.verify("not-a-jwt", ACCESS).is_err());
    }
}
