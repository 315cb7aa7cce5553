use thiserror::Error;

use crate::errors::ServiceError;

/// Business errors for auth workflows
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("user already exists")]
    Conflict,
    #[error("user not found")]
    NotFound,
    #[error("invalid credentials")]
    Unauthorized,
    #[error("{0}")]
    Forbidden(String),
    #[error("invalid or expired token")]
    InvalidToken,
    #[error("hashing error: {0}")]
    HashError(String),
    #[error("token error: {0}")]
    TokenError(String),
    #[error("mail error: {0}")]
    Mail(String),
    #[error("repository error: {0}")]
    Repository(String),
}

impl AuthError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            AuthError::Validation(_) => 1001,
            AuthError::Conflict => 1002,
            AuthError::NotFound => 1003,
            AuthError::Unauthorized => 1004,
            AuthError::Forbidden(_) => 1005,
            AuthError::InvalidToken => 1006,
            AuthError::HashError(_) => 1101,
            AuthError::TokenError(_) => 1102,
            AuthError::Mail(_) => 1103,
            AuthError::Repository(_) => 1200,
        }
    }
}

impl From<AuthError> for ServiceError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Validation(msg) => ServiceError::Validation(msg),
            AuthError::Conflict => ServiceError::Conflict("user with this email already exists".into()),
            AuthError::NotFound => ServiceError::not_found("user"),
            AuthError::Unauthorized => ServiceError::Unauthorized("invalid email or password".into()),
            AuthError::InvalidToken => ServiceError::Unauthorized("invalid or expired token".into()),
            AuthError::Forbidden(msg) => ServiceError::Forbidden(msg),
            other => ServiceError::Db(format!("auth error {}: {}", other.code(), other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(AuthError::Conflict.code(), 1002);
        assert_eq!(AuthError::Repository("x".into()).code(), 1200);
    }

    #[test]
    fn maps_to_service_errors() {
        assert!(matches!(ServiceError::from(AuthError::Conflict), ServiceError::Conflict(_)));
        assert!(matches!(ServiceError::from(AuthError::InvalidToken), ServiceError::Unauthorized(_)));
        assert!(matches!(ServiceError::from(AuthError::Forbidden("no".into())), ServiceError::Forbidden(_)));
        assert!(matches!(ServiceError::from(AuthError::HashError("x".into())), ServiceError::Db(_)));
    }
}
