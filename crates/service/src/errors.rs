use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

use models::errors::ModelError;
use models::RequestStatus;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("invalid status transition from {from} to {to}")]
    InvalidTransition {
        from: RequestStatus,
        to: RequestStatus,
        allowed: Vec<RequestStatus>,
    },
    #[error("database error: {0}")]
    Db(String),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }

    pub fn forbidden(msg: impl Into<String>) -> Self { Self::Forbidden(msg.into()) }

    /// Replace the driver's wording of a unique violation with a domain message.
    pub fn conflict_as(self, msg: &str) -> Self {
        match self {
            Self::Conflict(_) => Self::Conflict(msg.to_string()),
            other => other,
        }
    }
}

impl From<DbErr> for ServiceError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(msg)) => return Self::Conflict(msg),
            Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
                return Self::Validation("invalid reference to related record".into())
            }
            _ => {}
        }
        match err {
            DbErr::RecordNotFound(msg) => Self::NotFound(msg),
            other => Self::Db(other.to_string()),
        }
    }
}

impl From<ModelError> for ServiceError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::Validation(msg) => Self::Validation(msg),
            ModelError::Db(e) => Self::from(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_validation_becomes_validation() {
        let err: ServiceError = ModelError::validation("name required").into();
        assert!(matches!(err, ServiceError::Validation(m) if m == "name required"));
    }

    #[test]
    fn record_not_found_becomes_not_found() {
        let err: ServiceError = DbErr::RecordNotFound("equipment".into()).into();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[test]
    fn conflict_message_can_be_replaced() {
        let err = ServiceError::Conflict("UNIQUE constraint failed".into()).conflict_as("sku already exists");
        assert_eq!(err.to_string(), "conflict: sku already exists");
        let other = ServiceError::not_found("part").conflict_as("ignored");
        assert!(matches!(other, ServiceError::NotFound(_)));
    }
}
