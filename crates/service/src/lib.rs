//! Service layer providing business-oriented operations on top of models.
//! - Separates business logic from data access and HTTP.
//! - Reuses validation and entity definitions in `models` crate.
//! - Provides clear error types and documented interfaces.

pub mod errors;
pub mod access;
pub mod auth;
pub mod views;
pub mod serde_ext;
pub mod department_service;
pub mod equipment_service;
pub mod team_service;
pub mod part_service;
pub mod request_service;
pub mod reports;
pub mod user_service;
#[cfg(test)]
pub mod test_support;
