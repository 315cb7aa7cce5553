//! Auth module: three-layer architecture (domain, repository, service).
//!
//! Registration, e-mail verification, login, password reset and JWT handling
//! live here; the HTTP layer only maps inputs and errors.

pub mod domain;
pub mod errors;
pub mod mailer;
pub mod repository;
pub mod service;
pub mod repo;
pub mod token;

pub use service::{AuthService, AuthSettings};
