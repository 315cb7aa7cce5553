//! SeaORM entities for the maintenance tracker plus entity-level validation.

pub mod errors;
pub mod db;
pub mod enums;
pub mod department;
pub mod maintenance_team;
pub mod user;
pub mod user_credentials;
pub mod equipment;
pub mod part;
pub mod maintenance_request;

pub use enums::{EquipmentCategory, EquipmentStatus, Priority, RequestStatus, RequestType, Role};
