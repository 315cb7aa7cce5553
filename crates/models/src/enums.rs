//! Closed value sets stored as upper-case strings.
//!
//! Columns keep the plain `String` representation so the schema stays portable
//! between PostgreSQL and SQLite; these types are the parsed view of them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self { $($name::$variant => $text),+ }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(ModelError::Validation(format!(
                        "invalid {}: {}", stringify!($name), other
                    ))),
                }
            }
        }
    };
}

string_enum!(
    /// Account role, from most to least privileged.
    Role {
        Admin => "ADMIN",
        Manager => "MANAGER",
        Technician => "TECHNICIAN",
        User => "USER",
    }
);

string_enum!(EquipmentCategory {
    Machinery => "MACHINERY",
    Vehicle => "VEHICLE",
    Computer => "COMPUTER",
    Hvac => "HVAC",
    Electrical => "ELECTRICAL",
    Plumbing => "PLUMBING",
    Other => "OTHER",
});

string_enum!(EquipmentStatus {
    Active => "ACTIVE",
    Inactive => "INACTIVE",
    Scrapped => "SCRAPPED",
});

string_enum!(RequestType {
    Corrective => "CORRECTIVE",
    Preventive => "PREVENTIVE",
});

string_enum!(Priority {
    Low => "LOW",
    Medium => "MEDIUM",
    High => "HIGH",
    Urgent => "URGENT",
});

string_enum!(
    /// Workflow position of a maintenance request. `ALL` is in workflow order.
    RequestStatus {
        New => "NEW",
        InProgress => "IN_PROGRESS",
        Repaired => "REPAIRED",
        Scrap => "SCRAP",
    }
);

impl Default for Role {
    fn default() -> Self { Role::User }
}

impl Default for Priority {
    fn default() -> Self { Priority::Medium }
}

impl Role {
    /// ADMIN and MANAGER accounts are provisioned, never self-registered.
    pub fn is_privileged(&self) -> bool {
        matches!(self, Role::Admin | Role::Manager)
    }
}

impl RequestStatus {
    pub fn allowed_transitions(&self) -> &'static [RequestStatus] {
        match self {
            RequestStatus::New => &[RequestStatus::InProgress],
            RequestStatus::InProgress => &[RequestStatus::Repaired, RequestStatus::Scrap],
            RequestStatus::Repaired | RequestStatus::Scrap => &[],
        }
    }

    pub fn can_transition_to(&self, next: RequestStatus) -> bool {
        self.allowed_transitions().contains(&next)
    }

    pub fn is_terminal(&self) -> bool {
        self.allowed_transitions().is_empty()
    }

    /// Open requests still need work and count towards the equipment badge.
    pub fn is_open(&self) -> bool {
        matches!(self, RequestStatus::New | RequestStatus::InProgress)
    }

    pub fn open() -> [RequestStatus; 2] {
        [RequestStatus::New, RequestStatus::InProgress]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workflow_graph_matches_lifecycle() {
        use RequestStatus::*;
        assert!(New.can_transition_to(InProgress));
        assert!(!New.can_transition_to(Repaired));
        assert!(!New.can_transition_to(Scrap));
        assert!(InProgress.can_transition_to(Repaired));
        assert!(InProgress.can_transition_to(Scrap));
        assert!(!InProgress.can_transition_to(New));
        assert!(Repaired.is_terminal());
        assert!(Scrap.is_terminal());
        assert!(!New.is_terminal());
    }

    #[test]
    fn no_status_transitions_to_itself() {
        for s in RequestStatus::ALL {
            assert!(!s.can_transition_to(*s), "{s} loops");
        }
    }

    #[test]
    fn parses_and_prints_wire_names() {
        assert_eq!("IN_PROGRESS".parse::<RequestStatus>().unwrap(), RequestStatus::InProgress);
        assert_eq!(EquipmentCategory::Hvac.to_string(), "HVAC");
        assert!("in_progress".parse::<RequestStatus>().is_err());
        assert!("ROOT".parse::<Role>().is_err());
    }

    #[test]
    fn serde_uses_upper_case_names() {
        let json = serde_json::to_string(&RequestStatus::InProgress).unwrap();
        assert_eq!(json, "\"IN_PROGRESS\"");
        let role: Role = serde_json::from_str("\"TECHNICIAN\"").unwrap();
        assert_eq!(role, Role::Technician);
    }

    #[test]
    fn privileged_roles() {
        assert!(Role::Admin.is_privileged());
        assert!(Role::Manager.is_privileged());
        assert!(!Role::Technician.is_privileged());
        assert!(!Role::default().is_privileged());
    }
}
