//! Application roles used for workflow authorization.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Permission class of the acting user.
///
/// Owned by the external auth/HR subsystem; the workflow core only receives
/// the value as an explicit parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Leadership,
    DeputyDirector,
    Partner,
    Pm,
    Procurement,
    Hr,
    Employee,
}

impl Role {
    /// Every role, in seniority order.
    pub const ALL: [Role; 7] = [
        Role::Leadership,
        Role::DeputyDirector,
        Role::Partner,
        Role::Pm,
        Role::Procurement,
        Role::Hr,
        Role::Employee,
    ];

    /// Stable snake_case id used in storage and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Leadership => "leadership",
            Self::DeputyDirector => "deputy_director",
            Self::Partner => "partner",
            Self::Pm => "pm",
            Self::Procurement => "procurement",
            Self::Hr => "hr",
            Self::Employee => "employee",
        }
    }

    /// Parses the snake_case id. Surrounding whitespace is ignored.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "leadership" => Some(Self::Leadership),
            "deputy_director" => Some(Self::DeputyDirector),
            "partner" => Some(Self::Partner),
            "pm" => Some(Self::Pm),
            "procurement" => Some(Self::Procurement),
            "hr" => Some(Self::Hr),
            "employee" => Some(Self::Employee),
            _ => None,
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
