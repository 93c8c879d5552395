//! Roles and authenticated identities

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The designation of an actor, which also names the gated area it may enter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Tutor,
    Student,
}

impl Role {
    /// Landing route of the role's dashboard
    pub fn dashboard_route(&self) -> &'static str {
        match self {
            Role::Admin => "/admin",
            Role::Tutor => "/tutor",
            Role::Student => "/student",
        }
    }

    /// Login route unauthenticated visitors of the role's area are sent to
    pub fn login_route(&self) -> &'static str {
        match self {
            Role::Admin => "/admin/login",
            Role::Tutor => "/tutor/login",
            Role::Student => "/login",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => write!(f, "Admin"),
            Role::Tutor => write!(f, "Tutor"),
            Role::Student => write!(f, "Student"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "tutor" => Ok(Role::Tutor),
            "student" => Ok(Role::Student),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// An authenticated identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}
