//! User roles
//!
//! The role is stored as plain text in `users.role`; this closed set is the
//! only place the accepted values and their display labels are defined.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Role of a user account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular registered user
    #[default]
    User,
    /// May edit and delete other users' reviews and comments
    Moderator,
    /// Full access to every resource
    Admin,
}

/// Returned when a string is not one of the known role values
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("\"{0}\" is not a valid role")]
pub struct UnknownRole(pub String);

impl Role {
    /// Accepted `(value, label)` pairs, in display order
    pub const CHOICES: [(Role, &'static str); 3] = [
        (Role::User, "User"),
        (Role::Moderator, "Moderator"),
        (Role::Admin, "Administrator"),
    ];

    /// Value persisted in the database and sent over the wire
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Moderator => "moderator",
            Role::Admin => "admin",
        }
    }

    /// Human-readable label
    pub fn label(self) -> &'static str {
        Self::CHOICES
            .iter()
            .find(|(role, _)| *role == self)
            .map(|(_, label)| *label)
            .unwrap_or_default()
    }

    pub fn is_admin(self) -> bool {
        self == Role::Admin
    }

    pub fn is_moderator(self) -> bool {
        self == Role::Moderator
    }

    pub fn is_user(self) -> bool {
        self == Role::User
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::CHOICES
            .iter()
            .map(|(role, _)| *role)
            .find(|role| role.as_str() == s)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}
