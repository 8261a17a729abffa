//! User model and admin/profile payloads

use common::{
    Role,
    validation::{
        FieldErrors, validate_email, validate_person_name, validate_username,
    },
};
use serde::{Deserialize, Serialize};

use super::optional_text;

/// User entity
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    pub role: Role,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    pub fn is_moderator(&self) -> bool {
        self.role.is_moderator()
    }

    pub fn is_user(&self) -> bool {
        self.role.is_user()
    }
}

/// Wire representation of a user
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    pub role: Role,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            bio: user.bio,
            role: user.role,
        }
    }
}

/// Body of user create and update requests
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// Validated user creation payload
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    pub role: Role,
}

/// Validated set of user field changes; `None` leaves a column untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub role: Option<Role>,
}

fn parse_role(errors: &mut FieldErrors, value: &Option<String>) -> Option<Role> {
    let value = value.as_deref()?;
    match value.parse::<Role>() {
        Ok(role) => Some(role),
        Err(_) => {
            errors.add("role", format!("\"{value}\" is not a valid choice."));
            None
        }
    }
}

impl UserRequest {
    /// Validate a full user for creation
    pub fn validate_new(&self) -> Result<NewUser, FieldErrors> {
        let changes = self.validate_changes(false)?;
        Ok(NewUser {
            username: changes.username.unwrap_or_default(),
            email: changes.email.unwrap_or_default(),
            first_name: changes.first_name.unwrap_or_default(),
            last_name: changes.last_name.unwrap_or_default(),
            bio: changes.bio.unwrap_or_default(),
            role: changes.role.unwrap_or_default(),
        })
    }

    /// Validate an update; a `partial` update does not require any field
    pub fn validate_changes(&self, partial: bool) -> Result<UserChanges, FieldErrors> {
        let mut errors = FieldErrors::new();
        if !partial {
            errors.require("username", &self.username);
            errors.require("email", &self.email);
        }

        let changes = UserChanges {
            username: optional_text(&mut errors, "username", &self.username, validate_username),
            email: optional_text(&mut errors, "email", &self.email, validate_email),
            first_name: optional_text(
                &mut errors,
                "first_name",
                &self.first_name,
                validate_person_name,
            ),
            last_name: optional_text(
                &mut errors,
                "last_name",
                &self.last_name,
                validate_person_name,
            ),
            bio: self.bio.clone(),
            role: parse_role(&mut errors, &self.role),
        };

        errors.into_result()?;
        Ok(changes)
    }
}
