//! User model and registration payloads

use chrono::{DateTime, Utc};
use common::{
    Role,
    validation::{FieldErrors, validate_email, validate_username},
};
use serde::{Deserialize, Serialize};

/// User entity, as far as registration is concerned
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub last_login: Option<DateTime<Utc>>,
    pub date_joined: DateTime<Utc>,
}

/// Validated new user creation payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
}

/// Body of `POST auth/signup/`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignUpRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl SignUpRequest {
    /// Check the payload field by field
    pub fn validate(&self) -> Result<NewUser, FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.require("username", &self.username);
        errors.require("email", &self.email);
        if let Some(username) = &self.username {
            errors.check("username", validate_username(username));
        }
        if let Some(email) = &self.email {
            errors.check("email", validate_email(email));
        }
        errors.into_result()?;

        Ok(NewUser {
            username: self.username.clone().unwrap_or_default(),
            email: self.email.clone().unwrap_or_default(),
        })
    }
}

/// Successful signup response
#[derive(Debug, Clone, Serialize)]
pub struct SignUpResponse {
    pub username: String,
    pub email: String,
}

impl From<User> for SignUpResponse {
    fn from(user: User) -> Self {
        Self {
            username: user.username,
            email: user.email,
        }
    }
}

/// Body of `POST auth/token/`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub confirmation_code: Option<String>,
}

impl TokenRequest {
    /// Both fields are required and may not be blank
    pub fn validate(&self) -> Result<(String, String), FieldErrors> {
        let mut errors = FieldErrors::new();
        for (field, value) in [
            ("username", &self.username),
            ("confirmation_code", &self.confirmation_code),
        ] {
            match value.as_deref() {
                None => errors.add(field, common::validation::REQUIRED),
                Some("") => errors.add(field, "This field may not be blank."),
                Some(_) => {}
            }
        }
        errors.into_result()?;

        Ok((
            self.username.clone().unwrap_or_default(),
            self.confirmation_code.clone().unwrap_or_default(),
        ))
    }
}

/// Response for token generation
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signup(username: Option<&str>, email: Option<&str>) -> SignUpRequest {
        SignUpRequest {
            username: username.map(str::to_string),
            email: email.map(str::to_string),
        }
    }

    #[test]
    fn valid_signup_payload() {
        let user = signup(Some("reader"), Some("reader@example.com"))
            .validate()
            .unwrap();
        assert_eq!(user.username, "reader");
        assert_eq!(user.email, "reader@example.com");
    }

    #[test]
    fn signup_reports_every_field() {
        let errors = signup(None, None).validate().unwrap_err();
        assert!(errors.get("username").is_some());
        assert!(errors.get("email").is_some());

        let errors = signup(Some("Me"), Some("nope")).validate().unwrap_err();
        assert_eq!(errors.get("username"), Some(&["Invalid username.".to_string()][..]));
        assert!(errors.get("email").is_some());
    }

    #[test]
    fn signup_payload_echo_skips_missing_fields() {
        let json = serde_json::to_value(signup(Some("reader"), None)).unwrap();
        assert_eq!(json, serde_json::json!({ "username": "reader" }));
    }

    #[test]
    fn token_request_requires_both_fields() {
        let request = TokenRequest {
            username: Some("reader".to_string()),
            confirmation_code: Some(String::new()),
        };
        let errors = request.validate().unwrap_err();
        assert!(errors.get("confirmation_code").is_some());
        assert!(errors.get("username").is_none());

        let errors = TokenRequest::default().validate().unwrap_err();
        assert!(errors.get("username").is_some());
    }
}
