//! First administrator account
//!
//! Accounts are only created through signup, which always grants the `user`
//! role. Setting `ADMIN_USERNAME` and `ADMIN_EMAIL` makes the service create
//! (or promote) that account on startup so someone can manage the rest.

use config::{Config, ConfigError, Environment};
use serde::Deserialize;
use tracing::info;

use crate::repositories::UserRepository;

/// Administrator to ensure on startup
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct AdminConfig {
    pub username: String,
    pub email: String,
}

impl AdminConfig {
    /// Read `ADMIN_USERNAME` and `ADMIN_EMAIL`
    ///
    /// Returns `None` unless both are set.
    pub fn from_env() -> Result<Option<Self>, ConfigError> {
        let settings = Config::builder()
            .add_source(Environment::with_prefix("ADMIN"))
            .build()?;

        let username = settings.get_string("username").ok();
        let email = settings.get_string("email").ok();

        Ok(match (username, email) {
            (Some(username), Some(email)) if !username.is_empty() && !email.is_empty() => {
                Some(Self { username, email })
            }
            _ => None,
        })
    }

    /// Create the account, or promote an existing one with that username
    pub async fn apply(&self, users: &UserRepository) -> sqlx::Result<()> {
        let admin = users.ensure_admin(&self.username, &self.email).await?;
        info!(user_id = admin.id, username = %admin.username, "Administrator ensured");
        Ok(())
    }
}
