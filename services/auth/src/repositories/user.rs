//! User repository for database operations

use chrono::{DateTime, Utc};
use common::Role;
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;

use crate::models::{NewUser, User};

/// User repository
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

fn user_from_row(row: &PgRow) -> sqlx::Result<User> {
    let role: String = row.try_get("role")?;
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        role: role
            .parse::<Role>()
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        last_login: row.try_get("last_login")?,
        date_joined: row.try_get("date_joined")?,
    })
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new user with the default role
    pub async fn create(&self, new_user: &NewUser) -> sqlx::Result<User> {
        info!(username = %new_user.username, "Creating new user");

        let row = sqlx::query(
            r#"
            INSERT INTO users (username, email)
            VALUES ($1, $2)
            RETURNING id, username, email, role, last_login, date_joined
            "#,
        )
        .bind(&new_user.username)
        .bind(&new_user.email)
        .fetch_one(&self.pool)
        .await?;

        user_from_row(&row)
    }

    /// Find a user by exact username
    pub async fn find_by_username(&self, username: &str) -> sqlx::Result<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, username, email, role, last_login, date_joined
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    /// Record a successful token exchange
    ///
    /// Changing `last_login` invalidates every confirmation code issued before.
    pub async fn record_login(&self, id: i64, at: DateTime<Utc>) -> sqlx::Result<()> {
        sqlx::query("UPDATE users SET last_login = $2 WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
