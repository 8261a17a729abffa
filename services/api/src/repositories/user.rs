//! User repository for database operations

use common::Role;
use sqlx::{PgPool, Postgres, QueryBuilder, Row, postgres::PgRow};
use tracing::info;

use crate::{
    filters::{SearchFilter, like_escape},
    models::{NewUser, User, UserChanges},
};

const USER_COLUMNS: &str = "id, username, email, first_name, last_name, bio, role";

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
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        bio: row.try_get("bio")?,
        role: role
            .parse::<Role>()
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
    })
}

fn push_search(builder: &mut QueryBuilder<'_, Postgres>, filter: &SearchFilter) {
    if let Some(search) = &filter.search {
        builder
            .push(" WHERE username ILIKE '%' || ")
            .push_bind(like_escape(search))
            .push(" || '%'");
    }
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// One page of users ordered by id, plus the total matching count
    pub async fn list(
        &self,
        filter: &SearchFilter,
        limit: i64,
        offset: i64,
    ) -> sqlx::Result<(Vec<User>, i64)> {
        let mut count_query = QueryBuilder::new("SELECT COUNT(*) FROM users");
        push_search(&mut count_query, filter);
        let count = count_query
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let mut query = QueryBuilder::new(format!("SELECT {USER_COLUMNS} FROM users"));
        push_search(&mut query, filter);
        query
            .push(" ORDER BY id LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let rows = query.build().fetch_all(&self.pool).await?;
        let users = rows.iter().map(user_from_row).collect::<sqlx::Result<Vec<_>>>()?;

        Ok((users, count))
    }

    pub async fn find_by_id(&self, id: i64) -> sqlx::Result<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    pub async fn find_by_username(&self, username: &str) -> sqlx::Result<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    pub async fn create(&self, new_user: &NewUser) -> sqlx::Result<User> {
        info!(username = %new_user.username, role = %new_user.role, "Creating user");

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO users (username, email, first_name, last_name, bio, role)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&new_user.first_name)
        .bind(&new_user.last_name)
        .bind(&new_user.bio)
        .bind(new_user.role.as_str())
        .fetch_one(&self.pool)
        .await?;

        user_from_row(&row)
    }

    /// Apply `changes`; returns `None` when the user no longer exists
    pub async fn update(&self, id: i64, changes: &UserChanges) -> sqlx::Result<Option<User>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE users SET
                username = COALESCE($2, username),
                email = COALESCE($3, email),
                first_name = COALESCE($4, first_name),
                last_name = COALESCE($5, last_name),
                bio = COALESCE($6, bio),
                role = COALESCE($7, role)
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&changes.username)
        .bind(&changes.email)
        .bind(&changes.first_name)
        .bind(&changes.last_name)
        .bind(&changes.bio)
        .bind(changes.role.map(Role::as_str))
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    /// Delete a user together with their reviews and comments
    pub async fn delete(&self, id: i64) -> sqlx::Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Make sure `username` exists with the admin role
    ///
    /// An existing user keeps their email and is promoted.
    pub async fn ensure_admin(&self, username: &str, email: &str) -> sqlx::Result<User> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO users (username, email, role)
            VALUES ($1, $2, 'admin')
            ON CONFLICT ON CONSTRAINT uq_users_username
            DO UPDATE SET role = 'admin'
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(username)
        .bind(email)
        .fetch_one(&self.pool)
        .await?;

        user_from_row(&row)
    }
}
