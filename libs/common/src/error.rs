//! Custom error types for the common library
//!
//! This module defines the database error type shared by both services and
//! the helpers that classify PostgreSQL constraint violations.

use crate::validation::{FieldErrors, NON_FIELD_ERRORS};
use sqlx::Error as SqlxError;
use thiserror::Error;

/// SQLSTATE reported by PostgreSQL for unique constraint violations
const UNIQUE_VIOLATION: &str = "23505";

/// SQLSTATE reported by PostgreSQL for foreign key violations
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// SQLSTATE reported by PostgreSQL for check constraint violations
const CHECK_VIOLATION: &str = "23514";

/// Custom error type for database operations
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error occurred during database connection
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    /// Error occurred during database query execution
    #[error("Database query error: {0}")]
    Query(#[source] SqlxError),

    /// Error occurred during database migration
    #[error("Database migration error: {0}")]
    Migration(String),

    /// Configuration error
    #[error("Database configuration error: {0}")]
    Configuration(String),
}

/// Type alias for Result with DatabaseError
pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Name of the unique constraint violated by `err`, if any.
pub fn unique_violation(err: &SqlxError) -> Option<&str> {
    constraint_for_code(err, UNIQUE_VIOLATION)
}

/// Name of the check constraint violated by `err`, if any.
pub fn check_violation(err: &SqlxError) -> Option<&str> {
    constraint_for_code(err, CHECK_VIOLATION)
}

/// Name of the foreign key violated by `err`, if any.
///
/// Raised when a referenced row disappears between a lookup and the write.
pub fn foreign_key_violation(err: &SqlxError) -> Option<&str> {
    constraint_for_code(err, FOREIGN_KEY_VIOLATION)
}

/// Field-level validation errors for a violated schema constraint
///
/// Returns `None` when `err` is not a constraint violation the API reports
/// back to the client.
pub fn constraint_errors(err: &SqlxError) -> Option<FieldErrors> {
    let (field, message) = match unique_violation(err).or_else(|| check_violation(err))? {
        "uq_users_username" => ("username", "A user with that username already exists."),
        "uq_users_email" => ("email", "A user with that email already exists."),
        "uq_users_username_email" => (
            NON_FIELD_ERRORS,
            "The fields username, email must make a unique set.",
        ),
        "ck_users_role" => ("role", "Not a valid choice."),
        "uq_categories_slug" => ("slug", "A category with this slug already exists."),
        "uq_genres_slug" => ("slug", "A genre with this slug already exists."),
        "ck_titles_year" => ("year", "Ensure this value is greater than or equal to 0."),
        "uq_reviews_title_author" => ("title", "You have already reviewed this title."),
        "ck_reviews_score" => ("score", "Score must be between 1 and 10."),
        _ => return None,
    };
    Some(FieldErrors::single(field, message))
}

fn constraint_for_code<'a>(err: &'a SqlxError, code: &str) -> Option<&'a str> {
    match err {
        SqlxError::Database(db_err) if db_err.code().as_deref() == Some(code) => {
            db_err.constraint()
        }
        _ => None,
    }
}
