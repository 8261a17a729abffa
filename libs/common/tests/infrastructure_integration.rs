//! Integration tests for the database schema
//!
//! These tests verify that the migrations create the constraints the
//! services rely on: uniqueness, score bounds and delete behaviour.

use common::{
    database::health_check,
    error::{check_violation, foreign_key_violation, unique_violation},
};
use sqlx::{PgPool, Row};

async fn insert_user(pool: &PgPool, username: &str) -> i64 {
    sqlx::query("INSERT INTO users (username, email) VALUES ($1, $2) RETURNING id")
        .bind(username)
        .bind(format!("{username}@example.com"))
        .fetch_one(pool)
        .await
        .expect("insert user")
        .get("id")
}

async fn insert_title(pool: &PgPool, category_id: Option<i64>) -> i64 {
    sqlx::query("INSERT INTO titles (name, year, category_id) VALUES ('Dune', 1965, $1) RETURNING id")
        .bind(category_id)
        .fetch_one(pool)
        .await
        .expect("insert title")
        .get("id")
}

async fn insert_review(pool: &PgPool, title_id: i64, author_id: i64, score: i16) -> Result<i64, sqlx::Error> {
    let row = sqlx::query(
        "INSERT INTO reviews (title_id, author_id, text, score) VALUES ($1, $2, 'text', $3) RETURNING id",
    )
    .bind(title_id)
    .bind(author_id)
    .bind(score)
    .fetch_one(pool)
    .await?;
    Ok(row.get("id"))
}

#[sqlx::test(migrations = "./migrations")]
async fn test_database_is_reachable(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
    assert!(health_check(&pool).await?, "Database health check failed");
    Ok(())
}

#[sqlx::test(migrations = "./migrations")]
async fn test_user_uniqueness_constraints(pool: PgPool) {
    insert_user(&pool, "alice").await;

    let err = sqlx::query("INSERT INTO users (username, email) VALUES ('alice', 'other@example.com')")
        .execute(&pool)
        .await
        .unwrap_err();
    assert_eq!(unique_violation(&err), Some("uq_users_username"));

    let err = sqlx::query("INSERT INTO users (username, email) VALUES ('bob', 'alice@example.com')")
        .execute(&pool)
        .await
        .unwrap_err();
    assert_eq!(unique_violation(&err), Some("uq_users_email"));

    let err = sqlx::query("INSERT INTO users (username, email, role) VALUES ('carol', 'c@example.com', 'root')")
        .execute(&pool)
        .await
        .unwrap_err();
    assert_eq!(check_violation(&err), Some("ck_users_role"));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_review_constraints(pool: PgPool) {
    let author = insert_user(&pool, "alice").await;
    let title = insert_title(&pool, None).await;

    let err = insert_review(&pool, title, author, 11).await.unwrap_err();
    assert_eq!(check_violation(&err), Some("ck_reviews_score"));

    insert_review(&pool, title, author, 7).await.expect("first review");
    let err = insert_review(&pool, title, author, 5).await.unwrap_err();
    assert_eq!(unique_violation(&err), Some("uq_reviews_title_author"));

    let err = insert_review(&pool, title + 1000, author, 5).await.unwrap_err();
    assert_eq!(foreign_key_violation(&err), Some("reviews_title_id_fkey"));
    assert_eq!(unique_violation(&err), None);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_behaviour(pool: PgPool) {
    let category: i64 = sqlx::query("INSERT INTO categories (name, slug) VALUES ('Books', 'books') RETURNING id")
        .fetch_one(&pool)
        .await
        .unwrap()
        .get("id");
    let title = insert_title(&pool, Some(category)).await;
    let author = insert_user(&pool, "alice").await;
    let review = insert_review(&pool, title, author, 9).await.unwrap();
    sqlx::query("INSERT INTO comments (review_id, author_id, text) VALUES ($1, $2, 'nice')")
        .bind(review)
        .bind(author)
        .execute(&pool)
        .await
        .unwrap();

    sqlx::query("DELETE FROM categories WHERE id = $1")
        .bind(category)
        .execute(&pool)
        .await
        .unwrap();
    let category_id: Option<i64> = sqlx::query_scalar("SELECT category_id FROM titles WHERE id = $1")
        .bind(title)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(category_id, None, "category deletion must null the reference");

    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(author)
        .execute(&pool)
        .await
        .unwrap();
    let reviews: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reviews")
        .fetch_one(&pool)
        .await
        .unwrap();
    let comments: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!((reviews, comments), (0, 0), "author deletion must cascade");

    let titles: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM titles")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(titles, 1);
}
