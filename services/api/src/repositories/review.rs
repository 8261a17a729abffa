//! Review repository

use sqlx::{PgPool, Postgres, QueryBuilder, Row, postgres::PgRow};
use tracing::info;

use crate::{
    filters::ReviewFilter,
    models::{Review, ReviewChanges},
};

/// Wraps a statement returning review rows as `r` and joins the wire names
const REVIEW_JOIN: &str = r#"
    SELECT r.id, r.title_id, t.name AS title_name, r.author_id,
           u.username AS author_username, r.text, r.score, r.pub_date
    FROM r
    JOIN titles t ON t.id = r.title_id
    JOIN users u ON u.id = r.author_id
"#;

/// Review repository
#[derive(Clone)]
pub struct ReviewRepository {
    pool: PgPool,
}

fn review_from_row(row: &PgRow) -> sqlx::Result<Review> {
    Ok(Review {
        id: row.try_get("id")?,
        title_id: row.try_get("title_id")?,
        title_name: row.try_get("title_name")?,
        author_id: row.try_get("author_id")?,
        author_username: row.try_get("author_username")?,
        text: row.try_get("text")?,
        score: row.try_get("score")?,
        pub_date: row.try_get("pub_date")?,
    })
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, title_id: i64, filter: &ReviewFilter) {
    builder.push(" WHERE title_id = ").push_bind(title_id);
    if let Some(author) = filter.author {
        builder.push(" AND author_id = ").push_bind(author);
    }
}

impl ReviewRepository {
    /// Create a new review repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// One window of a title's reviews ordered by id, plus the total count
    pub async fn list(
        &self,
        title_id: i64,
        filter: &ReviewFilter,
        limit: i64,
        offset: i64,
    ) -> sqlx::Result<(Vec<Review>, i64)> {
        let mut count_query = QueryBuilder::new("SELECT COUNT(*) FROM reviews");
        push_filters(&mut count_query, title_id, filter);
        let count = count_query
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let mut query = QueryBuilder::new("WITH r AS (SELECT * FROM reviews");
        push_filters(&mut query, title_id, filter);
        query
            .push(" ORDER BY id LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset)
            .push(")")
            .push(REVIEW_JOIN)
            .push(" ORDER BY r.id");

        let rows = query.build().fetch_all(&self.pool).await?;
        let reviews = rows
            .iter()
            .map(review_from_row)
            .collect::<sqlx::Result<Vec<_>>>()?;

        Ok((reviews, count))
    }

    /// Review `id`, provided it belongs to `title_id`
    pub async fn find(&self, title_id: i64, id: i64) -> sqlx::Result<Option<Review>> {
        let row = sqlx::query(&format!(
            "WITH r AS (SELECT * FROM reviews WHERE id = $1 AND title_id = $2) {REVIEW_JOIN}"
        ))
        .bind(id)
        .bind(title_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(review_from_row).transpose()
    }

    pub async fn create(
        &self,
        title_id: i64,
        author_id: i64,
        text: &str,
        score: i16,
    ) -> sqlx::Result<Review> {
        info!(title_id, author_id, score, "Creating review");

        let row = sqlx::query(&format!(
            r#"
            WITH r AS (
                INSERT INTO reviews (title_id, author_id, text, score)
                VALUES ($1, $2, $3, $4)
                RETURNING *
            )
            {REVIEW_JOIN}
            "#
        ))
        .bind(title_id)
        .bind(author_id)
        .bind(text)
        .bind(score)
        .fetch_one(&self.pool)
        .await?;

        review_from_row(&row)
    }

    pub async fn update(
        &self,
        title_id: i64,
        id: i64,
        changes: &ReviewChanges,
    ) -> sqlx::Result<Option<Review>> {
        let row = sqlx::query(&format!(
            r#"
            WITH r AS (
                UPDATE reviews SET
                    text = COALESCE($3, text),
                    score = COALESCE($4, score)
                WHERE id = $1 AND title_id = $2
                RETURNING *
            )
            {REVIEW_JOIN}
            "#
        ))
        .bind(id)
        .bind(title_id)
        .bind(&changes.text)
        .bind(changes.score)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(review_from_row).transpose()
    }

    /// Delete a review with its comments
    pub async fn delete(&self, id: i64) -> sqlx::Result<bool> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
