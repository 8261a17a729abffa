//! Comment repository

use sqlx::{PgPool, Postgres, QueryBuilder, Row, postgres::PgRow};
use tracing::info;

use crate::{
    filters::{CommentFilter, like_escape},
    models::Comment,
};

/// Wraps a statement returning comment rows as `c` and joins the wire values
const COMMENT_JOIN: &str = r#"
    SELECT c.id, c.review_id, rv.text AS review_text, c.author_id,
           u.username AS author_username, c.text, c.pub_date
    FROM c
    JOIN reviews rv ON rv.id = c.review_id
    JOIN users u ON u.id = c.author_id
"#;

/// Comment repository
#[derive(Clone)]
pub struct CommentRepository {
    pool: PgPool,
}

fn comment_from_row(row: &PgRow) -> sqlx::Result<Comment> {
    Ok(Comment {
        id: row.try_get("id")?,
        review_id: row.try_get("review_id")?,
        review_text: row.try_get("review_text")?,
        author_id: row.try_get("author_id")?,
        author_username: row.try_get("author_username")?,
        text: row.try_get("text")?,
        pub_date: row.try_get("pub_date")?,
    })
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, review_id: i64, filter: &CommentFilter) {
    builder.push(" WHERE review_id = ").push_bind(review_id);
    if let Some(review) = filter.review {
        builder.push(" AND review_id = ").push_bind(review);
    }
    if let Some(author) = filter.author {
        builder.push(" AND author_id = ").push_bind(author);
    }
    if let Some(search) = &filter.search {
        builder
            .push(" AND text ILIKE '%' || ")
            .push_bind(like_escape(search))
            .push(" || '%'");
    }
}

impl CommentRepository {
    /// Create a new comment repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// One window of a review's comments ordered by id, plus the total count
    pub async fn list(
        &self,
        review_id: i64,
        filter: &CommentFilter,
        limit: i64,
        offset: i64,
    ) -> sqlx::Result<(Vec<Comment>, i64)> {
        let mut count_query = QueryBuilder::new("SELECT COUNT(*) FROM comments");
        push_filters(&mut count_query, review_id, filter);
        let count = count_query
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let mut query = QueryBuilder::new("WITH c AS (SELECT * FROM comments");
        push_filters(&mut query, review_id, filter);
        query
            .push(" ORDER BY id LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset)
            .push(")")
            .push(COMMENT_JOIN)
            .push(" ORDER BY c.id");

        let rows = query.build().fetch_all(&self.pool).await?;
        let comments = rows
            .iter()
            .map(comment_from_row)
            .collect::<sqlx::Result<Vec<_>>>()?;

        Ok((comments, count))
    }

    /// Comment `id`, provided it belongs to `review_id`
    pub async fn find(&self, review_id: i64, id: i64) -> sqlx::Result<Option<Comment>> {
        let row = sqlx::query(&format!(
            "WITH c AS (SELECT * FROM comments WHERE id = $1 AND review_id = $2) {COMMENT_JOIN}"
        ))
        .bind(id)
        .bind(review_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(comment_from_row).transpose()
    }

    pub async fn create(&self, review_id: i64, author_id: i64, text: &str) -> sqlx::Result<Comment> {
        info!(review_id, author_id, "Creating comment");

        let row = sqlx::query(&format!(
            r#"
            WITH c AS (
                INSERT INTO comments (review_id, author_id, text)
                VALUES ($1, $2, $3)
                RETURNING *
            )
            {COMMENT_JOIN}
            "#
        ))
        .bind(review_id)
        .bind(author_id)
        .bind(text)
        .fetch_one(&self.pool)
        .await?;

        comment_from_row(&row)
    }

    pub async fn update(
        &self,
        review_id: i64,
        id: i64,
        text: Option<&str>,
    ) -> sqlx::Result<Option<Comment>> {
        let row = sqlx::query(&format!(
            r#"
            WITH c AS (
                UPDATE comments SET text = COALESCE($3, text)
                WHERE id = $1 AND review_id = $2
                RETURNING *
            )
            {COMMENT_JOIN}
            "#
        ))
        .bind(id)
        .bind(review_id)
        .bind(text)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(comment_from_row).transpose()
    }

    pub async fn delete(&self, id: i64) -> sqlx::Result<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
