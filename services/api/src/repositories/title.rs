//! Title repository
//!
//! Ratings are never stored: every read aggregates the review scores of the
//! title, so the value is always current.

use std::collections::HashMap;

use sqlx::{PgPool, Postgres, QueryBuilder, Row, postgres::PgRow};
use tracing::info;

use super::taxonomy::taxon_from_row;
use crate::{
    filters::{TitleFilter, like_escape},
    models::{Taxon, Title},
};

const TITLE_SELECT: &str = r#"
    SELECT t.id, t.name, t.year, t.description,
           c.id AS category_id, c.name AS category_name, c.slug AS category_slug,
           (SELECT AVG(r.score)::float8 FROM reviews r WHERE r.title_id = t.id) AS rating
    FROM titles t
    LEFT JOIN categories c ON c.id = t.category_id
"#;

/// Title ready to be inserted, classifiers resolved to ids
#[derive(Debug, Clone, PartialEq)]
pub struct TitleRecord {
    pub name: String,
    pub year: i32,
    pub description: Option<String>,
    pub category_id: Option<i64>,
    pub genre_ids: Vec<i64>,
}

/// Title column changes; `None` leaves a value untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TitleUpdate {
    pub name: Option<String>,
    pub year: Option<i32>,
    /// `Some(None)` clears the description
    pub description: Option<Option<String>>,
    pub category_id: Option<i64>,
    /// Replaces the whole genre set when present
    pub genre_ids: Option<Vec<i64>>,
}

/// Title repository
#[derive(Clone)]
pub struct TitleRepository {
    pool: PgPool,
}

fn title_from_row(row: &PgRow) -> sqlx::Result<Title> {
    let category_id: Option<i64> = row.try_get("category_id")?;
    let category = match category_id {
        Some(id) => Some(Taxon {
            id,
            name: row.try_get("category_name")?,
            slug: row.try_get("category_slug")?,
        }),
        None => None,
    };

    Ok(Title {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        year: row.try_get("year")?,
        description: row.try_get("description")?,
        rating: row.try_get("rating")?,
        category,
        genres: Vec::new(),
    })
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &TitleFilter) {
    builder.push(" WHERE TRUE");

    if let Some(genre) = &filter.genre {
        builder
            .push(
                " AND EXISTS (SELECT 1 FROM titles_genres tg JOIN genres g ON g.id = tg.genre_id \
                 WHERE tg.title_id = t.id AND g.slug = ",
            )
            .push_bind(genre.clone())
            .push(")");
    }
    if let Some(category) = &filter.category {
        builder.push(" AND c.slug = ").push_bind(category.clone());
    }
    if let Some(name) = &filter.name {
        builder
            .push(" AND t.name ILIKE '%' || ")
            .push_bind(like_escape(name))
            .push(" || '%'");
    }
    if let Some(year) = filter.year {
        builder.push(" AND t.year = ").push_bind(year);
    }
}

impl TitleRepository {
    /// Create a new title repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// One window of titles ordered by id, plus the total matching count
    pub async fn list(
        &self,
        filter: &TitleFilter,
        limit: i64,
        offset: i64,
    ) -> sqlx::Result<(Vec<Title>, i64)> {
        let mut count_query = QueryBuilder::new(
            "SELECT COUNT(*) FROM titles t LEFT JOIN categories c ON c.id = t.category_id",
        );
        push_filters(&mut count_query, filter);
        let count = count_query
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let mut query = QueryBuilder::new(TITLE_SELECT);
        push_filters(&mut query, filter);
        query
            .push(" ORDER BY t.id LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let rows = query.build().fetch_all(&self.pool).await?;
        let mut titles = rows
            .iter()
            .map(title_from_row)
            .collect::<sqlx::Result<Vec<_>>>()?;
        self.attach_genres(&mut titles).await?;

        Ok((titles, count))
    }

    pub async fn find_by_id(&self, id: i64) -> sqlx::Result<Option<Title>> {
        let row = sqlx::query(&format!("{TITLE_SELECT} WHERE t.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut titles = vec![title_from_row(&row)?];
        self.attach_genres(&mut titles).await?;
        Ok(titles.pop())
    }

    pub async fn exists(&self, id: i64) -> sqlx::Result<bool> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM titles WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
    }

    /// Insert a title and its genre links in one transaction
    pub async fn create(&self, record: &TitleRecord) -> sqlx::Result<Title> {
        info!(name = %record.name, year = record.year, "Creating title");

        let mut tx = self.pool.begin().await?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO titles (name, year, description, category_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&record.name)
        .bind(record.year)
        .bind(&record.description)
        .bind(record.category_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO titles_genres (title_id, genre_id) SELECT $1, UNNEST($2::bigint[])",
        )
        .bind(id)
        .bind(&record.genre_ids)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.find_by_id(id).await?.ok_or(sqlx::Error::RowNotFound)
    }

    /// Apply `update`; returns `None` when the title does not exist
    pub async fn update(&self, id: i64, update: &TitleUpdate) -> sqlx::Result<Option<Title>> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE titles SET
                name = COALESCE($2, name),
                year = COALESCE($3, year),
                description = CASE WHEN $4 THEN $5 ELSE description END,
                category_id = COALESCE($6, category_id)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&update.name)
        .bind(update.year)
        .bind(update.description.is_some())
        .bind(update.description.as_ref().and_then(|text| text.as_deref()))
        .bind(update.category_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        if let Some(genre_ids) = &update.genre_ids {
            sqlx::query("DELETE FROM titles_genres WHERE title_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            sqlx::query(
                "INSERT INTO titles_genres (title_id, genre_id) SELECT $1, UNNEST($2::bigint[])",
            )
            .bind(id)
            .bind(genre_ids)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        info!(title_id = id, "Title updated");

        self.find_by_id(id).await
    }

    /// Delete a title with its reviews and their comments
    pub async fn delete(&self, id: i64) -> sqlx::Result<bool> {
        let result = sqlx::query("DELETE FROM titles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Load genre sets for `titles` with a single query
    async fn attach_genres(&self, titles: &mut [Title]) -> sqlx::Result<()> {
        if titles.is_empty() {
            return Ok(());
        }

        let ids: Vec<i64> = titles.iter().map(|title| title.id).collect();
        let rows = sqlx::query(
            r#"
            SELECT tg.title_id, g.id, g.name, g.slug
            FROM titles_genres tg
            JOIN genres g ON g.id = tg.genre_id
            WHERE tg.title_id = ANY($1)
            ORDER BY g.id
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_title: HashMap<i64, Vec<Taxon>> = HashMap::new();
        for row in &rows {
            let title_id: i64 = row.try_get("title_id")?;
            by_title.entry(title_id).or_default().push(taxon_from_row(row)?);
        }

        for title in titles {
            title.genres = by_title.remove(&title.id).unwrap_or_default();
        }

        Ok(())
    }
}
