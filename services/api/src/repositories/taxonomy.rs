//! Category and genre repository

use sqlx::{PgPool, Postgres, QueryBuilder, Row, postgres::PgRow};
use tracing::info;

use crate::{
    filters::{SearchFilter, like_escape},
    models::{NewTaxon, Taxon, TaxonomyKind},
};

/// Repository over one classifier table
#[derive(Clone)]
pub struct TaxonomyRepository {
    pool: PgPool,
    kind: TaxonomyKind,
}

pub(crate) fn taxon_from_row(row: &PgRow) -> sqlx::Result<Taxon> {
    Ok(Taxon {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        slug: row.try_get("slug")?,
    })
}

fn push_search(builder: &mut QueryBuilder<'_, Postgres>, filter: &SearchFilter) {
    if let Some(search) = &filter.search {
        builder
            .push(" WHERE name ILIKE ")
            .push_bind(like_escape(search))
            .push(" || '%'");
    }
}

impl TaxonomyRepository {
    pub fn new(pool: PgPool, kind: TaxonomyKind) -> Self {
        Self { pool, kind }
    }

    pub fn kind(&self) -> TaxonomyKind {
        self.kind
    }

    /// One window of classifiers ordered by id, plus the total matching count
    pub async fn list(
        &self,
        filter: &SearchFilter,
        limit: i64,
        offset: i64,
    ) -> sqlx::Result<(Vec<Taxon>, i64)> {
        let table = self.kind.table();

        let mut count_query = QueryBuilder::new(format!("SELECT COUNT(*) FROM {table}"));
        push_search(&mut count_query, filter);
        let count = count_query
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let mut query = QueryBuilder::new(format!("SELECT id, name, slug FROM {table}"));
        push_search(&mut query, filter);
        query
            .push(" ORDER BY id LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let rows = query.build().fetch_all(&self.pool).await?;
        let taxa = rows
            .iter()
            .map(taxon_from_row)
            .collect::<sqlx::Result<Vec<_>>>()?;

        Ok((taxa, count))
    }

    pub async fn create(&self, new_taxon: &NewTaxon) -> sqlx::Result<Taxon> {
        info!(kind = self.kind.label(), slug = %new_taxon.slug, "Creating classifier");

        let row = sqlx::query(&format!(
            "INSERT INTO {} (name, slug) VALUES ($1, $2) RETURNING id, name, slug",
            self.kind.table()
        ))
        .bind(&new_taxon.name)
        .bind(&new_taxon.slug)
        .fetch_one(&self.pool)
        .await?;

        taxon_from_row(&row)
    }

    pub async fn find_by_slug(&self, slug: &str) -> sqlx::Result<Option<Taxon>> {
        let row = sqlx::query(&format!(
            "SELECT id, name, slug FROM {} WHERE slug = $1",
            self.kind.table()
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(taxon_from_row).transpose()
    }

    /// Classifiers whose slug is in `slugs`; unknown slugs are simply absent
    pub async fn find_by_slugs(&self, slugs: &[String]) -> sqlx::Result<Vec<Taxon>> {
        if slugs.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query(&format!(
            "SELECT id, name, slug FROM {} WHERE slug = ANY($1) ORDER BY id",
            self.kind.table()
        ))
        .bind(slugs)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(taxon_from_row).collect()
    }

    /// Delete by slug; titles referencing a deleted category keep existing
    /// without one
    pub async fn delete_by_slug(&self, slug: &str) -> sqlx::Result<bool> {
        let result = sqlx::query(&format!(
            "DELETE FROM {} WHERE slug = $1",
            self.kind.table()
        ))
        .bind(slug)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
