//! Categories and genres
//!
//! Both are flat `{name, slug}` classifiers addressed by slug, so they share
//! one model parameterised by [`TaxonomyKind`].

use common::validation::{FieldErrors, validate_name, validate_slug};
use serde::{Deserialize, Serialize};

/// Which classifier table a [`Taxon`] lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaxonomyKind {
    Category,
    Genre,
}

impl TaxonomyKind {
    pub fn table(self) -> &'static str {
        match self {
            TaxonomyKind::Category => "categories",
            TaxonomyKind::Genre => "genres",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TaxonomyKind::Category => "category",
            TaxonomyKind::Genre => "genre",
        }
    }
}

/// A category or a genre
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Taxon {
    #[serde(skip)]
    pub id: i64,
    pub name: String,
    pub slug: String,
}

/// Body of `POST categories/` and `POST genres/`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaxonRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
}

/// Validated classifier creation payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTaxon {
    pub name: String,
    pub slug: String,
}

impl TaxonRequest {
    pub fn validate(&self) -> Result<NewTaxon, FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.require("name", &self.name);
        errors.require("slug", &self.slug);
        if let Some(name) = &self.name {
            errors.check("name", validate_name(name));
        }
        if let Some(slug) = &self.slug {
            errors.check("slug", validate_slug(slug));
        }
        errors.into_result()?;

        Ok(NewTaxon {
            name: self.name.clone().unwrap_or_default(),
            slug: self.slug.clone().unwrap_or_default(),
        })
    }
}
