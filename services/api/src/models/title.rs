//! Titles: the works being reviewed

use common::validation::{FieldErrors, NOT_NULL, validate_name, validate_year};
use serde::{Deserialize, Serialize};

use super::{Taxon, nullable, optional_text};

/// Title with its classifiers and computed rating
#[derive(Debug, Clone, PartialEq)]
pub struct Title {
    pub id: i64,
    pub name: String,
    pub year: i32,
    pub description: Option<String>,
    /// Mean review score, `None` while the title has no reviews
    pub rating: Option<f64>,
    pub category: Option<Taxon>,
    pub genres: Vec<Taxon>,
}

/// Read representation: classifiers are nested objects
#[derive(Debug, Clone, Serialize)]
pub struct TitleResponse {
    pub id: i64,
    pub name: String,
    pub year: i32,
    pub rating: Option<f64>,
    pub description: Option<String>,
    pub genre: Vec<Taxon>,
    pub category: Option<Taxon>,
}

impl From<Title> for TitleResponse {
    fn from(title: Title) -> Self {
        Self {
            id: title.id,
            name: title.name,
            year: title.year,
            rating: title.rating,
            description: title.description,
            genre: title.genres,
            category: title.category,
        }
    }
}

/// Write representation: classifiers are referenced by slug
#[derive(Debug, Clone, Serialize)]
pub struct TitleWriteResponse {
    pub id: i64,
    pub name: String,
    pub year: i32,
    pub rating: Option<f64>,
    pub description: Option<String>,
    pub genre: Vec<String>,
    pub category: Option<String>,
}

impl From<Title> for TitleWriteResponse {
    fn from(title: Title) -> Self {
        Self {
            id: title.id,
            name: title.name,
            year: title.year,
            rating: title.rating,
            description: title.description,
            genre: title.genres.into_iter().map(|genre| genre.slug).collect(),
            category: title.category.map(|category| category.slug),
        }
    }
}

/// Body of title create and update requests
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TitleRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub year: Option<i64>,
    /// `Some(None)` clears the description
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    #[serde(default)]
    pub genre: Option<Vec<String>>,
    /// `Some(None)` is rejected; a title always names its category
    #[serde(default, deserialize_with = "nullable")]
    pub category: Option<Option<String>>,
}

/// Validated title fields; classifier slugs are still unresolved
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TitleChanges {
    pub name: Option<String>,
    pub year: Option<i32>,
    /// `Some(None)` clears the description
    pub description: Option<Option<String>>,
    pub genre: Option<Vec<String>>,
    pub category: Option<String>,
}

impl TitleRequest {
    /// Validate a create (`partial == false`) or partial update payload
    ///
    /// The year bound is the calendar year at the time of the call.
    pub fn validate(&self, partial: bool) -> Result<TitleChanges, FieldErrors> {
        let mut errors = FieldErrors::new();
        if !partial {
            errors.require("name", &self.name);
            errors.require("year", &self.year);
            errors.require("genre", &self.genre);
            errors.require("category", &self.category);
        }

        let year = self.year.and_then(|year| {
            errors.check("year", validate_year(year));
            i32::try_from(year).ok()
        });

        let genre = self.genre.as_ref().map(|slugs| {
            let mut unique: Vec<String> = Vec::with_capacity(slugs.len());
            for slug in slugs {
                if !unique.contains(slug) {
                    unique.push(slug.clone());
                }
            }
            unique
        });

        let category = match &self.category {
            Some(None) => {
                errors.add("category", NOT_NULL);
                None
            }
            Some(slug) => slug.clone(),
            None => None,
        };

        let changes = TitleChanges {
            name: optional_text(&mut errors, "name", &self.name, validate_name),
            year,
            description: self.description.clone(),
            genre,
            category,
        };

        errors.into_result()?;
        Ok(changes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Utc};

    fn taxon(id: i64, slug: &str) -> Taxon {
        Taxon {
            id,
            name: slug.to_uppercase(),
            slug: slug.to_string(),
        }
    }

    fn title() -> Title {
        Title {
            id: 1,
            name: "Solaris".to_string(),
            year: 1972,
            description: None,
            rating: Some(8.0),
            category: Some(taxon(1, "film")),
            genres: vec![taxon(1, "drama"), taxon(2, "sci-fi")],
        }
    }

    #[test]
    fn read_representation_nests_classifiers() {
        let json = serde_json::to_value(TitleResponse::from(title())).unwrap();
        assert_eq!(json["genre"][1], serde_json::json!({ "name": "SCI-FI", "slug": "sci-fi" }));
        assert_eq!(json["category"]["slug"], "film");
        assert_eq!(json["rating"], 8.0);
    }

    #[test]
    fn write_representation_uses_slugs() {
        let json = serde_json::to_value(TitleWriteResponse::from(title())).unwrap();
        assert_eq!(json["genre"], serde_json::json!(["drama", "sci-fi"]));
        assert_eq!(json["category"], "film");
    }

    #[test]
    fn rating_is_null_without_reviews() {
        let mut unrated = title();
        unrated.rating = None;
        let json = serde_json::to_value(TitleResponse::from(unrated)).unwrap();
        assert!(json["rating"].is_null());
    }

    #[test]
    fn create_requires_every_field() {
        let errors = TitleRequest::default().validate(false).unwrap_err();
        for field in ["name", "year", "genre", "category"] {
            assert!(errors.get(field).is_some(), "{field}");
        }
        assert!(TitleRequest::default().validate(true).is_ok());
    }

    #[test]
    fn rejects_future_year() {
        let next_year = i64::from(Utc::now().year()) + 1;
        let payload = TitleRequest {
            year: Some(next_year),
            ..Default::default()
        };
        let errors = payload.validate(true).unwrap_err();
        assert!(errors.get("year").is_some());
    }

    #[test]
    fn null_description_is_kept_apart_from_absent() {
        let cleared: TitleRequest = serde_json::from_str(r#"{"description": null}"#).unwrap();
        assert_eq!(cleared.validate(true).unwrap().description, Some(None));

        let untouched: TitleRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(untouched.validate(true).unwrap().description, None);

        let set: TitleRequest = serde_json::from_str(r#"{"description": "New"}"#).unwrap();
        assert_eq!(
            set.validate(true).unwrap().description,
            Some(Some("New".to_string()))
        );
    }

    #[test]
    fn null_category_is_rejected() {
        let payload: TitleRequest = serde_json::from_str(r#"{"category": null}"#).unwrap();
        let errors = payload.validate(true).unwrap_err();
        assert_eq!(errors.get("category"), Some(&[NOT_NULL.to_string()][..]));
    }

    #[test]
    fn duplicate_genre_slugs_collapse() {
        let payload = TitleRequest {
            genre: Some(vec!["drama".into(), "drama".into(), "comedy".into()]),
            ..Default::default()
        };
        let changes = payload.validate(true).unwrap();
        assert_eq!(changes.genre, Some(vec!["drama".to_string(), "comedy".to_string()]));
    }
}
