//! Reviews of titles

use chrono::{DateTime, Utc};
use common::validation::{FieldErrors, validate_score, validate_text};
use serde::{Deserialize, Serialize};

use super::optional_text;

/// Review joined with the names shown on the wire
#[derive(Debug, Clone, PartialEq)]
pub struct Review {
    pub id: i64,
    pub title_id: i64,
    pub title_name: String,
    pub author_id: i64,
    pub author_username: String,
    pub text: String,
    pub score: i16,
    pub pub_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewResponse {
    pub id: i64,
    /// Name of the reviewed title
    pub title: String,
    pub text: String,
    pub score: i16,
    /// Username of the author
    pub author: String,
    pub pub_date: DateTime<Utc>,
}

impl From<Review> for ReviewResponse {
    fn from(review: Review) -> Self {
        Self {
            id: review.id,
            title: review.title_name,
            text: review.text,
            score: review.score,
            author: review.author_username,
            pub_date: review.pub_date,
        }
    }
}

/// Body of review create and update requests
///
/// Author and title come from the caller and the URL; any client-supplied
/// values for them are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub score: Option<i64>,
}

/// Validated review fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewChanges {
    pub text: Option<String>,
    pub score: Option<i16>,
}

impl ReviewRequest {
    pub fn validate(&self, partial: bool) -> Result<ReviewChanges, FieldErrors> {
        let mut errors = FieldErrors::new();
        if !partial {
            errors.require("text", &self.text);
            errors.require("score", &self.score);
        }

        let score = self.score.and_then(|score| {
            errors.check("score", validate_score(score));
            i16::try_from(score).ok()
        });

        let changes = ReviewChanges {
            text: optional_text(&mut errors, "text", &self.text, validate_text),
            score,
        };

        errors.into_result()?;
        Ok(changes)
    }
}
