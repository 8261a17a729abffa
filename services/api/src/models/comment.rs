//! Comments on reviews

use chrono::{DateTime, Utc};
use common::validation::{FieldErrors, validate_text};
use serde::{Deserialize, Serialize};

/// Comment joined with the values shown on the wire
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub id: i64,
    pub review_id: i64,
    pub review_text: String,
    pub author_id: i64,
    pub author_username: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentResponse {
    pub id: i64,
    /// Text of the parent review
    pub review: String,
    pub text: String,
    pub author: String,
    pub pub_date: DateTime<Utc>,
}

impl From<Comment> for CommentResponse {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            review: comment.review_text,
            text: comment.text,
            author: comment.author_username,
            pub_date: comment.pub_date,
        }
    }
}

/// Body of comment create and update requests
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentRequest {
    #[serde(default)]
    pub text: Option<String>,
}

impl CommentRequest {
    /// Validated text; `None` only for a partial update without `text`
    pub fn validate(&self, partial: bool) -> Result<Option<String>, FieldErrors> {
        let mut errors = FieldErrors::new();
        if !partial {
            errors.require("text", &self.text);
        }
        if let Some(text) = &self.text {
            errors.check("text", validate_text(text));
        }
        errors.into_result()?;
        Ok(self.text.clone())
    }
}
