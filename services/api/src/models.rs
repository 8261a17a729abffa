//! API models for request and response payloads

pub mod comment;
pub mod review;
pub mod taxonomy;
pub mod title;
pub mod user;

pub use comment::{Comment, CommentRequest, CommentResponse};
pub use review::{Review, ReviewChanges, ReviewRequest, ReviewResponse};
pub use taxonomy::{NewTaxon, Taxon, TaxonRequest, TaxonomyKind};
pub use title::{Title, TitleChanges, TitleRequest, TitleResponse, TitleWriteResponse};
pub use user::{NewUser, User, UserChanges, UserRequest, UserResponse};

/// Keep an explicit `null` apart from an absent field
///
/// Use with `#[serde(default, deserialize_with = "nullable")]`: an absent
/// field stays `None`, `null` becomes `Some(None)`.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::Deserialize<'de>,
{
    serde::Deserialize::deserialize(deserializer).map(Some)
}

/// Optional text field that must not be blank when present
pub(crate) fn optional_text(
    errors: &mut common::validation::FieldErrors,
    field: &str,
    value: &Option<String>,
    validate: fn(&str) -> Result<(), String>,
) -> Option<String> {
    let value = value.as_ref()?;
    errors.check(field, validate(value));
    Some(value.clone())
}
