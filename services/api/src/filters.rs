//! Query-string filters for list endpoints

use std::collections::HashMap;

use common::validation::FieldErrors;

/// Non-empty string parameter
fn text(params: &HashMap<String, String>, key: &str) -> Option<String> {
    params
        .get(key)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Integer parameter; a value that does not parse is recorded as an error
fn integer(params: &HashMap<String, String>, key: &str, errors: &mut FieldErrors) -> Option<i64> {
    let value = text(params, key)?;
    match value.parse::<i64>() {
        Ok(number) => Some(number),
        Err(_) => {
            errors.add(key, "Enter a whole number.");
            None
        }
    }
}

/// Escape `LIKE` wildcards so user input matches literally
pub fn like_escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// `?search=` term
///
/// Users match on a username substring; genres and categories on a
/// case-insensitive name prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilter {
    pub search: Option<String>,
}

impl SearchFilter {
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        Self {
            search: text(params, "search"),
        }
    }
}

/// Title filters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleFilter {
    /// Genre slug
    pub genre: Option<String>,
    /// Category slug
    pub category: Option<String>,
    /// Case-insensitive name substring
    pub name: Option<String>,
    pub year: Option<i64>,
}

impl TitleFilter {
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();
        let filter = Self {
            genre: text(params, "genre"),
            category: text(params, "category"),
            name: text(params, "name"),
            year: integer(params, "year", &mut errors),
        };
        errors.into_result()?;
        Ok(filter)
    }
}

/// Review filters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewFilter {
    /// Author user id
    pub author: Option<i64>,
}

impl ReviewFilter {
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();
        let filter = Self {
            author: integer(params, "author", &mut errors),
        };
        errors.into_result()?;
        Ok(filter)
    }
}

/// Comment filters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentFilter {
    /// Review id
    pub review: Option<i64>,
    /// Author user id
    pub author: Option<i64>,
    /// Case-insensitive text substring
    pub search: Option<String>,
}

impl CommentFilter {
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();
        let filter = Self {
            review: integer(params, "review", &mut errors),
            author: integer(params, "author", &mut errors),
            search: text(params, "search"),
        };
        errors.into_result()?;
        Ok(filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn title_filter_parses_every_field() {
        let filter = TitleFilter::from_params(&params(&[
            ("genre", "drama"),
            ("category", "film"),
            ("name", "sol"),
            ("year", "1972"),
            ("limit", "5"),
        ]))
        .unwrap();

        assert_eq!(
            filter,
            TitleFilter {
                genre: Some("drama".to_string()),
                category: Some("film".to_string()),
                name: Some("sol".to_string()),
                year: Some(1972),
            }
        );
    }

    #[test]
    fn blank_values_are_ignored() {
        let filter = TitleFilter::from_params(&params(&[("genre", ""), ("year", " ")])).unwrap();
        assert_eq!(filter, TitleFilter::default());
    }

    #[test]
    fn non_numeric_ids_are_errors() {
        let errors = CommentFilter::from_params(&params(&[("review", "x"), ("author", "2.5")]))
            .unwrap_err();
        assert!(errors.get("review").is_some());
        assert!(errors.get("author").is_some());

        assert!(TitleFilter::from_params(&params(&[("year", "MMXX")])).is_err());
        assert_eq!(
            ReviewFilter::from_params(&params(&[("author", "4")]))
                .unwrap()
                .author,
            Some(4)
        );
    }

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(like_escape("100%_sure\\"), "100\\%\\_sure\\\\");
        assert_eq!(like_escape("plain"), "plain");
    }
}
