//! List pagination
//!
//! Users are paged by page number (`?page=`); every other collection uses
//! limit/offset (`?limit=&offset=`). Both produce the same envelope, with
//! `next`/`previous` links relative to the request URI.

use std::collections::HashMap;

use axum::http::Uri;
use serde::Serialize;

use crate::error::{ApiError, ApiResult};

/// Default page size for the users collection
const DEFAULT_USERS_PAGE_SIZE: i64 = 10;

/// Default `limit` when the query does not provide one
const DEFAULT_PAGE_LIMIT: i64 = 10;

/// Upper bound for a client-supplied `limit`
const MAX_PAGE_LIMIT: i64 = 100;

/// Pagination configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationConfig {
    pub users_page_size: i64,
    pub default_limit: i64,
    pub max_limit: i64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            users_page_size: DEFAULT_USERS_PAGE_SIZE,
            default_limit: DEFAULT_PAGE_LIMIT,
            max_limit: MAX_PAGE_LIMIT,
        }
    }
}

impl PaginationConfig {
    /// Create a new PaginationConfig from environment variables
    ///
    /// # Environment Variables
    /// - `USERS_PAGE_SIZE`: Users per page (default: 10)
    /// - `DEFAULT_PAGE_LIMIT`: Default `limit` for other lists (default: 10)
    pub fn from_env() -> Self {
        let positive = |name: &str, default: i64| {
            std::env::var(name)
                .ok()
                .and_then(|s| s.parse::<i64>().ok())
                .filter(|value| *value > 0)
                .unwrap_or(default)
        };

        let max_limit = MAX_PAGE_LIMIT;
        Self {
            users_page_size: positive("USERS_PAGE_SIZE", DEFAULT_USERS_PAGE_SIZE),
            default_limit: positive("DEFAULT_PAGE_LIMIT", DEFAULT_PAGE_LIMIT).min(max_limit),
            max_limit,
        }
    }
}

/// Paginated list envelope
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub count: i64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Paginated<T> {
    /// Convert every result, keeping counts and links
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            count: self.count,
            next: self.next,
            previous: self.previous,
            results: self.results.into_iter().map(f).collect(),
        }
    }
}

/// `?limit=&offset=` window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitOffset {
    pub limit: i64,
    pub offset: i64,
}

impl LimitOffset {
    /// Read the window from query parameters; unusable values fall back to
    /// the defaults
    pub fn from_params(params: &HashMap<String, String>, config: &PaginationConfig) -> Self {
        let limit = params
            .get("limit")
            .and_then(|s| s.parse::<i64>().ok())
            .filter(|limit| *limit > 0)
            .map_or(config.default_limit, |limit| limit.min(config.max_limit));

        let offset = params
            .get("offset")
            .and_then(|s| s.parse::<i64>().ok())
            .filter(|offset| *offset >= 0)
            .unwrap_or(0);

        Self { limit, offset }
    }

    pub fn paginate<T>(&self, uri: &Uri, count: i64, results: Vec<T>) -> Paginated<T> {
        let limit = self.limit.to_string();

        let next = self
            .offset
            .checked_add(self.limit)
            .filter(|end| *end < count)
            .map(|end| {
                let offset = end.to_string();
                link(uri, &[("limit", &limit), ("offset", &offset)], &[])
            });

        let previous = (self.offset > 0).then(|| {
            if self.offset - self.limit <= 0 {
                link(uri, &[("limit", &limit)], &["offset"])
            } else {
                let offset = (self.offset - self.limit).to_string();
                link(uri, &[("limit", &limit), ("offset", &offset)], &[])
            }
        });

        Paginated {
            count,
            next,
            previous,
            results,
        }
    }
}

/// `?page=` window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageNumber {
    pub page: i64,
    pub page_size: i64,
}

impl PageNumber {
    /// Read the page number; anything but a positive integer whose offset
    /// fits in an `i64` is 404
    pub fn from_params(
        params: &HashMap<String, String>,
        config: &PaginationConfig,
    ) -> ApiResult<Self> {
        let page = match params.get("page") {
            None => 1,
            Some(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|page| *page > 0)
                .filter(|page| (page - 1).checked_mul(config.users_page_size).is_some())
                .ok_or_else(invalid_page)?,
        };

        Ok(Self {
            page,
            page_size: config.users_page_size,
        })
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    /// Build the envelope; a page past the last one is 404
    pub fn paginate<T>(&self, uri: &Uri, count: i64, results: Vec<T>) -> ApiResult<Paginated<T>> {
        let num_pages = ((count + self.page_size - 1) / self.page_size).max(1);
        if self.page > num_pages {
            return Err(invalid_page());
        }

        let next = (self.page < num_pages).then(|| {
            let page = (self.page + 1).to_string();
            link(uri, &[("page", &page)], &[])
        });

        let previous = (self.page > 1).then(|| {
            if self.page == 2 {
                link(uri, &[], &["page"])
            } else {
                let page = (self.page - 1).to_string();
                link(uri, &[("page", &page)], &[])
            }
        });

        Ok(Paginated {
            count,
            next,
            previous,
            results,
        })
    }
}

fn invalid_page() -> ApiError {
    ApiError::NotFound("Invalid page.".to_string())
}

/// Request path with its query rewritten: `set` pairs replace (or append)
/// parameters and `remove` keys are dropped. Other parameters keep their
/// original order and encoding.
fn link(uri: &Uri, set: &[(&str, &str)], remove: &[&str]) -> String {
    let mut pairs: Vec<String> = uri
        .query()
        .unwrap_or_default()
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter(|pair| {
            let key = pair.split('=').next().unwrap_or_default();
            !remove.contains(&key) && !set.iter().any(|(name, _)| *name == key)
        })
        .map(str::to_string)
        .collect();

    pairs.extend(set.iter().map(|(name, value)| format!("{name}={value}")));

    if pairs.is_empty() {
        uri.path().to_string()
    } else {
        format!("{}?{}", uri.path(), pairs.join("&"))
    }
}
