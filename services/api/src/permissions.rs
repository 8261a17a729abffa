//! Role-based permission policies
//!
//! Each policy answers two questions: may the caller issue this request at
//! all, and may it act on a particular object. Request-level checks run
//! before the object is looked up, object-level checks after.

use axum::http::Method;

use crate::{
    error::{ApiError, ApiResult},
    models::User,
};

/// GET, HEAD and OPTIONS never modify anything
pub fn is_safe_method(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

/// Access policy for an endpoint
pub trait Permission {
    fn has_permission(&self, method: &Method, user: Option<&User>) -> bool;

    /// The last argument is the author of the object being accessed
    fn has_object_permission(&self, method: &Method, user: Option<&User>, _owner_id: i64) -> bool {
        self.has_permission(method, user)
    }
}

/// Administrators only
pub struct IsAdmin;

impl Permission for IsAdmin {
    fn has_permission(&self, _method: &Method, user: Option<&User>) -> bool {
        user.is_some_and(User::is_admin)
    }
}

/// Anyone may read; only administrators may write
pub struct IsAdminOrReadOnly;

impl Permission for IsAdminOrReadOnly {
    fn has_permission(&self, method: &Method, user: Option<&User>) -> bool {
        is_safe_method(method) || user.is_some_and(User::is_admin)
    }
}

/// Anyone may read; authenticated callers may create; only the author, a
/// moderator or an administrator may change an existing object
pub struct IsAdminModeratorOwnerOrReadOnly;

impl Permission for IsAdminModeratorOwnerOrReadOnly {
    fn has_permission(&self, method: &Method, user: Option<&User>) -> bool {
        is_safe_method(method) || user.is_some()
    }

    fn has_object_permission(&self, method: &Method, user: Option<&User>, owner_id: i64) -> bool {
        if is_safe_method(method) {
            return true;
        }
        user.is_some_and(|user| user.id == owner_id || user.is_moderator() || user.is_admin())
    }
}

fn denied(user: Option<&User>) -> ApiError {
    match user {
        None => ApiError::Unauthorized("Authentication credentials were not provided.".to_string()),
        Some(_) => ApiError::Forbidden,
    }
}

/// Request-level check: 401 for anonymous callers, 403 otherwise
pub fn check_permission<P: Permission>(policy: &P, method: &Method, user: Option<&User>) -> ApiResult<()> {
    if policy.has_permission(method, user) {
        Ok(())
    } else {
        Err(denied(user))
    }
}

/// Object-level check, same failure statuses as [`check_permission`]
pub fn check_object_permission<P: Permission>(
    policy: &P,
    method: &Method,
    user: Option<&User>,
    owner_id: i64,
) -> ApiResult<()> {
    if policy.has_object_permission(method, user, owner_id) {
        Ok(())
    } else {
        Err(denied(user))
    }
}
