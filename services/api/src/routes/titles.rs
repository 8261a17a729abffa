//! `titles/` endpoints
//!
//! Reads return nested genre and category objects; writes accept slugs and
//! answer with the slug form.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
};
use common::{extract::JsonBody, validation::FieldErrors};
use tracing::info;

use super::{Params, parse_id};
use crate::{
    error::{ApiError, ApiResult},
    filters::TitleFilter,
    middleware::CurrentUser,
    models::{TitleChanges, TitleRequest, TitleResponse, TitleWriteResponse},
    pagination::{LimitOffset, Paginated},
    permissions::{IsAdminOrReadOnly, check_permission},
    repositories::{TitleRecord, TitleUpdate},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/titles/", get(list_titles).post(create_title))
        .route(
            "/api/v1/titles/:title_id/",
            get(get_title)
                .put(replace_title)
                .patch(update_title)
                .delete(delete_title),
        )
}

/// Resolved classifier references of a write payload
struct Classifiers {
    category_id: Option<i64>,
    genre_ids: Option<Vec<i64>>,
}

/// Look up the category and genre slugs named by `changes`
///
/// Unknown slugs are reported as field errors.
async fn resolve_classifiers(state: &AppState, changes: &TitleChanges) -> ApiResult<Classifiers> {
    let mut errors = FieldErrors::new();

    let category_id = match &changes.category {
        Some(slug) => match state.category_repository.find_by_slug(slug).await? {
            Some(category) => Some(category.id),
            None => {
                errors.add("category", format!("Object with slug={slug} does not exist."));
                None
            }
        },
        None => None,
    };

    let genre_ids = match &changes.genre {
        Some(slugs) => {
            let genres = state.genre_repository.find_by_slugs(slugs).await?;
            let mut ids = Vec::with_capacity(slugs.len());
            for slug in slugs {
                match genres.iter().find(|genre| &genre.slug == slug) {
                    Some(genre) => ids.push(genre.id),
                    None => errors.add("genre", format!("Object with slug={slug} does not exist.")),
                }
            }
            Some(ids)
        }
        None => None,
    };

    errors.into_result()?;
    Ok(Classifiers {
        category_id,
        genre_ids,
    })
}

pub async fn list_titles(
    State(state): State<AppState>,
    method: Method,
    caller: CurrentUser,
    uri: Uri,
    Query(params): Query<Params>,
) -> ApiResult<Json<Paginated<TitleResponse>>> {
    check_permission(&IsAdminOrReadOnly, &method, caller.user())?;

    let window = LimitOffset::from_params(&params, &state.pagination);
    let filter = TitleFilter::from_params(&params)?;
    let (titles, count) = state
        .title_repository
        .list(&filter, window.limit, window.offset)
        .await?;

    Ok(Json(
        window.paginate(&uri, count, titles).map(TitleResponse::from),
    ))
}

pub async fn get_title(
    State(state): State<AppState>,
    method: Method,
    caller: CurrentUser,
    Path(title_id): Path<String>,
) -> ApiResult<Json<TitleResponse>> {
    check_permission(&IsAdminOrReadOnly, &method, caller.user())?;

    let title = state
        .title_repository
        .find_by_id(parse_id(&title_id)?)
        .await?
        .ok_or_else(ApiError::not_found)?;

    Ok(Json(TitleResponse::from(title)))
}

pub async fn create_title(
    State(state): State<AppState>,
    method: Method,
    caller: CurrentUser,
    JsonBody(payload): JsonBody<TitleRequest>,
) -> ApiResult<Response> {
    check_permission(&IsAdminOrReadOnly, &method, caller.user())?;

    let changes = payload.validate(false)?;
    let classifiers = resolve_classifiers(&state, &changes).await?;

    let record = TitleRecord {
        name: changes.name.unwrap_or_default(),
        year: changes.year.unwrap_or_default(),
        description: changes.description.flatten(),
        category_id: classifiers.category_id,
        genre_ids: classifiers.genre_ids.unwrap_or_default(),
    };
    let title = state.title_repository.create(&record).await?;
    info!(title_id = title.id, "Title created");

    Ok((StatusCode::CREATED, Json(TitleWriteResponse::from(title))).into_response())
}

pub async fn replace_title(
    state: State<AppState>,
    method: Method,
    caller: CurrentUser,
    path: Path<String>,
    payload: JsonBody<TitleRequest>,
) -> ApiResult<Json<TitleWriteResponse>> {
    apply_title_update(state, method, caller, path, payload, false).await
}

pub async fn update_title(
    state: State<AppState>,
    method: Method,
    caller: CurrentUser,
    path: Path<String>,
    payload: JsonBody<TitleRequest>,
) -> ApiResult<Json<TitleWriteResponse>> {
    apply_title_update(state, method, caller, path, payload, true).await
}

async fn apply_title_update(
    State(state): State<AppState>,
    method: Method,
    caller: CurrentUser,
    Path(title_id): Path<String>,
    JsonBody(payload): JsonBody<TitleRequest>,
    partial: bool,
) -> ApiResult<Json<TitleWriteResponse>> {
    check_permission(&IsAdminOrReadOnly, &method, caller.user())?;

    let title_id = parse_id(&title_id)?;
    if !state.title_repository.exists(title_id).await? {
        return Err(ApiError::not_found());
    }

    let changes = payload.validate(partial)?;
    let classifiers = resolve_classifiers(&state, &changes).await?;

    let update = TitleUpdate {
        name: changes.name,
        year: changes.year,
        description: changes.description,
        category_id: classifiers.category_id,
        genre_ids: classifiers.genre_ids,
    };
    let title = state
        .title_repository
        .update(title_id, &update)
        .await?
        .ok_or_else(ApiError::not_found)?;

    Ok(Json(TitleWriteResponse::from(title)))
}

/// Delete a title with its reviews and their comments
pub async fn delete_title(
    State(state): State<AppState>,
    method: Method,
    caller: CurrentUser,
    Path(title_id): Path<String>,
) -> ApiResult<StatusCode> {
    check_permission(&IsAdminOrReadOnly, &method, caller.user())?;

    let title_id = parse_id(&title_id)?;
    if !state.title_repository.delete(title_id).await? {
        return Err(ApiError::not_found());
    }
    info!(title_id, "Title deleted");

    Ok(StatusCode::NO_CONTENT)
}
