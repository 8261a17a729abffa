//! Categories, genres and titles.

mod support;

use axum::http::StatusCode;
use chrono::{Datelike, Utc};
use serde_json::json;
use sqlx::PgPool;
use support::{build_app, create_review, create_taxon, create_title, create_user, send};

#[sqlx::test(migrations = "../../libs/common/migrations")]
async fn test_health_endpoint(pool: PgPool) {
    let (status, body) = send(build_app(pool), "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], true);
}

#[sqlx::test(migrations = "../../libs/common/migrations")]
async fn test_categories_are_public_but_admin_writable(pool: PgPool) {
    let (_, user_token) = create_user(&pool, "reader", "user").await;
    let (_, admin_token) = create_user(&pool, "boss", "admin").await;
    let payload = json!({ "name": "Film", "slug": "film" });

    let (status, _) = send(
        build_app(pool.clone()),
        "POST",
        "/api/v1/categories/",
        None,
        Some(payload.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        build_app(pool.clone()),
        "POST",
        "/api/v1/categories/",
        Some(&user_token),
        Some(payload.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        build_app(pool.clone()),
        "POST",
        "/api/v1/categories/",
        Some(&admin_token),
        Some(payload.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({ "name": "Film", "slug": "film" }));

    let (status, body) = send(
        build_app(pool.clone()),
        "POST",
        "/api/v1/categories/",
        Some(&admin_token),
        Some(payload),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["slug"].is_array());

    let (status, body) = send(build_app(pool), "GET", "/api/v1/categories/", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["next"], serde_json::Value::Null);
    assert_eq!(body["results"][0]["slug"], "film");
}

#[sqlx::test(migrations = "../../libs/common/migrations")]
async fn test_invalid_slug_is_rejected(pool: PgPool) {
    let (_, admin_token) = create_user(&pool, "boss", "admin").await;

    let (status, body) = send(
        build_app(pool),
        "POST",
        "/api/v1/genres/",
        Some(&admin_token),
        Some(json!({ "name": "Drama", "slug": "not a slug!" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["slug"].is_array());
}

#[sqlx::test(migrations = "../../libs/common/migrations")]
async fn test_taxonomy_search_and_limit_offset(pool: PgPool) {
    for (name, slug) in [("Drama", "drama"), ("Documentary", "doc"), ("Comedy", "comedy")] {
        create_taxon(&pool, "genres", name, slug).await;
    }

    let (status, body) = send(
        build_app(pool.clone()),
        "GET",
        "/api/v1/genres/?search=d",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);

    let (status, body) = send(
        build_app(pool),
        "GET",
        "/api/v1/genres/?limit=1&offset=1",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 3);
    assert_eq!(body["results"].as_array().unwrap().len(), 1);
    assert_eq!(body["next"], "/api/v1/genres/?limit=1&offset=2");
    assert_eq!(body["previous"], "/api/v1/genres/?limit=1");
}

#[sqlx::test(migrations = "../../libs/common/migrations")]
async fn test_deleting_category_detaches_titles(pool: PgPool) {
    let (_, admin_token) = create_user(&pool, "boss", "admin").await;
    let film = create_taxon(&pool, "categories", "Film", "film").await;
    let drama = create_taxon(&pool, "genres", "Drama", "drama").await;
    let title_id = create_title(&pool, "Solaris", 1972, Some(film), &[drama]).await;

    let (status, _) = send(
        build_app(pool.clone()),
        "DELETE",
        "/api/v1/categories/film/",
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(
        build_app(pool.clone()),
        "DELETE",
        "/api/v1/categories/film/",
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        build_app(pool.clone()),
        "DELETE",
        "/api/v1/genres/drama/",
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(
        build_app(pool),
        "GET",
        &format!("/api/v1/titles/{title_id}/"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["category"], serde_json::Value::Null);
    assert_eq!(body["genre"], json!([]));
}

#[sqlx::test(migrations = "../../libs/common/migrations")]
async fn test_create_title_returns_slugs_and_reads_nest_objects(pool: PgPool) {
    let (_, admin_token) = create_user(&pool, "boss", "admin").await;
    create_taxon(&pool, "categories", "Film", "film").await;
    create_taxon(&pool, "genres", "Drama", "drama").await;
    create_taxon(&pool, "genres", "Sci-Fi", "sci-fi").await;

    let (status, body) = send(
        build_app(pool.clone()),
        "POST",
        "/api/v1/titles/",
        Some(&admin_token),
        Some(json!({
            "name": "Solaris",
            "year": 1972,
            "description": "A psychologist visits a space station.",
            "genre": ["drama", "sci-fi"],
            "category": "film"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["genre"], json!(["drama", "sci-fi"]));
    assert_eq!(body["category"], "film");
    let id = body["id"].as_i64().unwrap();

    let (status, body) = send(
        build_app(pool),
        "GET",
        &format!("/api/v1/titles/{id}/"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["category"], json!({ "name": "Film", "slug": "film" }));
    assert_eq!(body["genre"][1], json!({ "name": "Sci-Fi", "slug": "sci-fi" }));
    assert_eq!(body["rating"], serde_json::Value::Null);
}

#[sqlx::test(migrations = "../../libs/common/migrations")]
async fn test_title_validation_errors(pool: PgPool) {
    let (_, admin_token) = create_user(&pool, "boss", "admin").await;
    create_taxon(&pool, "categories", "Film", "film").await;
    create_taxon(&pool, "genres", "Drama", "drama").await;
    let next_year = Utc::now().year() + 1;

    let (status, body) = send(
        build_app(pool.clone()),
        "POST",
        "/api/v1/titles/",
        Some(&admin_token),
        Some(json!({ "name": "Later", "year": next_year, "genre": ["drama"], "category": "film" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["year"].is_array());

    let (status, body) = send(
        build_app(pool.clone()),
        "POST",
        "/api/v1/titles/",
        Some(&admin_token),
        Some(json!({ "name": "Odd", "year": 2000, "genre": ["western"], "category": "film" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["genre"][0], "Object with slug=western does not exist.");

    let (status, body) = send(
        build_app(pool.clone()),
        "POST",
        "/api/v1/titles/",
        Some(&admin_token),
        Some(json!({ "name": "Odd", "year": 2000, "genre": ["drama"], "category": "book" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["category"].is_array());

    let (status, body) = send(
        build_app(pool),
        "POST",
        "/api/v1/titles/",
        Some(&admin_token),
        Some(json!({ "year": 2000 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["name"][0], "This field is required.");
}

#[sqlx::test(migrations = "../../libs/common/migrations")]
async fn test_patch_title_replaces_genres_only_when_given(pool: PgPool) {
    let (_, admin_token) = create_user(&pool, "boss", "admin").await;
    let film = create_taxon(&pool, "categories", "Film", "film").await;
    let drama = create_taxon(&pool, "genres", "Drama", "drama").await;
    create_taxon(&pool, "genres", "Comedy", "comedy").await;
    let title_id = create_title(&pool, "Solaris", 1972, Some(film), &[drama]).await;
    let uri = format!("/api/v1/titles/{title_id}/");

    let (status, body) = send(
        build_app(pool.clone()),
        "PATCH",
        &uri,
        Some(&admin_token),
        Some(json!({ "name": "Solaris (1972)" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Solaris (1972)");
    assert_eq!(body["genre"], json!(["drama"]));
    assert_eq!(body["year"], 1972);

    let (status, body) = send(
        build_app(pool.clone()),
        "PATCH",
        &uri,
        Some(&admin_token),
        Some(json!({ "genre": ["comedy"] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["genre"], json!(["comedy"]));

    let (status, _) = send(
        build_app(pool),
        "PATCH",
        "/api/v1/titles/9999/",
        Some(&admin_token),
        Some(json!({ "name": "Nothing" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../libs/common/migrations")]
async fn test_title_filters(pool: PgPool) {
    let film = create_taxon(&pool, "categories", "Film", "film").await;
    let book = create_taxon(&pool, "categories", "Book", "book").await;
    let drama = create_taxon(&pool, "genres", "Drama", "drama").await;
    let comedy = create_taxon(&pool, "genres", "Comedy", "comedy").await;
    create_title(&pool, "Solaris", 1972, Some(film), &[drama]).await;
    create_title(&pool, "Stalker", 1979, Some(film), &[drama, comedy]).await;
    create_title(&pool, "Roadside Picnic", 1972, Some(book), &[comedy]).await;

    let cases = [
        ("genre=comedy", 2),
        ("category=film", 2),
        ("name=sta", 1),
        ("year=1972", 2),
        ("category=film&genre=comedy", 1),
        ("genre=western", 0),
    ];
    for (query, expected) in cases {
        let (status, body) = send(
            build_app(pool.clone()),
            "GET",
            &format!("/api/v1/titles/?{query}"),
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{query}");
        assert_eq!(body["count"], expected, "{query}");
    }

    let (status, body) = send(build_app(pool), "GET", "/api/v1/titles/?year=abc", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["year"].is_array());
}

#[sqlx::test(migrations = "../../libs/common/migrations")]
async fn test_rating_is_average_of_review_scores(pool: PgPool) {
    let title_id = create_title(&pool, "Solaris", 1972, None, &[]).await;
    for (name, score) in [("alice", 8), ("bob", 6), ("carol", 10)] {
        let (user_id, _) = create_user(&pool, name, "user").await;
        create_review(&pool, title_id, user_id, score).await;
    }

    let (status, body) = send(
        build_app(pool.clone()),
        "GET",
        &format!("/api/v1/titles/{title_id}/"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rating"].as_f64(), Some(8.0));

    let (_, body) = send(build_app(pool), "GET", "/api/v1/titles/", None, None).await;
    assert_eq!(body["results"][0]["rating"].as_f64(), Some(8.0));
}

#[sqlx::test(migrations = "../../libs/common/migrations")]
async fn test_delete_title_cascades_to_reviews(pool: PgPool) {
    let (_, admin_token) = create_user(&pool, "boss", "admin").await;
    let (user_id, _) = create_user(&pool, "alice", "user").await;
    let title_id = create_title(&pool, "Solaris", 1972, None, &[]).await;
    create_review(&pool, title_id, user_id, 7).await;

    let (status, _) = send(
        build_app(pool.clone()),
        "DELETE",
        &format!("/api/v1/titles/{title_id}/"),
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let reviews: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reviews")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(reviews, 0);

    let (status, _) = send(build_app(pool), "GET", "/api/v1/titles/abc/", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../libs/common/migrations")]
async fn test_null_description_clears_and_null_category_is_rejected(pool: PgPool) {
    let (_, admin_token) = create_user(&pool, "boss", "admin").await;
    let film = create_taxon(&pool, "categories", "Film", "film").await;
    let title_id = create_title(&pool, "Solaris", 1972, Some(film), &[]).await;
    sqlx::query("UPDATE titles SET description = 'old' WHERE id = $1")
        .bind(title_id)
        .execute(&pool)
        .await
        .unwrap();
    let uri = format!("/api/v1/titles/{title_id}/");

    let (status, body) = send(
        build_app(pool.clone()),
        "PATCH",
        &uri,
        Some(&admin_token),
        Some(json!({ "name": "Solaris (1972)" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["description"], "old");

    let (status, body) = send(
        build_app(pool.clone()),
        "PATCH",
        &uri,
        Some(&admin_token),
        Some(json!({ "description": null })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["description"], serde_json::Value::Null);

    let (status, body) = send(
        build_app(pool.clone()),
        "PATCH",
        &uri,
        Some(&admin_token),
        Some(json!({ "category": null })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["category"][0], "This field may not be null.");

    let (_, body) = send(build_app(pool), "GET", &uri, None, None).await;
    assert_eq!(body["category"]["slug"], "film");
    assert_eq!(body["name"], "Solaris (1972)");
}

#[sqlx::test(migrations = "../../libs/common/migrations")]
async fn test_pagination_survives_extreme_query_values(pool: PgPool) {
    let (_, admin_token) = create_user(&pool, "boss", "admin").await;
    create_taxon(&pool, "genres", "Drama", "drama").await;
    let max = i64::MAX;

    let (status, body) = send(
        build_app(pool.clone()),
        "GET",
        &format!("/api/v1/genres/?offset={max}"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["results"], json!([]));
    assert_eq!(body["next"], serde_json::Value::Null);

    let (status, body) = send(
        build_app(pool),
        "GET",
        &format!("/api/v1/users/?page={max}"),
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Invalid page.");
}
