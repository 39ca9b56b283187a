mod common;

use common::{hours_from_now, spawn_app, titles};
use serde_json::{json, Value};

#[tokio::test]
async fn admin_requires_staff() {
    let app = spawn_app().await;
    let user = app.register("user").await;
    assert_eq!(app.get("/admin/categories", None).await.status(), 401);
    assert_eq!(app.get("/admin/categories", Some(&user)).await.status(), 403);
    let staff = app.register_staff("admin").await;
    let body = app.json("/admin/categories", Some(&staff)).await;
    assert_eq!(body["count"], 0);
    assert_eq!(body["emptyValueDisplay"], "Не задано");
}

#[tokio::test]
async fn category_crud_validates_slugs() {
    let app = spawn_app().await;
    let staff = app.register_staff("admin").await;
    let id = app.create_category(&staff, "travel", true).await;

    let duplicate = json!({"title": "Again", "description": "d", "slug": "travel"});
    let response = app.post_json("/admin/categories", Some(&staff), duplicate).await;
    assert_eq!(response.status(), 422);

    let bad_slug = json!({"title": "Bad", "description": "d", "slug": "no spaces"});
    let response = app.post_json("/admin/categories", Some(&staff), bad_slug).await;
    assert_eq!(response.status(), 422);

    let response = app
        .put_json(
            &format!("/admin/categories/{}", id),
            &staff,
            json!({"title": "Journeys", "isPublished": false}),
        )
        .await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["title"], "Journeys");
    assert_eq!(body["slug"], "travel");
    assert_eq!(body["isPublished"], false);
    assert_eq!(app.get("/category/travel", None).await.status(), 404);

    assert_eq!(
        app.delete(&format!("/admin/categories/{}", id), &staff).await.status(),
        204
    );
    assert_eq!(
        app.get(&format!("/admin/categories/{}", id), Some(&staff)).await.status(),
        404
    );
}

#[tokio::test]
async fn deleting_a_category_keeps_its_posts_uncategorised() {
    let app = spawn_app().await;
    let staff = app.register_staff("admin").await;
    let author = app.register("author").await;
    let category = app.create_category(&staff, "temp", true).await;
    let post = app.create_post(&author, "survivor", category, hours_from_now(-1), true).await;

    let detail = app
        .json(&format!("/admin/categories/{}", category), Some(&staff))
        .await;
    assert_eq!(titles(&detail), vec!["survivor"]);

    app.delete(&format!("/admin/categories/{}", category), &staff).await;
    let detail = app.json(&format!("/posts/{}", post), None).await;
    assert!(detail["post"]["category"].is_null());
    assert_eq!(titles(&app.json("/", None).await), vec!["survivor"]);
}

#[tokio::test]
async fn locations_are_shown_only_when_published_and_cleared_on_delete() {
    let app = spawn_app().await;
    let staff = app.register_staff("admin").await;
    let author = app.register("author").await;
    let category = app.create_category(&staff, "news", true).await;
    let location = app.create_location(&staff, "Moscow", true).await;
    let post = app.create_post(&author, "here", category, hours_from_now(-1), true).await;

    let form = reqwest::multipart::Form::new().text("location", location.to_string());
    let response = app
        .post_form(&format!("/posts/{}/edit", post), Some(&author), form)
        .await;
    assert_eq!(response.status(), 200);
    let path = format!("/posts/{}", post);
    assert_eq!(app.json(&path, None).await["post"]["location"]["name"], "Moscow");

    let response = app
        .put_json(
            &format!("/admin/locations/{}", location),
            &staff,
            json!({"isPublished": false}),
        )
        .await;
    assert_eq!(response.status(), 200);
    assert!(app.json(&path, None).await["post"]["location"].is_null());

    let listing = app.json("/admin/posts", Some(&staff)).await;
    assert_eq!(listing["items"][0]["location"], "Moscow");

    assert_eq!(
        app.delete(&format!("/admin/locations/{}", location), &staff).await.status(),
        204
    );
    let listing = app.json("/admin/posts", Some(&staff)).await;
    assert!(listing["items"][0]["location"].is_null());
}

#[tokio::test]
async fn admin_post_listing_searches_and_edits() {
    let app = spawn_app().await;
    let staff = app.register_staff("admin").await;
    let author = app.register("author").await;
    let news = app.create_category(&staff, "news", true).await;
    let sport = app.create_category(&staff, "sport", true).await;
    let match_report = app.create_post(&author, "Match report", news, hours_from_now(-2), true).await;
    app.create_post(&author, "Weather", news, hours_from_now(-1), false).await;
    app.create_post(&author, "100% rain", news, hours_from_now(-3), false).await;

    let found = app.json("/admin/posts?search=Match", Some(&staff)).await;
    assert_eq!(found["count"], 1);
    assert_eq!(found["items"][0]["title"], "Match report");

    let percent = app.json("/admin/posts?search=%25", Some(&staff)).await;
    assert_eq!(percent["count"], 1);
    assert_eq!(percent["items"][0]["title"], "100% rain");
    let underscore = app.json("/admin/posts?search=_", Some(&staff)).await;
    assert_eq!(underscore["count"], 0);

    let drafts = app.json("/admin/posts?is_published=false&search=Weather", Some(&staff)).await;
    assert_eq!(drafts["count"], 1);
    assert_eq!(drafts["items"][0]["title"], "Weather");
    let drafts = app.json("/admin/posts?is_published=false", Some(&staff)).await;
    assert_eq!(drafts["count"], 2);

    let response = app
        .put_json(
            &format!("/admin/posts/{}", match_report),
            &staff,
            json!({"category": sport, "isPublished": false}),
        )
        .await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["category"], "Category sport");
    assert_eq!(body["isPublished"], false);
    assert_eq!(app.json("/", None).await["postsCount"], 0);

    let response = app
        .put_json(
            &format!("/admin/posts/{}", match_report),
            &staff,
            json!({"category": 9999}),
        )
        .await;
    assert_eq!(response.status(), 422);

    assert_eq!(
        app.delete(&format!("/admin/posts/{}", match_report), &staff).await.status(),
        204
    );
    assert_eq!(app.json("/admin/posts", Some(&staff)).await["count"], 2);
}

#[tokio::test]
async fn admin_moderates_comments() {
    let app = spawn_app().await;
    let staff = app.register_staff("admin").await;
    let author = app.register("author").await;
    let category = app.create_category(&staff, "news", true).await;
    let post = app.create_post(&author, "topic", category, hours_from_now(-1), true).await;
    app.post_json(
        &format!("/posts/{}/comment", post),
        Some(&author),
        json!({"comment": {"text": "spam"}}),
    )
    .await;

    let listing = app.json("/admin/comments", Some(&staff)).await;
    assert_eq!(listing["count"], 1);
    assert_eq!(listing["items"][0]["author"], "author");
    assert_eq!(listing["items"][0]["isPublished"], true);
    let id = listing["items"][0]["id"].as_i64().unwrap();

    let response = app
        .put_json(
            &format!("/admin/comments/{}", id),
            &staff,
            json!({"isPublished": false}),
        )
        .await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["isPublished"], false);

    assert_eq!(
        app.delete(&format!("/admin/comments/{}", id), &staff).await.status(),
        204
    );
    assert_eq!(app.json("/admin/comments", Some(&staff)).await["count"], 0);
}
