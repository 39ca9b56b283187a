mod common;

use common::{hours_from_now, spawn_app, titles, PASSWORD};
use serde_json::{json, Value};

#[tokio::test]
async fn owner_sees_all_own_posts_others_only_visible_ones() {
    let app = spawn_app().await;
    let staff = app.register_staff("admin").await;
    let author = app.register("author").await;
    let reader = app.register("reader").await;
    let category = app.create_category(&staff, "news", true).await;
    app.create_post(&author, "public", category, hours_from_now(-2), true).await;
    app.create_post(&author, "draft", category, hours_from_now(-1), false).await;
    app.create_post(&author, "later", category, hours_from_now(48), true).await;
    app.create_post(&reader, "not mine", category, hours_from_now(-1), true).await;
    let hidden = app.create_category(&staff, "hidden", false).await;
    app.create_post(&author, "tucked away", hidden, hours_from_now(-3), true).await;

    let own = app.json("/profile/author", Some(&author)).await;
    assert_eq!(titles(&own), vec!["later", "draft", "public", "tucked away"]);
    assert_eq!(own["profile"]["username"], "author");

    let foreign = app.json("/profile/author", Some(&reader)).await;
    assert_eq!(titles(&foreign), vec!["public"]);
    let anonymous = app.json("/profile/author", None).await;
    assert_eq!(titles(&anonymous), vec!["public"]);

    assert_eq!(app.get("/profile/nobody", None).await.status(), 404);
}

#[tokio::test]
async fn profile_edit_updates_the_logged_in_user() {
    let app = spawn_app().await;
    let alice = app.register("alice").await;
    app.register("bob").await;

    let update = json!({"user": {"first_name": "Alice", "last_name": "Liddell"}});
    assert_eq!(app.post_json("/edit_profile", None, update.clone()).await.status(), 401);

    let response = app.post_json("/edit_profile", Some(&alice), update).await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["profile"]["firstName"], "Alice");
    assert_eq!(body["profile"]["lastName"], "Liddell");

    let clash = json!({"user": {"username": "bob"}});
    assert_eq!(app.post_json("/edit_profile", Some(&alice), clash).await.status(), 422);
    let invalid = json!({"user": {"email": "not-an-email"}});
    assert_eq!(app.post_json("/edit_profile", Some(&alice), invalid).await.status(), 422);

    let rename = json!({"user": {"username": "alice2"}});
    assert_eq!(app.post_json("/edit_profile", Some(&alice), rename).await.status(), 200);
    assert_eq!(app.get("/profile/alice2", None).await.status(), 200);
    assert_eq!(app.get("/profile/alice", None).await.status(), 404);
}

#[tokio::test]
async fn login_returns_a_usable_token() {
    let app = spawn_app().await;
    app.register("carol").await;

    let response = app
        .post_json(
            "/users/login",
            None,
            json!({"user": {"email": "carol@example.com", "password": "wrong-password"}}),
        )
        .await;
    assert_eq!(response.status(), 422);

    let response = app
        .post_json(
            "/users/login",
            None,
            json!({"user": {"email": "carol@example.com", "password": PASSWORD}}),
        )
        .await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    let token = body["user"]["token"].as_str().unwrap();

    let me = app.json("/user", Some(token)).await;
    assert_eq!(me["user"]["username"], "carol");
    assert_eq!(app.get("/user", Some("garbage")).await.status(), 401);
}

#[tokio::test]
async fn duplicate_registration_is_rejected() {
    let app = spawn_app().await;
    app.register("dave").await;
    let response = app
        .post_json(
            "/users",
            None,
            json!({"user": {"username": "dave", "email": "other@example.com", "password": PASSWORD}}),
        )
        .await;
    assert_eq!(response.status(), 422);
}
