//! Admin inventory endpoint tests.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::{Method, StatusCode};
use serde_json::{Value, json};

use longbox_core::Collection;
use longbox_integration_tests::TestApp;

fn inventory() -> Vec<Value> {
    vec![
        json!({"_id": {"$oid": "65f1c0ffee0000000000abcd"}, "title": "Oid", "prices": {"price": 3}}),
        json!({"_id": "hulk-181", "title": "Literal", "price": 9.99}),
        json!({"_id": 1689, "title": "Integer"}),
    ]
}

#[tokio::test]
async fn test_requires_privileged_identity() {
    let app = TestApp::with_comics(inventory());

    let anonymous = app.get("/api/admin/inventory").await;
    assert_eq!(anonymous.status, StatusCode::FORBIDDEN);

    let stranger = app
        .as_user(Method::DELETE, "/api/admin/inventory/1689", "joker", None)
        .await;
    assert_eq!(stranger.status, StatusCode::FORBIDDEN);
    assert_eq!(app.store.snapshot(Collection::Comics).await.len(), 3);
}

#[tokio::test]
async fn test_list_prefers_explicit_fields() {
    let app = TestApp::with_comics(inventory());

    let items = app
        .as_admin(Method::GET, "/api/admin/inventory", None)
        .await
        .json();

    assert_eq!(items[0]["price"], 3.0);
    assert_eq!(items[1]["price"], 9.99);
    assert_eq!(items[2]["price"], 2.0);
    assert_eq!(items[2]["id"], "1689");
    assert_eq!(items[0]["image"], "https://placedog.net/500/280");
}

#[tokio::test]
async fn test_create_then_visible_in_catalog() {
    let app = TestApp::new();

    let res = app
        .as_admin(
            Method::POST,
            "/api/admin/inventory",
            Some(&json!({"title": "  ", "price": "4.50", "image": "https://img/x.png"})),
        )
        .await;

    assert_eq!(res.status, StatusCode::CREATED);
    let item = res.json();
    assert_eq!(item["title"], "Untitled");
    assert_eq!(item["price"], 4.5);
    assert_eq!(item["image"], "https://img/x.png");
    assert!(item["createdAt"].as_str().unwrap().ends_with('Z'));

    let catalog = app.get("/api/comics").await.json();
    assert_eq!(catalog["results"][0]["id"], item["id"]);
    assert_eq!(catalog["results"][0]["price"], 4.5);
}

#[tokio::test]
async fn test_update_by_each_id_representation() {
    let app = TestApp::with_comics(inventory());

    for (id, title) in [
        ("65f1c0ffee0000000000abcd", "First"),
        ("hulk-181", "Second"),
        ("1689", "Third"),
    ] {
        let res = app
            .as_admin(
                Method::PUT,
                &format!("/api/admin/inventory/{id}"),
                Some(&json!({"title": title})),
            )
            .await;
        assert_eq!(res.status, StatusCode::OK, "{id}");

        let body = res.json();
        assert_eq!(body["item"]["title"], title);
        assert_eq!(body["matchedCount"], 1);
        assert_eq!(body["modifiedCount"], 1);
        assert_eq!(body["unmodified"], false);
    }
}

#[tokio::test]
async fn test_update_with_same_values_reports_unmodified() {
    let app = TestApp::with_comics(inventory());

    let body = app
        .as_admin(
            Method::PUT,
            "/api/admin/inventory/hulk-181",
            Some(&json!({"title": "Literal"})),
        )
        .await
        .json();

    assert_eq!(body["matchedCount"], 1);
    assert_eq!(body["modifiedCount"], 0);
    assert_eq!(body["unmodified"], true);
}

#[tokio::test]
async fn test_price_update_reaches_public_catalog() {
    let app = TestApp::with_comics(vec![json!({
        "_id": 1,
        "title": "Batman: The Long Halloween",
        "prices": [{"type": "printPrice", "price": 3.0}]
    })]);

    let res = app
        .as_admin(
            Method::PUT,
            "/api/admin/inventory/1",
            Some(&json!({"price": 25.0})),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["item"]["price"], 25.0);

    let catalog = app.get("/api/comics?limit=200").await.json();
    assert_eq!(catalog["results"][0]["price"], 25.0);

    let expensive = app.get("/api/comics?priceRange=20%2B").await.json();
    assert_eq!(expensive["totalResults"], 1);

    let cheap = app.get("/api/comics?priceRange=%3C5").await.json();
    assert_eq!(cheap["totalResults"], 0);

    let series = app.get("/api/comics/series/halloween").await.json();
    assert_eq!(series[0]["price"], 25.0);
}

#[tokio::test]
async fn test_stored_zero_price_lists_as_sentinel() {
    let app = TestApp::with_comics(vec![json!({"_id": 2, "title": "Freebie", "price": 0})]);

    let items = app
        .as_admin(Method::GET, "/api/admin/inventory", None)
        .await
        .json();

    assert_eq!(items[0]["price"], 2.0);
}

#[tokio::test]
async fn test_update_price_null_is_kept_distinct_from_omission() {
    let app = TestApp::with_comics(inventory());

    let nulled = app
        .as_admin(
            Method::PUT,
            "/api/admin/inventory/hulk-181",
            Some(&json!({"price": null})),
        )
        .await
        .json();
    assert_eq!(nulled["item"]["price"], Value::Null);

    let untouched = app
        .as_admin(
            Method::PUT,
            "/api/admin/inventory/1689",
            Some(&json!({"description": "Smash"})),
        )
        .await
        .json();
    assert_eq!(untouched["item"]["price"], 2.0);

    let stored = app.store.snapshot(Collection::Comics).await;
    assert_eq!(stored[1]["price"], Value::Null);
    assert!(!stored[2].contains_key("price"));
}

#[tokio::test]
async fn test_empty_update_is_a_validation_error() {
    let app = TestApp::with_comics(inventory());

    let res = app
        .as_admin(Method::PUT, "/api/admin/inventory/1689", Some(&json!({})))
        .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json()["error"], "no updatable fields");
}

#[tokio::test]
async fn test_unknown_ids_are_not_found() {
    let app = TestApp::with_comics(inventory());

    let update = app
        .as_admin(
            Method::PUT,
            "/api/admin/inventory/doesnotexist",
            Some(&json!({"title": "x"})),
        )
        .await;
    assert_eq!(update.status, StatusCode::NOT_FOUND);

    let delete = app
        .as_admin(Method::DELETE, "/api/admin/inventory/doesnotexist", None)
        .await;
    assert_eq!(delete.status, StatusCode::NOT_FOUND);
    assert!(delete.json()["error"].as_str().unwrap().contains("doesnotexist"));
}

#[tokio::test]
async fn test_delete_removes_item() {
    let app = TestApp::with_comics(inventory());

    let res = app
        .as_admin(Method::DELETE, "/api/admin/inventory/1689", None)
        .await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json(), json!({"deletedCount": 1}));
    assert_eq!(app.store.snapshot(Collection::Comics).await.len(), 2);
}
