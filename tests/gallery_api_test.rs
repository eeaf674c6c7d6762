mod common;

use axum::http::StatusCode;
use common::*;
use serde_json::json;

#[tokio::test]
async fn create_and_list_galleries() {
    let (app, _state, _dir) = setup_app().await;

    let response = send_json(
        &app,
        "POST",
        "/api/galleries",
        Some(json!({ "name": "Trips", "description": "Holiday photos" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let gallery = body_json(response).await;
    assert_eq!(gallery["name"], "Trips");
    assert_eq!(gallery["description"], "Holiday photos");
    assert_eq!(gallery["attributes"], json!([]));

    let response = send_json(&app, "GET", "/api/galleries", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let list = body_json(response).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["name"], "Trips");
    assert_eq!(list[0]["images"], json!([]));
}

#[tokio::test]
async fn listing_is_newest_first() {
    let (app, _state, _dir) = setup_app().await;

    create_gallery(&app, "first").await;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    create_gallery(&app, "second").await;

    let list = body_json(send_json(&app, "GET", "/api/galleries", None).await).await;
    assert_eq!(list[0]["name"], "second");
    assert_eq!(list[1]["name"], "first");
}

#[tokio::test]
async fn patch_updates_only_provided_fields() {
    let (app, _state, _dir) = setup_app().await;
    let id = create_gallery(&app, "original").await;

    let response = send_json(
        &app,
        "PATCH",
        &format!("/api/galleries/{id}"),
        Some(json!({ "name": "renamed" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let gallery = body_json(response).await;
    assert_eq!(gallery["name"], "renamed");
    assert_eq!(gallery["description"], "test gallery");

    // An empty patch changes nothing.
    let response = send_json(&app, "PATCH", &format!("/api/galleries/{id}"), Some(json!({}))).await;
    let gallery = body_json(response).await;
    assert_eq!(gallery["name"], "renamed");
    assert_eq!(gallery["description"], "test gallery");
}

#[tokio::test]
async fn patch_replaces_attribute_schema_wholesale() {
    let (app, _state, _dir) = setup_app().await;
    let id = create_gallery(&app, "g").await;

    let schema = json!([
        { "id": "a1", "name": "Color", "type": "text", "isVisible": true },
        { "id": "a2", "name": "Taken", "type": "date", "isVisible": false }
    ]);
    let response = send_json(
        &app,
        "PATCH",
        &format!("/api/galleries/{id}"),
        Some(json!({ "attributes": schema })),
    )
    .await;
    assert_eq!(body_json(response).await["attributes"], schema);

    // Replacing with a single-element schema drops the other definition
    // entirely; schemas are never merged element by element.
    let smaller = json!([
        { "id": "a3", "name": "Rating", "type": "number", "isVisible": true }
    ]);
    let response = send_json(
        &app,
        "PATCH",
        &format!("/api/galleries/{id}"),
        Some(json!({ "attributes": smaller })),
    )
    .await;
    assert_eq!(body_json(response).await["attributes"], smaller);
}

#[tokio::test]
async fn schema_order_is_preserved_through_storage() {
    let (app, _state, _dir) = setup_app().await;
    let id = create_gallery(&app, "g").await;

    let schema = json!([
        { "id": "z", "name": "Zebra", "type": "text", "isVisible": true },
        { "id": "a", "name": "Apple", "type": "text", "isVisible": true },
        { "id": "m", "name": "Mango", "type": "text", "isVisible": true }
    ]);
    send_json(
        &app,
        "PATCH",
        &format!("/api/galleries/{id}"),
        Some(json!({ "attributes": schema })),
    )
    .await;

    let list = body_json(send_json(&app, "GET", "/api/galleries", None).await).await;
    let names: Vec<_> = list[0]["attributes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Zebra", "Apple", "Mango"]);
}

#[tokio::test]
async fn patch_of_missing_gallery_is_404() {
    let (app, _state, _dir) = setup_app().await;

    let response = send_json(
        &app,
        "PATCH",
        "/api/galleries/999",
        Some(json!({ "name": "x" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_json(response).await["error"].is_string());
}

#[tokio::test]
async fn health_endpoint_responds() {
    let (app, _state, _dir) = setup_app().await;
    let response = send_json(&app, "GET", "/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);
}
