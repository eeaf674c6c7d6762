#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use gallery_backend::config::AppConfig;
use gallery_backend::infrastructure::database::run_migrations;
use gallery_backend::services::storage::LocalStorageService;
use gallery_backend::{AppState, create_app};
use http_body_util::BodyExt;
use image::{DynamicImage, ImageFormat, RgbImage};
use sea_orm::{ConnectOptions, Database};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

/// Fresh app over an in-memory database and a temp upload dir. The TempDir
/// must stay alive for the duration of the test.
pub async fn setup_app() -> (Router, AppState, TempDir) {
    let (state, dir) = setup_state().await;
    (create_app(state.clone()), state, dir)
}

pub async fn setup_state() -> (AppState, TempDir) {
    // A pool size of one keeps every query on the same in-memory database.
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).sqlx_logging(false);
    let db = Database::connect(opt).await.unwrap();
    run_migrations(&db).await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig {
        upload_dir: dir.path().to_path_buf(),
        ..AppConfig::default()
    };
    let storage = Arc::new(LocalStorageService::new(dir.path().to_path_buf()));

    (AppState::new(db, storage, config), dir)
}

/// Solid-color PNG of the given size.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, image::Rgb([30, 60, 90])));
    let mut out = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut out), ImageFormat::Png)
        .unwrap();
    out
}

pub const BOUNDARY: &str = "---------------------------123456789012345678901234567";

/// Multipart body carrying the given (filename, content-type, bytes) files
/// under the `images` field.
pub fn multipart_body(files: &[(&str, &str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (filename, content_type, data) in files {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"images\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={BOUNDARY}")
}

pub async fn send_json(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("Content-Type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    app.clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap()
}

pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

/// Upload the given files into a gallery and return the created image rows.
pub async fn upload(app: &Router, gallery_id: i64, files: &[(&str, &str, &[u8])]) -> Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/galleries/{gallery_id}/images"))
                .header("Content-Type", multipart_content_type())
                .body(Body::from(multipart_body(files)))
                .unwrap(),
        )
        .await
        .unwrap()
}

/// Create a gallery and return its id.
pub async fn create_gallery(app: &Router, name: &str) -> i64 {
    let response = send_json(
        app,
        "POST",
        "/api/galleries",
        Some(serde_json::json!({ "name": name, "description": "test gallery" })),
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["id"].as_i64().unwrap()
}
