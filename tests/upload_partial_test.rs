mod common;

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use axum::http::StatusCode;
use bytes::Bytes;
use common::*;
use gallery_backend::api::error::AppError;
use gallery_backend::config::AppConfig;
use gallery_backend::entities::prelude::*;
use gallery_backend::infrastructure::database::run_migrations;
use gallery_backend::services::gallery_service::GalleryService;
use gallery_backend::services::image_service::{ImageService, UploadedFile};
use gallery_backend::services::storage::StorageService;
use sea_orm::{ConnectOptions, Database, EntityTrait};
use serde_json::json;

/// A multi-file upload that fails on the second file keeps the first file's
/// row and blob, and the response names the partial success.
#[tokio::test]
async fn mid_batch_failure_keeps_committed_images() {
    let (app, _state, dir) = setup_app().await;
    let gallery_id = create_gallery(&app, "g").await;

    let png = png_bytes(1, 1);
    // Valid mime type but undecodable bytes: passes the pre-persistence
    // checks and fails inside the per-file loop.
    let response = upload(
        &app,
        gallery_id,
        &[
            ("good.png", "image/png", &png),
            ("broken.png", "image/png", b"definitely not a png"),
        ],
    )
    .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let error = body_json(response).await["error"].as_str().unwrap().to_string();
    assert!(error.contains("stored 1 of 2"), "unexpected error: {error}");
    assert!(error.contains("broken.png"), "unexpected error: {error}");

    // First image survives with its blob, nothing is orphaned for the second.
    let list = body_json(send_json(&app, "GET", "/api/galleries", None).await).await;
    let images = list[0]["images"].as_array().unwrap();
    assert_eq!(images.len(), 1);
    assert_eq!(images[0]["attributes"]["originalName"], "good.png");
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

/// In-memory store whose put starts failing after a set number of writes.
struct FlakyStorage {
    files: Mutex<HashMap<String, Vec<u8>>>,
    puts_before_failure: Mutex<usize>,
}

impl FlakyStorage {
    fn failing_after(puts: usize) -> Self {
        Self {
            files: Mutex::new(HashMap::new()),
            puts_before_failure: Mutex::new(puts),
        }
    }

    fn stored_count(&self) -> usize {
        self.files.lock().unwrap().len()
    }
}

#[async_trait]
impl StorageService for FlakyStorage {
    async fn put(&self, filename: &str, data: &[u8]) -> Result<()> {
        let mut remaining = self.puts_before_failure.lock().unwrap();
        if *remaining == 0 {
            return Err(anyhow!("disk full"));
        }
        *remaining -= 1;
        self.files
            .lock()
            .unwrap()
            .insert(filename.to_string(), data.to_vec());
        Ok(())
    }

    async fn get(&self, filename: &str) -> Result<Vec<u8>> {
        self.files
            .lock()
            .unwrap()
            .get(filename)
            .cloned()
            .ok_or_else(|| anyhow!("missing"))
    }

    async fn exists(&self, filename: &str) -> Result<bool> {
        Ok(self.files.lock().unwrap().contains_key(filename))
    }

    async fn delete(&self, filename: &str) -> Result<()> {
        self.files.lock().unwrap().remove(filename);
        Ok(())
    }
}

#[tokio::test]
async fn storage_failure_reports_summary_and_commits_earlier_files() {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).sqlx_logging(false);
    let db = Database::connect(opt).await.unwrap();
    run_migrations(&db).await.unwrap();

    let storage = Arc::new(FlakyStorage::failing_after(1));
    let images = ImageService::new(db.clone(), storage.clone(), AppConfig::default());
    let galleries = GalleryService::new(db.clone());

    let gallery = galleries.create("g".into(), "".into()).await.unwrap();
    let png = Bytes::from(png_bytes(1, 1));

    let files = vec![
        UploadedFile {
            original_name: "first.png".into(),
            content_type: "image/png".into(),
            data: png.clone(),
        },
        UploadedFile {
            original_name: "second.png".into(),
            content_type: "image/png".into(),
            data: png,
        },
    ];

    let err = images.upload(gallery.id, files).await.unwrap_err();
    match err {
        AppError::UploadIncomplete(msg) => {
            assert!(msg.contains("stored 1 of 2"), "unexpected message: {msg}");
            assert!(msg.contains("second.png"), "unexpected message: {msg}");
        }
        other => panic!("expected UploadIncomplete, got {other:?}"),
    }

    let rows = Images::find().all(&db).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(
        rows[0].attributes.coerced("originalName"),
        "first.png".to_string()
    );
    assert_eq!(storage.stored_count(), 1);
}

/// JSON body shape of the error is the uniform `{"error": ...}` envelope.
#[tokio::test]
async fn error_envelope_is_uniform() {
    let (app, _state, _dir) = setup_app().await;
    let response = send_json(&app, "PATCH", "/api/galleries/42", Some(json!({}))).await;
    let body = body_json(response).await;
    assert!(body.get("error").is_some());
}
