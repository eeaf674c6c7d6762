use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::{info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::api::error::AppError;
use crate::config::AppConfig;
use crate::entities::{images, prelude::*};
use crate::models::merge_attributes;
use crate::services::storage::StorageService;
use crate::services::thumbnail_service;
use crate::utils::validation::{storage_extension, validate_upload};

/// One file taken out of a multipart upload request.
pub struct UploadedFile {
    pub original_name: String,
    pub content_type: String,
    pub data: Bytes,
}

/// One entry of a batch update request.
#[derive(Clone, Debug, Deserialize, ToSchema)]
pub struct BatchUpdateItem {
    pub id: i32,
    #[schema(value_type = Object)]
    pub attributes: Map<String, Value>,
}

pub struct ImageService {
    db: DatabaseConnection,
    storage: Arc<dyn StorageService>,
    config: AppConfig,
}

impl ImageService {
    pub fn new(db: DatabaseConnection, storage: Arc<dyn StorageService>, config: AppConfig) -> Self {
        Self {
            db,
            storage,
            config,
        }
    }

    /// Store a batch of uploaded files as images of one gallery.
    ///
    /// Every file is validated against the allow-list and size cap before
    /// anything is persisted. After that the files are processed one by
    /// one: decode dimensions, write the blob, insert the row. A failure
    /// partway through deletes the failing file's blob, keeps the rows (and
    /// blobs) already committed for earlier files, and reports a summary of
    /// the partial success.
    pub async fn upload(
        &self,
        gallery_id: i32,
        files: Vec<UploadedFile>,
    ) -> Result<Vec<images::Model>, AppError> {
        if files.is_empty() {
            return Err(AppError::Validation("No images uploaded".to_string()));
        }

        Galleries::find_by_id(gallery_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Gallery not found".to_string()))?;

        for file in &files {
            validate_upload(
                &file.original_name,
                &file.content_type,
                file.data.len(),
                self.config.max_file_size,
            )
            .map_err(|e| AppError::Validation(e.to_string()))?;
        }

        let total = files.len();
        let mut created = Vec::with_capacity(total);

        for file in files {
            match self.store_one(gallery_id, &file).await {
                Ok(image) => created.push(image),
                Err(e) => {
                    return Err(AppError::UploadIncomplete(format!(
                        "stored {} of {} images, failed on '{}': {}",
                        created.len(),
                        total,
                        file.original_name,
                        e
                    )));
                }
            }
        }

        info!("📸 Stored {} images in gallery {}", created.len(), gallery_id);
        Ok(created)
    }

    /// Decode, persist the blob, insert the row. Cleans up its own blob on
    /// a post-write failure so the caller never has to.
    async fn store_one(
        &self,
        gallery_id: i32,
        file: &UploadedFile,
    ) -> anyhow::Result<images::Model> {
        let (width, height) = thumbnail_service::decode_dimensions(&file.data)?;

        let filename = format!(
            "{}.{}",
            Uuid::new_v4(),
            storage_extension(&file.original_name, &file.content_type)
        );
        self.storage.put(&filename, &file.data).await?;

        let mut attributes = Map::new();
        attributes.insert("dimensions".to_string(), json!(format!("{width}x{height}")));
        attributes.insert("size".to_string(), json!(file.data.len()));
        attributes.insert("originalName".to_string(), json!(file.original_name));
        attributes.insert("mimeType".to_string(), json!(file.content_type));

        let image = images::ActiveModel {
            gallery_id: Set(gallery_id),
            filename: Set(filename.clone()),
            attributes: Set(crate::models::AttributeBag(attributes)),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        match image.insert(&self.db).await {
            Ok(model) => Ok(model),
            Err(e) => {
                // Best-effort: don't leave a blob without a row behind.
                if let Err(del) = self.storage.delete(&filename).await {
                    warn!("Failed to clean up blob {} after insert error: {}", filename, del);
                }
                Err(e.into())
            }
        }
    }

    /// Replace-on-conflict merge of a partial attribute bag into one image.
    pub async fn update(
        &self,
        id: i32,
        attributes: Map<String, Value>,
    ) -> Result<images::Model, AppError> {
        let image = Images::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Image not found".to_string()))?;

        let merged = merge_attributes(&image.attributes, &attributes);

        let mut active: images::ActiveModel = image.into();
        active.attributes = Set(merged);

        Ok(active.update(&self.db).await?)
    }

    /// Apply each update independently against its own image. Failing items
    /// (unknown id, row-level error) are dropped from the result while the
    /// rest commit; callers cannot tell a skipped item from a missing one.
    pub async fn batch_update(
        &self,
        updates: Vec<BatchUpdateItem>,
    ) -> Result<Vec<images::Model>, AppError> {
        let mut results = Vec::new();

        for item in updates {
            match self.update(item.id, item.attributes).await {
                Ok(image) => results.push(image),
                Err(e) => {
                    warn!("Skipping batch update for image {}: {}", item.id, e);
                }
            }
        }

        Ok(results)
    }

    /// Delete the stored blob (idempotent, a missing file is fine), then
    /// the row. Not-found only refers to the row.
    pub async fn delete(&self, id: i32) -> Result<(), AppError> {
        let image = Images::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Image not found".to_string()))?;

        self.storage
            .delete(&image.filename)
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        Images::delete_by_id(id).exec(&self.db).await?;
        Ok(())
    }

    /// WebP thumbnail of the stored original, fitted into the given box.
    pub async fn thumbnail(
        &self,
        id: i32,
        width: Option<u32>,
        height: Option<u32>,
    ) -> Result<Vec<u8>, AppError> {
        let image = Images::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Image not found".to_string()))?;

        let exists = self
            .storage
            .exists(&image.filename)
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;
        if !exists {
            return Err(AppError::NotFound("Image file not found".to_string()));
        }

        let data = self
            .storage
            .get(&image.filename)
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        thumbnail_service::render_thumbnail(&data, width, height)
            .map_err(|e| AppError::Internal(e.to_string()))
    }
}
