use std::collections::HashMap;

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::AppState;
use crate::api::error::AppError;
use crate::entities::{galleries, images};
use crate::services::gallery_service::{GalleryPatch, GalleryWithImages};
use crate::services::image_service::UploadedFile;
use crate::services::query::{QuerySpec, SortDirection, SortSpec};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateGalleryRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[utoipa::path(
    get,
    path = "/api/galleries",
    responses(
        (status = 200, description = "All galleries with nested images, newest first", body = [GalleryWithImages])
    )
)]
pub async fn list_galleries(
    State(state): State<AppState>,
) -> Result<Json<Vec<GalleryWithImages>>, AppError> {
    Ok(Json(state.galleries.list().await?))
}

#[utoipa::path(
    post,
    path = "/api/galleries",
    request_body = CreateGalleryRequest,
    responses(
        (status = 201, description = "Gallery created with an empty attribute schema", body = galleries::Model)
    )
)]
pub async fn create_gallery(
    State(state): State<AppState>,
    Json(req): Json<CreateGalleryRequest>,
) -> Result<(StatusCode, Json<galleries::Model>), AppError> {
    let gallery = state.galleries.create(req.name, req.description).await?;
    Ok((StatusCode::CREATED, Json(gallery)))
}

#[utoipa::path(
    patch,
    path = "/api/galleries/{id}",
    request_body = GalleryPatch,
    params(("id" = i32, Path, description = "Gallery id")),
    responses(
        (status = 200, description = "Updated gallery", body = galleries::Model),
        (status = 404, description = "Gallery not found")
    )
)]
pub async fn update_gallery(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(patch): Json<GalleryPatch>,
) -> Result<Json<galleries::Model>, AppError> {
    Ok(Json(state.galleries.update(id, patch).await?))
}

#[utoipa::path(
    post,
    path = "/api/galleries/{id}/images",
    request_body(content = String, description = "Multipart file list", content_type = "multipart/form-data"),
    params(("id" = i32, Path, description = "Gallery id")),
    responses(
        (status = 201, description = "Created images", body = [images::Model]),
        (status = 400, description = "No files or rejected file"),
        (status = 404, description = "Gallery not found")
    )
)]
pub async fn upload_images(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Vec<images::Model>>), AppError> {
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        let err_msg = e.to_string();
        if err_msg.contains("length limit exceeded") {
            AppError::Validation("Request body exceeds the maximum allowed limit".to_string())
        } else {
            AppError::Validation(err_msg)
        }
    })? {
        // Only file-bearing fields count; stray form fields are ignored.
        let Some(original_name) = field.file_name().map(|s| s.to_string()) else {
            continue;
        };
        let content_type = field
            .content_type()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(e.to_string()))?;

        files.push(UploadedFile {
            original_name,
            content_type,
            data,
        });
    }

    let created = state.images.upload(id, files).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/api/galleries/{id}/images",
    params(
        ("id" = i32, Path, description = "Gallery id"),
        ("search" = Option<String>, Query, description = "Free-text search over all attribute values"),
        ("sort" = Option<String>, Query, description = "Attribute name to sort by"),
        ("direction" = Option<String>, Query, description = "asc or desc (default asc)")
    ),
    responses(
        (status = 200, description = "Filtered and sorted images", body = [images::Model]),
        (status = 404, description = "Gallery not found")
    )
)]
pub async fn list_gallery_images(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(mut params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<images::Model>>, AppError> {
    let search = params.remove("search").unwrap_or_default();
    let sort = params.remove("sort");
    let direction = match params.remove("direction").as_deref() {
        None | Some("asc") => SortDirection::Asc,
        Some("desc") => SortDirection::Desc,
        Some(other) => {
            return Err(AppError::Validation(format!(
                "Invalid sort direction '{other}', expected 'asc' or 'desc'"
            )));
        }
    };

    // Every remaining query parameter is a per-attribute filter.
    let spec = QuerySpec {
        search,
        filters: params,
        sort: sort.map(|attribute| SortSpec {
            attribute,
            direction,
        }),
    };

    Ok(Json(state.galleries.query_images(id, &spec).await?))
}
