use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::{Map, Value};
use utoipa::ToSchema;

use crate::AppState;
use crate::api::error::AppError;
use crate::entities::images;
use crate::services::image_service::BatchUpdateItem;

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateImageRequest {
    /// Partial attribute bag; merged shallowly, incoming keys win.
    #[schema(value_type = Object)]
    pub attributes: Map<String, Value>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BatchUpdateRequest {
    pub updates: Vec<BatchUpdateItem>,
}

#[derive(Debug, Deserialize)]
pub struct ThumbnailParams {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[utoipa::path(
    patch,
    path = "/api/images/{id}",
    request_body = UpdateImageRequest,
    params(("id" = i32, Path, description = "Image id")),
    responses(
        (status = 200, description = "Image with merged attributes", body = images::Model),
        (status = 404, description = "Image not found")
    )
)]
pub async fn update_image(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(req): Json<UpdateImageRequest>,
) -> Result<Json<images::Model>, AppError> {
    Ok(Json(state.images.update(id, req.attributes).await?))
}

#[utoipa::path(
    delete,
    path = "/api/images/{id}",
    params(("id" = i32, Path, description = "Image id")),
    responses(
        (status = 204, description = "Image and its stored file removed"),
        (status = 404, description = "Image not found")
    )
)]
pub async fn delete_image(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    state.images.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/images/{id}/thumbnail",
    params(
        ("id" = i32, Path, description = "Image id"),
        ("width" = Option<u32>, Query, description = "Max width; unconstrained when omitted"),
        ("height" = Option<u32>, Query, description = "Max height; unconstrained when omitted")
    ),
    responses(
        (status = 200, description = "WebP thumbnail", content_type = "image/webp"),
        (status = 404, description = "Image or stored file not found")
    )
)]
pub async fn thumbnail(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(params): Query<ThumbnailParams>,
) -> Result<impl IntoResponse, AppError> {
    let bytes = state
        .images
        .thumbnail(id, params.width, params.height)
        .await?;

    Ok(([(header::CONTENT_TYPE, "image/webp")], bytes))
}

#[utoipa::path(
    post,
    path = "/api/images/batch-update",
    request_body = BatchUpdateRequest,
    responses(
        (status = 200, description = "Successfully updated images; failing items are silently dropped", body = [images::Model])
    )
)]
pub async fn batch_update(
    State(state): State<AppState>,
    Json(req): Json<BatchUpdateRequest>,
) -> Result<Json<Vec<images::Model>>, AppError> {
    Ok(Json(state.images.batch_update(req.updates).await?))
}
