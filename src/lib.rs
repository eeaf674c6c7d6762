pub mod api;
pub mod config;
pub mod entities;
pub mod infrastructure;
pub mod models;
pub mod services;
pub mod utils;

use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
};
use sea_orm::DatabaseConnection;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::AppConfig;
use crate::services::gallery_service::GalleryService;
use crate::services::image_service::ImageService;
use crate::services::storage::StorageService;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::health::health,
        api::handlers::galleries::list_galleries,
        api::handlers::galleries::create_gallery,
        api::handlers::galleries::update_gallery,
        api::handlers::galleries::upload_images,
        api::handlers::galleries::list_gallery_images,
        api::handlers::images::update_image,
        api::handlers::images::delete_image,
        api::handlers::images::thumbnail,
        api::handlers::images::batch_update,
    ),
    components(
        schemas(
            api::handlers::galleries::CreateGalleryRequest,
            api::handlers::images::UpdateImageRequest,
            api::handlers::images::BatchUpdateRequest,
            services::gallery_service::GalleryPatch,
            services::gallery_service::GalleryWithImages,
            services::image_service::BatchUpdateItem,
            models::AttributeDefinition,
            models::AttributeType,
            models::AttributeSchema,
            models::AttributeBag,
            entities::galleries::Model,
            entities::images::Model,
        )
    ),
    tags(
        (name = "galleries", description = "Gallery management endpoints"),
        (name = "images", description = "Image management endpoints")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub storage: Arc<dyn StorageService>,
    pub galleries: Arc<GalleryService>,
    pub images: Arc<ImageService>,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(db: DatabaseConnection, storage: Arc<dyn StorageService>, config: AppConfig) -> Self {
        let galleries = Arc::new(GalleryService::new(db.clone()));
        let images = Arc::new(ImageService::new(
            db.clone(),
            storage.clone(),
            config.clone(),
        ));
        Self {
            db,
            storage,
            galleries,
            images,
            config,
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    let max_request_size = state.config.max_request_size;
    let upload_dir = state.config.upload_dir.clone();

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(api::handlers::health::health))
        .route(
            "/api/galleries",
            get(api::handlers::galleries::list_galleries)
                .post(api::handlers::galleries::create_gallery),
        )
        .route(
            "/api/galleries/:id",
            patch(api::handlers::galleries::update_gallery),
        )
        .route(
            "/api/galleries/:id/images",
            get(api::handlers::galleries::list_gallery_images)
                .post(api::handlers::galleries::upload_images),
        )
        .route(
            "/api/images/:id",
            patch(api::handlers::images::update_image).delete(api::handlers::images::delete_image),
        )
        .route(
            "/api/images/:id/thumbnail",
            get(api::handlers::images::thumbnail),
        )
        .route(
            "/api/images/batch-update",
            post(api::handlers::images::batch_update),
        )
        .nest_service("/uploads", ServeDir::new(upload_dir))
        .layer(DefaultBodyLimit::max(max_request_size))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
