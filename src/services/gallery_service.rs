use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::error::AppError;
use crate::entities::{galleries, images, prelude::*};
use crate::models::AttributeSchema;
use crate::services::query::{QuerySpec, query_images};

/// Gallery row together with its associated images, the shape the listing
/// endpoint returns. The gallery groups image rows, it does not own their
/// storage.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct GalleryWithImages {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub attributes: AttributeSchema,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: sea_orm::prelude::DateTimeUtc,
    pub images: Vec<images::Model>,
}

impl From<(galleries::Model, Vec<images::Model>)> for GalleryWithImages {
    fn from((gallery, images): (galleries::Model, Vec<images::Model>)) -> Self {
        Self {
            id: gallery.id,
            name: gallery.name,
            description: gallery.description,
            attributes: gallery.attributes,
            created_at: gallery.created_at,
            images,
        }
    }
}

/// Partial gallery update: omitted (or null) fields are left unchanged.
/// When `attributes` is present the schema is replaced wholesale, never
/// merged element by element.
#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
pub struct GalleryPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub attributes: Option<AttributeSchema>,
}

pub struct GalleryService {
    db: DatabaseConnection,
}

impl GalleryService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// All galleries, newest first, each with its nested image list.
    pub async fn list(&self) -> Result<Vec<GalleryWithImages>, AppError> {
        let rows = Galleries::find()
            .order_by_desc(galleries::Column::CreatedAt)
            .find_with_related(Images)
            .all(&self.db)
            .await?;

        Ok(rows.into_iter().map(GalleryWithImages::from).collect())
    }

    /// Create a gallery with an empty attribute schema.
    pub async fn create(
        &self,
        name: String,
        description: String,
    ) -> Result<galleries::Model, AppError> {
        let gallery = galleries::ActiveModel {
            name: Set(name),
            description: Set(description),
            attributes: Set(AttributeSchema::default()),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        Ok(gallery.insert(&self.db).await?)
    }

    pub async fn update(&self, id: i32, patch: GalleryPatch) -> Result<galleries::Model, AppError> {
        let gallery = Galleries::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Gallery not found".to_string()))?;

        // An all-empty patch would otherwise produce an UPDATE with no
        // columns, which sea-orm rejects.
        if patch.name.is_none() && patch.description.is_none() && patch.attributes.is_none() {
            return Ok(gallery);
        }

        let mut active: galleries::ActiveModel = gallery.into();
        if let Some(name) = patch.name {
            active.name = Set(name);
        }
        if let Some(description) = patch.description {
            active.description = Set(description);
        }
        if let Some(attributes) = patch.attributes {
            active.attributes = Set(attributes);
        }

        Ok(active.update(&self.db).await?)
    }

    pub async fn find(&self, id: i32) -> Result<galleries::Model, AppError> {
        Galleries::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Gallery not found".to_string()))
    }

    /// Run the query engine server-side over one gallery's collection.
    /// Input order for the engine (and thus tie-break order) is image id.
    pub async fn query_images(
        &self,
        id: i32,
        spec: &QuerySpec,
    ) -> Result<Vec<images::Model>, AppError> {
        self.find(id).await?;

        let collection = Images::find()
            .filter(images::Column::GalleryId.eq(id))
            .order_by_asc(images::Column::Id)
            .all(&self.db)
            .await?;

        Ok(query_images(&collection, spec))
    }
}
