use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::AttributeBag;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = Image)]
#[sea_orm(table_name = "images")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub gallery_id: i32,
    /// Server-generated storage key (uuid + extension), decoupled from the
    /// original upload name, which lives in the attribute bag.
    pub filename: String,
    /// Free-form attribute bag, stored as a JSON object.
    pub attributes: AttributeBag,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::galleries::Entity",
        from = "Column::GalleryId",
        to = "super::galleries::Column::Id"
    )]
    Galleries,
}

impl Related<super::galleries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Galleries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
