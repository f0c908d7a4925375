use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// City allowlist entry for a CITY-segmented promo
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "promo_cities")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub promo_id: i32,
    pub city: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::promo::Entity",
        from = "Column::PromoId",
        to = "super::promo::Column::Id",
        on_delete = "Cascade"
    )]
    Promo,
}

impl Related<super::promo::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Promo.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
