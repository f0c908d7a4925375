use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Promotion policy.
///
/// Type-specific columns are only meaningful for their type: the discount
/// columns for `PERCENTAGE_DISCOUNT`, the buy/free product columns for
/// `BUY_X_GET_Y_FREE`. Use [`Model::rule`] to get the typed view.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "promos")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub segmentation: Segmentation,
    #[sea_orm(column_name = "type")]
    pub promo_type: PromoType,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub min_order_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub discount_value: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))", nullable)]
    pub max_discount_amount: Option<Decimal>,
    pub buy_product_id: Option<i32>,
    pub buy_product_qty: i32,
    pub free_product_id: Option<i32>,
    pub free_product_qty: i32,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    /// `None` means unlimited
    pub max_usage_limit: Option<i32>,
    pub current_usage_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::promo_city::Entity")]
    PromoCities,
    #[sea_orm(has_many = "super::order_promo::Entity")]
    OrderPromos,
}

impl Related<super::promo_city::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PromoCities.def()
    }
}

impl Related<super::order_promo::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderPromos.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Which users a promo targets
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Segmentation {
    #[sea_orm(string_value = "ALL")]
    All,
    #[sea_orm(string_value = "LOYAL_USER")]
    LoyalUser,
    #[sea_orm(string_value = "NEW_USER")]
    NewUser,
    #[sea_orm(string_value = "CITY")]
    City,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PromoType {
    #[sea_orm(string_value = "PERCENTAGE_DISCOUNT")]
    PercentageDiscount,
    #[sea_orm(string_value = "BUY_X_GET_Y_FREE")]
    BuyXGetYFree,
}

/// Typed view over the type-specific promo columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromoRule {
    PercentageDiscount {
        discount_value: Decimal,
        max_discount_amount: Option<Decimal>,
        min_order_amount: Decimal,
    },
    BuyXGetYFree {
        buy_product_id: i32,
        buy_product_qty: i32,
        free_product_id: i32,
        free_product_qty: i32,
    },
}

impl Model {
    /// Returns `None` for a buy-x-get-y row without both product references.
    pub fn rule(&self) -> Option<PromoRule> {
        match self.promo_type {
            PromoType::PercentageDiscount => Some(PromoRule::PercentageDiscount {
                discount_value: self.discount_value,
                max_discount_amount: self.max_discount_amount,
                min_order_amount: self.min_order_amount,
            }),
            PromoType::BuyXGetYFree => Some(PromoRule::BuyXGetYFree {
                buy_product_id: self.buy_product_id?,
                buy_product_qty: self.buy_product_qty,
                free_product_id: self.free_product_id?,
                free_product_qty: self.free_product_qty,
            }),
        }
    }
}
