use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};

use crate::entities::{order, order_item, order_promo};

/// Order line ready to persist.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrderItem {
    pub product_id: i32,
    pub price: Decimal,
    pub quantity: i32,
    pub total_amount: Decimal,
}

/// Applied promo ready to persist.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrderPromo {
    pub promo_id: i32,
    pub discount_amount: Decimal,
    pub free_product_id: Option<i32>,
    pub free_product_qty: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub user_id: i32,
    pub total_amount: Decimal,
    pub items: Vec<NewOrderItem>,
    pub promos: Vec<NewOrderPromo>,
}

/// A persisted order with its items and applied promos.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedOrder {
    pub order: order::Model,
    pub items: Vec<order_item::Model>,
    pub promos: Vec<order_promo::Model>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OrderRepository;

impl OrderRepository {
    /// Writes the order row, then its items and promo records.
    pub async fn insert<C: ConnectionTrait>(
        &self,
        conn: &C,
        new_order: NewOrder,
    ) -> Result<PlacedOrder, DbErr> {
        let now = Utc::now();
        let order = order::ActiveModel {
            user_id: Set(new_order.user_id),
            total_amount: Set(new_order.total_amount),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(conn)
        .await?;

        if !new_order.items.is_empty() {
            let items = new_order
                .items
                .into_iter()
                .map(|item| item_active_model(order.id, item, now));
            order_item::Entity::insert_many(items).exec(conn).await?;
        }

        if !new_order.promos.is_empty() {
            let promos = new_order
                .promos
                .into_iter()
                .map(|promo| promo_active_model(order.id, promo, now));
            order_promo::Entity::insert_many(promos).exec(conn).await?;
        }

        self.load_lines(conn, order).await
    }

    pub async fn count_by_user<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: i32,
    ) -> Result<u64, DbErr> {
        order::Entity::find()
            .filter(order::Column::UserId.eq(user_id))
            .count(conn)
            .await
    }

    pub async fn find_with_lines<C: ConnectionTrait>(
        &self,
        conn: &C,
        order_id: i32,
    ) -> Result<Option<PlacedOrder>, DbErr> {
        match order::Entity::find_by_id(order_id).one(conn).await? {
            Some(order) => self.load_lines(conn, order).await.map(Some),
            None => Ok(None),
        }
    }

    async fn load_lines<C: ConnectionTrait>(
        &self,
        conn: &C,
        order: order::Model,
    ) -> Result<PlacedOrder, DbErr> {
        let items = order_item::Entity::find()
            .filter(order_item::Column::OrderId.eq(order.id))
            .order_by_asc(order_item::Column::Id)
            .all(conn)
            .await?;
        let promos = order_promo::Entity::find()
            .filter(order_promo::Column::OrderId.eq(order.id))
            .order_by_asc(order_promo::Column::Id)
            .all(conn)
            .await?;

        Ok(PlacedOrder {
            order,
            items,
            promos,
        })
    }
}

fn item_active_model(
    order_id: i32,
    item: NewOrderItem,
    now: DateTime<Utc>,
) -> order_item::ActiveModel {
    order_item::ActiveModel {
        order_id: Set(order_id),
        product_id: Set(item.product_id),
        price: Set(item.price),
        quantity: Set(item.quantity),
        total_amount: Set(item.total_amount),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
}

fn promo_active_model(
    order_id: i32,
    promo: NewOrderPromo,
    now: DateTime<Utc>,
) -> order_promo::ActiveModel {
    order_promo::ActiveModel {
        order_id: Set(order_id),
        promo_id: Set(promo.promo_id),
        discount_amount: Set(promo.discount_amount),
        free_product_id: Set(promo.free_product_id),
        free_product_qty: Set(promo.free_product_qty),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
}
