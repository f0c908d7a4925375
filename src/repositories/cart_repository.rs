use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};

use crate::entities::{cart, cart_item, product};

/// A cart item together with the product it references.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLineRow {
    pub item: cart_item::Model,
    pub product: product::Model,
}

/// A user's cart with every item and product loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedCart {
    pub cart: cart::Model,
    pub lines: Vec<CartLineRow>,
}

impl LoadedCart {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CartRepository;

impl CartRepository {
    pub async fn find_by_user_id<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: i32,
    ) -> Result<Option<cart::Model>, DbErr> {
        cart::Entity::find()
            .filter(cart::Column::UserId.eq(user_id))
            .one(conn)
            .await
    }

    /// Returns the user's cart, creating an empty one on first use.
    pub async fn find_or_create<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: i32,
    ) -> Result<cart::Model, DbErr> {
        if let Some(existing) = self.find_by_user_id(conn, user_id).await? {
            return Ok(existing);
        }

        let now = Utc::now();
        cart::ActiveModel {
            user_id: Set(user_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(conn)
        .await
    }

    pub async fn find_item<C: ConnectionTrait>(
        &self,
        conn: &C,
        cart_id: i32,
        product_id: i32,
    ) -> Result<Option<cart_item::Model>, DbErr> {
        cart_item::Entity::find()
            .filter(cart_item::Column::CartId.eq(cart_id))
            .filter(cart_item::Column::ProductId.eq(product_id))
            .one(conn)
            .await
    }

    /// Looks up the item for `product_id` in the cart owned by `user_id`.
    pub async fn find_item_for_user<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: i32,
        product_id: i32,
    ) -> Result<Option<cart_item::Model>, DbErr> {
        cart_item::Entity::find()
            .inner_join(cart::Entity)
            .filter(cart::Column::UserId.eq(user_id))
            .filter(cart_item::Column::ProductId.eq(product_id))
            .one(conn)
            .await
    }

    pub async fn insert_item<C: ConnectionTrait>(
        &self,
        conn: &C,
        cart_id: i32,
        product_id: i32,
        quantity: i32,
    ) -> Result<cart_item::Model, DbErr> {
        let now = Utc::now();
        cart_item::ActiveModel {
            cart_id: Set(cart_id),
            product_id: Set(product_id),
            quantity: Set(quantity),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(conn)
        .await
    }

    pub async fn update_item_quantity<C: ConnectionTrait>(
        &self,
        conn: &C,
        item: cart_item::Model,
        quantity: i32,
    ) -> Result<cart_item::Model, DbErr> {
        let mut active: cart_item::ActiveModel = item.into();
        active.quantity = Set(quantity);
        active.updated_at = Set(Utc::now());
        active.update(conn).await
    }

    pub async fn delete_item<C: ConnectionTrait>(&self, conn: &C, id: i32) -> Result<(), DbErr> {
        cart_item::Entity::delete_by_id(id).exec(conn).await?;
        Ok(())
    }

    /// Bulk delete by id. Returns the number of rows removed.
    pub async fn delete_items<C: ConnectionTrait>(
        &self,
        conn: &C,
        ids: &[i32],
    ) -> Result<u64, DbErr> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = cart_item::Entity::delete_many()
            .filter(cart_item::Column::Id.is_in(ids.iter().copied()))
            .exec(conn)
            .await?;
        Ok(result.rows_affected)
    }

    pub async fn count_items<C: ConnectionTrait>(
        &self,
        conn: &C,
        cart_id: i32,
    ) -> Result<u64, DbErr> {
        cart_item::Entity::find()
            .filter(cart_item::Column::CartId.eq(cart_id))
            .count(conn)
            .await
    }

    /// Loads the user's cart with items (oldest first) and their products.
    pub async fn load_with_items<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: i32,
    ) -> Result<Option<LoadedCart>, DbErr> {
        let Some(cart) = self.find_by_user_id(conn, user_id).await? else {
            return Ok(None);
        };

        let rows = cart_item::Entity::find()
            .filter(cart_item::Column::CartId.eq(cart.id))
            .find_also_related(product::Entity)
            .order_by_asc(cart_item::Column::Id)
            .all(conn)
            .await?;

        let lines = rows
            .into_iter()
            .map(|(item, product)| match product {
                Some(product) => Ok(CartLineRow { item, product }),
                None => Err(DbErr::RecordNotFound(format!(
                    "product {} referenced by cart item {}",
                    item.product_id, item.id
                ))),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(LoadedCart { cart, lines }))
    }
}
