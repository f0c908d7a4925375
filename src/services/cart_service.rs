use crate::{
    db::UnitOfWork,
    entities::cart_item,
    errors::ServiceError,
    repositories::{CartRepository, ProductRepository},
};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddToCartInput {
    pub user_id: i32,
    pub product_id: i32,
    pub quantity: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveFromCartInput {
    pub user_id: i32,
    pub product_id: i32,
}

/// Cart mutations.
///
/// Adding merges into the existing item for the same product rather than
/// creating a second row, so a (cart, product) pair has at most one item.
#[derive(Clone)]
pub struct CartService {
    db: Arc<DatabaseConnection>,
    uow: UnitOfWork,
    carts: CartRepository,
    products: ProductRepository,
}

impl CartService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            uow: UnitOfWork::new(db.clone()),
            db,
            carts: CartRepository,
            products: ProductRepository,
        }
    }

    /// Adds `quantity` of a product to the user's cart, creating the cart on first use.
    ///
    /// # Errors
    ///
    /// * `ServiceError::NotFound` - the product does not exist
    /// * `ServiceError::BadRequest` - the merged quantity would overflow
    #[instrument(skip(self))]
    pub async fn add_to_cart(
        &self,
        input: AddToCartInput,
    ) -> Result<cart_item::Model, ServiceError> {
        let carts = self.carts;
        let products = self.products;

        let item = self
            .uow
            .execute(move |txn| {
                Box::pin(async move {
                    products
                        .find_by_id(txn, input.product_id)
                        .await?
                        .ok_or_else(|| ServiceError::not_found("product"))?;

                    let cart = carts.find_or_create(txn, input.user_id).await?;

                    match carts.find_item(txn, cart.id, input.product_id).await? {
                        Some(existing) => {
                            let quantity =
                                existing.quantity.checked_add(input.quantity).ok_or_else(|| {
                                    ServiceError::BadRequest("quantity too large".to_string())
                                })?;
                            Ok(carts.update_item_quantity(txn, existing, quantity).await?)
                        }
                        None => Ok(carts
                            .insert_item(txn, cart.id, input.product_id, input.quantity)
                            .await?),
                    }
                })
            })
            .await?;

        info!(
            cart_id = item.cart_id,
            product_id = item.product_id,
            quantity = item.quantity,
            "Added product to cart"
        );
        Ok(item)
    }

    /// Removes the product's item from the user's cart.
    ///
    /// The lookup runs outside a transaction.
    #[instrument(skip(self))]
    pub async fn remove_from_cart(&self, input: RemoveFromCartInput) -> Result<(), ServiceError> {
        let item = self
            .carts
            .find_item_for_user(self.db.as_ref(), input.user_id, input.product_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("item"))?;

        self.carts.delete_item(self.db.as_ref(), item.id).await?;

        info!(
            cart_id = item.cart_id,
            product_id = item.product_id,
            "Removed product from cart"
        );
        Ok(())
    }
}
