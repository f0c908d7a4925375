use crate::{
    db::UnitOfWork,
    errors::ServiceError,
    repositories::{
        CartRepository, EligibilityQuery, OrderRepository, PlacedOrder, PromoRepository,
        UserRepository,
    },
    services::order_assembly::{assemble_order, CartLine},
};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOrderInput {
    pub user_id: i32,
    /// Promos to apply; empty means none
    pub promo_ids: Vec<i32>,
}

/// Checkout: converts a user's cart into an order.
#[derive(Clone)]
pub struct OrderService {
    uow: UnitOfWork,
    carts: CartRepository,
    orders: OrderRepository,
    promos: PromoRepository,
    users: UserRepository,
    loyalty_order_threshold: u64,
}

impl OrderService {
    pub fn new(db: Arc<DatabaseConnection>, loyalty_order_threshold: u64) -> Self {
        Self {
            uow: UnitOfWork::new(db),
            carts: CartRepository,
            orders: OrderRepository,
            promos: PromoRepository,
            users: UserRepository,
            loyalty_order_threshold,
        }
    }

    /// Places an order for everything in the user's cart.
    ///
    /// Requested promos are re-checked for eligibility and availability. If
    /// none of them qualify the whole request fails; otherwise the qualifying
    /// ones are applied in id order. In one transaction the order is written,
    /// the user is marked loyal once their order count exceeds the threshold,
    /// promo usage counters are bumped and the cart items are deleted.
    ///
    /// # Errors
    ///
    /// * `ServiceError::NotFound("cart not found")` - no cart or an empty cart
    /// * `ServiceError::NotFound("promo not found")` - no requested promo qualifies
    /// * `ServiceError::NotFound("user not found")` - loyalty update for a missing user
    #[instrument(skip(self))]
    pub async fn create_order(&self, input: CreateOrderInput) -> Result<PlacedOrder, ServiceError> {
        let carts = self.carts;
        let orders = self.orders;
        let promos = self.promos;
        let users = self.users;
        let threshold = self.loyalty_order_threshold;

        let placed = self
            .uow
            .execute(move |txn| {
                Box::pin(async move {
                    let cart = carts
                        .load_with_items(txn, input.user_id)
                        .await?
                        .filter(|cart| !cart.is_empty())
                        .ok_or_else(|| ServiceError::not_found("cart"))?;

                    let eligible = if input.promo_ids.is_empty() {
                        Vec::new()
                    } else {
                        let query = EligibilityQuery::for_user(input.user_id)
                            .available()
                            .with_ids(input.promo_ids.clone());
                        let found = promos.find_eligible(txn, &query).await?;
                        if found.is_empty() {
                            return Err(ServiceError::not_found("promo"));
                        }
                        found
                    };

                    let lines: Vec<CartLine> = cart
                        .lines
                        .iter()
                        .map(|line| CartLine {
                            cart_item_id: line.item.id,
                            product_id: line.product.id,
                            quantity: line.item.quantity,
                            unit_price: line.product.price,
                        })
                        .collect();

                    let assembled = assemble_order(&lines, eligible)?;
                    let placed = orders
                        .insert(txn, assembled.to_new_order(input.user_id))
                        .await?;

                    let order_count = orders.count_by_user(txn, input.user_id).await?;
                    if order_count > threshold {
                        let user = users
                            .find_by_id(txn, input.user_id)
                            .await?
                            .ok_or_else(|| ServiceError::not_found("user"))?;
                        users.mark_loyal(txn, user).await?;
                        debug!(user_id = input.user_id, order_count, "User marked loyal");
                    }

                    for promo in assembled.used_promos {
                        promos.save(txn, promo).await?;
                    }

                    carts
                        .delete_items(txn, &assembled.consumed_cart_item_ids)
                        .await?;

                    Ok(placed)
                })
            })
            .await?;

        info!(
            order_id = placed.order.id,
            user_id = placed.order.user_id,
            total = %placed.order.total_amount,
            promos = placed.promos.len(),
            "Order created"
        );
        Ok(placed)
    }
}
