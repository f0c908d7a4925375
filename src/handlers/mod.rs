pub mod carts;
pub mod common;
pub mod orders;
pub mod promos;

use crate::{
    config::AppConfig,
    db::DbPool,
    services::{CartService, OrderService, PromoService},
};
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub cart: Arc<CartService>,
    pub orders: Arc<OrderService>,
    pub promos: Arc<PromoService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>, config: &AppConfig) -> Self {
        Self {
            cart: Arc::new(CartService::new(db_pool.clone())),
            orders: Arc::new(OrderService::new(
                db_pool.clone(),
                config.loyalty_order_threshold,
            )),
            promos: Arc::new(PromoService::new(db_pool)),
        }
    }
}
