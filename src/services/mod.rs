// Checkout pricing, independent of storage
pub mod order_assembly;

// Use cases
pub mod cart_service;
pub mod order_service;
pub mod promo_service;

pub use cart_service::{AddToCartInput, CartService, RemoveFromCartInput};
pub use order_service::{CreateOrderInput, OrderService};
pub use promo_service::{CreatePromoInput, ExtendPromoInput, GetPromoInput, PromoPage, PromoService};
