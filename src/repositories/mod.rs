//! Per-table data access.
//!
//! Repositories hold no connection of their own. Every call takes the
//! connection explicitly so the same method runs against the pool or against
//! the transaction of an enclosing [`UnitOfWork`](crate::db::UnitOfWork).

pub mod cart_repository;
pub mod order_repository;
pub mod product_repository;
pub mod promo_eligibility;
pub mod promo_repository;
pub mod user_repository;

pub use cart_repository::{CartLineRow, CartRepository, LoadedCart};
pub use order_repository::{NewOrder, NewOrderItem, NewOrderPromo, OrderRepository, PlacedOrder};
pub use product_repository::ProductRepository;
pub use promo_eligibility::EligibilityQuery;
pub use promo_repository::PromoRepository;
pub use user_repository::UserRepository;
