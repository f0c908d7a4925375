pub mod cart;
pub mod cart_item;
pub mod order;
pub mod order_item;
pub mod order_promo;
pub mod product;
pub mod promo;
pub mod promo_city;
pub mod user;

pub use promo::{PromoRule, PromoType, Segmentation};
