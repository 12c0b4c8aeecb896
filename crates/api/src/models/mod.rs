//! Persistence-shaped domain structs.
//!
//! These mirror the database rows one-to-one: associations are explicit
//! foreign-key ids, never lazily loaded objects. Joins happen in the
//! repository layer, which returns purpose-built row structs (e.g.
//! [`cart::CartDetailRow`]) where a listing needs data from two tables.

pub mod cart;
pub mod catalog;
pub mod review;
pub mod user;

pub use cart::{Cart, CartDetailRow, CartItem};
pub use catalog::{Category, FeaturedProduct, Product};
pub use review::Review;
pub use user::{Customer, User, UserProfile};
