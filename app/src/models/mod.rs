// app/src/models/mod.rs

//! Domain records persisted by the inventory store.

pub mod line_item;
pub mod order;
pub mod product;
pub mod sale;
pub mod user;

pub use line_item::{LineItem, LineRequest, Shortfall};
pub use order::{NewOrder, Order, OrderStatus};
pub use product::{NewProduct, Product, ProductUpdate};
pub use sale::{NewSale, Sale};
pub use user::{NewUser, Role, User};
