//! Database models
//!
//! One module per table. Wire format and storage format share the same
//! serde shape (camelCase, ids as "table:key" strings).

pub mod cart;
pub mod order;
pub mod product;
pub mod refresh_token;
pub mod serde_helpers;
pub mod user;

pub use cart::{Cart, CartItem, Identity};
pub use order::{Address, Order, OrderItem, PaymentInfo, ShippingInfo, Totals};
pub use product::{Product, Variant};
pub use refresh_token::RefreshToken;
pub use user::{User, UserRole};
