//! Cart Model
//!
//! A cart is owned by exactly one identity: an authenticated user or an
//! anonymous guest session. The `owner` field encodes that identity as a
//! single required string so a unique index can enforce "exactly one cart
//! per identity" at the storage layer.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};
use shared::dto::cart::{BasketSubItem, CartItemInput, CustomSubItem};
use surrealdb::RecordId;

use super::serde_helpers;

/// Cart-owning identity: authenticated user or anonymous session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    /// "user:key" record id string
    User(String),
    /// Opaque session identifier from the `X-Session-ID` header
    Guest(String),
}

impl Identity {
    /// Owner key stored on the cart record; unique per identity
    pub fn owner_key(&self) -> String {
        match self {
            Identity::User(id) => id.clone(),
            Identity::Guest(session) => format!("guest:{session}"),
        }
    }
}

/// One cart line
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Identity token, unique within the cart (product id, or product id +
    /// variant slug)
    pub id: String,
    pub product_id: String,
    pub name: String,
    /// Last price accepted from the catalog; never client-supplied truth
    pub price: f64,
    pub image: String,
    pub category: String,
    #[serde(default)]
    pub description: String,
    pub quantity: u32,
    pub variant_name: Option<String>,
    #[serde(default)]
    pub custom_items: Vec<CustomSubItem>,
    #[serde(default)]
    pub basket_items: Vec<BasketSubItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CartItem {
    /// Build a stored line from client input, stamping timestamps
    pub fn from_input(input: CartItemInput, now: DateTime<Utc>) -> Self {
        Self {
            id: input.id,
            product_id: input.product_id,
            name: input.name,
            price: input.price,
            image: input.image,
            category: input.category,
            description: input.description,
            quantity: input.quantity,
            variant_name: input.variant_name,
            custom_items: input.custom_items.unwrap_or_default(),
            basket_items: input.basket_items.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Cart model
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,
    /// Uniqueness key derived from the owning identity
    pub owner: String,
    pub user_id: Option<String>,
    pub session_id: Option<String>,
    #[serde(default)]
    pub items: Vec<CartItem>,
    /// Derived; recomputed from items on every mutation
    #[serde(default)]
    pub total_price: f64,
    /// Derived; recomputed from items on every mutation
    #[serde(default)]
    pub total_items: u32,
    pub last_synced_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    /// Fresh empty cart for an identity
    pub fn new(identity: &Identity, now: DateTime<Utc>) -> Self {
        let (user_id, session_id) = match identity {
            Identity::User(id) => (Some(id.clone()), None),
            Identity::Guest(session) => (None, Some(session.clone())),
        };
        Self {
            id: None,
            owner: identity.owner_key(),
            user_id,
            session_id,
            items: Vec::new(),
            total_price: 0.0,
            total_items: 0,
            last_synced_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Recompute `total_items` / `total_price` from the item set
    ///
    /// Invariant after every mutation: totalItems = Σ quantity and
    /// totalPrice = Σ price·quantity (2 decimal places).
    pub fn recompute_totals(&mut self) {
        self.total_items = self.items.iter().map(|i| i.quantity).sum();

        let total: Decimal = self
            .items
            .iter()
            .map(|i| {
                Decimal::from_f64(i.price).unwrap_or_default() * Decimal::from(i.quantity)
            })
            .sum();
        self.total_price = total
            .round_dp(2)
            .to_f64()
            .unwrap_or(0.0);
    }

    /// Position of an item by identity token
    pub fn find_item(&self, item_id: &str) -> Option<usize> {
        self.items.iter().position(|i| i.id == item_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, price: f64, quantity: u32) -> CartItem {
        let now = Utc::now();
        CartItem {
            id: id.to_string(),
            product_id: format!("product:{id}"),
            name: id.to_string(),
            price,
            image: String::new(),
            category: String::new(),
            description: String::new(),
            quantity,
            variant_name: None,
            custom_items: Vec::new(),
            basket_items: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn totals_follow_items() {
        let mut cart = Cart::new(&Identity::Guest("s1".into()), Utc::now());
        cart.items.push(item("a", 10.0, 2));
        cart.items.push(item("b", 7.5, 1));
        cart.recompute_totals();
        assert_eq!(cart.total_items, 3);
        assert_eq!(cart.total_price, 27.5);

        cart.items.pop();
        cart.recompute_totals();
        assert_eq!(cart.total_items, 2);
        assert_eq!(cart.total_price, 20.0);
    }

    #[test]
    fn decimal_sum_avoids_float_drift() {
        let mut cart = Cart::new(&Identity::Guest("s1".into()), Utc::now());
        for _ in 0..10 {
            cart.items.push(item("x", 0.1, 1));
        }
        cart.recompute_totals();
        assert_eq!(cart.total_price, 1.0);
    }

    #[test]
    fn owner_key_separates_user_and_guest() {
        assert_eq!(Identity::User("user:abc".into()).owner_key(), "user:abc");
        assert_eq!(Identity::Guest("abc".into()).owner_key(), "guest:abc");
        assert_ne!(
            Identity::User("user:s".into()).owner_key(),
            Identity::Guest("s".into()).owner_key()
        );
    }
}
