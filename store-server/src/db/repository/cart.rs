//! Cart Repository
//!
//! One cart per identity, enforced by the unique index on `owner`.
//! get-or-create is a read-check-write backed by that constraint: a racing
//! create loses to the index and falls back to the winner's record.

use chrono::{DateTime, Utc};
use serde::Serialize;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{BaseRepository, RepoError, RepoResult, is_unique_violation};
use crate::db::models::{Cart, CartItem, Identity};

const CART_TABLE: &str = "cart";

#[derive(Clone)]
pub struct CartRepository {
    base: BaseRepository,
}

/// Mutable subset of a cart; everything else is fixed at creation
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CartPatch {
    items: Vec<CartItem>,
    total_price: f64,
    total_items: u32,
    last_synced_at: Option<DateTime<Utc>>,
    updated_at: DateTime<Utc>,
}

impl CartRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_by_identity(&self, identity: &Identity) -> RepoResult<Option<Cart>> {
        let owner = identity.owner_key();
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM cart WHERE owner = $owner LIMIT 1")
            .bind(("owner", owner))
            .await?;
        let cart: Option<Cart> = result.take(0)?;
        Ok(cart)
    }

    /// Fetch the identity's cart, creating an empty one lazily
    pub async fn get_or_create(&self, identity: &Identity) -> RepoResult<Cart> {
        if let Some(cart) = self.find_by_identity(identity).await? {
            return Ok(cart);
        }

        let cart = Cart::new(identity, Utc::now());
        let created: Result<Option<Cart>, surrealdb::Error> =
            self.base.db().create(CART_TABLE).content(cart).await;
        match created {
            Ok(Some(created)) => Ok(created),
            Ok(None) => Err(RepoError::Database("Failed to create cart".to_string())),
            Err(e) if is_unique_violation(&e) => {
                // Concurrent create for the same identity; take the winner
                self.find_by_identity(identity)
                    .await?
                    .ok_or_else(|| RepoError::Database(e.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Persist the mutable part of a cart (items + derived totals)
    pub async fn save(&self, cart: &Cart) -> RepoResult<Cart> {
        let id = cart
            .id
            .clone()
            .ok_or_else(|| RepoError::Validation("Cart has no id".to_string()))?;
        let patch = CartPatch {
            items: cart.items.clone(),
            total_price: cart.total_price,
            total_items: cart.total_items,
            last_synced_at: cart.last_synced_at,
            updated_at: Utc::now(),
        };
        let updated: Option<Cart> = self.base.db().update(id).merge(patch).await?;
        updated.ok_or_else(|| RepoError::NotFound("Cart vanished during save".to_string()))
    }

    /// Drop the cart owned by an identity, if any
    pub async fn delete_by_identity(&self, identity: &Identity) -> RepoResult<()> {
        let owner = identity.owner_key();
        self.base
            .db()
            .query("DELETE FROM cart WHERE owner = $owner")
            .bind(("owner", owner))
            .await?;
        Ok(())
    }
}
