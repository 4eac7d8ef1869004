//! Cart service
//!
//! Get-or-create by identity, item mutations, sync and guest merge. Every
//! mutation goes through [`Cart::recompute_totals`] before the save, so the
//! derived totals can never drift from the item set.

use std::collections::HashSet;

use chrono::Utc;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use shared::dto::cart::{CartConflict, CartItemInput, MergeStrategy};

use crate::cart::merge::{self, SellableProducts};
use crate::db::models::{Cart, CartItem, Identity};
use crate::db::repository::{CartRepository, ProductRepository};
use crate::utils::{AppError, AppResult};

#[derive(Clone)]
pub struct CartService {
    carts: CartRepository,
    products: ProductRepository,
}

impl CartService {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            carts: CartRepository::new(db.clone()),
            products: ProductRepository::new(db),
        }
    }

    /// Current cart for an identity, created lazily on first access
    pub async fn get_cart(&self, identity: &Identity) -> AppResult<Cart> {
        Ok(self.carts.get_or_create(identity).await?)
    }

    /// Add an item; quantities accumulate when the item already exists
    /// (add is an intentional increment, unlike the idempotent merge)
    pub async fn add_item(
        &self,
        identity: &Identity,
        mut input: CartItemInput,
    ) -> AppResult<(Cart, String, u32)> {
        // Price authority: the catalog, not the client
        let product = self
            .products
            .find_by_id(&input.product_id)
            .await?
            .ok_or_else(|| AppError::not_found("Product not found"))?;
        if !product.is_sellable() {
            return Err(AppError::invalid("Product out of stock"));
        }
        input.price = product.price;

        let mut cart = self.carts.get_or_create(identity).await?;
        let now = Utc::now();
        let item_id = input.id.clone();

        let quantity = match cart.find_item(&input.id) {
            Some(index) => {
                let item = &mut cart.items[index];
                item.quantity += input.quantity;
                item.updated_at = now;
                item.quantity
            }
            None => {
                let quantity = input.quantity;
                cart.items.push(CartItem::from_input(input, now));
                quantity
            }
        };

        cart.recompute_totals();
        let cart = self.carts.save(&cart).await?;
        Ok((cart, item_id, quantity))
    }

    /// Set an item's quantity; zero removes the item
    pub async fn update_item(
        &self,
        identity: &Identity,
        item_id: &str,
        quantity: u32,
    ) -> AppResult<(Cart, u32)> {
        let mut cart = self.carts.get_or_create(identity).await?;
        let index = cart
            .find_item(item_id)
            .ok_or_else(|| AppError::not_found("Item not found in cart"))?;

        if quantity == 0 {
            cart.items.remove(index);
        } else {
            let item = &mut cart.items[index];
            item.quantity = quantity;
            item.updated_at = Utc::now();
        }

        cart.recompute_totals();
        let cart = self.carts.save(&cart).await?;
        Ok((cart, quantity))
    }

    /// Remove an item
    pub async fn remove_item(&self, identity: &Identity, item_id: &str) -> AppResult<Cart> {
        let mut cart = self.carts.get_or_create(identity).await?;
        let index = cart
            .find_item(item_id)
            .ok_or_else(|| AppError::not_found("Item not found in cart"))?;

        cart.items.remove(index);
        cart.recompute_totals();
        Ok(self.carts.save(&cart).await?)
    }

    /// Empty the cart (the record soft-persists)
    pub async fn clear(&self, identity: &Identity) -> AppResult<Cart> {
        let mut cart = self.carts.get_or_create(identity).await?;
        cart.items.clear();
        cart.recompute_totals();
        Ok(self.carts.save(&cart).await?)
    }

    /// Reconcile a client snapshot under the caller-selected strategy
    ///
    /// Not mutually exclusive across concurrent calls for the same
    /// identity; the max-quantity rule converges under re-runs, but a call
    /// is not guaranteed to observe a strictly newer state than a prior
    /// one.
    pub async fn sync(
        &self,
        identity: &Identity,
        local_cart: Vec<CartItemInput>,
        strategy: MergeStrategy,
    ) -> AppResult<(Cart, Vec<CartConflict>)> {
        let mut cart = self.carts.get_or_create(identity).await?;
        let now = Utc::now();
        let mut conflicts = Vec::new();

        match strategy {
            MergeStrategy::Local => {
                cart.items = merge::replace_items(local_cart, now);
            }
            MergeStrategy::Server => {
                // Server wins; nothing to reconcile
            }
            MergeStrategy::Merge => {
                let sellable = self.sellable_products(&local_cart).await?;
                let outcome = merge::merge_items(&cart.items, local_cart, &sellable, now);
                if !outcome.dropped_item_ids.is_empty() {
                    tracing::debug!(
                        dropped = ?outcome.dropped_item_ids,
                        "Dropped unsellable items during cart sync"
                    );
                }
                cart.items = outcome.items;
                conflicts = outcome.conflicts;
            }
        }

        cart.last_synced_at = Some(now);
        cart.recompute_totals();
        let cart = self.carts.save(&cart).await?;
        Ok((cart, conflicts))
    }

    /// Absorb a guest cart into the user's cart on login
    ///
    /// Finalizes by deleting the guest-identified cart so the session
    /// identifier cannot reach a duplicate cart again.
    pub async fn merge_guest(
        &self,
        user_identity: &Identity,
        session_id: Option<String>,
        guest_cart: Vec<CartItemInput>,
    ) -> AppResult<(Cart, Vec<String>)> {
        let mut cart = self.carts.get_or_create(user_identity).await?;
        let sellable = self.sellable_products(&guest_cart).await?;
        let merged_item_ids =
            merge::merge_guest_items(&mut cart.items, guest_cart, &sellable, Utc::now());

        cart.recompute_totals();
        let cart = self.carts.save(&cart).await?;

        if let Some(session) = session_id {
            self.carts
                .delete_by_identity(&Identity::Guest(session))
                .await?;
        }

        Ok((cart, merged_item_ids))
    }

    /// Resolve which referenced products currently exist and are sellable
    async fn sellable_products(&self, items: &[CartItemInput]) -> AppResult<SellableProducts> {
        let mut sellable = SellableProducts::new();
        let mut seen = HashSet::new();

        for item in items {
            if !seen.insert(item.product_id.clone()) {
                continue;
            }
            if let Some(product) = self.products.find_by_id(&item.product_id).await? {
                if product.is_sellable() {
                    sellable.insert(item.product_id.clone(), product.price);
                }
            }
        }

        Ok(sellable)
    }
}
