//! Cart reconciliation
//!
//! Pure merge logic over item sets; all catalog I/O happens in the caller,
//! which passes the resolved sellable products in. Keeping this free of I/O
//! is what makes the convergence properties testable.
//!
//! Conflict rule: quantities resolve to max(local, server), never the sum.
//! Summing would double-count items the client already saw persisted, and
//! max keeps repeated syncs (retried requests) idempotent. Price, name and
//! image always come from the server's current item; client-held copies may
//! be stale.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use shared::dto::cart::{CartConflict, CartItemInput, ConflictResolution};

use crate::db::models::CartItem;

/// Catalog view for a merge: product id → current price, present only for
/// products that exist and are currently sellable
pub type SellableProducts = HashMap<String, f64>;

/// Result of a merge pass
#[derive(Debug)]
pub struct MergeOutcome {
    pub items: Vec<CartItem>,
    pub conflicts: Vec<CartConflict>,
    /// Ids of client items newly added to the result
    pub added_item_ids: Vec<String>,
    /// Ids of client items dropped for unsellable/vanished products
    pub dropped_item_ids: Vec<String>,
}

/// Resolve a quantity conflict; returns the kept quantity and which side won
fn resolve_quantity(local: u32, server: u32) -> (u32, ConflictResolution) {
    let kept = local.max(server);
    let resolution = if kept == local {
        ConflictResolution::Local
    } else if kept == server {
        ConflictResolution::Server
    } else {
        ConflictResolution::Combined
    };
    (kept, resolution)
}

/// Per-item reconciliation of a client snapshot against the server items
///
/// 1. Seed the result with every server item.
/// 2. Client item with a matching identity token: keep the server item,
///    lift the quantity to max(local, server), record a conflict when the
///    quantities disagreed.
/// 3. Client item unknown to the server: keep it only if its product is in
///    `sellable` (stamped with the server price); drop it otherwise, since
///    a vanished or delisted product must not block the rest of the merge.
pub fn merge_items(
    server_items: &[CartItem],
    client_items: Vec<CartItemInput>,
    sellable: &SellableProducts,
    now: DateTime<Utc>,
) -> MergeOutcome {
    let mut items: Vec<CartItem> = server_items.to_vec();
    let mut conflicts = Vec::new();
    let mut added_item_ids = Vec::new();
    let mut dropped_item_ids = Vec::new();

    for client_item in client_items {
        if let Some(index) = items.iter().position(|i| i.id == client_item.id) {
            let server_item = &mut items[index];
            let local_quantity = client_item.quantity;
            let server_quantity = server_item.quantity;

            let (kept, resolution) = resolve_quantity(local_quantity, server_quantity);
            server_item.quantity = kept;
            server_item.updated_at = now;

            if local_quantity != server_quantity {
                conflicts.push(CartConflict {
                    item_id: client_item.id,
                    local_quantity,
                    server_quantity,
                    resolution,
                });
            }
        } else if let Some(&price) = sellable.get(&client_item.product_id) {
            let mut item = CartItem::from_input(client_item, now);
            item.price = price;
            added_item_ids.push(item.id.clone());
            items.push(item);
        } else {
            dropped_item_ids.push(client_item.id);
        }
    }

    MergeOutcome {
        items,
        conflicts,
        added_item_ids,
        dropped_item_ids,
    }
}

/// Client snapshot wins wholesale (`local` strategy)
pub fn replace_items(client_items: Vec<CartItemInput>, now: DateTime<Utc>) -> Vec<CartItem> {
    client_items
        .into_iter()
        .map(|input| CartItem::from_input(input, now))
        .collect()
}

/// Guest-to-user reconciliation (login path)
///
/// Same max-quantity rule as [`merge_items`], mutating the user cart in
/// place; returns the ids of guest items that were new to the user cart.
pub fn merge_guest_items(
    user_items: &mut Vec<CartItem>,
    guest_items: Vec<CartItemInput>,
    sellable: &SellableProducts,
    now: DateTime<Utc>,
) -> Vec<String> {
    let mut merged_item_ids = Vec::new();

    for guest_item in guest_items {
        let Some(&price) = sellable.get(&guest_item.product_id) else {
            continue;
        };

        if let Some(index) = user_items.iter().position(|i| i.id == guest_item.id) {
            let existing = &mut user_items[index];
            existing.quantity = existing.quantity.max(guest_item.quantity);
            existing.updated_at = now;
        } else {
            let mut item = CartItem::from_input(guest_item, now);
            item.price = price;
            merged_item_ids.push(item.id.clone());
            user_items.push(item);
        }
    }

    merged_item_ids
}
