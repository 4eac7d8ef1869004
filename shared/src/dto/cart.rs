//! Cart API DTOs

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Sub-item of a custom composite product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomSubItem {
    pub id: String,
    pub name: String,
    pub image: String,
    pub price: f64,
}

/// Sub-item of a pre-assembled composite product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasketSubItem {
    pub name: String,
    pub image: String,
    pub category: String,
}

/// One cart line as the client holds it
///
/// `id` is the item identity token, unique within a cart (product id, or
/// product id + variant slug). `price` is advisory only; the server replaces
/// it with the catalog price wherever it has authority.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CartItemInput {
    #[validate(length(min = 1))]
    pub id: String,
    #[validate(length(min = 1))]
    pub product_id: String,
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(range(min = 0.0))]
    pub price: f64,
    pub image: String,
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[validate(range(min = 1))]
    pub quantity: u32,
    pub variant_name: Option<String>,
    #[serde(default)]
    pub custom_items: Option<Vec<CustomSubItem>>,
    #[serde(default)]
    pub basket_items: Option<Vec<BasketSubItem>>,
}

/// POST /api/cart/items
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    #[validate(nested)]
    pub item: CartItemInput,
}

/// PUT /api/cart/items/{id}; quantity 0 removes the item
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemRequest {
    pub quantity: u32,
}

/// Caller-selected reconciliation policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MergeStrategy {
    /// Client snapshot wins wholesale
    Local,
    /// Server cart wins, no change
    Server,
    /// Per-item reconciliation
    #[default]
    Merge,
}

/// POST /api/cart/sync
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SyncCartRequest {
    #[validate(nested)]
    pub local_cart: Vec<CartItemInput>,
    pub last_synced_at: Option<String>,
    #[serde(default)]
    pub merge_strategy: MergeStrategy,
}

/// POST /api/cart/merge-guest
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MergeGuestRequest {
    #[validate(nested)]
    pub guest_cart: Vec<CartItemInput>,
}

/// Which side a quantity conflict resolved to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictResolution {
    Local,
    Server,
    /// Kept quantity matches neither original (intermediate normalization)
    Combined,
}

/// Reported when local and server quantities disagreed during a merge
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartConflict {
    pub item_id: String,
    pub local_quantity: u32,
    pub server_quantity: u32,
    pub resolution: ConflictResolution,
}
