//! Cart API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use validator::Validate;

use shared::dto::cart::{
    AddItemRequest, CartConflict, MergeGuestRequest, SyncCartRequest, UpdateItemRequest,
};

use crate::auth::{CurrentUser, SessionId};
use crate::core::ServerState;
use crate::db::models::{Cart, Identity};
use crate::utils::AppResult;
use crate::utils::validation::{MAX_NAME_LEN, validate_required_text};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub cart: Cart,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRef {
    pub id: String,
    pub quantity: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemResponse {
    pub cart: Cart,
    pub item: ItemRef,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveItemResponse {
    pub cart: Cart,
    pub removed_item_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResponse {
    pub cart: Cart,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflicts: Option<Vec<CartConflict>>,
    pub synced_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeGuestResponse {
    pub cart: Cart,
    pub merged_items: Vec<String>,
}

/// GET /api/cart - current user's cart
pub async fn get_cart(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<CartResponse>> {
    let cart = state
        .cart_service
        .get_cart(&Identity::User(user.user_id))
        .await?;
    Ok(Json(CartResponse { cart }))
}

/// GET /api/cart/guest - guest cart identified by X-Session-ID
pub async fn get_guest_cart(
    State(state): State<ServerState>,
    SessionId(session_id): SessionId,
) -> AppResult<Json<CartResponse>> {
    let cart = state
        .cart_service
        .get_cart(&Identity::Guest(session_id))
        .await?;
    Ok(Json(CartResponse { cart }))
}

/// POST /api/cart/items - add an item (quantities accumulate)
pub async fn add_item(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(req): Json<AddItemRequest>,
) -> AppResult<Json<CartItemResponse>> {
    req.validate()?;

    let (cart, item_id, quantity) = state
        .cart_service
        .add_item(&Identity::User(user.user_id), req.item)
        .await?;
    Ok(Json(CartItemResponse {
        cart,
        item: ItemRef {
            id: item_id,
            quantity,
        },
    }))
}

/// PUT /api/cart/items/{item_id} - set quantity (0 removes)
pub async fn update_item(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(item_id): Path<String>,
    Json(req): Json<UpdateItemRequest>,
) -> AppResult<Json<CartItemResponse>> {
    validate_required_text(&item_id, "itemId", MAX_NAME_LEN)?;

    let (cart, quantity) = state
        .cart_service
        .update_item(&Identity::User(user.user_id), &item_id, req.quantity)
        .await?;
    Ok(Json(CartItemResponse {
        cart,
        item: ItemRef {
            id: item_id,
            quantity,
        },
    }))
}

/// DELETE /api/cart/items/{item_id}
pub async fn remove_item(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(item_id): Path<String>,
) -> AppResult<Json<RemoveItemResponse>> {
    validate_required_text(&item_id, "itemId", MAX_NAME_LEN)?;

    let cart = state
        .cart_service
        .remove_item(&Identity::User(user.user_id), &item_id)
        .await?;
    Ok(Json(RemoveItemResponse {
        cart,
        removed_item_id: item_id,
    }))
}

/// DELETE /api/cart - empty the cart
pub async fn clear_cart(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<CartResponse>> {
    let cart = state
        .cart_service
        .clear(&Identity::User(user.user_id))
        .await?;
    Ok(Json(CartResponse { cart }))
}

/// POST /api/cart/sync - reconcile a client snapshot
pub async fn sync(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(req): Json<SyncCartRequest>,
) -> AppResult<Json<SyncResponse>> {
    req.validate()?;

    let (cart, conflicts) = state
        .cart_service
        .sync(
            &Identity::User(user.user_id),
            req.local_cart,
            req.merge_strategy,
        )
        .await?;

    let synced_at = cart.last_synced_at.unwrap_or(cart.updated_at);
    Ok(Json(SyncResponse {
        cart,
        conflicts: (!conflicts.is_empty()).then_some(conflicts),
        synced_at,
    }))
}

/// POST /api/cart/merge-guest - absorb the guest cart after login
pub async fn merge_guest(
    State(state): State<ServerState>,
    user: CurrentUser,
    session_id: Option<SessionId>,
    Json(req): Json<MergeGuestRequest>,
) -> AppResult<Json<MergeGuestResponse>> {
    req.validate()?;

    let (cart, merged_items) = state
        .cart_service
        .merge_guest(
            &Identity::User(user.user_id),
            session_id.map(|s| s.0),
            req.guest_cart,
        )
        .await?;
    Ok(Json(MergeGuestResponse { cart, merged_items }))
}
