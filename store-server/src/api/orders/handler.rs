//! Order API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use shared::dto::order::{CreateOrderRequest, UpdateOrderRequest};

use crate::auth::{CurrentUser, OptionalUser};
use crate::core::ServerState;
use crate::db::models::Order;
use crate::utils::validation::{MAX_SHORT_TEXT_LEN, validate_optional_text};
use crate::utils::{AppError, AppResult};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub item: Order,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderListResponse {
    pub items: Vec<Order>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedOrdersResponse {
    pub items: Vec<Order>,
    pub page: u64,
    pub limit: u64,
    pub total: i64,
    pub total_pages: i64,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// POST /api/orders - place an order (guest checkout allowed)
///
/// 400 on arithmetic mismatch, 409 on insufficient stock.
pub async fn create(
    State(state): State<ServerState>,
    OptionalUser(user): OptionalUser,
    Json(req): Json<CreateOrderRequest>,
) -> AppResult<(StatusCode, Json<OrderResponse>)> {
    req.validate()?;

    let order = state
        .order_placer
        .place(req, user.map(|u| u.user_id))
        .await?;
    Ok((StatusCode::CREATED, Json(OrderResponse { item: order })))
}

/// GET /api/orders/my - latest orders of the current user
pub async fn my_orders(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<OrderListResponse>> {
    let items = state
        .order_placer
        .orders()
        .find_by_user(&user.user_id)
        .await?;
    Ok(Json(OrderListResponse { items }))
}

/// GET /api/orders/{id} - owner or staff only
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<OrderResponse>> {
    let order = state
        .order_placer
        .orders()
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found("Order not found"))?;

    let is_owner = order.user_id.as_deref() == Some(user.user_id.as_str());
    if !is_owner && !user.role.is_staff() {
        return Err(AppError::forbidden("Not your order"));
    }

    Ok(Json(OrderResponse { item: order }))
}

/// GET /api/orders/admin/list - paginated listing (staff)
pub async fn admin_list(
    State(state): State<ServerState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PagedOrdersResponse>> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(20).clamp(1, 100);

    let (items, total) = state.order_placer.orders().list(page, limit).await?;
    let total_pages = (total + limit as i64 - 1) / limit as i64;

    Ok(Json(PagedOrdersResponse {
        items,
        page,
        limit,
        total,
        total_pages,
    }))
}

/// PATCH /api/orders/admin/{id} - status transition / shipment metadata
/// (staff); 409 on a transition the state machine forbids
pub async fn admin_update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateOrderRequest>,
) -> AppResult<Json<OrderResponse>> {
    req.validate()?;
    validate_optional_text(&req.tracking_number, "trackingNumber", MAX_SHORT_TEXT_LEN)?;

    let order = state.order_placer.transition(&id, req).await?;
    Ok(Json(OrderResponse { item: order }))
}
