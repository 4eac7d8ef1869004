//! Product API Handlers
//!
//! Catalog reads are public; writes require a staff role.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use serde::Serialize;
use validator::Validate;

use shared::dto::product::{ProductCreateRequest, ProductUpdateRequest};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Product, Variant};
use crate::db::repository::ProductRepository;
use crate::utils::{AppError, AppResult};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub item: Product,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListResponse {
    pub items: Vec<Product>,
}

fn require_staff_role(user: &CurrentUser) -> AppResult<()> {
    if !user.role.is_staff() {
        return Err(AppError::forbidden("Staff role required"));
    }
    Ok(())
}

/// GET /api/products - list catalog
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<ProductListResponse>> {
    let repo = ProductRepository::new(state.db.clone());
    let items = repo.find_all().await?;
    Ok(Json(ProductListResponse { items }))
}

/// GET /api/products/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ProductResponse>> {
    let repo = ProductRepository::new(state.db.clone());
    let item = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Product {id}")))?;
    Ok(Json(ProductResponse { item }))
}

/// POST /api/products (staff)
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(req): Json<ProductCreateRequest>,
) -> AppResult<(StatusCode, Json<ProductResponse>)> {
    require_staff_role(&user)?;
    req.validate()?;

    let now = Utc::now();
    let product = Product {
        id: None,
        name: req.name,
        description: req.description,
        price: req.price,
        original_price: req.original_price,
        images: req.images,
        cover_image: req.cover_image,
        category: req.category,
        tags: req.tags,
        in_stock: req.in_stock.unwrap_or(true),
        stock_quantity: req.stock_quantity.unwrap_or(0),
        featured: req.featured.unwrap_or(false),
        variants: req
            .variants
            .into_iter()
            .map(|v| Variant {
                name: v.name,
                image: v.image,
                price: v.price,
            })
            .collect(),
        created_at: now,
        updated_at: now,
    };

    let repo = ProductRepository::new(state.db.clone());
    let item = repo.create(product).await?;
    Ok((StatusCode::CREATED, Json(ProductResponse { item })))
}

/// PUT /api/products/{id} (staff)
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<ProductUpdateRequest>,
) -> AppResult<Json<ProductResponse>> {
    require_staff_role(&user)?;
    req.validate()?;

    let repo = ProductRepository::new(state.db.clone());
    let item = repo
        .update(&id, req)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Product {id}")))?;
    Ok(Json(ProductResponse { item }))
}

/// DELETE /api/products/{id} (staff)
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    require_staff_role(&user)?;

    let repo = ProductRepository::new(state.db.clone());
    let deleted = repo.delete(&id).await?;
    if !deleted {
        return Err(AppError::not_found(format!("Product {id}")));
    }
    Ok(Json(serde_json::json!({ "success": true })))
}
