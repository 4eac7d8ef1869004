//! Product API DTOs

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Product variant (e.g. "Large", "Red")
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VariantInput {
    #[validate(length(min = 1))]
    pub name: String,
    pub image: String,
    #[validate(range(min = 0.0))]
    pub price: f64,
}

/// POST /api/products
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductCreateRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[validate(range(min = 0.0))]
    pub price: f64,
    #[validate(range(min = 0.0))]
    pub original_price: Option<f64>,
    #[serde(default)]
    pub images: Vec<String>,
    pub cover_image: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub in_stock: Option<bool>,
    pub stock_quantity: Option<i64>,
    pub featured: Option<bool>,
    #[serde(default)]
    #[validate(nested)]
    pub variants: Vec<VariantInput>,
}

/// PUT /api/products/{id}
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdateRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0.0))]
    pub price: Option<f64>,
    #[validate(range(min = 0.0))]
    pub original_price: Option<f64>,
    pub images: Option<Vec<String>>,
    pub cover_image: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub in_stock: Option<bool>,
    pub stock_quantity: Option<i64>,
    pub featured: Option<bool>,
    #[validate(nested)]
    pub variants: Option<Vec<VariantInput>>,
}
