//! Product Repository

use chrono::{DateTime, Utc};
use serde::Serialize;
use shared::dto::product::ProductUpdateRequest;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{BaseRepository, RepoResult, make_record_id};
use crate::db::models::{Product, Variant};

const PRODUCT_TABLE: &str = "product";

#[derive(Clone)]
pub struct ProductRepository {
    base: BaseRepository,
}

/// Partial update; absent fields are left untouched by MERGE
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProductPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    original_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    images: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cover_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    in_stock: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stock_quantity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    featured: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    variants: Option<Vec<Variant>>,
    updated_at: DateTime<Utc>,
}

impl ProductRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_all(&self) -> RepoResult<Vec<Product>> {
        let products: Vec<Product> = self
            .base
            .db()
            .query("SELECT * FROM product ORDER BY createdAt DESC")
            .await?
            .take(0)?;
        Ok(products)
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Product>> {
        let rid = make_record_id(PRODUCT_TABLE, id);
        let product: Option<Product> = self.base.db().select(rid).await?;
        Ok(product)
    }

    pub async fn create(&self, product: Product) -> RepoResult<Product> {
        let created: Option<Product> = self
            .base
            .db()
            .create(PRODUCT_TABLE)
            .content(product)
            .await?;
        created.ok_or_else(|| super::RepoError::Database("Failed to create product".to_string()))
    }

    pub async fn update(&self, id: &str, data: ProductUpdateRequest) -> RepoResult<Option<Product>> {
        let rid = make_record_id(PRODUCT_TABLE, id);
        let patch = ProductPatch {
            name: data.name,
            description: data.description,
            price: data.price,
            original_price: data.original_price,
            images: data.images,
            cover_image: data.cover_image,
            category: data.category,
            tags: data.tags,
            in_stock: data.in_stock,
            stock_quantity: data.stock_quantity,
            featured: data.featured,
            variants: data
                .variants
                .map(|vs| {
                    vs.into_iter()
                        .map(|v| Variant {
                            name: v.name,
                            image: v.image,
                            price: v.price,
                        })
                        .collect()
                }),
            updated_at: Utc::now(),
        };
        let updated: Option<Product> = self.base.db().update(rid).merge(patch).await?;
        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        let rid = make_record_id(PRODUCT_TABLE, id);
        let deleted: Option<Product> = self.base.db().delete(rid).await?;
        Ok(deleted.is_some())
    }

    /// Conditionally reserve stock for one line item
    ///
    /// Single-record conditional write: the decrement succeeds only if the
    /// stock at the time of the write still covers the requested quantity.
    /// Returns false when a concurrent order reserved the units first; the
    /// advisory pre-check in the order placer is never trusted over this.
    pub async fn reserve_stock(&self, id: &str, quantity: u32) -> RepoResult<bool> {
        let rid = make_record_id(PRODUCT_TABLE, id);
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE $id SET stockQuantity -= $qty, inStock = true, updatedAt = $now \
                 WHERE stockQuantity >= $qty RETURN AFTER",
            )
            .bind(("id", rid))
            .bind(("qty", quantity as i64))
            .bind(("now", Utc::now()))
            .await?;
        let updated: Vec<Product> = result.take(0)?;
        Ok(!updated.is_empty())
    }

    /// Return previously reserved units (compensation when a later line of
    /// the same order loses its reservation race)
    pub async fn restore_stock(&self, id: &str, quantity: u32) -> RepoResult<()> {
        let rid = make_record_id(PRODUCT_TABLE, id);
        self.base
            .db()
            .query("UPDATE $id SET stockQuantity += $qty, updatedAt = $now")
            .bind(("id", rid))
            .bind(("qty", quantity as i64))
            .bind(("now", Utc::now()))
            .await?;
        Ok(())
    }
}
