//! Order Repository

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{BaseRepository, RepoError, RepoResult, make_record_id};
use crate::db::models::Order;
use shared::OrderStatus;

const ORDER_TABLE: &str = "order";

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

/// Admin status/shipment patch; MERGE leaves absent fields untouched
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OrderPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<OrderStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    shipping: Option<ShippingPatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    shipped_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    delivered_at: Option<DateTime<Utc>>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ShippingPatch {
    tracking_number: String,
}

#[derive(Debug, Deserialize)]
struct CountRow {
    count: i64,
}

impl OrderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn create(&self, order: Order) -> RepoResult<Order> {
        let created: Option<Order> = self.base.db().create(ORDER_TABLE).content(order).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create order".to_string()))
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Order>> {
        let rid = make_record_id(ORDER_TABLE, id);
        let order: Option<Order> = self.base.db().select(rid).await?;
        Ok(order)
    }

    /// Latest orders placed by a user (capped at 100)
    pub async fn find_by_user(&self, user_id: &str) -> RepoResult<Vec<Order>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM order WHERE userId = $uid ORDER BY createdAt DESC LIMIT 100")
            .bind(("uid", user_id.to_string()))
            .await?;
        let orders: Vec<Order> = result.take(0)?;
        Ok(orders)
    }

    /// Admin listing, newest first
    pub async fn list(&self, page: u64, limit: u64) -> RepoResult<(Vec<Order>, i64)> {
        let start = (page.saturating_sub(1)) * limit;
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM order ORDER BY createdAt DESC LIMIT $limit START $start")
            .query("SELECT count() AS count FROM order GROUP ALL")
            .bind(("limit", limit as i64))
            .bind(("start", start as i64))
            .await?;
        let orders: Vec<Order> = result.take(0)?;
        let counts: Vec<CountRow> = result.take(1)?;
        let total = counts.first().map(|c| c.count).unwrap_or(0);
        Ok((orders, total))
    }

    /// Apply an already-validated status transition and shipment metadata
    pub async fn apply_transition(
        &self,
        id: &str,
        status: Option<OrderStatus>,
        tracking_number: Option<String>,
        now: DateTime<Utc>,
    ) -> RepoResult<Option<Order>> {
        let rid = make_record_id(ORDER_TABLE, id);
        let patch = OrderPatch {
            status,
            shipping: tracking_number.map(|tracking_number| ShippingPatch { tracking_number }),
            shipped_at: (status == Some(OrderStatus::Shipped)).then_some(now),
            delivered_at: (status == Some(OrderStatus::Delivered)).then_some(now),
            updated_at: now,
        };
        let updated: Option<Order> = self.base.db().update(rid).merge(patch).await?;
        Ok(updated)
    }
}
