//! Order placement
//!
//! Converts a checkout payload into an immutable order while protecting
//! stock from overselling. Pipeline: arithmetic validation → advisory stock
//! pre-check → authoritative conditional reservation → order insert. The
//! pre-check exists only for a friendlier error; the conditional decrement
//! is the single source of truth under concurrency.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::prelude::*;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use shared::dto::order::{CreateOrderRequest, OrderItemInput, TotalsInput, UpdateOrderRequest};

use crate::db::models::{Order, Product};
use crate::db::repository::{OrderRepository, ProductRepository};
use crate::orders::number::generate_order_number;
use crate::services::Mailer;
use crate::utils::{AppError, AppResult};

/// Tolerance for monetary comparisons (0.01), absorbing float rounding in
/// client-computed totals
pub const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Validate that declared totals are arithmetically consistent with the
/// line items, within [`MONEY_TOLERANCE`]
///
/// subtotal must equal Σ price·quantity and total must equal
/// subtotal + shipping + tax − discount. Runs before any stock mutation.
pub fn validate_totals(items: &[OrderItemInput], totals: &TotalsInput) -> AppResult<()> {
    let computed_subtotal: Decimal = items
        .iter()
        .map(|i| Decimal::from_f64(i.price).unwrap_or_default() * Decimal::from(i.quantity))
        .sum();

    let declared_subtotal = Decimal::from_f64(totals.subtotal)
        .ok_or_else(|| AppError::invalid("Subtotal is not a finite number"))?;
    if (computed_subtotal - declared_subtotal).abs() > MONEY_TOLERANCE {
        return Err(AppError::invalid("Subtotal mismatch"));
    }

    let shipping = Decimal::from_f64(totals.shipping)
        .ok_or_else(|| AppError::invalid("Shipping is not a finite number"))?;
    let tax = Decimal::from_f64(totals.tax)
        .ok_or_else(|| AppError::invalid("Tax is not a finite number"))?;
    let discount = Decimal::from_f64(totals.discount)
        .ok_or_else(|| AppError::invalid("Discount is not a finite number"))?;
    let declared_total = Decimal::from_f64(totals.total)
        .ok_or_else(|| AppError::invalid("Total is not a finite number"))?;

    let computed_total = computed_subtotal + shipping + tax - discount;
    if (computed_total - declared_total).abs() > MONEY_TOLERANCE {
        return Err(AppError::invalid("Total mismatch"));
    }

    Ok(())
}

/// Order placement and admin transitions
#[derive(Clone)]
pub struct OrderPlacer {
    products: ProductRepository,
    orders: OrderRepository,
    mailer: Arc<dyn Mailer>,
    order_number_prefix: String,
    /// Line items whose product reference does not resolve skip stock
    /// validation entirely when true (compatibility allowance for legacy /
    /// externally-sourced items); when false they reject the payload
    allow_unlisted_items: bool,
}

impl OrderPlacer {
    pub fn new(
        db: Surreal<Db>,
        mailer: Arc<dyn Mailer>,
        order_number_prefix: String,
        allow_unlisted_items: bool,
    ) -> Self {
        Self {
            products: ProductRepository::new(db.clone()),
            orders: OrderRepository::new(db),
            mailer,
            order_number_prefix,
            allow_unlisted_items,
        }
    }

    /// Place an order from a validated checkout payload
    ///
    /// Failure semantics: arithmetic problems reject with `BadRequest`
    /// before any stock mutation; stock shortfalls reject with `Conflict`
    /// so the client knows to re-fetch availability instead of fixing
    /// input. No partial orders are ever created.
    pub async fn place(
        &self,
        request: CreateOrderRequest,
        user_id: Option<String>,
    ) -> AppResult<Order> {
        validate_totals(&request.items, &request.totals)?;

        // Resolve line items against the catalog. Unresolved references are
        // either trusted as-is or rejected, per configuration.
        let mut listed: Vec<(OrderItemInput, Product)> = Vec::new();
        for item in &request.items {
            match self.products.find_by_id(&item.product_id).await? {
                Some(product) => listed.push((item.clone(), product)),
                None if self.allow_unlisted_items => {
                    tracing::debug!(
                        product_id = %item.product_id,
                        "Order line does not resolve to a catalog entry; skipping stock checks"
                    );
                }
                None => {
                    return Err(AppError::invalid(format!(
                        "Unknown product: {}",
                        item.product_id
                    )));
                }
            }
        }

        // Advisory pre-check: catch obvious shortfalls before touching any
        // counter, and fail the whole order on the first one
        for (item, product) in &listed {
            if !product.in_stock || product.stock_quantity < item.quantity as i64 {
                return Err(AppError::conflict(format!(
                    "Insufficient stock for {}",
                    product.name
                )));
            }
        }

        // Authoritative reservation: per-item conditional decrement. A
        // concurrent order may have drained the counter since the
        // pre-check; losing the race aborts, returning units already
        // reserved for earlier lines.
        let mut reserved: Vec<(String, u32)> = Vec::new();
        for (item, product) in &listed {
            let ok = self
                .products
                .reserve_stock(&item.product_id, item.quantity)
                .await?;
            if !ok {
                for (product_id, quantity) in &reserved {
                    if let Err(e) = self.products.restore_stock(product_id, *quantity).await {
                        tracing::error!(
                            product_id = %product_id,
                            error = %e,
                            "Failed to restore reserved stock after aborted order"
                        );
                    }
                }
                return Err(AppError::conflict(format!(
                    "Insufficient stock for {}",
                    product.name
                )));
            }
            reserved.push((item.product_id.clone(), item.quantity));
        }

        let order = Order::from_request(
            request,
            generate_order_number(&self.order_number_prefix),
            user_id,
            Utc::now(),
        );
        let order = self.orders.create(order).await.map_err(AppError::from)?;

        if let Err(e) = self.mailer.send_order_confirmation(&order).await {
            tracing::warn!(order_number = %order.order_number, error = %e, "Confirmation mail failed");
        }

        Ok(order)
    }

    /// Apply an admin status/shipment update through the state machine
    pub async fn transition(&self, order_id: &str, update: UpdateOrderRequest) -> AppResult<Order> {
        let order = self
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| AppError::not_found("Order not found"))?;

        if let Some(next) = update.status {
            if !order.status.can_transition_to(next) {
                return Err(AppError::conflict(format!(
                    "Cannot transition order from {:?} to {:?}",
                    order.status, next
                )));
            }
        }

        let updated = self
            .orders
            .apply_transition(order_id, update.status, update.tracking_number, Utc::now())
            .await?
            .ok_or_else(|| AppError::not_found("Order not found"))?;
        Ok(updated)
    }

    pub fn orders(&self) -> &OrderRepository {
        &self.orders
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(price: f64, quantity: u32) -> OrderItemInput {
        OrderItemInput {
            product_id: "product:p1".to_string(),
            product_name: "Basket".to_string(),
            product_image: "basket.jpg".to_string(),
            price,
            quantity,
            total: price * quantity as f64,
        }
    }

    fn totals(subtotal: f64, shipping: f64, tax: f64, discount: f64, total: f64) -> TotalsInput {
        TotalsInput {
            subtotal,
            shipping,
            tax,
            discount,
            total,
        }
    }

    #[test]
    fn consistent_totals_pass() {
        let items = vec![item(10.0, 2), item(14.0, 1)];
        assert!(validate_totals(&items, &totals(34.0, 5.0, 2.0, 1.0, 40.0)).is_ok());
    }

    #[test]
    fn subtotal_mismatch_is_rejected() {
        // Items sum to 48, payload declares 50
        let items = vec![item(24.0, 2)];
        let err = validate_totals(&items, &totals(50.0, 0.0, 0.0, 0.0, 50.0)).unwrap_err();
        assert!(matches!(err, AppError::Invalid(_)));
    }

    #[test]
    fn total_mismatch_is_rejected() {
        let items = vec![item(10.0, 1)];
        let err = validate_totals(&items, &totals(10.0, 5.0, 0.0, 0.0, 10.0)).unwrap_err();
        assert!(matches!(err, AppError::Invalid(_)));
    }

    #[test]
    fn tolerance_absorbs_float_rounding() {
        // 3 × 0.1 declared as 0.30 must not be rejected
        let items = vec![item(0.1, 3)];
        assert!(validate_totals(&items, &totals(0.30, 0.0, 0.0, 0.0, 0.30)).is_ok());
        // One cent inside the tolerance either way
        assert!(validate_totals(&items, &totals(0.31, 0.0, 0.0, 0.0, 0.31)).is_ok());
        assert!(validate_totals(&items, &totals(0.32, 0.0, 0.0, 0.0, 0.32)).is_err());
    }

    #[test]
    fn discount_enters_the_total() {
        let items = vec![item(20.0, 1)];
        assert!(validate_totals(&items, &totals(20.0, 4.0, 1.0, 5.0, 20.0)).is_ok());
        assert!(validate_totals(&items, &totals(20.0, 4.0, 1.0, 5.0, 25.0)).is_err());
    }
}
